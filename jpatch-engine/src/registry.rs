use std::collections::{HashMap, HashSet};

use jpatch_class::{ClassModel, internal_name};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::HookError;
use crate::hook::Hook;
use crate::report::{HookOutcome, TransformReport};

/// Hooks grouped by the component they patch.
///
/// Registration takes `&mut self`; [`apply`](Self::apply) takes `&self`, so a
/// registry shared between loader threads is read-only.
#[derive(Debug, Default)]
pub struct Registry {
    hooks: HashMap<String, Vec<Hook>>,
    ids: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook. Hooks for one component apply in registration order.
    pub fn register(&mut self, hook: Hook) -> Result<(), HookError> {
        if !self.ids.insert(hook.id().to_string()) {
            return Err(HookError::DuplicateId(hook.id().to_string()));
        }
        log::debug!("registered hook `{}` on {}", hook.id(), hook.target());
        self.hooks
            .entry(hook.target().component.clone())
            .or_default()
            .push(hook);
        Ok(())
    }

    pub fn register_all(&mut self, hooks: impl IntoIterator<Item = Hook>) -> Result<(), HookError> {
        for hook in hooks {
            self.register(hook)?;
        }
        Ok(())
    }

    /// Hooks for a component, dotted or internal name.
    pub fn hooks_for(&self, component: &str) -> &[Hook] {
        self.hooks
            .get(&internal_name(component))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_hooks(&self, component: &str) -> bool {
        !self.hooks_for(component).is_empty()
    }

    /// Components with at least one hook, in no particular order.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    /// Total number of hooks.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Apply every hook registered for `component` to `class`.
    ///
    /// A hook whose method is missing or whose step program fails is reported
    /// to `sink` and skipped; the remaining hooks still run.
    pub fn apply(
        &self,
        component: &str,
        class: &mut ClassModel,
        sink: &dyn DiagnosticSink,
    ) -> TransformReport {
        let component = internal_name(component);
        let mut report = TransformReport::new(component.as_str());
        let hooks = self.hooks_for(&component);
        if hooks.is_empty() {
            return report;
        }
        if class.name != component {
            log::warn!("patching {component} but the decoded class is named {}", class.name);
        }

        for hook in hooks {
            let target = hook.target();
            let method = match class.find_method_mut(&target.method, &target.descriptor) {
                Some(method) => method,
                None => {
                    let overloads: Vec<&str> = class
                        .methods_named(&target.method)
                        .map(|m| m.descriptor.as_str())
                        .collect();
                    let message = if overloads.is_empty() {
                        "method not found".to_string()
                    } else {
                        format!("method not found (present: {})", overloads.join(", "))
                    };
                    sink.report(&Diagnostic::error(hook, message));
                    report.record(hook, HookOutcome::MethodNotFound);
                    continue;
                }
            };
            let before = method.body.len();
            match hook.apply(&mut method.body) {
                Ok(summary) => {
                    log::debug!(
                        "hook `{}` applied to {} ({} inserted)",
                        hook.id(),
                        target,
                        summary.inserted
                    );
                    report.record(hook, HookOutcome::Applied(summary));
                }
                Err(error) => {
                    sink.report(&Diagnostic::error(hook, error.to_string()));
                    let inserted = method.body.len().saturating_sub(before);
                    report.record(hook, HookOutcome::PatchFailed { error, inserted });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use jpatch_class::MethodNode;
    use jpatch_ir::Insn;
    use jpatch_isa::op;

    fn hook(id: &str, component: &str) -> Hook {
        Hook::builder(id)
            .target(component, "run", "()V")
            .find([Insn::plain(op::RETURN)])
            .jump(-1)
            .insert([Insn::plain(op::NOP)])
            .build()
            .unwrap()
    }

    #[test]
    fn groups_by_normalized_component() {
        let mut r = Registry::new();
        r.register(hook("a", "x.Y")).unwrap();
        r.register(hook("b", "x/Y")).unwrap();
        r.register(hook("c", "x/Z")).unwrap();
        assert_eq!(r.len(), 3);
        assert_eq!(r.hooks_for("x.Y").len(), 2);
        assert_eq!(r.hooks_for("x/Y")[1].id(), "b");
        assert!(r.has_hooks("x/Z"));
        assert!(!r.has_hooks("x/W"));
        let mut components: Vec<&str> = r.components().collect();
        components.sort();
        assert_eq!(components, ["x/Y", "x/Z"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut r = Registry::new();
        r.register(hook("a", "x/Y")).unwrap();
        assert_eq!(
            r.register(hook("a", "x/Z")),
            Err(HookError::DuplicateId("a".into()))
        );
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn component_without_hooks_is_untouched() {
        let r = Registry::new();
        let mut class = ClassModel::new("x/Y").with_method(MethodNode::new(
            "run",
            "()V",
            vec![Insn::plain(op::RETURN)],
        ));
        let before = class.clone();
        let sink = CollectingSink::new();
        let report = r.apply("x/Y", &mut class, &sink);
        assert!(report.hooks.is_empty());
        assert!(report.is_success());
        assert!(!report.is_modified());
        assert_eq!(class, before);
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_method_names_overloads() {
        let mut r = Registry::new();
        r.register(hook("a", "x/Y")).unwrap();
        let mut class = ClassModel::new("x/Y").with_method(MethodNode::new(
            "run",
            "(I)V",
            vec![Insn::plain(op::RETURN)],
        ));
        let sink = CollectingSink::new();
        let report = r.apply("x.Y", &mut class, &sink);
        assert_eq!(report.outcome("a"), Some(&HookOutcome::MethodNotFound));
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "method not found (present: (I)V)");
        assert_eq!(diags[0].component, "x/Y");
    }
}
