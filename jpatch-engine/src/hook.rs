use std::fmt;

use jpatch_class::{AnyType, TypeNamespace, internal_name, parse_method_descriptor_in};
use jpatch_ir::{Insn, MethodBody};

use crate::error::{HookError, PatchError};
use crate::exec::{ExecSummary, execute};
use crate::step::Step;

/// Method a hook patches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodTarget {
    /// Owning class, internal form.
    pub component: String,
    pub method: String,
    pub descriptor: String,
}

impl fmt::Display for MethodTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.component, self.method, self.descriptor)
    }
}

/// A validated patch script bound to one method.
///
/// Hooks are immutable; each application runs the step program with its own
/// cursor, so one hook can patch any number of bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Hook {
    id: String,
    target: MethodTarget,
    steps: Vec<Step>,
    debug: bool,
}

impl Hook {
    pub fn builder(id: impl Into<String>) -> HookBuilder {
        HookBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &MethodTarget {
        &self.target
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether applications dump the body before and after patching.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Run the step program against `body`.
    pub fn apply(&self, body: &mut MethodBody) -> Result<ExecSummary, PatchError> {
        if self.debug {
            log::info!("hook `{}` on {}: before\n{body}", self.id, self.target);
        }
        let result = execute(body, &self.steps);
        if self.debug {
            match &result {
                Ok(summary) => log::info!(
                    "hook `{}` on {}: after ({} inserted, cursor {})\n{body}",
                    self.id,
                    self.target,
                    summary.inserted,
                    summary.cursor
                ),
                Err(e) => log::info!("hook `{}` on {}: stopped: {e}\n{body}", self.id, self.target),
            }
        }
        result
    }
}

/// Builds a [`Hook`], validating it on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct HookBuilder {
    id: String,
    target: Option<MethodTarget>,
    steps: Vec<Step>,
    debug: bool,
}

impl HookBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: None,
            steps: Vec::new(),
            debug: false,
        }
    }

    /// Target class (dotted or internal name), method name and descriptor.
    pub fn target(
        mut self,
        component: &str,
        method: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        self.target = Some(MethodTarget {
            component: internal_name(component),
            method: method.into(),
            descriptor: descriptor.into(),
        });
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn find(self, pattern: impl Into<Vec<Insn>>) -> Self {
        self.step(Step::find(pattern))
    }

    pub fn insert(self, insns: impl Into<Vec<Insn>>) -> Self {
        self.step(Step::insert(insns))
    }

    pub fn jump(self, offset: isize) -> Self {
        self.step(Step::jump(offset))
    }

    pub fn jump_end(self) -> Self {
        self.step(Step::jump_end())
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validate against a namespace that accepts every reference type.
    pub fn build(self) -> Result<Hook, HookError> {
        self.build_in(&AnyType)
    }

    /// Validate the hook; reference types in the target descriptor must be
    /// known to `types`.
    pub fn build_in(self, types: &dyn TypeNamespace) -> Result<Hook, HookError> {
        let hook = self.id;
        let Some(target) = self.target else {
            return Err(HookError::MissingTarget { hook });
        };
        if target.method.is_empty() || target.component.is_empty() {
            return Err(HookError::MissingTarget { hook });
        }
        if let Err(source) = parse_method_descriptor_in(&target.descriptor, types) {
            return Err(HookError::MalformedDescriptor {
                hook,
                descriptor: target.descriptor,
                source,
            });
        }
        if self.steps.is_empty() {
            return Err(HookError::NoSteps { hook });
        }
        for (step, s) in self.steps.iter().enumerate() {
            if matches!(s, Step::Find(p) if p.is_empty()) {
                return Err(HookError::EmptyPattern { hook, step });
            }
            if let Some(bad) = s.insns().iter().find(|i| !i.is_well_formed()) {
                return Err(HookError::MalformedInsn {
                    hook,
                    step,
                    insn: bad.to_string(),
                });
            }
        }
        Ok(Hook {
            id: hook,
            target,
            steps: self.steps,
            debug: self.debug,
        })
    }
}
