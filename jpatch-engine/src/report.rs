use std::fmt;

use crate::error::PatchError;
use crate::exec::ExecSummary;
use crate::hook::Hook;

/// What happened to one hook during a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Applied(ExecSummary),
    MethodNotFound,
    /// The step program stopped early. `inserted` instructions from earlier
    /// steps remain in the body.
    PatchFailed { error: PatchError, inserted: usize },
}

impl HookOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Instructions this hook added to the body.
    pub fn inserted(&self) -> usize {
        match self {
            Self::Applied(summary) => summary.inserted,
            Self::MethodNotFound => 0,
            Self::PatchFailed { inserted, .. } => *inserted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub hook_id: String,
    pub method: String,
    pub descriptor: String,
    pub outcome: HookOutcome,
}

impl fmt::Display for HookReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}: ", self.hook_id, self.method, self.descriptor)?;
        match &self.outcome {
            HookOutcome::Applied(s) => write!(f, "applied ({} inserted)", s.inserted),
            HookOutcome::MethodNotFound => f.write_str("method not found"),
            HookOutcome::PatchFailed { error, .. } => write!(f, "failed: {error}"),
        }
    }
}

/// Per-hook outcomes for one component, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformReport {
    pub component: String,
    pub hooks: Vec<HookReport>,
}

impl TransformReport {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            hooks: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, hook: &Hook, outcome: HookOutcome) {
        let target = hook.target();
        self.hooks.push(HookReport {
            hook_id: hook.id().to_string(),
            method: target.method.clone(),
            descriptor: target.descriptor.clone(),
            outcome,
        });
    }

    pub fn applied(&self) -> usize {
        self.hooks.iter().filter(|h| h.outcome.is_applied()).count()
    }

    pub fn failed(&self) -> usize {
        self.hooks.len() - self.applied()
    }

    /// True when no hook failed. Also true for a component without hooks.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// True when some hook changed a method body.
    pub fn is_modified(&self) -> bool {
        self.hooks.iter().any(|h| h.outcome.inserted() > 0)
    }

    pub fn outcome(&self, hook_id: &str) -> Option<&HookOutcome> {
        self.hooks
            .iter()
            .find(|h| h.hook_id == hook_id)
            .map(|h| &h.outcome)
    }
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} applied, {} failed",
            self.component,
            self.applied(),
            self.failed()
        )?;
        for h in &self.hooks {
            writeln!(f, "  {h}")?;
        }
        Ok(())
    }
}
