//! Structured hook failure reports.

use std::fmt;
use std::sync::Mutex;

use log::Level;

use crate::hook::Hook;

/// One problem found while applying a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub hook_id: String,
    pub component: String,
    pub method: String,
    pub descriptor: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: Level, hook: &Hook, message: impl Into<String>) -> Self {
        let target = hook.target();
        Self {
            level,
            hook_id: hook.id().to_string(),
            component: target.component.clone(),
            method: target.method.clone(),
            descriptor: target.descriptor.clone(),
            message: message.into(),
        }
    }

    pub fn error(hook: &Hook, message: impl Into<String>) -> Self {
        Self::new(Level::Error, hook, message)
    }

    pub fn warn(hook: &Hook, message: impl Into<String>) -> Self {
        Self::new(Level::Warn, hook, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hook `{}` on {}.{}{}: {}",
            self.hook_id, self.component, self.method, self.descriptor, self.message
        )
    }
}

/// Receives diagnostics. Shared between loader threads.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade at their own level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        log::log!(target: "jpatch::hooks", diagnostic.level, "{diagnostic}");
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    items: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Remove and return everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // Pushes never leave the vector half-written, so poisoning is ignored.
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.lock().push(diagnostic.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpatch_ir::Insn;
    use jpatch_isa::op;

    fn hook() -> Hook {
        Hook::builder("demo")
            .target("a.B", "run", "()V")
            .find([Insn::plain(op::RETURN)])
            .build()
            .unwrap()
    }

    #[test]
    fn display_names_target() {
        let d = Diagnostic::error(&hook(), "method not found");
        assert_eq!(d.to_string(), "hook `demo` on a/B.run()V: method not found");
        assert_eq!(d.level, Level::Error);
    }

    #[test]
    fn collecting_sink_buffers() {
        let sink = CollectingSink::new();
        sink.report(&Diagnostic::warn(&hook(), "one"));
        sink.report(&Diagnostic::error(&hook(), "two"));
        assert_eq!(sink.len(), 2);
        let taken = sink.take();
        assert_eq!(taken[0].message, "one");
        assert_eq!(taken[1].level, Level::Error);
        assert!(sink.is_empty());
    }
}
