//! Method patch engine.
//!
//! A [`Hook`] binds a step program (`find` / `insert` / `jump`) to one method
//! of one component. Hooks are collected in a [`Registry`] at start-up,
//! either through [`HookBuilder`] or from YAML [`Manifest`]s, and a
//! [`Transformer`] applies them to each component as its bytes are loaded.
//!
//! ```
//! use jpatch_class::{ClassModel, MethodNode};
//! use jpatch_engine::{CollectingSink, Hook, Registry};
//! use jpatch_ir::Insn;
//! use jpatch_isa::op;
//!
//! let foo = Insn::method(op::INVOKESTATIC, "a/Lib", "foo", "()V");
//! let bar = Insn::method(op::INVOKESTATIC, "a/Lib", "bar", "()V");
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(
//!         Hook::builder("after-foo")
//!             .target("a.Main", "run", "()V")
//!             .find([foo.clone()])
//!             .insert([bar.clone()])
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let mut class = ClassModel::new("a/Main").with_method(MethodNode::new(
//!     "run",
//!     "()V",
//!     vec![foo.clone(), Insn::plain(op::RETURN)],
//! ));
//! let report = registry.apply("a.Main", &mut class, &CollectingSink::new());
//! assert!(report.is_success());
//! assert_eq!(class.methods[0].body.to_vec()[1], bar);
//! ```

pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod hook;
pub mod manifest;
pub mod registry;
pub mod report;
pub mod step;
pub mod transformer;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LogSink};
pub use error::{HookError, ManifestError, PatchError, TransformError};
pub use exec::{ExecSummary, execute};
pub use hook::{Hook, HookBuilder, MethodTarget};
pub use manifest::{HookSpec, Manifest};
pub use registry::Registry;
pub use report::{HookOutcome, HookReport, TransformReport};
pub use step::{JumpTarget, Step};
pub use transformer::Transformer;
