//! YAML hook manifests.
//!
//! ```yaml
//! hooks:
//!   - id: widget-redraw
//!     component: com.example.Widget
//!     method: tick
//!     descriptor: ()V
//!     debug: false
//!     steps:
//!       - find:
//!           - kind: method_ref
//!             opcode: invokevirtual
//!             owner: com/example/Widget
//!             name: redraw
//!             descriptor: ()V
//!       - insert:
//!           - kind: method_ref
//!             opcode: invokestatic
//!             owner: com/example/Hooks
//!             name: afterRedraw
//!             descriptor: ()V
//! ```
//!
//! Every hook is validated as by [`HookBuilder::build`], so a bad manifest
//! fails at load time.

use std::path::Path;

use jpatch_class::{AnyType, TypeNamespace};
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::hook::{Hook, HookBuilder};
use crate::registry::Registry;
use crate::step::Step;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub hooks: Vec<HookSpec>,
}

/// Unvalidated hook as written in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookSpec {
    pub id: String,
    pub component: String,
    pub method: String,
    pub descriptor: String,
    #[serde(default)]
    pub debug: bool,
    pub steps: Vec<Step>,
}

impl HookSpec {
    pub fn build(self) -> Result<Hook, crate::HookError> {
        self.build_in(&AnyType)
    }

    /// Validate with reference types checked against `types`.
    pub fn build_in(self, types: &dyn TypeNamespace) -> Result<Hook, crate::HookError> {
        self.steps
            .into_iter()
            .fold(
                HookBuilder::new(self.id).target(&self.component, self.method, self.descriptor),
                HookBuilder::step,
            )
            .debug(self.debug)
            .build_in(types)
    }
}

impl From<&Hook> for HookSpec {
    fn from(hook: &Hook) -> Self {
        let t = hook.target();
        Self {
            id: hook.id().to_string(),
            component: t.component.clone(),
            method: t.method.clone(),
            descriptor: t.descriptor.clone(),
            debug: hook.debug(),
            steps: hook.steps().to_vec(),
        }
    }
}

impl Manifest {
    pub fn from_yaml(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate every hook. Stops at the first invalid one.
    pub fn into_hooks(self) -> Result<Vec<Hook>, ManifestError> {
        self.into_hooks_in(&AnyType)
    }

    /// Like [`into_hooks`](Self::into_hooks), rejecting target descriptors
    /// that name types outside `types`.
    pub fn into_hooks_in(self, types: &dyn TypeNamespace) -> Result<Vec<Hook>, ManifestError> {
        self.hooks
            .into_iter()
            .map(|spec| spec.build_in(types).map_err(ManifestError::from))
            .collect()
    }

    /// Validate every hook and register it.
    pub fn register_into(self, registry: &mut Registry) -> Result<usize, ManifestError> {
        let hooks = self.into_hooks()?;
        let count = hooks.len();
        registry.register_all(hooks)?;
        Ok(count)
    }
}

impl Registry {
    /// Registry holding the hooks of one or more manifest files.
    pub fn from_manifests<P: AsRef<Path>>(
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, ManifestError> {
        let mut registry = Registry::new();
        for path in paths {
            let path = path.as_ref();
            let count = Manifest::load(path)?.register_into(&mut registry)?;
            log::info!("loaded {count} hooks from {}", path.display());
        }
        Ok(registry)
    }
}
