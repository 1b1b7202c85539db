use std::path::PathBuf;

use jpatch_class::{CodecError, DescriptorError};
use jpatch_ir::BodyError;
use thiserror::Error;

/// A hook definition rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("hook `{hook}` has no target method")]
    MissingTarget { hook: String },

    #[error("hook `{hook}`: malformed descriptor `{descriptor}`: {source}")]
    MalformedDescriptor {
        hook: String,
        descriptor: String,
        #[source]
        source: DescriptorError,
    },

    #[error("hook `{hook}` has no steps")]
    NoSteps { hook: String },

    #[error("hook `{hook}`: step {step} has an empty find pattern")]
    EmptyPattern { hook: String, step: usize },

    #[error("hook `{hook}`: step {step} has instruction `{insn}` in the wrong node kind")]
    MalformedInsn {
        hook: String,
        step: usize,
        insn: String,
    },

    #[error("hook id `{0}` is already registered")]
    DuplicateId(String),
}

/// Why a hook's step program stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("step {step}: pattern not found at or after index {cursor}")]
    PatternNotFound { step: usize, cursor: usize },

    #[error("step {step}: cursor {target} is outside the body (length {len})")]
    CursorOutOfBounds { step: usize, target: isize, len: usize },

    #[error("step {step}: {source}")]
    Body {
        step: usize,
        #[source]
        source: BodyError,
    },
}

impl PatchError {
    /// Index of the step that failed.
    pub fn step(&self) -> usize {
        match self {
            Self::PatternNotFound { step, .. }
            | Self::CursorOutOfBounds { step, .. }
            | Self::Body { step, .. } => *step,
        }
    }
}

/// Failure to decode or re-encode a component around a transform.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("cannot decode {component}: {source}")]
    Decode {
        component: String,
        #[source]
        source: CodecError,
    },

    #[error("cannot encode {component}: {source}")]
    Encode {
        component: String,
        #[source]
        source: CodecError,
    },
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Hook(#[from] HookError),
}
