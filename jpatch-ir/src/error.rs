use crate::{InsnId, LabelId};

/// Errors from method body edits.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BodyError {
    /// The id was never issued by this body or its node has been removed.
    #[error("instruction {0:?} is not part of this body")]
    StaleId(InsnId),
    #[error("label {0} is not defined in this body")]
    LabelNotFound(LabelId),
}

pub type Result<T> = std::result::Result<T, BodyError>;
