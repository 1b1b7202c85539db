//! Conversion between raw class bytes and [`ClassModel`].

use crate::error::CodecError;
use crate::model::ClassModel;

/// Reads and writes classes in some binary or textual container format.
///
/// Implementations must be usable from several loader threads at once.
pub trait ClassCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<ClassModel, CodecError>;
    fn encode(&self, class: &ClassModel) -> Result<Vec<u8>, CodecError>;
}

/// Textual class dumps in YAML.
///
/// Decoding validates the model (see [`ClassModel::validate`]), so malformed
/// dumps are rejected before any patch touches them.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl ClassCodec for YamlCodec {
    fn decode(&self, bytes: &[u8]) -> Result<ClassModel, CodecError> {
        let text = std::str::from_utf8(bytes)?;
        let class: ClassModel = serde_yaml::from_str(text)?;
        class.validate()?;
        log::debug!(
            "decoded {} ({} methods, {} fields)",
            class.name,
            class.methods.len(),
            class.fields.len()
        );
        Ok(class)
    }

    fn encode(&self, class: &ClassModel) -> Result<Vec<u8>, CodecError> {
        Ok(serde_yaml::to_string(class)?.into_bytes())
    }
}
