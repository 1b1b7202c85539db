use thiserror::Error;

/// A type descriptor that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("empty descriptor")]
    Empty,

    #[error("method descriptor must start with '(', found '{found}'")]
    ExpectedOpenParen { found: char },

    #[error("parameter list is not closed with ')'")]
    UnterminatedParams,

    #[error("missing return type after ')'")]
    MissingReturnType,

    #[error("unexpected end of descriptor")]
    UnexpectedEnd,

    #[error("'V' is only valid as a return type (offset {offset})")]
    VoidParameter { offset: usize },

    #[error("array prefix without element type at offset {offset}")]
    MissingArrayElement { offset: usize },

    #[error("array type at offset {offset} has {dims} dimensions")]
    TooManyDimensions { offset: usize, dims: usize },

    #[error("unknown type code '{code}' at offset {offset}")]
    UnknownTypeCode { code: char, offset: usize },

    #[error("class name at offset {offset} is missing its ';'")]
    UnterminatedClassName { offset: usize },

    #[error("empty class name at offset {offset}")]
    EmptyClassName { offset: usize },

    #[error("invalid character '{found}' in class name `{name}`")]
    InvalidClassName { name: String, found: char },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("trailing characters at offset {offset}")]
    TrailingCharacters { offset: usize },
}

/// A decoded class that breaks a structural rule.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{method}: instruction {index} `{insn}` does not fit its {kind} node")]
    MalformedInsn {
        method: String,
        index: usize,
        insn: String,
        kind: jpatch_isa::InsnKind,
    },

    #[error("{method}: jump to undefined label {label}")]
    DanglingLabel {
        method: String,
        label: jpatch_ir::LabelId,
    },

    #[error("method {name}{descriptor} is defined twice")]
    DuplicateMethod { name: String, descriptor: String },

    #[error("{member}: {source}")]
    Descriptor {
        member: String,
        #[source]
        source: DescriptorError,
    },
}

/// Errors from decoding or encoding a class.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("class bytes are not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid class: {0}")]
    Invalid(#[from] ModelError),
}
