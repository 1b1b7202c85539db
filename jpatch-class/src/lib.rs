//! Decoded class model for the patch engine.
//!
//! - [`ClassModel`], [`MethodNode`], [`FieldNode`]: a class after decoding,
//!   with each method body as a [`jpatch_ir::MethodBody`].
//! - [`descriptor`]: field and method descriptor parser.
//! - [`ClassCodec`]: the seam to a class container format. [`YamlCodec`]
//!   reads and writes YAML dumps of the model.

pub mod access;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod model;

pub use access::AccessFlags;
pub use codec::{ClassCodec, YamlCodec};
pub use descriptor::{
    AnyType, BaseType, FieldType, KnownTypes, MethodDescriptor, ReturnType, TypeNamespace,
    parse_method_descriptor_in,
};
pub use error::{CodecError, DescriptorError, ModelError};
pub use model::{ClassModel, FieldNode, MethodNode, dotted_name, internal_name};
