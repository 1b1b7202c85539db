//! Decoded class model.

use std::collections::HashSet;

use jpatch_ir::{Constant, MethodBody};
use serde::{Deserialize, Serialize};

use crate::access::AccessFlags;
use crate::descriptor::{FieldType, MethodDescriptor};
use crate::error::{DescriptorError, ModelError};

/// Convert `a.b.C` to the internal form `a/b/C`.
pub fn internal_name(name: &str) -> String {
    name.replace('.', "/")
}

/// Convert `a/b/C` to the dotted form `a.b.C`.
pub fn dotted_name(name: &str) -> String {
    name.replace('/', ".")
}

/// One class: its identity, fields and methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassModel {
    /// Internal name, e.g. `com/example/Widget`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_name: Option<String>,
    #[serde(default)]
    pub access: AccessFlags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldNode>,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
}

impl ClassModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: None,
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodNode) -> Self {
        self.methods.push(method);
        self
    }

    /// Method with exactly this name and descriptor.
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodNode> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn find_method_mut(&mut self, name: &str, descriptor: &str) -> Option<&mut MethodNode> {
        self.methods
            .iter_mut()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// All overloads of `name`.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodNode> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check the structural rules a decoded class must satisfy: member
    /// descriptors parse, method signatures are unique, every instruction
    /// fits its node kind and every jump target is defined.
    pub fn validate(&self) -> Result<(), ModelError> {
        for field in &self.fields {
            FieldType::parse(&field.descriptor).map_err(|source| ModelError::Descriptor {
                member: format!("{}.{}", self.name, field.name),
                source,
            })?;
        }

        let mut seen = HashSet::new();
        for method in &self.methods {
            if !seen.insert((method.name.as_str(), method.descriptor.as_str())) {
                return Err(ModelError::DuplicateMethod {
                    name: method.name.clone(),
                    descriptor: method.descriptor.clone(),
                });
            }
            method
                .parsed_descriptor()
                .map_err(|source| ModelError::Descriptor {
                    member: format!("{}.{}", self.name, method.name),
                    source,
                })?;
            method.validate_body()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub access: AccessFlags,
    /// `ConstantValue` of a static final field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Constant>,
}

/// One method and its instruction body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub access: AccessFlags,
    #[serde(default)]
    pub max_stack: u16,
    #[serde(default)]
    pub max_locals: u16,
    #[serde(default)]
    pub body: MethodBody,
}

impl MethodNode {
    pub fn new(
        name: impl Into<String>,
        descriptor: impl Into<String>,
        body: impl Into<MethodBody>,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access: AccessFlags::PUBLIC,
            max_stack: 0,
            max_locals: 0,
            body: body.into(),
        }
    }

    pub fn parsed_descriptor(&self) -> Result<MethodDescriptor, DescriptorError> {
        MethodDescriptor::parse(&self.descriptor)
    }

    /// `name(descriptor)` as used in diagnostics.
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.descriptor)
    }

    fn validate_body(&self) -> Result<(), ModelError> {
        for (index, insn) in self.body.insns().enumerate() {
            if !insn.is_well_formed() {
                return Err(ModelError::MalformedInsn {
                    method: self.signature(),
                    index,
                    insn: insn.to_string(),
                    kind: insn.kind(),
                });
            }
        }
        if let Some(label) = self.body.dangling_labels().first() {
            return Err(ModelError::DanglingLabel {
                method: self.signature(),
                label: *label,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpatch_ir::{Insn, LabelId};
    use jpatch_isa::op;

    fn widget() -> ClassModel {
        ClassModel::new("a/Widget")
            .with_method(MethodNode::new("run", "(I)V", vec![Insn::plain(op::RETURN)]))
            .with_method(MethodNode::new("run", "(Z)V", vec![Insn::plain(op::RETURN)]))
    }

    #[test]
    fn lookup_is_exact() {
        let class = widget();
        assert!(class.find_method("run", "(I)V").is_some());
        assert!(class.find_method("run", "(J)V").is_none());
        assert!(class.find_method("Run", "(I)V").is_none());
        assert_eq!(class.methods_named("run").count(), 2);
    }

    #[test]
    fn name_forms() {
        assert_eq!(internal_name("a.b.C"), "a/b/C");
        assert_eq!(dotted_name("a/b/C"), "a.b.C");
    }

    #[test]
    fn validate_accepts_widget() {
        widget().validate().unwrap();
    }

    #[test]
    fn validate_rejects_duplicates() {
        let class = widget().with_method(MethodNode::new("run", "(I)V", MethodBody::new()));
        assert!(matches!(
            class.validate(),
            Err(ModelError::DuplicateMethod { name, .. }) if name == "run"
        ));
    }

    #[test]
    fn validate_rejects_bad_descriptor() {
        let class = ClassModel::new("a/B").with_method(MethodNode::new("f", "(Q)V", MethodBody::new()));
        assert!(matches!(
            class.validate(),
            Err(ModelError::Descriptor {
                source: DescriptorError::UnknownTypeCode { code: 'Q', .. },
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_kind_mismatch() {
        let bad = Insn::LocalVar {
            opcode: op::INVOKEVIRTUAL,
            slot: 0,
        };
        let class = ClassModel::new("a/B").with_method(MethodNode::new("f", "()V", vec![bad]));
        assert!(matches!(
            class.validate(),
            Err(ModelError::MalformedInsn { index: 0, .. })
        ));
    }

    #[test]
    fn validate_rejects_dangling_jump() {
        let body = vec![Insn::jump(op::GOTO, LabelId(4)), Insn::plain(op::RETURN)];
        let class = ClassModel::new("a/B").with_method(MethodNode::new("f", "()V", body));
        assert!(matches!(
            class.validate(),
            Err(ModelError::DanglingLabel { label: LabelId(4), .. })
        ));
    }
}
