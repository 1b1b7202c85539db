//! Field and method type descriptors.
//!
//! Grammar:
//!
//! ```text
//! MethodDescriptor := '(' FieldType* ')' ReturnType
//! ReturnType       := 'V' | FieldType
//! FieldType        := BaseType | 'L' ClassName ';' | '[' FieldType
//! BaseType         := 'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z'
//! ```
//!
//! Parsed descriptors print back to the exact input string.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::DescriptorError;

/// Arrays may have at most this many dimensions.
pub const MAX_ARRAY_DIMS: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'B' => Self::Byte,
            b'C' => Self::Char,
            b'D' => Self::Double,
            b'F' => Self::Float,
            b'I' => Self::Int,
            b'J' => Self::Long,
            b'S' => Self::Short,
            b'Z' => Self::Boolean,
            _ => return None,
        })
    }

    pub fn code(self) -> char {
        match self {
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Double => 'D',
            Self::Float => 'F',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Short => 'S',
            Self::Boolean => 'Z',
        }
    }

    /// Java source keyword.
    pub fn java_name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int => "int",
            Self::Long => "long",
            Self::Short => "short",
            Self::Boolean => "boolean",
        }
    }

    /// Local variable slots taken by a value of this type.
    pub fn slot_size(self) -> usize {
        match self {
            Self::Long | Self::Double => 2,
            _ => 1,
        }
    }
}

/// Type of a field, parameter or non-void return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// Class by internal name (`java/lang/String`).
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn object(internal_name: impl Into<String>) -> Self {
        Self::Object(internal_name.into())
    }

    pub fn array_of(component: FieldType) -> Self {
        Self::Array(Box::new(component))
    }

    /// Parse a single field descriptor such as `[Ljava/lang/Object;`.
    pub fn parse(s: &str) -> Result<Self, DescriptorError> {
        Self::parse_in(s, &AnyType)
    }

    /// Like [`parse`](Self::parse), but reference types must be known to `ns`.
    pub fn parse_in(s: &str, ns: &dyn TypeNamespace) -> Result<Self, DescriptorError> {
        if s.is_empty() {
            return Err(DescriptorError::Empty);
        }
        let mut p = Parser::new(s, ns);
        let ty = p.field_type()?;
        p.finish()?;
        Ok(ty)
    }

    pub fn slot_size(&self) -> usize {
        match self {
            Self::Base(b) => b.slot_size(),
            _ => 1,
        }
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Base(_))
    }

    pub fn array_dims(&self) -> usize {
        match self {
            Self::Array(inner) => 1 + inner.array_dims(),
            _ => 0,
        }
    }

    /// Element type after stripping every array dimension.
    pub fn element_type(&self) -> &FieldType {
        match self {
            Self::Array(inner) => inner.element_type(),
            other => other,
        }
    }

    /// Java source spelling: `int`, `java.lang.String`, `byte[][]`.
    pub fn java_name(&self) -> String {
        match self {
            Self::Base(b) => b.java_name().to_string(),
            Self::Object(name) => name.replace('/', "."),
            Self::Array(inner) => format!("{}[]", inner.java_name()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(b) => write!(f, "{}", b.code()),
            Self::Object(name) => write!(f, "L{name};"),
            Self::Array(inner) => write!(f, "[{inner}"),
        }
    }
}

impl FromStr for FieldType {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Value(FieldType),
}

impl ReturnType {
    pub fn slot_size(&self) -> usize {
        match self {
            Self::Void => 0,
            Self::Value(t) => t.slot_size(),
        }
    }

    pub fn java_name(&self) -> String {
        match self {
            Self::Void => "void".to_string(),
            Self::Value(t) => t.java_name(),
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("V"),
            Self::Value(t) => write!(f, "{t}"),
        }
    }
}

/// Parsed method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub ret: ReturnType,
}

impl MethodDescriptor {
    pub fn new(params: Vec<FieldType>, ret: ReturnType) -> Self {
        Self { params, ret }
    }

    pub fn parse(s: &str) -> Result<Self, DescriptorError> {
        parse_method_descriptor_in(s, &AnyType)
    }

    /// Local variable slots taken by the arguments, not counting `this`.
    pub fn arg_slots(&self) -> usize {
        self.params.iter().map(FieldType::slot_size).sum()
    }

    /// `boolean (int, java.lang.String)`
    pub fn java_signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(FieldType::java_name).collect();
        format!("{} ({})", self.ret.java_name(), params.join(", "))
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for p in &self.params {
            write!(f, "{p}")?;
        }
        write!(f, "){}", self.ret)
    }
}

impl FromStr for MethodDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolves class names mentioned by descriptors.
pub trait TypeNamespace {
    /// Is `internal_name` a type this namespace knows?
    fn contains(&self, internal_name: &str) -> bool;
}

/// Namespace that accepts every well-formed class name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyType;

impl TypeNamespace for AnyType {
    fn contains(&self, _internal_name: &str) -> bool {
        true
    }
}

/// Fixed set of known class names.
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    names: HashSet<String>,
}

impl KnownTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts dotted or internal names.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.replace('.', "/"))
    }

    pub fn with(mut self, name: &str) -> Self {
        self.insert(name);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for KnownTypes {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut known = Self::new();
        for name in iter {
            known.insert(name);
        }
        known
    }
}

impl TypeNamespace for KnownTypes {
    fn contains(&self, internal_name: &str) -> bool {
        self.names.contains(internal_name)
    }
}

/// Parse a method descriptor, resolving reference types against `ns`.
pub fn parse_method_descriptor_in(
    s: &str,
    ns: &dyn TypeNamespace,
) -> Result<MethodDescriptor, DescriptorError> {
    if s.is_empty() {
        return Err(DescriptorError::Empty);
    }
    let mut p = Parser::new(s, ns);
    p.expect_open()?;
    let mut params = Vec::new();
    loop {
        match p.peek() {
            None => return Err(DescriptorError::UnterminatedParams),
            Some(b')') => {
                p.pos += 1;
                break;
            }
            Some(b'V') => return Err(DescriptorError::VoidParameter { offset: p.pos }),
            Some(_) => params.push(p.field_type()?),
        }
    }
    let ret = match p.peek() {
        None => return Err(DescriptorError::MissingReturnType),
        Some(b'V') => {
            p.pos += 1;
            ReturnType::Void
        }
        Some(_) => ReturnType::Value(p.field_type()?),
    };
    p.finish()?;
    Ok(MethodDescriptor { params, ret })
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    ns: &'a dyn TypeNamespace,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, ns: &'a dyn TypeNamespace) -> Self {
        Self { src, pos: 0, ns }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn char_at(&self, offset: usize) -> char {
        self.src[offset..].chars().next().unwrap_or('\0')
    }

    fn expect_open(&mut self) -> Result<(), DescriptorError> {
        if self.peek() == Some(b'(') {
            self.pos += 1;
            Ok(())
        } else {
            Err(DescriptorError::ExpectedOpenParen {
                found: self.char_at(0),
            })
        }
    }

    fn field_type(&mut self) -> Result<FieldType, DescriptorError> {
        let start = self.pos;
        let mut dims = 0;
        while self.peek() == Some(b'[') {
            dims += 1;
            self.pos += 1;
        }
        if dims > MAX_ARRAY_DIMS {
            return Err(DescriptorError::TooManyDimensions { offset: start, dims });
        }

        let offset = self.pos;
        let mut ty = match self.peek() {
            None if dims > 0 => return Err(DescriptorError::MissingArrayElement { offset }),
            None => return Err(DescriptorError::UnexpectedEnd),
            Some(b'L') => self.class_name()?,
            Some(b'V') => return Err(DescriptorError::VoidParameter { offset }),
            Some(code) => match BaseType::from_code(code) {
                Some(b) => {
                    self.pos += 1;
                    FieldType::Base(b)
                }
                None => {
                    return Err(DescriptorError::UnknownTypeCode {
                        code: self.char_at(offset),
                        offset,
                    });
                }
            },
        };
        for _ in 0..dims {
            ty = FieldType::array_of(ty);
        }
        Ok(ty)
    }

    fn class_name(&mut self) -> Result<FieldType, DescriptorError> {
        let offset = self.pos;
        let body_start = offset + 1;
        let Some(len) = self.src[body_start..].find(';') else {
            return Err(DescriptorError::UnterminatedClassName { offset });
        };
        let name = &self.src[body_start..body_start + len];
        if name.is_empty() {
            return Err(DescriptorError::EmptyClassName { offset });
        }
        if let Some(bad) = name.chars().find(|c| matches!(c, '.' | '[' | '(' | ')')) {
            return Err(DescriptorError::InvalidClassName {
                name: name.to_string(),
                found: bad,
            });
        }
        if !self.ns.contains(name) {
            return Err(DescriptorError::UnknownType(name.to_string()));
        }
        self.pos = body_start + len + 1;
        Ok(FieldType::Object(name.to_string()))
    }

    fn finish(&self) -> Result<(), DescriptorError> {
        if self.pos < self.src.len() {
            return Err(DescriptorError::TrailingCharacters { offset: self.pos });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_codes() {
        for (code, java) in [
            ("B", "byte"),
            ("C", "char"),
            ("D", "double"),
            ("F", "float"),
            ("I", "int"),
            ("J", "long"),
            ("S", "short"),
            ("Z", "boolean"),
        ] {
            let t = FieldType::parse(code).unwrap();
            assert_eq!(t.java_name(), java);
            assert_eq!(t.to_string(), code);
        }
    }

    #[test]
    fn nested_arrays() {
        let t = FieldType::parse("[[Ljava/lang/String;").unwrap();
        assert_eq!(t.array_dims(), 2);
        assert_eq!(t.element_type(), &FieldType::object("java/lang/String"));
        assert_eq!(t.java_name(), "java.lang.String[][]");
        assert_eq!(t.slot_size(), 1);
    }

    #[test]
    fn field_type_rejects_trailing() {
        assert_eq!(
            FieldType::parse("II"),
            Err(DescriptorError::TrailingCharacters { offset: 1 })
        );
    }

    #[test]
    fn array_without_element() {
        assert_eq!(
            FieldType::parse("[["),
            Err(DescriptorError::MissingArrayElement { offset: 2 })
        );
    }

    #[test]
    fn array_dimension_limit() {
        let ok = format!("{}I", "[".repeat(MAX_ARRAY_DIMS));
        assert!(FieldType::parse(&ok).is_ok());
        let too_deep = format!("{}I", "[".repeat(MAX_ARRAY_DIMS + 1));
        assert!(matches!(
            FieldType::parse(&too_deep),
            Err(DescriptorError::TooManyDimensions { dims: 256, .. })
        ));
    }

    #[test]
    fn class_name_with_dots_is_rejected() {
        assert!(matches!(
            FieldType::parse("Ljava.lang.String;"),
            Err(DescriptorError::InvalidClassName { found: '.', .. })
        ));
    }
}
