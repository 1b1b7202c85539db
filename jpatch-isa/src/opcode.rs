use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::OpcodeError;

/// A JVM opcode byte.
///
/// Values are only constructed from the opcode table (see [`crate::op`]) or
/// through the checked conversions, so every `Opcode` has table metadata.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode(pub(crate) u8);

impl Opcode {
    /// Checked construction from a raw byte.
    pub fn new(raw: u8) -> Result<Self, OpcodeError> {
        crate::lookup(raw)
            .map(OpcodeInfo::opcode)
            .ok_or(OpcodeError::UnknownOpcode(raw))
    }

    /// Raw byte value.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Table metadata for this opcode.
    pub fn info(self) -> &'static OpcodeInfo {
        // Opcodes can only be built from table entries.
        &crate::opcode_table()[self.0 as usize]
    }

    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic()
    }

    pub fn kind(self) -> InsnKind {
        self.info().kind()
    }

    pub fn flags(self) -> OpcodeFlags {
        self.info().flags()
    }

    pub fn is_jump(self) -> bool {
        self.flags().contains(OpcodeFlags::JUMP)
    }

    pub fn is_return(self) -> bool {
        self.flags().contains(OpcodeFlags::RETURN)
    }
}

impl TryFrom<u8> for Opcode {
    type Error = OpcodeError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Opcode> for u8 {
    #[inline]
    fn from(op: Opcode) -> Self {
        op.0
    }
}

impl FromStr for Opcode {
    type Err = OpcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::lookup_mnemonic(s)
            .map(OpcodeInfo::opcode)
            .ok_or_else(|| OpcodeError::UnknownMnemonic(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opcode({}, {:#04x})", self.mnemonic(), self.0)
    }
}

impl Serialize for Opcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.mnemonic())
    }
}

impl<'de> Deserialize<'de> for Opcode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OpcodeVisitor;

        impl Visitor<'_> for OpcodeVisitor {
            type Value = Opcode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an opcode mnemonic or raw opcode byte")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Opcode, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Opcode, E> {
                let raw = u8::try_from(v).map_err(|_| E::custom(format!("opcode {v} out of range")))?;
                Opcode::new(raw).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Opcode, E> {
                let raw = u8::try_from(v).map_err(|_| E::custom(format!("opcode {v} out of range")))?;
                Opcode::new(raw).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(OpcodeVisitor)
    }
}

/// Instruction node kind. Determines which operands an instruction carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsnKind {
    /// No operands.
    Plain,
    /// Local variable slot.
    LocalVar,
    /// Class or array type name.
    TypeRef,
    /// Field owner, name and descriptor.
    FieldRef,
    /// Method owner, name and descriptor.
    MethodRef,
    /// Constant pool load.
    ConstLoad,
    /// Inline integer operand.
    IntImmediate,
    /// Local slot plus increment.
    Increment,
    /// Zero-width jump target. Never carried by an opcode.
    Label,
    /// Branch to a label.
    Jump,
    TableSwitch,
    LookupSwitch,
    InvokeDynamic,
    MultiANewArray,
}

impl fmt::Display for InsnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plain => "plain",
            Self::LocalVar => "local_var",
            Self::TypeRef => "type_ref",
            Self::FieldRef => "field_ref",
            Self::MethodRef => "method_ref",
            Self::ConstLoad => "const_load",
            Self::IntImmediate => "int_immediate",
            Self::Increment => "increment",
            Self::Label => "label",
            Self::Jump => "jump",
            Self::TableSwitch => "table_switch",
            Self::LookupSwitch => "lookup_switch",
            Self::InvokeDynamic => "invoke_dynamic",
            Self::MultiANewArray => "multi_a_new_array",
        })
    }
}

bitflags::bitflags! {
    /// Static properties of an opcode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpcodeFlags: u16 {
        /// Transfers control to a label.
        const JUMP = 1 << 0;
        /// Jump that may fall through.
        const CONDITIONAL = 1 << 1;
        const RETURN = 1 << 2;
        const THROW = 1 << 3;
        const INVOKE = 1 << 4;
        const FIELD_ACCESS = 1 << 5;
        /// Reads a local variable.
        const LOAD = 1 << 6;
        /// Writes a local variable.
        const STORE = 1 << 7;
        /// Pushes a constant.
        const CONSTANT = 1 << 8;
        /// Multi-way branch.
        const SWITCH = 1 << 9;
    }
}

/// Metadata for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub(crate) opcode: Opcode,
    pub(crate) mnemonic: &'static str,
    pub(crate) kind: InsnKind,
    pub(crate) flags: OpcodeFlags,
}

impl OpcodeInfo {
    #[inline]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[inline]
    pub const fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    #[inline]
    pub const fn kind(&self) -> InsnKind {
        self.kind
    }

    #[inline]
    pub const fn flags(&self) -> OpcodeFlags {
        self.flags
    }

    /// Ends a basic block: unconditional jumps, switches, returns and throws.
    pub fn is_terminator(&self) -> bool {
        let f = self.flags;
        (f.contains(OpcodeFlags::JUMP) && !f.contains(OpcodeFlags::CONDITIONAL))
            || f.intersects(OpcodeFlags::RETURN | OpcodeFlags::THROW | OpcodeFlags::SWITCH)
    }
}
