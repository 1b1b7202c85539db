use std::fmt;

use jpatch_isa::{InsnKind, Opcode, op};
use serde::{Deserialize, Serialize};

/// Slot value that matches any local variable slot in a pattern.
pub const ANY_SLOT: i32 = -1;
/// Operand value that matches any integer immediate in a pattern.
pub const ANY_OPERAND: i32 = -1;
/// Type name (or string constant) that matches anything in a pattern.
pub const WILDCARD: &str = "~";

/// Identity of a jump target within one method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A loadable constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Class literal, by internal name or array descriptor.
    Type(String),
}

impl Constant {
    /// The `"~"` string sentinel used by patterns to match any constant.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Constant::String(s) if s == WILDCARD)
    }

    /// Long and double constants take two constant pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }
}

// Floats compare by bit pattern: two loads of the same pool entry are equal
// even when the value is NaN.
impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Type(a), Self::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i32> for Constant {
    fn from(v: i32) -> Self {
        Constant::Int(v)
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Constant::Long(v)
    }
}

impl From<f32> for Constant {
    fn from(v: f32) -> Self {
        Constant::Float(v)
    }
}

impl From<f64> for Constant {
    fn from(v: f64) -> Self {
        Constant::Double(v)
    }
}

impl From<&str> for Constant {
    fn from(v: &str) -> Self {
        Constant::String(v.to_string())
    }
}

impl From<String> for Constant {
    fn from(v: String) -> Self {
        Constant::String(v)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Float(v) => write!(f, "{v:?}f"),
            Self::Double(v) => write!(f, "{v:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Type(t) => write!(f, "{t}.class"),
        }
    }
}

/// Bootstrap method reference of an `invokedynamic` call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberHandle {
    /// JVM reference kind (1..=9).
    pub reference_kind: u8,
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// One instruction node of a method body.
///
/// Each variant carries exactly the operands of its [`InsnKind`]. Jump and
/// switch targets are [`LabelId`]s that refer to a `Label` node in the same
/// body, never byte offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insn {
    Plain {
        opcode: Opcode,
    },
    LocalVar {
        opcode: Opcode,
        slot: i32,
    },
    TypeRef {
        opcode: Opcode,
        type_name: String,
    },
    FieldRef {
        opcode: Opcode,
        owner: String,
        name: String,
        descriptor: String,
    },
    MethodRef {
        opcode: Opcode,
        owner: String,
        name: String,
        descriptor: String,
        #[serde(default)]
        interface: bool,
    },
    ConstLoad {
        opcode: Opcode,
        value: Constant,
    },
    IntImmediate {
        opcode: Opcode,
        operand: i32,
    },
    Increment {
        slot: i32,
        amount: i32,
    },
    Label {
        id: LabelId,
    },
    Jump {
        opcode: Opcode,
        target: LabelId,
    },
    TableSwitch {
        low: i32,
        high: i32,
        default: LabelId,
        targets: Vec<LabelId>,
    },
    LookupSwitch {
        default: LabelId,
        keys: Vec<i32>,
        targets: Vec<LabelId>,
    },
    InvokeDynamic {
        name: String,
        descriptor: String,
        bootstrap: MemberHandle,
    },
    MultiANewArray {
        descriptor: String,
        dims: u8,
    },
}

impl Insn {
    pub fn plain(opcode: Opcode) -> Self {
        Insn::Plain { opcode }
    }

    pub fn var(opcode: Opcode, slot: i32) -> Self {
        Insn::LocalVar { opcode, slot }
    }

    /// Local variable pattern matching any slot.
    pub fn any_var(opcode: Opcode) -> Self {
        Insn::LocalVar {
            opcode,
            slot: ANY_SLOT,
        }
    }

    pub fn type_insn(opcode: Opcode, type_name: impl Into<String>) -> Self {
        Insn::TypeRef {
            opcode,
            type_name: type_name.into(),
        }
    }

    /// Type instruction pattern matching any type name.
    pub fn any_type(opcode: Opcode) -> Self {
        Self::type_insn(opcode, WILDCARD)
    }

    pub fn field(
        opcode: Opcode,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Insn::FieldRef {
            opcode,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Method call; `interface` is derived from the opcode.
    pub fn method(
        opcode: Opcode,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Insn::MethodRef {
            opcode,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            interface: opcode == op::INVOKEINTERFACE,
        }
    }

    /// Constant load; `ldc2_w` for long and double, `ldc` otherwise.
    pub fn ldc(value: impl Into<Constant>) -> Self {
        let value = value.into();
        let opcode = if value.is_wide() { op::LDC2_W } else { op::LDC };
        Insn::ConstLoad { opcode, value }
    }

    /// Constant load pattern matching any constant loaded by `opcode`.
    pub fn any_const(opcode: Opcode) -> Self {
        Insn::ConstLoad {
            opcode,
            value: Constant::String(WILDCARD.to_string()),
        }
    }

    pub fn int(opcode: Opcode, operand: i32) -> Self {
        Insn::IntImmediate { opcode, operand }
    }

    /// Integer immediate pattern matching any operand.
    pub fn any_int(opcode: Opcode) -> Self {
        Insn::IntImmediate {
            opcode,
            operand: ANY_OPERAND,
        }
    }

    pub fn iinc(slot: i32, amount: i32) -> Self {
        Insn::Increment { slot, amount }
    }

    pub fn label(id: LabelId) -> Self {
        Insn::Label { id }
    }

    pub fn jump(opcode: Opcode, target: LabelId) -> Self {
        Insn::Jump { opcode, target }
    }

    /// The opcode, or `None` for labels.
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Insn::Plain { opcode }
            | Insn::LocalVar { opcode, .. }
            | Insn::TypeRef { opcode, .. }
            | Insn::FieldRef { opcode, .. }
            | Insn::MethodRef { opcode, .. }
            | Insn::ConstLoad { opcode, .. }
            | Insn::IntImmediate { opcode, .. }
            | Insn::Jump { opcode, .. } => Some(*opcode),
            Insn::Increment { .. } => Some(op::IINC),
            Insn::TableSwitch { .. } => Some(op::TABLESWITCH),
            Insn::LookupSwitch { .. } => Some(op::LOOKUPSWITCH),
            Insn::InvokeDynamic { .. } => Some(op::INVOKEDYNAMIC),
            Insn::MultiANewArray { .. } => Some(op::MULTIANEWARRAY),
            Insn::Label { .. } => None,
        }
    }

    pub fn kind(&self) -> InsnKind {
        match self {
            Insn::Plain { .. } => InsnKind::Plain,
            Insn::LocalVar { .. } => InsnKind::LocalVar,
            Insn::TypeRef { .. } => InsnKind::TypeRef,
            Insn::FieldRef { .. } => InsnKind::FieldRef,
            Insn::MethodRef { .. } => InsnKind::MethodRef,
            Insn::ConstLoad { .. } => InsnKind::ConstLoad,
            Insn::IntImmediate { .. } => InsnKind::IntImmediate,
            Insn::Increment { .. } => InsnKind::Increment,
            Insn::Label { .. } => InsnKind::Label,
            Insn::Jump { .. } => InsnKind::Jump,
            Insn::TableSwitch { .. } => InsnKind::TableSwitch,
            Insn::LookupSwitch { .. } => InsnKind::LookupSwitch,
            Insn::InvokeDynamic { .. } => InsnKind::InvokeDynamic,
            Insn::MultiANewArray { .. } => InsnKind::MultiANewArray,
        }
    }

    /// True when the opcode belongs to this variant's kind
    /// (e.g. no `invokevirtual` stored in a `LocalVar` node).
    pub fn is_well_formed(&self) -> bool {
        match self.opcode() {
            Some(opcode) => opcode.kind() == self.kind(),
            None => true,
        }
    }

    /// Labels referenced by this instruction as jump or switch targets.
    pub fn label_refs(&self) -> Vec<LabelId> {
        match self {
            Insn::Jump { target, .. } => vec![*target],
            Insn::TableSwitch {
                default, targets, ..
            }
            | Insn::LookupSwitch {
                default, targets, ..
            } => std::iter::once(*default).chain(targets.iter().copied()).collect(),
            _ => Vec::new(),
        }
    }

    /// Rewrite every label this instruction defines or references.
    pub fn map_labels(&mut self, mut f: impl FnMut(LabelId) -> LabelId) {
        match self {
            Insn::Label { id } => *id = f(*id),
            Insn::Jump { target, .. } => *target = f(*target),
            Insn::TableSwitch {
                default, targets, ..
            }
            | Insn::LookupSwitch {
                default, targets, ..
            } => {
                *default = f(*default);
                for t in targets.iter_mut() {
                    *t = f(*t);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insn::Plain { opcode } => write!(f, "{opcode}"),
            Insn::LocalVar { opcode, slot } => write!(f, "{opcode} {slot}"),
            Insn::TypeRef { opcode, type_name } => write!(f, "{opcode} {type_name}"),
            Insn::FieldRef {
                opcode,
                owner,
                name,
                descriptor,
            } => write!(f, "{opcode} {owner}.{name}:{descriptor}"),
            Insn::MethodRef {
                opcode,
                owner,
                name,
                descriptor,
                ..
            } => write!(f, "{opcode} {owner}.{name}{descriptor}"),
            Insn::ConstLoad { opcode, value } => write!(f, "{opcode} {value}"),
            Insn::IntImmediate { opcode, operand } => write!(f, "{opcode} {operand}"),
            Insn::Increment { slot, amount } => write!(f, "iinc {slot} {amount}"),
            Insn::Label { id } => write!(f, "{id}:"),
            Insn::Jump { opcode, target } => write!(f, "{opcode} {target}"),
            Insn::TableSwitch {
                low,
                high,
                default,
                targets,
            } => {
                write!(f, "tableswitch {low}..={high} [")?;
                for (i, t) in targets.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, "] default {default}")
            }
            Insn::LookupSwitch {
                default,
                keys,
                targets,
            } => {
                f.write_str("lookupswitch {")?;
                for (i, (k, t)) in keys.iter().zip(targets).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {t}")?;
                }
                write!(f, "}} default {default}")
            }
            Insn::InvokeDynamic {
                name,
                descriptor,
                bootstrap,
            } => write!(
                f,
                "invokedynamic {name}{descriptor} bsm {}.{}{}",
                bootstrap.owner, bootstrap.name, bootstrap.descriptor
            ),
            Insn::MultiANewArray { descriptor, dims } => {
                write!(f, "multianewarray {descriptor} {dims}")
            }
        }
    }
}
