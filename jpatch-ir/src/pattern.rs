//! Wildcard-aware instruction equality.
//!
//! A pattern is an ordinary [`Insn`] whose operands may hold wildcard values:
//!
//! | kind            | wildcard                         |
//! |-----------------|----------------------------------|
//! | `LocalVar`      | `slot == ANY_SLOT` (-1)          |
//! | `IntImmediate`  | `operand == ANY_OPERAND` (-1)    |
//! | `TypeRef`       | `type_name == "~"`               |
//! | `ConstLoad`     | `value == Constant::String("~")` |
//!
//! Field and method references never use wildcards: owner, name and
//! descriptor identify one external symbol and are compared exactly. The
//! opcode is always compared exactly.
//!
//! A real `ldc "~"` in a pattern cannot be told apart from the constant
//! wildcard and matches every `ldc`.

use crate::insn::{ANY_OPERAND, ANY_SLOT, Insn, WILDCARD};

/// Does `candidate` match `pattern`?
pub fn matches(candidate: &Insn, pattern: &Insn) -> bool {
    if candidate.opcode() != pattern.opcode() {
        return false;
    }
    match pattern {
        Insn::Plain { .. } => true,
        Insn::LocalVar { slot: p, .. } => {
            matches!(candidate, Insn::LocalVar { slot, .. } if *p == ANY_SLOT || slot == p)
        }
        Insn::TypeRef { type_name: p, .. } => {
            matches!(candidate, Insn::TypeRef { type_name, .. } if p == WILDCARD || type_name == p)
        }
        Insn::FieldRef {
            owner: po,
            name: pn,
            descriptor: pd,
            ..
        } => matches!(
            candidate,
            Insn::FieldRef { owner, name, descriptor, .. }
                if owner == po && name == pn && descriptor == pd
        ),
        Insn::MethodRef {
            owner: po,
            name: pn,
            descriptor: pd,
            ..
        } => matches!(
            candidate,
            Insn::MethodRef { owner, name, descriptor, .. }
                if owner == po && name == pn && descriptor == pd
        ),
        Insn::ConstLoad { value: p, .. } => {
            matches!(candidate, Insn::ConstLoad { value, .. } if p.is_wildcard() || value == p)
        }
        Insn::IntImmediate { operand: p, .. } => matches!(
            candidate,
            Insn::IntImmediate { operand, .. } if *p == ANY_OPERAND || operand == p
        ),
        Insn::Increment { .. } => candidate == pattern,
        // Label ids are local to a body, so any label matches a label pattern
        // and jumps are compared by opcode only.
        Insn::Label { .. } => matches!(candidate, Insn::Label { .. }),
        Insn::Jump { .. } => matches!(candidate, Insn::Jump { .. }),
        Insn::TableSwitch { low: pl, high: ph, .. } => matches!(
            candidate,
            Insn::TableSwitch { low, high, .. } if low == pl && high == ph
        ),
        Insn::LookupSwitch { keys: pk, .. } => {
            matches!(candidate, Insn::LookupSwitch { keys, .. } if keys == pk)
        }
        Insn::InvokeDynamic { .. } | Insn::MultiANewArray { .. } => candidate == pattern,
    }
}
