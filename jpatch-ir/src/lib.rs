//! Instruction model for method bodies.
//!
//! An [`Insn`] is one instruction node: an opcode plus the operands of its
//! [`InsnKind`](jpatch_isa::InsnKind). A [`MethodBody`] keeps them in order in
//! an arena with stable [`InsnId`]s, so references taken before an edit stay
//! valid after it. Jumps and switches refer to [`LabelId`]s, never offsets.
//!
//! [`pattern::matches`] and [`matcher::find_sequence`] locate instruction
//! sequences using wildcard patterns.
//!
//! ```
//! use jpatch_ir::{Insn, MethodBody, matcher::find_sequence};
//! use jpatch_isa::op;
//!
//! let body = MethodBody::from_insns([
//!     Insn::var(op::ALOAD, 3),
//!     Insn::method(op::INVOKEVIRTUAL, "a/B", "foo", "()V"),
//!     Insn::plain(op::RETURN),
//! ]);
//! let m = find_sequence(&body, &[Insn::any_var(op::ALOAD)], 0).unwrap();
//! assert_eq!(m.index, 0);
//! ```

mod body;
mod error;
mod insn;
pub mod matcher;
pub mod pattern;

pub use body::{InsnId, Iter, MethodBody};
pub use error::{BodyError, Result};
pub use insn::{ANY_OPERAND, ANY_SLOT, Constant, Insn, LabelId, MemberHandle, WILDCARD};
pub use matcher::{Match, find_sequence};
pub use pattern::matches;
