//! JVM instruction set definitions.
//!
//! This crate provides the opcode table used by the rest of the workspace:
//! every opcode's mnemonic, the [`InsnKind`] of the instruction node that
//! carries it, and a set of [`OpcodeFlags`] describing control-flow and
//! operand properties.
//!
//! ```
//! use jpatch_isa::{InsnKind, OpcodeFlags, lookup_mnemonic, op};
//!
//! let info = lookup_mnemonic("invokevirtual").unwrap();
//! assert_eq!(info.opcode(), op::INVOKEVIRTUAL);
//! assert_eq!(info.kind(), InsnKind::MethodRef);
//! assert!(info.flags().contains(OpcodeFlags::INVOKE));
//! ```

// Re-exported so downstream crates can name flag sets without a direct dependency.
pub use bitflags;

mod opcode;
mod table;

pub use opcode::{InsnKind, Opcode, OpcodeFlags, OpcodeInfo};
pub use table::op;

/// Errors from opcode lookups.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OpcodeError {
    /// No opcode is assigned to this raw byte.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    /// No opcode carries this mnemonic.
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
}

/// All opcodes, ordered by raw value. `opcode_table()[n].opcode().raw() == n`.
pub fn opcode_table() -> &'static [OpcodeInfo] {
    table::TABLE
}

/// Number of defined opcodes.
pub fn opcode_count() -> usize {
    table::TABLE.len()
}

/// Look up opcode metadata by raw byte value.
pub fn lookup(raw: u8) -> Option<&'static OpcodeInfo> {
    table::TABLE.get(raw as usize)
}

/// Look up opcode metadata by mnemonic (case-insensitive).
pub fn lookup_mnemonic(mnemonic: &str) -> Option<&'static OpcodeInfo> {
    table::TABLE
        .iter()
        .find(|info| info.mnemonic().eq_ignore_ascii_case(mnemonic))
}
