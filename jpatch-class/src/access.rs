//! Access flags of classes, fields and methods.
//!
//! Several bits are shared between member kinds (`SYNCHRONIZED` is the
//! class `SUPER` bit, `BRIDGE` is `VOLATILE`, `VARARGS` is `TRANSIENT`).

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

impl AccessFlags {
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// Abstract and native methods have no body to patch.
    pub fn has_no_code(self) -> bool {
        self.intersects(Self::ABSTRACT | Self::NATIVE)
    }
}
