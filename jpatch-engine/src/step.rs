use std::fmt;

use jpatch_ir::Insn;
use serde::{Deserialize, Serialize};

/// One instruction of a hook's step program.
///
/// In YAML each step is a single-key map:
///
/// ```yaml
/// - find: [...]
/// - insert: [...]
/// - jump: -2
/// - jump: end
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StepRepr", into = "StepRepr")]
pub enum Step {
    /// Move the cursor to the next occurrence of a pattern.
    Find(Vec<Insn>),
    /// Insert instructions after the cursor node.
    Insert(Vec<Insn>),
    Jump(JumpTarget),
}

impl Step {
    pub fn find(pattern: impl Into<Vec<Insn>>) -> Self {
        Step::Find(pattern.into())
    }

    pub fn insert(insns: impl Into<Vec<Insn>>) -> Self {
        Step::Insert(insns.into())
    }

    pub fn jump(offset: isize) -> Self {
        Step::Jump(JumpTarget::Offset(offset))
    }

    pub fn jump_end() -> Self {
        Step::Jump(JumpTarget::End)
    }

    /// Instructions carried by a find or insert step.
    pub fn insns(&self) -> &[Insn] {
        match self {
            Step::Find(insns) | Step::Insert(insns) => insns,
            Step::Jump(_) => &[],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (verb, insns) = match self {
            Step::Find(p) => ("find", p),
            Step::Insert(i) => ("insert", i),
            Step::Jump(t) => return write!(f, "jump {t}"),
        };
        write!(f, "{verb} [")?;
        for (i, insn) in insns.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{insn}")?;
        }
        f.write_str("]")
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    find: Option<Vec<Insn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    insert: Option<Vec<Insn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jump: Option<JumpTarget>,
}

impl TryFrom<StepRepr> for Step {
    type Error = String;

    fn try_from(repr: StepRepr) -> Result<Self, Self::Error> {
        match (repr.find, repr.insert, repr.jump) {
            (Some(pattern), None, None) => Ok(Step::Find(pattern)),
            (None, Some(insns), None) => Ok(Step::Insert(insns)),
            (None, None, Some(target)) => Ok(Step::Jump(target)),
            _ => Err("a step needs exactly one of `find`, `insert` or `jump`".to_string()),
        }
    }
}

impl From<Step> for StepRepr {
    fn from(step: Step) -> Self {
        let mut repr = StepRepr {
            find: None,
            insert: None,
            jump: None,
        };
        match step {
            Step::Find(pattern) => repr.find = Some(pattern),
            Step::Insert(insns) => repr.insert = Some(insns),
            Step::Jump(target) => repr.jump = Some(target),
        }
        repr
    }
}

/// Cursor destination of a jump step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JumpRepr", into = "JumpRepr")]
pub enum JumpTarget {
    /// Relative move; may be negative.
    Offset(isize),
    /// The last instruction of the body.
    End,
}

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpTarget::Offset(n) => write!(f, "{n:+}"),
            JumpTarget::End => f.write_str("end"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum JumpRepr {
    Offset(isize),
    Keyword(String),
}

impl TryFrom<JumpRepr> for JumpTarget {
    type Error = String;

    fn try_from(repr: JumpRepr) -> Result<Self, Self::Error> {
        match repr {
            JumpRepr::Offset(n) => Ok(JumpTarget::Offset(n)),
            JumpRepr::Keyword(k) if k.eq_ignore_ascii_case("end") => Ok(JumpTarget::End),
            JumpRepr::Keyword(k) => Err(format!("expected an offset or `end`, found `{k}`")),
        }
    }
}

impl From<JumpTarget> for JumpRepr {
    fn from(target: JumpTarget) -> Self {
        match target {
            JumpTarget::Offset(n) => JumpRepr::Offset(n),
            JumpTarget::End => JumpRepr::Keyword("end".to_string()),
        }
    }
}
