//! Step program interpreter.
//!
//! The interpreter keeps a single cursor (an index into the body, starting at
//! 0) and runs the steps in order:
//!
//! - `Find(p)` moves the cursor to the first occurrence of `p` at or after
//!   the cursor.
//! - `Insert(list)` splices `list` right after the cursor node and moves the
//!   cursor onto the last inserted node.
//! - `Jump(Offset(n))` adds `n` to the cursor. `Jump(End)` moves it to the
//!   last instruction of the body, not past it.
//!
//! The first failing step ends the run. Steps already executed stay applied.

use jpatch_ir::{MethodBody, find_sequence};

use crate::error::PatchError;
use crate::step::{JumpTarget, Step};

/// Result of a complete step program run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecSummary {
    /// Steps executed.
    pub steps: usize,
    /// Instructions added to the body.
    pub inserted: usize,
    /// Cursor after the last step.
    pub cursor: usize,
}

/// Run `steps` against `body`, mutating it in place.
pub fn execute(body: &mut MethodBody, steps: &[Step]) -> Result<ExecSummary, PatchError> {
    let mut cursor = 0usize;
    let mut inserted = 0usize;

    for (step_index, step) in steps.iter().enumerate() {
        match step {
            Step::Find(pattern) => {
                let m = find_sequence(body, pattern, cursor).ok_or(PatchError::PatternNotFound {
                    step: step_index,
                    cursor,
                })?;
                cursor = m.index;
            }
            Step::Insert(insns) => {
                let anchor = body.id_at(cursor).ok_or(PatchError::CursorOutOfBounds {
                    step: step_index,
                    target: cursor as isize,
                    len: body.len(),
                })?;
                body.splice_after(anchor, insns)
                    .map_err(|source| PatchError::Body {
                        step: step_index,
                        source,
                    })?;
                cursor += insns.len();
                inserted += insns.len();
            }
            Step::Jump(target) => {
                let len = body.len();
                let dest = match target {
                    JumpTarget::End => len as isize - 1,
                    JumpTarget::Offset(n) => (cursor as isize).saturating_add(*n),
                };
                if dest < 0 || dest as usize >= len {
                    return Err(PatchError::CursorOutOfBounds {
                        step: step_index,
                        target: dest,
                        len,
                    });
                }
                cursor = dest as usize;
            }
        }
        log::trace!("step {step_index} ({step}): cursor {cursor}");
    }

    Ok(ExecSummary {
        steps: steps.len(),
        inserted,
        cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpatch_ir::{Insn, LabelId};
    use jpatch_isa::op;

    fn call(name: &str) -> Insn {
        Insn::method(op::INVOKESTATIC, "a/B", name, "()V")
    }

    fn body() -> MethodBody {
        MethodBody::from_insns([
            Insn::var(op::ALOAD, 0),
            call("foo"),
            call("qux"),
            Insn::plain(op::RETURN),
        ])
    }

    #[test]
    fn insert_keeps_order_and_moves_cursor_to_last_inserted() {
        let mut b = body();
        let summary = execute(
            &mut b,
            &[Step::find([call("foo")]), Step::insert([call("x"), call("y")])],
        )
        .unwrap();
        assert_eq!(
            b.to_vec(),
            vec![
                Insn::var(op::ALOAD, 0),
                call("foo"),
                call("x"),
                call("y"),
                call("qux"),
                Insn::plain(op::RETURN),
            ]
        );
        assert_eq!(summary.cursor, 3);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.steps, 2);
    }

    #[test]
    fn negative_jump_inserts_before_match() {
        let mut b = body();
        execute(
            &mut b,
            &[Step::find([call("foo")]), Step::jump(-1), Step::insert([call("pre")])],
        )
        .unwrap();
        assert_eq!(b.to_vec()[1], call("pre"));
        assert_eq!(b.to_vec()[2], call("foo"));
    }

    #[test]
    fn jump_end_is_last_instruction() {
        let mut b = body();
        let summary = execute(&mut b, &[Step::jump_end(), Step::insert([Insn::plain(op::NOP)])])
            .unwrap();
        assert_eq!(summary.cursor, 4);
        // Inserting at the end cursor lands after the trailing return.
        assert_eq!(b.to_vec()[3], Insn::plain(op::RETURN));
        assert_eq!(b.to_vec()[4], Insn::plain(op::NOP));
    }

    #[test]
    fn find_continues_from_cursor() {
        let mut b = MethodBody::from_insns([call("foo"), call("bar"), call("foo"), call("bar")]);
        execute(
            &mut b,
            &[
                Step::find([call("foo")]),
                Step::jump(1),
                Step::find([call("foo")]),
                Step::insert([call("tail")]),
            ],
        )
        .unwrap();
        assert_eq!(b.to_vec()[3], call("tail"));
    }

    #[test]
    fn find_at_cursor_matches_current_node() {
        let mut b = body();
        let summary = execute(
            &mut b,
            &[Step::find([call("foo")]), Step::find([call("foo")])],
        )
        .unwrap();
        assert_eq!(summary.cursor, 1);
    }

    #[test]
    fn failed_find_keeps_earlier_inserts() {
        let mut b = body();
        let err = execute(
            &mut b,
            &[
                Step::find([call("foo")]),
                Step::insert([call("kept")]),
                Step::find([call("absent")]),
                Step::insert([call("never")]),
            ],
        )
        .unwrap_err();
        assert_eq!(err, PatchError::PatternNotFound { step: 2, cursor: 2 });
        assert_eq!(b.len(), 5);
        assert_eq!(b.to_vec()[2], call("kept"));
    }

    #[test]
    fn out_of_bounds_jumps_fail_without_mutation() {
        for (jump, target) in [(Step::jump(-1), -1), (Step::jump(4), 4), (Step::jump(100), 100)] {
            let mut b = body();
            let err = execute(&mut b, &[jump, Step::insert([call("x")])]).unwrap_err();
            assert_eq!(
                err,
                PatchError::CursorOutOfBounds {
                    step: 0,
                    target,
                    len: 4
                }
            );
            assert_eq!(b, body());
        }
    }

    #[test]
    fn huge_jump_offsets_fail() {
        for (offset, target) in [(isize::MAX, isize::MAX), (isize::MIN, isize::MIN + 1)] {
            let mut b = body();
            let err = execute(&mut b, &[Step::find([call("foo")]), Step::jump(offset)]).unwrap_err();
            assert_eq!(err, PatchError::CursorOutOfBounds { step: 1, target, len: 4 });
            assert_eq!(b, body());
        }
    }

    #[test]
    fn empty_body() {
        let mut b = MethodBody::new();
        assert!(matches!(
            execute(&mut b, &[Step::jump_end()]),
            Err(PatchError::CursorOutOfBounds { target: -1, len: 0, .. })
        ));
        assert!(matches!(
            execute(&mut b, &[Step::insert([call("x")])]),
            Err(PatchError::CursorOutOfBounds { target: 0, len: 0, .. })
        ));
        assert!(b.is_empty());
    }

    #[test]
    fn repeated_inserts_get_distinct_labels() {
        let block = [
            Insn::jump(op::IFEQ, LabelId(0)),
            call("guarded"),
            Insn::label(LabelId(0)),
        ];
        let mut b = body();
        let steps = [Step::find([call("foo")]), Step::insert(block.clone())];
        execute(&mut b, &steps).unwrap();
        execute(&mut b, &steps).unwrap();
        let labels: Vec<LabelId> = b
            .insns()
            .filter_map(|i| match i {
                Insn::Label { id } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(labels.len(), 2);
        assert_ne!(labels[0], labels[1]);
        assert!(b.dangling_labels().is_empty());
    }

    #[test]
    fn no_steps_is_a_no_op() {
        let mut b = body();
        assert_eq!(execute(&mut b, &[]).unwrap(), ExecSummary::default());
        assert_eq!(b, body());
    }
}
