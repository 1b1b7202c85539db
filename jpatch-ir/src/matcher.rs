use crate::body::{InsnId, MethodBody};
use crate::insn::Insn;
use crate::pattern::matches;

/// Location of a pattern occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Position of the first matched node.
    pub index: usize,
    pub id: InsnId,
}

/// First contiguous occurrence of `pattern` starting at or after `start`.
///
/// Every pattern element must match consecutive nodes; an occurrence with
/// other instructions interleaved is not a match. An empty pattern never
/// matches.
pub fn find_sequence(body: &MethodBody, pattern: &[Insn], start: usize) -> Option<Match> {
    if pattern.is_empty() || start >= body.len() {
        return None;
    }
    let mut index = start;
    let mut cur = body.id_at(start);
    while let Some(id) = cur {
        if body.len() - index < pattern.len() {
            break;
        }
        if matches_at(body, id, pattern) {
            return Some(Match { index, id });
        }
        cur = body.next(id);
        index += 1;
    }
    None
}

fn matches_at(body: &MethodBody, id: InsnId, pattern: &[Insn]) -> bool {
    let mut cur = Some(id);
    for p in pattern {
        let Some(c) = cur else {
            return false;
        };
        match body.get(c) {
            Some(insn) if matches(insn, p) => cur = body.next(c),
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpatch_isa::op;

    fn body() -> MethodBody {
        MethodBody::from_insns([
            Insn::var(op::ALOAD, 0),
            Insn::method(op::INVOKEVIRTUAL, "a/B", "foo", "()V"),
            Insn::plain(op::NOP),
            Insn::var(op::ALOAD, 1),
            Insn::method(op::INVOKEVIRTUAL, "a/B", "foo", "()V"),
            Insn::plain(op::RETURN),
        ])
    }

    #[test]
    fn finds_first_occurrence() {
        let b = body();
        let m = find_sequence(
            &b,
            &[Insn::any_var(op::ALOAD), Insn::method(op::INVOKEVIRTUAL, "a/B", "foo", "()V")],
            0,
        )
        .unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(Some(m.id), b.first());
    }

    #[test]
    fn honors_start_index() {
        let b = body();
        let pattern = [Insn::method(op::INVOKEVIRTUAL, "a/B", "foo", "()V")];
        assert_eq!(find_sequence(&b, &pattern, 0).unwrap().index, 1);
        assert_eq!(find_sequence(&b, &pattern, 1).unwrap().index, 1);
        assert_eq!(find_sequence(&b, &pattern, 2).unwrap().index, 4);
        assert_eq!(find_sequence(&b, &pattern, 5), None);
        assert_eq!(find_sequence(&b, &pattern, 100), None);
    }

    #[test]
    fn requires_contiguity() {
        let b = body();
        let pattern = [
            Insn::method(op::INVOKEVIRTUAL, "a/B", "foo", "()V"),
            Insn::var(op::ALOAD, 1),
        ];
        assert_eq!(find_sequence(&b, &pattern, 0), None);
    }

    #[test]
    fn partial_match_at_end_fails() {
        let b = body();
        let pattern = [Insn::plain(op::RETURN), Insn::plain(op::RETURN)];
        assert_eq!(find_sequence(&b, &pattern, 0), None);
    }

    #[test]
    fn empty_pattern_never_matches() {
        assert_eq!(find_sequence(&body(), &[], 0), None);
    }

    #[test]
    fn pattern_longer_than_body() {
        let b = MethodBody::from_insns([Insn::plain(op::RETURN)]);
        assert_eq!(
            find_sequence(&b, &[Insn::plain(op::RETURN), Insn::plain(op::NOP)], 0),
            None
        );
    }
}
