//! Method body: an ordered, doubly linked instruction list stored in an arena.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{BodyError, Result};
use crate::insn::{Insn, LabelId};

/// Stable handle to one instruction node.
///
/// Ids index the body's arena and are never reused, so an id taken before an
/// insertion still designates the same node afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InsnId(u32);

impl InsnId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    insn: Insn,
    prev: Option<InsnId>,
    next: Option<InsnId>,
    linked: bool,
}

/// Ordered instruction sequence of one method.
#[derive(Debug, Clone, Default)]
pub struct MethodBody {
    nodes: Vec<Node>,
    head: Option<InsnId>,
    tail: Option<InsnId>,
    len: usize,
    next_label: u32,
}

impl MethodBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a body from an instruction list. Fresh labels handed out later by
    /// [`new_label`](Self::new_label) never collide with labels in `insns`.
    pub fn from_insns(insns: impl IntoIterator<Item = Insn>) -> Self {
        let mut body = Self::new();
        for insn in insns {
            body.push_back(insn);
        }
        body
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<InsnId> {
        self.head
    }

    pub fn last(&self) -> Option<InsnId> {
        self.tail
    }

    fn node(&self, id: InsnId) -> Option<&Node> {
        self.nodes.get(id.index()).filter(|n| n.linked)
    }

    pub fn contains(&self, id: InsnId) -> bool {
        self.node(id).is_some()
    }

    pub fn get(&self, id: InsnId) -> Option<&Insn> {
        self.node(id).map(|n| &n.insn)
    }

    pub fn get_mut(&mut self, id: InsnId) -> Option<&mut Insn> {
        self.nodes
            .get_mut(id.index())
            .filter(|n| n.linked)
            .map(|n| &mut n.insn)
    }

    pub fn next(&self, id: InsnId) -> Option<InsnId> {
        self.node(id).and_then(|n| n.next)
    }

    pub fn prev(&self, id: InsnId) -> Option<InsnId> {
        self.node(id).and_then(|n| n.prev)
    }

    /// Instructions in body order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            body: self,
            cur: self.head,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = InsnId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    pub fn insns(&self) -> impl Iterator<Item = &Insn> + '_ {
        self.iter().map(|(_, insn)| insn)
    }

    /// Id of the node at position `index`. Walks the list.
    pub fn id_at(&self, index: usize) -> Option<InsnId> {
        self.ids().nth(index)
    }

    /// Position of a node in body order. Walks the list.
    pub fn index_of(&self, id: InsnId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.ids().position(|i| i == id)
    }

    /// Keep [`new_label`](Self::new_label) clear of every label `insn`
    /// defines or references.
    fn reserve_labels(&mut self, insn: &Insn) {
        if let Insn::Label { id } = insn {
            self.next_label = self.next_label.max(id.0.saturating_add(1));
        }
        for target in insn.label_refs() {
            self.next_label = self.next_label.max(target.0.saturating_add(1));
        }
    }

    fn alloc(&mut self, insn: Insn) -> InsnId {
        self.reserve_labels(&insn);
        let id = InsnId(self.nodes.len() as u32);
        self.nodes.push(Node {
            insn,
            prev: None,
            next: None,
            linked: true,
        });
        self.len += 1;
        id
    }

    pub fn push_back(&mut self, insn: Insn) -> InsnId {
        let id = self.alloc(insn);
        match self.tail {
            Some(tail) => {
                self.nodes[tail.index()].next = Some(id);
                self.nodes[id.index()].prev = Some(tail);
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    pub fn push_front(&mut self, insn: Insn) -> InsnId {
        match self.head {
            Some(head) => self.link_before(head, insn),
            None => self.push_back(insn),
        }
    }

    fn link_after(&mut self, anchor: InsnId, insn: Insn) -> InsnId {
        let id = self.alloc(insn);
        let next = self.nodes[anchor.index()].next;
        self.nodes[id.index()].prev = Some(anchor);
        self.nodes[id.index()].next = next;
        self.nodes[anchor.index()].next = Some(id);
        match next {
            Some(n) => self.nodes[n.index()].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    fn link_before(&mut self, anchor: InsnId, insn: Insn) -> InsnId {
        let id = self.alloc(insn);
        let prev = self.nodes[anchor.index()].prev;
        self.nodes[id.index()].next = Some(anchor);
        self.nodes[id.index()].prev = prev;
        self.nodes[anchor.index()].prev = Some(id);
        match prev {
            Some(p) => self.nodes[p.index()].next = Some(id),
            None => self.head = Some(id),
        }
        id
    }

    pub fn insert_after(&mut self, anchor: InsnId, insn: Insn) -> Result<InsnId> {
        if !self.contains(anchor) {
            return Err(BodyError::StaleId(anchor));
        }
        Ok(self.link_after(anchor, insn))
    }

    pub fn insert_before(&mut self, anchor: InsnId, insn: Insn) -> Result<InsnId> {
        if !self.contains(anchor) {
            return Err(BodyError::StaleId(anchor));
        }
        Ok(self.link_before(anchor, insn))
    }

    /// Insert a block of instructions right after `anchor`, preserving their
    /// order, and return the new ids.
    ///
    /// Labels defined inside the block get fresh ids from this body; jumps and
    /// switches inside the block follow the renaming. References to labels
    /// the block does not define are kept as-is.
    pub fn splice_after(&mut self, anchor: InsnId, block: &[Insn]) -> Result<Vec<InsnId>> {
        if !self.contains(anchor) {
            return Err(BodyError::StaleId(anchor));
        }
        for insn in block {
            self.reserve_labels(insn);
        }
        let mut renamed = HashMap::new();
        for insn in block {
            if let Insn::Label { id } = insn {
                renamed.entry(*id).or_insert_with(|| self.new_label());
            }
        }

        let mut ids = Vec::with_capacity(block.len());
        let mut at = anchor;
        for insn in block {
            let mut insn = insn.clone();
            if !renamed.is_empty() {
                insn.map_labels(|l| renamed.get(&l).copied().unwrap_or(l));
            }
            at = self.link_after(at, insn);
            ids.push(at);
        }
        Ok(ids)
    }

    /// Unlink a node and return its instruction. The id becomes stale.
    pub fn remove(&mut self, id: InsnId) -> Result<Insn> {
        if !self.contains(id) {
            return Err(BodyError::StaleId(id));
        }
        let (prev, next) = {
            let n = &self.nodes[id.index()];
            (n.prev, n.next)
        };
        match prev {
            Some(p) => self.nodes[p.index()].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n.index()].prev = prev,
            None => self.tail = prev,
        }
        let node = &mut self.nodes[id.index()];
        node.linked = false;
        node.prev = None;
        node.next = None;
        self.len -= 1;
        // The arena slot keeps a placeholder so ids stay unique.
        Ok(std::mem::replace(&mut node.insn, Insn::label(LabelId(u32::MAX))))
    }

    /// A label id not used anywhere in this body.
    pub fn new_label(&mut self) -> LabelId {
        let id = LabelId(self.next_label);
        self.next_label += 1;
        id
    }

    /// Node that defines `label`.
    pub fn label_position(&self, label: LabelId) -> Result<InsnId> {
        self.iter()
            .find(|(_, insn)| matches!(insn, Insn::Label { id } if *id == label))
            .map(|(id, _)| id)
            .ok_or(BodyError::LabelNotFound(label))
    }

    /// Labels referenced by a jump or switch but not defined in the body.
    pub fn dangling_labels(&self) -> Vec<LabelId> {
        let mut dangling: Vec<LabelId> = self
            .insns()
            .flat_map(Insn::label_refs)
            .filter(|l| self.label_position(*l).is_err())
            .collect();
        dangling.sort();
        dangling.dedup();
        dangling
    }

    pub fn to_vec(&self) -> Vec<Insn> {
        self.insns().cloned().collect()
    }
}

impl PartialEq for MethodBody {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.insns().eq(other.insns())
    }
}

impl FromIterator<Insn> for MethodBody {
    fn from_iter<I: IntoIterator<Item = Insn>>(iter: I) -> Self {
        Self::from_insns(iter)
    }
}

impl From<Vec<Insn>> for MethodBody {
    fn from(insns: Vec<Insn>) -> Self {
        Self::from_insns(insns)
    }
}

/// Iterator over `(id, insn)` pairs in body order.
pub struct Iter<'a> {
    body: &'a MethodBody,
    cur: Option<InsnId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (InsnId, &'a Insn);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let node = &self.body.nodes[id.index()];
        self.cur = node.next;
        Some((id, &node.insn))
    }
}

impl<'a> IntoIterator for &'a MethodBody {
    type Item = (InsnId, &'a Insn);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl fmt::Display for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, insn) in self.insns().enumerate() {
            writeln!(f, "{i:>4}  {insn}")?;
        }
        Ok(())
    }
}

impl Serialize for MethodBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.insns())
    }
}

impl<'de> Deserialize<'de> for MethodBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<Insn>::deserialize(deserializer).map(MethodBody::from)
    }
}
