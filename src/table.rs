//! Per-state transition tables.
//!
//! A [`TransitionTable`] is an AVL tree keyed by [`Label`] that maps each
//! label to the set of states it leads to. Stored character labels never
//! overlap: inserting a label that collides with a stored one removes the
//! stored entry and re-inserts the pieces of both labels, so that every
//! character keeps mapping to every state either insertion sent it to.

use std::cmp::{self, Ordering};
use std::collections::BTreeSet;
use std::fmt;

use crate::label::{char_pred, char_succ, Label};
use crate::nfa::StateId;
use crate::{CompileError, CompileResult};

/// A set of states, ordered by ID.
pub type StateSet = BTreeSet<StateId>;

type Link = Option<Box<Node>>;

#[derive(Clone, Debug)]
struct Node {
    label: Label,
    targets: StateSet,
    height: usize,
    left: Link,
    right: Link,
}

/// A balanced tree mapping transition labels to destination states.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    root: Link,
    len: usize,
}

impl TransitionTable {
    /// Create an empty table.
    pub fn new() -> TransitionTable {
        TransitionTable::default()
    }

    /// The number of distinct labels in this table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The height of the underlying tree. An empty table has height 0.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Add an edge on `label` to `target`.
    pub fn insert(&mut self, label: Label, target: StateId) -> CompileResult<()> {
        self.insert_set(label, StateSet::from([target]))
    }

    /// Add edges on `label` to every state in `targets`.
    ///
    /// If `label` overlaps a stored character label without being equal to
    /// it, both are split into disjoint pieces and the overlapping piece maps
    /// to the union of their targets.
    pub fn insert_set(
        &mut self,
        label: Label,
        targets: StateSet,
    ) -> CompileResult<()> {
        let label = normalize(label)?;
        let collision = self
            .find_colliding(&label)
            .filter(|&stored| *stored != label)
            .cloned();
        let stored = match collision {
            Some(stored) => stored,
            None => {
                let (root, added) = insert_node(self.root.take(), label, targets);
                self.root = Some(root);
                self.len += usize::from(added);
                return Ok(());
            }
        };
        let stored_targets = match self.remove(&stored) {
            Some(stored_targets) => stored_targets,
            None => {
                return Err(CompileError::invariant(format!(
                    "colliding label {} vanished from its table",
                    stored
                )))
            }
        };
        trace!("splitting {} against stored {}", label, stored);
        for (piece, piece_targets) in
            split(&label, &targets, &stored, &stored_targets)?
        {
            self.insert_set(piece, piece_targets)?;
        }
        Ok(())
    }

    /// Remove the entry carrying exactly `label`, returning its targets.
    ///
    /// Entries that merely overlap `label` are left untouched.
    pub fn remove(&mut self, label: &Label) -> Option<StateSet> {
        let (root, removed) = remove_node(self.root.take(), label);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// The targets of the entry carrying exactly `label`.
    pub fn get(&self, label: &Label) -> Option<&StateSet> {
        let mut link = &self.root;
        while let Some(node) = link {
            match label.partial_cmp(&node.label) {
                Some(Ordering::Less) => link = &node.left,
                Some(Ordering::Greater) => link = &node.right,
                Some(Ordering::Equal) => return Some(&node.targets),
                None => return None,
            }
        }
        None
    }

    /// The union of the targets of every entry whose label matches the
    /// character `c`.
    ///
    /// In a table built by insertion at most one character label matches;
    /// `Any` and `NotIn` entries may add further targets.
    pub fn lookup(&self, c: char) -> StateSet {
        let mut found = StateSet::new();
        for (label, targets) in self.iter().take_while(|(l, _)| l.is_symbolic()) {
            if label.contains(c) {
                found.extend(targets);
            }
        }
        let probe = Label::Char(c);
        let mut link = &self.root;
        while let Some(node) = link {
            match probe.partial_cmp(&node.label) {
                Some(Ordering::Less) => link = &node.left,
                Some(Ordering::Greater) => link = &node.right,
                _ => {
                    found.extend(&node.targets);
                    break;
                }
            }
        }
        found
    }

    /// Iterate over `(label, targets)` entries in label order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: vec![] };
        iter.push_left(&self.root);
        iter
    }

    /// Returns the stored label colliding with `label`, if any.
    fn find_colliding(&self, label: &Label) -> Option<&Label> {
        let mut link = &self.root;
        while let Some(node) = link {
            match label.partial_cmp(&node.label) {
                Some(Ordering::Less) => link = &node.left,
                Some(Ordering::Greater) => link = &node.right,
                _ => return Some(&node.label),
            }
        }
        None
    }
}

impl PartialEq for TransitionTable {
    fn eq(&self, other: &TransitionTable) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for TransitionTable {}

impl<'a> IntoIterator for &'a TransitionTable {
    type Item = (&'a Label, &'a StateSet);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl fmt::Display for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (label, targets) in self {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{} -> {:?}", label, targets)?;
        }
        Ok(())
    }
}

/// An in-order iterator over the entries of a [`TransitionTable`].
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut link: &'a Link) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Label, &'a StateSet);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some((&node.label, &node.targets))
    }
}

fn normalize(label: Label) -> CompileResult<Label> {
    match label {
        Label::Range(lo, hi) => Label::range(lo, hi),
        label => Ok(label),
    }
}

/// Split two colliding character labels into at most three ordered,
/// disjoint pieces: the part only one of them covers on the left, the
/// shared part, and the part only one of them covers on the right.
fn split(
    a: &Label,
    a_targets: &StateSet,
    b: &Label,
    b_targets: &StateSet,
) -> CompileResult<Vec<(Label, StateSet)>> {
    let ((alo, ahi), (blo, bhi)) = match (a.bounds(), b.bounds()) {
        (Some(abounds), Some(bbounds)) => (abounds, bbounds),
        _ => {
            return Err(CompileError::invariant(format!(
                "cannot split symbolic labels {} and {}",
                a, b
            )))
        }
    };
    let (lo, hi) = (cmp::max(alo, blo), cmp::min(ahi, bhi));
    if lo > hi {
        return Err(CompileError::invariant(format!(
            "labels {} and {} do not overlap",
            a, b
        )));
    }
    let neighbour = |c: Option<char>| {
        c.ok_or_else(|| CompileError::invariant("range piece out of bounds"))
    };
    let mut pieces = Vec::with_capacity(3);
    if alo != blo {
        let (start, targets) =
            if alo < blo { (alo, a_targets) } else { (blo, b_targets) };
        pieces.push((Label::range(start, neighbour(char_pred(lo))?)?, targets.clone()));
    }
    let shared: StateSet = a_targets.union(b_targets).copied().collect();
    pieces.push((Label::range(lo, hi)?, shared));
    if ahi != bhi {
        let (end, targets) =
            if ahi > bhi { (ahi, a_targets) } else { (bhi, b_targets) };
        pieces.push((Label::range(neighbour(char_succ(hi))?, end)?, targets.clone()));
    }
    Ok(pieces)
}

fn height(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl Node {
    fn new(label: Label, targets: StateSet) -> Box<Node> {
        Box::new(Node { label, targets, height: 1, left: None, right: None })
    }

    fn update_height(&mut self) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let mut pivot = match node.right.take() {
        Some(pivot) => pivot,
        None => return node,
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let mut pivot = match node.left.take() {
        Some(pivot) => pivot,
        None => return node,
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update_height();
    let balance = node.balance_factor();
    if balance > 1 {
        if node.left.as_ref().map_or(0, |n| n.balance_factor()) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if balance < -1 {
        if node.right.as_ref().map_or(0, |n| n.balance_factor()) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

/// Insert a label that collides with no stored label other than an equal
/// one. Returns the new subtree and whether a node was added.
fn insert_node(link: Link, label: Label, targets: StateSet) -> (Box<Node>, bool) {
    let mut node = match link {
        None => return (Node::new(label, targets), true),
        Some(node) => node,
    };
    let added = match label.partial_cmp(&node.label) {
        Some(Ordering::Less) => {
            let (left, added) = insert_node(node.left.take(), label, targets);
            node.left = Some(left);
            added
        }
        Some(Ordering::Greater) => {
            let (right, added) = insert_node(node.right.take(), label, targets);
            node.right = Some(right);
            added
        }
        _ => {
            node.targets.extend(targets);
            return (node, false);
        }
    };
    (rebalance(node), added)
}

fn remove_node(link: Link, label: &Label) -> (Link, Option<StateSet>) {
    let mut node = match link {
        None => return (None, None),
        Some(node) => node,
    };
    let removed = match label.partial_cmp(&node.label) {
        Some(Ordering::Less) => {
            let (left, removed) = remove_node(node.left.take(), label);
            node.left = left;
            removed
        }
        Some(Ordering::Greater) => {
            let (right, removed) = remove_node(node.right.take(), label);
            node.right = right;
            removed
        }
        Some(Ordering::Equal) => {
            let Node { targets, left, right, .. } = *node;
            let replacement = match (left, right) {
                (None, right) => right,
                (left, None) => left,
                (Some(left), Some(right)) => {
                    let (rest, mut successor) = take_min(right);
                    successor.left = Some(left);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
            return (replacement, Some(targets));
        }
        None => return (Some(node), None),
    };
    (Some(rebalance(node)), removed)
}

/// Detach the leftmost node of a subtree, returning the rebalanced rest.
fn take_min(mut node: Box<Node>) -> (Link, Box<Node>) {
    match node.left.take() {
        None => (node.right.take(), node),
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}
