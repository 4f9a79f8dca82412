//! DFA minimization by partition refinement.
//!
//! States are refined Moore-style: starting from the accepting and
//! non-accepting blocks, a block is split whenever two of its members lead
//! to different blocks on some label class, until nothing splits. The
//! transition function is completed with an implicit dead state so that a
//! missing edge counts as an edge into the dead block.
//!
//! The output keeps one state per live block. States are numbered
//! breadth-first from the start, visiting each state's edges in label order
//! after coalescing all classes that share a target, so equal languages
//! always produce equal automata.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use regex_syntax::hir::ClassUnicode;

use crate::dfa::Dfa;
use crate::label::{CharSet, Label};
use crate::nfa::{State, StateId};
use crate::partition::{self, LabelClass};
use crate::table::StateSet;
use crate::CompileResult;

/// Minimize a DFA.
pub fn minimize(dfa: &Dfa) -> CompileResult<Dfa> {
    let n = dfa.len();
    let dead = n;

    // Tag every edge with its source so that the refined alphabet is
    // uniform across all states at once.
    let tagged: Vec<(Label, BTreeSet<(StateId, StateId)>)> = dfa
        .states()
        .iter()
        .enumerate()
        .flat_map(|(id, state)| {
            state.transitions().iter().map(move |(label, targets)| {
                (label.clone(), targets.iter().map(|&t| (id, t)).collect())
            })
        })
        .collect();
    let classes = partition::refine(tagged.iter().map(|(l, p)| (l, p)));

    let mut delta = vec![vec![dead; classes.len()]; n + 1];
    for (j, (_, edges)) in classes.iter().enumerate() {
        for &(source, target) in edges {
            delta[source][j] = target;
        }
    }

    let block = refine_blocks(dfa, &delta);
    let dead_block = block[dead];
    if block[dfa.start()] == dead_block {
        debug!("DFA with {} states accepts nothing", n);
        return Ok(Dfa::from_parts(vec![State::new()], 0, StateSet::new()));
    }

    // One representative per block; all members agree on every class.
    let mut representative: BTreeMap<usize, StateId> = BTreeMap::new();
    for id in (0..n).rev() {
        representative.insert(block[id], id);
    }
    let edges_of = |b: usize| -> Vec<(LabelClass, usize)> {
        let rep = representative[&b];
        let mut end = None;
        let mut chars: BTreeMap<usize, Vec<ClassUnicode>> = BTreeMap::new();
        for (j, (class, _)) in classes.iter().enumerate() {
            let target = block[delta[rep][j]];
            if target == dead_block {
                continue;
            }
            match class {
                LabelClass::EndOfString => end = Some(target),
                LabelClass::Chars(set) => {
                    chars.entry(target).or_default().push(set.to_class())
                }
            }
        }
        let mut coalesced: Vec<(CharSet, usize)> = chars
            .into_iter()
            .map(|(target, sets)| {
                let mut union = ClassUnicode::empty();
                for set in &sets {
                    union.union(set);
                }
                (CharSet::from_class(&union), target)
            })
            .collect();
        coalesced.sort_by_key(|(set, _)| set.ranges().first().map(|&(lo, _)| lo));
        end.map(|target| (LabelClass::EndOfString, target))
            .into_iter()
            .chain(coalesced.into_iter().map(|(set, t)| (LabelClass::Chars(set), t)))
            .collect()
    };

    let mut numbering: BTreeMap<usize, StateId> = BTreeMap::new();
    let mut order: Vec<(usize, Vec<(LabelClass, usize)>)> = vec![];
    let mut queue = VecDeque::new();
    numbering.insert(block[dfa.start()], 0);
    queue.push_back(block[dfa.start()]);
    while let Some(b) = queue.pop_front() {
        let edges = edges_of(b);
        for &(_, target) in &edges {
            if !numbering.contains_key(&target) {
                numbering.insert(target, numbering.len());
                queue.push_back(target);
            }
        }
        order.push((b, edges));
    }

    let mut states = Vec::with_capacity(order.len());
    let mut accepting = StateSet::new();
    for (id, (b, edges)) in order.into_iter().enumerate() {
        if dfa.is_accepting_state(representative[&b]) {
            accepting.insert(id);
        }
        let mut state = State::new();
        for (class, target) in edges {
            for label in class.labels() {
                state.add_transition(label, numbering[&target])?;
            }
        }
        states.push(state);
    }
    debug!("minimized DFA from {} to {} states", n, states.len());
    Ok(Dfa::from_parts(states, 0, accepting))
}

/// Moore refinement over the completed transition function `delta`, whose
/// last row is the dead state. Returns the block of every state.
fn refine_blocks(dfa: &Dfa, delta: &[Vec<StateId>]) -> Vec<usize> {
    let dead = delta.len() - 1;
    let mut block: Vec<usize> = (0..=dead)
        .map(|id| usize::from(id != dead && dfa.is_accepting_state(id)))
        .collect();
    let mut count = block.iter().collect::<BTreeSet<_>>().len();
    loop {
        let mut signatures: BTreeMap<(usize, Vec<usize>), usize> = BTreeMap::new();
        let next: Vec<usize> = (0..=dead)
            .map(|id| {
                let signature =
                    (block[id], delta[id].iter().map(|&t| block[t]).collect());
                let fresh = signatures.len();
                *signatures.entry(signature).or_insert(fresh)
            })
            .collect();
        block = next;
        if signatures.len() == count {
            return block;
        }
        count = signatures.len();
    }
}
