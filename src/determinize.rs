//! Subset construction: NFA to DFA conversion.
//!
//! Every DFA state stands for the epsilon closure of a set of NFA states.
//! States are discovered breadth-first from the closure of the NFA start,
//! so DFA state `0` is always the start state.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::dfa::Dfa;
use crate::nfa::{Nfa, State, StateId};
use crate::partition;
use crate::table::StateSet;
use crate::{CompileError, CompileResult};

/// Convert an NFA into an equivalent DFA.
///
/// The outgoing edges of the NFA states in a composite state are refined
/// into disjoint label classes; each class leads to the epsilon closure of
/// the union of its targets. `EndOfString` stays a label of its own.
///
/// Returns [`CompileError::TooComplex`] when more than `size_limit` DFA
/// states would be created.
pub fn determinize(nfa: &Nfa, size_limit: Option<usize>) -> CompileResult<Dfa> {
    let mut builder = Builder {
        size_limit,
        ids: BTreeMap::new(),
        sets: vec![],
        states: vec![],
        queue: VecDeque::new(),
    };
    let mut accepting = BTreeSet::new();

    builder.add_state(nfa.epsilon_closure([nfa.start()]))?;
    while let Some(id) = builder.queue.pop_front() {
        let members = builder.sets[id].clone();
        if nfa.is_accepting(&members) {
            accepting.insert(id);
        }
        let entries = members
            .iter()
            .flat_map(|&member| nfa.state(member).transitions().iter());
        for (class, targets) in partition::refine(entries) {
            let target = builder.add_state(nfa.epsilon_closure(targets))?;
            for label in class.labels() {
                builder.states[id].add_transition(label, target)?;
            }
        }
    }
    debug!(
        "determinized NFA with {} states into DFA with {} states",
        nfa.len(),
        builder.states.len()
    );
    Ok(Dfa::from_parts(builder.states, 0, accepting))
}

struct Builder {
    size_limit: Option<usize>,
    ids: BTreeMap<StateSet, StateId>,
    sets: Vec<StateSet>,
    states: Vec<State>,
    queue: VecDeque<StateId>,
}

impl Builder {
    /// Returns the DFA state for the given closure, creating and queueing
    /// it on first sight.
    fn add_state(&mut self, set: StateSet) -> CompileResult<StateId> {
        if let Some(&id) = self.ids.get(&set) {
            return Ok(id);
        }
        let id = self.sets.len();
        if let Some(limit) = self.size_limit {
            if id >= limit {
                return Err(CompileError::TooComplex { limit });
            }
        }
        self.ids.insert(set.clone(), id);
        self.sets.push(set);
        self.states.push(State::new());
        self.queue.push_back(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;
    use crate::nfa_from_string;

    fn determinize_str(pattern: &str) -> Dfa {
        determinize(&nfa_from_string(pattern).unwrap(), None).unwrap()
    }

    fn targets(dfa: &Dfa, id: StateId) -> Vec<(Label, StateSet)> {
        dfa.state(id)
            .transitions()
            .iter()
            .map(|(l, t)| (l.clone(), t.clone()))
            .collect()
    }

    #[test]
    fn alternation() {
        // start {0, 1, 3}, 'a' -> {2, 5}, 'b' -> {4, 5}
        let dfa = determinize_str("a|b");
        assert_eq!(dfa.len(), 3);
        assert_eq!(dfa.start(), 0);
        assert_eq!(
            targets(&dfa, 0),
            vec![
                (Label::Char('a'), StateSet::from([1])),
                (Label::Char('b'), StateSet::from([2])),
            ]
        );
        assert_eq!(dfa.accepting(), &StateSet::from([1, 2]));
    }

    #[test]
    fn overlapping_sets_are_refined() {
        let dfa = determinize_str("[a-m]x|[f-z]y");
        assert_eq!(
            targets(&dfa, 0)
                .into_iter()
                .map(|(l, _)| l)
                .collect::<Vec<_>>(),
            vec![
                Label::Range('a', 'e'),
                Label::Range('f', 'm'),
                Label::Range('n', 'z'),
            ]
        );
        assert!(dfa.is_match("gx"));
        assert!(dfa.is_match("gy"));
        assert!(dfa.is_match("ax"));
        assert!(!dfa.is_match("ay"));
        assert!(!dfa.is_match("zx"));
    }

    #[test]
    fn every_entry_has_one_target() {
        for pattern in ["(a|b)*abb", ".*[^x]a?", "(ab|a)*$", "[a-c][^b]|.b"] {
            let dfa = determinize_str(pattern);
            for state in dfa.states() {
                for (label, targets) in state.transitions() {
                    assert_eq!(targets.len(), 1, "{}: {}", pattern, label);
                    assert!(!matches!(
                        label,
                        Label::Epsilon | Label::Any | Label::NotIn(_)
                    ));
                }
            }
        }
    }

    #[test]
    fn empty_start_closure_accepts() {
        let dfa = determinize_str("a*");
        assert!(dfa.is_accepting_state(dfa.start()));
        assert!(dfa.is_match(""));
        assert!(dfa.is_match("aaa"));
    }

    #[test]
    fn end_of_string_is_a_letter() {
        let dfa = determinize_str("a$");
        assert_eq!(dfa.len(), 3);
        let after_a = dfa.next_state(dfa.start(), 'a').unwrap();
        assert!(!dfa.is_accepting_state(after_a));
        assert!(dfa.end_state(after_a).is_some());
        assert!(dfa.is_match("a"));
        assert!(!dfa.is_match("ab"));
    }

    #[test]
    fn size_limit() {
        let nfa = nfa_from_string("(a|b)*a(a|b)(a|b)").unwrap();
        assert_eq!(
            determinize(&nfa, Some(4)).unwrap_err(),
            CompileError::TooComplex { limit: 4 }
        );
        assert!(determinize(&nfa, Some(100)).is_ok());
    }
}
