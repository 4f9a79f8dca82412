//! Deterministic automata.

use std::fmt;

use crate::label::Label;
use crate::minimize;
use crate::nfa::{State, StateId};
use crate::table::StateSet;
use crate::CompileResult;

/// A deterministic automaton.
///
/// Every transition table entry of a DFA state leads to exactly one state
/// and no two entries of a state overlap. `EndOfString` entries may appear:
/// they are followed only once the input is exhausted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dfa {
    states: Vec<State>,
    start: StateId,
    accepting: StateSet,
}

impl Dfa {
    pub(crate) fn from_parts(
        states: Vec<State>,
        start: StateId,
        accepting: StateSet,
    ) -> Dfa {
        Dfa { states, start, accepting }
    }

    /// The start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The set of accepting states.
    pub fn accepting(&self) -> &StateSet {
        &self.accepting
    }

    /// Returns true if `id` is an accepting state.
    pub fn is_accepting_state(&self, id: StateId) -> bool {
        self.accepting.contains(&id)
    }

    /// All states, indexed by [`StateId`].
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The state with the given ID.
    ///
    /// # Panics
    ///
    /// When `id` is not a state of this DFA.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false: a DFA has at least its start state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The state reached from `id` on the character `c`, if any.
    pub fn next_state(&self, id: StateId, c: char) -> Option<StateId> {
        self.states[id].transitions().lookup(c).into_iter().next()
    }

    /// The state reached from `id` over its `EndOfString` edge, if any.
    pub fn end_state(&self, id: StateId) -> Option<StateId> {
        self.states[id]
            .transitions()
            .get(&Label::EndOfString)
            .and_then(|targets| targets.iter().next().copied())
    }

    /// Returns true if this DFA accepts the whole of `input`.
    pub fn is_match(&self, input: &str) -> bool {
        let mut id = self.start;
        for c in input.chars() {
            match self.next_state(id, c) {
                Some(next) => id = next,
                None => return false,
            }
        }
        // `EndOfString` edges may chain, and may cycle.
        let mut seen = StateSet::new();
        while seen.insert(id) {
            if self.is_accepting_state(id) {
                return true;
            }
            match self.end_state(id) {
                Some(next) => id = next,
                None => return false,
            }
        }
        false
    }

    /// Return the minimal DFA accepting the same language.
    ///
    /// The result is canonical: minimizing it again yields an equal DFA.
    pub fn minimize(&self) -> CompileResult<Dfa> {
        minimize::minimize(self)
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        writeln!(f, "accepting: {:?}", self.accepting)?;
        for (id, state) in self.states.iter().enumerate() {
            writeln!(f, "  {}: {}", id, state.transitions())?;
        }
        Ok(())
    }
}
