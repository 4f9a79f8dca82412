/*!
States, fragments and Thompson NFAs.

All states of an automaton live in one arena and refer to each other by
[`StateId`]. A state is nothing more than its transition table.
*/

use std::fmt;

use crate::compiler::Config;
use crate::dfa::Dfa;
use crate::label::Label;
use crate::matcher::Matcher;
use crate::table::{StateSet, TransitionTable};
use crate::{determinize, CompileError, CompileResult};

/// A state ID in an automaton: an index into its state arena.
pub type StateId = usize;

/// An automaton state: a table of outgoing transitions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct State {
    transitions: TransitionTable,
}

impl State {
    /// Create a state with no outgoing transitions.
    pub fn new() -> State {
        State::default()
    }

    /// The outgoing transitions of this state.
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// The states reachable over `Epsilon` edges in one step.
    pub fn epsilon_targets(&self) -> Option<&StateSet> {
        self.transitions.get(&Label::Epsilon)
    }

    pub(crate) fn add_transition(
        &mut self,
        label: Label,
        target: StateId,
    ) -> CompileResult<()> {
        self.transitions.insert(label, target)
    }
}

/// Fragment of an NFA with a single entry and a single exit state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fragment {
    /// The entry state.
    pub start: StateId,
    /// The exit state.
    pub accept: StateId,
}

/// A Thompson NFA: a state arena with one start and one accepting state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    /// Assemble an NFA from its states and the fragment spanning them.
    pub(crate) fn from_fragment(
        states: Vec<State>,
        fragment: Fragment,
    ) -> CompileResult<Nfa> {
        let Fragment { start, accept } = fragment;
        if start == accept || start >= states.len() || accept >= states.len() {
            return Err(CompileError::invariant(format!(
                "fragment {}..{} does not have distinct start and accept \
                 states among {} states",
                start,
                accept,
                states.len()
            )));
        }
        Ok(Nfa { states, start, accept })
    }

    /// The start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The single accepting state.
    pub fn accept(&self) -> StateId {
        self.accept
    }

    /// All states, indexed by [`StateId`].
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The state with the given ID.
    ///
    /// # Panics
    ///
    /// When `id` is not a state of this NFA.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false: an NFA has at least a start and an accepting state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get the epsilon closure of a set of states: every state reachable
    /// from one of `seeds` over `Epsilon` edges alone, seeds included.
    pub fn epsilon_closure<I>(&self, seeds: I) -> StateSet
    where
        I: IntoIterator<Item = StateId>,
    {
        self.closure(seeds, false)
    }

    /// Like [`Nfa::epsilon_closure`], but also follows `EndOfString` edges.
    /// This is the set of states active once the input is exhausted.
    pub fn end_closure<I>(&self, seeds: I) -> StateSet
    where
        I: IntoIterator<Item = StateId>,
    {
        self.closure(seeds, true)
    }

    /// Check if any state in the set is the accepting state.
    pub fn is_accepting(&self, states: &StateSet) -> bool {
        states.contains(&self.accept)
    }

    /// Returns true if this NFA accepts the whole of `input`.
    pub fn is_match(&self, input: &str) -> bool {
        Matcher::new(self).is_match(input)
    }

    /// Convert this NFA into an equivalent, not necessarily minimal, DFA.
    ///
    /// This always uses the default DFA size limit of [`Config::new`], even
    /// when the NFA came from a [`Compiler`](crate::Compiler) configured
    /// otherwise: an NFA does not remember its configuration. To choose
    /// the limit, call [`determinize::determinize`] directly or use
    /// [`Compiler::build_dfa`](crate::Compiler::build_dfa).
    pub fn to_dfa(&self) -> CompileResult<Dfa> {
        determinize::determinize(self, Config::new().get_dfa_size_limit())
    }

    /// Convert this NFA into its minimal DFA.
    ///
    /// Subset construction runs under the default DFA size limit, as in
    /// [`Nfa::to_dfa`].
    pub fn minimize(&self) -> CompileResult<Dfa> {
        self.to_dfa()?.minimize()
    }

    fn closure<I>(&self, seeds: I, at_end: bool) -> StateSet
    where
        I: IntoIterator<Item = StateId>,
    {
        let mut closure = StateSet::new();
        let mut stack: Vec<StateId> = seeds.into_iter().collect();
        while let Some(id) = stack.pop() {
            if !closure.insert(id) {
                continue;
            }
            let table = self.states[id].transitions();
            let mut follow = |label: &Label| {
                if let Some(targets) = table.get(label) {
                    stack.extend(targets.iter().filter(|&t| !closure.contains(t)));
                }
            };
            follow(&Label::Epsilon);
            if at_end {
                follow(&Label::EndOfString);
            }
        }
        closure
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        writeln!(f, "accept: {}", self.accept)?;
        for (id, state) in self.states.iter().enumerate() {
            writeln!(f, "  {}: {}", id, state.transitions())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -ε-> 1 -a-> 2 -ε-> 3, 2 -$-> 4, 4 -ε-> 3 (a cycle 3 -ε-> 0 too).
    fn sample() -> Nfa {
        let mut states = vec![State::new(); 5];
        states[0].add_transition(Label::Epsilon, 1).unwrap();
        states[1].add_transition(Label::Char('a'), 2).unwrap();
        states[2].add_transition(Label::EndOfString, 4).unwrap();
        states[3].add_transition(Label::Epsilon, 0).unwrap();
        states[4].add_transition(Label::Epsilon, 3).unwrap();
        Nfa::from_fragment(states, Fragment { start: 0, accept: 3 }).unwrap()
    }

    fn set(ids: &[StateId]) -> StateSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn epsilon_closure_follows_only_epsilon() {
        let nfa = sample();
        assert_eq!(nfa.epsilon_closure([0]), set(&[0, 1]));
        assert_eq!(nfa.epsilon_closure([2]), set(&[2]));
        assert_eq!(nfa.epsilon_closure([3]), set(&[0, 1, 3]));
        assert_eq!(nfa.epsilon_closure([]), set(&[]));
    }

    #[test]
    fn end_closure_follows_end_of_string() {
        let nfa = sample();
        let closure = nfa.end_closure([2]);
        assert_eq!(closure, set(&[0, 1, 2, 3, 4]));
        assert!(nfa.is_accepting(&closure));
        assert!(!nfa.is_accepting(&nfa.epsilon_closure([2])));
    }

    #[test]
    fn fragment_must_have_distinct_ends() {
        let states = vec![State::new(); 2];
        let err = Nfa::from_fragment(states, Fragment { start: 1, accept: 1 });
        assert!(matches!(err, Err(CompileError::InvariantViolation(_))));
        let states = vec![State::new(); 2];
        let err = Nfa::from_fragment(states, Fragment { start: 0, accept: 2 });
        assert!(err.is_err());
    }

    #[test]
    fn to_dfa_uses_the_default_size_limit() {
        let nfa = crate::nfa_from_string("(a|b)*a(a|b)(a|b)").unwrap();
        assert!(nfa.to_dfa().is_ok());
        assert_eq!(nfa.minimize().unwrap().len(), 8);
        assert_eq!(
            determinize::determinize(&nfa, Some(3)),
            Err(CompileError::TooComplex { limit: 3 })
        );
        let config = Config::new().dfa_size_limit(Some(3));
        let err = crate::Compiler::new()
            .configure(config)
            .build_dfa("(a|b)*a(a|b)(a|b)")
            .unwrap_err();
        assert_eq!(err, CompileError::TooComplex { limit: 3 });
    }

    #[test]
    fn display_lists_tables() {
        let nfa = sample();
        let shown = nfa.to_string();
        assert!(shown.starts_with("start: 0\naccept: 3\n"));
        assert!(shown.contains("  1: 'a' -> {2}\n"));
        assert!(shown.contains("  2: $ -> {4}\n"));
    }
}
