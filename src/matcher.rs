//! A simple NFA simulator for whole-input and leftmost-shortest matching.

use std::ops::Range;

use crate::nfa::Nfa;
use crate::table::StateSet;

/// A matcher that simulates a Thompson NFA against input.
///
/// Offsets are counted in characters, not bytes. `EndOfString` edges are
/// followed only once the whole input has been consumed, so `$` never
/// matches in the middle of the input even when a match ends there.
#[derive(Clone, Copy, Debug)]
pub struct Matcher<'a> {
    nfa: &'a Nfa,
}

/// The character span of a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Match {
    /// Offset of the first matched character.
    pub start: usize,
    /// Offset one past the last matched character.
    pub end: usize,
}

impl Match {
    /// The span as a range of character offsets.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns true if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given NFA.
    pub fn new(nfa: &'a Nfa) -> Self {
        Self { nfa }
    }

    /// Check if the entire input matches.
    pub fn is_match(&self, input: &str) -> bool {
        let mut current = self.nfa.epsilon_closure([self.nfa.start()]);
        for c in input.chars() {
            current = self.nfa.epsilon_closure(self.step(&current, c));
            if current.is_empty() {
                return false;
            }
        }
        self.accepts(&current, true)
    }

    /// Find the first match in the input: the one with the earliest start,
    /// and among those the shortest.
    pub fn find(&self, input: &str) -> Option<Match> {
        let chars: Vec<char> = input.chars().collect();
        (0..=chars.len()).find_map(|start| {
            self.match_at(&chars, start).map(|end| Match { start, end })
        })
    }

    /// Find all non-overlapping matches, scanning left to right.
    ///
    /// After an empty match the scan resumes one character later.
    pub fn find_all(&self, input: &str) -> Vec<Match> {
        let chars: Vec<char> = input.chars().collect();
        let mut matches = vec![];
        let mut start = 0;
        while start < chars.len() {
            match self.match_at(&chars, start) {
                Some(end) => {
                    matches.push(Match { start, end });
                    start = end.max(start + 1);
                }
                None => start += 1,
            }
        }
        matches
    }

    /// The shortest match starting at `start`, as its end offset.
    fn match_at(&self, chars: &[char], start: usize) -> Option<usize> {
        let mut current = self.nfa.epsilon_closure([self.nfa.start()]);
        let mut position = start;
        loop {
            if self.accepts(&current, position == chars.len()) {
                return Some(position);
            }
            let c = *chars.get(position)?;
            current = self.nfa.epsilon_closure(self.step(&current, c));
            if current.is_empty() {
                return None;
            }
            position += 1;
        }
    }

    /// The states reached from `current` by consuming `c`.
    fn step(&self, current: &StateSet, c: char) -> StateSet {
        current
            .iter()
            .flat_map(|&id| self.nfa.state(id).transitions().lookup(c))
            .collect()
    }

    fn accepts(&self, current: &StateSet, at_end: bool) -> bool {
        if at_end {
            let closure = self.nfa.end_closure(current.iter().copied());
            self.nfa.is_accepting(&closure)
        } else {
            self.nfa.is_accepting(current)
        }
    }
}
