/*!
Compile regular expressions into finite automata.

A pattern is parsed by [`re_automata_syntax`] and turned into a Thompson
[`Nfa`], whose states keep their outgoing edges in balanced
[`TransitionTable`]s keyed by character, range and symbolic [`Label`]s.
Overlapping ranges are split as they are inserted, so every table maps each
character to a single entry. An `Nfa` can be determinized into a [`Dfa`] and
minimized.

# Example

```
use re_automata::{dfa_from_string, nfa_from_string};

let nfa = nfa_from_string("19|20")?;
assert_eq!(nfa.len(), 10);
assert!(nfa.is_match("20"));

let dfa = dfa_from_string("(a|b)*abb")?;
assert_eq!(dfa.len(), 4);
assert!(dfa.is_match("babb"));
assert!(!dfa.is_match("abba"));
# Ok::<(), re_automata::CompileError>(())
```

Limits on nesting depth and automaton size are set through a
[`compiler::Config`]:

```
use re_automata::{compiler::Config, CompileError, Compiler};

let config = Config::new().dfa_size_limit(Some(8));
let err = Compiler::new().configure(config).build_dfa("(a|b)*a(a|b)(a|b)(a|b)");
assert_eq!(err.unwrap_err(), CompileError::TooComplex { limit: 8 });
```

# Crate features

* **std** (enabled by default) - forwards to the `std` features of
  `regex-syntax` and `re-automata-syntax`.
* **logging** - emits `log` records at debug level for automaton sizes and
  at trace level for transition table splits.
*/

#![deny(missing_docs)]

#[macro_use]
mod macros;

pub mod compiler;
pub mod determinize;
pub mod dfa;
pub mod label;
pub mod matcher;
pub mod minimize;
pub mod nfa;
pub mod partition;
pub mod table;

use std::fmt;

pub use crate::compiler::{Compiler, Config};
pub use crate::dfa::Dfa;
pub use crate::label::{CharSet, Label};
pub use crate::matcher::{Match, Matcher};
pub use crate::nfa::{Fragment, Nfa, State, StateId};
pub use crate::table::{StateSet, TransitionTable};

/// The result of compiling a pattern into an automaton.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur while building an automaton.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum CompileError {
    /// The pattern could not be parsed.
    Syntax(re_automata_syntax::Error),
    /// The syntax tree contains a construct no automaton is built for.
    Unsupported(String),
    /// A builder invariant was broken, such as a range whose start exceeds
    /// its end.
    InvariantViolation(String),
    /// A configured size limit was exceeded.
    TooComplex {
        /// The limit that was exceeded.
        limit: usize,
    },
}

impl CompileError {
    pub(crate) fn invariant(msg: impl Into<String>) -> CompileError {
        CompileError::InvariantViolation(msg.into())
    }

    pub(crate) fn invalid_range(start: char, end: char) -> CompileError {
        CompileError::invariant(format!(
            "invalid range {:?}-{:?}: start exceeds end",
            start, end
        ))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax(err) => write!(f, "{}", err),
            CompileError::Unsupported(what) => {
                write!(f, "unsupported construct: {}", what)
            }
            CompileError::InvariantViolation(msg) => {
                write!(f, "invariant violation: {}", msg)
            }
            CompileError::TooComplex { limit } => write!(
                f,
                "automaton exceeds the configured size limit of {} states",
                limit
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

impl From<re_automata_syntax::Error> for CompileError {
    fn from(err: re_automata_syntax::Error) -> CompileError {
        CompileError::Syntax(err)
    }
}

/// Parse `pattern` and compile it into a Thompson NFA using the default
/// configuration.
pub fn nfa_from_string(pattern: &str) -> CompileResult<Nfa> {
    Compiler::new().build(pattern)
}

/// Parse `pattern` and compile it into its minimal DFA using the default
/// configuration.
pub fn dfa_from_string(pattern: &str) -> CompileResult<Dfa> {
    Compiler::new().build_dfa(pattern)
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
