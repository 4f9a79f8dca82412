/*!
This crate provides a parser for the small regular expression grammar
understood by `re-automata`, producing a typed abstract syntax tree.

The grammar supports alternation (`a|b`), concatenation by juxtaposition,
the postfix quantifiers `*`, `+` and `?`, grouping with `(...)`, character
classes `[...]` and negated classes `[^...]` with `a-z` ranges, `.` for any
character, `$` for the end of the input and `\` to escape any character.

Grouping is purely structural: there are no capturing groups.

# Example

```
use re_automata_syntax::{parse, Ast};

let ast = parse("a|b")?;
assert_eq!(ast, Ast::or(Ast::Char('a'), Ast::Char('b')));
# Ok::<(), re_automata_syntax::Error>(())
```
*/

#![deny(missing_docs)]

pub use crate::ast::{Ast, ClassItem};
pub use crate::error::{Error, ErrorKind};
pub use crate::parser::{Parser, ParserBuilder};

mod ast;
mod error;
mod parser;

/// Parse the given pattern into an abstract syntax tree using the default
/// parser configuration.
///
/// This is a convenience routine for
/// `ParserBuilder::new().build().parse(pattern)`.
pub fn parse(pattern: &str) -> Result<Ast, Error> {
    ParserBuilder::new().build().parse(pattern)
}

/// Returns true if the given character has significance in a pattern
/// outside of a character class.
///
/// Every meta character can be matched literally by escaping it with `\`.
pub fn is_meta_character(c: char) -> bool {
    matches!(c, '|' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '.' | '$')
}

/// Returns true if the given character must be escaped to be written
/// literally inside a character class.
pub fn is_class_meta_character(c: char) -> bool {
    matches!(c, ']' | '\\' | '-' | '^')
}
