use std::fmt;
use std::mem;

use crate::{is_class_meta_character, is_meta_character};

/// An abstract syntax tree for a single regular expression.
///
/// Alternations and concatenations are binary and nest to the right, so
/// `abc` is represented as `Concat(a, Concat(b, c))`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Ast {
    /// A single literal character.
    Char(char),
    /// `.`: any single character.
    Any,
    /// `$`: the end of the input.
    EndOfString,
    /// `left|right`.
    Or(Box<Ast>, Box<Ast>),
    /// `left` followed by `right`.
    Concat(Box<Ast>, Box<Ast>),
    /// `r*`: zero or more repetitions.
    Kleene(Box<Ast>),
    /// `r+`: one or more repetitions.
    Plus(Box<Ast>),
    /// `r?`: zero or one repetition.
    Maybe(Box<Ast>),
    /// `(r)`: a non-capturing group.
    Group(Box<Ast>),
    /// `[...]`: any of the listed characters or ranges.
    PosSet(Vec<ClassItem>),
    /// `[^...]`: any character that is not listed.
    NegSet(Vec<ClassItem>),
}

/// A single item in a character class.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassItem {
    /// A single character.
    Char(char),
    /// An inclusive range of characters. The parser guarantees
    /// `start <= end`.
    Range(char, char),
}

impl Ast {
    /// Build an alternation of two expressions.
    pub fn or(left: Ast, right: Ast) -> Ast {
        Ast::Or(Box::new(left), Box::new(right))
    }

    /// Build a concatenation of two expressions.
    pub fn concat(left: Ast, right: Ast) -> Ast {
        Ast::Concat(Box::new(left), Box::new(right))
    }

    /// Build a zero-or-more repetition.
    pub fn kleene(ast: Ast) -> Ast {
        Ast::Kleene(Box::new(ast))
    }

    /// Build a one-or-more repetition.
    pub fn plus(ast: Ast) -> Ast {
        Ast::Plus(Box::new(ast))
    }

    /// Build a zero-or-one repetition.
    pub fn maybe(ast: Ast) -> Ast {
        Ast::Maybe(Box::new(ast))
    }

    /// Wrap an expression in a group.
    pub fn group(ast: Ast) -> Ast {
        Ast::Group(Box::new(ast))
    }

    /// The direct subexpressions of this expression.
    fn children(&self) -> impl Iterator<Item = &Ast> {
        let (first, second) = match self {
            Ast::Or(left, right) | Ast::Concat(left, right) => {
                (Some(&**left), Some(&**right))
            }
            Ast::Kleene(inner)
            | Ast::Plus(inner)
            | Ast::Maybe(inner)
            | Ast::Group(inner) => (Some(&**inner), None),
            Ast::Char(_)
            | Ast::Any
            | Ast::EndOfString
            | Ast::PosSet(_)
            | Ast::NegSet(_) => (None, None),
        };
        first.into_iter().chain(second)
    }

    /// Returns true if this expression can be followed by a quantifier
    /// without parentheses.
    fn is_atom(&self) -> bool {
        matches!(
            self,
            Ast::Char(_)
                | Ast::Any
                | Ast::EndOfString
                | Ast::Group(_)
                | Ast::PosSet(_)
                | Ast::NegSet(_)
        )
    }
}

/// A custom `Drop` impl is used for `Ast` such that it uses constant stack
/// space but heap space proportional to the depth of the `Ast`.
///
/// Alternations and concatenations of any length nest to the right, so the
/// derived drop glue would recurse once per operand.
impl Drop for Ast {
    fn drop(&mut self) {
        if self.children().all(|child| child.children().next().is_none()) {
            return;
        }
        let mut stack = vec![mem::replace(self, Ast::Any)];
        while let Some(mut ast) = stack.pop() {
            match ast {
                Ast::Or(ref mut left, ref mut right)
                | Ast::Concat(ref mut left, ref mut right) => {
                    stack.push(mem::replace(&mut **left, Ast::Any));
                    stack.push(mem::replace(&mut **right, Ast::Any));
                }
                Ast::Kleene(ref mut inner)
                | Ast::Plus(ref mut inner)
                | Ast::Maybe(ref mut inner)
                | Ast::Group(ref mut inner) => {
                    stack.push(mem::replace(&mut **inner, Ast::Any));
                }
                Ast::Char(_)
                | Ast::Any
                | Ast::EndOfString
                | Ast::PosSet(_)
                | Ast::NegSet(_) => {}
            }
        }
    }
}

impl ClassItem {
    /// Returns the inclusive bounds of this item.
    pub fn bounds(&self) -> (char, char) {
        match *self {
            ClassItem::Char(c) => (c, c),
            ClassItem::Range(start, end) => (start, end),
        }
    }
}

/// Prints a pattern that parses back into an equivalent syntax tree.
///
/// Trees produced by the parser print back exactly. Hand-built trees whose
/// shape cannot be written without parentheses (for example an alternation
/// on the left of a concatenation) gain groups.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Char(c) => write_literal(f, *c),
            Ast::Any => f.write_str("."),
            Ast::EndOfString => f.write_str("$"),
            Ast::Or(left, right) => {
                if let Ast::Or(..) = **left {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, "|{}", right)
            }
            Ast::Concat(left, right) => {
                // A concatenation on the left would re-associate.
                match **left {
                    Ast::Or(..) | Ast::Concat(..) => write!(f, "({})", left)?,
                    _ => write!(f, "{}", left)?,
                }
                match **right {
                    Ast::Or(..) => write!(f, "({})", right),
                    _ => write!(f, "{}", right),
                }
            }
            Ast::Kleene(ast) => write_repeated(f, ast, '*'),
            Ast::Plus(ast) => write_repeated(f, ast, '+'),
            Ast::Maybe(ast) => write_repeated(f, ast, '?'),
            Ast::Group(ast) => write!(f, "({})", ast),
            Ast::PosSet(items) => write_class(f, "[", items),
            Ast::NegSet(items) => write_class(f, "[^", items),
        }
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    if is_meta_character(c) || c == '\\' {
        write!(f, "\\{}", c)
    } else {
        write!(f, "{}", c)
    }
}

fn write_class_literal(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    if is_class_meta_character(c) {
        write!(f, "\\{}", c)
    } else {
        write!(f, "{}", c)
    }
}

fn write_repeated(
    f: &mut fmt::Formatter<'_>,
    ast: &Ast,
    quantifier: char,
) -> fmt::Result {
    if ast.is_atom() {
        write!(f, "{}{}", ast, quantifier)
    } else {
        write!(f, "({}){}", ast, quantifier)
    }
}

fn write_class(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[ClassItem],
) -> fmt::Result {
    f.write_str(open)?;
    for item in items {
        match *item {
            ClassItem::Char(c) => write_class_literal(f, c)?,
            ClassItem::Range(start, end) => {
                write_class_literal(f, start)?;
                f.write_str("-")?;
                write_class_literal(f, end)?;
            }
        }
    }
    f.write_str("]")
}
