use crate::ast::{Ast, ClassItem};
use crate::error::{Error, ErrorKind};
use crate::is_meta_character;

/// A builder for a regular expression parser.
///
/// This builder permits modifying configuration options for the parser.
#[derive(Clone, Debug)]
pub struct ParserBuilder {
    nest_limit: u32,
}

impl Default for ParserBuilder {
    fn default() -> ParserBuilder {
        ParserBuilder::new()
    }
}

impl ParserBuilder {
    /// Create a new parser builder with a default configuration.
    pub fn new() -> ParserBuilder {
        ParserBuilder { nest_limit: 250 }
    }

    /// Build a parser from this configuration.
    pub fn build(&self) -> Parser {
        Parser { nest_limit: self.nest_limit }
    }

    /// Set the nesting limit for groups.
    ///
    /// Construction of automata from a syntax tree recurses on nested
    /// groups, so bounding the depth bounds the stack space used by every
    /// later stage. A limit of `0` rejects any group.
    pub fn nest_limit(&mut self, limit: u32) -> &mut ParserBuilder {
        self.nest_limit = limit;
        self
    }
}

/// A regular expression parser.
///
/// A parser is cheap to build and holds no state between calls to
/// [`Parser::parse`].
#[derive(Clone, Debug)]
pub struct Parser {
    nest_limit: u32,
}

impl Parser {
    /// Create a new parser with a default configuration.
    pub fn new() -> Parser {
        ParserBuilder::new().build()
    }

    /// Parse the pattern into an abstract syntax tree.
    pub fn parse(&mut self, pattern: &str) -> Result<Ast, Error> {
        ParserI {
            pattern,
            chars: pattern.chars().collect(),
            pos: 0,
            depth: 0,
            nest_limit: self.nest_limit,
        }
        .parse()
    }
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

/// The state of a single parse.
struct ParserI<'p> {
    pattern: &'p str,
    chars: Vec<char>,
    pos: usize,
    depth: u32,
    nest_limit: u32,
}

impl<'p> ParserI<'p> {
    fn parse(mut self) -> Result<Ast, Error> {
        let ast = self.parse_alternation()?;
        match self.peek() {
            None => Ok(ast),
            // Only an unopened ')' stops an alternation early.
            Some(c) => Err(self.error(self.pos, ErrorKind::UnexpectedMeta(c))),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, position: usize, kind: ErrorKind) -> Error {
        Error::new(kind, self.pattern, position)
    }

    fn parse_alternation(&mut self) -> Result<Ast, Error> {
        let first = self.parse_concat()?;
        let mut rest = vec![];
        // A concatenation only stops before '|', ')' or the end.
        while self.peek() == Some('|') {
            self.bump();
            rest.push(self.parse_concat()?);
        }
        Ok(nest_right(first, rest, Ast::or))
    }

    fn parse_concat(&mut self) -> Result<Ast, Error> {
        let first = self.parse_repetition()?;
        let mut rest = vec![];
        while !matches!(self.peek(), None | Some('|') | Some(')')) {
            rest.push(self.parse_repetition()?);
        }
        Ok(nest_right(first, rest, Ast::concat))
    }

    fn parse_repetition(&mut self) -> Result<Ast, Error> {
        let atom = self.parse_atom()?;
        let ast = match self.peek() {
            Some('*') => Ast::kleene(atom),
            Some('+') => Ast::plus(atom),
            Some('?') => Ast::maybe(atom),
            _ => return Ok(atom),
        };
        self.bump();
        Ok(ast)
    }

    fn parse_atom(&mut self) -> Result<Ast, Error> {
        let start = self.pos;
        match self.peek() {
            None => Err(self.error(start, ErrorKind::UnexpectedEof)),
            Some('(') => self.parse_group(),
            Some('[') => self.parse_class(),
            Some('.') => {
                self.bump();
                Ok(Ast::Any)
            }
            Some('$') => {
                self.bump();
                Ok(Ast::EndOfString)
            }
            Some('\\') => self.parse_escape().map(Ast::Char),
            Some(c) if is_meta_character(c) => {
                Err(self.error(start, ErrorKind::UnexpectedMeta(c)))
            }
            Some(c) => {
                self.bump();
                Ok(Ast::Char(c))
            }
        }
    }

    /// Parse `\c`, returning `c` literally. The cursor must be at `\`.
    fn parse_escape(&mut self) -> Result<char, Error> {
        let start = self.pos;
        self.bump();
        match self.bump() {
            Some(c) => Ok(c),
            None => Err(self.error(start, ErrorKind::DanglingEscape)),
        }
    }

    fn parse_group(&mut self) -> Result<Ast, Error> {
        let open = self.pos;
        if self.depth >= self.nest_limit {
            return Err(self.error(
                open,
                ErrorKind::NestLimitExceeded(self.nest_limit),
            ));
        }
        self.bump();
        self.depth += 1;
        let inner = self.parse_alternation()?;
        if self.peek() != Some(')') {
            return Err(self.error(open, ErrorKind::UnclosedGroup));
        }
        self.bump();
        self.depth -= 1;
        Ok(Ast::group(inner))
    }

    fn parse_class(&mut self) -> Result<Ast, Error> {
        let open = self.pos;
        self.bump();
        let negated = self.peek() == Some('^');
        if negated {
            self.bump();
        }
        let mut items = vec![];
        loop {
            match self.peek() {
                None => return Err(self.error(open, ErrorKind::UnclosedClass)),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(_) => items.push(self.parse_class_item(open)?),
            }
        }
        Ok(if negated { Ast::NegSet(items) } else { Ast::PosSet(items) })
    }

    fn parse_class_item(&mut self, open: usize) -> Result<ClassItem, Error> {
        let start = self.pos;
        let lo = self.parse_class_char(open)?;
        // A '-' right before the closing bracket is a literal.
        if self.peek() != Some('-') || matches!(self.peek_next(), None | Some(']'))
        {
            return Ok(ClassItem::Char(lo));
        }
        self.bump();
        let hi = self.parse_class_char(open)?;
        if lo > hi {
            return Err(self.error(
                start,
                ErrorKind::InvalidRange { start: lo, end: hi },
            ));
        }
        Ok(ClassItem::Range(lo, hi))
    }

    fn parse_class_char(&mut self, open: usize) -> Result<char, Error> {
        match self.peek() {
            Some('\\') => self.parse_escape(),
            Some(c) => {
                self.bump();
                Ok(c)
            }
            None => Err(self.error(open, ErrorKind::UnclosedClass)),
        }
    }
}

/// Fold `first, rest...` into a right-nested tree using `join`.
fn nest_right(first: Ast, mut rest: Vec<Ast>, join: fn(Ast, Ast) -> Ast) -> Ast {
    let mut acc = match rest.pop() {
        None => return first,
        Some(last) => last,
    };
    while let Some(ast) = rest.pop() {
        acc = join(ast, acc);
    }
    join(first, acc)
}
