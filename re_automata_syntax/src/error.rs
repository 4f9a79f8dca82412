use std::fmt;

/// An error that occurred while parsing a pattern.
///
/// The error records the pattern it was produced for and the character
/// offset (not byte offset) at which the problem was found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    pattern: String,
    position: usize,
}

/// The type of a parse error.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The pattern ended where an expression was expected, e.g. `a|`.
    UnexpectedEof,
    /// A group was opened but never closed. The position points at the
    /// opening parenthesis.
    UnclosedGroup,
    /// A character class was opened but never closed. The position points
    /// at the opening bracket.
    UnclosedClass,
    /// A `\` appeared at the very end of the pattern.
    DanglingEscape,
    /// A meta character appeared where a literal was expected, e.g. `a|*`.
    UnexpectedMeta(char),
    /// A class range whose start is greater than its end, e.g. `[z-a]`.
    InvalidRange {
        /// The first character of the range.
        start: char,
        /// The last character of the range.
        end: char,
    },
    /// Groups were nested more deeply than the configured limit allows.
    NestLimitExceeded(u32),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, pattern: &str, position: usize) -> Error {
        Error { kind, pattern: pattern.to_string(), position }
    }

    /// Return the type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The original pattern in which this error occurred.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The character offset into the pattern at which this error occurred.
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "regex parse error:")?;
        writeln!(f, "    {}", self.pattern)?;
        writeln!(f, "    {}^", " ".repeat(self.position))?;
        write!(f, "error: {}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::ErrorKind::*;
        match *self {
            UnexpectedEof => write!(f, "unexpected end of pattern"),
            UnclosedGroup => write!(f, "unclosed group"),
            UnclosedClass => write!(f, "unclosed character class"),
            DanglingEscape => {
                write!(f, "incomplete escape sequence at end of pattern")
            }
            UnexpectedMeta(c) => {
                write!(f, "meta character '{}' is not valid here", c)
            }
            InvalidRange { start, end } => write!(
                f,
                "invalid character class range '{}-{}'",
                start.escape_debug(),
                end.escape_debug()
            ),
            NestLimitExceeded(limit) => {
                write!(f, "exceed the maximum number of nested groups ({})", limit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_points_at_position() {
        let err = Error::new(ErrorKind::UnexpectedMeta('*'), "a|*", 2);
        let expected = "regex parse error:\n    a|*\n      ^\nerror: \
                        meta character '*' is not valid here";
        assert_eq!(err.to_string(), expected);
    }
}
