//! Transition labels and the partial order used to key transition tables.
//!
//! Character labels (`Char` and `Range`) are ordered by position when they
//! do not overlap. Overlapping character labels are neither less nor greater
//! than each other: they *collide*, and a transition table must split them
//! before they can be stored side by side. Symbolic labels never collide
//! with character labels and always sort before them.

use std::cmp::Ordering;
use std::fmt;

use re_automata_syntax::ClassItem;
use regex_syntax::hir::{ClassUnicode, ClassUnicodeRange};

use crate::{CompileError, CompileResult};

/// The label on an automaton edge.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Label {
    /// A single character.
    Char(char),
    /// An inclusive range of at least two characters. Build with
    /// [`Label::range`] to get the normalization of one-character ranges.
    Range(char, char),
    /// Any single character.
    Any,
    /// A zero-width assertion that holds only at the end of the input.
    EndOfString,
    /// Consumes no input.
    Epsilon,
    /// Any single character not in the set.
    NotIn(CharSet),
}

impl Label {
    /// Build a label for the inclusive range `start..=end`.
    ///
    /// A range of one character is normalized to [`Label::Char`]. A range
    /// with `start > end` is rejected.
    pub fn range(start: char, end: char) -> CompileResult<Label> {
        match start.cmp(&end) {
            Ordering::Less => Ok(Label::Range(start, end)),
            Ordering::Equal => Ok(Label::Char(start)),
            Ordering::Greater => Err(CompileError::invalid_range(start, end)),
        }
    }

    /// Build the label for a single character class item.
    pub fn from_item(item: ClassItem) -> CompileResult<Label> {
        let (start, end) = item.bounds();
        Label::range(start, end)
    }

    /// Build a label matching every character not covered by `items`.
    pub fn not_in(items: &[ClassItem]) -> CompileResult<Label> {
        CharSet::from_items(items).map(Label::NotIn)
    }

    /// Returns true for labels that are not a plain character or range.
    pub fn is_symbolic(&self) -> bool {
        self.bounds().is_none()
    }

    /// Returns true if following an edge with this label consumes one
    /// character of input.
    pub fn consumes_input(&self) -> bool {
        !matches!(*self, Label::Epsilon | Label::EndOfString)
    }

    /// Returns true if this label matches the given input character.
    pub fn contains(&self, c: char) -> bool {
        match *self {
            Label::Char(x) => x == c,
            Label::Range(lo, hi) => lo <= c && c <= hi,
            Label::Any => true,
            Label::NotIn(ref set) => !set.contains(c),
            Label::Epsilon | Label::EndOfString => false,
        }
    }

    /// Returns true if the two labels are neither ordered before nor after
    /// each other. Equal labels collide.
    pub fn collides(&self, other: &Label) -> bool {
        self.partial_cmp(other).is_none() || self == other
    }

    /// The inclusive bounds of a character label.
    pub(crate) fn bounds(&self) -> Option<(char, char)> {
        match *self {
            Label::Char(c) => Some((c, c)),
            Label::Range(lo, hi) => Some((lo, hi)),
            _ => None,
        }
    }

    /// The set of characters this label consumes, if it consumes any.
    pub(crate) fn to_class(&self) -> Option<ClassUnicode> {
        let class = match *self {
            Label::Char(c) => single(c, c),
            Label::Range(lo, hi) => single(lo, hi),
            Label::Any => single('\0', char::MAX),
            Label::NotIn(ref set) => {
                let mut class = set.to_class();
                class.negate();
                class
            }
            Label::Epsilon | Label::EndOfString => return None,
        };
        Some(class)
    }

    fn rank(&self) -> u8 {
        match *self {
            Label::Any => 0,
            Label::EndOfString => 1,
            Label::Epsilon => 2,
            Label::NotIn(_) => 3,
            Label::Char(_) | Label::Range(..) => 4,
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Label) -> Option<Ordering> {
        match (self.bounds(), other.bounds()) {
            (Some((alo, ahi)), Some((blo, bhi))) => {
                if self == other {
                    Some(Ordering::Equal)
                } else if ahi < blo {
                    Some(Ordering::Less)
                } else if bhi < alo {
                    Some(Ordering::Greater)
                } else {
                    None
                }
            }
            (Some(_), None) => Some(Ordering::Greater),
            (None, Some(_)) => Some(Ordering::Less),
            (None, None) => match (self, other) {
                (Label::NotIn(a), Label::NotIn(b)) => Some(a.cmp(b)),
                _ => Some(self.rank().cmp(&other.rank())),
            },
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Label::Char(c) => write!(f, "'{}'", c.escape_debug()),
            Label::Range(lo, hi) => {
                write!(f, "'{}'-'{}'", lo.escape_debug(), hi.escape_debug())
            }
            Label::Any => f.write_str("."),
            Label::EndOfString => f.write_str("$"),
            Label::Epsilon => f.write_str("ε"),
            Label::NotIn(ref set) => write!(f, "[^{}]", set),
        }
    }
}

/// A finite set of characters stored as sorted, non-adjacent, inclusive
/// ranges.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CharSet {
    ranges: Vec<(char, char)>,
}

impl CharSet {
    /// The set containing no characters.
    pub fn empty() -> CharSet {
        CharSet::default()
    }

    /// Build the union of the given class items.
    pub fn from_items(items: &[ClassItem]) -> CompileResult<CharSet> {
        let mut ranges = Vec::with_capacity(items.len());
        for item in items {
            let (start, end) = item.bounds();
            if start > end {
                return Err(CompileError::invalid_range(start, end));
            }
            ranges.push(ClassUnicodeRange::new(start, end));
        }
        Ok(CharSet::from_class(&ClassUnicode::new(ranges)))
    }

    pub(crate) fn from_class(class: &ClassUnicode) -> CharSet {
        CharSet {
            ranges: class.ranges().iter().map(|r| (r.start(), r.end())).collect(),
        }
    }

    pub(crate) fn to_class(&self) -> ClassUnicode {
        ClassUnicode::new(
            self.ranges.iter().map(|&(lo, hi)| ClassUnicodeRange::new(lo, hi)),
        )
    }

    /// The canonical ranges making up this set.
    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    /// Returns true if the set contains no characters.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns true if `c` is in the set.
    pub fn contains(&self, c: char) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < c {
                    Ordering::Less
                } else if lo > c {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .is_ok()
    }

    /// One label per range, in ascending order.
    pub(crate) fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.ranges.iter().map(|&(lo, hi)| {
            if lo == hi {
                Label::Char(lo)
            } else {
                Label::Range(lo, hi)
            }
        })
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(lo, hi) in &self.ranges {
            if lo == hi {
                write!(f, "{}", lo.escape_debug())?;
            } else {
                write!(f, "{}-{}", lo.escape_debug(), hi.escape_debug())?;
            }
        }
        Ok(())
    }
}

fn single(lo: char, hi: char) -> ClassUnicode {
    ClassUnicode::new([ClassUnicodeRange::new(lo, hi)])
}

/// The next Unicode scalar value after `c`, skipping surrogates.
pub(crate) fn char_succ(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        _ => char::from_u32(u32::from(c) + 1),
    }
}

/// The previous Unicode scalar value before `c`, skipping surrogates.
pub(crate) fn char_pred(c: char) -> Option<char> {
    match c {
        '\u{E000}' => Some('\u{D7FF}'),
        _ => u32::from(c).checked_sub(1).and_then(char::from_u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(lo: char, hi: char) -> Label {
        Label::range(lo, hi).unwrap()
    }

    #[test]
    fn test_less_than() {
        let pairs = [
            (Label::Char('a'), Label::Char('b')),
            (Label::Epsilon, Label::Char('\0')),
            (Label::Epsilon, range('a', 'c')),
            (Label::Any, Label::EndOfString),
            (Label::Any, Label::Epsilon),
            (Label::EndOfString, Label::Epsilon),
            (range('a', 'f'), range('g', 'm')),
            (Label::Char('a'), range('b', 'z')),
            (range('a', 'c'), Label::Char('d')),
            (Label::Epsilon, Label::not_in(&[ClassItem::Char('a')]).unwrap()),
        ];
        for (a, b) in pairs {
            assert!(a < b, "{} < {}", a, b);
            assert!(b > a, "{} > {}", b, a);
            assert!(!a.collides(&b));
        }
    }

    #[test]
    fn test_ish_equal() {
        let pairs = [
            (Label::Char('a'), Label::Char('a')),
            (Label::Epsilon, Label::Epsilon),
            (range('a', 'f'), range('a', 'f')),
            (range('a', 'f'), range('f', 'm')),
            (range('a', 'z'), range('f', 'm')),
            (range('a', 'f'), Label::Char('d')),
            (range('a', 'f'), Label::Char('a')),
            (range('a', 'f'), Label::Char('f')),
        ];
        for (a, b) in pairs {
            assert!(!(a < b), "{} < {}", a, b);
            assert!(!(b < a), "{} < {}", b, a);
            assert!(a.collides(&b));
        }
    }

    #[test]
    fn equal_labels_compare_equal() {
        assert_eq!(
            Label::Char('x').partial_cmp(&Label::Char('x')),
            Some(Ordering::Equal)
        );
        assert_eq!(range('a', 'f').partial_cmp(&range('f', 'm')), None);
    }

    #[test]
    fn range_constructor() {
        assert_eq!(range('a', 'a'), Label::Char('a'));
        assert_eq!(range('a', 'b'), Label::Range('a', 'b'));
        assert!(matches!(
            Label::range('b', 'a'),
            Err(CompileError::InvariantViolation(_))
        ));
    }

    #[test]
    fn contains() {
        let not_vowel = Label::not_in(&[
            ClassItem::Char('a'),
            ClassItem::Char('e'),
            ClassItem::Range('i', 'o'),
        ])
        .unwrap();
        assert!(not_vowel.contains('b'));
        assert!(not_vowel.contains('\u{10FFFF}'));
        assert!(!not_vowel.contains('a'));
        assert!(!not_vowel.contains('k'));
        assert!(Label::Any.contains('\n'));
        assert!(!Label::Epsilon.contains('a'));
        assert!(!Label::EndOfString.contains('a'));
        assert!(range('0', '9').contains('5'));
        assert!(!range('0', '9').contains('a'));
    }

    #[test]
    fn char_set_is_canonical() {
        let set = CharSet::from_items(&[
            ClassItem::Range('d', 'f'),
            ClassItem::Char('a'),
            ClassItem::Range('b', 'c'),
            ClassItem::Char('x'),
        ])
        .unwrap();
        assert_eq!(set.ranges(), &[('a', 'f'), ('x', 'x')]);
        assert_eq!(set.to_string(), "a-fx");
        assert!(CharSet::from_items(&[ClassItem::Range('z', 'a')]).is_err());
    }

    #[test]
    fn not_in_class_is_complement() {
        let label = Label::not_in(&[ClassItem::Range('b', 'y')]).unwrap();
        let class = label.to_class().unwrap();
        let ranges: Vec<(char, char)> =
            class.ranges().iter().map(|r| (r.start(), r.end())).collect();
        assert_eq!(ranges, vec![('\0', 'a'), ('z', char::MAX)]);
        assert!(Label::Epsilon.to_class().is_none());
    }

    #[test]
    fn neighbours_skip_surrogates() {
        assert_eq!(char_succ('a'), Some('b'));
        assert_eq!(char_succ('\u{D7FF}'), Some('\u{E000}'));
        assert_eq!(char_succ(char::MAX), None);
        assert_eq!(char_pred('\u{E000}'), Some('\u{D7FF}'));
        assert_eq!(char_pred('\0'), None);
    }
}
