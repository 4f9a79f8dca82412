//! Refinement of overlapping labels into disjoint label classes.
//!
//! Both determinization and minimization need an alphabet on which a group
//! of transition tables behaves uniformly: every class must lie either
//! wholly inside or wholly outside each label of each table. [`refine`]
//! computes the coarsest such alphabet for a list of labelled entries.

use std::collections::{BTreeMap, BTreeSet};

use regex_syntax::hir::{ClassUnicode, ClassUnicodeRange};

use crate::label::{char_pred, char_succ, CharSet, Label};

/// A set of input symbols that a group of transition tables treats alike.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LabelClass {
    /// The end of the input.
    EndOfString,
    /// A non-empty set of characters.
    Chars(CharSet),
}

impl LabelClass {
    /// The table labels that together cover exactly this class, one per
    /// contiguous range.
    pub fn labels(&self) -> Vec<Label> {
        match self {
            LabelClass::EndOfString => vec![Label::EndOfString],
            LabelClass::Chars(set) => set.labels().collect(),
        }
    }
}

/// Split the labels of `entries` into disjoint classes.
///
/// Each class is paired with the union of the payloads of every entry whose
/// label covers it. Character pieces covered by the same entries are merged
/// into one class, even when they are not contiguous. `Epsilon` entries are
/// ignored and `EndOfString` entries form a class of their own.
///
/// Classes are returned with `EndOfString` first and the character classes
/// ordered by their lowest character.
pub fn refine<'a, T, I>(entries: I) -> Vec<(LabelClass, BTreeSet<T>)>
where
    T: Ord + Clone + 'a,
    I: IntoIterator<Item = (&'a Label, &'a BTreeSet<T>)>,
{
    let mut end_payload = BTreeSet::new();
    let mut sets: Vec<(CharSet, &BTreeSet<T>)> = vec![];
    for (label, payload) in entries {
        if *label == Label::EndOfString {
            end_payload.extend(payload.iter().cloned());
        } else if let Some(class) = label.to_class() {
            sets.push((CharSet::from_class(&class), payload));
        }
    }

    // Every character class starts at a boundary and ends just before the
    // next one.
    let mut boundaries: Vec<char> = sets
        .iter()
        .flat_map(|(set, _)| set.ranges())
        .flat_map(|&(lo, hi)| std::iter::once(lo).chain(char_succ(hi)))
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut pieces: BTreeMap<BTreeSet<T>, Vec<ClassUnicodeRange>> =
        BTreeMap::new();
    for (i, &start) in boundaries.iter().enumerate() {
        let end = match boundaries.get(i + 1) {
            Some(&next) => char_pred(next).unwrap_or(start),
            None => char::MAX,
        };
        let payload: BTreeSet<T> = sets
            .iter()
            .filter(|(set, _)| set.contains(start))
            .flat_map(|(_, payload)| payload.iter().cloned())
            .collect();
        if payload.is_empty() {
            continue;
        }
        pieces
            .entry(payload)
            .or_default()
            .push(ClassUnicodeRange::new(start, end));
    }

    let mut classes: Vec<(CharSet, BTreeSet<T>)> = pieces
        .into_iter()
        .map(|(payload, ranges)| {
            (CharSet::from_class(&ClassUnicode::new(ranges)), payload)
        })
        .collect();
    classes.sort_by_key(|(set, _)| set.ranges().first().map(|&(lo, _)| lo));

    let mut refined = Vec::with_capacity(classes.len() + 1);
    if !end_payload.is_empty() {
        refined.push((LabelClass::EndOfString, end_payload));
    }
    refined.extend(
        classes.into_iter().map(|(set, payload)| (LabelClass::Chars(set), payload)),
    );
    refined
}

#[cfg(test)]
mod tests {
    use re_automata_syntax::ClassItem;

    use super::*;

    fn set(ids: &[usize]) -> BTreeSet<usize> {
        ids.iter().copied().collect()
    }

    fn chars(ranges: &[(char, char)]) -> LabelClass {
        let items: Vec<ClassItem> =
            ranges.iter().map(|&(lo, hi)| ClassItem::Range(lo, hi)).collect();
        LabelClass::Chars(CharSet::from_items(&items).unwrap())
    }

    fn refine_all(entries: &[(Label, BTreeSet<usize>)]) -> Vec<(LabelClass, BTreeSet<usize>)> {
        refine(entries.iter().map(|(l, p)| (l, p)))
    }

    #[test]
    fn disjoint_labels_stay_apart() {
        let refined = refine_all(&[
            (Label::Char('a'), set(&[1])),
            (Label::Range('x', 'z'), set(&[2])),
        ]);
        assert_eq!(
            refined,
            vec![(chars(&[('a', 'a')]), set(&[1])), (chars(&[('x', 'z')]), set(&[2]))]
        );
    }

    #[test]
    fn overlaps_are_split() {
        let refined = refine_all(&[
            (Label::Range('a', 'm'), set(&[1])),
            (Label::Range('f', 'z'), set(&[2])),
        ]);
        assert_eq!(
            refined,
            vec![
                (chars(&[('a', 'e')]), set(&[1])),
                (chars(&[('f', 'm')]), set(&[1, 2])),
                (chars(&[('n', 'z')]), set(&[2])),
            ]
        );
    }

    #[test]
    fn equal_payloads_merge() {
        let refined = refine_all(&[
            (Label::Char('a'), set(&[1])),
            (Label::Char('c'), set(&[1])),
            (Label::Char('b'), set(&[2])),
        ]);
        assert_eq!(
            refined,
            vec![
                (chars(&[('a', 'a'), ('c', 'c')]), set(&[1])),
                (chars(&[('b', 'b')]), set(&[2])),
            ]
        );
        assert_eq!(
            refined[0].0.labels(),
            vec![Label::Char('a'), Label::Char('c')]
        );
    }

    #[test]
    fn symbolic_labels() {
        let not_b = Label::not_in(&[ClassItem::Char('b')]).unwrap();
        let refined = refine_all(&[
            (Label::Epsilon, set(&[9])),
            (Label::EndOfString, set(&[8])),
            (Label::Any, set(&[1])),
            (not_b, set(&[2])),
        ]);
        assert_eq!(
            refined,
            vec![
                (LabelClass::EndOfString, set(&[8])),
                (chars(&[('\0', 'a'), ('c', char::MAX)]), set(&[1, 2])),
                (chars(&[('b', 'b')]), set(&[1])),
            ]
        );
    }

    #[test]
    fn ranges_span_the_surrogate_gap() {
        let refined = refine_all(&[
            (Label::Any, set(&[1])),
            (Label::Range('\u{D000}', '\u{E010}'), set(&[2])),
        ]);
        assert_eq!(
            refined,
            vec![
                (chars(&[('\0', '\u{CFFF}'), ('\u{E011}', char::MAX)]), set(&[1])),
                (chars(&[('\u{D000}', '\u{D7FF}'), ('\u{E000}', '\u{E010}')]), set(&[1, 2])),
            ]
        );
        assert_eq!(refined[1].0.labels(), vec![Label::Range('\u{D000}', '\u{E010}')]);
    }

    #[test]
    fn empty_input() {
        assert!(refine_all(&[]).is_empty());
        assert!(refine_all(&[(Label::Epsilon, set(&[1]))]).is_empty());
    }
}
