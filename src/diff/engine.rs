//! Myers alignment over diff tokens followed by readability cleanup.

use std::collections::VecDeque;

use similar::{Algorithm, DiffTag, capture_diff_slices};

use super::DiffOp;
use super::tokenize::{is_word, tokenize};

/// Aligned run of tokens: unchanged, or one change region.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Equal(VecDeque<&'a str>),
    Change {
        deleted: VecDeque<&'a str>,
        inserted: VecDeque<&'a str>,
    },
}

impl<'a> Segment<'a> {
    fn is_empty(&self) -> bool {
        match self {
            Self::Equal(tokens) => tokens.is_empty(),
            Self::Change { deleted, inserted } => deleted.is_empty() && inserted.is_empty(),
        }
    }

    const fn same_kind(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Equal(_), Self::Equal(_)) | (Self::Change { .. }, Self::Change { .. })
        )
    }

    fn absorb(&mut self, other: Self) {
        match (self, other) {
            (Self::Equal(tokens), Self::Equal(more)) => tokens.extend(more),
            (
                Self::Change { deleted, inserted },
                Self::Change {
                    deleted: more_deleted,
                    inserted: more_inserted,
                },
            ) => {
                deleted.extend(more_deleted);
                inserted.extend(more_inserted);
            }
            _ => {}
        }
    }
}

/// Computes an edit script turning `original` into `revised`.
///
/// Equal and deleted spans concatenate to `original`; equal and inserted
/// spans concatenate to `revised`. Within a change region the deletion is
/// emitted before the insertion.
#[must_use]
pub fn diff(original: &str, revised: &str) -> Vec<DiffOp> {
    let old_tokens = tokenize(original);
    let new_tokens = tokenize(revised);

    let aligned = align(&old_tokens, &new_tokens);
    let shifted = normalise(shift_boundaries(normalise(aligned)));
    emit(normalise(absorb_short_equalities(shifted)))
}

fn align<'a>(old_tokens: &[&'a str], new_tokens: &[&'a str]) -> Vec<Segment<'a>> {
    let slice = |tokens: &[&'a str], range: std::ops::Range<usize>| -> VecDeque<&'a str> {
        tokens.get(range).unwrap_or_default().iter().copied().collect()
    };

    capture_diff_slices(Algorithm::Myers, old_tokens, new_tokens)
        .iter()
        .map(|op| match op.tag() {
            DiffTag::Equal => Segment::Equal(slice(old_tokens, op.old_range())),
            DiffTag::Delete => Segment::Change {
                deleted: slice(old_tokens, op.old_range()),
                inserted: VecDeque::new(),
            },
            DiffTag::Insert => Segment::Change {
                deleted: VecDeque::new(),
                inserted: slice(new_tokens, op.new_range()),
            },
            DiffTag::Replace => Segment::Change {
                deleted: slice(old_tokens, op.old_range()),
                inserted: slice(new_tokens, op.new_range()),
            },
        })
        .collect()
}

/// Drops empty segments and merges neighbours of the same kind, so
/// equalities and change regions strictly alternate.
fn normalise<'a>(segments: Vec<Segment<'a>>) -> Vec<Segment<'a>> {
    let mut output: Vec<Segment<'a>> = Vec::with_capacity(segments.len());
    for segment in segments.into_iter().filter(|segment| !segment.is_empty()) {
        if let Some(previous) = output.last_mut()
            && previous.same_kind(&segment)
        {
            previous.absorb(segment);
        } else {
            output.push(segment);
        }
    }
    output
}

/// Slides pure insertions and deletions rightwards while their first token
/// equals the first token of the following equality.
fn shift_boundaries<'a>(segments: Vec<Segment<'a>>) -> Vec<Segment<'a>> {
    let mut output: Vec<Segment<'a>> = Vec::with_capacity(segments.len());
    let mut pending = segments.into_iter().peekable();

    while let Some(segment) = pending.next() {
        let (deleted, inserted) = match segment {
            Segment::Change { deleted, inserted } if deleted.is_empty() != inserted.is_empty() => {
                (deleted, inserted)
            }
            other => {
                output.push(other);
                continue;
            }
        };

        let is_insertion = deleted.is_empty();
        let mut change = if is_insertion { inserted } else { deleted };
        let mut carried = VecDeque::new();
        if let Some(Segment::Equal(following)) = pending.peek_mut() {
            while change.front().is_some() && change.front() == following.front() {
                if let (Some(moved), Some(next)) = (change.pop_front(), following.pop_front()) {
                    carried.push_back(moved);
                    change.push_back(next);
                }
            }
        }

        output.push(Segment::Equal(carried));
        output.push(if is_insertion {
            Segment::Change {
                deleted: VecDeque::new(),
                inserted: change,
            }
        } else {
            Segment::Change {
                deleted: change,
                inserted: VecDeque::new(),
            }
        });
    }
    output
}

fn char_len(tokens: &VecDeque<&str>) -> usize {
    tokens.iter().map(|token| token.chars().count()).sum()
}

fn is_trivial(tokens: &VecDeque<&str>) -> bool {
    tokens.iter().all(|token| !is_word(token))
}

fn change_len(deleted: &VecDeque<&str>, inserted: &VecDeque<&str>) -> usize {
    char_len(deleted).max(char_len(inserted))
}

/// Absorbs equalities sandwiched between two change regions when they are
/// no longer than the smaller neighbour, or contain no words at all.
///
/// Runs until no further equality qualifies.
fn absorb_short_equalities<'a>(segments: Vec<Segment<'a>>) -> Vec<Segment<'a>> {
    let mut current = segments;
    loop {
        let before = current.len();
        current = absorb_pass(current);
        if current.len() == before {
            return current;
        }
    }
}

fn absorb_pass<'a>(segments: Vec<Segment<'a>>) -> Vec<Segment<'a>> {
    let mut output: Vec<Segment<'a>> = Vec::with_capacity(segments.len());
    let mut pending = segments.into_iter().peekable();

    while let Some(segment) = pending.next() {
        let equal = match segment {
            Segment::Equal(equal) => equal,
            other => {
                output.push(other);
                continue;
            }
        };

        let absorbable = match (output.last(), pending.peek()) {
            (
                Some(Segment::Change {
                    deleted: left_deleted,
                    inserted: left_inserted,
                }),
                Some(Segment::Change {
                    deleted: right_deleted,
                    inserted: right_inserted,
                }),
            ) => {
                let shorter = change_len(left_deleted, left_inserted)
                    .min(change_len(right_deleted, right_inserted));
                is_trivial(&equal) || char_len(&equal) <= shorter
            }
            _ => false,
        };

        if !absorbable {
            output.push(Segment::Equal(equal));
            continue;
        }

        if let (
            Some(Segment::Change {
                deleted: left_deleted,
                inserted: left_inserted,
            }),
            Some(Segment::Change {
                deleted: right_deleted,
                inserted: right_inserted,
            }),
        ) = (output.last_mut(), pending.next())
        {
            left_deleted.extend(equal.iter().copied());
            left_deleted.extend(right_deleted);
            left_inserted.extend(equal);
            left_inserted.extend(right_inserted);
        }
    }
    output
}

fn emit(segments: Vec<Segment<'_>>) -> Vec<DiffOp> {
    let concat = |tokens: VecDeque<&str>| tokens.into_iter().collect::<String>();
    let mut ops = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Equal(tokens) => ops.push(DiffOp::Equal(concat(tokens))),
            Segment::Change { deleted, inserted } => {
                if !deleted.is_empty() {
                    ops.push(DiffOp::Delete(concat(deleted)));
                }
                if !inserted.is_empty() {
                    ops.push(DiffOp::Insert(concat(inserted)));
                }
            }
        }
    }
    ops
}
