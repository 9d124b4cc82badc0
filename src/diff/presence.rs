//! Word-presence comparison for versions without a recorded original.

use std::collections::HashSet;

use super::DiffOp;
use super::tokenize::tokenize;

/// Marks every non-whitespace token of `revised` that appears nowhere in
/// `reference` as inserted; everything else is equal.
///
/// The result reconstructs `revised` but carries no deletions.
#[must_use]
pub fn word_presence(reference: &str, revised: &str) -> Vec<DiffOp> {
    let known: HashSet<&str> = tokenize(reference).into_iter().collect();

    let mut ops: Vec<DiffOp> = Vec::new();
    for token in tokenize(revised) {
        let added = !token.trim().is_empty() && !known.contains(token);
        match (ops.last_mut(), added) {
            (Some(DiffOp::Insert(text)), true) | (Some(DiffOp::Equal(text)), false) => {
                text.push_str(token);
            }
            (_, true) => ops.push(DiffOp::Insert(token.to_owned())),
            (_, false) => ops.push(DiffOp::Equal(token.to_owned())),
        }
    }
    ops
}
