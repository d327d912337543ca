//! Fixpoint evaluation of recursive common table expressions.

use acta_ir::Span;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::errors::{fail, ControlFlow, EvalErrorKind};
use crate::value::hash_key;
use crate::Value;

/// Iterate a recursive query to its fixpoint.
///
/// `anchor` seeds both the result and the working set. Each iteration hands
/// the working set to `step` and keeps what it returns as the next working
/// set. With `union_all == false` rows already produced are discarded, so
/// the working set only ever holds new rows. The loop stops when an
/// iteration adds nothing; needing more than `limit` iterations is an error.
pub fn fixpoint<F>(
    name: &str,
    anchor: Vec<Vec<Value>>,
    union_all: bool,
    limit: usize,
    span: Span,
    mut step: F,
) -> Result<Vec<Vec<Value>>, ControlFlow>
where
    F: FnMut(&[Vec<Value>]) -> Result<Vec<Vec<Value>>, ControlFlow>,
{
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut keep = |row: &[Value]| union_all || seen.insert(hash_key(row));

    let mut result = Vec::new();
    let mut working = Vec::new();
    for row in anchor {
        if keep(&row) {
            result.push(row.clone());
            working.push(row);
        }
    }

    let mut iterations = 0;
    while !working.is_empty() {
        if iterations == limit {
            return fail(
                EvalErrorKind::RecursionLimit {
                    name: name.to_string(),
                    limit,
                },
                span,
            );
        }
        iterations += 1;

        let mut next = Vec::new();
        for row in step(&working)? {
            if keep(&row) {
                result.push(row.clone());
                next.push(row);
            }
        }
        trace!(cte = name, iteration = iterations, added = next.len(), "recursive step");
        working = next;
    }
    Ok(result)
}
