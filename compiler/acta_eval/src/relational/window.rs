//! Ranking window functions.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::operators::sort_order;
use crate::value::hash_key;
use crate::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RankingFunction {
    RowNumber,
    Rank,
    DenseRank,
}

impl RankingFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "row_number" => Some(RankingFunction::RowNumber),
            "rank" => Some(RankingFunction::Rank),
            "dense_rank" => Some(RankingFunction::DenseRank),
            _ => None,
        }
    }
}

/// Per-row inputs of one window: the partition key and the ordering key.
#[derive(Clone, Debug, Default)]
pub struct WindowKeys {
    pub partition: Vec<Value>,
    pub order: Vec<Value>,
}

fn compare_keys(a: &[Value], b: &[Value], descending: &[bool]) -> Ordering {
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        let ordering = sort_order(x, y);
        let ordering = if descending.get(i).copied().unwrap_or(false) {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Rank every row within its partition. The result is aligned with `rows`.
///
/// Rows with equal ordering keys are peers: `rank` gives peers the same
/// number and leaves gaps, `dense_rank` leaves none, `row_number` numbers
/// peers in input order.
pub fn rank_rows(function: RankingFunction, rows: &[WindowKeys], descending: &[bool]) -> Vec<i64> {
    let mut partitions: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    let mut partition_order = Vec::new();
    for (i, keys) in rows.iter().enumerate() {
        let key = hash_key(&keys.partition);
        partitions
            .entry(key)
            .or_insert_with_key(|key| {
                partition_order.push(key.clone());
                Vec::new()
            })
            .push(i);
    }

    let mut ranks = vec![0_i64; rows.len()];
    for key in &partition_order {
        let Some(members) = partitions.get_mut(key) else {
            continue;
        };
        members.sort_by(|&a, &b| compare_keys(&rows[a].order, &rows[b].order, descending));

        let (mut rank, mut dense) = (0_i64, 0_i64);
        let mut previous: Option<usize> = None;
        for (position, &row) in (1_i64..).zip(members.iter()) {
            let peer = previous.is_some_and(|p| {
                compare_keys(&rows[p].order, &rows[row].order, descending).is_eq()
            });
            if !peer {
                rank = position;
                dense += 1;
            }
            ranks[row] = match function {
                RankingFunction::RowNumber => position,
                RankingFunction::Rank => rank,
                RankingFunction::DenseRank => dense,
            };
            previous = Some(row);
        }
    }
    ranks
}
