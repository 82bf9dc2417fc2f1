//! Equi-join algorithms and the rule that picks one per join step.
//!
//! Every executor emits rows as `left columns ++ right columns`, whichever
//! operand drives its outer loop. Rows whose key contains a null never match.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::trace;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::types::Row;
use crate::types::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum JoinSide {
    #[default]
    #[serde(alias = "INNER", alias = "inner")]
    Inner,
    #[serde(alias = "LEFT", alias = "left")]
    Left,
    #[serde(alias = "RIGHT", alias = "right")]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAlgorithm {
    SortMerge,
    NestedLoop,
    Hash,
}

/// One join operand: its rows, its width and the positions of its key columns.
#[derive(Debug, Clone, Copy)]
pub struct JoinInput<'a> {
    pub rows: &'a [Row],
    pub width: usize,
    pub key: &'a [usize],
}

impl<'a> JoinInput<'a> {
    pub fn new(rows: &'a [Row], width: usize, key: &'a [usize]) -> Self {
        Self { rows, width, key }
    }
}

pub trait JoinExecutor {
    fn algorithm(&self) -> JoinAlgorithm;

    fn join(&self, left: JoinInput<'_>, right: JoinInput<'_>, side: JoinSide) -> Result<Vec<Row>>;
}

/// Picks the algorithm for one join step from the operand sizes.
///
/// Sort-merge wins when the query orders by the join key, nested loop when
/// both operands are small and of similar size, hash join otherwise. Only
/// hash join handles outer sides.
pub fn select_algorithm(
    config: &EngineConfig,
    left_rows: usize,
    right_rows: usize,
    side: JoinSide,
    ordered_on_key: bool,
) -> JoinAlgorithm {
    if side != JoinSide::Inner {
        return JoinAlgorithm::Hash;
    }
    if ordered_on_key && config.sort_merge_on_order_by {
        return JoinAlgorithm::SortMerge;
    }
    let small = left_rows.min(right_rows);
    let large = left_rows.max(right_rows);
    if small < config.nested_loop_max_small && large < config.nested_loop_max_ratio.saturating_mul(small) {
        return JoinAlgorithm::NestedLoop;
    }
    JoinAlgorithm::Hash
}

/// Single dispatch point from an algorithm to its executor.
pub fn executor_for(algorithm: JoinAlgorithm) -> &'static dyn JoinExecutor {
    match algorithm {
        JoinAlgorithm::SortMerge => &SortMergeJoin,
        JoinAlgorithm::NestedLoop => &NestedLoopJoin,
        JoinAlgorithm::Hash => &HashJoin,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SortMergeJoin;

impl JoinExecutor for SortMergeJoin {
    fn algorithm(&self) -> JoinAlgorithm {
        JoinAlgorithm::SortMerge
    }

    fn join(&self, left: JoinInput<'_>, right: JoinInput<'_>, side: JoinSide) -> Result<Vec<Row>> {
        require_inner(side, "sort-merge")?;
        let left_keys = key_tuples(left)?;
        let right_keys = key_tuples(right)?;
        ensure_comparable(&left_keys, &right_keys)?;

        let left_order = sorted_positions(&left_keys);
        let right_order = sorted_positions(&right_keys);

        let mut out: Vec<Row> = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        while i < left_order.len() && j < right_order.len() {
            let lk = key_at(&left_keys, left_order[i]);
            let rk = key_at(&right_keys, right_order[j]);
            match lk.cmp(rk) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    let i_end = run_end(&left_keys, &left_order, i);
                    let j_end = run_end(&right_keys, &right_order, j);
                    for &l in &left_order[i..i_end] {
                        for &r in &right_order[j..j_end] {
                            out.push(concat(&left.rows[l], &right.rows[r]));
                        }
                    }
                    i = i_end;
                    j = j_end;
                }
            }
        }
        trace!(rows = out.len(), "query.join.sort_merge");
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NestedLoopJoin;

impl JoinExecutor for NestedLoopJoin {
    fn algorithm(&self) -> JoinAlgorithm {
        JoinAlgorithm::NestedLoop
    }

    fn join(&self, left: JoinInput<'_>, right: JoinInput<'_>, side: JoinSide) -> Result<Vec<Row>> {
        require_inner(side, "nested-loop")?;
        let left_keys = key_tuples(left)?;
        let right_keys = key_tuples(right)?;
        ensure_comparable(&left_keys, &right_keys)?;

        // The smaller operand drives the outer loop.
        let left_outer = left.rows.len() < right.rows.len();
        let (outer_keys, inner_keys) = if left_outer {
            (&left_keys, &right_keys)
        } else {
            (&right_keys, &left_keys)
        };

        let mut out: Vec<Row> = Vec::new();
        for (o, outer_key) in outer_keys.iter().enumerate() {
            let Some(outer_key) = outer_key else { continue };
            for (n, inner_key) in inner_keys.iter().enumerate() {
                if inner_key.as_ref() != Some(outer_key) {
                    continue;
                }
                let (l, r) = if left_outer { (o, n) } else { (n, o) };
                out.push(concat(&left.rows[l], &right.rows[r]));
            }
        }
        trace!(rows = out.len(), left_outer, "query.join.nested_loop");
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HashJoin;

impl JoinExecutor for HashJoin {
    fn algorithm(&self) -> JoinAlgorithm {
        JoinAlgorithm::Hash
    }

    fn join(&self, left: JoinInput<'_>, right: JoinInput<'_>, side: JoinSide) -> Result<Vec<Row>> {
        let left_keys = key_tuples(left)?;
        let right_keys = key_tuples(right)?;
        ensure_comparable(&left_keys, &right_keys)?;

        // Build over the smaller operand, probe with the larger one.
        let build_left = left.rows.len() < right.rows.len();
        let (build_keys, probe_keys) = if build_left {
            (&left_keys, &right_keys)
        } else {
            (&right_keys, &left_keys)
        };

        let mut table: HashMap<&[Value], Vec<usize>> = HashMap::new();
        for (pos, key) in build_keys.iter().enumerate() {
            if let Some(key) = key {
                table.entry(key.as_slice()).or_default().push(pos);
            }
        }

        let preserve_probe = matches!(
            (side, build_left),
            (JoinSide::Left, false) | (JoinSide::Right, true)
        );
        let mut build_matched: HashSet<usize> = HashSet::new();
        let mut out: Vec<Row> = Vec::new();

        for (p, key) in probe_keys.iter().enumerate() {
            let matches = key.as_deref().and_then(|k| table.get(k));
            match matches {
                Some(positions) => {
                    for &b in positions {
                        build_matched.insert(b);
                        let (l, r) = if build_left { (b, p) } else { (p, b) };
                        out.push(concat(&left.rows[l], &right.rows[r]));
                    }
                }
                None if preserve_probe => {
                    out.push(pad(side, left, right, p));
                }
                None => {}
            }
        }

        let preserve_build = matches!(
            (side, build_left),
            (JoinSide::Left, true) | (JoinSide::Right, false)
        );
        if preserve_build {
            for b in 0..build_keys.len() {
                if !build_matched.contains(&b) {
                    out.push(pad(side, left, right, b));
                }
            }
        }
        trace!(rows = out.len(), build_left, "query.join.hash");
        Ok(out)
    }
}

fn require_inner(side: JoinSide, name: &str) -> Result<()> {
    if side == JoinSide::Inner {
        Ok(())
    } else {
        Err(EngineError::Join(format!("{name} join supports inner joins only")))
    }
}

/// Key tuple per row, `None` when any key component is null.
fn key_tuples(input: JoinInput<'_>) -> Result<Vec<Option<Vec<Value>>>> {
    input
        .rows
        .iter()
        .map(|row| {
            let mut key = Vec::with_capacity(input.key.len());
            for &idx in input.key {
                let cell = row
                    .get(idx)
                    .ok_or_else(|| EngineError::Join(format!("key column {idx} is out of range")))?;
                if cell.is_null() {
                    return Ok(None);
                }
                key.push(cell.clone());
            }
            Ok(Some(key))
        })
        .collect()
}

/// Every key component must hold one type across both operands.
fn ensure_comparable(left: &[Option<Vec<Value>>], right: &[Option<Vec<Value>>]) -> Result<()> {
    let mut expected: Vec<Option<&Value>> = Vec::new();
    for key in left.iter().chain(right).flatten() {
        if expected.is_empty() {
            expected = vec![None; key.len()];
        }
        if key.len() != expected.len() {
            return Err(EngineError::Join("join keys have different arity".to_string()));
        }
        for (slot, value) in expected.iter_mut().zip(key) {
            match *slot {
                Some(seen) if !seen.comparable_with(value) => {
                    return Err(EngineError::Join(format!(
                        "cannot compare {} key with {} key",
                        seen.type_name(),
                        value.type_name()
                    )));
                }
                Some(_) => {}
                None => *slot = Some(value),
            }
        }
    }
    Ok(())
}

/// Positions of non-null keys, stably sorted ascending by key.
fn sorted_positions(keys: &[Option<Vec<Value>>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).filter(|&i| keys[i].is_some()).collect();
    order.sort_by(|&a, &b| key_at(keys, a).cmp(key_at(keys, b)));
    order
}

fn key_at(keys: &[Option<Vec<Value>>], pos: usize) -> &[Value] {
    keys[pos].as_deref().unwrap_or(&[])
}

fn run_end(keys: &[Option<Vec<Value>>], order: &[usize], start: usize) -> usize {
    let key = key_at(keys, order[start]);
    let mut end = start + 1;
    while end < order.len() && key_at(keys, order[end]) == key {
        end += 1;
    }
    end
}

fn concat(left: &Row, right: &Row) -> Row {
    let mut row = Vec::with_capacity(left.len() + right.len());
    row.extend(left.iter().cloned());
    row.extend(right.iter().cloned());
    row
}

/// Preserved-side row padded with nulls for the missing operand.
fn pad(side: JoinSide, left: JoinInput<'_>, right: JoinInput<'_>, pos: usize) -> Row {
    match side {
        JoinSide::Right => {
            let mut row = vec![Value::Null; left.width];
            row.extend(right.rows[pos].iter().cloned());
            row
        }
        _ => {
            let mut row = left.rows[pos].clone();
            row.extend(std::iter::repeat_n(Value::Null, right.width));
            row
        }
    }
}
