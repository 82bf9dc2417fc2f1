//! Drives a plan step by step: scan (through the access-path planner),
//! joins left to right, filter, project, and the final ordering.

use std::collections::HashMap;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::query::evaluator::ExpressionEvaluator;
use crate::query::join::{executor_for, select_algorithm, JoinInput};
use crate::query::layout::Layout;
use crate::query::plan::{JoinStep, OrderBy, Plan, PlanStep, QueryResult};
use crate::query::planner::access_path_rows;
use crate::query::where_clause::WhereClause;
use crate::storage::{Catalog, Table};
use crate::types::Row;

/// An intermediate result: rows plus the layout describing their columns.
#[derive(Debug, Clone, Default)]
pub struct Relation {
    pub layout: Layout,
    pub rows: Vec<Row>,
}

pub struct Executor<'a> {
    catalog: &'a Catalog,
    config: &'a EngineConfig,
    evaluator: &'a dyn ExpressionEvaluator,
}

impl<'a> Executor<'a> {
    pub fn new(
        catalog: &'a Catalog,
        config: &'a EngineConfig,
        evaluator: &'a dyn ExpressionEvaluator,
    ) -> Self {
        Self {
            catalog,
            config,
            evaluator,
        }
    }

    pub fn execute(&self, plan: &Plan) -> Result<QueryResult> {
        if plan.steps.is_empty() {
            return Err(EngineError::Execution("plan has no steps".to_string()));
        }

        let mut results: HashMap<String, Relation> = HashMap::new();
        let mut last = Relation::default();
        for step in &plan.steps {
            last = self.run_step(step, plan.order_by.as_ref(), &results)?;
            results.insert(step.name.clone(), last.clone());
        }

        if let Some(order) = &plan.order_by {
            sort_relation(&mut last, order)?;
        }
        Ok(QueryResult {
            columns: last.layout.output_names(),
            rows: last.rows,
        })
    }

    fn run_step(
        &self,
        step: &PlanStep,
        order_by: Option<&OrderBy>,
        earlier: &HashMap<String, Relation>,
    ) -> Result<Relation> {
        let mut relation = match earlier.get(&step.name) {
            Some(previous) => previous.clone(),
            None => {
                let table = self.catalog.table(&step.name)?;
                // Index narrowing only applies to single-table steps.
                let narrowed = if step.joins.is_empty() {
                    access_path_rows(step.condition.as_ref(), table)
                } else {
                    None
                };
                Relation {
                    layout: Layout::from_schema(step.qualifier(), table.schema()),
                    rows: narrowed.unwrap_or_else(|| table.rows().cloned().collect()),
                }
            }
        };

        for join in &step.joins {
            relation = self.run_join(relation, join, order_by)?;
        }

        if let Some(condition) = &step.condition {
            relation.rows = self.filter(condition, &relation.layout, relation.rows)?;
        }

        if let Some(projections) = &step.projections {
            let (layout, rows) =
                self.evaluator
                    .project(step.qualifier(), projections, &relation.layout, relation.rows)?;
            relation = Relation { layout, rows };
        }
        Ok(relation)
    }

    fn run_join(&self, left: Relation, join: &JoinStep, order_by: Option<&OrderBy>) -> Result<Relation> {
        let table: &Table = self.catalog.table(&join.table)?;
        let right_layout = Layout::from_schema(join.qualifier(), table.schema());
        let right_rows: Vec<Row> = table.rows().cloned().collect();

        let (left_key, right_key) = resolve_keys(&left.layout, &right_layout, join)?;
        let ordered_on_key = order_by.is_some_and(|o| {
            orders_by_key(o, &left.layout, &left_key) || orders_by_key(o, &right_layout, &right_key)
        });

        let algorithm = select_algorithm(
            self.config,
            left.rows.len(),
            right_rows.len(),
            join.side,
            ordered_on_key,
        );
        debug!(
            table = %join.table,
            ?algorithm,
            left_rows = left.rows.len(),
            right_rows = right_rows.len(),
            "query.join.select"
        );

        let rows = executor_for(algorithm).join(
            JoinInput::new(&left.rows, left.layout.width(), &left_key),
            JoinInput::new(&right_rows, right_layout.width(), &right_key),
            join.side,
        )?;
        let layout = left.layout.join(&right_layout);

        let rows = match &join.condition {
            Some(condition) => self.filter(condition, &layout, rows)?,
            None => rows,
        };
        Ok(Relation { layout, rows })
    }

    fn filter(&self, condition: &WhereClause, layout: &Layout, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if self.evaluator.matches(condition, layout, &row)? {
                kept.push(row);
            }
        }
        Ok(kept)
    }
}

/// Key column positions on both sides; the paired columns must share a type.
fn resolve_keys(left: &Layout, right: &Layout, join: &JoinStep) -> Result<(Vec<usize>, Vec<usize>)> {
    if join.source_key.is_empty() || join.source_key.len() != join.join_key.len() {
        return Err(EngineError::Join(format!(
            "join with '{}' needs key lists of equal, non-zero length",
            join.table
        )));
    }

    let left_key = join
        .source_key
        .iter()
        .map(|c| left.resolve(c, "JOIN"))
        .collect::<Result<Vec<_>>>()?;
    let right_key = join
        .join_key
        .iter()
        .map(|c| right.resolve(c, "JOIN"))
        .collect::<Result<Vec<_>>>()?;

    for (&l, &r) in left_key.iter().zip(&right_key) {
        let (Some(lc), Some(rc)) = (left.column(l), right.column(r)) else {
            continue;
        };
        if let (Some(lt), Some(rt)) = (&lc.dtype, &rc.dtype)
            && !lt.same_kind(rt)
        {
            return Err(EngineError::Join(format!(
                "cannot join {}.{} ({lt}) with {}.{} ({rt})",
                lc.table, lc.name, rc.table, rc.name
            )));
        }
    }
    Ok((left_key, right_key))
}

/// True when the ordering column is the single key column of this side.
fn orders_by_key(order: &OrderBy, layout: &Layout, key: &[usize]) -> bool {
    match key {
        [only] => layout.resolve(&order.column, "ORDER BY").is_ok_and(|idx| idx == *only),
        _ => false,
    }
}

fn sort_relation(relation: &mut Relation, order: &OrderBy) -> Result<()> {
    let idx = relation.layout.resolve(&order.column, "ORDER BY")?;
    relation.rows.sort_by(|a, b| {
        let ord = a[idx].cmp(&b[idx]);
        if order.descending { ord.reverse() } else { ord }
    });
    Ok(())
}
