pub mod evaluator;
pub mod executor;
pub mod join;
pub mod layout;
pub mod plan;
pub mod planner;
pub mod where_clause;

pub use evaluator::{BasicEvaluator, ExpressionEvaluator};
pub use executor::{Executor, Relation};
pub use join::{
    executor_for, select_algorithm, HashJoin, JoinAlgorithm, JoinExecutor, JoinInput, JoinSide,
    NestedLoopJoin, SortMergeJoin,
};
pub use layout::{Layout, LayoutColumn};
pub use plan::{JoinStep, OrderBy, Plan, PlanStep, QueryResult};
pub use planner::{access_path_rows, plan_access_path};
pub use where_clause::{CompareOp, Literal, Operand, WhereClause};
