use serde::Deserialize;

/// Tunables for join selection. The defaults reproduce the fixed heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nested loop is considered only when the smaller operand has fewer rows.
    pub nested_loop_max_small: usize,
    /// ... and the larger operand is under `ratio * small` rows.
    pub nested_loop_max_ratio: usize,
    /// Use sort-merge when the plan orders by the join key.
    pub sort_merge_on_order_by: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nested_loop_max_small: 100,
            nested_loop_max_ratio: 10,
            sort_merge_on_order_by: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
