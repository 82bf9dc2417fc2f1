use crate::query::QueryResult;
use crate::storage::BulkLoadReport;
use crate::types::value::value_to_string;

/// Formats a query result as a tab-separated table
pub fn format_result(result: &QueryResult) -> String {
    let header = result.columns.join("\t");

    // If no rows, return just the header
    if result.rows.is_empty() {
        return header;
    }

    let row_lines = result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(value_to_string)
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n{}", header, row_lines)
}

/// One summary line plus one line per skipped row.
pub fn format_load_report(table: &str, report: &BulkLoadReport) -> String {
    let mut out = format!(
        "loaded {} rows into {} ({} skipped)",
        report.inserted,
        table,
        report.skipped.len()
    );
    for skip in &report.skipped {
        out.push_str(&format!("\nrow {}: {}", skip.row_number, skip.error));
    }
    out
}
