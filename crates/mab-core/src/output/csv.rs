//! CSV encoding of the export tables.
//!
//! History tables are indexed by `round_num` with one column per agent id.
//! Absent optional parameters are written as empty cells.

use mab_events::{AgentMetadata, EnvironmentRow, HistoryTable, NetworkEdge};
use std::fmt::Display;

fn optional<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Cells never contain separators except for free-form names.
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push_str(&cells.join(","));
    out.push('\n');
}

/// Round-by-agent table. Option ids are written as bare integers.
pub fn history_table<T: CsvCell>(table: &HistoryTable<T>) -> String {
    let mut out = String::new();
    let mut header = vec!["round_num".to_string()];
    header.extend(table.agent_ids.iter().map(|id| id.0.to_string()));
    push_row(&mut out, &header);

    for (round, row) in table.rows.iter().enumerate() {
        let mut cells = vec![round.to_string()];
        cells.extend(row.iter().map(T::cell));
        push_row(&mut out, &cells);
    }
    out
}

pub fn environment(rows: &[EnvironmentRow]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &[
            "regime_index",
            "regime_start_round",
            "option_id",
            "family",
            "mean",
            "std",
            "value",
        ]
        .map(String::from),
    );
    for row in rows {
        push_row(
            &mut out,
            &[
                row.regime_index.to_string(),
                row.regime_start_round.to_string(),
                row.option_id.0.to_string(),
                escape(&row.family),
                optional(row.mean),
                optional(row.std),
                optional(row.value),
            ],
        );
    }
    out
}

pub fn agent_metadata(rows: &[AgentMetadata]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &[
            "agent_id",
            "agent_type",
            "softmax_prob",
            "memory_rule",
            "memory_decay",
            "memory_window",
            "degree",
        ]
        .map(String::from),
    );
    for row in rows {
        push_row(
            &mut out,
            &[
                row.agent_id.0.to_string(),
                row.agent_type.to_string(),
                row.softmax_prob.to_string(),
                escape(&row.memory_rule),
                optional(row.memory_decay),
                optional(row.memory_window),
                row.degree.to_string(),
            ],
        );
    }
    out
}

pub fn network(edges: &[NetworkEdge]) -> String {
    let mut out = String::from("source,target\n");
    for edge in edges {
        out.push_str(&format!("{},{}\n", edge.source.0, edge.target.0));
    }
    out
}

/// Value that can be written into a history table cell.
pub trait CsvCell {
    fn cell(&self) -> String;
}

impl CsvCell for f64 {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl CsvCell for mab_events::OptionId {
    fn cell(&self) -> String {
        self.0.to_string()
    }
}
