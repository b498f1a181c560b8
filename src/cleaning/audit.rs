//! Missing-value audit

use crate::records::{RawRow, RAW_COLUMNS};

/// Per-column count of missing cells in a working set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingValueReport {
    pub total_rows: usize,

    /// `(column, missing)` in file column order
    pub counts: Vec<(&'static str, usize)>,
}

impl MissingValueReport {
    /// Missing count for one column, if the column exists
    pub fn missing(&self, column: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, count)| *count)
    }

    /// Missing cells across all columns
    pub fn total_missing_cells(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Renders a horizontal bar chart, bars scaled to `width` characters
    pub fn render_chart(&self, width: usize) -> String {
        let max = self.counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let label_width = self
            .counts
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);

        let mut out = String::from("Count of missing values in each column\n");
        for (name, count) in &self.counts {
            let bar = if max == 0 {
                0
            } else {
                (count * width).div_ceil(max)
            };
            out.push_str(&format!(
                "  {:<label_width$} | {:<width$} {}\n",
                name,
                "#".repeat(bar),
                count,
                label_width = label_width,
                width = width
            ));
        }
        out
    }
}

/// Counts missing cells per column
pub fn audit_missing(rows: &[RawRow]) -> MissingValueReport {
    let mut counts: Vec<(&'static str, usize)> =
        RAW_COLUMNS.iter().map(|name| (*name, 0)).collect();

    for row in rows {
        for (index, (_, value)) in row.cells().iter().enumerate() {
            if value.is_none() {
                counts[index].1 += 1;
            }
        }
    }

    MissingValueReport {
        total_rows: rows.len(),
        counts,
    }
}
