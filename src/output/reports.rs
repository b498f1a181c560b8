//! Analytical reports over the loaded store

use crate::storage::{Storage, StorageResult};

/// Width of the dashed rule framing each result block
pub const RULE_WIDTH: usize = 50;

/// Minimum number of ratings for the per-category ranking
pub const MIN_RATINGS_FOR_TOP_RATED: i64 = 5;

/// Minimum catalogue size for a publisher to be summarised
pub const MIN_PUBLISHER_BOOKS: i64 = 3;

/// One titled block of query results
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: &'static str,
    pub rows: Vec<Vec<String>>,
}

impl ReportSection {
    /// Renders the block as printed on stdout
    pub fn render(&self) -> String {
        let rule = "-".repeat(RULE_WIDTH);
        let mut out = format!("\n{} results:\n{}\n", self.title, rule);
        for row in &self.rows {
            out.push_str("> ");
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
        out.push_str(&rule);
        out.push('\n');
        out
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
}

/// Runs every report query against the store
pub fn build_reports(storage: &dyn Storage) -> StorageResult<Vec<ReportSection>> {
    let mut sections = Vec::new();

    sections.push(ReportSection {
        title: "Books rated higher than average",
        rows: storage
            .higher_than_average_rating(5)?
            .into_iter()
            .map(|b| vec![b.title, b.average_rating.to_string()])
            .collect(),
    });

    sections.push(ReportSection {
        title: "Books longer than their category average",
        rows: storage
            .longer_than_category_average(5)?
            .into_iter()
            .map(|b| vec![b.title, b.categories, b.page_count.to_string()])
            .collect(),
    });

    sections.push(ReportSection {
        title: "Authors with longer than average books",
        rows: storage
            .authors_with_longer_than_average_books(5)?
            .into_iter()
            .map(|author| vec![author])
            .collect(),
    });

    sections.push(ReportSection {
        title: "Top rated books in each category",
        rows: storage
            .top_rated_per_category(MIN_RATINGS_FOR_TOP_RATED)?
            .into_iter()
            .map(|b| vec![b.categories, b.title, b.top_rated.to_string()])
            .collect(),
    });

    sections.push(ReportSection {
        title: "Publisher Data",
        rows: storage
            .publisher_summary(MIN_PUBLISHER_BOOKS)?
            .into_iter()
            .map(|p| {
                vec![
                    p.publisher,
                    p.num_books.to_string(),
                    optional(p.average_page_count),
                    optional(p.highest_rated),
                ]
            })
            .collect(),
    });

    sections.push(ReportSection {
        title: "Compare books published in the same year",
        rows: storage
            .year_rating_comparison(10)?
            .into_iter()
            .map(|b| {
                vec![
                    b.title,
                    optional(b.year),
                    b.average_rating.to_string(),
                    optional(b.year_avg_rating),
                ]
            })
            .collect(),
    });

    Ok(sections)
}

/// Prints every section to stdout
pub fn print_reports(sections: &[ReportSection]) {
    for section in sections {
        print!("{}", section.render());
    }
}
