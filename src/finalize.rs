use std::{collections::BTreeSet, fmt, path::PathBuf};

use chrono::TimeDelta;

use crate::record::Record;

const PREVIEW_LEN: usize = 5;

/// Sorts by id and cleans the optional text fields: surrounding whitespace is
/// trimmed and a value that ends up empty becomes `None`.
pub fn finalize(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_unstable_by_key(|r| r.id);
    for record in &mut records {
        record.country = normalize(record.country.take());
        record.state = normalize(record.state.take());
        record.category = normalize(record.category.take());
    }
    records
}

#[inline]
fn normalize(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// End of run report. Purely informational.
#[derive(Debug, Clone)]
pub struct Summary {
    pub found: usize,
    pub requested: usize,
    pub attempted: usize,
    pub elapsed: TimeDelta,
    pub with_country: usize,
    pub with_state: usize,
    pub unique_categories: usize,
    pub unique_countries: usize,
    pub head: Vec<PreviewRow>,
    pub tail: Vec<PreviewRow>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub id: u32,
    pub title: String,
    pub country: Option<String>,
    pub category: Option<String>,
}

impl From<&Record> for PreviewRow {
    fn from(r: &Record) -> Self {
        Self {
            id: r.id,
            title: r.title.clone(),
            country: r.country.clone(),
            category: r.category.clone(),
        }
    }
}

impl Summary {
    /// `records` is expected to be finalized already, the preview takes the first and
    /// last rows as they are.
    pub fn new(records: &[Record], requested: usize, attempted: usize, elapsed: TimeDelta) -> Self {
        Self {
            found: records.len(),
            requested,
            attempted,
            elapsed,
            with_country: records.iter().filter(|r| r.country.is_some()).count(),
            with_state: records.iter().filter(|r| r.state.is_some()).count(),
            unique_categories: distinct(records, |r| r.category.as_deref()),
            unique_countries: distinct(records, |r| r.country.as_deref()),
            head: records.iter().take(PREVIEW_LEN).map(PreviewRow::from).collect(),
            tail: records
                .iter()
                .skip(records.len().saturating_sub(PREVIEW_LEN))
                .map(PreviewRow::from)
                .collect(),
            output: None,
        }
    }

    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.elapsed.num_milliseconds() as f64 / 60_000.0;

        writeln!(f, "Scraping complete!")?;
        writeln!(f, "Stories found: {} of {}", self.found, self.requested)?;
        if self.attempted < self.requested {
            writeln!(f, "Stopped early after {} pages", self.attempted)?;
        }
        writeln!(f, "Total time: {minutes:.2} minutes")?;
        if let Some(output) = &self.output {
            writeln!(f, "Saved to: {}", output.display())?;
        }

        writeln!(f)?;
        writeln!(f, "Statistics:")?;
        writeln!(f, "- Stories with country: {}", self.with_country)?;
        writeln!(f, "- Stories with state: {}", self.with_state)?;
        writeln!(f, "- Unique categories: {}", self.unique_categories)?;
        writeln!(f, "- Unique countries: {}", self.unique_countries)?;

        writeln!(f)?;
        writeln!(f, "First {} stories:", self.head.len())?;
        write_rows(f, &self.head)?;
        writeln!(f)?;
        writeln!(f, "Last {} stories:", self.tail.len())?;
        write_rows(f, &self.tail)
    }
}

fn distinct<'a>(records: &'a [Record], field: impl Fn(&'a Record) -> Option<&'a str>) -> usize {
    records.iter().filter_map(field).collect::<BTreeSet<_>>().len()
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[PreviewRow]) -> fmt::Result {
    writeln!(f, "{:>6} | {:<40} | {:<20} | {}", "id", "title", "country", "category")?;
    for row in rows {
        writeln!(
            f,
            "{:>6} | {:<40} | {:<20} | {}",
            row.id,
            truncate(&row.title, 40),
            row.country.as_deref().unwrap_or("-"),
            row.category.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}
