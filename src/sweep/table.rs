//! Sweep result table
//!
//! Rows are appended once per (trial, max depth) fit and never changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Outcome of one fit in the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    /// Trial number, starting at 1
    pub trial: usize,
    /// Depth limit the tree was trained with
    pub max_depth: usize,
    /// Depth the trained tree actually reached
    pub depth: usize,
    /// Node count of the trained tree
    pub node_count: usize,
    /// Misclassification rate on the training partition
    pub train_error: f64,
    /// Misclassification rate on the validation partition
    pub validation_error: f64,
    /// Training partition size
    pub train_size: usize,
    /// Validation partition size
    pub validation_size: usize,
    /// Seed of the generator that drew this split
    pub split_seed: u64,
}

/// Aggregate over every row sharing one `max_depth`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSummary {
    /// Depth limit
    pub max_depth: usize,
    /// Rows aggregated
    pub runs: usize,
    /// Mean training error
    pub mean_train_error: f64,
    /// Sample standard deviation of training error
    pub std_train_error: f64,
    /// Mean validation error
    pub mean_validation_error: f64,
    /// Sample standard deviation of validation error
    pub std_validation_error: f64,
    /// Mean realized depth
    pub mean_depth: f64,
    /// Mean node count
    pub mean_node_count: f64,
}

/// Append-only table of sweep rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepTable {
    rows: Vec<SweepRow>,
}

impl SweepTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row
    pub fn append(&mut self, row: SweepRow) {
        self.rows.push(row);
    }

    /// All rows in insertion order
    #[must_use]
    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    /// Iterate rows in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, SweepRow> {
        self.rows.iter()
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row was appended
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-depth statistics, ascending by `max_depth`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(&self) -> Vec<DepthSummary> {
        let mut groups: BTreeMap<usize, Vec<&SweepRow>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row.max_depth).or_default().push(row);
        }

        groups
            .into_iter()
            .map(|(max_depth, rows)| {
                let train: Vec<f64> = rows.iter().map(|r| r.train_error).collect();
                let validation: Vec<f64> = rows.iter().map(|r| r.validation_error).collect();
                let depths: Vec<f64> = rows.iter().map(|r| r.depth as f64).collect();
                let nodes: Vec<f64> = rows.iter().map(|r| r.node_count as f64).collect();

                DepthSummary {
                    max_depth,
                    runs: rows.len(),
                    mean_train_error: mean(&train),
                    std_train_error: sample_std(&train),
                    mean_validation_error: mean(&validation),
                    std_validation_error: sample_std(&validation),
                    mean_depth: mean(&depths),
                    mean_node_count: mean(&nodes),
                }
            })
            .collect()
    }

    /// Depth limit with the lowest mean validation error; ties go to the
    /// shallower tree
    #[must_use]
    pub fn best_depth(&self) -> Option<usize> {
        self.summarize()
            .into_iter()
            .min_by(|a, b| {
                a.mean_validation_error
                    .total_cmp(&b.mean_validation_error)
                    .then(a.max_depth.cmp(&b.max_depth))
            })
            .map(|s| s.max_depth)
    }

    /// Rows as a pretty-printed JSON array
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }

    /// One JSON object per line
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl FromIterator<SweepRow> for SweepTable {
    fn from_iter<I: IntoIterator<Item = SweepRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SweepTable {
    type Item = &'a SweepRow;
    type IntoIter = std::slice::Iter<'a, SweepRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(trial: usize, max_depth: usize, train_error: f64, validation_error: f64) -> SweepRow {
        SweepRow {
            trial,
            max_depth,
            depth: max_depth,
            node_count: 2 * max_depth + 1,
            train_error,
            validation_error,
            train_size: 80,
            validation_size: 20,
            split_seed: trial as u64,
        }
    }

    fn table() -> SweepTable {
        [
            row(1, 2, 0.30, 0.32),
            row(1, 4, 0.20, 0.28),
            row(1, 6, 0.10, 0.35),
            row(2, 2, 0.28, 0.30),
            row(2, 4, 0.22, 0.26),
            row(2, 6, 0.12, 0.37),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_append_keeps_order() {
        let mut table = SweepTable::new();
        assert!(table.is_empty());
        table.append(row(1, 3, 0.1, 0.2));
        table.append(row(1, 2, 0.1, 0.2));
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].max_depth, 3);
        assert_eq!(table.iter().nth(1).unwrap().max_depth, 2);
    }

    #[test]
    fn test_summarize_groups_by_depth() {
        let summary = table().summarize();
        assert_eq!(summary.len(), 3);
        assert_eq!(
            summary.iter().map(|s| s.max_depth).collect::<Vec<_>>(),
            vec![2, 4, 6]
        );
        let d4 = &summary[1];
        assert_eq!(d4.runs, 2);
        assert!((d4.mean_train_error - 0.21).abs() < 1e-12);
        assert!((d4.mean_validation_error - 0.27).abs() < 1e-12);
        assert!((d4.std_validation_error - 0.0002_f64.sqrt()).abs() < 1e-12);
        assert!((d4.mean_node_count - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_best_depth_shows_overfitting() {
        let table = table();
        assert_eq!(table.best_depth(), Some(4));
        assert_eq!(SweepTable::new().best_depth(), None);
    }

    #[test]
    fn test_best_depth_tie_prefers_shallow() {
        let table: SweepTable = [row(1, 5, 0.1, 0.2), row(1, 3, 0.2, 0.2)]
            .into_iter()
            .collect();
        assert_eq!(table.best_depth(), Some(3));
    }

    #[test]
    fn test_single_row_std_is_zero() {
        let table: SweepTable = std::iter::once(row(1, 2, 0.3, 0.4)).collect();
        let summary = table.summarize();
        assert!(summary[0].std_train_error.abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_export() {
        let table = table();
        let parsed: Vec<SweepRow> = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(parsed, table.rows());

        let lines = table.to_json_lines().unwrap();
        assert_eq!(lines.lines().count(), 6);
        assert!(lines.lines().all(|l| l.contains("\"validation_error\"")));
    }
}
