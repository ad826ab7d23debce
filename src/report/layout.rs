//! Column auto-fit.

use std::collections::{BTreeMap, HashMap};

pub const MIN_COLUMN_WIDTH: f64 = 10.0;
pub const MAX_COLUMN_WIDTH: f64 = 100.0;
const PADDING: usize = 2;

/// Widest value seen per sheet and column.
#[derive(Debug, Default)]
pub struct ColumnWidths {
    sheets: HashMap<String, BTreeMap<u16, usize>>,
}

impl ColumnWidths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, sheet: &str, col: u16, chars: usize) {
        let widest = self
            .sheets
            .entry(sheet.to_string())
            .or_default()
            .entry(col)
            .or_insert(0);
        *widest = (*widest).max(chars);
    }

    /// Fitted widths for every column that received a value, in column order.
    pub fn fitted(&self, sheet: &str) -> Vec<(u16, f64)> {
        self.sheets
            .get(sheet)
            .map(|cols| cols.iter().map(|(col, chars)| (*col, fit(*chars))).collect())
            .unwrap_or_default()
    }
}

/// Longest value plus padding, clamped to the allowed range.
pub fn fit(chars: usize) -> f64 {
    ((chars + PADDING) as f64).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_clamps() {
        assert_eq!(fit(0), 10.0);
        assert_eq!(fit(7), 10.0);
        assert_eq!(fit(20), 22.0);
        assert_eq!(fit(98), 100.0);
        assert_eq!(fit(5000), 100.0);
    }

    #[test]
    fn test_observe_keeps_maximum() {
        let mut widths = ColumnWidths::new();
        widths.observe("Pods", 1, 30);
        widths.observe("Pods", 1, 12);
        widths.observe("Pods", 3, 4);
        widths.observe("Nodes", 1, 50);

        assert_eq!(widths.fitted("Pods"), vec![(1, 32.0), (3, 10.0)]);
        assert_eq!(widths.fitted("Nodes"), vec![(1, 52.0)]);
        assert!(widths.fitted("Secrets").is_empty());
    }
}
