//! Header-indexed tab-separated tables.
//!
//! Cells are looked up by column name. Numeric getters never fail: a
//! missing column, an empty cell or text that does not parse all read as
//! zero, and so do negative, NaN and infinite values.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// A parsed export.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse tab-separated text whose first non-empty line is the header.
    pub fn parse(text: &str) -> Self {
        let mut lines = text
            .trim_start_matches('\u{feff}')
            .lines()
            .filter(|line| !line.trim().is_empty());

        let Some(header) = lines.next() else {
            return Self::default();
        };
        let columns = header
            .split('\t')
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        let rows = lines
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect();

        Self { columns, rows }
    }

    /// Whether the header names `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Columns from `expected` the header does not name.
    pub fn missing<'c>(&self, expected: &[&'c str]) -> Vec<&'c str> {
        expected
            .iter()
            .copied()
            .filter(|column| !self.has_column(column))
            .collect()
    }

    /// Log the expected columns this export lacks. Their cells read as defaults.
    pub fn warn_missing(&self, expected: &[&str], input: &str) {
        let missing = self.missing(expected);
        if !missing.is_empty() {
            tracing::warn!("{}: missing columns {}, using defaults", input, missing.join(", "));
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over data rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }
}

/// One data row. Short rows read as if padded with empty cells.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Raw cell text, trimmed; empty when absent.
    pub fn get_str(&self, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&i| self.cells.get(i))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }

    /// Cell as a non-negative finite float, or 0.
    pub fn get_f64(&self, column: &str) -> f64 {
        match self.get_str(column).parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => v,
            _ => 0.0,
        }
    }

    /// Cell as a count, or 0. Float text is truncated.
    pub fn get_u64(&self, column: &str) -> u64 {
        let text = self.get_str(column);
        text.parse::<u64>()
            .unwrap_or_else(|_| self.get_f64(column).trunc() as u64)
    }
}

/// Value of a `key=value` or `key="value"` attribute in an MBean name.
///
/// Unquoted values run to the next comma.
pub fn mbean_attribute<'a>(mbean: &'a str, key: &str) -> Option<&'a str> {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    let pattern = ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"([A-Za-z]+)=(?:"([^"]*)"?|([^,]*))"#).expect("valid MBean attribute regex")
    });

    pattern
        .captures_iter(mbean)
        .find(|caps| &caps[1] == key)
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_header() {
        let table = Table::parse("B\tA\n2\t1\n4\t3\n");
        assert_eq!(table.len(), 2);
        let firsts: Vec<_> = table.rows().map(|r| r.get_u64("A")).collect();
        assert_eq!(firsts, vec![1, 3]);
    }

    #[test]
    fn test_numeric_defaults() {
        let table = Table::parse("n\tx\n-3\tabc\nNaN\t\ninf\t1e400\n");
        for row in table.rows() {
            assert_eq!(row.get_f64("n"), 0.0);
            assert_eq!(row.get_f64("x"), 0.0);
            assert_eq!(row.get_f64("missing"), 0.0);
            assert_eq!(row.get_u64("n"), 0);
            assert_eq!(row.get_u64("missing"), 0);
        }
    }

    #[test]
    fn test_counts_accept_float_text() {
        let table = Table::parse("count\n12.0\n7.9\n42\n");
        let counts: Vec<_> = table.rows().map(|r| r.get_u64("count")).collect();
        assert_eq!(counts, vec![12, 7, 42]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::parse("a\tb\tc\n1\n");
        let row = table.rows().next().unwrap();
        assert_eq!(row.get_u64("a"), 1);
        assert_eq!(row.get_str("c"), "");
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let table = Table::parse("\u{feff}Name\tValue\r\n\r\nx\t 2.5 \r\n");
        assert!(table.has_column("Name"));
        assert_eq!(table.len(), 1);
        let row = table.rows().next().unwrap();
        assert_eq!(row.get_str("Name"), "x");
        assert_eq!(row.get_f64("Value"), 2.5);
    }

    #[test]
    fn test_empty_text() {
        let table = Table::parse("");
        assert!(table.is_empty());
        assert_eq!(table.missing(&["MBean"]), vec!["MBean"]);
    }

    #[test]
    fn test_mbean_attributes() {
        let mbean = r#"com.q1labs.sem:application=ecs-ep,type=customrules,folder=Recon,name="Port scan, slow""#;
        assert_eq!(mbean_attribute(mbean, "folder"), Some("Recon"));
        assert_eq!(mbean_attribute(mbean, "name"), Some("Port scan, slow"));
        assert_eq!(mbean_attribute(mbean, "type"), Some("customrules"));
        assert_eq!(mbean_attribute(mbean, "id"), None);
        assert_eq!(mbean_attribute("plain", "name"), None);
    }
}
