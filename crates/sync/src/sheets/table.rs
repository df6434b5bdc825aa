//! In-memory sheet tab with header-based column resolution.
//!
//! Column indices are resolved once per loaded table, then every row is
//! projected through the fixed indices. A header that does not exist, or a
//! row shorter than the resolved index, yields `None` - never an error.

/// One loaded worksheet tab: a header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Build a table from raw value rows; the first row is the header row.
    #[must_use]
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let headers = values.remove(0);
        Self {
            headers,
            rows: values,
        }
    }

    /// Resolve a header name to its column index, if the header exists.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Data rows, header row excluded.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project one cell out of a row through a resolved column index.
    ///
    /// Returns `None` when the column was never resolved or the row is too
    /// short to carry it.
    #[must_use]
    pub fn value(row: &[String], column: Option<usize>) -> Option<String> {
        let cell = row.get(column?)?;
        Some(cell.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SheetTable {
        SheetTable::from_values(vec![
            vec!["title".into(), "price".into(), "sku".into()],
            vec!["Blue Mug".into(), "12.50".into(), "BM-01".into()],
            vec!["Red Mug".into(), "13.00".into()],
        ])
    }

    #[test]
    fn resolves_columns_by_header_name() {
        let t = table();
        assert_eq!(t.column("title"), Some(0));
        assert_eq!(t.column("sku"), Some(2));
        assert_eq!(t.column("missing"), None);
    }

    #[test]
    fn value_falls_back_to_none_when_unresolvable() {
        let t = table();
        let sku = t.column("sku");
        let rows = t.rows();

        // Full row: resolved by position.
        assert_eq!(SheetTable::value(&rows[0], sku), Some("BM-01".to_string()));
        // Short row: column index exists but the row does not reach it.
        assert_eq!(SheetTable::value(&rows[1], sku), None);
        // Unknown header: no index at all.
        assert_eq!(SheetTable::value(&rows[0], t.column("missing")), None);
    }

    #[test]
    fn first_row_becomes_the_header() {
        let t = table();
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[0][0], "Blue Mug");
    }

    #[test]
    fn empty_values_produce_an_empty_table() {
        let t = SheetTable::from_values(vec![]);
        assert!(t.is_empty());
        assert_eq!(t.column("anything"), None);
    }
}
