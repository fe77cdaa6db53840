//! Examples table rows.
use super::line::table_cells;

const SCENARIO_COLUMN: &str = "tcNo";

/// One data row of an Examples table, zipped against the table header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleRow {
    cells: Vec<(String, String)>,
}

impl ExampleRow {
    fn zip(header: &[String], values: &[&str]) -> Self {
        let mut row = ExampleRow::default();
        for (column, value) in header.iter().zip(values) {
            match row.cells.iter_mut().find(|(existing, _)| existing == column) {
                Some(cell) => cell.1 = value.to_string(),
                None => row.cells.push((column.clone(), value.to_string())),
            }
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(existing, _)| existing == column)
            .map(|(_, value)| value.as_str())
    }

    /// Cells in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }

    pub fn tc_no(&self) -> Option<&str> {
        self.get(SCENARIO_COLUMN)
    }

    /// Case-insensitive `tcNo` comparison.
    pub fn is_scenario(&self, scenario_id: &str) -> bool {
        self.tc_no().unwrap_or_default().to_lowercase() == scenario_id.to_lowercase()
    }
}

/// Streams table rows: the first row seen is the header for the whole file.
#[derive(Debug, Default)]
pub(super) struct TableCursor {
    header: Option<Vec<String>>,
}

impl TableCursor {
    /// Feed one `|` line; returns a row for every line after the header.
    pub(super) fn accept(&mut self, line: &str) -> Option<ExampleRow> {
        let values = table_cells(line);
        if let Some(header) = &self.header {
            return Some(ExampleRow::zip(header, &values));
        }
        self.header = Some(values.iter().map(|cell| cell.to_string()).collect());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_header_then_rows_zip() {
        let mut cursor = TableCursor::default();
        assert!(cursor.accept("| tcNo | uriParams |").is_none());
        let row = cursor.accept("| TC01 | id=1 |").expect("data row");
        assert_eq!(row.tc_no(), Some("TC01"));
        assert_eq!(row.get("uriParams"), Some("id=1"));
    }

    #[test]
    fn short_rows_truncate() {
        let mut cursor = TableCursor::default();
        cursor.accept("| tcNo | uriParams | status |");
        let row = cursor.accept("| TC02 | a=1 |").expect("data row");
        let cells: Vec<_> = row.iter().collect();
        assert_eq!(cells, vec![("tcNo", "TC02"), ("uriParams", "a=1")]);
    }

    #[test]
    fn header_is_kept_for_later_tables() {
        let mut cursor = TableCursor::default();
        cursor.accept("| tcNo | a |");
        let repeated = cursor.accept("| tcNo | b |").expect("second header zips as a row");
        assert_eq!(repeated.get("a"), Some("b"));
        let row = cursor.accept("| TC03 | 2 |").expect("data row");
        assert_eq!(row.get("a"), Some("2"));
        assert_eq!(row.get("b"), None);
    }

    #[test]
    fn scenario_match_ignores_case() {
        let mut cursor = TableCursor::default();
        cursor.accept("| tcNo |");
        let row = cursor.accept("| Tc_Happy_01 |").expect("data row");
        assert!(row.is_scenario("TC_HAPPY_01"));
        assert!(!row.is_scenario("TC_HAPPY_02"));
    }

    #[test]
    fn row_without_tc_no_never_matches_a_real_id() {
        let mut cursor = TableCursor::default();
        cursor.accept("| name |");
        let row = cursor.accept("| x |").expect("data row");
        assert!(!row.is_scenario("TC01"));
    }
}
