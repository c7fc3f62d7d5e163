//! Raw documents handed to the extractor by a text source.

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Text and detected tables of one document, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Full document text, one source line per `\n`-terminated line.
    pub text: String,

    /// Tables detected on the pages, in encounter order.
    #[serde(default)]
    pub tables: Vec<RowTable>,
}

/// A detected table: ordered rows of ordered cells.
///
/// Row 0 is conventionally the header. Cells may be `None` when the upstream
/// detector found a cell boundary but no text in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowTable {
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawDocument {
    /// Create a document from text and tables.
    pub fn new(text: impl Into<String>, tables: Vec<RowTable>) -> Self {
        Self {
            text: text.into(),
            tables,
        }
    }

    /// Create a text-only document.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    /// Parse a pre-extracted document (`{"text": ..., "tables": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Fail when there is nothing to extract from.
    pub fn ensure_content(&self) -> Result<(), ExtractionError> {
        if self.text.trim().is_empty() && self.tables.iter().all(RowTable::is_empty) {
            return Err(ExtractionError::NoData);
        }
        Ok(())
    }
}

impl RowTable {
    /// Build a table from rows of present cells.
    pub fn new<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    /// Number of rows, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The header row, if any.
    pub fn header(&self) -> Option<&[Option<String>]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// All rows after the header.
    pub fn body(&self) -> &[Vec<Option<String>>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Cell text at `col` of `row`, if the cell exists and is non-null.
    pub fn cell(row: &[Option<String>], col: usize) -> Option<&str> {
        row.get(col).and_then(|c| c.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_json_with_null_cells() {
        let json = r#"{
            "text": "Số (No.): 123\n",
            "tables": [[["STT", "Tên hàng hóa, dịch vụ", null], ["1", "Dầu nhớt", "500000"]]]
        }"#;

        let doc = RawDocument::from_json_str(json).unwrap();
        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].rows[0][2], None);
        assert_eq!(RowTable::cell(&doc.tables[0].body()[0], 1), Some("Dầu nhớt"));
    }

    #[test]
    fn test_tables_default_to_empty() {
        let doc = RawDocument::from_json_str(r#"{"text": "abc"}"#).unwrap();
        assert!(doc.tables.is_empty());
    }

    #[test]
    fn test_ensure_content() {
        assert!(RawDocument::from_text("  \n").ensure_content().is_err());
        assert!(RawDocument::from_text("Số (No.): 1").ensure_content().is_ok());

        let only_table = RawDocument::new("", vec![RowTable::new([["STT"]])]);
        assert!(only_table.ensure_content().is_ok());
    }

    #[test]
    fn test_row_table_header_and_body() {
        let table = RowTable::new([vec!["STT", "Tên"], vec!["1", "A"]]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.header().map(|h| h.len()), Some(2));
        assert_eq!(table.body().len(), 1);
        assert!(RowTable::default().body().is_empty());
    }
}
