//! Line-item recovery: detected tables first, raw text block as fallback.

use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::models::document::{RawDocument, RowTable};
use crate::models::fields::{FieldValue, LineItem};

use super::clean_text;
use super::patterns::{
    INSTALLMENT_ARTIFACT, ITEMS_BLOCK, ITEMS_HEADER_DESCRIPTION, ITEMS_HEADER_ORDINAL,
    LEADING_DIGITS, LEADING_NUMBER, TOTAL_EXCL_VAT,
};

/// Line items for the `chi_tiet_hang_hoa` key.
///
/// Tables win when one carries the goods header and yields rows; otherwise
/// the text block is used. Any failure or absence becomes null.
pub fn extract_line_items(doc: &RawDocument) -> FieldValue {
    if let Some(items) = items_from_tables(&doc.tables) {
        debug!("Found {} line items in detected table", items.len());
        return FieldValue::Items(items);
    }

    match items_from_text(&doc.text) {
        Ok(Some(items)) => {
            debug!("Recovered {} line item(s) from text block", items.len());
            FieldValue::Items(items)
        }
        Ok(None) => {
            debug!("No line-items block in text");
            FieldValue::Null
        }
        Err(e) => {
            warn!("Line-items fallback failed: {}", e);
            FieldValue::Null
        }
    }
}

/// Whether `table`'s header is the goods/services header.
fn is_items_table(table: &RowTable) -> bool {
    if table.len() < 2 {
        return false;
    }
    match table.header() {
        Some(header) if header.len() > 2 => {
            RowTable::cell(header, 0).is_some_and(|c| c.contains(ITEMS_HEADER_ORDINAL))
                && RowTable::cell(header, 1).is_some_and(|c| c.contains(ITEMS_HEADER_DESCRIPTION))
        }
        _ => false,
    }
}

/// Items from the first table with the goods header.
///
/// Later tables are never consulted, even when the first match has no usable
/// rows.
pub fn items_from_tables(tables: &[RowTable]) -> Option<Vec<LineItem>> {
    let table = tables.iter().find(|t| is_items_table(t))?;

    let items: Vec<LineItem> = table
        .body()
        .iter()
        .filter_map(|row| {
            let ordinal = clean_text(RowTable::cell(row, 0).unwrap_or_default());
            let description = clean_text(RowTable::cell(row, 1).unwrap_or_default());
            if ordinal.is_empty() || description.is_empty() {
                return None;
            }
            let amount = RowTable::cell(row, 2).unwrap_or_default();
            Some(LineItem::new(&ordinal, &description, amount))
        })
        .collect();

    if items.is_empty() { None } else { Some(items) }
}

/// Single item recovered from the text between `(Amount)` and the pre-VAT
/// total.
///
/// Returns `Ok(None)` when the total or the block is missing. The item is
/// emitted even when its description comes out empty. A total made only of
/// separators cannot be cut out of the block and is an error.
pub fn items_from_text(text: &str) -> Result<Option<Vec<LineItem>>, ExtractionError> {
    let Some(amount) = TOTAL_EXCL_VAT.captures(text).and_then(|c| c.get(1)) else {
        return Ok(None);
    };
    let amount = amount.as_str();
    if !amount.chars().any(|c| c.is_ascii_digit()) {
        return Err(ExtractionError::MalformedCapture {
            field: "chi_tiet_hang_hoa".to_string(),
            reason: format!("pre-VAT total {:?} has no digits", amount),
        });
    }

    let Some(block) = ITEMS_BLOCK.captures(text).and_then(|c| c.get(1)) else {
        return Ok(None);
    };
    let block = block.as_str();

    let ordinal = LEADING_NUMBER
        .captures(block.trim())
        .and_then(|c| c.get(1))
        .map_or("1", |m| m.as_str());

    let without_amount = block.replace(amount, "");
    let without_ordinal = LEADING_DIGITS.replace(without_amount.trim_start(), "");
    let repaired = INSTALLMENT_ARTIFACT.replace_all(&without_ordinal, "(đợt $1)");
    let description = clean_text(&repaired);

    Ok(Some(vec![LineItem::new(ordinal, &description, amount)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn goods_table() -> RowTable {
        RowTable::new([
            vec!["STT", "Tên hàng hóa, dịch vụ", "Thành tiền"],
            vec!["1", "Dầu nhớt", "500000"],
        ])
    }

    #[test]
    fn test_table_path() {
        let items = items_from_tables(&[goods_table()]).unwrap();
        assert_eq!(items, vec![LineItem::new("1", "Dầu nhớt", "500000")]);

        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "STT": "1",
                "Tên Hàng hóa, dịch vụ": "Dầu nhớt",
                "Thành tiền (VND)": "500000"
            }])
        );
    }

    #[test]
    fn test_table_rows_need_ordinal_and_description() {
        let mut table = goods_table();
        table.rows.push(vec![None, Some("Ghi chú".to_string()), None]);
        table.rows.push(vec![Some("2".to_string()), Some(" ".to_string()), None]);
        table.rows.push(vec![Some("3".to_string()), Some("Lọc\ngió".to_string())]);

        let items = items_from_tables(&[table]).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], LineItem::new("3", "Lọc gió", ""));
    }

    #[test]
    fn test_first_matching_table_wins() {
        let other = RowTable::new([vec!["Mã", "Tên", "Tiền"], vec!["x", "y", "z"]]);
        let second = RowTable::new([
            vec!["STT", "Tên hàng hóa", "Thành tiền"],
            vec!["9", "Khác", "1"],
        ]);
        let items = items_from_tables(&[other, goods_table(), second]).unwrap();
        assert_eq!(items[0].description, "Dầu nhớt");
    }

    #[test]
    fn test_header_only_or_narrow_tables_are_skipped() {
        let header_only = RowTable::new([vec!["STT", "Tên hàng hóa", "Thành tiền"]]);
        let narrow = RowTable::new([vec!["STT", "Tên hàng hóa"], vec!["1", "A"]]);
        assert_eq!(items_from_tables(&[header_only, narrow]), None);
    }

    #[test]
    fn test_text_fallback() {
        let text = "(Amount) 1 Dịch vụ bảo dưỡng (đợt 1 3) 1.200.000 Cộng tiền hàng (Total amount excl. VAT): 1.200.000";
        let items = items_from_text(text).unwrap().unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ordinal, "1");
        assert_eq!(items[0].description, "Dịch vụ bảo dưỡng (đợt 3)");
        assert_eq!(items[0].amount, "1.200.000");
    }

    #[test]
    fn test_text_fallback_multiline_block() {
        let text = "Thành tiền\n(Amount)\n2 Sửa chữa\nđộng cơ 3.500.000\nCộng tiền hàng (Total amount excl. VAT): 3.500.000\n";
        let items = items_from_text(text).unwrap().unwrap();
        assert_eq!(items[0].ordinal, "2");
        assert_eq!(items[0].description, "Sửa chữa động cơ");
    }

    #[test]
    fn test_text_fallback_defaults_ordinal() {
        let text = "(Amount) Phí vận chuyển 50.000 Cộng tiền hàng (Total amount excl. VAT): 50.000";
        let items = items_from_text(text).unwrap().unwrap();
        assert_eq!(items[0].ordinal, "1");
        assert_eq!(items[0].description, "Phí vận chuyển");
    }

    #[test]
    fn test_text_fallback_missing_block() {
        assert_eq!(items_from_text("Số (No.): 1").unwrap(), None);
        assert_eq!(
            items_from_text("(Amount) 1 A Cộng tiền hàng").unwrap(),
            None,
            "no total amount"
        );
    }

    #[test]
    fn test_empty_description_still_emits_item() {
        let text = "(Amount) 1 1.000 Cộng tiền hàng (Total amount excl. VAT): 1.000";
        let doc = RawDocument::from_text(text);
        assert_eq!(
            extract_line_items(&doc),
            FieldValue::Items(vec![LineItem::new("1", "", "1.000")])
        );
    }

    #[test]
    fn test_separator_only_total_is_malformed() {
        let text = "(Amount) 1 Dầu nhớt Cộng tiền hàng (Total amount excl. VAT): .";
        assert!(matches!(
            items_from_text(text),
            Err(ExtractionError::MalformedCapture { .. })
        ));
        assert_eq!(extract_line_items(&RawDocument::from_text(text)), FieldValue::Null);
    }

    #[test]
    fn test_tables_take_priority_over_text() {
        let doc = RawDocument::new(
            "(Amount) 1 Khác 9 Cộng tiền hàng (Total amount excl. VAT): 9",
            vec![goods_table()],
        );
        match extract_line_items(&doc) {
            FieldValue::Items(items) => assert_eq!(items[0].description, "Dầu nhớt"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nothing_found_is_null() {
        assert_eq!(extract_line_items(&RawDocument::from_text("abc")), FieldValue::Null);
    }
}
