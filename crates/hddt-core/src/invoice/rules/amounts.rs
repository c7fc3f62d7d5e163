//! Vietnamese amount parsing and totals consistency.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ExtractionError;
use crate::models::fields::{FieldKey, FieldMap};

/// Parse a Vietnamese-formatted amount (e.g. "1.200.000" or "1.200.000,50").
///
/// `.` groups thousands and `,` marks decimals. A lone separator followed by
/// exactly three digits is read as grouping.
pub fn parse_vnd_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => normalize_single(&cleaned, ','),
        (None, Some(_)) => normalize_single(&cleaned, '.'),
        (None, None) => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// Only one kind of separator present: grouping or decimal point.
fn normalize_single(s: &str, sep: char) -> String {
    let groups: Vec<&str> = s.split(sep).collect();
    let grouping = groups.len() > 2 || groups.last().is_some_and(|g| g.len() == 3);
    if grouping {
        groups.concat()
    } else {
        s.replace(sep, ".")
    }
}

/// Amount stored under `key`.
///
/// `Ok(None)` when the key is absent or null; an error when it holds text that
/// is not an amount.
pub fn amount_field(fields: &FieldMap, key: FieldKey) -> Result<Option<Decimal>, ExtractionError> {
    match fields.text(key) {
        None => Ok(None),
        Some(raw) => parse_vnd_amount(raw)
            .map(Some)
            .ok_or_else(|| ExtractionError::Parse {
                field: key.to_string(),
                value: raw.to_string(),
            }),
    }
}

/// Totals consistency warnings. Never modifies `fields`.
///
/// Checks pre-VAT plus VAT against the grand total, and line-item amounts
/// against the pre-VAT total, whenever every figure involved parses.
pub fn check_totals(fields: &FieldMap) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut read = |key: FieldKey| match amount_field(fields, key) {
        Ok(v) => v,
        Err(e) => {
            warnings.push(e.to_string());
            None
        }
    };

    let excl_vat = read(FieldKey::TotalExclVat);
    let vat = read(FieldKey::VatAmount);
    let total = read(FieldKey::TotalAmount);

    if let (Some(excl_vat), Some(vat), Some(total)) = (excl_vat, vat, total) {
        match excl_vat.checked_add(vat) {
            Some(sum) if sum == total => {}
            Some(_) => warnings.push(format!(
                "Totals mismatch: {} + {} != {}",
                excl_vat, vat, total
            )),
            None => warnings.push(format!("Totals overflow: {} + {}", excl_vat, vat)),
        }
    }

    if let (Some(items), Some(excl_vat)) = (fields.line_items(), excl_vat) {
        let amounts: Option<Vec<Decimal>> =
            items.iter().map(|i| parse_vnd_amount(&i.amount)).collect();
        if let Some(amounts) = amounts {
            let sum = amounts
                .into_iter()
                .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(a));
            match sum {
                Some(sum) if sum == excl_vat => {}
                Some(sum) => warnings.push(format!(
                    "Line items sum to {}, expected {}",
                    sum, excl_vat
                )),
                None => warnings.push("Line item amounts overflow".to_string()),
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::{FieldValue, LineItem};
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_vnd_amount() {
        assert_eq!(parse_vnd_amount("1.200.000"), Some(dec("1200000")));
        assert_eq!(parse_vnd_amount("120.000"), Some(dec("120000")));
        assert_eq!(parse_vnd_amount("1.200.000,50"), Some(dec("1200000.50")));
        assert_eq!(parse_vnd_amount("1,200,000"), Some(dec("1200000")));
        assert_eq!(parse_vnd_amount("1,200,000.5"), Some(dec("1200000.5")));
        assert_eq!(parse_vnd_amount("12,5"), Some(dec("12.5")));
        assert_eq!(parse_vnd_amount("500000"), Some(dec("500000")));
        assert_eq!(parse_vnd_amount("1 320 000 đ"), Some(dec("1320000")));
    }

    #[test]
    fn test_parse_vnd_amount_rejects_garbage() {
        assert_eq!(parse_vnd_amount(""), None);
        assert_eq!(parse_vnd_amount("KCT"), None);
        assert_eq!(parse_vnd_amount("..,"), None);
    }

    fn totals(excl: &str, vat: &str, total: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert_text(FieldKey::TotalExclVat, excl);
        fields.insert_text(FieldKey::VatAmount, vat);
        fields.insert_text(FieldKey::TotalAmount, total);
        fields
    }

    #[test]
    fn test_consistent_totals() {
        let fields = totals("1.200.000", "120.000", "1.320.000");
        assert!(check_totals(&fields).is_empty());
    }

    #[test]
    fn test_totals_mismatch() {
        let fields = totals("1.200.000", "120.000", "1.300.000");
        let warnings = check_totals(&fields);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Totals mismatch"));
    }

    #[test]
    fn test_unparseable_amount_warns() {
        let fields = totals("1.200.000", "không", "1.320.000");
        let warnings = check_totals(&fields);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("tien_thue_gtgt"));
    }

    #[test]
    fn test_missing_amounts_skip_check() {
        let mut fields = FieldMap::new();
        fields.insert_text(FieldKey::TotalExclVat, "1.200.000");
        fields.insert_null(FieldKey::VatAmount);
        assert!(check_totals(&fields).is_empty());
    }

    #[test]
    fn test_line_items_sum() {
        let mut fields = totals("1.200.000", "120.000", "1.320.000");
        fields.insert_if_absent(
            FieldKey::LineItems,
            FieldValue::Items(vec![
                LineItem::new("1", "Dầu nhớt", "500.000"),
                LineItem::new("2", "Lọc gió", "600.000"),
            ]),
        );
        let warnings = check_totals(&fields);
        assert_eq!(warnings, vec!["Line items sum to 1100000, expected 1200000".to_string()]);
    }

    #[test]
    fn test_overflowing_totals_warn() {
        let huge = "70000000000000000000000000000";
        let mut fields = totals(huge, huge, "1");
        fields.insert_if_absent(
            FieldKey::LineItems,
            FieldValue::Items(vec![
                LineItem::new("1", "A", huge),
                LineItem::new("2", "B", huge),
            ]),
        );
        let warnings = check_totals(&fields);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Totals overflow"));
        assert_eq!(warnings[1], "Line item amounts overflow");
    }
}
