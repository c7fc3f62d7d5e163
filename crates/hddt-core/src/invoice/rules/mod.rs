//! Rule-based field extractors for the e-invoice template.

pub mod amounts;
pub mod dates;
pub mod line_items;
pub mod line_scan;
pub mod patterns;
pub mod whole_text;

pub use amounts::{amount_field, check_totals, parse_vnd_amount};
pub use dates::{invalid_invoice_date, parse_invoice_date, parse_signing_date};
pub use line_items::{extract_line_items, items_from_tables, items_from_text};
pub use line_scan::LineScanStrategy;
pub use whole_text::WholeTextStrategy;

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a bank-account fragment into (account number, bank name).
///
/// Only the first `-` separates; a fragment without one has an empty bank
/// name.
pub fn split_bank_account(fragment: &str) -> (String, String) {
    match fragment.split_once('-') {
        Some((account, bank)) => (clean_text(account), clean_text(bank)),
        None => (clean_text(fragment), String::new()),
    }
}

/// Cut `s` at the first occurrence of `label`, if any.
pub(crate) fn truncate_at<'a>(s: &'a str, label: &str) -> &'a str {
    s.find(label).map_or(s, |pos| &s[..pos])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Tầng 3,\n  số 10 \t Lê Lợi  "), "Tầng 3, số 10 Lê Lợi");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn test_clean_text_idempotent() {
        let samples = ["a  b", "\n x \n y \n", "CÔNG TY   CỔ PHẦN", "1.200.000"];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once);
        }
    }

    #[test]
    fn test_split_bank_account() {
        assert_eq!(
            split_bank_account("123456 - Vietcombank"),
            ("123456".to_string(), "Vietcombank".to_string())
        );
        assert_eq!(
            split_bank_account("123456"),
            ("123456".to_string(), String::new())
        );
        assert_eq!(
            split_bank_account("0071 - Ngân hàng TMCP - CN Sài Gòn"),
            ("0071".to_string(), "Ngân hàng TMCP - CN Sài Gòn".to_string())
        );
    }

    #[test]
    fn test_truncate_at() {
        assert_eq!(truncate_at("028 1234 Số tài khoản: 1", "Số tài khoản"), "028 1234 ");
        assert_eq!(truncate_at("028 1234", "Số tài khoản"), "028 1234");
    }
}
