//! Date interpretation for extracted fields.

use chrono::NaiveDate;

use crate::models::fields::{FieldKey, FieldMap};

/// Issue date from the `Ngày`/`Tháng`/`Năm` triple.
///
/// `None` when any part is missing or the triple is not a calendar date.
pub fn parse_invoice_date(fields: &FieldMap) -> Option<NaiveDate> {
    let day: u32 = fields.text(FieldKey::Day)?.parse().ok()?;
    let month: u32 = fields.text(FieldKey::Month)?.parse().ok()?;
    let year: i32 = fields.text(FieldKey::Year)?.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Date part of a signing timestamp such as "15/03/2024 10:21:05".
pub fn parse_signing_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.split_whitespace().next()?;

    ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Whether the date triple is complete but not a real date.
pub fn invalid_invoice_date(fields: &FieldMap) -> bool {
    [FieldKey::Day, FieldKey::Month, FieldKey::Year]
        .iter()
        .all(|k| fields.has_value(*k))
        && parse_invoice_date(fields).is_none()
}
