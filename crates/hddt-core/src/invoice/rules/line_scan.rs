//! Line-by-line anchor scan.
//!
//! Each cleaned physical line is offered to an ordered rule table; the first
//! rule whose anchor the line contains handles it and the rest are skipped.
//! All writes are first-match-wins.

use tracing::{debug, trace};

use crate::invoice::ExtractionStrategy;
use crate::models::fields::{FieldKey, FieldMap};

use super::patterns::*;
use super::{clean_text, truncate_at};

/// One cleaned line and the text after its first `:`.
#[derive(Debug, Clone, Copy)]
pub struct ScanLine<'a> {
    pub text: &'a str,
    pub value: Option<&'a str>,
}

impl<'a> ScanLine<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            value: text.split_once(':').map(|(_, rest)| rest),
        }
    }

    /// First capture of `pattern` applied to the value part.
    fn value_capture(&self, pattern: &regex::Regex) -> Option<&'a str> {
        self.value
            .and_then(|v| pattern.captures(v))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

type Handler = fn(&ScanLine<'_>, &mut FieldMap);

/// Literal anchor and the handler for lines containing it.
#[derive(Clone, Copy)]
pub struct LineRule {
    pub anchor: &'static str,
    handler: Handler,
}

impl std::fmt::Debug for LineRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRule").field("anchor", &self.anchor).finish()
    }
}

/// Rule table in priority order.
///
/// A merged line belongs to its leftmost label, so address precedes phone and
/// phone precedes bank account. The seller-company rule comes last: the name
/// also appears behind other labels (`Ký bởi`), and those lines belong to the
/// label.
pub const LINE_RULES: &[LineRule] = &[
    LineRule { anchor: ANCHOR_SIGNED_BY, handler: signed_by },
    LineRule { anchor: ANCHOR_SIGNING_DATE, handler: signing_date },
    LineRule { anchor: ANCHOR_LOOKUP_CODE, handler: lookup_code },
    LineRule { anchor: ANCHOR_TAX_AUTHORITY_CODE, handler: tax_authority_code },
    LineRule { anchor: ANCHOR_TAX_CODE, handler: tax_code },
    LineRule { anchor: ANCHOR_ADDRESS, handler: address },
    LineRule { anchor: ANCHOR_PHONE, handler: phone },
    LineRule { anchor: ANCHOR_BANK_ACCOUNT, handler: bank_account },
    LineRule { anchor: ANCHOR_SERIAL, handler: serial },
    LineRule { anchor: ANCHOR_INVOICE_NUMBER, handler: invoice_number },
    LineRule { anchor: ANCHOR_DATE, handler: invoice_date },
    LineRule { anchor: ANCHOR_BUYER_NAME, handler: buyer_name },
    LineRule { anchor: ANCHOR_BUYER_COMPANY, handler: buyer_company },
    LineRule { anchor: ANCHOR_PAYMENT_METHOD, handler: payment_method },
    LineRule { anchor: ANCHOR_TOTAL_EXCL_VAT, handler: total_excl_vat },
    LineRule { anchor: ANCHOR_VAT_RATE, handler: vat_rate },
    LineRule { anchor: ANCHOR_VAT_AMOUNT, handler: vat_amount },
    LineRule { anchor: ANCHOR_TOTAL_AMOUNT, handler: total_amount },
    LineRule { anchor: ANCHOR_AMOUNT_IN_WORDS, handler: amount_in_words },
    LineRule { anchor: SELLER_COMPANY, handler: seller_name },
];

/// Insert a non-empty value under `key` if the key is still free.
fn put(fields: &mut FieldMap, key: FieldKey, value: Option<&str>) {
    if let Some(v) = value.map(clean_text).filter(|v| !v.is_empty()) {
        fields.insert_text(key, &v);
    }
}

fn seller_name(_line: &ScanLine<'_>, fields: &mut FieldMap) {
    fields.insert_text(FieldKey::SellerName, SELLER_COMPANY);
}

/// First tax code seen is the seller's, any later one the buyer's.
fn tax_code(line: &ScanLine<'_>, fields: &mut FieldMap) {
    let Some(code) = line.value_capture(&LEADING_NUMBER) else {
        return;
    };
    let key = if fields.contains(FieldKey::SellerTaxCode) {
        FieldKey::BuyerTaxCode
    } else {
        FieldKey::SellerTaxCode
    };
    put(fields, key, Some(code));
}

/// Address, cut before a merged phone label, routed by the floor marker.
fn address(line: &ScanLine<'_>, fields: &mut FieldMap) {
    let Some(value) = line.value.map(|v| truncate_at(v, ANCHOR_PHONE)) else {
        return;
    };
    let key = if value.contains(SELLER_FLOOR_MARKER) || line.text.contains(SELLER_FLOOR_MARKER) {
        FieldKey::SellerAddress
    } else {
        FieldKey::BuyerAddress
    };
    put(fields, key, Some(value));
}

fn phone(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(
        fields,
        FieldKey::SellerPhone,
        line.value.map(|v| truncate_at(v, ANCHOR_BANK_ACCOUNT)),
    );
}

fn bank_account(line: &ScanLine<'_>, fields: &mut FieldMap) {
    if let Some(fragment) = line
        .value
        .map(|v| truncate_at(v, INVOICE_TITLE))
        .filter(|v| !v.trim().is_empty())
    {
        fields.insert_bank_account(fragment);
    }
}

fn serial(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::Serial, line.value_capture(&LEADING_CODE));
}

fn invoice_number(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::InvoiceNumber, line.value_capture(&LEADING_NUMBER));
}

fn invoice_date(line: &ScanLine<'_>, fields: &mut FieldMap) {
    if let Some(caps) = INVOICE_DATE.captures(line.text) {
        fields.insert_date(&caps[1], &caps[2], &caps[3]);
    }
}

fn tax_authority_code(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::TaxAuthorityCode, line.value_capture(&LEADING_CODE));
}

fn buyer_name(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::BuyerName, line.value);
}

fn buyer_company(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::BuyerCompany, line.value);
}

fn payment_method(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::PaymentMethod, line.value);
}

fn total_excl_vat(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::TotalExclVat, line.value_capture(&LEADING_AMOUNT));
}

/// Rate and, when printed on the same line, the VAT amount.
fn vat_rate(line: &ScanLine<'_>, fields: &mut FieldMap) {
    let rate = PERCENT
        .captures(line.text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or_else(|| line.value.map(|v| truncate_at(v, ANCHOR_VAT_AMOUNT)));
    put(fields, FieldKey::VatRate, rate);

    let amount = LINE_VAT_AMOUNT
        .captures(line.text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    put(fields, FieldKey::VatAmount, amount);
}

fn vat_amount(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::VatAmount, line.value_capture(&LEADING_AMOUNT));
}

fn total_amount(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::TotalAmount, line.value_capture(&LEADING_AMOUNT));
}

fn amount_in_words(line: &ScanLine<'_>, fields: &mut FieldMap) {
    let words = line
        .value
        .map(clean_text)
        .map(|v| v.trim_end_matches('.').trim_end().to_string());
    put(fields, FieldKey::AmountInWords, words.as_deref());
}

fn signed_by(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::SignedBy, line.value);
}

fn signing_date(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::SigningDate, line.value);
}

fn lookup_code(line: &ScanLine<'_>, fields: &mut FieldMap) {
    put(fields, FieldKey::LookupCode, line.value_capture(&LEADING_WORD));
}

/// Line-by-line anchor scan over [`LINE_RULES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LineScanStrategy;

impl LineScanStrategy {
    pub fn new() -> Self {
        Self
    }

    /// The rule that claims `line`, if any.
    pub fn classify(line: &str) -> Option<&'static LineRule> {
        LINE_RULES.iter().find(|rule| line.contains(rule.anchor))
    }
}

impl ExtractionStrategy for LineScanStrategy {
    fn name(&self) -> &'static str {
        "line_scan"
    }

    fn extract_fields(&self, text: &str, fields: &mut FieldMap) {
        let mut claimed = 0;
        for raw in text.lines() {
            let cleaned = clean_text(raw);
            if cleaned.is_empty() {
                continue;
            }
            if let Some(rule) = Self::classify(&cleaned) {
                trace!("Line claimed by {:?}: {}", rule.anchor, cleaned);
                (rule.handler)(&ScanLine::new(&cleaned), fields);
                claimed += 1;
            }
        }
        debug!("Line scan claimed {} lines, {} fields set", claimed, fields.len());
    }
}
