//! Whole-text anchor scan.
//!
//! Every rule runs its pattern once against the entire document and keeps
//! only the first match.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::invoice::ExtractionStrategy;
use crate::models::fields::{FieldKey, FieldMap};

use super::patterns::*;

/// How a rule turns its match into field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureShape {
    /// The matched anchor text itself is the value.
    WholeMatch(FieldKey),
    /// First capture group of the first match.
    Group(FieldKey),
    /// Group of the second match when there are at least two, else the first.
    SecondMatchOrFirst(FieldKey),
    /// Day, month and year groups, stored together.
    DateTriple,
    /// Account fragment, split into account number and bank name.
    BankAccount,
}

/// One anchor pattern and what it produces.
#[derive(Debug, Clone, Copy)]
pub struct AnchorRule {
    pub pattern: &'static Regex,
    pub shape: CaptureShape,
}

impl AnchorRule {
    const fn new(pattern: &'static Regex, shape: CaptureShape) -> Self {
        Self { pattern, shape }
    }

    /// Apply the rule to `text`. Returns whether the anchor matched.
    pub fn apply(&self, text: &str, fields: &mut FieldMap) -> bool {
        match self.shape {
            CaptureShape::WholeMatch(key) => match self.pattern.find(text) {
                Some(m) => {
                    fields.insert_text(key, m.as_str());
                    true
                }
                None => false,
            },
            CaptureShape::Group(key) => match self.pattern.captures(text).and_then(|c| c.get(1)) {
                Some(m) => {
                    fields.insert_text(key, m.as_str());
                    true
                }
                None => false,
            },
            CaptureShape::SecondMatchOrFirst(key) => {
                let picked = self
                    .pattern
                    .captures_iter(text)
                    .filter_map(|c| c.get(1))
                    .take(2)
                    .last();
                match picked {
                    Some(m) => {
                        fields.insert_text(key, m.as_str());
                        true
                    }
                    None => false,
                }
            }
            CaptureShape::DateTriple => match self.pattern.captures(text) {
                Some(caps) => {
                    fields.insert_date(&caps[1], &caps[2], &caps[3]);
                    true
                }
                None => false,
            },
            CaptureShape::BankAccount => match self.pattern.captures(text) {
                Some(caps) => {
                    fields.insert_bank_account(&caps[1]);
                    true
                }
                None => false,
            },
        }
    }
}

lazy_static! {
    /// The template's rule table, in evaluation order.
    pub static ref WHOLE_TEXT_RULES: Vec<AnchorRule> = vec![
        AnchorRule::new(&SELLER_NAME, CaptureShape::WholeMatch(FieldKey::SellerName)),
        AnchorRule::new(&SELLER_TAX_CODE, CaptureShape::Group(FieldKey::SellerTaxCode)),
        AnchorRule::new(&SELLER_ADDRESS, CaptureShape::Group(FieldKey::SellerAddress)),
        AnchorRule::new(&SELLER_PHONE, CaptureShape::Group(FieldKey::SellerPhone)),
        AnchorRule::new(&BANK_ACCOUNT, CaptureShape::BankAccount),
        AnchorRule::new(&SERIAL, CaptureShape::Group(FieldKey::Serial)),
        AnchorRule::new(&INVOICE_NUMBER, CaptureShape::Group(FieldKey::InvoiceNumber)),
        AnchorRule::new(&INVOICE_DATE, CaptureShape::DateTriple),
        AnchorRule::new(&TAX_AUTHORITY_CODE, CaptureShape::Group(FieldKey::TaxAuthorityCode)),
        AnchorRule::new(&BUYER_NAME, CaptureShape::Group(FieldKey::BuyerName)),
        AnchorRule::new(&BUYER_COMPANY, CaptureShape::Group(FieldKey::BuyerCompany)),
        AnchorRule::new(&BUYER_TAX_CODE, CaptureShape::SecondMatchOrFirst(FieldKey::BuyerTaxCode)),
        AnchorRule::new(&BUYER_ADDRESS, CaptureShape::Group(FieldKey::BuyerAddress)),
        AnchorRule::new(&PAYMENT_METHOD, CaptureShape::Group(FieldKey::PaymentMethod)),
        AnchorRule::new(&TOTAL_EXCL_VAT, CaptureShape::Group(FieldKey::TotalExclVat)),
        AnchorRule::new(&VAT_RATE, CaptureShape::Group(FieldKey::VatRate)),
        AnchorRule::new(&VAT_AMOUNT, CaptureShape::Group(FieldKey::VatAmount)),
        AnchorRule::new(&TOTAL_AMOUNT, CaptureShape::Group(FieldKey::TotalAmount)),
        AnchorRule::new(&AMOUNT_IN_WORDS, CaptureShape::Group(FieldKey::AmountInWords)),
        AnchorRule::new(&SIGNED_BY, CaptureShape::Group(FieldKey::SignedBy)),
        AnchorRule::new(&SIGNING_DATE, CaptureShape::Group(FieldKey::SigningDate)),
        AnchorRule::new(&LOOKUP_CODE, CaptureShape::Group(FieldKey::LookupCode)),
    ];
}

/// Whole-text pattern scan over the template's rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeTextStrategy;

impl WholeTextStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionStrategy for WholeTextStrategy {
    fn name(&self) -> &'static str {
        "whole_text"
    }

    fn extract_fields(&self, text: &str, fields: &mut FieldMap) {
        let mut matched = 0;
        for rule in WHOLE_TEXT_RULES.iter() {
            if rule.apply(text, fields) {
                matched += 1;
            } else {
                trace!("No match for {:?}", rule.shape);
            }
        }
        debug!("Whole-text scan matched {}/{} anchors", matched, WHOLE_TEXT_RULES.len());
    }
}
