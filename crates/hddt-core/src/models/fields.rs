//! The flat field map produced by extraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::invoice::rules::{clean_text, split_bank_account};

/// Output keys of the e-invoice template.
///
/// Serialized names are the template's own key names, which downstream
/// consumers rely on. Declaration order is the rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "ten_cong_ty_ban")]
    SellerName,
    #[serde(rename = "mst_ban")]
    SellerTaxCode,
    #[serde(rename = "dia_chi_ban")]
    SellerAddress,
    #[serde(rename = "dien_thoai")]
    SellerPhone,
    #[serde(rename = "so_tai_khoan")]
    BankAccount,
    #[serde(rename = "ngan_hang")]
    BankName,
    #[serde(rename = "ky_hieu")]
    Serial,
    #[serde(rename = "so_hoa_don")]
    InvoiceNumber,
    #[serde(rename = "Ngày")]
    Day,
    #[serde(rename = "Tháng")]
    Month,
    #[serde(rename = "Năm")]
    Year,
    #[serde(rename = "ma_cqt")]
    TaxAuthorityCode,
    #[serde(rename = "ten_nguoi_mua")]
    BuyerName,
    #[serde(rename = "ten_cong_ty_mua")]
    BuyerCompany,
    #[serde(rename = "mst_mua")]
    BuyerTaxCode,
    #[serde(rename = "dia_chi_mua")]
    BuyerAddress,
    #[serde(rename = "hinh_thuc_thanh_toan")]
    PaymentMethod,
    #[serde(rename = "cong_tien_hang")]
    TotalExclVat,
    #[serde(rename = "thue_suat_gtgt")]
    VatRate,
    #[serde(rename = "tien_thue_gtgt")]
    VatAmount,
    #[serde(rename = "tong_tien_thanh_toan")]
    TotalAmount,
    #[serde(rename = "so_tien_bang_chu")]
    AmountInWords,
    #[serde(rename = "ky_boi")]
    SignedBy,
    #[serde(rename = "ky_ngay")]
    SigningDate,
    #[serde(rename = "ma_tra_cuu")]
    LookupCode,
    #[serde(rename = "chi_tiet_hang_hoa")]
    LineItems,
}

impl FieldKey {
    /// Every key, in rendering order.
    pub const ALL: [FieldKey; 26] = [
        FieldKey::SellerName,
        FieldKey::SellerTaxCode,
        FieldKey::SellerAddress,
        FieldKey::SellerPhone,
        FieldKey::BankAccount,
        FieldKey::BankName,
        FieldKey::Serial,
        FieldKey::InvoiceNumber,
        FieldKey::Day,
        FieldKey::Month,
        FieldKey::Year,
        FieldKey::TaxAuthorityCode,
        FieldKey::BuyerName,
        FieldKey::BuyerCompany,
        FieldKey::BuyerTaxCode,
        FieldKey::BuyerAddress,
        FieldKey::PaymentMethod,
        FieldKey::TotalExclVat,
        FieldKey::VatRate,
        FieldKey::VatAmount,
        FieldKey::TotalAmount,
        FieldKey::AmountInWords,
        FieldKey::SignedBy,
        FieldKey::SigningDate,
        FieldKey::LookupCode,
        FieldKey::LineItems,
    ];

    /// Template key name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::SellerName => "ten_cong_ty_ban",
            FieldKey::SellerTaxCode => "mst_ban",
            FieldKey::SellerAddress => "dia_chi_ban",
            FieldKey::SellerPhone => "dien_thoai",
            FieldKey::BankAccount => "so_tai_khoan",
            FieldKey::BankName => "ngan_hang",
            FieldKey::Serial => "ky_hieu",
            FieldKey::InvoiceNumber => "so_hoa_don",
            FieldKey::Day => "Ngày",
            FieldKey::Month => "Tháng",
            FieldKey::Year => "Năm",
            FieldKey::TaxAuthorityCode => "ma_cqt",
            FieldKey::BuyerName => "ten_nguoi_mua",
            FieldKey::BuyerCompany => "ten_cong_ty_mua",
            FieldKey::BuyerTaxCode => "mst_mua",
            FieldKey::BuyerAddress => "dia_chi_mua",
            FieldKey::PaymentMethod => "hinh_thuc_thanh_toan",
            FieldKey::TotalExclVat => "cong_tien_hang",
            FieldKey::VatRate => "thue_suat_gtgt",
            FieldKey::VatAmount => "tien_thue_gtgt",
            FieldKey::TotalAmount => "tong_tien_thanh_toan",
            FieldKey::AmountInWords => "so_tien_bang_chu",
            FieldKey::SignedBy => "ky_boi",
            FieldKey::SigningDate => "ky_ngay",
            FieldKey::LookupCode => "ma_tra_cuu",
            FieldKey::LineItems => "chi_tiet_hang_hoa",
        }
    }

    /// Look a key up by its template name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Whether a missing anchor records this key as null.
    ///
    /// The date triple and the two bank sub-fields stay absent instead.
    pub fn is_nullable(&self) -> bool {
        !matches!(
            self,
            FieldKey::Day
                | FieldKey::Month
                | FieldKey::Year
                | FieldKey::BankAccount
                | FieldKey::BankName
        )
    }

    /// Keys that hold a single text value.
    pub fn scalars() -> impl Iterator<Item = FieldKey> {
        Self::ALL.into_iter().filter(|k| *k != FieldKey::LineItems)
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the goods/services section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Ordinal as printed (STT).
    #[serde(rename = "STT")]
    pub ordinal: String,

    /// Goods or service description.
    #[serde(rename = "Tên Hàng hóa, dịch vụ")]
    pub description: String,

    /// Line amount as printed, in VND.
    #[serde(rename = "Thành tiền (VND)")]
    pub amount: String,
}

impl LineItem {
    /// Create a line item, cleaning every part.
    pub fn new(ordinal: &str, description: &str, amount: &str) -> Self {
        Self {
            ordinal: clean_text(ordinal),
            description: clean_text(description),
            amount: clean_text(amount),
        }
    }
}

/// Value stored under a field key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A cleaned text value.
    Text(String),
    /// The line-items list.
    Items(Vec<LineItem>),
    /// The anchor was looked for and not found.
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Field-key to value mapping built by the extractor.
///
/// Every write goes through a guarded insert: once a key holds anything,
/// including null, later writes to it are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: BTreeMap<FieldKey, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` unless `key` is already present. Text is cleaned.
    ///
    /// Returns whether the value was stored.
    pub fn insert_if_absent(&mut self, key: FieldKey, value: FieldValue) -> bool {
        if self.fields.contains_key(&key) {
            return false;
        }
        let value = match value {
            FieldValue::Text(s) => FieldValue::Text(clean_text(&s)),
            other => other,
        };
        self.fields.insert(key, value);
        true
    }

    /// Insert a text value unless `key` is already present.
    pub fn insert_text(&mut self, key: FieldKey, value: &str) -> bool {
        self.insert_if_absent(key, FieldValue::Text(value.to_string()))
    }

    /// Record `key` as looked-for but not found, unless already present.
    pub fn insert_null(&mut self, key: FieldKey) -> bool {
        self.insert_if_absent(key, FieldValue::Null)
    }

    /// Insert day, month and year together, or nothing.
    pub fn insert_date(&mut self, day: &str, month: &str, year: &str) -> bool {
        if [FieldKey::Day, FieldKey::Month, FieldKey::Year]
            .iter()
            .any(|k| self.fields.contains_key(k))
        {
            return false;
        }
        self.insert_text(FieldKey::Day, day);
        self.insert_text(FieldKey::Month, month);
        self.insert_text(FieldKey::Year, year);
        true
    }

    /// Split a bank-account fragment on its first `-` and insert both parts.
    ///
    /// A fragment without a separator yields an empty bank name.
    pub fn insert_bank_account(&mut self, fragment: &str) -> bool {
        if self.fields.contains_key(&FieldKey::BankAccount)
            || self.fields.contains_key(&FieldKey::BankName)
        {
            return false;
        }
        let (account, bank) = split_bank_account(fragment);
        self.insert_text(FieldKey::BankAccount, &account);
        self.insert_text(FieldKey::BankName, &bank);
        true
    }

    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields.get(&key)
    }

    /// Text under `key`, if present and not null.
    pub fn text(&self, key: FieldKey) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// Line items, if present and not null.
    pub fn line_items(&self) -> Option<&[LineItem]> {
        match self.get(FieldKey::LineItems) {
            Some(FieldValue::Items(items)) => Some(items),
            _ => None,
        }
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    pub fn is_null(&self, key: FieldKey) -> bool {
        self.get(key).is_some_and(FieldValue::is_null)
    }

    /// Present and not null.
    pub fn has_value(&self, key: FieldKey) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    /// Record every still-absent nullable key in `keys` as null.
    pub fn fill_missing_with_null(&mut self, keys: impl IntoIterator<Item = FieldKey>) {
        for key in keys {
            if key.is_nullable() {
                self.insert_null(key);
            }
        }
    }

    /// Copy non-null values from `other` for keys absent or null here.
    ///
    /// Returns the number of keys filled.
    pub fn merge_missing(&mut self, other: FieldMap) -> usize {
        let mut filled = 0;
        for (key, value) in other.fields {
            if value.is_null() || self.has_value(key) {
                continue;
            }
            self.fields.insert(key, value);
            filled += 1;
        }
        filled
    }

    pub fn remove(&mut self, key: FieldKey) -> Option<FieldValue> {
        self.fields.remove(&key)
    }

    /// Validity gate: the invoice number is present and non-empty.
    pub fn is_valid(&self) -> bool {
        self.text(FieldKey::InvoiceNumber)
            .is_some_and(|n| !n.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_if_absent_first_wins() {
        let mut map = FieldMap::new();
        assert!(map.insert_text(FieldKey::SignedBy, "  Nguyễn\n Văn A "));
        assert!(!map.insert_text(FieldKey::SignedBy, "Trần Thị B"));
        assert_eq!(map.text(FieldKey::SignedBy), Some("Nguyễn Văn A"));
    }

    #[test]
    fn test_null_blocks_later_inserts() {
        let mut map = FieldMap::new();
        map.insert_null(FieldKey::Serial);
        assert!(!map.insert_text(FieldKey::Serial, "1C24TXV"));
        assert!(map.is_null(FieldKey::Serial));
        assert!(!map.has_value(FieldKey::Serial));
    }

    #[test]
    fn test_insert_date_is_atomic() {
        let mut map = FieldMap::new();
        map.insert_text(FieldKey::Month, "03");
        assert!(!map.insert_date("15", "04", "2024"));
        assert!(!map.contains(FieldKey::Day));
        assert!(!map.contains(FieldKey::Year));

        let mut map = FieldMap::new();
        assert!(map.insert_date("15", "03", "2024"));
        assert_eq!(map.text(FieldKey::Day), Some("15"));
        assert_eq!(map.text(FieldKey::Month), Some("03"));
        assert_eq!(map.text(FieldKey::Year), Some("2024"));
    }

    #[test]
    fn test_insert_bank_account_split() {
        let mut map = FieldMap::new();
        assert!(map.insert_bank_account("123456 - Vietcombank"));
        assert_eq!(map.text(FieldKey::BankAccount), Some("123456"));
        assert_eq!(map.text(FieldKey::BankName), Some("Vietcombank"));

        let mut map = FieldMap::new();
        map.insert_bank_account("123456");
        assert_eq!(map.text(FieldKey::BankAccount), Some("123456"));
        assert_eq!(map.text(FieldKey::BankName), Some(""));
    }

    #[test]
    fn test_fill_missing_skips_date_and_bank() {
        let mut map = FieldMap::new();
        map.insert_text(FieldKey::InvoiceNumber, "42");
        map.fill_missing_with_null(FieldKey::ALL);

        assert_eq!(map.text(FieldKey::InvoiceNumber), Some("42"));
        assert!(map.is_null(FieldKey::SellerTaxCode));
        assert!(map.is_null(FieldKey::LineItems));
        assert!(!map.contains(FieldKey::Day));
        assert!(!map.contains(FieldKey::BankName));
    }

    #[test]
    fn test_merge_missing_never_overrides() {
        let mut primary = FieldMap::new();
        primary.insert_text(FieldKey::InvoiceNumber, "0000123");

        let mut secondary = FieldMap::new();
        secondary.insert_text(FieldKey::InvoiceNumber, "999");
        secondary.insert_text(FieldKey::SellerPhone, "028 1234 5678");
        secondary.insert_null(FieldKey::LookupCode);

        assert_eq!(primary.merge_missing(secondary), 1);
        assert_eq!(primary.text(FieldKey::InvoiceNumber), Some("0000123"));
        assert_eq!(primary.text(FieldKey::SellerPhone), Some("028 1234 5678"));
        assert!(!primary.contains(FieldKey::LookupCode));
    }

    #[test]
    fn test_merge_missing_replaces_null() {
        let mut primary = FieldMap::new();
        primary.insert_text(FieldKey::InvoiceNumber, "0000123");
        primary.fill_missing_with_null(FieldKey::ALL);
        assert!(primary.is_null(FieldKey::Serial));

        let mut secondary = FieldMap::new();
        secondary.insert_text(FieldKey::Serial, "1C24TXV");
        secondary.insert_text(FieldKey::InvoiceNumber, "999");
        secondary.insert_null(FieldKey::LookupCode);

        assert_eq!(primary.merge_missing(secondary), 1);
        assert_eq!(primary.text(FieldKey::Serial), Some("1C24TXV"));
        assert_eq!(primary.text(FieldKey::InvoiceNumber), Some("0000123"));
        assert!(primary.is_null(FieldKey::LookupCode));
    }

    #[test]
    fn test_validity_gate() {
        let mut map = FieldMap::new();
        for key in FieldKey::scalars() {
            if key != FieldKey::InvoiceNumber {
                map.insert_text(key, "x");
            }
        }
        assert!(!map.is_valid());

        map.insert_text(FieldKey::InvoiceNumber, "   ");
        assert!(!map.is_valid());

        let mut map = FieldMap::new();
        map.insert_text(FieldKey::InvoiceNumber, "00000042");
        assert!(map.is_valid());
    }

    #[test]
    fn test_serialize_template_keys() {
        let mut map = FieldMap::new();
        map.insert_text(FieldKey::InvoiceNumber, "42");
        map.insert_null(FieldKey::BuyerTaxCode);
        map.insert_date("01", "02", "2024");
        map.insert_if_absent(
            FieldKey::LineItems,
            FieldValue::Items(vec![LineItem::new("1", "Dầu nhớt", "500000")]),
        );

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["so_hoa_don"], "42");
        assert!(json["mst_mua"].is_null());
        assert_eq!(json["Ngày"], "01");
        assert_eq!(json["chi_tiet_hang_hoa"][0]["Tên Hàng hóa, dịch vụ"], "Dầu nhớt");

        let back: FieldMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_name(key.as_str()), Some(key));
        }
        assert_eq!(FieldKey::from_name("khong_co"), None);
    }
}
