//! Anchor phrases and regex patterns of the e-invoice template.
//!
//! Whole-text patterns run in dot-matches-newline mode against the full
//! document; line patterns run against one cleaned physical line.

use lazy_static::lazy_static;
use regex::Regex;

/// Seller company printed in the template header.
pub const SELLER_COMPANY: &str = "CÔNG TY CỔ PHẦN Ô TÔ XUYÊN VIỆT";

/// Floor marker that tells the seller address from the buyer's in line scans.
pub const SELLER_FLOOR_MARKER: &str = "Tầng 3";

/// Title that follows the bank-account line.
pub const INVOICE_TITLE: &str = "HÓA ĐƠN GIÁ TRỊ GIA TĂNG";

// Literal line anchors.
pub const ANCHOR_TAX_CODE: &str = "Mã số thuế";
pub const ANCHOR_ADDRESS: &str = "Địa chỉ";
pub const ANCHOR_PHONE: &str = "Điện thoại";
pub const ANCHOR_BANK_ACCOUNT: &str = "Số tài khoản";
pub const ANCHOR_SERIAL: &str = "Ký hiệu";
pub const ANCHOR_INVOICE_NUMBER: &str = "Số (No.)";
pub const ANCHOR_DATE: &str = "Ngày (Date)";
pub const ANCHOR_TAX_AUTHORITY_CODE: &str = "Mã CQT";
pub const ANCHOR_BUYER_NAME: &str = "Họ tên người mua";
pub const ANCHOR_BUYER_COMPANY: &str = "Tên đơn vị";
pub const ANCHOR_PAYMENT_METHOD: &str = "Hình thức thanh toán";
pub const ANCHOR_TOTAL_EXCL_VAT: &str = "Cộng tiền hàng";
pub const ANCHOR_VAT_RATE: &str = "Thuế suất GTGT";
pub const ANCHOR_VAT_AMOUNT: &str = "Tiền thuế GTGT";
pub const ANCHOR_TOTAL_AMOUNT: &str = "Tổng tiền thanh toán";
pub const ANCHOR_AMOUNT_IN_WORDS: &str = "Số tiền viết bằng chữ";
pub const ANCHOR_SIGNED_BY: &str = "Ký bởi";
pub const ANCHOR_SIGNING_DATE: &str = "Ký ngày";
pub const ANCHOR_LOOKUP_CODE: &str = "Mã tra cứu";

// Line-items block markers.
pub const ITEMS_BLOCK_START: &str = "(Amount)";
pub const ITEMS_HEADER_ORDINAL: &str = "STT";
pub const ITEMS_HEADER_DESCRIPTION: &str = "Tên hàng hóa";

lazy_static! {
    // Seller block
    pub static ref SELLER_NAME: Regex = Regex::new(
        r"CÔNG TY CỔ PHẦN Ô TÔ XUYÊN VIỆT"
    ).unwrap();

    pub static ref SELLER_TAX_CODE: Regex = Regex::new(
        r"(?s)Mã số thuế\s*\(Tax code\):\s*(\d+)"
    ).unwrap();

    pub static ref SELLER_ADDRESS: Regex = Regex::new(
        r"(?s)Địa chỉ\s*\(Address\):\s*(.*?)\n\s*Điện thoại"
    ).unwrap();

    pub static ref SELLER_PHONE: Regex = Regex::new(
        r"(?s)Điện thoại\s*\(Tel\):\s*(.*?)\n"
    ).unwrap();

    pub static ref BANK_ACCOUNT: Regex = Regex::new(
        r"(?s)Số tài khoản\s*\(Bank account\):\s*(.*?)\s*HÓA ĐƠN GIÁ TRỊ GIA TĂNG"
    ).unwrap();

    // Invoice header
    pub static ref SERIAL: Regex = Regex::new(
        r"(?s)Ký hiệu\s*\(Serial\):\s*([A-Z0-9]+)"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?s)Số\s*\(No\.\):\s*(\d+)"
    ).unwrap();

    pub static ref INVOICE_DATE: Regex = Regex::new(
        r"(?s)Ngày\s*\(Date\)\s*(\d{2})\s*tháng\s*\(month\)\s*(\d{2})\s*năm\s*\(year\)\s*(\d{4})"
    ).unwrap();

    pub static ref TAX_AUTHORITY_CODE: Regex = Regex::new(
        r"(?s)Mã CQT\s*\(Code\):\s*([A-Z0-9]+)"
    ).unwrap();

    // Buyer block
    pub static ref BUYER_NAME: Regex = Regex::new(
        r"(?s)Họ tên người mua hàng\s*\(Buyer\):\s*(.*?)\n"
    ).unwrap();

    pub static ref BUYER_COMPANY: Regex = Regex::new(
        r"(?s)Tên đơn vị\s*\(Company's name\):\s*(.*?)\n"
    ).unwrap();

    /// Tax code preceded by the buyer company anchor.
    pub static ref BUYER_TAX_CODE: Regex = Regex::new(
        r"(?s)Tên đơn vị.*?Mã số thuế\s*\(Tax code\):\s*(\d+)"
    ).unwrap();

    pub static ref BUYER_ADDRESS: Regex = Regex::new(
        r"(?s)Địa chỉ\s*\(Address\):\s*(Tầng 3,.*?Nam)"
    ).unwrap();

    pub static ref PAYMENT_METHOD: Regex = Regex::new(
        r"(?s)Hình thức thanh toán\s*\(Payment method\):\s*(.*?)\n"
    ).unwrap();

    // Totals
    pub static ref TOTAL_EXCL_VAT: Regex = Regex::new(
        r"(?s)Cộng tiền hàng\s*\(Total amount excl\. VAT\):\s*([\d.,]+)"
    ).unwrap();

    pub static ref VAT_RATE: Regex = Regex::new(
        r"(?s)Thuế suất GTGT\s*\(VAT rate\):\s*(.*?)\s*Tiền thuế GTGT"
    ).unwrap();

    pub static ref VAT_AMOUNT: Regex = Regex::new(
        r"(?s)Tiền thuế GTGT\s*\(VAT amount\):\s*([\d.,]+)"
    ).unwrap();

    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?s)Tổng tiền thanh toán\s*\(Total amount\):\s*([\d.,]+)"
    ).unwrap();

    pub static ref AMOUNT_IN_WORDS: Regex = Regex::new(
        r"(?s)Số tiền viết bằng chữ\s*\(Total amount in words\):\s*(.*?)\."
    ).unwrap();

    // Signature block
    pub static ref SIGNED_BY: Regex = Regex::new(
        r"(?s)Ký bởi\s*\(Signed By\):\s*(.*?)\n"
    ).unwrap();

    pub static ref SIGNING_DATE: Regex = Regex::new(
        r"(?s)Ký ngày\s*\(Signing Date\):\s*(.*?)\n"
    ).unwrap();

    pub static ref LOOKUP_CODE: Regex = Regex::new(
        r"(?s)Mã tra cứu\s*\(Invoice code\):\s*([\w_]+)"
    ).unwrap();

    // Line items
    pub static ref ITEMS_BLOCK: Regex = Regex::new(
        r"(?s)\(Amount\)(.*?)\s*Cộng tiền hàng"
    ).unwrap();

    pub static ref LEADING_NUMBER: Regex = Regex::new(
        r"^\s*(\d+)"
    ).unwrap();

    pub static ref LEADING_DIGITS: Regex = Regex::new(
        r"^\d+"
    ).unwrap();

    /// Installment note with an interpolated token: `(đợt 1 3)`.
    pub static ref INSTALLMENT_ARTIFACT: Regex = Regex::new(
        r"\(đợt\s*\d+\s*(\d+)\)"
    ).unwrap();

    // Line-scan value shapes
    pub static ref LEADING_CODE: Regex = Regex::new(
        r"^\s*([A-Z0-9]+)"
    ).unwrap();

    pub static ref LEADING_WORD: Regex = Regex::new(
        r"^\s*([\w_]+)"
    ).unwrap();

    pub static ref LEADING_AMOUNT: Regex = Regex::new(
        r"^\s*([\d.,]+)"
    ).unwrap();

    pub static ref PERCENT: Regex = Regex::new(
        r"(\d+(?:[.,]\d+)?\s*%)"
    ).unwrap();

    pub static ref LINE_VAT_AMOUNT: Regex = Regex::new(
        r"Tiền thuế GTGT\s*\(VAT amount\):\s*([\d.,]+)"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        lazy_static::initialize(&SELLER_NAME);
        lazy_static::initialize(&INVOICE_DATE);
        lazy_static::initialize(&BUYER_TAX_CODE);
        lazy_static::initialize(&ITEMS_BLOCK);
        lazy_static::initialize(&INSTALLMENT_ARTIFACT);
        lazy_static::initialize(&PERCENT);
    }

    #[test]
    fn test_seller_address_stops_before_phone_line() {
        let text = "Địa chỉ (Address): Số 1 Lê Lợi,\nQuận 1\n  Điện thoại (Tel): 028";
        let caps = SELLER_ADDRESS.captures(text).unwrap();
        assert_eq!(&caps[1], "Số 1 Lê Lợi,\nQuận 1");
    }

    #[test]
    fn test_installment_artifact() {
        let fixed = INSTALLMENT_ARTIFACT.replace_all("bảo dưỡng (đợt 1 3)", "(đợt $1)");
        assert_eq!(fixed, "bảo dưỡng (đợt 3)");
    }
}
