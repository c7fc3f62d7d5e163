//! Rendering of extracted fields as text, JSON or CSV.

use hddt_core::{FieldKey, FieldMap, LineItem};

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Sectioned plain-text report
    Text,
    /// JSON field map
    Json,
    /// CSV: scalar fields, then the line-items table
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

const FAILURE_BANNER: &str =
    "Không thể trích xuất thông tin cơ bản. Vui lòng kiểm tra văn bản gốc.";
const ITEMS_FAILURE: &str = "Không phân tích được bảng chi tiết hàng hóa.";
const NO_BUYER_NAME: &str = "(Không có)";
const ITEM_HEADERS: [&str; 3] = ["STT", "Tên Hàng hóa, dịch vụ", "Thành tiền (VND)"];

/// Renders a field map. Never modifies it.
#[derive(Debug, Clone)]
pub struct Presenter {
    placeholder: String,
    pretty_json: bool,
}

impl Presenter {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            pretty_json: true,
        }
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn render(&self, fields: &FieldMap, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text(fields)),
            OutputFormat::Json => self.render_json(fields),
            OutputFormat::Csv => self.render_csv(fields),
        }
    }

    /// Field text, or the placeholder when absent or null.
    fn value<'a>(&'a self, fields: &'a FieldMap, key: FieldKey) -> &'a str {
        fields.text(key).unwrap_or(&self.placeholder)
    }

    /// Issue date as dd/mm/yyyy with `..`/`....` for missing parts.
    pub fn date(&self, fields: &FieldMap) -> String {
        format!(
            "{}/{}/{}",
            fields.text(FieldKey::Day).unwrap_or(".."),
            fields.text(FieldKey::Month).unwrap_or(".."),
            fields.text(FieldKey::Year).unwrap_or("....")
        )
    }

    pub fn render_text(&self, fields: &FieldMap) -> String {
        if !fields.is_valid() {
            return format!("{}\n", FAILURE_BANNER);
        }

        let v = |key: FieldKey| self.value(fields, key);
        let mut out = String::new();

        out.push_str("Trích xuất thành công!\n\n");

        out.push_str("1. Thông tin chung Hóa đơn\n");
        out.push_str(&format!("  Số hóa đơn: {}\n", v(FieldKey::InvoiceNumber)));
        out.push_str(&format!("  Ký hiệu: {}\n", v(FieldKey::Serial)));
        out.push_str(&format!("  Ngày, tháng, năm: {}\n", self.date(fields)));
        out.push_str(&format!("  Mã CQT: {}\n", v(FieldKey::TaxAuthorityCode)));
        out.push('\n');

        out.push_str("2. Thông tin các bên\n");
        out.push_str("  Bên Bán\n");
        out.push_str(&format!("    Tên công ty: {}\n", v(FieldKey::SellerName)));
        out.push_str(&format!("    Mã số thuế: {}\n", v(FieldKey::SellerTaxCode)));
        out.push_str(&format!("    Địa chỉ: {}\n", v(FieldKey::SellerAddress)));
        out.push_str(&format!("    Điện thoại: {}\n", v(FieldKey::SellerPhone)));
        out.push_str(&format!(
            "    Tài khoản: {} tại {}\n",
            v(FieldKey::BankAccount),
            v(FieldKey::BankName)
        ));
        out.push_str("  Bên Mua\n");
        out.push_str(&format!("    Tên công ty: {}\n", v(FieldKey::BuyerCompany)));
        let buyer = fields
            .text(FieldKey::BuyerName)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_BUYER_NAME);
        out.push_str(&format!("    Họ tên người mua: {}\n", buyer));
        out.push_str(&format!("    Mã số thuế: {}\n", v(FieldKey::BuyerTaxCode)));
        out.push_str(&format!("    Địa chỉ: {}\n", v(FieldKey::BuyerAddress)));
        out.push_str(&format!(
            "    Hình thức thanh toán: {}\n",
            v(FieldKey::PaymentMethod)
        ));
        out.push('\n');

        out.push_str("3. Chi tiết hàng hóa, dịch vụ\n");
        match fields.line_items() {
            Some(items) if !items.is_empty() => out.push_str(&items_table(items)),
            _ => out.push_str(&format!("  {}\n", ITEMS_FAILURE)),
        }
        out.push('\n');

        out.push_str("4. Tổng cộng thanh toán\n");
        out.push_str(&format!(
            "  Cộng tiền hàng (chưa VAT): {}\n",
            v(FieldKey::TotalExclVat)
        ));
        out.push_str(&format!("  Thuế suất GTGT: {}\n", v(FieldKey::VatRate)));
        out.push_str(&format!("  Tiền thuế GTGT: {}\n", v(FieldKey::VatAmount)));
        out.push_str(&format!(
            "  Tổng tiền thanh toán: {}\n",
            v(FieldKey::TotalAmount)
        ));
        out.push_str(&format!(
            "  Số tiền viết bằng chữ: {}.\n",
            v(FieldKey::AmountInWords)
        ));
        out.push('\n');

        out.push_str("5. Thông tin Chữ ký và Tra cứu\n");
        out.push_str(&format!("  Ký bởi: {}\n", v(FieldKey::SignedBy)));
        out.push_str(&format!("  Ngày ký: {}\n", v(FieldKey::SigningDate)));
        out.push_str(&format!("  Mã tra cứu: {}\n", v(FieldKey::LookupCode)));

        out
    }

    pub fn render_json(&self, fields: &FieldMap) -> anyhow::Result<String> {
        let json = if self.pretty_json {
            serde_json::to_string_pretty(fields)?
        } else {
            serde_json::to_string(fields)?
        };
        Ok(json)
    }

    /// Scalar fields as one header + row table, then the line items as a
    /// second table after a blank line.
    pub fn render_csv(&self, fields: &FieldMap) -> anyhow::Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        let keys: Vec<FieldKey> = FieldKey::scalars().collect();
        wtr.write_record(keys.iter().map(FieldKey::as_str))?;
        wtr.write_record(keys.iter().map(|k| fields.text(*k).unwrap_or_default()))?;

        let mut data = String::from_utf8(wtr.into_inner()?)?;

        if let Some(items) = fields.line_items() {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(ITEM_HEADERS)?;
            for item in items {
                wtr.write_record([&item.ordinal, &item.description, &item.amount])?;
            }
            data.push('\n');
            data.push_str(&String::from_utf8(wtr.into_inner()?)?);
        }

        Ok(data)
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new("N/A")
    }
}

/// Column-aligned line-items table, indented two spaces.
fn items_table(items: &[LineItem]) -> String {
    let rows: Vec<[&str; 3]> = items
        .iter()
        .map(|i| [i.ordinal.as_str(), i.description.as_str(), i.amount.as_str()])
        .collect();

    let mut widths = ITEM_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str; 3]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{}{}", c, " ".repeat(w - c.chars().count())))
            .collect();
        format!("  {}\n", padded.join(" | ").trim_end())
    };

    let mut out = line(&ITEM_HEADERS);
    out.push_str(&format!(
        "  {}\n",
        widths.map(|w| "-".repeat(w)).join("-+-")
    ));
    for row in &rows {
        out.push_str(&line(row));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hddt_core::FieldValue;
    use pretty_assertions::assert_eq;

    fn sample() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert_text(FieldKey::InvoiceNumber, "00000123");
        fields.insert_text(FieldKey::Serial, "1C24TXV");
        fields.insert_date("15", "03", "2024");
        fields.insert_text(FieldKey::TotalAmount, "1.320.000");
        fields.insert_if_absent(
            FieldKey::LineItems,
            FieldValue::Items(vec![LineItem::new("1", "Dầu nhớt", "500.000")]),
        );
        fields.fill_missing_with_null(FieldKey::ALL);
        fields
    }

    #[test]
    fn test_text_sections_and_placeholder() {
        let out = Presenter::default().render_text(&sample());

        for section in [
            "1. Thông tin chung Hóa đơn",
            "2. Thông tin các bên",
            "3. Chi tiết hàng hóa, dịch vụ",
            "4. Tổng cộng thanh toán",
            "5. Thông tin Chữ ký và Tra cứu",
        ] {
            assert!(out.contains(section), "missing section {}", section);
        }
        assert!(out.contains("Số hóa đơn: 00000123"));
        assert!(out.contains("Ngày, tháng, năm: 15/03/2024"));
        assert!(out.contains("Mã CQT: N/A"));
        assert!(out.contains("Tài khoản: N/A tại N/A"));
        assert!(out.contains("Họ tên người mua: (Không có)"));
        assert!(out.contains("Dầu nhớt"));
    }

    #[test]
    fn test_custom_placeholder() {
        let out = Presenter::new("-").render_text(&sample());
        assert!(out.contains("Ký bởi: -"));
    }

    #[test]
    fn test_failure_banner() {
        let mut fields = FieldMap::new();
        fields.insert_text(FieldKey::SellerName, "CÔNG TY CỔ PHẦN Ô TÔ XUYÊN VIỆT");
        fields.fill_missing_with_null(FieldKey::ALL);
        let out = Presenter::default().render_text(&fields);
        assert_eq!(out, format!("{}\n", FAILURE_BANNER));
    }

    #[test]
    fn test_date_placeholders() {
        let mut fields = FieldMap::new();
        fields.insert_text(FieldKey::InvoiceNumber, "1");
        assert_eq!(Presenter::default().date(&fields), "../../....");
    }

    #[test]
    fn test_missing_items_line() {
        let mut fields = FieldMap::new();
        fields.insert_text(FieldKey::InvoiceNumber, "1");
        fields.insert_null(FieldKey::LineItems);
        let out = Presenter::default().render_text(&fields);
        assert!(out.contains(ITEMS_FAILURE));
    }

    #[test]
    fn test_json_keeps_nulls() {
        let out = Presenter::default()
            .with_pretty_json(false)
            .render_json(&sample())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["so_hoa_don"], "00000123");
        assert!(json["ma_cqt"].is_null());
        assert!(json.get("so_tai_khoan").is_none());
    }

    #[test]
    fn test_csv_tables() {
        let out = Presenter::default().render_csv(&sample()).unwrap();
        let mut parts = out.split("\n\n");

        let scalars = parts.next().unwrap();
        let mut lines = scalars.lines();
        assert!(lines.next().unwrap().starts_with("ten_cong_ty_ban,mst_ban,"));
        assert!(lines.next().unwrap().contains("00000123"));

        let items = parts.next().unwrap();
        assert_eq!(
            items.lines().collect::<Vec<_>>(),
            vec!["STT,\"Tên Hàng hóa, dịch vụ\",Thành tiền (VND)", "1,Dầu nhớt,500.000"]
        );
    }

    #[test]
    fn test_items_table_alignment() {
        let table = items_table(&[
            LineItem::new("1", "Dầu nhớt", "500.000"),
            LineItem::new("10", "Lọc gió", "1.500.000"),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("  10  | Lọc gió"));
    }
}
