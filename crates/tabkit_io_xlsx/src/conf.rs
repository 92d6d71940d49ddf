//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{SpecCellFormat, SpecXlsxWorkbookOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Excel hyperlink target maximum length.
pub const N_LEN_EXCEL_URL_MAX: usize = 2_080;
/// Excel string cell maximum length.
pub const N_LEN_EXCEL_STRING_MAX: usize = 32_767;
/// URL schemes `rust_xlsxwriter` reads as its own link syntax.
pub const TUP_XLSX_URL_SCHEMES_RESERVED: [&str; 2] = ["internal", "external"];
/// Maximum number of sheets one workbook may hold.
pub const N_SHEETS_WORKBOOK_MAX: usize = 255;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['\\', '/', '?', '*', '[', ']', ':'];
/// Character not allowed at either end of a sheet name.
pub const C_EXCEL_QUOTE: char = '\'';
/// Sheet names Excel reserves for itself (compared case-insensitively).
pub const TUP_EXCEL_RESERVED_SHEET_NAMES: [&str; 1] = ["History"];
/// Default replacement for illegal sheet name characters.
pub const C_SHEET_NAME_REPLACEMENT_DEFAULT: char = '-';
/// Required output file suffix.
pub const C_XLSX_SUFFIX: &str = ".xlsx";
/// Output file name maximum length, suffix included.
pub const N_LEN_FILE_NAME_MAX: usize = 31;
/// Accent color used by hyperlink cells.
pub const C_HYPERLINK_FONT_COLOR: &str = "#0563C1";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Header row cell format.
    Header,
    /// Hyperlink cell format.
    Hyperlink,
}

impl EnumFmtKey {
    /// Key used in [`derive_default_xlsx_formats`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Hyperlink => "hyperlink",
        }
    }
}

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        },
    );
    dict_fmt.insert(
        EnumFmtKey::Hyperlink.as_str().to_string(),
        SpecCellFormat {
            underline: Some(true),
            font_color: Some(C_HYPERLINK_FONT_COLOR.to_string()),
            ..Default::default()
        },
    );

    dict_fmt
}

/// Build default workbook options.
pub fn derive_default_workbook_options() -> SpecXlsxWorkbookOptions {
    SpecXlsxWorkbookOptions::default()
}
