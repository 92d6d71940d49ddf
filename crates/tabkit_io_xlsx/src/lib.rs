//! `tabkit_io_xlsx` v1:
//! Multi-sheet XLSX export helper for string-typed tabular data.
//!
//! Modules:
//! - `conf`   : constants and default presets
//! - `spec`   : models/options/errors
//! - `util`   : pure helper functions (sheet naming, cell inference, paths)
//! - `book`   : workbook and sheet models filled by the caller
//! - `writer` : `rust_xlsxwriter`-backed writer kernel
//!
//! ```no_run
//! use tabkit_io_xlsx::XlsxWorkbook;
//!
//! let mut workbook = XlsxWorkbook::new("stations.xlsx")?;
//! let sheet = workbook.create_sheet("Radio Stations")?;
//! sheet.add_headers(["Call Letters", "Frequency", "Website"]);
//! sheet.add_row([Some("WXPN"), Some("88.5"), Some("https://xpn.org/")]);
//! workbook.write()?;
//! # Ok::<(), tabkit_io_xlsx::TabkitXlsxError>(())
//! ```
pub mod book;
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use book::{XlsxSheet, XlsxWorkbook};
pub use conf::{
    C_SHEET_NAME_REPLACEMENT_DEFAULT, C_XLSX_SUFFIX, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_LEN_EXCEL_STRING_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_SHEETS_WORKBOOK_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_workbook_options,
};
pub use spec::{
    EnumCellKind, EnumCellValue, NameError, SpecCellFormat, SpecSheetReport, SpecXlsxReport,
    SpecXlsxWorkbookOptions, TabkitXlsxError, ValidationError, WriteError,
};
pub use util::{
    dedupe_sheet_name, infer_cell_value, sanitize_sheet_name, truncate_sheet_name,
    validate_file_name, validate_file_out,
};
pub use writer::XlsxWriter;
