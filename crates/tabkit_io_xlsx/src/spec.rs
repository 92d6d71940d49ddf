//! Shared XLSX specification models, options and errors.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::conf::{C_SHEET_NAME_REPLACEMENT_DEFAULT, EnumFmtKey, derive_default_xlsx_formats};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification; `None` fields leave the collaborator default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,
    /// Single underline.
    pub underline: Option<bool>,
    /// Font color (`#RRGGBB`).
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            underline: other.underline.or(self.underline),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Typed cell value inferred from one raw string cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing value; nothing is written.
    Blank,
    /// Finite decimal number.
    Number(f64),
    /// Absolute URL; the original string is both link target and text.
    Hyperlink(String),
    /// `true` / `false`, any letter case.
    Boolean(bool),
    /// Anything else, untrimmed.
    Text(String),
}

/// Discriminant of [`EnumCellValue`], used for report counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumCellKind {
    Blank,
    Number,
    Hyperlink,
    Boolean,
    Text,
}

impl EnumCellValue {
    /// Kind of this value.
    pub fn kind(&self) -> EnumCellKind {
        match self {
            Self::Blank => EnumCellKind::Blank,
            Self::Number(_) => EnumCellKind::Number,
            Self::Hyperlink(_) => EnumCellKind::Hyperlink,
            Self::Boolean(_) => EnumCellKind::Boolean,
            Self::Text(_) => EnumCellKind::Text,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkbookOptions

/// Workbook-wide options controlling naming and cell styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWorkbookOptions {
    /// Replacement for characters that are illegal in sheet names.
    pub sheet_name_replacement: char,
    /// Format applied to header row cells.
    pub fmt_header: SpecCellFormat,
    /// Format applied to hyperlink cells.
    pub fmt_hyperlink: SpecCellFormat,
}

impl Default for SpecXlsxWorkbookOptions {
    fn default() -> Self {
        let mut dict_fmt = derive_default_xlsx_formats();
        Self {
            sheet_name_replacement: C_SHEET_NAME_REPLACEMENT_DEFAULT,
            fmt_header: dict_fmt
                .remove(EnumFmtKey::Header.as_str())
                .unwrap_or_default(),
            fmt_hyperlink: dict_fmt
                .remove(EnumFmtKey::Hyperlink.as_str())
                .unwrap_or_default(),
        }
    }
}

impl SpecXlsxWorkbookOptions {
    /// Overlay `patch` onto the header format.
    pub fn with_header_format(mut self, patch: SpecCellFormat) -> Self {
        self.fmt_header = self.fmt_header.with_(patch);
        self
    }

    /// Overlay `patch` onto the hyperlink format.
    pub fn with_hyperlink_format(mut self, patch: SpecCellFormat) -> Self {
        self.fmt_hyperlink = self.fmt_hyperlink.with_(patch);
        self
    }

    /// Use `replace_to` for illegal sheet name characters.
    pub fn with_sheet_name_replacement(mut self, replace_to: char) -> Self {
        self.sheet_name_replacement = replace_to;
        self
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet write summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSheetReport {
    /// Sheet name as written to the workbook.
    pub sheet_name: String,
    /// Whether a header row was emitted.
    pub if_has_header: bool,
    /// Number of data rows emitted (header excluded).
    pub cnt_rows: u64,
    /// Blank cells skipped.
    pub cnt_blank: u64,
    /// Numeric cells written.
    pub cnt_number: u64,
    /// Hyperlink cells written.
    pub cnt_hyperlink: u64,
    /// Boolean cells written.
    pub cnt_boolean: u64,
    /// Text cells written.
    pub cnt_text: u64,
}

impl SpecSheetReport {
    pub(crate) fn new(sheet_name: &str, if_has_header: bool) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            if_has_header,
            ..Default::default()
        }
    }

    /// Count one emitted cell of `kind`.
    pub fn add_cell(&mut self, kind: EnumCellKind) {
        match kind {
            EnumCellKind::Blank => self.cnt_blank += 1,
            EnumCellKind::Number => self.cnt_number += 1,
            EnumCellKind::Hyperlink => self.cnt_hyperlink += 1,
            EnumCellKind::Boolean => self.cnt_boolean += 1,
            EnumCellKind::Text => self.cnt_text += 1,
        }
    }

    /// Number of cells counted as `kind`.
    pub fn count(&self, kind: EnumCellKind) -> u64 {
        match kind {
            EnumCellKind::Blank => self.cnt_blank,
            EnumCellKind::Number => self.cnt_number,
            EnumCellKind::Hyperlink => self.cnt_hyperlink,
            EnumCellKind::Boolean => self.cnt_boolean,
            EnumCellKind::Text => self.cnt_text,
        }
    }
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// File written.
    pub file_out: PathBuf,
    /// Serialized workbook size.
    pub n_bytes: u64,
    /// One entry per sheet, in tab order.
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let n_rows: u64 = self.sheets.iter().map(|s| s.cnt_rows).sum();
        format!(
            "{prefix} file={} sheets={} rows={} bytes={} warnings={}",
            self.file_out.display(),
            self.sheets.len(),
            n_rows,
            self.n_bytes,
            self.warnings.len()
        )
    }
}

impl fmt::Display for SpecXlsxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[XLSX]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Target path rejected at workbook construction.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// File name component is missing or empty.
    #[error("File name must not be empty.")]
    EmptyFileName,
    /// File name is not valid UTF-8.
    #[error("File name is not valid UTF-8: {}", .0.display())]
    NonUtf8FileName(PathBuf),
    /// Parent directory does not exist.
    #[error("Target directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    /// Parent path exists but is not a directory.
    #[error("Target location is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// A file cannot be created in the parent directory.
    #[error("Target directory is not writable: {}", path.display())]
    DirectoryNotWritable {
        /// Directory that failed the probe.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Sheet creation rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// Sheet name is missing or empty.
    #[error("Sheet name must not be null or empty.")]
    EmptyName,
    /// Configured replacement is itself illegal in sheet names.
    #[error("Sheet name replacement {0:?} is not a legal sheet name character.")]
    IllegalReplacement(char),
    /// Workbook already holds the maximum number of sheets.
    #[error("Workbook already holds the maximum of {limit} sheets.")]
    SheetLimitExceeded {
        /// Sheet count limit.
        limit: usize,
    },
    /// No unique suffixed variant found within the search bound.
    #[error("No unique variant of sheet name {name:?} within {limit} attempts.")]
    TooManyNames {
        /// Candidate name after sanitizing.
        name: String,
        /// Search bound.
        limit: usize,
    },
}

/// Workbook write failed.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Workbook holds no sheets.
    #[error("There are no sheets to write to the file.")]
    EmptyWorkbook,
    /// Sheet content exceeds Excel's grid limits.
    #[error("Sheet {sheet_name:?} needs {n_rows} rows x {n_cols} columns; Excel allows {n_rows_max} x {n_cols_max}.")]
    SheetTooLarge {
        /// Offending sheet.
        sheet_name: String,
        /// Rows required, header included.
        n_rows: usize,
        /// Columns required.
        n_cols: usize,
        /// Excel row limit.
        n_rows_max: usize,
        /// Excel column limit.
        n_cols_max: usize,
    },
    /// A string cell exceeds Excel's per-cell character limit.
    #[error("Sheet {sheet_name:?} cell at row {row}, column {col} has {n_len} characters; Excel allows {n_len_max}.")]
    CellTooLong {
        /// Offending sheet.
        sheet_name: String,
        /// Zero-based worksheet row, header included.
        row: usize,
        /// Zero-based column.
        col: usize,
        /// Characters in the cell.
        n_len: usize,
        /// Excel string limit.
        n_len_max: usize,
    },
    /// Format collaborator rejected a cell or failed to serialize.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// Target file could not be written.
    #[error("Unexpected IO error writing {}: {source}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Any failure raised by this crate.
#[derive(Debug, Error)]
pub enum TabkitXlsxError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_right_side_values() {
        let base = SpecCellFormat {
            font_name: Some("Calibri".to_string()),
            bold: Some(false),
            ..Default::default()
        };
        let merged = base.with_(SpecCellFormat {
            bold: Some(true),
            underline: Some(true),
            ..Default::default()
        });

        assert_eq!(merged.font_name.as_deref(), Some("Calibri"));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.underline, Some(true));
        assert_eq!(merged.italic, None);
    }

    #[test]
    fn test_sheet_report_counts_by_kind() {
        let mut report = SpecSheetReport::new("Data", true);
        for value in [
            EnumCellValue::Number(1.0),
            EnumCellValue::Number(2.5),
            EnumCellValue::Text("a".to_string()),
            EnumCellValue::Blank,
        ] {
            report.add_cell(value.kind());
        }

        assert_eq!(report.count(EnumCellKind::Number), 2);
        assert_eq!(report.count(EnumCellKind::Text), 1);
        assert_eq!(report.count(EnumCellKind::Blank), 1);
        assert_eq!(report.count(EnumCellKind::Hyperlink), 0);
    }

    #[test]
    fn test_report_format_matches_display() {
        let report = SpecXlsxReport {
            file_out: PathBuf::from("out.xlsx"),
            n_bytes: 10,
            sheets: vec![SpecSheetReport {
                cnt_rows: 3,
                ..SpecSheetReport::new("A", false)
            }],
            warnings: vec!["w".to_string()],
        };

        let txt = report.format("[XLSX]");
        assert_eq!(txt, "[XLSX] file=out.xlsx sheets=1 rows=3 bytes=10 warnings=1");
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn test_error_messages_are_stable() {
        assert_eq!(
            NameError::EmptyName.to_string(),
            "Sheet name must not be null or empty."
        );
        assert_eq!(
            WriteError::EmptyWorkbook.to_string(),
            "There are no sheets to write to the file."
        );
        assert_eq!(
            ValidationError::EmptyFileName.to_string(),
            "File name must not be empty."
        );
    }
}
