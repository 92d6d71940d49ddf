//! Workbook and sheet models filled by the caller before writing.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::conf::{
    N_SHEETS_WORKBOOK_MAX, TUP_EXCEL_RESERVED_SHEET_NAMES, derive_default_workbook_options,
};
use crate::spec::{
    NameError, SpecXlsxReport, SpecXlsxWorkbookOptions, ValidationError, WriteError,
};
use crate::util::{
    dedupe_sheet_name, sanitize_sheet_name, truncate_sheet_name, validate_file_out,
};
use crate::writer::XlsxWriter;

/// One named tab: optional header row plus rows of raw string cells.
///
/// Created only through [`XlsxWorkbook::create_sheet`]; the name is fixed
/// from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxSheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl XlsxSheet {
    fn new(name: String) -> Self {
        Self {
            name,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Final, legal and unique sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header cells, rendered bold as the first row when non-empty.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows; `None` cells are left blank.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Append one header cell.
    pub fn add_header(&mut self, text: impl Into<String>) -> &mut Self {
        self.headers.push(text.into());
        self
    }

    /// Append several header cells.
    pub fn add_headers<I, S>(&mut self, texts: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(texts.into_iter().map(Into::into));
        self
    }

    /// Append one data row.
    pub fn add_row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|cell| cell.map(Into::into)).collect());
        self
    }

    /// Rows the sheet occupies, header included.
    pub fn height(&self) -> usize {
        self.rows.len() + usize::from(!self.headers.is_empty())
    }

    /// Widest row, header included.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Ordered collection of sheets bound to one validated output path.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    path_file_out: PathBuf,
    sheets: Vec<XlsxSheet>,
    options: SpecXlsxWorkbookOptions,
}

impl XlsxWorkbook {
    /// Create a workbook with default options.
    ///
    /// The path is normalized (see [`crate::util::validate_file_out`]) and
    /// its directory must be writable.
    pub fn new(path_file_out: impl AsRef<Path>) -> Result<Self, ValidationError> {
        Self::with_options(path_file_out, derive_default_workbook_options())
    }

    /// Create a workbook with explicit options.
    pub fn with_options(
        path_file_out: impl AsRef<Path>,
        options: SpecXlsxWorkbookOptions,
    ) -> Result<Self, ValidationError> {
        let path_file_out = validate_file_out(path_file_out.as_ref())?;
        Ok(Self {
            path_file_out,
            sheets: Vec::new(),
            options,
        })
    }

    /// Normalized output path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Options in effect.
    pub fn options(&self) -> &SpecXlsxWorkbookOptions {
        &self.options
    }

    /// Sheets in tab order.
    pub fn sheets(&self) -> &[XlsxSheet] {
        &self.sheets
    }

    /// Look up a sheet by its final name.
    pub fn sheet(&self, name: &str) -> Option<&XlsxSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Look up a sheet by its final name for further appends.
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut XlsxSheet> {
        self.sheets.iter_mut().find(|sheet| sheet.name == name)
    }

    /// Add a sheet and return it for population.
    ///
    /// The requested name is sanitized, cut to 31 characters and suffixed
    /// with `1`, `2`, ... when an existing sheet already uses it. On error no
    /// sheet is added.
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut XlsxSheet, NameError> {
        let c_name = self.reserve_sheet_name(Some(name))?;
        log::debug!("create sheet {c_name:?} (requested {name:?})");

        self.sheets.push(XlsxSheet::new(c_name));
        let n_idx_last = self.sheets.len() - 1;
        Ok(&mut self.sheets[n_idx_last])
    }

    /// Write the workbook to [`Self::file_out`].
    pub fn write(&self) -> Result<SpecXlsxReport, WriteError> {
        XlsxWriter::new(&self.options).write(self)
    }

    fn reserve_sheet_name(&self, name: Option<&str>) -> Result<String, NameError> {
        if self.sheets.len() >= N_SHEETS_WORKBOOK_MAX {
            return Err(NameError::SheetLimitExceeded {
                limit: N_SHEETS_WORKBOOK_MAX,
            });
        }

        // Cut first so an apostrophe that ends up at the new edge is replaced.
        let c_truncated = name.map(truncate_sheet_name);
        let c_sanitized =
            sanitize_sheet_name(c_truncated.as_deref(), self.options.sheet_name_replacement)?;

        let set_names_existing: BTreeSet<String> = self
            .sheets
            .iter()
            .map(|sheet| sheet.name.clone())
            .chain(TUP_EXCEL_RESERVED_SHEET_NAMES.iter().map(|c| c.to_string()))
            .collect();
        dedupe_sheet_name(&c_sanitized, &set_names_existing)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::conf::N_LEN_EXCEL_SHEET_NAME_MAX;

    fn new_workbook(tmp: &tempfile::TempDir) -> XlsxWorkbook {
        XlsxWorkbook::new(tmp.path().join("book.xlsx")).expect("workbook")
    }

    #[test]
    fn test_create_sheet_keeps_legal_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut workbook = new_workbook(&tmp);

        let sheet = workbook.create_sheet("Sheet A").expect("sheet");
        assert_eq!(sheet.name(), "Sheet A");
        assert_eq!(workbook.sheets().len(), 1);
    }

    #[test]
    fn test_create_sheet_rejects_empty_name_without_adding() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut workbook = new_workbook(&tmp);

        assert_eq!(workbook.create_sheet("").unwrap_err(), NameError::EmptyName);
        assert!(workbook.sheets().is_empty());
    }

    #[test]
    fn test_create_sheet_sanitizes_and_truncates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut workbook = new_workbook(&tmp);

        let c_long = "Sheet Long Name 1234567890123456789012345678901234567890";
        let c_name = workbook.create_sheet(c_long).expect("sheet").name().to_string();
        assert_eq!(c_name.chars().count(), N_LEN_EXCEL_SHEET_NAME_MAX);
        assert!(c_long.starts_with(&c_name));

        let c_name = workbook.create_sheet("Q1/Q2: [draft]").expect("sheet").name().to_string();
        assert_eq!(c_name, "Q1-Q2- -draft-");

        let c_quoted = format!("{}'tail", "a".repeat(N_LEN_EXCEL_SHEET_NAME_MAX - 1));
        let c_name = workbook.create_sheet(&c_quoted).expect("sheet").name().to_string();
        assert!(c_name.ends_with('-'), "{c_name}");
    }

    #[test]
    fn test_create_sheet_suffixes_duplicates_in_creation_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut workbook = new_workbook(&tmp);

        for _ in 0..5 {
            workbook.create_sheet("Stations").expect("sheet");
        }
        let l_names: Vec<&str> = workbook.sheets().iter().map(XlsxSheet::name).collect();
        assert_eq!(
            l_names,
            vec!["Stations", "Stations1", "Stations2", "Stations3", "Stations4"]
        );
    }

    #[test]
    fn test_create_sheet_avoids_reserved_history_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut workbook = new_workbook(&tmp);

        assert_eq!(workbook.create_sheet("History").expect("sheet").name(), "History1");
    }

    #[test]
    fn test_create_sheet_fails_past_sheet_limit() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut workbook = new_workbook(&tmp);

        for _ in 0..N_SHEETS_WORKBOOK_MAX {
            workbook.create_sheet("S").expect("sheet within limit");
        }
        assert_eq!(
            workbook.create_sheet("S").unwrap_err(),
            NameError::SheetLimitExceeded {
                limit: N_SHEETS_WORKBOOK_MAX
            }
        );
        assert_eq!(workbook.sheets().len(), N_SHEETS_WORKBOOK_MAX);
    }

    #[test]
    fn test_create_sheet_rejects_illegal_replacement_option() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let options = derive_default_workbook_options().with_sheet_name_replacement(':');
        let mut workbook =
            XlsxWorkbook::with_options(tmp.path().join("book"), options).expect("workbook");

        assert_eq!(
            workbook.create_sheet("plain").unwrap_err(),
            NameError::IllegalReplacement(':')
        );
    }

    #[test]
    fn test_sheet_collects_headers_and_ragged_rows() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut workbook = new_workbook(&tmp);

        let sheet = workbook.create_sheet("Data").expect("sheet");
        sheet.add_header("Col 1").add_headers(["Col 2", "Col 3"]);
        sheet.add_row([Some("5"), None]);
        sheet.add_row([Some("a"), Some("b"), Some("c"), Some("d")]);

        let sheet = workbook.sheet("Data").expect("lookup");
        assert_eq!(sheet.headers(), ["Col 1", "Col 2", "Col 3"]);
        assert_eq!(sheet.rows()[0], vec![Some("5".to_string()), None]);
        assert_eq!(sheet.height(), 3);
        assert_eq!(sheet.width(), 4);
    }

    #[test]
    fn test_workbook_path_is_normalized() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let workbook = XlsxWorkbook::new(tmp.path().join("export.csv")).expect("workbook");
        assert_eq!(workbook.file_out(), tmp.path().join("export.csv.xlsx"));
    }
}
