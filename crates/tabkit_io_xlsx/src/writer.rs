//! XLSX writer kernel that turns an [`XlsxWorkbook`] into a file on disk.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use rust_xlsxwriter::{ColNum, Format, FormatUnderline, RowNum, Url, Workbook, Worksheet};

use crate::book::{XlsxSheet, XlsxWorkbook};
use crate::conf::{
    N_LEN_EXCEL_STRING_MAX, N_LEN_EXCEL_URL_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
};
use crate::spec::{
    EnumCellKind, EnumCellValue, SpecCellFormat, SpecSheetReport, SpecXlsxReport,
    SpecXlsxWorkbookOptions, WriteError,
};
use crate::util::{cast_col_num, cast_row_num, infer_cell_value, try_parse_number};

/// Stateless workbook writer holding the resolved cell formats.
pub struct XlsxWriter {
    fmt_header: Format,
    fmt_hyperlink: Format,
}

impl XlsxWriter {
    /// Resolve formats from workbook options.
    pub fn new(options: &SpecXlsxWorkbookOptions) -> Self {
        Self {
            fmt_header: derive_rust_xlsx_format(&options.fmt_header),
            fmt_hyperlink: derive_rust_xlsx_format(&options.fmt_hyperlink),
        }
    }

    /// Emit every sheet in tab order and write the file.
    ///
    /// Sheets past Excel's grid limits and string cells longer than
    /// 32,767 characters are rejected before anything is written. The
    /// workbook is serialized in memory first; the target file is only
    /// opened once serialization succeeded. If writing the bytes fails a
    /// truncated file may remain and is left for the caller to remove.
    pub fn write(&self, book: &XlsxWorkbook) -> Result<SpecXlsxReport, WriteError> {
        if book.sheets().is_empty() {
            return Err(WriteError::EmptyWorkbook);
        }
        for sheet in book.sheets() {
            validate_sheet_size(sheet)?;
            validate_sheet_strings(sheet)?;
        }

        let mut report = SpecXlsxReport {
            file_out: book.file_out().to_path_buf(),
            ..Default::default()
        };

        let mut workbook = Workbook::new();
        for sheet in book.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name())?;
            let sheet_report = self.write_sheet(worksheet, sheet, &mut report)?;
            log::debug!(
                "emitted sheet {:?}: {} rows",
                sheet_report.sheet_name,
                sheet_report.cnt_rows
            );
            report.sheets.push(sheet_report);
        }

        let v_bytes = workbook.save_to_buffer()?;
        save_bytes(book.file_out(), &v_bytes)?;
        report.n_bytes = v_bytes.len() as u64;

        log::debug!("{report}");
        Ok(report)
    }

    fn write_sheet(
        &self,
        worksheet: &mut Worksheet,
        sheet: &XlsxSheet,
        report: &mut SpecXlsxReport,
    ) -> Result<SpecSheetReport, WriteError> {
        let if_has_header = !sheet.headers().is_empty();
        let mut sheet_report = SpecSheetReport::new(sheet.name(), if_has_header);

        if if_has_header {
            write_header(worksheet, sheet.headers(), &self.fmt_header)?;
        }

        let n_row_offset = usize::from(if_has_header);
        for (n_idx_row, row_values) in sheet.rows().iter().enumerate() {
            let n_row = cast_row_num(n_row_offset + n_idx_row)?;
            for (n_idx_col, cell_value) in row_values.iter().enumerate() {
                let value = infer_cell_value(cell_value.as_deref());
                let kind = self.write_cell(
                    worksheet,
                    n_row,
                    cast_col_num(n_idx_col)?,
                    &value,
                    report,
                )?;
                sheet_report.add_cell(kind);
            }
            sheet_report.cnt_rows += 1;
        }

        Ok(sheet_report)
    }

    /// Write one typed cell; returns the kind actually written.
    fn write_cell(
        &self,
        worksheet: &mut Worksheet,
        row: RowNum,
        col: ColNum,
        value: &EnumCellValue,
        report: &mut SpecXlsxReport,
    ) -> Result<EnumCellKind, WriteError> {
        match value {
            EnumCellValue::Blank => {}
            EnumCellValue::Number(val) => {
                worksheet.write_number(row, col, *val)?;
            }
            EnumCellValue::Boolean(val) => {
                worksheet.write_boolean(row, col, *val)?;
            }
            EnumCellValue::Text(val) => {
                worksheet.write_string(row, col, val)?;
            }
            EnumCellValue::Hyperlink(val) => {
                if val.chars().count() > N_LEN_EXCEL_URL_MAX {
                    let c_msg = format!(
                        "Hyperlink at row {row}, column {col} exceeds {N_LEN_EXCEL_URL_MAX} characters; written as text."
                    );
                    log::warn!("{c_msg}");
                    report.warn(c_msg);
                    worksheet.write_string(row, col, val)?;
                    return Ok(EnumCellKind::Text);
                }
                let url = Url::new(val.as_str()).set_text(val.as_str());
                worksheet.write_url_with_format(row, col, url, &self.fmt_hyperlink)?;
            }
        }
        Ok(value.kind())
    }
}

fn validate_sheet_size(sheet: &XlsxSheet) -> Result<(), WriteError> {
    let n_rows = sheet.height();
    let n_cols = sheet.width();
    if n_rows > N_NROWS_EXCEL_MAX || n_cols > N_NCOLS_EXCEL_MAX {
        return Err(WriteError::SheetTooLarge {
            sheet_name: sheet.name().to_string(),
            n_rows,
            n_cols,
            n_rows_max: N_NROWS_EXCEL_MAX,
            n_cols_max: N_NCOLS_EXCEL_MAX,
        });
    }
    Ok(())
}

/// Reject string cells Excel cannot store. Numeric cells are exempt since
/// they are written as numbers.
fn validate_sheet_strings(sheet: &XlsxSheet) -> Result<(), WriteError> {
    let derive_error = |row: usize, col: usize, n_len: usize| WriteError::CellTooLong {
        sheet_name: sheet.name().to_string(),
        row,
        col,
        n_len,
        n_len_max: N_LEN_EXCEL_STRING_MAX,
    };

    for (col, val) in sheet.headers().iter().enumerate() {
        let n_len = count_long_string(val);
        if n_len > N_LEN_EXCEL_STRING_MAX {
            return Err(derive_error(0, col, n_len));
        }
    }

    let n_row_offset = usize::from(!sheet.headers().is_empty());
    for (n_idx_row, row_values) in sheet.rows().iter().enumerate() {
        for (col, val) in row_values.iter().enumerate() {
            let Some(val) = val.as_deref() else {
                continue;
            };
            let n_len = count_long_string(val);
            if n_len > N_LEN_EXCEL_STRING_MAX && try_parse_number(val).is_none() {
                return Err(derive_error(n_row_offset + n_idx_row, col, n_len));
            }
        }
    }
    Ok(())
}

/// Char count, skipped when the byte length already fits.
fn count_long_string(val: &str) -> usize {
    if val.len() <= N_LEN_EXCEL_STRING_MAX {
        return 0;
    }
    val.chars().count()
}

fn write_header(
    worksheet: &mut Worksheet,
    headers: &[String],
    fmt_header: &Format,
) -> Result<(), WriteError> {
    for (col_idx, cell_value) in headers.iter().enumerate() {
        let col = cast_col_num(col_idx)?;
        if cell_value.is_empty() {
            worksheet.write_blank(0, col, fmt_header)?;
        } else {
            worksheet.write_string_with_format(0, col, cell_value, fmt_header)?;
        }
    }
    Ok(())
}

/// Open, truncate, write and close `path_file_out` in one scope.
fn save_bytes(path_file_out: &Path, v_bytes: &[u8]) -> Result<(), WriteError> {
    let derive_io_error = |source: io::Error| WriteError::Io {
        path: path_file_out.to_path_buf(),
        source,
    };

    let mut file = File::create(path_file_out).map_err(derive_io_error)?;
    file.write_all(v_bytes).map_err(derive_io_error)?;
    file.sync_all().map_err(derive_io_error)
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }
    if spec.underline.unwrap_or(false) {
        format = format.set_underline(FormatUnderline::Single);
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    format
}
