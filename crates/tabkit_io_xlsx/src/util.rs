//! Stateless helper utilities used by the workbook model and writer kernel.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ColNum, RowNum, XlsxError};
use url::Url;

use crate::conf::{
    C_EXCEL_QUOTE, C_XLSX_SUFFIX, N_LEN_EXCEL_SHEET_NAME_MAX, N_LEN_FILE_NAME_MAX,
    N_SHEETS_WORKBOOK_MAX, TUP_EXCEL_ILLEGAL, TUP_XLSX_URL_SCHEMES_RESERVED,
};
use crate::spec::{EnumCellValue, NameError, ValidationError, WriteError};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace characters Excel rejects in sheet names with `replace_to`.
///
/// Every `\ / ? * [ ] :` and a leading or trailing apostrophe is swapped one
/// for one, so the result has exactly as many characters as `name`. Length
/// limits are applied separately by [`truncate_sheet_name`].
pub fn sanitize_sheet_name(name: Option<&str>, replace_to: char) -> Result<String, NameError> {
    let Some(name) = name.filter(|val| !val.is_empty()) else {
        return Err(NameError::EmptyName);
    };
    validate_sheet_name_replacement(replace_to)?;

    let n_len = name.chars().count();
    Ok(name
        .chars()
        .enumerate()
        .map(|(n_idx, chr)| {
            let if_quote_at_edge = chr == C_EXCEL_QUOTE && (n_idx == 0 || n_idx + 1 == n_len);
            if TUP_EXCEL_ILLEGAL.contains(&chr) || if_quote_at_edge {
                replace_to
            } else {
                chr
            }
        })
        .collect())
}

/// Reject replacement characters that would themselves be illegal.
pub fn validate_sheet_name_replacement(replace_to: char) -> Result<(), NameError> {
    if TUP_EXCEL_ILLEGAL.contains(&replace_to) || replace_to == C_EXCEL_QUOTE {
        return Err(NameError::IllegalReplacement(replace_to));
    }
    Ok(())
}

/// Keep at most [`N_LEN_EXCEL_SHEET_NAME_MAX`] characters.
pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Return `candidate`, or the first `candidate1`, `candidate2`, ... that is
/// not in `existing`.
///
/// Names compare case-insensitively, as Excel does. The suffix always grows
/// from the original candidate; when `candidate + suffix` would exceed the
/// sheet name limit the candidate is shortened to make room.
pub fn dedupe_sheet_name(candidate: &str, existing: &BTreeSet<String>) -> Result<String, NameError> {
    let set_existing_lower: BTreeSet<String> =
        existing.iter().map(|c_name| c_name.to_lowercase()).collect();

    if !set_existing_lower.contains(&candidate.to_lowercase()) {
        return Ok(candidate.to_string());
    }

    for n_idx in 1..=N_SHEETS_WORKBOOK_MAX {
        let c_candidate = create_sheet_identifier(candidate, n_idx);
        if !set_existing_lower.contains(&c_candidate.to_lowercase()) {
            return Ok(c_candidate);
        }
    }

    Err(NameError::TooManyNames {
        name: candidate.to_string(),
        limit: N_SHEETS_WORKBOOK_MAX,
    })
}

/// Create suffixed sheet name (`base1`, `base2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, idx_1based: usize) -> String {
    let c_sheet_name_suffix = idx_1based.to_string();
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellTypeInference

/// Classify one raw cell string.
///
/// Rules are tried in order and the first match wins: blank, number,
/// hyperlink, boolean, text.
pub fn infer_cell_value(raw: Option<&str>) -> EnumCellValue {
    let Some(raw) = raw else {
        return EnumCellValue::Blank;
    };
    if let Some(val) = try_parse_number(raw) {
        return EnumCellValue::Number(val);
    }
    if let Some(val) = try_parse_hyperlink(raw) {
        return EnumCellValue::Hyperlink(val.to_string());
    }
    if let Some(val) = try_parse_boolean(raw) {
        return EnumCellValue::Boolean(val);
    }
    EnumCellValue::Text(raw.to_string())
}

/// Whole-string decimal float. `NaN` and infinities are not numbers here.
pub fn try_parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|val| val.is_finite())
}

/// Absolute URL with a scheme and a host, returned as given.
///
/// `internal:` and `external:` schemes are text: the writer would read them
/// as workbook-local or file link syntax and store a different target.
pub fn try_parse_hyperlink(raw: &str) -> Option<&str> {
    // `Url::parse` strips surrounding whitespace; padded input stays text.
    if raw.trim() != raw {
        return None;
    }
    let url = Url::parse(raw).ok()?;
    if !url.has_host() || TUP_XLSX_URL_SCHEMES_RESERVED.contains(&url.scheme()) {
        return None;
    }
    Some(raw)
}

/// Exactly `true` or `false`, ignoring letter case only.
pub fn try_parse_boolean(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileValidation

/// Validate and normalize an output file name.
///
/// Names longer than the limit are cut so the `.xlsx` suffix still fits; the
/// suffix is appended when missing.
pub fn validate_file_name(file_name: &str) -> Result<String, ValidationError> {
    if file_name.is_empty() {
        return Err(ValidationError::EmptyFileName);
    }

    let n_len_stem_max = N_LEN_FILE_NAME_MAX - C_XLSX_SUFFIX.len();
    let mut c_name: String = file_name.chars().take(n_len_stem_max).collect();
    if !c_name.ends_with(C_XLSX_SUFFIX) {
        c_name.push_str(C_XLSX_SUFFIX);
    }
    Ok(c_name)
}

/// Validate an output path: normalized file name in a writable directory.
pub fn validate_file_out(path_file_out: &Path) -> Result<PathBuf, ValidationError> {
    let c_name = match path_file_out.file_name() {
        Some(val) => val
            .to_str()
            .ok_or_else(|| ValidationError::NonUtf8FileName(path_file_out.to_path_buf()))?,
        None => "",
    };
    let c_name = validate_file_name(c_name)?;

    match path_file_out.parent() {
        Some(path_dir) if !path_dir.as_os_str().is_empty() => {
            validate_directory_writable(path_dir)?;
            Ok(path_dir.join(c_name))
        }
        _ => {
            validate_directory_writable(Path::new("."))?;
            Ok(PathBuf::from(c_name))
        }
    }
}

/// Ensure `path_dir` is an existing directory a file can be created in.
///
/// Writability is probed with a temporary file that is removed on drop.
pub fn validate_directory_writable(path_dir: &Path) -> Result<(), ValidationError> {
    let metadata = match std::fs::metadata(path_dir) {
        Ok(val) => val,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ValidationError::DirectoryNotFound(path_dir.to_path_buf()));
        }
        Err(err) => {
            return Err(ValidationError::DirectoryNotWritable {
                path: path_dir.to_path_buf(),
                source: err,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(ValidationError::NotADirectory(path_dir.to_path_buf()));
    }

    tempfile::Builder::new()
        .prefix(".tabkit_probe_")
        .tempfile_in(path_dir)
        .map(drop)
        .map_err(|err| ValidationError::DirectoryNotWritable {
            path: path_dir.to_path_buf(),
            source: err,
        })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

pub(crate) fn cast_row_num(value: usize) -> Result<RowNum, WriteError> {
    RowNum::try_from(value).map_err(|_| WriteError::Xlsx(XlsxError::RowColumnLimitError))
}

pub(crate) fn cast_col_num(value: usize) -> Result<ColNum, WriteError> {
    ColNum::try_from(value).map_err(|_| WriteError::Xlsx(XlsxError::RowColumnLimitError))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
