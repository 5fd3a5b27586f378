use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReportError, Result};
use crate::models::{CellValue, Row};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Leading-number parse: whitespace is skipped, the longest decimal prefix wins,
/// anything else is 0. "12abc" -> 12, "$12" -> 0.
pub fn parse_amount(raw: &str) -> f64 {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
    });
    re.find(raw.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Column letters to a zero-based index: A -> 0, Z -> 25, AA -> 26.
fn column_index(letters: &str) -> usize {
    letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b.to_ascii_uppercase() - b'A') as usize + 1)
        - 1
}

/// Parse an A1 cell reference into zero-based (row, column).
pub fn parse_cell_ref(cell: &str) -> Result<(usize, usize)> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    let re = CELL.get_or_init(|| Regex::new(r"^([A-Za-z]{1,3})([1-9]\d*)$").expect("valid cell regex"));
    let caps = re
        .captures(cell.trim())
        .ok_or_else(|| ReportError::InvalidRange(format!("bad cell reference '{cell}'")))?;
    let row: usize = caps[2]
        .parse()
        .map_err(|_| ReportError::InvalidRange(format!("bad row in '{cell}'")))?;
    Ok((row - 1, column_index(&caps[1])))
}

// ---------------------------------------------------------------------------
// Sheet layout
// ---------------------------------------------------------------------------

/// The block of a sheet that holds budget data, parsed from text like `A4:G`.
/// Rows run to the last used row unless the range names an end row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub start_col: usize,
    pub end_col: usize,
    /// One-based, like the sheet's own row numbers.
    pub start_row: usize,
    pub end_row: Option<usize>,
}

impl SheetLayout {
    pub fn parse(range: &str) -> Result<Self> {
        static RANGE: OnceLock<Regex> = OnceLock::new();
        let re = RANGE.get_or_init(|| {
            Regex::new(r"^([A-Za-z]{1,3})([1-9]\d*):([A-Za-z]{1,3})([1-9]\d*)?$")
                .expect("valid range regex")
        });
        let caps = re
            .captures(range.trim())
            .ok_or_else(|| ReportError::InvalidRange(range.to_string()))?;
        let start_col = column_index(&caps[1]);
        let end_col = column_index(&caps[3]);
        let start_row: usize = caps[2]
            .parse()
            .map_err(|_| ReportError::InvalidRange(range.to_string()))?;
        let end_row = match caps.get(4) {
            Some(m) => Some(
                m.as_str()
                    .parse::<usize>()
                    .map_err(|_| ReportError::InvalidRange(range.to_string()))?,
            ),
            None => None,
        };
        if end_col < start_col || end_row.is_some_and(|end| end < start_row) {
            return Err(ReportError::InvalidRange(format!("{range} is reversed")));
        }
        Ok(Self {
            start_col,
            end_col,
            start_row,
            end_row,
        })
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Whether a zero-based sheet row falls inside the data range.
    fn includes_row(&self, row_idx: usize) -> bool {
        row_idx + 1 >= self.start_row && self.end_row.map_or(true, |end| row_idx < end)
    }

    fn clip<I: IntoIterator<Item = CellValue>>(&self, cells: I) -> Row {
        let mut cells: Vec<CellValue> = cells
            .into_iter()
            .skip(self.start_col)
            .take(self.width())
            .collect();
        cells.resize(self.width(), CellValue::Empty);
        Row::new(cells)
    }
}

// ---------------------------------------------------------------------------
// Workbook kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Workbook {
    /// A single CSV file; it serves whichever sheet is asked for.
    CsvFile(PathBuf),
    /// A directory with one `<sheet name>.csv` per sheet.
    CsvDir(PathBuf),
    #[cfg(feature = "xlsx")]
    Spreadsheet(PathBuf),
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        if meta.is_dir() {
            return Ok(Self::CsvDir(path.to_path_buf()));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::CsvFile(path.to_path_buf())),
            #[cfg(feature = "xlsx")]
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet(path.to_path_buf())),
            #[cfg(not(feature = "xlsx"))]
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Err(ReportError::UnsupportedWorkbook(
                format!("{} (built without xlsx support)", path.display()),
            )),
            _ => Err(ReportError::UnsupportedWorkbook(path.display().to_string())),
        }
    }

    pub fn sheet_names(&self) -> Result<Vec<String>> {
        match self {
            Self::CsvFile(path) => Ok(vec![file_stem(path)]),
            Self::CsvDir(dir) => {
                let mut names = Vec::new();
                for entry in std::fs::read_dir(dir)? {
                    let path = entry?.path();
                    let is_csv = path
                        .extension()
                        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
                    if path.is_file() && is_csv {
                        names.push(file_stem(&path));
                    }
                }
                names.sort();
                Ok(names)
            }
            #[cfg(feature = "xlsx")]
            Self::Spreadsheet(path) => {
                use calamine::Reader;
                let workbook = open_spreadsheet(path)?;
                Ok(workbook.sheet_names())
            }
        }
    }

    /// Read the data range of `sheet` as rows, from the range's first row to the
    /// last used row of the sheet.
    pub fn read_sheet(&self, sheet: &str, layout: &SheetLayout) -> Result<Vec<Row>> {
        match self {
            Self::CsvFile(path) => read_csv_sheet(path, layout),
            Self::CsvDir(dir) => {
                let path = dir.join(format!("{sheet}.csv"));
                if !path.is_file() {
                    return Err(ReportError::SheetNotFound(sheet.to_string()));
                }
                read_csv_sheet(&path, layout)
            }
            #[cfg(feature = "xlsx")]
            Self::Spreadsheet(path) => read_spreadsheet_sheet(path, sheet, layout),
        }
    }

    /// Directory that sits alongside the budget sheet.
    pub fn output_dir(&self) -> PathBuf {
        match self {
            Self::CsvDir(dir) => dir.clone(),
            Self::CsvFile(path) => parent_dir(path),
            #[cfg(feature = "xlsx")]
            Self::Spreadsheet(path) => parent_dir(path),
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ---------------------------------------------------------------------------
// CSV sheets
// ---------------------------------------------------------------------------

fn read_csv_sheet(path: &Path, layout: &SheetLayout) -> Result<Vec<Row>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        if !layout.includes_row(idx) {
            if layout.end_row.is_some_and(|end| idx >= end) {
                break;
            }
            continue;
        }
        rows.push(layout.clip(record.iter().map(CellValue::from)));
    }
    trim_trailing_blank_rows(&mut rows);
    Ok(rows)
}

/// A sheet's last row is its last row with content.
fn trim_trailing_blank_rows(rows: &mut Vec<Row>) {
    while rows
        .last()
        .is_some_and(|r| r.cells.iter().all(CellValue::is_empty))
    {
        rows.pop();
    }
}

// ---------------------------------------------------------------------------
// XLSX / ODS sheets
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn open_spreadsheet(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>> {
    calamine::open_workbook_auto(path)
        .map_err(|e| ReportError::Workbook(format!("Failed to open {}: {e}", path.display())))
}

#[cfg(feature = "xlsx")]
fn read_spreadsheet_sheet(path: &Path, sheet: &str, layout: &SheetLayout) -> Result<Vec<Row>> {
    use calamine::Reader;

    let mut workbook = open_spreadsheet(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(ReportError::SheetNotFound(sheet.to_string()));
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| ReportError::Workbook(format!("Failed to read sheet {sheet}: {e}")))?;
    let Some((last_row, last_col)) = range.end() else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for row_idx in 0..=last_row as usize {
        if !layout.includes_row(row_idx) {
            continue;
        }
        let cells = (0..=last_col.max(layout.end_col as u32)).map(|col| {
            range
                .get_value((row_idx as u32, col))
                .map(cell_from_data)
                .unwrap_or(CellValue::Empty)
        });
        rows.push(layout.clip(cells));
    }
    trim_trailing_blank_rows(&mut rows);
    Ok(rows)
}

#[cfg(feature = "xlsx")]
fn cell_from_data(data: &calamine::Data) -> CellValue {
    use calamine::Data;

    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        other => CellValue::Text(other.to_string()),
    }
}
