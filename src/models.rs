use std::fmt;

use crate::workbook::parse_amount;

/// A single cell as read from the budget sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Only a truly blank cell counts as empty; a text cell holding spaces does not.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Monetary value of the cell. Anything unparseable is 0.
    pub fn amount(&self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Number(n) if n.is_nan() => 0.0,
            Self::Number(n) => *n,
            Self::Text(s) => parse_amount(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One row of the budget sheet's data range, padded to the range width.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Cell at a zero-based offset within the data range; out of range reads as empty.
    pub fn cell(&self, offset: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(offset).unwrap_or(&EMPTY)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(|s| CellValue::from(s.as_ref())).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub name: String,
    pub planned: f64,
    pub actual: f64,
}

/// A line item under the active category. Same shape as `Category`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subcategory {
    pub name: String,
    pub planned: f64,
    pub actual: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_not_empty() {
        assert!(CellValue::from("").is_empty());
        assert!(!CellValue::from(" ").is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_amount_coerces_to_zero() {
        assert_eq!(CellValue::Empty.amount(), 0.0);
        assert_eq!(CellValue::Number(f64::NAN).amount(), 0.0);
        assert_eq!(CellValue::from("n/a").amount(), 0.0);
        assert_eq!(CellValue::Number(12.5).amount(), 12.5);
        assert_eq!(CellValue::from("40.25").amount(), 40.25);
    }

    #[test]
    fn test_display_numbers_like_the_sheet() {
        assert_eq!(CellValue::Number(2024.0).to_string(), "2024");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::from("Rent").to_string(), "Rent");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_row_out_of_range_cell_is_empty() {
        let row: Row = ["", "Housing"].into_iter().collect();
        assert_eq!(row.cell(1), &CellValue::Text("Housing".into()));
        assert!(row.cell(9).is_empty());
    }
}
