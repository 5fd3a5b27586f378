use std::path::Path;

use crate::error::Result;
use crate::workbook::Workbook;

pub fn run(workbook: &str) -> Result<()> {
    let workbook = Workbook::open(Path::new(workbook))?;
    println!("{}", workbook.sheet_names()?.join(","));
    Ok(())
}
