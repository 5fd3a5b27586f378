use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::settings::ReportConfig;
use crate::workbook::parse_cell_ref;

/// Where a finished report goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// A report sheet (`<report_sheet_name>.csv`) in this directory.
    Sheet { dir: PathBuf },
    /// An unsent email draft (`.eml`) in this directory.
    Draft { dir: PathBuf },
}

impl Delivery {
    pub fn format_name(&self) -> &'static str {
        match self {
            Self::Sheet { .. } => "Sheet",
            Self::Draft { .. } => "Email",
        }
    }

    pub fn deliver(&self, report: &str, config: &ReportConfig, now: DateTime<Local>) -> Result<PathBuf> {
        match self {
            Self::Sheet { dir } => write_report_sheet(dir, report, config),
            Self::Draft { dir } => write_draft(dir, report, now),
        }
    }
}

// ---------------------------------------------------------------------------
// Report sheet
// ---------------------------------------------------------------------------

/// Write the report into the configured cell of a fresh report sheet. Any
/// earlier report sheet is replaced.
pub fn write_report_sheet(dir: &Path, report: &str, config: &ReportConfig) -> Result<PathBuf> {
    let (row, col) = parse_cell_ref(&config.report_cell)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", config.report_sheet_name));

    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
    for _ in 0..row {
        wtr.write_record(vec![""; col + 1])?;
    }
    let mut cells = vec![""; col + 1];
    cells[col] = report;
    wtr.write_record(&cells)?;
    wtr.flush()?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Email draft
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl Draft {
    pub fn new(report: &str, now: DateTime<Local>) -> Self {
        let text_body = format!(
            "Hello,\n\nHere is the monthly budget comparison summary:\n\n{report}\n\nBest regards,"
        );
        Self {
            to: String::new(),
            subject: format!("Monthly Comparative Report - {}", now.format("%-m/%-d/%Y")),
            html_body: html_body(&text_body),
            text_body,
        }
    }

    /// Render as a `multipart/alternative` message marked unsent.
    pub fn to_eml(&self, boundary: &str, now: DateTime<Local>) -> String {
        let crlf = |s: &str| s.replace('\n', "\r\n");
        let mut out = String::new();
        out.push_str(&format!("To: {}\r\n", self.to));
        out.push_str(&format!("Subject: {}\r\n", self.subject));
        out.push_str(&format!("Date: {}\r\n", now.to_rfc2822()));
        out.push_str("MIME-Version: 1.0\r\n");
        out.push_str("X-Unsent: 1\r\n");
        out.push_str(&format!(
            "Content-Type: multipart/alternative; boundary=\"{boundary}\"\r\n\r\n"
        ));
        for (mime, body) in [("text/plain", &self.text_body), ("text/html", &self.html_body)] {
            out.push_str(&format!("--{boundary}\r\n"));
            out.push_str(&format!("Content-Type: {mime}; charset=utf-8\r\n"));
            out.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
            out.push_str(&crlf(body.as_str()));
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{boundary}--\r\n"));
        out
    }
}

/// Escape markup characters and turn newlines into `<br>`.
pub fn html_body(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br>")
}

pub fn write_draft(dir: &Path, report: &str, now: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let draft = Draft::new(report, now);
    let boundary = format!("=_monthly_report_{}", hex::encode(rand::random::<[u8; 12]>()));
    let stamp = now.format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("monthly-report-{stamp}.eml"));
    std::fs::write(&path, draft.to_eml(&boundary, now))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 7, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_report_sheet_puts_report_in_cell() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default();
        let report = "    TITLE\n=====\n\nCATEGORY: Rent";
        let path = write_report_sheet(dir.path(), report, &config).unwrap();
        assert_eq!(path.file_name().unwrap(), "Monthly_Comparative_Report.csv");

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], "");
        assert_eq!(&records[1][0], "");
        assert_eq!(&records[1][1], report);
    }

    #[test]
    fn test_report_sheet_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default();
        write_report_sheet(dir.path(), "first report with more text", &config).unwrap();
        let path = write_report_sheet(dir.path(), "second", &config).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("second"));
        assert!(!content.contains("first"));
    }

    #[test]
    fn test_draft_bodies() {
        let draft = Draft::new("CATEGORY: R&D <Lab>\n > Planned: $1.00", fixed_now());
        assert_eq!(draft.to, "");
        assert_eq!(draft.subject, "Monthly Comparative Report - 3/7/2025");
        assert!(draft.text_body.starts_with("Hello,\n\nHere is the monthly budget comparison summary:\n\n"));
        assert!(draft.text_body.ends_with("$1.00\n\nBest regards,"));
        assert_eq!(
            draft.html_body,
            "Hello,<br><br>Here is the monthly budget comparison summary:<br><br>\
             CATEGORY: R&amp;D &lt;Lab&gt;<br> &gt; Planned: $1.00<br><br>Best regards,"
        );
    }

    #[test]
    fn test_eml_layout() {
        let now = fixed_now();
        let eml = Draft::new("line one\nline two", now).to_eml("BOUNDARY", now);
        assert!(eml.starts_with("To: \r\nSubject: Monthly Comparative Report - 3/7/2025\r\n"));
        assert!(eml.contains("Content-Type: multipart/alternative; boundary=\"BOUNDARY\""));
        assert!(eml.contains("--BOUNDARY\r\nContent-Type: text/plain; charset=utf-8"));
        assert!(eml.contains("--BOUNDARY\r\nContent-Type: text/html; charset=utf-8"));
        assert!(eml.contains("line one\r\nline two"));
        assert!(eml.ends_with("--BOUNDARY--\r\n"));
    }

    #[test]
    fn test_write_draft_file() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = Delivery::Draft {
            dir: dir.path().join("drafts"),
        };
        let path = delivery
            .deliver("report body", &ReportConfig::default(), fixed_now())
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "monthly-report-20250307-093000.eml");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("report body"));
        assert_eq!(delivery.format_name(), "Email");
    }
}
