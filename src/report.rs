use crate::fmt::{deviation, money, whole_percent};
use crate::models::{CellValue, Category, Row, Subcategory};
use crate::settings::{ColumnMap, ReportConfig};

const TITLE_INDENT: usize = 28;

// ---------------------------------------------------------------------------
// Row classification
// ---------------------------------------------------------------------------

/// What a sheet row looks like on its own, before the fold decides whether it counts.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// Category name with no planned amount: opens a category.
    Header { name: String },
    /// Category name with a planned amount: closes the active category.
    Total { planned: f64, actual: f64 },
    /// Subcategory line under the active category.
    Line(Subcategory),
    Blank,
}

pub fn classify(row: &Row, columns: &ColumnMap) -> RowKind {
    let main = row.cell(columns.main_category);
    let planned = row.cell(columns.planned);

    if !main.is_empty() {
        if planned.is_empty() {
            return RowKind::Header {
                name: main.to_string(),
            };
        }
        return RowKind::Total {
            planned: planned.amount(),
            actual: row.cell(columns.actual).amount(),
        };
    }

    match row.cell(columns.sub_category) {
        CellValue::Empty => RowKind::Blank,
        sub => RowKind::Line(Subcategory {
            name: sub.to_string(),
            planned: planned.amount(),
            actual: row.cell(columns.actual).amount(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Fold state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    CategoryActive {
        category: Category,
        subcategories: Vec<Subcategory>,
    },
}

/// Accumulated report while walking the sheet top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportState {
    lines: Vec<String>,
    phase: Phase,
}

impl ReportState {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            lines: vec![
                format!("{}{}", " ".repeat(TITLE_INDENT), config.title),
                config.separator.clone(),
                String::new(),
            ],
            phase: Phase::Idle,
        }
    }

    /// Advance by one sheet row.
    pub fn process_row(mut self, row: &Row, config: &ReportConfig) -> Self {
        let kind = classify(row, &config.columns);
        log::trace!("row {kind:?} while {:?}", self.phase);

        self.phase = match (self.phase, kind) {
            // A second header before a total renames the category and keeps the
            // subcategories collected so far.
            (Phase::CategoryActive { mut category, subcategories }, RowKind::Header { name }) => {
                category.name = name;
                Phase::CategoryActive {
                    category,
                    subcategories,
                }
            }
            (Phase::Idle, RowKind::Header { name }) => Phase::CategoryActive {
                category: Category {
                    name,
                    ..Category::default()
                },
                subcategories: Vec::new(),
            },
            (Phase::CategoryActive { mut category, subcategories }, RowKind::Total { planned, actual }) => {
                category.planned = planned;
                category.actual = actual;
                self.lines
                    .extend(format_category_section(&category, &subcategories, config));
                Phase::Idle
            }
            (Phase::CategoryActive { category, mut subcategories }, RowKind::Line(sub)) => {
                subcategories.push(sub);
                Phase::CategoryActive {
                    category,
                    subcategories,
                }
            }
            (phase, _) => phase,
        };
        self
    }

    /// Join the finished lines. A category still open at the end of the sheet
    /// never saw its total row and is left out.
    pub fn finish(self) -> String {
        if let Phase::CategoryActive { category, .. } = &self.phase {
            log::debug!("category {} has no total row; left out of the report", category.name);
        }
        self.lines.join("\n")
    }
}

/// Build the comparative report text for the rows of a budget sheet.
pub fn build_report(rows: &[Row], config: &ReportConfig) -> String {
    rows.iter()
        .fold(ReportState::new(config), |state, row| state.process_row(row, config))
        .finish()
}

// ---------------------------------------------------------------------------
// Section formatting
// ---------------------------------------------------------------------------

/// True when an amount pair is outside the threshold, or spent money against a zero plan.
pub fn needs_attention(planned: f64, actual: f64, threshold: f64) -> bool {
    deviation(actual, planned).abs() >= threshold || (planned == 0.0 && actual > 0.0)
}

pub fn format_category_section(
    category: &Category,
    subcategories: &[Subcategory],
    config: &ReportConfig,
) -> Vec<String> {
    let mut lines = vec![
        format!("CATEGORY: {}", category.name),
        format!(" > Planned: {}", money(category.planned)),
        format!(" > Actual:  {}", money(category.actual)),
        String::new(),
    ];

    if needs_attention(category.planned, category.actual, config.deviation_threshold) {
        if category.planned > 0.0 {
            let dev = deviation(category.actual, category.planned);
            let direction = if dev > 0.0 { "over" } else { "under" };
            lines.push(format!(
                "{} is {direction} budget by {}%.",
                category.name,
                whole_percent(dev)
            ));
        } else {
            lines.push(format!("{} is over the planned Budget of $0.", category.name));
        }
        lines.extend(format_subcategory_lines(subcategories, config.deviation_threshold));
    }

    lines.push(config.category_separator.clone());
    lines.push(String::new());
    lines
}

/// Exceptions only: subcategories within the threshold produce nothing.
pub fn format_subcategory_lines(subcategories: &[Subcategory], threshold: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for sub in subcategories {
        if needs_attention(sub.planned, sub.actual, threshold) {
            lines.push(format!(
                " - {}: {} (Actual) vs {} (Planned)",
                sub.name,
                money(sub.actual),
                money(sub.planned)
            ));
            lines.push(String::new());
        }
    }
    lines
}
