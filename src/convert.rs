use crate::document::{WorkoutDocument, assemble};
use crate::estimate::estimate;
use crate::plan::{Dialect, Plan, PlanError, PlanRow, read_plan};
use crate::row::{Diagnostic, WorkoutSpec, parse_row};
use crate::sport::{SpeedProfile, SportMode};
use crate::steps::build_steps;

/// Inputs that vary between plan sources.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertOptions {
    pub dialect: Dialect,
    pub speeds: SpeedProfile,
}

/// Result of converting a single data row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub row: usize,
    /// `None` when the row was skipped.
    pub document: Option<WorkoutDocument>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the document for one parsed workout.
pub fn build_document(
    spec: &WorkoutSpec,
    sport: SportMode,
    speeds: &SpeedProfile,
) -> WorkoutDocument {
    let steps = build_steps(spec, sport);
    let est = estimate(&steps, sport, speeds);
    assemble(sport, &spec.name, steps, est)
}

pub fn convert_row(row: &PlanRow, sport: SportMode, speeds: &SpeedProfile) -> RowOutcome {
    let mut diagnostics = Vec::new();
    let document = parse_row(&row.fields, row.number, &mut diagnostics)
        .map(|spec| build_document(&spec, sport, speeds));
    if let Some(doc) = &document {
        log::info!(
            "Row {}: built \"{}\" with {} top-level steps, ~{}s",
            row.number,
            doc.name,
            doc.steps.len(),
            doc.estimate.duration_sec
        );
    }
    RowOutcome {
        row: row.number,
        document,
        diagnostics,
    }
}

/// Lazily converts the rows of a plan in input order.
///
/// Each row gets its own step counters, so stopping early or skipping a row
/// never changes what the other rows produce.
pub struct Workouts<'a> {
    rows: std::slice::Iter<'a, PlanRow>,
    sport: SportMode,
    speeds: SpeedProfile,
}

impl<'a> Workouts<'a> {
    pub fn new(plan: &'a Plan, speeds: SpeedProfile) -> Self {
        Self {
            rows: plan.rows.iter(),
            sport: plan.sport,
            speeds,
        }
    }
}

impl Iterator for Workouts<'_> {
    type Item = RowOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(convert_row(row, self.sport, &self.speeds))
    }
}

/// Everything produced from one plan file.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub sport: SportMode,
    pub documents: Vec<(usize, WorkoutDocument)>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert a whole plan text into documents, one per usable row.
pub fn convert_text(text: &str, options: &ConvertOptions) -> Result<Conversion, PlanError> {
    let plan = read_plan(text, &options.dialect)?;
    log::debug!("Data rows start at line {}", plan.start_index + 1);
    let mut conversion = Conversion {
        sport: plan.sport,
        documents: Vec::new(),
        diagnostics: Vec::new(),
    };
    for outcome in Workouts::new(&plan, options.speeds) {
        conversion.diagnostics.extend(outcome.diagnostics);
        if let Some(doc) = outcome.document {
            conversion.documents.push((outcome.row, doc));
        }
    }
    log::info!(
        "Converted {} of {} rows ({:?})",
        conversion.documents.len(),
        plan.rows.len(),
        plan.sport
    );
    Ok(conversion)
}
