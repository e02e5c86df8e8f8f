use crate::sport::SportMode;
use crate::tokenizer::{tokenize_line, write_row};

/// How a plan file is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: char,
    /// Sport used when the file carries no marker row.
    pub default_sport: SportMode,
}

impl Dialect {
    pub const COMMA: Dialect = Dialect {
        delimiter: ',',
        default_sport: SportMode::Running,
    };
    pub const SEMICOLON: Dialect = Dialect {
        delimiter: ';',
        default_sport: SportMode::Running,
    };
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::COMMA
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PlanError {
    Empty,
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::Empty => write!(f, "no data: the plan contains no non-empty lines"),
        }
    }
}

impl std::error::Error for PlanError {}

/// One tokenized data row together with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub number: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub sport: SportMode,
    /// Index of the first data line among the non-empty lines.
    pub start_index: usize,
    pub rows: Vec<PlanRow>,
}

/// Split raw plan text into data rows.
///
/// Empty lines are dropped. An optional header row and an optional
/// sport marker row are consumed from the top; a marker row whose first field
/// mentions "bike" switches the plan to cycling.
pub fn read_plan(text: &str, dialect: &Dialect) -> Result<Plan, PlanError> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(PlanError::Empty);
    }

    let mut start_index = 0;
    if is_header(&tokenize_line(lines[0], dialect.delimiter)) {
        log::debug!("Skipping header row");
        start_index += 1;
    }

    let mut sport = dialect.default_sport;
    if let Some(line) = lines.get(start_index) {
        if is_sport_marker(&tokenize_line(line, dialect.delimiter)) {
            log::info!("Found bike marker row, using cycling mode");
            sport = SportMode::Cycling;
            start_index += 1;
        }
    }

    let rows = lines[start_index..]
        .iter()
        .enumerate()
        .map(|(i, line)| PlanRow {
            number: start_index + i + 1,
            fields: tokenize_line(line, dialect.delimiter),
        })
        .collect();

    Ok(Plan {
        sport,
        start_index,
        rows,
    })
}

fn is_header(fields: &[String]) -> bool {
    let names_column = fields
        .first()
        .is_some_and(|f| f.to_lowercase().contains("name"));
    names_column
        && fields.iter().any(|f| {
            f.eq_ignore_ascii_case("segments") || f.eq_ignore_ascii_case("abschnitte")
        })
}

fn is_sport_marker(fields: &[String]) -> bool {
    fields
        .first()
        .is_some_and(|f| f.to_lowercase().contains("bike"))
}

/// Build a small example plan in the given dialect.
pub fn sample_plan(dialect: &Dialect, sport: SportMode) -> csv::Result<String> {
    let header = [
        "Name",
        "Segments",
        "WarmupSec",
        "CooldownSec",
        "Segment1",
        "DurationSec1",
        "PauseSec1",
        "Reps1",
        "Segment2",
        "DurationSec2",
        "PauseSec2",
        "Reps2",
    ];
    let mut rows: Vec<Vec<&str>> = vec![header.to_vec()];
    if sport == SportMode::Cycling {
        rows.push(vec!["Bike"]);
        rows.push(vec!["Sweet Spot", "1", "600", "300", "Zone3 Push", "1800", "0", "0"]);
        rows.push(vec![
            "VO2 Repeats", "2", "600", "0", "Z2", "600", "0", "0", "Z5", "180", "120", "5",
        ]);
    } else {
        rows.push(vec!["MorningRun", "1", "300", "300", "Zone5", "1200", "0", "0"]);
        rows.push(vec![
            "Interval Training", "2", "300", "0", "Zone2", "300", "0", "0", "Zone5", "120", "30",
            "5",
        ]);
    }

    let mut out = String::new();
    for row in rows {
        out.push_str(&write_row(row.as_slice(), dialect.delimiter)?);
        out.push('\n');
    }
    Ok(out)
}
