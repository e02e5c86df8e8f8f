//! Interpretation of one tokenized plan row as a workout.

/// Fields every row needs: name, segment count, warmup and cooldown seconds.
pub const MIN_FIELDS: usize = 4;
/// Fields per segment block: name, duration, pause, repeats.
pub const SEGMENT_FIELDS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSpec {
    pub name: String,
    pub duration_sec: u32,
    pub pause_sec: u32,
    /// `0` means a single steady step.
    pub repeats: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSpec {
    pub name: String,
    pub warmup_sec: u32,
    pub cooldown_sec: u32,
    pub segments: Vec<SegmentSpec>,
}

/// Problem found while reading a row. The offending row or segment is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    RowTooShort {
        row: usize,
        fields: usize,
    },
    /// Segments `first..=last` run past the end of the row. `needed` is the
    /// field count the first of them requires.
    SegmentsMissing {
        row: usize,
        first: usize,
        last: usize,
        needed: usize,
        available: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::RowTooShort { row, fields } => write!(
                f,
                "row {row}: skipped, {fields} field(s) but at least {MIN_FIELDS} are required"
            ),
            Diagnostic::SegmentsMissing {
                row,
                first,
                last,
                needed,
                available,
            } => {
                if first == last {
                    write!(f, "row {row}: segment {first} skipped")?;
                } else {
                    write!(f, "row {row}: segments {first}-{last} skipped")?;
                }
                write!(f, ", needs {needed} fields but row has {available}")
            }
        }
    }
}

/// Parse a whole number, falling back to `0` for anything unreadable.
///
/// Leading digits are taken the way spreadsheet exports tend to need it, so
/// `"120s"` and `"90.5"` read as `120` and `90`. Negative or empty input
/// yields `0`, as does a value too large for `u32`.
pub fn parse_int_or_zero(field: &str) -> u32 {
    let s = field.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().unwrap_or(0)
}

/// Turn one row into a [`WorkoutSpec`].
///
/// Returns `None` if the row lacks the minimum fields. Segments whose block
/// runs past the end of the row are skipped. Later blocks sit even further
/// right, so every segment from the first missing one to the declared count
/// is unreachable and they share a single diagnostic covering that range.
pub fn parse_row(
    fields: &[String],
    row: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<WorkoutSpec> {
    if fields.len() < MIN_FIELDS {
        let diag = Diagnostic::RowTooShort {
            row,
            fields: fields.len(),
        };
        log::warn!("{diag}");
        diagnostics.push(diag);
        return None;
    }

    let num_segments = parse_int_or_zero(&fields[1]) as usize;
    let mut segments = Vec::new();
    for s in 0..num_segments {
        let offset = MIN_FIELDS + SEGMENT_FIELDS * s;
        let Some(block) = fields.get(offset..offset + SEGMENT_FIELDS) else {
            let diag = Diagnostic::SegmentsMissing {
                row,
                first: s + 1,
                last: num_segments,
                needed: offset + SEGMENT_FIELDS,
                available: fields.len(),
            };
            log::warn!("{diag}");
            diagnostics.push(diag);
            break;
        };
        let name = if block[0].is_empty() {
            format!("Step{}", s + 1)
        } else {
            block[0].clone()
        };
        segments.push(SegmentSpec {
            name,
            duration_sec: parse_int_or_zero(&block[1]),
            pause_sec: parse_int_or_zero(&block[2]),
            repeats: parse_int_or_zero(&block[3]),
        });
    }

    Some(WorkoutSpec {
        name: fields[0].clone(),
        warmup_sec: parse_int_or_zero(&fields[2]),
        cooldown_sec: parse_int_or_zero(&fields[3]),
        segments,
    })
}
