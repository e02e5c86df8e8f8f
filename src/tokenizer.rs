/// Split one line of a plan into trimmed fields.
///
/// A double quote toggles quoted mode, except that a pair of quotes inside a
/// quoted section is read as one literal quote. The delimiter only splits
/// outside quoted mode. Unbalanced quotes are tolerated and simply run to the
/// end of the line. After trimming, a field that is still wrapped in toggling
/// quotes has the wrapping removed.
pub fn tokenize_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    // Byte offsets in `current` of quotes that toggled quoted mode.
    let mut toggles = Vec::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                chars.next();
                current.push('"');
            } else {
                in_quotes = !in_quotes;
                toggles.push(current.len());
                current.push(c);
            }
        } else if c == delimiter && !in_quotes {
            fields.push(finish_field(&current, &toggles));
            current.clear();
            toggles.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(finish_field(&current, &toggles));
    fields
}

/// Trim and unwrap one field. Doubled quotes were already collapsed while
/// scanning, so only the toggling quotes at either end are removed here.
fn finish_field(raw: &str, toggles: &[usize]) -> String {
    let start = raw.len() - raw.trim_start().len();
    let end = raw.trim_end().len();
    let wrapped = end >= start + 2
        && toggles.contains(&start)
        && toggles.contains(&(end - 1));
    if wrapped {
        raw[start + 1..end - 1].to_string()
    } else {
        raw[start..end].to_string()
    }
}

/// Serialize fields into one line that [`tokenize_line`] reads back.
///
/// Every field is quoted so surrounding whitespace and embedded delimiters
/// survive the trip.
pub fn write_row<S: AsRef<str>>(fields: &[S], delimiter: char) -> csv::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    wtr.write_record(fields.iter().map(|f| f.as_ref()))?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let line = String::from_utf8_lossy(&bytes);
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
