use crate::document::WorkoutDocument;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value).map_err(std::io::Error::other)
}

/// File name for a workout: its name reduced to safe characters plus the row.
fn file_name(row: usize, name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        stem.push_str("workout");
    }
    format!("{row:03}_{stem}.json")
}

/// Write every document into `dir`, one file each. Returns the written paths.
pub fn save_documents<P: AsRef<Path>>(
    dir: P,
    documents: &[(usize, WorkoutDocument)],
) -> std::io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(documents.len());
    for (row, doc) in documents {
        let path = dir.join(file_name(*row, &doc.name));
        write_json(doc, &path)?;
        log::info!("Wrote {}", path.display());
        paths.push(path);
    }
    Ok(paths)
}
