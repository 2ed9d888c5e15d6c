use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{from_str, to_string};

use crate::model::ProfileRow;

/// Writes `rows` to `<path>.tmp` and returns the staged path. Nothing is
/// visible at `path` until [`commit_profiles`].
pub fn stage_profiles(path: &Path, rows: &[ProfileRow]) -> std::io::Result<PathBuf> {
    let tmp = path.with_extension("jsonl.tmp");
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        writeln!(writer, "{}", to_string(row)?)?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(tmp)
}

pub fn commit_profiles(staged: &Path, path: &Path) -> std::io::Result<()> {
    fs::rename(staged, path)
}

pub fn discard_staged(staged: &Path) {
    if let Err(e) = fs::remove_file(staged) {
        log::warn!("could not remove {}: {}", staged.display(), e);
    }
}

pub fn load_profiles(path: &Path) -> std::io::Result<Vec<ProfileRow>> {
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: ProfileRow = from_str(&line).map_err(|e| {
            std::io::Error::new(
                ErrorKind::InvalidData,
                format!("{}:{}: {}", path.display(), n + 1, e),
            )
        })?;
        rows.push(row);
    }

    log::debug!("loaded {} profile rows from {}", rows.len(), path.display());
    Ok(rows)
}
