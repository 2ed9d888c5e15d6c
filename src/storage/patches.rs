use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use serde_json::{from_str, to_string};

use crate::model::AppliedPatch;

pub fn append_patches(path: &Path, applied: &[AppliedPatch]) -> std::io::Result<()> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = BufWriter::new(file);

    for patch in applied {
        writeln!(writer, "{}", to_string(patch)?)?;
    }

    writer.flush()
}

/// Current length of the patch log, `None` if it does not exist yet.
pub fn patch_log_len(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}

/// Cuts the patch log back to `len` bytes, or removes it when it did not
/// exist before.
pub fn rollback_patches(path: &Path, len: Option<u64>) {
    let result = match len {
        Some(len) => OpenOptions::new()
            .write(true)
            .open(path)
            .and_then(|file| file.set_len(len)),
        None if path.is_file() => fs::remove_file(path),
        None => Ok(()),
    };
    if let Err(e) = result {
        log::warn!("could not roll back {}: {}", path.display(), e);
    }
}

pub fn load_patches(path: &Path) -> std::io::Result<Vec<AppliedPatch>> {
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);

    let mut patches = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let patch: AppliedPatch = from_str(&line).map_err(|e| {
            std::io::Error::new(
                ErrorKind::InvalidData,
                format!("{}:{}: {}", path.display(), n + 1, e),
            )
        })?;
        patches.push(patch);
    }

    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Patch, Scheme};
    use crate::util::derive_identifier;
    use chrono::Utc;

    fn applied(from: &str) -> AppliedPatch {
        AppliedPatch {
            patch: Patch {
                external_id: "user_2example1".into(),
                from: from.to_string(),
                to: derive_identifier("user_2example1"),
                scheme: Scheme::Legacy,
            },
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn malformed_line_names_its_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.jsonl");
        append_patches(&path, &[applied("old")]).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"{\"from\":\n")
            .unwrap();

        let err = load_patches(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains(":2:"), "{err}");
    }

    #[test]
    fn rollback_restores_previous_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.jsonl");
        append_patches(&path, &[applied("first")]).unwrap();

        let before = patch_log_len(&path);
        append_patches(&path, &[applied("second")]).unwrap();
        rollback_patches(&path, before);

        let patches = load_patches(&path).unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].patch.from, "first");
    }

    #[test]
    fn rollback_removes_log_that_did_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.jsonl");
        let before = patch_log_len(&path);
        append_patches(&path, &[applied("only")]).unwrap();

        rollback_patches(&path, before);
        assert!(!path.exists());
    }
}
