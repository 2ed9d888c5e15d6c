use std::path::Path;

use crate::config::{Config, INDEX_FILE, PATCHES_FILE, PROFILES_FILE};

fn create_data_files(data_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir)?;

    for name in [PROFILES_FILE, PATCHES_FILE, INDEX_FILE] {
        let file = data_dir.join(name);
        if file.exists() {
            continue;
        }
        std::fs::File::create(&file)?;
        log::info!("created {}", file.display());
    }

    Ok(())
}

/// Creates the data directory and any missing store files. Existing files
/// are left untouched.
pub fn install(config: &Config) -> std::io::Result<()> {
    create_data_files(&config.data_dir)?;
    Ok(())
}
