use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Could not create directory {}", dst.display()))?;

    for entry in fs::read_dir(src)
        .with_context(|| format!("Could not read directory {}", src.display()))?
    {
        let entry = entry?;
        let entry_path = entry.path();
        let target_path = dst.join(entry.file_name());

        // Follows symlinks, so a linked subchart is copied as a real directory.
        let is_dir = fs::metadata(&entry_path)
            .with_context(|| format!("Could not read {}", entry_path.display()))?
            .is_dir();
        if is_dir {
            copy_dir_recursive(&entry_path, &target_path)?;
        } else {
            fs::copy(&entry_path, &target_path).with_context(|| {
                format!(
                    "Could not copy {} to {}",
                    entry_path.display(),
                    target_path.display()
                )
            })?;
        }
    }

    Ok(())
}

/// Removes a file or directory tree. A path that is already gone counts as removed.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("Could not remove {}", path.display())),
    }
}
