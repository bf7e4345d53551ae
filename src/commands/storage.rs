//! Database backup

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AppError, CommandResult};

use super::Session;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResult {
    pub backup_path: String,
    pub bytes: u64,
}

/// Resolve a path that may not exist yet: its parent must exist and is
/// canonicalized; the file name is kept as given.
fn resolve_output_path(path: &Path) -> Result<PathBuf, AppError> {
    if path.exists() {
        if path.is_dir() {
            return Err(AppError::Validation(format!(
                "{} is a directory",
                path.display()
            )));
        }
        return Ok(path.canonicalize()?);
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::Validation(format!("{} has no file name", path.display())))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(AppError::Validation(format!(
            "parent directory {} does not exist",
            parent.display()
        )));
    }
    Ok(parent.canonicalize()?.join(file_name))
}

pub fn backup_database(session: &Session, path: &Path) -> CommandResult<BackupResult> {
    let out_path = resolve_output_path(path)?;
    let live = session.settings.db_path.canonicalize().ok();
    if live.as_deref() == Some(out_path.as_path()) {
        return Err(AppError::InvalidOperation(
            "backup target is the live database".to_string(),
        )
        .into());
    }

    session.db.export_db_to_file(&out_path)?;
    let bytes = std::fs::metadata(&out_path).map_err(AppError::from)?.len();
    tracing::info!(path = %out_path.display(), bytes, "database backed up");

    Ok(BackupResult {
        backup_path: out_path.to_string_lossy().to_string(),
        bytes,
    })
}
