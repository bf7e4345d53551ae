use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Largest file accepted by `attach` (100MB)
pub const MAX_ATTACHMENT_SIZE: u64 = 100 * 1024 * 1024;

/// Canonicalize an existing file path and refuse system directories.
pub fn validate_path(path_str: &str) -> Result<PathBuf, AppError> {
    let path = Path::new(path_str.trim());
    if !path.exists() {
        return Err(AppError::FileNotFound(path_str.to_string()));
    }

    let canonical_path = path.canonicalize()?;
    if !canonical_path.is_file() {
        return Err(AppError::Validation(format!(
            "'{}' is not a regular file",
            canonical_path.display()
        )));
    }

    if is_blocked_path(&canonical_path) {
        return Err(AppError::Validation(format!(
            "access to system directory is blocked: {}",
            canonical_path.display()
        )));
    }

    Ok(canonical_path)
}

fn is_blocked_path(path: &Path) -> bool {
    let path_str = path.to_string_lossy();

    #[cfg(target_os = "windows")]
    {
        let lower = path_str.to_lowercase();
        if lower.contains(r"c:\windows") || lower.contains(r"c:\program files") {
            return true;
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        const BLOCKED: [&str; 9] = [
            "/etc", "/var", "/root", "/proc", "/sys", "/bin", "/sbin", "/usr/bin", "/usr/sbin",
        ];
        if BLOCKED
            .iter()
            .any(|prefix| path_str == *prefix || path_str.starts_with(&format!("{}/", prefix)))
        {
            return true;
        }
    }

    false
}

/// Returns the file size, or a validation error if it exceeds `max_size`
pub fn validate_file_size(path: &Path, max_size: u64) -> Result<u64, AppError> {
    let size = fs::metadata(path)?.len();
    if size > max_size {
        return Err(AppError::Validation(format!(
            "file too large: {}MB (max {}MB)",
            size / (1024 * 1024),
            max_size / (1024 * 1024)
        )));
    }
    Ok(size)
}

/// Six random lowercase hex characters used to keep output names unique
pub fn short_hex() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_string()
}

/// Client name made safe for use inside a file name
pub fn file_name_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "cliente".to_string()
    } else {
        cleaned
    }
}

/// `<workspace>/<name>_<6hex>_<suffix>.<ext>`
pub fn output_path(workspace: &Path, client_name: &str, suffix: &str, ext: &str) -> PathBuf {
    workspace.join(format!(
        "{}_{}_{}.{}",
        file_name_component(client_name),
        short_hex(),
        suffix,
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.pdf");
        assert!(matches!(
            validate_path(missing.to_str().unwrap()),
            Err(AppError::FileNotFound(_))
        ));
    }

    #[test]
    fn blocked_prefixes_match_whole_components() {
        assert!(is_blocked_path(Path::new("/etc/passwd")));
        assert!(!is_blocked_path(Path::new("/etcetera/report.pdf")));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("big.pdf");
        fs::write(&file, vec![0u8; 2048]).unwrap();
        assert_eq!(validate_file_size(&file, 4096).unwrap(), 2048);
        assert!(matches!(
            validate_file_size(&file, 1024),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn output_path_follows_naming_scheme() {
        let p = output_path(Path::new("/ws"), "Ana Ruiz", "informe_final", "pdf");
        let name = p.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("Ana_Ruiz_"));
        assert!(name.ends_with("_informe_final.pdf"));
        let hex = &name["Ana_Ruiz_".len().."Ana_Ruiz_".len() + 6];
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
