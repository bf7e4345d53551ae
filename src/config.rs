//! Configuration
//!
//! Settings come from the environment, optionally seeded from a `.env.local`
//! or `.env` file. Command-line flags override both.

use std::path::{Path, PathBuf};

pub const ENV_DB: &str = "COACHDESK_DB";
pub const ENV_WORKSPACE: &str = "COACHDESK_WORKSPACE";
pub const ENV_USER: &str = "COACHDESK_USER";
pub const ENV_PASSWORD: &str = "COACHDESK_PASSWORD";
pub const ENV_LOG: &str = "COACHDESK_LOG";
pub const ENV_BCRYPT_COST: &str = "COACHDESK_BCRYPT_COST";

pub const DEFAULT_DB: &str = "coachdesk.db";
pub const DEFAULT_WORKSPACE: &str = "workspace";

const ENV_FILES: [&str; 2] = [".env.local", ".env"];

fn is_valid_env_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Read `KEY=VALUE` lines and skip everything else (comments, prose, code
/// fences). Variables that already hold a non-empty value are kept.
fn load_env_lenient(path: &Path) -> std::io::Result<usize> {
    let text = std::fs::read_to_string(path)?;
    let mut loaded = 0usize;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("```") {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if !is_valid_env_key(key) {
            continue;
        }
        if std::env::var(key).is_ok_and(|v| !v.trim().is_empty()) {
            continue;
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);

        std::env::set_var(key, value);
        loaded += 1;
    }

    Ok(loaded)
}

fn find_upwards(start: PathBuf, filename: &str, max_hops: usize) -> Option<PathBuf> {
    let mut cur = start;
    for _ in 0..=max_hops {
        let candidate = cur.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !cur.pop() {
            break;
        }
    }
    None
}

/// Load the first env file found upward from the working directory or the
/// executable. Returns the file used, if any.
pub fn load_env_files() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(dir);
    }

    for name in ENV_FILES {
        for root in &roots {
            let Some(path) = find_upwards(root.clone(), name, 6) else {
                continue;
            };
            if dotenvy::from_path(&path).is_ok() {
                return Some(path);
            }
            if load_env_lenient(&path).is_ok_and(|n| n > 0) {
                return Some(path);
            }
        }
    }
    None
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub workspace: PathBuf,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bcrypt_cost: u32,
}

/// Values given on the command line; `None` falls back to the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Settings {
    pub fn resolve(overrides: Overrides) -> Self {
        Self::resolve_with(overrides, env_non_empty)
    }

    fn resolve_with(overrides: Overrides, env: impl Fn(&str) -> Option<String>) -> Self {
        let bcrypt_cost = env(ENV_BCRYPT_COST)
            .and_then(|v| v.trim().parse().ok())
            .filter(|c| (4..=31).contains(c))
            .unwrap_or(bcrypt::DEFAULT_COST);

        Self {
            db_path: overrides
                .db_path
                .or_else(|| env(ENV_DB).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB)),
            workspace: overrides
                .workspace
                .or_else(|| env(ENV_WORKSPACE).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE)),
            username: overrides.username.or_else(|| env(ENV_USER)),
            password: overrides.password.or_else(|| env(ENV_PASSWORD)),
            bcrypt_cost,
        }
    }
}
