//! Runtime configuration
//!
//! Everything is read from environment variables, falling back to paths next
//! to the project root when the binary runs out of `target/{debug,release}`.

use std::path::PathBuf;

use crate::report::DisplayPrecision;

pub const ENV_DATABASE_PATH: &str = "DIAREPORT_DATABASE_PATH";
pub const ENV_OUTPUT_DIR: &str = "DIAREPORT_OUTPUT_DIR";
pub const ENV_HISTORY_LIMIT: &str = "DIAREPORT_HISTORY_LIMIT";
pub const ENV_DISPLAY_PRECISION: &str = "DIAREPORT_DISPLAY_PRECISION";

/// Number of raw readings shown per history table
pub const DEFAULT_HISTORY_LIMIT: usize = 7;

/// Decimal places used for averages in rendered reports
pub const DEFAULT_DISPLAY_DECIMALS: u8 = 1;

/// Resolved configuration for the server and the utility binaries
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub output_dir: PathBuf,
    pub history_limit: usize,
    pub display_precision: DisplayPrecision,
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(ENV_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root().join("data").join("diareport.db"));

        let output_dir = lookup(ENV_OUTPUT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root().join("reports"));

        let history_limit = match lookup(ENV_HISTORY_LIMIT) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        "Ignoring invalid {}={:?}, using {}",
                        ENV_HISTORY_LIMIT,
                        raw,
                        DEFAULT_HISTORY_LIMIT
                    );
                    DEFAULT_HISTORY_LIMIT
                }
            },
            None => DEFAULT_HISTORY_LIMIT,
        };

        let display_precision = match lookup(ENV_DISPLAY_PRECISION) {
            Some(raw) => DisplayPrecision::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring invalid {}={:?}, using {} decimals",
                    ENV_DISPLAY_PRECISION,
                    raw,
                    DEFAULT_DISPLAY_DECIMALS
                );
                DisplayPrecision::Decimals(DEFAULT_DISPLAY_DECIMALS)
            }),
            None => DisplayPrecision::Decimals(DEFAULT_DISPLAY_DECIMALS),
        };

        Self {
            database_path,
            output_dir,
            history_limit,
            display_precision,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Directory holding the executable, or the project root when running from
/// `target/release` or `target/debug`
fn project_root() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path
}
