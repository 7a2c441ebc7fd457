//! Environment-backed defaults.
//!
//! Precedence for the default dataset path: `--data` flag, then
//! `SHOWROOM_DATA_PATH` (process env or `.env`), then [`DEFAULT_DATA_PATH`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Sheet shipped next to the binary's working directory.
pub const DEFAULT_DATA_PATH: &str = "data/Book Dashboard.xlsx";

pub const DATA_PATH_ENV: &str = "SHOWROOM_DATA_PATH";

/// Load `.env` from the working directory, if present. Returns the file used.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Resolve the default dataset path from the CLI value and environment.
pub fn resolve_data_path(cli: Option<&Path>) -> PathBuf {
    resolve_data_path_from(cli, std::env::var_os(DATA_PATH_ENV))
}

fn resolve_data_path_from(cli: Option<&Path>, env: Option<OsString>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    match env {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DATA_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_beats_env_beats_default() {
        let env = Some(OsString::from("env/sheet.csv"));
        assert_eq!(
            resolve_data_path_from(Some(Path::new("cli.xlsx")), env.clone()),
            PathBuf::from("cli.xlsx")
        );
        assert_eq!(resolve_data_path_from(None, env), PathBuf::from("env/sheet.csv"));
        assert_eq!(resolve_data_path_from(None, None), PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(
            resolve_data_path_from(None, Some(OsString::new())),
            PathBuf::from(DEFAULT_DATA_PATH)
        );
    }
}
