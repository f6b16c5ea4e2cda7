//! `.env` file discovery.

use std::path::{Path, PathBuf};

/// Name of the file looked for in `start` and its ancestors.
const ENV_FILE: &str = ".env";

/// Load the nearest `.env` file, starting at `start` and walking up.
///
/// Variables already set in the process environment are not overridden.
/// Returns the path that was loaded, or `None` when no file was found.
///
/// # Errors
///
/// Returns the `dotenvy` error when a file exists but cannot be read or
/// parsed.
pub fn load_dotenv_from(start: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    let Some(path) = start
        .ancestors()
        .map(|dir| dir.join(ENV_FILE))
        .find(|candidate| candidate.is_file())
    else {
        return Ok(None);
    };

    dotenvy::from_path(&path)?;
    Ok(Some(path))
}
