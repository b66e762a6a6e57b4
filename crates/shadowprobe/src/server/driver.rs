// chromedriver discovery
//
// Locates the chromedriver executable. Search order:
// 1. CHROMEDRIVER environment variable (explicit override)
// 2. PATH lookup
//
// An explicit override pointing at a missing file is an error, not a
// fallthrough; silently ignoring it would launch a different driver than
// the one the user asked for.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Get the path to the chromedriver executable.
///
/// # Errors
///
/// Returns `Error::DriverNotFound` if no candidate exists, or
/// `Error::LaunchFailed` if CHROMEDRIVER names a missing file.
pub fn find_chromedriver() -> Result<PathBuf> {
    if let Some(path) = try_env_override()? {
        return Ok(path);
    }

    if let Some(path) = try_path_lookup() {
        return Ok(path);
    }

    Err(Error::DriverNotFound)
}

fn try_env_override() -> Result<Option<PathBuf>> {
    if let Ok(value) = std::env::var("CHROMEDRIVER") {
        let path = PathBuf::from(value);
        if path.is_file() {
            return Ok(Some(path));
        }

        return Err(Error::LaunchFailed(format!(
            "CHROMEDRIVER points to a missing file: {}",
            path.display()
        )));
    }

    Ok(None)
}

fn try_path_lookup() -> Option<PathBuf> {
    let executable = if cfg!(windows) {
        "chromedriver.exe"
    } else {
        "chromedriver"
    };

    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(executable);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}
