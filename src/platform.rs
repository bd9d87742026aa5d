// Shell integration cleanup. Older Windows installs dropped an uninstall
// script into the per-user application data folder; it is removed on
// startup if it is still there.

use std::path::PathBuf;

const APP_DIR: &str = "bjspm";
const UNINSTALL_SCRIPT: &str = "bjspm-uninstall.cmd";

/// Where the shell integration script lives, if the platform has a
/// per-user data directory.
pub fn uninstall_script_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(UNINSTALL_SCRIPT))
}

/// Delete the leftover script on Windows. Errors are ignored.
pub fn remove_stale_uninstall_script() {
    if cfg!(windows) {
        if let Some(path) = uninstall_script_path() {
            if let Err(e) = std::fs::remove_file(&path) {
                log::debug!("no uninstall script removed at {}: {e}", path.display());
            }
        }
    }
}
