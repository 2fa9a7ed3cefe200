//! Daemon pid file under the platform config dir.

use std::path::PathBuf;

fn pid_path() -> PathBuf {
    let parent = dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("goggles");
    if !parent.exists() {
        let _ = std::fs::create_dir_all(&parent);
    }
    parent.join("goggles.pid")
}

pub fn save_pid(pid: u32) {
    let _ = std::fs::write(pid_path(), pid.to_string());
}

pub fn clear_pid() {
    let _ = std::fs::remove_file(pid_path());
}
