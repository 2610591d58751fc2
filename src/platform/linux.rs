// Platform paths for Linux
// Config: ~/.config/linkvault
// Data:   ~/.local/share/linkvault

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/linkvault` if set, otherwise `~/.config/linkvault`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("linkvault"),
        Err(_) => home_dir().join(".config").join("linkvault"),
    }
}

/// Uses `$XDG_DATA_HOME/linkvault` if set, otherwise `~/.local/share/linkvault`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("linkvault"),
        Err(_) => home_dir().join(".local").join("share").join("linkvault"),
    }
}
