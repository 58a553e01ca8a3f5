use std::path::PathBuf;

pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LEARNIT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let mut path = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()));
    path.push(".local/share/learnit");
    path
}

pub fn get_database_path() -> PathBuf {
    let mut path = get_data_dir();
    path.push("learnit.db");
    path
}

/// Format a byte count the way the settings screen shows cache size.
pub fn format_size_mb(bytes: usize) -> String {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    format!("{:.2} MB", mb)
}
