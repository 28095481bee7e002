use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` (Unix or Windows separator) to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home().join(rest);
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_untouched() {
        assert_eq!(expand_tilde(" /tmp/store.json "), PathBuf::from("/tmp/store.json"));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/notes/store.json"), home.join("notes/store.json"));
            assert_eq!(expand_tilde("~"), home);
        }
    }
}
