include!(concat!(env!("OUT_DIR"), "/generated.rs"));

/// File-name prefix of cached launcher binaries.
pub fn get_launcher_name() -> String {
    LAUNCHER_NAME.to_string().to_lowercase().replace(" ", "_")
}

pub fn get_display_launcher_name() -> String {
    LAUNCHER_NAME.to_string()
}

/// Folder under the user data directory used outside portable mode.
pub fn get_home_folder() -> String {
    HOME_FOLDER
        .map(|folder| folder.to_string())
        .unwrap_or_else(get_display_launcher_name)
}

pub fn get_edition() -> Option<String> {
    EDITION.map(|edition| edition.to_string())
}

pub fn get_entry_point() -> Option<String> {
    ENTRY_POINT.map(|entry_point| entry_point.to_string())
}

pub fn get_latest_url() -> Option<String> {
    LATEST_URL.map(|url| url.to_string())
}

pub fn get_version() -> Option<String> {
    VERSION.map(|version| version.to_string())
}
