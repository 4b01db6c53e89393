//! Application-wide constants

/// Settings file location and keys
pub mod config {
    /// Directory under the per-user config root
    pub const APP_DIR: &str = "termfit";

    /// Settings file name
    pub const FILENAME: &str = "termfit.settings";

    /// Saved window width, in columns
    pub const KEY_WIDTH: &str = "width";

    /// Saved window height, in rows
    pub const KEY_HEIGHT: &str = "height";

    /// Whether the window is centered after resizing
    pub const KEY_CENTER: &str = "center";

    /// Centering behavior when neither the arguments nor the saved config
    /// say otherwise
    pub const DEFAULT_CENTER: bool = true;
}

/// Terminal sizing bounds
pub mod limits {
    /// Narrowest window that is still usable
    pub const MIN_COLUMNS: u16 = 8;

    /// Shortest window that is still usable
    pub const MIN_ROWS: u16 = 1;

    /// Columns reserved for scrollbar and frame chrome
    pub const COLUMN_MARGIN: u16 = 4;

    /// Rows reserved for the title bar
    pub const ROW_MARGIN: u16 = 1;
}

/// Informational URLs for the shortcut flags
pub mod info {
    pub const EMAIL: &str = "mailto:termfit@fastmail.com";

    pub const WEBSITE: &str = "https://termfit.dev";

    pub const SOURCE: &str = "https://github.com/termfit/termfit";

    pub const LICENSE: &str = "https://opensource.org/licenses/MIT";
}
