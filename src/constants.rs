//! Common constants used throughout the extsmith application.

/// License written into the manifest when none is given.
pub const DEFAULT_LICENSE: &str = "GPL v2";

/// Locale of the generated language files when none is given.
pub const DEFAULT_LOCALE: &str = "en-GB";

/// Name of the first view of a component when none is given.
pub const DEFAULT_VIEW_NAME: &str = "Main";

/// Permission bits applied to every generated directory.
pub const DIRECTORY_MODE: u32 = 0o755;

/// Permission bits applied to every generated file.
pub const FILE_MODE: u32 = 0o644;

pub const SQL_INSTALL_FILE: &str = "install.mysql.utf8.sql";
pub const SQL_UNINSTALL_FILE: &str = "uninstall.mysql.utf8.sql";
pub const SQL_UPDATES_DIR: &str = "sql/updates/mysql";

/// First table created by the install script.
pub const INITIAL_TABLE_NAME: &str = "storage_table_1";
