pub const APP_NAME: &str = "kiln";

/// Joins path segments into the string used as cache and graph key.
pub const PATH_SEPARATOR: &str = ".";

/// Prefix of synthesized paths for inputs that declare none.
pub const DEFAULT_PATH_PREFIX: [&str; 2] = [APP_NAME, "inline"];

pub const AUTO_CONNECT_ENV: &str = "KILN_AUTO_CONNECT";
