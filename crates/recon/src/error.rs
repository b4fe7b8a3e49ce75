use std::fmt;

#[derive(Debug)]
pub enum ExtractError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (inverted range, negative tolerance, etc.).
    ConfigValidation(String),
    /// IO error (config file read, etc.).
    Io(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}
