use std::fmt;

#[derive(Debug)]
pub enum LoadError {
    /// The file is not a readable spreadsheet.
    Open(String),
    /// The workbook opened but lists no sheets.
    NoSheets,
    /// A listed sheet could not be read.
    Sheet { name: String, message: String },
    /// Directory listing or other filesystem failure.
    Io(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "failed to open workbook: {msg}"),
            Self::NoSheets => write!(f, "workbook contains no sheets"),
            Self::Sheet { name, message } => write!(f, "failed to read sheet '{name}': {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug)]
pub enum ExportError {
    Csv(String),
    Io(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}
