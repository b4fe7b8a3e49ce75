// File I/O: workbook loading, input discovery, summary export

pub mod error;
pub mod files;
pub mod summary;
pub mod xlsx;

pub use error::{ExportError, LoadError};
pub use files::list_workbooks;
pub use summary::{write_summary, SummaryRow};
pub use xlsx::load_workbook;
