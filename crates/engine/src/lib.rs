//! `costgrid-engine` - read-only grid model and the heuristic scanners that
//! run over it: keyword row search, bounded proximity scans and section
//! ledgers.
//!
//! Pure crate: no file or network IO.

pub mod cell;
pub mod normalize;
pub mod proximity;
pub mod search;
pub mod section;
pub mod sheet;
pub mod workbook;

pub use cell::Cell;
pub use search::{KeywordGroup, KeywordSpec};
pub use sheet::Sheet;
pub use workbook::Workbook;
