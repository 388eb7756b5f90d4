//! Survey data input and output.
//!
//! Loading and cleaning of the raw survey CSV, and the derived CSV that
//! carries the cleaned table from the analysis stage to the chart stage.

pub mod loader;
pub mod processed;

pub use loader::{clean, load_survey, ColumnIndex};
pub use processed::{read_processed, write_processed};
