//! Reading and writing the pipeline's CSV and JSON artifacts.

mod error;
mod io;
mod rows;

pub use error::DatasetError;
pub use io::{list_dir, read_csv, read_json, write_csv, write_json, write_text};
pub use rows::{
    CategorizedIssueRow, FinalRow, IssueCountRow, IssuePrRow, MeasuredIssueRow, MergeCommitRow,
};

pub(crate) use io::require;
