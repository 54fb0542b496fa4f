pub mod collate;
pub mod engine;
pub mod parser;
pub mod pipeline;

pub use crate::domain::model::{BulkDownload, BulkRun, LogEntry, RunStats, Summary};
pub use crate::domain::ports::{ConfigProvider, LogReader, LogSource, Pipeline};
pub use crate::utils::error::Result;
