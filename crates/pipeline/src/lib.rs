//! # Code City Pipeline
//!
//! Turns a source tree into a list of city tiles.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (extension allow-list, file cap)
//!     │      └─> SourceFile[]
//!     │
//!     ├──> Scheduler (bounded worker pool, timeout)
//!     │      └─> FileMetric[] (sorted by path)
//!     │
//!     ├──> Squarified treemap (line counts → rectangles)
//!     │
//!     └──> Assembler (+ visual encoding)
//!            └─> Tile[]
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codecity_pipeline::{build_city, CityConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), codecity_pipeline::CityError> {
//!     let city = build_city("/path/to/checkout", &CityConfig::default()).await?;
//!
//!     println!("{} tiles on a {} canvas", city.tiles.len(), city.stats.canvas_side);
//!     Ok(())
//! }
//! ```

mod builder;
mod city;
mod config;
mod error;
mod limits;
mod scanner;
mod scheduler;
mod snapshot;
mod stats;

pub use builder::{build_city, CityBuilder};
pub use city::{assemble, City, Tile};
pub use config::{CityConfig, DEFAULT_EXCLUDE_DIRS, DEFAULT_EXTENSIONS};
pub use error::{CityError, ErrorKind, ErrorReport, Result};
pub use limits::{MAX_FILES_ENV, MAX_WORKERS, TIMEOUT_SECS_ENV, WORKERS_ENV};
pub use scanner::{FileScanner, ScanOptions, ScanResult, SourceFile};
pub use scheduler::{DroppedFile, ScheduleReport, Scheduler};
pub use snapshot::{Snapshot, SnapshotMeta, SnapshotStore};
pub use stats::RunStats;
