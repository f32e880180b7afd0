//! borderhub-core: result tables, reshaping and figures for the borderland
//! dashboard.
//!
//! The MPI and CI values are computed upstream and only read here. Files are
//! parsed once per process through [`DatasetCache`]; every view is a pure
//! transform over the cached tables.

pub mod config;
pub mod dataset;
pub mod error;
pub mod explorer;
pub mod figures;
pub mod models;
pub mod pivot;
pub mod slides;
pub mod storage;

pub use config::HubConfig;
pub use dataset::{DatasetCache, DatasetKind, Datasets};
pub use error::HubError;
pub use explorer::{ResultExplorer, View};
pub use models::{BorderPost, BorderSelection, ConflictRecord, Decay, FilterSelection, Table};
pub use pivot::{Aggregation, PivotMatrix};
pub use slides::{Slide, SlideNavigator, SlidePosition};
