// HBase data source browser
// Client library for the data source REST backend plus the session logic
// behind the command line front end.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod state;
pub mod utils;

// Re-export commonly used types for convenience
pub use api::{DataSourceApi, HttpBackend};
pub use config::Config;
pub use core::{Confirm, SessionManager, SessionOptions};
pub use error::{ApiError, ClientError};
pub use models::{CellWrite, ConfigFile, DataSourceProfile, NewDataSource, RowDetail, RowKeyQuery};
pub use state::ViewState;
