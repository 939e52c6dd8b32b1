// Client side of the data source REST backend
pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{CellWrite, ConfigFile, RowDetail, RowKeyQuery};

pub use http::HttpBackend;

/// Calls the session manager makes against the backend, one per endpoint.
///
/// Every call is scoped to a data source id; the backend keeps the uploaded
/// configuration and live connection under that id.
#[async_trait]
pub trait DataSourceApi: Send + Sync {
    async fn upload_config(
        &self,
        id: &str,
        core_site: &ConfigFile,
        hbase_site: &ConfigFile,
    ) -> Result<(), ApiError>;

    /// Connect to the quorum and return the cluster's table names.
    async fn connect(&self, id: &str, host: &str) -> Result<Vec<String>, ApiError>;

    async fn reconnect(&self, id: &str, host: &str) -> Result<Vec<String>, ApiError>;

    /// Remove the data source and all server-side state kept for it.
    async fn delete(&self, id: &str) -> Result<(), ApiError>;

    async fn list_rows(&self, id: &str, query: &RowKeyQuery) -> Result<Vec<String>, ApiError>;

    async fn query_row(&self, id: &str, table: &str, row_key: &str) -> Result<RowDetail, ApiError>;

    async fn add_data(&self, id: &str, cell: &CellWrite) -> Result<(), ApiError>;

    async fn delete_data(&self, id: &str, table: &str, row_key: &str) -> Result<(), ApiError>;

    async fn add_family(&self, id: &str, table: &str, family_name: &str) -> Result<(), ApiError>;
}
