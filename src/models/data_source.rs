use serde::{Deserialize, Serialize};
use std::path::Path;

/// A saved connection to one wide-column cluster.
///
/// Only these four fields are ever persisted; the uploaded config files stay
/// on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceProfile {
    pub id: String,
    pub name: String,
    #[serde(alias = "zkQuorum")]
    pub cluster_quorum: String,
    #[serde(default)]
    pub configured: bool,
}

/// One cluster configuration file, held in memory only while it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl ConfigFile {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        ConfigFile {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("config.xml")
            .to_string();
        Ok(ConfigFile { file_name, contents })
    }
}

/// Input of the "add data source" and "test connection" flows.
#[derive(Debug, Clone, Default)]
pub struct NewDataSource {
    pub name: String,
    pub cluster_quorum: String,
    pub core_site: Option<ConfigFile>,
    pub hbase_site: Option<ConfigFile>,
}
