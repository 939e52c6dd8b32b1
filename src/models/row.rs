use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column family name → (column name → value), as returned by the query endpoint.
pub type FamilyMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDetail {
    pub row_key: String,
    pub families: FamilyMap,
}

impl RowDetail {
    pub fn cell_count(&self) -> usize {
        self.families.values().map(|columns| columns.len()).sum()
    }
}

/// Parameters of one row-key listing.
///
/// A non-empty `search` asks the backend for a key lookup and suppresses the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKeyQuery {
    pub table: String,
    pub search: Option<String>,
    pub limit: usize,
}

impl RowKeyQuery {
    pub fn new(table: impl Into<String>, search: Option<&str>, limit: usize) -> Self {
        let search = search
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        RowKeyQuery {
            table: table.into(),
            search,
            limit,
        }
    }

    /// Query-string pairs for the list-rows endpoint.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("table", self.table.clone())];
        match &self.search {
            Some(key) => params.push(("rowkey", key.clone())),
            None => params.push(("limit", self.limit.to_string())),
        }
        params
    }
}

/// A single cell write for the add-data endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellWrite {
    pub table: String,
    pub row_key: String,
    pub column_family: String,
    pub column: String,
    pub value: String,
}
