use crate::models::RowDetail;

/// Table/row pane of the active data source.
///
/// Holds only what is on screen. Row keys and row detail are never cached
/// across tables; every table change or search refetches them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Browser {
    tables: Vec<String>,
    selected_table: Option<String>,
    search_key: String,
    row_keys: Vec<String>,
    selected_row_key: Option<String>,
    detail: Option<RowDetail>,
}

impl Browser {
    /// Fresh pane for a newly connected data source.
    pub fn with_tables(tables: Vec<String>) -> Self {
        Browser {
            tables,
            ..Browser::default()
        }
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.selected_table.as_deref()
    }

    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    pub fn row_keys(&self) -> &[String] {
        &self.row_keys
    }

    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    pub fn selected_row_key(&self) -> Option<&str> {
        self.selected_row_key.as_deref()
    }

    pub fn detail(&self) -> Option<&RowDetail> {
        self.detail.as_ref()
    }

    /// Switch tables: search box, detail pane and row label all reset.
    pub(crate) fn select_table(&mut self, table: &str) {
        self.selected_table = Some(table.to_string());
        self.search_key.clear();
        self.clear_detail();
    }

    /// Stale keys are wiped before a listing request goes out.
    pub(crate) fn begin_listing(&mut self, table: &str, search: Option<&str>) {
        self.selected_table = Some(table.to_string());
        self.search_key = search.unwrap_or_default().trim().to_string();
        self.row_keys.clear();
    }

    pub(crate) fn set_row_keys(&mut self, row_keys: Vec<String>) {
        self.row_keys = row_keys;
    }

    /// Point the row label at `row_key`, returning the previous label.
    pub(crate) fn mark_selected(&mut self, row_key: &str) -> Option<String> {
        self.selected_row_key.replace(row_key.to_string())
    }

    pub(crate) fn restore_selected(&mut self, previous: Option<String>) {
        self.selected_row_key = previous;
    }

    pub(crate) fn show_detail(&mut self, detail: RowDetail) {
        self.detail = Some(detail);
    }

    pub(crate) fn clear_detail(&mut self) {
        self.detail = None;
        self.selected_row_key = None;
    }
}
