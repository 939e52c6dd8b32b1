use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{DataSourceApi, HttpBackend};
use crate::config::{Config, DEFAULT_ROW_LIMIT};
use crate::core::browser::Browser;
use crate::core::busy::{BusyControls, Control};
use crate::core::confirm::Confirm;
use crate::core::forms::{AddDataForm, AddFamilyForm, Forms};
use crate::core::notify::{Notice, Notifier};
use crate::core::store::{FileStorage, ProfileStore};
use crate::error::ClientError;
use crate::models::{DataSourceProfile, NewDataSource, RowDetail, RowKeyQuery};
use crate::state::{SessionState, ViewState};
use crate::utils::{require_config_files, require_non_empty};

const MISSING_FIELDS: &str = "Please fill in all required fields";
const NO_TABLE: &str = "Please select a table first";

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Upper bound on row keys fetched when no search key is given.
    pub row_limit: usize,
    pub settle_delay: Duration,
    pub notice_duration: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            row_limit: DEFAULT_ROW_LIMIT,
            settle_delay: Duration::from_millis(500),
            notice_duration: Duration::from_secs(3),
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        SessionOptions {
            row_limit: config.row_limit,
            settle_delay: config.settle_delay,
            notice_duration: config.notice_duration,
        }
    }
}

/// Outcome of the best-effort delete that undoes an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    Removed,
    Failed(String),
}

/// Single controller for data sources, browsing and mutations.
///
/// Every operation takes `&mut self`, so one operation runs to completion
/// (all of its awaited backend calls included) before the next one can touch
/// the active profile, the saved list or the browser pane.
pub struct SessionManager {
    api: Arc<dyn DataSourceApi>,
    store: ProfileStore,
    state: SessionState,
    browser: Browser,
    forms: Forms,
    notifier: Notifier,
    busy: BusyControls,
    options: SessionOptions,
    last_compensation: Option<(String, Compensation)>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn DataSourceApi>, store: ProfileStore, options: SessionOptions) -> Self {
        let state = SessionState::new(store.load());
        SessionManager {
            api,
            store,
            state,
            browser: Browser::default(),
            forms: Forms::default(),
            notifier: Notifier::new(options.notice_duration),
            busy: BusyControls::new(),
            options,
            last_compensation: None,
        }
    }

    /// HTTP backend at `config.api_url`, profiles under `config.data_dir`.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let api = HttpBackend::new(&config.api_url)?;
        let store = ProfileStore::new(FileStorage::new(&config.data_dir));
        Ok(Self::new(Arc::new(api), store, SessionOptions::from(config)))
    }

    pub fn profiles(&self) -> &[DataSourceProfile] {
        self.state.profiles()
    }

    pub fn find_profile(&self, id_or_name: &str) -> Option<&DataSourceProfile> {
        self.state.find(id_or_name)
    }

    pub fn active_profile(&self) -> Option<&DataSourceProfile> {
        self.state.active()
    }

    pub fn view(&self) -> ViewState {
        self.state.view()
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn busy(&self) -> &BusyControls {
        &self.busy
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn add_data_form(&self) -> Option<&AddDataForm> {
        self.forms.add_data.as_ref()
    }

    pub fn add_data_form_mut(&mut self) -> Option<&mut AddDataForm> {
        self.forms.add_data.as_mut()
    }

    pub fn add_family_form(&self) -> Option<&AddFamilyForm> {
        self.forms.add_family.as_ref()
    }

    pub fn add_family_form_mut(&mut self) -> Option<&mut AddFamilyForm> {
        self.forms.add_family.as_mut()
    }

    pub fn last_compensation(&self) -> Option<&(String, Compensation)> {
        self.last_compensation.as_ref()
    }

    /// Notices still within their display window.
    pub fn notices(&mut self) -> Vec<Notice> {
        self.notifier.active()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notifier.drain()
    }

    // ---- data sources ----

    /// Upload the cluster config under a new id, connect, and only then save
    /// and activate the profile.
    pub async fn create(&mut self, input: NewDataSource) -> Result<DataSourceProfile, ClientError> {
        let guard = self.busy.set_busy(Control::SaveDataSource);
        let result = match guard {
            Ok(_guard) => self.create_inner(input).await,
            Err(e) => Err(e),
        };
        self.report(result, Some("Data source created"))
    }

    async fn create_inner(&mut self, input: NewDataSource) -> Result<DataSourceProfile, ClientError> {
        let name = require_non_empty(&input.name, MISSING_FIELDS)?;
        let cluster_quorum = require_non_empty(&input.cluster_quorum, MISSING_FIELDS)?;
        let (core_site, hbase_site) = require_config_files(
            input.core_site.as_ref(),
            input.hbase_site.as_ref(),
            MISSING_FIELDS,
        )?;

        let profile = DataSourceProfile {
            id: Uuid::new_v4().to_string(),
            name,
            cluster_quorum,
            configured: true,
        };
        info!("Creating data source '{}' ({})", profile.name, profile.id);

        self.api
            .upload_config(&profile.id, core_site, hbase_site)
            .await
            .map_err(|e| ClientError::Upload(e.message_or("Failed to upload configuration files")))?;

        match self.connect_and_save(&profile).await {
            Ok(tables) => {
                self.activate(&profile.id, tables);
                Ok(profile)
            }
            Err(e) => {
                self.compensate(&profile.id).await;
                Err(e)
            }
        }
    }

    async fn connect_and_save(&mut self, profile: &DataSourceProfile) -> Result<Vec<String>, ClientError> {
        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        let tables = self
            .api
            .connect(&profile.id, &profile.cluster_quorum)
            .await
            .map_err(|e| ClientError::Connect(e.message_or("Connection failed")))?;

        let mut profiles = self.state.profiles().to_vec();
        profiles.push(profile.clone());
        self.store.save_all(&profiles)?;
        self.state.push(profile.clone());
        Ok(tables)
    }

    /// Best-effort removal of server-side state; the outcome is logged and kept,
    /// never returned as the caller's error.
    async fn compensate(&mut self, id: &str) -> Compensation {
        let outcome = match self.api.delete(id).await {
            Ok(()) => {
                info!("Removed server-side state for {}", id);
                Compensation::Removed
            }
            Err(e) => {
                warn!("Cleanup of server-side state for {} failed: {}", id, e);
                Compensation::Failed(e.to_string())
            }
        };
        self.last_compensation = Some((id.to_string(), outcome.clone()));
        outcome
    }

    fn activate(&mut self, id: &str, tables: Vec<String>) {
        self.state.set_active(id);
        self.browser = Browser::with_tables(tables);
        self.forms.close_all();
    }

    /// Connect to a saved data source and make it the active one.
    pub async fn select(&mut self, id_or_name: &str) -> Result<Vec<String>, ClientError> {
        let guard = self.busy.set_busy(Control::SelectDataSource);
        let result = match guard {
            Ok(_guard) => self.select_inner(id_or_name).await,
            Err(e) => Err(e),
        };
        self.report(result, None)
    }

    async fn select_inner(&mut self, id_or_name: &str) -> Result<Vec<String>, ClientError> {
        let profile = self.lookup(id_or_name)?;
        let tables = self
            .api
            .connect(&profile.id, &profile.cluster_quorum)
            .await
            .map_err(|e| ClientError::Connect(format!("Connection failed: {}", e.message_or("backend refused"))))?;

        info!("Browsing data source '{}' ({} tables)", profile.name, tables.len());
        self.activate(&profile.id, tables.clone());
        Ok(tables)
    }

    /// Re-establish a dropped backend connection, then select the data source.
    pub async fn reconnect(&mut self, id_or_name: &str) -> Result<Vec<String>, ClientError> {
        let guard = self.busy.set_busy(Control::Reconnect);
        let result = match guard {
            Ok(_guard) => self.reconnect_inner(id_or_name).await,
            Err(e) => Err(e),
        };
        self.report(result, Some("Reconnected"))
    }

    async fn reconnect_inner(&mut self, id_or_name: &str) -> Result<Vec<String>, ClientError> {
        let profile = self.lookup(id_or_name)?;
        self.api
            .reconnect(&profile.id, &profile.cluster_quorum)
            .await
            .map_err(|e| ClientError::Connect(format!("Reconnect failed: {}", e.message_or("backend refused"))))?;
        self.select_inner(&profile.id).await
    }

    /// Delete a data source after confirmation. `Ok(false)` means the user declined.
    pub async fn delete(&mut self, id_or_name: &str, confirm: &dyn Confirm) -> Result<bool, ClientError> {
        let guard = self.busy.set_busy(Control::DeleteDataSource);
        let result = match guard {
            Ok(_guard) => self.delete_inner(id_or_name, confirm).await,
            Err(e) => Err(e),
        };
        let success = matches!(result, Ok(true)).then_some("Data source deleted");
        self.report(result, success)
    }

    async fn delete_inner(&mut self, id_or_name: &str, confirm: &dyn Confirm) -> Result<bool, ClientError> {
        let profile = self.lookup(id_or_name)?;
        if !confirm.confirm(&format!("Delete data source \"{}\"?", profile.name)) {
            info!("Deletion of '{}' cancelled", profile.name);
            return Ok(false);
        }

        self.api
            .delete(&profile.id)
            .await
            .map_err(|e| ClientError::Delete(format!("Delete failed: {}", e.message_or("backend refused"))))?;

        let remaining: Vec<DataSourceProfile> = self
            .state
            .profiles()
            .iter()
            .filter(|p| p.id != profile.id)
            .cloned()
            .collect();
        // The backend state is gone either way, so the in-memory list follows it
        if self.state.remove(&profile.id) {
            self.browser = Browser::default();
            self.forms.close_all();
        }
        if let Err(e) = self.store.save_all(&remaining) {
            warn!(
                "Data source {} was deleted on the backend but the saved list could not be updated: {}",
                profile.id, e
            );
            return Err(e);
        }
        Ok(true)
    }

    /// Upload and connect under a throwaway id without saving anything.
    /// The throwaway id is always cleaned up once the upload went through.
    pub async fn test_connection(&mut self, input: NewDataSource) -> Result<Vec<String>, ClientError> {
        let guard = self.busy.set_busy(Control::TestConnection);
        let result = match guard {
            Ok(_guard) => self.test_connection_inner(input).await,
            Err(e) => Err(e),
        };
        self.report(result, Some("Connection test succeeded"))
    }

    async fn test_connection_inner(&mut self, input: NewDataSource) -> Result<Vec<String>, ClientError> {
        let cluster_quorum = require_non_empty(&input.cluster_quorum, MISSING_FIELDS)?;
        let (core_site, hbase_site) = require_config_files(
            input.core_site.as_ref(),
            input.hbase_site.as_ref(),
            MISSING_FIELDS,
        )?;

        let test_id = format!("test-{}", Utc::now().timestamp_millis());
        self.api
            .upload_config(&test_id, core_site, hbase_site)
            .await
            .map_err(|e| {
                ClientError::Upload(format!(
                    "Connection test failed: {}",
                    e.message_or("Failed to upload configuration files")
                ))
            })?;

        let connected = self.api.connect(&test_id, &cluster_quorum).await;
        self.compensate(&test_id).await;
        connected.map_err(|e| {
            ClientError::Connect(format!("Connection test failed: {}", e.message_or("Connection failed")))
        })
    }

    fn lookup(&self, id_or_name: &str) -> Result<DataSourceProfile, ClientError> {
        self.state
            .find(id_or_name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id_or_name.to_string()))
    }

    fn require_active(&self) -> Result<String, ClientError> {
        self.state
            .active_id()
            .map(str::to_string)
            .ok_or(ClientError::NoActiveDataSource)
    }

    // ---- browsing ----

    /// Switch the browsed table and load its first page of row keys.
    pub async fn choose_table(&mut self, table: &str) -> Result<Vec<String>, ClientError> {
        if let Err(e) = self.check_table(table) {
            return self.report(Err(e), None);
        }
        self.browser.select_table(table);
        self.list_row_keys(table, None).await
    }

    fn check_table(&self, table: &str) -> Result<(), ClientError> {
        self.require_active()?;
        if !self.browser.has_table(table) {
            return Err(ClientError::Validation(format!("Unknown table: {}", table)));
        }
        Ok(())
    }

    /// Search the selected table; an empty key lists the default page.
    pub async fn search(&mut self, search_key: &str) -> Result<Vec<String>, ClientError> {
        let Some(table) = self.browser.selected_table().map(str::to_string) else {
            return self.report(Err(ClientError::Validation(NO_TABLE.to_string())), None);
        };
        self.list_row_keys(&table, Some(search_key)).await
    }

    /// List row keys of `table` with the configured limit.
    pub async fn list_row_keys(&mut self, table: &str, search: Option<&str>) -> Result<Vec<String>, ClientError> {
        self.list_row_keys_limited(table, search, None).await
    }

    /// List row keys of `table`. A search that finds exactly one key opens it.
    pub async fn list_row_keys_limited(
        &mut self,
        table: &str,
        search: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<String>, ClientError> {
        let limit = limit.unwrap_or(self.options.row_limit);
        let guard = self.busy.set_busy(Control::ListRowKeys);
        let result = match guard {
            Ok(_guard) => self.list_row_keys_inner(table, search, limit).await,
            Err(e) => Err(e),
        };
        let result = self.report(result, None);

        let searched = search.map(str::trim).is_some_and(|key| !key.is_empty());
        if let Ok(keys) = &result {
            if searched && keys.len() == 1 {
                // Failures are already surfaced by get_row itself
                let _ = self.get_row(table, &keys[0]).await;
            }
        }
        result
    }

    async fn list_row_keys_inner(
        &mut self,
        table: &str,
        search: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, ClientError> {
        let id = self.require_active()?;
        self.check_table(table)?;
        // Another table's row label and detail must not outlive the switch
        if self.browser.selected_table() != Some(table) {
            self.browser.select_table(table);
        }
        let query = RowKeyQuery::new(table, search, limit);
        self.browser.begin_listing(table, search);

        let keys = self
            .api
            .list_rows(&id, &query)
            .await
            .map_err(|e| ClientError::List(format!("Failed to load row keys: {}", e.message_or("request rejected"))))?;
        self.browser.set_row_keys(keys.clone());
        Ok(keys)
    }

    /// Load every cell of one row into the detail pane.
    ///
    /// The row label switches before the fetch and rolls back if it fails, so
    /// the label never names a row whose detail is not the one displayed.
    pub async fn get_row(&mut self, table: &str, row_key: &str) -> Result<RowDetail, ClientError> {
        let guard = self.busy.set_busy(Control::LoadRow);
        let result = match guard {
            Ok(_guard) => self.get_row_inner(table, row_key).await,
            Err(e) => Err(e),
        };
        self.report(result, None)
    }

    async fn get_row_inner(&mut self, table: &str, row_key: &str) -> Result<RowDetail, ClientError> {
        let id = self.require_active()?;
        let previous = self.browser.mark_selected(row_key);

        match self.api.query_row(&id, table, row_key).await {
            Ok(detail) => {
                self.browser.show_detail(detail.clone());
                Ok(detail)
            }
            Err(e) => {
                self.browser.restore_selected(previous);
                Err(ClientError::Query(format!("Failed to load row data: {}", e.message_or("request rejected"))))
            }
        }
    }

    /// Delete a whole row after confirmation, then refresh the listing.
    pub async fn delete_row(&mut self, table: &str, row_key: &str, confirm: &dyn Confirm) -> Result<bool, ClientError> {
        let guard = self.busy.set_busy(Control::DeleteRow);
        let result = match guard {
            Ok(_guard) => self.delete_row_inner(table, row_key, confirm).await,
            Err(e) => Err(e),
        };
        let deleted = matches!(result, Ok(true));
        let result = self.report(result, deleted.then_some("Row deleted"));

        if deleted {
            self.browser.clear_detail();
            let _ = self.list_row_keys(table, None).await;
        }
        result
    }

    async fn delete_row_inner(&mut self, table: &str, row_key: &str, confirm: &dyn Confirm) -> Result<bool, ClientError> {
        let id = self.require_active()?;
        if !confirm.confirm(&format!("Delete row key \"{}\"?", row_key)) {
            return Ok(false);
        }
        self.api
            .delete_data(&id, table, row_key)
            .await
            .map_err(|e| ClientError::Delete(e.message_or("Delete failed")))?;
        Ok(true)
    }

    // ---- mutation forms ----

    /// Open the add-data dialog for the selected table.
    pub fn open_add_data_form(&mut self) -> Result<(), ClientError> {
        let Some(table) = self.browser.selected_table().map(str::to_string) else {
            return self.report(Err(ClientError::Validation(NO_TABLE.to_string())), None);
        };
        self.forms.add_data = Some(AddDataForm::new(table));
        Ok(())
    }

    pub fn close_add_data_form(&mut self) {
        self.forms.add_data = None;
    }

    /// Submit the open add-data dialog. On success it closes and the table's
    /// row keys are listed again; on failure it stays open.
    pub async fn submit_add_data(&mut self) -> Result<(), ClientError> {
        let guard = self.busy.set_busy(Control::AddData);
        let result = match guard {
            Ok(_guard) => self.submit_add_data_inner().await,
            Err(e) => Err(e),
        };
        let result = self.report(result, Some("Data added"));

        match result {
            Ok(table) => {
                let _ = self.list_row_keys(&table, None).await;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn submit_add_data_inner(&mut self) -> Result<String, ClientError> {
        let id = self.require_active()?;
        let form = self
            .forms
            .add_data
            .as_ref()
            .ok_or_else(|| ClientError::Validation("The add data form is not open".to_string()))?;
        let cell = form.validate()?;

        self.api
            .add_data(&id, &cell)
            .await
            .map_err(|e| ClientError::Mutation(e.message_or("Failed to add data")))?;

        self.forms.add_data = None;
        Ok(cell.table)
    }

    /// Open-fill-submit in one step, for callers without an interactive dialog.
    pub async fn add_row_data(&mut self, form: AddDataForm) -> Result<(), ClientError> {
        self.forms.add_data = Some(form);
        self.submit_add_data().await
    }

    /// Open the add-family dialog, preselecting the browsed table.
    pub fn open_add_family_form(&mut self) -> Result<(), ClientError> {
        if let Err(e) = self.require_active() {
            return self.report(Err(e), None);
        }
        self.forms.add_family = Some(AddFamilyForm::new(self.browser.selected_table()));
        Ok(())
    }

    pub fn close_add_family_form(&mut self) {
        self.forms.add_family = None;
    }

    pub async fn submit_add_family(&mut self) -> Result<(), ClientError> {
        let guard = self.busy.set_busy(Control::AddFamily);
        let result = match guard {
            Ok(_guard) => self.submit_add_family_inner().await,
            Err(e) => Err(e),
        };
        let result = self.report(result, Some("Column family added"));

        match result {
            Ok(table) => {
                if self.browser.selected_table() == Some(table.as_str()) {
                    let _ = self.list_row_keys(&table, None).await;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn submit_add_family_inner(&mut self) -> Result<String, ClientError> {
        let id = self.require_active()?;
        let form = self
            .forms
            .add_family
            .as_ref()
            .ok_or_else(|| ClientError::Validation("The add column family form is not open".to_string()))?;
        let (table, family_name) = form.validate()?;
        if !self.browser.has_table(&table) {
            return Err(ClientError::Validation(format!("Unknown table: {}", table)));
        }

        self.api
            .add_family(&id, &table, &family_name)
            .await
            .map_err(|e| ClientError::Mutation(e.message_or("Failed to add column family")))?;

        self.forms.add_family = None;
        Ok(table)
    }

    pub async fn add_column_family(&mut self, table: Option<&str>, family_name: &str) -> Result<(), ClientError> {
        let mut form = AddFamilyForm::new(table.or(self.browser.selected_table()));
        form.family_name = family_name.to_string();
        self.forms.add_family = Some(form);
        self.submit_add_family().await
    }

    /// Every failure ends here: logged and raised as a notice.
    fn report<T>(&mut self, result: Result<T, ClientError>, success: Option<&str>) -> Result<T, ClientError> {
        match &result {
            Ok(_) => {
                if let Some(message) = success {
                    self.notifier.success(message);
                }
            }
            Err(e) => {
                warn!(kind = e.kind(), "Operation failed: {}", e);
                self.notifier.error(e.to_string());
            }
        }
        result
    }
}
