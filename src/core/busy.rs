use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::ClientError;

/// A control whose operation can be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    SaveDataSource,
    TestConnection,
    SelectDataSource,
    Reconnect,
    DeleteDataSource,
    ListRowKeys,
    LoadRow,
    DeleteRow,
    AddData,
    AddFamily,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Control::SaveDataSource => "save data source",
            Control::TestConnection => "test connection",
            Control::SelectDataSource => "select data source",
            Control::Reconnect => "reconnect",
            Control::DeleteDataSource => "delete data source",
            Control::ListRowKeys => "list row keys",
            Control::LoadRow => "load row",
            Control::DeleteRow => "delete row",
            Control::AddData => "add data",
            Control::AddFamily => "add column family",
        };
        f.write_str(name)
    }
}

/// Set of controls with an operation in flight. Cloning shares the set.
#[derive(Debug, Clone, Default)]
pub struct BusyControls {
    inner: Arc<Mutex<HashSet<Control>>>,
}

impl BusyControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `control` busy until the returned guard is dropped.
    pub fn set_busy(&self, control: Control) -> Result<BusyGuard, ClientError> {
        let mut busy = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !busy.insert(control) {
            return Err(ClientError::Busy(control.to_string()));
        }
        Ok(BusyGuard {
            control,
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn is_busy(&self, control: Control) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&control)
    }
}

/// Releases its control on drop, whichever way the operation ended.
#[derive(Debug)]
pub struct BusyGuard {
    control: Control,
    inner: Arc<Mutex<HashSet<Control>>>,
}

impl BusyGuard {
    pub fn control(&self) -> Control {
        self.control
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut busy = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        busy.remove(&self.control);
    }
}
