use std::fmt;

use crate::models::DataSourceProfile;

/// What the main pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No data sources saved yet.
    Empty,
    /// Data sources exist but none is active.
    Idle,
    /// A data source is active and its tables are browsable.
    Browsing,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViewState::Empty => "empty",
            ViewState::Idle => "idle",
            ViewState::Browsing => "browsing",
        };
        f.write_str(label)
    }
}

/// Saved profiles plus the id of the one being browsed.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    profiles: Vec<DataSourceProfile>,
    active_id: Option<String>,
}

impl SessionState {
    pub fn new(profiles: Vec<DataSourceProfile>) -> Self {
        SessionState {
            profiles,
            active_id: None,
        }
    }

    pub fn profiles(&self) -> &[DataSourceProfile] {
        &self.profiles
    }

    pub fn profile(&self, id: &str) -> Option<&DataSourceProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    /// Look a profile up by id first, then by display name.
    pub fn find(&self, id_or_name: &str) -> Option<&DataSourceProfile> {
        self.profile(id_or_name)
            .or_else(|| self.profiles.iter().find(|profile| profile.name == id_or_name))
    }

    pub fn active(&self) -> Option<&DataSourceProfile> {
        self.active_id.as_deref().and_then(|id| self.profile(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_id.as_deref() == Some(id)
    }

    pub fn view(&self) -> ViewState {
        if self.profiles.is_empty() {
            ViewState::Empty
        } else if self.active().is_some() {
            ViewState::Browsing
        } else {
            ViewState::Idle
        }
    }

    pub(crate) fn push(&mut self, profile: DataSourceProfile) {
        self.profiles.push(profile);
    }

    /// Drop a profile; clears the active reference when it pointed at it.
    /// Returns whether the removed profile was the active one.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        self.profiles.retain(|profile| profile.id != id);
        if self.is_active(id) {
            self.active_id = None;
            return true;
        }
        false
    }

    pub(crate) fn set_active(&mut self, id: &str) {
        self.active_id = Some(id.to_string());
    }
}
