use crate::error::ClientError;
use crate::models::CellWrite;
use crate::utils::require_non_empty;

/// Open "add data" dialog. The table is fixed when the dialog opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddDataForm {
    pub table: String,
    pub row_key: String,
    pub column_family: String,
    pub column: String,
    pub value: String,
}

impl AddDataForm {
    pub fn new(table: impl Into<String>) -> Self {
        AddDataForm {
            table: table.into(),
            ..AddDataForm::default()
        }
    }

    /// Trimmed cell write, or the validation message shown to the user.
    pub fn validate(&self) -> Result<CellWrite, ClientError> {
        const MISSING: &str = "Please fill in all required fields";
        Ok(CellWrite {
            table: require_non_empty(&self.table, "Please select a table first")?,
            row_key: require_non_empty(&self.row_key, MISSING)?,
            column_family: require_non_empty(&self.column_family, MISSING)?,
            column: require_non_empty(&self.column, MISSING)?,
            value: require_non_empty(&self.value, MISSING)?,
        })
    }
}

/// Open "add column family" dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddFamilyForm {
    pub table: Option<String>,
    pub family_name: String,
}

impl AddFamilyForm {
    /// Defaults the table to the one currently browsed, if any.
    pub fn new(current_table: Option<&str>) -> Self {
        AddFamilyForm {
            table: current_table.map(str::to_string),
            family_name: String::new(),
        }
    }

    /// `(table, family name)` ready to submit.
    pub fn validate(&self) -> Result<(String, String), ClientError> {
        let table = require_non_empty(self.table.as_deref().unwrap_or_default(), "Please select a table")?;
        let family_name = require_non_empty(&self.family_name, "Please enter a column family name")?;
        Ok((table, family_name))
    }
}

/// Dialogs currently open. Each closes on a successful submit.
#[derive(Debug, Clone, Default)]
pub struct Forms {
    pub add_data: Option<AddDataForm>,
    pub add_family: Option<AddFamilyForm>,
}

impl Forms {
    pub fn close_all(&mut self) {
        self.add_data = None;
        self.add_family = None;
    }
}
