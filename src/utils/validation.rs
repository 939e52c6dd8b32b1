use crate::error::ClientError;
use crate::models::ConfigFile;

/// Trim `value` and reject it when nothing is left.
pub fn require_non_empty(value: &str, message: &str) -> Result<String, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Both cluster configuration files must be chosen before anything is uploaded.
pub fn require_config_files<'a>(
    core_site: Option<&'a ConfigFile>,
    hbase_site: Option<&'a ConfigFile>,
    message: &str,
) -> Result<(&'a ConfigFile, &'a ConfigFile), ClientError> {
    match (core_site, hbase_site) {
        (Some(core), Some(hbase)) => Ok((core, hbase)),
        _ => Err(ClientError::Validation(message.to_string())),
    }
}
