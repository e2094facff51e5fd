//! System settings.
//!
//! The backend stores settings as rows of `{setting_key, setting_value}`;
//! the client flattens them into a map. Updates go back as a flat
//! key-value object (the shapes are asymmetric on the wire, but that is
//! what the backend expects).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Known setting keys. The backend may carry more; unknown keys are kept
/// and round-tripped untouched.
pub const COMPANY_NAME: &str = "company_name";
pub const TICKET_PREFIX: &str = "ticket_prefix";
pub const MAX_FILE_SIZE: &str = "max_file_size";
pub const ALLOWED_FILE_TYPES: &str = "allowed_file_types";

pub const KNOWN_KEYS: [&str; 4] = [COMPANY_NAME, TICKET_PREFIX, MAX_FILE_SIZE, ALLOWED_FILE_TYPES];

/// One settings row as returned by `GET /settings`.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingRow {
    pub setting_key: String,
    pub setting_value: String,
}

/// The flattened settings map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Settings(pub BTreeMap<String, String>);

impl Settings {
    pub fn from_rows(rows: Vec<SettingRow>) -> Self {
        Settings(
            rows.into_iter()
                .map(|row| (row.setting_key, row.setting_value))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Maximum upload size in bytes, when configured and numeric.
    pub fn max_file_size(&self) -> Option<u64> {
        self.get(MAX_FILE_SIZE)?.parse().ok()
    }

    /// Allowed upload extensions, lowercased, from the comma-separated
    /// `allowed_file_types` value.
    pub fn allowed_file_types(&self) -> Vec<String> {
        self.get(ALLOWED_FILE_TYPES)
            .map(|raw| {
                raw.split(',')
                    .map(|ext| ext.trim().to_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<SettingRow> {
        vec![
            SettingRow {
                setting_key: COMPANY_NAME.to_string(),
                setting_value: "Acme Facilities".to_string(),
            },
            SettingRow {
                setting_key: MAX_FILE_SIZE.to_string(),
                setting_value: "5242880".to_string(),
            },
            SettingRow {
                setting_key: ALLOWED_FILE_TYPES.to_string(),
                setting_value: "jpg, PNG,pdf,".to_string(),
            },
        ]
    }

    #[test]
    fn test_from_rows_flattens() {
        let settings = Settings::from_rows(rows());
        assert_eq!(settings.get(COMPANY_NAME), Some("Acme Facilities"));
        assert_eq!(settings.get(TICKET_PREFIX), None);
    }

    #[test]
    fn test_max_file_size_parses() {
        let settings = Settings::from_rows(rows());
        assert_eq!(settings.max_file_size(), Some(5_242_880));

        let mut settings = settings;
        settings.set(MAX_FILE_SIZE, "lots");
        assert_eq!(settings.max_file_size(), None);
    }

    #[test]
    fn test_allowed_file_types_normalizes() {
        let settings = Settings::from_rows(rows());
        assert_eq!(settings.allowed_file_types(), vec!["jpg", "png", "pdf"]);
        assert!(Settings::default().allowed_file_types().is_empty());
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let settings = Settings::from_rows(rows());
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["company_name"], "Acme Facilities");
    }
}
