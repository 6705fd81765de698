use serde::{Deserialize, Serialize};

use crate::device::constants::DEFAULT_NAME_FILTER;
use crate::device::permissions::required_permissions;
use crate::scanner::controller::ScannerSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Only peripherals whose name contains this (case-insensitive) are listed.
    pub name_filter: String,
    /// Report every advertisement instead of the first one per peripheral.
    pub allow_duplicates: bool,
    pub auto_connect: bool,
}

impl Config {
    pub fn scanner_settings(&self) -> ScannerSettings {
        ScannerSettings {
            name_filter: self.name_filter.clone(),
            allow_duplicates: self.allow_duplicates,
            auto_connect: self.auto_connect,
            // desktop platforms have no runtime bluetooth permissions
            required_permissions: required_permissions(None),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name_filter: String::from(DEFAULT_NAME_FILTER),
            allow_duplicates: false,
            auto_connect: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{ "nameFilter": "watch" }"#).unwrap();

        assert_eq!(config, Config {
            name_filter: String::from("watch"),
            ..Config::default()
        });
    }

    #[test]
    fn default_filters_on_nimble() {
        let settings = Config::default().scanner_settings();

        assert_eq!(settings.name_filter, "nimble");
        assert!(!settings.allow_duplicates);
        assert!(!settings.auto_connect);
        assert!(settings.required_permissions.is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Config::default()).unwrap();

        assert_eq!(json, serde_json::json!({
            "nameFilter": "nimble",
            "allowDuplicates": false,
            "autoConnect": false,
        }));
    }
}
