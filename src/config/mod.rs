// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "liner";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub site_name: String,
    pub database_file: Option<PathBuf>,
    pub start_location: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            site_name: "Liner".to_string(),
            database_file: None,
            start_location: "/".to_string(),
        }
    }
}

impl AppConfig {
    /// Where the records database lives: the configured file, or one next to
    /// the configuration file.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database_file.clone().or_else(|| {
            confy::get_configuration_file_path(CONFIG_NAME, None)
                .ok()
                .and_then(|path| path.parent().map(|dir| dir.join("liner.db")))
        })
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_else(|e| {
        log::warn!("Failed to load configuration, using defaults: {e}");
        AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"site_name": "Harbour"}"#).unwrap();

        assert_eq!(cfg.site_name, "Harbour");
        assert_eq!(cfg.start_location, "/");
        assert_eq!(cfg.database_file, None);
    }

    #[test]
    fn configured_database_file_wins() {
        let cfg = AppConfig {
            database_file: Some(PathBuf::from("/tmp/liner-test.db")),
            ..AppConfig::default()
        };

        assert_eq!(cfg.database_path(), Some(PathBuf::from("/tmp/liner-test.db")));
    }
}
