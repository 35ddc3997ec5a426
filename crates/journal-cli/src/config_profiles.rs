//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use journal_core::config::{normalize_base_url, ClientConfig, API_BASE_URL_ENV};
use journal_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";
pub const PROFILE_ENV: &str = "JOURNAL_PROFILE";
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    #[serde(default)]
    pub api_base_url: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("journal").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Explicit name, then `JOURNAL_PROFILE`, then the active profile, then `default`.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        self.resolve_profile_name_with_env(explicit, std::env::var(PROFILE_ENV).ok().as_deref())
    }

    fn resolve_profile_name_with_env(&self, explicit: Option<&str>, env: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(env))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    /// Client settings for `profile_name`: the `--api-url` flag, then
    /// `JOURNAL_API_URL`, then the profile's base URL, then the default.
    pub fn client_config(
        &self,
        profile_name: &str,
        flag: Option<String>,
    ) -> journal_core::Result<ClientConfig> {
        ClientConfig::resolve(&[
            flag,
            std::env::var(API_BASE_URL_ENV).ok(),
            self.profile(profile_name)
                .and_then(|profile| profile.api_base_url.clone()),
        ])
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.normalize();
        }
    }
}

impl CliProfile {
    /// Store a validated base URL.
    pub fn set_api_base_url(&mut self, raw: &str) -> journal_core::Result<()> {
        self.api_base_url = Some(normalize_base_url(raw)?);
        Ok(())
    }

    fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_profile_name_rejects_empty() {
        assert_eq!(normalize_profile_name(None), None);
        assert_eq!(normalize_profile_name(Some(" ")), None);
        assert_eq!(normalize_profile_name(Some(" work ")).as_deref(), Some("work"));
    }

    #[test]
    fn config_roundtrip_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CliProfilesConfig {
            version: 1,
            active_profile: Some(" default ".to_string()),
            profiles: BTreeMap::new(),
        };
        config.profiles.insert(
            "default".to_string(),
            CliProfile {
                api_base_url: Some(" https://diary.example.com/api ".to_string()),
            },
        );
        config
            .profiles
            .insert("empty".to_string(), CliProfile { api_base_url: Some("  ".to_string()) });

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();

        assert_eq!(loaded.active_profile.as_deref(), Some("default"));
        assert_eq!(
            loaded.profile("default").unwrap().api_base_url.as_deref(),
            Some("https://diary.example.com/api")
        );
        assert_eq!(loaded.profile("empty").unwrap().api_base_url, None);
    }

    #[test]
    fn missing_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliProfilesConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, CliProfilesConfig::default());
    }

    #[test]
    fn resolve_profile_name_prefers_explicit_then_env_then_active() {
        let config = CliProfilesConfig {
            version: 1,
            active_profile: Some("work".to_string()),
            profiles: BTreeMap::new(),
        };
        assert_eq!(
            config.resolve_profile_name_with_env(Some("mobile"), Some("env")),
            "mobile"
        );
        assert_eq!(config.resolve_profile_name_with_env(None, Some("env")), "env");
        assert_eq!(config.resolve_profile_name_with_env(None, None), "work");
        assert_eq!(
            CliProfilesConfig::default().resolve_profile_name_with_env(None, Some(" ")),
            DEFAULT_PROFILE
        );
    }

    #[test]
    fn client_config_prefers_flag_over_profile() {
        let mut config = CliProfilesConfig::default();
        config
            .profile_mut_or_default("work")
            .set_api_base_url("https://work.example.com/api/")
            .unwrap();

        let resolved = config
            .client_config("work", Some("https://flag.example.com/api".to_string()))
            .unwrap();
        assert_eq!(resolved.api_base_url, "https://flag.example.com/api");
    }

    #[test]
    fn set_api_base_url_rejects_missing_scheme() {
        let mut profile = CliProfile::default();
        assert!(profile.set_api_base_url("diary.example.com").is_err());
        assert_eq!(profile.api_base_url, None);
    }
}
