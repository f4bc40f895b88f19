//! Process-wide application configuration.
//!
//! Every edit replaces exactly one leaf. Numeric fields arrive as the raw text
//! the user typed; anything that does not parse, or parses out of range, is
//! rejected and the previous value stays in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use crate::model::Role;

pub const DEFAULT_EMERGENCY_TIMEOUT_SECS: u32 = 5;
pub const MIN_EMERGENCY_TIMEOUT_SECS: u32 = 1;
pub const MAX_EMERGENCY_TIMEOUT_SECS: u32 = 300;
pub const MAX_POINT_AWARD: u32 = 10_000;
pub const MAX_LABEL_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub theme: String,
    pub emergency_timeout_seconds: u32,
    pub offline_mode: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "Fast Aide".into(),
            version: "1.0.0".into(),
            theme: "silver".into(),
            emergency_timeout_seconds: DEFAULT_EMERGENCY_TIMEOUT_SECS,
            offline_mode: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmergencyToggle {
    AutoLocationSharing,
    AutoContactNotification,
    VideoCallEnabled,
    SatelliteBackup,
}

impl EmergencyToggle {
    pub const ALL: [Self; 4] = [
        Self::AutoLocationSharing,
        Self::AutoContactNotification,
        Self::VideoCallEnabled,
        Self::SatelliteBackup,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AutoLocationSharing => "autoLocationSharing",
            Self::AutoContactNotification => "autoContactNotification",
            Self::VideoCallEnabled => "videoCallEnabled",
            Self::SatelliteBackup => "satelliteBackup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyToggles {
    pub auto_location_sharing: bool,
    pub auto_contact_notification: bool,
    pub video_call_enabled: bool,
    pub satellite_backup: bool,
}

impl Default for EmergencyToggles {
    fn default() -> Self {
        Self {
            auto_location_sharing: true,
            auto_contact_notification: true,
            video_call_enabled: true,
            satellite_backup: true,
        }
    }
}

impl EmergencyToggles {
    #[must_use]
    pub const fn get(&self, toggle: EmergencyToggle) -> bool {
        match toggle {
            EmergencyToggle::AutoLocationSharing => self.auto_location_sharing,
            EmergencyToggle::AutoContactNotification => self.auto_contact_notification,
            EmergencyToggle::VideoCallEnabled => self.video_call_enabled,
            EmergencyToggle::SatelliteBackup => self.satellite_backup,
        }
    }

    pub fn set(&mut self, toggle: EmergencyToggle, enabled: bool) {
        let slot = match toggle {
            EmergencyToggle::AutoLocationSharing => &mut self.auto_location_sharing,
            EmergencyToggle::AutoContactNotification => &mut self.auto_contact_notification,
            EmergencyToggle::VideoCallEnabled => &mut self.video_call_enabled,
            EmergencyToggle::SatelliteBackup => &mut self.satellite_backup,
        };
        *slot = enabled;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Integration {
    #[serde(rename = "hospitalAPI")]
    Hospital,
    #[serde(rename = "policeAPI")]
    Police,
    #[serde(rename = "ambulanceAPI")]
    Ambulance,
    #[serde(rename = "mapsAPI")]
    Maps,
    #[serde(rename = "telecomAPI")]
    Telecom,
}

impl Integration {
    pub const ALL: [Self; 5] = [
        Self::Hospital,
        Self::Police,
        Self::Ambulance,
        Self::Maps,
        Self::Telecom,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hospital => "hospitalAPI",
            Self::Police => "policeAPI",
            Self::Ambulance => "ambulanceAPI",
            Self::Maps => "mapsAPI",
            Self::Telecom => "telecomAPI",
        }
    }

    const fn default_endpoint(self) -> &'static str {
        match self {
            Self::Hospital => "https://api.hospital.example.com",
            Self::Police => "https://api.police.example.com",
            Self::Ambulance => "https://api.ambulance.example.com",
            Self::Maps => "https://api.maps.example.com",
            Self::Telecom => "https://api.telecom.example.com",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointAward {
    QuickResponse,
    SuccessfulHelp,
    GoodDeed,
    AccurateReport,
}

impl PointAward {
    pub const ALL: [Self; 4] = [
        Self::QuickResponse,
        Self::SuccessfulHelp,
        Self::GoodDeed,
        Self::AccurateReport,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::QuickResponse => "quickResponse",
            Self::SuccessfulHelp => "successfulHelp",
            Self::GoodDeed => "goodDeed",
            Self::AccurateReport => "accurateReport",
        }
    }

    const fn default_value(self) -> u32 {
        match self {
            Self::QuickResponse => 50,
            Self::SuccessfulHelp => 100,
            Self::GoodDeed => 75,
            Self::AccurateReport => 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub emergency: EmergencyToggles,
    pub integrations: BTreeMap<Integration, String>,
    pub points: BTreeMap<PointAward, u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            emergency: EmergencyToggles::default(),
            integrations: Integration::ALL
                .iter()
                .map(|i| (*i, i.default_endpoint().to_string()))
                .collect(),
            points: PointAward::ALL
                .iter()
                .map(|p| (*p, p.default_value()))
                .collect(),
        }
    }
}

/// A single-leaf edit, as submitted by a settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigEdit {
    AppName(String),
    AppVersion(String),
    Theme(String),
    /// Raw text from a numeric field.
    EmergencyTimeout(String),
    OfflineMode(bool),
    EmergencyToggle {
        toggle: EmergencyToggle,
        enabled: bool,
    },
    IntegrationEndpoint {
        integration: Integration,
        url: String,
    },
    /// Raw text from a numeric field.
    PointAward {
        award: PointAward,
        value: String,
    },
}

/// Key under which field-level validation errors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigField {
    AppName,
    AppVersion,
    Theme,
    EmergencyTimeout,
    OfflineMode,
    Toggle(EmergencyToggle),
    Integration(Integration),
    Points(PointAward),
}

impl ConfigField {
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::AppName => "app.name".into(),
            Self::AppVersion => "app.version".into(),
            Self::Theme => "app.theme".into(),
            Self::EmergencyTimeout => "app.emergencyTimeoutSeconds".into(),
            Self::OfflineMode => "app.offlineMode".into(),
            Self::Toggle(toggle) => format!("emergency.{}", toggle.key()),
            Self::Integration(integration) => format!("integrations.{}", integration.key()),
            Self::Points(award) => format!("points.{}", award.key()),
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl ConfigEdit {
    #[must_use]
    pub const fn field(&self) -> ConfigField {
        match self {
            Self::AppName(_) => ConfigField::AppName,
            Self::AppVersion(_) => ConfigField::AppVersion,
            Self::Theme(_) => ConfigField::Theme,
            Self::EmergencyTimeout(_) => ConfigField::EmergencyTimeout,
            Self::OfflineMode(_) => ConfigField::OfflineMode,
            Self::EmergencyToggle { toggle, .. } => ConfigField::Toggle(*toggle),
            Self::IntegrationEndpoint { integration, .. } => ConfigField::Integration(*integration),
            Self::PointAward { award, .. } => ConfigField::Points(*award),
        }
    }

    /// Emergency toggles live on the user settings screen; everything else
    /// belongs to the admin screens.
    #[must_use]
    pub const fn permits(&self, role: Role) -> bool {
        match self {
            Self::EmergencyToggle { .. } => true,
            _ => matches!(role, Role::Admin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: expected a whole number, got {input:?}")]
    NotANumber { field: ConfigField, input: String },
    #[error("{field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: ConfigField,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("{field} cannot be empty")]
    Empty { field: ConfigField },
    #[error("{field} is longer than {max} characters")]
    TooLong { field: ConfigField, max: usize },
    #[error("{field}: invalid endpoint {input:?}: {reason}")]
    InvalidEndpoint {
        field: ConfigField,
        input: String,
        reason: String,
    },
    #[error("role {role:?} may not edit {field}")]
    Forbidden { field: ConfigField, role: Role },
}

impl ConfigError {
    #[must_use]
    pub const fn field(&self) -> ConfigField {
        match self {
            Self::NotANumber { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::InvalidEndpoint { field, .. }
            | Self::Forbidden { field, .. } => *field,
        }
    }
}

fn parse_bounded(field: ConfigField, raw: &str, min: u32, max: u32) -> Result<u32, ConfigError> {
    let value: u32 = raw.trim().parse().map_err(|_| ConfigError::NotANumber {
        field,
        input: raw.to_string(),
    })?;
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn label(field: ConfigField, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { field });
    }
    if trimmed.chars().count() > MAX_LABEL_LENGTH {
        return Err(ConfigError::TooLong {
            field,
            max: MAX_LABEL_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

fn endpoint(field: ConfigField, raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        field,
        input: raw.to_string(),
        reason,
    };
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    // Stored as typed; `Url`'s normal form would add a trailing slash.
    Ok(trimmed.to_string())
}

impl AppConfig {
    /// Apply one edit. On error nothing changes.
    pub fn apply(&mut self, edit: &ConfigEdit) -> Result<(), ConfigError> {
        let field = edit.field();
        match edit {
            ConfigEdit::AppName(raw) => self.app.name = label(field, raw)?,
            ConfigEdit::AppVersion(raw) => self.app.version = label(field, raw)?,
            ConfigEdit::Theme(raw) => self.app.theme = label(field, raw)?,
            ConfigEdit::EmergencyTimeout(raw) => {
                self.app.emergency_timeout_seconds = parse_bounded(
                    field,
                    raw,
                    MIN_EMERGENCY_TIMEOUT_SECS,
                    MAX_EMERGENCY_TIMEOUT_SECS,
                )?;
            }
            ConfigEdit::OfflineMode(enabled) => self.app.offline_mode = *enabled,
            ConfigEdit::EmergencyToggle { toggle, enabled } => {
                self.emergency.set(*toggle, *enabled);
            }
            ConfigEdit::IntegrationEndpoint { integration, url } => {
                let url = endpoint(field, url)?;
                self.integrations.insert(*integration, url);
            }
            ConfigEdit::PointAward { award, value } => {
                let value = parse_bounded(field, value, 0, MAX_POINT_AWARD)?;
                self.points.insert(*award, value);
            }
        }
        Ok(())
    }

    /// Checks a config that came from outside (storage) before it replaces
    /// the live one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeout = self.app.emergency_timeout_seconds;
        if !(MIN_EMERGENCY_TIMEOUT_SECS..=MAX_EMERGENCY_TIMEOUT_SECS).contains(&timeout) {
            return Err(ConfigError::OutOfRange {
                field: ConfigField::EmergencyTimeout,
                value: timeout,
                min: MIN_EMERGENCY_TIMEOUT_SECS,
                max: MAX_EMERGENCY_TIMEOUT_SECS,
            });
        }
        label(ConfigField::AppName, &self.app.name)?;
        label(ConfigField::AppVersion, &self.app.version)?;
        label(ConfigField::Theme, &self.app.theme)?;
        for (integration, url) in &self.integrations {
            endpoint(ConfigField::Integration(*integration), url)?;
        }
        for (award, value) in &self.points {
            if *value > MAX_POINT_AWARD {
                return Err(ConfigError::OutOfRange {
                    field: ConfigField::Points(*award),
                    value: *value,
                    min: 0,
                    max: MAX_POINT_AWARD,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn endpoint(&self, integration: Integration) -> Option<&str> {
        self.integrations.get(&integration).map(String::as_str)
    }

    #[must_use]
    pub fn award(&self, award: PointAward) -> u32 {
        self.points.get(&award).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_match_shipped_values() {
        let config = AppConfig::default();
        assert_eq!(config.app.name, "Fast Aide");
        assert_eq!(config.app.emergency_timeout_seconds, 5);
        assert!(config.app.offline_mode);
        assert!(EmergencyToggle::ALL.iter().all(|t| config.emergency.get(*t)));
        assert_eq!(
            config.endpoint(Integration::Police),
            Some("https://api.police.example.com")
        );
        assert_eq!(config.award(PointAward::SuccessfulHelp), 100);
        assert_eq!(config.award(PointAward::AccurateReport), 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serialized_keys_follow_the_settings_schema() {
        let json = serde_json::to_value(AppConfig::default()).unwrap();
        assert_eq!(json["app"]["emergencyTimeoutSeconds"], 5);
        assert_eq!(json["emergency"]["videoCallEnabled"], true);
        assert_eq!(
            json["integrations"]["telecomAPI"],
            "https://api.telecom.example.com"
        );
        assert_eq!(json["points"]["goodDeed"], 75);

        let back: AppConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, AppConfig::default());
    }

    #[test]
    fn endpoint_is_stored_as_typed() {
        let mut config = AppConfig::default();
        config
            .apply(&ConfigEdit::IntegrationEndpoint {
                integration: Integration::Police,
                url: "https://api.police.example.com".into(),
            })
            .unwrap();
        assert_eq!(config, AppConfig::default());

        config
            .apply(&ConfigEdit::IntegrationEndpoint {
                integration: Integration::Maps,
                url: "  http://maps.local:8080  ".into(),
            })
            .unwrap();
        assert_eq!(config.endpoint(Integration::Maps), Some("http://maps.local:8080"));
    }

    #[test]
    fn non_numeric_timeout_keeps_previous_value() {
        let mut config = AppConfig::default();
        let err = config
            .apply(&ConfigEdit::EmergencyTimeout("soon".into()))
            .unwrap_err();
        assert_eq!(err.field(), ConfigField::EmergencyTimeout);
        assert!(matches!(err, ConfigError::NotANumber { .. }));
        assert_eq!(config.app.emergency_timeout_seconds, 5);
    }

    #[test]
    fn zero_timeout_is_out_of_range() {
        let mut config = AppConfig::default();
        let err = config
            .apply(&ConfigEdit::EmergencyTimeout("0".into()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { value: 0, .. }));
    }

    #[test]
    fn numeric_edits_trim_input() {
        let mut config = AppConfig::default();
        config
            .apply(&ConfigEdit::EmergencyTimeout(" 10 ".into()))
            .unwrap();
        config
            .apply(&ConfigEdit::PointAward {
                award: PointAward::GoodDeed,
                value: "80".into(),
            })
            .unwrap();
        assert_eq!(config.app.emergency_timeout_seconds, 10);
        assert_eq!(config.award(PointAward::GoodDeed), 80);
    }

    #[test]
    fn endpoints_must_be_http() {
        let mut config = AppConfig::default();
        let edit = |url: &str| ConfigEdit::IntegrationEndpoint {
            integration: Integration::Maps,
            url: url.into(),
        };
        assert!(config.apply(&edit("ftp://maps.example.com")).is_err());
        assert!(config.apply(&edit("not a url")).is_err());
        assert_eq!(config.endpoint(Integration::Maps), Some("https://api.maps.example.com"));

        config.apply(&edit("https://maps.internal.example.org/v2")).unwrap();
        assert_eq!(
            config.endpoint(Integration::Maps),
            Some("https://maps.internal.example.org/v2")
        );
    }

    #[test]
    fn toggles_are_open_to_every_role() {
        let toggle = ConfigEdit::EmergencyToggle {
            toggle: EmergencyToggle::SatelliteBackup,
            enabled: false,
        };
        let rename = ConfigEdit::AppName("Rapid Aide".into());
        for role in [Role::User, Role::Doctor, Role::Admin] {
            assert!(toggle.permits(role));
        }
        assert!(rename.permits(Role::Admin));
        assert!(!rename.permits(Role::Doctor));
        assert!(!rename.permits(Role::User));
    }

    #[test]
    fn field_paths() {
        assert_eq!(
            ConfigField::Points(PointAward::QuickResponse).path(),
            "points.quickResponse"
        );
        assert_eq!(
            ConfigField::Toggle(EmergencyToggle::AutoContactNotification).to_string(),
            "emergency.autoContactNotification"
        );
    }

    #[test]
    fn validate_rejects_stored_garbage() {
        let mut config = AppConfig::default();
        config.app.emergency_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config
            .integrations
            .insert(Integration::Hospital, "javascript:alert(1)".into());
        assert!(config.validate().is_err());
    }

    proptest! {
        #[test]
        fn failed_edits_leave_config_untouched(raw in "\\PC{0,12}") {
            let mut config = AppConfig::default();
            let before = config.clone();
            let result = config.apply(&ConfigEdit::PointAward {
                award: PointAward::QuickResponse,
                value: raw,
            });
            if result.is_err() {
                prop_assert_eq!(config, before);
            }
        }
    }
}
