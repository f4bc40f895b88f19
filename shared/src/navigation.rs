//! Screen identifiers and the flat navigation machine.
//!
//! There is no transition table: any screen may request any other screen.
//! The only rule the machine enforces is the session gate, an anonymous
//! session always settles on `Login` or `Register`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::Role;

/// Fade-out before the screen swap.
pub const SWAP_DELAY_MS: u64 = 200;
/// Loading indicator stays up this long after the swap.
pub const LOADING_CLEAR_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    #[default]
    Login,
    Register,
    Dashboard,
    AdminDashboard,
    EmergencySelect,
    BodyMap,
    EmergencyForm,
    EmergencyDispatch,
    Settings,
    Profile,
    DatabaseConfig,
    SystemSettings,
    History,
    Contacts,
    Points,
    Analytics,
    UserManagement,
}

impl ViewId {
    pub const ALL: [Self; 17] = [
        Self::Login,
        Self::Register,
        Self::Dashboard,
        Self::AdminDashboard,
        Self::EmergencySelect,
        Self::BodyMap,
        Self::EmergencyForm,
        Self::EmergencyDispatch,
        Self::Settings,
        Self::Profile,
        Self::DatabaseConfig,
        Self::SystemSettings,
        Self::History,
        Self::Contacts,
        Self::Points,
        Self::Analytics,
        Self::UserManagement,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Dashboard => "dashboard",
            Self::AdminDashboard => "admin-dashboard",
            Self::EmergencySelect => "emergency-select",
            Self::BodyMap => "body-map",
            Self::EmergencyForm => "emergency-form",
            Self::EmergencyDispatch => "emergency-dispatch",
            Self::Settings => "settings",
            Self::Profile => "profile",
            Self::DatabaseConfig => "database-config",
            Self::SystemSettings => "system-settings",
            Self::History => "history",
            Self::Contacts => "contacts",
            Self::Points => "points",
            Self::Analytics => "analytics",
            Self::UserManagement => "user-management",
        }
    }

    #[must_use]
    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }

    /// The view a session actually lands on when it asks for `self`.
    #[must_use]
    pub const fn gate(self, authenticated: bool) -> Self {
        if !authenticated && self.requires_auth() {
            Self::Login
        } else {
            self
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view: {0}")]
pub struct UnknownView(pub String);

impl FromStr for ViewId {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    pub view: ViewId,
    pub highlight: bool,
}

impl MenuItem {
    fn new(label: &str, view: ViewId) -> Self {
        Self {
            label: label.to_string(),
            view,
            highlight: false,
        }
    }

    fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }
}

/// Sidebar entries. This is the only place roles restrict reachability.
#[must_use]
pub fn menu_for(role: Role) -> Vec<MenuItem> {
    match role {
        Role::Admin => vec![
            MenuItem::new("Dashboard", ViewId::AdminDashboard),
            MenuItem::new("Analytics", ViewId::Analytics),
            MenuItem::new("Users", ViewId::UserManagement),
            MenuItem::new("Database", ViewId::DatabaseConfig),
            MenuItem::new("Settings", ViewId::SystemSettings),
            MenuItem::new("Profile", ViewId::Profile),
        ],
        Role::User | Role::Doctor => vec![
            MenuItem::new("Dashboard", ViewId::Dashboard),
            MenuItem::new("Emergency", ViewId::EmergencySelect).highlighted(),
            MenuItem::new("History", ViewId::History),
            MenuItem::new("Contacts", ViewId::Contacts),
            MenuItem::new("Points", ViewId::Points),
            MenuItem::new("Profile", ViewId::Profile),
            MenuItem::new("Settings", ViewId::Settings),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn view_ids_round_trip_through_their_names() {
        for view in ViewId::ALL {
            assert_eq!(view.as_str().parse::<ViewId>(), Ok(view));
            assert_eq!(
                serde_json::to_string(&view).unwrap(),
                format!("\"{}\"", view.as_str())
            );
        }
        assert!("nowhere".parse::<ViewId>().is_err());
    }

    #[test]
    fn only_login_and_register_are_public() {
        let public: Vec<_> = ViewId::ALL
            .iter()
            .copied()
            .filter(|v| !v.requires_auth())
            .collect();
        assert_eq!(public, vec![ViewId::Login, ViewId::Register]);
    }

    #[test]
    fn admin_menu_has_no_emergency_entry() {
        let menu = menu_for(Role::Admin);
        assert_eq!(menu[0].view, ViewId::AdminDashboard);
        assert!(menu.iter().all(|item| item.view != ViewId::EmergencySelect));
        assert!(menu.iter().all(|item| !item.highlight));
    }

    #[test]
    fn user_menu_highlights_emergency() {
        for role in [Role::User, Role::Doctor] {
            let menu = menu_for(role);
            let highlighted: Vec<_> = menu.iter().filter(|item| item.highlight).collect();
            assert_eq!(highlighted.len(), 1);
            assert_eq!(highlighted[0].view, ViewId::EmergencySelect);
        }
    }

    fn any_view() -> impl Strategy<Value = ViewId> {
        prop::sample::select(ViewId::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn anonymous_gate_only_settles_on_public_views(view in any_view()) {
            let settled = view.gate(false);
            prop_assert!(matches!(settled, ViewId::Login | ViewId::Register));
        }

        #[test]
        fn authenticated_gate_is_identity(view in any_view()) {
            prop_assert_eq!(view.gate(true), view);
        }
    }
}
