//! What the shell renders. Everything here is derived from `Model` and carries
//! no state of its own.

use serde::{Deserialize, Serialize};

use crate::catalog::{BodyPart, BodyRegion, EmergencyType, Severity, Symptom, BODY_PARTS};
use crate::config::{
    AppSettings, ConfigField, EmergencyToggle, Integration, PointAward,
};
use crate::dispatch::ConnectedService;
use crate::event::AttachmentId;
use crate::model::{Attachment, Model, Role, User};
use crate::navigation::{menu_for, MenuItem, ViewId};
use crate::{AppError, ErrorSeverity, ToastKind, ToastMessage};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub points: u32,
    pub emergencies_handled: u32,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            points: user.points,
            emergencies_handled: user.emergencies_handled,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatTile {
    pub label: String,
    pub value: String,
}

impl StatTile {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyTypeView {
    pub kind: EmergencyType,
    pub name: String,
    pub description: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BodyPartView {
    pub part: BodyPart,
    pub name: String,
    pub region: BodyRegion,
    pub x: u8,
    pub y: u8,
    pub size: u8,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomView {
    pub symptom: Symptom,
    pub name: String,
    pub severity: Severity,
    pub selected: bool,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachmentView {
    pub id: AttachmentId,
    pub name: String,
    #[serde(with = "serde_bytes")]
    pub preview_png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for AttachmentView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentView")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("preview_bytes", &self.preview_png.len())
            .finish()
    }
}

impl From<&Attachment> for AttachmentView {
    fn from(a: &Attachment) -> Self {
        Self {
            id: a.id,
            name: a.display_name.clone(),
            preview_png: a.preview.png.clone(),
            width: a.preview.width,
            height: a.preview.height,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToggleView {
    pub toggle: EmergencyToggle,
    pub key: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntegrationView {
    pub integration: Integration,
    pub key: String,
    pub url: String,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointAwardView {
    pub award: PointAward,
    pub key: String,
    pub value: u32,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Always present so the shell can show the countdown banner on any screen.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyStatus {
    pub active: bool,
    pub countdown: u32,
    pub kind: Option<EmergencyType>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Screen {
    Login,
    Register,
    Dashboard {
        greeting: String,
        stats: Vec<StatTile>,
    },
    AdminDashboard {
        stats: Vec<StatTile>,
    },
    EmergencySelect {
        types: Vec<EmergencyTypeView>,
    },
    BodyMap {
        parts: Vec<BodyPartView>,
        symptoms: Vec<SymptomView>,
        description: String,
        attachments: Vec<AttachmentView>,
        pending_uploads: usize,
        can_activate: bool,
    },
    EmergencyForm {
        kind: Option<EmergencyType>,
        description: String,
        attachments: Vec<AttachmentView>,
        pending_uploads: usize,
    },
    EmergencyDispatch {
        services: Vec<ConnectedService>,
        expected_services: usize,
        /// Evidence shared with responders.
        attachments: Vec<AttachmentView>,
        quick_response_points: u32,
        location_shared: bool,
    },
    Settings {
        toggles: Vec<ToggleView>,
    },
    Profile {
        user: Option<UserView>,
    },
    DatabaseConfig {
        integrations: Vec<IntegrationView>,
    },
    SystemSettings {
        app: AppSettings,
        points: Vec<PointAwardView>,
        errors: Vec<FieldError>,
    },
    /// Reachable from the menu but with nothing to show yet.
    Placeholder {
        view: ViewId,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub current_view: ViewId,
    pub screen: Screen,
    pub transitioning: bool,
    pub sidebar_open: bool,
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user: Option<UserView>,
    pub menu: Vec<MenuItem>,
    pub emergency: EmergencyStatus,
    pub error: Option<UserFacingError>,
    pub toast: Option<ToastView>,
}

impl ViewModel {
    #[must_use]
    pub fn project(model: &Model) -> Self {
        let authenticated = model.is_authenticated();
        let current_view = model.navigation.current_view.gate(authenticated);
        let user = model.session.user().map(UserView::from);

        Self {
            current_view,
            screen: screen_for(current_view, model),
            transitioning: model.navigation.transitioning,
            sidebar_open: model.navigation.sidebar_open,
            is_loading: model.is_loading,
            is_authenticated: authenticated,
            menu: model.session.role().map(menu_for).unwrap_or_default(),
            user,
            emergency: EmergencyStatus {
                active: model.draft.active,
                countdown: model.draft.countdown,
                kind: model.draft.kind,
            },
            error: model.active_error.as_ref().map(UserFacingError::from),
            toast: model.active_toast.as_ref().map(ToastView::from),
        }
    }
}

fn field_error(model: &Model, field: ConfigField) -> Option<String> {
    model.config_errors.get(&field).cloned()
}

fn screen_for(view: ViewId, model: &Model) -> Screen {
    let draft = &model.draft;
    match view {
        ViewId::Login => Screen::Login,
        ViewId::Register => Screen::Register,
        ViewId::Dashboard => {
            let user = model.session.user();
            Screen::Dashboard {
                greeting: user.map_or_else(String::new, |u| format!("Welcome back, {}", u.name)),
                stats: vec![
                    StatTile::new("24/7 Coverage", "Active"),
                    StatTile::new(
                        "Response Time",
                        format!("< {} sec", model.config.app.emergency_timeout_seconds),
                    ),
                    StatTile::new("Your Points", user.map_or(0, |u| u.points).to_string()),
                    StatTile::new(
                        "Emergencies Handled",
                        user.map_or(0, |u| u.emergencies_handled).to_string(),
                    ),
                ],
            }
        }
        ViewId::AdminDashboard => Screen::AdminDashboard {
            stats: vec![
                StatTile::new("Total Emergencies", "1,247"),
                StatTile::new("Active Responders", "89"),
                StatTile::new("Avg Response", "3.2 min"),
                StatTile::new("Success Rate", "98.5%"),
            ],
        },
        ViewId::EmergencySelect => Screen::EmergencySelect {
            types: EmergencyType::ALL
                .iter()
                .map(|kind| EmergencyTypeView {
                    kind: *kind,
                    name: kind.name().to_string(),
                    description: kind.description().to_string(),
                    selected: draft.kind == Some(*kind),
                })
                .collect(),
        },
        ViewId::BodyMap => Screen::BodyMap {
            parts: BODY_PARTS
                .iter()
                .map(|info| BodyPartView {
                    part: info.part,
                    name: info.name.to_string(),
                    region: info.region,
                    x: info.x,
                    y: info.y,
                    size: info.size,
                    selected: draft.body_part == Some(info.part),
                })
                .collect(),
            symptoms: Symptom::ALL
                .iter()
                .map(|symptom| SymptomView {
                    symptom: *symptom,
                    name: symptom.name().to_string(),
                    severity: symptom.severity(),
                    selected: draft.symptoms.contains(symptom),
                })
                .collect(),
            description: draft.description.as_str().to_string(),
            attachments: draft.attachments.iter().map(AttachmentView::from).collect(),
            pending_uploads: draft.pending_uploads.len(),
            can_activate: !draft.active && draft.has_body_map_selection(),
        },
        ViewId::EmergencyForm => Screen::EmergencyForm {
            kind: draft.kind,
            description: draft.description.as_str().to_string(),
            attachments: draft.attachments.iter().map(AttachmentView::from).collect(),
            pending_uploads: draft.pending_uploads.len(),
        },
        ViewId::EmergencyDispatch => Screen::EmergencyDispatch {
            services: model.dispatch.connected.clone(),
            expected_services: crate::dispatch::RESPONDERS.len(),
            attachments: draft.attachments.iter().map(AttachmentView::from).collect(),
            quick_response_points: model.config.award(PointAward::QuickResponse),
            location_shared: model
                .config
                .emergency
                .get(EmergencyToggle::AutoLocationSharing),
        },
        ViewId::Settings => Screen::Settings {
            toggles: EmergencyToggle::ALL
                .iter()
                .map(|toggle| ToggleView {
                    toggle: *toggle,
                    key: toggle.key().to_string(),
                    enabled: model.config.emergency.get(*toggle),
                })
                .collect(),
        },
        ViewId::Profile => Screen::Profile {
            user: model.session.user().map(UserView::from),
        },
        ViewId::DatabaseConfig => Screen::DatabaseConfig {
            integrations: Integration::ALL
                .iter()
                .map(|integration| IntegrationView {
                    integration: *integration,
                    key: integration.key().to_string(),
                    url: model.config.endpoint(*integration).unwrap_or_default().to_string(),
                    error: field_error(model, ConfigField::Integration(*integration)),
                })
                .collect(),
        },
        ViewId::SystemSettings => Screen::SystemSettings {
            app: model.config.app.clone(),
            points: PointAward::ALL
                .iter()
                .map(|award| PointAwardView {
                    award: *award,
                    key: award.key().to_string(),
                    value: model.config.award(*award),
                    error: field_error(model, ConfigField::Points(*award)),
                })
                .collect(),
            errors: model
                .config_errors
                .iter()
                .map(|(field, message)| FieldError {
                    field: field.path(),
                    message: message.clone(),
                })
                .collect(),
        },
        ViewId::History
        | ViewId::Contacts
        | ViewId::Points
        | ViewId::Analytics
        | ViewId::UserManagement => Screen::Placeholder { view },
    }
}
