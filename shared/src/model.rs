use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::catalog::{BodyPart, EmergencyType, Symptom};
use crate::config::{AppConfig, ConfigField};
use crate::dispatch::ConnectedService;
use crate::event::{
    ActivationId, ActivationSource, AttachmentId, Description, DispatchVisitId, FileRef,
    PendingUploadId, SelectedFile, TimerToken, UserId, ValidationError,
};
use crate::identity::{Credentials, Registration};
use crate::navigation::ViewId;
use crate::preview::Preview;
use crate::timers::TimerRegistry;
use crate::{AppError, ToastKind, ToastMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Doctor,
    Admin,
}

impl Role {
    /// Where a fresh session lands.
    #[must_use]
    pub const fn home_view(self) -> ViewId {
        match self {
            Self::Admin => ViewId::AdminDashboard,
            Self::User | Self::Doctor => ViewId::Dashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub points: u32,
    pub emergencies_handled: u32,
}

impl User {
    /// Profile edits never touch the role, it is fixed at sign-in.
    pub fn update_profile(
        &mut self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<(), ValidationError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ValidationError::Required { field: "name" });
        }
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        self.name = name.to_string();
        self.email = email.to_string();
        self.phone = phone.trim().to_string();
        Ok(())
    }
}

/// `user` is present exactly when the session is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_mut(&mut self) -> Option<&mut User> {
        self.user.as_mut()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn begin(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn end(&mut self) {
        self.user = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub current_view: ViewId,
    pub sidebar_open: bool,
    pub transitioning: bool,
    pub(crate) pending_swap: Option<TimerToken>,
    pub(crate) pending_loading_clear: Option<TimerToken>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub source: FileRef,
    pub preview: Preview,
    pub display_name: String,
}

// Preview bytes are noise in logs.
impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("display_name", &self.display_name)
            .field("preview_bytes", &self.preview.png.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyDraft {
    pub kind: Option<EmergencyType>,
    pub body_part: Option<BodyPart>,
    pub symptoms: BTreeSet<Symptom>,
    pub description: Description,
    pub attachments: Vec<Attachment>,
    pub pending_uploads: BTreeMap<PendingUploadId, SelectedFile>,
    pub active: bool,
    /// Seconds left; only meaningful while `active`.
    pub countdown: u32,
    pub(crate) activation: Option<ActivationId>,
    pub(crate) countdown_timer: Option<TimerToken>,
}

impl EmergencyDraft {
    #[must_use]
    pub fn new(countdown_start: u32) -> Self {
        Self {
            kind: None,
            body_part: None,
            symptoms: BTreeSet::new(),
            description: Description::default(),
            attachments: Vec::new(),
            pending_uploads: BTreeMap::new(),
            active: false,
            countdown: countdown_start,
            activation: None,
            countdown_timer: None,
        }
    }

    /// Returns whether the symptom is selected after the toggle.
    pub fn toggle_symptom(&mut self, symptom: Symptom) -> bool {
        if self.symptoms.remove(&symptom) {
            false
        } else {
            self.symptoms.insert(symptom);
            true
        }
    }

    #[must_use]
    pub fn has_body_map_selection(&self) -> bool {
        self.body_part.is_some() || !self.symptoms.is_empty()
    }

    pub fn check_activation(&self, source: ActivationSource) -> Result<(), ValidationError> {
        match source {
            ActivationSource::BodyMap if !self.has_body_map_selection() => {
                Err(ValidationError::NothingSelected)
            }
            ActivationSource::BodyMap | ActivationSource::Form => Ok(()),
        }
    }

    /// Idempotent; returns whether anything was removed.
    pub fn remove_attachment(&mut self, id: AttachmentId) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|a| a.id != id);
        before != self.attachments.len()
    }

    #[must_use]
    pub fn activation(&self) -> Option<ActivationId> {
        self.activation
    }
}

impl Default for EmergencyDraft {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EMERGENCY_TIMEOUT_SECS)
    }
}

/// One pass through the dispatch screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchState {
    pub visit: Option<DispatchVisitId>,
    pub connected: Vec<ConnectedService>,
}

/// Monotonic id sources. Never reset, so ids stay unique for the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequences {
    activation: u64,
    upload: u64,
    attachment: u64,
    visit: u64,
}

impl Sequences {
    pub fn next_activation(&mut self) -> ActivationId {
        self.activation += 1;
        ActivationId(self.activation)
    }

    pub fn next_upload(&mut self) -> PendingUploadId {
        self.upload += 1;
        PendingUploadId(self.upload)
    }

    pub fn next_attachment(&mut self) -> AttachmentId {
        self.attachment += 1;
        AttachmentId(self.attachment)
    }

    pub fn next_visit(&mut self) -> DispatchVisitId {
        self.visit += 1;
        DispatchVisitId(self.visit)
    }
}

/// Credentials held only for the duration of the simulated sign-in delay.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAuth {
    SignIn(Credentials),
    Register(Registration),
}

#[derive(Debug, Default)]
pub struct Model {
    pub session: Session,
    pub navigation: NavigationState,
    pub draft: EmergencyDraft,
    pub dispatch: DispatchState,
    pub config: AppConfig,
    pub config_errors: BTreeMap<ConfigField, String>,
    pub timers: TimerRegistry,
    pub sequences: Sequences,
    pub pending_auth: Option<PendingAuth>,
    pub is_loading: bool,
    pub active_error: Option<AppError>,
    pub active_toast: Option<ToastMessage>,
}

impl Model {
    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Countdown start for the next activation.
    #[must_use]
    pub fn countdown_start(&self) -> u32 {
        self.config.app.emergency_timeout_seconds
    }
}
