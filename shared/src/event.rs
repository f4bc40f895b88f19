use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::capabilities::{MediaResult, StorageResult};
use crate::catalog::{BodyPart, EmergencyType, Symptom};
use crate::config::ConfigEdit;
use crate::navigation::ViewId;

// --- Secret wrapper: redacts Debug, zeroizes on Drop ---

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// Sequence-allocated ids. Ordering follows allocation order.
macro_rules! sequence_id {
    ($name:ident) => {
        #[derive(
            Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        pub struct $name(pub u64);

        impl $name {
            #[must_use]
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(UserId);
typed_id!(FileRef);

sequence_id!(TimerToken);
sequence_id!(AttachmentId);
sequence_id!(PendingUploadId);
sequence_id!(ActivationId);
sequence_id!(DispatchVisitId);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("value too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("select a body part or at least one symptom first")]
    NothingSelected,
}

// --- Bounded text ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct BoundedText<const MAX: usize>(String);

impl<const MAX: usize> BoundedText<MAX> {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.len() > MAX {
            return Err(ValidationError::TooLong {
                len: s.len(),
                max: MAX,
            });
        }
        Ok(Self(s))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub type Description = BoundedText<4096>;

// --- Shell-supplied inputs ---

/// A file the user picked; the shell resolves `file` to bytes on request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub file: FileRef,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationSource {
    BodyMap,
    Form,
}

// --- Event enum: large variants boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    AppStarted,

    // Navigation
    NavigateRequested {
        target: ViewId,
    },
    SidebarToggled,

    // Session
    LoginSubmitted {
        email: String,
        password: Secret,
    },
    RegisterSubmitted {
        name: String,
        email: String,
        password: Secret,
        phone: String,
    },
    LogoutRequested,
    ProfileUpdated {
        name: String,
        email: String,
        phone: String,
    },

    // Emergency draft
    EmergencyTypeSelected {
        kind: EmergencyType,
    },
    BodyPartSelected {
        part: BodyPart,
    },
    SymptomToggled {
        symptom: Symptom,
    },
    DescriptionChanged {
        text: String,
    },
    EmergencyActivated {
        source: ActivationSource,
    },
    EmergencyResolved,

    // Attachments
    AttachmentsSelected {
        files: Vec<SelectedFile>,
    },
    AttachmentLoaded {
        upload: PendingUploadId,
        result: Box<MediaResult>,
    },
    AttachmentRemoved {
        id: AttachmentId,
    },

    // Configuration
    ConfigEdited(Box<ConfigEdit>),
    ConfigSaveRequested,
    ConfigLoaded(Box<StorageResult>),
    ConfigSaved(Box<StorageResult>),

    // Capability responses
    TimerElapsed {
        token: TimerToken,
    },

    DismissError,
    DismissToast,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::NavigateRequested { .. } => "navigate_requested",
            Self::SidebarToggled => "sidebar_toggled",
            Self::LoginSubmitted { .. } => "login_submitted",
            Self::RegisterSubmitted { .. } => "register_submitted",
            Self::LogoutRequested => "logout_requested",
            Self::ProfileUpdated { .. } => "profile_updated",
            Self::EmergencyTypeSelected { .. } => "emergency_type_selected",
            Self::BodyPartSelected { .. } => "body_part_selected",
            Self::SymptomToggled { .. } => "symptom_toggled",
            Self::DescriptionChanged { .. } => "description_changed",
            Self::EmergencyActivated { .. } => "emergency_activated",
            Self::EmergencyResolved => "emergency_resolved",
            Self::AttachmentsSelected { .. } => "attachments_selected",
            Self::AttachmentLoaded { .. } => "attachment_loaded",
            Self::AttachmentRemoved { .. } => "attachment_removed",
            Self::ConfigEdited(_) => "config_edited",
            Self::ConfigSaveRequested => "config_save_requested",
            Self::ConfigLoaded(_) => "config_loaded",
            Self::ConfigSaved(_) => "config_saved",
            Self::TimerElapsed { .. } => "timer_elapsed",
            Self::DismissError => "dismiss_error",
            Self::DismissToast => "dismiss_toast",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::AppStarted
                | Self::AttachmentLoaded { .. }
                | Self::ConfigLoaded(_)
                | Self::ConfigSaved(_)
                | Self::TimerElapsed { .. }
        )
    }

    /// Events that only make sense inside a signed-in session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        matches!(
            self,
            Self::ProfileUpdated { .. }
                | Self::EmergencyTypeSelected { .. }
                | Self::BodyPartSelected { .. }
                | Self::SymptomToggled { .. }
                | Self::DescriptionChanged { .. }
                | Self::EmergencyActivated { .. }
                | Self::EmergencyResolved
                | Self::AttachmentsSelected { .. }
                | Self::AttachmentRemoved { .. }
                | Self::ConfigEdited(_)
                | Self::ConfigSaveRequested
                | Self::LogoutRequested
        )
    }
}
