#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod identity;
pub mod model;
pub mod navigation;
pub mod preview;
pub mod timers;
pub mod view_model;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::Model;
pub use view_model::ViewModel;

use crate::capabilities::{CapabilityError, MediaError, StorageError};
use crate::config::ConfigError;
use crate::dispatch::DispatchError;
use crate::event::ValidationError;
use crate::identity::IdentityError;
use crate::preview::PreviewError;

pub const SIGN_IN_DELAY_MS: u64 = 800;
pub const SIGN_OUT_DELAY_MS: u64 = 500;
pub const COUNTDOWN_TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    Validation,
    NotFound,
    Storage,
    Serialization,
    Deserialization,
    ImageProcessing,
    ImageTooLarge,
    ImageFormatUnsupported,
    Media,
    MediaPermissionDenied,
    FeatureUnavailable,
    InvalidState,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Authentication => "AUTH_ERROR",
            Self::Authorization => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Storage => "STORAGE_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::ImageProcessing => "IMAGE_PROCESSING_ERROR",
            Self::ImageTooLarge => "IMAGE_TOO_LARGE",
            Self::ImageFormatUnsupported => "IMAGE_FORMAT_UNSUPPORTED",
            Self::Media => "MEDIA_ERROR",
            Self::MediaPermissionDenied => "MEDIA_PERMISSION_DENIED",
            Self::FeatureUnavailable => "FEATURE_UNAVAILABLE",
            Self::InvalidState => "INVALID_STATE",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Storage | Self::Media => ErrorSeverity::Transient,

            Self::Serialization | Self::InvalidState => ErrorSeverity::Fatal,

            Self::Authentication
            | Self::Authorization
            | Self::Validation
            | Self::NotFound
            | Self::Deserialization
            | Self::ImageProcessing
            | Self::ImageTooLarge
            | Self::ImageFormatUnsupported
            | Self::MediaPermissionDenied
            | Self::FeatureUnavailable => ErrorSeverity::Permanent,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Storage | Self::Media)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Authentication => {
                "We couldn't sign you in. Please check your details and try again.".into()
            }
            ErrorKind::Authorization => {
                "You don't have permission to perform this action.".into()
            }
            ErrorKind::Validation | ErrorKind::FeatureUnavailable => self.message.clone(),
            ErrorKind::NotFound => "The requested item could not be found.".into(),
            ErrorKind::Storage => "Unable to access saved settings. Please try again.".into(),
            ErrorKind::Serialization | ErrorKind::Deserialization => {
                "A data error occurred. Please contact support if this persists.".into()
            }
            ErrorKind::ImageProcessing => {
                "Unable to process the image. Please try a different photo.".into()
            }
            ErrorKind::ImageTooLarge => {
                "The image is too large. Please choose a smaller photo.".into()
            }
            ErrorKind::ImageFormatUnsupported => {
                "This image format is not supported. Please use JPEG, PNG, or WebP.".into()
            }
            ErrorKind::Media => "The selected file could not be read.".into(),
            ErrorKind::MediaPermissionDenied => {
                "Photo access is required. Please enable it in Settings.".into()
            }
            ErrorKind::InvalidState => {
                "The app is in an invalid state. Please restart the app.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        let kind = match &e {
            ConfigError::Forbidden { .. } => ErrorKind::Authorization,
            _ => ErrorKind::Validation,
        };
        AppError::new(kind, e.to_string()).with_context("field", e.field().path())
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Invalid(inner) => inner.into(),
            IdentityError::InvalidCredentials | IdentityError::AlreadyRegistered(_) => {
                AppError::new(ErrorKind::Authentication, e.to_string())
            }
            IdentityError::Unavailable(_) => AppError::new(ErrorKind::Authentication, e.to_string())
                .with_severity(ErrorSeverity::Transient),
        }
    }
}

impl From<PreviewError> for AppError {
    fn from(e: PreviewError) -> Self {
        let kind = match &e {
            PreviewError::ImageTooLarge { .. } | PreviewError::InputTooLarge { .. } => {
                ErrorKind::ImageTooLarge
            }
            PreviewError::UnsupportedFormat => ErrorKind::ImageFormatUnsupported,
            PreviewError::Decode { .. } | PreviewError::Encode(_) | PreviewError::EmptyInput => {
                ErrorKind::ImageProcessing
            }
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        let kind = match &e {
            MediaError::NotFound { .. } => ErrorKind::NotFound,
            MediaError::PermissionDenied => ErrorKind::MediaPermissionDenied,
            MediaError::ReadFailed { .. } => ErrorKind::Media,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::new(ErrorKind::Storage, e.to_string())
    }
}

impl From<CapabilityError> for AppError {
    fn from(e: CapabilityError) -> Self {
        match e {
            CapabilityError::Media(inner) => inner.into(),
            CapabilityError::Storage(inner) => inner.into(),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        let kind = match &e {
            DispatchError::InvalidCoordinate(..) => ErrorKind::Validation,
            DispatchError::MissingEndpoint(_) => ErrorKind::InvalidState,
            DispatchError::Rejected(_) | DispatchError::Unreachable(_) => {
                ErrorKind::FeatureUnavailable
            }
        };
        AppError::new(kind, e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration_ms: kind.default_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

pub mod app {
    use super::*;
    use tracing::{debug, info, warn};

    use crate::capabilities::{MediaResult, StorageOutput, StorageResult, TimerOutput};
    use crate::config::{AppConfig, ConfigEdit, ConfigField};
    use crate::dispatch::{ConnectedService, RESPONDERS};
    use crate::event::{ActivationSource, AttachmentId, PendingUploadId, SelectedFile, TimerToken};
    use crate::identity::{
        Credentials, IdentityProvider, MockIdentityProvider, Registration,
    };
    use crate::model::{Attachment, DispatchState, EmergencyDraft, PendingAuth};
    use crate::navigation::ViewId;
    use crate::preview::{decode_preview, PreviewConfig};
    use crate::timers::TimerPurpose;

    pub struct App {
        identity: Box<dyn IdentityProvider>,
        preview: PreviewConfig,
    }

    impl Default for App {
        fn default() -> Self {
            Self::with_identity(MockIdentityProvider)
        }
    }

    impl App {
        /// Swaps the identity backend without touching the state machine.
        #[must_use]
        pub fn with_identity(identity: impl IdentityProvider + 'static) -> Self {
            Self {
                identity: Box::new(identity),
                preview: PreviewConfig::default(),
            }
        }

        fn schedule(model: &mut Model, caps: &Capabilities, purpose: TimerPurpose) -> TimerToken {
            let token = model.timers.register(purpose);
            let millis = purpose.delay_ms();
            caps.timer.start(token, millis, |output| match output {
                TimerOutput::Elapsed { token } => Event::TimerElapsed { token },
            });
            debug!(%token, ?purpose, millis, "timer scheduled");
            token
        }

        fn cancel(model: &mut Model, caps: &Capabilities, token: Option<TimerToken>) {
            if let Some(token) = token {
                if model.timers.cancel(token) {
                    caps.timer.cancel(token);
                    debug!(%token, "timer cancelled");
                }
            }
        }

        fn cancel_where(
            model: &mut Model,
            caps: &Capabilities,
            predicate: impl Fn(TimerPurpose) -> bool,
        ) {
            for token in model.timers.drain_where(predicate) {
                caps.timer.cancel(token);
                debug!(%token, "timer cancelled");
            }
        }

        // --- Navigation ---

        fn navigate_to(model: &mut Model, caps: &Capabilities, target: ViewId) {
            let target = target.gate(model.is_authenticated());

            let swap = model.navigation.pending_swap.take();
            let clear = model.navigation.pending_loading_clear.take();
            if swap.is_some() {
                debug!(%target, "superseding pending navigation");
            }
            Self::cancel(model, caps, swap);
            Self::cancel(model, caps, clear);

            model.navigation.transitioning = true;
            model.navigation.sidebar_open = false;
            model.is_loading = true;
            let token = Self::schedule(model, caps, TimerPurpose::NavigationSwap { target });
            model.navigation.pending_swap = Some(token);
        }

        fn complete_swap(model: &mut Model, caps: &Capabilities, token: TimerToken, target: ViewId) {
            if model.navigation.pending_swap != Some(token) {
                debug!(%token, "discarding superseded navigation swap");
                return;
            }
            model.navigation.pending_swap = None;

            // The session may have ended while the fade was running.
            let target = target.gate(model.is_authenticated());
            let previous = model.navigation.current_view;
            model.navigation.current_view = target;
            model.navigation.transitioning = false;
            model.navigation.pending_loading_clear =
                Some(Self::schedule(model, caps, TimerPurpose::LoadingClear));
            info!(from = %previous, to = %target, "view changed");

            Self::on_view_entered(model, caps, previous, target);
        }

        fn on_view_entered(model: &mut Model, caps: &Capabilities, previous: ViewId, target: ViewId) {
            if previous == ViewId::EmergencyDispatch && target != ViewId::EmergencyDispatch {
                Self::stop_dispatch(model, caps);
            }
            if target == ViewId::EmergencyDispatch {
                Self::start_dispatch_visit(model, caps);
            }
        }

        // --- Dispatch simulation ---

        fn stop_dispatch(model: &mut Model, caps: &Capabilities) {
            Self::cancel_where(model, caps, TimerPurpose::is_dispatch);
            model.dispatch = DispatchState::default();
        }

        fn start_dispatch_visit(model: &mut Model, caps: &Capabilities) {
            Self::stop_dispatch(model, caps);

            let Some(activation) = model.draft.activation().filter(|_| model.draft.active) else {
                debug!("dispatch view entered without an active emergency");
                return;
            };

            let visit = model.sequences.next_visit();
            model.dispatch.visit = Some(visit);
            for index in 0..RESPONDERS.len() {
                Self::schedule(
                    model,
                    caps,
                    TimerPurpose::ServiceConnect {
                        activation,
                        visit,
                        index,
                    },
                );
            }
            info!(%activation, %visit, services = RESPONDERS.len(), "dispatch visit started");
        }

        fn connect_service(
            model: &mut Model,
            activation: crate::event::ActivationId,
            visit: crate::event::DispatchVisitId,
            index: usize,
        ) {
            let current = model.draft.active && model.draft.activation() == Some(activation);
            if !current || model.dispatch.visit != Some(visit) {
                debug!(%activation, %visit, index, "discarding stale service connection");
                return;
            }
            let Some(service) = RESPONDERS.get(index) else {
                warn!(index, "service connection for unknown responder");
                return;
            };
            model.dispatch.connected.push(ConnectedService::from(service));
            info!(service = service.name, status = ?service.status, "responder connected");
        }

        // --- Emergency countdown ---

        fn activate(model: &mut Model, caps: &Capabilities, source: ActivationSource) {
            if model.draft.active {
                debug!(?source, "emergency already active; activation ignored");
                return;
            }
            if let Err(e) = model.draft.check_activation(source) {
                warn!(?source, error = %e, "activation rejected");
                model.set_error(e.into());
                return;
            }

            let activation = model.sequences.next_activation();
            model.draft.activation = Some(activation);
            model.draft.active = true;
            model.draft.countdown = model.countdown_start();
            let token = Self::schedule(model, caps, TimerPurpose::CountdownTick { activation });
            model.draft.countdown_timer = Some(token);
            info!(
                %activation,
                ?source,
                kind = ?model.draft.kind,
                countdown = model.draft.countdown,
                "emergency activated"
            );
        }

        fn tick(
            model: &mut Model,
            caps: &Capabilities,
            token: TimerToken,
            activation: crate::event::ActivationId,
        ) {
            if !model.draft.active
                || model.draft.activation() != Some(activation)
                || model.draft.countdown_timer != Some(token)
            {
                debug!(%activation, "discarding stale countdown tick");
                return;
            }
            model.draft.countdown_timer = None;
            model.draft.countdown = model.draft.countdown.saturating_sub(1);
            debug!(%activation, countdown = model.draft.countdown, "countdown tick");

            if model.draft.countdown == 0 {
                info!(%activation, "countdown finished; dispatching");
                Self::navigate_to(model, caps, ViewId::EmergencyDispatch);
            } else {
                let next = Self::schedule(model, caps, TimerPurpose::CountdownTick { activation });
                model.draft.countdown_timer = Some(next);
            }
        }

        /// Ends the current emergency and forgets everything about it.
        fn clear_emergency(model: &mut Model, caps: &Capabilities) {
            Self::cancel_where(model, caps, |p| p.is_countdown() || p.is_dispatch());
            model.draft = EmergencyDraft::new(model.countdown_start());
            model.dispatch = DispatchState::default();
        }

        fn resolve(model: &mut Model, caps: &Capabilities) {
            if !model.draft.active {
                debug!("no active emergency to resolve");
                return;
            }
            let activation = model.draft.activation();
            Self::clear_emergency(model, caps);
            info!(?activation, "emergency resolved");
            model.show_toast("Emergency resolved", ToastKind::Success);
            Self::navigate_to(model, caps, ViewId::Dashboard);
        }

        // --- Attachments ---

        fn request_attachments(model: &mut Model, caps: &Capabilities, files: Vec<SelectedFile>) {
            for selected in files {
                let upload = model.sequences.next_upload();
                debug!(%upload, file = %selected.file, "reading attachment");
                caps.media
                    .read(selected.file.clone(), move |result: MediaResult| {
                        Event::AttachmentLoaded {
                            upload,
                            result: Box::new(result),
                        }
                    });
                model.draft.pending_uploads.insert(upload, selected);
            }
        }

        fn attachment_loaded(&self, model: &mut Model, upload: PendingUploadId, result: MediaResult) {
            let Some(selected) = model.draft.pending_uploads.remove(&upload) else {
                debug!(%upload, "discarding attachment for a cleared draft");
                return;
            };

            let preview = result
                .map_err(AppError::from)
                .and_then(|file| decode_preview(&self.preview, &file.bytes).map_err(AppError::from));

            match preview {
                Ok(preview) => {
                    let id: AttachmentId = model.sequences.next_attachment();
                    info!(%id, name = %selected.name, width = preview.width, height = preview.height, "attachment added");
                    model.draft.attachments.push(Attachment {
                        id,
                        source: selected.file,
                        preview,
                        display_name: selected.name,
                    });
                }
                Err(e) => {
                    warn!(%upload, name = %selected.name, error = %e, "unreadable attachment skipped");
                    model.show_toast(
                        format!("Couldn't read \"{}\"; it was not attached", selected.name),
                        ToastKind::Warning,
                    );
                }
            }
        }

        // --- Session ---

        fn begin_auth(model: &mut Model, caps: &Capabilities, pending: PendingAuth) {
            Self::cancel_where(model, caps, |p| {
                matches!(p, TimerPurpose::SignIn | TimerPurpose::Register)
            });
            let purpose = match pending {
                PendingAuth::SignIn(_) => TimerPurpose::SignIn,
                PendingAuth::Register(_) => TimerPurpose::Register,
            };
            model.pending_auth = Some(pending);
            model.is_loading = true;
            model.clear_error();
            Self::schedule(model, caps, purpose);
        }

        fn complete_auth(&self, model: &mut Model, caps: &Capabilities) {
            let Some(pending) = model.pending_auth.take() else {
                debug!("auth timer fired with nothing pending");
                return;
            };
            let result = match &pending {
                PendingAuth::SignIn(credentials) => self.identity.sign_in(credentials),
                PendingAuth::Register(registration) => self.identity.register(registration),
            };

            match result {
                Ok(user) => {
                    let home = user.role.home_view();
                    info!(user_id = %user.id, role = ?user.role, "session started");
                    model.session.begin(user);
                    Self::navigate_to(model, caps, home);
                }
                Err(e) => {
                    warn!(error = %e, "authentication failed");
                    model.is_loading = false;
                    model.set_error(e.into());
                }
            }
        }

        fn complete_logout(model: &mut Model, caps: &Capabilities) {
            for token in model.timers.drain() {
                caps.timer.cancel(token);
            }
            model.navigation.pending_swap = None;
            model.navigation.pending_loading_clear = None;

            let user_id = model.session.user().map(|u| u.id.to_string());
            model.session.end();
            model.pending_auth = None;
            model.draft = EmergencyDraft::new(model.countdown_start());
            model.dispatch = DispatchState::default();
            model.config_errors.clear();
            model.clear_error();
            model.active_toast = None;
            info!(?user_id, "session ended");

            Self::navigate_to(model, caps, ViewId::Login);
        }

        // --- Configuration ---

        fn edit_config(model: &mut Model, edit: &ConfigEdit) {
            let field = edit.field();
            let Some(role) = model.session.role() else {
                return;
            };
            if !edit.permits(role) {
                warn!(%field, ?role, "config edit refused");
                model.set_error(ConfigError::Forbidden { field, role }.into());
                return;
            }

            match model.config.apply(edit) {
                Ok(()) => {
                    model.config_errors.remove(&field);
                    if field == ConfigField::EmergencyTimeout && !model.draft.active {
                        model.draft.countdown = model.countdown_start();
                    }
                    debug!(%field, "config updated");
                }
                Err(e) => {
                    warn!(%field, error = %e, "config edit rejected");
                    model.config_errors.insert(field, e.to_string());
                }
            }
        }

        fn config_loaded(model: &mut Model, result: StorageResult) {
            let bytes = match result {
                Ok(StorageOutput::Loaded(Some(bytes))) => bytes,
                Ok(StorageOutput::Loaded(None)) => {
                    debug!("no stored config; keeping defaults");
                    return;
                }
                Ok(StorageOutput::Saved) => {
                    debug!("unexpected save acknowledgement on load");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "config load failed");
                    model.show_toast("Saved settings could not be loaded", ToastKind::Warning);
                    return;
                }
            };

            let parsed = serde_json::from_slice::<AppConfig>(&bytes)
                .map_err(|e| AppError::new(ErrorKind::Deserialization, e.to_string()))
                .and_then(|config| config.validate().map(|()| config).map_err(AppError::from));

            match parsed {
                Ok(config) => {
                    model.config = config;
                    if !model.draft.active {
                        model.draft.countdown = model.countdown_start();
                    }
                    info!("stored config applied");
                }
                Err(e) => {
                    warn!(error = %e, "stored config rejected; keeping defaults");
                    model.show_toast("Saved settings were invalid; using defaults", ToastKind::Warning);
                }
            }
        }

        fn save_config(model: &mut Model, caps: &Capabilities) {
            match serde_json::to_vec(&model.config) {
                Ok(bytes) => {
                    debug!(size = bytes.len(), "saving config");
                    caps.config_storage
                        .save(bytes, |result| Event::ConfigSaved(Box::new(result)));
                }
                Err(e) => {
                    warn!(error = %e, "config serialization failed");
                    model.set_error(
                        AppError::new(ErrorKind::Serialization, "Settings could not be saved")
                            .with_internal(e.to_string()),
                    );
                }
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let event_name = event.name();
            debug!(
                event = event_name,
                user_initiated = event.is_user_initiated(),
                "update"
            );

            if event.requires_session() && !model.is_authenticated() {
                warn!(event = event_name, "ignoring event outside a session");
                return;
            }

            match event {
                Event::AppStarted => {
                    caps.config_storage
                        .load(|result| Event::ConfigLoaded(Box::new(result)));
                    caps.render.render();
                }

                Event::NavigateRequested { target } => {
                    Self::navigate_to(model, caps, target);
                    caps.render.render();
                }

                Event::SidebarToggled => {
                    model.navigation.sidebar_open = !model.navigation.sidebar_open;
                    caps.render.render();
                }

                Event::LoginSubmitted { email, password } => {
                    if model.is_authenticated() {
                        debug!("already signed in; login ignored");
                        return;
                    }
                    Self::begin_auth(
                        model,
                        caps,
                        PendingAuth::SignIn(Credentials { email, password }),
                    );
                    caps.render.render();
                }

                Event::RegisterSubmitted {
                    name,
                    email,
                    password,
                    phone,
                } => {
                    if model.is_authenticated() {
                        debug!("already signed in; registration ignored");
                        return;
                    }
                    Self::begin_auth(
                        model,
                        caps,
                        PendingAuth::Register(Registration {
                            name,
                            email,
                            phone,
                            password,
                        }),
                    );
                    caps.render.render();
                }

                Event::LogoutRequested => {
                    if model.timers.count_where(|p| p == TimerPurpose::SignOut) > 0 {
                        debug!("sign-out already pending");
                        return;
                    }
                    model.is_loading = true;
                    Self::schedule(model, caps, TimerPurpose::SignOut);
                    caps.render.render();
                }

                Event::ProfileUpdated { name, email, phone } => {
                    let Some(user) = model.session.user_mut() else {
                        return;
                    };
                    match user.update_profile(&name, &email, &phone) {
                        Ok(()) => model.show_toast("Profile updated", ToastKind::Success),
                        Err(e) => model.set_error(e.into()),
                    }
                    caps.render.render();
                }

                Event::EmergencyTypeSelected { kind } => {
                    model.draft.kind = Some(kind);
                    let next = if kind.uses_body_map() {
                        ViewId::BodyMap
                    } else {
                        ViewId::EmergencyForm
                    };
                    debug!(?kind, %next, "emergency type selected");
                    Self::navigate_to(model, caps, next);
                    caps.render.render();
                }

                Event::BodyPartSelected { part } => {
                    model.draft.body_part = Some(part);
                    caps.render.render();
                }

                Event::SymptomToggled { symptom } => {
                    let selected = model.draft.toggle_symptom(symptom);
                    debug!(?symptom, selected, "symptom toggled");
                    caps.render.render();
                }

                Event::DescriptionChanged { text } => {
                    match crate::event::Description::new(text) {
                        Ok(description) => model.draft.description = description,
                        Err(e) => model.set_error(e.into()),
                    }
                    caps.render.render();
                }

                Event::EmergencyActivated { source } => {
                    Self::activate(model, caps, source);
                    caps.render.render();
                }

                Event::EmergencyResolved => {
                    Self::resolve(model, caps);
                    caps.render.render();
                }

                Event::AttachmentsSelected { files } => {
                    Self::request_attachments(model, caps, files);
                    caps.render.render();
                }

                Event::AttachmentLoaded { upload, result } => {
                    self.attachment_loaded(model, upload, *result);
                    caps.render.render();
                }

                Event::AttachmentRemoved { id } => {
                    let removed = model.draft.remove_attachment(id);
                    debug!(%id, removed, "attachment removal");
                    caps.render.render();
                }

                Event::ConfigEdited(edit) => {
                    Self::edit_config(model, &edit);
                    caps.render.render();
                }

                Event::ConfigSaveRequested => {
                    Self::save_config(model, caps);
                    caps.render.render();
                }

                Event::ConfigLoaded(result) => {
                    Self::config_loaded(model, *result);
                    caps.render.render();
                }

                Event::ConfigSaved(result) => {
                    match *result {
                        Ok(_) => model.show_toast("Settings saved", ToastKind::Success),
                        Err(e) => {
                            warn!(error = %e, "config save failed");
                            model.show_toast("Settings could not be saved", ToastKind::Warning);
                        }
                    }
                    caps.render.render();
                }

                Event::TimerElapsed { token } => {
                    let Some(purpose) = model.timers.take(token) else {
                        debug!(%token, "discarding elapsed timer with no live registration");
                        return;
                    };
                    match purpose {
                        TimerPurpose::NavigationSwap { target } => {
                            Self::complete_swap(model, caps, token, target);
                        }
                        TimerPurpose::LoadingClear => {
                            if model.navigation.pending_loading_clear == Some(token) {
                                model.navigation.pending_loading_clear = None;
                                model.is_loading = false;
                            }
                        }
                        TimerPurpose::CountdownTick { activation } => {
                            Self::tick(model, caps, token, activation);
                        }
                        TimerPurpose::ServiceConnect {
                            activation,
                            visit,
                            index,
                        } => Self::connect_service(model, activation, visit, index),
                        TimerPurpose::SignIn | TimerPurpose::Register => {
                            self.complete_auth(model, caps);
                        }
                        TimerPurpose::SignOut => Self::complete_logout(model, caps),
                    }
                    caps.render.render();
                }

                Event::DismissError => {
                    model.clear_error();
                    caps.render.render();
                }

                Event::DismissToast => {
                    model.active_toast = None;
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel::project(model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigField;
    use crate::model::Role;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorKind::Authorization.code(), "FORBIDDEN");
        assert_eq!(ErrorKind::Validation.code(), "VALIDATION_ERROR");
        assert!(ErrorKind::Storage.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
    }

    #[test]
    fn forbidden_config_edit_maps_to_authorization() {
        let err: AppError = ConfigError::Forbidden {
            field: ConfigField::AppName,
            role: Role::User,
        }
        .into();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.context.get("field").map(String::as_str), Some("app.name"));
    }

    #[test]
    fn validation_message_reaches_the_user() {
        let err: AppError = ValidationError::NothingSelected.into();
        assert_eq!(
            err.user_facing_message(),
            "select a body part or at least one symptom first"
        );
    }

    #[test]
    fn only_corrupt_state_is_fatal() {
        assert_eq!(ErrorKind::Serialization.default_severity(), ErrorSeverity::Fatal);
        assert_eq!(ErrorKind::InvalidState.default_severity(), ErrorSeverity::Fatal);
        assert_ne!(ErrorKind::Storage.default_severity(), ErrorSeverity::Fatal);
        assert_eq!(ErrorKind::InvalidState.code(), "INVALID_STATE");
    }

    #[test]
    fn fatal_errors_are_never_retryable() {
        let err = AppError::new(ErrorKind::Storage, "disk").with_severity(ErrorSeverity::Fatal);
        assert!(!err.is_retryable());
    }

    #[test]
    fn display_includes_internal_detail() {
        let err = AppError::new(ErrorKind::Serialization, "boom").with_internal("eof");
        assert_eq!(err.to_string(), "[SERIALIZATION_ERROR] boom (internal: eof)");
    }

    #[test]
    fn toast_durations_follow_kind() {
        assert_eq!(ToastMessage::new("x", ToastKind::Warning).duration_ms, 4000);
        assert_eq!(ToastMessage::new("x", ToastKind::Success).duration_ms, 2000);
    }

    #[test]
    fn preview_errors_classify() {
        let err: AppError = PreviewError::EmptyInput.into();
        assert_eq!(err.kind, ErrorKind::ImageProcessing);
        let err: AppError = PreviewError::UnsupportedFormat.into();
        assert_eq!(err.kind, ErrorKind::ImageFormatUnsupported);
    }
}
