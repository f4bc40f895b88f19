use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::FileRef;

/// Resolves user-picked files to their bytes.
#[derive(Clone)]
pub struct Media<E> {
    context: CapabilityContext<MediaOperation, E>,
}

impl<Ev> Capability<Ev> for Media<Ev> {
    type Operation = MediaOperation;
    type MappedSelf<MappedEv> = Media<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Media::new(self.context.map_event(f))
    }
}

impl<E> Media<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<MediaOperation, E>) -> Self {
        Self { context }
    }

    pub fn read<F>(&self, file: FileRef, callback: F)
    where
        F: FnOnce(MediaResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(MediaOperation::Read { file }).await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaOperation {
    Read { file: FileRef },
}

impl Operation for MediaOperation {
    type Output = MediaResult;
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFile {
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaError {
    #[error("file not found: {file}")]
    NotFound { file: FileRef },

    #[error("permission denied")]
    PermissionDenied,

    #[error("file read failed: {reason}")]
    ReadFailed { reason: String },
}

pub type MediaResult = Result<MediaFile, MediaError>;
