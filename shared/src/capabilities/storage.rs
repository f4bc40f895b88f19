use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the shell keeps the serialized `AppConfig`. The core decides the
/// format; the shell only stores an opaque blob under one slot.
#[derive(Clone)]
pub struct ConfigStorage<E> {
    context: CapabilityContext<StorageOperation, E>,
}

impl<Ev> Capability<Ev> for ConfigStorage<Ev> {
    type Operation = StorageOperation;
    type MappedSelf<MappedEv> = ConfigStorage<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        ConfigStorage::new(self.context.map_event(f))
    }
}

impl<E> ConfigStorage<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<StorageOperation, E>) -> Self {
        Self { context }
    }

    pub fn load<F>(&self, callback: F)
    where
        F: FnOnce(StorageResult) -> E + Send + 'static,
    {
        self.request(StorageOperation::Load, callback);
    }

    pub fn save<F>(&self, bytes: Vec<u8>, callback: F)
    where
        F: FnOnce(StorageResult) -> E + Send + 'static,
    {
        self.request(StorageOperation::Save { bytes }, callback);
    }

    fn request<F>(&self, operation: StorageOperation, callback: F)
    where
        F: FnOnce(StorageResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOperation {
    Load,
    Save {
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
    },
}

impl Operation for StorageOperation {
    type Output = StorageResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOutput {
    /// `None` when nothing has been saved yet.
    Loaded(Option<Vec<u8>>),
    Saved,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage write failed: {reason}")]
    WriteFailed { reason: String },
}

pub type StorageResult = Result<StorageOutput, StorageError>;
