mod media;
mod storage;
mod timer;

pub use self::media::{Media, MediaError, MediaFile, MediaOperation, MediaResult};
pub use self::storage::{
    ConfigStorage, StorageError, StorageOperation, StorageOutput, StorageResult,
};
pub use self::timer::{Timer, TimerOperation, TimerOutput};

pub use crux_core::render::Render;

use crate::event::Event;
use crate::App;

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub timer: Timer<Event>,
    pub media: Media<Event>,
    pub config_storage: ConfigStorage<Event>,
}
