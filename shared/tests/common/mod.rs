#![allow(dead_code)]

use std::collections::BTreeMap;

use crux_core::testing::AppTester;
use crux_core::App as _;
use shared::capabilities::{MediaOperation, StorageOperation, TimerOperation};
use shared::event::{FileRef, Secret, TimerToken};
use shared::{App, Effect, Event, Model, ViewModel};

/// Shell stand-in with a virtual clock. Timer requests are queued by due time
/// and fired as `TimerElapsed` events when the clock is advanced.
pub struct VirtualShell {
    app: AppTester<App, Effect>,
    pub model: Model,
    now: u64,
    seq: u64,
    timers: BTreeMap<(u64, u64), TimerToken>,
    pub media_reads: Vec<FileRef>,
    pub storage_ops: Vec<StorageOperation>,
    pub cancelled: Vec<TimerToken>,
    pub renders: usize,
}

impl Default for VirtualShell {
    fn default() -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
            now: 0,
            seq: 0,
            timers: BTreeMap::new(),
            media_reads: Vec::new(),
            storage_ops: Vec::new(),
            cancelled: Vec::new(),
            renders: 0,
        }
    }
}

impl VirtualShell {
    pub fn send(&mut self, event: Event) {
        let update = self.app.update(event, &mut self.model);
        for effect in update.effects {
            self.absorb(effect);
        }
        for event in update.events {
            self.send(event);
        }
    }

    fn absorb(&mut self, effect: Effect) {
        match effect {
            Effect::Render(_) => self.renders += 1,
            Effect::Timer(request) => match request.operation {
                TimerOperation::Start { token, millis } => {
                    self.seq += 1;
                    self.timers.insert((self.now + millis, self.seq), token);
                }
                TimerOperation::Cancel { token } => {
                    self.cancelled.push(token);
                    self.timers.retain(|_, live| *live != token);
                }
            },
            Effect::Media(request) => match &request.operation {
                MediaOperation::Read { file } => self.media_reads.push(file.clone()),
            },
            Effect::ConfigStorage(request) => self.storage_ops.push(request.operation.clone()),
        }
    }

    /// Moves the clock forward, firing every timer that falls due on the way
    /// in due order.
    pub fn advance(&mut self, ms: u64) {
        let until = self.now + ms;
        loop {
            let next = self
                .timers
                .keys()
                .next()
                .copied()
                .filter(|(due, _)| *due <= until);
            let Some(key) = next else { break };
            let Some(token) = self.timers.remove(&key) else { break };
            self.now = key.0;
            self.send(Event::TimerElapsed { token });
        }
        self.now = until;
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn view(&self) -> ViewModel {
        App::default().view(&self.model)
    }

    /// Signs in and waits until the home screen has fully settled.
    pub fn signed_in(email: &str) -> Self {
        let mut shell = Self::default();
        shell.send(Event::LoginSubmitted {
            email: email.to_string(),
            password: Secret::new("password"),
        });
        shell.advance(800 + 200 + 300);
        shell
    }

    pub fn navigate(&mut self, target: shared::navigation::ViewId) {
        self.send(Event::NavigateRequested { target });
        self.advance(200 + 300);
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageBuffer, Rgb};
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
    cursor.into_inner()
}
