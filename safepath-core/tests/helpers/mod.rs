//! Reusable test doubles for sharing integration tests.
//!
//! Platform capabilities are replaced by small in-process fakes. Location
//! comes from the real `ChannelLocationProvider`, exactly as the UI shell
//! would feed it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use safepath_core::contacts::{KeyValueStore, MemoryKeyValueStore};
use safepath_core::location::{ChannelLocationProvider, GeocodeError, ReverseGeocoder};
use safepath_core::sharing::{Clipboard, SharePayload, ShareSheet, TransmitError};
use safepath_core::{Platform, SafepathConfig, SafepathCore};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// Geocoder answering from a script, then with a default.
#[derive(Default)]
pub struct ScriptedGeocoder {
    answers: Mutex<VecDeque<Option<String>>>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedGeocoder {
    /// Always answers with `address`.
    pub fn always(address: &str) -> Self {
        let geocoder = Self::default();
        geocoder.push(Some(address));
        geocoder
    }

    /// Always fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Holds every lookup until a permit is added to the returned semaphore.
    pub fn gated(address: &str) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let mut geocoder = Self::always(address);
        geocoder.gate = Some(gate.clone());
        (geocoder, gate)
    }

    /// Queues an answer; `None` fails the lookup.
    pub fn push(&self, answer: Option<&str>) {
        self.answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<String, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let mut answers = self.answers.lock().unwrap();
        // The last answer sticks.
        let answer = if answers.len() > 1 {
            answers.pop_front().flatten()
        } else {
            answers.front().cloned().flatten()
        };
        answer.ok_or(GeocodeError::MissingDisplayName)
    }
}

/// Share sheet recording every payload.
#[derive(Default)]
pub struct RecordingShareSheet {
    available: bool,
    fail: bool,
    shared: Mutex<Vec<SharePayload>>,
}

impl RecordingShareSheet {
    pub fn available() -> Self {
        Self {
            available: true,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            available: true,
            fail: true,
            ..Self::default()
        }
    }

    pub fn shared(&self) -> Vec<SharePayload> {
        self.shared.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShareSheet for RecordingShareSheet {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn share(&self, payload: &SharePayload) -> Result<(), TransmitError> {
        self.shared.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(TransmitError::Share("AbortError".to_string()));
        }
        Ok(())
    }
}

/// Clipboard recording every write.
#[derive(Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), TransmitError> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A core wired to fakes, with handles to every fake.
pub struct Harness {
    pub core: SafepathCore,
    pub storage: Arc<MemoryKeyValueStore>,
    pub location: Arc<ChannelLocationProvider>,
    pub geocoder: Arc<ScriptedGeocoder>,
    pub share_sheet: Arc<RecordingShareSheet>,
    pub clipboard: Arc<RecordingClipboard>,
}

impl Harness {
    /// Builds a harness. Must be called inside a tokio runtime.
    pub fn new(
        location: ChannelLocationProvider,
        geocoder: ScriptedGeocoder,
        share_sheet: RecordingShareSheet,
    ) -> Self {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let location = Arc::new(location);
        let geocoder = Arc::new(geocoder);
        let share_sheet = Arc::new(share_sheet);
        let clipboard = Arc::new(RecordingClipboard::default());

        let platform = Platform::new(location.clone(), share_sheet.clone(), clipboard.clone())
            .with_geocoder(geocoder.clone());
        let core = SafepathCore::with_storage(
            storage.clone() as Arc<dyn KeyValueStore>,
            &SafepathConfig::default(),
            platform,
            Handle::current(),
        )
        .expect("should build core");

        Self {
            core,
            storage,
            location,
            geocoder,
            share_sheet,
            clipboard,
        }
    }

    /// Harness with location available, a working geocoder and no share sheet.
    pub fn clipboard_only(address: &str) -> Self {
        Self::new(
            ChannelLocationProvider::new(),
            ScriptedGeocoder::always(address),
            RecordingShareSheet::unavailable(),
        )
    }
}

/// Polls `condition` for up to two seconds.
pub async fn wait_for<F: FnMut() -> bool>(mut condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Gives spawned session tasks a chance to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
