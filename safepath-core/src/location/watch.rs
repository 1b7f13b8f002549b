//! Continuous location observation.
//!
//! A [`LocationProvider`] opens a [`LocationSubscription`]: a lazy,
//! unbounded, non-restartable sequence of position updates. The watch
//! options, including the per-reading timeout, go to the platform; an
//! expired reading comes back as [`LocationError::Timeout`] like any other
//! platform error. Cancelling through a [`CancelHandle`] ends the sequence
//! and drops every update that has not been handed out yet.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::Stream;
use tokio::sync::{mpsc, watch};

use super::error::{LocationError, LocationResult};
use super::types::{RawPosition, WatchOptions};

/// A platform capable of reporting device location.
///
/// Capability is detected at call time through [`is_available`], never
/// configured up front.
///
/// [`is_available`]: LocationProvider::is_available
pub trait LocationProvider: Send + Sync {
    /// Returns whether the device can report its location at all.
    fn is_available(&self) -> bool;

    /// Opens a continuous location watch.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Unsupported`] if the capability is missing,
    /// or another [`LocationError`] if the platform refuses the watch.
    fn watch(&self, options: &WatchOptions) -> LocationResult<LocationSubscription>;
}

/// Cancels a [`LocationSubscription`] from outside the task consuming it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancels the subscription. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Outcome of waiting for one update.
enum Wait {
    Cancelled,
    Closed,
    Update(LocationResult<RawPosition>),
}

/// A live location watch.
pub struct LocationSubscription {
    updates: mpsc::UnboundedReceiver<LocationResult<RawPosition>>,
    cancelled: watch::Receiver<bool>,
    handle: CancelHandle,
}

impl LocationSubscription {
    /// Wraps a channel of platform updates.
    ///
    /// Providers call this from [`LocationProvider::watch`] after handing
    /// the watch options to the platform.
    #[must_use]
    pub fn new(updates: mpsc::UnboundedReceiver<LocationResult<RawPosition>>) -> Self {
        let (sender, cancelled) = watch::channel(false);
        Self {
            updates,
            cancelled,
            handle: CancelHandle {
                sender: Arc::new(sender),
            },
        }
    }

    /// Returns a handle that cancels this subscription.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    /// Waits for the next update.
    ///
    /// Waits as long as it takes: a device that does not move may stay
    /// quiet indefinitely. Returns `None` once cancelled or once the platform
    /// closes the watch.
    pub async fn next(&mut self) -> Option<LocationResult<RawPosition>> {
        if *self.cancelled.borrow() {
            return None;
        }

        let wait = tokio::select! {
            biased;
            _ = self.cancelled.changed() => Wait::Cancelled,
            received = self.updates.recv() => match received {
                Some(update) => Wait::Update(update),
                None => Wait::Closed,
            },
        };

        match wait {
            Wait::Cancelled | Wait::Closed => None,
            // A cancel racing with delivery wins.
            _ if *self.cancelled.borrow() => None,
            Wait::Update(update) => Some(update),
        }
    }

    /// Converts the subscription into a [`Stream`] of updates.
    pub fn into_stream(self) -> impl Stream<Item = LocationResult<RawPosition>> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            let update = subscription.next().await?;
            Some((update, subscription))
        })
    }
}

impl std::fmt::Debug for LocationSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSubscription")
            .field("cancelled", &self.handle.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// A provider fed by the host platform.
///
/// The UI shell owns the real location APIs and forwards every reading
/// through [`push_position`](Self::push_position) and configures its watch
/// from [`last_options`](Self::last_options). Each
/// [`watch`](LocationProvider::watch) opens a fresh channel and replaces the
/// previous one. Pushes made while nobody is watching are dropped.
#[derive(Debug)]
pub struct ChannelLocationProvider {
    available: AtomicBool,
    sender: Mutex<Option<mpsc::UnboundedSender<LocationResult<RawPosition>>>>,
    last_options: Mutex<Option<WatchOptions>>,
}

impl Default for ChannelLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelLocationProvider {
    /// Creates a provider that reports location capability.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            sender: Mutex::new(None),
            last_options: Mutex::new(None),
        }
    }

    /// Creates a provider for a device without location capability.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            available: AtomicBool::new(false),
            sender: Mutex::new(None),
            last_options: Mutex::new(None),
        }
    }

    /// Updates whether the device currently reports location capability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Forwards a position to the active watch.
    ///
    /// Returns `false` if no watch is listening.
    pub fn push_position(&self, position: RawPosition) -> bool {
        self.push(Ok(position))
    }

    /// Forwards a platform error to the active watch.
    ///
    /// Returns `false` if no watch is listening.
    pub fn push_error(&self, error: LocationError) -> bool {
        self.push(Err(error))
    }

    /// Returns whether a watch is open and still consumed.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.sender
            .lock()
            .is_ok_and(|guard| guard.as_ref().is_some_and(|tx| !tx.is_closed()))
    }

    /// Returns the options of the most recent watch request.
    #[must_use]
    pub fn last_options(&self) -> Option<WatchOptions> {
        self.last_options.lock().ok().and_then(|guard| *guard)
    }

    fn push(&self, update: LocationResult<RawPosition>) -> bool {
        let Ok(mut guard) = self.sender.lock() else {
            return false;
        };
        let delivered = guard.as_ref().is_some_and(|tx| tx.send(update).is_ok());
        if !delivered {
            *guard = None;
            log::debug!("location update dropped: no active watch");
        }
        delivered
    }
}

impl LocationProvider for ChannelLocationProvider {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn watch(&self, options: &WatchOptions) -> LocationResult<LocationSubscription> {
        if !self.is_available() {
            return Err(LocationError::Unsupported);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut sender = self
                .sender
                .lock()
                .map_err(|e| LocationError::Unavailable(format!("watch registry poisoned: {e}")))?;
            *sender = Some(tx);
        }
        if let Ok(mut last) = self.last_options.lock() {
            *last = Some(*options);
        }

        log::debug!(
            "location watch opened (high_accuracy={}, timeout={:?})",
            options.high_accuracy,
            options.timeout
        );
        Ok(LocationSubscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn subscription() -> (
        mpsc::UnboundedSender<LocationResult<RawPosition>>,
        LocationSubscription,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, LocationSubscription::new(rx))
    }

    #[tokio::test]
    async fn next_yields_updates_in_order() {
        let (tx, mut subscription) = subscription();
        tx.send(Ok(RawPosition::new(1.0, 2.0))).unwrap();
        tx.send(Ok(RawPosition::new(3.0, 4.0))).unwrap();

        let first = subscription.next().await.unwrap().unwrap();
        let second = subscription.next().await.unwrap().unwrap();

        assert_eq!(first.latitude, 1.0);
        assert_eq!(second.latitude, 3.0);
    }

    #[tokio::test]
    async fn next_passes_platform_errors_through() {
        let (tx, mut subscription) = subscription();
        tx.send(Err(LocationError::PermissionDenied)).unwrap();

        let update = subscription.next().await.unwrap();
        assert_eq!(update, Err(LocationError::PermissionDenied));
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_watch_raises_no_timeout() {
        let (_tx, mut subscription) = subscription();

        let waited = tokio::time::timeout(Duration::from_secs(35), subscription.next()).await;

        assert!(waited.is_err(), "a quiet watch must keep waiting");
    }

    #[tokio::test]
    async fn platform_timeout_is_delivered_and_watch_continues() {
        let (tx, mut subscription) = subscription();
        tx.send(Err(LocationError::Timeout)).unwrap();
        tx.send(Ok(RawPosition::new(5.0, 6.0))).unwrap();

        assert_eq!(subscription.next().await.unwrap(), Err(LocationError::Timeout));
        let update = subscription.next().await.unwrap().unwrap();
        assert_eq!(update.longitude, 6.0);
    }

    #[tokio::test]
    async fn cancel_drops_undelivered_updates() {
        let (tx, mut subscription) = subscription();
        tx.send(Ok(RawPosition::new(1.0, 2.0))).unwrap();

        let handle = subscription.cancel_handle();
        handle.cancel();

        assert!(handle.is_cancelled());
        assert!(subscription.next().await.is_none());
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn cancel_wakes_a_pending_wait() {
        let (_tx, mut subscription) = subscription();
        let handle = subscription.cancel_handle();

        let waiter = tokio::spawn(async move { subscription.next().await.is_none() });
        tokio::task::yield_now().await;
        handle.cancel();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn closed_channel_ends_subscription() {
        let (tx, mut subscription) = subscription();
        drop(tx);

        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn into_stream_ends_after_cancel() {
        use futures::StreamExt;

        let (tx, subscription) = subscription();
        let handle = subscription.cancel_handle();
        tx.send(Ok(RawPosition::new(1.0, 1.0))).unwrap();

        let mut stream = Box::pin(subscription.into_stream());
        assert!(stream.next().await.is_some());

        handle.cancel();
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn unavailable_provider_refuses_watch() {
        let provider = ChannelLocationProvider::unavailable();

        assert!(!provider.is_available());
        assert_eq!(
            provider.watch(&WatchOptions::default()).unwrap_err(),
            LocationError::Unsupported
        );
    }

    #[test]
    fn watch_records_requested_options() {
        let provider = ChannelLocationProvider::new();
        let _subscription = provider.watch(&WatchOptions::default()).unwrap();

        assert_eq!(provider.last_options(), Some(WatchOptions::default()));
        assert!(provider.is_watching());
    }

    #[test]
    fn push_without_watch_is_dropped() {
        let provider = ChannelLocationProvider::new();
        assert!(!provider.push_position(RawPosition::new(1.0, 2.0)));
    }

    #[test]
    fn push_after_subscription_dropped_is_dropped() {
        let provider = ChannelLocationProvider::new();
        let subscription = provider.watch(&WatchOptions::default()).unwrap();
        drop(subscription);

        assert!(!provider.is_watching());
        assert!(!provider.push_error(LocationError::Timeout));
    }

    #[tokio::test]
    async fn new_watch_replaces_previous_channel() {
        let provider = ChannelLocationProvider::new();
        let mut first = provider.watch(&WatchOptions::default()).unwrap();
        let mut second = provider.watch(&WatchOptions::default()).unwrap();

        assert!(provider.push_position(RawPosition::new(7.0, 8.0)));

        assert!(first.next().await.is_none());
        assert_eq!(second.next().await.unwrap().unwrap().latitude, 7.0);
    }
}
