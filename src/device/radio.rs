use std::pin::Pin;
use std::task::{Context, Poll};
use async_trait::async_trait;
use futures::Stream;
use futures::StreamExt;
use futures::channel::mpsc::{channel, Receiver, Sender};
use tokio_util::sync::CancellationToken;

use crate::device::constants::UNNAMED;
use crate::device::types::{AdapterState, ConnectOptions, ScanEvent, ScanOptions, ServiceFilter};
use crate::error::RadioError;

/// A cancellable stream of events pushed by a radio.
///
/// The producing side watches `token()` and stops delivering once it is cancelled. Dropping
/// the subscription cancels it.
pub struct Subscription<T> {
    receiver: Receiver<T>,
    cancel: CancellationToken,
}

impl<T> Subscription<T> {
    pub fn channel(buffer: usize) -> (Sender<T>, CancellationToken, Subscription<T>) {
        let (sender, receiver) = channel::<T>(buffer);
        let cancel = CancellationToken::new();
        let subscription = Subscription { receiver, cancel: cancel.clone() };
        (sender, cancel, subscription)
    }

    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.receiver.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        this.receiver.poll_next_unpin(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// A peripheral that the radio has connected to.
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> Option<&str>;

    fn local_name(&self) -> Option<&str>;

    /// Enumerate every service and characteristic of the peripheral.
    async fn discover_all(&self) -> Result<(), RadioError>;

    fn display_name(&self) -> String {
        let name = self.name().or(self.local_name()).unwrap_or(UNNAMED).trim();
        if name.is_empty() {
            UNNAMED.to_string()
        } else {
            name.to_string()
        }
    }
}

/// The platform bluetooth stack, as seen by the scan controller.
#[async_trait]
pub trait Radio: Send + Sync + 'static {
    type Device: DeviceHandle + 'static;

    /// Push adapter power state changes. With `emit_current` the current state is delivered
    /// first.
    async fn observe_adapter_state(&self, emit_current: bool) -> Result<Subscription<AdapterState>, RadioError>;

    /// Begin discovery. Events are delivered until `stop_scan` or until the subscription is
    /// cancelled.
    async fn start_scan(&self, filter: ServiceFilter, options: ScanOptions) -> Result<Subscription<ScanEvent>, RadioError>;

    /// Idempotent.
    async fn stop_scan(&self) -> Result<(), RadioError>;

    async fn connect(&self, id: &str, options: ConnectOptions) -> Result<Self::Device, RadioError>;

    async fn cancel_connection(&self, id: &str) -> Result<(), RadioError>;

    async fn release(&self);
}
