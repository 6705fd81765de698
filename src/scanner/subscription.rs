use std::convert::Infallible;
use std::sync::Arc;
use futures::SinkExt;
use futures::channel::mpsc::Sender;
use futures::future::pending;
use iced::subscription::{self, Subscription};
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::device::btle::BtleRadio;
use crate::device::permissions::DesktopPermissions;
use crate::scanner::controller::{ScanController, ScannerSettings};
use crate::scanner::task::scanner_task;
use crate::scanner::types::ScannerEvent;

async fn run_scanner(cancel: CancellationToken, settings: ScannerSettings, mut output: Sender<ScannerEvent>) -> Infallible {
    match BtleRadio::new().await {
        Err(err) => {
            error!("Failed to open the bluetooth stack: {}", err);
            let _ = output.send(ScannerEvent::Unavailable(err.to_string())).await;
        },
        Ok(radio) => {
            let controller = ScanController::new(Arc::new(radio), Arc::new(DesktopPermissions), settings);
            let (commands, handle) = scanner_task(cancel, controller, vec![output.clone()]);

            if output.send(ScannerEvent::Ready(commands)).await.is_err() {
                warn!("Scanner subscription receiver is gone");
            }

            match handle.await {
                Ok(_) => info!("Scanner stopped"),
                Err(err) => error!("Scanner task failed: {}", err),
            }
            let _ = output.send(ScannerEvent::Released).await;
        },
    }

    // note: subscription::channel expects the future to never resolve (Infallible)
    pending().await
}

/// Runs the scan controller against the host bluetooth stack for as long as the subscription is
/// alive. Cancelling `cancel` releases the radio, after which `ScannerEvent::Released` is sent.
pub fn scanner_subscription(cancel: CancellationToken, settings: ScannerSettings) -> Subscription<ScannerEvent> {
    struct Scanner;

    subscription::channel(
        std::any::TypeId::of::<Scanner>(),
        64,
        move |output| {
            let cancel2 = cancel.clone();
            let settings2 = settings.clone();

            async move {
                run_scanner(cancel2, settings2, output).await
            }
        },
    )
}
