use futures::{SinkExt, StreamExt};
use futures::channel::mpsc::{channel, Sender};
use futures::future::pending;
use log::{debug, error, info, warn};
use tokio::spawn;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::device::constants::COMMAND_BUFFER;
use crate::device::permissions::PermissionCheck;
use crate::device::radio::{Radio, Subscription};
use crate::device::types::AdapterState;
use crate::error::RadioError;
use crate::scanner::controller::{ConnectOutcome, ScanController};
use crate::scanner::session::SessionSnapshot;
use crate::scanner::types::{ScannerCommand, ScannerEvent};

type PendingConnect = Option<(String, JoinHandle<ConnectOutcome>)>;

async fn next_adapter_state(states: &mut Option<Subscription<AdapterState>>) -> Option<AdapterState> {
    match states {
        Some(states) => states.next().await,
        None => pending().await,
    }
}

async fn settle_connect(attempt: &mut PendingConnect) -> (String, Result<ConnectOutcome, JoinError>) {
    match attempt {
        Some((id, handle)) => {
            let result = handle.await;
            (id.clone(), result)
        },
        None => pending().await,
    }
}

async fn publish(senders: &mut Vec<Sender<ScannerEvent>>, snapshot: SessionSnapshot) -> bool {
    for sender in senders.iter_mut() {
        if sender.send(ScannerEvent::Snapshot(snapshot.clone())).await.is_err() {
            return false;
        }
    }
    true
}

/// Runs `controller` until `cancel` is cancelled, then releases it.
///
/// Commands, adapter state changes, discovery events and connection results are handled one at a
/// time. After each one a snapshot of the session is sent to every sender.
pub fn scanner_task<R: Radio, P: PermissionCheck>(
    cancel: CancellationToken,
    mut controller: ScanController<R, P>,
    mut senders: Vec<Sender<ScannerEvent>>,
) -> (Sender<ScannerCommand>, JoinHandle<()>) {
    let (tx, mut rx) = channel::<ScannerCommand>(COMMAND_BUFFER);

    let handle = spawn(async move {
        let mut adapter_states = match controller.radio().observe_adapter_state(true).await {
            Ok(states) => Some(states),
            Err(err) => {
                error!("Failed to observe the bluetooth adapter state: {}", err);
                None
            },
        };
        let mut connect_attempt: PendingConnect = None;

        if !publish(&mut senders, controller.snapshot()).await {
            warn!("Scanner event receiver is gone");
        }

        'mainloop: loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    break 'mainloop;
                },
                Some(command) = rx.next() => {
                    debug!("Scanner command {:?}", command);
                    match command {
                        ScannerCommand::ToggleScan => {
                            let _ = controller.toggle_scan().await;
                        },
                        ScannerCommand::Connect(id) => {
                            if let Ok(attempt) = controller.begin_connect(&id).await {
                                connect_attempt = Some((id, spawn(attempt.run())));
                            }
                        },
                        ScannerCommand::Disconnect => {
                            let _ = controller.disconnect().await;
                        },
                    }
                },
                state = next_adapter_state(&mut adapter_states) => {
                    match state {
                        Some(state) => controller.set_adapter_state(state),
                        None => {
                            warn!("Adapter state subscription ended");
                            adapter_states = None;
                        },
                    }
                },
                event = controller.next_scan_event() => {
                    let _ = controller.handle_scan_event(event).await;
                },
                (id, result) = settle_connect(&mut connect_attempt) => {
                    connect_attempt = None;
                    let outcome = result.unwrap_or_else(|err| ConnectOutcome {
                        id,
                        result: Err(RadioError::Other(format!("Connection task failed: {}", err))),
                    });
                    let _ = controller.finish_connect(outcome);
                },
            }

            debug!("Session phase {:?}", controller.session().phase());
            if !publish(&mut senders, controller.snapshot()).await {
                info!("Scanner event receiver is gone, stopping");
                break 'mainloop;
            }
        }

        if let Some((id, handle)) = connect_attempt.take() {
            info!("Abandoning connection attempt to {}", id);
            handle.abort();
        }
        if let Some(mut states) = adapter_states.take() {
            states.cancel();
        }
        controller.release().await;
    });

    (tx, handle)
}
