use futures::channel::mpsc::Sender;

use crate::scanner::session::SessionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerCommand {
    ToggleScan,
    Connect(String),
    Disconnect,
}

#[derive(Debug, Clone)]
pub enum ScannerEvent {
    /// The scanner task is running and accepts commands on this sender.
    Ready(Sender<ScannerCommand>),
    Snapshot(SessionSnapshot),
    /// The bluetooth stack could not be opened at all.
    Unavailable(String),
    /// The scanner has stopped and the radio has been released.
    Released,
}
