use iced::Event;

use crate::config::types::Config;
use crate::scanner::types::ScannerEvent;

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    ConfigLoadComplete((Config, Option<String>)), // config, error message
    ScannerEvent(ScannerEvent),
    ToggleScan,
    Connect(String),
    Disconnect,
    CommandSent(()),
    NoticeConfirmed,
}
