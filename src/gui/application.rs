use futures::channel::mpsc::Sender;
use futures::SinkExt;
use iced::{Alignment, Application, Command, Element, Length, Settings, Size, Subscription, executor, window};
use iced::event::{self, Event};
use iced::theme::Theme;
use iced::widget::{button, column, container, text};
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::io::ConfigIO;
use crate::config::types::Config;
use crate::error::AppRunError;
use crate::gui::types::Message;
use crate::gui::views::scanner_view;
use crate::scanner::session::SessionSnapshot;
use crate::scanner::subscription::scanner_subscription;
use crate::scanner::types::{ScannerCommand, ScannerEvent};

const TITLE: &str = "StupidWatch BLE Scanner";

pub struct ApplicationFlags {
    config_io: ConfigIO,
    name_filter: Option<String>,
}

pub struct ScannerApplication {
    // this token is cancelled upon exit
    app_cancel: CancellationToken,

    // messages that the user must click away
    notices: Vec<String>,

    config_io: ConfigIO,
    name_filter_override: Option<String>,
    // None until the config file has been read, the scanner is not started before that
    config: Option<Config>,

    // commands are sent here once the scanner task is running
    scanner_commands: Option<Sender<ScannerCommand>>,
    // latest state from the scanner
    snapshot: SessionSnapshot,

    // set once the window asked to close; the window is closed after the radio is released
    closing: Option<window::Id>,
}

impl ScannerApplication {
    fn before_close(&mut self) {
        self.app_cancel.cancel();
    }

    fn load_config(&self) -> Command<Message> {
        let config_io = self.config_io.clone();
        let name_filter = self.name_filter_override.clone();

        let fut = async move {
            let (mut config, error_message) = match config_io.read_or_init().await {
                Ok(config) => (config, None),
                Err(err) => {
                    error!("Failed to load config: {:?}", &err);
                    (Config::default(), Some(format!("Failed to load config: {}", &err)))
                }
            };

            if let Some(name_filter) = name_filter {
                config.name_filter = name_filter;
            }

            (config, error_message)
        };

        Command::perform(fut, Message::ConfigLoadComplete)
    }

    fn send_command(&self, command: ScannerCommand) -> Command<Message> {
        let mut sender = match &self.scanner_commands {
            Some(sender) => sender.clone(),
            None => {
                warn!("Scanner is not ready, dropping {:?}", command);
                return Command::none();
            },
        };

        let fut = async move {
            if let Err(err) = sender.send(command).await {
                error!("Failed to send command to the scanner: {}", err);
            }
        };

        Command::perform(fut, Message::CommandSent)
    }
}

impl Application for ScannerApplication {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ApplicationFlags;

    fn new(flags: ApplicationFlags) -> (ScannerApplication, Command<Self::Message>) {
        let app = ScannerApplication {
            app_cancel: CancellationToken::new(),
            notices: Vec::new(),
            config_io: flags.config_io,
            name_filter_override: flags.name_filter,
            config: None,
            scanner_commands: None,
            snapshot: SessionSnapshot::default(),
            closing: None,
        };

        let command = app.load_config();
        (app, command)
    }

    fn title(&self) -> String {
        String::from(TITLE)
    }

    fn update(&mut self, message: Message) -> Command<Self::Message> {
        match message {
            Message::ConfigLoadComplete((config, error_message)) => {
                info!("Config load complete, filtering on \"{}\"", config.name_filter);
                self.config = Some(config);
                if let Some(error_message) = error_message {
                    self.notices.push(error_message);
                }
            },
            Message::NoticeConfirmed => {
                if !self.notices.is_empty() {
                    self.notices.remove(0);
                }
            },
            Message::EventOccurred(Event::Window(id, window::Event::CloseRequested)) => {
                info!("Close requested");
                self.before_close();

                // without a running scanner there is nothing to release
                if self.scanner_commands.is_none() {
                    return window::close(id);
                }
                self.closing = Some(id);
            },
            Message::ScannerEvent(ScannerEvent::Ready(sender)) => {
                info!("Scanner ready");
                self.scanner_commands = Some(sender);
            },
            Message::ScannerEvent(ScannerEvent::Snapshot(snapshot)) => {
                self.snapshot = snapshot;
            },
            Message::ScannerEvent(ScannerEvent::Unavailable(reason)) => {
                self.notices.push(format!("Bluetooth is not available: {}", reason));
            },
            Message::ScannerEvent(ScannerEvent::Released) => {
                self.scanner_commands = None;
                if let Some(id) = self.closing.take() {
                    return window::close(id);
                }
            },
            Message::ToggleScan => {
                return self.send_command(ScannerCommand::ToggleScan);
            },
            Message::Connect(id) => {
                return self.send_command(ScannerCommand::Connect(id));
            },
            Message::Disconnect => {
                return self.send_command(ScannerCommand::Disconnect);
            },

            _ => {}
        }

        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            event::listen().map(Message::EventOccurred),
        ];

        if let Some(config) = &self.config {
            subscriptions.push(
                scanner_subscription(self.app_cancel.clone(), config.scanner_settings())
                    .map(Message::ScannerEvent)
            );
        }

        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<Message> {
        if let Some(notice) = self.notices.first() {
            return container(
                column![
                    text(notice),

                    button(text("Okay"))
                        .on_press(Message::NoticeConfirmed),

                ].align_items(Alignment::Center).spacing(20),
            )
            .width(Length::Fill)
            .padding(20)
            .into()
        }

        container(scanner_view(TITLE, &self.snapshot))
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }
}

pub fn run_application(config_path: Option<std::path::PathBuf>, name_filter: Option<String>) -> Result<(), AppRunError> {
    let mut config_io = ConfigIO::new_sync(config_path)?;
    let mut config_locker = config_io.locker()?;
    let _lock_guard = config_locker.lock()?;

    let flags = ApplicationFlags { config_io, name_filter };
    let mut settings = Settings::with_flags(flags);

    // handle exits ourselves (Event::CloseRequested)
    settings.id = Some("nimble-scanner".to_string());
    settings.window.exit_on_close_request = false;
    settings.window.size = Size::new(420.0, 720.0);

    // this function will call process::exit() unless there was a startup error
    ScannerApplication::run(settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_titled_after_the_scanner() {
        let path = std::env::temp_dir()
            .join(format!("nimble-scanner-test-{}", std::process::id()))
            .join("title.json");
        let config_io = ConfigIO::new_sync(Some(path)).unwrap();

        let (app, _command) = ScannerApplication::new(ApplicationFlags { config_io, name_filter: None });

        assert_eq!(app.title(), "StupidWatch BLE Scanner");
    }
}
