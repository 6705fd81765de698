use iced::{Alignment, Element, Length};
use iced::theme;
use iced::widget::{Column, button, column, container, row, scrollable, text};

use crate::device::constants::UNNAMED;
use crate::gui::style::{BADGE_COLOR, META_COLOR, CardButtonStyleSheet, ConnectedBoxStyleSheet};
use crate::gui::types::Message;
use crate::scanner::session::{ScannedDevice, SessionSnapshot};

pub fn scan_button_label(is_scanning: bool) -> &'static str {
    if is_scanning { "Stop Scanning" } else { "Start Scanning" }
}

pub fn empty_list_text(is_scanning: bool) -> &'static str {
    if is_scanning { "Scanning..." } else { "Tap Start Scanning." }
}

pub fn rssi_label(rssi: Option<i16>) -> String {
    match rssi {
        Some(rssi) => format!("rssi: {}", rssi),
        None => String::from("rssi: N/A"),
    }
}

/// Cards can't be clicked while a device is connecting or connected.
pub fn cards_disabled(snapshot: &SessionSnapshot) -> bool {
    snapshot.connecting_id.is_some() || snapshot.connected_id.is_some()
}

pub fn scan_button(snapshot: &SessionSnapshot) -> Element<Message> {
    let mut toggle = button(
        text(scan_button_label(snapshot.is_scanning)).size(18)
    )
    .padding(12)
    .style(if snapshot.is_scanning { theme::Button::Destructive } else { theme::Button::Primary });

    if snapshot.connecting_id.is_none() {
        toggle = toggle.on_press(Message::ToggleScan);
    }

    toggle.into()
}

pub fn device_card<'a>(device: &'a ScannedDevice, is_connecting: bool, disabled: bool) -> Element<'a, Message> {
    let mut title = row![text(&device.name).size(18)];
    if is_connecting {
        title = title.push(text(" (connecting…)").size(18).style(BADGE_COLOR));
    }

    let mut card = button(
        column![
            title,
            text(format!("id: {}", device.id)).size(13).style(META_COLOR),
            text(rssi_label(device.rssi)).size(13).style(META_COLOR),
            text("Tap to connect").size(12),
        ].spacing(4)
    )
    .width(Length::Fill)
    .padding(12)
    .style(theme::Button::Custom(Box::new(CardButtonStyleSheet)));

    if !disabled {
        card = card.on_press(Message::Connect(device.id.clone()));
    }

    card.into()
}

pub fn connected_box<'a>(connected_id: &'a str, connected_name: Option<&'a str>) -> Element<'a, Message> {
    container(
        column![
            text("Connected").size(14).style(META_COLOR),
            text(connected_name.unwrap_or(UNNAMED)).size(22),
            text(format!("id: {}", connected_id)).size(13).style(META_COLOR),
            button(text("Disconnect"))
                .padding(12)
                .style(theme::Button::Destructive)
                .on_press(Message::Disconnect),
        ].spacing(8)
    )
    .width(Length::Fill)
    .padding(16)
    .style(theme::Container::Custom(Box::new(ConnectedBoxStyleSheet)))
    .into()
}

pub fn device_list(snapshot: &SessionSnapshot) -> Element<Message> {
    if snapshot.devices.is_empty() {
        return container(text(empty_list_text(snapshot.is_scanning)).style(META_COLOR))
            .width(Length::Fill)
            .center_x()
            .padding(20)
            .into();
    }

    let disabled = cards_disabled(snapshot);

    scrollable(
        Column::with_children(
            snapshot.devices
                .iter()
                .map(|device| {
                    let is_connecting = snapshot.connecting_id.as_deref() == Some(device.id.as_str());
                    device_card(device, is_connecting, disabled)
                })
        )
        .spacing(10)
        .width(Length::Fill)
    )
    .height(Length::Fill)
    .into()
}

/// The whole scanner screen, a pure function of the snapshot.
pub fn scanner_view<'a>(title: &'a str, snapshot: &'a SessionSnapshot) -> Element<'a, Message> {
    let action: Element<Message> = match &snapshot.connected_id {
        Some(connected_id) => connected_box(connected_id, snapshot.connected_name.as_deref()),
        None => scan_button(snapshot),
    };

    column![
        text(title).size(24),
        text(&snapshot.status_text).style(META_COLOR),
        action,
        device_list(snapshot),
    ]
    .spacing(16)
    .align_items(Alignment::Start)
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}
