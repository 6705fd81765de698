use iced::{Background, Border, Color, Shadow, Theme};
use iced::widget::button::{StyleSheet, Appearance};
use iced::widget::container;

const CARD_BACKGROUND: Color = Color { r: 0.95, g: 0.95, b: 0.97, a: 1.0 };
const CARD_HOVER_BACKGROUND: Color = Color { r: 0.90, g: 0.91, b: 0.95, a: 1.0 };
const CONNECTED_BACKGROUND: Color = Color { r: 0.90, g: 0.97, b: 0.91, a: 1.0 };

pub const BADGE_COLOR: Color = Color { r: 0.85, g: 0.45, b: 0.05, a: 1.0 };
pub const META_COLOR: Color = Color { r: 0.4, g: 0.4, b: 0.4, a: 1.0 };

/// A whole device entry in the list is one clickable card.
pub struct CardButtonStyleSheet;

impl StyleSheet for CardButtonStyleSheet {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> Appearance {
        Appearance {
            shadow_offset: Default::default(),
            background: Some(Background::Color(CARD_BACKGROUND)),
            text_color: Color::BLACK,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 8.0.into(),
            },
            shadow: Shadow::default(),
        }
    }

    fn hovered(&self, style: &Self::Style) -> Appearance {
        Appearance {
            background: Some(Background::Color(CARD_HOVER_BACKGROUND)),
            ..self.active(style)
        }
    }
}

pub struct ConnectedBoxStyleSheet;

impl container::StyleSheet for ConnectedBoxStyleSheet {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: Some(Color::BLACK),
            background: Some(Background::Color(CONNECTED_BACKGROUND)),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 8.0.into(),
            },
            shadow: Shadow::default(),
        }
    }
}
