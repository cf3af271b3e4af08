//! Inline keyboards attached to replies

use crate::content::ContentKind;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Callback payload for saving the last delivered item
pub const SAVE_FAVORITE_TAG: &str = "savefav";

/// Main menu: one button per content command
#[must_use]
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("🐱 Факт о котах", ContentKind::CatFact.tag()),
            InlineKeyboardButton::callback("😂 Шутка", ContentKind::Joke.tag()),
        ],
        vec![InlineKeyboardButton::callback(
            "🧠 Случайный факт",
            ContentKind::RandomFact.tag(),
        )],
    ])
}

/// Keyboard under a delivered content item: repeat and save
#[must_use]
pub fn content_keyboard(kind: ContentKind) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("🔄 Ещё", kind.tag()),
        InlineKeyboardButton::callback("⭐ В избранное", SAVE_FAVORITE_TAG),
    ]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::handlers::CallbackAction;

    fn payloads(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                    Some(data.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_main_menu_payloads_are_recognized() {
        for payload in payloads(&main_menu()) {
            assert!(
                CallbackAction::parse(&payload).is_some(),
                "unrecognized payload: {payload}"
            );
        }
    }

    #[test]
    fn test_content_keyboard_payloads_are_recognized() {
        for kind in [ContentKind::CatFact, ContentKind::Joke, ContentKind::RandomFact] {
            for payload in payloads(&content_keyboard(kind)) {
                assert!(
                    CallbackAction::parse(&payload).is_some(),
                    "unrecognized payload: {payload}"
                );
            }
        }
    }
}
