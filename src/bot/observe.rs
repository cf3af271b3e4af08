//! Inbound event logging
//!
//! Attached at the dispatch tree entry as an always-pass filter, so every
//! update is recorded before routing and nothing here can block an event.

use teloxide::types::{Update, UpdateKind};
use tracing::{debug, info};

const PREVIEW_LEN: usize = 64;

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        text.to_string()
    } else {
        let short: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{short}…")
    }
}

/// Logs a one-line summary of an inbound update
pub fn log_update(update: &Update) {
    match &update.kind {
        UpdateKind::Message(msg) => {
            let user_id = msg
                .from
                .as_ref()
                .map_or(0, |u| u.id.0.cast_signed());
            let payload = msg.text().map_or_else(
                || format!("<{:?}>", msg.kind).chars().take(PREVIEW_LEN).collect(),
                preview,
            );
            info!("📨 Message from user {}: {}", user_id, payload);
        }
        UpdateKind::CallbackQuery(q) => {
            let data = q.data.as_deref().unwrap_or("<no data>");
            info!(
                "🔘 Callback from user {}: {}",
                q.from.id.0.cast_signed(),
                preview(data)
            );
        }
        other => {
            debug!("Unhandled update kind: {:?}", other);
        }
    }
}
