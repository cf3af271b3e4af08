use crate::bot::menus;
use crate::bot::state::{PredictionKind, State};
use crate::bot::throttle::ThrottleCache;
use crate::content::{AgePrediction, ContentClient, ContentError, ContentKind, GenderPrediction};
use crate::favorites::{FavoritesStore, RecentContent, SavedItem};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::error;

/// Dialogue handle over the in-memory session storage
pub type BotDialogue = Dialogue<State, InMemStorage<State>>;

/// How many favorites are shown by `/favorites`
const FAVORITES_SHOWN: usize = 10;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды:")]
pub enum Command {
    #[command(description = "справка и меню.")]
    Help,
    #[command(description = "факт о котах.")]
    CatFact,
    #[command(description = "шутка.")]
    Joke,
    #[command(description = "случайный факт.")]
    RandomFact,
    #[command(description = "предсказать возраст по имени.")]
    Age,
    #[command(description = "предсказать пол по имени.")]
    Gender,
    #[command(description = "показать избранное.")]
    Favorites,
}

/// Parsed inline-button payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Fetch one more item of the given kind
    Repeat(ContentKind),
    /// Save the last delivered item into favorites
    SaveFavorite,
}

impl CallbackAction {
    /// Parses raw callback data into an action
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        if data == menus::SAVE_FAVORITE_TAG {
            return Some(Self::SaveFavorite);
        }
        ContentKind::from_tag(data).map(Self::Repeat)
    }
}

/// Extracts the sender id, falling back to 0 for channel posts
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

const HELP_TEXT: &str = "🤖 <b>Что я умею</b>\n\n\
    /help — справка и меню\n\
    /catfact — факт о котах\n\
    /joke — шутка\n\
    /randomfact — случайный факт\n\
    /age — предсказать возраст по имени\n\
    /gender — предсказать пол по имени\n\
    /favorites — избранное\n\n\
    Кнопки меню дублируют команды.";

const UNKNOWN_TEXT: &str = "🤔 Я не понимаю эту команду.\n\n\
    Используйте кнопки меню или команды:\n\
    /help - справка\n\
    /catfact - факт о котах\n\
    /joke - шутка\n\
    /randomfact - случайный факт";

pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT)
        .parse_mode(ParseMode::Html)
        .reply_markup(menus::main_menu())
        .await?;
    Ok(())
}

/// Fallback for free text and unrecognized commands
pub async fn unknown(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, UNKNOWN_TEXT)
        .reply_markup(menus::main_menu())
        .await?;
    Ok(())
}

/// Endpoint for messages suppressed by the throttle window
///
/// The message itself is dropped; the slow-down notice is rate-bounded so it
/// cannot amplify the flood.
pub async fn throttled(bot: Bot, msg: Message, throttle: Arc<ThrottleCache>) -> Result<()> {
    let user_id = get_user_id_safe(&msg);

    if throttle.should_notify(user_id).await {
        let notice = "⏳ Слишком быстро! Подождите немного перед следующим сообщением.";
        if let Err(e) = bot.send_message(msg.chat.id, notice).await {
            error!("Failed to send throttle notice to {}: {}", user_id, e);
        } else {
            throttle.mark_notified(user_id).await;
        }
    }

    Ok(())
}

async fn fetch_body(kind: ContentKind, content: &ContentClient) -> Result<String, ContentError> {
    match kind {
        ContentKind::CatFact => content.cat_fact().await,
        ContentKind::Joke => content
            .joke()
            .await
            .map(|j| format!("{}\n\n{}", j.setup, j.punchline)),
        ContentKind::RandomFact => content.random_fact().await,
    }
}

/// Fetches and delivers one content item
///
/// Delivery is a fixed two-step composition: the raw item is recorded as the
/// user's last content (so the save button has something to save), then sent
/// with the repeat/save keyboard. Provider failures stop here with a
/// user-facing notice and never reach the dispatch tree.
pub async fn send_content(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    kind: ContentKind,
    content: Arc<ContentClient>,
    recent: Arc<RecentContent>,
) -> Result<()> {
    match fetch_body(kind, &content).await {
        Ok(body) => {
            recent.remember(user_id, kind, body.clone()).await;

            let text = format!(
                "<b>{}</b>\n\n{}",
                kind.title(),
                html_escape::encode_text(&body)
            );
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(menus::content_keyboard(kind))
                .await?;
        }
        Err(e) => {
            error!("Content fetch failed ({}): {}", kind.tag(), e);
            bot.send_message(chat_id, "⚠️ Не удалось получить контент. Попробуйте ещё раз позже.")
                .await?;
        }
    }

    Ok(())
}

/// `/age`: open the name-prediction workflow
pub async fn age(bot: Bot, msg: Message, dialogue: BotDialogue) -> Result<()> {
    dialogue
        .update(State::AwaitingName(PredictionKind::Age))
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    bot.send_message(msg.chat.id, "🎂 Введите имя для предсказания возраста:")
        .await?;
    Ok(())
}

/// `/gender`: open the name-prediction workflow
pub async fn gender(bot: Bot, msg: Message, dialogue: BotDialogue) -> Result<()> {
    dialogue
        .update(State::AwaitingName(PredictionKind::Gender))
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    bot.send_message(msg.chat.id, "👫 Введите имя для предсказания пола:")
        .await?;
    Ok(())
}

fn format_age_reply(prediction: &AgePrediction) -> String {
    let name = html_escape::encode_text(&prediction.name);
    match prediction.age {
        Some(age) => format!("🎂 Имя: <b>{name}</b>\nПредполагаемый возраст: <b>{age}</b>"),
        None => format!("🤷 Для имени <b>{name}</b> не нашлось данных о возрасте."),
    }
}

fn format_gender_reply(prediction: &GenderPrediction) -> String {
    let name = html_escape::encode_text(&prediction.name);
    match prediction.gender.as_deref() {
        Some(gender) => {
            let label = match gender {
                "male" => "мужской",
                "female" => "женский",
                other => other,
            };
            let confidence = prediction
                .probability
                .map(|p| format!(" (уверенность {:.0}%)", p * 100.0))
                .unwrap_or_default();
            format!("👫 Имя: <b>{name}</b>\nПредполагаемый пол: <b>{label}</b>{confidence}")
        }
        None => format!("🤷 Для имени <b>{name}</b> не нашлось данных о поле."),
    }
}

/// Consumes the next text message while a prediction workflow is open
///
/// The dialogue returns to idle before any provider I/O, so the workflow
/// terminates whatever happens next. Non-text input does not consume the
/// workflow; the user is re-prompted.
pub async fn handle_name_input(
    bot: Bot,
    msg: Message,
    kind: PredictionKind,
    dialogue: BotDialogue,
    content: Arc<ContentClient>,
) -> Result<()> {
    let Some(raw) = msg.text() else {
        bot.send_message(msg.chat.id, "✍️ Пришлите имя текстом:").await?;
        return Ok(());
    };
    let name = raw.trim().to_string();

    dialogue.exit().await.map_err(|e| anyhow!(e.to_string()))?;

    if name.is_empty() {
        bot.send_message(msg.chat.id, "🤔 Имя не распознано.").await?;
        return Ok(());
    }

    let reply = match kind {
        PredictionKind::Age => match content.predict_age(&name).await {
            Ok(prediction) => format_age_reply(&prediction),
            Err(e) => {
                error!("Age prediction failed: {}", e);
                "⚠️ Сервис предсказаний сейчас недоступен.".to_string()
            }
        },
        PredictionKind::Gender => match content.predict_gender(&name).await {
            Ok(prediction) => format_gender_reply(&prediction),
            Err(e) => {
                error!("Gender prediction failed: {}", e);
                "⚠️ Сервис предсказаний сейчас недоступен.".to_string()
            }
        },
    };

    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .reply_markup(menus::main_menu())
        .await?;
    Ok(())
}

/// `/favorites`: list the user's saved items, newest first
pub async fn favorites(bot: Bot, msg: Message, store: Arc<dyn FavoritesStore>) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let items = store.list(user_id).await?;

    if items.is_empty() {
        bot.send_message(
            msg.chat.id,
            "🤷 В избранном пока пусто.\nСохраняйте понравившееся кнопкой «⭐ В избранное».",
        )
        .reply_markup(menus::main_menu())
        .await?;
        return Ok(());
    }

    let mut lines = vec![format!("⭐ <b>Избранное</b> (всего: {})", items.len())];
    for item in items.iter().rev().take(FAVORITES_SHOWN) {
        lines.push(format!(
            "• {}: {}",
            item.kind.title(),
            html_escape::encode_text(&item.text)
        ));
    }
    if items.len() > FAVORITES_SHOWN {
        lines.push(format!("…показаны последние {FAVORITES_SHOWN}."));
    }

    bot.send_message(msg.chat.id, lines.join("\n\n"))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn save_last_content(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    recent: Arc<RecentContent>,
    store: Arc<dyn FavoritesStore>,
) -> Result<()> {
    match recent.last(user_id).await {
        Some((kind, text)) => {
            store.add(user_id, SavedItem::new(kind, text)).await?;
            bot.send_message(chat_id, "⭐ Добавлено в избранное!").await?;
        }
        None => {
            bot.send_message(
                chat_id,
                "🤷 Пока нечего сохранять — сначала запросите факт или шутку.",
            )
            .await?;
        }
    }
    Ok(())
}

/// Handles a recognized inline-button press
///
/// The callback is acknowledged exactly once, after the action ran, including
/// for callbacks whose original message is no longer accessible.
pub async fn handle_callback_action(
    bot: Bot,
    q: CallbackQuery,
    action: CallbackAction,
    content: Arc<ContentClient>,
    recent: Arc<RecentContent>,
    store: Arc<dyn FavoritesStore>,
) -> Result<()> {
    let user_id = q.from.id.0.cast_signed();

    if let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) {
        match action {
            CallbackAction::Repeat(kind) => {
                send_content(bot.clone(), chat_id, user_id, kind, content, recent).await?;
            }
            CallbackAction::SaveFavorite => {
                save_last_content(bot.clone(), chat_id, user_id, recent, store).await?;
            }
        }
    }

    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// Fallback for button payloads outside the recognized set
pub async fn handle_unknown_callback(bot: Bot, q: CallbackQuery) -> Result<()> {
    bot.answer_callback_query(q.id)
        .text("🤔 Неизвестное действие")
        .await?;
    Ok(())
}
