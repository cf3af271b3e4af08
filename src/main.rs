use dotenvy::dotenv;
use funfacts_bot::bot::handlers::{
    get_user_id_safe, BotDialogue, CallbackAction, Command,
};
use funfacts_bot::bot::state::{PredictionKind, State};
use funfacts_bot::bot::{observe, ThrottleCache};
use funfacts_bot::config::{
    get_throttle_cache_max_size, get_throttle_cache_ttl, get_throttle_interval, Settings,
};
use funfacts_bot::content::{ContentClient, ContentKind};
use funfacts_bot::favorites::{FavoritesStore, InMemoryFavorites, RecentContent};
use funfacts_bot::bot;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting the bot token from logs
struct RedactionPatterns {
    token_url: Regex,
    token_bare: Regex,
    token_prefixed: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            token_bare: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            token_prefixed: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .token_url
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .token_bare
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .token_prefixed
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // We return the original buffer length to satisfy the contract,
        // even if the redacted string length differs.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize redaction patterns early (before logging)
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    // Setup logging with redaction
    init_logging(patterns);

    info!("Starting FunFacts TG Bot...");

    // Load settings
    let settings = init_settings();

    // Initialize Bot
    let bot = Bot::new(settings.telegram_token.clone());

    // Initialize dialogue storage
    let dialogue_storage = InMemStorage::<State>::new();

    // Initialize throttle window
    let throttle = init_throttle();

    // Content providers and favorites
    let content = Arc::new(ContentClient::new(settings));
    let recent = Arc::new(RecentContent::new());
    let favorites: Arc<dyn FavoritesStore> = Arc::new(InMemoryFavorites::new());

    // Setup handlers
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            dialogue_storage,
            throttle,
            content,
            recent,
            favorites
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_throttle() -> Arc<ThrottleCache> {
    let interval = get_throttle_interval();
    let ttl = get_throttle_cache_ttl();
    let max_size = get_throttle_cache_max_size();

    info!(
        "Initializing ThrottleCache (interval: {}s, ttl: {}s, max_size: {})",
        interval, ttl, max_size
    );

    Arc::new(ThrottleCache::new(interval, ttl, max_size))
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        // Logging middleware: records every inbound event, forwards unconditionally
        .filter(|u: Update| {
            observe::log_update(&u);
            true
        })
        .branch(
            Update::filter_callback_query()
                .branch(
                    dptree::filter_map(|q: CallbackQuery| {
                        q.data.as_deref().and_then(CallbackAction::parse)
                    })
                    .endpoint(handle_callback_action),
                )
                .endpoint(handle_unknown_callback),
        )
        .branch(
            Update::filter_message()
                // Throttling middleware: suppressed messages stop here
                .branch(
                    dptree::filter_async(|msg: Message, throttle: Arc<ThrottleCache>| async move {
                        throttle.should_suppress(get_user_id_safe(&msg)).await
                    })
                    .endpoint(handle_throttled),
                )
                .enter_dialogue::<Message, InMemStorage<State>, State>()
                // An open prediction workflow consumes the next message unconditionally
                .branch(dptree::case![State::AwaitingName(kind)].endpoint(handle_name_input))
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(dptree::endpoint(handle_unknown)),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: BotDialogue,
    content: Arc<ContentClient>,
    recent: Arc<RecentContent>,
    favorites: Arc<dyn FavoritesStore>,
) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    let user_id = get_user_id_safe(&msg);

    let res = match cmd {
        Command::Help => bot::handlers::help(bot, msg).await,
        Command::CatFact => {
            bot::handlers::send_content(bot, chat_id, user_id, ContentKind::CatFact, content, recent)
                .await
        }
        Command::Joke => {
            bot::handlers::send_content(bot, chat_id, user_id, ContentKind::Joke, content, recent)
                .await
        }
        Command::RandomFact => {
            bot::handlers::send_content(
                bot,
                chat_id,
                user_id,
                ContentKind::RandomFact,
                content,
                recent,
            )
            .await
        }
        Command::Age => bot::handlers::age(bot, msg, dialogue).await,
        Command::Gender => bot::handlers::gender(bot, msg, dialogue).await,
        Command::Favorites => bot::handlers::favorites(bot, msg, favorites).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_name_input(
    bot: Bot,
    msg: Message,
    kind: PredictionKind,
    dialogue: BotDialogue,
    content: Arc<ContentClient>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_name_input(bot, msg, kind, dialogue, content).await {
        error!("Name input handler error: {}", e);
    }
    respond(())
}

async fn handle_unknown(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::unknown(bot, msg).await {
        error!("Fallback handler error: {}", e);
    }
    respond(())
}

async fn handle_throttled(
    bot: Bot,
    msg: Message,
    throttle: Arc<ThrottleCache>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::throttled(bot, msg, throttle).await {
        error!("Throttle handler error: {}", e);
    }
    respond(())
}

async fn handle_callback_action(
    bot: Bot,
    q: CallbackQuery,
    action: CallbackAction,
    content: Arc<ContentClient>,
    recent: Arc<RecentContent>,
    favorites: Arc<dyn FavoritesStore>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) =
        bot::handlers::handle_callback_action(bot, q, action, content, recent, favorites).await
    {
        error!("Callback handler error: {}", e);
    }
    respond(())
}

async fn handle_unknown_callback(bot: Bot, q: CallbackQuery) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_unknown_callback(bot, q).await {
        error!("Unknown callback handler error: {}", e);
    }
    respond(())
}
