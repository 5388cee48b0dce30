use std::sync::Arc;

use dotenvy::dotenv;
use dptree::case;
use envconfig::Envconfig;
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ReplyMarkup},
    utils::command::BotCommands,
};
use tokio::sync::Mutex;

use medkit::config::Config;
use medkit::db::init_db;
use medkit::handlers::{
    inventory::{list_inventory, set_filter, set_search, set_view, show_alerts, show_statistics},
    records::{
        add_medicine, add_medicine_with_photo, confirm_delete, delete_medicine, edit_medicine,
        use_medicine,
    },
    Error, MyDialogue, SharedStore, State, ViewStates,
};
use medkit::inventory::MedicineStore;
use medkit::services::schedule_notifications;

const MENU_INVENTORY: &str = "📋 Inventory";
const MENU_STATS: &str = "📊 Statistics";
const MENU_ALERTS: &str = "⚠️ Alerts";
const MENU_HELP: &str = "❓ Help";

#[derive(BotCommands, Debug, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
enum Command {
    #[command(description = "Start using the medicine cabinet bot.")]
    Start,
    #[command(description = "Display help information about available commands.")]
    Help,
    #[command(description = "Display the main menu.")]
    Menu,
    #[command(description = "Add a medicine: name; brand; stock; expiry; [opened]")]
    Add(String),
    #[command(description = "List medicines using the current filter, search and view.")]
    List,
    #[command(description = "Filter by status: all, expired, expiring, healthy.")]
    Filter(String),
    #[command(description = "Search by name or brand. Empty clears the search.")]
    Search(String),
    #[command(description = "Switch the view: grid or list.")]
    View(String),
    #[command(description = "Show inventory statistics.")]
    Stats,
    #[command(description = "Show expiry alerts.")]
    Alerts,
    #[command(description = "Use one unit: /use id")]
    Use(String),
    #[command(description = "Change stock and opened date: /edit id stock [opened|-]")]
    Edit(String),
    #[command(description = "Delete a medicine: /delete id")]
    Delete(String),
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize the logger with default settings or "info" level if not specified
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting the medicine cabinet bot...");

    // Load environment variables from a .env file if present
    dotenv().ok();

    let config = Config::init_from_env()?;

    let storage = init_db(&config.database_url).await?;
    let store: SharedStore = Arc::new(Mutex::new(MedicineStore::load(storage).await));

    let bot = Bot::new(config.telegram_bot_token.clone());

    let alert_chats: Vec<ChatId> = config.alert_chats().into_iter().map(ChatId).collect();
    if alert_chats.is_empty() {
        log::info!("ALERT_CHAT_ID not set, scheduled alerts disabled");
    } else if let Err(e) = schedule_notifications(
        store.clone(),
        bot.clone(),
        alert_chats,
        &config.alert_schedule,
    )
    .await
    {
        log::error!("Failed to schedule notifications: {}", e);
    }

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<State>, State>()
        .branch(dptree::entry().filter_command::<Command>().endpoint(answer))
        .branch(case![State::ConfirmDelete { id }].endpoint(confirm_delete))
        .branch(dptree::endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            store,
            ViewStates::default(),
            InMemStorage::<State>::new()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Shutting down gracefully");
    Ok(())
}

/// Handles bot commands and responds accordingly.
async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    store: SharedStore,
    views: ViewStates,
    dialogue: MyDialogue,
) -> Result<(), Error> {
    // A new command abandons any pending confirmation
    dialogue.update(State::Start).await?;

    match cmd {
        Command::Start => {
            log::info!("Received start command");
            bot.send_message(
                msg.chat.id,
                "Welcome! I keep track of the medicines in your cabinet and warn you before they expire.\nUse /add to record one, or /menu for shortcuts.",
            )
            .await?;
        }
        Command::Help => {
            log::info!("Received help command");
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Menu => {
            log::info!("Received menu command");
            bot.send_message(msg.chat.id, "Please choose an option:")
                .reply_markup(ReplyMarkup::Keyboard(menu_keyboard()))
                .await?;
        }
        Command::Add(args) => add_medicine(bot, msg, store, args).await?,
        Command::List => list_inventory(bot, msg, store, views).await?,
        Command::Filter(arg) => set_filter(bot, msg, store, views, arg).await?,
        Command::Search(arg) => set_search(bot, msg, store, views, arg).await?,
        Command::View(arg) => set_view(bot, msg, store, views, arg).await?,
        Command::Stats => show_statistics(bot, msg, store).await?,
        Command::Alerts => show_alerts(bot, msg, store).await?,
        Command::Use(args) => use_medicine(bot, msg, store, args).await?,
        Command::Edit(args) => edit_medicine(bot, msg, store, args).await?,
        Command::Delete(args) => delete_medicine(bot, msg, store, dialogue, args).await?,
    };

    Ok(())
}

fn menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(MENU_INVENTORY),
            KeyboardButton::new(MENU_STATS),
        ],
        vec![KeyboardButton::new(MENU_ALERTS), KeyboardButton::new(MENU_HELP)],
    ])
    .resize_keyboard()
}

/// Strips a leading `/add` (optionally `/add@botname`) from a photo caption.
fn add_caption_args(caption: &str) -> Option<&str> {
    let rest = caption.trim_start().strip_prefix("/add")?;
    if rest.starts_with('@') {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        return Some(&rest[end..]);
    }
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return Some(rest);
    }
    None
}

/// Handles menu buttons and photos captioned with `/add`.
async fn handle_message(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    views: ViewStates,
) -> Result<(), Error> {
    if msg.photo().is_some() {
        if let Some(args) = msg.caption().and_then(add_caption_args) {
            let args = args.to_string();
            return add_medicine_with_photo(bot, msg, store, args).await;
        }
    }

    if let Some(text) = msg.text() {
        match text {
            MENU_INVENTORY => list_inventory(bot, msg, store, views).await?,
            MENU_STATS => show_statistics(bot, msg, store).await?,
            MENU_ALERTS => show_alerts(bot, msg, store).await?,
            MENU_HELP => {
                bot.send_message(msg.chat.id, Command::descriptions().to_string())
                    .await?;
            }
            _ => {
                bot.send_message(msg.chat.id, "I don't understand that command. Please use the menu or type /help for available commands.").await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_args_follow_add() {
        assert_eq!(
            add_caption_args("/add Aspirin; Bayer; 5; 2026-01-01"),
            Some(" Aspirin; Bayer; 5; 2026-01-01")
        );
        assert_eq!(add_caption_args("  /add"), Some(""));
    }

    #[test]
    fn caption_args_skip_bot_mention() {
        assert_eq!(
            add_caption_args("/add@medkit_bot Aspirin; ; 5; 2026-01-01"),
            Some(" Aspirin; ; 5; 2026-01-01")
        );
        assert_eq!(add_caption_args("/add@medkit_bot"), Some(""));
    }

    #[test]
    fn other_captions_are_ignored() {
        assert_eq!(add_caption_args("/addx Aspirin"), None);
        assert_eq!(add_caption_args("/list"), None);
        assert_eq!(add_caption_args("Aspirin /add"), None);
    }
}
