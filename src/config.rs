use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: String,

    #[envconfig(from = "DATABASE_URL", default = "sqlite://medkit.db")]
    pub database_url: String,

    /// Chats that receive the scheduled expiry alert, comma separated.
    #[envconfig(from = "ALERT_CHAT_ID")]
    pub alert_chat_ids: Option<String>,

    #[envconfig(from = "ALERT_SCHEDULE", default = "0 0 8 * * *")]
    pub alert_schedule: String,
}

impl Config {
    pub fn alert_chats(&self) -> Vec<i64> {
        self.alert_chat_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|id| {
                let id = id.trim();
                if id.is_empty() {
                    return None;
                }
                match id.parse::<i64>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        log::warn!("Ignoring invalid alert chat id: {}", id);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Database settings for tools that never talk to Telegram.
#[derive(Envconfig)]
pub struct DatabaseConfig {
    #[envconfig(from = "DATABASE_URL", default = "sqlite://medkit.db")]
    pub database_url: String,
}
