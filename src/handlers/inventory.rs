use chrono::NaiveDate;
use teloxide::{prelude::*, types::Message};

use super::{today, Error, SharedStore, ViewStates};
use crate::db::models::MedicineRecord;
use crate::inventory::{
    classify, ExpiryAlerts, ExpiryStatus, Statistics, StatusFilter, ViewMode, ViewState,
};
use crate::utils::format_date;

fn status_icon(status: ExpiryStatus) -> &'static str {
    match status {
        ExpiryStatus::Expired => "🔴",
        ExpiryStatus::Expiring => "🟠",
        ExpiryStatus::Healthy => "🟢",
    }
}

/// Formats one medicine. Grid is a single compact line, list shows every
/// detail.
pub fn render_medicine(record: &MedicineRecord, mode: ViewMode, today: NaiveDate) -> String {
    let info = classify(record.expiry, today);
    let icon = status_icon(info.status);

    match mode {
        ViewMode::Grid => format!(
            "{} {} ({}) · {} left · {} [#{}]",
            icon,
            record.name,
            record.brand,
            record.stock,
            info.status_text(),
            record.id
        ),
        ViewMode::List => {
            let mut lines = vec![
                format!("{} {} — {}", icon, record.name, record.brand),
                format!("   Status: {}", info.status_text()),
                format!("   Stock: {} units", record.stock),
                format!("   Days remaining: {}", info.days_remaining),
                format!("   Expires: {}", format_date(record.expiry)),
            ];
            if let Some(opened) = record.opened {
                lines.push(format!("   Opened: {}", format_date(opened)));
            }
            if record.image.is_some() {
                lines.push("   Photo: attached".to_string());
            }
            lines.push(format!("   Added: {}", format_date(record.added_date)));
            lines.push(format!("   Id: {}", record.id));
            lines.join("\n")
        }
    }
}

/// Formats the filtered inventory for the current view.
pub fn render_inventory(records: &[&MedicineRecord], view: &ViewState, today: NaiveDate) -> String {
    let mut header = format!("Medicines · filter: {} · view: {}", view.status, view.mode);
    if !view.search.is_empty() {
        header.push_str(&format!(" · search: \"{}\"", view.search));
    }

    if records.is_empty() {
        return format!(
            "{}\n\nNo medicines found. Add your first one with /add.",
            header
        );
    }

    let separator = match view.mode {
        ViewMode::Grid => "\n",
        ViewMode::List => "\n\n",
    };
    let body = records
        .iter()
        .map(|record| render_medicine(record, view.mode, today))
        .collect::<Vec<String>>()
        .join(separator);

    format!("{}\n\n{}", header, body)
}

pub fn render_summary(stats: &Statistics) -> String {
    format!(
        "📦 Total {} · 🔴 Expired {} · 🟠 Expiring {} · 🟢 Healthy {} · ⚠️ {} need attention",
        stats.total,
        stats.expired,
        stats.expiring_soon,
        stats.healthy,
        stats.warning_count()
    )
}

/// Alert banner text, `None` when nothing needs attention.
pub fn render_alerts(alerts: &ExpiryAlerts) -> Option<String> {
    if alerts.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    if alerts.expired > 0 {
        lines.push(format!(
            "❌ {} medicine(s) have expired, please dispose of them!",
            alerts.expired
        ));
    }
    if alerts.expiring_within_week > 0 {
        lines.push(format!(
            "⚠️ {} medicine(s) will expire within 7 days!",
            alerts.expiring_within_week
        ));
    }
    Some(lines.join("\n"))
}

/// Summary and alerts, sent after every change.
pub async fn refresh_text(store: &SharedStore) -> String {
    let store = store.lock().await;
    let today = today();
    let mut text = render_summary(&store.statistics(today));
    if let Some(alerts) = render_alerts(&store.alerts(today)) {
        text.push_str("\n\n");
        text.push_str(&alerts);
    }
    text
}

pub async fn list_inventory(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    views: ViewStates,
) -> Result<(), Error> {
    log::info!("Listing inventory");
    let view = views.get(msg.chat.id).await;

    let text = {
        let store = store.lock().await;
        let today = today();
        let filtered = store.filtered(&view, today);
        render_inventory(&filtered, &view, today)
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

pub async fn show_statistics(bot: Bot, msg: Message, store: SharedStore) -> Result<(), Error> {
    log::info!("Showing statistics");
    bot.send_message(msg.chat.id, refresh_text(&store).await)
        .await?;
    Ok(())
}

pub async fn show_alerts(bot: Bot, msg: Message, store: SharedStore) -> Result<(), Error> {
    log::info!("Showing alerts");
    let alerts = store.lock().await.alerts(today());
    let text = render_alerts(&alerts)
        .unwrap_or_else(|| "✅ Nothing has expired or expires within 7 days.".to_string());
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

pub async fn set_filter(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    views: ViewStates,
    arg: String,
) -> Result<(), Error> {
    match arg.parse::<StatusFilter>() {
        Ok(status) => {
            log::info!("Filter set to {}", status);
            views.update(msg.chat.id, |view| view.status = status).await;
            list_inventory(bot, msg, store, views).await
        }
        Err(e) => {
            bot.send_message(msg.chat.id, e).await?;
            Ok(())
        }
    }
}

pub async fn set_search(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    views: ViewStates,
    arg: String,
) -> Result<(), Error> {
    let search = arg.trim().to_string();
    log::info!("Search set to {:?}", search);
    views.update(msg.chat.id, |view| view.search = search).await;
    list_inventory(bot, msg, store, views).await
}

pub async fn set_view(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    views: ViewStates,
    arg: String,
) -> Result<(), Error> {
    match arg.parse::<ViewMode>() {
        Ok(mode) => {
            log::info!("View switched to {}", mode);
            views.update(msg.chat.id, |view| view.mode = mode).await;
            list_inventory(bot, msg, store, views).await
        }
        Err(e) => {
            bot.send_message(msg.chat.id, e).await?;
            Ok(())
        }
    }
}
