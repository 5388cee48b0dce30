use chrono::{Local, NaiveDate};
use futures::future;
use teloxide::prelude::*;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::db::models::MedicineRecord;
use crate::handlers::SharedStore;
use crate::inventory::{classify, ExpiryStatus};
use crate::utils::{escape_markdown, format_date};

/// Schedules the expiry alert.
///
/// The job runs on `schedule` (a six-field cron expression, read in local
/// time) and posts the expired and soon-expiring medicines to every chat in
/// `chat_ids`.
///
/// Returns:
/// - `Ok(())` if the job is successfully scheduled and started.
/// - `Err(Box<dyn std::error::Error>)` if the schedule is invalid or the
///   scheduler cannot start.
pub async fn schedule_notifications(
    store: SharedStore,
    bot: Bot,
    chat_ids: Vec<ChatId>,
    schedule: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let sched = JobScheduler::new().await?;

    let job = Job::new_async_tz(schedule, Local, move |_uuid, _l| {
        let bot = bot.clone();
        let store = store.clone();
        let chat_ids = chat_ids.clone();
        Box::pin(async move {
            check_and_notify_expiring_medicines(&store, &bot, &chat_ids).await;
            log::info!("Expiring medicines check completed");
        })
    })
    .map_err(|e| {
        log::error!("Failed to create job: {}", e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;

    sched.add(job).await.map_err(|e| {
        log::error!("Failed to add job to scheduler: {}", e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;

    tokio::spawn(async move {
        if let Err(e) = sched.start().await {
            log::error!("Scheduler error: {}", e);
        }
    });

    log::info!("Notification scheduler started with schedule {}", schedule);
    Ok(())
}

/// Sends the alert to every chat concurrently. A failed send is logged and
/// does not stop the others.
async fn check_and_notify_expiring_medicines(
    store: &SharedStore,
    bot: &Bot,
    chat_ids: &[ChatId],
) {
    let today = Local::now().date_naive();
    let message = {
        let store = store.lock().await;
        alert_message(store.records(), today)
    };

    let Some(message) = message else {
        log::info!("No medicines need attention today");
        return;
    };

    let notification_futures: Vec<_> = chat_ids
        .iter()
        .map(|chat_id| {
            bot.send_message(*chat_id, message.clone())
                .parse_mode(teloxide::types::ParseMode::MarkdownV2)
                .send()
        })
        .collect();

    let results = future::join_all(notification_futures).await;

    for result in results {
        if let Err(e) = result {
            log::error!("Failed to send notification: {}", e);
        }
    }
}

/// Builds the MarkdownV2 alert for expired medicines and those expiring
/// within a week, or `None` when there is nothing to report.
pub fn alert_message(records: &[MedicineRecord], today: NaiveDate) -> Option<String> {
    let mut expired = Vec::new();
    let mut urgent = Vec::new();

    for medicine in records {
        let info = classify(medicine.expiry, today);
        let line = format!(
            "• `{}` \\({}\\) · expires `{}` · stock `{}`",
            escape_markdown(&medicine.name),
            escape_markdown(&medicine.brand),
            format_date(medicine.expiry),
            medicine.stock
        );
        if info.status == ExpiryStatus::Expired {
            expired.push(line);
        } else if info.is_urgent() {
            urgent.push(line);
        }
    }

    if expired.is_empty() && urgent.is_empty() {
        return None;
    }

    let mut sections = vec!["⚠️ *Medicine Expiry Alert*".to_string()];
    if !expired.is_empty() {
        sections.push(format!(
            "*Expired \\({}\\):*\n{}",
            expired.len(),
            expired.join("\n")
        ));
    }
    if !urgent.is_empty() {
        sections.push(format!(
            "*Expiring within 7 days \\({}\\):*\n{}",
            urgent.len(),
            urgent.join("\n")
        ));
    }
    sections.push("Please check and take appropriate action\\.".to_string());

    Some(sections.join("\n\n"))
}
