use teloxide::{
    net::Download,
    prelude::*,
    types::{Message, PhotoSize},
};

use super::inventory::refresh_text;
use super::{parse_edit, parse_id, parse_new_medicine, Error, MyDialogue, SharedStore, State};
use crate::db::models::NewMedicine;
use crate::inventory::StoreError;
use crate::utils::image_data_uri;

const ADD_USAGE: &str = "Usage: /add name; brand; stock; expiry; [opened]\n\
     Dates are YYYY-MM-DD. Send a photo with the same text as caption to attach it.";

/// Replies to a failed store operation. Storage failures are propagated,
/// the rest are user-level outcomes.
async fn reply_store_error(bot: &Bot, msg: &Message, err: StoreError) -> Result<(), Error> {
    let text = match err {
        StoreError::NotFound(id) => {
            log::warn!("Medicine {} not found", id);
            "Medicine not found.".to_string()
        }
        StoreError::InsufficientStock { name, .. } => {
            format!("⚠️ Insufficient stock: {} has none left.", name)
        }
        StoreError::IdsExhausted(newest) => {
            log::error!("Cannot assign an id after {}", newest);
            "Couldn't add the medicine: no ids left.".to_string()
        }
        StoreError::Database(e) => return Err(e.into()),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn save_medicine(
    bot: &Bot,
    msg: &Message,
    store: &SharedStore,
    medicine: NewMedicine,
) -> Result<(), Error> {
    let added = store.lock().await.add(medicine).await;
    match added {
        Ok(record) => {
            let text = format!(
                "✅ Added {} (id {}).\n\n{}",
                record.name,
                record.id,
                refresh_text(store).await
            );
            bot.send_message(msg.chat.id, text).await?;
            Ok(())
        }
        Err(e) => reply_store_error(bot, msg, e).await,
    }
}

pub async fn add_medicine(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    args: String,
) -> Result<(), Error> {
    log::info!("Received add command");
    match parse_new_medicine(&args) {
        Ok(medicine) => save_medicine(&bot, &msg, &store, medicine).await,
        Err(e) => {
            log::warn!("Rejected add form: {}", e);
            bot.send_message(msg.chat.id, format!("{}\n\n{}", e, ADD_USAGE))
                .await?;
            Ok(())
        }
    }
}

/// Handles a photo whose caption is an `/add` command. The photo is
/// downloaded and encoded before the record is appended.
pub async fn add_medicine_with_photo(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    args: String,
) -> Result<(), Error> {
    log::info!("Received add command with photo");
    let medicine = match parse_new_medicine(&args) {
        Ok(medicine) => medicine,
        Err(e) => {
            log::warn!("Rejected add form: {}", e);
            bot.send_message(msg.chat.id, format!("{}\n\n{}", e, ADD_USAGE))
                .await?;
            return Ok(());
        }
    };

    // Telegram lists sizes smallest first.
    let photo = msg.photo().and_then(|sizes| sizes.last());
    let medicine = match photo {
        Some(photo) => match download_photo(&bot, photo).await {
            Ok(image) => medicine.with_image(image),
            Err(e) => {
                log::error!("Failed to download photo: {}", e);
                bot.send_message(msg.chat.id, "Couldn't read the photo, saving without it.")
                    .await?;
                medicine
            }
        },
        None => medicine,
    };

    save_medicine(&bot, &msg, &store, medicine).await
}

async fn download_photo(bot: &Bot, photo: &PhotoSize) -> Result<String, Error> {
    let file = bot.get_file(photo.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;
    Ok(image_data_uri("image/jpeg", &bytes))
}

pub async fn use_medicine(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    args: String,
) -> Result<(), Error> {
    log::info!("Received use command");
    let id = match parse_id(&args) {
        Ok(id) => id,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{}\n\nUsage: /use id", e))
                .await?;
            return Ok(());
        }
    };

    let used = store.lock().await.decrement(id).await;
    match used {
        Ok(record) => {
            let text = format!(
                "✅ Used one {}, {} left.\n\n{}",
                record.name,
                record.stock,
                refresh_text(&store).await
            );
            bot.send_message(msg.chat.id, text).await?;
            Ok(())
        }
        Err(e) => reply_store_error(&bot, &msg, e).await,
    }
}

pub async fn edit_medicine(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    args: String,
) -> Result<(), Error> {
    log::info!("Received edit command");
    let (id, update) = match parse_edit(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            bot.send_message(
                msg.chat.id,
                format!("{}\n\nUsage: /edit id stock [opened|-]", e),
            )
            .await?;
            return Ok(());
        }
    };

    let updated = store.lock().await.update(id, update).await;
    match updated {
        Ok(record) => {
            let text = format!(
                "✅ Updated {}.\n\n{}",
                record.name,
                refresh_text(&store).await
            );
            bot.send_message(msg.chat.id, text).await?;
            Ok(())
        }
        Err(e) => reply_store_error(&bot, &msg, e).await,
    }
}

/// Asks for confirmation before deleting.
pub async fn delete_medicine(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    dialogue: MyDialogue,
    args: String,
) -> Result<(), Error> {
    log::info!("Received delete command");
    let id = match parse_id(&args) {
        Ok(id) => id,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("{}\n\nUsage: /delete id", e))
                .await?;
            return Ok(());
        }
    };

    let name = store.lock().await.get(id).map(|record| record.name.clone());
    match name {
        Some(name) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "Delete \"{}\"? This cannot be undone. Reply \"yes\" to confirm.",
                    name
                ),
            )
            .await?;
            dialogue.update(State::ConfirmDelete { id }).await?;
        }
        None => {
            reply_store_error(&bot, &msg, StoreError::NotFound(id)).await?;
        }
    }
    Ok(())
}

pub async fn confirm_delete(
    bot: Bot,
    msg: Message,
    store: SharedStore,
    dialogue: MyDialogue,
    id: i64,
) -> Result<(), Error> {
    dialogue.exit().await?;

    let confirmed = msg
        .text()
        .map(|text| matches!(text.trim().to_lowercase().as_str(), "yes" | "y"))
        .unwrap_or(false);
    if !confirmed {
        log::info!("Deletion of {} cancelled", id);
        bot.send_message(msg.chat.id, "Deletion cancelled.").await?;
        return Ok(());
    }

    let removed = store.lock().await.remove(id).await;
    match removed {
        Ok(record) => {
            let text = format!(
                "🗑 Deleted {}.\n\n{}",
                record.name,
                refresh_text(&store).await
            );
            bot.send_message(msg.chat.id, text).await?;
            Ok(())
        }
        Err(e) => reply_store_error(&bot, &msg, e).await,
    }
}
