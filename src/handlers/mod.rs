use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use teloxide::{
    dispatching::dialogue::{Dialogue, InMemStorage},
    types::ChatId,
};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::db::models::{MedicineUpdate, NewMedicine};
use crate::db::SqliteStorage;
use crate::inventory::{MedicineStore, ViewState};
use crate::utils::parse_date;

pub mod inventory;
pub mod records;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub type SharedStore = Arc<Mutex<MedicineStore<SqliteStorage>>>;

#[derive(Clone, PartialEq, Debug, Default)]
pub enum State {
    #[default]
    Start,
    ConfirmDelete {
        id: i64,
    },
}

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// Per-chat view selections, lost on restart.
#[derive(Clone, Debug, Default)]
pub struct ViewStates(Arc<Mutex<HashMap<ChatId, ViewState>>>);

impl ViewStates {
    pub async fn get(&self, chat: ChatId) -> ViewState {
        self.0.lock().await.get(&chat).cloned().unwrap_or_default()
    }

    pub async fn update<F>(&self, chat: ChatId, change: F) -> ViewState
    where
        F: FnOnce(&mut ViewState),
    {
        let mut views = self.0.lock().await;
        let view = views.entry(chat).or_default();
        change(view);
        view.clone()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("Invalid date: {0} (use YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid medicine id: {0}")]
    InvalidId(String),
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn required<'a>(field: Option<&'a str>, name: &'static str) -> Result<&'a str, FormError> {
    field
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(FormError::MissingField(name))
}

fn date_field(value: &str) -> Result<NaiveDate, FormError> {
    parse_date(value).ok_or_else(|| FormError::InvalidDate(value.trim().to_string()))
}

fn stock_field(value: &str) -> Result<u32, FormError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| FormError::InvalidNumber(value.trim().to_string()))
}

pub fn parse_id(text: &str) -> Result<i64, FormError> {
    let text = required(Some(text), "medicine id")?;
    text.parse::<i64>()
        .map_err(|_| FormError::InvalidId(text.to_string()))
}

/// Parses `name; brand; stock; expiry; [opened]`.
pub fn parse_new_medicine(args: &str) -> Result<NewMedicine, FormError> {
    let mut fields = args.split(';');

    let name = required(fields.next(), "name")?;
    let brand = fields.next().map(str::trim).filter(|brand| !brand.is_empty());
    let stock = stock_field(required(fields.next(), "stock")?)?;
    let expiry = date_field(required(fields.next(), "expiry date")?)?;

    let mut medicine = NewMedicine::new(name, stock, expiry);
    if let Some(brand) = brand {
        medicine = medicine.with_brand(brand);
    }
    if let Some(opened) = fields.next().map(str::trim).filter(|v| !v.is_empty()) {
        medicine = medicine.with_opened(date_field(opened)?);
    }
    Ok(medicine)
}

/// Parses `id stock [opened|-]`. A `-` clears the opened date; leaving it
/// out keeps the current one.
pub fn parse_edit(args: &str) -> Result<(i64, MedicineUpdate), FormError> {
    let mut fields = args.split_whitespace();

    let id = parse_id(fields.next().unwrap_or_default())?;
    let stock = stock_field(required(fields.next(), "stock")?)?;
    let opened = match fields.next() {
        None => None,
        Some("-") => Some(None),
        Some(date) => Some(Some(date_field(date)?)),
    };

    Ok((
        id,
        MedicineUpdate {
            stock: Some(stock),
            opened,
        },
    ))
}
