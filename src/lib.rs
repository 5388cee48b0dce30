pub mod config;
pub mod db;
pub mod handlers;
pub mod inventory;
pub mod services;
pub mod utils;
