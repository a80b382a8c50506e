pub mod board;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notifications;
pub mod services;
pub mod state;
