pub mod config;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::AppState;
