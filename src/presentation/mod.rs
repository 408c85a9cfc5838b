// Presentation layer - HTTP routes and JSON views
pub mod app_state;
pub mod handlers;
pub mod views;
