//! Process lifecycle: configuration, database, and the HTTP server

pub mod app;

pub use app::App;
