pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod persist;
pub mod score;
pub mod source;
pub mod state;
pub mod store;
pub mod timer;
pub mod tui;
pub mod ui;
