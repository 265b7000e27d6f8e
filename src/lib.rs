pub mod analysis;
pub mod board;
pub mod config;
pub mod data;
pub mod monitoring;
pub mod polling;
pub mod server;
