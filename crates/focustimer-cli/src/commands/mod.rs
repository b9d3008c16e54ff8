pub mod category;
pub mod config;
pub mod export;
pub mod sessions;
pub mod stats;
pub mod timer;

mod common;
