pub mod analysis;
pub mod backend;
pub mod cli;
pub mod config;
pub mod config_sync;
pub mod error;
pub mod payload;
pub mod task;
pub mod util;
pub mod workflow;
