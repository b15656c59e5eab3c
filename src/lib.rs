pub mod cleaner;
pub mod cli;
pub mod config;
pub mod lister;
pub mod logging;
pub mod monitor;
pub mod pattern;
pub mod scheduler;
pub mod utils;
