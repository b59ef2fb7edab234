pub mod config;
pub mod console;
pub mod simulated;
pub mod swipe;
