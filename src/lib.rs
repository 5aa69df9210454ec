pub mod error;
pub mod extract;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod settings;
pub mod utils;
