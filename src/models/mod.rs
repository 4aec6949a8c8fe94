#[cfg(feature = "server")]
pub mod config;
pub mod festival;
pub mod submission;
pub mod temple;
