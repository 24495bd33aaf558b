pub mod config;
pub mod constants;
pub mod errors;
pub mod logger;
pub mod notifications;
pub mod partition;
pub mod transitions;
pub mod types;
