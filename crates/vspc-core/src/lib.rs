pub mod alarms;
pub mod billing;
pub mod config;
pub mod jobs;
pub mod model;
pub mod store;
pub mod threats;
pub mod url;
pub mod usage;
