pub mod config;
pub mod conversation;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod store;
