pub mod config;
pub mod demo;
pub mod dwell;
pub mod engine;
pub mod error;
pub mod fact;
pub mod inventory;
pub mod name_generator;
pub mod period;
pub mod pipeline;
pub mod price;
pub mod query;
pub mod ranking;
pub mod recall;
pub mod rng;
pub mod source;
pub mod store;
pub mod trend;
pub mod types;
