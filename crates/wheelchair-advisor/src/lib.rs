pub mod catalog;
pub mod conditions;
pub mod config;
pub mod error;
pub mod recommend;
pub mod response;
pub mod service;
pub mod telemetry;
