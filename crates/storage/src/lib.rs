#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod memory;
pub mod rest;

pub use config::{Config, ConfigError};
