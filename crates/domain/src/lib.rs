#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod draft;
mod error;
mod exercise;
mod name;
mod service;
mod session;
mod statistics;
mod streak;
mod training;
mod workout;

pub use draft::*;
pub use error::*;
pub use exercise::*;
pub use name::*;
pub use service::*;
pub use session::*;
pub use statistics::*;
pub use streak::*;
pub use training::*;
pub use workout::*;
