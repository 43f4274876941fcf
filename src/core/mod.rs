//! Core module - error handling, clock capability and configuration

pub mod error;
pub mod clock;
pub mod config;

pub use error::{Error, Result};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
