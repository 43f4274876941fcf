//! mws-http-client - Core Library
//! Signature version 2 signing and dispatch for MWS-style commerce APIs

// Public modules
pub mod core;
pub mod params;
pub mod signer;
pub mod request;
pub mod dispatch;

// Re-exports
pub use crate::core::{Clock, Config, Error, FixedClock, Result, SystemClock};
pub use dispatch::{OutgoingRequest, ReqwestTransport, RequestDispatcher, Transport};
pub use params::ParameterSet;
pub use request::{MwsRequest, SigningState};
pub use signer::{RequestSigner, Signature, SigningContext};
