//! # API Module
//!
//! HTTP endpoints for the short-lived loopback server that completes the
//! OAuth login.
//!
//! - [`callback`] - receives the authorization redirect from Spotify and
//!   hands it to the authenticator for the PKCE token exchange
//! - [`health`] - status and version, useful when checking whether a stale
//!   instance still holds the callback port
//!
//! Built on [Axum](https://docs.rs/axum); the authenticator is shared into
//! the callback handler as an extension layer.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
