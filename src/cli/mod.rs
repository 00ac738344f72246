//! # CLI Module
//!
//! The command-line interface layer for swipecli, a swipe-style music
//! discovery client for Spotify. It implements the user-facing commands and
//! coordinates between the Spotify integration layer, the recommendation
//! engine, and terminal interaction.
//!
//! ## Commands
//!
//! ### Authentication
//!
//! - [`auth`] - runs the OAuth 2.0 PKCE login flow: starts the loopback
//!   callback server, opens the authorization URL in the browser, and waits
//!   for the token exchange to complete
//! - [`logout`] - clears the in-memory session and the persisted token
//!
//! ### Discovery
//!
//! - [`discover`] - fetches one recommendation batch and prints it as a table
//! - [`swipe`] - interactive like/dislike loop over a continuously refilled
//!   track buffer, with optional playlist export of the liked tracks
//!
//! ### Information
//!
//! - [`info`] - authentication state, token expiry, and session capabilities
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Engine / Session / Token Store)
//!     ↓
//! Spotify Layer (Auth + Catalog)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! Each command builds its own authenticator and catalog from the
//! environment configuration, delegates the actual work to the management
//! layer, and handles progress feedback and error presentation. Recoverable
//! problems are reported with [`warning!`](crate::warning); unrecoverable
//! ones terminate through [`error!`](crate::error).

mod auth;
mod discover;
mod info;
mod swipe;

pub use auth::auth;
pub use auth::logout;
pub use discover::discover;
pub use info::info;
pub use swipe::swipe;
