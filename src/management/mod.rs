//! # Management Module
//!
//! Stateful application services: token persistence, the multi-strategy
//! recommendation engine with its session-scoped seen history, and the swipe
//! session holding the presentation buffer and verdicts.

pub mod recommend;
pub mod session;
pub mod token;

pub use recommend::{DEFAULT_GENRES, RecommendationEngine};
pub use session::{BATCH_SIZE, LOW_WATER_MARK, SwipeSession};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
