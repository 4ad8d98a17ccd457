//! Snowflake-style 64-bit identifiers with a configurable bit layout.
//!
//! Each id packs, from most to least significant bit, a reserved sign field,
//! the milliseconds elapsed since a configurable epoch, the producer's instance
//! id, and a per-millisecond sequence counter. Producers with distinct
//! instance ids never collide, and one [`LockFlakeGenerator`] never returns
//! the same id twice, even when shared by many threads.
//!
//! Ids can also be rendered as fixed-width 13-character [`Token`]s that sort
//! in the same order as the integers.
//!
//! ```
//! use flakemint::{GeneratorConfig, LockFlakeGenerator, SystemClock, Token};
//!
//! let config = GeneratorConfig::new(42).with_epoch(1_735_689_600_000);
//! let generator = LockFlakeGenerator::new(&config, SystemClock).unwrap();
//!
//! let id = generator.next_id().unwrap();
//! let token = Token::from_id(id);
//! assert_eq!(token.to_id(), id);
//! assert_eq!(generator.layout().decompose(id).instance_id, 42);
//! ```
//!
//! ## Features
//!
//! - `tracing`: instruments id issuing and logs clock regressions and lock
//!   timeouts through the `tracing` crate.
//! - `serde`: `Serialize`/`Deserialize` for [`GeneratorConfig`] and [`Token`].

mod base32;
mod config;
mod error;
mod generator;
mod layout;
mod time;

pub use crate::base32::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::time::*;
