//! # slirc-motions
//!
//! Meeting and motion voting for IRC channels.
//!
//! The crate tracks, per channel, one meeting and one motion, accepts
//! `aye`/`nay`/`abstain` votes from voiced or opped members, and tallies
//! them against the meeting quorum. Recognised users (stored by
//! `user!host`) are voiced when they join.
//!
//! ## Features
//!
//! - Casefolding that follows the server's `CASEMAPPING`
//! - Admin and voice ranks derived from the server's `PREFIX`
//! - Per-channel serialization; channels never block each other
//! - Votes follow nick changes
//! - Optional SQLite storage for rosters and meeting minutes
//!
//! The transport is not part of this crate. It feeds membership events and
//! commands into an [`Engine`] and carries out the [`Outbound`] actions the
//! engine emits.
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_motions::{Config, Engine, EngineParams, IdentityResolver, WhoisReply};
//! use slirc_motions::casemap::CaseMapper;
//! use slirc_motions::db::NoOpStore;
//! use slirc_motions::hostmask::Hostmask;
//! use slirc_motions::state::MemberTable;
//! use std::sync::Arc;
//!
//! struct Offline;
//!
//! #[async_trait::async_trait]
//! impl IdentityResolver for Offline {
//!     async fn whois(&self, _nick: &str) -> WhoisReply {
//!         WhoisReply::not_found()
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = Config::default();
//! let mapper = Arc::new(CaseMapper::default());
//! let members = Arc::new(MemberTable::new(Arc::clone(&mapper)));
//! let (engine, mut outbound) = Engine::new(EngineParams {
//!     config: &config,
//!     mapper,
//!     membership: members.clone(),
//!     resolver: Arc::new(Offline),
//!     store: Arc::new(NoOpStore),
//! });
//!
//! let me = Hostmask::parse("motionbot!bot@example.org").unwrap();
//! engine.on_join(&me, "#coop").await.unwrap();
//! members.add_member("#coop", "chair", "@");
//!
//! engine.start_meeting("chair", "#coop").await.unwrap();
//! assert!(outbound.try_recv().is_ok());
//! # }
//! ```

pub mod casemap;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod hostmask;
pub mod isupport;
pub mod permissions;
pub mod roster;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use engine::{Engine, EngineParams, IdentityResolver, JoinOutcome, Outbound, WhoisReply};
pub use error::{MotionError, MotionResult};
