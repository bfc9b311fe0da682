//! Data access and oracle adapters for the Helpmatch engine.
//!
//! Responsibilities:
//! - Implement [`helpmatch_core::Similarity`] on top of a text oracle
//!   ([`oracle`]).
//! - Speak the Gemini `generateContent` HTTP API.
//! - Load task and requester snapshots from JSON ([`SnapshotSource`]).
//!
//! Boundaries:
//! - Do not encode ranking rules (live in `helpmatch-core` and
//!   `helpmatch-ranker`).
//! - Keep blocking I/O off async executors; snapshots load before ranking.
//!
//! Invariants:
//! - One oracle request per similarity call; no retries.
//! - No global mutable state.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod oracle;
mod snapshot;

pub use snapshot::{SnapshotError, SnapshotSource};
