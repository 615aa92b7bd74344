//! Voxport - voice commands for data dashboards
//!
//! Voxport turns recognized speech into application actions and keeps
//! analytics about how well that works.
//!
//! ## Components
//!
//! 1. **Voice engine** ([`voice`]): a listening state machine around a host
//!    speech adapter, a first-match command registry and a dispatcher that
//!    never lets a failing command escape.
//!
//! 2. **Analytics** ([`stats`]): a bounded event log and session history,
//!    usage snapshots with trends, and rule-based optimization hints,
//!    persisted to SQLite.

pub mod config;
pub mod stats;
pub mod voice;
