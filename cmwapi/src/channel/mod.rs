//! Typed, validated publish/subscribe channels.
//!
//! Every protocol topic is served by the same generic [`Channel`],
//! parameterized by the record type that holds the topic's rules:
//!
//! ```text
//! send(records) ──► defaults ──► validate ──► publish on topic
//!                                   │
//!                                   └─ any violation ──► one report on map.error
//!
//! transport ──► parse payload ──► list ──► decode ──► defaults ──► validate ──► handler
//!                                                                      │
//!                                     any violation (all-or-nothing) ──┘──► map.error
//! ```
//!
//! # Components
//!
//! - [`topic`] - topic names
//! - [`messages`] - per-topic record schemas and their default/required rules
//! - [`payload`] - single/array and string/structured wire codec
//! - [`ChannelSet`] - one channel per topic for a widget

mod channel;
pub mod messages;
pub mod payload;
mod set;
mod topic;

pub use channel::{Channel, ChannelError, Subscription};
pub use messages::*;
pub use set::ChannelSet;
pub use topic::Topic;

pub(crate) use channel::report_rejection;
