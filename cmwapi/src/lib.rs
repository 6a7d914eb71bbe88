//! cmwapi - Typed message channels for interoperating map widgets
//!
//! Map widgets on a shared dashboard talk over a publish/subscribe bus using
//! a fixed set of `map.*` topics. This library provides the pieces a widget
//! needs to take part:
//!
//! - [`channel`]: one schema-enforcing channel per topic, with defaulting,
//!   validation and aggregated `map.error` reports
//! - [`registry`]: the overlay/feature forest a map widget maintains
//! - [`extent`]: extent and camera altitude calculations
//! - [`adapter`]: binds inbound channels to a registry and render engine
//!
//! # High-Level API
//!
//! ```
//! use cmwapi::adapter::MapAdapter;
//! use cmwapi::channel::{ChannelSet, FeaturePlotUrl};
//! use cmwapi::config::ConfigFile;
//! use cmwapi::render::MemoryRenderEngine;
//! use cmwapi::transport::InMemoryBus;
//!
//! let bus = InMemoryBus::new();
//! let map = MapAdapter::from_config(bus.connect("map"), MemoryRenderEngine::new(), &ConfigFile::default());
//! map.attach();
//!
//! let planner = ChannelSet::new(bus.connect("planner"));
//! planner
//!     .feature_plot_url
//!     .send_one(FeaturePlotUrl::new("radar", "http://example.com/radar.kml").in_overlay("weather"))
//!     .unwrap();
//!
//! assert!(map.registry().lock().feature("weather", "radar").is_some());
//! ```

pub mod adapter;
pub mod channel;
pub mod config;
pub mod coord;
pub mod extent;
pub mod logging;
pub mod registry;
pub mod render;
pub mod transport;
pub mod validator;

/// Version of the cmwapi library.
///
/// Reported on `map.status.about` unless configured otherwise.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
