//! Overlay/feature registry
//!
//! A forest of overlays, each holding features plotted through the render
//! engine. All mutation goes through [`Registry`]; every change to tree
//! shape, membership or visibility is announced as a [`TreeChanged`] on a
//! tokio broadcast channel.
//!
//! # Example
//!
//! ```
//! use cmwapi::registry::{PlotOptions, Registry};
//! use cmwapi::render::MemoryRenderEngine;
//!
//! let mut registry = Registry::new(MemoryRenderEngine::new());
//! registry.create_overlay("w", "tracks", Some("Tracks"), None).unwrap();
//! registry
//!     .plot_feature_url("w", "tracks", "t1", PlotOptions::new("kml"), "http://host/t1.kml", None)
//!     .unwrap();
//! registry.process_load_events();
//!
//! assert!(registry.feature("tracks", "t1").is_some());
//! ```

mod error;
mod registry;
mod types;

pub use error::RegistryError;
pub use registry::{Registry, DEFAULT_EVENT_CAPACITY};
pub use types::{Feature, FeatureFormat, FeatureSource, Overlay, PlotOptions, TreeChanged};
