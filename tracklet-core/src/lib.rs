//! # tracklet-core
//!
//! Core library for tracklet - a client for sending analytics events to an
//! ingestion endpoint.
//!
//! This library provides:
//! - Event clients, blocking ([`EventClient`]) and async ([`AsyncEventClient`])
//! - The event description and its JSON wire body
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use tracklet_core::{Config, EventClient, TrackEvent};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Send an event
//! let client = EventClient::new(config.client).expect("invalid client config");
//! client.track(&TrackEvent::new("ping")).expect("failed to track event");
//! ```

// Re-export commonly used items at the crate root
pub use config::{ClientConfig, Config};
pub use error::{Error, Result};
pub use tracking::{AsyncEventClient, EventClient, TrackEvent};

// Public modules
pub mod config;
pub mod error;
pub mod logging;
pub mod tracking;
