//! Event tracking client
//!
//! Sends analytics events to an ingestion endpoint, one HTTP request per
//! event.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tracklet_core::{ClientConfig, EventClient, TrackEvent};
//!
//! let config = ClientConfig::new("https://api.example.com", "sdk_xxxxxxxx")
//!     .with_default_subject_id("billing-worker");
//! let client = EventClient::new(config)?;
//!
//! client.track(&TrackEvent::new("signup").subject_id("u1").property("plan", "pro"))?;
//! # Ok::<(), tracklet_core::Error>(())
//! ```
//!
//! Async code uses [`AsyncEventClient`], which has the same contract with an
//! `async fn track`.

mod blocking;
mod client;
mod events;

pub use blocking::EventClient;
pub use client::{AsyncEventClient, EVENTS_PATH};
pub use events::{EventBody, TrackEvent};
