//! Event description and wire body for the ingestion API
//!
//! A [`TrackEvent`] is what callers build; an [`EventBody`] is the exact JSON
//! object posted to `/api/sdk/events`:
//!
//! ```text
//! {"event": "signup", "userId": "u1", "properties": {"plan": "pro"}, "occurredAt": "2025-03-01T12:00:00Z"}
//! ```
//!
//! `userId` is always present (null when no subject is known), `properties` is
//! always an object, and `occurredAt` only appears when a timestamp was given.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;
use serde_json::{Map, Value};

/// A single analytics event to send
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackEvent {
    /// Event name (e.g. `signup`); must not be empty
    pub event: String,

    /// Actor the event is attributed to; falls back to the client default
    pub subject_id: Option<String>,

    /// Event-specific attributes
    pub properties: Map<String, Value>,

    /// When the event happened, if not "now"
    pub occurred_at: Option<DateTime<FixedOffset>>,
}

impl TrackEvent {
    /// Create an event with just a name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Default::default()
        }
    }

    /// Attribute the event to a subject
    pub fn subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Set a single property, replacing any previous value for `key`
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Merge several properties into the event
    pub fn properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.properties.extend(
            properties
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        self
    }

    /// Record when the event actually happened
    ///
    /// Accepts any offset-carrying timestamp, e.g. `DateTime<Utc>`.
    pub fn occurred_at(mut self, occurred_at: impl Into<DateTime<FixedOffset>>) -> Self {
        self.occurred_at = Some(occurred_at.into());
        self
    }

    /// Build the request body, resolving the subject against `default_subject_id`
    pub fn to_body<'a>(&'a self, default_subject_id: Option<&'a str>) -> EventBody<'a> {
        EventBody {
            event: &self.event,
            user_id: self.subject_id.as_deref().or(default_subject_id),
            properties: &self.properties,
            occurred_at: self.occurred_at.as_ref().map(format_timestamp),
        }
    }
}

/// Request body for POST /api/sdk/events
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventBody<'a> {
    pub event: &'a str,
    pub user_id: Option<&'a str>,
    pub properties: &'a Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<String>,
}

/// RFC 3339 with the offset spelled out, `Z` for UTC
fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
