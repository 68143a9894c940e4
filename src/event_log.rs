use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ConferenceEvent, EventBatch, RegistrationEvent, Result, RoomsEvent, Stamped};

/// The `EventLog` struct holds everything that happened to the registration of one conference.
///
/// It keeps three ordered, append-only streams: conference configuration, registration and
/// rooms. The log is the unit that gets loaded and saved as a whole, and `version` is the token
/// the persistence layer compares on save to detect concurrent writers. Nothing in this crate
/// besides an [`crate::EventLogStore`] implementation should touch `version`.
///
/// State is never stored directly: read models fold over these streams on demand, and removal
/// is expressed by appending compensating events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLog {
    /// The ID of the conference the log belongs to.
    pub conference_id: Uuid,

    /// The version of the persisted log this snapshot was loaded from.
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    conference_events: Vec<Stamped<ConferenceEvent>>,

    #[serde(default)]
    registration_events: Vec<Stamped<RegistrationEvent>>,

    #[serde(default)]
    room_events: Vec<Stamped<RoomsEvent>>,
}

impl EventLog {
    /// Creates an empty log for a conference that has no history yet.
    pub fn new(conference_id: Uuid) -> Self {
        Self {
            conference_id,
            ..Self::default()
        }
    }

    pub fn conference_events(&self) -> &[Stamped<ConferenceEvent>] {
        &self.conference_events
    }

    pub fn registration_events(&self) -> &[Stamped<RegistrationEvent>] {
        &self.registration_events
    }

    pub fn room_events(&self) -> &[Stamped<RoomsEvent>] {
        &self.room_events
    }

    pub fn is_empty(&self) -> bool {
        self.conference_events.is_empty()
            && self.registration_events.is_empty()
            && self.room_events.is_empty()
    }

    pub fn append_conference_events(
        &mut self,
        events: impl IntoIterator<Item = ConferenceEvent>,
        at: DateTime<Utc>,
    ) {
        self.conference_events
            .extend(events.into_iter().map(|event| Stamped::new(event, at)));
    }

    pub fn append_registration_events(
        &mut self,
        events: impl IntoIterator<Item = RegistrationEvent>,
        at: DateTime<Utc>,
    ) {
        self.registration_events
            .extend(events.into_iter().map(|event| Stamped::new(event, at)));
    }

    pub fn append_room_events(
        &mut self,
        events: impl IntoIterator<Item = RoomsEvent>,
        at: DateTime<Utc>,
    ) {
        self.room_events
            .extend(events.into_iter().map(|event| Stamped::new(event, at)));
    }

    /// Appends every stream of a batch, stamping all events with the same moment.
    pub fn append(&mut self, batch: EventBatch, at: DateTime<Utc>) {
        self.append_conference_events(batch.conference, at);
        self.append_registration_events(batch.registration, at);
        self.append_room_events(batch.rooms, at);
    }

    /// Serializes the log into its persisted JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a log from its persisted JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
