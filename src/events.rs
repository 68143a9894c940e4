use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Duration, MemberId, RoomType, SessionId};

/// The `Stamped` struct wraps a domain event with the moment it was appended to the log.
///
/// Its serialized form is flat: the kind discriminator and the event fields sit next to the
/// `timestamp`, e.g. `{"event": "ROOM_QUOTA_WAS_SET", "timestamp": "...", "roomType": "single", "quota": 10}`.
///
/// Timestamps are attached by [`crate::EventLog`] when events are appended, so command
/// processors only ever produce bare events and comparisons can ignore the stamp by looking
/// at `event` alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stamped<E> {
    #[serde(flatten)]
    pub event: E,

    pub timestamp: DateTime<Utc>,
}

impl<E: DomainEvent> Stamped<E> {
    pub fn new(event: E, timestamp: DateTime<Utc>) -> Self {
        Self { event, timestamp }
    }
}

/// The `DomainEvent` trait is implemented by the event type of each stream.
///
/// Each stream is a closed enum, so every fold over it matches exhaustively and a new kind has
/// to be handled everywhere before the crate compiles again.
pub trait DomainEvent: Serialize + DeserializeOwned + Clone {
    /// Gets the wire name of the event kind.
    fn kind(&self) -> &'static str;
}

/// Events of the conference configuration stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ConferenceEvent {
    RoomQuotaWasSet { room_type: RoomType, quota: u32 },
}

impl DomainEvent for ConferenceEvent {
    fn kind(&self) -> &'static str {
        match self {
            ConferenceEvent::RoomQuotaWasSet { .. } => "ROOM_QUOTA_WAS_SET",
        }
    }
}

/// Events of the registration stream: reservations, participants and the waitlist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum RegistrationEvent {
    ReservationWasIssued {
        session_id: SessionId,
        room_type: RoomType,
        duration: Duration,
    },
    ParticipantWasRegistered {
        session_id: Option<SessionId>,
        member_id: MemberId,
        room_type: RoomType,
        duration: Duration,
    },
    RoomTypeWasChanged {
        member_id: MemberId,
        room_type: RoomType,
        duration: Duration,
    },
    DidNotChangeRoomTypeForNonParticipant {
        member_id: MemberId,
        room_type: RoomType,
    },
    DurationWasChanged {
        member_id: MemberId,
        room_type: RoomType,
        duration: Duration,
    },
    DidNotChangeDurationForNonParticipant {
        member_id: MemberId,
        duration: Duration,
    },
    ParticipantWasRemoved {
        member_id: MemberId,
    },
    DidNotRemoveParticipantBecauseTheyAreNotRegistered {
        member_id: MemberId,
    },
    WaitlistReservationWasIssued {
        session_id: SessionId,
        desired_room_types: Vec<RoomType>,
    },
    WaitlistParticipantWasRegistered {
        session_id: Option<SessionId>,
        member_id: MemberId,
        desired_room_types: Vec<RoomType>,
    },
    DesiredRoomTypesWereChanged {
        member_id: MemberId,
        desired_room_types: Vec<RoomType>,
    },
    DidNotChangeDesiredRoomTypesForNonWaitlistParticipant {
        member_id: MemberId,
        desired_room_types: Vec<RoomType>,
    },
    WaitlistParticipantWasRemoved {
        member_id: MemberId,
    },
    DidNotRemoveWaitlistParticipantBecauseTheyAreNotOnWaitlist {
        member_id: MemberId,
    },
    RegisteredParticipantFromWaitlist {
        member_id: MemberId,
        room_type: RoomType,
        duration: Duration,
    },
    DidNotRegisterParticipantFromWaitlistBecauseTheyAreNotOnWaitlist {
        member_id: MemberId,
        room_type: RoomType,
    },
}

impl DomainEvent for RegistrationEvent {
    fn kind(&self) -> &'static str {
        use RegistrationEvent::*;

        match self {
            ReservationWasIssued { .. } => "RESERVATION_WAS_ISSUED",
            ParticipantWasRegistered { .. } => "PARTICIPANT_WAS_REGISTERED",
            RoomTypeWasChanged { .. } => "ROOM_TYPE_WAS_CHANGED",
            DidNotChangeRoomTypeForNonParticipant { .. } => {
                "DID_NOT_CHANGE_ROOM_TYPE_FOR_NON_PARTICIPANT"
            }
            DurationWasChanged { .. } => "DURATION_WAS_CHANGED",
            DidNotChangeDurationForNonParticipant { .. } => {
                "DID_NOT_CHANGE_DURATION_FOR_NON_PARTICIPANT"
            }
            ParticipantWasRemoved { .. } => "PARTICIPANT_WAS_REMOVED",
            DidNotRemoveParticipantBecauseTheyAreNotRegistered { .. } => {
                "DID_NOT_REMOVE_PARTICIPANT_BECAUSE_THEY_ARE_NOT_REGISTERED"
            }
            WaitlistReservationWasIssued { .. } => "WAITLIST_RESERVATION_WAS_ISSUED",
            WaitlistParticipantWasRegistered { .. } => "WAITLIST_PARTICIPANT_WAS_REGISTERED",
            DesiredRoomTypesWereChanged { .. } => "DESIRED_ROOM_TYPES_WERE_CHANGED",
            DidNotChangeDesiredRoomTypesForNonWaitlistParticipant { .. } => {
                "DID_NOT_CHANGE_DESIRED_ROOM_TYPES_FOR_NON_WAITLIST_PARTICIPANT"
            }
            WaitlistParticipantWasRemoved { .. } => "WAITLIST_PARTICIPANT_WAS_REMOVED",
            DidNotRemoveWaitlistParticipantBecauseTheyAreNotOnWaitlist { .. } => {
                "DID_NOT_REMOVE_WAITLIST_PARTICIPANT_BECAUSE_THEY_ARE_NOT_ON_WAITLIST"
            }
            RegisteredParticipantFromWaitlist { .. } => "REGISTERED_PARTICIPANT_FROM_WAITLIST",
            DidNotRegisterParticipantFromWaitlistBecauseTheyAreNotOnWaitlist { .. } => {
                "DID_NOT_REGISTER_PARTICIPANT_FROM_WAITLIST_BECAUSE_THEY_ARE_NOT_ON_WAITLIST"
            }
        }
    }
}

/// Events of the room stream: pairing of participants in shareable rooms.
///
/// Invalid pairing commands are recorded too, as `DidNot...` events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum RoomsEvent {
    RoomPairWasAdded {
        room_type: RoomType,
        participant1_id: MemberId,
        participant2_id: MemberId,
    },
    RoomPairWasRemoved {
        room_type: RoomType,
        participant1_id: MemberId,
        participant2_id: MemberId,
    },
    RoomPairContainingAParticipantWasRemoved {
        room_type: RoomType,
        member_id_to_be_removed: MemberId,
        participant1_id: MemberId,
        participant2_id: MemberId,
    },
    DidNotAddRoomPairBecauseParticipantIsNotInRoomType {
        room_type: RoomType,
        member_id: Option<MemberId>,
    },
    DidNotAddRoomPairBecauseParticipantIsPairedWithThemselves {
        room_type: RoomType,
        member_id: MemberId,
    },
    DidNotAddRoomPairBecauseParticipantIsAlreadyInRoom {
        room_type: RoomType,
        member_id: MemberId,
    },
    DidNotRemoveRoomPairBecauseThePairDoesNotExistForThisRoomType {
        room_type: RoomType,
        participant1_id: MemberId,
        participant2_id: MemberId,
    },
}

impl DomainEvent for RoomsEvent {
    fn kind(&self) -> &'static str {
        use RoomsEvent::*;

        match self {
            RoomPairWasAdded { .. } => "ROOM_PAIR_WAS_ADDED",
            RoomPairWasRemoved { .. } => "ROOM_PAIR_WAS_REMOVED",
            RoomPairContainingAParticipantWasRemoved { .. } => {
                "ROOM_PAIR_CONTAINING_A_PARTICIPANT_WAS_REMOVED"
            }
            DidNotAddRoomPairBecauseParticipantIsNotInRoomType { .. } => {
                "DID_NOT_ADD_ROOM_PAIR_BECAUSE_PARTICIPANT_IS_NOT_IN_ROOM_TYPE"
            }
            DidNotAddRoomPairBecauseParticipantIsPairedWithThemselves { .. } => {
                "DID_NOT_ADD_ROOM_PAIR_BECAUSE_PARTICIPANT_IS_PAIRED_WITH_THEMSELVES"
            }
            DidNotAddRoomPairBecauseParticipantIsAlreadyInRoom { .. } => {
                "DID_NOT_ADD_ROOM_PAIR_BECAUSE_PARTICIPANT_IS_ALREADY_IN_ROOM"
            }
            DidNotRemoveRoomPairBecauseThePairDoesNotExistForThisRoomType { .. } => {
                "DID_NOT_REMOVE_ROOM_PAIR_BECAUSE_THE_PAIR_DOES_NOT_EXIST_FOR_THIS_ROOM_TYPE"
            }
        }
    }
}

/// Events decided by one command, for every stream, appended and saved together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventBatch {
    pub conference: Vec<ConferenceEvent>,
    pub registration: Vec<RegistrationEvent>,
    pub rooms: Vec<RoomsEvent>,
}

impl EventBatch {
    pub fn from_conference(events: Vec<ConferenceEvent>) -> Self {
        Self {
            conference: events,
            ..Self::default()
        }
    }

    pub fn from_registration(events: Vec<RegistrationEvent>) -> Self {
        Self {
            registration: events,
            ..Self::default()
        }
    }

    pub fn from_rooms(events: Vec<RoomsEvent>) -> Self {
        Self {
            rooms: events,
            ..Self::default()
        }
    }

    pub fn with_rooms(mut self, events: Vec<RoomsEvent>) -> Self {
        self.rooms.extend(events);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conference.is_empty() && self.registration.is_empty() && self.rooms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conference.len() + self.registration.len() + self.rooms.len()
    }

    /// Wire names of all events in the batch, stream by stream.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.conference
            .iter()
            .map(DomainEvent::kind)
            .chain(self.registration.iter().map(DomainEvent::kind))
            .chain(self.rooms.iter().map(DomainEvent::kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn stamped_events_serialize_flat_with_kind_and_timestamp() {
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let stamped = Stamped::new(
            RegistrationEvent::ParticipantWasRegistered {
                session_id: Some("session-1".to_string()),
                member_id: "member-1".to_string(),
                room_type: RoomType::BedInDouble,
                duration: Duration(3),
            },
            timestamp,
        );

        let value = serde_json::to_value(&stamped).unwrap();

        assert_eq!(
            value,
            json!({
                "event": "PARTICIPANT_WAS_REGISTERED",
                "timestamp": "2026-03-01T10:00:00Z",
                "sessionId": "session-1",
                "memberId": "member-1",
                "roomType": "bed_in_double",
                "duration": 3
            })
        );

        let parsed: Stamped<RegistrationEvent> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, stamped);
    }

    #[test]
    fn kind_matches_the_serialized_discriminator() {
        let events = vec![
            RoomsEvent::RoomPairWasAdded {
                room_type: RoomType::BedInJunior,
                participant1_id: "a".to_string(),
                participant2_id: "b".to_string(),
            },
            RoomsEvent::DidNotAddRoomPairBecauseParticipantIsNotInRoomType {
                room_type: RoomType::BedInJunior,
                member_id: None,
            },
        ];

        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.kind());
        }
    }

    #[test]
    fn batch_lists_kinds_stream_by_stream() {
        let batch = EventBatch::from_registration(vec![RegistrationEvent::ParticipantWasRemoved {
            member_id: "a".to_string(),
        }])
        .with_rooms(vec![RoomsEvent::RoomPairContainingAParticipantWasRemoved {
            room_type: RoomType::BedInDouble,
            member_id_to_be_removed: "a".to_string(),
            participant1_id: "a".to_string(),
            participant2_id: "b".to_string(),
        }]);

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.kinds(),
            vec![
                "PARTICIPANT_WAS_REMOVED",
                "ROOM_PAIR_CONTAINING_A_PARTICIPANT_WAS_REMOVED"
            ]
        );
    }
}
