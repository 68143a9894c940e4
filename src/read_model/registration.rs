use std::{collections::BTreeMap, rc::Rc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ConferenceConfigReadModel, Duration, EventLog, Memoized, MemberId, RegistrationEvent,
    RoomType, SessionId, Settings,
};

/// A session-scoped hold on one slot of a room type, valid for the registration period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub session_id: SessionId,
    pub room_type: RoomType,
    pub duration: Duration,
    pub issued_at: DateTime<Utc>,
}

/// A confirmed registration of a member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub member_id: MemberId,
    pub room_type: RoomType,
    pub duration: Duration,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistReservation {
    pub session_id: SessionId,
    pub desired_room_types: Vec<RoomType>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistParticipant {
    pub member_id: MemberId,
    pub desired_room_types: Vec<RoomType>,
    pub joined_at: DateTime<Utc>,
}

/// Something that takes up a slot of a room type's quota.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Occupant {
    Reservation(Reservation),
    Participant(Participant),
}

/// The `RegistrationReadModel` answers "is there room?" and "who is registered?" for one
/// snapshot of the event log.
///
/// Every query folds over the registration stream and is memoized for the lifetime of the read
/// model, so a command touching several queries only pays for each fold once. Reservation
/// expiry is evaluated against `now`, fixed at construction: an expired reservation is simply
/// left out of every projection.
#[derive(Debug)]
pub struct RegistrationReadModel<'a> {
    log: &'a EventLog,
    now: DateTime<Utc>,
    settings: &'a Settings,
    conference: ConferenceConfigReadModel<'a>,

    reservations: Memoized<BTreeMap<SessionId, Reservation>>,
    participants: Memoized<BTreeMap<MemberId, Participant>>,
    waitlist_reservations: Memoized<BTreeMap<SessionId, WaitlistReservation>>,
    waitlist_participants: Memoized<BTreeMap<MemberId, WaitlistParticipant>>,

    reservations_for: Memoized<BTreeMap<SessionId, Reservation>>,
    participants_for: Memoized<BTreeMap<MemberId, Participant>>,
    waitlist_reservations_for: Memoized<BTreeMap<SessionId, WaitlistReservation>>,
    waitlist_participants_for: Memoized<BTreeMap<MemberId, WaitlistParticipant>>,
    occupants_for: Memoized<Vec<Occupant>>,
}

impl<'a> RegistrationReadModel<'a> {
    pub fn new(log: &'a EventLog, now: DateTime<Utc>, settings: &'a Settings) -> Self {
        Self {
            log,
            now,
            settings,
            conference: ConferenceConfigReadModel::new(log),
            reservations: Memoized::new("reservations_by_session_id"),
            participants: Memoized::new("participants_by_member_id"),
            waitlist_reservations: Memoized::new("waitlist_reservations_by_session_id"),
            waitlist_participants: Memoized::new("waitlist_participants_by_member_id"),
            reservations_for: Memoized::new("reservations_by_session_id_for"),
            participants_for: Memoized::new("participants_by_member_id_for"),
            waitlist_reservations_for: Memoized::new("waitlist_reservations_by_session_id_for"),
            waitlist_participants_for: Memoized::new("waitlist_participants_by_member_id_for"),
            occupants_for: Memoized::new("reservations_and_participants_for"),
        }
    }

    pub fn log(&self) -> &'a EventLog {
        self.log
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn conference(&self) -> &ConferenceConfigReadModel<'a> {
        &self.conference
    }

    fn is_fresh(&self, issued_at: DateTime<Utc>) -> bool {
        self.now - issued_at < self.settings.registration_period()
    }

    pub fn reservations_by_session_id(&self) -> Rc<BTreeMap<SessionId, Reservation>> {
        use RegistrationEvent::*;

        self.reservations.get_or_compute(&(), || {
            let mut reservations = BTreeMap::new();

            for stamped in self.log.registration_events() {
                match &stamped.event {
                    ReservationWasIssued {
                        session_id,
                        room_type,
                        duration,
                    } if self.is_fresh(stamped.timestamp) => {
                        reservations.insert(
                            session_id.clone(),
                            Reservation {
                                session_id: session_id.clone(),
                                room_type: *room_type,
                                duration: *duration,
                                issued_at: stamped.timestamp,
                            },
                        );
                    }
                    ParticipantWasRegistered {
                        session_id: Some(session_id),
                        ..
                    } => {
                        reservations.remove(session_id);
                    }
                    ReservationWasIssued { .. }
                    | ParticipantWasRegistered { .. }
                    | RoomTypeWasChanged { .. }
                    | DidNotChangeRoomTypeForNonParticipant { .. }
                    | DurationWasChanged { .. }
                    | DidNotChangeDurationForNonParticipant { .. }
                    | ParticipantWasRemoved { .. }
                    | DidNotRemoveParticipantBecauseTheyAreNotRegistered { .. }
                    | WaitlistReservationWasIssued { .. }
                    | WaitlistParticipantWasRegistered { .. }
                    | DesiredRoomTypesWereChanged { .. }
                    | DidNotChangeDesiredRoomTypesForNonWaitlistParticipant { .. }
                    | WaitlistParticipantWasRemoved { .. }
                    | DidNotRemoveWaitlistParticipantBecauseTheyAreNotOnWaitlist { .. }
                    | RegisteredParticipantFromWaitlist { .. }
                    | DidNotRegisterParticipantFromWaitlistBecauseTheyAreNotOnWaitlist { .. } => {}
                }
            }

            reservations
        })
    }

    pub fn participants_by_member_id(&self) -> Rc<BTreeMap<MemberId, Participant>> {
        use RegistrationEvent::*;

        self.participants.get_or_compute(&(), || {
            let mut participants: BTreeMap<MemberId, Participant> = BTreeMap::new();

            for stamped in self.log.registration_events() {
                match &stamped.event {
                    ParticipantWasRegistered {
                        member_id,
                        room_type,
                        duration,
                        ..
                    }
                    | RegisteredParticipantFromWaitlist {
                        member_id,
                        room_type,
                        duration,
                    } => {
                        participants.insert(
                            member_id.clone(),
                            Participant {
                                member_id: member_id.clone(),
                                room_type: *room_type,
                                duration: *duration,
                                joined_at: stamped.timestamp,
                            },
                        );
                    }
                    RoomTypeWasChanged {
                        member_id,
                        room_type,
                        duration,
                    }
                    | DurationWasChanged {
                        member_id,
                        room_type,
                        duration,
                    } => {
                        let joined_at = participants
                            .get(member_id)
                            .map_or(stamped.timestamp, |existing| existing.joined_at);
                        participants.insert(
                            member_id.clone(),
                            Participant {
                                member_id: member_id.clone(),
                                room_type: *room_type,
                                duration: *duration,
                                joined_at,
                            },
                        );
                    }
                    ParticipantWasRemoved { member_id } => {
                        participants.remove(member_id);
                    }
                    ReservationWasIssued { .. }
                    | DidNotChangeRoomTypeForNonParticipant { .. }
                    | DidNotChangeDurationForNonParticipant { .. }
                    | DidNotRemoveParticipantBecauseTheyAreNotRegistered { .. }
                    | WaitlistReservationWasIssued { .. }
                    | WaitlistParticipantWasRegistered { .. }
                    | DesiredRoomTypesWereChanged { .. }
                    | DidNotChangeDesiredRoomTypesForNonWaitlistParticipant { .. }
                    | WaitlistParticipantWasRemoved { .. }
                    | DidNotRemoveWaitlistParticipantBecauseTheyAreNotOnWaitlist { .. }
                    | DidNotRegisterParticipantFromWaitlistBecauseTheyAreNotOnWaitlist { .. } => {}
                }
            }

            participants
        })
    }

    pub fn waitlist_reservations_by_session_id(
        &self,
    ) -> Rc<BTreeMap<SessionId, WaitlistReservation>> {
        use RegistrationEvent::*;

        self.waitlist_reservations.get_or_compute(&(), || {
            let mut reservations = BTreeMap::new();

            for stamped in self.log.registration_events() {
                match &stamped.event {
                    WaitlistReservationWasIssued {
                        session_id,
                        desired_room_types,
                    } if self.is_fresh(stamped.timestamp) => {
                        reservations.insert(
                            session_id.clone(),
                            WaitlistReservation {
                                session_id: session_id.clone(),
                                desired_room_types: desired_room_types.clone(),
                                issued_at: stamped.timestamp,
                            },
                        );
                    }
                    WaitlistParticipantWasRegistered {
                        session_id: Some(session_id),
                        ..
                    } => {
                        reservations.remove(session_id);
                    }
                    ReservationWasIssued { .. }
                    | ParticipantWasRegistered { .. }
                    | RoomTypeWasChanged { .. }
                    | DidNotChangeRoomTypeForNonParticipant { .. }
                    | DurationWasChanged { .. }
                    | DidNotChangeDurationForNonParticipant { .. }
                    | ParticipantWasRemoved { .. }
                    | DidNotRemoveParticipantBecauseTheyAreNotRegistered { .. }
                    | WaitlistReservationWasIssued { .. }
                    | WaitlistParticipantWasRegistered { .. }
                    | DesiredRoomTypesWereChanged { .. }
                    | DidNotChangeDesiredRoomTypesForNonWaitlistParticipant { .. }
                    | WaitlistParticipantWasRemoved { .. }
                    | DidNotRemoveWaitlistParticipantBecauseTheyAreNotOnWaitlist { .. }
                    | RegisteredParticipantFromWaitlist { .. }
                    | DidNotRegisterParticipantFromWaitlistBecauseTheyAreNotOnWaitlist { .. } => {}
                }
            }

            reservations
        })
    }

    pub fn waitlist_participants_by_member_id(
        &self,
    ) -> Rc<BTreeMap<MemberId, WaitlistParticipant>> {
        use RegistrationEvent::*;

        self.waitlist_participants.get_or_compute(&(), || {
            let mut participants: BTreeMap<MemberId, WaitlistParticipant> = BTreeMap::new();

            for stamped in self.log.registration_events() {
                match &stamped.event {
                    WaitlistParticipantWasRegistered {
                        member_id,
                        desired_room_types,
                        ..
                    } => {
                        participants.insert(
                            member_id.clone(),
                            WaitlistParticipant {
                                member_id: member_id.clone(),
                                desired_room_types: desired_room_types.clone(),
                                joined_at: stamped.timestamp,
                            },
                        );
                    }
                    DesiredRoomTypesWereChanged {
                        member_id,
                        desired_room_types,
                    } => {
                        let joined_at = participants
                            .get(member_id)
                            .map_or(stamped.timestamp, |existing| existing.joined_at);
                        participants.insert(
                            member_id.clone(),
                            WaitlistParticipant {
                                member_id: member_id.clone(),
                                desired_room_types: desired_room_types.clone(),
                                joined_at,
                            },
                        );
                    }
                    // Promotion takes the member off the waitlist.
                    WaitlistParticipantWasRemoved { member_id }
                    | RegisteredParticipantFromWaitlist { member_id, .. } => {
                        participants.remove(member_id);
                    }
                    ReservationWasIssued { .. }
                    | ParticipantWasRegistered { .. }
                    | RoomTypeWasChanged { .. }
                    | DidNotChangeRoomTypeForNonParticipant { .. }
                    | DurationWasChanged { .. }
                    | DidNotChangeDurationForNonParticipant { .. }
                    | ParticipantWasRemoved { .. }
                    | DidNotRemoveParticipantBecauseTheyAreNotRegistered { .. }
                    | WaitlistReservationWasIssued { .. }
                    | DidNotChangeDesiredRoomTypesForNonWaitlistParticipant { .. }
                    | DidNotRemoveWaitlistParticipantBecauseTheyAreNotOnWaitlist { .. }
                    | DidNotRegisterParticipantFromWaitlistBecauseTheyAreNotOnWaitlist { .. } => {}
                }
            }

            participants
        })
    }

    pub fn reservations_by_session_id_for(
        &self,
        room_type: RoomType,
    ) -> Rc<BTreeMap<SessionId, Reservation>> {
        self.reservations_for.get_or_compute(&room_type, || {
            self.reservations_by_session_id()
                .iter()
                .filter(|(_, reservation)| reservation.room_type == room_type)
                .map(|(session_id, reservation)| (session_id.clone(), reservation.clone()))
                .collect()
        })
    }

    pub fn participants_by_member_id_for(
        &self,
        room_type: RoomType,
    ) -> Rc<BTreeMap<MemberId, Participant>> {
        self.participants_for.get_or_compute(&room_type, || {
            self.participants_by_member_id()
                .iter()
                .filter(|(_, participant)| participant.room_type == room_type)
                .map(|(member_id, participant)| (member_id.clone(), participant.clone()))
                .collect()
        })
    }

    pub fn waitlist_reservations_by_session_id_for(
        &self,
        room_type: RoomType,
    ) -> Rc<BTreeMap<SessionId, WaitlistReservation>> {
        self.waitlist_reservations_for.get_or_compute(&room_type, || {
            self.waitlist_reservations_by_session_id()
                .iter()
                .filter(|(_, reservation)| reservation.desired_room_types.contains(&room_type))
                .map(|(session_id, reservation)| (session_id.clone(), reservation.clone()))
                .collect()
        })
    }

    pub fn waitlist_participants_by_member_id_for(
        &self,
        room_type: RoomType,
    ) -> Rc<BTreeMap<MemberId, WaitlistParticipant>> {
        self.waitlist_participants_for.get_or_compute(&room_type, || {
            self.waitlist_participants_by_member_id()
                .iter()
                .filter(|(_, participant)| participant.desired_room_types.contains(&room_type))
                .map(|(member_id, participant)| (member_id.clone(), participant.clone()))
                .collect()
        })
    }

    /// Active reservations and participants of a room type; its length is what counts against
    /// the quota.
    pub fn reservations_and_participants_for(&self, room_type: RoomType) -> Rc<Vec<Occupant>> {
        self.occupants_for.get_or_compute(&room_type, || {
            let reservations = self.reservations_by_session_id_for(room_type);
            let participants = self.participants_by_member_id_for(room_type);

            reservations
                .values()
                .cloned()
                .map(Occupant::Reservation)
                .chain(participants.values().cloned().map(Occupant::Participant))
                .collect()
        })
    }

    /// A room type without a quota has no capacity at all.
    pub fn is_full(&self, room_type: RoomType) -> bool {
        let quota = self.conference.quota_for(room_type).unwrap_or(0);
        quota as usize <= self.reservations_and_participants_for(room_type).len()
    }

    pub fn reservation(&self, session_id: &str) -> Option<Reservation> {
        self.reservations_by_session_id().get(session_id).cloned()
    }

    /// When the active reservation (or waitlist reservation) of a session runs out.
    pub fn reservation_expiration(&self, session_id: &str) -> Option<DateTime<Utc>> {
        let issued_at = self
            .reservations_by_session_id()
            .get(session_id)
            .map(|reservation| reservation.issued_at)
            .or_else(|| {
                self.waitlist_reservations_by_session_id()
                    .get(session_id)
                    .map(|reservation| reservation.issued_at)
            })?;

        issued_at.checked_add_signed(self.settings.registration_period())
    }

    pub fn participant(&self, member_id: &str) -> Option<Participant> {
        self.participants_by_member_id().get(member_id).cloned()
    }

    pub fn registered_room_type(&self, member_id: &str) -> Option<RoomType> {
        self.participants_by_member_id()
            .get(member_id)
            .map(|participant| participant.room_type)
    }

    pub fn is_already_registered(&self, member_id: &str) -> bool {
        self.participants_by_member_id().contains_key(member_id)
    }

    pub fn waitlist_participant(&self, member_id: &str) -> Option<WaitlistParticipant> {
        self.waitlist_participants_by_member_id()
            .get(member_id)
            .cloned()
    }

    pub fn is_already_on_waitlist(&self, member_id: &str) -> bool {
        self.waitlist_participants_by_member_id()
            .contains_key(member_id)
    }

    /// Drops every memoized projection, including the quota cache.
    pub fn flush(&self) {
        self.conference.flush();
        self.reservations.flush();
        self.participants.flush();
        self.waitlist_reservations.flush();
        self.waitlist_participants.flush();
        self.reservations_for.flush();
        self.participants_for.flush();
        self.waitlist_reservations_for.flush();
        self.waitlist_participants_for.flush();
        self.occupants_for.flush();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use uuid::Uuid;

    use super::*;
    use crate::ConferenceEvent;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    fn log_with_quota(room_type: RoomType, quota: u32) -> EventLog {
        let mut log = EventLog::new(Uuid::new_v4());
        log.append_conference_events(
            vec![ConferenceEvent::RoomQuotaWasSet { room_type, quota }],
            now() - TimeDelta::days(30),
        );
        log
    }

    fn reservation(session_id: &str, room_type: RoomType) -> RegistrationEvent {
        RegistrationEvent::ReservationWasIssued {
            session_id: session_id.to_string(),
            room_type,
            duration: Duration(2),
        }
    }

    fn registration(session_id: Option<&str>, member_id: &str, room_type: RoomType) -> RegistrationEvent {
        RegistrationEvent::ParticipantWasRegistered {
            session_id: session_id.map(str::to_string),
            member_id: member_id.to_string(),
            room_type,
            duration: Duration(2),
        }
    }

    #[test]
    fn fresh_reservations_are_counted_expired_ones_are_not() {
        let settings = Settings::default();
        let mut log = log_with_quota(RoomType::Single, 10);
        log.append_registration_events(
            vec![reservation("expired", RoomType::Single)],
            now() - TimeDelta::minutes(30),
        );
        log.append_registration_events(
            vec![reservation("fresh", RoomType::Single)],
            now() - TimeDelta::minutes(29),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);

        let reservations = model.reservations_by_session_id();
        assert_eq!(reservations.keys().collect::<Vec<_>>(), vec!["fresh"]);
        assert_eq!(
            model.reservation_expiration("fresh"),
            Some(now() + TimeDelta::minutes(1))
        );
        assert_eq!(model.reservation_expiration("expired"), None);
    }

    #[test]
    fn registration_supersedes_the_reservation_of_its_session() {
        let settings = Settings::default();
        let mut log = log_with_quota(RoomType::Single, 10);
        log.append_registration_events(
            vec![
                reservation("session-1", RoomType::Single),
                registration(Some("session-1"), "member-1", RoomType::Single),
            ],
            now() - TimeDelta::minutes(1),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);

        assert!(model.reservations_by_session_id().is_empty());
        assert_eq!(model.reservations_and_participants_for(RoomType::Single).len(), 1);
        assert!(model.is_already_registered("member-1"));
    }

    #[test]
    fn last_lifecycle_event_of_a_member_wins() {
        let settings = Settings::default();
        let mut log = log_with_quota(RoomType::Single, 10);
        let joined_at = now() - TimeDelta::days(2);
        log.append_registration_events(
            vec![registration(None, "member-1", RoomType::Single)],
            joined_at,
        );
        log.append_registration_events(
            vec![
                RegistrationEvent::RoomTypeWasChanged {
                    member_id: "member-1".to_string(),
                    room_type: RoomType::Junior,
                    duration: Duration(2),
                },
                RegistrationEvent::DurationWasChanged {
                    member_id: "member-1".to_string(),
                    room_type: RoomType::Junior,
                    duration: Duration(4),
                },
            ],
            now() - TimeDelta::days(1),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);

        assert_eq!(
            model.participant("member-1"),
            Some(Participant {
                member_id: "member-1".to_string(),
                room_type: RoomType::Junior,
                duration: Duration(4),
                joined_at,
            })
        );
        assert!(model.participants_by_member_id_for(RoomType::Single).is_empty());
    }

    #[test]
    fn registering_then_removing_leaves_participants_unchanged() {
        let settings = Settings::default();
        let mut log = log_with_quota(RoomType::Single, 10);
        log.append_registration_events(
            vec![registration(None, "member-1", RoomType::Single)],
            now() - TimeDelta::hours(1),
        );
        let before = RegistrationReadModel::new(&log, now(), &settings)
            .participants_by_member_id()
            .as_ref()
            .clone();

        log.append_registration_events(
            vec![
                registration(None, "member-2", RoomType::Single),
                RegistrationEvent::ParticipantWasRemoved {
                    member_id: "member-2".to_string(),
                },
            ],
            now(),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);
        assert_eq!(*model.participants_by_member_id(), before);
    }

    #[test]
    fn waitlist_is_matched_by_desired_room_type_and_left_on_promotion() {
        let settings = Settings::default();
        let mut log = EventLog::new(Uuid::new_v4());
        log.append_registration_events(
            vec![
                RegistrationEvent::WaitlistReservationWasIssued {
                    session_id: "session-1".to_string(),
                    desired_room_types: vec![RoomType::Single, RoomType::Junior],
                },
                RegistrationEvent::WaitlistParticipantWasRegistered {
                    session_id: None,
                    member_id: "member-1".to_string(),
                    desired_room_types: vec![RoomType::BedInDouble],
                },
                RegistrationEvent::WaitlistParticipantWasRegistered {
                    session_id: None,
                    member_id: "member-2".to_string(),
                    desired_room_types: vec![RoomType::Single],
                },
                RegistrationEvent::RegisteredParticipantFromWaitlist {
                    member_id: "member-2".to_string(),
                    room_type: RoomType::Single,
                    duration: Duration(3),
                },
            ],
            now() - TimeDelta::minutes(5),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);

        assert_eq!(model.waitlist_reservations_by_session_id_for(RoomType::Junior).len(), 1);
        assert!(model.waitlist_reservations_by_session_id_for(RoomType::BedInDouble).is_empty());
        assert!(model.is_already_on_waitlist("member-1"));
        assert!(!model.is_already_on_waitlist("member-2"));
        assert_eq!(model.registered_room_type("member-2"), Some(RoomType::Single));
        assert_eq!(
            model
                .waitlist_participants_by_member_id_for(RoomType::BedInDouble)
                .keys()
                .collect::<Vec<_>>(),
            vec!["member-1"]
        );
    }

    #[test]
    fn changing_desired_room_types_keeps_the_waitlist_position() {
        let settings = Settings::default();
        let mut log = EventLog::new(Uuid::new_v4());
        let joined_at = now() - TimeDelta::days(3);
        log.append_registration_events(
            vec![RegistrationEvent::WaitlistParticipantWasRegistered {
                session_id: None,
                member_id: "member-1".to_string(),
                desired_room_types: vec![RoomType::Single],
            }],
            joined_at,
        );
        log.append_registration_events(
            vec![RegistrationEvent::DesiredRoomTypesWereChanged {
                member_id: "member-1".to_string(),
                desired_room_types: vec![RoomType::Junior, RoomType::BedInJunior],
            }],
            now() - TimeDelta::days(1),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);

        assert_eq!(
            model.waitlist_participant("member-1"),
            Some(WaitlistParticipant {
                member_id: "member-1".to_string(),
                desired_room_types: vec![RoomType::Junior, RoomType::BedInJunior],
                joined_at,
            })
        );
        assert!(model.waitlist_participants_by_member_id_for(RoomType::Single).is_empty());
        assert_eq!(
            model
                .waitlist_participants_by_member_id_for(RoomType::BedInJunior)
                .keys()
                .collect::<Vec<_>>(),
            vec!["member-1"]
        );
    }

    #[test]
    fn removed_members_leave_the_waitlist() {
        let settings = Settings::default();
        let mut log = EventLog::new(Uuid::new_v4());
        log.append_registration_events(
            vec![
                RegistrationEvent::WaitlistParticipantWasRegistered {
                    session_id: None,
                    member_id: "member-1".to_string(),
                    desired_room_types: vec![RoomType::Single],
                },
                RegistrationEvent::WaitlistParticipantWasRemoved {
                    member_id: "member-1".to_string(),
                },
            ],
            now() - TimeDelta::hours(1),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);

        assert!(!model.is_already_on_waitlist("member-1"));
        assert!(model.waitlist_participants_by_member_id_for(RoomType::Single).is_empty());
    }

    #[test]
    fn unrepresentable_registration_period_never_expires_reservations() {
        let settings = Settings {
            registration_period_minutes: 200_000_000_000_000,
            ..Settings::default()
        };
        let mut log = log_with_quota(RoomType::Single, 10);
        log.append_registration_events(
            vec![reservation("ancient", RoomType::Single)],
            now() - TimeDelta::days(3650),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);

        assert!(model.reservation("ancient").is_some());
        assert_eq!(model.reservation_expiration("ancient"), None);
    }

    #[test]
    fn room_type_without_quota_is_full() {
        let settings = Settings::default();
        let log = EventLog::new(Uuid::new_v4());

        assert!(RegistrationReadModel::new(&log, now(), &settings).is_full(RoomType::Single));
    }

    #[test]
    fn quota_is_compared_with_reservations_and_participants() {
        let settings = Settings::default();
        let mut log = log_with_quota(RoomType::BedInDouble, 2);
        log.append_registration_events(
            vec![
                reservation("session-1", RoomType::BedInDouble),
                registration(None, "member-1", RoomType::BedInDouble),
            ],
            now(),
        );

        let model = RegistrationReadModel::new(&log, now(), &settings);
        assert!(model.is_full(RoomType::BedInDouble));
        assert!(model.is_full(RoomType::Single));

        let later = now() + TimeDelta::minutes(31);
        let model = RegistrationReadModel::new(&log, later, &settings);
        assert!(!model.is_full(RoomType::BedInDouble));
    }

    #[test]
    fn flush_drops_memoized_projections() {
        let settings = Settings::default();
        let mut log = log_with_quota(RoomType::Single, 1);
        log.append_registration_events(vec![reservation("session-1", RoomType::Single)], now());
        let model = RegistrationReadModel::new(&log, now(), &settings);

        let first = model.reservations_and_participants_for(RoomType::Single);
        assert!(Rc::ptr_eq(
            &first,
            &model.reservations_and_participants_for(RoomType::Single)
        ));

        model.flush();
        assert!(!Rc::ptr_eq(
            &first,
            &model.reservations_and_participants_for(RoomType::Single)
        ));
    }
}
