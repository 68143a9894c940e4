use std::{collections::BTreeSet, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{EventLog, Memoized, MemberId, RegistrationReadModel, RoomType, RoomsEvent};

/// Two participants sharing a room, in the order they were paired.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPair {
    pub participant1_id: MemberId,
    pub participant2_id: MemberId,
}

impl RoomPair {
    pub fn contains(&self, member_id: &str) -> bool {
        self.participant1_id == member_id || self.participant2_id == member_id
    }

    /// The other occupant, if `member_id` is in this pair.
    pub fn roommate_of(&self, member_id: &str) -> Option<&MemberId> {
        if self.participant1_id == member_id {
            Some(&self.participant2_id)
        } else if self.participant2_id == member_id {
            Some(&self.participant1_id)
        } else {
            None
        }
    }
}

/// Who shares a room with whom, per shareable room type.
#[derive(Debug)]
pub struct RoomsReadModel<'a> {
    log: &'a EventLog,
    registration: &'a RegistrationReadModel<'a>,
    pairs_for: Memoized<Vec<RoomPair>>,
    paired_for: Memoized<BTreeSet<MemberId>>,
}

impl<'a> RoomsReadModel<'a> {
    pub fn new(log: &'a EventLog, registration: &'a RegistrationReadModel<'a>) -> Self {
        Self {
            log,
            registration,
            pairs_for: Memoized::new("room_pairs_for"),
            paired_for: Memoized::new("participants_in_room_for"),
        }
    }

    pub fn registration(&self) -> &'a RegistrationReadModel<'a> {
        self.registration
    }

    pub fn room_pairs_for(&self, room_type: RoomType) -> Rc<Vec<RoomPair>> {
        use RoomsEvent::*;

        self.pairs_for.get_or_compute(&room_type, || {
            let mut pairs: Vec<RoomPair> = Vec::new();

            for stamped in self.log.room_events() {
                match &stamped.event {
                    RoomPairWasAdded {
                        room_type: paired_in,
                        participant1_id,
                        participant2_id,
                    } if *paired_in == room_type => pairs.push(RoomPair {
                        participant1_id: participant1_id.clone(),
                        participant2_id: participant2_id.clone(),
                    }),
                    RoomPairWasRemoved {
                        room_type: paired_in,
                        participant1_id,
                        participant2_id,
                    }
                    | RoomPairContainingAParticipantWasRemoved {
                        room_type: paired_in,
                        participant1_id,
                        participant2_id,
                        ..
                    } if *paired_in == room_type => pairs.retain(|pair| {
                        pair.participant1_id != *participant1_id
                            || pair.participant2_id != *participant2_id
                    }),
                    RoomPairWasAdded { .. }
                    | RoomPairWasRemoved { .. }
                    | RoomPairContainingAParticipantWasRemoved { .. }
                    | DidNotAddRoomPairBecauseParticipantIsNotInRoomType { .. }
                    | DidNotAddRoomPairBecauseParticipantIsPairedWithThemselves { .. }
                    | DidNotAddRoomPairBecauseParticipantIsAlreadyInRoom { .. }
                    | DidNotRemoveRoomPairBecauseThePairDoesNotExistForThisRoomType { .. } => {}
                }
            }

            pairs
        })
    }

    /// Every member that occupies a slot of some pair of the room type.
    pub fn participants_in_room_for(&self, room_type: RoomType) -> Rc<BTreeSet<MemberId>> {
        self.paired_for.get_or_compute(&room_type, || {
            self.room_pairs_for(room_type)
                .iter()
                .flat_map(|pair| [pair.participant1_id.clone(), pair.participant2_id.clone()])
                .collect()
        })
    }

    pub fn participants_without_room_in(&self, room_type: RoomType) -> Vec<MemberId> {
        let paired = self.participants_in_room_for(room_type);

        self.registration
            .participants_by_member_id_for(room_type)
            .keys()
            .filter(|member_id| !paired.contains(*member_id))
            .cloned()
            .collect()
    }

    pub fn is_paired(&self, room_type: RoomType, member_id: &str) -> bool {
        self.participants_in_room_for(room_type).contains(member_id)
    }

    pub fn roommate_for(&self, room_type: RoomType, member_id: &str) -> Option<MemberId> {
        self.room_pairs_for(room_type)
            .iter()
            .find_map(|pair| pair.roommate_of(member_id).cloned())
    }

    pub fn flush(&self) {
        self.pairs_for.flush();
        self.paired_for.flush();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{Duration, RegistrationEvent, Settings};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    fn pair_added(room_type: RoomType, first: &str, second: &str) -> RoomsEvent {
        RoomsEvent::RoomPairWasAdded {
            room_type,
            participant1_id: first.to_string(),
            participant2_id: second.to_string(),
        }
    }

    fn log_with_participants(members: &[&str]) -> EventLog {
        let mut log = EventLog::new(Uuid::new_v4());
        log.append_registration_events(
            members.iter().map(|member_id| RegistrationEvent::ParticipantWasRegistered {
                session_id: None,
                member_id: member_id.to_string(),
                room_type: RoomType::BedInDouble,
                duration: Duration(2),
            }),
            now(),
        );
        log
    }

    #[test]
    fn pairs_are_folded_per_room_type() {
        let settings = Settings::default();
        let mut log = log_with_participants(&["a", "b", "c", "d"]);
        log.append_room_events(
            vec![
                pair_added(RoomType::BedInDouble, "a", "b"),
                pair_added(RoomType::BedInDouble, "c", "d"),
                pair_added(RoomType::BedInJunior, "x", "y"),
                RoomsEvent::RoomPairWasRemoved {
                    room_type: RoomType::BedInDouble,
                    participant1_id: "a".to_string(),
                    participant2_id: "b".to_string(),
                },
            ],
            now(),
        );
        let registration = RegistrationReadModel::new(&log, now(), &settings);
        let rooms = RoomsReadModel::new(&log, &registration);

        assert_eq!(
            *rooms.room_pairs_for(RoomType::BedInDouble),
            vec![RoomPair {
                participant1_id: "c".to_string(),
                participant2_id: "d".to_string(),
            }]
        );
        assert_eq!(rooms.room_pairs_for(RoomType::BedInJunior).len(), 1);
        assert_eq!(
            rooms.participants_without_room_in(RoomType::BedInDouble),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn roommate_is_found_in_either_slot() {
        let settings = Settings::default();
        let mut log = log_with_participants(&["a", "b", "c"]);
        log.append_room_events(vec![pair_added(RoomType::BedInDouble, "a", "b")], now());
        let registration = RegistrationReadModel::new(&log, now(), &settings);
        let rooms = RoomsReadModel::new(&log, &registration);

        assert_eq!(rooms.roommate_for(RoomType::BedInDouble, "a"), Some("b".to_string()));
        assert_eq!(rooms.roommate_for(RoomType::BedInDouble, "b"), Some("a".to_string()));
        assert_eq!(rooms.roommate_for(RoomType::BedInDouble, "c"), None);
        assert_eq!(rooms.roommate_for(RoomType::BedInJunior, "a"), None);
        assert!(rooms.is_paired(RoomType::BedInDouble, "b"));
        assert!(!rooms.is_paired(RoomType::BedInDouble, "c"));
    }

    #[test]
    fn removing_a_pair_containing_a_member_frees_both() {
        let settings = Settings::default();
        let mut log = log_with_participants(&["a", "b"]);
        log.append_room_events(
            vec![
                pair_added(RoomType::BedInDouble, "a", "b"),
                RoomsEvent::RoomPairContainingAParticipantWasRemoved {
                    room_type: RoomType::BedInDouble,
                    member_id_to_be_removed: "b".to_string(),
                    participant1_id: "a".to_string(),
                    participant2_id: "b".to_string(),
                },
            ],
            now(),
        );
        let registration = RegistrationReadModel::new(&log, now(), &settings);
        let rooms = RoomsReadModel::new(&log, &registration);

        assert!(rooms.room_pairs_for(RoomType::BedInDouble).is_empty());
        assert_eq!(rooms.participants_without_room_in(RoomType::BedInDouble).len(), 2);
    }
}
