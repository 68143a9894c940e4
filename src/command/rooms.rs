use crate::{RoomType, RoomsEvent, RoomsReadModel};

/// Decides which room events a pairing command appends.
///
/// Invalid pairing commands are not errors: they produce `DidNot...` events so the log can
/// later explain why two participants are not sharing a room.
pub struct RoomsCommandProcessor<'a> {
    model: &'a RoomsReadModel<'a>,
}

impl<'a> RoomsCommandProcessor<'a> {
    pub fn new(model: &'a RoomsReadModel<'a>) -> Self {
        Self { model }
    }

    /// Pairs two participants of a room type, keeping the given order.
    ///
    /// Checks run in this order, each id on its own: missing id, same id twice (which ends the
    /// checks), room type not shareable (which ends the checks), id not registered for the room
    /// type, id already paired. The pair is only added when nothing was rejected.
    pub fn add_participant_pair_for(
        &self,
        room_type: RoomType,
        member_id1: Option<&str>,
        member_id2: Option<&str>,
    ) -> Vec<RoomsEvent> {
        let mut rejections = Vec::new();

        for _ in [member_id1, member_id2].iter().filter(|id| id.is_none()) {
            rejections.push(RoomsEvent::DidNotAddRoomPairBecauseParticipantIsNotInRoomType {
                room_type,
                member_id: None,
            });
        }

        if let (Some(first), Some(second)) = (member_id1, member_id2)
            && first == second
        {
            return vec![
                RoomsEvent::DidNotAddRoomPairBecauseParticipantIsPairedWithThemselves {
                    room_type,
                    member_id: first.to_string(),
                },
            ];
        }

        // Single-occupancy room types have no pairs, so nobody is pairable in them.
        if !self.model.registration().settings().is_shareable(room_type) {
            rejections.extend([member_id1, member_id2].into_iter().flatten().map(|member_id| {
                RoomsEvent::DidNotAddRoomPairBecauseParticipantIsNotInRoomType {
                    room_type,
                    member_id: Some(member_id.to_string()),
                }
            }));
            return rejections;
        }

        let participants = self
            .model
            .registration()
            .participants_by_member_id_for(room_type);
        let (registered, unknown): (Vec<&str>, Vec<&str>) = [member_id1, member_id2]
            .into_iter()
            .flatten()
            .partition(|member_id| participants.contains_key(*member_id));

        for member_id in unknown {
            rejections.push(RoomsEvent::DidNotAddRoomPairBecauseParticipantIsNotInRoomType {
                room_type,
                member_id: Some(member_id.to_string()),
            });
        }

        for member_id in registered {
            if self.model.is_paired(room_type, member_id) {
                rejections.push(RoomsEvent::DidNotAddRoomPairBecauseParticipantIsAlreadyInRoom {
                    room_type,
                    member_id: member_id.to_string(),
                });
            }
        }

        match (member_id1, member_id2) {
            (Some(first), Some(second)) if rejections.is_empty() => {
                vec![RoomsEvent::RoomPairWasAdded {
                    room_type,
                    participant1_id: first.to_string(),
                    participant2_id: second.to_string(),
                }]
            }
            _ => rejections,
        }
    }

    /// Removes exactly the pair `(participant1_id, participant2_id)`; the order matters.
    pub fn remove_participant_pair_for(
        &self,
        room_type: RoomType,
        participant1_id: &str,
        participant2_id: &str,
    ) -> Vec<RoomsEvent> {
        let exists = self.model.room_pairs_for(room_type).iter().any(|pair| {
            pair.participant1_id == participant1_id && pair.participant2_id == participant2_id
        });

        if exists {
            vec![RoomsEvent::RoomPairWasRemoved {
                room_type,
                participant1_id: participant1_id.to_string(),
                participant2_id: participant2_id.to_string(),
            }]
        } else {
            vec![
                RoomsEvent::DidNotRemoveRoomPairBecauseThePairDoesNotExistForThisRoomType {
                    room_type,
                    participant1_id: participant1_id.to_string(),
                    participant2_id: participant2_id.to_string(),
                },
            ]
        }
    }

    /// Removes whatever pair the member is part of. Nothing happens for room types that are not
    /// shareable or for members without a roommate.
    pub fn remove_participant_pair_containing(
        &self,
        room_type: RoomType,
        member_id: &str,
    ) -> Vec<RoomsEvent> {
        if !self.model.registration().settings().is_shareable(room_type) {
            return Vec::new();
        }

        self.model
            .room_pairs_for(room_type)
            .iter()
            .find(|pair| pair.contains(member_id))
            .map(|pair| RoomsEvent::RoomPairContainingAParticipantWasRemoved {
                room_type,
                member_id_to_be_removed: member_id.to_string(),
                participant1_id: pair.participant1_id.clone(),
                participant2_id: pair.participant2_id.clone(),
            })
            .into_iter()
            .collect()
    }
}
