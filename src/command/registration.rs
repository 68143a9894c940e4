use crate::{
    Booking, Decision, Duration, RegistrationEvent, RegistrationReadModel, Rejection, RoomType,
};

/// Decides which registration events a command appends.
///
/// Every decision is derived from the read model alone, so re-running a command against a
/// freshly loaded log after a concurrency conflict is always safe.
pub struct RegistrationCommandProcessor<'a> {
    model: &'a RegistrationReadModel<'a>,
}

impl<'a> RegistrationCommandProcessor<'a> {
    pub fn new(model: &'a RegistrationReadModel<'a>) -> Self {
        Self { model }
    }

    /// Holds a slot for a session, or puts the session on the waitlist.
    ///
    /// Waitlist requests always succeed. A room request fails with [`Rejection::RoomFull`]
    /// unless there is capacity left or the session already holds a slot of that room type, in
    /// which case the reservation is reissued.
    pub fn start_registration(&self, session_id: &str, booking: &Booking) -> Decision<RegistrationEvent> {
        match booking {
            Booking::Waitlist { desired_room_types } => {
                Ok(vec![RegistrationEvent::WaitlistReservationWasIssued {
                    session_id: session_id.to_string(),
                    desired_room_types: desired_room_types.clone(),
                }])
            }
            Booking::Room {
                room_type,
                duration,
            } => {
                if !self.session_holds(session_id, *room_type) && self.model.is_full(*room_type) {
                    return Err(Rejection::RoomFull {
                        room_type: *room_type,
                    });
                }

                Ok(vec![RegistrationEvent::ReservationWasIssued {
                    session_id: session_id.to_string(),
                    room_type: *room_type,
                    duration: *duration,
                }])
            }
        }
    }

    /// Turns a member into a participant (or waitlist participant).
    ///
    /// An active reservation of the session guarantees the slot. Without one, be it expired or
    /// never issued, the registration still goes through as long as there is capacity.
    /// Reservations and waitlist entries of the session are left alone when the member is
    /// already registered.
    pub fn complete_registration(
        &self,
        member_id: &str,
        session_id: &str,
        booking: &Booking,
    ) -> Decision<RegistrationEvent> {
        if self.model.is_already_registered(member_id) {
            return Err(Rejection::AlreadyRegistered {
                member_id: member_id.to_string(),
            });
        }

        match booking {
            Booking::Waitlist { desired_room_types } => {
                if self.model.is_already_on_waitlist(member_id) {
                    return Err(Rejection::AlreadyOnWaitlist {
                        member_id: member_id.to_string(),
                    });
                }

                Ok(vec![RegistrationEvent::WaitlistParticipantWasRegistered {
                    session_id: Some(session_id.to_string()),
                    member_id: member_id.to_string(),
                    desired_room_types: desired_room_types.clone(),
                }])
            }
            Booking::Room {
                room_type,
                duration,
            } => {
                if !self.session_holds(session_id, *room_type) && self.model.is_full(*room_type) {
                    return Err(Rejection::RoomFull {
                        room_type: *room_type,
                    });
                }

                Ok(vec![RegistrationEvent::ParticipantWasRegistered {
                    session_id: Some(session_id.to_string()),
                    member_id: member_id.to_string(),
                    room_type: *room_type,
                    duration: *duration,
                }])
            }
        }
    }

    /// Moves a participant to another room type. Quota of the new type is not checked.
    pub fn change_room_type(&self, member_id: &str, room_type: RoomType) -> Vec<RegistrationEvent> {
        match self.model.participant(member_id) {
            Some(participant) => vec![RegistrationEvent::RoomTypeWasChanged {
                member_id: member_id.to_string(),
                room_type,
                duration: participant.duration,
            }],
            None => vec![RegistrationEvent::DidNotChangeRoomTypeForNonParticipant {
                member_id: member_id.to_string(),
                room_type,
            }],
        }
    }

    pub fn change_duration(&self, member_id: &str, duration: Duration) -> Vec<RegistrationEvent> {
        match self.model.participant(member_id) {
            Some(participant) => vec![RegistrationEvent::DurationWasChanged {
                member_id: member_id.to_string(),
                room_type: participant.room_type,
                duration,
            }],
            None => vec![RegistrationEvent::DidNotChangeDurationForNonParticipant {
                member_id: member_id.to_string(),
                duration,
            }],
        }
    }

    pub fn remove_participant(&self, member_id: &str) -> Vec<RegistrationEvent> {
        if self.model.is_already_registered(member_id) {
            vec![RegistrationEvent::ParticipantWasRemoved {
                member_id: member_id.to_string(),
            }]
        } else {
            vec![RegistrationEvent::DidNotRemoveParticipantBecauseTheyAreNotRegistered {
                member_id: member_id.to_string(),
            }]
        }
    }

    pub fn change_desired_room_types(
        &self,
        member_id: &str,
        desired_room_types: &[RoomType],
    ) -> Vec<RegistrationEvent> {
        if self.model.is_already_on_waitlist(member_id) {
            vec![RegistrationEvent::DesiredRoomTypesWereChanged {
                member_id: member_id.to_string(),
                desired_room_types: desired_room_types.to_vec(),
            }]
        } else {
            vec![
                RegistrationEvent::DidNotChangeDesiredRoomTypesForNonWaitlistParticipant {
                    member_id: member_id.to_string(),
                    desired_room_types: desired_room_types.to_vec(),
                },
            ]
        }
    }

    pub fn remove_waitlist_participant(&self, member_id: &str) -> Vec<RegistrationEvent> {
        if self.model.is_already_on_waitlist(member_id) {
            vec![RegistrationEvent::WaitlistParticipantWasRemoved {
                member_id: member_id.to_string(),
            }]
        } else {
            vec![
                RegistrationEvent::DidNotRemoveWaitlistParticipantBecauseTheyAreNotOnWaitlist {
                    member_id: member_id.to_string(),
                },
            ]
        }
    }

    /// Promotes a waitlist participant. Like other administrative moves this ignores the quota.
    pub fn from_waitlist_to_participant(
        &self,
        member_id: &str,
        room_type: RoomType,
        duration: Duration,
    ) -> Vec<RegistrationEvent> {
        if self.model.is_already_on_waitlist(member_id) {
            vec![RegistrationEvent::RegisteredParticipantFromWaitlist {
                member_id: member_id.to_string(),
                room_type,
                duration,
            }]
        } else {
            vec![
                RegistrationEvent::DidNotRegisterParticipantFromWaitlistBecauseTheyAreNotOnWaitlist {
                    member_id: member_id.to_string(),
                    room_type,
                },
            ]
        }
    }

    fn session_holds(&self, session_id: &str, room_type: RoomType) -> bool {
        self.model
            .reservation(session_id)
            .is_some_and(|reservation| reservation.room_type == room_type)
    }
}
