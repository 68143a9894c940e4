use std::fmt;

use crate::{MemberId, RoomType};

pub mod registration;
pub mod rooms;

pub use registration::RegistrationCommandProcessor;
pub use rooms::RoomsCommandProcessor;

/// A registration request that was turned down without touching the event log.
///
/// Registration and waitlist commands report "room full" or "already registered" as a status
/// to the caller instead of recording an event: the log only holds what actually happened.
/// Room pairing works the other way round and records its rejections as `DidNot...` events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    RoomFull { room_type: RoomType },
    AlreadyRegistered { member_id: MemberId },
    AlreadyOnWaitlist { member_id: MemberId },
}

impl Rejection {
    /// A stable code for the status, suitable for lookups of translated messages.
    pub fn status_code(&self) -> &'static str {
        match self {
            Rejection::RoomFull { .. } => "room_full",
            Rejection::AlreadyRegistered { .. } => "already_registered",
            Rejection::AlreadyOnWaitlist { .. } => "already_on_waitlist",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::RoomFull { room_type } => {
                write!(f, "All rooms of type {room_type} are taken")
            }
            Rejection::AlreadyRegistered { member_id } => {
                write!(f, "Member {member_id} is already registered")
            }
            Rejection::AlreadyOnWaitlist { member_id } => {
                write!(f, "Member {member_id} is already on the waitlist")
            }
        }
    }
}

/// The events a command decided to append, or the reason it appended nothing.
pub type Decision<E> = Result<Vec<E>, Rejection>;
