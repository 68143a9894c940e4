//! Read models: pure projections of one [`crate::EventLog`] snapshot.
//!
//! A read model borrows the log it was built over and is thrown away with it. Build fresh ones
//! for every logical operation; never keep one around across a save.

pub mod conference;
pub mod registration;
pub mod rooms;

pub use conference::ConferenceConfigReadModel;
pub use registration::{
    Occupant, Participant, RegistrationReadModel, Reservation, WaitlistParticipant,
    WaitlistReservation,
};
pub use rooms::{RoomPair, RoomsReadModel};
