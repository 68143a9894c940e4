//! # mini_registration_es
//!
//! Event-sourced registration and room allocation for capacity-constrained conferences.
//!
//! Everything that happens to a conference is recorded in an [`EventLog`] made of three
//! append-only streams: configuration (room quotas), registration (reservations, participants,
//! waitlist) and rooms (who shares a double room with whom). Read models fold over a log snapshot
//! to answer "is there room?" or "who is registered?", and command processors use them to decide
//! which events to append. The [`Conference`] service ties it together with an [`EventLogStore`],
//! retrying a command when a concurrent save won the race.
//!
//! ```rust,no_run
//! use mini_registration_es::{
//!     Booking, Conference, Duration, InMemoryEventLogStore, RoomType, Settings, SystemClock, Uuid,
//! };
//!
//! # async fn run() -> mini_registration_es::Result<()> {
//! let mut conference = Conference::new(
//!     InMemoryEventLogStore::new(),
//!     SystemClock,
//!     Settings::default(),
//!     vec![],
//! );
//! let conference_id = Uuid::new_v4();
//! let booking = Booking::Room { room_type: RoomType::Single, duration: Duration(2) };
//!
//! conference.set_room_quota(conference_id, RoomType::Single, 10).await?;
//! conference.start_registration(conference_id, "session-1", &booking).await?;
//! conference.complete_registration(conference_id, "member-1", "session-1", &booking).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod consumer;
pub mod error;
pub mod event_log;
pub mod event_store;
pub mod events;
pub mod memo;
pub mod read_model;
pub mod service;
pub mod types;

pub use command::{Decision, RegistrationCommandProcessor, Rejection, RoomsCommandProcessor};
pub use config::*;
pub use consumer::*;
pub use error::*;
pub use event_log::*;
pub use event_store::*;
pub use events::*;
pub use memo::*;
pub use read_model::{
    ConferenceConfigReadModel, Occupant, Participant, RegistrationReadModel, Reservation,
    RoomPair, RoomsReadModel, WaitlistParticipant, WaitlistReservation,
};
pub use service::*;
pub use types::*;

pub use chrono;
pub use uuid::Uuid;
