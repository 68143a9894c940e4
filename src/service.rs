use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    Booking, Clock, ConferenceEvent, Duration, EventBatch, EventConsumer, EventLog,
    EventLogStore, RegistrationCommandProcessor, RegistrationReadModel, Rejection, Result,
    RoomType, RoomsCommandProcessor, RoomsReadModel, Settings,
};

/// What a command did to the event log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The events were saved. An empty batch means there was nothing to record.
    Applied(EventBatch),
    /// The command was turned down and nothing was saved.
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn events(&self) -> Option<&EventBatch> {
        match self {
            Outcome::Applied(batch) => Some(batch),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Rejected(rejection) => Some(rejection),
        }
    }
}

/// The `Conference` struct runs registration and room commands against an event log store.
///
/// Each command loads a fresh log snapshot, builds new read models over it, lets a command
/// processor decide on the events, appends them and saves the log. Two commands racing on the
/// same snapshot are caught by the store at save time; the loser runs its command again from a
/// fresh load, up to [`Settings::max_save_attempts`] times. Consumers are told about every saved
/// batch afterwards.
pub struct Conference<S, C>
where
    S: EventLogStore,
    C: Clock,
{
    store: S,
    clock: C,
    settings: Settings,
    consumers: Vec<Box<dyn EventConsumer>>,
}

impl<S, C> Conference<S, C>
where
    S: EventLogStore,
    C: Clock,
{
    pub fn new(
        store: S,
        clock: C,
        settings: Settings,
        consumers: Vec<Box<dyn EventConsumer>>,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
            consumers,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the current log snapshot of a conference.
    pub async fn load(&self, conference_id: Uuid) -> Result<EventLog> {
        self.store.load(conference_id).await
    }

    /// Hands fresh read models over the current log to `f`.
    pub async fn query<T>(
        &self,
        conference_id: Uuid,
        f: impl FnOnce(&RegistrationReadModel<'_>, &RoomsReadModel<'_>) -> T,
    ) -> Result<T> {
        let log = self.store.load(conference_id).await?;
        let registration = RegistrationReadModel::new(&log, self.clock.now(), &self.settings);
        let rooms = RoomsReadModel::new(&log, &registration);

        Ok(f(&registration, &rooms))
    }

    #[instrument(skip(self))]
    pub async fn set_room_quota(
        &mut self,
        conference_id: Uuid,
        room_type: RoomType,
        quota: u32,
    ) -> Result<Outcome> {
        self.execute(conference_id, |_, _| {
            Ok(EventBatch::from_conference(vec![
                ConferenceEvent::RoomQuotaWasSet { room_type, quota },
            ]))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn start_registration(
        &mut self,
        conference_id: Uuid,
        session_id: &str,
        booking: &Booking,
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, _| {
            RegistrationCommandProcessor::new(registration)
                .start_registration(session_id, booking)
                .map(EventBatch::from_registration)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn complete_registration(
        &mut self,
        conference_id: Uuid,
        member_id: &str,
        session_id: &str,
        booking: &Booking,
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, _| {
            RegistrationCommandProcessor::new(registration)
                .complete_registration(member_id, session_id, booking)
                .map(EventBatch::from_registration)
        })
        .await
    }

    /// Moves a participant to another room type, dissolving the pair they shared in the old one.
    #[instrument(skip(self))]
    pub async fn change_room_type(
        &mut self,
        conference_id: Uuid,
        member_id: &str,
        room_type: RoomType,
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, rooms| {
            let events =
                RegistrationCommandProcessor::new(registration).change_room_type(member_id, room_type);
            let cleanup = match registration.registered_room_type(member_id) {
                Some(previous) if previous != room_type => RoomsCommandProcessor::new(rooms)
                    .remove_participant_pair_containing(previous, member_id),
                _ => Vec::new(),
            };

            Ok(EventBatch::from_registration(events).with_rooms(cleanup))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn change_duration(
        &mut self,
        conference_id: Uuid,
        member_id: &str,
        duration: Duration,
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, _| {
            Ok(EventBatch::from_registration(
                RegistrationCommandProcessor::new(registration).change_duration(member_id, duration),
            ))
        })
        .await
    }

    /// Removes a participant together with the room pair they were part of.
    #[instrument(skip(self))]
    pub async fn remove_participant(
        &mut self,
        conference_id: Uuid,
        member_id: &str,
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, rooms| {
            let events = RegistrationCommandProcessor::new(registration).remove_participant(member_id);
            let cleanup = registration
                .registered_room_type(member_id)
                .map(|room_type| {
                    RoomsCommandProcessor::new(rooms)
                        .remove_participant_pair_containing(room_type, member_id)
                })
                .unwrap_or_default();

            Ok(EventBatch::from_registration(events).with_rooms(cleanup))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn change_desired_room_types(
        &mut self,
        conference_id: Uuid,
        member_id: &str,
        desired_room_types: &[RoomType],
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, _| {
            Ok(EventBatch::from_registration(
                RegistrationCommandProcessor::new(registration)
                    .change_desired_room_types(member_id, desired_room_types),
            ))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_waitlist_participant(
        &mut self,
        conference_id: Uuid,
        member_id: &str,
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, _| {
            Ok(EventBatch::from_registration(
                RegistrationCommandProcessor::new(registration)
                    .remove_waitlist_participant(member_id),
            ))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn from_waitlist_to_participant(
        &mut self,
        conference_id: Uuid,
        member_id: &str,
        room_type: RoomType,
        duration: Duration,
    ) -> Result<Outcome> {
        self.execute(conference_id, |registration, _| {
            Ok(EventBatch::from_registration(
                RegistrationCommandProcessor::new(registration)
                    .from_waitlist_to_participant(member_id, room_type, duration),
            ))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn add_room_pair(
        &mut self,
        conference_id: Uuid,
        room_type: RoomType,
        member_id1: Option<&str>,
        member_id2: Option<&str>,
    ) -> Result<Outcome> {
        self.execute(conference_id, |_, rooms| {
            Ok(EventBatch::from_rooms(
                RoomsCommandProcessor::new(rooms)
                    .add_participant_pair_for(room_type, member_id1, member_id2),
            ))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_room_pair(
        &mut self,
        conference_id: Uuid,
        room_type: RoomType,
        participant1_id: &str,
        participant2_id: &str,
    ) -> Result<Outcome> {
        self.execute(conference_id, |_, rooms| {
            Ok(EventBatch::from_rooms(
                RoomsCommandProcessor::new(rooms).remove_participant_pair_for(
                    room_type,
                    participant1_id,
                    participant2_id,
                ),
            ))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_room_pair_containing(
        &mut self,
        conference_id: Uuid,
        room_type: RoomType,
        member_id: &str,
    ) -> Result<Outcome> {
        self.execute(conference_id, |_, rooms| {
            Ok(EventBatch::from_rooms(
                RoomsCommandProcessor::new(rooms)
                    .remove_participant_pair_containing(room_type, member_id),
            ))
        })
        .await
    }

    async fn execute<F>(&mut self, conference_id: Uuid, command: F) -> Result<Outcome>
    where
        F: Fn(
            &RegistrationReadModel<'_>,
            &RoomsReadModel<'_>,
        ) -> std::result::Result<EventBatch, Rejection>,
    {
        let mut attempt = 1;

        loop {
            let mut log = self.store.load(conference_id).await?;
            let now = self.clock.now();

            // read models must not outlive this block, they borrow the log we append to
            let decision = {
                let registration = RegistrationReadModel::new(&log, now, &self.settings);
                let rooms = RoomsReadModel::new(&log, &registration);
                command(&registration, &rooms)
            };

            let batch = match decision {
                Ok(batch) => batch,
                Err(rejection) => {
                    debug!(%conference_id, code = rejection.status_code(), "command rejected");
                    return Ok(Outcome::Rejected(rejection));
                }
            };

            if batch.is_empty() {
                debug!(%conference_id, "nothing to append");
                return Ok(Outcome::Applied(batch));
            }

            log.append(batch.clone(), now);

            match self.store.save(&log).await {
                Ok(()) => {
                    info!(%conference_id, events = ?batch.kinds(), "events appended");

                    for consumer in self.consumers.iter_mut() {
                        consumer.process(conference_id, &batch).await;
                    }

                    return Ok(Outcome::Applied(batch));
                }
                Err(err) if err.is_conflict() && attempt < self.settings.max_save_attempts => {
                    warn!(%conference_id, attempt, %err, "event log changed concurrently, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
