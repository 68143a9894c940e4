use crate::{ConferenceEvent, EventLog, Memoized, RoomType};

/// Quota per room type, folded from the configuration stream.
#[derive(Debug)]
pub struct ConferenceConfigReadModel<'a> {
    log: &'a EventLog,
    quotas: Memoized<Option<u32>>,
}

impl<'a> ConferenceConfigReadModel<'a> {
    pub fn new(log: &'a EventLog) -> Self {
        Self {
            log,
            quotas: Memoized::new("quota_for"),
        }
    }

    /// The most recently set quota, or `None` when no quota was ever set for the room type.
    pub fn quota_for(&self, room_type: RoomType) -> Option<u32> {
        *self.quotas.get_or_compute(&room_type, || {
            self.log
                .conference_events()
                .iter()
                .fold(None, |quota, stamped| match &stamped.event {
                    ConferenceEvent::RoomQuotaWasSet {
                        room_type: set_for,
                        quota: value,
                    } if *set_for == room_type => Some(*value),
                    ConferenceEvent::RoomQuotaWasSet { .. } => quota,
                })
        })
    }

    pub fn flush(&self) {
        self.quotas.flush();
    }
}
