use async_trait::async_trait;
use uuid::Uuid;

use crate::EventBatch;

/// A trait that defines the behavior of an event consumer.
///
/// Consumers receive the batch of events a command appended, after it has been saved. They are
/// the place for side effects such as notification mails; they cannot fail or undo the command.
///
/// This trait must be implemented by all event consumers in your application.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    async fn process(&mut self, conference_id: Uuid, batch: &EventBatch);
}
