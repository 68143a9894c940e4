/// # Mini Registration Example: A Small Conference
///
/// This example walks a conference with very few rooms through its registration period. Members
/// reserve rooms, confirm them, end up on the waitlist when a room type runs out, share double
/// rooms and finally drop out. A printing consumer shows every batch of events that gets saved.
///
/// The clock is fixed so that reservation expiry can be shown by moving it forward.
///
/// ## Usage
///
/// ```sh
/// RUST_LOG=mini_registration_es=debug cargo run --example conference
/// ```

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tracing_subscriber::EnvFilter;

use mini_registration_es::{
    Booking, Conference, Duration, EventBatch, EventConsumer, FixedClock, InMemoryEventLogStore,
    Outcome, RoomType, Settings, Uuid,
};

struct PrintingConsumer;

#[async_trait]
impl EventConsumer for PrintingConsumer {
    async fn process(&mut self, conference_id: Uuid, batch: &EventBatch) {
        for kind in batch.kinds() {
            println!("  [{conference_id}] saved {kind}");
        }
    }
}

fn report(step: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Applied(batch) if batch.is_empty() => println!("{step}: nothing to do"),
        Outcome::Applied(batch) => println!("{step}: {} event(s)", batch.len()),
        Outcome::Rejected(rejection) => println!("{step}: rejected ({rejection})"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env();
    let clock = FixedClock::new(Utc::now());
    let mut conference = Conference::new(
        InMemoryEventLogStore::new(),
        clock.clone(),
        settings,
        vec![Box::new(PrintingConsumer)],
    );
    let id = Uuid::new_v4();

    conference.set_room_quota(id, RoomType::Single, 1).await?;
    conference.set_room_quota(id, RoomType::BedInDouble, 4).await?;

    // A single room for Ada, which leaves none for Grace.
    let single = Booking::from_form(&[RoomType::Single], "3")?;
    report("ada reserves", &conference.start_registration(id, "ada-session", &single).await?);
    report("grace reserves", &conference.start_registration(id, "grace-session", &single).await?);

    // Ada never confirms, so her reservation runs out.
    clock.advance(conference.settings().registration_period() + TimeDelta::minutes(1));
    report("grace retries", &conference.start_registration(id, "grace-session", &single).await?);
    report(
        "grace confirms",
        &conference
            .complete_registration(id, "grace", "grace-session", &single)
            .await?,
    );

    let waitlist = Booking::from_form(&[RoomType::Single, RoomType::Junior], "waitlist")?;
    report(
        "ada joins the waitlist",
        &conference
            .complete_registration(id, "ada", "ada-session", &waitlist)
            .await?,
    );

    let double = Booking::Room {
        room_type: RoomType::BedInDouble,
        duration: Duration(2),
    };
    for member in ["linus", "ken"] {
        let session = format!("{member}-session");
        let outcome = conference
            .complete_registration(id, member, &session, &double)
            .await?;
        report(&format!("{member} registers"), &outcome);
    }

    report(
        "linus pairs with himself",
        &conference
            .add_room_pair(id, RoomType::BedInDouble, Some("linus"), Some("linus"))
            .await?,
    );
    report(
        "linus and ken share a room",
        &conference
            .add_room_pair(id, RoomType::BedInDouble, Some("linus"), Some("ken"))
            .await?,
    );

    report("ken drops out", &conference.remove_participant(id, "ken").await?);
    report(
        "ada gets a double bed",
        &conference
            .from_waitlist_to_participant(id, "ada", RoomType::BedInDouble, Duration(2))
            .await?,
    );

    let summary = conference
        .query(id, |registration, rooms| {
            (
                registration
                    .participants_by_member_id()
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>(),
                rooms.participants_without_room_in(RoomType::BedInDouble),
            )
        })
        .await?;

    println!("participants: {:?}", summary.0);
    println!("waiting for a roommate: {:?}", summary.1);

    Ok(())
}
