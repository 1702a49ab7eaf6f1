/// End-to-end business scenarios for time recording
///
/// Run with: cargo test --test time_recording_tests
use chrono::NaiveDate;
use timeclockdb::{
    CreateProjectOutcome, EntityStore, RecordTimeFailure, RecordTimeOutcome, TimeEntryCandidate,
    TimeRecordingService,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn full_recording_scenario() -> anyhow::Result<()> {
    let store = EntityStore::start(None)?;
    let recording = TimeRecordingService::new(&store);

    let CreateProjectOutcome::Created(project) = recording.create_project("A")? else {
        panic!("project A not created");
    };
    assert_eq!(project.id, 1);

    let bob = recording.create_employee("Bob")?;
    assert_eq!(bob.id, 1);

    let day = date(2020, 6, 25);

    // First entry of the day: one hour.
    let outcome = recording.record_time(TimeEntryCandidate::new(bob.id, project.id, 60, day))?;
    assert!(matches!(outcome, RecordTimeOutcome::Recorded(_)));
    assert_eq!(recording.minutes_recorded_on_date(bob.id, day)?, 60);

    // Fill the day to exactly 24 hours: still allowed.
    let outcome = recording.record_time(TimeEntryCandidate::new(bob.id, project.id, 1380, day))?;
    assert!(matches!(outcome, RecordTimeOutcome::Recorded(_)));
    assert_eq!(recording.minutes_recorded_on_date(bob.id, day)?, 1440);

    // One more minute goes over the cap.
    let outcome = recording.record_time(TimeEntryCandidate::new(bob.id, project.id, 1, day))?;
    assert_eq!(
        outcome,
        RecordTimeOutcome::Rejected(RecordTimeFailure::ExceededDailyHours {
            existing_minutes: 1440,
            attempted_minutes: 1,
        })
    );

    // The rejected entry left no trace.
    assert_eq!(recording.entries_for_employee_on_date(bob.id, day)?.len(), 2);
    Ok(())
}

#[test]
fn single_entry_boundaries() -> anyhow::Result<()> {
    let store = EntityStore::start(None)?;
    let recording = TimeRecordingService::new(&store);
    let CreateProjectOutcome::Created(project) = recording.create_project("A")? else {
        panic!("project A not created");
    };
    let bob = recording.create_employee("Bob")?;
    let day = date(2020, 6, 25);

    // A lone 24-hour entry is the maximum valid entry.
    let outcome = recording.record_time(TimeEntryCandidate::new(bob.id, project.id, 1440, day))?;
    assert!(matches!(outcome, RecordTimeOutcome::Recorded(_)));

    // 1441 minutes can never be a single entry, regardless of the day.
    let next = date(2020, 6, 26);
    let outcome = recording.record_time(TimeEntryCandidate::new(bob.id, project.id, 1441, next))?;
    assert_eq!(
        outcome,
        RecordTimeOutcome::Rejected(RecordTimeFailure::InvalidMinutes { minutes: 1441 })
    );
    Ok(())
}

#[test]
fn referential_integrity_rejections_leave_store_unchanged() -> anyhow::Result<()> {
    let store = EntityStore::start(None)?;
    let recording = TimeRecordingService::new(&store);
    let day = date(2020, 6, 25);

    // Nothing exists yet: the project is checked first.
    let outcome = recording.record_time(TimeEntryCandidate::new(1, 1, 60, day))?;
    assert_eq!(
        outcome,
        RecordTimeOutcome::Rejected(RecordTimeFailure::MissingProject { project_id: 1 })
    );

    let CreateProjectOutcome::Created(project) = recording.create_project("A")? else {
        panic!("project A not created");
    };
    let outcome = recording.record_time(TimeEntryCandidate::new(1, project.id, 60, day))?;
    assert_eq!(
        outcome,
        RecordTimeOutcome::Rejected(RecordTimeFailure::MissingEmployee { employee_id: 1 })
    );

    assert_eq!(store.time_entries().count()?, 0);
    Ok(())
}

#[test]
fn unknown_employee_has_zero_minutes_recorded() -> anyhow::Result<()> {
    let store = EntityStore::start(None)?;
    let recording = TimeRecordingService::new(&store);
    assert_eq!(
        recording.minutes_recorded_on_date(12345, date(2020, 6, 25))?,
        0
    );
    Ok(())
}

#[test]
fn entries_are_queryable_per_employee_and_date() -> anyhow::Result<()> {
    let store = EntityStore::start(None)?;
    let recording = TimeRecordingService::new(&store);
    let CreateProjectOutcome::Created(project) = recording.create_project("A")? else {
        panic!("project A not created");
    };
    let bob = recording.create_employee("Bob")?;
    let alice = recording.create_employee("Alice")?;

    let monday = date(2020, 6, 22);
    let tuesday = date(2020, 6, 23);
    recording.record_time(
        TimeEntryCandidate::new(bob.id, project.id, 120, monday).with_details("code review"),
    )?;
    recording.record_time(TimeEntryCandidate::new(bob.id, project.id, 240, tuesday))?;
    recording.record_time(TimeEntryCandidate::new(alice.id, project.id, 480, monday))?;

    let bobs = recording.entries_for_employee(bob.id)?;
    assert_eq!(bobs.len(), 2);
    assert!(bobs.iter().all(|e| e.employee_id == bob.id));

    let bob_monday = recording.entries_for_employee_on_date(bob.id, monday)?;
    assert_eq!(bob_monday.len(), 1);
    assert_eq!(bob_monday[0].time.minutes(), 120);
    assert_eq!(bob_monday[0].details.as_str(), "code review");
    Ok(())
}
