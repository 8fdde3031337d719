//! Integration tests against a real inotify instance.

use std::ffi::OsStr;
use std::fs::{
    self,
    File,
};
use std::io::Write;
use std::time::Duration;

use inpoll::{
    Channel,
    CycleOutcome,
    Event,
    EventMask,
    Poller,
    WatchMask,
};

/// Polls until a cycle delivers events, retrying timeouts and interrupts a
/// bounded number of times.
fn collect_events(poller: &mut Poller<Channel>) -> Vec<Event> {
    for _ in 0..10 {
        match poller.poll_cycle(Duration::from_secs(1)) {
            CycleOutcome::Ready(events) => return events,
            CycleOutcome::Timeout | CycleOutcome::Interrupted => continue,
            CycleOutcome::Error(error) => panic!("cycle failed: {}", error),
        }
    }
    panic!("no events arrived within ten cycles");
}

#[test]
fn delivers_create_events_for_a_watched_directory() {
    let dir = tempfile::tempdir().expect("failed to create temporary directory");

    let channel = Channel::init().expect("failed to initialize channel");
    let wd = channel
        .watches()
        .add(dir.path(), WatchMask::CREATE)
        .expect("failed to add watch");

    File::create(dir.path().join("observed")).expect("failed to create test file");

    let mut poller = Poller::new(channel);
    let events = collect_events(&mut poller);

    let event = events
        .iter()
        .find(|event| event.mask.contains(EventMask::CREATE))
        .expect("no create event delivered");
    assert_eq!(event.wd, wd);
    assert_eq!(event.name.as_deref(), Some(OsStr::new("observed")));
}

#[test]
fn correlates_rename_events_through_the_cookie() {
    let dir = tempfile::tempdir().expect("failed to create temporary directory");

    let channel = Channel::init().expect("failed to initialize channel");
    channel
        .watches()
        .add(dir.path(), WatchMask::MOVE)
        .expect("failed to add watch");

    File::create(dir.path().join("before")).expect("failed to create test file");
    fs::rename(dir.path().join("before"), dir.path().join("after"))
        .expect("failed to rename test file");

    let mut poller = Poller::new(channel);
    let mut events = Vec::new();
    while events.len() < 2 {
        events.extend(collect_events(&mut poller));
    }

    let from = events
        .iter()
        .find(|event| event.mask.contains(EventMask::MOVED_FROM))
        .expect("no moved-from event delivered");
    let to = events
        .iter()
        .find(|event| event.mask.contains(EventMask::MOVED_TO))
        .expect("no moved-to event delivered");

    assert_ne!(from.cookie, 0);
    assert_eq!(from.cookie, to.cookie);
    assert_eq!(from.name.as_deref(), Some(OsStr::new("before")));
    assert_eq!(to.name.as_deref(), Some(OsStr::new("after")));
}

#[test]
fn reports_timeout_when_nothing_happens() {
    let dir = tempfile::tempdir().expect("failed to create temporary directory");

    let channel = Channel::init().expect("failed to initialize channel");
    channel
        .watches()
        .add(dir.path(), WatchMask::CREATE)
        .expect("failed to add watch");

    let mut poller = Poller::new(channel);
    match poller.poll_cycle(Duration::from_millis(50)) {
        CycleOutcome::Timeout => (),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn removed_watches_deliver_no_further_events() {
    let dir = tempfile::tempdir().expect("failed to create temporary directory");

    let channel = Channel::init().expect("failed to initialize channel");
    let mut watches = channel.watches();
    let wd = watches
        .add(dir.path(), WatchMask::MODIFY)
        .expect("failed to add watch");
    watches.remove(wd).expect("failed to remove watch");

    let mut file = File::create(dir.path().join("ignored")).expect("failed to create test file");
    writeln!(file, "should not be reported").expect("failed to write to test file");

    let mut poller = Poller::new(channel);
    loop {
        match poller.poll_cycle(Duration::from_millis(100)) {
            // The kernel acknowledges the removal with an IGNORED event;
            // nothing else may arrive.
            CycleOutcome::Ready(events) => {
                assert!(events.iter().all(|e| e.mask.contains(EventMask::IGNORED)));
            }
            CycleOutcome::Timeout => break,
            CycleOutcome::Interrupted => continue,
            CycleOutcome::Error(error) => panic!("cycle failed: {}", error),
        }
    }
}

#[test]
fn close_releases_the_channel() {
    let channel = Channel::init().expect("failed to initialize channel");
    channel.close().expect("failed to close channel");
}
