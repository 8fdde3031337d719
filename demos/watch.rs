use std::env;

use inpoll::{
    Channel,
    CycleOutcome,
    EventMask,
    Poller,
    WatchMask,
};

fn main() {
    let channel = Channel::init().expect("Failed to initialize inotify channel");

    let current_dir = env::current_dir().expect("Failed to determine current directory");

    channel
        .watches()
        .add(
            &current_dir,
            WatchMask::MODIFY | WatchMask::CREATE | WatchMask::DELETE,
        )
        .expect("Failed to add watch");

    println!("Watching current directory for activity...");

    let mut poller = Poller::new(channel);
    loop {
        let events = match poller.poll_cycle_default() {
            CycleOutcome::Ready(events) => events,
            CycleOutcome::Timeout | CycleOutcome::Interrupted => continue,
            CycleOutcome::Error(error) => {
                eprintln!("Cycle failed: {}", error);
                break;
            }
        };

        for event in events {
            let kind = if event.mask.contains(EventMask::ISDIR) {
                "Directory"
            } else {
                "File"
            };

            if event.mask.contains(EventMask::CREATE) {
                println!("{} created: {:?}", kind, event.name);
            } else if event.mask.contains(EventMask::DELETE) {
                println!("{} deleted: {:?}", kind, event.name);
            } else if event.mask.contains(EventMask::MODIFY) {
                println!("{} modified: {:?}", kind, event.name);
            }
        }
    }
}
