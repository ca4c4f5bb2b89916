use super::{BlockPacer, Sleeper, DEFAULT_BLOCK_INTERVAL};
use alloy_primitives::Address;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default, Clone)]
struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().expect("lock").push(duration);
    }
}

#[test]
fn first_submission_never_waits() {
    let mut pacer = BlockPacer::default();
    let now = Instant::now();
    assert_eq!(pacer.remaining(Address::repeat_byte(1), now), Duration::ZERO);
    pacer.record(Address::repeat_byte(1), now);
    assert_eq!(pacer.remaining(Address::repeat_byte(1), now), DEFAULT_BLOCK_INTERVAL);
    assert_eq!(pacer.remaining(Address::repeat_byte(2), now), Duration::ZERO);
}

#[test]
fn remaining_shrinks_with_elapsed_time_per_account() {
    let mut pacer = BlockPacer::new(Duration::from_secs(10));
    let owner = Address::repeat_byte(1);
    let voter = Address::repeat_byte(2);
    let start = Instant::now();
    pacer.record(owner, start);

    assert_eq!(
        pacer.remaining(owner, start + Duration::from_secs(3)),
        Duration::from_secs(7)
    );
    assert_eq!(
        pacer.remaining(owner, start + Duration::from_secs(12)),
        Duration::ZERO
    );
    assert_eq!(pacer.remaining(voter, start), Duration::ZERO);
}

#[test]
fn wait_sleeps_the_remaining_interval() {
    let mut pacer = BlockPacer::new(Duration::from_secs(10));
    let owner = Address::repeat_byte(1);
    let sleeper = RecordingSleeper::default();
    pacer.record(owner, Instant::now());

    let waited = pacer.wait(owner, &sleeper);
    let slept = sleeper.slept.lock().expect("lock").clone();
    assert_eq!(slept, vec![waited]);
    assert!(waited > Duration::from_secs(9));
    assert!(waited <= Duration::from_secs(10));
}

#[test]
fn zero_interval_disables_pacing() {
    let mut pacer = BlockPacer::new(Duration::ZERO);
    let owner = Address::repeat_byte(1);
    let sleeper = RecordingSleeper::default();
    pacer.record(owner, Instant::now());

    assert_eq!(pacer.wait(owner, &sleeper), Duration::ZERO);
    assert!(sleeper.slept.lock().expect("lock").is_empty());
}
