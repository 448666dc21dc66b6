//! SharedFeeder: clock reads, wake-up re-arming and lock serialisation.

use std::sync::Arc;
use std::thread;

use petfeeder::app::commands::{PositionKind, PwmUpdate};
use petfeeder::app::events::AppEvent;
use petfeeder::app::service::FeederService;
use petfeeder::app::shared::SharedFeeder;
use petfeeder::config::FeederConfig;
use petfeeder::fsm::StateId;

use crate::mock_hw::{ManualClock, MockHardware, MockWakeup, RecordingSink};

type TestFeeder = SharedFeeder<MockHardware, RecordingSink, MockWakeup, ManualClock>;

struct Rig {
    feeder: TestFeeder,
    hw: MockHardware,
    sink: RecordingSink,
    wakeup: MockWakeup,
    clock: ManualClock,
}

fn rig() -> Rig {
    let hw = MockHardware::new();
    let sink = RecordingSink::new();
    let wakeup = MockWakeup::new();
    let clock = ManualClock::new();
    let service = FeederService::new(&FeederConfig::default()).unwrap();
    let feeder = SharedFeeder::start(service, hw.clone(), sink.clone(), wakeup.clone(), clock.clone());
    Rig {
        feeder,
        hw,
        sink,
        wakeup,
        clock,
    }
}

#[test]
fn start_homes_servo_and_leaves_timer_disarmed() {
    let r = rig();
    assert_eq!(r.hw.duties(), vec![307]);
    assert_eq!(r.wakeup.arm_count(), 1);
    assert_eq!(r.wakeup.current(), None);
    assert_eq!(r.feeder.state(), StateId::Idle);
}

#[test]
fn feed_arms_wakeup_at_reset_deadline() {
    let r = rig();
    r.clock.set(1000);
    r.feeder.feed_now();
    assert_eq!(r.wakeup.current(), Some(3000));
    assert_eq!(r.hw.last_duty(), Some(256));

    // An early wake-up is a no-op and re-arms the same deadline.
    r.clock.set(2999);
    assert!(r.feeder.poll().is_idle());
    assert_eq!(r.wakeup.current(), Some(3000));

    r.clock.set(3000);
    assert_eq!(r.feeder.poll().resets, 1);
    assert_eq!(r.wakeup.current(), None);
    assert_eq!(r.hw.last_duty(), Some(307));
}

#[test]
fn feed_after_missed_reset_starts_fresh_cycle() {
    let r = rig();
    r.feeder.feed_now();

    // The wake-up at 2000 was never drained.
    r.clock.set(2500);
    r.feeder.feed_now();

    assert_eq!(r.hw.duties(), vec![307, 256, 307, 256]);
    assert_eq!(r.sink.resets(), 1);
    let fresh = r
        .sink
        .count(|e| matches!(e, AppEvent::FeedStarted { rearmed: false, .. }));
    assert_eq!(fresh, 2);
    assert_eq!(r.wakeup.current(), Some(4500));
}

#[test]
fn reads_after_missed_reset_see_idle() {
    let r = rig();
    r.feeder.feed_now();

    r.clock.set(2001);
    let s = r.feeder.settings();
    assert_eq!(s.current_pwm, 307);
    assert_eq!(r.feeder.state(), StateId::Idle);
    assert_eq!(r.hw.last_duty(), Some(307));
    assert_eq!(r.wakeup.current(), None);
}

#[test]
fn interval_change_after_missed_reset_returns_home() {
    let r = rig();
    r.feeder.feed_now();

    r.clock.set(3000);
    r.feeder.set_auto_feed_interval(5);
    assert_eq!(r.sink.resets(), 1);
    assert_eq!(r.hw.last_duty(), Some(307));
    assert_eq!(r.wakeup.current(), Some(3000 + 5 * 60_000));
    assert_eq!(r.feeder.auto_feed_interval(), 5);
}

#[test]
fn wakeup_tracks_earliest_of_reset_and_auto_feed() {
    let r = rig();
    r.feeder.set_auto_feed_interval(1);
    assert_eq!(r.wakeup.current(), Some(60_000));

    r.clock.set(10_000);
    r.feeder.feed_now();
    assert_eq!(r.wakeup.current(), Some(12_000));

    r.clock.set(12_000);
    r.feeder.poll();
    assert_eq!(r.wakeup.current(), Some(60_000));

    r.feeder.set_auto_feed_interval(0);
    assert_eq!(r.wakeup.current(), None);
}

#[test]
fn late_poll_catches_up_in_one_call() {
    let r = rig();
    r.feeder.set_auto_feed_interval(1);

    // Three periods missed: one scheduled feed, then its reset on the
    // next poll, and the grid is kept.
    r.clock.set(185_000);
    let report = r.feeder.poll();
    assert_eq!(report.scheduled_feeds, 1);
    assert_eq!(r.wakeup.current(), Some(187_000));

    r.clock.set(187_000);
    assert_eq!(r.feeder.poll().resets, 1);
    assert_eq!(r.wakeup.current(), Some(240_000));
}

#[test]
fn concurrent_feeds_produce_one_cycle_and_one_reset() {
    let r = rig();
    let feeder = Arc::new(r.feeder);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let feeder = Arc::clone(&feeder);
            thread::spawn(move || {
                for _ in 0..25 {
                    feeder.feed_now();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(r.sink.feeds(), 100);
    let fresh = r
        .sink
        .count(|e| matches!(e, AppEvent::FeedStarted { rearmed: false, .. }));
    assert_eq!(fresh, 1);

    r.clock.set(2000);
    feeder.poll();
    r.clock.set(60_000);
    feeder.poll();
    assert_eq!(r.sink.resets(), 1);
    assert_eq!(feeder.state(), StateId::Idle);
}

#[test]
fn settings_reflect_pwm_updates() {
    let r = rig();
    let outcome = r.feeder.apply_pwm_update(&PwmUpdate {
        pwm: Some(280),
        position: PositionKind::Feed,
        delay_ms: Some(1200),
    });
    assert!(outcome.ok);

    let s = r.feeder.settings();
    assert_eq!(s, outcome.settings);
    assert_eq!(s.feed_pwm, 280);
    assert_eq!(s.reset_delay_ms, 1200);

    r.clock.set(100);
    let receipt = r.feeder.feed_now();
    assert_eq!(receipt.feed_pwm, 280);
    assert_eq!(r.wakeup.current(), Some(1300));
}

#[test]
fn rejected_range_leaves_settings_alone() {
    let r = rig();
    let before = r.feeder.settings();
    assert!(r.feeder.set_clamp_range(500, 100).is_err());
    assert!(r.feeder.set_clamp_range(100, 100_000).is_err());
    assert_eq!(r.feeder.settings(), before);

    let range = r.feeder.set_clamp_range(200, 400).unwrap();
    assert_eq!((range.min(), range.max()), (200, 400));
}
