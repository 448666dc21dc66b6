//! FeederService → feed cycle → actuator pipeline, driven by explicit time.

use petfeeder::app::commands::{PositionKind, PwmUpdate};
use petfeeder::app::events::{AppEvent, FeedSource};
use petfeeder::app::service::FeederService;
use petfeeder::config::FeederConfig;
use petfeeder::error::SettingsError;
use petfeeder::fsm::StateId;

use crate::mock_hw::{MockHardware, RecordingSink};

const MINUTE: u64 = 60_000;

fn make_service(config: FeederConfig) -> (FeederService, MockHardware, RecordingSink) {
    let mut svc = FeederService::new(&config).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    svc.start(0, &mut hw, &mut sink);
    (svc, hw, sink)
}

fn started() -> (FeederService, MockHardware, RecordingSink) {
    make_service(FeederConfig::default())
}

// ── Feed cycle ────────────────────────────────────────────────

#[test]
fn feed_dispenses_then_returns_home_after_delay() {
    let (mut svc, mut hw, mut sink) = started();
    assert_eq!(hw.duties(), vec![307]);

    let receipt = svc.feed_now(0, &mut hw, &mut sink);
    assert_eq!(receipt.feed_pwm, 256);
    assert_eq!(receipt.reset_delay_ms, 2000);
    assert_eq!(svc.state(), StateId::Dispensing);
    assert_eq!(hw.last_duty(), Some(256));

    let report = svc.poll(1999, &mut hw, &mut sink);
    assert!(report.is_idle());
    assert_eq!(hw.last_duty(), Some(256));
    assert_eq!(svc.state(), StateId::Dispensing);

    let report = svc.poll(2001, &mut hw, &mut sink);
    assert_eq!(report.resets, 1);
    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(hw.duties(), vec![307, 256, 307]);
    assert_eq!(svc.next_wakeup_ms(), None);
}

#[test]
fn second_feed_extends_cycle_with_single_reset() {
    let (mut svc, mut hw, mut sink) = started();

    svc.feed_now(0, &mut hw, &mut sink);
    svc.feed_now(1000, &mut hw, &mut sink);
    assert_eq!(svc.next_wakeup_ms(), Some(3000));

    // The first feed's deadline is gone.
    assert!(svc.poll(2500, &mut hw, &mut sink).is_idle());
    assert_eq!(svc.state(), StateId::Dispensing);

    assert_eq!(svc.poll(3000, &mut hw, &mut sink).resets, 1);
    assert!(svc.poll(10_000, &mut hw, &mut sink).is_idle());

    assert_eq!(sink.resets(), 1);
    assert_eq!(svc.cycles_started(), 1);
    assert!(sink.events().iter().any(|e| matches!(
        e,
        AppEvent::FeedStarted { rearmed: true, reset_at_ms: 3000, .. }
    )));
}

#[test]
fn feed_after_expired_deadline_resets_first() {
    let (mut svc, mut hw, mut sink) = started();

    svc.feed_now(0, &mut hw, &mut sink);
    svc.feed_now(2500, &mut hw, &mut sink);

    assert_eq!(hw.duties(), vec![307, 256, 307, 256]);
    assert_eq!(svc.cycles_started(), 2);
    assert_eq!(sink.resets(), 1);
    assert_eq!(svc.next_wakeup_ms(), Some(4500));
}

#[test]
fn zero_delay_resets_on_first_poll() {
    let (mut svc, mut hw, mut sink) = make_service(FeederConfig {
        reset_delay_ms: 0,
        ..FeederConfig::default()
    });

    svc.feed_now(500, &mut hw, &mut sink);
    let report = svc.poll(500, &mut hw, &mut sink);
    assert_eq!(report.resets, 1);
    assert_eq!(svc.state(), StateId::Idle);
    assert_eq!(hw.duties(), vec![307, 256, 307]);
}

#[test]
fn reset_reads_default_position_at_expiry() {
    let (mut svc, mut hw, mut sink) = started();
    svc.feed_now(0, &mut hw, &mut sink);

    let update = PwmUpdate {
        pwm: Some(330),
        position: PositionKind::Default,
        delay_ms: None,
    };
    let outcome = svc.apply_pwm_update(&update, &mut hw, &mut sink);
    assert!(outcome.ok);
    assert_eq!(outcome.message.as_str(), "Default position set to PWM: 330");

    // Setting the default moves the servo but leaves the cycle armed.
    assert_eq!(svc.state(), StateId::Dispensing);
    svc.poll(2000, &mut hw, &mut sink);
    assert_eq!(hw.duties(), vec![307, 256, 330, 330]);
}

// ── Auto-feed ─────────────────────────────────────────────────

#[test]
fn hourly_timer_feeds_at_60_and_120_minutes() {
    let (mut svc, mut hw, mut sink) = started();
    svc.set_auto_feed_interval(60, 0, &mut sink);
    assert_eq!(svc.next_wakeup_ms(), Some(60 * MINUTE));

    assert!(svc.poll(60 * MINUTE - 1, &mut hw, &mut sink).is_idle());

    let report = svc.poll(60 * MINUTE, &mut hw, &mut sink);
    assert_eq!(report.scheduled_feeds, 1);
    assert_eq!(svc.state(), StateId::Dispensing);
    assert_eq!(svc.poll(60 * MINUTE + 2000, &mut hw, &mut sink).resets, 1);

    assert_eq!(svc.poll(120 * MINUTE, &mut hw, &mut sink).scheduled_feeds, 1);
    assert_eq!(svc.next_wakeup_ms(), Some(120 * MINUTE + 2000));

    let scheduled = sink.count(|e| {
        matches!(e, AppEvent::FeedStarted { source: FeedSource::Scheduled, .. })
    });
    assert_eq!(scheduled, 2);
}

#[test]
fn disabling_timer_before_it_fires_cancels_it() {
    let (mut svc, mut hw, mut sink) = started();
    svc.set_auto_feed_interval(30, 0, &mut sink);
    svc.set_auto_feed_interval(0, 10 * MINUTE, &mut sink);

    assert!(svc.poll(30 * MINUTE, &mut hw, &mut sink).is_idle());
    assert!(svc.poll(90 * MINUTE, &mut hw, &mut sink).is_idle());
    assert_eq!(sink.feeds(), 0);
    assert_eq!(svc.auto_feed_interval(), 0);
    assert_eq!(svc.next_wakeup_ms(), None);
}

#[test]
fn new_interval_replaces_old_countdown() {
    let (mut svc, mut hw, mut sink) = started();
    svc.set_auto_feed_interval(10, 0, &mut sink);
    svc.set_auto_feed_interval(5, MINUTE, &mut sink);

    // The 10-minute fire would have been due here.
    assert!(svc.poll(6 * MINUTE - 1, &mut hw, &mut sink).is_idle());
    assert_eq!(svc.poll(6 * MINUTE, &mut hw, &mut sink).scheduled_feeds, 1);
    assert_eq!(svc.auto_feed_interval(), 5);
}

#[test]
fn reset_and_fire_on_same_tick_run_reset_first() {
    let (mut svc, mut hw, mut sink) = started();
    svc.set_auto_feed_interval(1, 0, &mut sink);
    svc.feed_now(MINUTE - 2000, &mut hw, &mut sink);

    let report = svc.poll(MINUTE, &mut hw, &mut sink);
    assert_eq!(report.resets, 1);
    assert_eq!(report.scheduled_feeds, 1);
    assert_eq!(svc.state(), StateId::Dispensing);
    assert_eq!(svc.cycles_started(), 2);
    assert_eq!(hw.duties(), vec![307, 256, 307, 256]);
}

#[test]
fn boot_interval_from_config_is_armed_on_start() {
    let (svc, _, sink) = make_service(FeederConfig {
        auto_feed_minutes: 15,
        ..FeederConfig::default()
    });
    assert_eq!(svc.auto_feed_interval(), 15);
    assert_eq!(svc.next_wakeup_ms(), Some(15 * MINUTE));
    assert!(sink.events().contains(&AppEvent::AutoFeedChanged {
        minutes: 15,
        next_fire_ms: Some(15 * MINUTE),
    }));
}

// ── Clamp range ───────────────────────────────────────────────

#[test]
fn narrowed_range_clamps_feed_position() {
    let (mut svc, mut hw, mut sink) = started();
    svc.set_clamp_range(200, 400, &mut hw, &mut sink).unwrap();

    let outcome = svc.apply_pwm_update(
        &PwmUpdate {
            pwm: Some(500),
            position: PositionKind::Feed,
            delay_ms: None,
        },
        &mut hw,
        &mut sink,
    );
    assert_eq!(outcome.settings.feed_pwm, 400);
    assert_eq!(outcome.message.as_str(), "Feed position set to PWM: 400");

    assert_eq!(svc.feed_now(0, &mut hw, &mut sink).feed_pwm, 400);
    assert_eq!(hw.last_duty(), Some(400));
}

#[test]
fn narrowing_range_pulls_live_position_inside() {
    let (mut svc, mut hw, mut sink) = started();
    svc.set_clamp_range(320, 400, &mut hw, &mut sink).unwrap();

    let s = svc.settings();
    assert_eq!((s.min_pwm, s.max_pwm), (320, 400));
    assert_eq!(s.default_pwm, 320);
    assert_eq!(s.feed_pwm, 320);
    assert_eq!(s.current_pwm, 320);
    assert_eq!(hw.last_duty(), Some(320));
}

#[test]
fn inverted_range_is_rejected_without_side_effects() {
    let (mut svc, mut hw, mut sink) = started();
    let before = svc.settings();
    hw.clear();

    assert_eq!(
        svc.set_clamp_range(400, 200, &mut hw, &mut sink),
        Err(SettingsError::InvertedRange { min: 400, max: 200 })
    );
    assert_eq!(svc.settings(), before);
    assert!(hw.duties().is_empty());
}

// ── /set_pwm semantics ────────────────────────────────────────

#[test]
fn current_position_moves_without_storing() {
    let (mut svc, mut hw, mut sink) = started();
    let outcome = svc.apply_pwm_update(
        &PwmUpdate {
            pwm: Some(9999),
            position: PositionKind::Current,
            delay_ms: Some(500),
        },
        &mut hw,
        &mut sink,
    );

    assert!(outcome.ok);
    assert_eq!(
        outcome.message.as_str(),
        "Current position set to PWM: 512, reset delay set to 500 ms"
    );
    assert_eq!(outcome.settings.current_pwm, 512);
    assert_eq!(outcome.settings.default_pwm, 307);
    assert_eq!(outcome.settings.reset_delay_ms, 500);
}

#[test]
fn unknown_position_still_applies_delay() {
    let (mut svc, mut hw, mut sink) = started();
    hw.clear();
    let outcome = svc.apply_pwm_update(
        &PwmUpdate {
            pwm: Some(300),
            position: PositionKind::from_name("middle"),
            delay_ms: Some(750),
        },
        &mut hw,
        &mut sink,
    );

    assert!(!outcome.ok);
    assert_eq!(
        outcome.message.as_str(),
        "Unknown position type: middle, reset delay set to 750 ms"
    );
    assert_eq!(outcome.settings.reset_delay_ms, 750);
    assert!(hw.duties().is_empty());
}

#[test]
fn missing_pwm_is_reported() {
    let (mut svc, mut hw, mut sink) = started();
    let outcome = svc.apply_pwm_update(
        &PwmUpdate {
            pwm: None,
            position: PositionKind::Default,
            delay_ms: None,
        },
        &mut hw,
        &mut sink,
    );
    assert!(!outcome.ok);
    assert_eq!(outcome.message.as_str(), "Missing or invalid PWM value");
}

#[test]
fn new_delay_applies_to_next_feed_only() {
    let (mut svc, mut hw, mut sink) = started();
    svc.feed_now(0, &mut hw, &mut sink);
    svc.set_reset_delay(5000, &mut sink);
    assert_eq!(svc.next_wakeup_ms(), Some(2000));

    svc.poll(2000, &mut hw, &mut sink);
    svc.feed_now(3000, &mut hw, &mut sink);
    assert_eq!(svc.next_wakeup_ms(), Some(8000));
}
