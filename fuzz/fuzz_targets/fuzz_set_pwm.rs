//! Fuzz target: `/set_pwm` body → `FeederService::apply_pwm_update`
//!
//! Decodes arbitrary bytes as a request body and, when they parse, applies
//! the update to a live service.  Asserts the servo never leaves the clamp
//! range and the reported settings match the service afterwards.
//!
//! cargo fuzz run fuzz_set_pwm

#![no_main]

use libfuzzer_sys::fuzz_target;
use petfeeder::api;
use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::{ActuatorPort, EventSink};
use petfeeder::app::service::FeederService;
use petfeeder::config::FeederConfig;

struct NullHw(u32);

impl ActuatorPort for NullHw {
    fn set_servo_duty(&mut self, duty: u32) {
        self.0 = duty;
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(update) = api::parse_set_pwm(data) else {
        return;
    };

    let Ok(mut svc) = FeederService::new(&FeederConfig::default()) else {
        return;
    };
    let mut hw = NullHw(0);
    svc.start(0, &mut hw, &mut NullSink);

    let outcome = svc.apply_pwm_update(&update, &mut hw, &mut NullSink);
    let s = outcome.settings;
    assert!(s.min_pwm <= hw.0 && hw.0 <= s.max_pwm, "servo left the clamp range");
    assert_eq!(s, svc.settings());
    assert_eq!(api::pwm_status(&outcome) == 200, outcome.ok);
});
