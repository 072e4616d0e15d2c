//! Property-based tests for fades and volume clamping

use ambience_playback::{FadeCurve, FadePlan, Volume};
use proptest::prelude::*;
use std::time::Duration;

fn any_curve() -> impl Strategy<Value = FadeCurve> {
    prop_oneof![
        Just(FadeCurve::Linear),
        Just(FadeCurve::SquareRoot),
        Just(FadeCurve::SCurve),
        Just(FadeCurve::EqualPower),
    ]
}

proptest! {
    #[test]
    fn volume_always_in_range(level in any::<f32>()) {
        let volume = Volume::new(level);
        prop_assert!((0.0..=1.0).contains(&volume.level()));
    }

    #[test]
    fn in_range_volume_is_kept(level in 0.0f32..=1.0) {
        prop_assert_eq!(Volume::new(level).level(), level);
    }

    #[test]
    fn fade_in_rises_and_lands_on_target(
        target in 0.0f32..=1.0,
        steps in 1u32..64,
        curve in any_curve(),
    ) {
        let plan = FadePlan::new(0.0, target, Duration::from_millis(1000), steps, curve);
        let volumes: Vec<f32> = plan.volumes().collect();

        prop_assert_eq!(volumes.len(), steps as usize);
        prop_assert!(volumes.windows(2).all(|w| w[1] >= w[0]));
        prop_assert!(volumes.iter().all(|v| (0.0..=target).contains(v)));
        prop_assert_eq!(*volumes.last().unwrap(), target);
    }

    #[test]
    fn fade_out_falls_and_reaches_silence(
        from in 0.0f32..=1.0,
        steps in 1u32..64,
        curve in any_curve(),
    ) {
        let plan = FadePlan::new(from, 0.0, Duration::from_millis(1000), steps, curve);
        let volumes: Vec<f32> = plan.volumes().collect();

        prop_assert!(volumes.windows(2).all(|w| w[1] <= w[0]));
        prop_assert!(volumes.iter().all(|v| (0.0..=from).contains(v)));
        prop_assert_eq!(*volumes.last().unwrap(), 0.0);
    }

    #[test]
    fn step_interval_covers_duration(duration_ms in 0u64..5000, steps in 1u32..64) {
        let duration = Duration::from_millis(duration_ms);
        let plan = FadePlan::new(0.0, 1.0, duration, steps, FadeCurve::Linear);

        prop_assert!(plan.step_interval() * steps <= duration);
    }
}
