use std::time::Duration;

use simulation::{Arena, ArenaConfig, Pose};
use vidar::rat::{self, RatConfig, RatController, RatProfile};

const STEP: Duration = Duration::from_millis(32);

#[test]
fn rats_stay_inside_the_arena() {
    for profile in [RatProfile::rat0(), RatProfile::rat1()] {
        let mut arena = Arena::new(ArenaConfig {
            time_limit: None,
            ..ArenaConfig::default()
        });
        let mut controller = RatController::new(profile).unwrap();

        let steps = rat::run(&mut arena, &mut controller, STEP, Some(500));
        let pose = arena.pose();

        assert_eq!(steps, 500);
        assert!(pose.x.abs() <= 0.5 && pose.y.abs() <= 0.5);
        assert_ne!(pose, Pose::default());
    }
}

#[test]
fn time_limit_ends_the_run() {
    let mut arena = Arena::new(ArenaConfig {
        time_limit: Some(Duration::from_secs(1)),
        ..ArenaConfig::default()
    });
    let config = RatConfig::default();
    let mut controller = RatController::new(config.profile("rat1").unwrap().clone()).unwrap();

    let steps = rat::run(&mut arena, &mut controller, config.step, None);

    assert_eq!(steps, 31);
}

#[test]
fn rat_rests_on_a_charger() {
    let mut arena = Arena::new(ArenaConfig {
        start: Pose::new(0.4, 0.4, 0.0),
        start_battery: 500.0,
        time_limit: None,
        ..ArenaConfig::default()
    });
    let mut controller = RatController::new(RatProfile::rat0()).unwrap();

    // the first step has nothing to compare the battery with and drives off
    let _ = rat::run(&mut arena, &mut controller, STEP, Some(2));
    let start = arena.pose();
    let _ = rat::run(&mut arena, &mut controller, STEP, Some(20));

    assert!(arena.on_charger());
    assert_eq!(arena.pose(), start);
}
