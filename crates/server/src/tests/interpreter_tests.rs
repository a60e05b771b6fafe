use super::*;
use shared::domain::{Location, DEFAULT_LOCATION};

fn run(commands: &[ClientCommand]) -> BoatState {
    commands
        .iter()
        .fold(BoatState::default(), |state, command| next_state(state, command))
}

#[test]
fn power_toggle_sets_flag_verbatim() {
    let on = next_state(BoatState::default(), &ClientCommand::PowerToggle(true));
    assert!(on.power);
    let off = next_state(on, &ClientCommand::PowerToggle(false));
    assert!(!off.power);
}

#[test]
fn forward_and_backward_start_at_min_speed() {
    let forward = run(&[ClientCommand::Forward]);
    assert_eq!(forward.direction, Direction::Cw);
    assert_eq!(forward.speed, forward.min_speed);
    assert!(forward.is_moving);

    let backward = run(&[ClientCommand::Forward, ClientCommand::Backward]);
    assert_eq!(backward.direction, Direction::Ccw);
    assert_eq!(backward.speed, backward.min_speed);
    assert!(backward.is_moving);
}

#[test]
fn forward_resets_a_changed_speed_to_min() {
    let state = run(&[ClientCommand::ChangeSpeed(80.0), ClientCommand::Forward]);
    assert_eq!(state.speed, 30.0);
}

#[test]
fn steering_leaves_motion_untouched_and_overwrites_rotation() {
    let state = run(&[
        ClientCommand::Forward,
        ClientCommand::ChangeSpeed(55.0),
        ClientCommand::Left,
    ]);
    assert_eq!(state.direction, Direction::Left);
    assert_eq!(state.speed, 55.0);
    assert!(state.is_moving);

    let state = next_state(state, &ClientCommand::Right);
    assert_eq!(state.direction, Direction::Right);
    assert_eq!(state.speed, 55.0);
}

#[test]
fn change_speed_is_not_clamped() {
    let state = run(&[ClientCommand::ChangeSpeed(9999.0)]);
    assert_eq!(state.max_speed, 100.0);
    assert_eq!(state.speed, 9999.0);

    let state = run(&[ClientCommand::ChangeSpeed(-5.0)]);
    assert_eq!(state.speed, -5.0);
}

#[test]
fn save_location_stores_any_coordinates() {
    let far = Location {
        latitude: 123.0,
        longitude: -400.0,
    };
    let state = run(&[ClientCommand::SaveLocation(far)]);
    assert_eq!(state.location, far);
}

#[test]
fn stop_resets_motion_but_keeps_power() {
    let busy = run(&[
        ClientCommand::PowerToggle(true),
        ClientCommand::Backward,
        ClientCommand::ChangeSpeed(70.0),
        ClientCommand::SaveLocation(Location {
            latitude: 1.0,
            longitude: 2.0,
        }),
    ]);

    let stopped = next_state(busy, &ClientCommand::Stop);
    assert!(stopped.power);
    assert_eq!(stopped.speed, 0.0);
    assert!(!stopped.is_moving);
    assert_eq!(stopped.direction, Direction::Cw);
    assert_eq!(stopped.location, DEFAULT_LOCATION);
    assert_eq!(stopped.min_speed, busy.min_speed);
    assert_eq!(stopped.max_speed, busy.max_speed);

    assert_eq!(next_state(stopped, &ClientCommand::Stop), stopped);
}

#[test]
fn read_only_commands_do_not_mutate() {
    let state = run(&[ClientCommand::PowerToggle(true), ClientCommand::Forward]);
    assert_eq!(next_state(state, &ClientCommand::GetLocation), state);
    assert_eq!(
        next_state(state, &ClientCommand::VideoFrame(vec![1, 2, 3])),
        state
    );
}

#[test]
fn commands_apply_while_powered_off() {
    let state = run(&[ClientCommand::Forward]);
    assert!(!state.power);
    assert!(state.is_moving);
}

#[test]
fn direction_stays_in_the_closed_set_for_any_sequence() {
    let vocabulary = [
        ClientCommand::PowerToggle(true),
        ClientCommand::Stop,
        ClientCommand::Forward,
        ClientCommand::Backward,
        ClientCommand::Left,
        ClientCommand::Right,
        ClientCommand::ChangeSpeed(42.0),
        ClientCommand::GetLocation,
    ];

    // Walk a deterministic pseudo-random sequence over the vocabulary.
    let mut state = BoatState::default();
    let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let command = &vocabulary[(seed % vocabulary.len() as u64) as usize];
        state = next_state(state, command);
        assert!(matches!(
            state.direction,
            Direction::Cw | Direction::Ccw | Direction::Left | Direction::Right
        ));
        assert!(matches!(state.direction.as_str(), "CW" | "CCW" | "LEFT" | "RIGHT"));
    }
}

#[test]
fn describe_skips_read_only_commands() {
    assert_eq!(describe(&ClientCommand::Forward), Some("boat moving forward"));
    assert_eq!(describe(&ClientCommand::GetLocation), None);
    assert_eq!(describe(&ClientCommand::VideoFrame(Vec::new())), None);
}
