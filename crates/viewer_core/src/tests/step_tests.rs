use super::*;

#[test]
fn value_tracks_clamped_sum_of_signed_moves() {
    let mut step = StepController::new();
    let moves: [i32; 9] = [1, 1, 1, -1, 1, 1, 1, 1, -1];
    let mut expected = 1i32;
    for delta in moves {
        if delta > 0 {
            step.increase();
        } else {
            step.decrease();
        }
        expected = (expected + delta).clamp(STEP_MIN as i32, STEP_MAX as i32);
        assert_eq!(step.value() as i32, expected);
    }
}

#[test]
fn value_never_leaves_bounds() {
    let mut step = StepController::new();
    for _ in 0..20 {
        step.increase();
        assert!((STEP_MIN..=STEP_MAX).contains(&step.value()));
    }
    assert_eq!(step.value(), STEP_MAX);
    for _ in 0..30 {
        step.decrease();
        assert!((STEP_MIN..=STEP_MAX).contains(&step.value()));
    }
    assert_eq!(step.value(), STEP_MIN);
}

#[test]
fn boundary_hits_set_the_fixed_messages() {
    let mut step = StepController::new();
    step.decrease();
    assert_eq!(step.value(), STEP_MIN);
    assert_eq!(step.boundary_message(), LOWER_BOUND_MESSAGE);

    for _ in 0..9 {
        step.increase();
    }
    assert_eq!(step.value(), STEP_MAX);
    step.increase();
    assert_eq!(step.value(), STEP_MAX);
    assert_eq!(step.boundary_message(), UPPER_BOUND_MESSAGE);
}

// Documents current behavior: a successful move after a boundary hit
// does not clear the stale message.
#[test]
fn decrease_after_upper_bound_keeps_stale_message() {
    let mut step = StepController::new();
    for _ in 0..10 {
        step.increase();
    }
    assert_eq!(step.value(), STEP_MAX);
    assert_eq!(step.boundary_message(), UPPER_BOUND_MESSAGE);

    step.decrease();
    assert_eq!(step.value(), 9);
    assert_eq!(step.boundary_message(), UPPER_BOUND_MESSAGE);
}

#[test]
fn reset_restores_initial_value_and_clears_message() {
    let mut step = StepController::new();
    for _ in 0..12 {
        step.increase();
    }
    assert_eq!(step.boundary_message(), UPPER_BOUND_MESSAGE);

    step.reset();
    assert_eq!(step.value(), STEP_MIN);
    assert_eq!(step.boundary_message(), "");
}
