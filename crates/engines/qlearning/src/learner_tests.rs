use super::*;

fn learner(params: Hyperparameters) -> QLearner {
    QLearner::new(params, Some(7)).unwrap()
}

/// Hyperparameters with replay disabled for the duration of a test.
fn no_replay() -> Hyperparameters {
    Hyperparameters {
        min_replay_size: usize::MAX,
        ..Hyperparameters::default()
    }
}

fn key(s: &str) -> Fingerprint {
    Fingerprint::from(s)
}

#[test]
fn test_rejects_invalid_params() {
    let params = Hyperparameters {
        alpha: 0.0,
        ..Hyperparameters::default()
    };
    assert!(QLearner::new(params, None).is_err());
}

#[test]
fn test_checkmate_is_fixed_and_not_cached() {
    let mut q = learner(Hyperparameters::default());
    let white_mated =
        Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
    let black_mated =
        Position::from_fen("r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
            .unwrap();

    assert_eq!(q.evaluate(&white_mated), -100.0);
    assert_eq!(q.evaluate(&black_mated), 100.0);
    assert_eq!(q.evaluate(&white_mated), -100.0);
    assert!(q.values().is_empty());
    assert_eq!(q.positions_evaluated(), 3);
}

#[test]
fn test_draws_evaluate_to_zero() {
    let mut q = learner(Hyperparameters::default());
    let stalemate = Position::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    let bare_kings = Position::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert_eq!(q.evaluate(&stalemate), 0.0);
    assert_eq!(q.evaluate(&bare_kings), 0.0);
    assert!(q.values().is_empty());
}

#[test]
fn test_fallback_value_is_cached() {
    let mut q = learner(Hyperparameters::default());
    let pos = Position::startpos();

    let first = q.evaluate(&pos);
    // Equal material: only the White bias and jitter remain.
    assert!((first - 0.25).abs() <= 0.15 + 1e-12);
    assert_eq!(q.evaluate(&pos), first);
    assert_eq!(q.values().len(), 1);

    // White is a queen up.
    let queen_up = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
    let value = q.evaluate(&queen_up);
    assert!((value - 9.25).abs() <= 0.15 + 1e-12);
}

#[test]
fn test_evaluate_fen_rejects_garbage() {
    let mut q = learner(Hyperparameters::default());
    assert!(q.evaluate_fen("not a fen").is_err());
    assert!(q.evaluate_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").is_ok());
}

#[test]
fn test_single_update_changes_state_only() {
    let mut q = learner(no_replay());
    let (s, next) = (key("s:0.00"), key("t:0.00"));
    q.nudge(&s, 2.0);
    q.nudge(&next, 4.0);

    q.update(Transition::new(s.clone(), "e2e4", 1.0, next.clone()));

    // 2 + 0.01 * (1 + 0.95 * 4 - 2)
    let expected = 2.0 + 0.01 * (1.0 + 0.95 * 4.0 - 2.0);
    assert!((q.values().get(&s).unwrap() - expected).abs() < 1e-12);
    assert_eq!(q.values().get(&next), Some(4.0));
}

#[test]
fn test_update_creates_missing_entries() {
    let mut q = learner(no_replay());
    let (s, next) = (key("a:0.00"), key("b:0.00"));
    q.update(Transition::new(s.clone(), "g1f3", 1.0, next.clone()));

    assert!((q.values().get(&s).unwrap() - 0.01).abs() < 1e-12);
    assert_eq!(q.values().get(&next), Some(0.0));
    assert_eq!(q.replay().len(), 1);
}

#[test]
fn test_epsilon_decays_geometrically_to_floor() {
    let params = Hyperparameters {
        epsilon: 0.5,
        epsilon_decay: 0.9,
        epsilon_min: 0.1,
        ..no_replay()
    };
    let mut q = learner(params);

    for n in 1..=5 {
        q.update(Transition::new(key("s:0.00"), "a2a3", 0.0, key("t:0.00")));
        assert!((q.epsilon() - 0.5 * 0.9f64.powi(n)).abs() < 1e-12);
    }
    for _ in 0..100 {
        q.update(Transition::new(key("s:0.00"), "a2a3", 0.0, key("t:0.00")));
        assert!(q.epsilon() >= 0.1);
        assert!(q.epsilon() <= q.initial_epsilon());
    }
    assert_eq!(q.epsilon(), 0.1);
}

#[test]
fn test_replay_pass_triggers_at_threshold() {
    let params = Hyperparameters {
        batch_size: 4,
        min_replay_size: 3,
        ..Hyperparameters::default()
    };
    let mut q = learner(params);

    let t = |i: usize| {
        Transition::new(
            key(&format!("s{i}:0.00")),
            "e2e4",
            1.0,
            key(&format!("s{}:0.00", i + 1)),
        )
    };
    assert_eq!(q.update(t(0)), 0);
    assert_eq!(q.update(t(1)), 0);
    // Buffer holds 3: the whole buffer is sampled.
    assert_eq!(q.update(t(2)), 3);
    assert_eq!(q.update(t(3)), 4);
}

#[test]
fn test_replay_uses_half_alpha_and_keeps_epsilon() {
    let mut q = learner(no_replay());
    let (s, next) = (key("r:0.00"), key("u:0.00"));
    q.remember(Transition::new(s.clone(), "d2d4", 2.0, next.clone()));
    let epsilon = q.epsilon();

    assert_eq!(q.replay_pass(), 1);
    assert!((q.values().get(&s).unwrap() - 0.005 * 2.0).abs() < 1e-12);
    assert_eq!(q.epsilon(), epsilon);
}

#[test]
fn test_replay_treats_bad_next_value_as_zero() {
    let mut q = learner(no_replay());
    let (s, next) = (key("p:0.00"), key("q:0.00"));
    q.nudge(&next, f64::NAN);
    q.remember(Transition::new(s.clone(), "c2c4", 1.0, next));

    q.replay_pass();
    let value = q.values().get(&s).unwrap();
    assert!(value.is_finite());
    assert!((value - 0.005).abs() < 1e-12);
}

#[test]
fn test_set_hyperparameters() {
    let mut q = learner(no_replay());
    q.set_hyperparameters(HyperparameterUpdate {
        epsilon: Some(0.4),
        alpha: Some(0.2),
        gamma: None,
    })
    .unwrap();
    assert_eq!(q.epsilon(), 0.4);
    assert_eq!(q.initial_epsilon(), 0.4);
    assert_eq!(q.params().alpha, 0.2);
    assert_eq!(q.params().gamma, 0.95);

    // One bad value rejects the whole update.
    let err = q.set_hyperparameters(HyperparameterUpdate {
        epsilon: Some(0.3),
        alpha: None,
        gamma: Some(1.5),
    });
    assert!(err.is_err());
    assert_eq!(q.epsilon(), 0.4);
    assert_eq!(q.params().gamma, 0.95);
}

#[test]
fn test_seeded_learners_agree() {
    let pos = Position::startpos();
    let mut a = learner(Hyperparameters::default());
    let mut b = learner(Hyperparameters::default());
    assert_eq!(a.evaluate(&pos), b.evaluate(&pos));
    assert_eq!(a.roll(), b.roll());
}
