use super::*;
use crate::store::MemoryStore;

fn config(max_plies: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.self_play.max_plies = max_plies;
    config.self_play.seed = Some(5);
    config
}

fn trainer(max_plies: u32) -> SelfPlayTrainer<MemoryStore> {
    SelfPlayTrainer::from_config(&config(max_plies), MemoryStore::new()).unwrap()
}

#[test]
fn test_from_config_validates() {
    let mut bad = AppConfig::default();
    bad.self_play.repetition_limit = 1;
    assert!(SelfPlayTrainer::from_config(&bad, MemoryStore::new()).is_err());
}

#[test]
fn test_malformed_fen_is_neutral() {
    let mut t = trainer(40);
    assert_eq!(t.evaluate("definitely not chess"), 0.0);

    let choice = t.get_move("8/8/8 w - - 0 1");
    assert_eq!(choice.best_move, None);
    assert_eq!(choice.confidence, 0.0);
}

#[test]
fn test_get_move_is_legal() {
    let mut t = trainer(40);
    let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    let uci = t.get_move(fen).best_move.unwrap();
    assert!(Position::from_fen(fen).unwrap().play_uci(&uci).is_ok());
}

#[test]
fn test_games_end_within_ply_cap() {
    let mut t = trainer(30);
    let report = t.run_self_play(2).unwrap();

    assert_eq!(report.games.len(), 2);
    assert!(!report.cancelled);
    for game in &report.games {
        assert!(game.move_count <= 30);
        assert_eq!(game.move_count, game.moves.len());
        assert!(!game.final_fen.is_empty());
    }
    assert_eq!(t.store().len(), 2);
    assert_eq!(t.store().summaries().len(), 1);
}

#[test]
fn test_training_stats_track_learner() {
    let mut t = trainer(20);
    t.run_self_play(3).unwrap();

    let stats = t.training_stats();
    assert_eq!(stats.games_played, 3);
    assert_eq!(stats.wins + stats.losses + stats.draws, 3);
    assert_eq!(stats.recent_games.len(), 3);
    assert_eq!(stats.epsilon, t.learner().epsilon());
    assert!(stats.epsilon < AppConfig::default().hyperparameters.epsilon);
    assert!(stats.positions_evaluated > 0);
}

#[test]
fn test_stopped_run_saves_nothing() {
    let mut t = trainer(20);
    t.stop_signal().stop();

    let report = t.run_self_play(4).unwrap();
    assert!(report.cancelled);
    assert!(report.games.is_empty());
    assert!(t.store().is_empty());
    assert!(t.store().summaries().is_empty());
}

#[test]
fn test_recent_mode_limits_history() {
    let mut config = config(20);
    config.self_play.recent_games = 2;
    let games = vec![StoredGame::imported(vec!["e2e4".into()], "1-0"); 5];
    let mut t = SelfPlayTrainer::from_config(&config, MemoryStore::with_games(games)).unwrap();

    assert_eq!(t.ingest_history(HistoryMode::Recent).unwrap().processed, 2);
    assert_eq!(t.ingest_history(HistoryMode::All).unwrap().processed, 5);
}

#[test]
fn test_run_follows_configured_history_mode() {
    let games = vec![StoredGame::imported(vec!["e2e4".into()], "1-0"); 5];

    let mut config = config(20);
    config.self_play.history_mode = HistoryMode::Recent;
    config.self_play.recent_games = 2;
    let mut t =
        SelfPlayTrainer::from_config(&config, MemoryStore::with_games(games.clone())).unwrap();
    t.run_self_play(0).unwrap();
    assert_eq!(t.learner().replay().len(), 2);

    config.self_play.history_mode = HistoryMode::All;
    let mut t = SelfPlayTrainer::from_config(&config, MemoryStore::with_games(games)).unwrap();
    t.run_self_play(0).unwrap();
    assert_eq!(t.learner().replay().len(), 5);
}

#[test]
fn test_set_hyperparameters_rejects_bad_values() {
    let mut t = trainer(20);
    let update = HyperparameterUpdate {
        gamma: Some(-0.5),
        ..HyperparameterUpdate::default()
    };
    assert!(t.set_hyperparameters(update).is_err());

    let update = HyperparameterUpdate {
        epsilon: Some(0.5),
        ..HyperparameterUpdate::default()
    };
    t.set_hyperparameters(update).unwrap();
    assert_eq!(t.training_stats().epsilon, 0.5);
}
