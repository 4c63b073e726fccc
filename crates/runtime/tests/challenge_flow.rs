//! End-to-end challenge progression against scripted battle outcomes.

mod common;

use common::{Script, scripted_service};
use runtime::{ChallengeRepository, FightOutcome, RuntimeError};

#[tokio::test]
async fn victory_advances_round_and_pre_evolves_next_opponent() {
    let (service, repo) = scripted_service(Script::PlayerWins);

    let state = service.start("hero", false).await.unwrap();
    assert_eq!(state.round, 1);
    assert!(state.current_opponent.is_some());

    let result = service.fight("hero").await.unwrap();
    assert_eq!(result.outcome, FightOutcome::Victory);
    assert_eq!(result.round, 2);

    // Level 5 on the 200-per-level curve needs 1000 XP; 4% at x1.0.
    let reward = result.reward.unwrap();
    assert_eq!(reward.xp, 40);
    assert_eq!(reward.gold, 12);
    assert_eq!(reward.multiplier, 1.0);

    let stored = repo.load("hero").unwrap().unwrap();
    assert_eq!(stored.round, 2);
    assert!(stored.parent_a.is_some());
    assert!(stored.parent_b.is_some());
    assert!(
        stored.current_opponent.is_some(),
        "next round's opponent is staged immediately after a victory"
    );
}

#[tokio::test]
async fn defeat_resets_the_run() {
    let (service, repo) = scripted_service(Script::OpponentWins);

    service.start("hero", false).await.unwrap();
    let result = service.fight("hero").await.unwrap();
    assert_eq!(result.outcome, FightOutcome::Defeat);
    assert_eq!(result.round, 1);
    assert!(result.reward.is_none());

    let stored = repo.load("hero").unwrap().unwrap();
    assert_eq!(stored.round, 1);
    assert!(stored.parent_a.is_none());
    assert!(stored.parent_b.is_none());
    assert!(stored.current_opponent.is_none());
    assert_eq!(stored.last_outcome, Some(FightOutcome::Defeat));
}

#[tokio::test]
async fn timeout_leaves_round_and_opponent_in_place() {
    let (service, repo) = scripted_service(Script::Timeout);

    let before = service.start("hero", false).await.unwrap();
    let opponent_id = before.current_opponent.as_ref().unwrap().character.id.clone();

    let result = service.fight("hero").await.unwrap();
    assert_eq!(result.outcome, FightOutcome::Timeout);
    assert!(result.reward.is_none());
    assert_eq!(result.round, 1);

    let stored = repo.load("hero").unwrap().unwrap();
    assert_eq!(stored.round, 1);
    assert_eq!(
        stored.current_opponent.unwrap().character.id,
        opponent_id,
        "the same opponent waits after a timeout"
    );
}

#[tokio::test]
async fn fight_without_an_opponent_is_an_error() {
    let (service, _repo) = scripted_service(Script::PlayerWins);
    let err = service.fight("hero").await.unwrap_err();
    assert!(matches!(err, RuntimeError::NoOpponent(id) if id == "hero"));
}

#[tokio::test]
async fn start_is_idempotent_until_forced() {
    let (service, _repo) = scripted_service(Script::PlayerWins);

    let first = service.start("hero", false).await.unwrap();
    let second = service.start("hero", false).await.unwrap();
    assert_eq!(first.version, second.version);
    assert_eq!(
        first.current_opponent.as_ref().unwrap().character.id,
        second.current_opponent.as_ref().unwrap().character.id,
    );

    let forced = service.start("hero", true).await.unwrap();
    assert!(forced.version > second.version);
}

#[tokio::test]
async fn status_backfills_missing_preview_and_previews_rewards() {
    let (service, repo) = scripted_service(Script::PlayerWins);
    service.start("hero", false).await.unwrap();

    // Staging computes a preview up front.
    let mut stored = repo.load("hero").unwrap().unwrap();
    assert!(stored.current_opponent.as_ref().unwrap().preview.is_some());

    // A state persisted without one (older data) gets backfilled.
    stored.current_opponent.as_mut().unwrap().preview = None;
    repo.save(stored).unwrap();

    let status = service.status("hero").await.unwrap();
    let preview = status.opponent.expect("preview backfilled");
    assert!(!preview.rotation.is_empty());
    assert!(preview.max_health > 0);

    assert_eq!(status.round, 1);
    assert_eq!(status.reward_preview.multiplier, 1.0);
    assert!((status.next_reward_preview.multiplier - 1.15).abs() < 1e-9);

    // The backfill persisted.
    assert!(
        repo.load("hero")
            .unwrap()
            .unwrap()
            .current_opponent
            .unwrap()
            .preview
            .is_some()
    );
}

#[tokio::test]
async fn unknown_character_is_rejected() {
    let (service, _repo) = scripted_service(Script::PlayerWins);
    let err = service.status("stranger").await.unwrap_err();
    assert!(matches!(err, RuntimeError::CharacterNotFound(id) if id == "stranger"));
}

#[tokio::test]
async fn concurrent_fights_never_lose_round_updates() {
    let (service, repo) = scripted_service(Script::PlayerWins);
    service.start("hero", false).await.unwrap();

    // Each victory stages the next opponent, so both fights find one.
    let a = tokio::spawn({
        let service = service.clone();
        async move { service.fight("hero").await }
    });
    let b = tokio::spawn({
        let service = service.clone();
        async move { service.fight("hero").await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(repo.load("hero").unwrap().unwrap().round, 3);
}
