use crate::commands::PlayerInput;
use crate::components::{CombatEntity, HookState};
use crate::enums::*;
use crate::events::{CombatEvent, ScoreEvent};
use crate::state::StageSnapshot;
use crate::types::{secs_to_ticks, EntityId, SimTime};

fn entity(sentences: &[&str]) -> CombatEntity {
    CombatEntity {
        id: EntityId(1),
        variant: EnemyVariant::Normal,
        wave: 1,
        sentences: sentences.iter().map(|s| s.to_string()).collect(),
        active_sentence: 0,
        typed_index: 0,
        mistake_count: 0,
        size_factor: 1.0,
        state: EntityState::Approaching,
        spawn_tick: 0,
        acquired_tick: None,
        sentence_started_tick: None,
        sentence_mistakes: 0,
        fast_sentences: 0,
        clean_sentences: 0,
        terminal_cause: None,
        terminal_tick: None,
        hook: HookState::None,
    }
}

// ---- Variants ----

#[test]
fn test_variant_parse_is_case_insensitive() {
    assert_eq!("boss".parse::<EnemyVariant>(), Ok(EnemyVariant::Boss));
    assert_eq!(" Kamikaze ".parse::<EnemyVariant>(), Ok(EnemyVariant::Kamikaze));
    for v in EnemyVariant::ALL {
        assert_eq!(v.name().parse::<EnemyVariant>(), Ok(v));
    }
}

#[test]
fn test_variant_parse_rejects_unknown() {
    let err = "Ghost".parse::<EnemyVariant>().unwrap_err();
    assert_eq!(err.0, "Ghost");
    assert_eq!(err.to_string(), "unknown enemy variant `Ghost`");
}

// ---- Entity state ----

#[test]
fn test_terminal_states() {
    assert!(EntityState::Defeated.is_terminal());
    assert!(EntityState::ReachedPlayer.is_terminal());
    assert!(EntityState::Fainted.is_terminal());
    assert!(EntityState::Spawned.is_active());
    assert!(EntityState::Approaching.is_active());
    assert!(EntityState::Targeted.is_active());
}

#[test]
fn test_expected_char_walks_unicode() {
    let mut e = entity(&["héllo"]);
    assert_eq!(e.expected_char(), Some('h'));
    e.typed_index = 1;
    assert_eq!(e.expected_char(), Some('é'));
    assert_eq!(e.current_len(), 5);
    e.typed_index = 5;
    assert_eq!(e.expected_char(), None);
}

#[test]
fn test_last_sentence() {
    let mut e = entity(&["one", "two"]);
    assert!(!e.is_last_sentence());
    e.active_sentence = 1;
    assert!(e.is_last_sentence());
    assert_eq!(e.current_sentence(), Some("two"));
}

// ---- Difficulty ----

#[test]
fn test_difficulty_scales_cap() {
    assert_eq!(Difficulty::Normal.scale_cap(4), 4);
    assert_eq!(Difficulty::Easy.scale_cap(4), 3);
    assert_eq!(Difficulty::Hard.scale_cap(4), 5);
    assert_eq!(Difficulty::Easy.scale_cap(1), 1, "never below one slot");
}

#[test]
fn test_difficulty_parse() {
    assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
    let err = "Nightmare".parse::<Difficulty>().unwrap_err();
    assert_eq!(err, UnknownDifficulty("Nightmare".to_string()));
    assert_eq!(err.to_string(), "unknown difficulty `Nightmare`");
}

// ---- Time ----

#[test]
fn test_sim_time_advance() {
    let mut time = SimTime::default();
    for _ in 0..60 {
        time.advance();
    }
    assert_eq!(time.tick, 60);
    // 60 ticks at 60Hz = 1 second
    assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    assert_eq!(secs_to_ticks(3.0), 180);
}

// ---- Wire shapes ----

#[test]
fn test_player_input_is_tagged() {
    let json = serde_json::to_string(&PlayerInput::key('x')).unwrap();
    assert_eq!(json, r#"{"type":"Key","ch":"x"}"#);
    let back: PlayerInput = serde_json::from_str(r#"{"type":"SwitchTarget"}"#).unwrap();
    assert_eq!(back, PlayerInput::SwitchTarget);
}

#[test]
fn test_score_event_total() {
    let event = ScoreEvent {
        entity_id: EntityId(3),
        variant: EnemyVariant::Normal,
        base_score: 100,
        speed_bonus: 50,
        perfect_bonus: 50,
        is_speed_kill: true,
        is_perfect_kill: true,
        tick: 10,
    };
    assert_eq!(event.total(), 200);
    let json = serde_json::to_string(&CombatEvent::Score(event.clone())).unwrap();
    let back: CombatEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, CombatEvent::Score(event));
}

#[test]
fn test_empty_snapshot_is_small() {
    let snapshot = StageSnapshot::default();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: StageSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.time.tick, 0);
    assert_eq!(back.phase, StagePhase::Running);
    assert!(json.len() < 1024, "empty snapshot was {} bytes", json.len());
}
