#[cfg(test)]
mod tests {
    use typestrike_core::components::{Approach, CombatEntity, HookState};
    use typestrike_core::constants::*;
    use typestrike_core::enums::{EnemyVariant, EntityState, TerminalCause};
    use typestrike_core::types::{EntityId, Position};

    use crate::fsm::*;
    use crate::hooks::{initial_state, on_defeat, on_tick, Effect};
    use crate::profiles::get_profile;

    fn make_entity(variant: EnemyVariant, sentences: &[&str]) -> CombatEntity {
        CombatEntity {
            id: EntityId(7),
            variant,
            wave: 1,
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
            active_sentence: 0,
            typed_index: 0,
            mistake_count: 0,
            size_factor: 1.0,
            state: EntityState::Spawned,
            spawn_tick: 0,
            acquired_tick: None,
            sentence_started_tick: None,
            sentence_mistakes: 0,
            fast_sentences: 0,
            clean_sentences: 0,
            terminal_cause: None,
            terminal_tick: None,
            hook: initial_state(&get_profile(variant)),
        }
    }

    fn targeted(variant: EnemyVariant, sentences: &[&str], tick: u64) -> CombatEntity {
        let mut e = make_entity(variant, sentences);
        enter_stage(&mut e);
        assert!(acquire(&mut e, tick));
        e
    }

    fn type_str(e: &mut CombatEntity, text: &str, start_tick: u64) -> Vec<KeystrokeOutcome> {
        let profile = get_profile(e.variant);
        text.chars()
            .enumerate()
            .map(|(i, ch)| on_keystroke(e, &profile, ch, start_tick + i as u64))
            .collect()
    }

    // ---- Policy table ----

    #[test]
    fn test_only_kamikaze_has_zero_tolerance() {
        for v in EnemyVariant::ALL {
            let profile = get_profile(v);
            if v == EnemyVariant::Kamikaze {
                assert_eq!(profile.mistake_tolerance, Some(0));
            } else {
                assert_eq!(profile.mistake_tolerance, None, "{v} should be unbounded");
            }
        }
    }

    #[test]
    fn test_multi_sentence_variants() {
        for v in EnemyVariant::ALL {
            let count = get_profile(v).sentence_count;
            match v {
                EnemyVariant::Deflatable | EnemyVariant::Boss => assert!(count > 1),
                _ => assert_eq!(count, 1, "{v} carries one sentence"),
            }
        }
    }

    #[test]
    fn test_normal_speed_window_is_three_seconds() {
        assert_eq!(get_profile(EnemyVariant::Normal).speed_threshold_ticks, 180);
    }

    // ---- Lifecycle ----

    #[test]
    fn test_spawned_enters_approaching() {
        let mut e = make_entity(EnemyVariant::Normal, &["cat"]);
        enter_stage(&mut e);
        assert_eq!(e.state, EntityState::Approaching);
    }

    #[test]
    fn test_acquire_keeps_first_tick() {
        let mut e = targeted(EnemyVariant::Normal, &["cat"], 10);
        assert!(release(&mut e));
        assert_eq!(e.state, EntityState::Approaching);
        assert!(acquire(&mut e, 50));
        assert_eq!(e.acquired_tick, Some(10));
    }

    #[test]
    fn test_terminate_is_once_only() {
        let mut e = targeted(EnemyVariant::Normal, &["cat"], 0);
        assert!(terminate(&mut e, EntityState::Defeated, TerminalCause::Typed, 5));
        assert!(!terminate(&mut e, EntityState::ReachedPlayer, TerminalCause::Reached, 6));
        assert_eq!(e.state, EntityState::Defeated);
        assert_eq!(e.terminal_tick, Some(5));
    }

    // ---- Keystrokes ----

    #[test]
    fn test_normal_typed_to_defeat() {
        let mut e = targeted(EnemyVariant::Normal, &["cat"], 0);
        let outcomes = type_str(&mut e, "cat", 0);
        assert_eq!(
            outcomes,
            vec![
                KeystrokeOutcome::Correct,
                KeystrokeOutcome::Correct,
                KeystrokeOutcome::Completed
            ]
        );
        assert_eq!(e.state, EntityState::Defeated);
        assert_eq!(e.terminal_cause, Some(TerminalCause::Typed));

        let class = classify_kill(&e, &get_profile(EnemyVariant::Normal), 2);
        assert!(class.is_perfect_kill);
        assert!(class.is_speed_kill);
    }

    #[test]
    fn test_mistake_keeps_progress() {
        let mut e = targeted(EnemyVariant::Normal, &["cat"], 0);
        let outcomes = type_str(&mut e, "cxa", 0);
        assert_eq!(outcomes[1], KeystrokeOutcome::Mistake);
        assert_eq!(e.typed_index, 2);
        assert_eq!(e.mistake_count, 1);
        assert_eq!(e.state, EntityState::Targeted);
    }

    #[test]
    fn test_kamikaze_faints_on_first_mistake() {
        let mut e = targeted(EnemyVariant::Kamikaze, &["dog"], 0);
        let outcomes = type_str(&mut e, "dx", 0);
        assert_eq!(outcomes, vec![KeystrokeOutcome::Correct, KeystrokeOutcome::Fainted]);
        assert_eq!(e.state, EntityState::Fainted);
        assert_eq!(e.terminal_cause, Some(TerminalCause::Faint));
    }

    #[test]
    fn test_untargeted_entity_ignores_keystrokes() {
        let mut e = make_entity(EnemyVariant::Normal, &["cat"]);
        enter_stage(&mut e);
        let profile = get_profile(EnemyVariant::Normal);
        assert_eq!(on_keystroke(&mut e, &profile, 'c', 0), KeystrokeOutcome::Ignored);
        assert_eq!(e.typed_index, 0);
        assert!(accepts_first(&e, 'c'));
        assert!(!accepts_first(&e, 'a'));
    }

    #[test]
    fn test_slow_kill_is_not_speed_kill() {
        let mut e = targeted(EnemyVariant::Normal, &["cat"], 0);
        let profile = get_profile(EnemyVariant::Normal);
        on_keystroke(&mut e, &profile, 'c', 0);
        on_keystroke(&mut e, &profile, 'a', 100);
        on_keystroke(&mut e, &profile, 't', 180);
        let class = classify_kill(&e, &profile, 180);
        assert!(!class.is_speed_kill, "180 ticks is not under the 180 tick window");
        assert!(class.is_perfect_kill);
        assert!(!KillClass::default().earned_bonus());
    }

    #[test]
    fn test_deflatable_advances_sentences_and_shrinks() {
        let mut e = targeted(EnemyVariant::Deflatable, &["ab", "cd", "ef"], 0);
        let outcomes = type_str(&mut e, "ab", 0);
        assert_eq!(outcomes[1], KeystrokeOutcome::SentenceCleared { sentence: 0 });
        assert_eq!(e.active_sentence, 1);
        assert_eq!(e.typed_index, 0);
        assert_eq!(e.state, EntityState::Targeted);
        let expected = 1.0 - 2.0 * DEFLATE_PER_KEYSTROKE - DEFLATE_PER_SENTENCE;
        assert!((e.size_factor - expected).abs() < 1e-9);

        type_str(&mut e, "cxd", 10);
        let outcomes = type_str(&mut e, "ef", 20);
        assert_eq!(outcomes[1], KeystrokeOutcome::Completed);
        assert_eq!(e.fast_sentences, 3);
        assert_eq!(e.clean_sentences, 2, "second sentence had a mistake");
        assert!(e.size_factor >= MIN_SIZE_FACTOR);
    }

    // ---- Approach ----

    #[test]
    fn test_approach_reaches_player() {
        let mut approach = Approach {
            progress: 0.0,
            speed_multiplier: 1.0,
            spawn_point: Position::new(0.0, SPAWN_DISTANCE),
        };
        let mut reached_at = None;
        for tick in 0..2000 {
            if advance_approach(&mut approach, false, 1.0) {
                reached_at = Some(tick);
                break;
            }
        }
        let reached_at = reached_at.expect("should reach the player");
        assert!((BASE_APPROACH_TICKS as u64 - 2..=BASE_APPROACH_TICKS as u64).contains(&reached_at));
        assert_eq!(approach.progress, 1.0);
    }

    #[test]
    fn test_frozen_approach_does_not_move() {
        let mut approach = Approach {
            progress: 0.5,
            speed_multiplier: 2.0,
            spawn_point: Position::ZERO,
        };
        assert!(!advance_approach(&mut approach, true, 1.0));
        assert_eq!(approach.progress, 0.5);
    }

    // ---- Hooks ----

    #[test]
    fn test_explosive_grows_until_burst() {
        let mut e = make_entity(EnemyVariant::Explosive, &["boom"]);
        enter_stage(&mut e);
        let profile = get_profile(EnemyVariant::Explosive);
        let mut burst = None;
        for tick in 0..5000u32 {
            if let Some(effect) = on_tick(&mut e, &profile) {
                burst = Some((tick, effect));
                break;
            }
        }
        let (_, effect) = burst.expect("explosive should burst");
        assert_eq!(effect, Effect::Burst { source: e.id });
        assert!(e.size_factor >= EXPLOSIVE_BURST_SIZE);
    }

    #[test]
    fn test_dancing_imposes_freeze_once() {
        let mut e = make_entity(EnemyVariant::Dancing, &["cha"]);
        enter_stage(&mut e);
        let profile = get_profile(EnemyVariant::Dancing);
        assert_eq!(on_tick(&mut e, &profile), Some(Effect::ImposeFreeze { source: e.id }));
        assert_eq!(on_tick(&mut e, &profile), None);

        terminate(&mut e, EntityState::ReachedPlayer, TerminalCause::Reached, 9);
        assert_eq!(
            on_defeat(&e, &profile, None),
            Some(Effect::ReleaseFreeze { source: e.id })
        );
    }

    #[test]
    fn test_boss_fires_on_interval() {
        let mut e = make_entity(EnemyVariant::Boss, &["a", "b", "c", "d", "e"]);
        enter_stage(&mut e);
        let profile = get_profile(EnemyVariant::Boss);
        let shots: Vec<u32> = (1..=BOSS_PROJECTILE_INTERVAL_TICKS * 2)
            .filter(|_| on_tick(&mut e, &profile).is_some())
            .collect();
        assert_eq!(
            shots,
            vec![BOSS_PROJECTILE_INTERVAL_TICKS, BOSS_PROJECTILE_INTERVAL_TICKS * 2]
        );
    }

    #[test]
    fn test_backward_asks_until_linked() {
        let mut e = make_entity(EnemyVariant::Backward, &["olleh"]);
        enter_stage(&mut e);
        let profile = get_profile(EnemyVariant::Backward);
        assert_eq!(on_tick(&mut e, &profile), Some(Effect::ReverseSibling { source: e.id }));
        e.hook = HookState::Backward {
            reversing: Some(EntityId(3)),
        };
        assert_eq!(on_tick(&mut e, &profile), None);

        terminate(&mut e, EntityState::Defeated, TerminalCause::Typed, 4);
        assert_eq!(
            on_defeat(&e, &profile, Some(KillClass::default())),
            Some(Effect::RestoreSibling {
                source: e.id,
                sibling: EntityId(3)
            })
        );
    }

    #[test]
    fn test_explosive_defeat_explodes_only_without_bonus() {
        let profile = get_profile(EnemyVariant::Explosive);
        let mut e = targeted(EnemyVariant::Explosive, &["boom"], 0);
        type_str(&mut e, "boom", 0);

        let bonus = KillClass {
            is_speed_kill: true,
            is_perfect_kill: false,
        };
        assert_eq!(on_defeat(&e, &profile, Some(bonus)), None);
        assert_eq!(
            on_defeat(&e, &profile, Some(KillClass::default())),
            Some(Effect::ChainExplosion { source: e.id })
        );
    }

    #[test]
    fn test_horde_enrages_only_on_typed_defeat() {
        let profile = get_profile(EnemyVariant::Horde);
        let mut e = targeted(EnemyVariant::Horde, &["imp"], 0);
        terminate(&mut e, EntityState::ReachedPlayer, TerminalCause::Reached, 3);
        assert_eq!(on_defeat(&e, &profile, None), None);

        let mut e = targeted(EnemyVariant::Horde, &["imp"], 0);
        type_str(&mut e, "imp", 0);
        assert!(matches!(
            on_defeat(&e, &profile, None),
            Some(Effect::EnragePack { .. })
        ));
    }
}
