//! Selection flows driven through EffectStoreTestHarness

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use starter_select::{
    action::Action,
    audio::Cue,
    dex::{DexAttr, DexEntry, SaveData, Unlocks},
    effect::Effect,
    reducer::reducer,
    species::{Abilities, Catalog, GrowthRate, Species},
    sprite::SpriteData,
    state::{AppState, BrowseMode, Button, GameMode, InputOutcome, Overlay},
};
use tui_dispatch::testing::*;

fn species(id: u16, value: u8) -> Species {
    Species {
        id,
        name: format!("Mon{id}"),
        generation: 1,
        forms: Vec::new(),
        abilities: Abilities {
            primary: "Run Away".into(),
            secondary: None,
            hidden: None,
        },
        male_percent: Some(50.0),
        growth_rate: GrowthRate::MediumFast,
        value,
    }
}

fn caught() -> DexEntry {
    DexEntry {
        caught_attr: DexAttr::NON_SHINY
            .union(DexAttr::MALE)
            .union(DexAttr::ABILITY_1)
            .union(DexAttr::DEFAULT_FORM),
        default_attr: None,
        ivs: [10; 6],
    }
}

/// Caught generation-1 species, one per value
fn state_with_values(values: &[u8], endless_mode: bool) -> AppState {
    let roster = values
        .iter()
        .enumerate()
        .map(|(i, value)| species(i as u16 + 1, *value))
        .collect();
    let catalog = Catalog::from_species(roster).unwrap();
    let save = SaveData {
        dex: (1..=values.len() as u16).map(|id| (id, caught())).collect(),
        unlocks: Unlocks { endless_mode },
    };
    AppState::new(catalog, save, 7, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
}

fn press(button: Button) -> Action {
    Action::Press(button)
}

/// Open the option menu on the cursored species and pick "Add to Party"
macro_rules! add_current {
    ($harness:expr) => {
        $harness.dispatch_collect(press(Button::Confirm));
        $harness.dispatch_collect(press(Button::Confirm));
    };
}

#[test]
fn test_budget_overflow_flashes_then_reverts() {
    let mut harness =
        EffectStoreTestHarness::new(state_with_values(&[4, 4, 3, 1, 2, 1, 2, 3, 1], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.assert_state(|s| s.budget.label() == "8/10");
    harness.drain_effects();

    harness.dispatch_collect(press(Button::Right));
    harness.dispatch_collect(press(Button::Confirm));
    harness.drain_effects();
    harness.dispatch_collect(press(Button::Confirm));

    harness.assert_state(|s| s.party.len() == 2);
    harness.assert_state(|s| s.last_outcome == InputOutcome::Error);
    harness.assert_state(|s| s.budget.label() == "11/10" && s.budget.over_limit);

    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_first_matches(|e| matches!(e, Effect::ScheduleValueRevert));

    harness.complete_action(Action::ValueRevert);
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));
    harness.assert_state(|s| s.budget.label() == "8/10" && !s.budget.over_limit);
}

#[test]
fn test_repeated_overflow_coalesces_into_one_revert() {
    let mut harness =
        EffectStoreTestHarness::new(state_with_values(&[4, 4, 3, 5, 1, 1, 1, 1, 1], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.assert_state(|s| s.budget.label() == "11/10" && s.budget.revert_pending);
    harness.drain_effects();

    harness.dispatch_collect(press(Button::Right));
    harness.dispatch_collect(press(Button::Confirm));
    harness.drain_effects();
    harness.dispatch_collect(press(Button::Confirm));
    harness.assert_state(|s| s.budget.label() == "13/10" && s.budget.revert_pending);
    harness.assert_state(|s| s.party.len() == 2);

    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_first_matches(|e| matches!(e, Effect::ScheduleValueRevert));

    // The debounced task fires once and restores the committed sum
    harness.complete_action(Action::ValueRevert);
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 1);
    harness.assert_state(|s| s.budget.label() == "8/10" && !s.budget.revert_pending);

    harness.complete_action(Action::ValueRevert);
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
}

#[test]
fn test_party_change_cancels_pending_revert() {
    let mut harness =
        EffectStoreTestHarness::new(state_with_values(&[5, 6, 1, 1, 1, 1, 1, 1, 1], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.assert_state(|s| s.budget.revert_pending);
    harness.drain_effects();

    harness.dispatch_collect(press(Button::Cancel));
    harness.assert_state(|s| s.party.is_empty() && s.budget.label() == "0/10");
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::CancelValueRevert));

    // A late revert is a no-op once the label is restored
    harness.complete_action(Action::ValueRevert);
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
}

#[test]
fn test_third_pick_opens_confirm_and_starts_classic() {
    let mut harness =
        EffectStoreTestHarness::new(state_with_values(&[1, 2, 3, 1, 1, 1, 1, 1, 1], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);

    harness.assert_state(|s| s.party.len() == 3);
    harness.assert_state(|s| s.overlay == Overlay::ConfirmStart { selected: 0 });
    harness.drain_effects();

    harness.dispatch_collect(press(Button::Confirm));
    harness.assert_state(|s| s.overlay == Overlay::None);
    harness.assert_state(|s| {
        s.run
            .as_ref()
            .is_some_and(|run| run.game_mode == GameMode::Classic && run.starters.len() == 3)
    });

    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| {
        matches!(e, Effect::StartRun(run) if run.starters.iter().map(|s| s.species_id).eq([1u16, 2, 3]))
    });

    // Input is frozen once the run is handed off
    let changed = harness.dispatch_all([press(Button::Cancel), press(Button::Left)]);
    assert_eq!(changed, vec![true, false]);
    harness.assert_state(|s| s.party.len() == 3);
}

#[test]
fn test_endless_unlock_asks_for_game_mode() {
    let mut harness =
        EffectStoreTestHarness::new(state_with_values(&[1, 1, 1, 1, 1, 1, 1, 1, 1], true), reducer);

    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    // A single-row grid parks on Start when leaving from column 0
    harness.dispatch_collect(press(Button::Left));
    harness.assert_state(|s| s.mode == BrowseMode::Start);

    harness.dispatch_collect(press(Button::Confirm));
    harness.assert_state(|s| s.overlay == Overlay::ConfirmStart { selected: 0 });
    harness.dispatch_collect(press(Button::Confirm));
    harness.assert_state(|s| s.overlay == Overlay::GameModeSelect { selected: 0 });
    harness.dispatch_collect(press(Button::Down));
    harness.drain_effects();
    harness.dispatch_collect(press(Button::Confirm));

    harness.assert_state(|s| s.run.as_ref().map(|run| run.game_mode) == Some(GameMode::Endless));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::StartRun(_)));
}

#[test]
fn test_declining_start_pops_last_pick() {
    let mut harness =
        EffectStoreTestHarness::new(state_with_values(&[1, 1, 1, 1, 1, 1, 1, 1, 1], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.assert_state(|s| s.party.len() == 3);

    harness.dispatch_collect(press(Button::Down));
    harness.assert_state(|s| s.overlay == Overlay::ConfirmStart { selected: 1 });
    harness.dispatch_collect(press(Button::Confirm));
    harness.assert_state(|s| s.party.len() == 2 && s.overlay == Overlay::None);
    harness.assert_state(|s| s.budget.label() == "2/10");
    harness.assert_state(|s| s.run.is_none());
}

#[test]
fn test_start_with_empty_party_is_error() {
    let mut harness = EffectStoreTestHarness::new(state_with_values(&[1; 9], false), reducer);
    for _ in 0..5 {
        harness.dispatch_collect(press(Button::Down));
    }
    harness.assert_state(|s| s.mode == BrowseMode::Start);
    harness.drain_effects();

    harness.dispatch_collect(press(Button::Confirm));
    harness.assert_state(|s| s.last_outcome == InputOutcome::Error && s.overlay == Overlay::None);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::PlayCue(Cue::Error)));
}

#[test]
fn test_stale_sprite_load_is_ignored() {
    let mut harness = EffectStoreTestHarness::new(state_with_values(&[1; 9], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    harness.dispatch_collect(press(Button::Right));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::LoadSprite(r) if r.token == 1));

    let sprite = SpriteData {
        width: 1,
        height: 1,
        pixels: vec![[255, 0, 0, 255]],
    };
    harness.complete_action(Action::SpriteDidLoad {
        token: 1,
        sprite: sprite.clone(),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (0, 1));
    harness.assert_state(|s| s.sprite.sprite.is_none() && s.sprite.loading);

    harness.complete_action(Action::SpriteDidLoad { token: 2, sprite });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 1);
    harness.assert_state(|s| s.sprite.sprite.is_some() && s.loaded_species.contains(&2));
}

#[test]
fn test_cry_plays_once_sprite_has_loaded() {
    let mut harness = EffectStoreTestHarness::new(state_with_values(&[1; 9], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    harness.complete_action(Action::SpriteDidLoad {
        token: 1,
        sprite: SpriteData {
            width: 1,
            height: 1,
            pixels: vec![[0, 0, 0, 255]],
        },
    });
    harness.process_emitted();
    harness.dispatch_collect(press(Button::Confirm));
    harness.drain_effects();

    harness.dispatch_collect(press(Button::Confirm));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::PlayCry { species_id: 1 }));
}

#[test]
fn test_quit_tears_down_party_and_timers() {
    let mut harness =
        EffectStoreTestHarness::new(state_with_values(&[6, 6, 1, 1, 1, 1, 1, 1, 1], false), reducer);

    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.dispatch_collect(press(Button::Right));
    add_current!(harness);
    harness.assert_state(|s| s.budget.revert_pending);
    harness.drain_effects();

    harness.dispatch_collect(Action::Quit);
    harness.assert_state(|s| s.party.is_empty() && !s.stats_mode && s.sprite.request.is_none());
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::CancelValueRevert));
}
