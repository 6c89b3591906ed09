//! Reducer - the selection state machine: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::audio::Cue;
use crate::dex::{next_ability, next_form, CycleFlags, DexAttr, VariantProps};
use crate::effect::Effect;
use crate::species::{GENERATION_COUNT, GRID_COLUMNS};
use crate::sprite::SpriteRequest;
use crate::state::{
    AppState, BrowseMode, Button, GameMode, InputOutcome, Overlay, PartySlot, RunStart,
    GAME_MODES, PARTY_SIZE, TICK_MS,
};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.message = None;
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Tick => {
            if !state.stats_mode || !state.stats_chart.is_animating() {
                return DispatchResult::unchanged();
            }
            state.stats_chart.advance(TICK_MS as u32);
            DispatchResult::changed()
        }

        Action::Press(button) => press(state, button),

        Action::SpriteDidLoad { token, sprite } => {
            let Some(request) = current_request(state, token) else {
                return DispatchResult::unchanged();
            };
            state.loaded_species.insert(request.species_id);
            state.sprite.sprite = Some(sprite);
            state.sprite.loading = false;
            state.sprite.error = None;
            DispatchResult::changed()
        }

        Action::SpriteDidError { token, error } => {
            if current_request(state, token).is_none() {
                return DispatchResult::unchanged();
            }
            state.sprite.sprite = None;
            state.sprite.loading = false;
            state.sprite.error = Some(error);
            DispatchResult::changed()
        }

        Action::ValueRevert => {
            if !state.budget.revert_pending {
                return DispatchResult::unchanged();
            }
            let committed = state.party_value();
            state.budget.sync(committed);
            DispatchResult::changed()
        }

        Action::RunDidStart => {
            state.message = Some("Run started".to_string());
            DispatchResult::changed()
        }

        Action::RunStartError(error) => {
            state.run = None;
            state.message = Some(format!("Could not start run: {error}"));
            DispatchResult::changed()
        }

        Action::Quit => {
            let mut effects = Vec::new();
            teardown(state, &mut effects);
            with_effects(effects)
        }
    }
}

fn current_request(state: &AppState, token: u64) -> Option<SpriteRequest> {
    state
        .sprite
        .request
        .clone()
        .filter(|request| request.token == token)
}

fn with_effects(effects: Vec<Effect>) -> DispatchResult<Effect> {
    if effects.is_empty() {
        DispatchResult::changed()
    } else {
        DispatchResult::changed_with_many(effects)
    }
}

fn press(state: &mut AppState, button: Button) -> DispatchResult<Effect> {
    let previous = state.last_outcome;
    let mut effects = Vec::new();

    let outcome = if state.run.is_some() {
        InputOutcome::Ignored
    } else if state.overlay.is_open() {
        press_overlay(state, button, &mut effects)
    } else {
        match state.mode {
            BrowseMode::Generation => press_generation(state, button, &mut effects),
            BrowseMode::Species => press_species(state, button, &mut effects),
            BrowseMode::Start => press_start(state, button, &mut effects),
        }
    };

    finish(state, previous, outcome, effects)
}

/// Record the outcome and attach its cue
fn finish(
    state: &mut AppState,
    previous: InputOutcome,
    outcome: InputOutcome,
    mut effects: Vec<Effect>,
) -> DispatchResult<Effect> {
    state.last_outcome = outcome;
    let has_cue = effects.iter().any(|e| matches!(e, Effect::PlayCue(_)));
    match outcome {
        InputOutcome::Success => {
            state.message = None;
            if !has_cue {
                effects.push(Effect::PlayCue(Cue::Select));
            }
        }
        InputOutcome::Error => {
            state.message = None;
            effects.push(Effect::PlayCue(Cue::Error));
        }
        InputOutcome::Ignored => {
            if previous == InputOutcome::Ignored && effects.is_empty() {
                return DispatchResult::unchanged();
            }
        }
    }
    with_effects(effects)
}

// ===== Browse modes =====

fn press_generation(
    state: &mut AppState,
    button: Button,
    effects: &mut Vec<Effect>,
) -> InputOutcome {
    match button {
        Button::Up if state.gen_cursor > 0 => {
            set_generation(state, state.gen_cursor - 1);
            InputOutcome::Success
        }
        Button::Down if state.gen_cursor + 1 < GENERATION_COUNT => {
            set_generation(state, state.gen_cursor + 1);
            InputOutcome::Success
        }
        Button::Down => {
            state.mode = BrowseMode::Start;
            InputOutcome::Success
        }
        Button::Right => enter_species(state, effects),
        Button::Cancel => cancel(state, effects),
        _ => InputOutcome::Ignored,
    }
}

fn press_start(state: &mut AppState, button: Button, effects: &mut Vec<Effect>) -> InputOutcome {
    match button {
        Button::Up => {
            state.mode = BrowseMode::Generation;
            InputOutcome::Success
        }
        Button::Right => enter_species(state, effects),
        Button::Confirm => try_start(state),
        Button::Cancel => cancel(state, effects),
        _ => InputOutcome::Ignored,
    }
}

fn press_species(
    state: &mut AppState,
    button: Button,
    effects: &mut Vec<Effect>,
) -> InputOutcome {
    let count = state.generation_len();
    if count == 0 {
        state.mode = BrowseMode::Generation;
        clear_cursor(state, effects);
        return InputOutcome::Ignored;
    }
    let rows = count.div_ceil(GRID_COLUMNS);
    let row = state.cursor / GRID_COLUMNS;
    let col = state.cursor % GRID_COLUMNS;
    let last_col = (count - 1) % GRID_COLUMNS;

    match button {
        Button::Up if row > 0 => move_cursor(state, state.cursor - GRID_COLUMNS, effects),
        Button::Down if row + 2 < rows || (row + 1 < rows && col <= last_col) => {
            move_cursor(state, state.cursor + GRID_COLUMNS, effects)
        }
        Button::Left if col > 0 => move_cursor(state, state.cursor - 1, effects),
        Button::Left => {
            state.mode = if row >= (rows - 1).min(5) {
                BrowseMode::Start
            } else {
                BrowseMode::Generation
            };
            clear_cursor(state, effects);
            InputOutcome::Success
        }
        Button::Right => {
            let max_col = if row + 1 < rows {
                GRID_COLUMNS - 1
            } else {
                last_col
            };
            if col < max_col {
                move_cursor(state, state.cursor + 1, effects)
            } else {
                InputOutcome::Ignored
            }
        }
        Button::Confirm => {
            if !state.current_is_caught() {
                InputOutcome::Error
            } else if state.party.len() >= PARTY_SIZE {
                InputOutcome::Ignored
            } else {
                state.overlay = Overlay::StarterOptions { selected: 0 };
                InputOutcome::Success
            }
        }
        Button::Cancel => cancel(state, effects),
        Button::CycleShiny | Button::CycleForm | Button::CycleGender | Button::CycleAbility => {
            cycle(state, button, effects)
        }
        _ => InputOutcome::Ignored,
    }
}

fn set_generation(state: &mut AppState, generation: usize) {
    state.gen_cursor = generation;
    state.cursor = 0;
}

fn enter_species(state: &mut AppState, effects: &mut Vec<Effect>) -> InputOutcome {
    if state.generation_len() == 0 {
        return InputOutcome::Ignored;
    }
    state.mode = BrowseMode::Species;
    move_cursor(state, 0, effects)
}

fn move_cursor(state: &mut AppState, index: usize, effects: &mut Vec<Effect>) -> InputOutcome {
    state.cursor = index;
    refresh_cursor(state, effects);
    InputOutcome::Success
}

/// Recompute the variant cursor, cycle flags, stats target and sprite for the cursored species
fn refresh_cursor(state: &mut AppState, effects: &mut Vec<Effect>) {
    let Some(species) = state.current_species().cloned() else {
        clear_cursor(state, effects);
        return;
    };
    let entry = state.entry_for(&species).cloned().unwrap_or_default();
    let props = entry.default_props(&species);
    state.dex_attr_cursor = DexAttr::from_props(props);
    state.can_cycle = CycleFlags::for_species(&species, entry.caught_attr);
    if state.stats_mode {
        if entry.is_caught() {
            state.stats_chart.retarget(entry.ivs);
        } else {
            state.stats_chart.reset();
        }
    }
    if entry.is_caught() {
        request_sprite(state, species.id, props, effects);
    } else {
        drop_sprite(state, effects);
    }
}

/// Leaving the grid drops the cursored species
fn clear_cursor(state: &mut AppState, effects: &mut Vec<Effect>) {
    state.dex_attr_cursor = DexAttr::NONE;
    state.can_cycle = CycleFlags::default();
    if state.stats_mode {
        state.stats_chart.reset();
    }
    drop_sprite(state, effects);
}

fn drop_sprite(state: &mut AppState, effects: &mut Vec<Effect>) {
    if state.sprite.request.is_some() {
        state.sprite.reset();
        effects.push(Effect::CancelSpriteLoad);
    }
}

fn request_sprite(
    state: &mut AppState,
    species_id: u16,
    props: VariantProps,
    effects: &mut Vec<Effect>,
) {
    state.next_sprite_token += 1;
    let request = SpriteRequest {
        token: state.next_sprite_token,
        species_id,
        female: props.female,
        form_index: props.form_index,
        shiny: props.shiny,
    };
    state.sprite.request = Some(request.clone());
    state.sprite.sprite = None;
    state.sprite.loading = true;
    state.sprite.error = None;
    effects.push(Effect::LoadSprite(request));
}

fn cycle(state: &mut AppState, button: Button, effects: &mut Vec<Effect>) -> InputOutcome {
    let Some(species) = state.current_species().cloned() else {
        return InputOutcome::Ignored;
    };
    let caught = state.save.caught_attr(species.id);
    if caught.is_empty() {
        return InputOutcome::Ignored;
    }
    let mut props = state.dex_attr_cursor.props(&species);
    match button {
        Button::CycleShiny if state.can_cycle.shiny => {
            props.shiny = !props.shiny;
            if props.shiny {
                effects.push(Effect::PlayCue(Cue::Sparkle));
            }
        }
        Button::CycleForm if state.can_cycle.form => {
            props.form_index = next_form(&species, caught, props.form_index);
        }
        Button::CycleGender if state.can_cycle.gender => {
            props.female = !props.female;
        }
        Button::CycleAbility if state.can_cycle.ability => {
            let next = next_ability(&species, caught, props.ability);
            if next == props.ability {
                return InputOutcome::Ignored;
            }
            props.ability = next;
        }
        _ => return InputOutcome::Ignored,
    }
    state.dex_attr_cursor = DexAttr::from_props(props);
    request_sprite(state, species.id, props, effects);
    InputOutcome::Success
}

/// Close the stats panel, otherwise undo the last pick
fn cancel(state: &mut AppState, effects: &mut Vec<Effect>) -> InputOutcome {
    if state.stats_mode {
        state.stats_mode = false;
        state.stats_chart.reset();
        InputOutcome::Success
    } else if pop_slot(state, effects) {
        InputOutcome::Success
    } else {
        InputOutcome::Ignored
    }
}

// ===== Party =====

fn add_to_party(state: &mut AppState, effects: &mut Vec<Effect>) -> InputOutcome {
    let Some(pos) = state.cursor_pos() else {
        return InputOutcome::Ignored;
    };
    let Some(species) = state.catalog.get(pos).cloned() else {
        return InputOutcome::Ignored;
    };
    if state.party.len() >= PARTY_SIZE || state.party_contains(pos) {
        return InputOutcome::Error;
    }

    let pending = state.budget.revert_pending;
    let committed = state.party_value();
    if !state.budget.try_add(committed, species.value) {
        effects.push(Effect::ScheduleValueRevert);
        return InputOutcome::Error;
    }
    if pending {
        effects.push(Effect::CancelValueRevert);
    }

    state.party.push(PartySlot {
        pos,
        dex_attr: state.dex_attr_cursor,
    });
    if state.loaded_species.contains(&species.id) {
        effects.push(Effect::PlayCry {
            species_id: species.id,
        });
    }
    if state.party.len() == PARTY_SIZE {
        try_start(state);
    }
    InputOutcome::Success
}

fn pop_slot(state: &mut AppState, effects: &mut Vec<Effect>) -> bool {
    if state.party.pop().is_none() {
        return false;
    }
    let pending = state.budget.revert_pending;
    let committed = state.party_value();
    state.budget.sync(committed);
    if pending {
        effects.push(Effect::CancelValueRevert);
    }
    true
}

fn teardown(state: &mut AppState, effects: &mut Vec<Effect>) {
    while pop_slot(state, effects) {}
    if state.budget.revert_pending {
        state.budget.sync(state.party_value());
        effects.push(Effect::CancelValueRevert);
    }
    state.overlay = Overlay::None;
    state.stats_mode = false;
    state.stats_chart.reset();
    if state.sprite.loading {
        effects.push(Effect::CancelSpriteLoad);
    }
    state.sprite.reset();
}

// ===== Run start =====

fn try_start(state: &mut AppState) -> InputOutcome {
    if state.party.is_empty() {
        return InputOutcome::Error;
    }
    state.overlay = Overlay::ConfirmStart { selected: 0 };
    InputOutcome::Success
}

fn start_run(state: &mut AppState, game_mode: GameMode, effects: &mut Vec<Effect>) -> InputOutcome {
    let run = RunStart {
        game_mode,
        starters: state.starters(),
    };
    state.overlay = Overlay::None;
    state.run = Some(run.clone());
    effects.push(Effect::StartRun(run));
    InputOutcome::Success
}

/// Declining a prompt drops the most recent pick
fn decline(state: &mut AppState, effects: &mut Vec<Effect>) -> InputOutcome {
    state.overlay = Overlay::None;
    pop_slot(state, effects);
    InputOutcome::Success
}

// ===== Overlays =====

fn press_overlay(
    state: &mut AppState,
    button: Button,
    effects: &mut Vec<Effect>,
) -> InputOutcome {
    let overlay = state.overlay;
    let selected = overlay.selected();
    match button {
        Button::Up if selected > 0 => {
            state.overlay = overlay.with_selected(selected - 1);
            InputOutcome::Success
        }
        Button::Down if selected + 1 < overlay.option_count() => {
            state.overlay = overlay.with_selected(selected + 1);
            InputOutcome::Success
        }
        Button::Confirm => match overlay {
            Overlay::StarterOptions { selected: 0 } => {
                state.overlay = Overlay::None;
                add_to_party(state, effects)
            }
            Overlay::StarterOptions { .. } => {
                state.overlay = Overlay::None;
                toggle_stats(state);
                InputOutcome::Success
            }
            Overlay::ConfirmStart { selected: 0 } => {
                if state.save.unlocks.endless_mode {
                    state.overlay = Overlay::GameModeSelect { selected: 0 };
                    InputOutcome::Success
                } else {
                    start_run(state, GameMode::Classic, effects)
                }
            }
            Overlay::ConfirmStart { .. } => decline(state, effects),
            Overlay::GameModeSelect { selected } => {
                let mode = GAME_MODES.get(selected).copied().unwrap_or(GameMode::Classic);
                start_run(state, mode, effects)
            }
            Overlay::None => InputOutcome::Ignored,
        },
        Button::Cancel => match overlay {
            Overlay::StarterOptions { .. } => {
                state.overlay = Overlay::None;
                InputOutcome::Success
            }
            Overlay::ConfirmStart { .. } | Overlay::GameModeSelect { .. } => {
                decline(state, effects)
            }
            Overlay::None => InputOutcome::Ignored,
        },
        _ => InputOutcome::Ignored,
    }
}

fn toggle_stats(state: &mut AppState) {
    state.stats_mode = !state.stats_mode;
    if !state.stats_mode {
        state.stats_chart.reset();
        return;
    }
    let ivs = state
        .current_species()
        .and_then(|species| state.entry_for(species))
        .filter(|entry| entry.is_caught())
        .map(|entry| entry.ivs);
    match ivs {
        Some(ivs) => state.stats_chart.retarget(ivs),
        None => state.stats_chart.reset(),
    }
}
