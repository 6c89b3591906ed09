//! Full-screen render checks using RenderHarness

use starter_select::{
    action::Action,
    reducer::reducer,
    species::GridPos,
    state::{AppState, BrowseMode, Button, Overlay},
    ui,
};
use tui_dispatch::testing::*;

const WIDTH: u16 = 110;
const HEIGHT: u16 = 32;

fn render(state: &AppState) -> String {
    let mut render = RenderHarness::new(WIDTH, HEIGHT);
    render.render_to_string_plain(|frame| ui::render_screen(frame, frame.area(), state))
}

fn cursor_on(state: &mut AppState, species_id: u16) {
    let pos: GridPos = state
        .catalog
        .position_of(species_id)
        .expect("species in builtin catalog");
    state.mode = BrowseMode::Species;
    state.gen_cursor = pos.generation;
    state.cursor = pos.index;
}

#[test]
fn test_render_initial_screen() {
    let state = AppState::default();
    let output = render(&state);

    assert!(output.contains("GENERATION I"), "grid title:\n{output}");
    assert!(output.contains("Start"));
    assert!(output.contains("Party 0/10"));
    assert!(output.contains("Arrow Keys/WASD: Move"));
    assert!(!output.contains("Z/Space/Enter: Select"));
    assert!(output.contains("No.000"));
}

#[test]
fn test_render_cursored_species_detail() {
    let mut state = AppState::default();
    reducer(&mut state, Action::Press(Button::Right));
    let output = render(&state);

    assert!(output.contains("No.001"), "detail header:\n{output}");
    assert!(output.contains("Bulbasaur"));
    assert!(output.contains("Growth: Medium Slow"));
    assert!(output.contains("Ability: Overgrow"));
    assert!(output.contains("Z/Space/Enter: Select"));
    assert!(output.contains("[Loading...]"));
}

#[test]
fn test_render_uncaught_species_masked() {
    let mut state = AppState::default();
    cursor_on(&mut state, 10);
    let output = render(&state);

    assert!(output.contains("???"), "masked name:\n{output}");
    assert!(!output.contains("Caterpie"));
    assert!(output.contains("···"));
}

#[test]
fn test_render_uncaught_species_has_no_sprite_or_values() {
    let mut state = AppState::default();
    reducer(&mut state, Action::Press(Button::Right));
    while state.current_species().map(|s| s.id) != Some(10) {
        reducer(&mut state, Action::Press(Button::Right));
    }
    assert!(state.sprite.request.is_none());
    let output = render(&state);

    assert!(output.contains("No.000"), "masked header:\n{output}");
    assert!(!output.contains("#010"));
    assert!(!output.contains("[Loading...]"));
    for after in output.split("···").skip(1) {
        assert!(after.starts_with("  "), "uncaught cell shows a value: {after:.8}");
    }
}

#[test]
fn test_render_leaving_grid_hides_stats() {
    let mut state = AppState::default();
    reducer(&mut state, Action::Press(Button::Right));
    reducer(&mut state, Action::Press(Button::Confirm));
    reducer(&mut state, Action::Press(Button::Down));
    reducer(&mut state, Action::Press(Button::Confirm));
    for _ in 0..40 {
        reducer(&mut state, Action::Tick);
    }
    assert!(render(&state).contains("HP"));

    reducer(&mut state, Action::Press(Button::Left));
    assert!(state.current_species().is_none());
    let output = render(&state);
    assert!(!output.contains("HP"), "stale stats panel:\n{output}");
    assert!(!output.contains("█"));
}

#[test]
fn test_render_confirm_overlay() {
    let mut state = AppState::default();
    state.overlay = Overlay::ConfirmStart { selected: 0 };
    let output = render(&state);

    assert!(output.contains("Begin with these Pokémon?"), "prompt:\n{output}");
    assert!(output.contains("Yes"));
    assert!(output.contains("No"));
}

#[test]
fn test_render_game_mode_overlay() {
    let mut state = AppState::default();
    state.overlay = Overlay::GameModeSelect { selected: 1 };
    let output = render(&state);

    assert!(output.contains("Select a game mode."));
    assert!(output.contains("Classic"));
    assert!(output.contains("Endless"));
}

#[test]
fn test_render_over_limit_budget() {
    let mut state = AppState::default();
    assert!(!state.budget.try_add(8, 3));
    let output = render(&state);
    assert!(output.contains("Party 11/10"), "budget label:\n{output}");
}

#[test]
fn test_render_stats_panel_and_party() {
    let mut state = AppState::default();
    reducer(&mut state, Action::Press(Button::Right));
    reducer(&mut state, Action::Press(Button::Confirm));
    reducer(&mut state, Action::Press(Button::Confirm));
    reducer(&mut state, Action::Press(Button::Confirm));
    reducer(&mut state, Action::Press(Button::Down));
    reducer(&mut state, Action::Press(Button::Confirm));
    assert!(state.stats_mode);

    let output = render(&state);
    assert!(output.contains("1. Bulbasaur"), "party list:\n{output}");
    assert!(output.contains("HP"));
    assert!(output.contains("X/Backspace/Esc: Undo"));
}
