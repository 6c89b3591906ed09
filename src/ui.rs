use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventKind, EventOutcome, RenderContext};
use tui_dispatch_components::{
    centered_rect, BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::detail::{detail_view, instruction_lines, DetailView, FEMALE_GLYPH};
use crate::dex::DexAttr;
use crate::species::{GrowthRate, GridPos, GENERATION_COUNT, GRID_COLUMNS, GRID_ROWS};
use crate::sprite::SpriteData;
use crate::state::{
    AppState, BrowseMode, Button, Overlay, CONFIRM_OPTIONS, GAME_MODES, IV_MAX, PARTY_SIZE,
    STARTER_OPTIONS,
};

const BG_BASE: Color = Color::Rgb(22, 26, 40);
const BG_PANEL: Color = Color::Rgb(34, 40, 62);
const BG_PANEL_ALT: Color = Color::Rgb(28, 33, 52);
const TEXT_MAIN: Color = Color::Rgb(230, 232, 240);
const TEXT_DIM: Color = Color::Rgb(150, 156, 178);
const ACCENT_GOLD: Color = Color::Rgb(232, 200, 96);
const ACCENT_GREEN: Color = Color::Rgb(110, 206, 128);
const ACCENT_RED: Color = Color::Rgb(228, 92, 88);
const ACCENT_PINK: Color = Color::Rgb(238, 140, 186);
const HIGHLIGHT_BG: Color = ACCENT_GOLD;
const HIGHLIGHT_TEXT: Color = Color::Rgb(20, 22, 30);
const PARTY_BG: Color = Color::Rgb(48, 92, 64);
const BORDER_ACCENT: Color = Color::Rgb(88, 98, 136);

const CELL_WIDTH: u16 = 6;
const DETAIL_WIDTH: u16 = 36;
const GEN_WIDTH: u16 = 9;
const GEN_LABELS: [&str; GENERATION_COUNT] = ["I", "II", "III", "IV", "V"];
const STAT_LABELS: [&str; 6] = ["HP", "Atk", "Def", "SpAtk", "SpDef", "Spd"];

fn growth_color(rate: GrowthRate) -> Color {
    match rate {
        GrowthRate::Erratic => Color::Rgb(214, 126, 236),
        GrowthRate::Fast => Color::Rgb(120, 214, 128),
        GrowthRate::MediumFast => Color::Rgb(120, 190, 232),
        GrowthRate::MediumSlow => Color::Rgb(232, 206, 110),
        GrowthRate::Slow => Color::Rgb(232, 140, 96),
        GrowthRate::Fluctuating => Color::Rgb(170, 170, 190),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, _ctx: RenderContext) {
    render_screen(frame, area, state);
}

pub fn render_screen(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(DETAIL_WIDTH),
            Constraint::Length(GEN_WIDTH),
            Constraint::Min(GRID_COLUMNS as u16 * CELL_WIDTH + 2),
        ])
        .split(rows[0]);

    render_detail(frame, columns[0], state);
    render_generations(frame, columns[1], state);
    render_grid(frame, columns[2], state);
    render_footer(frame, rows[1], state);

    match state.overlay {
        Overlay::None => {}
        Overlay::StarterOptions { selected } => {
            render_options(frame, area, " OPTIONS ", None, &STARTER_OPTIONS, selected)
        }
        Overlay::ConfirmStart { selected } => render_options(
            frame,
            area,
            " START ",
            Some("Begin with these Pokémon?"),
            &CONFIRM_OPTIONS,
            selected,
        ),
        Overlay::GameModeSelect { selected } => {
            let labels: Vec<&str> = GAME_MODES.iter().map(|mode| mode.label()).collect();
            render_options(
                frame,
                area,
                " GAME MODE ",
                Some("Select a game mode."),
                &labels,
                selected,
            )
        }
    }
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent, _state: &AppState) -> EventOutcome<Action> {
    if key.kind == KeyEventKind::Release {
        return EventOutcome::ignored();
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => EventOutcome::action(Action::Quit),
            _ => EventOutcome::ignored(),
        };
    }
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
        return EventOutcome::action(Action::Quit);
    }
    EventOutcome::from(button_for(key.code).map(Action::Press))
}

/// Map a key onto the button vocabulary
pub fn button_for(code: KeyCode) -> Option<Button> {
    let button = match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Button::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Button::Down,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Button::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Button::Right,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('z') | KeyCode::Char('Z') => {
            Button::Confirm
        }
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('x') | KeyCode::Char('X') => {
            Button::Cancel
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Button::CycleShiny,
        KeyCode::Char('f') | KeyCode::Char('F') => Button::CycleForm,
        KeyCode::Char('g') | KeyCode::Char('G') => Button::CycleGender,
        KeyCode::Char('e') | KeyCode::Char('E') => Button::CycleAbility,
        _ => return None,
    };
    Some(button)
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" DETAILS ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let view = detail_view(state);
    let instructions = instruction_lines(state);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(PARTY_SIZE as u16 + 2),
            Constraint::Length(instructions.len() as u16),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(Text::from(header_lines(&view))), layout[0]);

    if state.stats_mode {
        if view.caught {
            render_stats(frame, layout[1], state);
        }
    } else {
        render_sprite_panel(frame, layout[1], state, &view);
    }

    render_party(frame, layout[2], state);

    let lines: Vec<Line> = instructions
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(TEXT_DIM))))
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), layout[3]);
}

fn header_lines(view: &DetailView) -> Vec<Line<'static>> {
    let mut title = vec![
        Span::styled(
            format!("No.{} ", view.number),
            Style::default().fg(TEXT_DIM),
        ),
        Span::styled(
            view.name.clone(),
            Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
        ),
    ];
    if view.shiny {
        title.push(Span::styled(" ★", Style::default().fg(ACCENT_GOLD)));
    }
    if let Some(glyph) = view.gender {
        let color = if glyph == FEMALE_GLYPH {
            ACCENT_PINK
        } else {
            Color::Rgb(120, 170, 240)
        };
        title.push(Span::styled(format!(" {glyph}"), Style::default().fg(color)));
    }

    let mut lines = vec![Line::from(title)];
    if let Some(rate) = view.growth_rate {
        lines.push(Line::from(vec![
            Span::styled("Growth: ", Style::default().fg(TEXT_DIM)),
            Span::styled(rate.label(), Style::default().fg(growth_color(rate))),
        ]));
    }
    if let Some(ability) = view.ability.as_ref() {
        let style = if view.hidden_ability {
            Style::default().fg(ACCENT_PINK)
        } else {
            Style::default().fg(TEXT_MAIN)
        };
        lines.push(Line::from(vec![
            Span::styled("Ability: ", Style::default().fg(TEXT_DIM)),
            Span::styled(ability.clone(), style),
        ]));
    }
    if let Some(form) = view.form.as_ref() {
        lines.push(Line::from(vec![
            Span::styled("Form: ", Style::default().fg(TEXT_DIM)),
            Span::styled(form.clone(), Style::default().fg(TEXT_MAIN)),
        ]));
    }
    if let Some(value) = view.value {
        lines.push(Line::from(vec![
            Span::styled("Cost: ", Style::default().fg(TEXT_DIM)),
            Span::styled(value.to_string(), Style::default().fg(ACCENT_GOLD)),
        ]));
    }
    lines
}

fn render_sprite_panel(frame: &mut Frame, area: Rect, state: &AppState, view: &DetailView) {
    if !view.caught {
        return;
    }
    if let Some(sprite) = state.sprite.sprite.as_ref() {
        render_sprite(frame, area, sprite);
    } else if state.sprite.loading {
        let loading = Paragraph::new("[Loading...]")
            .style(Style::default().fg(TEXT_DIM))
            .alignment(Alignment::Center);
        frame.render_widget(loading, area);
    } else if let Some(error) = state.sprite.error.as_ref() {
        let placeholder = Paragraph::new(error.as_str())
            .style(Style::default().fg(TEXT_DIM))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, area);
    }
}

/// Two pixel rows per cell using the upper half block
fn render_sprite(frame: &mut Frame, area: Rect, sprite: &SpriteData) {
    let cols = (sprite.width as u16).min(area.width);
    let rows = (sprite.height.div_ceil(2) as u16).min(area.height);
    let offset_x = area.x + (area.width - cols) / 2;
    let offset_y = area.y + (area.height - rows) / 2;
    let color_at = |x: u32, y: u32| -> Option<Color> {
        if !sprite.is_opaque(x, y) {
            return None;
        }
        sprite.pixel(x, y).map(|[r, g, b, _]| Color::Rgb(r, g, b))
    };

    let buf = frame.buffer_mut();
    for row in 0..rows {
        for col in 0..cols {
            let top = color_at(col as u32, row as u32 * 2);
            let bottom = color_at(col as u32, row as u32 * 2 + 1);
            let cell = &mut buf[(offset_x + col, offset_y + row)];
            match (top, bottom) {
                (None, None) => {}
                (Some(top), None) => {
                    cell.set_char('▀').set_fg(top);
                }
                (None, Some(bottom)) => {
                    cell.set_char('▄').set_fg(bottom);
                }
                (Some(top), Some(bottom)) => {
                    cell.set_char('▀').set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

fn render_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let values = state.stats_chart.current();
    let bar_width = (area.width as usize).saturating_sub(12).max(4);
    let lines: Vec<Line> = STAT_LABELS
        .iter()
        .zip(values)
        .map(|(label, value)| meter_line(label, value, IV_MAX as f32, bar_width))
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn render_party(frame: &mut Frame, area: Rect, state: &AppState) {
    let budget_style = if state.budget.over_limit {
        Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT_GREEN)
    };
    let mut lines = vec![Line::from(vec![
        Span::styled("Party ", Style::default().fg(TEXT_DIM)),
        Span::styled(state.budget.label(), budget_style),
    ])];
    for slot in 0..PARTY_SIZE {
        let label = state
            .party
            .get(slot)
            .and_then(|member| state.catalog.get(member.pos))
            .map(|species| format!("{}. {}", slot + 1, species.name))
            .unwrap_or_else(|| format!("{}. -", slot + 1));
        lines.push(Line::from(Span::styled(label, Style::default().fg(TEXT_MAIN))));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn render_generations(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" GEN ", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for (generation, label) in GEN_LABELS.iter().enumerate() {
        let cursored = state.mode == BrowseMode::Generation && state.gen_cursor == generation;
        let current = state.gen_cursor == generation;
        let style = if cursored {
            Style::default()
                .fg(HIGHLIGHT_TEXT)
                .bg(HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD)
        } else if current {
            Style::default().fg(ACCENT_GOLD)
        } else {
            Style::default().fg(TEXT_MAIN)
        };
        lines.push(Line::from(Span::styled(format!(" {label:<4}"), style)));
    }
    lines.push(Line::from(""));
    let start_style = if state.mode == BrowseMode::Start {
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else if state.party.is_empty() {
        Style::default().fg(TEXT_DIM)
    } else {
        Style::default().fg(ACCENT_GREEN)
    };
    lines.push(Line::from(Span::styled("Start", start_style)));
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(" GENERATION {} ", GEN_LABELS[state.gen_cursor.min(GENERATION_COUNT - 1)]);
    let block = panel_block(title, BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let species = state.catalog.generation(state.gen_cursor);
    let mut lines = Vec::new();
    for row in 0..GRID_ROWS {
        let mut spans = Vec::new();
        for col in 0..GRID_COLUMNS {
            let index = row * GRID_COLUMNS + col;
            let Some(entry) = species.get(index) else {
                break;
            };
            let pos = GridPos::new(state.gen_cursor, index);
            spans.push(grid_cell(state, pos, &entry.name, entry.value));
        }
        if spans.is_empty() {
            break;
        }
        lines.push(Line::from(spans));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No species in this generation.",
            Style::default().fg(TEXT_DIM),
        )));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn grid_cell(state: &AppState, pos: GridPos, name: &str, value: u8) -> Span<'static> {
    let caught = state.is_caught_at(pos);
    let abbr: String = if caught {
        name.chars().take(3).collect()
    } else {
        "···".to_string()
    };
    let marker = if state.is_bonus(pos) {
        '+'
    } else if caught && shiny_caught(state, pos) {
        '★'
    } else {
        ' '
    };
    let value = if caught {
        format!("{value:>2}")
    } else {
        "  ".to_string()
    };
    let text = format!("{abbr:<3}{value}{marker}");

    let cursored = state.cursor_pos() == Some(pos);
    let mut style = if caught {
        Style::default().fg(TEXT_MAIN)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    if state.party_contains(pos) {
        style = style.bg(PARTY_BG);
    }
    if state.is_bonus(pos) {
        style = style.fg(ACCENT_PINK);
    }
    if cursored {
        style = Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD);
    }
    Span::styled(text, style)
}

fn shiny_caught(state: &AppState, pos: GridPos) -> bool {
    state
        .catalog
        .get(pos)
        .map(|species| state.save.caught_attr(species.id))
        .is_some_and(|caught| caught.contains(DexAttr::SHINY))
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    prompt: Option<&str>,
    options: &[&str],
    selected: usize,
) {
    let height = options.len() as u16 + if prompt.is_some() { 4 } else { 2 };
    let modal = centered_rect(30, height, area);
    frame.render_widget(Clear, modal);
    let block = panel_block(title, BG_PANEL);
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let mut lines = Vec::new();
    if let Some(prompt) = prompt {
        lines.push(Line::from(Span::styled(
            prompt.to_string(),
            Style::default().fg(ACCENT_GOLD),
        )));
        lines.push(Line::from(""));
    }
    for (idx, label) in options.iter().enumerate() {
        lines.push(menu_line(label, idx == selected));
    }
    let paragraph = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let status = state.message.clone().unwrap_or_default();
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];
    let left = [
        StatusBarHint::new("Arrows", "Move"),
        StatusBarHint::new("Enter", "Select"),
        StatusBarHint::new("Esc", "Undo"),
    ];
    let center = [StatusBarHint::new("q", "Quit")];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: None,
        },
        text: Style::default().fg(TEXT_MAIN),
        hint_key: Style::default()
            .fg(ACCENT_GOLD)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };
    let props = StatusBarProps {
        left: StatusBarSection::hints(&left).with_separator("  "),
        center: StatusBarSection::hints(&center),
        right: StatusBarSection::items(&status_items),
        style,
        is_focused: false,
    };
    let mut status_bar = StatusBar::new();
    <StatusBar as Component<Action>>::render(&mut status_bar, frame, area, props);
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}

fn meter_line(label: &str, value: f32, max: f32, width: usize) -> Line<'static> {
    let ratio = (value / max.max(1.0)).clamp(0.0, 1.0);
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let color = if value >= max * 0.8 {
        ACCENT_GREEN
    } else if value >= max * 0.4 {
        ACCENT_GOLD
    } else {
        ACCENT_RED
    };
    Line::from(vec![
        Span::styled(format!("{label:<6}"), Style::default().fg(TEXT_DIM)),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled(
            "░".repeat(width.saturating_sub(filled)),
            Style::default().fg(TEXT_DIM),
        ),
        Span::styled(
            format!(" {:>2}", value.round() as u32),
            Style::default().fg(TEXT_DIM),
        ),
    ])
}

fn menu_line(label: &str, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN)
    };
    Line::from(Span::styled(label.to_string(), style))
}
