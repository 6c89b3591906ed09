//! Application state - single source of truth for the selection screen

use std::collections::BTreeSet;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::bonus;
use crate::dex::{CycleFlags, DexAttr, DexEntry, SaveData, VariantProps};
use crate::species::{Catalog, GridPos, Species};
use crate::sprite::{SpriteData, SpriteRequest};

/// Maximum total point value of a party
pub const VALUE_LIMIT: u8 = 10;
pub const PARTY_SIZE: usize = 3;
/// Delay before an over-budget label reverts to the committed total
pub const VALUE_REVERT_MS: u64 = 500;
pub const TICK_MS: u64 = 50;
pub const STATS_TWEEN_MS: u32 = 1000;
pub const IV_MAX: u8 = 31;

/// Fixed input vocabulary of the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    CycleShiny,
    CycleForm,
    CycleGender,
    CycleAbility,
}

/// Result of a single button press
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum InputOutcome {
    Success,
    Error,
    #[default]
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BrowseMode {
    /// Cursor on the generation column
    Generation,
    /// Cursor on a cell of the current generation's grid
    Species,
    /// Cursor parked on "Start"
    Start,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GameMode {
    Classic,
    Endless,
}

impl GameMode {
    pub fn label(self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Endless => "Endless",
        }
    }
}

/// Modal prompts layered over the grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Overlay {
    #[default]
    None,
    /// "Add to Party" / "Toggle Stats"
    StarterOptions { selected: usize },
    /// "Begin with these Pokémon?" Yes / No
    ConfirmStart { selected: usize },
    /// Classic / Endless
    GameModeSelect { selected: usize },
}

pub const STARTER_OPTIONS: [&str; 2] = ["Add to Party", "Toggle Stats"];
pub const CONFIRM_OPTIONS: [&str; 2] = ["Yes", "No"];
pub const GAME_MODES: [GameMode; 2] = [GameMode::Classic, GameMode::Endless];

impl Overlay {
    pub fn option_count(&self) -> usize {
        match self {
            Overlay::None => 0,
            Overlay::StarterOptions { .. } => STARTER_OPTIONS.len(),
            Overlay::ConfirmStart { .. } => CONFIRM_OPTIONS.len(),
            Overlay::GameModeSelect { .. } => GAME_MODES.len(),
        }
    }

    pub fn selected(&self) -> usize {
        match self {
            Overlay::None => 0,
            Overlay::StarterOptions { selected }
            | Overlay::ConfirmStart { selected }
            | Overlay::GameModeSelect { selected } => *selected,
        }
    }

    pub fn with_selected(self, index: usize) -> Self {
        match self {
            Overlay::None => Overlay::None,
            Overlay::StarterOptions { .. } => Overlay::StarterOptions { selected: index },
            Overlay::ConfirmStart { .. } => Overlay::ConfirmStart { selected: index },
            Overlay::GameModeSelect { .. } => Overlay::GameModeSelect { selected: index },
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Overlay::None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PartySlot {
    pub pos: GridPos,
    pub dex_attr: DexAttr,
}

/// Running point total shown as "n/10"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValueBudget {
    /// Sum of the committed party
    pub committed: u8,
    /// Value currently on the label
    pub shown: u8,
    /// Label is flashing an over-limit candidate
    pub over_limit: bool,
    /// A deferred revert is scheduled
    pub revert_pending: bool,
}

impl ValueBudget {
    /// Commit `committed + add` if it fits; otherwise flash the candidate
    pub fn try_add(&mut self, committed: u8, add: u8) -> bool {
        let candidate = committed.saturating_add(add);
        if candidate > VALUE_LIMIT {
            self.committed = committed;
            self.shown = candidate;
            self.over_limit = true;
            self.revert_pending = true;
            return false;
        }
        self.sync(candidate);
        true
    }

    pub fn sync(&mut self, committed: u8) {
        self.committed = committed;
        self.shown = committed;
        self.over_limit = false;
        self.revert_pending = false;
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.shown, VALUE_LIMIT)
    }
}

/// IV chart tween between the last shown values and the current ones
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatsChart {
    pub from: [f32; 6],
    pub to: [f32; 6],
    pub elapsed_ms: u32,
}

impl StatsChart {
    pub fn retarget(&mut self, ivs: [u8; 6]) {
        self.from = self.current();
        self.to = ivs.map(|iv| iv.min(IV_MAX) as f32);
        self.elapsed_ms = 0;
    }

    pub fn reset(&mut self) {
        *self = StatsChart::default();
    }

    pub fn is_animating(&self) -> bool {
        self.elapsed_ms < STATS_TWEEN_MS && self.from != self.to
    }

    pub fn advance(&mut self, ms: u32) {
        self.elapsed_ms = (self.elapsed_ms + ms).min(STATS_TWEEN_MS);
    }

    /// Interpolated values with cubic ease-out
    pub fn current(&self) -> [f32; 6] {
        let t = self.elapsed_ms as f32 / STATS_TWEEN_MS as f32;
        let eased = 1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(3);
        let mut out = [0.0; 6];
        for (i, value) in out.iter_mut().enumerate() {
            *value = self.from[i] + (self.to[i] - self.from[i]) * eased;
        }
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpriteSlot {
    /// Request the displayed sprite must answer to
    pub request: Option<SpriteRequest>,
    pub sprite: Option<SpriteData>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SpriteSlot {
    pub fn reset(&mut self) {
        self.request = None;
        self.sprite = None;
        self.loading = false;
        self.error = None;
    }
}

/// A finalized party member handed to the run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Starter {
    pub species_id: u16,
    pub name: String,
    pub dex_attr: DexAttr,
    pub pokerus: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunStart {
    pub game_mode: GameMode,
    pub starters: Vec<Starter>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub catalog: Catalog,
    pub save: SaveData,
    pub mode: BrowseMode,
    pub gen_cursor: usize,
    pub cursor: usize,
    /// Variant currently displayed for the cursored species
    pub dex_attr_cursor: DexAttr,
    pub can_cycle: CycleFlags,
    pub party: Vec<PartySlot>,
    pub budget: ValueBudget,
    pub bonus_markers: Vec<GridPos>,
    pub overlay: Overlay,
    pub stats_mode: bool,
    pub stats_chart: StatsChart,
    pub sprite: SpriteSlot,
    pub next_sprite_token: u64,
    /// Species whose sprite finished loading this session
    pub loaded_species: BTreeSet<u16>,
    pub message: Option<String>,
    pub last_outcome: InputOutcome,
    pub run: Option<RunStart>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Catalog::builtin().unwrap_or_default(),
            SaveData::demo().unwrap_or_default(),
            0,
            NaiveDate::default(),
        )
    }
}

impl AppState {
    pub fn new(catalog: Catalog, save: SaveData, base_seed: u64, day: NaiveDate) -> Self {
        let bonus_markers = bonus::daily_markers(&catalog, base_seed, day);
        Self {
            terminal_size: (80, 24),
            catalog,
            save,
            mode: BrowseMode::Generation,
            gen_cursor: 0,
            cursor: 0,
            dex_attr_cursor: DexAttr::NONE,
            can_cycle: CycleFlags::default(),
            party: Vec::new(),
            budget: ValueBudget::default(),
            bonus_markers,
            overlay: Overlay::None,
            stats_mode: false,
            stats_chart: StatsChart::default(),
            sprite: SpriteSlot::default(),
            next_sprite_token: 0,
            loaded_species: BTreeSet::new(),
            message: None,
            last_outcome: InputOutcome::Ignored,
            run: None,
        }
    }

    pub fn generation_len(&self) -> usize {
        self.catalog.generation_len(self.gen_cursor)
    }

    /// Grid position under the species cursor, if browsing species
    pub fn cursor_pos(&self) -> Option<GridPos> {
        match self.mode {
            BrowseMode::Species => Some(GridPos::new(self.gen_cursor, self.cursor)),
            _ => None,
        }
    }

    pub fn current_species(&self) -> Option<&Species> {
        self.cursor_pos().and_then(|pos| self.catalog.get(pos))
    }

    pub fn entry_for(&self, species: &Species) -> Option<&DexEntry> {
        self.save.entry(species.id)
    }

    pub fn current_caught(&self) -> DexAttr {
        self.current_species()
            .map(|species| self.save.caught_attr(species.id))
            .unwrap_or_default()
    }

    pub fn current_is_caught(&self) -> bool {
        !self.current_caught().is_empty()
    }

    pub fn is_caught_at(&self, pos: GridPos) -> bool {
        self.catalog
            .get(pos)
            .is_some_and(|species| self.save.is_caught(species.id))
    }

    pub fn variant_props(&self) -> VariantProps {
        self.current_species()
            .map(|species| self.dex_attr_cursor.props(species))
            .unwrap_or_default()
    }

    /// Committed party value, recomputed from the slots
    pub fn party_value(&self) -> u8 {
        self.party
            .iter()
            .filter_map(|slot| self.catalog.get(slot.pos))
            .fold(0u8, |total, species| total.saturating_add(species.value))
    }

    pub fn party_contains(&self, pos: GridPos) -> bool {
        self.party.iter().any(|slot| slot.pos == pos)
    }

    pub fn is_bonus(&self, pos: GridPos) -> bool {
        self.bonus_markers.contains(&pos)
    }

    pub fn starters(&self) -> Vec<Starter> {
        self.party
            .iter()
            .filter_map(|slot| {
                self.catalog.get(slot.pos).map(|species| Starter {
                    species_id: species.id,
                    name: species.name.clone(),
                    dex_attr: slot.dex_attr,
                    pokerus: self.is_bonus(slot.pos),
                })
            })
            .collect()
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![
            DebugSection::new("Cursor")
                .entry("mode", ron_string(&self.mode))
                .entry("generation", ron_string(&self.gen_cursor))
                .entry("cursor", ron_string(&self.cursor))
                .entry("overlay", ron_string(&self.overlay))
                .entry("last_outcome", ron_string(&self.last_outcome)),
            DebugSection::new("Party")
                .entry("slots", ron_string(&self.party))
                .entry("bonus", ron_string(&self.bonus_markers)),
            DebugSection::new("Budget")
                .entry("committed", ron_string(&self.budget.committed))
                .entry("shown", ron_string(&self.budget.shown))
                .entry("over_limit", ron_string(&self.budget.over_limit))
                .entry("revert_pending", ron_string(&self.budget.revert_pending)),
        ];

        if let Some(species) = self.current_species() {
            sections.push(
                DebugSection::new("Detail")
                    .entry("species", ron_string(&species.name))
                    .entry("dex_attr", ron_string(&self.dex_attr_cursor))
                    .entry("can_cycle", ron_string(&self.can_cycle))
                    .entry("sprite_token", ron_string(&self.sprite.request.as_ref().map(|r| r.token))),
            );
        }

        sections
    }
}
