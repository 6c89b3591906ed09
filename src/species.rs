//! Static species catalog, grouped into the per-generation selection grids

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::persist::DataError;
use crate::state::VALUE_LIMIT;

pub const GENERATION_COUNT: usize = 5;
pub const GRID_COLUMNS: usize = 9;
pub const GRID_ROWS: usize = 9;
pub const GRID_CELLS: usize = GRID_COLUMNS * GRID_ROWS;

/// Built-in catalog shipped with the binary
const BUILTIN_CATALOG: &str = include_str!("../data/species.ron");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GrowthRate {
    Erratic,
    Fast,
    MediumFast,
    MediumSlow,
    Slow,
    Fluctuating,
}

impl GrowthRate {
    pub fn label(self) -> &'static str {
        match self {
            GrowthRate::Erratic => "Erratic",
            GrowthRate::Fast => "Fast",
            GrowthRate::MediumFast => "Medium Fast",
            GrowthRate::MediumSlow => "Medium Slow",
            GrowthRate::Slow => "Slow",
            GrowthRate::Fluctuating => "Fluctuating",
        }
    }
}

/// One of the three ability slots a species can have
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AbilitySlot {
    Primary,
    Secondary,
    Hidden,
}

impl AbilitySlot {
    pub const ALL: [AbilitySlot; 3] = [
        AbilitySlot::Primary,
        AbilitySlot::Secondary,
        AbilitySlot::Hidden,
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Abilities {
    pub primary: String,
    #[serde(default)]
    pub secondary: Option<String>,
    #[serde(default)]
    pub hidden: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Species {
    pub id: u16,
    pub name: String,
    pub generation: u8,
    /// Alternate form names; empty means a single default form
    #[serde(default)]
    pub forms: Vec<String>,
    pub abilities: Abilities,
    /// Percentage of males; `None` for genderless species
    #[serde(default)]
    pub male_percent: Option<f32>,
    pub growth_rate: GrowthRate,
    /// Point cost counted against the party budget
    pub value: u8,
}

impl Species {
    pub fn form_count(&self) -> usize {
        self.forms.len().max(1)
    }

    pub fn form_name(&self, index: usize) -> Option<&str> {
        self.forms.get(index).map(String::as_str)
    }

    pub fn is_genderless(&self) -> bool {
        self.male_percent.is_none()
    }

    /// Ability slots this species actually has, in cycling order
    pub fn ability_slots(&self) -> Vec<AbilitySlot> {
        AbilitySlot::ALL
            .into_iter()
            .filter(|slot| self.ability(*slot).is_some())
            .collect()
    }

    pub fn ability(&self, slot: AbilitySlot) -> Option<&str> {
        match slot {
            AbilitySlot::Primary => Some(self.abilities.primary.as_str()),
            AbilitySlot::Secondary => self.abilities.secondary.as_deref(),
            AbilitySlot::Hidden => self.abilities.hidden.as_deref(),
        }
    }
}

/// A cell on one of the generation grids
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct GridPos {
    pub generation: usize,
    pub index: usize,
}

impl GridPos {
    pub fn new(generation: usize, index: usize) -> Self {
        Self { generation, index }
    }

    pub fn row(&self) -> usize {
        self.index / GRID_COLUMNS
    }

    pub fn col(&self) -> usize {
        self.index % GRID_COLUMNS
    }
}

/// Species grouped by generation, each group laid out row-major on a 9x9 grid
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Catalog {
    generations: Vec<Vec<Species>>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, DataError> {
        Self::from_ron(BUILTIN_CATALOG)
    }

    pub fn from_ron(source: &str) -> Result<Self, DataError> {
        let species: Vec<Species> = ron::de::from_str(source)?;
        Self::from_species(species)
    }

    pub fn from_species(mut species: Vec<Species>) -> Result<Self, DataError> {
        species.sort_by_key(|s| s.id);
        if let Some(pair) = species.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(DataError::Invalid(format!("duplicate species id {}", pair[0].id)));
        }
        let mut generations: Vec<Vec<Species>> = vec![Vec::new(); GENERATION_COUNT];
        for entry in species {
            if !(1..=VALUE_LIMIT).contains(&entry.value) {
                return Err(DataError::Invalid(format!(
                    "{} has point value {} outside 1..={}",
                    entry.name, entry.value, VALUE_LIMIT
                )));
            }
            if entry.generation == 0 {
                return Err(DataError::Invalid(format!(
                    "{} has generation 0",
                    entry.name
                )));
            }
            let Some(group) = generations.get_mut(entry.generation as usize - 1) else {
                continue;
            };
            if group.len() >= GRID_CELLS {
                return Err(DataError::Invalid(format!(
                    "generation {} has more than {} species",
                    entry.generation, GRID_CELLS
                )));
            }
            group.push(entry);
        }
        Ok(Self { generations })
    }

    pub fn generation(&self, generation: usize) -> &[Species] {
        self.generations
            .get(generation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn generation_len(&self, generation: usize) -> usize {
        self.generation(generation).len()
    }

    pub fn get(&self, pos: GridPos) -> Option<&Species> {
        self.generation(pos.generation).get(pos.index)
    }

    /// Every selectable grid position, generation by generation
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.generations
            .iter()
            .enumerate()
            .flat_map(|(g, group)| (0..group.len()).map(move |i| GridPos::new(g, i)))
    }

    pub fn position_of(&self, species_id: u16) -> Option<GridPos> {
        self.generations.iter().enumerate().find_map(|(g, group)| {
            group
                .iter()
                .position(|s| s.id == species_id)
                .map(|i| GridPos::new(g, i))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.generations.iter().all(Vec::is_empty)
    }
}
