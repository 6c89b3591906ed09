//! Dex unlock data: caught-attribute bitmasks and the variant props they encode

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::persist::DataError;
use crate::species::{AbilitySlot, Species};

const DEMO_SAVE: &str = include_str!("../data/demo_save.ron");

/// Bitmask of variant components (shininess, gender, ability slot, form)
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DexAttr(pub u64);

impl DexAttr {
    pub const NONE: DexAttr = DexAttr(0);
    pub const NON_SHINY: DexAttr = DexAttr(1);
    pub const SHINY: DexAttr = DexAttr(1 << 1);
    pub const MALE: DexAttr = DexAttr(1 << 2);
    pub const FEMALE: DexAttr = DexAttr(1 << 3);
    pub const ABILITY_1: DexAttr = DexAttr(1 << 4);
    pub const ABILITY_2: DexAttr = DexAttr(1 << 5);
    pub const ABILITY_HIDDEN: DexAttr = DexAttr(1 << 6);
    pub const DEFAULT_FORM: DexAttr = DexAttr(1 << 7);

    /// Bit for form `index`; form 0 is `DEFAULT_FORM`
    pub fn form(index: usize) -> DexAttr {
        DexAttr(1 << (7 + index.min(56)))
    }

    pub fn ability(slot: AbilitySlot) -> DexAttr {
        match slot {
            AbilitySlot::Primary => DexAttr::ABILITY_1,
            AbilitySlot::Secondary => DexAttr::ABILITY_2,
            AbilitySlot::Hidden => DexAttr::ABILITY_HIDDEN,
        }
    }

    pub fn contains(self, other: DexAttr) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: DexAttr) -> DexAttr {
        DexAttr(self.0 | other.0)
    }

    /// Decode the variant selected by this cursor
    pub fn props(self, species: &Species) -> VariantProps {
        let ability = if self.contains(DexAttr::ABILITY_1) {
            AbilitySlot::Primary
        } else if self.contains(DexAttr::ABILITY_2) && species.abilities.secondary.is_some() {
            AbilitySlot::Secondary
        } else if self.contains(DexAttr::ABILITY_HIDDEN) {
            AbilitySlot::Hidden
        } else {
            AbilitySlot::Primary
        };
        let form_index = (0..species.form_count())
            .find(|f| self.contains(DexAttr::form(*f)))
            .unwrap_or(0);
        VariantProps {
            shiny: self.contains(DexAttr::SHINY) && !self.contains(DexAttr::NON_SHINY),
            form_index,
            female: self.contains(DexAttr::FEMALE) && !self.contains(DexAttr::MALE),
            ability,
        }
    }

    pub fn from_props(props: VariantProps) -> DexAttr {
        let shiny = if props.shiny {
            DexAttr::SHINY
        } else {
            DexAttr::NON_SHINY
        };
        let gender = if props.female {
            DexAttr::FEMALE
        } else {
            DexAttr::MALE
        };
        shiny
            .union(gender)
            .union(DexAttr::ability(props.ability))
            .union(DexAttr::form(props.form_index))
    }
}

/// The (shiny, form, gender, ability) tuple shown for a species
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VariantProps {
    pub shiny: bool,
    pub form_index: usize,
    pub female: bool,
    pub ability: AbilitySlot,
}

impl Default for VariantProps {
    fn default() -> Self {
        Self {
            shiny: false,
            form_index: 0,
            female: false,
            ability: AbilitySlot::Primary,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DexEntry {
    #[serde(default)]
    pub caught_attr: DexAttr,
    /// Preferred variant recorded by the game, if any
    #[serde(default)]
    pub default_attr: Option<DexAttr>,
    #[serde(default)]
    pub ivs: [u8; 6],
}

impl DexEntry {
    pub fn is_caught(&self) -> bool {
        !self.caught_attr.is_empty()
    }

    /// Variant shown when the cursor first lands on the species
    pub fn default_props(&self, species: &Species) -> VariantProps {
        if !self.is_caught() {
            return VariantProps::default();
        }
        if let Some(attr) = self.default_attr {
            let props = attr.props(species);
            if self.grants(species, props) {
                return props;
            }
        }
        let caught = self.caught_attr;
        let shiny = !caught.contains(DexAttr::NON_SHINY) && caught.contains(DexAttr::SHINY);
        let female = !caught.contains(DexAttr::MALE) && caught.contains(DexAttr::FEMALE);
        let ability = species
            .ability_slots()
            .into_iter()
            .find(|slot| caught.contains(DexAttr::ability(*slot)))
            .unwrap_or(AbilitySlot::Primary);
        let form_index = (0..species.form_count())
            .find(|f| caught.contains(DexAttr::form(*f)))
            .unwrap_or(0);
        VariantProps {
            shiny,
            form_index,
            female,
            ability,
        }
    }

    /// Whether every component of `props` has been caught
    pub fn grants(&self, species: &Species, props: VariantProps) -> bool {
        let caught = self.caught_attr;
        let shiny_ok = caught.contains(if props.shiny {
            DexAttr::SHINY
        } else {
            DexAttr::NON_SHINY
        });
        let gender_ok = species.is_genderless()
            || caught.contains(if props.female {
                DexAttr::FEMALE
            } else {
                DexAttr::MALE
            });
        let ability_ok = species.ability(props.ability).is_some()
            && caught.contains(DexAttr::ability(props.ability));
        let form_ok = props.form_index < species.form_count()
            && caught.contains(DexAttr::form(props.form_index));
        shiny_ok && gender_ok && ability_ok && form_ok
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Unlocks {
    #[serde(default)]
    pub endless_mode: bool,
}

/// Read-only snapshot of the player's save data
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SaveData {
    #[serde(default)]
    pub dex: BTreeMap<u16, DexEntry>,
    #[serde(default)]
    pub unlocks: Unlocks,
}

impl SaveData {
    pub fn demo() -> Result<Self, DataError> {
        Self::from_ron(DEMO_SAVE)
    }

    pub fn from_ron(source: &str) -> Result<Self, DataError> {
        Ok(ron::de::from_str(source)?)
    }

    pub fn entry(&self, species_id: u16) -> Option<&DexEntry> {
        self.dex.get(&species_id)
    }

    pub fn caught_attr(&self, species_id: u16) -> DexAttr {
        self.entry(species_id)
            .map(|entry| entry.caught_attr)
            .unwrap_or_default()
    }

    pub fn is_caught(&self, species_id: u16) -> bool {
        !self.caught_attr(species_id).is_empty()
    }
}

/// Which variant axes have more than one unlocked value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CycleFlags {
    pub shiny: bool,
    pub form: bool,
    pub gender: bool,
    pub ability: bool,
}

impl CycleFlags {
    pub fn for_species(species: &Species, caught: DexAttr) -> Self {
        if caught.is_empty() {
            return Self::default();
        }
        let abilities = species
            .ability_slots()
            .into_iter()
            .filter(|slot| caught.contains(DexAttr::ability(*slot)))
            .count();
        let forms = (0..species.form_count())
            .filter(|f| caught.contains(DexAttr::form(*f)))
            .count();
        Self {
            shiny: caught.contains(DexAttr::SHINY) && caught.contains(DexAttr::NON_SHINY),
            form: forms > 1,
            gender: caught.contains(DexAttr::MALE) && caught.contains(DexAttr::FEMALE),
            ability: abilities > 1,
        }
    }

    pub fn any(&self) -> bool {
        self.shiny || self.form || self.gender || self.ability
    }
}

/// Next unlocked form after `current`, wrapping; `current` if none other is unlocked
pub fn next_form(species: &Species, caught: DexAttr, current: usize) -> usize {
    let count = species.form_count();
    let mut next = current % count;
    loop {
        next = (next + 1) % count;
        if next == current % count || caught.contains(DexAttr::form(next)) {
            return next;
        }
    }
}

/// Next unlocked ability slot in primary → secondary → hidden order
pub fn next_ability(species: &Species, caught: DexAttr, current: AbilitySlot) -> AbilitySlot {
    let slots = species.ability_slots();
    let Some(start) = slots.iter().position(|slot| *slot == current) else {
        return current;
    };
    (1..slots.len())
        .map(|step| slots[(start + step) % slots.len()])
        .find(|slot| caught.contains(DexAttr::ability(*slot)))
        .unwrap_or(current)
}
