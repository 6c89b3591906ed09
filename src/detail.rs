//! Detail pane projection: what the screen shows for the cursored species

use crate::dex::{CycleFlags, DexAttr, DexEntry};
use crate::species::{AbilitySlot, GrowthRate, Species};
use crate::state::{AppState, BrowseMode};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailView {
    /// Zero-padded dex number, "000" when unknown
    pub number: String,
    pub name: String,
    pub growth_rate: Option<GrowthRate>,
    pub gender: Option<char>,
    pub ability: Option<String>,
    pub hidden_ability: bool,
    pub form: Option<String>,
    pub shiny: bool,
    pub value: Option<u8>,
    pub caught: bool,
    pub can_cycle: CycleFlags,
}

pub const MALE_GLYPH: char = '♂';
pub const FEMALE_GLYPH: char = '♀';

/// Project a species entry and variant cursor into display fields
pub fn project(species: Option<&Species>, entry: Option<&DexEntry>, dex_attr: DexAttr) -> DetailView {
    let Some(species) = species else {
        return DetailView {
            number: "000".to_string(),
            ..Default::default()
        };
    };
    let caught_attr = entry.map(|e| e.caught_attr).unwrap_or_default();
    if caught_attr.is_empty() {
        return DetailView {
            number: "000".to_string(),
            name: "???".to_string(),
            ..Default::default()
        };
    }

    let props = dex_attr.props(species);
    let gender = if species.is_genderless() {
        None
    } else if props.female {
        Some(FEMALE_GLYPH)
    } else {
        Some(MALE_GLYPH)
    };
    DetailView {
        number: format!("{:03}", species.id),
        name: species.name.clone(),
        growth_rate: Some(species.growth_rate),
        gender,
        ability: species.ability(props.ability).map(str::to_string),
        hidden_ability: props.ability == AbilitySlot::Hidden,
        form: species.form_name(props.form_index).map(str::to_string),
        shiny: props.shiny,
        value: Some(species.value),
        caught: true,
        can_cycle: CycleFlags::for_species(species, caught_attr),
    }
}

pub fn detail_view(state: &AppState) -> DetailView {
    let species = state.current_species();
    let entry = species.and_then(|s| state.entry_for(s));
    project(species, entry, state.dex_attr_cursor)
}

/// Key hints for the current screen state
pub fn instruction_lines(state: &AppState) -> Vec<String> {
    let mut lines = vec!["Arrow Keys/WASD: Move".to_string()];
    if state.mode == BrowseMode::Species {
        lines.push("Z/Space/Enter: Select".to_string());
    }
    if !state.party.is_empty() {
        lines.push("X/Backspace/Esc: Undo".to_string());
    }

    let mut cycles: Vec<String> = Vec::new();
    if state.current_is_caught() {
        let flags = state.can_cycle;
        let hints = [
            (flags.shiny, "R: Cycle Shiny"),
            (flags.form, "F: Cycle Form"),
            (flags.gender, "G: Cycle Gender"),
            (flags.ability, "E: Cycle Ability"),
        ];
        cycles = hints
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, hint)| hint.to_string())
            .collect();
    }
    lines.extend(pack_pairs(cycles));
    lines
}

/// More than two hints are joined pairwise so they fit in two lines
fn pack_pairs(hints: Vec<String>) -> Vec<String> {
    if hints.len() <= 2 {
        return hints;
    }
    hints.chunks(2).map(|pair| pair.join(" | ")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Abilities;
    use pretty_assertions::assert_eq;

    fn species() -> Species {
        Species {
            id: 7,
            name: "Squirtle".into(),
            generation: 1,
            forms: Vec::new(),
            abilities: Abilities {
                primary: "Torrent".into(),
                secondary: None,
                hidden: Some("Rain Dish".into()),
            },
            male_percent: Some(87.5),
            growth_rate: GrowthRate::MediumSlow,
            value: 3,
        }
    }

    #[test]
    fn nothing_cursored_shows_placeholder_number() {
        let view = project(None, None, DexAttr::NONE);
        assert_eq!(view.number, "000");
        assert_eq!(view.name, "");
        assert_eq!(view.gender, None);
    }

    #[test]
    fn uncaught_species_is_masked() {
        let view = project(Some(&species()), None, DexAttr::NONE);
        assert_eq!(view.number, "000");
        assert_eq!(view.name, "???");
        assert_eq!(view.ability, None);
        assert!(!view.caught);
    }

    #[test]
    fn caught_species_shows_variant() {
        let entry = DexEntry {
            caught_attr: DexAttr::NON_SHINY
                .union(DexAttr::FEMALE)
                .union(DexAttr::ABILITY_HIDDEN)
                .union(DexAttr::DEFAULT_FORM),
            ..Default::default()
        };
        let cursor = DexAttr::NON_SHINY
            .union(DexAttr::FEMALE)
            .union(DexAttr::ABILITY_HIDDEN)
            .union(DexAttr::DEFAULT_FORM);
        let view = project(Some(&species()), Some(&entry), cursor);
        assert_eq!(view.number, "007");
        assert_eq!(view.name, "Squirtle");
        assert_eq!(view.gender, Some(FEMALE_GLYPH));
        assert_eq!(view.ability.as_deref(), Some("Rain Dish"));
        assert!(view.hidden_ability);
        assert_eq!(view.growth_rate.map(GrowthRate::label), Some("Medium Slow"));
        assert_eq!(view.can_cycle, CycleFlags::default());
        assert_eq!(
            DexAttr::from_props(cursor.props(&species())).props(&species()).ability,
            AbilitySlot::Hidden
        );
    }

    #[test]
    fn pairs_pack_only_above_two_hints() {
        let two = vec!["a".to_string(), "b".to_string()];
        assert_eq!(pack_pairs(two.clone()), two);
        let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(pack_pairs(three), vec!["a | b", "c"]);
        let four = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert_eq!(pack_pairs(four), vec!["a | b", "c | d"]);
    }

    #[test]
    fn select_hint_names_confirm_keys() {
        let mut state = AppState::default();
        state.mode = BrowseMode::Species;
        let lines = instruction_lines(&state);
        assert_eq!(lines[1], "Z/Space/Enter: Select");
    }

    #[test]
    fn generation_mode_hides_select_hint() {
        let state = AppState::default();
        assert_eq!(instruction_lines(&state), vec!["Arrow Keys/WASD: Move"]);
    }
}
