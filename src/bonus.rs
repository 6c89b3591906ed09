//! Daily bonus markers (pokérus): three grid cells drawn from a day-seeded RNG

use chrono::{NaiveDate, NaiveTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::species::{Catalog, GridPos};

pub const BONUS_MARKER_COUNT: usize = 3;

/// Milliseconds since the epoch at UTC midnight of `day`
pub fn day_timestamp_ms(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn day_seed(base_seed: u64, day: NaiveDate) -> u64 {
    let day_ms = day_timestamp_ms(day) as u64;
    base_seed.rotate_left(17) ^ day_ms.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Draw up to three distinct positions among every selectable species
pub fn daily_markers(catalog: &Catalog, base_seed: u64, day: NaiveDate) -> Vec<GridPos> {
    let pool: Vec<GridPos> = catalog.positions().collect();
    let target = BONUS_MARKER_COUNT.min(pool.len());
    let mut rng = ChaCha20Rng::seed_from_u64(day_seed(base_seed, day));
    let mut markers: Vec<GridPos> = Vec::with_capacity(target);
    while markers.len() < target {
        let pick = pool[rng.gen_range(0..pool.len())];
        if !markers.contains(&pick) {
            markers.push(pick);
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{Abilities, GrowthRate, Species};

    fn catalog(count: u16) -> Catalog {
        let species = (1..=count)
            .map(|id| Species {
                id,
                name: format!("Mon{id}"),
                generation: 1 + ((id - 1) % 5) as u8,
                forms: Vec::new(),
                abilities: Abilities {
                    primary: "Run Away".into(),
                    secondary: None,
                    hidden: None,
                },
                male_percent: None,
                growth_rate: GrowthRate::Fast,
                value: 2,
            })
            .collect();
        Catalog::from_species(species).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_same_markers() {
        let catalog = catalog(60);
        let a = daily_markers(&catalog, 42, day(2024, 5, 1));
        let b = daily_markers(&catalog, 42, day(2024, 5, 1));
        assert_eq!(a, b);
        assert_eq!(a.len(), BONUS_MARKER_COUNT);
    }

    #[test]
    fn markers_are_distinct_and_valid() {
        let catalog = catalog(60);
        for offset in 0..30 {
            let date = day(2024, 1, 1) + chrono::Days::new(offset);
            let markers = daily_markers(&catalog, 7, date);
            for (i, m) in markers.iter().enumerate() {
                assert!(catalog.get(*m).is_some());
                assert!(!markers[i + 1..].contains(m));
            }
        }
    }

    #[test]
    fn markers_change_across_days() {
        let catalog = catalog(60);
        let first = daily_markers(&catalog, 42, day(2024, 5, 1));
        let differs = (1..10).any(|offset| {
            let date = day(2024, 5, 1) + chrono::Days::new(offset);
            daily_markers(&catalog, 42, date) != first
        });
        assert!(differs);
    }

    #[test]
    fn small_catalog_yields_fewer_markers() {
        let catalog = catalog(2);
        assert_eq!(daily_markers(&catalog, 1, day(2024, 5, 1)).len(), 2);
        assert!(daily_markers(&Catalog::default(), 1, day(2024, 5, 1)).is_empty());
    }

    #[test]
    fn timestamp_is_utc_midnight() {
        assert_eq!(day_timestamp_ms(day(1970, 1, 2)), 86_400_000);
    }
}
