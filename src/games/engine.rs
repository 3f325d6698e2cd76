//! Randomized advice generation. Stateless: every call draws fresh randomness
//! and touches nothing shared, so one engine can serve any number of tasks.

use super::types::*;
use rand::{seq::index, Rng};

#[derive(Debug, Clone, Copy, Default)]
pub struct AdviceEngine;

impl AdviceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Generate advice using the thread-local RNG
    pub fn generate(&self, game: GameKind) -> Advice {
        self.generate_with(game, &mut rand::thread_rng())
    }

    /// Parse a game identifier, then generate
    pub fn generate_named(&self, game_id: &str) -> Result<Advice, GameError> {
        let game: GameKind = game_id.parse()?;
        Ok(self.generate(game))
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, game: GameKind, rng: &mut R) -> Advice {
        match game {
            GameKind::Narvon => narvon(rng),
            GameKind::Sapyor => sapyor(rng),
            GameKind::Crash => crash(rng),
            GameKind::Gildirak => gildirak(rng),
            GameKind::Minora => minora(rng),
        }
    }
}

fn narvon<R: Rng + ?Sized>(rng: &mut R) -> Advice {
    Advice::Narvon {
        steps: rng.gen_range(1..=NARVON_MAX_STEPS),
    }
}

fn sapyor<R: Rng + ?Sized>(rng: &mut R) -> Advice {
    let mut grid = [[Cell::Safe; SAPYOR_SIZE]; SAPYOR_SIZE];
    for pos in index::sample(rng, SAPYOR_SIZE * SAPYOR_SIZE, SAPYOR_MINES) {
        grid[pos / SAPYOR_SIZE][pos % SAPYOR_SIZE] = Cell::Mine;
    }
    Advice::Sapyor { grid }
}

fn crash<R: Rng + ?Sized>(rng: &mut R) -> Advice {
    let min = f64::from(CRASH_MIN_HUNDREDTHS) / 100.0;
    let max = f64::from(CRASH_MAX_HUNDREDTHS) / 100.0;
    let raw: f64 = rng.gen_range(min..=max);
    Advice::Crash {
        multiplier: CrashMultiplier::from_hundredths((raw * 100.0).round() as u32),
    }
}

fn spin<R: Rng + ?Sized>(rng: &mut R) -> WheelSymbol {
    WheelSymbol::from_roll(rng.gen_range(0..WheelSymbol::total_weight()))
}

fn gildirak<R: Rng + ?Sized>(rng: &mut R) -> Advice {
    let prediction = spin(rng);
    let preview = (0..GILDIRAK_PREVIEW_LEN).map(|_| spin(rng)).collect();
    Advice::Gildirak { preview, prediction }
}

fn minora<R: Rng + ?Sized>(rng: &mut R) -> Advice {
    let floors = (0..MINORA_FLOORS)
        .map(|_| if rng.gen_bool(0.5) { Direction::Left } else { Direction::Right })
        .collect();
    Advice::Minora { floors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_every_game_has_its_shape() {
        let engine = AdviceEngine::new();
        for game in GameKind::ALL {
            for _ in 0..50 {
                let advice = engine.generate(game);
                assert_eq!(advice.game(), game);
                match advice {
                    Advice::Narvon { steps } => assert!((1..=NARVON_MAX_STEPS).contains(&steps)),
                    Advice::Sapyor { .. } => assert_eq!(advice.mine_count(), SAPYOR_MINES),
                    Advice::Crash { multiplier } => {
                        assert!((CRASH_MIN_HUNDREDTHS..=CRASH_MAX_HUNDREDTHS).contains(&multiplier.hundredths()))
                    }
                    Advice::Gildirak { ref preview, .. } => assert_eq!(preview.len(), GILDIRAK_PREVIEW_LEN),
                    Advice::Minora { ref floors } => assert_eq!(floors.len(), MINORA_FLOORS),
                }
            }
        }
    }

    #[test]
    fn test_unknown_game() {
        let engine = AdviceEngine::new();
        assert!(engine.generate_named("blackjack").is_err());
        assert_eq!(engine.generate_named("MINORA").unwrap().game(), GameKind::Minora);
    }

    #[test]
    fn test_sapyor_placements_vary() {
        let engine = AdviceEngine::new();
        let layouts: HashSet<String> = (0..20)
            .map(|_| format!("{:?}", engine.generate(GameKind::Sapyor)))
            .collect();
        // 2300 possible layouts; 20 identical draws is effectively impossible
        assert!(layouts.len() > 1);
    }

    #[test]
    fn test_crash_two_decimals_in_range() {
        let engine = AdviceEngine::new();
        for _ in 0..500 {
            let Advice::Crash { multiplier } = engine.generate(GameKind::Crash) else {
                panic!("expected crash advice");
            };
            let value = multiplier.value();
            assert!((1.2..=3.5).contains(&value), "out of range: {}", value);
            let rendered = multiplier.to_string();
            assert_eq!(rendered.split('.').nth(1).map(str::len), Some(2));
        }
    }

    #[test]
    fn test_narvon_covers_all_step_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let engine = AdviceEngine::new();
        let seen: HashSet<u8> = (0..500)
            .filter_map(|_| match engine.generate_with(GameKind::Narvon, &mut rng) {
                Advice::Narvon { steps } => Some(steps),
                _ => None,
            })
            .collect();
        assert_eq!(seen.len(), NARVON_MAX_STEPS as usize);
    }

    #[test]
    fn test_gildirak_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 27_000;
        let mut counts = [0usize; 4];
        for _ in 0..draws {
            let symbol = spin(&mut rng);
            let idx = WheelSymbol::PALETTE.iter().position(|(s, _)| *s == symbol).unwrap();
            counts[idx] += 1;
        }
        // Expected 12000 / 7000 / 7000 / 1000
        assert!((11_200..12_800).contains(&counts[0]), "{:?}", counts);
        assert!((6_400..7_600).contains(&counts[1]), "{:?}", counts);
        assert!((6_400..7_600).contains(&counts[2]), "{:?}", counts);
        assert!((700..1_300).contains(&counts[3]), "{:?}", counts);
    }

    #[test]
    fn test_minora_uses_both_directions() {
        let mut rng = StdRng::seed_from_u64(3);
        let engine = AdviceEngine::new();
        let mut seen = HashSet::new();
        for _ in 0..20 {
            if let Advice::Minora { floors } = engine.generate_with(GameKind::Minora, &mut rng) {
                seen.extend(floors.into_iter().map(|d| d == Direction::Left));
            }
        }
        assert_eq!(seen.len(), 2);
    }
}
