use std::fmt;
use std::str::FromStr;

pub const NARVON_MAX_STEPS: u8 = 7;
pub const SAPYOR_SIZE: usize = 5;
pub const SAPYOR_MINES: usize = 3;
/// Crash multipliers are kept in hundredths so rounding is exact
pub const CRASH_MIN_HUNDREDTHS: u32 = 120;
pub const CRASH_MAX_HUNDREDTHS: u32 = 350;
pub const GILDIRAK_PREVIEW_LEN: usize = 10;
pub const MINORA_FLOORS: usize = 8;

/// The five games advice can be requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Narvon,
    Sapyor,
    Crash,
    Gildirak,
    Minora,
}

impl GameKind {
    pub const ALL: [GameKind; 5] = [
        GameKind::Narvon,
        GameKind::Sapyor,
        GameKind::Crash,
        GameKind::Gildirak,
        GameKind::Minora,
    ];

    /// Identifier used in commands and callback data
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Narvon => "narvon",
            GameKind::Sapyor => "sapyor",
            GameKind::Crash => "crash",
            GameKind::Gildirak => "gildirak",
            GameKind::Minora => "minora",
        }
    }

    /// Capitalized name shown to users
    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Narvon => "Narvon",
            GameKind::Sapyor => "Sapyor",
            GameKind::Crash => "Crash",
            GameKind::Gildirak => "Gildirak",
            GameKind::Minora => "Minora",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        GameKind::ALL
            .into_iter()
            .find(|game| game.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GameError::UnknownGame(wanted.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Unknown game: {0}")]
    UnknownGame(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Safe,
    Mine,
}

/// Wheel palette, most to least likely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelSymbol {
    Blue,
    Green,
    Red,
    Purple,
}

impl WheelSymbol {
    /// Relative weights 12:7:7:1
    pub const PALETTE: [(WheelSymbol, u32); 4] = [
        (WheelSymbol::Blue, 12),
        (WheelSymbol::Green, 7),
        (WheelSymbol::Red, 7),
        (WheelSymbol::Purple, 1),
    ];

    pub fn total_weight() -> u32 {
        Self::PALETTE.iter().map(|(_, weight)| weight).sum()
    }

    /// Map a roll in `0..total_weight()` onto the palette
    pub fn from_roll(roll: u32) -> WheelSymbol {
        let mut remaining = roll;
        for (symbol, weight) in Self::PALETTE {
            if remaining < weight {
                return symbol;
            }
            remaining -= weight;
        }
        WheelSymbol::Purple
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Crash multiplier in hundredths (`235` is `2.35x`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CrashMultiplier(u32);

impl CrashMultiplier {
    pub fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths.clamp(CRASH_MIN_HUNDREDTHS, CRASH_MAX_HUNDREDTHS))
    }

    pub fn hundredths(&self) -> u32 {
        self.0
    }

    pub fn value(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for CrashMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// One randomized prediction; the variant fixes the shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advice {
    /// Climb `steps` rungs, 1 through 7
    Narvon { steps: u8 },
    Sapyor { grid: [[Cell; SAPYOR_SIZE]; SAPYOR_SIZE] },
    Crash { multiplier: CrashMultiplier },
    Gildirak { preview: Vec<WheelSymbol>, prediction: WheelSymbol },
    Minora { floors: Vec<Direction> },
}

impl Advice {
    pub fn game(&self) -> GameKind {
        match self {
            Advice::Narvon { .. } => GameKind::Narvon,
            Advice::Sapyor { .. } => GameKind::Sapyor,
            Advice::Crash { .. } => GameKind::Crash,
            Advice::Gildirak { .. } => GameKind::Gildirak,
            Advice::Minora { .. } => GameKind::Minora,
        }
    }

    /// Number of mines on a sapyor grid, zero for other games
    pub fn mine_count(&self) -> usize {
        match self {
            Advice::Sapyor { grid } => grid
                .iter()
                .flatten()
                .filter(|cell| **cell == Cell::Mine)
                .count(),
            _ => 0,
        }
    }
}
