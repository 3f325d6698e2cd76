//! Chat rendering of advice

use super::types::*;
use std::fmt;

impl Cell {
    pub fn emoji(&self) -> &'static str {
        match self {
            Cell::Safe => "⬜",
            Cell::Mine => "🧨",
        }
    }
}

impl WheelSymbol {
    pub fn emoji(&self) -> &'static str {
        match self {
            WheelSymbol::Blue => "🟦",
            WheelSymbol::Green => "🟩",
            WheelSymbol::Red => "🟥",
            WheelSymbol::Purple => "🟪",
        }
    }
}

impl Direction {
    pub fn emoji(&self) -> &'static str {
        match self {
            Direction::Left => "⬅️",
            Direction::Right => "➡️",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::Narvon { steps } => {
                let path: Vec<String> = (1..=*steps).map(|step| step.to_string()).collect();
                write!(f, "🪜 {}", path.join("->"))
            }
            Advice::Sapyor { grid } => {
                let rows: Vec<String> = grid
                    .iter()
                    .map(|row| row.iter().map(Cell::emoji).collect())
                    .collect();
                f.write_str(&rows.join("\n"))
            }
            Advice::Crash { multiplier } => {
                write!(f, "💡 Taxminiy to‘xtash x: {}x", multiplier)
            }
            Advice::Gildirak { preview, prediction } => {
                let strip: String = preview.iter().map(WheelSymbol::emoji).collect();
                write!(f, "{}\n🎯 Taxminiy to'xtash rangi: {}", strip, prediction.emoji())
            }
            Advice::Minora { floors } => {
                let lines: Vec<String> = floors
                    .iter()
                    .enumerate()
                    .map(|(i, direction)| format!("Qavat {}: {}", i + 1, direction.emoji()))
                    .collect();
                f.write_str(&lines.join("\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narvon_path() {
        assert_eq!(Advice::Narvon { steps: 3 }.to_string(), "🪜 1->2->3");
        assert_eq!(Advice::Narvon { steps: 1 }.to_string(), "🪜 1");
    }

    #[test]
    fn test_sapyor_grid_rows() {
        let mut grid = [[Cell::Safe; SAPYOR_SIZE]; SAPYOR_SIZE];
        grid[0][0] = Cell::Mine;
        grid[4][4] = Cell::Mine;
        let text = Advice::Sapyor { grid }.to_string();

        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 5);
        assert!(rows[0].starts_with("🧨"));
        assert!(rows[4].ends_with("🧨"));
        assert_eq!(text.matches("🧨").count(), 2);
    }

    #[test]
    fn test_crash_and_gildirak_text() {
        let crash = Advice::Crash {
            multiplier: CrashMultiplier::from_hundredths(250),
        };
        assert!(crash.to_string().ends_with("2.50x"));

        let wheel = Advice::Gildirak {
            preview: vec![WheelSymbol::Blue; GILDIRAK_PREVIEW_LEN],
            prediction: WheelSymbol::Purple,
        };
        let text = wheel.to_string();
        assert_eq!(text.matches("🟦").count(), GILDIRAK_PREVIEW_LEN);
        assert!(text.ends_with("🟪"));
    }

    #[test]
    fn test_minora_floors() {
        let text = Advice::Minora {
            floors: vec![Direction::Left, Direction::Right],
        }
        .to_string();
        assert_eq!(text, "Qavat 1: ⬅️\nQavat 2: ➡️");
    }
}
