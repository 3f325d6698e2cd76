use crate::games::GameKind;
use std::fmt;

const ROW_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub callback_data: &'static str,
}

/// Inline keyboard attached to a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub rows: Vec<Vec<Button>>,
}

impl Menu {
    /// One button per game, then balance and promo
    pub fn main() -> Self {
        let buttons: Vec<Button> = GameKind::ALL
            .iter()
            .map(|game| Button {
                label: game.title(),
                callback_data: game.as_str(),
            })
            .chain([
                Button {
                    label: "Balans",
                    callback_data: "balance",
                },
                Button {
                    label: "Promo kod",
                    callback_data: "promo",
                },
            ])
            .collect();

        Self {
            rows: buttons.chunks(ROW_WIDTH).map(<[Button]>::to_vec).collect(),
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let labels: Vec<String> = row
                .iter()
                .map(|b| format!("[{} :{}]", b.label, b.callback_data))
                .collect();
            f.write_str(&labels.join(" "))?;
        }
        Ok(())
    }
}
