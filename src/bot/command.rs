//! Inbound updates and the commands they map to

use crate::games::GameKind;
use crate::ledger::UserId;

/// Transport-neutral inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Free text typed by the user
    Message { user_id: UserId, text: String },
    /// Inline button press carrying callback data
    Callback { user_id: UserId, data: String },
}

impl Update {
    pub fn user_id(&self) -> UserId {
        match self {
            Update::Message { user_id, .. } | Update::Callback { user_id, .. } => *user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { referrer: Option<String> },
    Balance,
    Game(GameKind),
    PromoPrompt,
    Promo(String),
    /// Admin top-up; the game name is validated by the coordinator
    Bonus(String),
    Unknown,
}

const PROMO_PREFIX: &str = "PROMO ";

pub fn parse(update: &Update) -> Command {
    match update {
        Update::Message { text, .. } => parse_text(text),
        Update::Callback { data, .. } => parse_callback(data),
    }
}

fn parse_callback(data: &str) -> Command {
    match data {
        "balance" => Command::Balance,
        "promo" => Command::PromoPrompt,
        other => other.parse().map(Command::Game).unwrap_or(Command::Unknown),
    }
}

fn parse_text(text: &str) -> Command {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix('/') {
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        // Group chats address commands as /start@botname
        let name = name.split('@').next().unwrap_or(name);
        let arg = (!arg.is_empty()).then(|| arg.to_string());

        return match (name.to_ascii_lowercase().as_str(), arg) {
            ("start", referrer) => Command::Start { referrer },
            ("balance", _) => Command::Balance,
            ("bonus", Some(game)) => Command::Bonus(game),
            ("promo", Some(code)) => Command::Promo(first_word(&code)),
            ("promo", None) => Command::PromoPrompt,
            _ => Command::Unknown,
        };
    }

    let is_promo = text
        .get(..PROMO_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(PROMO_PREFIX));
    if is_promo {
        let code = first_word(&text[PROMO_PREFIX.len()..]);
        if !code.is_empty() {
            return Command::Promo(code);
        }
    }

    Command::Unknown
}

fn first_word(text: &str) -> String {
    text.split_whitespace().next().unwrap_or_default().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> Command {
        parse(&Update::Message {
            user_id: 1,
            text: text.to_string(),
        })
    }

    fn callback(data: &str) -> Command {
        parse(&Update::Callback {
            user_id: 1,
            data: data.to_string(),
        })
    }

    #[test]
    fn test_start_with_and_without_referrer() {
        assert_eq!(message("/start"), Command::Start { referrer: None });
        assert_eq!(
            message("/start 12345"),
            Command::Start {
                referrer: Some("12345".to_string())
            }
        );
        assert_eq!(
            message("/start@coin_bot 7"),
            Command::Start {
                referrer: Some("7".to_string())
            }
        );
    }

    #[test]
    fn test_promo_text() {
        assert_eq!(message("PROMO test"), Command::Promo("TEST".to_string()));
        assert_eq!(message("promo Test extra words"), Command::Promo("TEST".to_string()));
        assert_eq!(message("PROMO "), Command::Unknown);
        assert_eq!(message("PROMOTEST"), Command::Unknown);
        assert_eq!(message("/promo gift"), Command::Promo("GIFT".to_string()));
    }

    #[test]
    fn test_callbacks() {
        assert_eq!(callback("sapyor"), Command::Game(GameKind::Sapyor));
        assert_eq!(callback("balance"), Command::Balance);
        assert_eq!(callback("promo"), Command::PromoPrompt);
        assert_eq!(callback("poker"), Command::Unknown);
    }

    #[test]
    fn test_bonus_command() {
        assert_eq!(message("/bonus crash"), Command::Bonus("crash".to_string()));
        assert_eq!(message("/bonus"), Command::Unknown);
        assert_eq!(message("hello"), Command::Unknown);
    }
}
