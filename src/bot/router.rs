//! Maps parsed commands onto coordinator events and renders the replies

use super::{
    command::{self, Command, Update},
    replies::{self, Reply},
};
use crate::{
    coordinator::Coordinator,
    errors::{CoinbotError, LedgerError},
    ledger::UserId,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct BotRouter {
    coordinator: Arc<Coordinator>,
}

impl BotRouter {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }

    /// Handle one update. `None` means the update is ignored without a reply.
    pub fn handle(&self, update: &Update) -> Option<Reply> {
        let user_id = update.user_id();
        let command = command::parse(update);
        debug!(user_id, ?command, "Routing update");

        let coordinator = &self.coordinator;
        let result = match command {
            Command::Start { referrer } => coordinator
                .on_first_contact(user_id, referrer.as_deref())
                .map(|_| replies::welcome()),
            Command::Balance => coordinator.on_balance_query(user_id).map(replies::balance),
            Command::PromoPrompt => Ok(replies::promo_prompt()),
            Command::Game(game) => coordinator
                .on_game_request(user_id, game.as_str())
                .map(|receipt| replies::advice(game, &receipt.advice)),
            Command::Promo(code) => coordinator
                .on_promo_submit(user_id, &code)
                .map(|receipt| replies::promo_accepted(receipt.reward)),
            Command::Bonus(game) => coordinator
                .on_admin_bonus(user_id, &game)
                .map(|_| replies::admin_bonus(coordinator.economy().admin_bonus)),
            Command::Unknown => return None,
        };

        Some(result.unwrap_or_else(|e| error_reply(user_id, e)))
    }
}

fn error_reply(user_id: UserId, error: CoinbotError) -> Reply {
    match error {
        CoinbotError::Ledger(LedgerError::InsufficientBalance { .. }) => replies::insufficient_balance(),
        CoinbotError::Ledger(LedgerError::PromoNotFound(_)) => replies::promo_rejected(),
        CoinbotError::Access(_) => {
            warn!(user_id, "Rejected admin command from non-admin");
            replies::admin_only()
        }
        CoinbotError::Game(e) => {
            warn!(user_id, error = %e, "Game request for unknown game");
            replies::unknown_game()
        }
        other => {
            warn!(user_id, error = %other, "Update failed");
            replies::internal_error()
        }
    }
}
