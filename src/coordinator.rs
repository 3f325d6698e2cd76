//! Transaction coordinator: applies the coin rules for each inbound event.
//!
//! Each event is one ledger transaction, so a referral credit and the
//! creation of the referred user commit together or not at all. Advice is
//! generated only after the debit has been committed.

use crate::{
    config::{CoinbotConfig, EconomyConfig},
    errors::{AccessError, CoinbotResult, LedgerError},
    games::{Advice, AdviceEngine, GameKind},
    ledger::{Ledger, UserId, UserRecord},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a first contact (`/start`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstContact {
    pub record: UserRecord,
    pub created: bool,
    /// Referrer that received the bonus during this call
    pub credited_referrer: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct AdviceReceipt {
    pub advice: Advice,
    /// Balance after the debit
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoReceipt {
    pub reward: i64,
    pub balance: i64,
}

/// Referral arguments are plain decimal user ids
pub fn parse_referrer(arg: &str) -> Option<UserId> {
    let arg = arg.trim();
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}

pub struct Coordinator {
    ledger: Arc<Ledger>,
    engine: AdviceEngine,
    economy: EconomyConfig,
    admin_id: Option<UserId>,
}

impl Coordinator {
    pub fn new(ledger: Arc<Ledger>, config: &CoinbotConfig) -> Self {
        Self {
            ledger,
            engine: AdviceEngine::new(),
            economy: config.economy.clone(),
            admin_id: config.bot.admin_id,
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn economy(&self) -> &EconomyConfig {
        &self.economy
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_id == Some(user_id)
    }

    /// Register the user; a brand-new user with a valid referrer credits that referrer
    pub fn on_first_contact(&self, user_id: UserId, referrer_arg: Option<&str>) -> CoinbotResult<FirstContact> {
        let referrer = referrer_arg
            .and_then(parse_referrer)
            .filter(|referrer| *referrer != user_id);

        let contact = self.ledger.transaction(|txn| {
            let registration = txn.get_or_create(user_id)?;
            let mut credited_referrer = None;

            if let (true, Some(referrer)) = (registration.created, referrer) {
                let known = txn.get(referrer)?.is_some();
                if known || !self.economy.referrer_must_exist {
                    txn.get_or_create(referrer)?;
                    txn.adjust_balance(referrer, self.economy.referral_bonus)?;
                    txn.increment_referrals(referrer, 1)?;
                    credited_referrer = Some(referrer);
                } else {
                    debug!(user_id, referrer, "Ignoring referral from unknown referrer");
                }
            }

            Ok(FirstContact {
                record: registration.record,
                created: registration.created,
                credited_referrer,
            })
        })?;

        if contact.created {
            info!(user_id, referrer = ?contact.credited_referrer, "New user registered");
        }
        Ok(contact)
    }

    pub fn on_balance_query(&self, user_id: UserId) -> CoinbotResult<i64> {
        Ok(self.ledger.get_or_create(user_id)?.record.balance)
    }

    /// Charge the advice cost, then generate advice for `game_name`
    pub fn on_game_request(&self, user_id: UserId, game_name: &str) -> CoinbotResult<AdviceReceipt> {
        let game: GameKind = game_name.parse()?;
        let cost = self.economy.advice_cost;

        // Separate commit so the record survives a rejected debit
        self.ledger.get_or_create(user_id)?;

        let record = self.ledger.transaction(|txn| {
            let current = txn.get_or_create(user_id)?.record;
            if current.balance < cost {
                return Err(LedgerError::InsufficientBalance {
                    user_id,
                    balance: current.balance,
                    delta: -cost,
                }
                .into());
            }
            txn.adjust_balance(user_id, -cost)
        })?;

        let advice = self.engine.generate(game);
        info!(user_id, %game, balance = record.balance, "Advice delivered");

        Ok(AdviceReceipt {
            advice,
            balance: record.balance,
        })
    }

    /// Credit the promo reward. Codes are not single-use.
    pub fn on_promo_submit(&self, user_id: UserId, code: &str) -> CoinbotResult<PromoReceipt> {
        self.ledger.get_or_create(user_id)?;
        let reward = self.ledger.lookup_promo(code)?;

        let record = self.ledger.transaction(|txn| txn.adjust_balance(user_id, reward))?;
        info!(user_id, reward, balance = record.balance, "Promo code redeemed");

        Ok(PromoReceipt {
            reward,
            balance: record.balance,
        })
    }

    /// Administrator-only top-up, keyed by the game button it was requested from
    pub fn on_admin_bonus(&self, user_id: UserId, game_name: &str) -> CoinbotResult<UserRecord> {
        if !self.is_admin(user_id) {
            return Err(AccessError::NotAdmin(user_id).into());
        }
        let game: GameKind = game_name.parse()?;
        let bonus = self.economy.admin_bonus;

        let record = self.ledger.transaction(|txn| {
            txn.get_or_create(user_id)?;
            txn.adjust_balance(user_id, bonus)
        })?;

        info!(user_id, %game, bonus, balance = record.balance, "Admin bonus granted");
        Ok(record)
    }
}
