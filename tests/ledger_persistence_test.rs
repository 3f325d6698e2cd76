//! Ledger state must survive closing and reopening the database

use coinbot::{
    config::CoinbotConfig,
    errors::CoinbotError,
    ledger::{Ledger, PromoCode},
    Coordinator,
};
use std::sync::Arc;
use tempfile::TempDir;

fn persistent_config(dir: &TempDir) -> CoinbotConfig {
    let mut config = CoinbotConfig::ephemeral(dir.path());
    config.storage.clear_on_start = false;
    config.storage.sync_writes = true;
    config
}

#[test]
fn test_ledger_persistence_across_restarts() {
    let dir = TempDir::new().unwrap();
    let config = persistent_config(&dir);

    // Phase 1: register users, spend, redeem, then drop everything
    {
        let ledger = Arc::new(Ledger::open(&config).unwrap());
        ledger.insert_promo("welcome", 20).unwrap();

        let coordinator = Coordinator::new(Arc::clone(&ledger), &config);
        coordinator.on_first_contact(1, None).unwrap();
        coordinator.on_first_contact(2, Some("1")).unwrap();
        coordinator.on_game_request(2, "crash").unwrap();
        coordinator.on_promo_submit(2, "WELCOME").unwrap();
    }

    // Phase 2: reopen and verify
    let ledger = Ledger::open(&config).unwrap();

    let referrer = ledger.get(1).unwrap().unwrap();
    assert_eq!(referrer.balance, 8);
    assert_eq!(referrer.referral_count, 1);

    let referred = ledger.get(2).unwrap().unwrap();
    assert_eq!(referred.balance, 5 - 1 + 20);

    assert_eq!(
        ledger.list_promos().unwrap(),
        vec![PromoCode {
            code: "WELCOME".to_string(),
            reward: 20
        }]
    );

    // A restarted bot keeps the referral guard
    let coordinator = Coordinator::new(Arc::new(ledger), &config);
    let again = coordinator.on_first_contact(2, Some("1")).unwrap();
    assert!(!again.created);
    assert_eq!(coordinator.ledger().get(1).unwrap().unwrap().balance, 8);
}

#[test]
fn test_clear_on_start_wipes_previous_state() {
    let dir = TempDir::new().unwrap();
    let config = persistent_config(&dir);

    {
        let ledger = Ledger::open(&config).unwrap();
        ledger.get_or_create(9).unwrap();
    }

    let mut clearing = config.clone();
    clearing.storage.clear_on_start = true;
    let ledger = Ledger::open(&clearing).unwrap();
    assert!(ledger.list_users().unwrap().is_empty());
}

#[test]
fn test_second_open_of_live_database_fails() {
    let dir = TempDir::new().unwrap();
    let config = persistent_config(&dir);

    let _live = Ledger::open(&config).unwrap();
    let err = Ledger::open(&config).err().expect("second open must fail");
    assert!(matches!(err, CoinbotError::Storage(_)));
}
