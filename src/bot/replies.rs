//! User-facing reply texts

use super::menu::Menu;
use crate::games::{Advice, GameKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Menu>,
}

impl Reply {
    /// Reply with the main menu attached
    pub fn with_menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: Some(Menu::main()),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
        }
    }
}

pub fn welcome() -> Reply {
    Reply::with_menu("🎉 Xush kelibsiz! Quyidagi tugmalardan foydalaning:")
}

pub fn balance(balance: i64) -> Reply {
    Reply::with_menu(format!("💰 Balans: {} coin", balance))
}

pub fn promo_prompt() -> Reply {
    Reply::plain("💳 Promo kod kiriting format: PROMO <code>\nMasalan: PROMO TEST")
}

pub fn insufficient_balance() -> Reply {
    Reply::with_menu("❌ Coin yetarli emas")
}

pub fn advice(game: GameKind, advice: &Advice) -> Reply {
    Reply::with_menu(format!("💡 Maslahat ({}):\n{}", game.title(), advice))
}

pub fn promo_accepted(reward: i64) -> Reply {
    Reply::with_menu(format!("🎁 Promokod qabul qilindi! {} coin qo‘shildi.", reward))
}

pub fn promo_rejected() -> Reply {
    Reply::with_menu("❌ Noto‘g‘ri promokod!")
}

pub fn admin_bonus(bonus: i64) -> Reply {
    Reply::with_menu(format!("✅ {} coin qo‘shildi (admin bonus)", bonus))
}

pub fn admin_only() -> Reply {
    Reply::with_menu("⛔ Bu buyruq faqat admin uchun")
}

pub fn unknown_game() -> Reply {
    Reply::with_menu("❓ Bunday o‘yin yo‘q")
}

pub fn internal_error() -> Reply {
    Reply::with_menu("⚠️ Xatolik yuz berdi, keyinroq qayta urinib ko‘ring")
}
