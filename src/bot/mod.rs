//! Chat-facing layer: turns raw updates into coordinator events and
//! coordinator results into reply texts with the inline menu.

pub mod command;
pub mod menu;
pub mod replies;
pub mod router;
pub mod transport;

pub use command::{Command, Update};
pub use menu::Menu;
pub use replies::Reply;
pub use router::BotRouter;
pub use transport::{ConsoleTransport, Transport};
