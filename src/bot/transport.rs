//! Delivery side of the bot: where updates come from and replies go to

use super::{command::Update, replies::Reply, router::BotRouter};
use crate::{errors::CoinbotResult, ledger::UserId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::{info, warn};

#[async_trait]
pub trait Transport: Send {
    /// Next inbound update, `None` once the source is exhausted
    async fn next_update(&mut self) -> CoinbotResult<Option<Update>>;

    async fn send(&mut self, user_id: UserId, reply: Reply) -> CoinbotResult<()>;
}

/// Parse `<user_id> <text>` or `<user_id> :<callback_data>`
pub fn parse_console_line(line: &str) -> Option<Update> {
    let (id, rest) = line.trim().split_once(char::is_whitespace)?;
    let user_id = id.parse().ok()?;
    let rest = rest.trim();

    match rest.strip_prefix(':') {
        Some(data) if !data.is_empty() => Some(Update::Callback {
            user_id,
            data: data.to_string(),
        }),
        Some(_) => None,
        None if rest.is_empty() => None,
        None => Some(Update::Message {
            user_id,
            text: rest.to_string(),
        }),
    }
}

/// Line-oriented transport over any async reader and writer, stdin/stdout in the binary
pub struct ConsoleTransport<R, W> {
    lines: Lines<BufReader<R>>,
    out: W,
}

impl<R, W> ConsoleTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: BufReader::new(input).lines(),
            out,
        }
    }
}

impl ConsoleTransport<tokio::io::Stdin, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> Transport for ConsoleTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_update(&mut self) -> CoinbotResult<Option<Update>> {
        while let Some(line) = self.lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match parse_console_line(&line) {
                Some(update) => return Ok(Some(update)),
                None => warn!(%line, "Unparseable console line, expected `<user_id> <text>`"),
            }
        }
        Ok(None)
    }

    async fn send(&mut self, user_id: UserId, reply: Reply) -> CoinbotResult<()> {
        let mut block = format!("-> {}\n{}\n", user_id, reply.text);
        if let Some(menu) = reply.menu {
            block.push_str(&format!("{}\n", menu));
        }
        self.out.write_all(block.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

/// Pump updates through the router until the transport runs dry.
///
/// Ledger commits block on fsync, so each update is handled on the blocking pool.
pub async fn run<T: Transport>(router: Arc<BotRouter>, mut transport: T) -> CoinbotResult<()> {
    info!("Bot transport started");
    let mut handled = 0u64;

    while let Some(update) = transport.next_update().await? {
        let user_id = update.user_id();
        let router = Arc::clone(&router);
        let reply = match tokio::task::spawn_blocking(move || router.handle(&update)).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user_id, error = %e, "Update handler panicked");
                continue;
            }
        };

        if let Some(reply) = reply {
            transport.send(user_id, reply).await?;
        }
        handled += 1;
    }

    info!(handled, "Bot transport finished");
    Ok(())
}
