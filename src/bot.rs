use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{LinkPreviewOptions, ParseMode},
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::router::{Copilot, Reply, ReplySink};

/// Replies into the chat a message came from.
struct ChatSink {
    bot: Bot,
    chat_id: ChatId,
}

fn no_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Replies are written for Telegram's legacy Markdown, which teloxide marks deprecated.
#[allow(deprecated)]
fn legacy_markdown() -> ParseMode {
    ParseMode::Markdown
}

#[async_trait]
impl ReplySink for ChatSink {
    async fn send(&self, reply: Reply) -> Result<()> {
        let mut req = self.bot.send_message(self.chat_id, reply.text.clone());
        if reply.disable_preview {
            req = req.link_preview_options(no_preview());
        }
        if !reply.markdown {
            req.await?;
            return Ok(());
        }

        // Analyzer text can still trip the Markdown parser; fall back to plain.
        if let Err(e) = req.parse_mode(legacy_markdown()).await {
            warn!(chat_id = self.chat_id.0, error = %e, "bot.send.markdown_rejected");
            let mut plain = self.bot.send_message(self.chat_id, reply.text);
            if reply.disable_preview {
                plain = plain.link_preview_options(no_preview());
            }
            plain.await?;
        }
        Ok(())
    }
}

async fn on_message(bot: Bot, msg: Message, copilot: Arc<Copilot>) -> ResponseResult<()> {
    let sink = ChatSink { bot, chat_id: msg.chat.id };
    debug!(chat_id = msg.chat.id.0, "bot.message");
    copilot.handle(msg.chat.id.0, msg.text(), &sink).await;
    Ok(())
}

/// Long-polls Telegram until the process is stopped.
pub async fn run(cfg: Config) -> Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let me = bot.get_me().await?;
    let copilot = Arc::new(Copilot::new(&cfg)?.with_bot_username(me.username()));

    let handler = dptree::entry().branch(Update::filter_message().endpoint(on_message));

    info!(
        username = me.username(),
        variant = ?copilot.variant(),
        mca_url = %cfg.mca_url,
        admin_chats = cfg.admin_chat_ids.len(),
        "bot.start"
    );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![copilot])
        .default_handler(|upd| async move {
            debug!(update_id = upd.id.0, "bot.update.unhandled");
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Error in message handler"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    warn!("bot.stopped");
    Ok(())
}
