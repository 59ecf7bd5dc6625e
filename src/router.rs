use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::address::parse_address;
use crate::analyzer::AnalyzerClient;
use crate::config::{Config, Variant};
use crate::deploy::DeployHook;
use crate::format::{self, Style};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Start,
    Help,
    Status,
    Redeploy,
    /// Free text, validated by the address handler.
    Text(String),
    Ignore,
}

impl Route {
    /// `bot_username` drops commands addressed to another bot (`/status@other_bot`).
    pub fn classify(text: Option<&str>, variant: Variant, bot_username: Option<&str>) -> Self {
        let Some(text) = text else {
            return Route::Ignore;
        };
        let trimmed = text.trim_start();
        if !trimmed.starts_with('/') {
            return Route::Text(text.to_string());
        }

        // "/status@my_bot extra" -> ("status", Some("my_bot"))
        let mut head = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_start_matches('/')
            .splitn(2, '@');
        let cmd = head.next().unwrap_or_default().to_lowercase();
        if let (Some(target), Some(me)) = (head.next(), bot_username) {
            if !target.eq_ignore_ascii_case(me) {
                return Route::Ignore;
            }
        }

        match cmd.as_str() {
            "start" => Route::Start,
            "help" => Route::Help,
            "status" => Route::Status,
            "redeploy" if variant == Variant::Ops => Route::Redeploy,
            _ => Route::Ignore,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
    pub disable_preview: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), markdown: false, disable_preview: false }
    }

    pub fn styled(text: impl Into<String>, style: &Style) -> Self {
        Self { text: text.into(), markdown: style.markdown, disable_preview: false }
    }
}

/// Where handler replies go: the Telegram chat in production, a buffer in tests.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: Reply) -> Result<()>;
}

/// Per-process handler state. Built once from `Config`, shared read-only.
pub struct Copilot {
    variant: Variant,
    style: Style,
    analyzer: AnalyzerClient,
    deploy: DeployHook,
    debug_probe_address: String,
    api_key_present: bool,
    admin_chat_ids: Vec<i64>,
    bot_username: Option<String>,
}

impl Copilot {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            variant: cfg.variant,
            style: Style::for_variant(cfg.variant),
            analyzer: AnalyzerClient::from_config(cfg, http.clone()),
            deploy: DeployHook::new(cfg.deploy_hook_url.clone(), cfg.analyze_timeout, http),
            debug_probe_address: cfg.debug_probe_address.clone(),
            api_key_present: cfg.api_key_present(),
            admin_chat_ids: cfg.admin_chat_ids.clone(),
            bot_username: None,
        })
    }

    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    fn is_admin(&self, chat_id: i64) -> bool {
        self.admin_chat_ids.is_empty() || self.admin_chat_ids.contains(&chat_id)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Runs one inbound message to completion. Never fails; send errors are logged.
    pub async fn handle<S: ReplySink + ?Sized>(&self, chat_id: i64, text: Option<&str>, sink: &S) {
        let route = Route::classify(text, self.variant, self.bot_username.as_deref());
        debug!(chat_id, ?route, "router.dispatch");

        match route {
            Route::Start | Route::Help => {
                let reply = Reply::styled(format::help_text(self.variant), &self.style);
                self.reply(sink, reply).await;
            }
            Route::Status => self.status(chat_id, sink).await,
            Route::Redeploy => self.redeploy(chat_id, sink).await,
            Route::Text(text) => self.address(&text, sink).await,
            Route::Ignore => {}
        }
    }

    async fn reply<S: ReplySink + ?Sized>(&self, sink: &S, reply: Reply) {
        if let Err(e) = sink.send(reply).await {
            warn!(error = %e, "router.reply.failed");
        }
    }

    async fn status<S: ReplySink + ?Sized>(&self, chat_id: i64, sink: &S) {
        let online = self.analyzer.check_health().await;
        info!(chat_id, online, "router.status");

        // Diagnostics expose the analyzer URL, so non-admins get the short form.
        let diagnostics = self.variant == Variant::Ops && self.is_admin(chat_id);
        let text = match diagnostics {
            false if online => format::ANALYZER_ONLINE.to_string(),
            false => format::ANALYZER_OFFLINE.to_string(),
            true => {
                let debug = self.analyzer.debug_status(&self.debug_probe_address).await;
                format::ops_status_text(online, self.analyzer.base_url(), debug.as_ref(), self.api_key_present)
            }
        };
        self.reply(sink, Reply::plain(text)).await;
    }

    async fn redeploy<S: ReplySink + ?Sized>(&self, chat_id: i64, sink: &S) {
        if !self.is_admin(chat_id) {
            warn!(chat_id, "router.redeploy.denied");
            self.reply(sink, Reply::plain(format::NOT_AUTHORIZED)).await;
            return;
        }
        if !self.deploy.is_configured() {
            self.reply(sink, Reply::plain(format::REDEPLOY_UNCONFIGURED)).await;
            return;
        }
        let text = if self.deploy.trigger_redeploy().await {
            format::REDEPLOY_TRIGGERED
        } else {
            format::REDEPLOY_FAILED
        };
        self.reply(sink, Reply::plain(text)).await;
    }

    async fn address<S: ReplySink + ?Sized>(&self, text: &str, sink: &S) {
        let Some(address) = parse_address(text) else {
            self.reply(sink, Reply::styled(format::format_hint(&self.style), &self.style)).await;
            return;
        };

        self.reply(sink, Reply::plain(format::ANALYZING)).await;
        info!(%address, "router.analyze");

        match self.analyzer.analyze(&address).await {
            None => self.reply(sink, Reply::plain(format::ANALYZE_FAILED)).await,
            Some(result) => {
                let reply = Reply {
                    disable_preview: true,
                    ..Reply::styled(format::render_analysis(&result, &self.style), &self.style)
                };
                self.reply(sink, reply).await;
            }
        }
    }
}
