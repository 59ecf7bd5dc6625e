use anyhow::{anyhow, Result};
use std::fmt;
use std::time::Duration;

use crate::address::parse_address;

/// Wrapped BNB, a contract the analyzer always has an ABI for.
const DEFAULT_PROBE_ADDRESS: &str = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// /start, /help, /status. Markdown replies.
    Classic,
    /// Adds /redeploy and analyzer diagnostics. Plain-text replies.
    Ops,
}

impl std::str::FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "classic" => Ok(Variant::Classic),
            "ops" => Ok(Variant::Ops),
            other => Err(anyhow!("unknown BOT_VARIANT: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub variant: Variant,

    // Analyzer
    pub mca_url: String,
    pub mca_api_key: Option<String>,
    pub chain: String,
    pub health_timeout: Duration,
    pub analyze_timeout: Duration,
    pub debug_probe_address: String,

    // Deploy
    pub deploy_hook_url: Option<String>,

    /// Chats allowed to /redeploy and see ops diagnostics. Empty means everyone.
    pub admin_chat_ids: Vec<i64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("variant", &self.variant)
            .field("mca_url", &self.mca_url)
            .field("mca_api_key", &self.mca_api_key.as_ref().map(|_| "<redacted>"))
            .field("chain", &self.chain)
            .field("health_timeout", &self.health_timeout)
            .field("analyze_timeout", &self.analyze_timeout)
            .field("debug_probe_address", &self.debug_probe_address)
            .field("deploy_hook_url", &self.deploy_hook_url)
            .field("admin_chat_ids", &self.admin_chat_ids)
            .finish()
    }
}

fn env_opt(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    env_opt(lookup, key).and_then(|x| x.parse().ok())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = env_opt(&lookup, "TELEGRAM_BOT_TOKEN")
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN missing"))?;
        let variant = env_opt(&lookup, "BOT_VARIANT")
            .map(|v| v.parse::<Variant>())
            .transpose()?
            .unwrap_or(Variant::Classic);

        let mca_url = env_opt(&lookup, "MCA_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_default();
        let mca_api_key = env_opt(&lookup, "MCA_API_KEY");
        let chain = env_opt(&lookup, "MCA_CHAIN").unwrap_or_else(|| "bsc".to_string());

        let health_timeout = Duration::from_secs(env_parse::<u64>(&lookup, "MCA_HEALTH_TIMEOUT_SECS").unwrap_or(10));
        let analyze_timeout = Duration::from_secs(env_parse::<u64>(&lookup, "MCA_ANALYZE_TIMEOUT_SECS").unwrap_or(30));
        if health_timeout.is_zero() || analyze_timeout.is_zero() {
            return Err(anyhow!("analyzer timeouts must be greater than zero"));
        }

        let probe = env_opt(&lookup, "MCA_DEBUG_PROBE_ADDRESS").unwrap_or_else(|| DEFAULT_PROBE_ADDRESS.to_string());
        let debug_probe_address =
            parse_address(&probe).ok_or_else(|| anyhow!("MCA_DEBUG_PROBE_ADDRESS is not a valid address: {probe}"))?;

        let deploy_hook_url = env_opt(&lookup, "DEPLOY_HOOK_URL");

        let admin_chat_ids = env_opt(&lookup, "ADMIN_CHAT_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<i64>().map_err(|_| anyhow!("invalid chat id in ADMIN_CHAT_IDS: {s}")))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            telegram_bot_token,
            variant,
            mca_url,
            mca_api_key,
            chain,
            health_timeout,
            analyze_timeout,
            debug_probe_address,
            deploy_hook_url,
            admin_chat_ids,
        })
    }

    pub fn api_key_present(&self) -> bool {
        self.mca_api_key.is_some()
    }
}
