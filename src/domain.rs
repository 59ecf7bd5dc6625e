use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub chain: &'a str,
    pub address: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Anything other than a JSON `true` counts as unhealthy.
    #[serde(default)]
    pub ok: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugStatus {
    #[serde(default)]
    pub abi_status: Option<String>,
    #[serde(default)]
    pub key_present: Option<bool>,
}

/// Analyzer verdict for one token. Every field may be missing or null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Number or string, displayed verbatim.
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub band: Option<Value>,
    #[serde(default)]
    pub token: Option<TokenInfo>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default)]
    pub supply: Option<Supply>,
    #[serde(default)]
    pub factors: Option<Vec<Factor>>,
}

/// Display-only fields stay as raw JSON so a stray number or string can't sink the whole verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub symbol: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub dex: Option<Value>,
    #[serde(default)]
    pub pair: Option<Value>,
    /// Rendered verbatim; some analyzer builds send it as a string.
    #[serde(default)]
    pub lp_locked_pct: Option<Value>,
    #[serde(default)]
    pub locker: Option<Value>,

    /// Fields we don't render, kept so "non-empty" matches what the analyzer sent.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Liquidity {
    pub fn is_empty(&self) -> bool {
        self.dex.is_none()
            && self.pair.is_none()
            && self.lp_locked_pct.is_none()
            && self.locker.is_none()
            && self.rest.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Supply {
    /// Raw token units, often a decimal string too large for f64.
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub dead_wallet_pct: Option<f64>,
    #[serde(default)]
    pub top10_pct: Option<f64>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Supply {
    pub fn is_empty(&self) -> bool {
        self.total.is_none() && self.dead_wallet_pct.is_none() && self.top10_pct.is_none() && self.rest.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Factor {
    #[serde(default)]
    pub id: Option<Value>,
    /// Signed contribution to the score.
    #[serde(default)]
    pub impact: Option<f64>,
    #[serde(default)]
    pub evidence: Option<Vec<String>>,
}

impl AnalysisResult {
    pub fn factors(&self) -> &[Factor] {
        self.factors.as_deref().unwrap_or_default()
    }
}
