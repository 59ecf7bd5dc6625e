use serde_json::Value;

use crate::config::Variant;
use crate::domain::{AnalysisResult, DebugStatus, Factor};

const MAX_FACTORS: usize = 5;

/// How replies are rendered for a given bot variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub markdown: bool,
    /// Placeholder for missing identifiers (name, symbol, score, ...).
    missing: &'static str,
    /// Placeholder for missing descriptive fields (pair, locker, total).
    blank: &'static str,
}

impl Style {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self { markdown: true, missing: "?", blank: "—" },
            Variant::Ops => Self { markdown: false, missing: "n/a", blank: "n/a" },
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.markdown {
            format!("*{}*", text.replace('*', ""))
        } else {
            text.to_string()
        }
    }

    fn code(&self, text: &str) -> String {
        if self.markdown {
            format!("`{}`", text.replace('`', ""))
        } else {
            text.to_string()
        }
    }

    fn text(&self, text: &str) -> String {
        if self.markdown {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Escapes the legacy Telegram Markdown control characters.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn nice_pct(v: Option<f64>) -> String {
    match v {
        None => "—".to_string(),
        Some(v) => format!("{v:.2}%"),
    }
}

fn value_text(v: Option<&Value>, placeholder: &str) -> String {
    match v {
        None | Some(Value::Null) => placeholder.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn impact_glyph(impact: Option<f64>) -> &'static str {
    match impact {
        Some(i) if i > 0.0 => "🟢",
        Some(i) if i < 0.0 => "🔴",
        _ => "⚪",
    }
}

fn factor_line(f: &Factor, style: &Style) -> String {
    let id = value_text(f.id.as_ref(), style.missing);
    let evidence = f
        .evidence
        .as_deref()
        .and_then(|ev| ev.first())
        .map(String::as_str)
        .unwrap_or("");
    format!("{} {} — {}", impact_glyph(f.impact), style.text(&id), style.text(evidence))
}

pub fn render_analysis(r: &AnalysisResult, style: &Style) -> String {
    let token = r.token.clone().unwrap_or_default();
    let name = value_text(token.name.as_ref(), style.missing);
    let symbol = value_text(token.symbol.as_ref(), style.missing);
    let address = value_text(token.address.as_ref(), style.missing);

    let mut lines = vec![
        format!("{}  {}", style.bold(&format!("{name} ({symbol})")), style.code(&address)),
        String::new(),
        format!(
            "{}  •  {}",
            style.bold(&format!("Score: {}", value_text(r.score.as_ref(), style.missing))),
            style.bold(&format!("Band: {}", value_text(r.band.as_ref(), style.missing))),
        ),
        String::new(),
        style.bold("Key factors:"),
    ];
    lines.extend(r.factors().iter().take(MAX_FACTORS).map(|f| factor_line(f, style)));

    if let Some(liq) = r.liquidity.as_ref().filter(|l| !l.is_empty()) {
        lines.extend([
            String::new(),
            style.bold("Liquidity:"),
            format!("DEX: {}", style.text(&value_text(liq.dex.as_ref(), style.missing))),
            format!("Pair: {}", style.code(&value_text(liq.pair.as_ref(), style.blank))),
            format!(
                "LP locked: {}% via {}",
                style.text(&value_text(liq.lp_locked_pct.as_ref(), "0")),
                style.text(&value_text(liq.locker.as_ref(), style.blank))
            ),
        ]);
    }

    if let Some(supply) = r.supply.as_ref().filter(|s| !s.is_empty()) {
        lines.extend([
            String::new(),
            style.bold("Supply:"),
            format!("Total: {}", style.text(&value_text(supply.total.as_ref(), style.blank))),
            format!("Dead wallet: {}", nice_pct(supply.dead_wallet_pct)),
            format!("Top10: {}", nice_pct(supply.top10_pct)),
        ]);
    }

    lines.join("\n")
}

pub fn help_text(variant: Variant) -> String {
    match variant {
        Variant::Classic => "👋 *Meme Coin Analyser*\n\n\
            • Send me a BSC token contract address (starts with `0x`)\n\
            • I’ll reply with a summary score.\n\n\
            Commands:\n\
            • /status — Check connection to the analyser\n\
            • /help — Show this help"
            .to_string(),
        Variant::Ops => "👋 Meme Coin Analyser (ops)\n\n\
            • Send me a BSC token contract address (0x + 40 hex chars)\n\
            • I’ll reply with a summary score.\n\n\
            Commands:\n\
            • /status — Analyzer health and BscScan diagnostics\n\
            • /redeploy — Trigger a redeploy of the analyzer\n\
            • /help — Show this help"
            .to_string(),
    }
}

pub fn format_hint(style: &Style) -> String {
    if style.markdown {
        "Please send a *BSC token address* (format: `0x...40 hex chars`).".to_string()
    } else {
        "Please send a BSC token address (format: 0x followed by 40 hex chars).".to_string()
    }
}

pub const ANALYZING: &str = "⏳ Analyzing…";
pub const ANALYZE_FAILED: &str = "❌ Sorry, couldn’t analyze. Check logs or try again.";
pub const ANALYZER_ONLINE: &str = "✅ Analyzer online";
pub const ANALYZER_OFFLINE: &str = "❌ Analyzer not reachable. Check MCA_URL.";
pub const REDEPLOY_UNCONFIGURED: &str = "⚠️ Redeploy is not configured. Set DEPLOY_HOOK_URL.";
pub const REDEPLOY_TRIGGERED: &str = "🚀 Redeploy triggered";
pub const REDEPLOY_FAILED: &str = "❌ Redeploy failed. Check the deploy hook.";
pub const NOT_AUTHORIZED: &str = "⛔ This command is restricted to admin chats.";

/// Multi-line diagnostic for the ops `/status` command.
pub fn ops_status_text(online: bool, base_url: &str, debug: Option<&DebugStatus>, api_key_present: bool) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let abi = debug.and_then(|d| d.abi_status.as_deref()).unwrap_or("n/a");
    let key = debug
        .and_then(|d| d.key_present)
        .map(yes_no)
        .unwrap_or("n/a");
    let url = if base_url.is_empty() { "n/a" } else { base_url };

    [
        if online { ANALYZER_ONLINE } else { ANALYZER_OFFLINE }.to_string(),
        format!("URL: {url}"),
        format!("BscScan ABI: {abi}"),
        format!("BscScan key on analyzer: {key}"),
        format!("MCA_API_KEY set: {}", yes_no(api_key_present)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> AnalysisResult {
        serde_json::from_value(v).unwrap()
    }

    fn classic() -> Style {
        Style::for_variant(Variant::Classic)
    }

    fn ops() -> Style {
        Style::for_variant(Variant::Ops)
    }

    #[test]
    fn nice_pct_formats() {
        assert_eq!(nice_pct(None), "—");
        assert_eq!(nice_pct(Some(12.3)), "12.30%");
        assert_eq!(nice_pct(Some(0.0)), "0.00%");
    }

    #[test]
    fn header_and_empty_blocks() {
        let r = parse(json!({
            "score": 87, "band": "A",
            "token": {"name": "Foo", "symbol": "FOO", "address": "0xabc"},
            "liquidity": {}, "supply": {}, "factors": []
        }));
        for style in [classic(), ops()] {
            let out = render_analysis(&r, &style);
            assert!(out.contains("Foo (FOO)"), "{out}");
            assert!(out.contains("0xabc"));
            assert!(out.contains("Score: 87"));
            assert!(out.contains("Band: A"));
            assert!(!out.contains("Liquidity:"));
            assert!(!out.contains("Supply:"));
        }
    }

    #[test]
    fn lists_only_first_five_factors() {
        let factors: Vec<Value> = (1..=7)
            .map(|i| json!({"id": format!("f{i}"), "impact": i, "evidence": [format!("ev{i}")]}))
            .collect();
        let r = parse(json!({"factors": factors}));
        let out = render_analysis(&r, &ops());
        for i in 1..=5 {
            assert!(out.contains(&format!("f{i} — ev{i}")), "{out}");
        }
        assert!(!out.contains("f6"));
        assert!(!out.contains("f7"));
        assert_eq!(out.matches("🟢").count(), 5);
    }

    #[test]
    fn glyph_follows_impact_sign() {
        let r = parse(json!({"factors": [
            {"id": "up", "impact": 3.5, "evidence": ["a", "b"]},
            {"id": "down", "impact": -2},
            {"id": "flat", "impact": 0},
            {"id": "unknown"}
        ]}));
        let out = render_analysis(&r, &ops());
        assert!(out.lines().any(|l| l == "🟢 up — a"), "{out}");
        assert!(out.contains("🔴 down — "));
        assert!(out.contains("⚪ flat — "));
        assert!(out.contains("⚪ unknown — "));
    }

    #[test]
    fn liquidity_and_supply_blocks() {
        let r = parse(json!({
            "liquidity": {"dex": "PancakeSwap", "pair": "0xpair", "lp_locked_pct": 95.5, "locker": "PinkLock"},
            "supply": {"total": "1000000", "dead_wallet_pct": 50, "top10_pct": null}
        }));
        let out = render_analysis(&r, &classic());
        assert!(out.contains("*Liquidity:*"));
        assert!(out.contains("DEX: PancakeSwap"));
        assert!(out.contains("Pair: `0xpair`"));
        assert!(out.contains("LP locked: 95.5% via PinkLock"));
        assert!(out.contains("Total: 1000000"));
        assert!(out.contains("Dead wallet: 50.00%"));
        assert!(out.contains("Top10: —"));
    }

    #[test]
    fn missing_fields_use_variant_placeholders() {
        let r = parse(json!({"liquidity": {"dex": null, "extra": 1}, "supply": {"top10_pct": 9.999}}));

        let out = render_analysis(&r, &classic());
        assert!(out.contains("? (?)"));
        assert!(out.contains("Score: ?"));
        assert!(out.contains("DEX: ?"));
        assert!(out.contains("Pair: `—`"));
        assert!(out.contains("LP locked: 0% via —"));
        assert!(out.contains("Total: —"));
        assert!(out.contains("Top10: 10.00%"));

        let out = render_analysis(&r, &ops());
        assert!(out.contains("n/a (n/a)"));
        assert!(out.contains("Band: n/a"));
        assert!(out.contains("LP locked: 0% via n/a"));
        assert!(!out.contains('*'));
        assert!(!out.contains('`'));
    }

    #[test]
    fn renders_display_fields_of_any_type() {
        let r = parse(json!({
            "token": {"name": "Foo", "symbol": 7, "address": null},
            "liquidity": {"dex": "PancakeSwap", "lp_locked_pct": "100", "locker": "PinkLock"},
            "factors": [{"id": 7, "impact": 2, "evidence": ["locked"]}]
        }));
        let out = render_analysis(&r, &ops());
        assert!(out.contains("Foo (7)"), "{out}");
        assert!(out.contains("LP locked: 100% via PinkLock"));
        assert!(out.lines().any(|l| l == "🟢 7 — locked"));

        let r = parse(json!({"liquidity": {"lp_locked_pct": 100.0}}));
        assert!(render_analysis(&r, &ops()).contains("LP locked: 100.0% via n/a"));
    }

    #[test]
    fn markdown_escapes_supply_total() {
        let r = parse(json!({"supply": {"total": "1_000*000"}}));
        let out = render_analysis(&r, &classic());
        assert!(out.contains(r"Total: 1\_000\*000"), "{out}");
    }

    #[test]
    fn markdown_escapes_user_text() {
        let r = parse(json!({
            "token": {"name": "*Evil*", "symbol": "E_V", "address": "0x`1"},
            "factors": [{"id": "lp_locked", "impact": 1, "evidence": ["see [link]"]}]
        }));
        let out = render_analysis(&r, &classic());
        assert!(out.contains("*Evil (E_V)*"));
        assert!(out.contains("`0x1`"));
        assert!(out.contains(r"lp\_locked — see \[link]"));
    }

    #[test]
    fn ops_status_reports_diagnostics() {
        let debug = DebugStatus { abi_status: Some("OK".into()), key_present: Some(false) };
        let out = ops_status_text(true, "https://mca", Some(&debug), true);
        assert!(out.starts_with(ANALYZER_ONLINE));
        assert!(out.contains("BscScan ABI: OK"));
        assert!(out.contains("BscScan key on analyzer: no"));
        assert!(out.contains("MCA_API_KEY set: yes"));

        let out = ops_status_text(false, "", None, false);
        assert!(out.starts_with(ANALYZER_OFFLINE));
        assert!(out.contains("URL: n/a"));
        assert!(out.contains("BscScan ABI: n/a"));
    }
}
