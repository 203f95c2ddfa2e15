//! Symbol Normalisation
//!
//! The validator expects slash-form pairs (`BTC/USDT`); users and the model
//! tend to write the compact exchange form (`BTCUSDT`).

const QUOTE: &str = "USDT";

/// Known compact pairs and their slash form
const PAIRS: &[(&str, &str)] = &[
    ("BTCUSDT", "BTC/USDT"),
    ("ETHUSDT", "ETH/USDT"),
    ("XRPUSDT", "XRP/USDT"),
    ("ADAUSDT", "ADA/USDT"),
    ("SOLUSDT", "SOL/USDT"),
    ("DOGEUSDT", "DOGE/USDT"),
    ("DOTUSDT", "DOT/USDT"),
    ("LTCUSDT", "LTC/USDT"),
    ("LINKUSDT", "LINK/USDT"),
    ("TRXUSDT", "TRX/USDT"),
    ("ATOMUSDT", "ATOM/USDT"),
    ("UNIUSDT", "UNI/USDT"),
    ("BNBUSDT", "BNB/USDT"),
    ("AVAXUSDT", "AVAX/USDT"),
    ("XLMUSDT", "XLM/USDT"),
    ("HBARUSDT", "HBAR/USDT"),
    ("ARBUSDT", "ARB/USDT"),
    ("XDCUSDT", "XDC/USDT"),
];

/// Convert `BTCUSDT` into `BTC/USDT`
///
/// Slashed input is returned as-is. Unknown `<base>USDT` pairs fall back to
/// `<base>/USDT`; anything else passes through unchanged.
pub fn normalize_symbol(symbol: &str) -> String {
    if symbol.contains('/') {
        return symbol.to_string();
    }

    if let Some((_, slashed)) = PAIRS.iter().find(|(compact, _)| *compact == symbol) {
        return (*slashed).to_string();
    }

    match symbol.strip_suffix(QUOTE) {
        Some(base) if !base.is_empty() => format!("{base}/{QUOTE}"),
        _ => symbol.to_string(),
    }
}
