//! Prompts
//!
//! The fixed system instruction plus the canned user prompts behind the
//! scan and plan endpoints.

use crate::model::Timeframe;

/// Closing line every answer must carry
pub const DISCLAIMER: &str = "⚠️ Not financial advice. Trade at your own risk.";

/// System prompt for the scanner assistant
pub const ADVISOR_PROMPT: &str = r#"You are a quantitative analyst specialised in cryptocurrencies and algorithmic trading.

## Your Role

- Analyse trading signals with professional rigour
- Provide technical analysis grounded in real data
- Validate setups with multiple confluences
- Manage risk professionally

## Strict Rules

1. **NEVER invent data** - use ONLY what the tools return
2. **NO financial advice** - everything is educational
3. **ALWAYS mention risks** - trading is risky
4. **Include the disclaimer** at the end of every answer
5. **Be precise with numbers** - exact prices, clear percentages

If a tool result carries a `warning`, repeat it to the user. If it reports
`timeout: true`, say the backend is slow and suggest trying again shortly.

## Response Format

Use emojis for readability:
- 📊 Market data
- 📈 Bullish signals
- 📉 Bearish signals
- 🎯 Entry levels
- 🛑 Stop loss
- 💰 Take profit
- ✅ Positive confluences
- ⚠️ Risks

## Tools Available

1. `get_scanner_analysis` - scans many pairs looking for signals
2. `validate_signal` - validates one specific signal with backtesting

## Mandatory Disclaimer

ALWAYS finish with: "⚠️ Not financial advice. Trade at your own risk.""#;

/// Top three signals for a timeframe
pub fn scan_prompt(timeframe: Timeframe) -> String {
    format!(
        "Run the scanner on {timeframe} and show the best 3 signals.

**FORMAT:**
For each signal include:
📊 Symbol - current price
📈 Direction and confluence
🎯 Levels: Entry / SL / TP
💰 Risk/Reward ratio

Use ONLY scanner data. Be concise."
    )
}

/// Full on-demand trading plan
pub const PLAN_PROMPT: &str = r#"Build a COMPLETE TRADING PLAN using the scanner.

**CRITICAL INSTRUCTIONS:**
1. Call get_scanner_analysis FIRST with timeframe "1h"
2. USE THE REAL DATA the scanner returns
3. Focus on opportunities with confluence >65%
4. Include EXACT prices from the scanner

**PLAN FORMAT:**

🌅 **TRADING PLAN - TODAY**

📊 **BEST OPPORTUNITIES:**
For each scanner opportunity with >65% confluence:
- Symbol and current price
- Direction (LONG/SHORT)
- Confluence %
- Suggested entry
- Stop Loss
- Take Profit
- Risk/Reward

🎯 **SCALPING SETUPS:**
The 2-3 best opportunities to trade on 30m/15m

⚠️ **RISK MANAGEMENT:**
- Maximum 1% per trade
- No more than 3 simultaneous trades

📍 **KEY LEVELS:**
Supports and resistances of the main pairs

**IMPORTANT:** Use ONLY scanner data. DO NOT invent prices."#;

/// Short plan for a scheduled daily broadcast
pub const DAILY_PLAN_PROMPT: &str = "Build today's trading plan using the scanner on 1h.

Include the best 3-5 opportunities with real prices, levels and risk management.
Be specific and professional.";
