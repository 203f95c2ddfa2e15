//! Cache Staleness
//!
//! Cached scanner output gets a warning whose tone depends on the timeframe:
//! a few minutes of lag matters for a 15m scalp and barely at all for a 4h
//! swing.

use crate::model::Timeframe;

/// Cache age as reported by the backend
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheAge {
    pub seconds: Option<f64>,
    pub human: Option<String>,
}

impl CacheAge {
    pub fn new(seconds: Option<f64>, human: Option<&str>) -> Self {
        Self {
            seconds,
            human: human.map(str::trim).filter(|h| !h.is_empty()).map(String::from),
        }
    }

    /// Display form: backend text, else formatted seconds, else `0s`
    pub fn label(&self) -> String {
        if let Some(human) = &self.human {
            return human.clone();
        }
        self.seconds.map_or_else(|| "0s".to_string(), format_age)
    }

    /// Non-zero age, or a backend-supplied label with no seconds
    pub fn is_stale(&self) -> bool {
        match self.seconds {
            Some(secs) => secs > 0.0,
            None => self.human.is_some(),
        }
    }
}

/// Format seconds as `Ns`, `Nm`, or `NhMm`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_age(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    match total {
        0..60 => format!("{total}s"),
        60..3600 => format!("{}m", total / 60),
        _ => format!("{}h{}m", total / 3600, (total % 3600) / 60),
    }
}

/// Warning for stale cached output, `None` when fresh
pub fn staleness_warning(timeframe: Timeframe, cached: bool, age: &CacheAge) -> Option<String> {
    if !cached || !age.is_stale() {
        return None;
    }

    let label = age.label();
    let text = match timeframe {
        Timeframe::M15 => format!(
            "⚠️ STALE DATA: this 15m scan is {label} old. Scalping entries move fast; \
             re-check the live price before acting on any signal."
        ),
        Timeframe::M30 => format!(
            "⚠️ Cached data ({label} old). Intraday levels may have shifted; \
             confirm the current price before entering."
        ),
        Timeframe::H1 => format!(
            "ℹ️ Cached data ({label} old). Levels are usually still valid on 1h, \
             but verify the current price."
        ),
        Timeframe::H4 => format!("ℹ️ Cached data ({label} old); minor for the 4h trend view."),
    };
    Some(text)
}
