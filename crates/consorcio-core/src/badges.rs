//! Category badge styles
//!
//! Maps a free-text provider category label to one of a fixed set of
//! display styles by case-insensitive substring match. Keywords are
//! checked in a fixed priority order; anything unmatched falls back to
//! [`BadgeStyle::Other`].

use serde::{Deserialize, Serialize};

/// Display style for a provider-category badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
    Water,
    BankingFee,
    Security,
    Emergency,
    Sanitary,
    Administration,
    Cleaning,
    Electrician,
    Electricity,
    Other,
}

impl BadgeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::BankingFee => "banking_fee",
            Self::Security => "security",
            Self::Emergency => "emergency",
            Self::Sanitary => "sanitary",
            Self::Administration => "administration",
            Self::Cleaning => "cleaning",
            Self::Electrician => "electrician",
            Self::Electricity => "electricity",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for BadgeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyword stems checked in priority order. Stems are accent-free so
/// that "Comisión" and "Comision" both match, and "electricista" is
/// checked before the broader "electric".
const KEYWORD_STYLES: &[(&str, BadgeStyle)] = &[
    ("agua", BadgeStyle::Water),
    ("comisi", BadgeStyle::BankingFee),
    ("banc", BadgeStyle::BankingFee),
    ("seguridad", BadgeStyle::Security),
    ("vigilancia", BadgeStyle::Security),
    ("emergencia", BadgeStyle::Emergency),
    ("sanitar", BadgeStyle::Sanitary),
    ("administra", BadgeStyle::Administration),
    ("limpieza", BadgeStyle::Cleaning),
    ("electricista", BadgeStyle::Electrician),
    ("electric", BadgeStyle::Electricity),
    ("luz", BadgeStyle::Electricity),
];

/// Pick the badge style for a category label.
pub fn badge_for_category(label: Option<&str>) -> BadgeStyle {
    let Some(label) = label else {
        return BadgeStyle::Other;
    };
    let normalized = label.to_lowercase();
    if normalized.trim().is_empty() {
        return BadgeStyle::Other;
    }
    for (keyword, style) in KEYWORD_STYLES {
        if normalized.contains(keyword) {
            return *style;
        }
    }
    BadgeStyle::Other
}
