use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// How negative amounts are shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativeDisplay {
    #[default]
    Sign,
    Parentheses,
}

impl NegativeDisplay {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sign" | "minus" | "-" => Some(NegativeDisplay::Sign),
            "parentheses" | "parens" | "()" => Some(NegativeDisplay::Parentheses),
            _ => None,
        }
    }
}

impl fmt::Display for NegativeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NegativeDisplay::Sign => "sign",
            NegativeDisplay::Parentheses => "parentheses",
        })
    }
}

/// User preferences for the shell and number presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub negative_style: NegativeDisplay,
    #[serde(default)]
    pub show_currency_symbol: bool,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub plain_output: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_book: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for books. Defaults to `~/Documents/Bookkeep`.
    pub default_book_root: Option<PathBuf>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            negative_style: NegativeDisplay::default(),
            show_currency_symbol: false,
            ui_color_enabled: Self::default_ui_color_enabled(),
            plain_output: false,
            last_opened_book: None,
            default_book_root: None,
            backup_retention: Self::default_backup_retention(),
        }
    }
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_default_book_root(&self) -> PathBuf {
        if let Some(path) = &self.default_book_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Bookkeep")
    }

    /// Grouping and decimal separators for the locale's language, e.g.
    /// `fr-FR` writes `1 234,50` and `de-DE` writes `1.234,50`.
    pub fn number_separators(&self) -> (char, char) {
        let language = self
            .locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "fr" | "sv" | "nb" | "fi" | "pl" | "cs" | "ru" => (' ', ','),
            "de" | "es" | "it" | "pt" | "nl" | "da" | "tr" | "id" => ('.', ','),
            _ => (',', '.'),
        }
    }

    /// Symbol to print before amounts, when enabled and known.
    pub fn currency_symbol(&self) -> Option<&'static str> {
        if !self.show_currency_symbol {
            return None;
        }
        match self.currency.to_ascii_uppercase().as_str() {
            "USD" | "CAD" | "AUD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            _ => None,
        }
    }
}
