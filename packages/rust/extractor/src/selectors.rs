//! Compiled form of the `[details.selectors]` table.

use coursecrawl_shared::{CourseCrawlError, Result, SelectorConfig};
use scraper::Selector;

/// Site-specific selectors, parsed once per run.
#[derive(Debug, Clone)]
pub struct SelectorTable {
    /// Description sections in concatenation order.
    pub(crate) sections: Vec<Selector>,
    pub(crate) language_item: Selector,
    pub(crate) language_label: Selector,
    pub(crate) language_label_text: String,
    pub(crate) language_value: Selector,
}

impl SelectorTable {
    /// Parse every selector in `config`; a bad selector is a config error.
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            sections: config
                .sections
                .iter()
                .map(|s| parse(s))
                .collect::<Result<_>>()?,
            language_item: parse(&config.language_item)?,
            language_label: parse(&config.language_label)?,
            language_label_text: config.language_label_text.clone(),
            language_value: parse(&config.language_value)?,
        })
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::compile(&SelectorConfig::default()).expect("built-in selectors are valid")
    }
}

fn parse(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| CourseCrawlError::config(format!("invalid selector '{selector}': {e}")))
}
