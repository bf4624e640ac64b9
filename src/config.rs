use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

use crate::google::DEFAULT_API_BASE;
use crate::parser::{
    DEFAULT_FOOTER_PREFIXES, DEFAULT_INDENT_UNIT, DEFAULT_TITLE, FooterRule, ParseOptions,
};
use crate::requests::{DEFAULT_INDENT_PT, DocsOptions};
use crate::style::{Rgb, Theme};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("parse.indent_unit must be at least 1")]
    InvalidIndentUnit,

    #[error("footer.rule is \"pattern\" but footer.pattern is empty")]
    MissingFooterPattern,

    #[error("invalid footer.pattern {pattern:?}: {source}")]
    InvalidFooterPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("style.{key} must be a #RRGGBB colour, got {value:?}")]
    InvalidColor { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub parse: ParseConfig,
    pub footer: FooterConfig,
    pub style: StyleConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParseConfig {
    pub indent_unit: usize,
    pub title_fallback: String,
    pub inline_markup: bool,
    pub rules_as_separators: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT_UNIT,
            title_fallback: DEFAULT_TITLE.to_string(),
            inline_markup: false,
            rules_as_separators: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FooterRuleKind {
    None,
    #[default]
    Prefixes,
    Pattern,
    LastParagraph,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FooterConfig {
    pub rule: FooterRuleKind,
    pub prefixes: Vec<String>,
    pub pattern: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            rule: FooterRuleKind::Prefixes,
            prefixes: DEFAULT_FOOTER_PREFIXES.iter().map(|s| s.to_string()).collect(),
            pattern: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub mention_color: String,
    pub footer_color: String,
    pub indent_pt: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            mention_color: "#0066CC".to_string(),
            footer_color: "#666666".to_string(),
            indent_pt: DEFAULT_INDENT_PT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub api_base: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// The defaults shipped in `default_config.toml`.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load a config file. Keys it leaves out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::compiled_default());
        }
        Self::load(path)
    }

    pub fn parse_options(&self) -> Result<ParseOptions, ConfigError> {
        if self.parse.indent_unit == 0 {
            return Err(ConfigError::InvalidIndentUnit);
        }
        Ok(ParseOptions {
            indent_unit: self.parse.indent_unit,
            title_fallback: self.parse.title_fallback.clone(),
            footer: self.footer_rule()?,
            inline_markup: self.parse.inline_markup,
            rules_as_separators: self.parse.rules_as_separators,
        })
    }

    fn footer_rule(&self) -> Result<FooterRule, ConfigError> {
        Ok(match self.footer.rule {
            FooterRuleKind::None => FooterRule::None,
            FooterRuleKind::Prefixes => FooterRule::Prefixes(self.footer.prefixes.clone()),
            FooterRuleKind::LastParagraph => FooterRule::LastParagraph,
            FooterRuleKind::Pattern => {
                let pattern = &self.footer.pattern;
                if pattern.is_empty() {
                    return Err(ConfigError::MissingFooterPattern);
                }
                let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidFooterPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                FooterRule::Pattern(re)
            }
        })
    }

    pub fn theme(&self) -> Result<Theme, ConfigError> {
        Ok(Theme {
            mention: color("mention_color", &self.style.mention_color)?,
            footer: color("footer_color", &self.style.footer_color)?,
        })
    }

    pub fn docs_options(&self) -> DocsOptions {
        DocsOptions {
            indent_pt: self.style.indent_pt,
        }
    }
}

fn color(key: &'static str, value: &str) -> Result<Rgb, ConfigError> {
    Rgb::from_hex(value).ok_or_else(|| ConfigError::InvalidColor {
        key,
        value: value.to_string(),
    })
}
