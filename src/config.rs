use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::vendor::Vendor;
use crate::{Error, Result};

/// Portal languages accepted at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Language {
    #[default]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "EN",
        }
    }

    /// Numeric id the vendor API expects.
    pub fn id(&self) -> u8 {
        match self {
            Language::English => 0,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|l| l.code() == code)
    }

    pub fn all() -> &'static [Language] {
        &[Language::English]
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(code: String) -> std::result::Result<Self, String> {
        Language::from_code(&code).ok_or_else(|| {
            let valid: Vec<_> = Language::all().iter().map(|l| l.code()).collect();
            format!("unknown language: {code} (valid: {valid:?})")
        })
    }
}

/// One configured account, as entered at setup.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    pub vendor: Vendor,
    pub username: String,
    pub password: String,
    pub language: Language,
    #[serde(default)]
    pub disable_sensors: bool,
}

impl EntryConfig {
    pub fn new(vendor: Vendor, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            vendor,
            username: username.into(),
            password: password.into(),
            language: Language::default(),
            disable_sensors: false,
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn disable_sensors(mut self, disable: bool) -> Self {
        self.disable_sensors = disable;
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EntryConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Config("username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::Config("password is required".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for EntryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryConfig")
            .field("vendor", &self.vendor)
            .field("username", &self.username)
            .field("password", &"***")
            .field("language", &self.language)
            .field("disable_sensors", &self.disable_sensors)
            .finish()
    }
}
