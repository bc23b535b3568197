use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::db::{Database, KEY_THEME};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(anyhow::anyhow!("unknown theme '{other}'")),
        }
    }
}

impl Database {
    /// Anything other than a stored "dark" reads as light.
    pub async fn get_theme(&self) -> Result<Theme> {
        let stored = self.get_value(KEY_THEME).await?;
        Ok(match stored.as_deref() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        })
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set_value(KEY_THEME, theme.as_str().to_string()).await
    }
}
