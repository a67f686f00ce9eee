//! Local user preferences (language and theme), stored as key-value pairs.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};
use std::fmt;
use std::str::FromStr;

use crate::db::Database;

const LANGUAGE_KEY: &str = "language";
const THEME_KEY: &str = "theme";
const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
  Light,
  Dark,
  #[default]
  System,
}

impl fmt::Display for Theme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Theme::Light => "light",
      Theme::Dark => "dark",
      Theme::System => "system",
    })
  }
}

impl FromStr for Theme {
  type Err = color_eyre::Report;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "light" => Ok(Theme::Light),
      "dark" => Ok(Theme::Dark),
      "system" => Ok(Theme::System),
      other => Err(eyre!("Unknown theme '{}' (expected light, dark or system)", other)),
    }
  }
}

pub struct Preferences {
  db: Database,
}

impl Preferences {
  pub fn new(db: Database) -> Self {
    Self { db }
  }

  pub fn get(&self, key: &str) -> Result<Option<String>> {
    self
      .db
      .conn()?
      .query_row(
        "SELECT value FROM preferences WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read preference {}: {}", key, e))
  }

  pub fn set(&self, key: &str, value: &str) -> Result<()> {
    self
      .db
      .conn()?
      .execute(
        "INSERT OR REPLACE INTO preferences (key, value, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to save preference {}: {}", key, e))?;
    Ok(())
  }

  /// Language tag, "en" when never set.
  pub fn language(&self) -> Result<String> {
    Ok(
      self
        .get(LANGUAGE_KEY)?
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
    )
  }

  pub fn set_language(&self, language: &str) -> Result<()> {
    let language = language.trim();
    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
      return Err(eyre!("Invalid language tag '{}'", language));
    }
    self.set(LANGUAGE_KEY, &language.to_lowercase())
  }

  /// Stored theme; unreadable values fall back to the default.
  pub fn theme(&self) -> Result<Theme> {
    Ok(
      self
        .get(THEME_KEY)?
        .and_then(|t| t.parse().ok())
        .unwrap_or_default(),
    )
  }

  pub fn set_theme(&self, theme: Theme) -> Result<()> {
    self.set(THEME_KEY, &theme.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let prefs = Preferences::new(Database::open_in_memory().unwrap());
    assert_eq!(prefs.language().unwrap(), "en");
    assert_eq!(prefs.theme().unwrap(), Theme::System);
  }

  #[test]
  fn test_set_and_read_back() {
    let prefs = Preferences::new(Database::open_in_memory().unwrap());
    prefs.set_language("FR").unwrap();
    prefs.set_theme(Theme::Dark).unwrap();

    assert_eq!(prefs.language().unwrap(), "fr");
    assert_eq!(prefs.theme().unwrap(), Theme::Dark);
  }

  #[test]
  fn test_rejects_bad_values() {
    let prefs = Preferences::new(Database::open_in_memory().unwrap());
    assert!(prefs.set_language("en us").is_err());
    assert!("purple".parse::<Theme>().is_err());
  }

  #[test]
  fn test_garbage_theme_falls_back() {
    let prefs = Preferences::new(Database::open_in_memory().unwrap());
    prefs.set(THEME_KEY, "neon").unwrap();
    assert_eq!(prefs.theme().unwrap(), Theme::System);
  }
}
