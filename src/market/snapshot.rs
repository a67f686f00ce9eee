use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::types::{AdPackage, Category, ContactMessage, Permission, Report, SubscriptionPlan};

/// Data fetched ahead of time (e.g. during server rendering), used to seed
/// stores without a client-side request. Absent lists leave their store alone.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
  #[serde(default)]
  pub categories: Option<Vec<Category>>,
  #[serde(default)]
  pub ad_packages: Option<Vec<AdPackage>>,
  #[serde(default)]
  pub subscription_plans: Option<Vec<SubscriptionPlan>>,
  #[serde(default)]
  pub reports: Option<Vec<Report>>,
  #[serde(default)]
  pub contact_messages: Option<Vec<ContactMessage>>,
  #[serde(default)]
  pub permissions: Option<Vec<Permission>>,
}

impl MarketSnapshot {
  pub fn from_json(contents: &str) -> Result<Self> {
    serde_json::from_str(contents).map_err(|e| eyre!("Failed to parse snapshot: {}", e))
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read snapshot {}: {}", path.display(), e))?;
    Self::from_json(&contents)
  }
}
