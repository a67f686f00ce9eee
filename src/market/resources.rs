//! Store wiring for marketplace types: query, response field, TTL, order.

use std::cmp::Ordering;
use std::time::Duration;

use crate::store::Resource;

use super::queries;
use super::types::{AdPackage, Category, ContactMessage, Permission, Report, SubscriptionPlan};

const FIVE_MINUTES: Duration = Duration::from_secs(300);
const ONE_MINUTE: Duration = Duration::from_secs(60);

impl Resource for Category {
  const KIND: &'static str = "categories";
  const LIST_QUERY: &'static str = queries::CATEGORIES;
  const LIST_FIELD: &'static str = "categories";
  const DEFAULT_TTL: Duration = FIVE_MINUTES;

  fn id(&self) -> &str {
    &self.id
  }

  fn compare(&self, other: &Self) -> Ordering {
    self
      .priority
      .cmp(&other.priority)
      .then_with(|| self.name.cmp(&other.name))
  }
}

impl Resource for AdPackage {
  const KIND: &'static str = "ad_packages";
  const LIST_QUERY: &'static str = queries::AD_PACKAGES;
  const LIST_FIELD: &'static str = "adPackages";
  const DEFAULT_TTL: Duration = FIVE_MINUTES;

  fn id(&self) -> &str {
    &self.id
  }

  // Most expensive (most exposure) first
  fn compare(&self, other: &Self) -> Ordering {
    other.price.total_cmp(&self.price)
  }
}

impl Resource for SubscriptionPlan {
  const KIND: &'static str = "subscription_plans";
  const LIST_QUERY: &'static str = queries::SUBSCRIPTION_PLANS;
  const LIST_FIELD: &'static str = "subscriptionPlans";
  const DEFAULT_TTL: Duration = FIVE_MINUTES;

  fn id(&self) -> &str {
    &self.id
  }

  fn compare(&self, other: &Self) -> Ordering {
    self
      .priority
      .cmp(&other.priority)
      .then_with(|| self.price.total_cmp(&other.price))
  }
}

impl Resource for Report {
  const KIND: &'static str = "reports";
  const LIST_QUERY: &'static str = queries::REPORTS;
  const LIST_FIELD: &'static str = "reports";
  const DEFAULT_TTL: Duration = ONE_MINUTE;

  fn id(&self) -> &str {
    &self.id
  }

  // Newest first
  fn compare(&self, other: &Self) -> Ordering {
    other.created_at.cmp(&self.created_at)
  }
}

impl Resource for ContactMessage {
  const KIND: &'static str = "contact_messages";
  const LIST_QUERY: &'static str = queries::CONTACT_MESSAGES;
  const LIST_FIELD: &'static str = "contactMessages";
  const DEFAULT_TTL: Duration = ONE_MINUTE;

  fn id(&self) -> &str {
    &self.id
  }

  fn compare(&self, other: &Self) -> Ordering {
    other.created_at.cmp(&self.created_at)
  }
}

impl Resource for Permission {
  const KIND: &'static str = "permissions";
  const LIST_QUERY: &'static str = queries::MY_PERMISSIONS;
  const LIST_FIELD: &'static str = "myPermissions";
  const DEFAULT_TTL: Duration = Duration::from_secs(120);

  fn id(&self) -> &str {
    &self.id
  }

  fn compare(&self, other: &Self) -> Ordering {
    self.key.cmp(&other.key)
  }
}
