use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::ValidationError;

/// Listing category, possibly nested under a parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: String,
  pub name: String,
  pub slug: String,
  pub parent_id: Option<String>,
  /// Lower comes first
  #[serde(default)]
  pub priority: i32,
  pub icon: Option<String>,
  #[serde(default)]
  pub listing_count: u32,
}

/// Paid promotion package for a single ad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPackage {
  pub id: String,
  pub name: String,
  pub description: Option<String>,
  pub price: f64,
  pub currency: String,
  pub duration_days: u32,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub is_featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingInterval {
  Monthly,
  Yearly,
}

/// Seller subscription plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
  pub id: String,
  pub name: String,
  pub price: f64,
  pub currency: String,
  pub interval: BillingInterval,
  #[serde(default)]
  pub priority: i32,
  /// None means unlimited
  pub max_listings: Option<u32>,
  #[serde(default)]
  pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
  Pending,
  Reviewed,
  Resolved,
  Dismissed,
}

/// Abuse report filed against a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub id: String,
  pub listing_id: String,
  pub reason: String,
  pub details: Option<String>,
  pub status: ReportStatus,
  pub created_at: DateTime<Utc>,
}

/// Message sent through the contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
  pub id: String,
  pub name: String,
  pub email: String,
  pub subject: String,
  pub message: String,
  #[serde(default)]
  pub is_read: bool,
  pub created_at: DateTime<Utc>,
}

/// Permission granted to the current user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
  pub id: String,
  pub key: String,
  pub description: Option<String>,
}

const MAX_REPORT_DETAILS: usize = 1000;
const MIN_CONTACT_MESSAGE: usize = 10;
const MAX_CONTACT_MESSAGE: usize = 5000;

/// Input for filing a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
  pub listing_id: String,
  pub reason: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

impl NewReport {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.listing_id.trim().is_empty() {
      return Err(ValidationError::new("listing", "is required"));
    }
    if self.reason.trim().is_empty() {
      return Err(ValidationError::new("reason", "is required"));
    }
    if let Some(details) = &self.details {
      if details.chars().count() > MAX_REPORT_DETAILS {
        return Err(ValidationError::new(
          "details",
          format!("must be at most {} characters", MAX_REPORT_DETAILS),
        ));
      }
    }
    Ok(())
  }
}

/// Input for the contact form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactMessage {
  pub name: String,
  pub email: String,
  pub subject: String,
  pub message: String,
}

impl NewContactMessage {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::new("name", "is required"));
    }
    if !looks_like_email(self.email.trim()) {
      return Err(ValidationError::new("email", "is not a valid address"));
    }
    if self.subject.trim().is_empty() {
      return Err(ValidationError::new("subject", "is required"));
    }
    let len = self.message.trim().chars().count();
    if len < MIN_CONTACT_MESSAGE {
      return Err(ValidationError::new(
        "message",
        format!("must be at least {} characters", MIN_CONTACT_MESSAGE),
      ));
    }
    if len > MAX_CONTACT_MESSAGE {
      return Err(ValidationError::new(
        "message",
        format!("must be at most {} characters", MAX_CONTACT_MESSAGE),
      ));
    }
    Ok(())
  }
}

fn looks_like_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
    }
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn contact(email: &str, message: &str) -> NewContactMessage {
    NewContactMessage {
      name: "Sam".into(),
      email: email.into(),
      subject: "Question".into(),
      message: message.into(),
    }
  }

  #[test]
  fn test_contact_validation() {
    assert!(contact("sam@example.com", "Is the bike still for sale?").validate().is_ok());
    assert_eq!(
      contact("sam@localhost", "Is the bike still for sale?").validate().unwrap_err().field,
      "email"
    );
    assert_eq!(contact("sam@example.com", "hi").validate().unwrap_err().field, "message");
  }

  #[test]
  fn test_report_validation() {
    let report = NewReport {
      listing_id: "l1".into(),
      reason: "SPAM".into(),
      details: Some("x".repeat(MAX_REPORT_DETAILS + 1)),
    };
    assert_eq!(report.validate().unwrap_err().field, "details");

    let report = NewReport {
      details: None,
      ..report
    };
    assert!(report.validate().is_ok());
  }

  #[test]
  fn test_report_deserializes_from_graphql_shape() {
    let report: Report = serde_json::from_value(serde_json::json!({
      "id": "r1",
      "listingId": "l9",
      "reason": "SCAM",
      "details": null,
      "status": "PENDING",
      "createdAt": "2026-03-01T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(report.status, ReportStatus::Pending);
    assert_eq!(report.listing_id, "l9");
  }
}
