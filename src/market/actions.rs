//! Entity-specific store actions.

use serde_json::json;

use crate::store::{Store, StoreError};

use super::queries;
use super::types::{
  AdPackage, Category, ContactMessage, NewContactMessage, NewReport, Permission, Report,
  ReportStatus,
};

impl Store<Category> {
  pub fn get_by_slug(&self, slug: &str) -> Option<Category> {
    self.find(|c| c.slug == slug)
  }

  /// Direct children of `parent_id`; `None` gives the top level.
  pub fn children_of(&self, parent_id: Option<&str>) -> Vec<Category> {
    self.filter(|c| c.parent_id.as_deref() == parent_id)
  }
}

impl Store<AdPackage> {
  pub fn featured(&self) -> Vec<AdPackage> {
    self.filter(|p| p.is_featured)
  }
}

impl Store<Report> {
  /// File a report. Invalid input is rejected before any request is made.
  pub async fn submit_report(&self, input: &NewReport) -> Result<Report, StoreError> {
    input.validate().map_err(|e| self.fail_write(e.into()))?;
    self
      .create(queries::CREATE_REPORT, json!({ "input": input }), "createReport")
      .await
  }

  pub async fn update_report_status(
    &self,
    id: &str,
    status: ReportStatus,
  ) -> Result<Report, StoreError> {
    self
      .update(
        queries::UPDATE_REPORT_STATUS,
        json!({ "id": id, "status": status }),
        "updateReportStatus",
      )
      .await
  }

  pub async fn delete_report(&self, id: &str) -> Result<(), StoreError> {
    self
      .delete(queries::DELETE_REPORT, json!({ "id": id }), id)
      .await
  }

  pub fn pending(&self) -> Vec<Report> {
    self.filter(|r| r.status == ReportStatus::Pending)
  }
}

impl Store<ContactMessage> {
  /// Send the contact form. Invalid input is rejected before any request is made.
  pub async fn submit_contact(
    &self,
    input: &NewContactMessage,
  ) -> Result<ContactMessage, StoreError> {
    input.validate().map_err(|e| self.fail_write(e.into()))?;
    self
      .create(queries::SUBMIT_CONTACT, json!({ "input": input }), "submitContact")
      .await
  }

  pub async fn mark_contact_read(&self, id: &str) -> Result<ContactMessage, StoreError> {
    self
      .update(queries::MARK_CONTACT_READ, json!({ "id": id }), "markContactRead")
      .await
  }

  pub async fn delete_contact(&self, id: &str) -> Result<(), StoreError> {
    self
      .delete(queries::DELETE_CONTACT, json!({ "id": id }), id)
      .await
  }

  pub fn unread_count(&self) -> usize {
    self.filter(|m| !m.is_read).len()
  }
}

impl Store<Permission> {
  pub fn has_permission(&self, key: &str) -> bool {
    self.find(|p| p.key == key).is_some()
  }
}
