//! GraphQL documents used by the marketplace stores.

pub const CATEGORIES: &str = r#"
query Categories {
  categories {
    id
    name
    slug
    parentId
    priority
    icon
    listingCount
  }
}
"#;

pub const AD_PACKAGES: &str = r#"
query AdPackages {
  adPackages {
    id
    name
    description
    price
    currency
    durationDays
    features
    isFeatured
  }
}
"#;

pub const SUBSCRIPTION_PLANS: &str = r#"
query SubscriptionPlans {
  subscriptionPlans {
    id
    name
    price
    currency
    interval
    priority
    maxListings
    features
  }
}
"#;

pub const REPORTS: &str = r#"
query Reports {
  reports { id listingId reason details status createdAt }
}
"#;

pub const CREATE_REPORT: &str = r#"
mutation CreateReport($input: CreateReportInput!) {
  createReport(input: $input) { id listingId reason details status createdAt }
}
"#;

pub const UPDATE_REPORT_STATUS: &str = r#"
mutation UpdateReportStatus($id: ID!, $status: ReportStatus!) {
  updateReportStatus(id: $id, status: $status) { id listingId reason details status createdAt }
}
"#;

pub const DELETE_REPORT: &str = r#"
mutation DeleteReport($id: ID!) {
  deleteReport(id: $id)
}
"#;

pub const CONTACT_MESSAGES: &str = r#"
query ContactMessages {
  contactMessages { id name email subject message isRead createdAt }
}
"#;

pub const SUBMIT_CONTACT: &str = r#"
mutation SubmitContact($input: ContactInput!) {
  submitContact(input: $input) { id name email subject message isRead createdAt }
}
"#;

pub const MARK_CONTACT_READ: &str = r#"
mutation MarkContactRead($id: ID!) {
  markContactRead(id: $id) { id name email subject message isRead createdAt }
}
"#;

pub const DELETE_CONTACT: &str = r#"
mutation DeleteContact($id: ID!) {
  deleteContact(id: $id)
}
"#;

pub const MY_PERMISSIONS: &str = r#"
query MyPermissions {
  myPermissions { id key description }
}
"#;
