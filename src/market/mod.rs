//! Marketplace domain: entity types, their GraphQL documents, and the stores
//! that hold them.

mod actions;
pub mod queries;
mod resources;
mod snapshot;
mod stores;
mod types;

pub use snapshot::MarketSnapshot;
pub use stores::MarketStores;
pub use types::{
  AdPackage, BillingInterval, Category, ContactMessage, NewContactMessage, NewReport, Permission,
  Report, ReportStatus, SubscriptionPlan,
};
