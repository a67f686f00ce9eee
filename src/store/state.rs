/// Client-side state held by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<T> {
  /// Records in display order
  pub entities: Vec<T>,
  pub is_loading: bool,
  /// User-facing message for the last failed action
  pub error: Option<String>,
  /// Set once entities came from the network or from hydration
  pub initialized: bool,
}

impl<T> Default for StoreState<T> {
  fn default() -> Self {
    Self {
      entities: Vec::new(),
      is_loading: false,
      error: None,
      initialized: false,
    }
  }
}

impl<T> StoreState<T> {
  pub fn is_empty(&self) -> bool {
    self.entities.is_empty()
  }

  pub fn has_error(&self) -> bool {
    self.error.is_some()
  }
}
