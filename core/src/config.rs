// gigflow/src/config.rs

use crate::attachment::AttachmentPolicy;
use crate::classifier::Classifier;
use crate::error::{OrderError, OrderResult};
use crate::view::OrderSort;

/// Tunables of an [`OrderWorkflow`](crate::OrderWorkflow).
///
/// The library never reads the environment itself; applications build this
/// from whatever configuration source they use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
  pub attachment_policy: AttachmentPolicy,
  /// See [`Classifier::derive_late`].
  pub derive_late: bool,
  pub default_sort: OrderSort,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self {
      attachment_policy: AttachmentPolicy::default(),
      derive_late: true,
      default_sort: OrderSort::Insertion,
    }
  }
}

impl WorkflowConfig {
  pub fn classifier(&self) -> Classifier {
    Classifier::new(self.derive_late)
  }

  pub fn validate(&self) -> OrderResult<()> {
    if self.attachment_policy.max_bytes == 0 {
      return Err(OrderError::Config("attachment size limit must be positive".to_string()));
    }
    if self.attachment_policy.allowed.is_empty() {
      return Err(OrderError::Config("at least one attachment kind must be allowed".to_string()));
    }
    Ok(())
  }
}
