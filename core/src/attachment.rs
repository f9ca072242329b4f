// gigflow/src/attachment.rs

//! Files handed in alongside a delivery.
//!
//! The workflow only stores [`AttachmentRef`]s. Uploading the bytes is the job
//! of an [`AttachmentStore`]; the [`AttachmentPolicy`] is checked both at upload
//! time and again when a delivery referencing the attachments is applied.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{event, instrument, Level};
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};

pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
  Pdf,
  Zip,
  Jpg,
  Png,
}

impl AttachmentKind {
  pub const ALL: [AttachmentKind; 4] = [
    AttachmentKind::Pdf,
    AttachmentKind::Zip,
    AttachmentKind::Jpg,
    AttachmentKind::Png,
  ];

  /// Detects the kind from the file name's extension.
  pub fn from_file_name(name: &str) -> Option<Self> {
    let (_, ext) = name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
      "pdf" => Some(AttachmentKind::Pdf),
      "zip" => Some(AttachmentKind::Zip),
      "jpg" | "jpeg" => Some(AttachmentKind::Jpg),
      "png" => Some(AttachmentKind::Png),
      _ => None,
    }
  }
}

impl fmt::Display for AttachmentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      AttachmentKind::Pdf => "pdf",
      AttachmentKind::Zip => "zip",
      AttachmentKind::Jpg => "jpg",
      AttachmentKind::Png => "png",
    })
  }
}

/// Reference to an uploaded file, as stored on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
  pub name: String,
  pub kind: AttachmentKind,
  pub size_bytes: u64,
  pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
  pub max_bytes: u64,
  pub allowed: Vec<AttachmentKind>,
}

impl Default for AttachmentPolicy {
  fn default() -> Self {
    Self {
      max_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
      allowed: AttachmentKind::ALL.to_vec(),
    }
  }
}

impl AttachmentPolicy {
  pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
    self.max_bytes = max_bytes;
    self
  }

  /// Validates a file about to be uploaded (or already referenced by a delivery).
  pub fn check(&self, name: &str, size_bytes: u64) -> OrderResult<AttachmentKind> {
    let reject = |message: String| OrderError::Attachment {
      name: name.to_string(),
      message,
    };

    if name.trim().is_empty() {
      return Err(reject("file name is empty".to_string()));
    }
    let kind = AttachmentKind::from_file_name(name)
      .ok_or_else(|| reject("unsupported file type (expected pdf, zip, jpg or png)".to_string()))?;
    if !self.allowed.contains(&kind) {
      return Err(reject(format!("{} files are not accepted", kind)));
    }
    if size_bytes == 0 {
      return Err(reject("file is empty".to_string()));
    }
    if size_bytes > self.max_bytes {
      return Err(reject(format!(
        "file is {} bytes, the limit is {} bytes",
        size_bytes, self.max_bytes
      )));
    }
    Ok(kind)
  }

  pub fn check_ref(&self, attachment: &AttachmentRef) -> OrderResult<()> {
    let kind = self.check(&attachment.name, attachment.size_bytes)?;
    if kind != attachment.kind {
      return Err(OrderError::Attachment {
        name: attachment.name.clone(),
        message: format!("declared kind {} does not match the file name", attachment.kind),
      });
    }
    Ok(())
  }
}

/// Accepts file bytes and returns a reference usable in a delivery.
#[async_trait]
pub trait AttachmentStore: Send + Sync + 'static {
  async fn upload(&self, name: &str, bytes: Vec<u8>) -> OrderResult<AttachmentRef>;
}

/// Keeps uploaded files in memory under `mem://` URIs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttachmentStore {
  policy: AttachmentPolicy,
  files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryAttachmentStore {
  pub fn new(policy: AttachmentPolicy) -> Self {
    Self {
      policy,
      files: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  pub fn contents(&self, uri: &str) -> Option<Vec<u8>> {
    self.files.read().get(uri).cloned()
  }

  pub fn len(&self) -> usize {
    self.files.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
  #[instrument(name = "InMemoryAttachmentStore::upload", skip(self, bytes), fields(size = bytes.len()), err(Display))]
  async fn upload(&self, name: &str, bytes: Vec<u8>) -> OrderResult<AttachmentRef> {
    let size_bytes = bytes.len() as u64;
    let kind = self.policy.check(name, size_bytes)?;
    let uri = format!("mem://{}/{}", Uuid::new_v4(), name);
    self.files.write().insert(uri.clone(), bytes);
    event!(Level::DEBUG, %uri, "Attachment stored.");
    Ok(AttachmentRef {
      name: name.to_string(),
      kind,
      size_bytes,
      uri,
    })
  }
}
