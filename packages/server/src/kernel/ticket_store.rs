//! Ticket store that keeps artifacts inline as data URIs.

use anyhow::{ensure, Result};
use async_trait::async_trait;

use super::{BaseTicketStore, StoredArtifact};
use crate::domains::tickets::data_uri;

/// The reference *is* the artifact: a self-contained `data:` URI written
/// straight into the registration row.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTicketStore;

impl InlineTicketStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BaseTicketStore for InlineTicketStore {
    async fn put(&self, bytes: &[u8], content_type: &str) -> Result<String> {
        ensure!(!bytes.is_empty(), "refusing to store an empty artifact");
        Ok(data_uri::encode(content_type, bytes))
    }

    async fn get(&self, reference: &str) -> Result<StoredArtifact> {
        let (content_type, bytes) = data_uri::decode(reference)?;
        Ok(StoredArtifact {
            content_type,
            bytes,
        })
    }
}
