//! Image attachments stored under opaque, server-generated references.
//!
//! A reference looks like `9f1c…e2.png`: 32 lowercase hex digits from a
//! random UUID plus the extension of the classified image kind. It never
//! contains anything the uploader supplied, so it is safe to embed in a
//! storage key, and it says nothing about which backend holds the bytes.

use std::sync::Arc;

use bytes::Bytes;
use taskpad_core::attachment::MAX_ATTACHMENT_BYTES;
use taskpad_core::ImageKind;

use crate::{attachment_key, ObjectStore, StoreError};

/// Generate a fresh reference for an image of the given kind.
pub fn new_reference(kind: ImageKind) -> String {
    format!("{}.{}", uuid::Uuid::new_v4().simple(), kind.extension())
}

/// Check that `reference` has the exact shape `new_reference` produces and
/// return its image kind. Anything else (paths, dots, uppercase, foreign
/// extensions) is rejected.
pub fn parse_reference(reference: &str) -> Option<ImageKind> {
    let (stem, ext) = reference.split_once('.')?;
    if stem.len() != 32
        || !stem
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    let kind = ImageKind::from_extension(ext)?;
    (kind.extension() == ext).then_some(kind)
}

#[derive(Clone)]
pub struct AttachmentStore {
    objects: Arc<dyn ObjectStore>,
    max_bytes: usize,
}

impl AttachmentStore {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self::with_max_bytes(objects, MAX_ATTACHMENT_BYTES)
    }

    pub fn with_max_bytes(objects: Arc<dyn ObjectStore>, max_bytes: usize) -> Self {
        Self { objects, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate and persist an image, returning its new reference.
    ///
    /// `filename_hint` only helps classify uploads that arrive without a
    /// specific content type; it never reaches the storage key.
    pub async fn store(
        &self,
        data: Bytes,
        content_type: Option<&str>,
        filename_hint: Option<&str>,
    ) -> Result<String, StoreError> {
        if data.len() > self.max_bytes {
            return Err(StoreError::InvalidInput(format!(
                "file exceeds max size of {} bytes",
                self.max_bytes
            )));
        }
        if data.is_empty() {
            return Err(StoreError::InvalidInput("file is empty".into()));
        }
        let kind = ImageKind::classify(content_type, filename_hint).ok_or_else(|| {
            StoreError::InvalidInput(format!(
                "unsupported file type; allowed: {}",
                ImageKind::allowed_list()
            ))
        })?;

        let reference = new_reference(kind);
        self.objects.put(&attachment_key(&reference), data).await?;
        tracing::debug!(%reference, %kind, "stored attachment");
        Ok(reference)
    }

    /// Resolve a reference to a fetchable URL. Unknown and malformed
    /// references resolve to `None`.
    pub async fn resolve(&self, reference: &str) -> Result<Option<String>, StoreError> {
        if !self.exists(reference).await? {
            return Ok(None);
        }
        let url = self.objects.url(&attachment_key(reference)).await?;
        Ok(Some(url))
    }

    pub async fn exists(&self, reference: &str) -> Result<bool, StoreError> {
        if parse_reference(reference).is_none() {
            return Ok(false);
        }
        self.objects.exists(&attachment_key(reference)).await
    }

    /// Read an attachment back together with its image kind.
    pub async fn load(&self, reference: &str) -> Result<Option<(Bytes, ImageKind)>, StoreError> {
        let Some(kind) = parse_reference(reference) else {
            return Ok(None);
        };
        let data = self.objects.get_opt(&attachment_key(reference)).await?;
        Ok(data.map(|d| (d, kind)))
    }

    /// Delete an attachment. No-op for unknown or malformed references.
    pub async fn remove(&self, reference: &str) -> Result<(), StoreError> {
        if parse_reference(reference).is_none() {
            return Ok(());
        }
        self.objects.delete(&attachment_key(reference)).await?;
        tracing::debug!(%reference, "removed attachment");
        Ok(())
    }
}
