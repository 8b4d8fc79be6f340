//! Content streams and transfer outcomes

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};

use super::errors::ProviderError;
use super::metadata::Metadata;

/// Boxed stream of content chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send>>;

/// An inclusive byte range for partial downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive end; `None` reads to the end of the content
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// Value for an HTTP `Range` header, e.g. `bytes=0-99`
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// Downloaded content, streamed from the backend
pub struct DownloadStream {
    /// Content length, when the backend reported one
    pub size: Option<u64>,
    /// True when the backend answered a range request with partial content
    pub partial: bool,
    pub stream: ByteStream,
}

impl DownloadStream {
    /// Drain the stream into memory
    pub async fn read_all(mut self) -> Result<Vec<u8>, ProviderError> {
        let mut out = Vec::with_capacity(self.size.unwrap_or(0) as usize);
        while let Some(chunk) = self.stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

impl fmt::Debug for DownloadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadStream")
            .field("size", &self.size)
            .field("partial", &self.partial)
            .finish_non_exhaustive()
    }
}

/// Content to upload with its declared size
pub struct UploadStream {
    pub size: u64,
    pub stream: ByteStream,
}

impl UploadStream {
    /// Wrap an in-memory buffer
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            size: data.len() as u64,
            stream: Box::pin(stream::once(async move { Ok(data) })),
        }
    }
}

impl fmt::Debug for UploadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadStream")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Outcome of an intra-provider move or copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The backend applied the operation and returned the result
    Completed {
        metadata: Metadata,
        /// True if the destination did not exist before
        created: bool,
    },
    /// The backend accepted the operation for asynchronous completion; no
    /// result is observable yet and polling is left to the caller
    Pending {
        /// Monitor URL reported by the backend, if any
        monitor_url: Option<String>,
        /// True when the source of a move is still present and must be
        /// removed once the copy completes
        source_retained: bool,
    },
}

impl TransferOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            Self::Completed { metadata, .. } => Some(metadata),
            Self::Pending { .. } => None,
        }
    }
}
