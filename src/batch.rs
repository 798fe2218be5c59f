//! Batch coordination: the per-item status lifecycle.
//!
//! A [`Batch`] owns a list of [`ImageItem`]s. [`run_batch`] walks the list in
//! order and pushes every item through the transform pipeline, one at a time.
//!
//! ## Item lifecycle
//!
//! ```text
//!            dispatch              success
//! Pending ──────────────▶ Processing ───────▶ Done
//!                            ▲    │
//!                 dispatch   │    │ failure
//!              (reprocess)   │    ▼
//!     Done / Error ──────────┘   Error
//! ```
//!
//! Every transition goes through `Processing`. A finished item is never
//! skipped on the next run: it is processed again with that run's options.
//! Result and error message live inside the state itself, so an item can
//! never carry both, and carries neither until it finishes.
//!
//! ## Sequential processing
//!
//! Items are processed strictly one after another. Decoding many large images
//! at once would spike memory; one at a time keeps usage flat and makes the
//! progress stream match the list order. Progress is published on an optional
//! [`BatchEvent`] channel as each item starts and finishes.
//!
//! ## Failure isolation
//!
//! A decode, encode or constraint error marks that one item as `Error` with a
//! readable message and the loop moves on. Nothing an item does can stop the
//! batch; only a [`CancelToken`] can, and it is checked between items.

use crate::imaging::{
    BackendError, Dimensions, ImageBackend, OutputFormat, ProcessOptions, TransformOutput,
    probe_dimensions, transform,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Item {id} cannot go from {from} to {to}")]
    InvalidTransition {
        id: ItemId,
        from: ItemStatus,
        to: ItemStatus,
    },
}

/// Opaque, unique item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl ItemStatus {
    /// `Done` and `Error` are terminal: nothing moves them without a new dispatch.
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Done | ItemStatus::Error)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Done => "done",
            ItemStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Encoded output of a finished item.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub data: Vec<u8>,
    pub dimensions: Dimensions,
    /// The format requested when this item was dispatched.
    pub format: OutputFormat,
}

impl From<TransformOutput> for ProcessedImage {
    fn from(out: TransformOutput) -> Self {
        Self {
            data: out.data,
            dimensions: out.dimensions,
            format: out.format,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ItemState {
    Pending,
    Processing,
    Done(ProcessedImage),
    Error(String),
}

/// One source image and everything known about it.
#[derive(Debug, Clone)]
pub struct ImageItem {
    id: ItemId,
    name: String,
    source: Vec<u8>,
    original_dimensions: Option<Dimensions>,
    state: ItemState,
}

impl ImageItem {
    /// A new item in the `Pending` state. Dimensions are filled in later by probing.
    pub fn new(name: impl Into<String>, source: Vec<u8>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            source,
            original_dimensions: None,
            state: ItemState::Pending,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Original file name, used to name the output.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn original_size(&self) -> usize {
        self.source.len()
    }

    pub fn original_dimensions(&self) -> Option<Dimensions> {
        self.original_dimensions
    }

    pub fn status(&self) -> ItemStatus {
        match self.state {
            ItemState::Pending => ItemStatus::Pending,
            ItemState::Processing => ItemStatus::Processing,
            ItemState::Done(_) => ItemStatus::Done,
            ItemState::Error(_) => ItemStatus::Error,
        }
    }

    /// Present iff the item is `Done`.
    pub fn result(&self) -> Option<&ProcessedImage> {
        match &self.state {
            ItemState::Done(result) => Some(result),
            _ => None,
        }
    }

    /// Present iff the item is `Error`.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ItemState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn result_size(&self) -> Option<usize> {
        self.result().map(|r| r.data.len())
    }

    /// Output size as a whole percentage of the original size.
    pub fn compression_ratio(&self) -> Option<u32> {
        let result = self.result_size()?;
        if self.source.is_empty() {
            return None;
        }
        Some((result as f64 / self.source.len() as f64 * 100.0).round() as u32)
    }

    /// Record the probed size. The first value sticks; later calls are ignored.
    pub(crate) fn record_dimensions(&mut self, dims: Dimensions) -> bool {
        if self.original_dimensions.is_some() {
            return false;
        }
        self.original_dimensions = Some(dims);
        true
    }

    /// `Pending | Done | Error → Processing`. Clears any previous result or error.
    pub(crate) fn begin(&mut self) -> Result<(), BatchError> {
        if self.state == ItemState::Processing {
            return Err(self.invalid(ItemStatus::Processing));
        }
        self.state = ItemState::Processing;
        Ok(())
    }

    /// `Processing → Done | Error`.
    pub(crate) fn finish(
        &mut self,
        result: Result<TransformOutput, BackendError>,
    ) -> Result<(), BatchError> {
        if self.state != ItemState::Processing {
            let to = if result.is_ok() {
                ItemStatus::Done
            } else {
                ItemStatus::Error
            };
            return Err(self.invalid(to));
        }
        self.state = match result {
            Ok(out) => ItemState::Done(out.into()),
            Err(e) => ItemState::Error(e.to_string()),
        };
        Ok(())
    }

    fn invalid(&self, to: ItemStatus) -> BatchError {
        BatchError::InvalidTransition {
            id: self.id,
            from: self.status(),
            to,
        }
    }

    /// Serializable snapshot for progress events and reports.
    pub fn report(&self) -> ItemReport {
        ItemReport {
            id: self.id,
            name: self.name.clone(),
            status: self.status(),
            original_size: self.original_size(),
            original_dimensions: self.original_dimensions,
            result: self.result().map(|r| ResultReport {
                width: r.dimensions.width,
                height: r.dimensions.height,
                format: r.format,
                size: r.data.len(),
                compression_ratio: self.compression_ratio(),
            }),
            error: self.error_message().map(str::to_string),
        }
    }
}

/// Point-in-time view of one item, without the pixel data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub id: ItemId,
    pub name: String,
    pub status: ItemStatus,
    pub original_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultReport {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub size: usize,
    /// Output size as a percentage of the original; absent for an empty source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<u32>,
}

/// Ordered collection of items.
#[derive(Debug, Default)]
pub struct Batch {
    items: Vec<ImageItem>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a source file. The item is `Pending` immediately.
    pub fn add(&mut self, name: impl Into<String>, source: Vec<u8>) -> ItemId {
        let item = ImageItem::new(name, source);
        let id = item.id();
        self.items.push(item);
        id
    }

    /// Probe the size of every item that doesn't have one yet.
    ///
    /// Best effort: a failed probe is logged and leaves the item untouched.
    /// Returns how many items gained dimensions.
    pub fn probe_dimensions(&mut self, backend: &impl ImageBackend) -> usize {
        let mut probed = 0;
        for item in self
            .items
            .iter_mut()
            .filter(|i| i.original_dimensions.is_none())
        {
            match probe_dimensions(backend, &item.source) {
                Ok(dims) => {
                    if item.record_dimensions(dims) {
                        probed += 1;
                    }
                }
                Err(e) => log::warn!("{}: {}", item.name, e),
            }
        }
        probed
    }

    /// Remove an item. Other items are unaffected.
    pub fn remove(&mut self, id: ItemId) -> Option<ImageItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn get(&self, id: ItemId) -> Option<&ImageItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items that finished successfully, in batch order.
    pub fn done_items(&self) -> impl Iterator<Item = &ImageItem> {
        self.items.iter().filter(|i| i.status() == ItemStatus::Done)
    }

    pub fn processed_count(&self) -> usize {
        self.done_items().count()
    }
}

/// Shared flag to stop a batch between items.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress events, sent in order as the batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    ItemStarted {
        /// 1-based position in the batch.
        index: usize,
        total: usize,
        id: ItemId,
        name: String,
    },
    ItemFinished {
        index: usize,
        total: usize,
        report: ItemReport,
    },
    Finished(BatchSummary),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub done: usize,
    pub failed: usize,
    /// Items never dispatched because the batch was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} done, {} failed", self.done, self.failed)?;
        if self.cancelled {
            write!(f, ", {} skipped (cancelled)", self.skipped)?;
        }
        Ok(())
    }
}

/// Process every item in order with one options snapshot.
///
/// Each item is dispatched only after the previous one reached `Done` or
/// `Error`. Errors are recorded on their item and never end the run early.
/// When `cancel` fires, the items not yet dispatched are left as they were.
pub fn run_batch(
    backend: &impl ImageBackend,
    batch: &mut Batch,
    options: &ProcessOptions,
    progress: Option<Sender<BatchEvent>>,
    cancel: Option<&CancelToken>,
) -> BatchSummary {
    let total = batch.len();
    let emit = |event: BatchEvent| {
        if let Some(tx) = &progress {
            // A dropped receiver only means nobody is watching.
            tx.send(event).ok();
        }
    };

    emit(BatchEvent::Started { total });
    let mut summary = BatchSummary::default();

    for (pos, item) in batch.items.iter_mut().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            summary.cancelled = true;
            summary.skipped = total - pos;
            log::info!("batch cancelled with {} items left", summary.skipped);
            break;
        }

        let index = pos + 1;
        if let Err(e) = item.begin() {
            // Unreachable: the coordinator holds `&mut` and never leaves an item Processing.
            log::error!("{e}");
            continue;
        }
        log::debug!("[{index}/{total}] processing {}", item.name);
        emit(BatchEvent::ItemStarted {
            index,
            total,
            id: item.id,
            name: item.name.clone(),
        });

        let result = transform(backend, &item.source, options);
        if let Err(e) = &result {
            log::warn!("[{index}/{total}] {}: {e}", item.name);
        }
        if let Err(e) = item.finish(result) {
            log::error!("{e}");
            continue;
        }

        match item.status() {
            ItemStatus::Done => summary.done += 1,
            _ => summary.failed += 1,
        }
        emit(BatchEvent::ItemFinished {
            index,
            total,
            report: item.report(),
        });
    }

    log::info!("batch finished: {summary}");
    emit(BatchEvent::Finished(summary));
    summary
}
