//! View-state helpers for screens that load and mutate resource lists.
//!
//! Responses can arrive after the screen that asked for them is gone, or
//! after a newer request for the same screen. [`MountFlag`] and
//! [`RequestSequence`] let the caller drop such responses.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::error::ClientError;
use crate::resource::Resource;

/// Shared "still mounted" flag. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct MountFlag(Arc<AtomicBool>);

impl MountFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for MountFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues monotonically increasing tickets; only the newest is current.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence(Arc<AtomicU64>);

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding every earlier one.
    pub fn issue(&self) -> RequestTicket {
        let seq = self.0.fetch_add(1, Ordering::AcqRel) + 1;
        RequestTicket {
            seq,
            latest: Arc::clone(&self.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestTicket {
    seq: u64,
    latest: Arc<AtomicU64>,
}

impl RequestTicket {
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.seq
    }
}

/// State of a list screen: records, a dismissible error banner and the
/// in-flight flags that disable duplicate triggers.
///
/// Mutations change `items` only once the server has confirmed them.
#[derive(Debug)]
pub struct ListView<R> {
    items: Vec<R>,
    error: Option<String>,
    loading: bool,
    saving: bool,
    deleting: bool,
    sequence: RequestSequence,
}

impl<R> Default for ListView<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            error: None,
            loading: false,
            saving: false,
            deleting: false,
            sequence: RequestSequence::new(),
        }
    }
}

impl<R: Resource> ListView<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Start a (re)load. Any load still in flight becomes stale.
    pub fn begin_load(&mut self) -> RequestTicket {
        self.loading = true;
        self.error = None;
        self.sequence.issue()
    }

    /// Apply a load result. Returns `false` and changes nothing when the
    /// ticket has been superseded.
    pub fn finish_load(&mut self, ticket: &RequestTicket, result: Result<Vec<R>, ClientError>) -> bool {
        if !ticket.is_current() {
            tracing::debug!(resource = R::PATH, "Discarding stale list response");
            return false;
        }

        self.loading = false;
        match result {
            Ok(items) => self.items = items,
            Err(err) => self.error = Some(err.to_string()),
        }
        true
    }

    /// Mark a save in flight. Returns `false` if one already is.
    pub fn begin_save(&mut self) -> bool {
        if self.saving {
            return false;
        }
        self.saving = true;
        self.error = None;
        true
    }

    /// Apply a confirmed create or update: replace the record with the same
    /// id, or prepend it. Loads started before the confirmation become stale.
    pub fn finish_save(&mut self, result: Result<R, ClientError>) {
        self.saving = false;
        match result {
            Ok(record) => {
                self.supersede_loads();
                match self.items.iter_mut().find(|item| item.id() == record.id()) {
                    Some(existing) => *existing = record,
                    None => self.items.insert(0, record),
                }
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Mark a delete in flight. Returns `false` if one already is.
    pub fn begin_delete(&mut self) -> bool {
        if self.deleting {
            return false;
        }
        self.deleting = true;
        self.error = None;
        true
    }

    /// Apply a delete result. A confirmed delete also makes earlier loads
    /// stale.
    pub fn finish_delete(&mut self, id: &str, result: Result<(), ClientError>) {
        self.deleting = false;
        match result {
            Ok(()) => {
                self.supersede_loads();
                self.items.retain(|item| item.id() != id);
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    // A list fetched before a confirmed mutation no longer reflects the store.
    fn supersede_loads(&mut self) {
        self.sequence.issue();
        self.loading = false;
    }
}
