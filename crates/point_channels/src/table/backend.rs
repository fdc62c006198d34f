//! Rendering backend seam for uploading channel tables.
//!
//! The engine never owns GPU memory. It asks a [`TableBackend`] for table handles once per
//! channel and pushes bytes through [`TableHandle::publish`] whenever a table changes.
//! [`RecordingBackend`] keeps the published bytes in memory for tests and tools.
use std::cell::RefCell;
use std::rc::Rc;

/// A backend-owned table (typically a `1 x size` RGBA8 texture).
pub trait TableHandle {
    /// Overwrite the table contents.
    fn publish(&mut self, bytes: &[u8], width: u32, height: u32);
}

/// Factory for backend tables.
pub trait TableBackend {
    /// Create a table initialised with `initial`.
    fn create_table(&mut self, initial: &[u8], width: u32, height: u32) -> Box<dyn TableHandle>;
}

/// Snapshot of a table as last published.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordedTable {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Number of publishes after creation.
    pub publishes: usize,
}

/// In-memory backend that records every table it hands out.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    tables: Vec<Rc<RefCell<RecordedTable>>>,
}

struct RecordingHandle {
    slot: Rc<RefCell<RecordedTable>>,
}

impl TableHandle for RecordingHandle {
    fn publish(&mut self, bytes: &[u8], width: u32, height: u32) {
        let mut slot = self.slot.borrow_mut();
        slot.bytes.clear();
        slot.bytes.extend_from_slice(bytes);
        slot.width = width;
        slot.height = height;
        slot.publishes += 1;
    }
}

impl RecordingBackend {
    /// Creates a new, empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables created so far.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no table has been created.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Snapshot of the table created at position `index` (creation order).
    pub fn table(&self, index: usize) -> Option<RecordedTable> {
        self.tables.get(index).map(|t| t.borrow().clone())
    }
}

impl TableBackend for RecordingBackend {
    fn create_table(&mut self, initial: &[u8], width: u32, height: u32) -> Box<dyn TableHandle> {
        let slot = Rc::new(RefCell::new(RecordedTable {
            bytes: initial.to_vec(),
            width,
            height,
            publishes: 0,
        }));
        self.tables.push(Rc::clone(&slot));
        Box::new(RecordingHandle { slot })
    }
}
