//! Projects, source files and shared documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use savefix_text::Document;

use crate::SaveActionError;
use crate::queue::current_queue_id;

/// The project that owns the files being saved.
#[derive(Debug)]
pub struct Project {
    name: String,
    index_ready: AtomicBool,
}

impl Project {
    /// Creates a project whose index is ready.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index_ready: AtomicBool::new(true),
        }
    }

    /// Returns the project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether background indexing has finished.
    pub fn is_index_ready(&self) -> bool {
        self.index_ready.load(Ordering::Acquire)
    }

    /// Marks the index as ready or as being rebuilt.
    pub fn set_index_ready(&self, ready: bool) {
        self.index_ready.store(ready, Ordering::Release);
    }
}

/// A [`Document`] shared between threads.
///
/// Anyone may read. Writes are refused unless they come from a privileged
/// queue worker, and the first queue to write a document owns it from then on.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    inner: Arc<Mutex<Document>>,
    // 0 until a queue claims the document.
    owner: Arc<AtomicU64>,
}

impl SharedDocument {
    /// Creates a shared document holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Document::new(text))),
            owner: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns a copy of the current text.
    pub fn text(&self) -> String {
        self.inner.lock().text().to_string()
    }

    /// Returns the document's modification counter.
    pub fn version(&self) -> u64 {
        self.inner.lock().version()
    }

    /// Returns the number of undo steps available.
    pub fn undo_depth(&self) -> usize {
        self.inner.lock().undo_depth()
    }

    /// Runs `f` with read access to the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Runs `f` with write access to the document.
    ///
    /// Fails with [`SaveActionError::NotPrivileged`] off a privileged queue
    /// worker, or on the worker of a queue other than the one owning the
    /// document.
    ///
    /// The document stays locked while `f` runs. Calling [`text`](Self::text),
    /// [`read`](Self::read) or `write` on the same document from inside `f`
    /// deadlocks.
    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> Result<R, SaveActionError> {
        let Some(queue) = current_queue_id() else {
            return Err(SaveActionError::NotPrivileged);
        };
        let owner = match self
            .owner
            .compare_exchange(0, queue, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => queue,
            Err(owner) => owner,
        };
        if owner != queue {
            return Err(SaveActionError::NotPrivileged);
        }
        Ok(f(&mut self.inner.lock()))
    }
}

/// A file on disk and its open document.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    document: SharedDocument,
}

impl SourceFile {
    /// Creates a source file backed by `document`.
    pub fn new(path: impl Into<PathBuf>, document: SharedDocument) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file's document.
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }
}

/// Immutable view of a file as a rule analyses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    /// File path.
    pub path: PathBuf,
    /// Document text at snapshot time.
    pub text: String,
    /// Document version at snapshot time.
    pub version: u64,
}

impl FileSnapshot {
    /// Captures `document` for the file at `path`.
    pub fn capture(path: &Path, document: &Document) -> Self {
        Self {
            path: path.to_path_buf(),
            text: document.text().to_string(),
            version: document.version(),
        }
    }
}
