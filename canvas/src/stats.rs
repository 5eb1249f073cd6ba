//! Counters of reference protocol outcomes.
use core::cell::Cell;
use core::fmt;

use crate::portion::RefKind;

/// Counts how canvases were referenced.
///
/// A sink is shared by handing the same `Rc<RefStats>` to several canvases, see
/// [`Canvas::with_stats`](crate::Canvas::with_stats). The counters are plain cells, the sink can
/// not be shared between threads and neither can a canvas holding it.
#[derive(Debug, Default)]
pub struct RefStats {
    read: Cell<u64>,
    read_write: Cell<u64>,
    unref: Cell<u64>,
    failed: Cell<u64>,
    unref_failed: Cell<u64>,
    unalloc_refused: Cell<u64>,
}

/// A snapshot of [`RefStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RefCounts {
    /// Successful read references.
    pub read: u64,
    /// Successful read-write references.
    pub read_write: u64,
    /// Balanced releases.
    pub unref: u64,
    /// References that could not be acquired.
    pub failed: u64,
    /// Releases outside the canvas or without a reference to release.
    pub unref_failed: u64,
    /// Attempts to free a portion that was still referenced.
    pub unalloc_refused: u64,
}

impl RefStats {
    pub fn new() -> Self {
        RefStats::default()
    }

    pub fn snapshot(&self) -> RefCounts {
        RefCounts {
            read: self.read.get(),
            read_write: self.read_write.get(),
            unref: self.unref.get(),
            failed: self.failed.get(),
            unref_failed: self.unref_failed.get(),
            unalloc_refused: self.unalloc_refused.get(),
        }
    }

    pub fn reset(&self) {
        for counter in self.counters() {
            counter.set(0);
        }
    }

    pub(crate) fn count_ref(&self, kind: RefKind) {
        match kind {
            RefKind::Read => bump(&self.read),
            RefKind::ReadWrite => bump(&self.read_write),
        }
    }

    pub(crate) fn count_unref(&self) {
        bump(&self.unref)
    }

    pub(crate) fn count_failed(&self) {
        bump(&self.failed)
    }

    pub(crate) fn count_unref_failed(&self) {
        bump(&self.unref_failed)
    }

    pub(crate) fn count_unalloc_refused(&self) {
        bump(&self.unalloc_refused)
    }

    fn counters(&self) -> [&Cell<u64>; 6] {
        [
            &self.read,
            &self.read_write,
            &self.unref,
            &self.failed,
            &self.unref_failed,
            &self.unalloc_refused,
        ]
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get().wrapping_add(1));
}

impl fmt::Display for RefCounts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ro {} rw {} un {} fa {} uf {} ua {}",
            self.read,
            self.read_write,
            self.unref,
            self.failed,
            self.unref_failed,
            self.unalloc_refused,
        )
    }
}
