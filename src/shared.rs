//! Per-symbol published state
//!
//! Writers for one symbol are serialised by a mutex held for the whole
//! read-modify-publish step. Readers load an immutable snapshot through
//! `ArcSwap` and never touch that mutex.
//!
//! ```text
//! Reader ──► load() ──► Arc<T> ──► read (never blocked)
//! Writer ──► lock ──► clone + modify ──► store() ──► unlock
//! ```

use arc_swap::ArcSwap;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// A value with serialised writers and lock-free readers
#[derive(Debug)]
pub struct Published<T> {
    write: Mutex<()>,
    current: ArcSwap<T>,
}

impl<T: Clone> Published<T> {
    pub fn new(value: T) -> Self {
        Self {
            write: Mutex::new(()),
            current: ArcSwap::from_pointee(value),
        }
    }

    /// Latest published snapshot
    pub fn load(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Apply `f` to a copy of the current state and publish the result.
    ///
    /// The writer lock is held until the new snapshot is stored.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let _guard = self.write.lock();
        let mut next = T::clone(&self.current.load());
        let result = f(&mut next);
        self.current.store(Arc::new(next));
        result
    }

    /// Like [`update`](Self::update) but gives up immediately if a writer
    /// holds the lock.
    pub fn try_update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let _guard = self.write.try_lock()?;
        let mut next = T::clone(&self.current.load());
        let result = f(&mut next);
        self.current.store(Arc::new(next));
        Some(result)
    }
}

/// Symbol-keyed collection of [`Published`] cells
#[derive(Debug)]
pub struct SymbolMap<T> {
    cells: DashMap<String, Arc<Published<T>>>,
}

impl<T: Clone + Default> SymbolMap<T> {
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    /// Cell for a symbol, if it has ever been written
    pub fn get(&self, symbol: &str) -> Option<Arc<Published<T>>> {
        self.cells.get(symbol).map(|entry| Arc::clone(&entry))
    }

    /// Snapshot for a symbol, if it has ever been written
    pub fn snapshot(&self, symbol: &str) -> Option<Arc<T>> {
        self.get(symbol).map(|cell| cell.load())
    }

    /// Cell for a symbol, created empty on first use
    pub fn get_or_default(&self, symbol: &str) -> Arc<Published<T>> {
        if let Some(cell) = self.get(symbol) {
            return cell;
        }

        self.cells
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(Published::new(T::default())))
            .clone()
    }

    /// All symbols seen so far
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.cells.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T: Clone + Default> Default for SymbolMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
