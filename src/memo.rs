use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use serde::Serialize;
use tracing::{debug, warn};

/// The `Memoized` struct caches the results of one pure derivation, keyed by its arguments.
///
/// Arguments are serialized to JSON to build the cache key, so any tuple of serializable values
/// can be used, including `()` for derivations without arguments. A hit hands out a shared
/// `Rc` to the stored value; a miss runs the computation, stores and returns it.
///
/// A cache belongs to exactly one read model and dies with it. The computation must depend only
/// on its arguments and on the event log snapshot the read model was built over.
pub struct Memoized<R> {
    name: &'static str,
    entries: RefCell<HashMap<String, Rc<R>>>,
}

impl<R> Memoized<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `args`, computing and storing it on a miss.
    pub fn get_or_compute<A>(&self, args: &A, compute: impl FnOnce() -> R) -> Rc<R>
    where
        A: Serialize + ?Sized,
    {
        let key = match serde_json::to_string(args) {
            Ok(key) => key,
            Err(err) => {
                warn!(cache = self.name, %err, "cannot build cache key, computing uncached");
                return Rc::new(compute());
            }
        };

        if let Some(hit) = self.entries.borrow().get(&key) {
            return Rc::clone(hit);
        }

        debug!(cache = self.name, %key, "cache miss");
        let value = Rc::new(compute());
        self.entries.borrow_mut().insert(key, Rc::clone(&value));
        value
    }

    /// Drops every cached entry.
    pub fn flush(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<R> fmt::Debug for Memoized<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name)
            .field("entries", &self.len())
            .finish()
    }
}
