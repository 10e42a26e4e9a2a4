use std::collections::HashMap;

use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::PosetError;
use crate::id::{IdAllocator, PosetHandle};
use crate::poset::Poset;

/// Owns every live poset, keyed by handle.
///
/// Every operation first resolves the handle and reports
/// [`PosetError::PosetNotFound`] when nothing lives under it.
#[derive(Debug)]
pub struct Registry {
    posets: HashMap<PosetHandle, Poset>,
    alloc: IdAllocator,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            posets: HashMap::new(),
            alloc: IdAllocator::bounded(&config.handles, config.max_handle),
        }
    }

    /// Number of live posets.
    pub fn len(&self) -> usize {
        self.posets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posets.is_empty()
    }

    pub fn contains(&self, handle: PosetHandle) -> bool {
        self.posets.contains_key(&handle)
    }

    /// Live handles, smallest first.
    pub fn handles(&self) -> Vec<PosetHandle> {
        let mut out: Vec<_> = self.posets.keys().copied().collect();
        out.sort_unstable();
        out
    }

    pub fn get(&self, handle: PosetHandle) -> Option<&Poset> {
        self.posets.get(&handle)
    }

    /// Stores a new empty poset under a handle no live poset uses.
    pub fn create(&mut self) -> PosetHandle {
        let posets = &self.posets;
        let handle = PosetHandle(self.alloc.allocate(|c| posets.contains_key(&PosetHandle(c))));
        self.posets.insert(handle, Poset::new());
        debug!(%handle, "poset created");
        handle
    }

    pub fn destroy(&mut self, handle: PosetHandle) -> Result<(), PosetError> {
        let result = match self.posets.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(PosetError::PosetNotFound(handle)),
        };
        report("destroy", handle, &result);
        result
    }

    /// Element count, or 0 for an unknown handle.
    pub fn size(&self, handle: PosetHandle) -> usize {
        let size = self.with_poset(handle, Poset::len);
        report("size", handle, &size);
        size.unwrap_or(0)
    }

    pub fn with_poset<R>(
        &self,
        handle: PosetHandle,
        op: impl FnOnce(&Poset) -> R,
    ) -> Result<R, PosetError> {
        self.posets.get(&handle).map(op).ok_or(PosetError::PosetNotFound(handle))
    }

    pub fn with_poset_mut<R>(
        &mut self,
        handle: PosetHandle,
        op: impl FnOnce(&mut Poset) -> Result<R, PosetError>,
    ) -> Result<R, PosetError> {
        let poset = self.posets.get_mut(&handle).ok_or(PosetError::PosetNotFound(handle))?;
        op(poset)
    }

    pub fn insert(&mut self, handle: PosetHandle, name: &str) -> Result<(), PosetError> {
        let result = self.with_poset_mut(handle, |p| p.insert(name).map(|_| ()));
        debug!(%handle, name, outcome = %outcome(&result), "insert");
        result
    }

    pub fn remove(&mut self, handle: PosetHandle, name: &str) -> Result<(), PosetError> {
        let result = self.with_poset_mut(handle, |p| p.remove(name));
        debug!(%handle, name, outcome = %outcome(&result), "remove");
        result
    }

    pub fn add(
        &mut self,
        handle: PosetHandle,
        lesser: &str,
        greater: &str,
    ) -> Result<(), PosetError> {
        let result = self.with_poset_mut(handle, |p| p.add(lesser, greater));
        debug!(%handle, lesser, greater, outcome = %outcome(&result), "add");
        result
    }

    pub fn del(
        &mut self,
        handle: PosetHandle,
        lesser: &str,
        greater: &str,
    ) -> Result<(), PosetError> {
        let result = self.with_poset_mut(handle, |p| p.del(lesser, greater));
        debug!(%handle, lesser, greater, outcome = %outcome(&result), "del");
        result
    }

    /// Whether `lesser <= greater` holds in the addressed poset. Any missing
    /// input answers `false`.
    pub fn test(&self, handle: PosetHandle, lesser: &str, greater: &str) -> bool {
        let result = self.with_poset(handle, |p| p.test(lesser, greater));
        debug!(%handle, lesser, greater, outcome = %outcome(&result), "test");
        result.unwrap_or(false)
    }

    pub fn clear(&mut self, handle: PosetHandle) -> Result<(), PosetError> {
        let result = self.with_poset_mut(handle, |p| {
            p.clear();
            Ok(())
        });
        report("clear", handle, &result);
        result
    }
}

fn outcome<R: std::fmt::Debug>(result: &Result<R, PosetError>) -> String {
    match result {
        Ok(v) => format!("{v:?}"),
        Err(e) => e.to_string(),
    }
}

fn report<R: std::fmt::Debug>(
    op: &'static str,
    handle: PosetHandle,
    result: &Result<R, PosetError>,
) {
    debug!(%handle, outcome = %outcome(result), "{}", op);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdStrategy;

    fn sequential() -> Registry {
        Registry::with_config(&RegistryConfig {
            handles: IdStrategy::Sequential,
            ..RegistryConfig::default()
        })
    }

    #[test]
    fn handles_are_unique_among_live_posets() {
        let mut reg = Registry::new();
        let a = reg.create();
        let b = reg.create();
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn sequential_handles_may_be_reused_after_destroy() {
        let mut reg = sequential();
        let a = reg.create();
        let b = reg.create();
        assert_eq!((a, b), (PosetHandle(0), PosetHandle(1)));
        reg.destroy(a).unwrap();
        assert_eq!(reg.handles(), vec![b]);
        assert!(!reg.contains(a));
    }

    #[test]
    fn unknown_handle_is_not_found() {
        let mut reg = sequential();
        let ghost = PosetHandle(77);
        assert_eq!(reg.destroy(ghost), Err(PosetError::PosetNotFound(ghost)));
        assert_eq!(reg.insert(ghost, "a"), Err(PosetError::PosetNotFound(ghost)));
        assert_eq!(reg.add(ghost, "a", "b"), Err(PosetError::PosetNotFound(ghost)));
        assert_eq!(reg.clear(ghost), Err(PosetError::PosetNotFound(ghost)));
        assert_eq!(reg.size(ghost), 0);
        assert!(!reg.test(ghost, "a", "a"));
    }

    #[test]
    fn operations_route_to_the_addressed_poset() {
        let mut reg = sequential();
        let p = reg.create();
        let q = reg.create();
        reg.insert(p, "a").unwrap();
        reg.insert(p, "b").unwrap();
        reg.insert(q, "a").unwrap();
        reg.add(p, "a", "b").unwrap();

        assert_eq!(reg.size(p), 2);
        assert_eq!(reg.size(q), 1);
        assert!(reg.test(p, "a", "b"));
        assert!(!reg.test(q, "a", "b"));
        assert_eq!(reg.with_poset(q, |poset| poset.contains("b")), Ok(false));
    }

    #[test]
    fn handles_respect_the_configured_limit() {
        let mut reg = Registry::with_config(&RegistryConfig {
            handles: IdStrategy::Random { seed: Some(11) },
            max_handle: 7,
        });
        let handles: Vec<_> = (0..8).map(|_| reg.create()).collect();
        assert!(handles.iter().all(|h| h.0 <= 7));
        assert_eq!(reg.len(), 8);
    }

    #[test]
    fn clear_keeps_the_poset_alive() {
        let mut reg = sequential();
        let p = reg.create();
        reg.insert(p, "a").unwrap();
        reg.clear(p).unwrap();
        assert_eq!(reg.size(p), 0);
        assert!(reg.contains(p));
        assert!(reg.insert(p, "a").is_ok());
    }
}
