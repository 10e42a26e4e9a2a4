use std::collections::{BTreeSet, HashMap};

use ordermap::OrderMap;

use crate::error::PosetError;
use crate::id::{ElementId, IdAllocator};

/// A partially ordered set over named elements.
///
/// The "less than or equal" relation is stored as its full transitive
/// closure, so `test` is a single set lookup and the cost of keeping the
/// closure correct is paid by `add` and `del`. Reflexive pairs are implied
/// and never stored.
#[derive(Debug)]
pub struct Poset {
    /// Stable order-of-appearance: name -> id
    ids: OrderMap<String, ElementId>,
    /// For each id, every id strictly above it
    relations: HashMap<ElementId, BTreeSet<ElementId>>,
    alloc: IdAllocator,
}

impl Default for Poset {
    fn default() -> Self {
        Self::new()
    }
}

impl Poset {
    pub fn new() -> Self {
        Self { ids: OrderMap::new(), relations: HashMap::new(), alloc: IdAllocator::sequential() }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Element names in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.keys().map(String::as_str)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, ElementId)> + '_ {
        self.ids.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Ids strictly above `id`.
    pub(crate) fn above(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.relations.get(&id).into_iter().flatten().copied()
    }

    /// Closure-aware `x <= y`.
    pub(crate) fn leq(&self, x: ElementId, y: ElementId) -> bool {
        x == y || self.relations.get(&x).is_some_and(|ups| ups.contains(&y))
    }

    fn lookup(&self, name: &str) -> Result<ElementId, PosetError> {
        validate(name)?;
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| PosetError::ElementNotFound(name.to_string()))
    }

    fn name_of(&self, id: ElementId) -> &str {
        self.entries()
            .find(|&(_, other)| other == id)
            .map_or("<unknown>", |(name, _)| name)
    }

    /// Adds a new element, comparable only to itself.
    pub fn insert(&mut self, name: &str) -> Result<ElementId, PosetError> {
        validate(name)?;
        if self.ids.contains_key(name) {
            return Err(PosetError::ElementExists(name.to_string()));
        }
        let relations = &self.relations;
        let id = ElementId(self.alloc.allocate(|c| relations.contains_key(&ElementId(c))));
        self.ids.insert(name.to_string(), id);
        self.relations.insert(id, BTreeSet::new());
        self.debug_audit();
        Ok(id)
    }

    /// Removes an element and every relation it takes part in.
    ///
    /// Pairs that were implied through the removed element stay recorded,
    /// since the closure already holds them explicitly.
    pub fn remove(&mut self, name: &str) -> Result<(), PosetError> {
        let id = self.lookup(name)?;
        self.ids.remove(name);
        self.relations.remove(&id);
        for ups in self.relations.values_mut() {
            ups.remove(&id);
        }
        self.debug_audit();
        Ok(())
    }

    /// Records `a <= b` and re-closes the relation.
    ///
    /// Rejected when the two elements are already comparable in either
    /// direction. Since the relation was closed before, it suffices to put
    /// every element at or below `a` under every element at or above `b`.
    pub fn add(&mut self, a: &str, b: &str) -> Result<(), PosetError> {
        let x = self.lookup(a)?;
        let y = self.lookup(b)?;
        if self.leq(x, y) || self.leq(y, x) {
            return Err(PosetError::AlreadyComparable(a.to_string(), b.to_string()));
        }

        let mut upper: Vec<ElementId> = self
            .relations
            .get(&y)
            .ok_or_else(|| PosetError::InvariantViolated(format!("no relation set for {b:?}")))?
            .iter()
            .copied()
            .collect();
        upper.push(y);

        let lower: Vec<ElementId> = self
            .relations
            .iter()
            .filter(|&(&p, ups)| p == x || ups.contains(&x))
            .map(|(&p, _)| p)
            .collect();

        for p in lower {
            if let Some(ups) = self.relations.get_mut(&p) {
                ups.extend(upper.iter().copied());
            }
        }
        self.debug_audit();
        Ok(())
    }

    /// Removes the recorded pair `a <= b`.
    ///
    /// Only allowed when no other element `m` sits between them, otherwise
    /// the pair would still follow from `a <= m <= b`.
    pub fn del(&mut self, a: &str, b: &str) -> Result<(), PosetError> {
        let x = self.lookup(a)?;
        let y = self.lookup(b)?;
        if x == y {
            return Err(PosetError::Reflexive(a.to_string()));
        }
        if !self.leq(x, y) {
            return Err(PosetError::RelationNotFound(a.to_string(), b.to_string()));
        }
        if let Some(m) = self.above(x).find(|&m| m != y && self.leq(m, y)) {
            return Err(PosetError::Deducible {
                lesser: a.to_string(),
                greater: b.to_string(),
                via: self.name_of(m).to_string(),
            });
        }

        let removed = self.relations.get_mut(&x).is_some_and(|ups| ups.remove(&y));
        if !removed {
            return Err(PosetError::InvariantViolated(format!(
                "relation ({a:?}, {b:?}) vanished while being deleted"
            )));
        }
        self.debug_audit();
        Ok(())
    }

    /// Whether `a <= b` holds. Unknown names are simply not related.
    pub fn test(&self, a: &str, b: &str) -> bool {
        match (self.lookup(a), self.lookup(b)) {
            (Ok(x), Ok(y)) => self.leq(x, y),
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.relations.clear();
        self.debug_audit();
    }

    /// Runs [`Poset::verify`] after a mutation in debug builds.
    fn debug_audit(&self) {
        debug_assert!(self.verify().is_ok(), "{:?}", self.verify());
    }

    /// Audits the stored representation.
    ///
    /// Checks that names and relation sets describe the same ids, that no
    /// set mentions a missing id or its own owner, and that the stored
    /// relation is antisymmetric and transitively closed.
    pub fn verify(&self) -> Result<(), PosetError> {
        let broken = |msg: String| Err(PosetError::InvariantViolated(msg));

        if self.ids.len() != self.relations.len() {
            return broken(format!(
                "{} names but {} relation sets",
                self.ids.len(),
                self.relations.len()
            ));
        }
        let mut seen = BTreeSet::new();
        for (name, id) in self.entries() {
            if !seen.insert(id) {
                return broken(format!("id {id:?} of {name:?} is shared"));
            }
            if !self.relations.contains_key(&id) {
                return broken(format!("{name:?} has no relation set"));
            }
        }

        for (&x, ups) in &self.relations {
            if ups.contains(&x) {
                return broken(format!("{:?} stores itself", self.name_of(x)));
            }
            for &y in ups {
                let Some(next) = self.relations.get(&y) else {
                    return broken(format!("dangling id {y:?} above {:?}", self.name_of(x)));
                };
                if next.contains(&x) {
                    return broken(format!(
                        "{:?} and {:?} form a cycle",
                        self.name_of(x),
                        self.name_of(y)
                    ));
                }
                if let Some(&z) = next.iter().find(|z| !ups.contains(z)) {
                    return broken(format!(
                        "{:?} <= {:?} <= {:?} is not closed",
                        self.name_of(x),
                        self.name_of(y),
                        self.name_of(z)
                    ));
                }
            }
        }
        Ok(())
    }
}

fn validate(name: &str) -> Result<(), PosetError> {
    if name.is_empty() {
        return Err(PosetError::InvalidName);
    }
    Ok(())
}
