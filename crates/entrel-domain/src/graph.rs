//! Symmetric relation graph between persons
//!
//! An adjacency-set structure. Edges are only ever added or removed in pairs,
//! so `b ∈ relations(a) ⇔ a ∈ relations(b)` holds after every call.

use crate::entity::EntityId;
use crate::error::DomainError;
use std::collections::{BTreeSet, HashMap};

/// Adjacency sets for every known person
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    adjacency: HashMap<EntityId, BTreeSet<EntityId>>,
}

impl RelationGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person with no relations
    ///
    /// Returns `false` if the person was already in the graph.
    pub fn insert_node(&mut self, id: EntityId) -> bool {
        if self.adjacency.contains_key(&id) {
            return false;
        }
        self.adjacency.insert(id, BTreeSet::new());
        true
    }

    /// Whether the person is in the graph
    pub fn contains(&self, id: EntityId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Remove a person and every edge that touches them
    ///
    /// Returns the former neighbours, each of which no longer lists `id`.
    pub fn remove_node(&mut self, id: EntityId) -> Vec<EntityId> {
        let Some(neighbours) = self.adjacency.remove(&id) else {
            return Vec::new();
        };
        for other in &neighbours {
            if let Some(set) = self.adjacency.get_mut(other) {
                set.remove(&id);
            }
        }
        neighbours.into_iter().collect()
    }

    /// Relate two persons
    ///
    /// Returns `false` without changes if they are already related.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SelfRelation`] if `a == b`
    /// - [`DomainError::NotFound`] if either person is not in the graph
    pub fn establish(&mut self, a: EntityId, b: EntityId) -> Result<bool, DomainError> {
        self.check_pair(a, b)?;
        if self.is_related(a, b) {
            return Ok(false);
        }
        self.link(a, b);
        self.link(b, a);
        Ok(true)
    }

    /// Remove the relation between two persons
    ///
    /// Returns `false` without changes if they are not related.
    ///
    /// # Errors
    ///
    /// Same as [`RelationGraph::establish`].
    pub fn dissolve(&mut self, a: EntityId, b: EntityId) -> Result<bool, DomainError> {
        self.check_pair(a, b)?;
        if !self.is_related(a, b) {
            return Ok(false);
        }
        self.unlink(a, b);
        self.unlink(b, a);
        Ok(true)
    }

    /// Whether `a` and `b` are related
    pub fn is_related(&self, a: EntityId, b: EntityId) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|set| set.contains(&b))
    }

    /// Relations of one person
    pub fn relations_of(&self, id: EntityId) -> Option<&BTreeSet<EntityId>> {
        self.adjacency.get(&id)
    }

    /// Number of persons in the graph
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Iterate over every undirected edge once, smaller id first
    pub fn edges(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.adjacency.iter().flat_map(|(a, set)| {
            set.iter()
                .filter(move |b| a < *b)
                .map(move |b| (*a, *b))
        })
    }

    /// Check that every edge is mirrored and points at a known person
    pub fn verify_symmetry(&self) -> Result<(), DomainError> {
        for (a, set) in &self.adjacency {
            for b in set {
                if a == b {
                    return Err(DomainError::InvariantViolation(format!(
                        "person {a} is related to themselves"
                    )));
                }
                if !self.is_related(*b, *a) {
                    return Err(DomainError::InvariantViolation(format!(
                        "relation {a} -> {b} is not mirrored"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_pair(&self, a: EntityId, b: EntityId) -> Result<(), DomainError> {
        if a == b {
            return Err(DomainError::SelfRelation(a));
        }
        for id in [a, b] {
            if !self.contains(id) {
                return Err(DomainError::person_not_found(id));
            }
        }
        Ok(())
    }

    fn link(&mut self, from: EntityId, to: EntityId) {
        if let Some(set) = self.adjacency.get_mut(&from) {
            set.insert(to);
        }
    }

    fn unlink(&mut self, from: EntityId, to: EntityId) {
        if let Some(set) = self.adjacency.get_mut(&from) {
            set.remove(&to);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Establish(i64, i64),
        Dissolve(i64, i64),
        Remove(i64),
        Insert(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..6, 0i64..6).prop_map(|(a, b)| Op::Establish(a, b)),
            (0i64..6, 0i64..6).prop_map(|(a, b)| Op::Dissolve(a, b)),
            (0i64..6).prop_map(Op::Remove),
            (0i64..6).prop_map(Op::Insert),
        ]
    }

    proptest! {
        /// Property: relations stay symmetric under any sequence of edits
        #[test]
        fn test_symmetry_holds(ops in prop::collection::vec(op(), 0..60)) {
            let mut graph = RelationGraph::new();
            for id in 0..6 {
                graph.insert_node(EntityId::new(id));
            }

            for op in ops {
                match op {
                    Op::Establish(a, b) => { let _ = graph.establish(EntityId::new(a), EntityId::new(b)); }
                    Op::Dissolve(a, b) => { let _ = graph.dissolve(EntityId::new(a), EntityId::new(b)); }
                    Op::Remove(a) => { graph.remove_node(EntityId::new(a)); }
                    Op::Insert(a) => { graph.insert_node(EntityId::new(a)); }
                }
                prop_assert!(graph.verify_symmetry().is_ok());
            }
        }
    }
}
