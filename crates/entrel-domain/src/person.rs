//! Person records

use crate::entity::EntityId;
use serde::Serialize;
use std::collections::BTreeSet;

/// A person and the ids of everyone they are related to
///
/// The relation set is a read-only view of the [`RelationGraph`](crate::RelationGraph)
/// at the time the record was read. It can only change through the graph's
/// edge API, which keeps both endpoints in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    id: EntityId,
    name: String,
    #[serde(rename = "myRelations")]
    relations: BTreeSet<EntityId>,
}

impl Person {
    /// Create a person with no relations
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            relations: BTreeSet::new(),
        }
    }

    /// Build a person record from a name and the graph's view of their relations
    pub fn with_relations(
        id: EntityId,
        name: impl Into<String>,
        relations: BTreeSet<EntityId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            relations,
        }
    }

    /// Person id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ids of related persons
    pub fn relations(&self) -> &BTreeSet<EntityId> {
        &self.relations
    }

    /// Whether this person is related to `other`
    pub fn is_related_to(&self, other: EntityId) -> bool {
        self.relations.contains(&other)
    }
}

/// Outcome of a relation edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationChange {
    /// `false` when the edge was already in the requested state
    pub changed: bool,
    /// Both persons as they are right after the edit
    pub persons: [Person; 2],
}
