use crate::types::EntityId;
use std::{collections::BTreeMap, fmt};

/// Compact per-connection object id used on the wire instead of an [`EntityId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetId(pub u32);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Two-way lookup between local entities and wire ids.
///
/// A miss in either direction is normal (the other side never heard of the entity, or it has
/// been despawned) and callers treat it as "no reference".
pub trait EntityNetMap {
    fn net_id(&self, entity: EntityId) -> Option<NetId>;
    fn entity(&self, net_id: NetId) -> Option<EntityId>;
}

/// Shared object-id table. The host assigns ids; peers mirror them with [`NetIdTable::bind`].
#[derive(Clone, Debug, Default)]
pub struct NetIdTable {
    next: u32,
    by_entity: BTreeMap<EntityId, NetId>,
    by_net_id: BTreeMap<NetId, EntityId>,
}

impl NetIdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `entity`, allocating a fresh one the first time.
    pub fn assign(&mut self, entity: EntityId) -> NetId {
        if let Some(existing) = self.by_entity.get(&entity) {
            return *existing;
        }

        // Skip ids still held by a bind.
        while self.by_net_id.contains_key(&NetId(self.next)) {
            self.next = self.next.wrapping_add(1);
        }
        let net_id = NetId(self.next);
        self.next = self.next.wrapping_add(1);
        self.bind(entity, net_id);
        net_id
    }

    /// Record a mapping decided elsewhere, replacing stale mappings on either side.
    pub fn bind(&mut self, entity: EntityId, net_id: NetId) {
        if let Some(old) = self.by_entity.insert(entity, net_id) {
            self.by_net_id.remove(&old);
        }
        if let Some(old) = self.by_net_id.insert(net_id, entity) {
            if old != entity {
                self.by_entity.remove(&old);
            }
        }
    }

    pub fn release(&mut self, entity: EntityId) -> Option<NetId> {
        let net_id = self.by_entity.remove(&entity)?;
        self.by_net_id.remove(&net_id);
        Some(net_id)
    }

    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }
}

impl EntityNetMap for NetIdTable {
    fn net_id(&self, entity: EntityId) -> Option<NetId> {
        self.by_entity.get(&entity).copied()
    }

    fn entity(&self, net_id: NetId) -> Option<EntityId> {
        self.by_net_id.get(&net_id).copied()
    }
}
