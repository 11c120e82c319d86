//! Mode-private persistent data carried inside a [`SyncState`](crate::SyncState).
//!
//! Each mode that needs memory across frames owns one [`ModeDataKind`]. The block lives in the
//! collection only while its mode is active: it is absent before the mode's first tick and is
//! removed by the state machine when the mode is left.

use crate::types::EntityId;
use std::collections::BTreeMap;

/// Key of a mode data block. The numeric values are part of the wire format.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModeDataKind {
    PathFollow = 1,
}

impl ModeDataKind {
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(ModeDataKind::PathFollow),
            _ => None,
        }
    }
}

/// Cross-frame state of a line traversal.
///
/// `line` is a weak reference: it is resolved through the world on every tick and may fail to
/// resolve (line despawned, id not known on this peer), in which case the traversal is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathFollowState {
    pub line: EntityId,
    /// true: travelling from the line's start point to its end point.
    pub moving_forward: bool,
}

impl PathFollowState {
    pub fn new(line: EntityId, moving_forward: bool) -> Self {
        Self {
            line,
            moving_forward,
        }
    }

    /// A client must roll back when it latched onto a different line or travels the other way.
    ///
    /// Position and velocity are deliberately not part of this comparison.
    pub fn should_reconcile(&self, authority: &PathFollowState) -> bool {
        self.line != authority.line || self.moving_forward != authority.moving_forward
    }

    /// Both fields are discrete, so they snap to the target snapshot.
    pub fn interpolate(_from: &PathFollowState, to: &PathFollowState, _pct: f32) -> PathFollowState {
        *to
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModeDataBlock {
    PathFollow(PathFollowState),
}

impl ModeDataBlock {
    pub fn kind(&self) -> ModeDataKind {
        match self {
            ModeDataBlock::PathFollow(_) => ModeDataKind::PathFollow,
        }
    }

    pub fn should_reconcile(&self, authority: &ModeDataBlock) -> bool {
        match (self, authority) {
            (ModeDataBlock::PathFollow(a), ModeDataBlock::PathFollow(b)) => a.should_reconcile(b),
        }
    }

    pub fn interpolate(from: &ModeDataBlock, to: &ModeDataBlock, pct: f32) -> ModeDataBlock {
        match (from, to) {
            (ModeDataBlock::PathFollow(a), ModeDataBlock::PathFollow(b)) => {
                ModeDataBlock::PathFollow(PathFollowState::interpolate(a, b, pct))
            }
        }
    }
}

/// Type-keyed bag of mode data blocks, iterated in key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModeDataCollection {
    blocks: BTreeMap<ModeDataKind, ModeDataBlock>,
}

impl ModeDataCollection {
    pub fn get(&self, kind: ModeDataKind) -> Option<&ModeDataBlock> {
        self.blocks.get(&kind)
    }

    /// Insert or replace the block of the same kind.
    pub fn insert(&mut self, block: ModeDataBlock) {
        self.blocks.insert(block.kind(), block);
    }

    pub fn remove(&mut self, kind: ModeDataKind) -> Option<ModeDataBlock> {
        self.blocks.remove(&kind)
    }

    pub fn contains(&self, kind: ModeDataKind) -> bool {
        self.blocks.contains_key(&kind)
    }

    pub fn path_follow(&self) -> Option<&PathFollowState> {
        match self.blocks.get(&ModeDataKind::PathFollow) {
            Some(ModeDataBlock::PathFollow(state)) => Some(state),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModeDataBlock> {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True if any block is missing on one side or disagrees with its authority counterpart.
    pub fn should_reconcile(&self, authority: &ModeDataCollection) -> bool {
        if self.blocks.len() != authority.blocks.len() {
            return true;
        }

        self.blocks.iter().any(|(kind, block)| match authority.blocks.get(kind) {
            Some(auth) => block.should_reconcile(auth),
            None => true,
        })
    }

    /// Blocks follow the `to` snapshot; shared kinds are blended block by block.
    pub fn interpolate(from: &ModeDataCollection, to: &ModeDataCollection, pct: f32) -> Self {
        let blocks = to
            .blocks
            .iter()
            .map(|(kind, to_block)| {
                let block = match from.blocks.get(kind) {
                    Some(from_block) => ModeDataBlock::interpolate(from_block, to_block, pct),
                    None => to_block.clone(),
                };
                (*kind, block)
            })
            .collect();

        Self { blocks }
    }
}

impl FromIterator<ModeDataBlock> for ModeDataCollection {
    fn from_iter<I: IntoIterator<Item = ModeDataBlock>>(iter: I) -> Self {
        let mut collection = Self::default();
        for block in iter {
            collection.insert(block);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(line: u64, forward: bool) -> ModeDataBlock {
        ModeDataBlock::PathFollow(PathFollowState::new(EntityId(line), forward))
    }

    #[test]
    fn path_follow_reconciles_on_line_or_direction_only() {
        let base = PathFollowState::new(EntityId(7), true);

        assert!(!base.should_reconcile(&PathFollowState::new(EntityId(7), true)));
        assert!(base.should_reconcile(&PathFollowState::new(EntityId(8), true)));
        assert!(base.should_reconcile(&PathFollowState::new(EntityId(7), false)));
        assert!(base.should_reconcile(&PathFollowState::new(EntityId(8), false)));
    }

    #[test]
    fn collection_reconciles_when_a_block_is_missing() {
        let with: ModeDataCollection = [block(1, true)].into_iter().collect();
        let without = ModeDataCollection::default();

        assert!(with.should_reconcile(&without));
        assert!(without.should_reconcile(&with));
        assert!(!with.should_reconcile(&with.clone()));
    }

    #[test]
    fn insert_replaces_block_of_same_kind() {
        let mut collection = ModeDataCollection::default();
        collection.insert(block(1, true));
        collection.insert(block(2, false));

        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.path_follow(),
            Some(&PathFollowState::new(EntityId(2), false))
        );
    }

    #[test]
    fn interpolation_snaps_to_target_blocks() {
        let from: ModeDataCollection = [block(1, true)].into_iter().collect();
        let to: ModeDataCollection = [block(2, false)].into_iter().collect();

        let mid = ModeDataCollection::interpolate(&from, &to, 0.25);
        assert_eq!(mid, to);

        let dropped = ModeDataCollection::interpolate(&from, &ModeDataCollection::default(), 0.5);
        assert!(dropped.is_empty());
    }

    #[test]
    fn kind_tags_round_trip() {
        assert_eq!(
            ModeDataKind::from_tag(ModeDataKind::PathFollow.tag()),
            Some(ModeDataKind::PathFollow)
        );
        assert_eq!(ModeDataKind::from_tag(0), None);
    }
}
