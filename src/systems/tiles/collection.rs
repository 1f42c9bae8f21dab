use std::collections::VecDeque;

use log::debug;

use super::kinematics::{tick_tile, TileTickContext};
use super::text_fit::TextMeasurer;
use super::tile::{Tile, TileId, TileState};

/// Size policy for the active set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileLimit {
    /// Bounded only by tile lifetime
    Unbounded,
    /// At most this many tiles; the oldest is evicted to make room
    Capped(usize),
}

impl From<Option<u32>> for TileLimit {
    fn from(max_tiles: Option<u32>) -> Self {
        match max_tiles {
            Some(max) => TileLimit::Capped(max.max(1) as usize),
            None => TileLimit::Unbounded,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileTickSummary {
    pub removed: u32,
    pub fits_deferred: u32,
}

/// Active tiles, newest first.
///
/// Every tile that leaves the set (lifetime, fade, eviction, clear) has its
/// id queued exactly once for `take_removed`.
pub struct TileCollection {
    tiles: VecDeque<Tile>,
    limit: TileLimit,
    last_id: Option<TileId>,
    removed: Vec<TileId>,
    spawned_total: u64,
    removed_total: u64,
}

impl TileCollection {
    pub fn new(limit: TileLimit) -> Self {
        Self {
            tiles: VecDeque::new(),
            limit,
            last_id: None,
            removed: Vec::new(),
            spawned_total: 0,
            removed_total: 0,
        }
    }

    /// Id for a tile created at `wall_ms`, strictly greater than any before.
    pub fn next_id(&mut self, wall_ms: f64) -> TileId {
        let candidate = if wall_ms.is_finite() { wall_ms.floor() as TileId } else { 0 };
        let id = match self.last_id {
            Some(last) if candidate <= last => last + 1,
            _ => candidate,
        };
        self.last_id = Some(id);
        id
    }

    pub fn limit(&self) -> TileLimit {
        self.limit
    }

    /// Change the policy; a lower cap evicts the oldest tiles right away.
    pub fn set_limit(&mut self, limit: TileLimit, measurer: &mut dyn TextMeasurer) {
        self.limit = limit;
        self.enforce_limit(measurer);
    }

    /// Add a freshly spawned tile at the front. Returns how many were evicted.
    pub fn insert(&mut self, tile: Tile, measurer: &mut dyn TextMeasurer) -> usize {
        debug_assert!(self.tiles.iter().all(|t| t.id != tile.id), "duplicate tile id");
        self.tiles.push_front(tile);
        self.spawned_total += 1;
        self.enforce_limit(measurer)
    }

    fn enforce_limit(&mut self, measurer: &mut dyn TextMeasurer) -> usize {
        let TileLimit::Capped(max) = self.limit else {
            return 0;
        };
        let mut evicted = 0;
        while self.tiles.len() > max {
            if let Some(mut oldest) = self.tiles.pop_back() {
                debug!("evicting tile {} (cap {})", oldest.id, max);
                oldest.advance_to(TileState::Removed);
                self.retire(oldest, measurer);
                evicted += 1;
            }
        }
        evicted
    }

    /// Tick every tile and drop the ones that reached Removed.
    pub fn tick_all(
        &mut self,
        ctx: &TileTickContext<'_>,
        measurer: &mut dyn TextMeasurer,
    ) -> TileTickSummary {
        let mut summary = TileTickSummary::default();
        for tile in self.tiles.iter_mut() {
            let result = tick_tile(tile, ctx, measurer);
            if result.fit_deferred {
                summary.fits_deferred += 1;
            }
        }

        if self.tiles.iter().any(Tile::is_removed) {
            let (done, live): (VecDeque<Tile>, VecDeque<Tile>) =
                self.tiles.drain(..).partition(Tile::is_removed);
            self.tiles = live;
            for tile in done.into_iter().rev() {
                self.retire(tile, measurer);
                summary.removed += 1;
            }
        }
        summary
    }

    /// Remove every tile. Returns how many there were.
    pub fn clear(&mut self, measurer: &mut dyn TextMeasurer) -> usize {
        let count = self.tiles.len();
        while let Some(mut tile) = self.tiles.pop_front() {
            tile.advance_to(TileState::Removed);
            self.retire(tile, measurer);
        }
        count
    }

    fn retire(&mut self, tile: Tile, measurer: &mut dyn TextMeasurer) {
        if !self.tiles.iter().any(|t| t.label == tile.label) {
            measurer.forget(&tile.label);
        }
        self.removed.push(tile.id);
        self.removed_total += 1;
    }

    /// Ids removed since the last call, oldest removal first.
    pub fn take_removed(&mut self) -> Vec<TileId> {
        std::mem::take(&mut self.removed)
    }

    pub fn has_pending_removals(&self) -> bool {
        !self.removed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    pub fn newest(&self) -> Option<&Tile> {
        self.tiles.front()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Transform, Vec3, ViewportMetrics};
    use crate::domain::TileConfig;
    use crate::systems::rigid_body::{BodyDesc, PhysicsBackend};
    use crate::systems::rigid_body_system::RigidBodySystem;
    use crate::systems::tiles::{HostTextMeasurer, TextBounds};

    fn make_tile(system: &mut RigidBodySystem, id: TileId, label: &str, spawn_time: f64) -> Tile {
        let desc = BodyDesc {
            mass: 0.1,
            transform: Transform::new(Vec3::new(0.0, 5.0, 0.0), 0.0),
            linear_damping: 0.95,
            angular_damping: 0.5,
            friction: 0.5,
            restitution: 0.0,
        };
        Tile::new(id, label.to_string(), spawn_time, system.create_body(&desc), 5.0)
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut tiles = TileCollection::new(TileLimit::Unbounded);
        assert_eq!(tiles.next_id(1000.4), 1000);
        assert_eq!(tiles.next_id(1000.9), 1001);
        assert_eq!(tiles.next_id(999.0), 1002);
        assert_eq!(tiles.next_id(5000.0), 5000);
    }

    #[test]
    fn cap_evicts_oldest_and_reports_it() {
        let mut system = RigidBodySystem::default();
        let mut measurer = HostTextMeasurer::new();
        let mut tiles = TileCollection::new(TileLimit::from(Some(2)));
        for id in 1..=3 {
            tiles.insert(make_tile(&mut system, id, "A", 0.0), &mut measurer);
        }
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles.newest().map(|t| t.id), Some(3));
        assert!(tiles.get(1).is_none());
        assert_eq!(tiles.take_removed(), vec![1]);
        assert!(tiles.take_removed().is_empty());
    }

    #[test]
    fn lowering_the_cap_evicts_immediately() {
        let mut system = RigidBodySystem::default();
        let mut measurer = HostTextMeasurer::new();
        let mut tiles = TileCollection::new(TileLimit::Unbounded);
        for id in 1..=5 {
            tiles.insert(make_tile(&mut system, id, "A", 0.0), &mut measurer);
        }
        tiles.set_limit(TileLimit::Capped(2), &mut measurer);
        assert_eq!(tiles.iter().map(|t| t.id).collect::<Vec<_>>(), vec![5, 4]);
        assert_eq!(tiles.take_removed(), vec![1, 2, 3]);
    }

    #[test]
    fn expired_tiles_are_removed_once() {
        let mut system = RigidBodySystem::default();
        let mut measurer = HostTextMeasurer::new();
        let mut tiles = TileCollection::new(TileLimit::Unbounded);
        tiles.insert(make_tile(&mut system, 1, "OLD", 0.0), &mut measurer);
        tiles.insert(make_tile(&mut system, 2, "NEW", 15.0), &mut measurer);
        measurer.report("OLD", TextBounds::new(4.0, 1.0));

        let config = TileConfig::default();
        let ctx = TileTickContext {
            config: &config,
            viewport: ViewportMetrics::new(16.0, 9.0),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            clock: 20.0,
            dt: 1.0 / 60.0,
        };
        let summary = tiles.tick_all(&ctx, &mut measurer);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.fits_deferred, 1);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles.take_removed(), vec![1]);
        assert!(measurer.measure("OLD").is_none());

        let summary = tiles.tick_all(&ctx, &mut measurer);
        assert_eq!(summary.removed, 0);
        assert!(tiles.take_removed().is_empty());
    }

    #[test]
    fn clear_reports_every_tile() {
        let mut system = RigidBodySystem::default();
        let mut measurer = HostTextMeasurer::new();
        let mut tiles = TileCollection::new(TileLimit::Unbounded);
        for id in 1..=3 {
            tiles.insert(make_tile(&mut system, id, "A", 0.0), &mut measurer);
        }
        assert_eq!(tiles.clear(&mut measurer), 3);
        assert!(tiles.is_empty());
        assert_eq!(tiles.take_removed(), vec![3, 2, 1]);
        assert_eq!(tiles.removed_total(), 3);
        assert_eq!(tiles.spawned_total(), 3);
    }
}
