mod entity;

pub use entity::{
    COIN_COUNT, COIN_SCALE, Coin, FIELD_HEIGHT, FIELD_WIDTH, FieldBounds, PLAYER_SCALE,
    PlayerState, SpriteKind,
};

use glam::Vec2;
use rand::Rng;

/// Authoritative per-process collection of coins plus the mirrored player.
///
/// The store itself is a plain struct; the owning session serializes all
/// access through a single mutex so that tick-side snapshots and
/// receive-side batch applies never interleave partially.
#[derive(Debug)]
pub struct EntityStore {
    coins: Vec<Coin>,
    player: PlayerState,
    bounds: FieldBounds,
}

impl EntityStore {
    /// Seed `coin_count` coins with ids 0..N-1, random positions inside the
    /// field and integer axis velocities in -3..=3.
    pub fn seed<R: Rng + ?Sized>(coin_count: u32, bounds: FieldBounds, rng: &mut R) -> Self {
        let coins = (0..coin_count)
            .map(|id| {
                let position = Vec2::new(
                    rng.random_range(0.0..bounds.width),
                    rng.random_range(0.0..bounds.height),
                );
                let velocity = Vec2::new(
                    rng.random_range(-3..=3) as f32,
                    rng.random_range(-3..=3) as f32,
                );
                Coin::new(id, position, velocity)
            })
            .collect();

        Self {
            coins,
            player: PlayerState::default(),
            bounds,
        }
    }

    /// Build a store from pre-made coins. Ids must already be unique and
    /// ascending; used by deterministic tests and tools.
    pub fn with_coins(coins: Vec<Coin>, bounds: FieldBounds) -> Self {
        debug_assert!(coins.windows(2).all(|w| w[0].id < w[1].id));
        Self {
            coins,
            player: PlayerState::default(),
            bounds,
        }
    }

    pub fn bounds(&self) -> FieldBounds {
        self.bounds
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn alive_count(&self) -> usize {
        self.coins.iter().filter(|c| c.alive).count()
    }

    pub fn alive_ids(&self) -> Vec<u32> {
        self.coins.iter().filter(|c| c.alive).map(|c| c.id).collect()
    }

    /// Point-in-time copy of every alive coin's position, in id order.
    pub fn snapshot_positions(&self) -> Vec<(u32, f32, f32)> {
        self.coins
            .iter()
            .filter(|c| c.alive)
            .map(|c| (c.id, c.position.x, c.position.y))
            .collect()
    }

    /// Merge a remote position batch: entries align positionally with the
    /// local alive-in-id-order list, each position becomes
    /// `remote + local velocity`, then boundary reflection runs.
    ///
    /// A `None` entry (malformed on the wire) leaves that coin untouched
    /// without shifting alignment. Surplus entries are dropped; a short
    /// batch leaves the tail untouched. Neither case is an error.
    pub fn apply_remote_batch(&mut self, updates: &[Option<(f32, f32)>]) {
        let bounds = self.bounds;
        let mut entries = updates.iter();
        for coin in self.coins.iter_mut().filter(|c| c.alive) {
            let Some(entry) = entries.next() else {
                break;
            };
            let Some((x, y)) = entry else {
                continue;
            };
            coin.position = Vec2::new(x + coin.velocity.x, y + coin.velocity.y);
            reflect(coin, bounds);
        }
    }

    /// Terminal removal. Returns false when the id was already dead or was
    /// never seeded; both are expected under racing removals.
    pub fn mark_removed(&mut self, id: u32) -> bool {
        match self.coins.iter_mut().find(|c| c.id == id) {
            Some(coin) if coin.alive => {
                coin.alive = false;
                true
            }
            Some(_) => false,
            None => {
                log::debug!("remove for unknown coin id {id}");
                false
            }
        }
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_position(&self) -> Vec2 {
        self.player.position
    }

    pub fn set_player_position(&mut self, x: f32, y: f32) {
        self.player.position = Vec2::new(x, y);
    }
}

/// Elastic bounce: one negation per breached axis, x and y evaluated
/// independently. Single-step overshoot past both edges is not corrected.
fn reflect(coin: &mut Coin, bounds: FieldBounds) {
    if coin.left() < 0.0 || coin.right() > bounds.width {
        coin.velocity.x = -coin.velocity.x;
    }
    if coin.bottom() < 0.0 || coin.top() > bounds.height {
        coin.velocity.y = -coin.velocity.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(coins: Vec<Coin>) -> EntityStore {
        EntityStore::with_coins(coins, FieldBounds::default())
    }

    fn coin(id: u32, x: f32, y: f32, vx: f32, vy: f32) -> Coin {
        Coin::new(id, Vec2::new(x, y), Vec2::new(vx, vy))
    }

    #[test]
    fn batch_adds_local_velocity() {
        let mut store = store_with(vec![coin(0, 10.0, 10.0, 2.0, -1.0)]);

        store.apply_remote_batch(&[Some((100.0, 200.0))]);

        let c = &store.coins()[0];
        assert_eq!(c.position, Vec2::new(102.0, 199.0));
    }

    #[test]
    fn reflection_flips_once_for_single_axis_breach() {
        let mut store = store_with(vec![coin(0, 400.0, 300.0, 2.0, 0.0)]);

        store.apply_remote_batch(&[Some((-1.0, 300.0))]);

        let c = &store.coins()[0];
        assert_eq!(c.velocity.x, -2.0);
        assert_eq!(c.velocity.y, 0.0);
    }

    #[test]
    fn reflection_handles_both_axes_independently() {
        let mut store = store_with(vec![coin(0, 400.0, 300.0, 3.0, 3.0)]);

        store.apply_remote_batch(&[Some((799.0, 599.0))]);

        let c = &store.coins()[0];
        assert_eq!(c.velocity, Vec2::new(-3.0, -3.0));
    }

    #[test]
    fn surplus_entries_are_dropped() {
        let mut store = store_with(vec![coin(0, 10.0, 10.0, 0.0, 0.0)]);

        store.apply_remote_batch(&[Some((20.0, 20.0)), Some((999.0, 999.0))]);

        assert_eq!(store.coins().len(), 1);
        assert_eq!(store.coins()[0].position, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn short_batch_leaves_tail_untouched() {
        let mut store = store_with(vec![
            coin(0, 10.0, 10.0, 0.0, 0.0),
            coin(1, 30.0, 30.0, 0.0, 0.0),
        ]);

        store.apply_remote_batch(&[Some((20.0, 20.0))]);

        assert_eq!(store.coins()[0].position, Vec2::new(20.0, 20.0));
        assert_eq!(store.coins()[1].position, Vec2::new(30.0, 30.0));
    }

    #[test]
    fn malformed_entry_skips_without_shifting_alignment() {
        let mut store = store_with(vec![
            coin(0, 10.0, 10.0, 0.0, 0.0),
            coin(1, 30.0, 30.0, 0.0, 0.0),
        ]);

        store.apply_remote_batch(&[None, Some((40.0, 40.0))]);

        assert_eq!(store.coins()[0].position, Vec2::new(10.0, 10.0));
        assert_eq!(store.coins()[1].position, Vec2::new(40.0, 40.0));
    }

    #[test]
    fn batch_aligns_with_alive_coins_only() {
        let mut store = store_with(vec![
            coin(0, 10.0, 10.0, 0.0, 0.0),
            coin(1, 20.0, 20.0, 0.0, 0.0),
            coin(2, 30.0, 30.0, 0.0, 0.0),
        ]);
        store.mark_removed(1);

        store.apply_remote_batch(&[Some((100.0, 100.0)), Some((200.0, 200.0))]);

        assert_eq!(store.coins()[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(store.coins()[1].position, Vec2::new(20.0, 20.0));
        assert_eq!(store.coins()[2].position, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn mark_removed_is_idempotent() {
        let mut store = store_with(vec![coin(0, 10.0, 10.0, 0.0, 0.0)]);

        assert!(store.mark_removed(0));
        let after_first = store.alive_ids();
        assert!(!store.mark_removed(0));
        assert_eq!(store.alive_ids(), after_first);
    }

    #[test]
    fn removing_unknown_id_is_a_noop() {
        let mut store = store_with(vec![coin(0, 10.0, 10.0, 0.0, 0.0)]);

        assert!(!store.mark_removed(99));
        assert_eq!(store.alive_count(), 1);
    }

    #[test]
    fn snapshot_excludes_dead_and_keeps_id_order() {
        let mut store = store_with(vec![
            coin(0, 1.0, 1.0, 0.0, 0.0),
            coin(1, 2.0, 2.0, 0.0, 0.0),
            coin(2, 3.0, 3.0, 0.0, 0.0),
        ]);
        store.mark_removed(1);

        let snapshot = store.snapshot_positions();
        let ids: Vec<u32> = snapshot.iter().map(|&(id, _, _)| id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn batch_never_creates_entities() {
        let mut store = store_with(vec![coin(0, 10.0, 10.0, 0.0, 0.0)]);

        for len in 0..4 {
            store.apply_remote_batch(&vec![Some((50.0, 50.0)); len]);
            assert_eq!(store.coins().len(), 1);
        }
    }

    #[test]
    fn seed_assigns_stable_ascending_ids() {
        let mut rng = rand::rng();
        let store = EntityStore::seed(50, FieldBounds::default(), &mut rng);

        assert_eq!(store.coins().len(), 50);
        for (i, c) in store.coins().iter().enumerate() {
            assert_eq!(c.id, i as u32);
            assert!(c.alive);
            assert!(c.position.x >= 0.0 && c.position.x < FIELD_WIDTH);
            assert!(c.velocity.x.abs() <= 3.0 && c.velocity.y.abs() <= 3.0);
        }
    }
}
