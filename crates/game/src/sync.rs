use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::Vec2;

use crate::collision;
use crate::config::SessionConfig;
use crate::net::Message;
use crate::store::{EntityStore, PlayerState, SpriteKind};

/// One drawable entity, handed to the presentation layer once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub position: Vec2,
    pub sprite: SpriteKind,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

#[derive(Debug)]
struct Shared {
    store: EntityStore,
    score: u64,
}

/// The synchronization protocol for one peer.
///
/// Both local activities feed it: the tick activity calls [`handle_tick`]
/// and the receive activity calls [`handle_message`], one inbound message
/// at a time. Everything either touches sits behind one mutex, and every
/// handler returns the messages to publish instead of publishing itself,
/// so the lock is never held across network I/O.
///
/// A detecting peer never mutates its own score or alive-set directly; it
/// only emits `remove_coin`/`bump_score` and applies them when the bus
/// loops them back, exactly like the other peer. Both peers therefore run
/// identical transitions from identical events.
///
/// [`handle_tick`]: Session::handle_tick
/// [`handle_message`]: Session::handle_message
pub struct Session {
    config: SessionConfig,
    shared: Mutex<Shared>,
    simulate: AtomicBool,
    detect_collisions: AtomicBool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let store = EntityStore::seed(config.coin_count, config.bounds, &mut rand::rng());
        Self::with_store(config, store)
    }

    pub fn with_store(config: SessionConfig, store: EntityStore) -> Self {
        Self {
            config,
            shared: Mutex::new(Shared { store, score: 0 }),
            simulate: AtomicBool::new(false),
            detect_collisions: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn simulation_enabled(&self) -> bool {
        self.simulate.load(Ordering::Relaxed)
    }

    pub fn collision_detection_enabled(&self) -> bool {
        self.detect_collisions.load(Ordering::Relaxed)
    }

    pub fn enable_simulation(&self) {
        if !self.simulate.swap(true, Ordering::Relaxed) {
            log::info!("{}: simulation enabled", self.config.process_name);
        }
    }

    pub fn enable_collision_detection(&self) {
        if !self.detect_collisions.swap(true, Ordering::Relaxed) {
            log::info!("{}: collision detection enabled", self.config.process_name);
        }
    }

    /// One simulation tick: when the gesture has happened and coins remain,
    /// snapshot the alive positions into an outbound batch.
    pub fn handle_tick(&self) -> Option<Message> {
        if !self.simulation_enabled() {
            return None;
        }

        let shared = self.lock();
        let snapshot = shared.store.snapshot_positions();
        if snapshot.is_empty() {
            return None;
        }

        Some(Message::UpdateCoins {
            updates: snapshot.into_iter().map(|(_, x, y)| Some((x, y))).collect(),
        })
    }

    /// Apply one inbound message and return whatever must be published in
    /// consequence. Only an `update_coins` batch on a detecting peer emits
    /// anything: one `remove_coin` plus one `bump_score` per hit coin.
    pub fn handle_message(&self, message: &Message) -> Vec<Message> {
        match message {
            Message::UpdateCoins { updates } => {
                let hits = {
                    let mut shared = self.lock();
                    shared.store.apply_remote_batch(updates);
                    if self.collision_detection_enabled() {
                        collision::detect(
                            shared.store.player_position(),
                            PlayerState::half_extent(),
                            shared.store.coins(),
                        )
                    } else {
                        Vec::new()
                    }
                };

                hits.into_iter()
                    .flat_map(|id| [Message::RemoveCoin { coin: id }, Message::BumpScore { bump: 1 }])
                    .collect()
            }
            Message::PlayerMove { x, y } => {
                self.lock().store.set_player_position(*x, *y);
                Vec::new()
            }
            Message::RemoveCoin { coin } => {
                if !self.lock().store.mark_removed(*coin) {
                    log::debug!("{}: stale remove for coin {coin}", self.config.process_name);
                }
                Vec::new()
            }
            Message::BumpScore { bump } => {
                let mut shared = self.lock();
                shared.score += bump;
                Vec::new()
            }
        }
    }

    /// Pointer motion from the presentation layer. Only the player-owning
    /// peer broadcasts it; the local player sprite moves when the bus loops
    /// the message back, the same path the remote peer takes.
    pub fn pointer_moved(&self, x: f32, y: f32) -> Option<Message> {
        self.config
            .role
            .owns_pointer()
            .then_some(Message::PlayerMove { x, y })
    }

    /// Left press starts the coins, right press arms local collision
    /// detection. Both are peer-local latches; neither is negotiated.
    pub fn pointer_pressed(&self, button: PointerButton) {
        match button {
            PointerButton::Left => self.enable_simulation(),
            PointerButton::Right => self.enable_collision_detection(),
        }
    }

    pub fn score(&self) -> u64 {
        self.lock().score
    }

    pub fn alive_count(&self) -> usize {
        self.lock().store.alive_count()
    }

    pub fn alive_ids(&self) -> Vec<u32> {
        self.lock().store.alive_ids()
    }

    pub fn snapshot_positions(&self) -> Vec<(u32, f32, f32)> {
        self.lock().store.snapshot_positions()
    }

    pub fn player_position(&self) -> Vec2 {
        self.lock().store.player_position()
    }

    /// Everything the presentation layer draws this frame: the player plus
    /// every alive coin.
    pub fn renderables(&self) -> Vec<Renderable> {
        let shared = self.lock();
        let mut out = Vec::with_capacity(shared.store.alive_count() + 1);
        out.push(Renderable {
            position: shared.store.player_position(),
            sprite: SpriteKind::Player,
            alive: true,
        });
        out.extend(shared.store.coins().iter().filter(|c| c.alive).map(|c| Renderable {
            position: c.position,
            sprite: SpriteKind::Coin,
            alive: c.alive,
        }));
        out
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
