pub mod collision;
pub mod config;
pub mod net;
pub mod store;
pub mod sync;

pub use config::{ConfigError, PeerRole, SessionConfig};
pub use net::{
    BusFrame, DEFAULT_PORT, Message, TOPIC_BUMP_SCORE, TOPIC_PLAYER_MOVE, TOPIC_REMOVE_COIN,
    TOPIC_UPDATE_COINS, TOPICS, WireError,
};
pub use store::{Coin, EntityStore, FieldBounds, PlayerState, SpriteKind};
pub use sync::{PointerButton, Renderable, Session};
