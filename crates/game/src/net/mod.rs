mod frame;
mod message;

pub use frame::BusFrame;
pub use message::{Message, WireError};

pub const DEFAULT_PORT: u16 = 43690;

pub const TOPIC_UPDATE_COINS: &str = "update_coins";
pub const TOPIC_PLAYER_MOVE: &str = "p1_move";
pub const TOPIC_REMOVE_COIN: &str = "remove_coin";
pub const TOPIC_BUMP_SCORE: &str = "bump_score";

/// Every topic a peer subscribes to. Each peer receives its own published
/// messages back through the bus; the session relies on that loop-back.
pub const TOPICS: [&str; 4] = [
    TOPIC_UPDATE_COINS,
    TOPIC_PLAYER_MOVE,
    TOPIC_REMOVE_COIN,
    TOPIC_BUMP_SCORE,
];
