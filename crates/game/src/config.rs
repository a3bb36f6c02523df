use crate::store::{COIN_COUNT, FieldBounds};

pub const MAX_COINS: u32 = 4096;
pub const MAX_TICK_RATE: u32 = 240;

/// Which shared entity a process owns. Either role may still enable local
/// collision detection; the roles only decide who seeds the coins and whose
/// pointer drives the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    Coins,
    Player,
}

impl PeerRole {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PeerRole::Coins),
            1 => Some(PeerRole::Player),
            _ => None,
        }
    }

    pub fn owns_pointer(self) -> bool {
        matches!(self, PeerRole::Player)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PeerRole::Coins => "coins",
            PeerRole::Player => "player",
        }
    }
}

/// Immutable per-process configuration, validated once at startup. A bad
/// config is fatal then and never afterwards.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub role: PeerRole,
    pub process_name: String,
    pub broker_addr: String,
    pub coin_count: u32,
    pub tick_rate: u32,
    pub bounds: FieldBounds,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("player index must be 0 or 1, got {0}")]
    InvalidPlayer(u8),
    #[error("coin count must be in 1..={MAX_COINS}, got {0}")]
    InvalidCoinCount(u32),
    #[error("tick rate must be in 1..={MAX_TICK_RATE}, got {0}")]
    InvalidTickRate(u32),
    #[error("broker address must not be empty")]
    EmptyBrokerAddr,
}

impl SessionConfig {
    pub fn new(
        role: PeerRole,
        process_name: impl Into<String>,
        broker_addr: impl Into<String>,
        coin_count: u32,
        tick_rate: u32,
    ) -> Result<Self, ConfigError> {
        let broker_addr = broker_addr.into();
        if broker_addr.is_empty() {
            return Err(ConfigError::EmptyBrokerAddr);
        }
        if coin_count == 0 || coin_count > MAX_COINS {
            return Err(ConfigError::InvalidCoinCount(coin_count));
        }
        if tick_rate == 0 || tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::InvalidTickRate(tick_rate));
        }

        Ok(Self {
            role,
            process_name: process_name.into(),
            broker_addr,
            coin_count,
            tick_rate,
            bounds: FieldBounds::default(),
        })
    }

    pub fn defaults_for(role: PeerRole) -> Self {
        Self {
            role,
            process_name: "tandem".to_string(),
            broker_addr: format!("127.0.0.1:{}", crate::net::DEFAULT_PORT),
            coin_count: COIN_COUNT,
            tick_rate: 60,
            bounds: FieldBounds::default(),
        }
    }
}
