use glam::Vec2;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const COIN_COUNT: u32 = 50;

pub const COIN_SCALE: f32 = 0.2;
pub const PLAYER_SCALE: f32 = 0.5;

// Source sprites are 128px square; half-extents follow from the fixed scale.
const SPRITE_SIZE: f32 = 128.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Coin,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub alive: bool,
}

impl Coin {
    pub fn new(id: u32, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
            alive: true,
        }
    }

    pub fn half_extent() -> f32 {
        SPRITE_SIZE * COIN_SCALE / 2.0
    }

    pub fn left(&self) -> f32 {
        self.position.x - Self::half_extent()
    }

    pub fn right(&self) -> f32 {
        self.position.x + Self::half_extent()
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - Self::half_extent()
    }

    pub fn top(&self) -> f32 {
        self.position.y + Self::half_extent()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec2,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec2::new(50.0, 50.0),
        }
    }
}

impl PlayerState {
    pub fn half_extent() -> f32 {
        SPRITE_SIZE * PLAYER_SCALE / 2.0
    }
}
