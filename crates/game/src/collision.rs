use glam::Vec2;

use crate::store::Coin;

/// Axis-aligned overlap test between the player's bounds and every alive
/// coin. Pure over its inputs; the caller decides whether detection is
/// enabled at all.
pub fn detect(player_pos: Vec2, player_half: f32, coins: &[Coin]) -> Vec<u32> {
    coins
        .iter()
        .filter(|c| c.alive)
        .filter(|c| overlaps(player_pos, player_half, c.position, Coin::half_extent()))
        .map(|c| c.id)
        .collect()
}

fn overlaps(a: Vec2, a_half: f32, b: Vec2, b_half: f32) -> bool {
    let reach = a_half + b_half;
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}
