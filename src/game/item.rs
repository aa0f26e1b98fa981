//! Pickups
//!
//! Items come from two places: the stage's item layer (spawned once when
//! the stage starts) and enemy loot rolls. They fall under gravity, rest on
//! platforms and are collected on contact with the player.

use rand::Rng;

use super::animation::{AnimationSet, Animator, Frame};
use super::body::Body;
use super::collision::Collider;
use super::event::Sound;
use crate::math::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    RedBonus,
    BlueBonus,
    ExtraLife,
    SmallEnergy,
    LargeEnergy,
}

/// What collecting an item does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEffect {
    Score(u32),
    Life,
    Energy(i32),
}

impl ItemKind {
    /// Map a layer type tag to an item
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "redbonus" => Some(ItemKind::RedBonus),
            "bluebonus" => Some(ItemKind::BlueBonus),
            "extralife" => Some(ItemKind::ExtraLife),
            "smallenergy" | "small_energy" => Some(ItemKind::SmallEnergy),
            "largeenergy" | "large_energy" => Some(ItemKind::LargeEnergy),
            _ => None,
        }
    }

    pub fn effect(self) -> ItemEffect {
        match self {
            ItemKind::RedBonus => ItemEffect::Score(500),
            ItemKind::BlueBonus => ItemEffect::Score(1000),
            ItemKind::ExtraLife => ItemEffect::Life,
            ItemKind::SmallEnergy => ItemEffect::Energy(2),
            ItemKind::LargeEnergy => ItemEffect::Energy(10),
        }
    }

    pub fn pickup_sound(self) -> Sound {
        match self {
            ItemKind::ExtraLife => Sound::ExtraLife,
            _ => Sound::Bonus,
        }
    }

    /// Blink frames on the item sheet
    fn frames(self) -> Vec<Frame<()>> {
        let (a, b) = match self {
            ItemKind::RedBonus => (Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(8.0, 0.0, 8.0, 8.0)),
            ItemKind::BlueBonus => (Rect::new(16.0, 0.0, 8.0, 8.0), Rect::new(24.0, 0.0, 8.0, 8.0)),
            ItemKind::ExtraLife => (Rect::new(0.0, 16.0, 16.0, 16.0), Rect::new(0.0, 16.0, 16.0, 16.0)),
            ItemKind::SmallEnergy => (Rect::new(32.0, 0.0, 8.0, 6.0), Rect::new(40.0, 0.0, 8.0, 6.0)),
            ItemKind::LargeEnergy => (Rect::new(16.0, 16.0, 16.0, 12.0), Rect::new(32.0, 16.0, 16.0, 12.0)),
        };
        vec![Frame::new(0.15, a), Frame::new(0.15, b)]
    }
}

/// Map a 1..=100 roll to loot. Bands are checked in order and the first
/// match wins, so the extra-life band inside the red-bonus band never hits.
pub fn loot_for_roll(roll: u32) -> Option<ItemKind> {
    if roll > 2 && roll < 50 {
        Some(ItemKind::RedBonus)
    } else if (20..=22).contains(&roll) {
        Some(ItemKind::ExtraLife)
    } else if (50..=54).contains(&roll) {
        Some(ItemKind::SmallEnergy)
    } else if (55..=56).contains(&roll) {
        Some(ItemKind::LargeEnergy)
    } else {
        None
    }
}

/// Uniform 1..=100 loot roll
pub fn roll_loot<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1..=100)
}

/// A pickup in the world
#[derive(Debug, Clone)]
pub struct Item {
    pub kind: ItemKind,
    pub body: Body,
    animator: Animator<ItemKind, ()>,
}

impl Item {
    pub fn new(kind: ItemKind, position: Vec2) -> Self {
        let set = AnimationSet::new().with(kind, kind.frames());
        let animator = Animator::new(set, kind);
        let body = Body::new(position, animator.frame().size);
        Self { kind, body, animator }
    }

    pub fn frame(&self) -> &Frame<()> {
        self.animator.frame()
    }

    pub fn update_animation(&mut self, delta: f32) {
        let reset = std::mem::take(&mut self.body.reset_animation);
        self.animator.tick(self.kind, reset, delta);
    }
}

impl Collider for Item {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_type() {
        assert_eq!(ItemKind::from_type("redbonus"), Some(ItemKind::RedBonus));
        assert_eq!(ItemKind::from_type("small_energy"), Some(ItemKind::SmallEnergy));
        assert_eq!(ItemKind::from_type("bolt"), None);
    }

    #[test]
    fn test_loot_bands_first_match_wins() {
        assert_eq!(loot_for_roll(1), None);
        assert_eq!(loot_for_roll(2), None);
        assert_eq!(loot_for_roll(3), Some(ItemKind::RedBonus));
        assert_eq!(loot_for_roll(21), Some(ItemKind::RedBonus));
        assert_eq!(loot_for_roll(49), Some(ItemKind::RedBonus));
        assert_eq!(loot_for_roll(50), Some(ItemKind::SmallEnergy));
        assert_eq!(loot_for_roll(56), Some(ItemKind::LargeEnergy));
        assert_eq!(loot_for_roll(57), None);
        assert_eq!(loot_for_roll(100), None);
        assert!((1..=100).all(|n| loot_for_roll(n) != Some(ItemKind::ExtraLife)));
    }

    #[test]
    fn test_roll_is_reproducible_for_a_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let first: Vec<_> = (0..20).map(|_| roll_loot(&mut a)).collect();
        let second: Vec<_> = (0..20).map(|_| roll_loot(&mut b)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|n| (1..=100).contains(n)));
    }

    #[test]
    fn test_effects_and_sounds() {
        assert_eq!(ItemKind::BlueBonus.effect(), ItemEffect::Score(1000));
        assert_eq!(ItemKind::LargeEnergy.effect(), ItemEffect::Energy(10));
        assert_eq!(ItemKind::ExtraLife.pickup_sound(), Sound::ExtraLife);
        assert_eq!(ItemKind::RedBonus.pickup_sound(), Sound::Bonus);
    }

    #[test]
    fn test_item_takes_frame_size() {
        let item = Item::new(ItemKind::LargeEnergy, Vec2::new(50.0, 50.0));
        assert_eq!(item.body.size, Vec2::new(16.0, 12.0));
        assert!(item.body.gravity && item.body.clip);
    }
}
