//! Event System
//!
//! Systems never reach into each other during a tick. Anything with an
//! effect outside the object that produced it is queued here instead:
//! 1. A pellet hits a wall shooter → `SoundEvent(dink)`
//! 2. An enemy runs out of hit points → `DeathEvent`, `SpawnEvent` for the
//!    explosion and loot
//! 3. The camera settles into a new zone → `ZoneChangedEvent` (music,
//!    background color for the host)
//!
//! The runtime drains sounds into the audio sink after each tick and then
//! clears every queue.

use super::enemy::EnemyKind;
use super::entity::Entity;
use super::item::ItemKind;
use super::weapon::Team;
use crate::math::Vec2;

/// A queue for events of a single type.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Queue an event for the host
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    /// True when nothing was queued this tick
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop queued events without reading them
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all simulation events.
#[derive(Debug, Default)]
pub struct Events {
    /// Sound effects to play
    pub sounds: EventQueue<SoundEvent>,

    /// Damage applied to the player or an enemy
    pub damage: EventQueue<DamageEvent>,

    /// Player or enemy died
    pub death: EventQueue<DeathEvent>,

    /// Object spawned into the world
    pub spawn: EventQueue<SpawnEvent>,

    /// Player picked up an item
    pub item_collected: EventQueue<ItemCollectedEvent>,

    /// Camera finished moving into a new zone
    pub zone_changed: EventQueue<ZoneChangedEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fire-and-forget sound
    pub fn play(&mut self, sound: Sound) {
        self.sounds.send(SoundEvent { sound, blocking: false });
    }

    /// Queue a sound the host should let finish before continuing
    pub fn play_blocking(&mut self, sound: Sound) {
        self.sounds.send(SoundEvent { sound, blocking: true });
    }

    /// Clear all event queues. Call at end of tick.
    pub fn clear_all(&mut self) {
        self.sounds.clear();
        self.damage.clear();
        self.death.clear();
        self.spawn.clear();
        self.item_collected.clear();
        self.zone_changed.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// Named sound effects understood by the audio provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Land,
    Damage,
    Buster,
    Warp,
    Bonus,
    ExtraLife,
    EnemyDamage,
    EnemyShoot,
    Dink,
    Explode,
    Defeat,
    Start,
}

impl Sound {
    /// Asset name handed to the audio provider
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Land => "land",
            Sound::Damage => "damage",
            Sound::Buster => "buster",
            Sound::Warp => "warp",
            Sound::Bonus => "bonus",
            Sound::ExtraLife => "extralife",
            Sound::EnemyDamage => "edamage",
            Sound::EnemyShoot => "eshoot",
            Sound::Dink => "dink",
            Sound::Explode => "explode",
            Sound::Defeat => "defeat",
            Sound::Start => "start",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundEvent {
    pub sound: Sound,
    /// Host should wait for playback to finish
    pub blocking: bool,
}

/// Who an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Player,
    Enemy(Entity),
}

/// Damage was applied
#[derive(Debug, Clone, Copy)]
pub struct DamageEvent {
    pub target: Target,
    pub amount: i32,
    /// Where the hit occurred
    pub position: Vec2,
}

/// Something died
#[derive(Debug, Clone, Copy)]
pub struct DeathEvent {
    pub target: Target,
    /// Team that dealt the last damage (if any)
    pub killer: Option<Team>,
    /// Where they died (for drops and explosions)
    pub position: Vec2,
}

/// What was spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Enemy(EnemyKind),
    Item(ItemKind),
    Pellet(Team),
    Explosion,
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnEvent {
    pub entity: Entity,
    pub kind: SpawnKind,
    pub position: Vec2,
}

/// An item was picked up
#[derive(Debug, Clone, Copy)]
pub struct ItemCollectedEvent {
    /// The item entity (already despawned)
    pub item: Entity,
    pub kind: ItemKind,
}

/// The camera finished a zone transition
#[derive(Debug, Clone)]
pub struct ZoneChangedEvent {
    /// Index into the stage's zone list
    pub zone: usize,
    pub name: String,
    pub music: Option<String>,
    pub background: Option<(u8, u8, u8)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();

        queue.send(1);
        queue.send(2);
        queue.send(3);

        assert_eq!(queue.len(), 3);

        let collected: Vec<_> = queue.drain().collect();
        assert_eq!(collected, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_container() {
        let mut events = Events::new();

        events.play(Sound::Land);
        events.play_blocking(Sound::Defeat);
        events.damage.send(DamageEvent {
            target: Target::Player,
            amount: 4,
            position: Vec2::ZERO,
        });

        let sounds: Vec<_> = events.sounds.iter().map(|s| (s.sound.name(), s.blocking)).collect();
        assert_eq!(sounds, vec![("land", false), ("defeat", true)]);

        events.clear_all();
        assert!(events.damage.is_empty());
        assert!(events.sounds.is_empty());
    }
}
