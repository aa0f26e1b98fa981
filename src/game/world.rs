//! Game World
//!
//! The World owns the stage, the player and every dynamic object:
//! - Entity allocation and lifetime tracking
//! - Typed storage for enemies, items, pellets and explosions
//! - Deferred despawn (to avoid iterator invalidation)
//!
//! Like the component set, the object kinds are fixed at compile time:
//! each storage is a typed field rather than a registry keyed by type.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::body::Direction;
use super::camera::Camera;
use super::collision::{apply_gravity, resolve_gates, resolve_terrain, touching_hazard, Collider, GateContact};
use super::component::ComponentStorage;
use super::config::Tuning;
use super::enemy::{Enemies, Enemy};
use super::entity::{Entity, EntityAllocator};
use super::event::{
    DamageEvent, DeathEvent, Events, ItemCollectedEvent, Sound, SpawnEvent, SpawnKind, Target, ZoneChangedEvent,
};
use super::explosion::Explosion;
use super::gate::GateState;
use super::input::PlayerCommand;
use super::item::{loot_for_roll, roll_loot, Item, ItemEffect, ItemKind};
use super::player::Player;
use super::stage::Stage;
use super::weapon::{Pellet, Team};
use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// Gate retracting, player frozen
    Opening,
    /// Player walking through
    Walking,
}

/// A gate-entry sequence in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSequence {
    pub gate: usize,
    pub direction: Direction,
    pub phase: GatePhase,
}

/// The game world containing the stage and everything moving in it.
pub struct World {
    pub stage: Stage,
    pub tuning: Tuning,
    pub player: Player,
    pub camera: Camera,

    /// Enemy spawn templates
    pub spawner: Enemies,

    /// Entity allocator for creating/destroying objects
    entities: EntityAllocator,

    /// Entities queued for despawn at end of tick
    despawn_queue: Vec<Entity>,

    // =========================================================================
    // Dynamic objects
    // =========================================================================

    pub enemies: ComponentStorage<Enemy>,
    pub items: ComponentStorage<Item>,
    pub pellets: ComponentStorage<Pellet>,
    pub explosions: ComponentStorage<Explosion>,

    gate_sequence: Option<GateSequence>,

    /// Loot rolls
    rng: StdRng,
}

impl World {
    /// Build a world for `stage`: the player warps in at the stage's warp
    /// start and the item layer is spawned.
    pub fn new(stage: Stage, tuning: Tuning) -> Self {
        let spawner = Enemies::from_spawn_points(&stage.enemy_spawns, tuning.spawn.spawn_range);

        let mut player = Player::new(&tuning.player, stage.warp_start);
        player.warp(stage.warp_start);

        let mut camera = Camera::new(&tuning.camera);
        camera.snap_to(&stage, stage.warp_start);

        let mut world = Self {
            player,
            camera,
            spawner,
            entities: EntityAllocator::new(),
            despawn_queue: Vec::new(),
            enemies: ComponentStorage::new(),
            items: ComponentStorage::new(),
            pellets: ComponentStorage::new(),
            explosions: ComponentStorage::new(),
            gate_sequence: None,
            rng: StdRng::seed_from_u64(tuning.seed),
            stage,
            tuning,
        };

        let item_spawns = world.stage.item_spawns.clone();
        for spawn in item_spawns {
            world.spawn_item(spawn.kind, spawn.position);
        }

        world
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    pub fn spawn_enemy(&mut self, enemy: Enemy, events: &mut Events) -> Entity {
        let entity = self.entities.allocate();
        events.spawn.send(SpawnEvent {
            entity,
            kind: SpawnKind::Enemy(enemy.kind),
            position: enemy.body.position,
        });
        self.enemies.insert(entity, enemy);
        entity
    }

    pub fn spawn_item(&mut self, kind: ItemKind, position: Vec2) -> Entity {
        let entity = self.entities.allocate();
        self.items.insert(entity, Item::new(kind, position));
        entity
    }

    pub fn spawn_pellet(&mut self, pellet: Pellet, events: &mut Events) -> Entity {
        let entity = self.entities.allocate();
        events.spawn.send(SpawnEvent {
            entity,
            kind: SpawnKind::Pellet(pellet.team),
            position: pellet.body.position,
        });
        self.pellets.insert(entity, pellet);
        entity
    }

    fn spawn_explosion(&mut self, position: Vec2, events: &mut Events) -> Entity {
        let entity = self.entities.allocate();
        events.spawn.send(SpawnEvent { entity, kind: SpawnKind::Explosion, position });
        self.explosions.insert(entity, Explosion::new(position));
        entity
    }

    /// Queue an entity for despawn at end of tick.
    pub fn despawn(&mut self, entity: Entity) {
        if self.is_alive(entity) && !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    /// Immediately despawn an entity and drop whatever it was.
    pub fn despawn_immediate(&mut self, entity: Entity) {
        if !self.entities.free(entity) {
            return;
        }
        let idx = entity.index();
        self.enemies.clear_slot(idx);
        self.items.clear_slot(idx);
        self.pellets.clear_slot(idx);
        self.explosions.clear_slot(idx);
    }

    /// Process all queued despawns. Call at end of tick.
    pub fn flush_despawns(&mut self) {
        let queue = std::mem::take(&mut self.despawn_queue);
        for entity in queue {
            self.despawn_immediate(entity);
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    pub fn gate_sequence(&self) -> Option<&GateSequence> {
        self.gate_sequence.as_ref()
    }

    /// Drop every enemy, pellet and explosion and re-arm all spawn points.
    fn clear_dynamic(&mut self) {
        let mut doomed = self.enemies.entities();
        doomed.extend(self.pellets.entities());
        doomed.extend(self.explosions.entities());
        for entity in doomed {
            self.despawn_immediate(entity);
        }
        self.despawn_queue.clear();
        self.spawner.reset();
    }

    /// Warp the player back in at the stage start with full health.
    pub fn respawn(&mut self) {
        self.clear_dynamic();
        self.gate_sequence = None;
        let start = self.stage.warp_start;
        self.player.respawn(start);
        self.camera.snap_to(&self.stage, start);
        tracing::info!(lives = self.player.lives, "player respawned");
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn apply_command(&mut self, command: PlayerCommand, events: &mut Events) {
        if !self.player.accepts_input() && command != PlayerCommand::StopShooting {
            return;
        }

        if command == PlayerCommand::Shoot {
            let live = self.pellets.iter().filter(|(_, p)| p.team == Team::Player).count();
            if let Some(pellet) = self.player.shoot(live, events) {
                self.spawn_pellet(pellet, events);
            }
            return;
        }

        let player = &mut self.player;
        match command {
            PlayerCommand::MoveRight if player.is_climbing() => player.direction = Direction::Right,
            PlayerCommand::MoveRight => player.move_right(),
            PlayerCommand::MoveLeft if player.is_climbing() => player.direction = Direction::Left,
            PlayerCommand::MoveLeft => player.move_left(),
            PlayerCommand::StopX => player.stop_x(),
            PlayerCommand::Up => {
                if player.is_climbing() || player.grab_ladder_behind(&self.stage) {
                    player.climb_up();
                }
            }
            PlayerCommand::Down => {
                if player.is_climbing() || player.grab_ladder_below(&self.stage) {
                    player.climb_down();
                }
            }
            PlayerCommand::StopUp | PlayerCommand::StopDown => {
                if player.is_climbing() {
                    player.stop_climbing();
                }
            }
            PlayerCommand::Jump => player.jump(),
            PlayerCommand::StopShooting => player.stop_shooting(),
            PlayerCommand::Shoot => {}
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Run one fixed tick, in order:
    /// 1. zone transition step (everything else frozen while it runs)
    /// 2. ladder state, gravity, velocity integration
    /// 3. collision: player (terrain, gates, contact damage), enemies, items
    /// 4. enemy spawning, reactions and behavior updates
    /// 5. timers and gates
    /// 6. animations
    /// 7. pellet hits, enemy deaths, off-screen removal
    /// 8. zone transition check and camera follow
    pub fn update(&mut self, delta: f32, events: &mut Events) {
        self.step(delta, events);
        self.flush_despawns();
    }

    fn step(&mut self, delta: f32, events: &mut Events) {
        if self.camera.is_transitioning() {
            if let Some(zone) = self.camera.step_transition() {
                self.finish_transition(zone, events);
            }
            return;
        }
        if self.player.is_dead() {
            return;
        }

        self.player.check_climb(&self.stage);

        let physics = self.tuning.physics;
        apply_gravity(&mut self.player.body, &self.stage, &physics);
        for (_, enemy) in self.enemies.iter_mut() {
            apply_gravity(&mut enemy.body, &self.stage, &physics);
        }
        for (_, item) in self.items.iter_mut() {
            apply_gravity(&mut item.body, &self.stage, &physics);
        }

        self.player.body.integrate();
        for (_, enemy) in self.enemies.iter_mut() {
            enemy.body.integrate();
        }
        for (_, item) in self.items.iter_mut() {
            item.body.integrate();
        }
        for (_, pellet) in self.pellets.iter_mut() {
            pellet.update_position();
        }

        self.collide_player(events);
        for (_, enemy) in self.enemies.iter_mut() {
            if enemy.body.clip {
                resolve_terrain(enemy, &self.stage, events);
            }
        }
        self.collide_items(events);

        self.update_enemies(delta, events);

        self.player.update_status(delta);
        for gate in &mut self.stage.gates {
            gate.update(delta);
        }
        self.update_gate_sequence();

        self.update_animations(delta);

        self.resolve_pellets(events);
        self.resolve_enemy_deaths(events);
        self.remove_off_screen(events);

        let position = self.player.body.position;
        if !self.camera.check_transition(&self.stage, position, self.player.body.falling) {
            self.camera.follow(&self.stage, position);
        }
    }

    fn collide_player(&mut self, events: &mut Events) {
        if self.player.is_warping() {
            let hitbox = self.player.hitbox();
            let landing = match self.stage.warp_land {
                Some(land) => hitbox.intersects(&land).then(|| land.top()),
                None => self.stage.platforms.iter().find(|p| hitbox.intersects(&p.rect)).map(|p| p.rect.top()),
            };
            if let Some(y) = landing {
                self.player.arrive(y, events);
            }
            return;
        }

        if self.player.body.clip {
            resolve_terrain(&mut self.player, &self.stage, events);
        }

        if let Some(GateContact::Entered(index)) = resolve_gates(&mut self.player, &self.stage.gates, events) {
            if self.gate_sequence.is_none() {
                self.enter_gate(index);
            }
        }

        if !self.player.is_vulnerable() {
            return;
        }
        let hitbox = self.player.hitbox();
        if let Some(damage) = touching_hazard(&self.stage, &hitbox).map(|h| h.damage) {
            self.hurt_player(damage, None, events);
            return;
        }
        let contact = self.enemies
            .iter()
            .find(|(_, e)| hitbox.intersects(&e.hitbox()))
            .map(|(_, e)| e.damage);
        if let Some(damage) = contact {
            self.hurt_player(damage, Some(Team::Enemy), events);
        }
    }

    fn collide_items(&mut self, events: &mut Events) {
        let hitbox = self.player.hitbox();
        let can_collect = !self.player.is_dead() && !self.player.is_warping();
        let mut collected = Vec::new();
        for (entity, item) in self.items.iter_mut() {
            resolve_terrain(item, &self.stage, events);
            if can_collect && hitbox.intersects(&item.body.hitbox()) {
                collected.push((entity, item.kind));
            }
        }
        for (entity, kind) in collected {
            self.collect_item(entity, kind, events);
        }
    }

    fn collect_item(&mut self, entity: Entity, kind: ItemKind, events: &mut Events) {
        match kind.effect() {
            ItemEffect::Score(points) => self.player.score += points,
            ItemEffect::Life => self.player.lives += 1,
            ItemEffect::Energy(amount) => self.player.heal(amount),
        }
        events.play(kind.pickup_sound());
        events.item_collected.send(ItemCollectedEvent { item: entity, kind });
        self.items.remove(entity);
        self.despawn(entity);
        tracing::debug!(?kind, score = self.player.score, hit_points = self.player.hit_points, "item collected");
    }

    fn hurt_player(&mut self, amount: i32, killer: Option<Team>, events: &mut Events) {
        let position = self.player.body.position;
        if !self.player.damage(amount, events) {
            return;
        }
        events.damage.send(DamageEvent { target: Target::Player, amount, position });
        if self.player.is_dead() {
            self.player_died(killer, events);
        }
    }

    fn player_died(&mut self, killer: Option<Team>, events: &mut Events) {
        let position = self.player.body.position;
        events.death.send(DeathEvent { target: Target::Player, killer, position });
        events.play_blocking(Sound::Defeat);
        tracing::info!(x = position.x, y = position.y, lives = self.player.lives, "player defeated");
    }

    fn update_enemies(&mut self, delta: f32, events: &mut Events) {
        let view = self.camera.view;
        let zone = self.camera.active_zone().and_then(|i| self.stage.zones.get(i)).map(|z| z.rect);
        let probe = self.player.probe();

        for enemy in self.spawner.spawn_nearby(&view, zone.as_ref(), &probe) {
            self.spawn_enemy(enemy, events);
        }

        let mut shots = Vec::new();
        for (entity, enemy) in self.enemies.iter_mut() {
            enemy.react(&probe);
            enemy.update(entity, delta, events, &mut shots);
        }
        for pellet in shots {
            self.spawn_pellet(pellet, events);
        }
    }

    // =========================================================================
    // Gates
    // =========================================================================

    fn enter_gate(&mut self, index: usize) {
        let Some(gate) = self.stage.gates.get_mut(index) else {
            return;
        };
        gate.open();
        let direction = Direction::toward(self.player.body.position.x, gate.rect.center_x());
        self.player.immobilize();
        self.gate_sequence = Some(GateSequence { gate: index, direction, phase: GatePhase::Opening });
        tracing::debug!(gate = index, ?direction, "gate entered");
    }

    fn update_gate_sequence(&mut self) {
        let Some(sequence) = self.gate_sequence else {
            return;
        };
        let Some(gate) = self.stage.gates.get_mut(sequence.gate) else {
            self.gate_sequence = None;
            return;
        };

        match sequence.phase {
            GatePhase::Opening => {
                if gate.state() == GateState::Open {
                    self.player.release(sequence.direction);
                    self.gate_sequence = Some(GateSequence { phase: GatePhase::Walking, ..sequence });
                }
            }
            GatePhase::Walking => {
                let hitbox = self.player.hitbox();
                let past = match sequence.direction {
                    Direction::Right => hitbox.left() > gate.rect.right(),
                    Direction::Left => hitbox.right() < gate.rect.left(),
                };
                if past {
                    gate.close();
                    gate.lock();
                    self.player.stop_x();
                    self.gate_sequence = None;
                    tracing::debug!(gate = sequence.gate, "gate closed behind player");
                }
            }
        }
    }

    // =========================================================================
    // Animation, hits, deaths
    // =========================================================================

    fn update_animations(&mut self, delta: f32) {
        self.player.update_animation(delta);
        for (_, enemy) in self.enemies.iter_mut() {
            enemy.update_animation(delta);
        }
        for (_, item) in self.items.iter_mut() {
            item.update_animation(delta);
        }
        let mut finished = Vec::new();
        for (entity, explosion) in self.explosions.iter_mut() {
            if explosion.update(delta) {
                finished.push(entity);
            }
        }
        for entity in finished {
            self.despawn(entity);
        }
    }

    /// Player pellets hit the first enemy they overlap; enemy pellets hit
    /// the player. Pellets that left the view die.
    fn resolve_pellets(&mut self, events: &mut Events) {
        let view = self.camera.view;
        let player_hitbox = self.player.hitbox();
        let player_vulnerable = self.player.is_vulnerable();
        let mut spent = Vec::new();
        let mut player_hits = Vec::new();

        for (entity, pellet) in self.pellets.iter() {
            if pellet.is_off_view(&view) {
                spent.push(entity);
                continue;
            }
            let hitbox = pellet.hitbox();
            match pellet.team {
                Team::Player => {
                    let target = self.enemies
                        .iter_mut()
                        .find(|(_, e)| !e.is_dead() && hitbox.intersects(&e.hitbox()));
                    if let Some((target, enemy)) = target {
                        let position = enemy.body.position;
                        if enemy.hit(pellet.damage, Team::Player, events) {
                            events.damage.send(DamageEvent { target: Target::Enemy(target), amount: pellet.damage, position });
                        }
                        spent.push(entity);
                    }
                }
                Team::Enemy => {
                    if player_vulnerable && hitbox.intersects(&player_hitbox) {
                        player_hits.push(pellet.damage);
                        spent.push(entity);
                    }
                }
            }
        }

        for entity in spent {
            self.pellets.remove(entity);
            self.despawn(entity);
        }
        for amount in player_hits {
            self.hurt_player(amount, Some(Team::Enemy), events);
        }
    }

    fn resolve_enemy_deaths(&mut self, events: &mut Events) {
        let dead: Vec<Entity> = self.enemies
            .iter()
            .filter(|(_, e)| e.is_dead())
            .map(|(entity, _)| entity)
            .collect();
        for entity in dead {
            let roll = roll_loot(&mut self.rng);
            self.defeat_enemy(entity, roll, events);
        }
    }

    /// Remove a defeated enemy: explosion, points for the player if they
    /// dealt the last hit, spawn point re-armed, then loot for `roll`.
    /// Returns the dropped item.
    pub fn defeat_enemy(&mut self, entity: Entity, roll: u32, events: &mut Events) -> Option<Entity> {
        let enemy = self.enemies.remove(entity)?;
        let position = enemy.body.position;
        self.despawn(entity);
        self.spawner.release(enemy.template);

        self.spawn_explosion(position, events);
        events.play(Sound::Explode);
        if enemy.last_hit_by == Some(Team::Player) {
            self.player.score += enemy.points();
        }
        events.death.send(DeathEvent { target: Target::Enemy(entity), killer: enemy.last_hit_by, position });

        let loot = loot_for_roll(roll);
        tracing::debug!(name = %enemy.name, kind = enemy.kind.type_name(), roll, ?loot, "enemy defeated");

        let kind = loot?;
        let item = self.spawn_item(kind, position);
        events.spawn.send(SpawnEvent { entity: item, kind: SpawnKind::Item(kind), position });
        Some(item)
    }

    fn remove_off_screen(&mut self, events: &mut Events) {
        let view = self.camera.view;
        let height = self.stage.height;

        let gone: Vec<Entity> = self.enemies
            .iter()
            .filter(|(_, e)| e.is_off_screen(&view, height))
            .map(|(entity, _)| entity)
            .collect();
        for entity in gone {
            if let Some(enemy) = self.enemies.remove(entity) {
                self.spawner.release(enemy.template);
                tracing::trace!(name = %enemy.name, "enemy left the screen");
            }
            self.despawn(entity);
        }

        let fallen: Vec<Entity> = self.items
            .iter()
            .filter(|(_, item)| item.body.top() > height)
            .map(|(entity, _)| entity)
            .collect();
        for entity in fallen {
            self.items.remove(entity);
            self.despawn(entity);
        }

        if !self.player.is_dead() && self.player.body.top() > height {
            self.player.die();
            self.player_died(None, events);
        }
    }

    // =========================================================================
    // Zones
    // =========================================================================

    fn finish_transition(&mut self, zone: usize, events: &mut Events) {
        for entity in self.enemies.entities() {
            if let Some(enemy) = self.enemies.remove(entity) {
                self.spawner.release(enemy.template);
            }
            self.despawn(entity);
        }
        let enemy_pellets: Vec<Entity> = self.pellets
            .iter()
            .filter(|(_, p)| p.team == Team::Enemy)
            .map(|(entity, _)| entity)
            .collect();
        for entity in enemy_pellets {
            self.pellets.remove(entity);
            self.despawn(entity);
        }

        if let Some(z) = self.stage.zones.get(zone) {
            tracing::info!(zone = %z.name, music = ?z.music(), "entered zone");
            events.zone_changed.send(ZoneChangedEvent {
                zone,
                name: z.name.clone(),
                music: z.music().map(str::to_string),
                background: z.background,
            });
        }
    }
}
