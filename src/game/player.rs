//! Player Controller
//!
//! ```text
//! Warping ──(lands)──> Arriving ──(0.05 s)──> Grounded/Falling
//! Grounded/Falling ──(up + ladder behind, down + ladder below)──> Climbing
//! Climbing ──(head at ladder top)──> Climbing{over} ──(center at top)──> Grounded
//! Climbing ──(no ladder)──> Falling
//! Grounded/Falling/Climbing ──(hit)──> Damaged ──(Recover frame)──> invincible 1 s
//! any ──(hp <= 0)──> Dead
//! ```
//!
//! `Grounded` and `Falling` are not stored: they are read off the body's
//! `falling` flag, which collision resolution owns.

use super::animation::{AnimationSet, Animator, Frame};
use super::body::{Body, Direction, Side};
use super::collision::Collider;
use super::config::PlayerTuning;
use super::enemy::PlayerProbe;
use super::event::{Events, Sound};
use super::stage::Stage;
use super::weapon::{buster_origin, Pellet};
use crate::math::{Rect, Vec2};

/// Observable movement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMode {
    Grounded,
    Falling,
    Climbing { over: bool },
    Warping,
    Arriving,
    Damaged,
    Immobilized,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Normal,
    Climbing { over: bool },
    Warping,
    Arriving { elapsed: f32 },
    Damaged,
    Immobilized,
    Dead,
}

/// Frame events for player animations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    FaceRight,
    FaceLeft,
    /// Damaged pose finished
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerPose {
    Still,
    StillShoot,
    Walk,
    WalkShoot,
    Jump,
    JumpShoot,
    ClimbStill,
    ClimbShoot,
    Climb,
    ClimbOver,
    Warp,
    WarpArrive,
    Damaged,
}

pub type PlayerAnim = (PlayerPose, Direction);

fn animations(tuning: &PlayerTuning) -> AnimationSet<PlayerAnim, PlayerEvent> {
    let (wide, narrow, h) = (tuning.width, tuning.narrow_width, tuning.height);
    let region = Rect::new;

    // Left-facing frames are stored as drawn; right-facing ones mirror them
    let facings = |set: AnimationSet<PlayerAnim, PlayerEvent>, pose: PlayerPose, frames: Vec<Frame<PlayerEvent>>| {
        let flipped = frames.iter().map(|f| (*f).flipped(true)).collect();
        set.with((pose, Direction::Left), frames).with((pose, Direction::Right), flipped)
    };
    let either = |set: AnimationSet<PlayerAnim, PlayerEvent>, pose: PlayerPose, frames: Vec<Frame<PlayerEvent>>| {
        set.with((pose, Direction::Left), frames.clone()).with((pose, Direction::Right), frames)
    };

    let mut set = AnimationSet::new();
    set = facings(set, PlayerPose::Still, vec![
        Frame::new(2.0, region(0.0, 8.0, 24.0, 24.0)).with_size(wide, h),
        Frame::new(0.1, region(25.0, 8.0, 24.0, 24.0)).with_size(wide, h),
    ]);
    set = facings(set, PlayerPose::StillShoot, vec![
        Frame::new(0.2, region(291.0, 8.0, 32.0, 24.0)).with_size(wide, h),
    ]);
    set = facings(set, PlayerPose::Walk, [80.0, 108.0, 133.0]
        .iter()
        .map(|x| Frame::new(0.1, region(*x, 8.0, 24.0, 24.0)).with_size(wide, h))
        .collect());
    set = facings(set, PlayerPose::WalkShoot, [324.0, 357.0, 390.0]
        .iter()
        .map(|x| Frame::new(0.1, region(*x, 8.0, 32.0, 24.0)).with_size(wide, h))
        .collect());
    set = facings(set, PlayerPose::Jump, vec![
        Frame::new(0.0, region(194.0, 0.0, 26.0, 30.0)).with_size(narrow, h),
    ]);
    set = facings(set, PlayerPose::JumpShoot, vec![
        Frame::new(0.0, region(423.0, 0.0, 32.0, 32.0)).with_size(narrow, h),
    ]);
    set = facings(set, PlayerPose::ClimbShoot, vec![
        Frame::new(0.0, region(456.0, 0.0, 24.0, 32.0)).with_size(narrow, h),
    ]);
    // The climbing sprite faces right unflipped
    let climb_still = Frame::new(0.0, region(224.0, 0.0, 16.0, 32.0)).with_size(narrow, h);
    set = set
        .with((PlayerPose::ClimbStill, Direction::Right), vec![climb_still])
        .with((PlayerPose::ClimbStill, Direction::Left), vec![climb_still.flipped(true)]);
    set = either(set, PlayerPose::Climb, vec![
        Frame::new(0.2, region(224.0, 0.0, 16.0, 32.0)).with_size(narrow, h).with_event(PlayerEvent::FaceRight),
        Frame::new(0.2, region(224.0, 0.0, 16.0, 32.0)).with_size(narrow, h).flipped(true).with_event(PlayerEvent::FaceLeft),
    ]);
    set = either(set, PlayerPose::ClimbOver, vec![
        Frame::new(0.0, region(241.0, 8.0, 16.0, 24.0)).with_size(narrow, h),
    ]);
    set = either(set, PlayerPose::Warp, vec![
        Frame::new(0.0, region(670.0, 0.0, 8.0, 32.0)).with_size(narrow, h),
    ]);
    set = either(set, PlayerPose::WarpArrive, vec![
        Frame::new(tuning.arrive_time, region(680.0, 0.0, 24.0, 32.0)).with_size(wide, h),
        Frame::new(tuning.arrive_time, region(705.0, 0.0, 24.0, 32.0)).with_size(wide, h),
    ]);
    facings(set, PlayerPose::Damaged, vec![
        Frame::new(tuning.damaged_time, region(258.0, 0.0, 32.0, 32.0)).with_size(wide, h),
        Frame::new(0.0, region(258.0, 0.0, 32.0, 32.0)).with_size(wide, h).with_event(PlayerEvent::Recover),
    ])
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub direction: Direction,
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub lives: u32,
    pub score: u32,
    /// Holding the shoot button
    pub shooting: bool,
    state: State,
    /// Seconds of invincibility left
    invincible: Option<f32>,
    tuning: PlayerTuning,
    animator: Animator<PlayerAnim, PlayerEvent>,
}

impl Player {
    pub fn new(tuning: &PlayerTuning, position: Vec2) -> Self {
        let direction = Direction::Right;
        Self {
            body: Body::new(position, Vec2::new(tuning.width, tuning.height)),
            direction,
            hit_points: tuning.max_hit_points,
            max_hit_points: tuning.max_hit_points,
            lives: tuning.lives,
            score: 0,
            shooting: false,
            state: State::Normal,
            invincible: None,
            tuning: *tuning,
            animator: Animator::new(animations(tuning), (PlayerPose::Still, direction)),
        }
    }

    pub fn mode(&self) -> PlayerMode {
        match self.state {
            State::Normal if self.body.falling => PlayerMode::Falling,
            State::Normal => PlayerMode::Grounded,
            State::Climbing { over } => PlayerMode::Climbing { over },
            State::Warping => PlayerMode::Warping,
            State::Arriving { .. } => PlayerMode::Arriving,
            State::Damaged => PlayerMode::Damaged,
            State::Immobilized => PlayerMode::Immobilized,
            State::Dead => PlayerMode::Dead,
        }
    }

    pub fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }

    pub fn probe(&self) -> PlayerProbe {
        PlayerProbe {
            position: self.body.position,
            hitbox: self.hitbox(),
            falling: self.body.falling,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state == State::Dead
    }

    pub fn is_warping(&self) -> bool {
        self.state == State::Warping
    }

    pub fn is_immobilized(&self) -> bool {
        self.state == State::Immobilized
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible.is_some()
    }

    /// Can take damage right now
    pub fn is_vulnerable(&self) -> bool {
        matches!(self.state, State::Normal | State::Climbing { .. }) && self.invincible.is_none()
    }

    /// Reacts to movement commands
    pub fn accepts_input(&self) -> bool {
        matches!(self.state, State::Normal | State::Climbing { .. } | State::Damaged)
    }

    pub fn frame(&self) -> &Frame<PlayerEvent> {
        self.animator.frame()
    }

    // =========================================================================
    // Movement
    // =========================================================================

    pub fn move_right(&mut self) {
        self.direction = Direction::Right;
        let speed = self.tuning.move_speed;
        if self.body.velocity.x < 0.0 {
            self.body.accelerate(speed * 2.0, 0.0);
        } else {
            self.body.accelerate(speed, 0.0);
        }
    }

    pub fn move_left(&mut self) {
        self.direction = Direction::Left;
        let speed = self.tuning.move_speed;
        if self.body.velocity.x > 0.0 {
            self.body.accelerate(-speed * 2.0, 0.0);
        } else {
            self.body.accelerate(-speed, 0.0);
        }
    }

    pub fn stop_x(&mut self) {
        self.body.stop_x();
        self.body.reset_animation = true;
    }

    pub fn jump(&mut self) {
        if self.is_climbing() {
            self.release_ladder();
        } else if !self.body.falling {
            self.body.gravity = true;
            self.body.set_width(self.tuning.narrow_width);
            self.body.accelerate(0.0, -self.tuning.jump_speed);
            self.body.falling = true;
        }
    }

    // =========================================================================
    // Ladders
    // =========================================================================

    /// Grab the ladder overlapping the player. Returns false when there is none.
    pub fn grab_ladder_behind(&mut self, stage: &Stage) -> bool {
        match stage.ladder_behind(&self.hitbox()) {
            Some(ladder) => {
                let rect = ladder.rect;
                self.grab_ladder(&rect, false);
                true
            }
            None => false,
        }
    }

    /// Grab the ladder just under the player's feet.
    pub fn grab_ladder_below(&mut self, stage: &Stage) -> bool {
        match stage.ladder_below(&self.hitbox()) {
            Some(ladder) => {
                let rect = ladder.rect;
                self.grab_ladder(&rect, true);
                true
            }
            None => false,
        }
    }

    fn grab_ladder(&mut self, ladder: &Rect, going_down: bool) {
        let body = &mut self.body;
        body.velocity = Vec2::ZERO;
        body.position.x = ladder.left() + (ladder.w / 2.0).floor();
        if going_down {
            body.set_width(self.tuning.narrow_width);
            body.position.y += (body.size.y / 2.0).floor();
        }
        body.gravity = false;
        body.falling = false;
        body.reset_animation = true;
        self.state = State::Climbing { over: false };
        tracing::trace!(x = body.position.x, y = body.position.y, going_down, "grabbed ladder");
    }

    pub fn climb_up(&mut self) {
        if self.is_climbing() {
            self.body.accelerate(0.0, -self.tuning.climb_speed);
        }
    }

    pub fn climb_down(&mut self) {
        if self.is_climbing() {
            self.body.accelerate(0.0, self.tuning.climb_speed);
        }
    }

    pub fn stop_climbing(&mut self) {
        self.body.velocity.y = 0.0;
        self.body.reset_animation = true;
    }

    fn climb_off(&mut self) {
        self.body.velocity.y = 0.0;
        self.body.gravity = true;
        self.body.reset_animation = true;
        self.state = State::Normal;
    }

    pub fn release_ladder(&mut self) {
        self.body.gravity = true;
        self.body.falling = true;
        self.body.reset_animation = true;
        self.state = State::Normal;
    }

    /// Keep the climbing state consistent with the ladder behind the player.
    pub fn check_climb(&mut self, stage: &Stage) {
        let State::Climbing { over } = self.state else {
            return;
        };
        let Some(top) = stage.ladder_behind(&self.hitbox()).map(|l| l.rect.top()) else {
            self.release_ladder();
            return;
        };

        let (head, center) = (self.body.top(), self.body.position.y);
        if !over {
            if head <= top && center > top {
                self.state = State::Climbing { over: true };
                self.body.reset_animation = true;
            } else if center <= top {
                self.climb_off();
            }
        } else if center <= top {
            self.climb_off();
        } else if head > top {
            self.state = State::Climbing { over: false };
            self.body.reset_animation = true;
        }
    }

    // =========================================================================
    // Warp, gates, damage
    // =========================================================================

    /// Beam in from `start`, passing through platforms until landing.
    pub fn warp(&mut self, start: Vec2) {
        self.body.position = start;
        self.body.velocity = Vec2::ZERO;
        self.body.gravity = true;
        self.body.falling = true;
        self.body.reset_animation = true;
        self.state = State::Warping;
    }

    /// Touch down on the surface at `y` after a warp.
    pub fn arrive(&mut self, y: f32, events: &mut Events) {
        self.body.velocity.y = 0.0;
        self.body.position.y = (y - (self.body.size.y / 2.0).floor()).floor();
        self.body.falling = false;
        self.body.reset_animation = true;
        self.state = State::Arriving { elapsed: 0.0 };
        events.play(Sound::Warp);
        tracing::debug!(x = self.body.position.x, y = self.body.position.y, "player arrived");
    }

    /// Back to full health, warping in again from `start`.
    pub fn respawn(&mut self, start: Vec2) {
        self.hit_points = self.max_hit_points;
        self.invincible = None;
        self.shooting = false;
        self.body.set_width(self.tuning.width);
        self.warp(start);
    }

    /// Frozen by a gate-entry sequence
    pub fn immobilize(&mut self) {
        self.body.velocity = Vec2::ZERO;
        self.body.gravity = false;
        self.body.reset_animation = true;
        self.state = State::Immobilized;
    }

    /// Released by a gate-entry sequence, walking through it
    pub fn release(&mut self, direction: Direction) {
        self.body.gravity = true;
        self.direction = direction;
        self.body.velocity.x = direction.sign() * self.tuning.move_speed;
        self.body.reset_animation = true;
        self.state = State::Normal;
    }

    /// Apply `amount` damage. Returns false when the player could not be hurt.
    pub fn damage(&mut self, amount: i32, events: &mut Events) -> bool {
        if !self.is_vulnerable() {
            return false;
        }

        self.hit_points -= amount;
        self.body.stop_x();

        if self.hit_points <= 0 {
            self.die();
            return true;
        }

        if self.is_climbing() {
            self.release_ladder();
        }
        self.body.accelerate(-self.direction.sign() * self.tuning.knockback, 0.0);
        self.body.reset_animation = true;
        self.state = State::Damaged;
        events.play(Sound::Damage);
        tracing::debug!(amount, hit_points = self.hit_points, "player damaged");
        true
    }

    pub fn die(&mut self) {
        self.body.velocity = Vec2::ZERO;
        self.state = State::Dead;
        tracing::debug!(x = self.body.position.x, y = self.body.position.y, "player died");
    }

    fn recover(&mut self) {
        if self.state != State::Damaged {
            return;
        }
        self.body.stop_x();
        self.body.reset_animation = true;
        self.state = State::Normal;
        self.invincible = Some(self.tuning.invincible_time);
    }

    pub fn heal(&mut self, amount: i32) {
        self.hit_points = (self.hit_points + amount).min(self.max_hit_points);
    }

    // =========================================================================
    // Weapon
    // =========================================================================

    /// Start the shooting pose and fire when fewer than the allowed number
    /// of buster pellets are alive.
    pub fn shoot(&mut self, live_pellets: usize, events: &mut Events) -> Option<Pellet> {
        self.shooting = true;
        self.body.reset_animation = true;
        if live_pellets >= self.tuning.max_pellets {
            return None;
        }
        events.play(Sound::Buster);
        Some(Pellet::buster(buster_origin(&self.body, self.direction), self.direction))
    }

    pub fn stop_shooting(&mut self) {
        self.shooting = false;
        self.body.reset_animation = true;
    }

    // =========================================================================
    // Per-tick
    // =========================================================================

    /// Timers that are not tied to an animation frame
    pub fn update_status(&mut self, delta: f32) {
        if let State::Arriving { elapsed } = &mut self.state {
            *elapsed += delta;
            if *elapsed >= self.tuning.arrive_time {
                self.state = State::Normal;
                self.body.reset_animation = true;
            }
        }

        if let Some(left) = &mut self.invincible {
            *left -= delta;
            if *left <= 0.0 {
                self.invincible = None;
            }
        }
    }

    fn pose(&self) -> PlayerPose {
        let v = self.body.velocity;
        match self.state {
            State::Warping => PlayerPose::Warp,
            State::Arriving { .. } => PlayerPose::WarpArrive,
            State::Damaged => PlayerPose::Damaged,
            State::Climbing { over: true } => PlayerPose::ClimbOver,
            State::Climbing { over: false } if self.shooting => PlayerPose::ClimbShoot,
            State::Climbing { over: false } if v.y != 0.0 => PlayerPose::Climb,
            State::Climbing { over: false } => PlayerPose::ClimbStill,
            _ if v.y != 0.0 => if self.shooting { PlayerPose::JumpShoot } else { PlayerPose::Jump },
            _ if v.x != 0.0 => if self.shooting { PlayerPose::WalkShoot } else { PlayerPose::Walk },
            _ => if self.shooting { PlayerPose::StillShoot } else { PlayerPose::Still },
        }
    }

    /// Advance the current animation, adopting the frame's hitbox width and
    /// applying its events.
    pub fn update_animation(&mut self, delta: f32) {
        let key = (self.pose(), self.direction);
        let reset = std::mem::take(&mut self.body.reset_animation);
        let step = self.animator.tick(key, reset, delta);

        if let Some(size) = step.size {
            self.body.set_width(size.x);
        }
        for event in step.events() {
            match event {
                PlayerEvent::FaceRight => self.direction = Direction::Right,
                PlayerEvent::FaceLeft => self.direction = Direction::Left,
                PlayerEvent::Recover => self.recover(),
            }
        }
    }
}

impl Collider for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn is_climbing(&self) -> bool {
        matches!(self.state, State::Climbing { .. })
    }

    fn on_contact(&mut self, side: Side, boundary: f32, events: &mut Events) {
        self.body.collide(side, boundary);
        if side == Side::Bottom {
            // Climbed down onto the floor
            if self.is_climbing() {
                self.body.gravity = true;
                self.state = State::Normal;
            }
            events.play(Sound::Land);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::collision::resolve_terrain;
    use crate::game::stage::tests::flat_stage;
    use crate::game::stage::MapObject;

    const DT: f32 = 1.0 / 60.0;

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(&PlayerTuning::default(), Vec2::new(x, y))
    }

    /// Flat stage with a ladder from y=200 down to the floor at x 200..216
    fn ladder_stage() -> Stage {
        let mut data = flat_stage();
        data.ladders.push(MapObject::new(Rect::new(200.0, 200.0, 16.0, 152.0)));
        Stage::from_data(data).unwrap()
    }

    #[test]
    fn test_jump_narrows_and_rises() {
        let mut player = player_at(100.0, 340.0);
        player.jump();
        assert_eq!(player.body.velocity.y, -8.0);
        assert_eq!(player.body.size.x, 16.0);
        assert_eq!(player.mode(), PlayerMode::Falling);

        // No double jump
        player.jump();
        assert_eq!(player.body.velocity.y, -8.0);
    }

    #[test]
    fn test_reversing_doubles_impulse() {
        let mut player = player_at(100.0, 340.0);
        player.move_right();
        assert_eq!(player.body.velocity.x, 2.0);
        player.move_left();
        assert_eq!(player.body.velocity.x, -2.0);
        assert_eq!(player.direction, Direction::Left);
        player.stop_x();
        assert_eq!(player.body.velocity.x, 0.0);
    }

    #[test]
    fn test_climb_off_at_ladder_top() {
        let stage = ladder_stage();
        let mut player = player_at(208.0, 300.0);
        assert!(player.grab_ladder_behind(&stage));
        assert_eq!(player.mode(), PlayerMode::Climbing { over: false });
        assert!(!player.body.gravity);

        player.body.position.y = 200.0;
        player.check_climb(&stage);
        assert_eq!(player.mode(), PlayerMode::Grounded);
        assert_eq!(player.body.position.y, 200.0);
        assert!(player.body.gravity);
    }

    #[test]
    fn test_climb_over_and_back() {
        let stage = ladder_stage();
        let mut player = player_at(208.0, 300.0);
        player.grab_ladder_behind(&stage);

        player.body.position.y = 210.0;
        player.check_climb(&stage);
        assert_eq!(player.mode(), PlayerMode::Climbing { over: true });

        player.body.position.y = 220.0;
        player.check_climb(&stage);
        assert_eq!(player.mode(), PlayerMode::Climbing { over: false });
    }

    #[test]
    fn test_climbing_without_ladder_falls() {
        let stage = ladder_stage();
        let mut player = player_at(208.0, 300.0);
        player.grab_ladder_behind(&stage);
        player.body.position.x = 100.0;
        player.check_climb(&stage);
        assert_eq!(player.mode(), PlayerMode::Falling);
        assert!(player.body.gravity);
    }

    #[test]
    fn test_grab_from_above_drops_half_height() {
        let stage = ladder_stage();
        // Standing on the ladder top
        let mut player = player_at(205.0, 188.0);
        assert!(player.grab_ladder_below(&stage));
        assert_eq!(player.body.position, Vec2::new(208.0, 200.0));
        assert_eq!(player.body.size.x, 16.0);

        player.climb_down();
        assert_eq!(player.body.velocity.y, 2.0);
        player.stop_climbing();
        assert_eq!(player.body.velocity.y, 0.0);
    }

    #[test]
    fn test_climbing_onto_floor_lands() {
        let stage = ladder_stage();
        let mut player = player_at(208.0, 330.0);
        player.grab_ladder_behind(&stage);
        player.climb_down();
        let mut events = Events::new();

        player.body.integrate();
        player.body.position.y += 10.0;
        resolve_terrain(&mut player, &stage, &mut events);

        assert_eq!(player.body.bottom(), 352.0);
        assert_eq!(player.mode(), PlayerMode::Grounded);
        assert!(events.sounds.iter().any(|s| s.sound == Sound::Land));
    }

    #[test]
    fn test_damage_knockback_recovery_and_invincibility() {
        let mut player = player_at(100.0, 340.0);
        let mut events = Events::new();
        player.move_right();

        assert!(player.damage(4, &mut events));
        assert_eq!(player.hit_points, 24);
        assert_eq!(player.mode(), PlayerMode::Damaged);
        assert_eq!(player.body.velocity.x, -2.0);
        assert!(!player.damage(4, &mut events));
        assert_eq!(player.hit_points, 24);

        for _ in 0..14 {
            player.update_animation(DT);
            player.update_status(DT);
        }
        assert_eq!(player.mode(), PlayerMode::Grounded);
        assert!(player.is_invincible());
        assert_eq!(player.body.velocity.x, 0.0);
        assert!(!player.damage(4, &mut events));

        for _ in 0..61 {
            player.update_status(DT);
        }
        assert!(!player.is_invincible());
        assert!(player.damage(4, &mut events));
    }

    #[test]
    fn test_hit_points_never_increase_and_death_at_zero() {
        let mut player = player_at(100.0, 340.0);
        let mut events = Events::new();
        let mut last = player.hit_points;
        for _ in 0..20 {
            player.damage(3, &mut events);
            assert!(player.hit_points <= last);
            assert_eq!(player.is_dead(), player.hit_points <= 0);
            last = player.hit_points;
            // Skip past the damaged pose and invincibility
            if player.mode() == PlayerMode::Damaged {
                player.recover();
                player.invincible = None;
            }
        }
        assert!(player.is_dead());
    }

    #[test]
    fn test_damage_releases_ladder() {
        let stage = ladder_stage();
        let mut player = player_at(208.0, 300.0);
        player.grab_ladder_behind(&stage);
        player.damage(2, &mut Events::new());
        assert_eq!(player.mode(), PlayerMode::Damaged);
        assert!(player.body.gravity);
        assert!(player.body.falling);
    }

    #[test]
    fn test_warp_arrive_then_ground() {
        let mut player = player_at(0.0, 0.0);
        let mut events = Events::new();
        player.warp(Vec2::new(40.0, 0.0));
        assert_eq!(player.mode(), PlayerMode::Warping);
        assert!(!player.accepts_input());

        player.arrive(352.0, &mut events);
        assert_eq!(player.body.bottom(), 352.0);
        assert_eq!(player.mode(), PlayerMode::Arriving);
        assert_eq!(events.sounds.iter().next().map(|s| s.sound), Some(Sound::Warp));

        for _ in 0..4 {
            player.update_status(DT);
        }
        assert_eq!(player.mode(), PlayerMode::Grounded);
    }

    #[test]
    fn test_shoot_limit() {
        let mut player = player_at(100.0, 340.0);
        let mut events = Events::new();
        let pellet = player.shoot(0, &mut events).unwrap();
        assert_eq!(pellet.body.position, Vec2::new(112.0, 336.0));
        assert!(player.shooting);
        assert!(player.shoot(3, &mut events).is_none());
        assert_eq!(events.sounds.len(), 1);
    }

    #[test]
    fn test_pose_selection() {
        let mut player = player_at(100.0, 340.0);
        assert_eq!(player.pose(), PlayerPose::Still);
        player.move_left();
        assert_eq!(player.pose(), PlayerPose::Walk);
        player.shooting = true;
        assert_eq!(player.pose(), PlayerPose::WalkShoot);
        player.body.velocity.y = 1.0;
        assert_eq!(player.pose(), PlayerPose::JumpShoot);

        player.update_animation(DT);
        assert_eq!(player.body.size, Vec2::new(16.0, 24.0));
        assert!(!player.frame().sprite.flip);
    }
}
