//! The simulation: world, player and interaction behind one resource.
//!
//! `Simulation` is the only thing the host talks to. It gates everything on
//! the block textures being ready, runs the per-tick player update against
//! the world, and routes discrete input events (break, place, jump, teleport)
//! between ticks.
//!
//! # Example:
//!
//! ```
//! use std::time::Duration;
//! use cavegame::settings::Settings;
//! use cavegame::sim::{InputEvent, Simulation};
//!
//! let mut sim = Simulation::new(Settings::defaults());
//! assert!(sim.tick(1.0 / 60.0).is_err());
//! sim.assets_ready().unwrap();
//! sim.tick(1.0 / 60.0).unwrap();
//! // Still falling from the spawn height, so the jump is refused.
//! assert!(!sim.handle(InputEvent::Jump, Duration::ZERO));
//! ```

use crate::block::InteractionService;
use crate::error::SimError;
use crate::player::physics::Aabb;
use crate::player::{Player, PlayerIntent};
use crate::settings::Settings;
use crate::world::{Ray, RaycastHit, VoxelWorld, WorldEvent};
use bevy::log::{debug, error, info, warn};
use bevy::prelude::Resource;
use std::time::Duration;

/// Asset-gated lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimPhase {
    AwaitingAssets,
    Running,
    Failed(String),
}

/// Discrete input, applied between ticks in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Break,
    Place,
    Jump,
    Teleport,
}

#[derive(Resource)]
pub struct Simulation {
    world: VoxelWorld,
    player: Player,
    interaction: InteractionService,
    settings: Settings,
    phase: SimPhase,
    rng: fastrand::Rng,
}

impl Simulation {
    /// Create a simulation waiting for its textures. The world stays empty
    /// until [`Simulation::assets_ready`].
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, fastrand::Rng::new())
    }

    /// Same as [`Simulation::new`] with a fixed seed for teleports.
    #[must_use]
    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        Self::with_rng(settings, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(settings: Settings, rng: fastrand::Rng) -> Self {
        let world = VoxelWorld::new(&settings.world);
        let player = Player::spawn(world.dimensions(), &settings.player);
        let interaction = InteractionService::new(&settings.interaction);
        Simulation {
            world,
            player,
            interaction,
            settings,
            phase: SimPhase::AwaitingAssets,
            rng,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &SimPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == SimPhase::Running
    }

    /// All textures are loaded: generate the world and start running.
    ///
    /// # Errors
    /// `SimError::AssetsFailed` if a texture already failed to load.
    pub fn assets_ready(&mut self) -> Result<(), SimError> {
        match &self.phase {
            SimPhase::Failed(reason) => Err(SimError::AssetsFailed(reason.clone())),
            SimPhase::Running => {
                debug!("assets reported ready twice");
                Ok(())
            }
            SimPhase::AwaitingAssets => {
                self.world.generate();
                self.phase = SimPhase::Running;
                info!("simulation running");
                Ok(())
            }
        }
    }

    /// A texture failed to load. The world will never generate and ticks
    /// are refused from now on.
    ///
    /// # Return
    /// The matching error. It is logged here, so callers need not log it again.
    pub fn assets_failed(&mut self, reason: impl Into<String>) -> SimError {
        let reason = reason.into();
        error!("block textures failed to load: {reason}");
        self.phase = SimPhase::Failed(reason.clone());
        SimError::AssetsFailed(reason)
    }

    /// Advance the player by `dt` seconds.
    ///
    /// Non-finite or negative `dt` is ignored and long frames are capped at
    /// `player.max_tick`.
    ///
    /// # Errors
    /// `SimError::NotRunning` before the assets are ready or after they failed.
    pub fn tick(&mut self, dt: f32) -> Result<(), SimError> {
        if !self.is_running() {
            return Err(SimError::NotRunning);
        }
        if !dt.is_finite() || dt < 0.0 {
            debug!("ignoring tick with dt = {dt}");
            return Ok(());
        }
        let dt = dt.min(self.settings.player.max_tick);
        self.player.tick(&self.world, &self.settings, dt);
        Ok(())
    }

    /// Apply a discrete input event.
    ///
    /// # Arguments
    /// * `event` - what the user asked for
    /// * `now` - host clock reading, used by the break/place cooldowns
    ///
    /// # Return
    /// * `true` if the event changed anything.
    pub fn handle(&mut self, event: InputEvent, now: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        match event {
            InputEvent::Break => self.break_along(self.player.look_ray(), now),
            InputEvent::Place => self.place_along(self.player.look_ray(), now),
            InputEvent::Jump => self.player.jump(&self.settings.player),
            InputEvent::Teleport => {
                self.player.teleport_to_random(self.world.dimensions(), &mut self.rng);
                true
            }
        }
    }

    /// Break along an explicit ray instead of the view ray.
    pub fn break_along(&mut self, ray: Ray, now: Duration) -> bool {
        self.is_running() && self.interaction.break_block(&mut self.world, ray, now)
    }

    /// Place along an explicit ray instead of the view ray. Cells the
    /// player's body overlaps are refused.
    pub fn place_along(&mut self, ray: Ray, now: Duration) -> bool {
        let body = Aabb::around(self.player.position, &self.settings.player);
        self.is_running() && self.interaction.place_block_clear_of(&mut self.world, ray, now, &body)
    }

    /// Block under the crosshair, if any.
    #[must_use]
    pub fn target(&self) -> Option<RaycastHit> {
        self.interaction.target(&self.world, self.player.look_ray())
    }

    /// Hot-swap tunables. World dimensions are fixed for the lifetime of the
    /// world and are kept as they are.
    pub fn apply_settings(&mut self, mut settings: Settings) {
        if settings.world != self.settings.world {
            warn!("world dimensions changed in settings; they apply on the next start");
            settings.world = self.settings.world.clone();
        }
        self.interaction.apply_settings(&settings.interaction);
        self.settings = settings;
        info!("settings applied");
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn world(&self) -> &VoxelWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut VoxelWorld {
        &mut self.world
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn intent_mut(&mut self) -> &mut PlayerIntent {
        &mut self.player.intent
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionService {
        &self.interaction
    }

    /// World changes since the last call, for the renderer.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        self.world.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use bevy::math::{IVec3, Vec3};

    const DT: f32 = 1.0 / 60.0;

    fn running() -> Simulation {
        let mut sim = Simulation::with_seed(Settings::defaults(), 1);
        sim.assets_ready().unwrap();
        sim
    }

    fn run(sim: &mut Simulation, ticks: usize) {
        for _ in 0..ticks {
            sim.tick(DT).unwrap();
        }
    }

    fn rested() -> Simulation {
        let mut sim = running();
        run(&mut sim, 300);
        sim
    }

    #[test]
    fn spawn_then_rest_on_grass() {
        let mut sim = running();
        let pose = sim.player().pose();
        assert_eq!(pose.position, Vec3::new(64.0, 34.0, 64.0));
        assert_eq!((pose.pitch, pose.yaw), (0.0, 0.0));

        run(&mut sim, 300);
        let p = sim.player();
        assert!(p.position.abs_diff_eq(Vec3::new(64.0, 8.6, 64.0), 1e-3), "{}", p.position);
        assert!(p.grounded);
        assert_eq!(p.velocity_y, 0.0);
    }

    #[test]
    fn walk_forward_one_second() {
        let mut sim = rested();
        sim.intent_mut().forward = true;
        run(&mut sim, 60);
        let p = sim.player().position;
        assert!((p.z - 59.5).abs() < 1e-3, "{p}");
        assert!((p.x - 64.0).abs() < 1e-3);
        assert!((p.y - 8.6).abs() < 1e-3);
    }

    #[test]
    fn wall_stops_the_walk() {
        let mut sim = rested();
        assert!(sim.world_mut().place_block(IVec3::new(64, 7, 62), BlockKind::Cobblestone));
        sim.intent_mut().forward = true;
        run(&mut sim, 60);
        let p = sim.player().position;
        assert!(p.z - 0.3 >= 63.0 - 1e-3, "{p}");
        assert!(p.z < 63.4);
        assert_eq!(p.x, 64.0);
    }

    #[test]
    fn break_below_and_fall_one_block() {
        let mut sim = rested();
        sim.player_mut().position = Vec3::new(64.5, 8.6, 64.5);
        run(&mut sim, 1);
        assert!(sim.player().grounded);

        let down = Ray::new(sim.player().position, Vec3::NEG_Y);
        assert!(sim.break_along(down, Duration::ZERO));
        assert!(!sim.world().has_block(IVec3::new(64, 6, 64)));

        // 2 / sqrt(gravity) seconds at 60 Hz.
        run(&mut sim, 27);
        let p = sim.player();
        assert!((p.position.y - 7.6).abs() < 1e-3, "{}", p.position);
        assert!(p.grounded);
    }

    #[test]
    fn place_facing_east() {
        let mut sim = rested();
        let max_pitch = sim.settings().look.max_pitch;
        sim.player_mut().look_at(Vec3::X, max_pitch);

        // Nothing but sky at eye height.
        assert!(!sim.handle(InputEvent::Place, Duration::ZERO));

        assert!(sim.world_mut().place_block(IVec3::new(66, 8, 64), BlockKind::Grass));
        let t0 = Duration::from_secs(1);
        assert!(sim.handle(InputEvent::Place, t0));
        assert_eq!(sim.world().get_block(IVec3::new(65, 8, 64)), Some(BlockKind::Grass));
        assert!(!sim.handle(InputEvent::Place, t0 + Duration::from_millis(499)));

        let elsewhere = Ray::new(Vec3::new(70.5, 10.5, 64.5), Vec3::NEG_Y);
        assert!(sim.place_along(elsewhere, t0 + Duration::from_millis(500)));
        assert!(sim.world().has_block(IVec3::new(70, 7, 64)));
    }

    #[test]
    fn place_at_the_feet_is_refused_and_player_stays_free() {
        let mut sim = rested();
        let max_pitch = sim.settings().look.max_pitch;
        sim.player_mut().look_at(Vec3::new(0.0, -(3.0f32).sqrt(), -1.0), max_pitch);
        let hit = sim.target().unwrap();
        let feet_cell = hit.adjacent();
        assert_eq!(feet_cell, IVec3::new(64, 7, 63));

        assert!(!sim.handle(InputEvent::Place, Duration::ZERO));
        assert!(!sim.world().has_block(feet_cell));
        assert!(!crate::player::physics::collides(sim.world(), sim.player().position, &sim.settings().player));

        let start = sim.player().position;
        sim.intent_mut().backward = true;
        run(&mut sim, 60);
        assert!(sim.player().position.distance(start) > 1.0, "{}", sim.player().position);
    }

    #[test]
    fn bedrock_layer_is_permanent() {
        let mut sim = running();
        let world = sim.world_mut();
        for x in 0..128 {
            for z in 0..128 {
                assert!(!world.remove_block(IVec3::new(x, 0, z)));
            }
        }
        assert_eq!(world.count_layer(0), 128 * 128);
    }

    #[test]
    fn nothing_runs_before_assets() {
        let mut sim = Simulation::new(Settings::defaults());
        assert_eq!(sim.tick(DT), Err(SimError::NotRunning));
        assert!(!sim.handle(InputEvent::Teleport, Duration::ZERO));
        assert!(sim.world().is_empty());
        assert_eq!(sim.phase(), &SimPhase::AwaitingAssets);
    }

    #[test]
    fn failed_assets_block_generation() {
        let mut sim = Simulation::new(Settings::defaults());
        let err = sim.assets_failed("grass.png missing");
        assert_eq!(err, SimError::AssetsFailed("grass.png missing".into()));
        assert_eq!(sim.assets_ready(), Err(SimError::AssetsFailed("grass.png missing".into())));
        assert!(sim.world().is_empty());
        assert_eq!(sim.tick(DT), Err(SimError::NotRunning));
    }

    #[test]
    fn assets_ready_generates_once() {
        let mut sim = running();
        assert!(sim.assets_ready().is_ok());
        assert_eq!(sim.drain_events(), vec![WorldEvent::Generated]);
        assert_eq!(sim.world().len(), 128 * 128 * 7);
    }

    #[test]
    fn bad_and_long_frames_are_tamed() {
        let mut sim = running();
        sim.tick(f32::NAN).unwrap();
        sim.tick(-1.0).unwrap();
        assert_eq!(sim.player().position.y, 34.0);
        sim.tick(10.0).unwrap();
        let y = sim.player().position.y;
        assert!((y - (34.0 - 2.0 * 0.1)).abs() < 1e-4, "{y}");
    }

    #[test]
    fn teleport_and_jump_events() {
        let mut sim = rested();
        assert!(sim.handle(InputEvent::Jump, Duration::ZERO));
        assert!(!sim.handle(InputEvent::Jump, Duration::ZERO));
        assert!(sim.handle(InputEvent::Teleport, Duration::ZERO));
        let p = sim.player();
        assert!(p.position.y >= 50.0);
        assert!(!p.grounded);
    }

    #[test]
    fn settings_hot_swap_keeps_world_size() {
        let mut sim = running();
        let mut next = Settings::defaults();
        next.world.width = 16;
        next.player.speed = 9.0;
        next.interaction.place_cooldown_ms = 0;
        sim.apply_settings(next);
        assert_eq!(sim.settings().world.width, 128);
        assert_eq!(sim.settings().player.speed, 9.0);

        let ray = Ray::new(Vec3::new(10.5, 10.5, 10.5), Vec3::NEG_Y);
        assert!(sim.place_along(ray, Duration::ZERO));
        assert!(sim.place_along(ray, Duration::ZERO));
    }

    #[test]
    fn crosshair_target_follows_look() {
        let mut sim = rested();
        assert!(sim.target().is_none());
        let max_pitch = sim.settings().look.max_pitch;
        sim.player_mut().look_at(Vec3::new(0.0, -1.0, -1.0), max_pitch);
        let hit = sim.target().unwrap();
        assert_eq!(hit.coord.y, 6);
    }

    #[test]
    fn random_play_keeps_invariants() {
        let mut sim = rested();
        let mut rng = fastrand::Rng::with_seed(21);
        let mut now = Duration::ZERO;
        let eye_level = sim.settings().player.eye_level;
        for _ in 0..1_500 {
            let intent = sim.intent_mut();
            intent.forward = rng.bool();
            intent.right = rng.bool();
            intent.look_down = rng.u8(..) < 40;
            intent.look_left = rng.bool();
            now += Duration::from_millis(rng.u64(0..100));
            match rng.u8(..4) {
                0 => {
                    sim.handle(InputEvent::Break, now);
                }
                1 => {
                    sim.handle(InputEvent::Place, now);
                }
                2 => {
                    sim.handle(InputEvent::Jump, now);
                }
                _ => {}
            }
            sim.tick(DT).unwrap();
            let world = sim.world();
            assert!(sim.player().position.y >= eye_level);
            assert_eq!(world.count_layer(0), 128 * 128);
            let p = sim.player();
            assert!(!p.grounded || p.velocity_y == 0.0);
            assert!(p.look.pitch.abs() <= sim.settings().look.max_pitch);
            assert!((0.0..std::f32::consts::TAU).contains(&p.look.yaw));
        }
        assert!(sim.world().blocks().all(|(c, _)| sim.world().contains(c)));
    }
}
