use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use bevy::math::{Vec2, Vec3};
use cavegame::player::camera::PlayerLook;
use cavegame::player::Player;
use cavegame::settings::Settings;
use cavegame::sim::{InputEvent, Simulation};
use cavegame::world::VoxelWorld;

/// Small mouse deltas, as from a steady hand.
fn bench_camera_look_small(c: &mut Criterion) {
    let settings = Settings::defaults();
    c.bench_function("camera_look_small", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            for i in 0..1_000usize {
                let dx = ((i * 13) % 17) as f32 * 0.1;
                let dy = ((i * 7) % 23) as f32 * 0.2 - 5.0;
                look.apply_delta(black_box(Vec2::new(dx, dy)), &settings);
            }
            black_box((look.target_yaw, look.target_pitch));
        })
    });
}

/// Alternating huge deltas to exercise the pitch clamp and yaw wrap.
fn bench_camera_look_extreme(c: &mut Criterion) {
    let settings = Settings::defaults();
    c.bench_function("camera_look_extreme", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            for i in 0..1_000usize {
                let d = if (i & 1) == 0 { 1000.0 } else { -1000.0 };
                look.apply_delta(black_box(Vec2::new(d, -d)), &settings);
            }
            black_box((look.target_yaw, look.target_pitch));
        })
    });
}

/// Generate the default 128x32x128 world (seven filled layers).
fn bench_world_generate(c: &mut Criterion) {
    let settings = Settings::defaults();
    c.bench_function("world_generate", |b| {
        b.iter(|| {
            let mut world = VoxelWorld::new(&settings.world);
            world.generate();
            black_box(world.len());
        })
    });
}

/// Rays fanned out from the spawn point, mostly hitting the ground.
fn bench_raycast_fan(c: &mut Criterion) {
    let settings = Settings::defaults();
    let mut world = VoxelWorld::new(&settings.world);
    world.generate();
    let origin = Vec3::new(64.5, 8.6, 64.5);

    c.bench_function("raycast_fan", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for i in 0..360 {
                let a = (i as f32).to_radians();
                let dir = Vec3::new(a.cos(), -0.3, a.sin());
                if world.raycast(black_box(origin), dir, 64.0).is_some() {
                    hits += 1;
                }
            }
            black_box(hits);
        })
    });
}

/// Player falling from spawn height then walking in a circle.
fn bench_player_physics_sim(c: &mut Criterion) {
    let settings = Settings::defaults();
    let mut world = VoxelWorld::new(&settings.world);
    world.generate();

    c.bench_function("player_physics_many_steps", |b| {
        b.iter(|| {
            let mut player = Player::spawn(world.dimensions(), &settings.player);
            let dt = 1.0f32 / 60.0f32;
            player.intent.forward = true;
            player.intent.look_left = true;
            for _ in 0..5_000 {
                player.tick(&world, &settings, dt);
            }
            black_box(player.pose());
        })
    });
}

/// Full loop: tick plus a break and a place every few frames.
fn bench_simulation_play(c: &mut Criterion) {
    c.bench_function("simulation_play", |b| {
        b.iter(|| {
            let mut sim = Simulation::with_seed(Settings::defaults(), 7);
            let _ = sim.assets_ready();
            let mut now = Duration::ZERO;
            for i in 0..1_000u32 {
                let _ = sim.tick(1.0 / 60.0);
                now += Duration::from_millis(16);
                if i % 10 == 0 {
                    sim.handle(InputEvent::Break, now);
                }
                if i % 15 == 0 {
                    sim.handle(InputEvent::Place, now);
                }
                black_box(sim.drain_events());
            }
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_camera_look_small,
        bench_camera_look_extreme,
        bench_world_generate,
        bench_raycast_fan,
        bench_player_physics_sim,
        bench_simulation_play
}
criterion_main!(benches);
