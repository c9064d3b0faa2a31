//! Collision World demo driver
//!
//! Scatters a seeded random layout of short segments over the default box
//! and runs it for a fixed number of steps. `RUST_LOG=debug` shows per-step
//! counts.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use collision_world::consts::*;
use collision_world::{SegmentSpec, World, WorldConfig};

const SEED: u64 = 0x5eed;
const SEGMENTS: usize = 1000;
const STEPS: u64 = 500;

/// Random short segments, fully inside the box
fn random_layout(rng: &mut Pcg32, count: usize) -> Vec<SegmentSpec> {
    let margin = 0.05 * (BOX_XMAX - BOX_XMIN);
    (0..count)
        .map(|_| {
            let p1 = DVec2::new(
                rng.random_range(BOX_XMIN + margin..BOX_XMAX - margin),
                rng.random_range(BOX_YMIN + margin..BOX_YMAX - margin),
            );
            let angle = rng.random_range(0.0..std::f64::consts::TAU);
            let length = rng.random_range(0.2..0.8) * margin;
            let p2 = p1 + DVec2::new(angle.cos(), angle.sin()) * length;
            let velocity = DVec2::new(
                rng.random_range(-0.01..0.01),
                rng.random_range(-0.01..0.01),
            );
            SegmentSpec::new(p1, p2, velocity)
        })
        .collect()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = Pcg32::seed_from_u64(SEED);
    let specs = random_layout(&mut rng, SEGMENTS);

    let mut world = match World::new(WorldConfig::default(), &specs) {
        Ok(world) => world,
        Err(err) => {
            log::error!("Failed to build world: {err}");
            std::process::exit(1);
        }
    };

    for _ in 0..STEPS {
        world.step();
    }

    log::info!(
        "{} segments, {} steps: {} segment collisions, {} wall collisions",
        world.len(),
        world.steps(),
        world.segment_collisions(),
        world.wall_collisions()
    );
}
