//! Quadphase demo.
//!
//! Drives the spatial index the way a simulation loop does: every tick the
//! moving boxes are integrated, the index is rebuilt from their bounds,
//! candidate pairs are collected, and the exact rect test runs over the
//! candidates.

use broadphase::{BroadPhase, ColliderRef, Config};
use geom::Rect;
use glam::Vec2;
use rand::Rng;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One moving axis-aligned box in the demo world.
struct Mover {
    pos: Vec2,
    vel: Vec2,
    size: Vec2,
}

impl Mover {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Quadphase demo v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  Border: {}x{}", config.border.width, config.border.height);
    info!("  Node capacity: {}", config.spatial.node_capacity);
    info!("  Max depth: {}", config.spatial.max_depth);
    info!("  Movers: {}", config.demo.movers);

    let border = config.border.rect();
    let min_dim = border.w.min(border.h);
    let mut rng = rand::rng();
    let mut movers = Vec::with_capacity(config.demo.movers);
    for _ in 0..config.demo.movers {
        let size = rng.random_range(min_dim * 0.005..min_dim * 0.02);
        movers.push(Mover {
            pos: Vec2::new(
                rng.random_range(border.x..border.right() - size),
                rng.random_range(border.y..border.bottom() - size),
            ),
            vel: Vec2::new(
                rng.random_range(-min_dim * 0.04..min_dim * 0.04),
                rng.random_range(-min_dim * 0.04..min_dim * 0.04),
            ),
            size: Vec2::new(size, size),
        });
    }

    let mut broad = BroadPhase::new(&config.spatial);
    let mut refs = Vec::with_capacity(movers.len());
    let mut pairs = Vec::new();
    let stats_interval = config.demo.stats_interval.max(1);
    let dt = 0.04;

    for tick in 1..=config.demo.ticks {
        let tick_start = Instant::now();

        // Integrate and bounce off the border walls.
        for m in &mut movers {
            m.pos += m.vel * dt;
            if m.pos.x < border.x || m.pos.x + m.size.x > border.right() {
                m.vel.x = -m.vel.x;
                m.pos.x = m.pos.x.clamp(border.x, border.right() - m.size.x);
            }
            if m.pos.y < border.y || m.pos.y + m.size.y > border.bottom() {
                m.vel.y = -m.vel.y;
                m.pos.y = m.pos.y.clamp(border.y, border.bottom() - m.size.y);
            }
        }

        // Collider IDs are the mover indices.
        refs.clear();
        refs.extend(
            movers
                .iter()
                .enumerate()
                .map(|(id, m)| ColliderRef::new(id as u32, m.bounds())),
        );

        broad.rebuild(border, &refs);
        pairs.clear();
        let work = broad.candidate_pairs(&refs, &mut pairs);

        // Narrow phase: exact rect test over the candidates.
        let mut overlaps = 0usize;
        for p in &pairs {
            let a = movers[p.a as usize].bounds();
            let b = movers[p.b as usize].bounds();
            if a.intersects(&b) {
                overlaps += 1;
            }
        }

        if tick % stats_interval == 0 {
            info!(
                "tick {}: {} nodes, {} candidates visited, {} pairs, {} exact overlaps, {:?}",
                tick,
                broad.tree().node_count(),
                work,
                pairs.len(),
                overlaps,
                tick_start.elapsed()
            );
        }
    }

    info!("Demo finished after {} ticks", config.demo.ticks);
    Ok(())
}
