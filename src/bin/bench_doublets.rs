//! Benchmark doublet finding on synthetic events.
//!
//! Run with: cargo run --release --bin bench_doublets
//!
//! Usage:
//!   bench_doublets                  Run 200 events with default occupancy
//!   bench_doublets -n 1000          More events
//!   bench_doublets --tracks 600     Busier events
//!   bench_doublets --parallel       Spread events across threads

use clap::Parser;
use pixel_doublets::{find_doublets_with_config, BeamSpot, FinderConfig, Hit};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::f32::consts::PI;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(about = "Benchmark windowed doublet finding on synthetic events")]
struct Args {
    /// Number of events to generate and scan.
    #[arg(short = 'n', long, default_value_t = 200)]
    events: usize,

    /// Tracks per event (each contributes one hit per layer).
    #[arg(long, default_value_t = 400)]
    tracks: usize,

    /// Uncorrelated noise hits per layer.
    #[arg(long, default_value_t = 100)]
    noise: usize,

    /// Angular half-window in rad.
    #[arg(long, default_value_t = 0.04)]
    window: f32,

    /// Scan events on a rayon thread pool instead of sequentially.
    #[arg(long)]
    parallel: bool,

    /// RNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

struct SyntheticEvent {
    bs: BeamSpot,
    layer1: Vec<Hit>,
    layer2: Vec<Hit>,
}

fn generate_event<R: Rng>(tracks: usize, noise: usize, rng: &mut R) -> SyntheticEvent {
    let bs = BeamSpot {
        r: rng.gen_range(0.0..0.1),
        phi: rng.gen_range(-PI..PI),
        z: rng.gen_range(-3.0..3.0),
    };

    let mut layer1 = Vec::with_capacity(tracks + noise);
    let mut layer2 = Vec::with_capacity(tracks + noise);

    for _ in 0..tracks {
        let phi = rng.gen_range(-PI..PI);
        let cot_theta = rng.gen_range(-2.0..2.0);
        let z0 = bs.z + rng.gen_range(-5.0..5.0);

        for (radius, layer) in [(3.0f32, &mut layer1), (6.8f32, &mut layer2)] {
            let r = radius + rng.gen_range(-0.05..0.05);
            let mut hit_phi = phi + rng.gen_range(-0.005..0.005);
            if hit_phi > PI {
                hit_phi -= 2.0 * PI;
            } else if hit_phi <= -PI {
                hit_phi += 2.0 * PI;
            }
            layer.push(Hit {
                r,
                phi: hit_phi,
                z: z0 + r * cot_theta,
            });
        }
    }

    for (radius, layer) in [(3.0f32, &mut layer1), (6.8f32, &mut layer2)] {
        for _ in 0..noise {
            layer.push(Hit {
                r: radius + rng.gen_range(-0.05..0.05),
                phi: rng.gen_range(-PI..PI),
                z: rng.gen_range(-27.0..27.0),
            });
        }
    }

    SyntheticEvent { bs, layer1, layer2 }
}

fn main() {
    let args = Args::parse();

    let config = FinderConfig {
        half_window_rad: args.window,
        ..FinderConfig::default()
    };

    println!(
        "Generating {} events ({} tracks + {} noise hits per layer)...",
        args.events, args.tracks, args.noise
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let events: Vec<SyntheticEvent> = (0..args.events)
        .map(|_| generate_event(args.tracks, args.noise, &mut rng))
        .collect();

    let wall = Instant::now();
    let (doublets, formatting, sorting, finding) = if args.parallel {
        events
            .par_iter()
            .map(scan_event(&config))
            .reduce(|| (0, Duration::ZERO, Duration::ZERO, Duration::ZERO), add)
    } else {
        events
            .iter()
            .map(scan_event(&config))
            .fold((0, Duration::ZERO, Duration::ZERO, Duration::ZERO), add)
    };
    let wall = wall.elapsed();

    println!(
        "{} doublets over {} events in {:.3} s ({:.1} us/event)",
        doublets,
        args.events,
        wall.as_secs_f64(),
        wall.as_secs_f64() * 1e6 / args.events as f64
    );
    println!(
        "cpu time per phase: formatting {:.3} s, sorting {:.3} s, finding {:.3} s",
        formatting.as_secs_f64(),
        sorting.as_secs_f64(),
        finding.as_secs_f64()
    );
}

type EventTotals = (usize, Duration, Duration, Duration);

fn scan_event(config: &FinderConfig) -> impl Fn(&SyntheticEvent) -> EventTotals + Sync + '_ {
    move |event| {
        let output = find_doublets_with_config(&event.bs, &event.layer1, &event.layer2, config)
            .expect("scan cannot fail");
        (
            output.doublets.len(),
            output.timing.formatting,
            output.timing.sorting,
            output.timing.finding,
        )
    }
}

fn add(a: EventTotals, b: EventTotals) -> EventTotals {
    (a.0 + b.0, a.1 + b.1, a.2 + b.2, a.3 + b.3)
}
