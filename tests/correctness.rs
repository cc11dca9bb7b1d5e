//! Correctness tests for the windowed doublet scan.
//!
//! Ground truth is the brute-force reference engine; the windowed engine must
//! produce the same candidate set on every input, including layers clustered
//! at the +/-pi seam where the wrap passes do the work.

mod support;

use pixel_doublets::compact::{length_to_compact, radians_to_compact};
use pixel_doublets::reference::{find_doublets_brute, same_candidates};
use pixel_doublets::{
    run_to_completion, CompactBeamSpot, CompactHit, CpuFinder, Doublet, DoubletFinder,
    FinderConfig, FinderState,
};
use support::hits::{clustered_layer, flat_layer, random_layer};

fn find(
    bs: &CompactBeamSpot,
    layer1: &[CompactHit],
    layer2: &[CompactHit],
) -> Vec<Doublet> {
    let mut finder = CpuFinder::new();
    let mut out = Vec::new();
    run_to_completion(&mut finder, bs, layer1, layer2, &mut out).unwrap();
    out
}

#[test]
fn single_radial_track_yields_one_doublet() {
    // One hit per layer on a line from the origin, well inside the window.
    let bs = CompactBeamSpot::new(0, 0, 0);
    let layer1 = [CompactHit { dr: 0, phi: 100, z: length_to_compact(3.0) }];
    let layer2 = [CompactHit { dr: 0, phi: 150, z: length_to_compact(6.8) }];

    let doublets = find(&bs, &layer1, &layer2);
    assert_eq!(doublets, vec![Doublet { inner: 0, outer: 0 }]);
}

#[test]
fn empty_layers_produce_nothing() {
    let bs = CompactBeamSpot::new(0, 0, 0);
    let hit = [CompactHit { dr: 0, phi: 0, z: 0 }];

    assert!(find(&bs, &[], &hit).is_empty());
    assert!(find(&bs, &hit, &[]).is_empty());
    assert!(find(&bs, &[], &[]).is_empty());
}

#[test]
fn matches_brute_force_on_random_layers() {
    // Beam spot on the axis so both engines see the same projection in every
    // code path; the displaced-spot agreement is covered separately.
    let config = FinderConfig::default();
    for seed in 0..8u64 {
        let layer1 = random_layer(50, seed);
        let layer2 = random_layer(50, seed.wrapping_add(1000));
        let bs = CompactBeamSpot::new(0, length_to_compact(0.3), 500);

        let windowed = find(&bs, &layer1, &layer2);
        let brute = find_doublets_brute(&bs, &layer1, &layer2, &config);
        assert!(
            same_candidates(&windowed, &brute),
            "seed {}: windowed {} vs brute {}",
            seed,
            windowed.len(),
            brute.len()
        );
    }
}

#[test]
fn matches_brute_force_at_the_seam() {
    // Both layers concentrated around +/-pi so that most windows straddle the
    // wrap and the dedicated passes carry the result.
    let config = FinderConfig::default();
    for seed in 0..8u64 {
        let layer1 = clustered_layer(40, i16::MIN, 900, seed);
        let layer2 = clustered_layer(40, i16::MIN, 900, seed.wrapping_add(77));
        let bs = CompactBeamSpot::new(0, 0, i16::MIN);

        let windowed = find(&bs, &layer1, &layer2);
        let brute = find_doublets_brute(&bs, &layer1, &layer2, &config);
        assert!(!brute.is_empty(), "seed {} produced a vacuous case", seed);
        assert!(same_candidates(&windowed, &brute), "seed {}", seed);
    }
}

#[test]
fn matches_brute_force_with_flat_geometry() {
    // z = 0 everywhere makes the longitudinal test pass for every windowed
    // pair, isolating the angular window bookkeeping.
    let config = FinderConfig::default();
    let layer1 = flat_layer(60, 7);
    let layer2 = flat_layer(60, 8);
    let bs = CompactBeamSpot::new(length_to_compact(0.08), 0, 1200);

    let windowed = find(&bs, &layer1, &layer2);
    let brute = find_doublets_brute(&bs, &layer1, &layer2, &config);
    assert!(same_candidates(&windowed, &brute));
}

#[test]
fn window_bounds_are_inclusive() {
    let window = radians_to_compact(0.04);
    assert_eq!(window, 417);

    let bs = CompactBeamSpot::new(0, 0, 0);
    let layer1 = [CompactHit { dr: 0, phi: 0, z: 0 }];
    let layer2 = [
        CompactHit { dr: 0, phi: -window - 1, z: 0 },
        CompactHit { dr: 0, phi: -window, z: 0 },
        CompactHit { dr: 0, phi: window, z: 0 },
        CompactHit { dr: 0, phi: window + 1, z: 0 },
    ];

    let doublets = find(&bs, &layer1, &layer2);
    assert_eq!(
        doublets,
        vec![Doublet { inner: 0, outer: 1 }, Doublet { inner: 0, outer: 2 }]
    );
}

#[test]
fn window_recovers_pairs_across_the_wrap() {
    let bs = CompactBeamSpot::new(0, 0, 0);

    // Inner just below +pi, outer just above -pi: the window wraps high.
    let layer1 = [CompactHit { dr: 0, phi: 32_760, z: 0 }];
    let layer2 = [CompactHit { dr: 0, phi: -32_740, z: 0 }];
    assert_eq!(find(&bs, &layer1, &layer2), vec![Doublet { inner: 0, outer: 0 }]);

    // Mirrored: inner just above -pi, outer just below +pi, wrapping low.
    let layer1 = [CompactHit { dr: 0, phi: -32_760, z: 0 }];
    let layer2 = [CompactHit { dr: 0, phi: 32_740, z: 0 }];
    assert_eq!(find(&bs, &layer1, &layer2), vec![Doublet { inner: 0, outer: 0 }]);
}

#[test]
fn longitudinal_test_rejects_incompatible_z() {
    // Same phi, but the z step between layers is far too large for any track
    // from the luminous region.
    let bs = CompactBeamSpot::new(0, 0, 0);
    let layer1 = [CompactHit { dr: 0, phi: 0, z: length_to_compact(2.0) }];
    let layer2 = [CompactHit { dr: 0, phi: 0, z: length_to_compact(24.0) }];
    assert!(find(&bs, &layer1, &layer2).is_empty());
}

#[test]
fn finished_state_rearms_after_drain() {
    let bs = CompactBeamSpot::new(0, 0, 0);
    let layer = [CompactHit { dr: 0, phi: 0, z: 0 }];

    let mut finder = CpuFinder::new();
    finder.find(&bs, &layer, &layer).unwrap();
    assert_eq!(finder.state(), FinderState::Finished);

    let mut out = Vec::new();
    assert_eq!(finder.get_doublets(&mut out).unwrap(), 1);
    assert_eq!(finder.state(), FinderState::Ready);

    // A second drain without a new search is a protocol violation.
    assert!(finder.get_doublets(&mut out).is_err());
}
