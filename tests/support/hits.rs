#![allow(dead_code)]

use pixel_doublets::compact::length_to_compact;
use pixel_doublets::{sort_hits_by_phi, CompactHit};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random phi-sorted layer spread over the full circle.
///
/// `dr` stays within +/-0.5 cm of the layer reference and `z` within the
/// barrel (+/-25 cm).
pub fn random_layer(n: usize, seed: u64) -> Vec<CompactHit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_layer_with_rng(n, &mut rng)
}

pub fn random_layer_with_rng<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<CompactHit> {
    let dr_max = length_to_compact(0.5) as i16;
    let z_max = length_to_compact(25.0);
    let mut layer: Vec<CompactHit> = (0..n)
        .map(|_| CompactHit {
            dr: rng.gen_range(-dr_max..=dr_max),
            phi: rng.gen_range(i16::MIN..=i16::MAX),
            z: rng.gen_range(-z_max..=z_max),
        })
        .collect();
    sort_hits_by_phi(&mut layer);
    layer
}

/// Random phi-sorted layer with all hits at `z = 0` and `dr = 0`.
///
/// Every geometrically windowed pair passes the longitudinal test, which
/// makes the angular machinery the only thing under test and keeps results
/// independent of the beam-spot projection.
pub fn flat_layer(n: usize, seed: u64) -> Vec<CompactHit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut layer: Vec<CompactHit> = (0..n)
        .map(|_| CompactHit {
            dr: 0,
            phi: rng.gen_range(i16::MIN..=i16::MAX),
            z: 0,
        })
        .collect();
    sort_hits_by_phi(&mut layer);
    layer
}

/// Phi-sorted layer clustered around `center_phi` (wrapping), for stressing
/// the +/-pi seam.
pub fn clustered_layer(n: usize, center_phi: i16, spread: i16, seed: u64) -> Vec<CompactHit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let z_max = length_to_compact(10.0);
    let mut layer: Vec<CompactHit> = (0..n)
        .map(|_| CompactHit {
            dr: 0,
            phi: center_phi.wrapping_add(rng.gen_range(-spread..=spread)),
            z: rng.gen_range(-z_max..=z_max),
        })
        .collect();
    sort_hits_by_phi(&mut layer);
    layer
}

/// Layer of `n` identical hits at phi = 0, z = 0.
///
/// Against itself this produces `n * n` doublets, which is the easiest way
/// to overflow a bounded output buffer.
pub fn coincident_layer(n: usize) -> Vec<CompactHit> {
    vec![CompactHit { dr: 0, phi: 0, z: 0 }; n]
}
