//! 窗口变换与 ROI 网格统计的整体性质.

use ct_roi::prelude::*;
use ndarray::{Array1, Array3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn noisy_volume(shape: Idx3d, seed: u64) -> Array3<f32> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    Array3::from_shape_simple_fn(shape, || rng.gen_range(-1024.0..2048.0))
}

fn blob_mask(shape: Idx3d) -> Array3<u8> {
    let (_, r, c) = shape;
    Array3::from_shape_fn(shape, |(z, h, w)| {
        let dh = h as f64 - r as f64 / 2.0;
        let dw = w as f64 - c as f64 / 2.0;
        let radius = (r.min(c) as f64 / 3.0) + z as f64;
        (dh * dh + dw * dw <= radius * radius) as u8 * LITS_LIVER
    })
}

#[test]
fn window_output_is_bounded() {
    let samples = noisy_volume((3, 17, 19), 7);
    for (window, level, max_display) in [(1.0, 0.0, 255), (400.0, 40.0, 255), (35.0, -600.0, 100)] {
        let out = window_level(&samples, window, level, max_display).unwrap();
        assert_eq!(out.dim(), samples.dim());
        assert!(out.iter().all(|&p| p <= max_display));
    }
}

#[test]
fn window_is_monotonic() {
    let mut sorted: Vec<f32> = noisy_volume((1, 1, 500), 11).iter().copied().collect();
    sorted.sort_by(f32::total_cmp);
    let a = Array1::from(sorted);
    let out = window_level(&a, 150.0, 40.0, 255).unwrap().to_vec();
    assert!(out.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn window_literal_values() {
    // m = 127.5, o = -127.5 => 127.5, 向零截断为 127.
    let zeros = Array3::<f32>::zeros((2, 2, 2));
    let out = window_level(&zeros, 1.0, 0.0, 255).unwrap();
    assert!(out.iter().all(|&p| p == 127));

    // m = 1.275, o = -127.5: 100 => 254.99999999999997 => 254, 0 => 127, -100 => 0.
    let hundred = Array3::<f32>::from_elem((1, 2, 2), 100.0);
    let out = window_level(&hundred, 100.0, 0.0, 255).unwrap();
    assert!(out.iter().all(|&p| p == 254));
    let out = window_level(&Array1::from(vec![-100.0f32, 0.0, 50.0]), 100.0, 0.0, 255).unwrap();
    assert_eq!(out.to_vec(), vec![0, 127, 191]);
}

#[test]
fn window_rejects_non_positive_width() {
    let a = Array1::<f32>::zeros(4);
    for window in [0.0, -1.0] {
        assert!(matches!(
            window_level(&a, window, 0.0, 255),
            Err(RoiError::InvalidParameter { name: "window", .. })
        ));
    }
}

#[test]
fn region_means_use_only_selected_voxels() {
    let shape = (4, 37, 41);
    let volume = noisy_volume(shape, 3);
    let mask = blob_mask(shape);
    for dx in [1, 3, 8, 16] {
        let sweeper = RoiSweeper::new(dx).unwrap();
        let stats = sweeper.sweep(&volume, &mask).unwrap();
        let mut emitted = stats.iter().peekable();

        for origin in sweeper.origins(shape) {
            let (k, j, i) = origin;
            let mut selected = Vec::new();
            for h in j..j + dx {
                for w in i..i + dx {
                    if mask[(k, h, w)] != 0 {
                        selected.push(volume[(k, h, w)] as f64);
                    }
                }
            }
            if selected.is_empty() {
                assert!(emitted.peek().map_or(true, |r| r.origin != origin));
                continue;
            }
            let r = emitted.next().unwrap();
            assert_eq!(r.origin, origin);
            assert_eq!(r.count, selected.len());
            let mean = selected.iter().sum::<f64>() / selected.len() as f64;
            assert!((r.mean - mean).abs() < 1e-6);
        }
        assert!(emitted.next().is_none());
    }
}

#[test]
fn region_indices_strictly_increase() {
    let shape = (3, 30, 30);
    let volume = noisy_volume(shape, 5);
    let mask = blob_mask(shape);
    let stats = sweep(&volume, &mask, 4).unwrap();
    assert!(!stats.is_empty());
    assert!(stats.windows(2).all(|w| w[0].index < w[1].index));
    for r in &stats {
        let (k, j, i) = r.origin;
        assert_eq!(r.index, i + j * 30 + k * 30 * 30);
    }
}

#[test]
fn full_side_yields_empty_sweep() {
    let volume = Array3::<f32>::from_elem((1, 8, 8), 10.0);
    let mask = Array3::<u8>::ones((1, 8, 8));
    assert!(sweep(&volume, &mask, 8).unwrap().is_empty());
    assert!(sweep(&volume, &mask, 100).unwrap().is_empty());
}

#[test]
fn constant_volume_baseline() {
    let volume = Array3::<f32>::from_elem((2, 16, 16), 50.0);
    let mask = Array3::<u8>::ones((2, 16, 16));
    let stats = sweep(&volume, &mask, 8).unwrap();
    // 行/列起点只有 0.
    assert_eq!(stats.len(), 2);
    for r in &stats {
        assert_eq!(r.mean, 50.0);
        assert_eq!(r.sem, 0.0);
        assert_eq!(r.count, 64);
    }
    assert_eq!(masked_mean(&volume, &mask).unwrap(), Some(50.0));

    let data = CtData3d::new(CtScan::from_array(volume), CtMask::from_array(mask)).unwrap();
    assert_eq!(data.sweep(8).unwrap(), stats);
}

#[test]
fn shape_mismatch_is_reported() {
    let volume = Array3::<f32>::zeros((2, 16, 16));
    let mask = Array3::<u8>::ones((2, 15, 16));
    match sweep(&volume, &mask, 8) {
        Err(RoiError::ShapeMismatch { volume, mask }) => {
            assert_eq!(volume, (2, 16, 16));
            assert_eq!(mask, (2, 15, 16));
        }
        other => panic!("expected shape mismatch, got {other:?}"),
    }
}

#[cfg(feature = "serde")]
#[test]
fn region_statistic_serializes() {
    let volume = Array3::<f32>::from_elem((1, 4, 4), 1.0);
    let mask = Array3::<u8>::ones((1, 4, 4));
    let stats = sweep(&volume, &mask, 2).unwrap();
    let json = serde_json::to_string(&stats[0]).unwrap();
    assert!(json.contains("\"index\":0"));
    assert!(json.contains("\"mean\":1.0"));
}
