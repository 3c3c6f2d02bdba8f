//! 切片图像保存.

use ct_roi::prelude::*;
use ndarray::Array3;
use std::path::PathBuf;

fn temp_png(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ct-roi-{}-{name}.png", std::process::id()))
}

#[test]
fn save_scan_and_mask_slices() {
    let _ = simple_logger::init_with_level(log::Level::Debug);

    let scan = CtScan::from_array(Array3::from_shape_fn((2, 6, 5), |(z, h, w)| {
        (z * 100 + h * 20 + w) as f32 - 40.0
    }));
    let mask = scan.threshold(0.0..=80.0);

    let p = temp_png("scan");
    scan.save_slice(1, &p).unwrap();
    let img = image::open(&p).unwrap().into_luma8();
    assert_eq!(img.dimensions(), (5, 6));
    std::fs::remove_file(&p).unwrap();

    let p = temp_png("mask");
    mask.save_slice(0, &p).unwrap();
    let img = image::open(&p).unwrap().into_luma8();
    // (0, 0) = -40 HU => 背景.
    assert_eq!(img.get_pixel(0, 0).0, [0]);
    // (h = 2, w = 0) = 0 HU => 肝脏.
    assert_eq!(img.get_pixel(0, 2).0, [255]);
    std::fs::remove_file(&p).unwrap();

    assert!(matches!(
        mask.save_slice(2, temp_png("oob")),
        Err(RoiError::SliceOutOfBounds { .. })
    ));
}
