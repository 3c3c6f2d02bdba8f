//! 切片图像的持久化存储, 主要用于调试.

use super::check_slice;
use crate::{CtMask, CtScan, CtWindow, RoiResult, VoxelGrid};
use image::{GrayImage, Luma};
use ndarray::ArrayView2;
use std::path::Path;

/// 表明一个可以按切片, 以 **可视化友好** 模式持久化存储的 3D 对象.
///
/// 对于 [`CtMask`] 这类仅存在 0, 1, 2 像素值的图像, 在保存时会映射到肉眼较易能区分的形式;
/// 对于 [`CtScan`] 这类以 CT HU 值存储的扫描, 在保存时会用常见的肝脏可视化窗口规范化.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将第 `z_index` 层切片保存到 `path` 路径.
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> RoiResult<()>;
}

/// 使像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(label: u8) -> u8 {
    use crate::consts::gray::*;
    match label {
        // 背景为黑色
        LITS_BACKGROUND => BLACK,

        // 肝脏为白色
        LITS_LIVER => WHITE,

        // 让肿瘤颜色更接近肝脏颜色
        LITS_TUMOR => LIGHT_GRAY,

        // 其他被选中的标签
        _ => GRAY,
    }
}

/// 将 `(h, w)` 的 8-bit 数组逐像素映射后转换为灰度图.
fn to_gray_image(view: ArrayView2<u8>, map: impl Fn(u8) -> u8) -> GrayImage {
    let (height, width) = view.dim();
    let mut buf = GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in view.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, Luma([map(pix)]));
    }
    buf
}

impl CtScan {
    /// 以 `window` 将第 `z_index` 层切片保存为灰度图.
    pub fn save_slice_with<P: AsRef<Path>>(
        &self,
        z_index: usize,
        window: &CtWindow,
        path: P,
    ) -> RoiResult<()> {
        let img = self.windowed_slice(z_index, window)?;
        to_gray_image(img.view(), |p| p).save(path)?;
        Ok(())
    }
}

/// 窗位 60, 半窗宽 100.
impl ImgWriteVis for CtScan {
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> RoiResult<()> {
        const WINDOW: CtWindow = CtWindow::from_liver_visual();
        self.save_slice_with(z_index, &WINDOW, path)
    }
}

/// 会将背景/肝脏/肿瘤像素分别映射为黑色/白色/亮灰色, 其余非零标签为灰色.
impl ImgWriteVis for CtMask {
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> RoiResult<()> {
        check_slice(z_index, self.len_z())?;
        to_gray_image(self.slice_at(z_index), pretty).save(path)?;
        Ok(())
    }
}
