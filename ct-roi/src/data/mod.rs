use std::ops::{Index, RangeInclusive};
use std::path::Path;

use log::info;
use ndarray::{Array2, Array3, ArrayBase, ArrayD, ArrayView, ArrayView2, Axis, Data, Ix3};
use nifti::{InMemNiftiVolume, IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use num::ToPrimitive;

use crate::consts::gray::*;
use crate::sweep::{self, RegionStatistic};
use crate::{Idx2d, Idx3d, Predicate, RoiError, RoiResult};

mod mask;
mod save;
pub mod window;

pub use mask::MaskElem;
pub use save::ImgWriteVis;
pub use window::CtWindow;

/// 将 nifti header 的 (W, H, z) 体素间距转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn pix_dim_from_header(h: &NiftiHeader) -> [f64; 3] {
    let [_, w, h, z, ..] = h.pixdim;
    [z as f64, h as f64, w as f64]
}

/// 读取 nifti 文件, 返回体数据和 `(z, H, W)` 顺序的体素间距.
fn open_volume(path: &Path) -> RoiResult<(InMemNiftiVolume, [f64; 3])> {
    let obj = ReaderOptions::new().read_file(path)?;
    let pix_dim = pix_dim_from_header(obj.header());
    info!("Loaded {:?}, pix_dim (z, h, w) = {:?}", path, pix_dim);
    Ok((obj.into_volume(), pix_dim))
}

/// 将 nifti 的 [W, H, z] 数组转换为标准布局的 [z, H, W] 数组.
fn to_zhw<T: Clone>(data: ArrayD<T>) -> RoiResult<Array3<T>> {
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = data.into_dimensionality::<Ix3>()?.permuted_axes([2, 1, 0]);
    if data.is_standard_layout() {
        Ok(data)
    } else {
        Ok(data.as_standard_layout().into_owned())
    }
}

/// 检查切片索引是否越界.
#[inline]
fn check_slice(index: usize, len: usize) -> RoiResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(RoiError::SliceOutOfBounds { index, len })
    }
}

/// 3D 体数据的共用属性和部分通用操作.
pub trait VoxelGrid {
    /// 获取数据形状大小 `(z, h, w)`.
    fn shape(&self) -> Idx3d;

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    fn pix_dim(&self) -> [f64; 3];

    /// 获取数据水平切片形状大小.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取空间方向 (相邻 2D 切片的方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn z_mm(&self) -> f64 {
        self.pix_dim()[0]
    }

    /// 获取 height 方向体素分辨率, 以毫米为单位.
    #[inline]
    fn height_mm(&self) -> f64 {
        self.pix_dim()[1]
    }

    /// 获取 width 方向体素分辨率, 以毫米为单位.
    #[inline]
    fn width_mm(&self) -> f64 {
        self.pix_dim()[2]
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }
}

/// 线性重标定参数. 存储值 `raw` 对应的 HU 值为 `raw * slope + intercept`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rescale {
    /// 斜率.
    pub slope: f64,

    /// 截距. CT 扫描中通常为 -1024.
    pub intercept: f64,
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl Rescale {
    /// 构建重标定参数.
    #[inline]
    pub const fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// 将存储值转换为 HU 值.
    #[inline]
    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.slope + self.intercept
    }
}

/// 3D CT 扫描, HU 值以 `f32` 保存, 按 `(z, h, w)` 访问.
#[derive(Debug, Clone)]
pub struct CtScan {
    data: Array3<f32>,
    pix_dim: [f64; 3],
}

impl VoxelGrid for CtScan {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        self.pix_dim
    }
}

impl Index<Idx3d> for CtScan {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl CtScan {
    /// 直接从 `(z, h, w)` 顺序的 HU 数组创建扫描. 体素间距默认为 1mm.
    #[inline]
    pub fn from_array(data: Array3<f32>) -> Self {
        Self {
            data,
            pix_dim: [1.0; 3],
        }
    }

    /// 从存储值和重标定参数创建扫描. 该操作不会修改 `raw`.
    pub fn from_raw<A, S>(raw: &ArrayBase<S, Ix3>, rescale: Rescale) -> Self
    where
        A: ToPrimitive,
        S: Data<Elem = A>,
    {
        let data = raw.map(|v| rescale.apply(v.to_f64().unwrap_or(f64::NAN)) as f32);
        Self::from_array(data)
    }

    /// 替换体素间距 (z, h, w), 单位毫米.
    #[inline]
    pub fn with_pix_dim(self, pix_dim: [f64; 3]) -> Self {
        Self { pix_dim, ..self }
    }

    /// 打开 nii 文件格式的 3D CT 扫描. `path` 为 nii 文件的本地路径.
    ///
    /// nifti 头中的 `scl_slope`/`scl_inter` 会在读取时自动生效.
    pub fn open<P: AsRef<Path>>(path: P) -> RoiResult<Self> {
        let (volume, pix_dim) = open_volume(path.as_ref())?;
        let data = to_zhw(volume.into_ndarray::<f32>()?)?;
        Ok(Self { data, pix_dim })
    }

    /// 获取 3D 扫描 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 同 [`Self::slice_at`], 但越界时返回 [`RoiError::SliceOutOfBounds`].
    pub fn try_slice_at(&self, z_index: usize) -> RoiResult<ArrayView2<'_, f32>> {
        check_slice(z_index, self.len_z())?;
        Ok(self.slice_at(z_index))
    }

    /// 获取能按升序迭代 3D 扫描水平切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, f32>> {
        self.data.axis_iter(Axis(0))
    }

    /// 以 `window` 变换第 `z_index` 层切片, 得到 8-bit 显示图像.
    pub fn windowed_slice(&self, z_index: usize, window: &CtWindow) -> RoiResult<Array2<u8>> {
        Ok(window.apply(&self.try_slice_at(z_index)?))
    }

    /// 以 `window` 变换整个扫描.
    #[inline]
    pub fn windowed(&self, window: &CtWindow) -> Array3<u8> {
        window.par_apply(&self.data)
    }

    /// 将 HU 值落在 `range` 内的体素标记为肝脏, 其余为背景, 得到掩膜.
    pub fn threshold(&self, range: RangeInclusive<f32>) -> CtMask {
        let data = self
            .data
            .map(|hu| if range.contains(hu) { LITS_LIVER } else { LITS_BACKGROUND });
        CtMask {
            data,
            pix_dim: self.pix_dim,
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }
}

/// 3D CT 掩膜 (标注). 标签值以 `u8` 保存, 非零体素视为被选中.
#[derive(Debug, Clone)]
pub struct CtMask {
    data: Array3<u8>,
    pix_dim: [f64; 3],
}

impl VoxelGrid for CtMask {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        self.pix_dim
    }
}

impl Index<Idx3d> for CtMask {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl CtMask {
    /// 直接从 `(z, h, w)` 顺序的标签数组创建掩膜. 体素间距默认为 1mm.
    #[inline]
    pub fn from_array(data: Array3<u8>) -> Self {
        Self {
            data,
            pix_dim: [1.0; 3],
        }
    }

    /// 从任意掩膜元素数组创建 0/1 掩膜.
    pub fn from_selection<M, S>(selection: &ArrayBase<S, Ix3>) -> Self
    where
        M: MaskElem,
        S: Data<Elem = M>,
    {
        Self::from_array(selection.map(|m| m.is_selected() as u8))
    }

    /// 替换体素间距 (z, h, w), 单位毫米.
    #[inline]
    pub fn with_pix_dim(self, pix_dim: [f64; 3]) -> Self {
        Self { pix_dim, ..self }
    }

    /// 打开 nii 文件格式的 3D CT 标注. `path` 为 nii 文件的本地路径.
    pub fn open<P: AsRef<Path>>(path: P) -> RoiResult<Self> {
        let (volume, pix_dim) = open_volume(path.as_ref())?;
        let data = to_zhw(volume.into_ndarray::<u8>()?)?;
        Ok(Self { data, pix_dim })
    }

    /// 按谓词 `pred` 重新选择体素, 得到新的 0/1 掩膜.
    ///
    /// 例如 `mask.select(is_liver)` 只保留肝脏, 丢弃肿瘤.
    pub fn select(&self, pred: Predicate) -> CtMask {
        Self {
            data: self.data.map(|&p| pred(p) as u8),
            pix_dim: self.pix_dim,
        }
    }

    /// 获取 3D 掩膜 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 被选中 (非零) 的体素个数.
    #[inline]
    pub fn count_selected(&self) -> usize {
        self.data.iter().filter(|p| p.is_selected()).count()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }
}

/// 3D CT 扫描与对应的掩膜.
///
/// 该结构完全透明, 仅包含两个公开的 `scan` 和 `mask` 子结构.
/// 通过 [`CtData3d::new`] 或 [`CtData3d::open`] 创建时会检查两者形状一致.
#[derive(Debug, Clone)]
pub struct CtData3d {
    /// 3D CT 扫描.
    pub scan: CtScan,

    /// 3D CT 掩膜.
    pub mask: CtMask,
}

impl CtData3d {
    /// 组合扫描和掩膜. 形状不一致时返回 [`RoiError::ShapeMismatch`].
    pub fn new(scan: CtScan, mask: CtMask) -> RoiResult<Self> {
        if scan.shape() != mask.shape() {
            return Err(RoiError::ShapeMismatch {
                volume: scan.shape(),
                mask: mask.shape(),
            });
        }
        Ok(Self { scan, mask })
    }

    /// 分别打开 nii 文件格式的 3D CT 扫描和对应标注. 如果任一文件打开失败,
    /// 或两者形状不一致, 则返回 `Err`.
    pub fn open(scan_path: impl AsRef<Path>, mask_path: impl AsRef<Path>) -> RoiResult<Self> {
        let scan = CtScan::open(scan_path.as_ref())?;
        let mask = CtMask::open(mask_path.as_ref())?;
        Self::new(scan, mask)
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.scan.len_z()
    }

    /// 以边长 `dx` 对扫描进行掩膜 ROI 网格统计. 见 [`sweep::sweep`].
    #[inline]
    pub fn sweep(&self, dx: usize) -> RoiResult<Vec<RegionStatistic>> {
        sweep::sweep(&self.scan.data, &self.mask.data, dx)
    }

    /// 掩膜选中的全部体素的 HU 均值. 见 [`sweep::masked_mean`].
    #[inline]
    pub fn masked_mean(&self) -> RoiResult<Option<f64>> {
        sweep::masked_mean(&self.scan.data, &self.mask.data)
    }
}

#[cfg(test)]
mod tests {
    use super::{CtData3d, CtMask, CtScan, Rescale, VoxelGrid};
    use crate::consts::gray::*;
    use crate::{CtWindow, RoiError};
    use ndarray::{Array3, Axis};

    fn ramp_scan() -> CtScan {
        CtScan::from_array(Array3::from_shape_fn((2, 4, 4), |(z, h, w)| {
            (z * 100 + h * 10 + w) as f32
        }))
    }

    #[test]
    fn test_from_raw_applies_rescale() {
        let raw = Array3::<i16>::from_elem((1, 2, 2), 1074);
        let scan = CtScan::from_raw(&raw, Rescale::new(1.0, -1024.0));
        assert!(scan.data().iter().all(|&hu| hu == 50.0));
        assert!(raw.iter().all(|&v| v == 1074));
    }

    #[test]
    fn test_voxel_grid_attr() {
        let scan = ramp_scan().with_pix_dim([2.5, 0.5, 0.5]);
        assert_eq!(scan.shape(), (2, 4, 4));
        assert_eq!(scan.slice_shape(), (4, 4));
        assert_eq!(scan.len_z(), 2);
        assert_eq!(scan.size(), 32);
        assert!(scan.check(&(1, 3, 3)));
        assert!(!scan.check(&(2, 0, 0)));
        assert_eq!(scan.voxel(), 0.625);
        assert_eq!(scan.z_mm(), 2.5);
    }

    #[test]
    fn test_slice_access() {
        let scan = ramp_scan();
        assert_eq!(scan.slice_at(1)[(2, 3)], 123.0);
        assert!(matches!(
            scan.try_slice_at(2),
            Err(RoiError::SliceOutOfBounds { index: 2, len: 2 })
        ));
        assert_eq!(scan.slice_iter().len(), 2);

        let w = CtWindow::new(50.0, 50.0).unwrap();
        let img = scan.windowed_slice(0, &w).unwrap();
        assert_eq!(img.dim(), (4, 4));
        assert_eq!(img[(0, 0)], 0);
        assert_eq!(scan.windowed(&w).index_axis(Axis(0), 0), img);
    }

    #[test]
    fn test_mask_select() {
        let mut data = Array3::<u8>::zeros((1, 3, 3));
        data[(0, 0, 0)] = LITS_LIVER;
        data[(0, 1, 1)] = LITS_LIVER;
        data[(0, 2, 2)] = LITS_TUMOR;
        let mask = CtMask::from_array(data);
        assert_eq!(mask.count_selected(), 3);

        let liver = mask.select(is_liver);
        assert_eq!(liver.count_selected(), 2);
        assert_eq!(liver[(0, 2, 2)], 0);

        let from_bool = CtMask::from_selection(&mask.data().map(|&p| p == LITS_TUMOR));
        assert_eq!(from_bool.count_selected(), 1);
    }

    #[test]
    fn test_threshold() {
        let scan = ramp_scan();
        let mask = scan.threshold(100.0..=110.0);
        // 100..=103, 110
        assert_eq!(mask.count_selected(), 5);
    }

    #[test]
    fn test_data3d_shape_check() {
        let scan = ramp_scan();
        let ok = CtMask::from_array(Array3::ones((2, 4, 4)));
        let data = CtData3d::new(scan.clone(), ok).unwrap();
        assert_eq!(data.len_z(), 2);
        assert_eq!(data.iter().len(), 32);
        assert_eq!(data.masked_mean().unwrap(), Some(66.5));

        let bad = CtMask::from_array(Array3::ones((2, 3, 4)));
        let err = CtData3d::new(scan, bad).unwrap_err();
        assert!(matches!(
            err,
            RoiError::ShapeMismatch {
                volume: (2, 4, 4),
                mask: (2, 3, 4)
            }
        ));
    }
}
