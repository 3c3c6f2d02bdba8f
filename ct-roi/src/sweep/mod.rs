//! 掩膜 ROI 网格统计.
//!
//! 将每个水平切片划分为边长 `dx` 的正方形网格, 每个网格只统计掩膜选中的体素,
//! 得到一组按 `(k, j, i)` 升序排列的 [`RegionStatistic`].
//!
//! # 边界
//!
//! 行/列起点的取值范围是 `0..len - dx` (不含上界), 步长 `dx`. 因此起点恰为
//! `len - dx` 的最后一个完整网格, 以及末尾不足 `dx` 的部分都不会被访问.
//! 例如 `(1, 8, 8)` 的体数据配合 `dx = 8` 会得到空结果.

use std::num::NonZeroUsize;
use std::ops::Range;

use itertools::iproduct;
use log::{debug, warn};
use ndarray::{s, ArrayBase, ArrayView2, Axis, Data, Ix3, Zip};
use num::ToPrimitive;

use crate::{Idx2d, Idx3d, MaskElem, RoiError, RoiResult};

mod stats;

pub use stats::Moments;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 单个 ROI 的统计结果.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionStatistic {
    /// ROI 起点的行优先展平索引 `i + j * C + k * C * R`.
    pub index: usize,

    /// ROI 起点 `(k, j, i)`.
    pub origin: Idx3d,

    /// ROI 内被选中的体素个数, 总是大于 0.
    pub count: usize,

    /// 被选中体素的均值.
    pub mean: f64,

    /// 被选中体素的均值标准误. 只有一个体素时为 NaN.
    pub sem: f64,
}

impl RegionStatistic {
    /// `(index, mean, sem)` 三元组, 即作图所需的 (横坐标, 值, 误差棒).
    #[inline]
    pub fn as_tuple(&self) -> (usize, f64, f64) {
        (self.index, self.mean, self.sem)
    }
}

/// 一次网格统计的概况.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepSummary {
    /// 访问过的网格个数.
    pub regions_visited: usize,

    /// 产生了统计结果 (即至少含一个选中体素) 的网格个数.
    pub regions_emitted: usize,

    /// 整个体数据上的掩膜均值. 掩膜为空时为 `None`.
    pub baseline: Option<f64>,
}

/// 行优先展平索引.
#[inline]
const fn linear_index((k, j, i): Idx3d, (_, r, c): Idx3d) -> usize {
    i + j * c + k * c * r
}

/// 单个维度上网格起点的范围: `0..len - dx` (不含上界), 步长 `dx`.
#[inline]
fn grid(len: usize, dx: usize) -> std::iter::StepBy<Range<usize>> {
    (0..len.saturating_sub(dx)).step_by(dx)
}

/// 体数据与掩膜形状必须一致.
#[inline]
fn check_shape(volume: Idx3d, mask: Idx3d) -> RoiResult<()> {
    if volume == mask {
        Ok(())
    } else {
        Err(RoiError::ShapeMismatch { volume, mask })
    }
}

/// 收集二维区域内被掩膜选中的样本值.
fn selected_samples<A, M>(volume: ArrayView2<A>, mask: ArrayView2<M>) -> Vec<f64>
where
    A: ToPrimitive,
    M: MaskElem,
{
    let mut buf = Vec::with_capacity(volume.len());
    Zip::from(&volume).and(&mask).for_each(|v, m| {
        if m.is_selected() {
            buf.push(v.to_f64().unwrap_or(f64::NAN));
        }
    });
    buf
}

/// ROI 网格统计器. 网格边长 `dx` 在构建时确定.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoiSweeper {
    side: NonZeroUsize,
}

impl RoiSweeper {
    /// 以网格边长 `dx` 构建统计器. `dx == 0` 时返回 [`RoiError::InvalidParameter`].
    pub fn new(dx: usize) -> RoiResult<Self> {
        let side = NonZeroUsize::new(dx).ok_or(RoiError::invalid("dx", 0u8))?;
        Ok(Self { side })
    }

    /// 网格边长.
    #[inline]
    pub fn side(&self) -> usize {
        self.side.get()
    }

    /// 按访问顺序 (k 外层, 然后 j, 然后 i) 迭代形状为 `shape` 的体数据上所有网格的起点.
    pub fn origins(&self, (d, r, c): Idx3d) -> impl Iterator<Item = Idx3d> {
        let dx = self.side();
        iproduct!(0..d, grid(r, dx), grid(c, dx))
    }

    /// 形状为 `shape` 的体数据上会被访问的网格个数.
    pub fn grid_len(&self, (d, r, c): Idx3d) -> usize {
        let dx = self.side();
        d * grid(r, dx).len() * grid(c, dx).len()
    }

    /// 对第 `k` 层切片做网格统计.
    fn sweep_slice<A, M>(
        &self,
        k: usize,
        volume: ArrayView2<A>,
        mask: ArrayView2<M>,
        shape: Idx3d,
    ) -> Vec<RegionStatistic>
    where
        A: ToPrimitive,
        M: MaskElem,
    {
        let dx = self.side();
        let (_, r, c) = shape;
        iproduct!(grid(r, dx), grid(c, dx))
            .filter_map(|(j, i)| {
                let area = s![j..j + dx, i..i + dx];
                let samples = selected_samples(volume.slice(&area), mask.slice(&area));
                let Moments { count, mean, sem } = Moments::of(&samples)?;
                let origin = (k, j, i);
                Some(RegionStatistic {
                    index: linear_index(origin, shape),
                    origin,
                    count,
                    mean,
                    sem,
                })
            })
            .collect()
    }

    /// 网格无法落入切片时记录一条警告.
    fn warn_if_empty_grid(&self, (d, r, c): Idx3d) {
        if d != 0 && self.grid_len((d, r, c)) == 0 {
            warn!(
                "ROI side {} leaves no region inside {}x{} slices",
                self.side(),
                r,
                c
            );
        }
    }

    /// 对 `volume` 做掩膜 ROI 网格统计.
    ///
    /// 没有选中体素的网格不会出现在结果中. 结果按 `index` 严格升序排列.
    /// `volume` 与 `mask` 形状不一致时返回 [`RoiError::ShapeMismatch`],
    /// 此时不会进行任何计算.
    pub fn sweep<A, S, M, T>(
        &self,
        volume: &ArrayBase<S, Ix3>,
        mask: &ArrayBase<T, Ix3>,
    ) -> RoiResult<Vec<RegionStatistic>>
    where
        A: ToPrimitive,
        S: Data<Elem = A>,
        M: MaskElem,
        T: Data<Elem = M>,
    {
        let shape = volume.dim();
        check_shape(shape, mask.dim())?;
        self.warn_if_empty_grid(shape);

        let ans: Vec<_> = volume
            .axis_iter(Axis(0))
            .zip(mask.axis_iter(Axis(0)))
            .enumerate()
            .flat_map(|(k, (v, m))| self.sweep_slice(k, v, m, shape))
            .collect();
        debug!(
            "Swept {:?} with dx = {}: {} of {} regions emitted",
            shape,
            self.side(),
            ans.len(),
            self.grid_len(shape)
        );
        Ok(ans)
    }

    /// 借助 `rayon`, 每个水平切片一个任务地进行网格统计.
    /// 结果按切片顺序合并, 与 [`Self::sweep`] 完全一致.
    #[cfg(feature = "rayon")]
    pub fn par_sweep<A, S, M, T>(
        &self,
        volume: &ArrayBase<S, Ix3>,
        mask: &ArrayBase<T, Ix3>,
    ) -> RoiResult<Vec<RegionStatistic>>
    where
        A: ToPrimitive + Sync,
        S: Data<Elem = A>,
        M: MaskElem + Sync,
        T: Data<Elem = M>,
    {
        let shape = volume.dim();
        check_shape(shape, mask.dim())?;
        self.warn_if_empty_grid(shape);

        let per_slice: Vec<Vec<RegionStatistic>> = volume
            .axis_iter(Axis(0))
            .into_par_iter()
            .zip(mask.axis_iter(Axis(0)).into_par_iter())
            .enumerate()
            .map(|(k, (v, m))| self.sweep_slice(k, v, m, shape))
            .collect();
        let ans: Vec<_> = per_slice.into_iter().flatten().collect();
        debug!(
            "Swept {:?} in parallel with dx = {}: {} of {} regions emitted",
            shape,
            self.side(),
            ans.len(),
            self.grid_len(shape)
        );
        Ok(ans)
    }

    /// 统计起点为 `origin` 的单个 ROI. 超出体数据的部分会被裁剪掉,
    /// 因此该方法可以用于任意起点 (包括网格统计不会访问的末尾区域).
    ///
    /// ROI 内没有选中体素, 或起点越界时返回 `Ok(None)`.
    pub fn region_stat<A, S, M, T>(
        &self,
        volume: &ArrayBase<S, Ix3>,
        mask: &ArrayBase<T, Ix3>,
        origin: Idx3d,
    ) -> RoiResult<Option<RegionStatistic>>
    where
        A: ToPrimitive,
        S: Data<Elem = A>,
        M: MaskElem,
        T: Data<Elem = M>,
    {
        let shape = volume.dim();
        check_shape(shape, mask.dim())?;
        let (d, r, c) = shape;
        let (k, j, i) = origin;
        if k >= d || j >= r || i >= c {
            return Ok(None);
        }
        let dx = self.side();
        let (j_end, i_end): Idx2d = ((j + dx).min(r), (i + dx).min(c));
        let area = s![k, j..j_end, i..i_end];
        let samples = selected_samples(volume.slice(&area), mask.slice(&area));
        Ok(Moments::of(&samples).map(|Moments { count, mean, sem }| RegionStatistic {
            index: linear_index(origin, shape),
            origin,
            count,
            mean,
            sem,
        }))
    }

    /// 汇总一次网格统计的结果.
    pub fn summarize(
        &self,
        shape: Idx3d,
        stats: &[RegionStatistic],
        baseline: Option<f64>,
    ) -> SweepSummary {
        SweepSummary {
            regions_visited: self.grid_len(shape),
            regions_emitted: stats.len(),
            baseline,
        }
    }
}

/// 以边长 `dx` 对 `volume` 做掩膜 ROI 网格统计. 见 [`RoiSweeper::sweep`].
///
/// `dx == 0` 时返回 [`RoiError::InvalidParameter`]; `dx` 不小于切片行数或列数时
/// 返回空结果而不是错误.
#[inline]
pub fn sweep<A, S, M, T>(
    volume: &ArrayBase<S, Ix3>,
    mask: &ArrayBase<T, Ix3>,
    dx: usize,
) -> RoiResult<Vec<RegionStatistic>>
where
    A: ToPrimitive,
    S: Data<Elem = A>,
    M: MaskElem,
    T: Data<Elem = M>,
{
    RoiSweeper::new(dx)?.sweep(volume, mask)
}

/// 并行版本的 [`sweep`]. 见 [`RoiSweeper::par_sweep`].
#[cfg(feature = "rayon")]
#[inline]
pub fn par_sweep<A, S, M, T>(
    volume: &ArrayBase<S, Ix3>,
    mask: &ArrayBase<T, Ix3>,
    dx: usize,
) -> RoiResult<Vec<RegionStatistic>>
where
    A: ToPrimitive + Sync,
    S: Data<Elem = A>,
    M: MaskElem + Sync,
    T: Data<Elem = M>,
{
    RoiSweeper::new(dx)?.par_sweep(volume, mask)
}

/// 整个体数据上, 掩膜选中体素的均值. 常用作作图时的参考基线.
///
/// 掩膜没有选中任何体素时返回 `Ok(None)`; 形状不一致时返回
/// [`RoiError::ShapeMismatch`].
pub fn masked_mean<A, S, M, T>(
    volume: &ArrayBase<S, Ix3>,
    mask: &ArrayBase<T, Ix3>,
) -> RoiResult<Option<f64>>
where
    A: ToPrimitive,
    S: Data<Elem = A>,
    M: MaskElem,
    T: Data<Elem = M>,
{
    check_shape(volume.dim(), mask.dim())?;
    let (sum, count) = Zip::from(volume)
        .and(mask)
        .fold((0.0f64, 0usize), |(sum, count), v, m| {
            if m.is_selected() {
                (sum + v.to_f64().unwrap_or(f64::NAN), count + 1)
            } else {
                (sum, count)
            }
        });
    Ok((count != 0).then(|| sum / count as f64))
}
