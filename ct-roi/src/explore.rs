//! 切片浏览.
//!
//! 交互式控件 (滑块等) 只负责产生 [`ViewParams`]; [`Explorer`] 在构建时显式借用
//! 扫描 (和可选的掩膜), 之后对每组参数产生一帧 [`Frame`].

use crate::consts::{DEFAULT_MAX_DISPLAY, LIVER_LEVEL, LIVER_WINDOW};
use crate::sweep::{RegionStatistic, RoiSweeper};
use crate::{CtMask, CtScan, CtWindow, RoiError, RoiResult, VoxelGrid};
use ndarray::Array2;

/// 一组浏览参数: 切片索引, 窗口参数, 以及 ROI 的起点 `(j, i)` 和边长 `dx`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewParams {
    /// 切片索引 `k`.
    pub slice: usize,

    /// 半窗宽.
    pub window: f64,

    /// 窗位.
    pub level: f64,

    /// ROI 起点列坐标.
    pub i: usize,

    /// ROI 起点行坐标.
    pub j: usize,

    /// ROI 边长.
    pub dx: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            slice: 0,
            window: LIVER_WINDOW,
            level: LIVER_LEVEL,
            i: 0,
            j: 0,
            dx: 16,
        }
    }
}

/// 一帧浏览结果.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// 窗口变换后的切片.
    pub image: Array2<u8>,

    /// 当前 ROI 的统计. 未绑定掩膜或 ROI 内无选中体素时为 `None`.
    pub roi: Option<RegionStatistic>,
}

/// 切片浏览器. 只读借用扫描和掩膜, 不持有任何可变状态.
#[derive(Copy, Clone, Debug)]
pub struct Explorer<'a> {
    scan: &'a CtScan,
    mask: Option<&'a CtMask>,
    max_display: u8,
}

impl<'a> Explorer<'a> {
    /// 绑定扫描.
    #[inline]
    pub fn new(scan: &'a CtScan) -> Self {
        Self {
            scan,
            mask: None,
            max_display: DEFAULT_MAX_DISPLAY,
        }
    }

    /// 绑定掩膜. 形状与扫描不一致时返回 [`RoiError::ShapeMismatch`].
    pub fn with_mask(self, mask: &'a CtMask) -> RoiResult<Self> {
        if self.scan.shape() != mask.shape() {
            return Err(RoiError::ShapeMismatch {
                volume: self.scan.shape(),
                mask: mask.shape(),
            });
        }
        Ok(Self {
            mask: Some(mask),
            ..self
        })
    }

    /// 替换显示上限.
    #[inline]
    pub fn with_max_display(self, max_display: u8) -> Self {
        Self {
            max_display,
            ..self
        }
    }

    /// 切片个数, 即切片滑块的取值上界 (不含).
    #[inline]
    pub fn len_z(&self) -> usize {
        self.scan.len_z()
    }

    /// 按 `params` 产生一帧.
    ///
    /// 参数非法 (如 `window <= 0`, `dx == 0`) 或切片越界时返回错误.
    pub fn frame(&self, params: &ViewParams) -> RoiResult<Frame> {
        let window =
            CtWindow::new(params.window, params.level)?.with_max_display(self.max_display)?;
        let sweeper = RoiSweeper::new(params.dx)?;
        let image = self.scan.windowed_slice(params.slice, &window)?;
        let roi = match self.mask {
            Some(mask) => sweeper.region_stat(
                &self.scan.data(),
                &mask.data(),
                (params.slice, params.j, params.i),
            )?,
            None => None,
        };
        Ok(Frame { image, roi })
    }

    /// 依次产生 `it` 中每组参数对应的帧.
    pub fn frames<I>(&self, it: I) -> impl Iterator<Item = RoiResult<Frame>> + '_
    where
        I: IntoIterator<Item = ViewParams>,
        I::IntoIter: 'a,
    {
        it.into_iter().map(move |p| self.frame(&p))
    }
}
