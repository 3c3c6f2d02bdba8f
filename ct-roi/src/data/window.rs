use crate::consts::{DEFAULT_MAX_DISPLAY, LIVER_LEVEL, LIVER_WINDOW};
use crate::{RoiError, RoiResult};
use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use num::ToPrimitive;

/// CT 窗口, 包含窗位 (level), 半窗宽 (window) 和显示上限 (max_display).
///
/// 窗口把 `[level - window, level + window]` 线性映射到 `[0, max_display]`:
/// 斜率 `m = max_display / (2 * window)`, 偏移 `o = m * (level - window)`,
/// 结果为 `clip(m * x - o, 0, max_display)` 向零截断后的 `u8`.
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtWindow {
    window: f64,
    level: f64,
    max_display: u8,
}

impl CtWindow {
    /// 构建显示上限为 255 的 CT 窗.
    ///
    /// `window` 必须为正的有限值, `level` 必须为有限值, 否则返回
    /// [`RoiError::InvalidParameter`].
    pub fn new(window: f64, level: f64) -> RoiResult<CtWindow> {
        if !(window.is_finite() && window > 0.0) {
            return Err(RoiError::invalid("window", window));
        }
        if !level.is_finite() {
            return Err(RoiError::invalid("level", level));
        }
        Ok(Self {
            window,
            level,
            max_display: DEFAULT_MAX_DISPLAY,
        })
    }

    /// 替换显示上限. `max_display` 为 0 时返回错误.
    pub fn with_max_display(self, max_display: u8) -> RoiResult<CtWindow> {
        if max_display == 0 {
            return Err(RoiError::invalid("max_display", max_display));
        }
        Ok(Self {
            max_display,
            ..self
        })
    }

    /// 构建一个便于展示扫描图像肝脏结构的 CT 窗口. 该窗口的窗位为
    /// 60, 半窗宽为 100, 即显示 `[-40, 160]` HU.
    #[inline]
    pub const fn from_liver_visual() -> CtWindow {
        Self {
            window: LIVER_WINDOW,
            level: LIVER_LEVEL,
            max_display: DEFAULT_MAX_DISPLAY,
        }
    }

    /// 窗下限. 不大于它的值映射为 0.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.level - self.window
    }

    /// 窗上限. 超过它的值被截断为 `max_display`.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.level + self.window
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f64 {
        self.level
    }

    /// 半窗宽.
    #[inline]
    pub fn window(&self) -> f64 {
        self.window
    }

    /// 显示上限.
    #[inline]
    pub fn max_display(&self) -> u8 {
        self.max_display
    }

    /// 线性映射斜率 `m`.
    #[inline]
    pub fn slope(&self) -> f64 {
        self.max_display as f64 / (2.0 * self.window)
    }

    /// 线性映射偏移 `o`.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.slope() * (self.level - self.window)
    }

    /// 未截断的显示值 `clip(m * x - o, 0, max_display)`. NaN 保持 NaN.
    #[inline]
    fn map_unrounded(&self, x: f64) -> f64 {
        // 按 `m * x - o` 的顺序求值; 换成 `(x - lb) / (2w) * max` 会在截断后差 1.
        (self.slope() * x - self.offset()).clamp(0.0, self.max_display as f64)
    }

    /// 数组元素的映射. NaN 映射为 0, 无穷大被截断到边界.
    #[inline]
    fn map_elem<A: ToPrimitive>(&self, x: &A) -> u8 {
        // `as` 对 NaN 给出 0, 其余情况向零截断.
        self.map_unrounded(x.to_f64().unwrap_or(f64::NAN)) as u8
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值对应的灰度图像素整数值
    /// (`0 <= value <= max_display`).
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, ct: f64) -> Option<u8> {
        self.eval_f64(ct).map(|v| v as u8)
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值对应的灰度图像素分布点
    /// (`0.0 <= value <= max_display`).
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_f64(&self, ct: f64) -> Option<f64> {
        ct.is_finite().then(|| self.map_unrounded(ct))
    }

    /// 对任意维度的数组逐元素施加窗口变换. 输出形状与输入一致.
    pub fn apply<A, S, D>(&self, samples: &ArrayBase<S, D>) -> Array<u8, D>
    where
        A: ToPrimitive,
        S: Data<Elem = A>,
        D: Dimension,
    {
        samples.map(|x| self.map_elem(x))
    }

    /// 借助 `rayon`, 并行地对数组逐元素施加窗口变换. 结果与 [`Self::apply`] 相同.
    #[cfg(feature = "rayon")]
    pub fn par_apply<A, S, D>(&self, samples: &ArrayBase<S, D>) -> Array<u8, D>
    where
        A: ToPrimitive + Sync,
        S: Data<Elem = A>,
        D: Dimension,
    {
        Zip::from(samples).par_map_collect(|x| self.map_elem(x))
    }

    /// 同 [`Self::apply`], 但不依赖 `rayon`. 逐元素顺序执行.
    #[cfg(not(feature = "rayon"))]
    pub fn par_apply<A, S, D>(&self, samples: &ArrayBase<S, D>) -> Array<u8, D>
    where
        A: ToPrimitive + Sync,
        S: Data<Elem = A>,
        D: Dimension,
    {
        Zip::from(samples).map_collect(|x| self.map_elem(x))
    }
}

/// 对 `samples` 施加窗宽窗位变换, 返回同形状的 8-bit 显示数组.
///
/// 等价于 `CtWindow::new(window, level)?.with_max_display(max_display)?.apply(samples)`.
/// `window <= 0` 或 `max_display == 0` 时返回 [`RoiError::InvalidParameter`].
pub fn window_level<A, S, D>(
    samples: &ArrayBase<S, D>,
    window: f64,
    level: f64,
    max_display: u8,
) -> RoiResult<Array<u8, D>>
where
    A: ToPrimitive,
    S: Data<Elem = A>,
    D: Dimension,
{
    let w = CtWindow::new(window, level)?.with_max_display(max_display)?;
    Ok(w.apply(samples))
}
