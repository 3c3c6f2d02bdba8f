//! 运行时错误.

use crate::Idx3d;
use thiserror::Error;

/// 窗口变换 / ROI 统计的运行时错误.
///
/// 所有操作在检测到错误时立即返回, 不会返回部分结果.
#[derive(Debug, Error)]
pub enum RoiError {
    /// 参数不在合法范围内. 例如 `window <= 0`, `dx == 0`.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// 参数名.
        name: &'static str,

        /// 实际传入的值.
        value: f64,
    },

    /// 体数据与掩膜形状不一致.
    #[error("shape mismatch: volume {volume:?} vs mask {mask:?}")]
    ShapeMismatch {
        /// 体数据形状 `(z, h, w)`.
        volume: Idx3d,

        /// 掩膜形状 `(z, h, w)`.
        mask: Idx3d,
    },

    /// 切片索引越界.
    #[error("slice index {index} out of bounds (len {len})")]
    SliceOutOfBounds {
        /// 请求的切片索引.
        index: usize,

        /// 切片总数.
        len: usize,
    },

    /// 读取的体数据不是三维的.
    #[error("volume is not 3-dimensional: {0}")]
    Dimension(#[from] ndarray::ShapeError),

    /// 读取 nifti 文件错误.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 保存图像错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl RoiError {
    #[inline]
    pub(crate) fn invalid(name: &'static str, value: impl Into<f64>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }
}

/// 窗口变换 / ROI 统计运行时错误.
pub type RoiResult<T> = Result<T, RoiError>;
