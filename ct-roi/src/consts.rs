//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 原 LiTS 数据集中, 背景的像素值.
    pub const LITS_BACKGROUND: u8 = 0;

    /// 原 LiTS 数据集中, 肝脏的像素值.
    pub const LITS_LIVER: u8 = 1;

    /// 原 LiTS 数据集中, 肿瘤的像素值.
    pub const LITS_TUMOR: u8 = 2;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道亮灰色.
    pub const LIGHT_GRAY: u8 = 0b_1100_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是肝脏?
    #[inline]
    pub const fn is_liver(p: u8) -> bool {
        matches!(p, LITS_LIVER)
    }
}

/// 8-bit 显示范围的默认上限.
pub const DEFAULT_MAX_DISPLAY: u8 = u8::MAX;

/// 肝脏可视化窗口的窗位 (HU).
pub const LIVER_LEVEL: f64 = 60.0;

/// 肝脏可视化窗口的半窗宽 (HU). 对应显示范围 `[-40, 160]`.
pub const LIVER_WINDOW: f64 = 100.0;
