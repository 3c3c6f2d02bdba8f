#![warn(missing_docs)]

//! 核心库. 提供 3D 肝脏 CT 扫描的窗宽窗位变换, 以及基于掩膜的 ROI 网格统计.
//!
//! 该 crate 只提供纯函数式的计算接口: 所有操作都不修改输入体数据,
//! 每次调用都返回新的结果.
//!
//! # 注意
//!
//! 1. 所有三维数据均按 `(z, h, w)`, 即 (切片, 行, 列) 的顺序访问.
//! 2. 掩膜中非零体素视为 "被选中".
//! 3. 参数非法时返回 [`RoiError`], 不会返回部分结果.
//!
//! # 功能一览
//!
//! ### CT window 视图 ✅
//!
//! 将 CT HU 值按照窗位 (level) 和半窗宽 (window) 线性映射到 `[0, max_display]`
//! 的 8-bit 灰度值.
//!
//! 实现位于 `ct-roi/src/data/window.rs`.
//!
//! ### ROI 网格统计 ✅
//!
//! 将每个水平切片划分为边长 `dx` 的正方形网格, 只统计掩膜选中的体素,
//! 求每个网格的均值和均值标准误.
//!
//! 实现位于 `ct-roi/src/sweep`.
//!
//! ### 切片浏览 ✅
//!
//! 以显式借用体数据的 [`Explorer`] 代替交互式控件的回调闭包.
//!
//! 实现位于 `ct-roi/src/explore.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

type Predicate = fn(u8) -> bool;

/// 3D CT 基础数据结构.
mod data;

mod error;

pub use data::{CtData3d, CtMask, CtScan, CtWindow, ImgWriteVis, MaskElem, Rescale, VoxelGrid};

pub use data::window::window_level;

pub use error::{RoiError, RoiResult};

pub mod consts;

pub mod dataset;

pub mod explore;

pub use explore::{Explorer, Frame, ViewParams};

pub mod sweep;

pub use sweep::{masked_mean, sweep, RegionStatistic, RoiSweeper, SweepSummary};

#[cfg(feature = "rayon")]
pub use sweep::par_sweep;

pub mod prelude;
