//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::window::{window_level, CtWindow};
pub use crate::data::{CtData3d, CtMask, CtScan, ImgWriteVis, MaskElem, Rescale, VoxelGrid};

pub use crate::consts::gray::{LITS_BACKGROUND, LITS_LIVER, LITS_TUMOR};
pub use crate::consts::DEFAULT_MAX_DISPLAY;

pub use crate::dataset::{home_dataset_dir_with, lits_case_paths};

pub use crate::explore::{Explorer, Frame, ViewParams};
pub use crate::sweep::{masked_mean, sweep, RegionStatistic, RoiSweeper, SweepSummary};

pub use crate::{RoiError, RoiResult};
