//! 对 `ct_roi::dataset` 的更一层封装. 提供更直接的数据加载方式.

use ct_roi::{dataset, CtData3d, RoiResult};
use std::env;
use std::path::{Path, PathBuf};

/// 获取 LiTS 训练集数据基本路径.
///
/// 1. 若环境变量 `$LITS_TRAIN_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/train`;
/// 3. 主目录未知时, 返回相对路径 `dataset/train`.
pub fn train_dir_from_env_or_home() -> PathBuf {
    match env::var("LITS_TRAIN_DIR") {
        Ok(d) if !d.is_empty() => PathBuf::from(d),
        _ => dataset::home_dataset_dir_with(["train"])
            .unwrap_or_else(|| Path::new("dataset").join("train")),
    }
}

/// 从 `dir` 加载 LiTS 训练集第 `index` 个样本.
pub fn load_case<P: AsRef<Path>>(dir: P, index: u32) -> RoiResult<CtData3d> {
    let (scan, mask) = dataset::lits_case_paths(dir, index);
    CtData3d::open(scan, mask)
}
