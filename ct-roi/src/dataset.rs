//! 数据集路径.

use std::path::{Path, PathBuf};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

/// LiTS 训练集中第 `index` 个样本的 (扫描, 标注) 路径, 即
/// `dir/volume-{index}.nii` 和 `dir/segmentation-{index}.nii`.
pub fn lits_case_paths<P: AsRef<Path>>(dir: P, index: u32) -> (PathBuf, PathBuf) {
    let dir = dir.as_ref();
    (
        dir.join(format!("volume-{index}.nii")),
        dir.join(format!("segmentation-{index}.nii")),
    )
}
