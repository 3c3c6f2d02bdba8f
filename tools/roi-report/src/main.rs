//! 对单个 LiTS 样本运行窗口变换和掩膜 ROI 网格统计, 并打印报告.
//!
//! 环境变量:
//!
//! - `LITS_TRAIN_DIR`: 数据集目录, 默认 `$HOME/dataset/train`;
//! - `ROI_CASE`: 样本索引, 默认 0;
//! - `ROI_SIDE`: 网格边长, 默认 16;
//! - `ROI_WINDOW`, `ROI_LEVEL`: 可视化窗口, 默认窗位 60, 半窗宽 100;
//! - `ROI_SAVE_DIR`: 若设置, 则把中间切片的可视化图像保存到该目录.

mod report;
mod runner;

use std::process::ExitCode;

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Info).expect("logger initialized twice");

    match runner::run() {
        Ok(r) => {
            r.analyze();
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
