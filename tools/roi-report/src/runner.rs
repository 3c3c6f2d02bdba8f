//! 程序运行函数.

use crate::report::RoiReport;
use ct_roi::prelude::*;
use log::info;
use std::path::PathBuf;
use utils::loader;

/// 运行配置.
struct Config {
    dir: PathBuf,
    case: u32,
    side: usize,
    window: CtWindow,
    save_dir: Option<PathBuf>,
}

impl Config {
    fn from_env() -> RoiResult<Self> {
        Ok(Self {
            dir: loader::train_dir_from_env_or_home(),
            case: utils::env_or("ROI_CASE", 0),
            side: utils::env_or("ROI_SIDE", 16),
            window: utils::window_from_env()?,
            save_dir: std::env::var_os("ROI_SAVE_DIR").map(PathBuf::from),
        })
    }
}

/// 实际运行.
pub fn run() -> RoiResult<RoiReport> {
    let cfg = Config::from_env()?;
    info!("Loading case {} from {:?}", cfg.case, cfg.dir);
    let data = loader::load_case(&cfg.dir, cfg.case)?;

    let sweeper = RoiSweeper::new(cfg.side)?;
    let stats = sweeper.par_sweep(&data.scan.data(), &data.mask.data())?;
    let baseline = data.masked_mean()?;
    let summary = sweeper.summarize(data.scan.shape(), &stats, baseline);

    if let Some(dir) = cfg.save_dir.as_ref() {
        let mid = data.len_z() / 2;
        let path = dir.join(format!("case-{}-slice-{mid}.png", cfg.case));
        data.scan.save_slice_with(mid, &cfg.window, &path)?;
        data.mask.save_slice(mid, dir.join(format!("case-{}-mask-{mid}.png", cfg.case)))?;
        info!("Saved slice {mid} to {:?}", path);
    }

    Ok(RoiReport::new(cfg.case, cfg.side, stats, summary))
}
