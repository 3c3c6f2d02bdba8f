//! 统计结果.

use ct_roi::{RegionStatistic, SweepSummary};
use std::io::{self, Write};

/// 最多列出的 ROI 个数.
const MAX_LISTED: usize = 16;

#[inline]
fn f64_to_display(f: Option<f64>) -> String {
    match f {
        Some(f) if f.is_finite() => format!("{f:.3}"),
        _ => "/".to_string(),
    }
}

/// 将统计结果写进 `w` 中.
fn describe_into<W: Write>(
    case: u32,
    side: usize,
    stats: &[RegionStatistic],
    s: &SweepSummary,
    w: &mut W,
) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Case {case}, ROI side {side}:")?;
    writeln!(w, "{S4}Regions visited: {}", s.regions_visited)?;
    writeln!(w, "{S4}Regions with selected voxels: {}", s.regions_emitted)?;
    writeln!(w, "{S4}Masked mean: {} HU", f64_to_display(s.baseline))?;
    if stats.is_empty() {
        write!(w, "{S4}No region holds selected voxels")?;
        return Ok(());
    }
    writeln!(w, "{S4}index, mean, sem, count:")?;
    for r in stats.iter().take(MAX_LISTED) {
        writeln!(
            w,
            "{S4}{S4}{}, {}, {}, {}",
            r.index,
            f64_to_display(Some(r.mean)),
            f64_to_display(Some(r.sem)),
            r.count
        )?;
    }
    if stats.len() > MAX_LISTED {
        write!(w, "{S4}{S4}... and {} more", stats.len() - MAX_LISTED)?;
    }
    Ok(())
}

/// 单个样本的最终统计结果.
pub struct RoiReport {
    case: u32,
    side: usize,
    stats: Vec<RegionStatistic>,
    summary: SweepSummary,
}

impl RoiReport {
    pub fn new(case: u32, side: usize, stats: Vec<RegionStatistic>, summary: SweepSummary) -> Self {
        Self {
            case,
            side,
            stats,
            summary,
        }
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);
        match describe_into(self.case, self.side, &self.stats, &self.summary, &mut buf) {
            Ok(()) => println!("{}", String::from_utf8_lossy(&buf)),
            Err(e) => log::error!("Cannot render report: {e}"),
        }
        utils::sep();
    }
}
