//! 报告工具依赖的通用组件.

use ct_roi::{CtWindow, RoiResult};
use std::env;
use std::str::FromStr;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 读取环境变量 `key` 并解析为 `T`. 未设置或解析失败时返回 `default`.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable ${key} = {v:?}");
            default
        }),
        Err(_) => default,
    }
}

/// 从 `$ROI_WINDOW` 和 `$ROI_LEVEL` 创建 CT 窗口.
///
/// 两者都未设置时, 返回窗位 60, 半窗宽 100 的肝脏可视化窗口.
pub fn window_from_env() -> RoiResult<CtWindow> {
    let liver = CtWindow::from_liver_visual();
    CtWindow::new(
        env_or("ROI_WINDOW", liver.window()),
        env_or("ROI_LEVEL", liver.level()),
    )
}

#[cfg(test)]
mod tests {
    use super::{env_or, sep_to};

    #[test]
    fn test_env_or_default() {
        assert_eq!(env_or("CT_ROI_SURELY_UNSET_KEY", 16usize), 16);
    }

    #[test]
    fn test_sep_to() {
        let mut buf = Vec::new();
        sep_to(&mut buf).unwrap();
        assert!(buf.ends_with(b"-\n"));
    }
}
