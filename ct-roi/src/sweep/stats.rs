//! 样本统计量.

/// 一组样本的均值与均值标准误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Moments {
    /// 样本个数, 总是大于 0.
    pub count: usize,

    /// 算术平均值.
    pub mean: f64,

    /// 均值标准误: 样本标准差 (自由度 `n - 1`) 除以 `sqrt(n)`.
    /// 只有一个样本时样本标准差无定义, 值为 NaN.
    pub sem: f64,
}

impl Moments {
    /// 计算 `samples` 的统计量. 样本为空时返回 `None`.
    ///
    /// 采用两遍算法, 常数样本的标准误严格为 0.
    pub fn of(samples: &[f64]) -> Option<Moments> {
        let count = samples.len();
        if count == 0 {
            return None;
        }
        let n = count as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let sem = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt() / n.sqrt()
        };
        Some(Moments { count, mean, sem })
    }
}

#[cfg(test)]
mod tests {
    use super::Moments;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_moments_empty() {
        assert_eq!(Moments::of(&[]), None);
    }

    #[test]
    fn test_moments_single() {
        let m = Moments::of(&[3.0]).unwrap();
        assert_eq!(m.count, 1);
        assert_eq!(m.mean, 3.0);
        assert!(m.sem.is_nan());
    }

    #[test]
    fn test_moments_generic() {
        // 样本标准差 = sqrt(14 / 3), sem = sqrt(14 / 3) / 2.
        let m = Moments::of(&[1.0, 2.0, 3.0, 6.0]).unwrap();
        assert_eq!(m.count, 4);
        assert!(f64_eq(m.mean, 3.0));
        assert!(f64_eq(m.sem, (14.0f64 / 3.0).sqrt() / 2.0));

        let c = Moments::of(&[50.0; 64]).unwrap();
        assert_eq!(c.mean, 50.0);
        assert_eq!(c.sem, 0.0);
    }
}
