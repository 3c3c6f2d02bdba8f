//! 掩膜元素.

/// 可以作为掩膜元素的类型. 非零 (或 `true`) 的元素视为被选中.
pub trait MaskElem {
    /// 该元素是否被选中?
    fn is_selected(&self) -> bool;
}

impl MaskElem for bool {
    #[inline]
    fn is_selected(&self) -> bool {
        *self
    }
}

macro_rules! impl_mask_int {
    ($($t: ty),+) => {
        $(
            impl MaskElem for $t {
                #[inline]
                fn is_selected(&self) -> bool {
                    *self != 0
                }
            }
        )+
    };
}

macro_rules! impl_mask_float {
    ($($t: ty),+) => {
        $(
            /// NaN 视为非零.
            impl MaskElem for $t {
                #[inline]
                fn is_selected(&self) -> bool {
                    *self != 0.0
                }
            }
        )+
    };
}

impl_mask_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
impl_mask_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::MaskElem;

    #[test]
    fn test_mask_elem() {
        assert!(true.is_selected());
        assert!(!false.is_selected());
        assert!(2u8.is_selected());
        assert!(!0u8.is_selected());
        assert!((-1i16).is_selected());
        assert!(!0.0f32.is_selected());
        assert!(!(-0.0f64).is_selected());
        assert!(f64::NAN.is_selected());
    }
}
