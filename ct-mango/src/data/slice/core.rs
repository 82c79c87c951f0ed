use crate::Idx2d;
use ndarray::iter::Iter;
use ndarray::{ArrayView2, Ix2};
use std::ops::Index;

/// 不可变、借用的二维水平 CT 扫描切片.
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::CtScan`].
    ///
    /// 这里有意把代码写死为 `ArrayView` 降低灵活性, 但使结构的意图更加明确.
    data: ArrayView2<'a, f32>,
}

impl Index<Idx2d> for ScanSlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 不可变、借用的二维水平组织掩膜切片.
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::TissueMask`] 或 [`crate::CtMask`].
    ///
    /// 这里有意把代码写死为 `ArrayView` 降低灵活性, 但使结构的意图更加明确.
    data: ArrayView2<'a, bool>,
}

impl Index<Idx2d> for MaskSlice<'_> {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 切片的不可变方法集合.
macro_rules! impl_slice_immut {
    ($life: lifetime, $slice: ty, $elem: ty) => {
        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: ArrayView2<$life, $elem>) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<$elem> {
                self.data.view()
            }

            /// 获取可以迭代图像像素的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, $elem, Ix2> {
                self.data.iter()
            }

            /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<&$elem> {
                self.data.get(pos)
            }

            /// 图像的分辨率 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                let &[h, w] = self.data.shape() else {
                    unreachable!()
                };
                (h, w)
            }

            /// 图像的像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                let (h, w) = self.shape();
                h * w
            }

            /// 获得图像的高.
            #[inline]
            pub fn height(&self) -> usize {
                self.shape().0
            }

            /// 获得图像的宽.
            #[inline]
            pub fn width(&self) -> usize {
                self.shape().1
            }

            /// 判断一个索引是否合法 (未越界).
            #[inline]
            pub fn check(&self, (h, w): Idx2d) -> bool {
                let (h_len, w_len) = self.shape();
                h < h_len && w < w_len
            }

            /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &$elem)> {
                self.data.indexed_iter()
            }
        }
    };
}

impl_slice_immut!('a, ScanSlice<'a>, f32);
impl_slice_immut!('a, MaskSlice<'a>, bool);

impl MaskSlice<'_> {
    /// 统计掩膜内为真的像素总个数.
    #[inline]
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&p| p).count()
    }

    /// 掩膜内是否存在为真的像素.
    #[inline]
    pub fn any(&self) -> bool {
        self.data.iter().any(|&p| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn scan_slice_geometry() {
        let data = array![[0.0_f32, 1.0, 2.0], [3.0, 4.0, 5.0]];
        let slice = ScanSlice::new(data.view());
        assert_eq!(slice.shape(), (2, 3));
        assert_eq!(slice.size(), 6);
        assert_eq!(slice.height(), 2);
        assert_eq!(slice.width(), 3);
        assert!(slice.check((1, 2)));
        assert!(!slice.check((2, 0)));
        assert_eq!(slice[(1, 1)], 4.0);
        assert_eq!(slice.get((0, 2)), Some(&2.0));
        assert_eq!(slice.get((0, 3)), None);
        assert_eq!(slice.iter().count(), 6);
    }

    #[test]
    fn mask_slice_counting() {
        let data = array![[true, false, true], [false, false, true]];
        let slice = MaskSlice::new(data.view());
        assert_eq!(slice.count_true(), 3);
        assert!(slice.any());
        assert!(slice[(0, 0)]);
        assert!(!slice[(1, 0)]);

        let blank = array![[false, false], [false, false]];
        let blank = MaskSlice::new(blank.view());
        assert_eq!(blank.count_true(), 0);
        assert!(!blank.any());
    }
}
