//! 组织掩膜到衰减图的合成.
//!
//! 将五类组织的掩膜按固定顺序 "印" 到一张二维标量图上, 再叠加高斯噪声
//! 并截断到单位区间, 得到可供保存与展示的衰减图.

use std::ops::Index;
use std::path::Path;

use image::ImageResult;
use ndarray::{Array2, ArrayView2, Zip};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::consts::{TissueClass, PAINT_ORDER};
use crate::data::{ImgWriteVis, MaskSlice, TissueMask};
use crate::{Idx2d, Idx3d};

/// 五类组织掩膜的聚合体, 字段按绘制顺序排列.
///
/// 该结构完全透明, 用户可以直接使用五个掩膜子结构来实现相关上层功能.
///
/// # 注意
///
/// 若绕过 [`TissueStack::new`] 直接构造, 五个掩膜的形状一致性由用户保证,
/// 否则程序行为未定义.
#[derive(Debug, Clone)]
pub struct TissueStack {
    /// 脂肪掩膜 (由 CT 值区间导出).
    pub fat: TissueMask,

    /// 软组织/血管掩膜.
    pub soft_tissue: TissueMask,

    /// 肌肉掩膜.
    pub muscle: TissueMask,

    /// 器官掩膜.
    pub organ: TissueMask,

    /// 骨骼掩膜.
    pub bone: TissueMask,
}

impl TissueStack {
    /// 聚合五类组织掩膜. 参数顺序与绘制顺序一致.
    ///
    /// 若五个掩膜形状不完全一致, 则程序 panic.
    pub fn new(
        fat: TissueMask,
        soft_tissue: TissueMask,
        muscle: TissueMask,
        organ: TissueMask,
        bone: TissueMask,
    ) -> Self {
        let shape = fat.shape();
        for mask in [&soft_tissue, &muscle, &organ, &bone] {
            assert_eq!(shape, mask.shape(), "各组织掩膜形状不一致");
        }
        Self {
            fat,
            soft_tissue,
            muscle,
            organ,
            bone,
        }
    }

    /// 数据形状, 以 (z, H, W) 格式给出.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.fat.shape()
    }

    /// 水平切片形状.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        self.fat.slice_shape()
    }

    /// 水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.fat.len_z()
    }

    /// 某类别对应的掩膜.
    #[inline]
    pub fn mask(&self, class: TissueClass) -> &TissueMask {
        match class {
            TissueClass::Fat => &self.fat,
            TissueClass::SoftTissue => &self.soft_tissue,
            TissueClass::Muscle => &self.muscle,
            TissueClass::Organ => &self.organ,
            TissueClass::Bone => &self.bone,
        }
    }

    /// 全部 (类别, 掩膜) 二元组, 按绘制顺序排列.
    #[inline]
    pub fn layers(&self) -> [(TissueClass, &TissueMask); 5] {
        PAINT_ORDER.map(|class| (class, self.mask(class)))
    }
}

/// 拥有所有权的二维衰减图. 每个像素是一个线性衰减系数.
#[derive(Debug, Clone, PartialEq)]
pub struct AttenMap {
    data: Array2<f32>,
}

impl AttenMap {
    /// 创建给定形状的全零衰减图. `shape` 以 (高, 宽) 格式给出, 不可为空.
    pub fn zeros((h, w): Idx2d) -> Self {
        assert!(h > 0 && w > 0, "衰减图不可为空");
        Self {
            data: Array2::zeros((h, w)),
        }
    }

    /// 在第 `z_index` 个水平切片上合成衰减图.
    ///
    /// 五类掩膜按绘制顺序依次印到全零图上, 重叠处后印者覆盖先印者,
    /// 不做任何混合. 未被任何掩膜覆盖的像素保持为零.
    ///
    /// 当 `z_index` 越界时程序 panic.
    pub fn compose(stack: &TissueStack, z_index: usize) -> Self {
        assert!(z_index < stack.len_z(), "切片索引越界");
        let mut map = Self::zeros(stack.slice_shape());
        for (class, mask) in stack.layers() {
            map.paint(&mask.slice_at(z_index), class.attenuation());
        }
        map
    }

    /// 将掩膜覆盖处的像素全部覆写为 `value`, 掩膜外的像素保持不变.
    ///
    /// 若掩膜形状与衰减图不一致, 则程序 panic.
    pub fn paint(&mut self, mask: &MaskSlice, value: f32) {
        assert_eq!(self.shape(), mask.shape(), "掩膜与衰减图形状不一致");
        Zip::from(&mut self.data)
            .and(mask.array_view())
            .for_each(|px, &covered| {
                if covered {
                    *px = value;
                }
            });
    }

    /// 为每个像素独立叠加均值为零、标准差为 `std_dev` 的高斯噪声.
    ///
    /// `std_dev` 必须是非负有限值, 否则程序 panic.
    pub fn add_gaussian_noise<R: Rng + ?Sized>(&mut self, std_dev: f32, rng: &mut R) {
        assert!(
            std_dev.is_finite() && std_dev >= 0.0,
            "噪声标准差必须是非负有限值"
        );
        // 参数已检查, 该操作不会生成 `Err`, 可直接 unwrap.
        let normal = Normal::new(0.0_f32, std_dev).unwrap();
        self.data.mapv_inplace(|v| v + normal.sample(rng));
    }

    /// 将所有像素截断到单位区间 [0, 1].
    #[inline]
    pub fn clamp_unit(&mut self) {
        self.data.mapv_inplace(|v| v.clamp(0.0, 1.0));
    }

    /// 像素值的 (最小值, 最大值).
    pub fn value_range(&self) -> (f32, f32) {
        use itertools::{Itertools, MinMaxResult};
        use ordered_float::OrderedFloat;

        match self.data.iter().copied().map(OrderedFloat).minmax() {
            // `zeros` 保证数据非空.
            MinMaxResult::NoElements => unreachable!(),
            MinMaxResult::OneElement(v) => (v.0, v.0),
            MinMaxResult::MinMax(lo, hi) => (lo.0, hi.0),
        }
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

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }
}

impl Index<Idx2d> for AttenMap {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 单位区间标量图, 保存时放缩到 8 位灰度.
impl ImgWriteVis for AttenMap {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &v) in self.data.indexed_iter() {
            let gray = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
        }
        buf.save(path)
    }
}

/// 可视化衰减图 (放缩到 8 位灰度).
#[cfg(feature = "plot")]
impl crate::ImgDisplay for AttenMap {
    fn show(&self) {
        let mat = crate::data::slice::unit_map_to_opencv_mat(self.data.view());
        opencv::highgui::imshow("Image", &mat).unwrap();
    }
}
