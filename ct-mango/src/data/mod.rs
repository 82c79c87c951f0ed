use std::ops::{BitOrAssign, Index};
use std::path::Path;

use ndarray::{Array3, ArrayView, Axis, Ix3, Zip};
use nifti::{DataElement, IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::hu;
use crate::{Idx2d, Idx3d};

pub mod slice;
pub mod window;

pub use slice::{ImgWriteVis, MaskSlice, ScanSlice};

#[cfg(feature = "plot")]
pub use slice::ImgDisplay;

pub use window::CtWindow;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 读取 nii 文件并整理为 (z, H, W) 行优先布局.
fn open_nifti<T, P>(path: P) -> nifti::Result<(BoxedHeader, Array3<T>)>
where
    T: DataElement,
    P: AsRef<Path>,
{
    let obj = ReaderOptions::new().read_file(path.as_ref())?;
    let header = Box::new(obj.header().clone());

    // [W, H, z] -> [z, H, W].
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = obj
        .into_volume()
        .into_ndarray::<T>()?
        .permuted_axes([2, 1, 0].as_slice());

    // The nature of nifti data field layout.
    debug_assert!(data.is_standard_layout());

    // 该操作不会生成 `Err`, 可直接 unwrap.
    let data =
        Array3::<T>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec()).unwrap();

    Ok((header, data))
}

/// 为 `fake` 实体拼接一个自洽的 header.
///
/// `dim` 与 `pixdim` 均按照 nifti 惯用标准以 \[w, h, z\] 格式传入.
fn fake_header((w, h, z): Idx3d, pix_dim: [f32; 3]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();

    let [nd, dw, dh, dz, ..] = &mut header.dim;
    (*nd, *dw, *dh, *dz) = (3, w as u16, h as u16, z as u16);

    let [_, pw, ph, pz, ..] = &mut header.pixdim;
    let [w_mm, h_mm, z_mm] = &pix_dim;
    (*pw, *ph, *pz) = (*w_mm, *h_mm, *z_mm);

    header.intent_name[..4].copy_from_slice(b"fake");
    header
}

/// 3D CT nii 文件 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取数据水平切片形状大小.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取体积中点处的水平切片索引.
    #[inline]
    fn mid_z(&self) -> usize {
        self.len_z() / 2
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    ///
    /// 该值也可以通过 `self.{z_mm, height_mm, width_mm}` 分别获取.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取 width 方向 (自然 2D 图像的水平方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn width_mm(&self) -> f64 {
        self.header().pixdim[1] as f64
    }

    /// 获取 height 方向 (自然 2D 图像的垂直方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn height_mm(&self) -> f64 {
        self.header().pixdim[2] as f64
    }

    /// 获取空间方向 (相邻 2D 切片的方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn z_mm(&self) -> f64 {
        self.header().pixdim[3] as f64
    }
}

/// nii 格式 3D CT 扫描, 包括 header 和 CT 扫描 (HU). HU 值以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct CtScan {
    header: BoxedHeader,
    data: Array3<f32>,
}

impl NiftiHeaderAttr for CtScan {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for CtScan {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl CtScan {
    /// 打开 nii 文件格式的 3D CT 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let (header, data) = open_nifti::<f32, _>(path)?;
        Ok(Self { header, data })
    }

    /// 根据裸 HU 数据和体素分辨率直接创建 `CtScan` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 nifti 惯用标准以 \[w, h, z\] 格式存储.
    /// 2. `pix_dim` 按照 \[w, h, z\] 格式存储, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法可能会创建不一致的实体, 因此你应仅将其用于实验目的.
    pub fn fake(data: Array3<f32>, pix_dim: [f32; 3]) -> Self {
        let &[w, h, z] = data.shape() else {
            unreachable!()
        };
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        Self {
            header: fake_header((w, h, z), pix_dim),
            data,
        }
    }

    /// 判断该结构是否是由 `fake` 方法手动拼接的.
    pub fn is_faked(&self) -> bool {
        self.header.intent_name.starts_with(b"fake")
    }

    /// 获取 3D 扫描 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ScanSlice<'_> {
        ScanSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }

    /// 求脂肪掩膜: HU 值落在脂肪区间内的体素为真.
    ///
    /// 脂肪不依赖分割标签, 仅由 CT 值决定.
    pub fn fat_mask(&self) -> TissueMask {
        TissueMask {
            data: self.data.mapv(hu::is_fat),
        }
    }
}

/// nii 格式 3D 结构掩膜, 包括 header 和布尔体素.
///
/// 读入时按照 `体素值 > 0` 二值化, 原文件中的具体数值不保留.
#[derive(Debug, Clone)]
pub struct CtMask {
    header: BoxedHeader,
    data: Array3<bool>,
}

impl NiftiHeaderAttr for CtMask {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for CtMask {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl CtMask {
    /// 打开 nii 文件格式的 3D 结构掩膜. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let (header, data) = open_nifti::<u8, _>(path)?;
        Ok(Self {
            header,
            data: data.mapv(|v| v > 0),
        })
    }

    /// 根据裸掩膜数据和体素分辨率直接创建 `CtMask` 实体.
    /// 体素按照 `值 > 0` 二值化.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 nifti 惯用标准以 \[w, h, z\] 格式存储.
    /// 2. `pix_dim` 按照 \[w, h, z\] 格式存储, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法可能会创建不一致的实体, 因此你应仅将其用于实验目的.
    pub fn fake(data: Array3<u8>, pix_dim: [f32; 3]) -> Self {
        let &[w, h, z] = data.shape() else {
            unreachable!()
        };
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        Self {
            header: fake_header((w, h, z), pix_dim),
            data: data.mapv(|v| v > 0),
        }
    }

    /// 判断该结构是否是由 `fake` 方法手动拼接的.
    pub fn is_faked(&self) -> bool {
        self.header.intent_name.starts_with(b"fake")
    }

    /// 获取 3D 掩膜 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice<'_> {
        MaskSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, bool, Ix3> {
        self.data.view()
    }

    /// 掩膜内为真的体素总个数.
    #[inline]
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&p| p).count()
    }
}

/// 不携带 header 的 3D 组织掩膜, 是同类结构掩膜按体素取或的聚合结果.
///
/// 聚合通过 `|=` 完成, 与掩膜的并入顺序无关.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TissueMask {
    data: Array3<bool>,
}

impl TissueMask {
    /// 创建给定形状的全假掩膜. `shape` 以 (z, H, W) 格式给出.
    #[inline]
    pub fn new(shape: Idx3d) -> Self {
        Self {
            data: Array3::from_elem(shape, false),
        }
    }

    /// 数据形状, 以 (z, H, W) 格式给出.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        let &[z, h, w] = self.data.shape() else {
            unreachable!()
        };
        (z, h, w)
    }

    /// 水平切片形状.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取 3D 掩膜 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice<'_> {
        MaskSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, bool, Ix3> {
        self.data.view()
    }

    /// 掩膜内为真的体素总个数.
    #[inline]
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&p| p).count()
    }

    /// 掩膜内是否存在为真的体素.
    #[inline]
    pub fn any(&self) -> bool {
        self.data.iter().any(|&p| p)
    }
}

impl From<Array3<bool>> for TissueMask {
    #[inline]
    fn from(data: Array3<bool>) -> Self {
        Self { data }
    }
}

impl Index<Idx3d> for TissueMask {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

/// 并入一个结构掩膜. 两者形状不一致时程序 panic.
impl BitOrAssign<&CtMask> for TissueMask {
    fn bitor_assign(&mut self, rhs: &CtMask) {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "结构掩膜与聚合掩膜形状不一致"
        );
        Zip::from(&mut self.data)
            .and(rhs.data())
            .for_each(|acc, &m| *acc |= m);
    }
}

/// 并入另一个聚合掩膜. 两者形状不一致时程序 panic.
impl BitOrAssign<&TissueMask> for TissueMask {
    fn bitor_assign(&mut self, rhs: &TissueMask) {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "两个聚合掩膜形状不一致"
        );
        Zip::from(&mut self.data)
            .and(rhs.data())
            .for_each(|acc, &m| *acc |= m);
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl CtScan {
    /// 借助 `rayon`, 逐水平切片并行地求脂肪掩膜. 结果与 [`CtScan::fat_mask`] 一致.
    pub fn par_fat_mask(&self) -> TissueMask {
        let mut data = Array3::from_elem(self.data.dim(), false);
        data.axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(self.data.axis_iter(Axis(0)).into_par_iter())
            .for_each(|(out, scan)| {
                Zip::from(out).and(scan).for_each(|m, &v| *m = hu::is_fat(v));
            });
        TissueMask { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// (w, h, z) = (4, 3, 2) 的阶梯 HU 数据.
    fn sample_scan() -> CtScan {
        let data = Array3::from_shape_fn((4, 3, 2), |(w, h, z)| {
            -200.0 + (z * 12 + h * 4 + w) as f32 * 10.0
        });
        CtScan::fake(data, [0.8, 0.8, 1.5])
    }

    #[test]
    fn fake_scan_header_attrs() {
        let scan = sample_scan();
        assert!(scan.is_faked());
        assert_eq!(scan.shape(), (2, 3, 4));
        assert_eq!(scan.slice_shape(), (3, 4));
        assert_eq!(scan.len_z(), 2);
        assert_eq!(scan.mid_z(), 1);
        assert_eq!(scan.size(), 24);
        assert!(scan.check(&(1, 2, 3)));
        assert!(!scan.check(&(2, 0, 0)));
        assert_eq!(scan.pix_dim(), [1.5, 0.8, 0.8]);
        assert_eq!(scan.width_mm(), 0.8);
        assert_eq!(scan.z_mm(), 1.5);
    }

    /// fake 输入按 (w, h, z) 存储, 实体内部按 (z, h, w) 访问.
    #[test]
    fn fake_scan_axis_order() {
        let scan = sample_scan();
        // (w, h, z) = (1, 2, 0) -> -200 + 9 * 10.
        assert_eq!(scan[(0, 2, 1)], -110.0);
        assert_eq!(scan.slice_at(0)[(2, 1)], -110.0);
        assert_eq!(scan.data()[(0, 2, 1)], -110.0);
        // (w, h, z) = (3, 0, 1).
        assert_eq!(scan[(1, 0, 3)], -50.0);
    }

    #[test]
    fn fat_mask_uses_inclusive_bounds() {
        let hu = [-190.5, -190.0, -100.0, -30.0, -29.5, 40.0];
        let data = Array3::from_shape_fn((6, 1, 1), |(w, _, _)| hu[w]);
        let scan = CtScan::fake(data, [1.0, 1.0, 1.0]);
        let mask = scan.fat_mask();
        assert_eq!(mask.shape(), (1, 1, 6));
        assert!(!mask[(0, 0, 0)]);
        assert!(mask[(0, 0, 1)]);
        assert!(mask[(0, 0, 2)]);
        assert!(mask[(0, 0, 3)]);
        assert!(!mask[(0, 0, 4)]);
        assert!(!mask[(0, 0, 5)]);
        assert_eq!(mask.count_true(), 3);
    }

    fn mask_of(flags: [u8; 4]) -> CtMask {
        let data = Array3::from_shape_fn((2, 2, 1), |(w, h, _)| flags[h * 2 + w]);
        CtMask::fake(data, [1.0, 1.0, 1.0])
    }

    #[test]
    fn fake_mask_binarizes() {
        let mask = mask_of([0, 1, 2, 0]);
        assert!(mask.is_faked());
        assert_eq!(mask.shape(), (1, 2, 2));
        assert_eq!(mask.count_true(), 2);
        assert!(!mask[(0, 0, 0)]);
        assert!(mask[(0, 0, 1)]);
        assert!(mask[(0, 1, 0)]);
        assert_eq!(mask.slice_at(0).count_true(), 2);
    }

    #[test]
    fn union_is_commutative_and_associative() {
        let a = mask_of([1, 0, 0, 0]);
        let b = mask_of([0, 1, 0, 0]);
        let c = mask_of([0, 1, 1, 0]);

        let mut ab_c = TissueMask::new(a.shape());
        ab_c |= &a;
        ab_c |= &b;
        let mut c_only = TissueMask::new(c.shape());
        c_only |= &c;
        ab_c |= &c_only;

        let mut cba = TissueMask::new(c.shape());
        cba |= &c;
        cba |= &b;
        cba |= &a;

        assert_eq!(ab_c, cba);
        assert_eq!(ab_c.count_true(), 3);
        assert!(!ab_c[(0, 1, 1)]);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let a = mask_of([1, 0, 1, 0]);
        let mut acc = TissueMask::new(a.shape());
        assert!(!acc.any());
        acc |= &a;
        let before = acc.clone();
        acc |= &TissueMask::new(a.shape());
        assert_eq!(acc, before);
    }

    #[test]
    #[should_panic(expected = "形状不一致")]
    fn union_panics_on_shape_mismatch() {
        let a = mask_of([1, 0, 0, 0]);
        let mut acc = TissueMask::new((3, 2, 2));
        acc |= &a;
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn par_fat_mask_matches_serial() {
        let scan = sample_scan();
        assert_eq!(scan.fat_mask(), scan.par_fat_mask());

        // 16 层切片, 阶梯恰好踩中脂肪区间两端.
        let data = Array3::from_shape_fn((3, 4, 16), |(w, h, z)| {
            -260.0 + (z * 12 + h * 3 + w) as f32 * 2.5
        });
        let tall = CtScan::fake(data, [1.0, 1.0, 1.0]);
        let mask = tall.par_fat_mask();
        assert_eq!(mask, tall.fat_mask());
        assert_eq!(mask.shape(), (16, 4, 3));
        assert_eq!(mask.count_true(), 65);
    }
}
