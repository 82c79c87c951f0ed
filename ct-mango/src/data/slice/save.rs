//! 图像的持久化存储.

use crate::{MaskSlice, ScanSlice};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好"
/// 的方式保存, 而不是 "as is" 的方式. 这意味着, 对于 `MaskSlice`
/// 这类布尔图像, 在保存时会映射为黑白两色; 对于 `ScanSlice`
/// 这类以 CT HU 值存储的扫描, 在保存时会用常见的腹部可视化窗口规范化;
/// 对于 [`crate::AttenMap`] 这类单位区间标量图, 在保存时会放缩到 8 位灰度.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 掩膜像素的黑白映射.
#[inline]
pub(crate) fn pretty(covered: bool) -> u8 {
    use crate::consts::gray::*;
    if covered {
        WHITE
    } else {
        BLACK
    }
}

/// 会将掩膜内/掩膜外像素分别映射为白色/黑色.
impl ImgWriteVis for MaskSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, image::Luma([pretty(pix)]));
        }
        buf.save(path)
    }
}

/// 窗位 40, 窗宽 400.
impl ImgWriteVis for ScanSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        const WINDOW: crate::CtWindow = crate::CtWindow::from_abdomen_visual();
        for ((h, w), &hu) in self.indexed_iter() {
            let gray = WINDOW.eval(hu).unwrap();
            buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
        }
        buf.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CtMask, CtScan};
    use ndarray::Array3;

    #[test]
    fn mask_slice_saves_black_and_white() {
        let mut data = Array3::from_elem((2, 2, 1), 0_u8);
        data[(1, 0, 0)] = 7;
        let mask = CtMask::fake(data, [1.0, 1.0, 1.0]);

        let path = std::env::temp_dir().join("ct-mango-mask-save-test.png");
        mask.slice_at(0).save(&path).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.get_pixel(1, 0).0, [255]);
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(0, 1).0, [0]);
        assert_eq!(img.get_pixel(1, 1).0, [0]);

        std::fs::remove_file(&path).ok();
    }

    /// 腹窗 [-160, 240] 下的灰度落点.
    #[test]
    fn scan_slice_saves_windowed_grays() {
        let data = Array3::from_shape_fn((2, 2, 1), |(w, h, _)| match (w, h) {
            (0, 0) => -1000.0,
            (1, 0) => 40.0,
            (0, 1) => 240.0,
            _ => -60.0,
        });
        let scan = CtScan::fake(data, [1.0, 1.0, 1.0]);

        let path = std::env::temp_dir().join("ct-mango-scan-save-test.png");
        scan.slice_at(0).save(&path).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(1, 0).0, [127]);
        assert_eq!(img.get_pixel(0, 1).0, [255]);
        assert_eq!(img.get_pixel(1, 1).0, [63]);

        std::fs::remove_file(&path).ok();
    }
}
