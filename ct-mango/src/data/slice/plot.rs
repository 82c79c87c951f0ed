//! 图片展示模块, 主要用于调试.
//!
//! # 注意
//!
//! 需要 `plot` feature.

use crate::{Idx2d, MaskSlice, ScanSlice};
use ndarray::ArrayView2;
use opencv::highgui::{imshow, wait_key};
use opencv::prelude::{Mat, MatTraitConst};
use std::time::Duration;

/// 表明一个可以在窗口中可视化的对象.
pub trait ImgDisplay {
    /// 展示对象.
    fn show(&self);

    /// 同 `show()`, 但在之后自动等待一次用户按键输入.
    fn show_and_wait(&self) {
        self.show();
        wait_key(0).unwrap(); // never fails
    }

    /// 同 `show()`, 但在之后自动等待给定时间.
    fn show_and_wait_for(&self, d: Duration) -> opencv::Result<i32> {
        self.show();
        let ms = d.as_millis();
        assert!(ms <= i32::MAX as u128);
        wait_key(ms as i32)
    }
}

/// 将行优先的灰度字节流以 `(h, w)` 分辨率存储为矩阵.
fn gray_buf_to_opencv_mat(data: &[u8], (h, w): Idx2d) -> Mat {
    assert_eq!(data.len(), h * w);
    let mat = Mat::from_slice_rows_cols(data, h, w).unwrap();

    let size = mat.size().unwrap();
    debug_assert_eq!(size.height as usize, h);
    debug_assert_eq!(size.width as usize, w);
    mat
}

/// 将单位区间标量图放缩到 8 位灰度后存储为矩阵.
pub(crate) fn unit_map_to_opencv_mat(data: ArrayView2<f32>) -> Mat {
    let &[h, w] = data.shape() else {
        unreachable!()
    };
    let buf: Vec<u8> = data
        .iter()
        .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    gray_buf_to_opencv_mat(&buf, (h, w))
}

/// 可视化掩膜: 掩膜内为白色, 掩膜外为黑色.
impl ImgDisplay for MaskSlice<'_> {
    fn show(&self) {
        let buf: Vec<u8> = self.iter().map(|&p| super::save::pretty(p)).collect();
        let mat = gray_buf_to_opencv_mat(&buf, self.shape());
        imshow("Image", &mat).unwrap();
    }
}

/// 可视化扫描 (窗位 40, 窗宽 400).
impl ImgDisplay for ScanSlice<'_> {
    fn show(&self) {
        const WINDOW: crate::CtWindow = crate::CtWindow::from_abdomen_visual();
        let buf: Vec<u8> = self.iter().map(|&hu| WINDOW.eval(hu).unwrap()).collect();
        let mat = gray_buf_to_opencv_mat(&buf, self.shape());
        imshow("Image", &mat).unwrap();
    }
}
