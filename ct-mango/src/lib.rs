#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供 TotalSegmentator 格式腹部 CT 病例的结构化信息和组织衰减图合成算法.
//!
//! 该 crate 目前仅提供 `safe` 接口. 将来可能为部分高性能场景关键路径提供 `unsafe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 目前主要负责处理 TotalSegmentator 输出 (`ct.nii.gz` +
//!   `segmentations/` 目录), 没有对其它源的数据进行直接适配
//!   (但如果新数据按照该模式进行组织, 也可以工作).
//! 2. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!
//! # 开发计划
//!
//! ### 解剖结构词表归类 ✅
//!
//! 将分割文件名划分到 骨骼/肌肉/器官/软组织血管 四个组织类别,
//! 词表外的结构名静默丢弃.
//!
//! 实现位于 `ct-mango/src/taxonomy.rs`.
//!
//! ### 结构掩膜加载与聚合 ✅
//!
//! 将同类结构的 nii 掩膜按体素取或, 聚合为单个组织掩膜.
//! 分割目录下缺失的文件被静默跳过.
//!
//! 实现位于 `ct-mango/src/data` 与 `ct-mango/src/dataset/totalseg.rs`.
//!
//! ### 脂肪 CT 值区间掩膜 ✅
//!
//! 脂肪不经分割标签, 直接由 HU 值区间 [-190, -30] 判定.
//!
//! 实现位于 `ct-mango/src/data`.
//!
//! ### 衰减图合成 ✅
//!
//! 五类组织按衰减系数从低到高依次印到水平切片上, 重叠处后印者覆盖先印者.
//! 之后叠加零均值高斯噪声并截断到单位区间.
//!
//! 实现位于 `ct-mango/src/atten.rs`.
//!
//! ### CT window 视图 ✅
//!
//! 提供一个独立的 CT 窗口对象, 以便将 CT HU 值转换为 8-bit 灰度值.
//!
//! 实现位于 `ct-mango/src/data/window.rs`.
//!
//! ### 完善代码文档 ✅
//!
//! 给每个 public API 提供文档, 并视情况给 private
//! API 提供文档.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D CT nii 文件基础数据结构.
mod data;

pub use data::{
    CtMask, CtScan, CtWindow, ImgWriteVis, MaskSlice, NiftiHeaderAttr, ScanSlice, TissueMask,
};

pub mod consts;

#[cfg(feature = "plot")]
pub use data::ImgDisplay;

pub mod atten;

pub use atten::{AttenMap, TissueStack};

pub mod dataset;
pub mod prelude;
pub mod taxonomy;
