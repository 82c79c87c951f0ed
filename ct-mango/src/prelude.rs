//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::slice::{ImgWriteVis, MaskSlice, ScanSlice};
pub use crate::data::window::CtWindow;
pub use crate::data::{CtMask, CtScan, NiftiHeaderAttr, TissueMask};

#[cfg(feature = "plot")]
pub use crate::data::slice::ImgDisplay;

pub use crate::atten::{AttenMap, TissueStack};

pub use crate::consts::{TissueClass, NII_GZ_SUFFIX, NOISE_STD_DEV, PAINT_ORDER};

pub use crate::dataset::{self, totalseg};
pub use crate::taxonomy::{self, LabelGroups};
