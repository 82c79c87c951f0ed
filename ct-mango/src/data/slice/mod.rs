//! CT 扫描/掩膜切片对象的操作.

mod core;
mod save;

pub use core::{MaskSlice, ScanSlice};

pub use save::ImgWriteVis;

cfg_if::cfg_if! {
    if #[cfg(feature = "plot")] {
        mod plot;

        pub use plot::ImgDisplay;
        pub(crate) use plot::unit_map_to_opencv_mat;
    }
}
