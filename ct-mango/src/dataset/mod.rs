//! 数据集操作.

pub mod totalseg;
