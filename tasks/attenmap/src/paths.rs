//! 病例目录解析.

use std::env;
use std::path::PathBuf;

/// 默认病例目录, 相对于进程工作目录.
const DEFAULT_CASE_DIR: &str = "data/s0914";

/// 获取 TotalSegmentator 病例目录.
///
/// 1. 若环境变量 `$ATTENMAP_CASE_DIR` 已设置, 则返回其值;
/// 2. 否则, 返回 `data/s0914`.
pub fn case_dir_from_env_or_default() -> PathBuf {
    if let Ok(d) = env::var("ATTENMAP_CASE_DIR") {
        PathBuf::from(d)
    } else {
        PathBuf::from(DEFAULT_CASE_DIR)
    }
}
