//! 一次性任务: 为单个 TotalSegmentator 病例渲染组织衰减图切片.
//!
//! 病例目录取自环境变量 `$ATTENMAP_CASE_DIR`, 未设置时使用 `data/s0914`.
//! 渲染结果保存为工作目录下的 `attenuation_map_slice.png`.

mod paths;
mod runner;
mod summary;

fn main() {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let outcome = runner::run();
    summary::report(&outcome);

    #[cfg(feature = "plot")]
    {
        use ct_mango::ImgDisplay;

        // 保存完成后交互式展示, 任意键关闭.
        outcome.map.show_and_wait();
    }
}
