//! 程序运行函数.

use crate::paths;
use ct_mango::prelude::*;
use std::path::Path;
use std::thread;

/// 渲染结果的固定输出文件名, 生成于进程工作目录下.
pub const OUTPUT_FILENAME: &str = "attenuation_map_slice.png";

/// 单组结构掩膜的加载统计.
pub struct GroupReport {
    /// 组织类别.
    pub class: TissueClass,

    /// 词表命中的结构名个数.
    pub matched: usize,

    /// 成功加载并聚合的掩膜个数.
    pub loaded: usize,

    /// 因文件缺失被静默跳过的结构名个数.
    pub skipped: usize,
}

/// 一次渲染的全部产出.
pub struct RenderOutcome {
    /// 最终衰减图 (已叠加噪声并截断到单位区间).
    pub map: AttenMap,

    /// 被渲染的水平切片索引.
    pub z_index: usize,

    /// CT 体积形状, 以 (z, H, W) 格式给出.
    pub shape: Idx3d,

    /// 体素分辨率 \[z, H, W\], 以毫米为单位.
    pub pix_dim: [f64; 3],

    /// 四个标签驱动类别的加载统计, 按绘制顺序排列.
    pub groups: [GroupReport; 4],
}

/// 加载一组同类结构掩膜并聚合为单个组织掩膜.
///
/// 文件缺失静默跳过; 文件存在但不可读时程序 panic.
fn load_group(
    class: TissueClass,
    labels: &[String],
    seg_dir: &Path,
    shape: Idx3d,
) -> (TissueMask, GroupReport) {
    let mut acc = TissueMask::new(shape);
    let mut loaded = 0_usize;

    let mut loader = totalseg::mask_loader(labels.iter().cloned(), seg_dir);
    for (label, mask) in &mut loader {
        let mask = mask.unwrap_or_else(|e| panic!("Loading `{label}` mask error: {e}"));
        acc |= &mask;
        loaded += 1;
    }

    let report = GroupReport {
        class,
        matched: labels.len(),
        loaded,
        skipped: loader.skipped(),
    };
    (acc, report)
}

/// 实际运行.
pub fn run() -> RenderOutcome {
    let case_dir = paths::case_dir_from_env_or_default();
    assert!(case_dir.is_dir(), "Case directory not found: {}", case_dir.display());

    let ct_path = totalseg::ct_path(&case_dir);
    log::info!("Loading CT scan from `{}`...", ct_path.display());
    let ct = CtScan::open(ct_path).expect("Loading CT scan error");
    let shape = ct.shape();

    let seg_dir = totalseg::seg_dir(&case_dir);
    let file_names = totalseg::list_labels(&seg_dir).expect("Listing segmentations error");
    assert!(
        !file_names.is_empty(),
        "Empty segmentation directory: {}",
        seg_dir.display()
    );

    let groups = LabelGroups::from_filenames(&file_names);
    log::info!(
        "Classified {} of {} segmentation files into 4 tissue groups",
        groups.len(),
        file_names.len()
    );

    log::info!("Loading tissue masks in 4 threads...");
    let seg = seg_dir.as_path();
    let (fat, group_masks) = thread::scope(|s| {
        let handles = [
            (TissueClass::SoftTissue, &groups.soft_tissue),
            (TissueClass::Muscle, &groups.muscle),
            (TissueClass::Organ, &groups.organ),
            (TissueClass::Bone, &groups.bone),
        ]
        .map(|(class, labels)| s.spawn(move || load_group(class, labels, seg, shape)));

        // 四组掩膜在后台加载时, 主线程扫描脂肪 CT 值区间.
        let fat = ct.fat_mask();

        (
            fat,
            handles.map(|th| th.join().expect("Thread joining error")),
        )
    });

    let [(soft, soft_rep), (muscle, muscle_rep), (organ, organ_rep), (bone, bone_rep)] =
        group_masks;
    let stack = TissueStack::new(fat, soft, muscle, organ, bone);

    let z_index = ct.mid_z();
    log::info!("Composing attenuation map at slice {z_index}...");
    let mut map = AttenMap::compose(&stack, z_index);
    map.add_gaussian_noise(NOISE_STD_DEV, &mut rand::thread_rng());
    map.clamp_unit();

    map.save(OUTPUT_FILENAME).expect("Saving attenuation map error");
    log::info!("Attenuation map saved to `{OUTPUT_FILENAME}`");

    RenderOutcome {
        map,
        z_index,
        shape,
        pix_dim: ct.pix_dim(),
        groups: [soft_rep, muscle_rep, organ_rep, bone_rep],
    }
}
