//! 解剖结构标签的组织学归类.
//!
//! TotalSegmentator 的分割结果是一目录的 `{结构名}.nii.gz` 文件.
//! 本模块把结构名划分到 [`TissueClass`] 的四个标签驱动类别
//! (骨骼/肌肉/器官/软组织血管); 词表之外的结构名一律静默丢弃,
//! 不参与后续渲染.

use crate::consts::{TissueClass, NII_GZ_SUFFIX};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// 骨骼类前缀规则: 肋骨与椎骨按节段编号命名, 只能按前缀匹配.
const BONE_PREFIXES: [&str; 2] = ["rib_", "vertebrae_"];

/// 骨骼类精确名.
const BONE_NAMES: [&str; 14] = [
    "femur_left",
    "femur_right",
    "hip_left",
    "hip_right",
    "humerus_left",
    "humerus_right",
    "scapula_left",
    "scapula_right",
    "clavicula_left",
    "clavicula_right",
    "sternum",
    "sacrum",
    "skull",
    "costal_cartilages",
];

/// 肌肉类子串规则: 臀肌分大中小三块, 髂腰肌分左右.
const MUSCLE_SUBSTRINGS: [&str; 2] = ["gluteus", "iliopsoas"];

/// 器官类前缀规则: 五个肺叶共用 `lung_` 前缀.
const ORGAN_PREFIXES: [&str; 1] = ["lung_"];

/// 器官类精确名.
const ORGAN_NAMES: [&str; 17] = [
    "liver",
    "stomach",
    "duodenum",
    "heart",
    "small_bowel",
    "colon",
    "pancreas",
    "gallbladder",
    "esophagus",
    "kidney_left",
    "kidney_right",
    "urinary_bladder",
    "prostate",
    "thyroid_gland",
    "adrenal_gland_left",
    "adrenal_gland_right",
    "spleen",
];

/// 软组织/血管类精确名.
const VESSEL_NAMES: [&str; 15] = [
    "aorta",
    "inferior_vena_cava",
    "superior_vena_cava",
    "portal_vein_and_splenic_vein",
    "pulmonary_vein",
    "iliac_artery_left",
    "iliac_artery_right",
    "iliac_vena_left",
    "iliac_vena_right",
    "subclavian_artery_left",
    "subclavian_artery_right",
    "common_carotid_artery_left",
    "common_carotid_artery_right",
    "brachiocephalic_trunk",
    "spinal_cord",
];

static BONE_NAME_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| BONE_NAMES.into_iter().collect());

static ORGAN_NAME_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ORGAN_NAMES.into_iter().collect());

static VESSEL_NAME_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| VESSEL_NAMES.into_iter().collect());

/// 从分割文件名提取结构名 (去掉 `.nii.gz` 后缀).
///
/// 后缀不符时返回 `None`, 这类文件不属于分割结果.
#[inline]
pub fn label_stem(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(NII_GZ_SUFFIX)
}

/// 把结构名归入组织类别.
///
/// 规则按 骨骼 -> 肌肉 -> 器官 -> 软组织/血管 的顺序测试, 首个命中者生效.
/// 词表外的结构名返回 `None`. 脂肪不由标签驱动, 永远不会被返回.
pub fn classify(stem: &str) -> Option<TissueClass> {
    if BONE_PREFIXES.iter().any(|p| stem.starts_with(p)) || BONE_NAME_SET.contains(stem) {
        Some(TissueClass::Bone)
    } else if MUSCLE_SUBSTRINGS.iter().any(|s| stem.contains(s)) {
        Some(TissueClass::Muscle)
    } else if ORGAN_PREFIXES.iter().any(|p| stem.starts_with(p)) || ORGAN_NAME_SET.contains(stem) {
        Some(TissueClass::Organ)
    } else if VESSEL_NAME_SET.contains(stem) {
        Some(TissueClass::SoftTissue)
    } else {
        None
    }
}

/// 按组织类别分好组的结构名列表.
///
/// 仅覆盖标签驱动的四个类别; 脂肪掩膜另行从 CT 值导出.
#[derive(Clone, Debug, Default)]
pub struct LabelGroups {
    /// 骨骼类结构名.
    pub bone: Vec<String>,

    /// 肌肉类结构名.
    pub muscle: Vec<String>,

    /// 器官类结构名.
    pub organ: Vec<String>,

    /// 软组织/血管类结构名.
    pub soft_tissue: Vec<String>,
}

impl LabelGroups {
    /// 划分一组分割文件名.
    ///
    /// 非 `.nii.gz` 文件与词表外的结构名都被静默丢弃.
    pub fn from_filenames<I, S>(file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups = Self::default();
        for name in file_names {
            let Some(stem) = label_stem(name.as_ref()) else {
                continue;
            };
            let Some(class) = classify(stem) else {
                continue;
            };
            let bucket = match class {
                TissueClass::Bone => &mut groups.bone,
                TissueClass::Muscle => &mut groups.muscle,
                TissueClass::Organ => &mut groups.organ,
                TissueClass::SoftTissue => &mut groups.soft_tissue,
                TissueClass::Fat => unreachable!("classify 不产生脂肪类"),
            };
            bucket.push(stem.to_owned());
        }
        groups
    }

    /// 某类别下的全部结构名. 脂肪类恒为空.
    #[inline]
    pub fn labels(&self, class: TissueClass) -> &[String] {
        match class {
            TissueClass::Bone => &self.bone,
            TissueClass::Muscle => &self.muscle,
            TissueClass::Organ => &self.organ,
            TissueClass::SoftTissue => &self.soft_tissue,
            TissueClass::Fat => &[],
        }
    }

    /// 归入四组的结构名总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.bone.len() + self.muscle.len() + self.organ.len() + self.soft_tissue.len()
    }

    /// 是否没有任何结构名被归类.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
