//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;
}

/// CT 值 (Hounsfield Unit) 相关常量.
pub mod hu {
    /// 脂肪组织 HU 下界 (含).
    pub const FAT_LOWER: f32 = -190.0;

    /// 脂肪组织 HU 上界 (含).
    pub const FAT_UPPER: f32 = -30.0;

    /// 给定 HU 值是否落在脂肪区间内?
    #[inline]
    pub fn is_fat(hu: f32) -> bool {
        (FAT_LOWER..=FAT_UPPER).contains(&hu)
    }
}

/// 各组织类别的线性衰减系数 (已归一化).
pub mod atten {
    /// 脂肪.
    pub const FAT: f32 = 0.10;

    /// 软组织/血管.
    pub const SOFT_TISSUE: f32 = 0.15;

    /// 肌肉.
    pub const MUSCLE: f32 = 0.20;

    /// 实质器官.
    pub const ORGAN: f32 = 0.22;

    /// 骨骼.
    pub const BONE: f32 = 0.50;
}

/// 衰减图仿真噪声的标准差 (高斯, 均值为零).
pub const NOISE_STD_DEV: f32 = 0.02;

/// TotalSegmentator 分割文件的统一后缀.
pub const NII_GZ_SUFFIX: &str = ".nii.gz";

/// 组织类别.
///
/// 变体顺序即绘制顺序: 衰减系数从低到高, 重叠处后绘制者覆盖先绘制者,
/// 因此骨骼永远压住其它类别.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TissueClass {
    /// 脂肪 (由 CT 值区间导出, 不经分割标签).
    Fat,

    /// 软组织/血管.
    SoftTissue,

    /// 肌肉.
    Muscle,

    /// 实质器官.
    Organ,

    /// 骨骼.
    Bone,
}

/// 全部组织类别, 按绘制顺序排列.
pub const PAINT_ORDER: [TissueClass; 5] = [
    TissueClass::Fat,
    TissueClass::SoftTissue,
    TissueClass::Muscle,
    TissueClass::Organ,
    TissueClass::Bone,
];

impl TissueClass {
    /// 该类别的衰减系数.
    #[inline]
    pub fn attenuation(&self) -> f32 {
        match self {
            Self::Fat => atten::FAT,
            Self::SoftTissue => atten::SOFT_TISSUE,
            Self::Muscle => atten::MUSCLE,
            Self::Organ => atten::ORGAN,
            Self::Bone => atten::BONE,
        }
    }

    /// 类别名, 用于日志与报告.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fat => "fat",
            Self::SoftTissue => "soft-tissue",
            Self::Muscle => "muscle",
            Self::Organ => "organ",
            Self::Bone => "bone",
        }
    }

    /// 是否由分割标签驱动 (脂肪除外, 它直接来自 CT 值).
    #[inline]
    pub fn is_labeled(&self) -> bool {
        !matches!(self, Self::Fat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 绘制顺序必须严格按衰减系数递增, 否则覆盖语义出错.
    #[test]
    fn paint_order_is_ascending() {
        for w in PAINT_ORDER.windows(2) {
            assert!(w[0].attenuation() < w[1].attenuation());
        }
    }

    #[test]
    fn fat_range_is_inclusive() {
        assert!(hu::is_fat(hu::FAT_LOWER));
        assert!(hu::is_fat(hu::FAT_UPPER));
        assert!(hu::is_fat(-100.0));
        assert!(!hu::is_fat(-190.5));
        assert!(!hu::is_fat(-29.5));
        assert!(!hu::is_fat(0.0));
    }

    /// 首个绘制层必是 CT 值驱动的脂肪层, 其余四层由分割标签驱动.
    #[test]
    fn only_fat_is_unlabeled() {
        assert!(!TissueClass::Fat.is_labeled());
        for class in PAINT_ORDER.into_iter().skip(1) {
            assert!(class.is_labeled(), "{}", class.name());
        }
    }
}
