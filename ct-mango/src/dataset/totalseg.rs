//! TotalSegmentator 格式病例的数据加载器.
//!
//! 一个病例是一个目录, 内含固定名称的 CT 扫描与一个分割子目录:
//!
//! ```text
//! {case_dir}/ct.nii.gz
//! {case_dir}/segmentations/{结构名}.nii.gz
//! ```
//!
//! 提供迭代器风格的掩膜获取模式.

use crate::consts::NII_GZ_SUFFIX;
use crate::CtMask;
use itertools::Itertools;
use std::io;
use std::path::{Path, PathBuf};

/// 病例目录下 CT 扫描的固定文件名.
pub const CT_FILENAME: &str = "ct.nii.gz";

/// 病例目录下分割结果子目录的固定名称.
pub const SEG_DIR_NAME: &str = "segmentations";

/// 病例目录下 CT 扫描的全路径.
#[inline]
pub fn ct_path<P: AsRef<Path>>(case_dir: P) -> PathBuf {
    case_dir.as_ref().join(CT_FILENAME)
}

/// 病例目录下分割结果子目录的全路径.
#[inline]
pub fn seg_dir<P: AsRef<Path>>(case_dir: P) -> PathBuf {
    case_dir.as_ref().join(SEG_DIR_NAME)
}

/// 结构名对应的分割文件全路径.
#[inline]
pub fn seg_path<P: AsRef<Path>>(seg_dir: P, label: &str) -> PathBuf {
    seg_dir.as_ref().join(format!("{label}{NII_GZ_SUFFIX}"))
}

/// 列出分割目录下全部常规文件的文件名, 按字典序排序.
///
/// 不做任何后缀或词表过滤, 归类交给 [`crate::taxonomy`].
pub fn list_labels<P: AsRef<Path>>(seg_dir: P) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(seg_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names.into_iter().sorted().collect())
}

/// 从结构名列表和分割目录创建掩膜 ([`CtMask`]) 加载器.
///
/// # 注意
///
/// 1. `seg_dir` 必须是目录, 否则程序 panic.
/// 2. 分割目录下没有对应文件的结构名会被静默跳过, 不产生告警;
///    已跳过的个数可随时通过 [`MaskLoader::skipped`] 查询.
pub fn mask_loader<I, S, P>(labels: I, seg_dir: P) -> MaskLoader
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    P: AsRef<Path>,
{
    let path = seg_dir.as_ref().to_owned();
    assert!(path.is_dir());

    let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
    labels.reverse();

    MaskLoader {
        path,
        labels_rev: labels,
        skipped: 0,
    }
}

/// 3D 结构掩膜数据加载器.
///
/// 迭代产出 `(结构名, 掩膜)` 二元组. 文件缺失的结构名被静默跳过;
/// 文件存在但无法读取时产出 `Err`, 由调用方决定如何处置.
///
/// 由于跳过行为在打开文件前才能确定, 该加载器不实现 `ExactSizeIterator`.
#[derive(Debug)]
pub struct MaskLoader {
    path: PathBuf,
    labels_rev: Vec<String>,
    skipped: usize,
}

impl MaskLoader {
    /// 迄今为止被静默跳过的结构名个数.
    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for MaskLoader {
    type Item = (String, nifti::Result<CtMask>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let label = self.labels_rev.pop()?;

            self.path.push(format!("{label}{NII_GZ_SUFFIX}"));
            let data = self
                .path
                .is_file()
                .then(|| CtMask::open(self.path.as_path()));
            self.path.pop();

            match data {
                Some(result) => return Some((label, result)),
                // 文件缺失: 静默跳过.
                None => self.skipped += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn case_paths_are_fixed() {
        let case = Path::new("data/s0914");
        assert_eq!(ct_path(case), Path::new("data/s0914/ct.nii.gz"));
        assert_eq!(seg_dir(case), Path::new("data/s0914/segmentations"));
        assert_eq!(
            seg_path(seg_dir(case), "liver"),
            Path::new("data/s0914/segmentations/liver.nii.gz")
        );
    }

    /// 为单个测试创建独占的临时目录.
    fn make_temp_dir(tag: &str) -> PathBuf {
        let name = format!("ct-mango-totalseg-{tag}-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn list_labels_keeps_regular_files_sorted() {
        let dir = make_temp_dir("list");
        fs::write(dir.join("liver.nii.gz"), b"x").unwrap();
        fs::write(dir.join("aorta.nii.gz"), b"x").unwrap();
        fs::write(dir.join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();

        let names = list_labels(&dir).unwrap();
        assert_eq!(names, ["aorta.nii.gz", "liver.nii.gz", "notes.txt"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn list_labels_propagates_missing_dir() {
        let dir = std::env::temp_dir().join("ct-mango-totalseg-definitely-missing");
        assert!(list_labels(&dir).is_err());
    }

    #[test]
    fn loader_skips_missing_files_silently() {
        let dir = make_temp_dir("skip");
        let mut loader = mask_loader(["liver", "aorta", "spleen"], &dir);
        assert!(loader.next().is_none());
        assert_eq!(loader.skipped(), 3);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loader_yields_err_for_unreadable_file() {
        let dir = make_temp_dir("bad");
        fs::write(dir.join("liver.nii.gz"), b"not a nifti file").unwrap();

        // gallbladder 缺失被跳过, liver 存在但不是合法 nifti.
        let mut loader = mask_loader(["gallbladder", "liver"], &dir);
        let (label, result) = loader.next().unwrap();
        assert_eq!(label, "liver");
        assert!(result.is_err());
        assert_eq!(loader.skipped(), 1);
        assert!(loader.next().is_none());

        fs::remove_dir_all(&dir).ok();
    }
}
