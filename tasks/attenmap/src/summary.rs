//! 渲染结果报告.

use crate::runner::{RenderOutcome, OUTPUT_FILENAME};
use std::io::{self, Write};

const SEP: &str = "--------------------------------------------------------";

/// 将 `outcome` 的渲染统计写进 `w` 中.
fn describe_into<W: Write>(o: &RenderOutcome, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    let (z, h, wd) = o.shape;
    let [z_mm, h_mm, w_mm] = o.pix_dim;
    let (lo, hi) = o.map.value_range();

    writeln!(w, "Attenuation map `{OUTPUT_FILENAME}`:")?;
    writeln!(w, "{S4}Volume shape (z, H, W): ({z}, {h}, {wd})")?;
    writeln!(w, "{S4}Voxel size: {z_mm:.2} x {h_mm:.2} x {w_mm:.2} mm")?;
    writeln!(w, "{S4}Rendered slice index: {}", o.z_index)?;
    writeln!(w, "{S4}Value range after clipping: [{lo:.4}, {hi:.4}]")?;
    writeln!(w, "Tissue groups:")?;
    for g in o.groups.iter() {
        writeln!(
            w,
            "{S4}{}: {} matched, {} loaded, {} skipped",
            g.class.name(),
            g.matched,
            g.loaded,
            g.skipped
        )?;
    }
    Ok(())
}

/// 打印运行报告.
pub fn report(outcome: &RenderOutcome) {
    sep();
    let mut buf = Vec::with_capacity(512);
    describe_into(outcome, &mut buf).unwrap();
    print!("{}", std::str::from_utf8(&buf).unwrap());
    sep();
}

/// 简单分隔线.
#[inline]
fn sep() {
    println!("{SEP}");
}
