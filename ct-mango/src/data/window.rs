/// CT 窗口, 包含窗位 (window level) 和窗宽 (window width).
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug)]
pub struct CtWindow {
    level: f32,
    width: f32,
}

impl CtWindow {
    /// 构建 CT 窗.
    ///
    /// `level` 和 `width` 必须在合理范围内, 否则返回 `None`.
    pub fn new(level: f32, width: f32) -> Option<CtWindow> {
        if (-1e5..=1e5).contains(&level) && 0.0 < width && width <= 1e5 {
            Some(Self { level, width })
        } else {
            None
        }
    }

    /// 构建一个便于展示腹部软组织结构的 CT 窗口. 该窗口的窗位为
    /// 40, 窗宽为 400.
    #[inline]
    pub const fn from_abdomen_visual() -> CtWindow {
        Self {
            level: 40.0,
            width: 400.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值对应的灰度图像素整数值 (0 <= value <= 255)
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, ct: f32) -> Option<u8> {
        if !ct.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if ct <= lb {
            Some(u8::MIN)
        } else if ct >= self.upper_bound() {
            Some(u8::MAX)
        } else {
            // 255, not 256.
            Some((((ct - lb) / self.width()) * 255.0) as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::CtWindow;

    fn is_valid_init(level: f32, width: f32) -> bool {
        CtWindow::new(level, width).is_some()
    }

    #[test]
    fn test_ct_window_invalid_input() {
        assert!(!is_valid_init(0.0, -1.0));
        assert!(!is_valid_init(0.0, 0.0));
        assert!(!is_valid_init(f32::NAN, 100.0));
        assert!(!is_valid_init(2e5, 100.0));
    }

    /// 腹窗 [-160, 240].
    #[test]
    fn test_abdomen_window() {
        let ct = CtWindow::from_abdomen_visual();
        assert_eq!(ct.level(), 40.0);
        assert_eq!(ct.width(), 400.0);
        assert_eq!(ct.lower_bound(), -160.0);
        assert_eq!(ct.upper_bound(), 240.0);

        assert_eq!(ct.eval(f32::NAN), None);
        assert_eq!(ct.eval(f32::INFINITY), None);
        assert_eq!(ct.eval(f32::MIN), Some(0));
        assert_eq!(ct.eval(f32::MAX), Some(255));

        assert_eq!(ct.eval(-1000.0), Some(0));
        assert_eq!(ct.eval(-160.0), Some(0));
        assert_eq!(ct.eval(240.0), Some(255));
        assert_eq!(ct.eval(1000.0), Some(255));

        // 内部区间线性插值.
        assert_eq!(ct.eval(-60.0).unwrap(), (255.0 * 0.25) as u8);
        assert_eq!(ct.eval(40.0).unwrap(), (255.0 * 0.5) as u8);
        assert_eq!(ct.eval(140.0).unwrap(), (255.0 * 0.75) as u8);

        // boundary
        assert_eq!(ct.eval(-159.9), Some(0));
        assert_eq!(ct.eval(239.9), Some(254));
    }
}
