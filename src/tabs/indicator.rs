//! Tab bar indicator, derived from the pager's shared offset

/// Opacity of a label whose page is a full page (or more) away
pub const DIM_OPACITY: f32 = 0.5;

/// Everything the tab bar needs to draw one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorFrame {
    /// Left edge of the underline
    pub underline_x: f32,
    /// Width of the underline (one tab slot)
    pub underline_width: f32,
    /// Per-label opacity in `[0.5, 1.0]`
    pub label_opacity: Vec<f32>,
}

impl IndicatorFrame {
    /// Compute the frame for a pager at `shared_offset`
    pub fn compute(shared_offset: f32, page_width: f32, count: usize) -> Self {
        if count == 0 || page_width <= 0.0 {
            return Self::default();
        }
        let slots = count as f32;
        Self {
            underline_x: shared_offset / slots,
            underline_width: page_width / slots,
            label_opacity: (0..count)
                .map(|i| label_opacity(shared_offset, page_width, i))
                .collect(),
        }
    }
}

/// Opacity of label `index`: 1 when its page is centred, fading to 0.5 one
/// page away
pub fn label_opacity(shared_offset: f32, page_width: f32, index: usize) -> f32 {
    let centre = index as f32 * page_width;
    let distance = ((shared_offset - centre).abs() / page_width).min(1.0);
    1.0 - (1.0 - DIM_OPACITY) * distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underline_tracks_offset_proportionally() {
        let frame = IndicatorFrame::compute(300.0, 300.0, 3);
        assert!((frame.underline_x - 100.0).abs() < f32::EPSILON);
        assert!((frame.underline_width - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_label_opacity_fades_between_pages() {
        let frame = IndicatorFrame::compute(150.0, 300.0, 3);
        assert!((frame.label_opacity[0] - 0.75).abs() < 1e-6);
        assert!((frame.label_opacity[1] - 0.75).abs() < 1e-6);
        assert!((frame.label_opacity[2] - DIM_OPACITY).abs() < 1e-6);

        let settled = IndicatorFrame::compute(600.0, 300.0, 3);
        assert!((settled.label_opacity[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(IndicatorFrame::compute(0.0, 0.0, 3), IndicatorFrame::default());
        assert!(IndicatorFrame::compute(0.0, 100.0, 0).label_opacity.is_empty());
    }
}
