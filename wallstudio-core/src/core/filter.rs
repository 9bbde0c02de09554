use crate::core::image::ImageCandidate;

/// Target height:width ratio and the absolute tolerance around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioTarget {
    pub ratio: f64,
    pub tolerance: f64,
}

impl Default for RatioTarget {
    /// 16:9 portrait phone screen.
    fn default() -> Self {
        Self {
            ratio: 16.0 / 9.0,
            tolerance: 0.3,
        }
    }
}

impl RatioTarget {
    pub fn accepts(&self, candidate: &ImageCandidate) -> bool {
        if !candidate.has_valid_dimensions() || candidate.height <= candidate.width {
            return false;
        }
        let ratio = f64::from(candidate.height) / f64::from(candidate.width);
        (ratio - self.ratio).abs() < self.tolerance
    }
}

/// Keeps portrait candidates close to `target`, in their original order.
///
/// Falls back to the unfiltered list when nothing matches, so a non-empty
/// input never produces an empty gallery.
pub fn filter_for_wallpaper(candidates: Vec<ImageCandidate>, target: RatioTarget) -> Vec<ImageCandidate> {
    let total = candidates.len();
    let matching: Vec<ImageCandidate> = candidates
        .iter()
        .filter(|candidate| target.accepts(candidate))
        .cloned()
        .collect();

    if matching.is_empty() {
        log::debug!("No candidate matches ratio {:.3}, keeping all {}", target.ratio, total);
        candidates
    } else {
        log::debug!("{} of {} candidates match ratio {:.3}", matching.len(), total, target.ratio);
        matching
    }
}
