use rayon::prelude::*;
use tracing::debug;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::geometry::Rect;
use crate::operation::MatchState;
use crate::raster::RasterImage;
use crate::surface::ImageSurface;

/// Exact pixel comparison of `left_rect` in `left` against `right_rect` in `right`.
///
/// Returns `false` without scanning when either rect is empty, when their
/// sizes differ, or when nothing of the region lies inside both images.
/// Pixels are paired by their offset from each rect's own origin, which is
/// what the renderer draws on top of each other.
pub fn compare_regions(
    left: &RasterImage,
    right: &RasterImage,
    left_rect: Rect,
    right_rect: Rect,
) -> bool {
    compare_regions_cancellable(left, right, left_rect, right_rect, &|| false).unwrap_or(false)
}

/// Like [`compare_regions`], checking `is_cancelled` between rows.
///
/// Returns `None` if the scan was cancelled before a result was known.
pub fn compare_regions_cancellable(
    left: &RasterImage,
    right: &RasterImage,
    left_rect: Rect,
    right_rect: Rect,
    is_cancelled: &(dyn Fn() -> bool + Sync),
) -> Option<bool> {
    if left_rect.is_empty() || right_rect.is_empty() {
        return Some(false);
    }
    if left_rect.size() != right_rect.size() {
        return Some(false);
    }

    let left_visible = left_rect.clipped_to(left.size());
    let right_visible = right_rect.clipped_to(right.size());
    let width = left_visible.width.min(right_visible.width);
    let height = left_visible.height.min(right_visible.height);
    if width == 0 || height == 0 {
        return Some(false);
    }

    let rows_equal = |dy: u32| -> bool {
        if is_cancelled() {
            return false;
        }
        left.row_span(left_rect.x, left_rect.y + dy, width)
            == right.row_span(right_rect.x, right_rect.y + dy, width)
    };

    let pixel_count = width as usize * height as usize;
    let equal = if pixel_count >= PARALLEL_PIXEL_THRESHOLD {
        (0..height).into_par_iter().all(&rows_equal)
    } else {
        (0..height).all(&rows_equal)
    };

    if is_cancelled() {
        return None;
    }
    debug!(width, height, equal, "Compared visible regions");
    Some(equal)
}

/// Match state of two surfaces' visible regions.
///
/// Missing images or empty regions give [`MatchState::Unknown`]; regions of
/// different sizes give [`MatchState::Incomparable`].
pub fn compare_surfaces(
    left: &ImageSurface,
    right: &ImageSurface,
    is_cancelled: &(dyn Fn() -> bool + Sync),
) -> Option<MatchState> {
    let (Some(left_img), Some(right_img)) = (left.scaled(), right.scaled()) else {
        return Some(MatchState::Unknown);
    };
    let (left_rect, right_rect) = (left.source_rect(), right.source_rect());
    if left_rect.is_empty() || right_rect.is_empty() {
        return Some(MatchState::Unknown);
    }
    if left_rect.size() != right_rect.size() {
        return Some(MatchState::Incomparable);
    }
    compare_regions_cancellable(left_img, right_img, left_rect, right_rect, is_cancelled)
        .map(MatchState::from_equal)
}
