use imgcompare_core::geometry::Rect;
use imgcompare_core::raster::RasterImage;

/// Convert the `rect` region of an RGBA raster to an egui ColorImage.
///
/// Only the visible crop is uploaded, so high zoom levels never produce
/// textures larger than the viewport.
pub fn region_to_color_image(raster: &RasterImage, rect: Rect) -> Option<egui::ColorImage> {
    let crop = raster.cropped(rect);
    if crop.is_empty() {
        return None;
    }
    let size = [crop.width() as usize, crop.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(
        size,
        crop.as_rgba().as_raw(),
    ))
}

/// egui colour for an RGBA overlay constant.
pub fn overlay_to_color32(rgba: [u8; 4]) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}
