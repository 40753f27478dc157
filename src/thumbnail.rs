use eframe::egui::ColorImage;
use tracing::debug;

/// Download and decode a thumbnail image from its URL.
pub fn fetch_thumbnail(url: &str) -> Option<ColorImage> {
    // Blocking GET; any failure leaves the placeholder box in place
    let resp = match reqwest::blocking::get(url).and_then(|r| r.error_for_status()) {
        Ok(resp) => resp.bytes().ok()?,
        Err(e) => {
            debug!(url, error = %e, "thumbnail fetch failed");
            return None;
        }
    };
    // Load image data into an image::DynamicImage and convert to RGBA8
    let img = image::load_from_memory(&resp).ok()?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, &img))
}
