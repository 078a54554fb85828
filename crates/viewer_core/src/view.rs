use shared::protocol::{ImageData, NEIGHBOR_IMAGE_COUNT};

/// Mutable visual state of one viewer slot.
///
/// `generation` is the remount key for the rendering boundary: bumping
/// it tells the renderer to discard cached surface state and rebuild,
/// independent of whether the image payloads changed. It only ever
/// increases.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    primary_image: ImageData,
    neighbor_images: [ImageData; NEIGHBOR_IMAGE_COUNT],
    generation: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_image(&self) -> &ImageData {
        &self.primary_image
    }

    pub fn neighbor_images(&self) -> &[ImageData; NEIGHBOR_IMAGE_COUNT] {
        &self.neighbor_images
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Unconditional overwrite; inbound pushes carry no diffing info.
    pub fn set_primary_image(&mut self, image: ImageData) {
        self.primary_image = image;
    }

    /// Takes the payloads in backend enumeration order, truncating past
    /// the fixed count and padding short sets with empty placeholders.
    pub fn set_neighbor_images(&mut self, images: Vec<ImageData>) {
        let mut images = images.into_iter();
        for slot in &mut self.neighbor_images {
            *slot = images.next().unwrap_or_default();
        }
    }

    pub fn clear_neighbor_images(&mut self) {
        self.neighbor_images = Default::default();
    }

    pub fn bump_generation(&mut self) {
        self.generation += 1;
    }
}

/// Flight telemetry shown alongside the single-mode viewer. Updated only
/// by inbound `flight_params` pushes; zeroed locally on reset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Telemetry {
    pub elevation: f64,
    pub heading: f64,
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
