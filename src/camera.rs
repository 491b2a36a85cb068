//! Pinhole camera model and viewport mapping.
//!
//! The camera sits at the origin looking down -Z with +Y up. Landmark
//! coordinates arrive normalized to the video frame; before unprojection
//! they are remapped to account for the cover-crop between the video frame
//! and the differently-shaped container it fills, then mirrored to match
//! the on-screen (selfie) presentation.

use nalgebra::Vector3;

use crate::constants::GEOMETRY_EPSILON;

/// Perspective camera with a vertical field of view
#[derive(Debug, Clone, Copy)]
pub struct CameraModel {
    fov_y: f64,
    aspect: f64,
}

impl CameraModel {
    /// Create a camera model
    ///
    /// # Panics
    ///
    /// Panics if the field of view is not in (0, 180) degrees or the aspect
    /// ratio is not positive
    #[must_use]
    pub fn new(fov_y_degrees: f64, aspect: f64) -> Self {
        assert!(
            fov_y_degrees > 0.0 && fov_y_degrees < 180.0,
            "Field of view must be in (0, 180) degrees"
        );
        assert!(aspect > 0.0, "Aspect ratio must be positive");
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
        }
    }

    /// View ray through a normalized screen coordinate (origin top-left)
    #[must_use]
    pub fn unproject(&self, x: f64, y: f64) -> Vector3<f64> {
        let tan_half = (self.fov_y / 2.0).tan();
        let ndc_x = 2.0 * x - 1.0;
        let ndc_y = 1.0 - 2.0 * y;
        Vector3::new(ndc_x * tan_half * self.aspect, ndc_y * tan_half, -1.0)
    }

    /// World position along the view ray at the given camera distance
    #[must_use]
    pub fn point_at_depth(&self, x: f64, y: f64, depth: f64) -> Vector3<f64> {
        self.unproject(x, y) * depth
    }

    /// Vertical world-space extent of the frame at the given distance.
    /// Multiplying a y-normalized length by this yields meters.
    #[must_use]
    pub fn world_extent_at(&self, depth: f64) -> f64 {
        2.0 * depth * (self.fov_y / 2.0).tan()
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.aspect
    }
}

/// Cover-crop remap between the video frame and the container it fills
#[derive(Debug, Clone, Copy)]
pub struct ViewportMapping {
    video_aspect: f64,
    container_aspect: f64,
}

impl ViewportMapping {
    /// Create a mapping
    ///
    /// # Panics
    ///
    /// Panics if either aspect ratio is not positive
    #[must_use]
    pub fn new(video_aspect: f64, container_aspect: f64) -> Self {
        assert!(video_aspect > 0.0, "Video aspect must be positive");
        assert!(container_aspect > 0.0, "Container aspect must be positive");
        Self {
            video_aspect,
            container_aspect,
        }
    }

    /// Remap a video-normalized coordinate into container space, clamped
    /// to [0,1]. One axis is cropped depending on which aspect is wider.
    #[must_use]
    pub fn remap(&self, x: f64, y: f64) -> (f64, f64) {
        if (self.video_aspect - self.container_aspect).abs() < GEOMETRY_EPSILON {
            return (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
        }
        if self.video_aspect > self.container_aspect {
            // Video wider than container: horizontal crop
            let visible = self.container_aspect / self.video_aspect;
            let mapped = (x - (1.0 - visible) / 2.0) / visible;
            (mapped.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
        } else {
            // Video taller than container: vertical crop
            let visible = self.video_aspect / self.container_aspect;
            let mapped = (y - (1.0 - visible) / 2.0) / visible;
            (x.clamp(0.0, 1.0), mapped.clamp(0.0, 1.0))
        }
    }
}

/// Mirror a normalized x-coordinate (camera feed is shown mirrored)
#[must_use]
pub fn mirror_x(x: f64) -> f64 {
    1.0 - x
}
