//! Web-Mercator viewport
//!
//! Tracks a view center, zoom and container size the way slippy maps do:
//! - world pixels: `TILE_SIZE * 2^zoom` square covering the whole earth
//! - layer pixels: world pixels minus a pixel origin fixed at the last reset
//! - container pixels: layer pixels shifted by the accumulated pan offset

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use super::{BoundingBox, GeoPoint, Projection};
use crate::consts::{MAX_LATITUDE, TILE_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebMercatorViewport {
    center: GeoPoint,
    zoom: f64,
    /// Container size in CSS pixels
    size: DVec2,
    /// World pixel of the layer origin
    pixel_origin: DVec2,
    /// Offset of the layer origin inside the container
    pane_offset: DVec2,
}

impl WebMercatorViewport {
    pub fn new(center: GeoPoint, zoom: f64, width: f64, height: f64) -> Self {
        let mut viewport = Self {
            center,
            zoom,
            size: DVec2::new(width, height),
            pixel_origin: DVec2::ZERO,
            pane_offset: DVec2::ZERO,
        };
        viewport.reset_origin();
        viewport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    /// Jump to a new center and zoom (re-anchors the layer)
    pub fn set_view(&mut self, center: GeoPoint, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
        self.reset_origin();
    }

    /// Pan by a container-pixel offset (layer anchor stays put)
    pub fn pan_by(&mut self, offset: DVec2) {
        let world = self.world_point(self.center) + offset;
        self.center = self.world_to_geo(world);
        self.pane_offset -= offset;
    }

    /// Container resize keeps the center and re-anchors the layer
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = DVec2::new(width, height);
        self.reset_origin();
    }

    /// Layer pixel to container pixel
    pub fn container_point(&self, layer: DVec2) -> DVec2 {
        layer + self.pane_offset
    }

    /// Container pixel to layer pixel
    pub fn layer_point(&self, container: DVec2) -> DVec2 {
        container - self.pane_offset
    }

    fn scale(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    fn reset_origin(&mut self) {
        self.pixel_origin = (self.world_point(self.center) - self.size / 2.0).round();
        self.pane_offset = DVec2::ZERO;
    }

    fn world_point(&self, point: GeoPoint) -> DVec2 {
        let scale = self.scale();
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = point.lng / 360.0 + 0.5;
        let y = 0.5 - (FRAC_PI_4 + lat / 2.0).tan().ln() / TAU;
        DVec2::new(x * scale, y * scale)
    }

    fn world_to_geo(&self, world: DVec2) -> GeoPoint {
        let scale = self.scale();
        let lng = world.x / scale * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * world.y / scale);
        let lat = (2.0 * n.exp().atan() - FRAC_PI_2).to_degrees();
        GeoPoint::new(lat, lng)
    }
}

impl Projection for WebMercatorViewport {
    fn project(&self, point: GeoPoint) -> DVec2 {
        self.world_point(point) - self.pixel_origin
    }

    fn unproject(&self, pixel: DVec2) -> GeoPoint {
        self.world_to_geo(pixel + self.pixel_origin)
    }

    fn center(&self) -> GeoPoint {
        self.center
    }

    fn to_container(&self, layer: DVec2) -> DVec2 {
        self.container_point(layer)
    }

    fn bounds(&self) -> BoundingBox {
        let sw = self.unproject(self.layer_point(DVec2::new(0.0, self.size.y)));
        let ne = self.unproject(self.layer_point(DVec2::new(self.size.x, 0.0)));
        BoundingBox::from_corners(sw, ne)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nyc() -> WebMercatorViewport {
        WebMercatorViewport::new(GeoPoint::new(40.7128, -74.006), 12.0, 800.0, 600.0)
    }

    #[test]
    fn test_project_unproject_inverse() {
        let vp = nyc();
        let p = GeoPoint::new(40.75, -73.98);
        let back = vp.unproject(vp.project(p));
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn test_center_lands_mid_container() {
        let vp = nyc();
        let c = vp.container_point(vp.project(vp.center()));
        assert!((c.x - 400.0).abs() <= 0.5);
        assert!((c.y - 300.0).abs() <= 0.5);
    }

    #[test]
    fn test_pan_moves_center_not_layer() {
        let mut vp = nyc();
        let anchor = GeoPoint::new(40.72, -74.0);
        let layer_before = vp.project(anchor);
        let container_before = vp.container_point(layer_before);

        vp.pan_by(DVec2::new(100.0, 0.0));

        assert_eq!(vp.project(anchor), layer_before);
        let container_after = vp.container_point(vp.project(anchor));
        assert!((container_before.x - container_after.x - 100.0).abs() < 1e-9);
        assert!(vp.center().lng > -74.006);
    }

    #[test]
    fn test_set_view_zoom_doubles_distances() {
        let mut vp = nyc();
        vp.pan_by(DVec2::new(40.0, -25.0));
        let anchor = GeoPoint::new(40.72, -74.0);
        let before = vp.project(anchor) - vp.project(vp.center());

        vp.set_view(vp.center(), vp.zoom() + 1.0);
        assert_eq!(vp.zoom(), 13.0);
        let after = vp.project(anchor) - vp.project(vp.center());
        assert!((after - before * 2.0).length() < 1e-6);

        // Re-anchored: the pan offset is gone and the center is mid container
        let c = vp.container_point(vp.project(vp.center()));
        assert!((c.x - 400.0).abs() <= 0.5);
        assert!((c.y - 300.0).abs() <= 0.5);
    }

    #[test]
    fn test_bounds_contain_center() {
        let vp = nyc();
        let bounds = vp.bounds();
        let center = vp.center();
        assert!(bounds.south < center.lat && center.lat < bounds.north);
        assert!(bounds.west < center.lng && center.lng < bounds.east);
        assert!(bounds.north > bounds.south);
        assert!(bounds.east > bounds.west);
    }

    #[test]
    fn test_latitude_clamped() {
        let vp = nyc();
        let pole = vp.project(GeoPoint::new(90.0, 0.0));
        assert!(pole.y.is_finite());
    }
}
