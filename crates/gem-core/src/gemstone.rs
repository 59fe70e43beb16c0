//! Convex gemstone model: an ordered list of facet planes.

use crate::constants::INSIDE_EPSILON;
use glam::Vec3;

/// A planar boundary of the gem: a point on the plane and its outward normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Facet {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Facet {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Signed distance of `p` from the plane, positive on the outside.
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }
}

/// Proportions of a round brilliant-style cut, in object-space units.
///
/// The girdle is a thin band of vertical facets; the crown rises above it up
/// to the table and the pavilion descends below it.
#[derive(Clone, Copy, Debug)]
pub struct Cut {
    pub sides: usize,
    pub girdle_radius: f32,
    pub girdle_half_height: f32,
    pub table_height: f32,
    pub crown_angle: f32,
    pub pavilion_angle: f32,
}

impl Default for Cut {
    fn default() -> Self {
        Self {
            sides: 8,
            girdle_radius: 0.4,
            girdle_half_height: 0.02,
            table_height: 0.2,
            crown_angle: 35f32.to_radians(),
            pavilion_angle: 41f32.to_radians(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Gemstone {
    pub facets: Vec<Facet>,
}

impl Gemstone {
    pub fn new(facets: Vec<Facet>) -> Self {
        let facets = facets
            .into_iter()
            .map(|f| Facet::new(f.point, f.normal))
            .collect();
        Self { facets }
    }

    pub fn brilliant(cut: &Cut) -> Self {
        let n = cut.sides.max(3);
        let r = cut.girdle_radius;
        let step = std::f32::consts::TAU / n as f32;
        let mut facets = Vec::with_capacity(3 * n + 1);

        facets.push(Facet::new(Vec3::new(0.0, cut.table_height, 0.0), Vec3::Y));

        let (sin_c, cos_c) = cut.crown_angle.sin_cos();
        for i in 0..n {
            let (s, c) = (i as f32 * step).sin_cos();
            facets.push(Facet::new(
                Vec3::new(r * c, cut.girdle_half_height, r * s),
                Vec3::new(sin_c * c, cos_c, sin_c * s),
            ));
        }

        // girdle facets sit between crown and pavilion mains
        for i in 0..n {
            let (s, c) = ((i as f32 + 0.5) * step).sin_cos();
            let normal = Vec3::new(c, 0.0, s);
            facets.push(Facet::new(normal * r, normal));
        }

        let (sin_p, cos_p) = cut.pavilion_angle.sin_cos();
        for i in 0..n {
            let (s, c) = (i as f32 * step).sin_cos();
            facets.push(Facet::new(
                Vec3::new(r * c, -cut.girdle_half_height, r * s),
                Vec3::new(sin_p * c, -cos_p, sin_p * s),
            ));
        }

        Self { facets }
    }

    /// CPU mirror of the shader inside-test.
    pub fn contains(&self, p: Vec3) -> bool {
        self.facets
            .iter()
            .all(|f| f.signed_distance(p) <= INSIDE_EPSILON)
    }
}
