//! Shot handlers and view geometry used by the subcommands.

use std::fmt::Write as _;

use csgray_math::{Point3, Vec3};
use csgray_rt::{Partitions, RegionBit, RtInstance, Shot, ShotHandler};
use csgray_solids::Ray;

/// Formats every partition of a shotline with its points and entry normal.
pub struct Shotline;

impl ShotHandler for Shotline {
    type Output = String;

    fn hit(&mut self, shot: &Shot<'_>, parts: &Partitions<'_>) -> String {
        let mut out = parts.describe(shot.rtip).to_string();
        for p in parts.iter() {
            let (a, b) = (p.in_point(shot.ray), p.out_point(shot.ray));
            let n = p.in_normal(shot.rtip, shot.ray);
            let _ = writeln!(
                out,
                "  {}: in ({:.4}, {:.4}, {:.4}) normal ({:.3}, {:.3}, {:.3}) out ({:.4}, {:.4}, {:.4}) los {:.4}",
                shot.rtip.region(p.region()).name,
                a.x,
                a.y,
                a.z,
                n.x,
                n.y,
                n.z,
                b.x,
                b.y,
                b.z,
                p.length()
            );
        }
        out
    }

    fn miss(&mut self, _: &Shot<'_>) -> String {
        "miss\n".to_string()
    }
}

/// First region along each ray of a grid.
pub struct FirstRegion;

impl ShotHandler for FirstRegion {
    type Output = Option<RegionBit>;

    fn hit(&mut self, _: &Shot<'_>, parts: &Partitions<'_>) -> Option<RegionBit> {
        parts.first().map(|p| p.region())
    }

    fn miss(&mut self, _: &Shot<'_>) -> Option<RegionBit> {
        None
    }
}

const GLYPHS: &[u8] = b"#@%&*+=o0x";

/// Map character for a grid cell.
pub fn glyph(region: Option<RegionBit>) -> char {
    region.map_or('.', |r| char::from(GLYPHS[r.index() % GLYPHS.len()]))
}

/// Ray aimed at the model center from azimuth/elevation, starting outside
/// the model box.
pub fn view_ray(rt: &RtInstance, az: f64, el: f64) -> Ray {
    let bounds = rt.model_box();
    Ray::from_az_el(bounds.center(), az, el, 2.0 * bounds.half_diagonal() + 1.0)
}

/// Parallel rays on an `n` by `n` grid covering the model, row-major from
/// the top left of the view.
pub fn grid_rays(rt: &RtInstance, az: f64, el: f64, n: usize) -> Vec<Ray> {
    let eye = view_ray(rt, az, el);
    let dir = eye.direction.into_inner();
    let mut right = dir.cross(&Vec3::z());
    if right.norm() < 1.0e-9 {
        // looking straight up or down
        right = Vec3::y();
    }
    let right = right.normalize();
    let up = right.cross(&dir);

    let cell = 2.0 * rt.model_box().half_diagonal() / n as f64;
    let half = n as f64 / 2.0;
    (0..n * n)
        .map(|k| {
            let (i, j) = ((k % n) as f64, (k / n) as f64);
            let origin: Point3 =
                eye.origin + right * ((i + 0.5 - half) * cell) + up * ((half - j - 0.5) * cell);
            Ray::new(origin, dir)
        })
        .collect()
}

/// Render grid results as rows of glyphs.
pub fn render(cells: &[Option<RegionBit>], n: usize) -> String {
    cells
        .chunks(n.max(1))
        .map(|row| {
            let mut line: String = row.iter().map(|&c| glyph(c)).collect();
            line.push('\n');
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use csgray_rt::{shoot_many, shoot_ray, Application, BoolTree, Region, Resource};
    use csgray_solids::{Ell, Solid};

    fn ball() -> RtInstance {
        let mut rt = RtInstance::new();
        let s = rt
            .add_solid("ball", Solid::Ell(Ell::sphere(Point3::origin(), 1.0)))
            .unwrap();
        rt.add_region(Region::new("ball.r", BoolTree::leaf(s))).unwrap();
        rt.prep().unwrap();
        rt
    }

    #[test]
    fn test_shotline_lists_partitions() {
        let rt = ball();
        let mut res = Resource::new(0);
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vec3::x());
        let mut ap = Application::new(ray, Shotline, &mut res);
        let out = shoot_ray(&rt, &mut ap).unwrap();
        assert!(out.contains("ball.r"));
        assert!(out.contains("in (-1.0000"));

        let ray = Ray::new(Point3::new(-5.0, 3.0, 0.0), Vec3::x());
        let mut ap = Application::new(ray, Shotline, &mut res);
        assert_eq!(shoot_ray(&rt, &mut ap).unwrap(), "miss\n");
    }

    #[test]
    fn test_grid_rays_share_direction() {
        let rt = ball();
        let rays = grid_rays(&rt, 0.0, 0.0, 4);
        assert_eq!(rays.len(), 16);
        for r in &rays {
            assert!((r.direction.x + 1.0).abs() < 1e-12);
        }
        // top row is above bottom row
        assert!(rays[0].origin.z > rays[12].origin.z);
        // columns run toward +y when looking down -x
        assert!(rays[3].origin.y > rays[0].origin.y);
    }

    #[test]
    fn test_grid_map_of_sphere() {
        let rt = ball();
        let n = 8;
        let rays = grid_rays(&rt, 0.0, 0.0, n);
        let cells = shoot_many(&rt, &rays, || FirstRegion).unwrap();
        let map = render(&cells, n);
        let rows: Vec<&str> = map.lines().collect();
        assert_eq!(rows.len(), n);
        assert_eq!(rows[0].chars().next(), Some('.'));
        assert_eq!(rows[3].chars().nth(3), Some('#'));
        assert_eq!(rows[4].chars().nth(4), Some('#'));
        assert_eq!(rt.stats().nrays, (n * n) as u64);
    }

    #[test]
    fn test_looking_straight_down() {
        let rt = ball();
        let rays = grid_rays(&rt, 0.0, 90.0, 2);
        assert!(rays.iter().all(|r| r.is_valid() && r.direction.z < -0.99));
    }
}
