//! Criterion benchmarks for the shoot path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csgray_math::{Point3, Vec3};
use csgray_rt::{shoot_many, shoot_ray, Application, BoolTree, Partitions, Region, Resource, RtInstance, Shot, ShotHandler};
use csgray_solids::{Arb, Ell, Ray, Solid, Tor};

struct Depth;

impl ShotHandler for Depth {
    type Output = f64;

    fn hit(&mut self, _: &Shot<'_>, parts: &Partitions<'_>) -> f64 {
        parts.first().map_or(0.0, |p| p.in_dist())
    }

    fn miss(&mut self, _: &Shot<'_>) -> f64 {
        0.0
    }
}

/// A plate with a row of holes, a torus handle and some spheres.
fn make_model() -> RtInstance {
    let mut rt = RtInstance::new();
    let plate = rt
        .add_solid(
            "plate",
            Solid::Arb(Arb::from_rpp(Point3::new(-10.0, -10.0, 0.0), Point3::new(10.0, 10.0, 1.0))),
        )
        .unwrap();
    let mut tree = BoolTree::leaf(plate);
    for i in 0..8 {
        let hole = rt
            .add_solid(
                format!("hole{i}"),
                Solid::Ell(Ell::sphere(Point3::new(-8.0 + 2.0 * i as f64, 0.0, 0.5), 0.8)),
            )
            .unwrap();
        tree = BoolTree::subtract(tree, BoolTree::leaf(hole));
    }
    rt.add_region(Region::new("plate.r", tree)).unwrap();

    let handle = rt
        .add_solid("handle", Solid::Tor(Tor::new(Point3::new(0.0, 0.0, 4.0), Vec3::y(), 3.0, 0.5)))
        .unwrap();
    rt.add_region(Region::new("handle.r", BoolTree::leaf(handle))).unwrap();

    for i in 0..16 {
        let s = rt
            .add_solid(
                format!("ball{i}"),
                Solid::Ell(Ell::sphere(Point3::new(-9.0 + 1.2 * i as f64, 7.0, 2.0), 0.5)),
            )
            .unwrap();
        rt.add_region(Region::new(format!("ball{i}.r"), BoolTree::leaf(s))).unwrap();
    }
    rt.prep().unwrap();
    rt
}

fn grid_rays(n: usize) -> Vec<Ray> {
    (0..n * n)
        .map(|i| {
            let (x, y) = ((i % n) as f64, (i / n) as f64);
            let scale = 22.0 / n as f64;
            Ray::new(
                Point3::new(-11.0 + x * scale, -11.0 + y * scale, 20.0),
                -Vec3::z(),
            )
        })
        .collect()
}

fn bench_single_ray(c: &mut Criterion) {
    let rt = make_model();
    let mut res = Resource::new(0);

    c.bench_function("shoot_ray_plate_hole", |b| {
        b.iter(|| {
            let ray = Ray::new(Point3::new(-8.0, 0.3, 20.0), -Vec3::z());
            let mut ap = Application::new(black_box(ray), Depth, &mut res);
            black_box(shoot_ray(&rt, &mut ap).unwrap())
        })
    });

    c.bench_function("shoot_ray_model_miss", |b| {
        b.iter(|| {
            let ray = Ray::new(Point3::new(50.0, 50.0, 20.0), -Vec3::z());
            let mut ap = Application::new(black_box(ray), Depth, &mut res);
            black_box(shoot_ray(&rt, &mut ap).unwrap())
        })
    });
}

fn bench_grid(c: &mut Criterion) {
    let rt = make_model();
    let mut group = c.benchmark_group("shoot_grid");

    for n in [16, 64, 128] {
        let rays = grid_rays(n);
        group.throughput(Throughput::Elements(rays.len() as u64));
        group.bench_with_input(BenchmarkId::new("serial", n), &rays, |b, rays| {
            let mut res = Resource::new(0);
            b.iter(|| {
                let mut total = 0.0;
                for ray in rays {
                    let mut ap = Application::new(ray.clone(), Depth, &mut res);
                    total += shoot_ray(&rt, &mut ap).unwrap();
                }
                black_box(total)
            })
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &rays, |b, rays| {
            b.iter(|| black_box(shoot_many(&rt, rays, || Depth).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_ray, bench_grid);
criterion_main!(benches);
