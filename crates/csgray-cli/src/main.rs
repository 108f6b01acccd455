//! csgray CLI - fire rays at a CSG model database
//!
//! `info` summarizes a model, `shot` traces a single shotline and prints
//! its partitions, `grid` traces a parallel view and prints a character map.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use csgray_db::Database;
use csgray_math::{Point3, Vec3};
use csgray_rt::{shoot_many, shoot_ray, Application, Resource, RtInstance};
use csgray_solids::{Ray, SolidKind};
use std::path::{Path, PathBuf};

mod report;

use report::{FirstRegion, Shotline};

#[derive(Parser)]
#[command(name = "csgray")]
#[command(about = "Shoot rays at a CSG model database", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Keep air regions instead of discarding them
    #[arg(long, global = true)]
    use_air: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display solids, regions and bounds of a model
    Info {
        /// Model database (.toml or .json)
        db: PathBuf,
    },
    /// Trace one ray and print its partitions
    Shot {
        /// Model database (.toml or .json)
        db: PathBuf,
        /// Ray origin as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Option<Vec3>,
        /// Ray direction as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        dir: Option<Vec3>,
        /// View azimuth in degrees, when no origin is given
        #[arg(long, default_value_t = 35.0, allow_hyphen_values = true)]
        az: f64,
        /// View elevation in degrees, when no origin is given
        #[arg(long, default_value_t = 25.0, allow_hyphen_values = true)]
        el: f64,
        /// Stop after this many partitions (0 = all)
        #[arg(long)]
        onehit: Option<usize>,
    },
    /// Trace a square grid of parallel rays and print a region map
    Grid {
        /// Model database (.toml or .json)
        db: PathBuf,
        /// View azimuth in degrees
        #[arg(long, default_value_t = 35.0, allow_hyphen_values = true)]
        az: f64,
        /// View elevation in degrees
        #[arg(long, default_value_t = 25.0, allow_hyphen_values = true)]
        el: f64,
        /// Cells per side
        #[arg(short, long, default_value_t = 48)]
        size: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { db } => {
            let rt = load(&db, cli.use_air, None)?;
            show_info(&rt);
        }
        Commands::Shot {
            db,
            origin,
            dir,
            az,
            el,
            onehit,
        } => {
            let rt = load(&db, cli.use_air, onehit)?;
            let ray = match (origin, dir) {
                (Some(o), Some(d)) => Ray::new(Point3::from(o), d),
                (None, None) => report::view_ray(&rt, az, el),
                _ => bail!("--origin and --dir must be given together"),
            };
            shotline(&rt, ray)?;
        }
        Commands::Grid { db, az, el, size } => {
            if size == 0 {
                bail!("grid size must be positive");
            }
            let rt = load(&db, cli.use_air, None)?;
            grid(&rt, az, el, size)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let level = match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("{c:?}: {e}")))
        .collect::<std::result::Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {} values", parts.len())),
    }
}

fn load(path: &Path, use_air: bool, onehit: Option<usize>) -> Result<RtInstance> {
    let mut db = Database::load(path).with_context(|| format!("loading {}", path.display()))?;
    if use_air {
        db.options.use_air = true;
    }
    if let Some(n) = onehit {
        db.options.onehit = n;
    }
    db.build().with_context(|| format!("building {}", path.display()))
}

fn show_info(rt: &RtInstance) {
    let b = rt.model_box();
    println!(
        "Model box: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
        b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
    );

    println!("Solids:");
    for kind in SolidKind::ALL {
        let n = rt.nsol_by_type(kind);
        if n > 0 {
            println!("  {n:>6} {kind}");
        }
    }
    for &bit in rt.infinite_solids() {
        println!("  infinite: {}", rt.solid(bit).name());
    }
    let idle = rt.solids().iter().filter(|s| !s.is_active()).count();
    if idle > 0 {
        println!("  {idle} unreferenced");
    }

    println!("Regions:");
    for region in rt.regions() {
        println!("  {}", rt.describe_region(region.bit()));
    }
    if rt.air_discards() > 0 {
        println!("  {} air regions discarded", rt.air_discards());
    }
}

fn shotline(rt: &RtInstance, ray: Ray) -> Result<()> {
    println!(
        "Ray from ({:.4}, {:.4}, {:.4}) dir ({:.4}, {:.4}, {:.4})",
        ray.origin.x, ray.origin.y, ray.origin.z, ray.direction.x, ray.direction.y, ray.direction.z
    );
    let mut res = Resource::new(0);
    let mut ap = Application::new(ray, Shotline, &mut res)
        .with_onehit(rt.options().onehit)
        .with_purpose("shotline");
    let out = shoot_ray(rt, &mut ap)?;
    print!("{out}");
    rt.add_res_stats(&mut res);
    log::info!("{}", rt.stats());
    Ok(())
}

fn grid(rt: &RtInstance, az: f64, el: f64, size: usize) -> Result<()> {
    let rays = report::grid_rays(rt, az, el, size);
    let cells = shoot_many(rt, &rays, || FirstRegion)?;
    print!("{}", report::render(&cells, size));
    for region in rt.regions() {
        println!("  {} {}", report::glyph(Some(region.bit())), region.name);
    }
    print!("{}", rt.stats());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1, -2,3.5").unwrap(), Vec3::new(1.0, -2.0, 3.5));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn test_cli_parses_negative_direction() {
        let cli = Cli::try_parse_from([
            "csgray", "shot", "m.toml", "--origin", "-5,0,0", "--dir", "1,0,0", "--onehit", "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Shot { origin, onehit, .. } => {
                assert_eq!(origin, Some(Vec3::new(-5.0, 0.0, 0.0)));
                assert_eq!(onehit, Some(1));
            }
            _ => panic!("expected shot"),
        }
    }
}
