use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use geobits::bitmap;
use geobits::cli::{Args, ScaleOutput, ScaleTask, Task};
use geobits::geojson::{ranking_to_feature_collection, write_feature_collection, PlacesReader};
use geobits::logger::{self, Logger};
use geobits::math;
use geobits::places::{self, City, NamedPlace};

fn main() {
    let args = Args::parse();
    let config = match args.validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    Logger::init(config.verbosity, config.no_color);
    logger::debug(&format!("Task: {:?}", config.task));

    if let Err(e) = run(config.task) {
        logger::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(task: Task) -> anyhow::Result<()> {
    match task {
        Task::Scale(task) => run_scale(task),
        Task::Bearing { from, to } => {
            let bearing = math::bearing_between(&from, &to);
            let direction = math::cardinal_direction_for(bearing);
            logger::info(&format!(
                "{:.1} km apart",
                math::geodesic_distance(&from, &to) / 1000.0
            ));
            println!("{:.2} {}", bearing, direction);
            Ok(())
        }
        Task::Cardinal { bearing } => {
            let normalized = math::normalize_bearing(bearing);
            println!("{:.2} {}", normalized, math::cardinal_direction_for(normalized));
            Ok(())
        }
        Task::Project {
            from,
            bearing,
            distance,
            exact,
        } => {
            let point = if exact {
                math::project_point_exact(&from, bearing, distance)
            } else {
                math::project_point(&from, bearing, distance)
            };
            if !point.is_set() {
                bail!("Could not project from {}", from);
            }
            println!("{}", point);
            Ok(())
        }
        Task::Nearest { point, places } => {
            let candidates = load_places(places.as_deref())?;
            let Some(place) = places::nearest_place(&point, &candidates) else {
                bail!("No place found near {}", point);
            };
            println!(
                "{}\t{}\t{:.0} m",
                place.name,
                place.region.as_deref().unwrap_or("-"),
                math::geodesic_distance(&point, &place.location)
            );
            Ok(())
        }
        Task::Rank {
            point,
            places,
            limit,
            geojson,
        } => {
            let candidates = load_places(places.as_deref())?;
            let mut ranked = places::rank_with_distances(&point, &candidates);
            if let Some(limit) = limit {
                ranked.truncate(limit);
            }

            for (index, (place, distance)) in ranked.iter().enumerate() {
                println!("{}\t{}\t{:.0} m", index + 1, place.name, distance);
            }

            if let Some(path) = geojson {
                let collection = ranking_to_feature_collection(&point, &ranked);
                write_feature_collection(&collection, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                logger::output(&path.display().to_string());
            }
            Ok(())
        }
    }
}

fn load_places(path: Option<&Path>) -> anyhow::Result<Vec<NamedPlace>> {
    match path {
        Some(path) => {
            logger::info(&format!("Reading places from {}", path.display()));
            let reader = PlacesReader::open(path)
                .with_context(|| format!("Failed to load places from {}", path.display()))?;
            Ok(reader.into_places())
        }
        None => Ok(City::all_places()),
    }
}

fn run_scale(task: ScaleTask) -> anyhow::Result<()> {
    let total = task.inputs.len();
    logger::info(&format!("Probing {} image(s)", total));

    let progress = if logger::is_quiet() || total < 2 {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(ProgressStyle::with_template(
            "{spinner} [{bar:40}] {pos}/{len} {wide_msg}",
        )?);
        bar
    };

    let results = bitmap::probe_all(&task.inputs, |path| {
        progress.set_message(path.display().to_string());
        progress.inc(1);
    });
    progress.finish_and_clear();

    let mut names = OutputNames::default();
    let mut failures = 0;
    for (path, metadata) in results {
        let metadata = match metadata {
            Ok(metadata) => metadata,
            Err(e) => {
                logger::error(&format!("{}: {}", path.display(), e));
                failures += 1;
                continue;
            }
        };

        let factor = metadata.reduction_factor(task.target, task.fit);
        println!(
            "{}\t{}x{}\t{}",
            path.display(),
            metadata.width,
            metadata.height,
            factor
        );

        let Some(output) = &task.output else {
            continue;
        };
        let out_path = names.claim(&output.dir, &path, output.format.extension());
        match write_scaled(&path, factor, &out_path, output) {
            Ok(()) => logger::output(&out_path.display().to_string()),
            Err(e) => {
                logger::error(&format!("{:#}", e));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} image(s) could not be processed", failures, total);
    }
    Ok(())
}

fn write_scaled(
    path: &Path,
    factor: u32,
    out_path: &Path,
    output: &ScaleOutput,
) -> anyhow::Result<()> {
    let image = bitmap::load_scaled(path, factor)
        .with_context(|| format!("Failed to scale {}", path.display()))?;
    bitmap::write_image(&image, out_path, output.format, output.quality)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(())
}

/// Output file names handed out during one batch.
///
/// Inputs sharing a file stem get `-1`, `-2`, ... suffixes in input order.
/// Names are compared case-insensitively.
#[derive(Default)]
struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    fn claim(&mut self, dir: &Path, input: &Path, extension: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let mut name = format!("{}.{}", stem, extension);
        let mut suffix = 1;
        while !self.taken.insert(name.to_lowercase()) {
            name = format!("{}-{}.{}", stem, suffix, extension);
            suffix += 1;
        }
        dir.join(name)
    }
}
