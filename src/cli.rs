//! CLI argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::bitmap::{FitPolicy, OutputFormat};
use crate::error::{GeobitsError, Result};
use crate::logger::VerbosityLevel;
use crate::math::GeoPoint;

/// Command line arguments for geobits.
#[derive(Parser, Debug)]
#[command(name = "geobits")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Timestamped logs with debug detail.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print results.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored log output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute power-of-two reduction factors, optionally writing scaled copies.
    Scale {
        /// Image files to probe.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target square side in pixels.
        #[arg(short, long)]
        target: u32,

        /// Keep the longest side under the target, or the shortest side over it.
        #[arg(long, value_enum, default_value = "under")]
        fit: FitPolicy,

        /// Write scaled copies into this directory.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Encoding for scaled copies.
        #[arg(long, value_enum, default_value = "jpeg")]
        format: OutputFormat,

        /// JPEG quality (1-100).
        #[arg(long, default_value = "90")]
        quality: u8,
    },

    /// Initial bearing and compass point from one position to another.
    Bearing {
        /// Start position: "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        /// End position: "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        to: String,
    },

    /// Normalize a bearing and name its compass point.
    Cardinal {
        /// Bearing in degrees (any value, negative allowed).
        #[arg(allow_hyphen_values = true)]
        bearing: f64,
    },

    /// Point reached from a start position along a bearing.
    Project {
        /// Start position: "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        /// Bearing in degrees clockwise from north.
        #[arg(short, long, allow_hyphen_values = true)]
        bearing: f64,

        /// Distance in metres.
        #[arg(short, long, allow_hyphen_values = true)]
        distance: f64,

        /// Keep results with a zero coordinate instead of collapsing them to 0,0.
        #[arg(long)]
        exact: bool,
    },

    /// Closest place to a position.
    Nearest {
        /// Position: "lat,lon".
        #[arg(allow_hyphen_values = true)]
        point: String,

        /// GeoJSON file of named points (default: built-in Canadian cities).
        #[arg(long)]
        places: Option<PathBuf>,
    },

    /// Places sorted by distance from a position.
    Rank {
        /// Position: "lat,lon".
        #[arg(allow_hyphen_values = true)]
        point: String,

        /// GeoJSON file of named points (default: built-in Canadian cities).
        #[arg(long)]
        places: Option<PathBuf>,

        /// Only list the closest N places.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Also write the ranking as a GeoJSON FeatureCollection.
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
}

/// Where and how `scale` writes its output images.
#[derive(Debug, Clone)]
pub struct ScaleOutput {
    pub dir: PathBuf,
    pub format: OutputFormat,
    pub quality: u8,
}

/// Validated `scale` request.
#[derive(Debug, Clone)]
pub struct ScaleTask {
    pub inputs: Vec<PathBuf>,
    pub target: u32,
    pub fit: FitPolicy,
    /// None when only reporting factors.
    pub output: Option<ScaleOutput>,
}

/// A validated command with parsed coordinates.
#[derive(Debug, Clone)]
pub enum Task {
    Scale(ScaleTask),
    Bearing {
        from: GeoPoint,
        to: GeoPoint,
    },
    Cardinal {
        bearing: f64,
    },
    Project {
        from: GeoPoint,
        bearing: f64,
        distance: f64,
        exact: bool,
    },
    Nearest {
        point: GeoPoint,
        places: Option<PathBuf>,
    },
    Rank {
        point: GeoPoint,
        places: Option<PathBuf>,
        limit: Option<usize>,
        geojson: Option<PathBuf>,
    },
}

/// Fully validated configuration object.
#[derive(Debug)]
pub struct Config {
    pub verbosity: VerbosityLevel,
    pub no_color: bool,
    pub task: Task,
}

impl Args {
    /// Validates arguments and converts them to a structured `Config`.
    pub fn validate(self) -> Result<Config> {
        if self.verbose && self.quiet {
            return Err(GeobitsError::MutuallyExclusiveOptions(
                "verbose".to_string(),
                "quiet".to_string(),
            ));
        }

        let verbosity = if self.verbose {
            VerbosityLevel::Verbose
        } else if self.quiet {
            VerbosityLevel::Quiet
        } else {
            VerbosityLevel::Normal
        };

        let task = match self.command {
            Command::Scale {
                inputs,
                target,
                fit,
                output_dir,
                format,
                quality,
            } => {
                if target < 1 {
                    return Err(GeobitsError::InvalidTargetSize(target));
                }
                if !(1..=100).contains(&quality) {
                    return Err(GeobitsError::InvalidQuality(quality));
                }
                Task::Scale(ScaleTask {
                    inputs,
                    target,
                    fit,
                    output: output_dir.map(|dir| ScaleOutput {
                        dir,
                        format,
                        quality,
                    }),
                })
            }
            Command::Bearing { from, to } => Task::Bearing {
                from: parse_point(&from)?,
                to: parse_point(&to)?,
            },
            Command::Cardinal { bearing } => Task::Cardinal { bearing },
            Command::Project {
                from,
                bearing,
                distance,
                exact,
            } => {
                if !bearing.is_finite() {
                    return Err(GeobitsError::InvalidBearing(bearing));
                }
                if !distance.is_finite() {
                    return Err(GeobitsError::InvalidDistance(distance));
                }
                Task::Project {
                    from: parse_point(&from)?,
                    bearing,
                    distance,
                    exact,
                }
            }
            Command::Nearest { point, places } => Task::Nearest {
                point: parse_point(&point)?,
                places,
            },
            Command::Rank {
                point,
                places,
                limit,
                geojson,
            } => Task::Rank {
                point: parse_point(&point)?,
                places,
                limit,
                geojson,
            },
        };

        Ok(Config {
            verbosity,
            no_color: self.no_color,
            task,
        })
    }
}

/// Parse "lat,lon" in degrees and range-check both values.
fn parse_point(s: &str) -> Result<GeoPoint> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(GeobitsError::InvalidCoordinate(format!(
            "expected \"lat,lon\", got {} comma-separated values",
            parts.len()
        )));
    }

    let values: std::result::Result<Vec<f64>, _> = parts.iter().map(|p| p.trim().parse()).collect();
    let values =
        values.map_err(|_| GeobitsError::InvalidCoordinate("invalid number format".to_string()))?;

    let point = GeoPoint::new(values[0], values[1]);
    if !point.is_valid() {
        return Err(GeobitsError::InvalidCoordinate(format!(
            "{} is outside latitude [-90, 90] / longitude [-180, 180]",
            s.trim()
        )));
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("geobits").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_point_valid() {
        let point = parse_point("45.5,-73.5").unwrap();
        assert!((point.latitude - 45.5).abs() < 1e-10);
        assert!((point.longitude - (-73.5)).abs() < 1e-10);
    }

    #[test]
    fn test_parse_point_with_spaces() {
        let point = parse_point(" -33.9 , 151.2 ").unwrap();
        assert!((point.latitude - (-33.9)).abs() < 1e-10);
    }

    #[test]
    fn test_parse_point_invalid_count() {
        let err = parse_point("45.5").unwrap_err();
        assert!(err.to_string().contains("expected \"lat,lon\""));
        let err = parse_point("1,2,3").unwrap_err();
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn test_parse_point_invalid_number() {
        let err = parse_point("north,73").unwrap_err();
        assert!(err.to_string().contains("invalid number"));
    }

    #[test]
    fn test_parse_point_out_of_range() {
        let err = parse_point("91,0").unwrap_err();
        assert!(err.to_string().contains("outside latitude"));
        assert!(parse_point("0,-181").is_err());
        assert!(parse_point("NaN,0").is_err());
    }

    #[test]
    fn test_validate_verbose_and_quiet() {
        let err = parse(&["-v", "-q", "cardinal", "90"]).validate().unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_validate_verbosity_levels() {
        let config = parse(&["cardinal", "90"]).validate().unwrap();
        assert_eq!(config.verbosity, VerbosityLevel::Normal);
        let config = parse(&["cardinal", "90", "--quiet"]).validate().unwrap();
        assert_eq!(config.verbosity, VerbosityLevel::Quiet);
        let config = parse(&["-v", "cardinal", "90"]).validate().unwrap();
        assert_eq!(config.verbosity, VerbosityLevel::Verbose);
    }

    #[test]
    fn test_validate_negative_cardinal() {
        let config = parse(&["cardinal", "-10"]).validate().unwrap();
        assert!(matches!(config.task, Task::Cardinal { bearing } if bearing == -10.0));
    }

    #[test]
    fn test_validate_scale_defaults() {
        let config = parse(&["scale", "a.jpg", "b.png", "--target", "256"])
            .validate()
            .unwrap();
        match config.task {
            Task::Scale(task) => {
                assert_eq!(task.inputs.len(), 2);
                assert_eq!(task.target, 256);
                assert_eq!(task.fit, FitPolicy::Under);
                assert!(task.output.is_none());
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_validate_scale_with_output() {
        let config = parse(&[
            "scale", "a.jpg", "-t", "64", "--fit", "over", "-o", "out", "--format", "png",
        ])
        .validate()
        .unwrap();
        match config.task {
            Task::Scale(task) => {
                assert_eq!(task.fit, FitPolicy::Over);
                let output = task.output.unwrap();
                assert_eq!(output.dir, PathBuf::from("out"));
                assert_eq!(output.format, OutputFormat::Png);
                assert_eq!(output.quality, 90);
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_validate_scale_zero_target() {
        let err = parse(&["scale", "a.jpg", "--target", "0"]).validate().unwrap_err();
        assert!(err.to_string().contains("Target size must be at least 1"));
    }

    #[test]
    fn test_validate_scale_bad_quality() {
        let err = parse(&["scale", "a.jpg", "-t", "10", "--quality", "101"])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Quality"));
    }

    #[test]
    fn test_validate_project() {
        let config = parse(&[
            "project", "--from", "-45,10", "--bearing", "-90", "--distance", "1000", "--exact",
        ])
        .validate()
        .unwrap();
        match config.task {
            Task::Project {
                from,
                bearing,
                distance,
                exact,
            } => {
                assert_eq!(from, GeoPoint::new(-45.0, 10.0));
                assert_eq!(bearing, -90.0);
                assert_eq!(distance, 1000.0);
                assert!(exact);
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_validate_project_infinite_distance() {
        let err = parse(&["project", "--from", "0,0", "-b", "0", "-d", "inf"])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Distance"));
    }

    #[test]
    fn test_validate_rank_options() {
        let config = parse(&["rank", "45,-75", "--limit", "3", "--geojson", "out.geojson"])
            .validate()
            .unwrap();
        match config.task {
            Task::Rank {
                point,
                places,
                limit,
                geojson,
            } => {
                assert_eq!(point, GeoPoint::new(45.0, -75.0));
                assert!(places.is_none());
                assert_eq!(limit, Some(3));
                assert_eq!(geojson, Some(PathBuf::from("out.geojson")));
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_validate_bearing_bad_point() {
        let err = parse(&["bearing", "--from", "1,2", "--to", "oops"])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Invalid coordinate"));
    }
}
