//! Energy Prep - command line front end
//!
//! Loads hourly energy CSVs, cleans the requested target columns and prints
//! (or writes) the result.

use anyhow::{bail, Context, Result};
use energy_prep::{prepare_all, save_csv, CleanOptions, PrepConfig, PreparedSeries};
use log::info;
use std::path::PathBuf;

const USAGE: &str = "\
Usage:
  energy-prep <input.csv> [--target COL]... [--fill interpolate|ffill]
              [--no-clip] [--lower Q] [--upper Q] [--out DIR] [--json]
  energy-prep --config run.json [--json]";

struct CliArgs {
    config: PrepConfig,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut input: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut targets: Vec<String> = Vec::new();
    let mut output_dir: Option<PathBuf> = None;
    let mut clean = CleanOptions::default();
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{flag} expects a value"))
        };

        match arg.as_str() {
            "--config" => config_path = Some(PathBuf::from(value("--config")?)),
            "--target" => targets.push(value("--target")?),
            "--fill" => clean.fill_method = value("--fill")?.parse()?,
            "--no-clip" => clean.clip_outliers = false,
            "--lower" => {
                clean.lower_quantile = value("--lower")?
                    .parse()
                    .context("--lower expects a number")?
            }
            "--upper" => {
                clean.upper_quantile = value("--upper")?
                    .parse()
                    .context("--upper expects a number")?
            }
            "--out" => output_dir = Some(PathBuf::from(value("--out")?)),
            "--json" => json = true,
            "-h" | "--help" => bail!("{USAGE}"),
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
            path => {
                if input.replace(PathBuf::from(path)).is_some() {
                    bail!("Only one input file is accepted\n{USAGE}");
                }
            }
        }
    }

    if let Some(path) = config_path {
        let config = PrepConfig::from_json_file(&path)
            .with_context(|| format!("loading {}", path.display()))?;
        return Ok(CliArgs { config, json });
    }

    let Some(input) = input else {
        bail!("Missing input file\n{USAGE}");
    };
    let mut config = PrepConfig::new(input);
    if !targets.is_empty() {
        config.targets = targets;
    }
    config.output_dir = output_dir;
    config.clean = clean;

    Ok(CliArgs { config, json })
}

fn print_table(prepared: &[PreparedSeries]) {
    println!(
        "{:<10} {:>8} {:>6} {:>6} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "target", "rows", "dups", "gaps", "clipped", "mean", "std", "min", "max"
    );
    for p in prepared {
        println!(
            "{:<10} {:>8} {:>6} {:>6} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            p.series.name(),
            p.report.output_rows,
            p.report.duplicates_merged,
            p.report.gaps_filled,
            p.report.clipped_low + p.report.clipped_high,
            p.summary.mean,
            p.summary.std,
            p.summary.min,
            p.summary.max,
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let CliArgs { config, json } = parse_args(&args)?;

    info!(
        "Preparing {:?} from {} ({} fill, clip: {})",
        config.targets,
        config.input.display(),
        config.clean.fill_method,
        config.clean.clip_outliers
    );

    let prepared = prepare_all(&config.input, config.targets.as_slice(), &config.clean)
        .with_context(|| format!("preparing {}", config.input.display()))?;

    for p in &prepared {
        if let Some(path) = config.output_path(p.series.name()) {
            save_csv(&p.series, &path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&prepared)?);
    } else {
        print_table(&prepared);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_prep::FillMethod;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_into_config() {
        let cli = parse_args(&args(&[
            "pjm.csv", "--target", "PJME", "--target", "PJMW", "--fill", "ffill", "--no-clip",
            "--lower", "0.05", "--out", "clean", "--json",
        ]))
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.config.input, PathBuf::from("pjm.csv"));
        assert_eq!(cli.config.targets, vec!["PJME", "PJMW"]);
        assert_eq!(cli.config.clean.fill_method, FillMethod::ForwardFill);
        assert!(!cli.config.clean.clip_outliers);
        assert_eq!(cli.config.clean.lower_quantile, 0.05);
        assert_eq!(cli.config.output_dir, Some(PathBuf::from("clean")));
    }

    #[test]
    fn defaults_to_pjme_interpolate() {
        let cli = parse_args(&args(&["pjm.csv"])).unwrap();
        assert!(!cli.json);
        assert_eq!(cli.config.targets, vec!["PJME"]);
        assert_eq!(cli.config.clean, CleanOptions::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["pjm.csv", "--fill", "median"])).is_err());
        assert!(parse_args(&args(&["pjm.csv", "--upper"])).is_err());
        assert!(parse_args(&args(&["pjm.csv", "--verbose"])).is_err());
        assert!(parse_args(&args(&["a.csv", "b.csv"])).is_err());
    }
}
