mod options;
mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mcc::{
    io::{read_points, write_points_to, PointFormat},
    ExternalClassifier, FilterDirection, PointSet, Resolution, ScratchSpace, Sweep, SweepReport,
};
use options::Cli;
use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::init();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let sweep = {
        let mut builder = Sweep::builder()
            .scale_domains(cli.nl)
            .curvature_tolerance(cli.t)
            .convergence_threshold(cli.j)
            .tension(cli.f)
            .grid_density(cli.s)
            .filter(if cli.n {
                FilterDirection::Negative
            } else {
                FilterDirection::Positive
            });
        if let (Some(x), Some(y)) = (cli.ew_res, cli.ns_res) {
            builder = builder.resolution(Resolution::new(x, y));
        }
        builder.build()?
    };

    let points = read_points(&cli.input)?;
    info!("read {} points from {}", points.len(), cli.input.display());

    let mut classifier = cli.classifier_args.iter().fold(
        ExternalClassifier::new(&cli.classifier, ScratchSpace::new()?),
        |classifier, arg| classifier.arg(arg),
    );

    let pb = progress::bar("Classify".to_string(), points.len() as u64, cli.quiet);
    let nl = sweep.scale_domains();
    let output = sweep.run_with(points, &mut classifier, |stats| {
        pb.set_message(format!(
            "scale domain {}/{nl}, iteration {}",
            stats.domain, stats.iteration
        ));
        pb.inc(stats.non_ground as u64);
    });
    pb.finish_and_clear();
    let output = output?;

    write_outputs(&[
        (&cli.ground, &output.ground),
        (&cli.nonground, &output.non_ground),
    ])?;

    if let Some(report_path) = &cli.report {
        write_report(report_path, &output.report)?;
    }

    info!(
        "ground: {}, non-ground: {}, classifier calls: {}",
        output.report.ground, output.report.non_ground, output.report.classifier_calls
    );

    Ok(())
}

/// Writes every output next to its destination first, and only moves
/// them into place once all of them were written.
fn write_outputs(outputs: &[(&PathBuf, &PointSet)]) -> Result<()> {
    let mut written = Vec::with_capacity(outputs.len());
    for (path, points) in outputs {
        let tmp_path = tmp_path(path);
        let res = write_tmp(&tmp_path, path, points);
        written.push(tmp_path);
        if let Err(e) = res {
            for tmp_path in &written {
                let _ = fs::remove_file(tmp_path);
            }
            return Err(e);
        }
    }
    for ((path, _), tmp_path) in outputs.iter().zip(&written) {
        fs::rename(tmp_path, path).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn write_tmp(tmp_path: &Path, path: &Path, points: &PointSet) -> Result<()> {
    let file = File::create(tmp_path).with_context(|| format!("writing {}", path.display()))?;
    let mut wtr = BufWriter::new(file);
    write_points_to(&mut wtr, PointFormat::from_path(path), points)?;
    wtr.flush()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_report(path: &Path, report: &SweepReport) -> Result<()> {
    let mut wtr = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut wtr, report)?;
    wtr.flush()?;
    Ok(())
}
