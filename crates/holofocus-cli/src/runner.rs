//! Job runner: loads the hologram, selects a backend and runs the propagator.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use num_complex::Complex;

use holofocus_compute::{Backend, ComputeBackend};
use holofocus_core::{
    AxialInputs, AxialPlan, AxialProfile, AxialPropagator, OpticalParams, RayleighSommerfeld,
};

use crate::config::{JobConfig, Precision};

/// Results from a job run.
#[derive(Debug)]
pub struct RunOutput {
    pub profile: AxialProfile<f64>,
    pub device: String,
    pub method: String,
}

/// Run a job, reading the hologram relative to `base_dir`.
pub fn run_job(job: &JobConfig, base_dir: &Path) -> Result<RunOutput> {
    let hologram = load_hologram(&job.hologram_path(base_dir))?;
    run_with_hologram(job, &hologram)
}

/// Run a job on an already loaded hologram.
pub fn run_with_hologram(job: &JobConfig, hologram: &Array2<f64>) -> Result<RunOutput> {
    let backend = create_backend(job)?;
    let device = backend.device_info().name;
    let solver = RayleighSommerfeld::new(backend).with_options(job.optics);
    let depths = job.profile.depths.expand();

    println!(
        "  Hologram: {}x{}, {} depth(s), center ({}, {})",
        hologram.nrows(),
        hologram.ncols(),
        depths.len(),
        job.profile.center.first().copied().unwrap_or(f64::NAN),
        job.profile.center.get(1).copied().unwrap_or(f64::NAN),
    );

    let profile = match job.compute.precision {
        Precision::F64 => solver
            .propagate(
                AxialInputs::new()
                    .hologram(hologram.view())
                    .depths(depths)
                    .center(&job.profile.center),
            )
            .context("propagation failed")?,
        Precision::F32 => {
            let hologram = hologram.mapv(|v| v as f32);
            let depths: Vec<f32> = depths.iter().map(|&z| z as f32).collect();
            let center: Vec<f32> = job.profile.center.iter().map(|&c| c as f32).collect();
            let profile = solver
                .propagate(
                    AxialInputs::new()
                        .hologram(hologram.view())
                        .depths(depths)
                        .center(&center),
                )
                .context("propagation failed")?;
            widen(profile)
        }
    };

    if let Some((z, e)) = profile.peak() {
        println!("  Peak |E| = {:.4e} at z = {:.3} px", e.norm(), z);
    }

    Ok(RunOutput {
        profile,
        device,
        method: solver.method_name().to_string(),
    })
}

fn widen(profile: AxialProfile<f32>) -> AxialProfile<f64> {
    AxialProfile {
        center: profile.center.map(f64::from),
        depths: profile.depths.into_iter().map(f64::from).collect(),
        field: profile
            .field
            .into_iter()
            .map(|e| Complex::new(f64::from(e.re), f64::from(e.im)))
            .collect(),
    }
}

/// What a validated job would compute.
#[derive(Debug)]
pub struct JobSummary {
    pub shape: (usize, usize),
    pub depths: usize,
    pub params: OpticalParams,
    /// Wavenumber in radians per pixel.
    pub wavenumber: f64,
    pub evanescent_modes: usize,
    pub cutoff: f64,
}

/// Check a job end to end without running the propagation.
pub fn validate_job(job: &JobConfig, base_dir: &Path) -> Result<JobSummary> {
    let hologram = load_hologram(&job.hologram_path(base_dir))?;
    summarise_job(job, &hologram)
}

/// Validate a job against a loaded hologram and build its plan.
pub fn summarise_job(job: &JobConfig, hologram: &Array2<f64>) -> Result<JobSummary> {
    let params = job.optics.resolve().context("invalid optics")?;
    create_backend(job)?;
    let inputs = AxialInputs::new()
        .hologram(hologram.view())
        .depths(job.profile.depths.expand())
        .center(&job.profile.center)
        .validate()
        .context("invalid job inputs")?;

    let plan = AxialPlan::<f64>::new(inputs.hologram.dim(), params)?;
    Ok(JobSummary {
        shape: plan.shape(),
        depths: inputs.depths.len(),
        params: *plan.params(),
        wavenumber: plan.grid().k,
        evanescent_modes: plan.kernel().evanescent_modes(),
        cutoff: plan.kernel().limit,
    })
}

/// Create the compute backend named in the job.
fn create_backend(job: &JobConfig) -> Result<Backend> {
    let backend = Backend::from_preference(&job.compute.backend, job.compute.threads)
        .context("selecting compute backend")?;
    log::info!("Selected backend: {}", backend.device_info().name);
    Ok(backend)
}

/// Read a plain-text hologram matrix from `path`.
pub fn load_hologram(path: &Path) -> Result<Array2<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading hologram {}", path.display()))?;
    parse_matrix(&content).with_context(|| format!("parsing hologram {}", path.display()))
}

/// Parse a matrix with one row per line and comma and/or whitespace
/// separated values. Blank lines and lines starting with `#` are skipped.
pub fn parse_matrix(text: &str) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let start = values.len();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let v: f64 = token
                .parse()
                .with_context(|| format!("line {}: invalid number '{}'", lineno + 1, token))?;
            values.push(v);
        }
        let width = values.len() - start;
        match ncols {
            None => ncols = Some(width),
            Some(n) if n != width => anyhow::bail!(
                "line {}: expected {} values, found {}",
                lineno + 1,
                n,
                width
            ),
            Some(_) => {}
        }
        nrows += 1;
    }

    let ncols = ncols.unwrap_or(0);
    Ok(Array2::from_shape_vec((nrows, ncols), values)?)
}

/// Write the profile as CSV (`depth,re,im,intensity`) with a metadata header.
pub fn write_profile_csv(output: &RunOutput, job: &JobConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(&mut file, output, job)?;
    println!("Profile written to: {}", path.display());
    Ok(())
}

fn write_csv<W: Write>(out: &mut W, output: &RunOutput, job: &JobConfig) -> Result<()> {
    let params = job.optics.resolve()?;
    let profile = &output.profile;

    writeln!(out, "# Holofocus axial profile: {}", output.method)?;
    writeln!(out, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "# wavelength: {}", params.wavelength)?;
    writeln!(out, "# pixel_pitch: {}", params.pixel_pitch)?;
    writeln!(out, "# center: ({}, {})", profile.center[0], profile.center[1])?;
    writeln!(out, "#")?;
    writeln!(out, "depth,re,im,intensity")?;

    for ((z, e), i) in profile
        .depths
        .iter()
        .zip(profile.field.iter())
        .zip(profile.intensity())
    {
        writeln!(out, "{},{:.9e},{:.9e},{:.9e}", z, e.re, e.im, i)?;
    }
    Ok(())
}

/// Write the profile as pretty-printed JSON.
pub fn write_profile_json(profile: &AxialProfile<f64>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(profile).context("JSON serialisation error")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Profile (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn job(extra: &str) -> JobConfig {
        parse_config(&format!(
            r#"
            [profile]
            center = [2.0, 2.0]
            depths = [0.0, 3.0, -3.0]

            [hologram]
            path = "unused.txt"

            [compute]
            backend = "serial"
            {extra}
            "#
        ))
        .unwrap()
    }

    fn point_hologram() -> Array2<f64> {
        let mut holo = Array2::<f64>::ones((5, 6));
        holo[[2, 2]] = 1.5;
        holo
    }

    #[test]
    fn test_parse_matrix_separators() {
        let m = parse_matrix("# comment\n1, 2, 3\n\n4\t5 6\n7,8,  9\n").unwrap();
        assert_eq!(m.dim(), (3, 3));
        assert_eq!(m[[1, 0]], 4.0);
        assert_eq!(m[[2, 2]], 9.0);
    }

    #[test]
    fn test_parse_matrix_ragged_rows_rejected() {
        let err = parse_matrix("1 2 3\n4 5\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_matrix_bad_number_rejected() {
        let err = parse_matrix("1 2\n3 x\n").unwrap_err();
        assert!(err.to_string().contains("invalid number 'x'"));
    }

    #[test]
    fn test_parse_empty_matrix() {
        let m = parse_matrix("# nothing\n\n").unwrap();
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn test_run_recovers_point_deviation() {
        let output = run_with_hologram(&job(""), &point_hologram()).unwrap();
        assert_eq!(output.profile.len(), 3);
        assert!((output.profile.field[0].re - 0.5).abs() < 1e-12);
        assert_eq!(output.device, "Serial");
    }

    #[test]
    fn test_single_precision_run() {
        let double = run_with_hologram(&job(""), &point_hologram()).unwrap();
        let single = run_with_hologram(&job("precision = \"f32\""), &point_hologram()).unwrap();
        for (a, b) in double.profile.field.iter().zip(single.profile.field.iter()) {
            assert!((a - b).norm() < 1e-5);
        }
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let job = parse_config(
            "[profile]\ncenter = [0, 0]\ndepths = 0.0\n\
             [hologram]\npath = \"h\"\n\
             [compute]\nbackend = \"gpu\"",
        )
        .unwrap();
        let err = run_with_hologram(&job, &point_hologram()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown backend 'gpu'"));
    }

    #[test]
    fn test_bad_center_reported() {
        let job = parse_config(
            "[profile]\ncenter = [1.0]\ndepths = 0.0\n\
             [hologram]\npath = \"h\"\n\
             [compute]\nbackend = \"serial\"",
        )
        .unwrap();
        let err = run_with_hologram(&job, &point_hologram()).unwrap_err();
        assert!(format!("{err:#}").contains("center"));
    }

    #[test]
    fn test_summary_reports_plan() {
        let job = job("");
        let summary = summarise_job(&job, &point_hologram()).unwrap();
        assert_eq!(summary.shape, (5, 6));
        assert_eq!(summary.depths, 3);
        assert_eq!(summary.params, OpticalParams::default());
        assert!((summary.wavenumber - OpticalParams::default().wavenumber()).abs() < 1e-15);
        assert!((summary.cutoff - 36.04365338911715).abs() < 1e-12);
        // k ≈ 1.342 rad/px: only the five lowest modes of a 5x6 grid propagate
        assert_eq!(summary.evanescent_modes, 25);
    }

    #[test]
    fn test_summary_rejects_infinite_pixel() {
        let mut holo = point_hologram();
        holo[[0, 0]] = f64::INFINITY;
        let err = summarise_job(&job(""), &holo).unwrap_err();
        assert!(format!("{err:#}").contains("must be finite"));
    }

    #[test]
    fn test_csv_layout() {
        let job = job("");
        let output = run_with_hologram(&job, &point_hologram()).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &output, &job).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let rows: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows[0], "depth,re,im,intensity");
        assert_eq!(rows.len(), 4);
        assert!(rows[1].starts_with("0,"));
        assert!(rows[3].starts_with("-3,"));
        assert!(text.contains("# wavelength: 0.632"));
    }
}
