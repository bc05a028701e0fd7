//! Holofocus command-line interface.
//!
//! Back-propagate holograms along an axial line from TOML job files:
//! ```sh
//! holofocus-cli run job.toml
//! holofocus-cli validate job.toml
//! holofocus-cli defaults
//! ```

mod config;
mod runner;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use holofocus_core::precision::stability_cutoff;
use holofocus_core::types::{DEFAULT_PIXEL_PITCH, DEFAULT_WAVELENGTH};
use holofocus_core::OpticalParams;

#[derive(Parser)]
#[command(name = "holofocus-cli")]
#[command(about = "Holofocus: axial Rayleigh-Sommerfeld back-propagation of holograms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file and its hologram without propagating.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Display the default optics and underflow cutoffs.
    Defaults,
}

fn job_dir(config: &Path) -> &Path {
    config.parent().unwrap_or_else(|| Path::new("."))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Holofocus axial refocusing");
            println!("==========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_job(&job, job_dir(&config))?;
            println!("  Method: {} on {}", result.method, result.device);

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_profile_csv(&result, &job, &out_dir.join("profile.csv"))?;
            }
            if job.output.save_json {
                runner::write_profile_json(&result.profile, &out_dir.join("profile.json"))?;
            }

            println!("Done.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let summary = runner::validate_job(&job, job_dir(&config))?;
            println!("Configuration is valid: {}", config.display());
            println!("  Hologram:   {}x{}", summary.shape.0, summary.shape.1);
            println!("  Depths:     {}", summary.depths);
            println!(
                "  Optics:     wavelength = {}, pixel_pitch = {}",
                summary.params.wavelength, summary.params.pixel_pitch
            );
            println!("  k:          {:.6} rad/pixel", summary.wavenumber);
            println!(
                "  Evanescent: {} of {} modes (cutoff {:.3})",
                summary.evanescent_modes,
                summary.shape.0 * summary.shape.1,
                summary.cutoff
            );
            Ok(())
        }
        Commands::Defaults => {
            let k = OpticalParams::default().wavenumber();
            println!("Default optics:");
            println!("  wavelength  = {} (medium)", DEFAULT_WAVELENGTH);
            println!("  pixel_pitch = {}", DEFAULT_PIXEL_PITCH);
            println!("  k           = {:.6} rad/pixel", k);
            println!();
            println!("Underflow cutoff |ln eps|:");
            println!("  f64: {:.4}", stability_cutoff::<f64>());
            println!("  f32: {:.4}", stability_cutoff::<f32>());
            Ok(())
        }
    }
}
