// src/main.rs

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use turbsim_plot::axes::LineStyle;
use turbsim_plot::component::{parse_component_list, Component};
use turbsim_plot::constants::{DEFAULT_DPI, DEFAULT_NFFT, DEFAULT_WINDOW_TIME_S};
use turbsim_plot::crate_version;
use turbsim_plot::data_input::{parse_field_file, TsData};
use turbsim_plot::figures::{new_summary_forms, plot_spectra, FormsFigure, SummaryFigure, SummaryLayout};
use turbsim_plot::plot_formats::{Coherence, PlotFormat, Spectrum, StressProfile, TkeProfile, VelocityProfile};
use turbsim_plot::types::GridIndex;

/// Renders summary, forms and spectra figures of a wind field.
#[derive(Parser, Debug)]
#[command(name = "turbsim_plot")]
#[command(version = crate_version())]
#[command(about = "Profiles, spectra, coherence, tke and Reynolds stress figures of a TurbSim-style wind field")]
struct Cli {
    /// Wind field CSV file
    input: PathBuf,

    /// Directory for the PNG files (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// FFT length of the summary and spectra figures
    #[arg(long, default_value_t = DEFAULT_NFFT)]
    nfft: usize,

    /// FFT window length [s] of the spectrum and coherence forms
    #[arg(long, default_value_t = DEFAULT_WINDOW_TIME_S)]
    window_time: f64,

    /// Spectrum point as `iz,iy` (default: hub)
    #[arg(long, value_parser = parse_grid_index)]
    igrid: Option<GridIndex>,

    /// Second coherence point as `iz,iy` (default: 0,0)
    #[arg(long, value_parser = parse_grid_index)]
    icoh: Option<GridIndex>,

    /// Rows of the forms figure, e.g. `u,w`
    #[arg(long, default_value = "u,v,w")]
    components: String,

    /// Forms figure with only the velocity profile and spectrum columns
    #[arg(long)]
    short_forms: bool,

    #[arg(long)]
    title: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_grid_index(s: &str) -> Result<GridIndex, String> {
    let (iz, iy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `iz,iy`, got `{s}`"))?;
    let iz = iz.trim().parse::<usize>().map_err(|e| format!("iz: {e}"))?;
    let iy = iy.trim().parse::<usize>().map_err(|e| format!("iy: {e}"))?;
    Ok((iz, iy))
}

fn output_path(dir: &Path, stem: &str, kind: &str) -> PathBuf {
    dir.join(format!("{stem}_{kind}.png"))
}

fn build_summary(cli: &Cli, data: &TsData, title: Option<&str>) -> anyhow::Result<SummaryFigure> {
    let mut fig = SummaryFigure::with_layout(&SummaryLayout::default(), cli.nfft, title)?;
    fig.set_indices(data, cli.igrid, cli.icoh)?;
    fig.plot(data, true, None)?;
    fig.finish();
    Ok(fig)
}

fn build_forms(cli: &Cli, data: &TsData, comps: &[Component]) -> anyhow::Result<FormsFigure> {
    let mut fig = if cli.short_forms {
        new_summary_forms(comps)?
    } else {
        let formats: Vec<Box<dyn PlotFormat>> = vec![
            Box::new(VelocityProfile::new()),
            Box::new(TkeProfile::new()),
            Box::new(StressProfile::new(cli.igrid.map(|(_, iy)| iy))),
            Box::new(Spectrum::new(cli.window_time, cli.igrid)),
            Box::new(Coherence::new(cli.window_time, cli.igrid, cli.icoh)),
        ];
        FormsFigure::new(formats, comps)?
    };
    fig.plot(data, &LineStyle::default())?;
    fig.finalize();
    Ok(fig)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("turbsim_plot {}", crate_version());
    let comps = parse_component_list(&cli.components)?;
    if comps.is_empty() {
        anyhow::bail!("--components lists no component");
    }

    let parsed = parse_field_file(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let data = &parsed.data;
    info!(
        "Field: {} x {} points, {} steps at dt = {} s",
        data.nz(),
        data.ny(),
        data.n_time(),
        data.dt
    );

    let stem = cli
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "field".to_string());
    let title = cli.title.clone().or_else(|| parsed.title.clone());
    let output_dir = match &cli.output_dir {
        Some(dir) => dir.clone(),
        None => cli.input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    if !output_dir.as_os_str().is_empty() {
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating {}", output_dir.display()))?;
    }

    let mut failures = 0;

    match build_summary(&cli, data, title.as_deref()) {
        Ok(fig) => {
            if let Err(e) = fig.save(&output_path(&output_dir, &stem, "summary"), cli.dpi) {
                warn!("Summary figure not saved: {e}");
                failures += 1;
            }
        }
        Err(e) => {
            warn!("Summary figure skipped: {e}");
            failures += 1;
        }
    }

    match build_forms(&cli, data, &comps) {
        Ok(fig) => {
            if let Err(e) = fig.save(&output_path(&output_dir, &stem, "forms"), cli.dpi) {
                warn!("Forms figure not saved: {e}");
                failures += 1;
            }
        }
        Err(e) => {
            warn!("Forms figure skipped: {e}");
            failures += 1;
        }
    }

    match plot_spectra(data, cli.nfft, cli.igrid) {
        Ok(fig) => {
            if let Err(e) = fig.save(&output_path(&output_dir, &stem, "spectra"), cli.dpi) {
                warn!("Spectra figure not saved: {e}");
                failures += 1;
            }
        }
        Err(e) => {
            warn!("Spectra figure skipped: {e}");
            failures += 1;
        }
    }

    if failures == 3 {
        anyhow::bail!("no figure could be written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid_index() {
        assert_eq!(parse_grid_index("2, 3").unwrap(), (2, 3));
        assert!(parse_grid_index("2").is_err());
        assert!(parse_grid_index("a,1").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["turbsim_plot", "field.csv"]);
        assert_eq!(cli.dpi, DEFAULT_DPI);
        assert_eq!(cli.nfft, DEFAULT_NFFT);
        assert_eq!(cli.igrid, None);
        assert!(!cli.short_forms);

        let cli = Cli::parse_from(["turbsim_plot", "field.csv", "--igrid", "1,0", "--icoh", "0,1"]);
        assert_eq!(cli.igrid, Some((1, 0)));
        assert_eq!(cli.icoh, Some((0, 1)));
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("out"), "run1", "summary");
        assert_eq!(path, Path::new("out").join("run1_summary.png"));
    }
}
