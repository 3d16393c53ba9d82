mod common;
mod plot;
mod util;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use tracing::{error, info, warn};

use pncc_core::frontend::Window;
use pncc_core::input::decode_file;
use pncc_core::{OutputKind, PnccConfig, run_pncc};

use crate::common::output_path;
use crate::util::{feature_csv_rows, summary_min_median_max, write_csv};

#[derive(Debug, Parser)]
#[command(name = "pncc")]
#[command(about = "Extract Power-Normalized Cepstral Coefficients from audio files", long_about = None)]
struct Args {
    /// Audio files (WAV, FLAC, ...).
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// FFT size (also the analysis window length).
    #[arg(long, default_value_t = 1024)]
    n_fft: usize,

    /// Hop size in samples; 0 means n_fft/4.
    #[arg(long, default_value_t = 0)]
    hop_length: usize,

    /// Analysis window: hamming, hann or rectangular.
    #[arg(long, default_value = "hamming")]
    window: Window,

    /// Number of mel bands.
    #[arg(long, default_value_t = 40)]
    n_mels: usize,

    /// Number of cepstral coefficients.
    #[arg(long, default_value_t = 13)]
    n_pncc: usize,

    /// Half-width (bands) of the spectral weight smoothing.
    #[arg(long, default_value_t = 4)]
    weight_n: usize,

    /// Exponent applied to STFT magnitudes.
    #[arg(long, default_value_t = 2.0)]
    power: f32,

    /// Skip the DCT (cepstral compression).
    #[arg(long, default_value_t = false)]
    no_dct: bool,

    /// Which matrix to write.
    #[arg(long, value_enum, default_value_t = OutputArg::Features)]
    output: OutputArg,

    /// Directory for per-file CSV output.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Render a heatmap PNG next to the CSV (needs `--out-dir` and the `visualise` feature).
    #[arg(long, default_value_t = false, requires = "out_dir")]
    plot: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputArg {
    /// Power-law features, one column per mel band.
    Features,
    /// DCT cepstra, one column per coefficient.
    Cepstra,
}

impl From<OutputArg> for OutputKind {
    fn from(o: OutputArg) -> Self {
        match o {
            OutputArg::Features => OutputKind::Features,
            OutputArg::Cepstra => OutputKind::Cepstra,
        }
    }
}

struct FileReport {
    sample_rate: u32,
    duration_s: f32,
    frames: usize,
    columns: usize,
    stats: (f32, f32, f32),
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Also forwards `log` records from pncc-core.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    let args = Args::parse();

    let mut cfg = PnccConfig::default();
    cfg.frontend.n_fft = args.n_fft;
    cfg.frontend.hop_length = args.hop_length;
    cfg.frontend.window = args.window;
    cfg.frontend.n_mels = args.n_mels;
    cfg.frontend.power = args.power;
    cfg.n_pncc = args.n_pncc;
    cfg.weight_smoothing.n = args.weight_n;
    cfg.dct = !args.no_dct;
    cfg.validate().context("invalid configuration")?;

    let kind = OutputKind::from(args.output);
    if kind == OutputKind::Cepstra && !cfg.dct {
        anyhow::bail!("--output cepstra cannot be combined with --no-dct");
    }
    if args.plot && !cfg!(feature = "visualise") {
        warn!("--plot ignored: built without the `visualise` feature");
    }
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }

    // Each file gets its own buffers; nothing is shared between runs.
    let reports: Vec<(&PathBuf, Result<FileReport>)> = args
        .files
        .par_iter()
        .map(|path| (path, process_file(path, &cfg, kind, &args)))
        .collect();

    let mut failed = 0usize;
    for (path, report) in reports {
        match report {
            Ok(r) => print_report(path, &r, kind),
            Err(e) => {
                error!("{}: {e:#}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) failed", args.files.len());
    }
    Ok(())
}

fn process_file(path: &Path, cfg: &PnccConfig, kind: OutputKind, args: &Args) -> Result<FileReport> {
    info!("processing {}", path.display());
    let audio = decode_file(path).with_context(|| format!("decode {}", path.display()))?;
    if audio.channels > 1 {
        info!("{}: down-mixed {} channels", path.display(), audio.channels);
    }

    let result = run_pncc(&audio.samples, audio.sample_rate, cfg)
        .with_context(|| format!("pncc {}", path.display()))?;
    let matrix = result
        .output(kind)
        .context("requested output was not computed")?;

    let hop = cfg.frontend.hop();
    let mut csv = None;
    if let Some(dir) = &args.out_dir {
        let out = output_path(dir, path, "csv");
        let rows = feature_csv_rows(matrix, hop, audio.sample_rate);
        write_csv(&out, &rows).with_context(|| format!("write {}", out.display()))?;
        csv = Some(out);

        #[cfg(feature = "visualise")]
        if args.plot {
            let png = output_path(dir, path, "png");
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            plot::plot_features(matrix, hop, audio.sample_rate, &name, &png)
                .map_err(|e| anyhow::anyhow!("plot {}: {e}", png.display()))?;
        }
    }

    Ok(FileReport {
        sample_rate: audio.sample_rate,
        duration_s: audio.duration_s(),
        frames: matrix.frames(),
        columns: matrix.bands(),
        stats: summary_min_median_max(matrix.as_slice()),
        csv,
    })
}

fn print_report(path: &Path, r: &FileReport, kind: OutputKind) {
    println!("== {} ==", path.display());
    println!("Sample rate: {} Hz | Duration: {:.3} s", r.sample_rate, r.duration_s);
    println!("{:?}: {} frames x {} columns", kind, r.frames, r.columns);
    let (min, med, max) = r.stats;
    println!("Values min/median/max = {min:.4} / {med:.4} / {max:.4}");
    if let Some(csv) = &r.csv {
        println!("Wrote {}", csv.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_requires_out_dir() {
        let err = Args::try_parse_from(["pncc", "a.wav", "--plot"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let args = Args::try_parse_from(["pncc", "a.wav", "--plot", "--out-dir", "out"]).unwrap();
        assert!(args.plot);
        assert_eq!(args.out_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn defaults_match_library_config() {
        let args = Args::try_parse_from(["pncc", "a.wav"]).unwrap();
        let cfg = PnccConfig::default();
        assert_eq!(args.n_fft, cfg.frontend.n_fft);
        assert_eq!(args.n_mels, cfg.frontend.n_mels);
        assert_eq!(args.n_pncc, cfg.n_pncc);
        assert_eq!(args.weight_n, cfg.weight_smoothing.n);
        assert!(!args.plot);
    }
}
