use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use skin_tone_scan::image_loader::{image_stats, load_image, save_image};
use skin_tone_scan::{
    Adjustment, AdjustmentKind, AnalysisError, AnalyzerConfig, SkinToneAnalyzer, ToneModifier,
};

/// Exit code used when the image contains no detectable skin
const EXIT_NO_SKIN: u8 = 2;

#[derive(Parser)]
#[command(name = "skin-tone")]
#[command(version, about = "Skin tone analysis and mask-guided tone editing", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the skin tone of an image and print it as JSON
    Analyze {
        /// Input image
        #[arg(value_name = "IMAGE")]
        input: PathBuf,

        /// Also print image statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Apply a single lightness, warmth or saturation adjustment
    Adjust {
        /// Adjustment kind (lightness, warmth or saturation)
        kind: AdjustmentKind,

        /// Adjustment amount in [-50, 50]
        #[arg(allow_negative_numbers = true)]
        value: f32,

        /// Input image
        input: PathBuf,

        /// Output image
        output: PathBuf,

        /// Blend through a mask feathered with this radius
        #[arg(long, value_name = "RADIUS")]
        feather: Option<u32>,
    },

    /// Apply a named tone preset (lighter, darker, warmer, cooler)
    Tone {
        /// Preset name
        name: String,

        /// Input image
        input: PathBuf,

        /// Output image
        output: PathBuf,
    },

    /// Smooth skin texture with a bilateral filter
    Smooth {
        /// Input image
        input: PathBuf,

        /// Output image
        output: PathBuf,

        /// Smoothing intensity in [0, 1] (defaults to the configured value)
        #[arg(short, long, value_name = "FLOAT")]
        intensity: Option<f32>,
    },

    /// Write the detected skin mask as a grayscale image
    Mask {
        /// Input image
        input: PathBuf,

        /// Output mask image
        output: PathBuf,
    },

    /// Write the default configuration to a JSON file
    InitConfig {
        /// Output file path
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Analyze { input, stats } => cmd_analyze(&config, &input, stats),
        Commands::Adjust {
            kind,
            value,
            input,
            output,
            feather,
        } => cmd_adjust(&config, kind, value, &input, &output, feather),
        Commands::Tone {
            name,
            input,
            output,
        } => cmd_tone(&config, &name, &input, &output),
        Commands::Smooth {
            input,
            output,
            intensity,
        } => cmd_smooth(&config, intensity, &input, &output),
        Commands::Mask { input, output } => cmd_mask(&config, &input, &output),
        Commands::InitConfig { output } => cmd_init_config(&output),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AnalysisError::NoSkinDetected) => {
            eprintln!("{}", AnalysisError::NoSkinDetected.user_message());
            ExitCode::from(EXIT_NO_SKIN)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, AnalysisError> {
    match path {
        Some(path) => AnalyzerConfig::from_json_file(path),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn cmd_analyze(config: &AnalyzerConfig, input: &Path, stats: bool) -> Result<(), AnalysisError> {
    let image = load_image(input, &config.loader)?;
    if stats {
        let s = image_stats(&image);
        eprintln!(
            "{}x{} px, brightness {:.1} +/- {:.1} [{}..{}]",
            s.width, s.height, s.mean_brightness, s.std_brightness, s.min_value, s.max_value
        );
    }

    let analysis = SkinToneAnalyzer::with_config(config).analyze(&image)?;
    println!("{}", analysis.to_json()?);
    Ok(())
}

fn cmd_adjust(
    config: &AnalyzerConfig,
    kind: AdjustmentKind,
    value: f32,
    input: &Path,
    output: &Path,
    feather: Option<u32>,
) -> Result<(), AnalysisError> {
    let adjustment = Adjustment::new(kind, value)?;
    let image = load_image(input, &config.loader)?;
    let modifier = ToneModifier::with_config(config);

    let result = match feather {
        Some(radius) => modifier.apply_gradual_adjustment(&image, adjustment, Some(radius))?,
        None => modifier.apply(&image, adjustment)?,
    };
    save_image(&result, output)?;
    println!("Applied {} -> {}", adjustment, output.display());
    Ok(())
}

fn cmd_tone(
    config: &AnalyzerConfig,
    name: &str,
    input: &Path,
    output: &Path,
) -> Result<(), AnalysisError> {
    let modifier = ToneModifier::with_config(config);
    let image = load_image(input, &config.loader)?;
    let result = modifier.change_skin_tone(&image, name)?;
    save_image(&result, output)?;
    println!("Applied tone '{}' -> {}", name, output.display());
    Ok(())
}

fn cmd_smooth(
    config: &AnalyzerConfig,
    intensity: Option<f32>,
    input: &Path,
    output: &Path,
) -> Result<(), AnalysisError> {
    let image = load_image(input, &config.loader)?;
    let modifier = ToneModifier::with_config(config);
    let result = match intensity {
        Some(intensity) => modifier.enhance_skin_texture(&image, intensity)?,
        None => modifier.smooth_skin(&image)?,
    };
    save_image(&result, output)?;
    println!("Smoothed skin texture -> {}", output.display());
    Ok(())
}

fn cmd_mask(config: &AnalyzerConfig, input: &Path, output: &Path) -> Result<(), AnalysisError> {
    let image = load_image(input, &config.loader)?;
    let analyzer = SkinToneAnalyzer::with_config(config);
    let mask = analyzer.detector().detect(&image)?;
    if mask.is_empty() {
        return Err(AnalysisError::NoSkinDetected);
    }

    mask.as_gray()
        .save(output)
        .map_err(|e| AnalysisError::image_load(format!("Failed to write {}", output.display()), e))?;
    println!(
        "Skin coverage {:.1}% -> {}",
        mask.coverage() * 100.0,
        output.display()
    );
    Ok(())
}

fn cmd_init_config(output: &Path) -> Result<(), AnalysisError> {
    AnalyzerConfig::default().to_json_file(output)?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}
