//! Replay tool: run a recorded landmark stream through the ring pose
//! pipeline and report the resulting transforms.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ring_pose::config::{Config, EXAMPLE_CONFIG};
use ring_pose::landmarks::HandFrame;
use ring_pose::orientation::HandOrientation;
use ring_pose::pipeline::RingPipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSONL recording of detector frames, one frame object per line
    #[arg(short, long, required_unless_present = "print_example_config")]
    input: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the stabilization preset (responsive, balanced, smooth, steady)
    #[arg(short, long)]
    preset: Option<String>,

    /// Override the smoothing slider (0 = snappy, 1 = buttery)
    #[arg(short, long)]
    smoothing: Option<f64>,

    /// Print every frame's transform instead of the summary only
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_example_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_example_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        },
        None => Config::default(),
    };
    if let Some(preset) = &args.preset {
        config.stabilization.preset = preset.clone();
    }
    if let Some(slider) = args.smoothing {
        config.smoothing.slider = slider;
    }

    let mut pipeline = RingPipeline::new(&config)?;
    info!("Replaying with preset '{}'", config.stabilization.preset);

    let input = args.input.expect("clap enforces --input");
    let reader = BufReader::new(
        File::open(&input).with_context(|| format!("Failed to open {}", input.display()))?,
    );

    let mut frames = 0usize;
    let mut tracked = 0usize;
    let mut label_flips = 0usize;
    let mut attenuation_sum = 0.0;
    let mut min_attenuation = f64::INFINITY;
    let mut last_label = HandOrientation::Unknown;
    let mut last_output = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: HandFrame = serde_json::from_str(&line)
            .with_context(|| format!("Malformed frame on line {}", line_no + 1))?;

        let output = pipeline.process(&frame)?;
        frames += 1;
        if output.tracking {
            tracked += 1;
            attenuation_sum += output.attenuation;
            min_attenuation = min_attenuation.min(output.attenuation);
            if last_label != HandOrientation::Unknown && output.orientation.label != last_label {
                label_flips += 1;
            }
            last_label = output.orientation.label;
        }

        if args.verbose {
            let t = &output.transform;
            println!(
                "t={:9.1}ms tracking={} pos=({:+.3},{:+.3},{:+.3}) scale={:.4} rot=({:+.2},{:+.2},{:+.2}) score={:+.2} att={:.2}",
                frame.timestamp_ms,
                output.tracking,
                t.position.x,
                t.position.y,
                t.position.z,
                t.scale,
                t.rotation.x,
                t.rotation.y,
                t.rotation.z,
                output.orientation.score,
                output.attenuation,
            );
        }
        last_output = Some(output);
    }

    println!("Frames processed:   {frames}");
    println!("Tracked frames:     {tracked}");
    println!("Label flips:        {label_flips}");
    if tracked > 0 {
        println!("Mean attenuation:   {:.3}", attenuation_sum / tracked as f64);
        println!("Min attenuation:    {min_attenuation:.3}");
    }
    if let Some(output) = last_output {
        let t = &output.transform;
        println!(
            "Final transform:    pos=({:+.3},{:+.3},{:+.3}) scale={:.4} rot=({:+.2},{:+.2},{:+.2})",
            t.position.x, t.position.y, t.position.z, t.scale, t.rotation.x, t.rotation.y, t.rotation.z,
        );
    }

    Ok(())
}
