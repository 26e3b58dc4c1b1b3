use std::path::PathBuf;

use clap::Parser;
use nav_sequence_rs::{Sequence, SequenceConfig, SequenceId, Split, Step, Timestamp, Vec3};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "sequence_replay")]
#[command(about = "Replay a recorded sequence step by step on the IMU clock", long_about = None)]
struct Args {
    /// Recording split (training or testing)
    #[arg(long, default_value = "training", value_parser = clap::value_parser!(Split))]
    split: Split,

    /// Sequence id (folder sequence_<ID>)
    #[arg(long, default_value = "1")]
    id: u32,

    /// JSON config file with base_path / image_folder
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root holding the split folders (overrides the config file)
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Image folder inside the sequence directory (overrides the config file)
    #[arg(long)]
    image_folder: Option<String>,

    /// Stop after this many steps
    #[arg(long)]
    limit: Option<usize>,

    /// Print a JSON summary instead of one line per step
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn resolve_config(args: &Args) -> anyhow::Result<SequenceConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => SequenceConfig::from_json_file(path)?,
        None => SequenceConfig::default(),
    };
    if let Some(base_path) = args.base_path.as_ref() {
        config.base_path = base_path.clone();
    }
    if let Some(image_folder) = args.image_folder.as_ref() {
        config.image_folder = image_folder.clone();
    }
    Ok(config)
}

fn fmt_vec(v: &Vec3) -> String {
    format!("[{:.4}, {:.4}, {:.4}]", v.x, v.y, v.z)
}

fn step_line(step: &Step) -> String {
    let baro = step
        .barometric_height()
        .map(|h| format!("{:.3}", h))
        .unwrap_or_else(|| "-".to_string());
    let image = step
        .image()
        .map(|img| format!("{}x{}", img.width(), img.height()))
        .unwrap_or_else(|| "-".to_string());
    let truth = step
        .ground_truth()
        .map(|gt| format!("[{:.7}, {:.7}, {:.2}]", gt.latitude, gt.longitude, gt.altitude))
        .unwrap_or_else(|_| "-".to_string());

    format!(
        "t={} acc={} gyro={} baro={} image={} truth={}",
        step.timestamp(),
        fmt_vec(step.acceleration()),
        fmt_vec(step.angular_velocity()),
        baro,
        image,
        truth
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    let id = SequenceId::new(args.split, args.id);

    let sequence = Sequence::open(id, &config)?;
    let initial = sequence.initial_state()?;

    if !args.json {
        println!("initial position:    {}", fmt_vec(&initial.position));
        println!("initial velocity:    {}", fmt_vec(&initial.velocity));
        println!("initial orientation: {}", fmt_vec(&initial.orientation));
    }

    let limit = args.limit.unwrap_or(usize::MAX);
    let mut step_count = 0usize;
    let mut camera_frames = 0usize;
    let mut truth_steps = 0usize;
    let mut first_ts: Option<Timestamp> = None;
    let mut last_ts: Option<Timestamp> = None;

    for step in sequence.steps().take(limit) {
        let step = step?;
        step_count += 1;
        if step.camera.is_captured() {
            camera_frames += 1;
        }
        if step.ground_truth().is_ok() {
            truth_steps += 1;
        }
        first_ts.get_or_insert(step.timestamp());
        last_ts = Some(step.timestamp());

        if !args.json {
            println!("{}", step_line(&step));
        }
    }

    log::info!(
        "Replayed {} of {} steps ({} with camera frames)",
        step_count,
        sequence.len(),
        camera_frames
    );

    if args.json {
        let summary = json!({
            "sequence": id.to_string(),
            "path": sequence.dir().display().to_string(),
            "steps": step_count,
            "imu_rows": sequence.len(),
            "camera_rows": sequence.camera_table().len(),
            "camera_frames": camera_frames,
            "ground_truth_steps": truth_steps,
            "first_timestamp": first_ts,
            "last_timestamp": last_ts,
            "initial_state": initial,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
