use pic_core::io::FramePattern;
use pic_core::statistics::log_statistics;
use pic_core::{PicSimulation, SimulationParameters};

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(StructOpt, Debug)]
#[structopt(name = "pic_core")]
struct Opt {
    /// JSON file with the simulation parameters. Defaults are used for anything it leaves out.
    #[structopt(short, long)]
    config: Option<std::path::PathBuf>,
    /// Directory each frame's particles are written to.
    #[structopt(short, long)]
    output_dir: Option<std::path::PathBuf>,
    #[structopt(short, long, default_value = "100")]
    frames: usize,
    /// Write MessagePack snapshots (positions and velocities) instead of text position dumps.
    #[structopt(short, long)]
    binary: bool,
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opt = Opt::from_args();

    let params = match &opt.config {
        Some(path) => SimulationParameters::from_json_file(path)?,
        None => SimulationParameters::default(),
    };

    let path = match opt.output_dir {
        Some(path) => path,
        None => return Err(eyre::eyre!("Must specify output directory.")),
    };

    use eyre::WrapErr;
    std::fs::create_dir_all(&path)
        .wrap_err_with(|| format!("Failed to create output directory: {:?}", &path))?;

    let pattern = if opt.binary {
        FramePattern::snapshot(path)
    } else {
        FramePattern::text(path)
    };

    let mut sim = PicSimulation::new(params)?;

    for frame in 0..=opt.frames {
        if frame > 0 {
            sim.simulate_frame();
        }
        log_statistics(frame, &sim);

        let file = pattern.path(frame);
        if opt.binary {
            sim.particles.write_snapshot(&file)?;
        } else {
            sim.particles.write_to_file(&file)?;
        }
    }

    Ok(())
}
