use monster_tower::{run, CliOptions};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--roster roster.json] [--output matrix.csv] [--seed SEED] \
[--verbosity 0-3] [--tower ROUNDS]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut roster_path = PathBuf::from("data/roster.json");
    let mut output_path = PathBuf::from("matrix.csv");
    let mut seed = 0u64;
    let mut verbosity = 0u8;
    let mut tower_rounds = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--roster" => {
                roster_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--roster requires a path (e.g. --roster roster.json)")
                })?;
            }
            "--output" => {
                output_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output matrix.csv)")
                })?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--verbosity" | "-v" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--verbosity requires a number"))?;
                verbosity = val.parse()?;
            }
            "--tower" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--tower requires a number of rounds"))?;
                let rounds: usize = val.parse()?;
                if rounds == 0 {
                    anyhow::bail!("--tower must be > 0");
                }
                tower_rounds = Some(rounds);
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        roster_path,
        output_path,
        seed,
        verbosity,
        tower_rounds,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "monster_tower=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let opts = parse_args()?;
    run(opts)
}
