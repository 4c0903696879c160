mod cli;

use ladderd::{
    config,
    ladder::Ladder,
    policy::Policy,
    processor::{Outcome, Processor},
    server,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use ladderd_av::{get_tool_path, FfprobeProber, MediaDescriptor, Prober};
use std::path::Path;
use std::sync::Arc;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting ladderd");
    tracing::info!(
        "Server will listen on {}:{}, work dir {:?}, {} concurrent encodes",
        config.server.host,
        config.server.port,
        config.dispatch.work_dir,
        config.dispatch.concurrent
    );
    match &config.callback.url {
        Some(url) => tracing::info!("Reporting job results to {}", url),
        None => tracing::info!("No callback URL configured, job results are only logged"),
    }

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ladderd=trace,ladderd_av=trace,ladderd_common=debug,tower_http=debug".to_string()
        } else {
            "ladderd=info,ladderd_av=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, json, cli.config.as_deref()))
        }
        Commands::Plan { file } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(plan_file(&file, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("ladderd {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn prober_for(config: &config::Config) -> Result<FfprobeProber> {
    let ffprobe = get_tool_path("ffprobe", config.tools.ffprobe_path.as_deref())?;
    Ok(FfprobeProber::new(ffprobe).with_timeout(config.dispatch.probe_timeout()))
}

async fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let info = prober_for(&config)?.probe(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("File: {}", file.display());
        print_descriptor(&info);
    }

    Ok(())
}

fn print_descriptor(info: &MediaDescriptor) {
    println!("Format: {}", info.format());
    let secs = info.duration_ms() / 1000;
    println!(
        "Duration: {:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        info.duration_ms() % 1000
    );
    println!("Bit rate: {} b/s", info.bit_rate());
    println!("Streams: {}", info.stream_count());

    println!("\nVideo Streams: {}", info.videos().len());
    for video in info.videos() {
        println!(
            "  [{}] {} {}x{} {} fps",
            video.index, video.codec, video.width, video.height, video.frame_rate
        );
    }

    println!("\nAudio Streams: {}", info.audios().len());
    for audio in info.audios() {
        println!(
            "  [{}] {} {} Hz {}ch",
            audio.index, audio.codec, audio.sample_rate, audio.channels
        );
    }
}

async fn plan_file(file: &Path, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let ladder = Ladder::from_config(&config.ladder).context("Invalid ladder configuration")?;
    let processor = Processor::new(
        Arc::new(prober_for(&config)?),
        Policy::from(&config.policy),
        ladder,
        config.dispatch.work_dir.clone(),
    );

    match processor.assess(file, file).await? {
        Outcome::Rejected {
            verdict,
            descriptor,
        } => {
            println!(
                "Rejected ({}): {}",
                descriptor.primary_size(),
                verdict.reason().unwrap_or("rejected")
            );
        }
        Outcome::Accepted { descriptor, jobs } => {
            println!("Accepted ({})", descriptor.primary_size());
            println!("Jobs: {}", jobs.len());
            for (i, job) in jobs.iter().enumerate() {
                println!(
                    "  {}. {} -> {} ({})",
                    i + 1,
                    job.resolution,
                    job.destination.display(),
                    job.size
                );
                println!("     ffmpeg {}", job.args.join(" "));
            }
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = ladderd_av::check_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable encoding.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Work dir: {:?}", config.dispatch.work_dir);
    println!("  Concurrent encodes: {}", config.dispatch.concurrent);
    println!(
        "  Callback: {}",
        config.callback.url.as_deref().unwrap_or("(log only)")
    );
    println!(
        "  Policy: min {}, aspect {}..{}",
        config.policy.min_resolution,
        config.policy.min_aspect_ratio,
        config.policy.max_aspect_ratio
    );
    println!("  Ladder rungs: {}", config.ladder.modes.len());
    for mode in &config.ladder.modes {
        println!("    {}", mode.resolution.as_deref().unwrap_or("?"));
    }

    Ok(())
}
