use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tv_post::logging::{LogGuard, init_logging};
use tv_post::{Config, ConfigOverrides, JobRequest, ToExitCode, TransferPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "tv-post",
    version,
    about = "Extract and file completed TV downloads into the ready directory"
)]
struct Args {
    /// Download directory, first archive volume, or video file
    input: PathBuf,

    /// Output name; used verbatim when it contains "---"
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Ready directory the video is placed in
    #[arg(short = 'd', long = "dir", env = "TV_READY_DIR")]
    ready_dir: Option<PathBuf>,

    /// Root for temporary extraction workspaces [default: $HOME/tmp]
    #[arg(long = "temp-dir", env = "TV_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Append log output to this file
    #[arg(short = 'l', long = "log", env = "TV_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Test mode: resolve and log everything, but do not transfer the video
    #[arg(
        long = "test",
        env = "TV_POST_TEST",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    test: bool,

    /// JSON configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Transfer policy: auto (copy while seeding), move, or copy
    #[arg(long)]
    transfer: Option<TransferPolicy>,

    /// Skip archive members smaller than this many bytes
    #[arg(long = "min-size")]
    min_size: Option<u64>,

    /// Extract with this unrar binary instead of the built-in library
    #[arg(long = "unrar")]
    unrar: Option<PathBuf>,

    /// Extract with the unrar binary found on PATH
    #[arg(long = "use-unrar-cli")]
    use_unrar_cli: bool,

    /// Forward log lines to a UDP syslog receiver (host:port)
    #[arg(long, env = "TV_SYSLOG_ADDR")]
    syslog: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            ready_dir: self.ready_dir.clone(),
            temp_dir: self.temp_dir.clone(),
            log_file: self.log_file.clone(),
            syslog_address: self.syslog.clone(),
            min_file_size: self.min_size,
            transfer: self.transfer,
            unrar_path: self.unrar.clone(),
            use_unrar_cli: self.use_unrar_cli,
            test_mode: self.test,
        }
    }

    fn request(&self) -> JobRequest {
        let request = JobRequest::new(&self.input);
        match &self.output {
            Some(name) => request.with_output_name(name),
            None => request,
        }
    }
}

/// Load the config file, layer flags and environment on top, start logging
fn setup(args: &Args) -> anyhow::Result<(Config, LogGuard)> {
    let config = Config::load(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to build default configuration".to_string(),
    })?;
    let config = args.overrides().apply(config);
    let guard = init_logging(&config.logging).context("failed to initialize logging")?;
    Ok((config, guard))
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<tv_post::Error>()
        .map(|e| e.exit_code())
        .unwrap_or(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (config, _log_guard) = match setup(&args) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("tv-post: {:#}", e);
            return ExitCode::from(exit_code_for(&e));
        }
    };

    if let Err(e) = config.validate() {
        error!(error = %e, code = e.error_code(), "invalid configuration");
        return ExitCode::from(e.exit_code());
    }

    match tv_post::process(&args.request(), config).await {
        Ok(placed) => {
            info!(?placed, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(
                error = %e,
                code = e.error_code(),
                stage = %e.stage(),
                "post-processing failed"
            );
            ExitCode::from(e.exit_code())
        }
    }
}
