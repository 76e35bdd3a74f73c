use anyhow::Result;
use clap::Parser;
use jasmine_guard::config::{GuardConfig, SpecdocMode, debug_print_config};
use jasmine_guard::log::init_tracing;
use jasmine_guard::runner::JasmineRunner;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Runs Jasmine specs in PhantomJS and reports the results.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Spec files to run; the spec directory runs every suite
    paths: Vec<PathBuf>,

    /// Configuration file (default: $JASMINE_GUARD_CONFIG or jasmine-guard.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Jasmine runner URL override
    #[arg(short = 'u', long)]
    jasmine_url: Option<String>,

    /// PhantomJS binary override
    #[arg(short, long)]
    phantomjs_bin: Option<String>,

    /// Spec directory override
    #[arg(long)]
    spec_dir: Option<PathBuf>,

    /// Console suite listing
    #[arg(long, value_enum)]
    specdoc: Option<SpecdocMode>,

    /// Disable desktop notifications
    #[arg(long)]
    no_notification: bool,

    /// Do not notify when all specs pass
    #[arg(long)]
    hide_success: bool,

    /// Skip the runner availability check
    #[arg(long)]
    no_server_check: bool,
}

fn apply_overrides(mut cfg: GuardConfig, args: &Args) -> GuardConfig {
    if let Some(url) = &args.jasmine_url {
        cfg = cfg.with_jasmine_url(url);
    }
    if let Some(bin) = &args.phantomjs_bin {
        cfg = cfg.with_phantomjs_bin(bin);
    }
    if let Some(dir) = &args.spec_dir {
        cfg = cfg.with_spec_dir(dir);
    }
    if let Some(specdoc) = args.specdoc {
        cfg = cfg.with_specdoc(specdoc);
    }
    if args.no_notification {
        cfg = cfg.with_notification(false);
    }
    if args.hide_success {
        cfg = cfg.with_hide_success(true);
    }
    if args.no_server_check {
        cfg = cfg.with_server_check(false);
    }
    cfg
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    debug!("Arguments: {:?}", args);

    let cfg = apply_overrides(GuardConfig::load(args.config.as_deref())?, &args);
    debug_print_config(&cfg);

    let summary = JasmineRunner::new(cfg).run(&args.paths)?;

    Ok(if summary.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
