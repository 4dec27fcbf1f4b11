mod cli;

use issuesync::config;
use issuesync::pipeline::{self, RunOptions};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "issuesync=debug,issuesync_av=debug,issuesync_common=debug".to_string()
        } else {
            "issuesync=info,issuesync_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_target(false)
        .init();

    match cli.command {
        None => {
            let options = RunOptions {
                archive: cli.archive,
                dry_run: cli.dry_run,
                json: cli.json,
            };
            sync(cli.config.as_deref(), &options)
        }
        Some(Commands::CheckTools) => check_tools(cli.config.as_deref()),
        Some(Commands::Validate {
            config: config_path,
        }) => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Some(Commands::Version) => {
            println!("issuesync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn sync(config_path: Option<&std::path::Path>, options: &RunOptions) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(pipeline::run(&config, options));
    if let Err(ref e) = result {
        tracing::error!("Sync failed: {:#}", e);
    }
    result
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = issuesync_av::check_tools();
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
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    match config.transform.mode {
        issuesync_av::TransformMode::Copy => {
            println!("Transform mode 'copy' needs no external tools.");
        }
        mode => match issuesync_av::build_transformer(&config.transform, &config.tools) {
            Ok(t) => println!("Transform mode '{}' is ready ({}).", mode, t.name()),
            Err(e) => println!("Transform mode '{}' is unavailable: {}", mode, e),
        },
    }
    if !all_ok {
        println!("Some tools are missing. Install them to enable all transform modes.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::load_config_or_default(None)?
        }
    };

    let scheduler = config.scheduler.resolve();
    println!("✓ Configuration is valid");
    println!("  Downloads: {}", config.source.download_dir.display());
    println!("  Archive pattern: {}", config.source.archive_pattern);
    println!("  Target: {}", config.target.root.display());
    println!("  Skipped sections: {}", config.target.skip_sections.len());
    println!(
        "  Transform: {} (tempo {}, volume {})",
        config.transform.mode,
        config.transform.tempo,
        config
            .transform
            .volume
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unchanged".to_string())
    );
    println!(
        "  Workers: {} ({}ms launch delay)",
        scheduler.concurrency,
        scheduler.launch_delay.as_millis()
    );
    println!("  Sync passes: {}", config.scheduler.sync_passes);

    Ok(())
}
