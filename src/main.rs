use clap::Parser;
use secradar::cli::{Cli, Commands};
use secradar::types::config::Config;
use secradar::types::requests::AssessmentRequest;
use secradar::RadarResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> RadarResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|_| Config::default_config())
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("secradar={}", log_level)
            .parse()
            .unwrap_or_else(|_| "secradar=info".parse().expect("fallback directive is valid")),
    );

    let (text_layer, json_layer) = if config.general.log_format == "json" {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(filter)
        .init();

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            secradar::cli::commands::init(path).await?;
        }
        Commands::Assess {
            product,
            company,
            sha1,
            url,
            force_refresh,
            save,
        } => {
            let request = AssessmentRequest {
                product_name: product,
                company_name: company,
                sha1,
                url,
            };
            secradar::cli::commands::assess(request, force_refresh, save, cli.quiet, &config)
                .await?;
        }
        Commands::Cache(command) => {
            secradar::cli::commands::cache(command, &config).await?;
        }
        Commands::History(command) => {
            secradar::cli::commands::history(command, &config).await?;
        }
        Commands::Version => {
            secradar::cli::commands::version();
        }
    }

    Ok(())
}
