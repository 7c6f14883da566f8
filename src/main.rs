use std::path::PathBuf;

use tokio::net::TcpListener;

use arxiv_store::config::Config;
use arxiv_store::error::{AppError, Result};
use arxiv_store::{server, App};

struct Args {
    config_path: Option<PathBuf>,
    init_config: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config_path: None,
        init_config: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| AppError::Config("--config needs a path".to_string()))?;
                args.config_path = Some(PathBuf::from(path));
            }
            "--init-config" => args.init_config = true,
            other => {
                return Err(AppError::Config(format!(
                    "unknown argument '{other}' (usage: arxiv-store [--config <path>] [--init-config])"
                )))
            }
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config_path = args.config_path.unwrap_or_else(Config::config_path);

    if args.init_config {
        Config::default().save_to(&config_path)?;
        println!("Wrote default config to {:?}", config_path);
        return Ok(());
    }

    let config = Config::load_from(&config_path)?;
    tracing::debug!(?config, "configuration loaded from {:?}", config_path);

    let app = App::new(&config).await?;
    let listener = TcpListener::bind(config.socket_addr()).await?;

    server::run(listener, app).await
}
