use clap::{Parser, Subcommand};
use folio::config::{self, SiteConfig};
use folio::generate::{self, SNAPSHOT_FILE};
use folio::preview::DraftSession;
use folio::server::{self, AppState};
use folio::store::{self, Perspective, queries};
use folio::{cache, output};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TOKEN_VAR: &str = "SANITY_API_READ_TOKEN";
const SESSION_KEY_VAR: &str = "FOLIO_SESSION_KEY";

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio site generator and preview server for a Sanity dataset")]
#[command(long_about = "\
Portfolio site generator and preview server for a Sanity dataset

Content lives in the CMS as five document types: author (one), workExperience,
education, project and skill. folio reads them, renders a single page, and
either writes it to disk or serves it with a draft preview mode.

Pipeline:

  1. fetch     CMS      → .folio-temp/snapshot.json
  2. generate  snapshot → dist/

Environment:
  SANITY_API_READ_TOKEN   read token, required for draft content and previews
  FOLIO_SESSION_KEY       signs the draft cookie (random per process if unset)

A .env file in the working directory is loaded if present.

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (content snapshot)
    #[arg(long, default_value = ".folio-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all content into a snapshot
    Fetch {
        /// Read unpublished drafts (needs SANITY_API_READ_TOKEN)
        #[arg(long)]
        drafts: bool,
    },
    /// Render the snapshot into the output directory
    Generate {
        /// Accept a snapshot fetched with --drafts
        #[arg(long)]
        drafts: bool,
    },
    /// Run the full pipeline: fetch → generate
    Build,
    /// Fetch content and print an inventory without writing anything
    Check,
    /// Serve the page live with draft preview
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let snapshot_path = cli.temp_dir.join(SNAPSHOT_FILE);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Fetch { drafts } => {
            let (site_config, config_dir) = load(&cli.config)?;
            let store = store::open_store(&site_config, &config_dir, token())?;
            let perspective = if drafts {
                Perspective::Drafts
            } else {
                Perspective::Published
            };
            let report = generate::fetch(store.as_ref(), perspective, &cli.temp_dir).await?;
            output::print_fetch_output(&report, perspective.as_str());
        }
        Command::Generate { drafts } => {
            let (site_config, config_dir) = load(&cli.config)?;
            let report =
                generate::generate(&snapshot_path, &site_config, &config_dir, &cli.output, drafts)?;
            output::print_generate_output(&report);
        }
        Command::Build => {
            let (site_config, config_dir) = load(&cli.config)?;
            let store = store::open_store(&site_config, &config_dir, token())?;

            println!("==> Stage 1: Fetching from {}", store.describe());
            let report =
                generate::fetch(store.as_ref(), Perspective::Published, &cli.temp_dir).await?;
            output::print_fetch_output(&report, Perspective::Published.as_str());

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report =
                generate::generate(&snapshot_path, &site_config, &config_dir, &cli.output, false)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let (site_config, config_dir) = load(&cli.config)?;
            let store = store::open_store(&site_config, &config_dir, token())?;
            println!("==> Checking {}", store.describe());
            let snapshot = queries::fetch_all(store.as_ref(), Perspective::Published).await?;
            let fingerprint = cache::fingerprint(&snapshot)?;
            output::print_check_output(&snapshot, &store.describe(), &fingerprint);
            println!("==> Content is valid");
        }
        Command::Serve { host, port } => {
            let (mut site_config, config_dir) = load(&cli.config)?;
            if let Some(host) = host {
                site_config.server.host = host;
            }
            if let Some(port) = port {
                site_config.server.port = port;
            }
            let store = store::open_store(&site_config, &config_dir, token())?;
            let session_key = std::env::var(SESSION_KEY_VAR).ok();
            let addr = site_config.server.addr();
            output::print_serve_banner(
                &addr,
                &store.describe(),
                Duration::from_secs(site_config.revalidate.interval_secs),
            );
            let state = AppState::new(
                site_config,
                &config_dir,
                store,
                DraftSession::from_key(session_key.as_deref()),
            );
            server::serve(state, &addr).await?;
        }
    }

    Ok(())
}

/// Load and validate the config, returning it with the directory that
/// relative paths in it resolve against.
fn load(path: &Path) -> Result<(SiteConfig, PathBuf), config::ConfigError> {
    let site_config = config::load_config(path)?;
    let config_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((site_config, config_dir))
}

fn token() -> Option<String> {
    std::env::var(TOKEN_VAR).ok()
}
