use clap::{Parser, Subcommand};
use pagewright::config::{self, BuildConfig};
use pagewright::decode::DataLoader;
use pagewright::engine::TeraEngine;
use pagewright::{files, output, render};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Path overrides shared by commands that read the site.
#[derive(clap::Args, Clone)]
struct PathArgs {
    /// Directory scanned for page data (overrides config)
    #[arg(long)]
    origin: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long)]
    destination: Option<PathBuf>,

    /// Template directory (overrides config)
    #[arg(long)]
    templates: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "pagewright")]
#[command(about = "Render static pages from data files and templates")]
#[command(long_about = "\
Render static pages from data files and templates

Every data file under the origin that names a template becomes a page at
the same relative path under the destination:

  data/                            public/
  ├── index.yml                    ├── index.html
  │     template: home.html        │
  ├── blog/                        └── blog/
  │   └── first.json                   └── first.html
  │         {\"template\": \"post.html\"}
  └── shared/menu.yml              (no template: skipped)

Templates are Tera templates. Inside one, get_data(path=\"shared/menu.yml\")
returns another data file's contents.

Run 'pagewright gen-config' to generate a documented pagewright.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log progress at info level (otherwise RUST_LOG, default warn)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every page, then the standalone files
    Render(PathArgs),
    /// List what would be rendered without writing anything
    Check(PathArgs),
    /// Print a stock pagewright.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render(paths) => {
            let config = load_config(&cli.config, paths)?;
            let loader = Arc::new(DataLoader::new(&config.origin, config.decoder_registry()));
            let engine = Arc::new(TeraEngine::load(&config.templates, Arc::clone(&loader))?);

            println!("==> Rendering {} → {}", config.origin.display(), config.destination.display());
            let mut renderer = render::PageRenderer::new(
                Arc::clone(&loader),
                &config.destination,
                Box::new(Arc::clone(&engine)),
            )
            .suffix_rules(config.compile_suffix_rules()?);
            let report = renderer.run()?;

            let written = files::render_files(engine.as_ref(), &loader, &config.files)?;
            output::print_render_output(&report, &written, &config.origin, &config.destination);
        }
        Command::Check(paths) => {
            let config = load_config(&cli.config, paths)?;
            let loader = Arc::new(DataLoader::new(&config.origin, config.decoder_registry()));
            let engine = TeraEngine::load(&config.templates, Arc::clone(&loader))?;

            println!("==> Checking {}", config.origin.display());
            let renderer = render::PageRenderer::new(loader, &config.destination, Box::new(engine))
                .suffix_rules(config.compile_suffix_rules()?);
            let plan = renderer.plan()?;
            output::print_check_output(&plan, &config.origin, &config.destination);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the tracing subscriber. Logs go to stderr; results go to stdout.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file with command-line overrides applied.
fn load_config(path: &Path, paths: PathArgs) -> Result<BuildConfig, config::ConfigError> {
    config::load_config_with(
        path,
        config::ConfigOverrides {
            origin: paths.origin,
            destination: paths.destination,
            templates: paths.templates,
        },
    )
}
