//! FruitScan terminal front-end
//!
//! Classifies fruit and vegetable photos and prints nutrition facts for the
//! recognized species. Run with `--image <path>` for a single prediction or
//! without arguments for an interactive prompt.

use clap::Parser;
use dotenv::dotenv;
use fruitscan::InputSource;
use fruitscan::catalog::Catalog;
use fruitscan::model::{
    ClassifierConfig, ModelLoader, ModelProvisioner, Progress, ProvisionEvent, ProvisionerConfig,
};
use fruitscan_types::Result;
use fruitscan_types::sync::Arc;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod command;
mod render;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "fruitscan")]
#[command(version)]
#[command(
    about = "Recognize fruit and vegetables in photos and show their nutrition facts",
    long_about = None
)]
struct Cli {
    /// Classify this image and exit
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Treat --image as a camera capture instead of an upload
    #[arg(long, requires = "image")]
    camera: bool,

    /// Directory for the downloaded model archive, the extracted model and the marker
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Identifier of the model archive on the file host
    #[arg(long)]
    model_id: Option<String>,

    /// Directory checked for a model shipped with the application
    #[arg(long)]
    bundled_dir: Option<PathBuf>,

    /// Square input resolution the model expects
    #[arg(long)]
    input_size: Option<u32>,
}

impl Cli {
    fn provisioner_config(&self) -> Result<ProvisionerConfig> {
        let mut config = ProvisionerConfig::from_env()?;
        if let Some(dir) = &self.cache_dir {
            config.cache_root = dir.clone();
        }
        if let Some(id) = &self.model_id {
            config.remote_id = Some(id.clone());
        }
        if let Some(dir) = &self.bundled_dir {
            config.bundled_dir = Some(dir.clone());
        }
        Ok(config)
    }

    fn classifier_config(&self) -> Result<ClassifierConfig> {
        let mut config = ClassifierConfig::from_env()?;
        if let Some(size) = self.input_size {
            if size == 0 {
                fruitscan_types::bail!("--input-size must be positive");
            }
            config.input_size = size;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let catalog = Catalog::builtin()?;
    let provisioner_config = cli.provisioner_config()?;
    tracing::debug!("Provisioner configuration: {:?}", provisioner_config);

    let progress = Progress::new(Arc::new(|event: ProvisionEvent| {
        eprintln!("{}", render::progress(&event))
    }));
    let provisioner = ModelProvisioner::new(provisioner_config).with_progress(progress);
    let loader = ModelLoader::new(provisioner, cli.classifier_config()?)
        .with_expected_classes(catalog.num_classes());

    let mut app = App::new(loader, catalog);

    if let Some(path) = &cli.image {
        let source = if cli.camera {
            InputSource::Camera
        } else {
            InputSource::Upload
        };
        return Ok(if app.submit(path, source).await {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    println!("FruitScan. Type `help` for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match command::parse(&line) {
            Ok(Some(command)) => {
                if let ControlFlow::Break(()) = app.handle(command).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => println!("{message}"),
        }
    }
    Ok(ExitCode::SUCCESS)
}
