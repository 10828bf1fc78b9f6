mod api;
mod app;
mod config;
mod event;
mod items_query;
mod logging;
mod query;
mod ui;

use api::{ApiClient, CreateItemRequest, ItemsService};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "items-dash")]
#[command(about = "A terminal dashboard for browsing and creating items")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./items-dash.yaml, then $XDG_CONFIG_HOME/items-dash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the items API, overriding config and ITEMS_DASH_API_URL
  #[arg(long)]
  api_url: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the item list as JSON
  List,
  /// Print one item as JSON
  Get {
    /// Item id
    id: String,
  },
  /// Create an item and print it as JSON
  Create {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    description: Option<String>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration; the flag beats the environment
  let config = config::Config::load(args.config.as_deref())?.with_api_url(args.api_url);

  let Some(command) = args.command else {
    let _guard = logging::init_file_logging()?;
    config.log_source();
    let mut app = app::App::new(&config)?;
    return app.run().await;
  };

  logging::init_stderr_logging()?;
  config.log_source();
  let service = ItemsService::new(ApiClient::new(&config)?);
  match command {
    Command::List => print_json(&service.list().await?),
    Command::Get { id } => print_json(&service.get_by_id(&id).await?),
    Command::Create { name, description } => {
      let request = CreateItemRequest { name, description };
      print_json(&service.create(&request).await?)
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
