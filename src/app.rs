use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use url::Url;

use beerlist::beer::{BeerImageDataLoader, BeerListLoader};
use beerlist::cache::SqliteImageDataStore;
use beerlist::compose::{self, ComposedImageLoader, ComposedListLoader, MainLoop, MainQueue};
use beerlist::config::Config;
use beerlist::http::ReqwestHttpClient;
use beerlist::presentation::BeerViewModel;
use beerlist::task::LoaderTask;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Fetch and print the beer list
  List,
  /// Load one image, from the cache when possible
  Image {
    url: Url,
    /// Write the bytes here instead of only reporting their size
    #[arg(short, long)]
    out: Option<PathBuf>,
  },
  /// Inspect or empty the image cache
  Cache {
    #[command(subcommand)]
    action: CacheCommand,
  },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
  /// Show stored images, most recent first
  List,
  /// Remove every stored image
  Clear,
}

/// Set once by whichever callback finishes the command.
type Outcome = Arc<Mutex<Option<Result<()>>>>;

pub struct App {
  list_loader: ComposedListLoader<ReqwestHttpClient>,
  image_loader: ComposedImageLoader<ReqwestHttpClient, Arc<SqliteImageDataStore>>,
  store: Arc<SqliteImageDataStore>,
  queue: MainQueue,
}

impl App {
  pub fn new(config: &Config, runtime: Handle, queue: MainQueue) -> Result<Self> {
    let client = ReqwestHttpClient::new(&config.api, runtime)?;
    let store = Arc::new(SqliteImageDataStore::open(
      &config.cache.resolved_path()?,
      config.cache.discipline,
    )?);

    Ok(Self {
      list_loader: compose::list_loader(config.api.endpoint()?, client.clone(), queue.clone()),
      image_loader: compose::image_loader(client, store.clone(), queue.clone()),
      store,
      queue,
    })
  }

  /// Start `command` and drive the main loop until it finishes.
  pub fn run(self, command: Command, main_loop: MainLoop) -> Result<()> {
    let outcome: Outcome = Arc::new(Mutex::new(None));

    tracing::info!(?command, "Running command");
    let _task = self.start(command, outcome.clone());
    main_loop.run();

    let result = outcome.lock().take();
    result.unwrap_or_else(|| Err(eyre!("Main loop stopped before the command finished")))
  }

  fn start(&self, command: Command, outcome: Outcome) -> Option<Box<dyn LoaderTask>> {
    let finish = self.finisher(outcome);

    match command {
      Command::List => {
        self.list_loader.load(Box::new(move |result| {
          finish(
            result
              .map(|beers| {
                for beer in &beers {
                  println!("{}", BeerViewModel::from(beer).line());
                }
              })
              .map_err(|e| eyre!("Failed to load beers: {}", e)),
          )
        }));
        None
      }
      Command::Image { url, out } => {
        let requested = url.clone();
        let task = self.image_loader.load_image_data(
          &url,
          Box::new(move |result| {
            finish(
              result
                .map_err(|e| eyre!("Failed to load image {}: {}", requested, e))
                .and_then(|data| write_image(&data, out)),
            )
          }),
        );
        Some(task)
      }
      Command::Cache {
        action: CacheCommand::List,
      } => {
        let queue = self.queue.clone();
        self.store.entries(Box::new(move |result| {
          queue.dispatch(move || {
            finish(
              result
                .map(|entries| {
                  for entry in &entries {
                    println!(
                      "{}  {:>8}  {}",
                      entry.cached_at.format("%Y-%m-%d %H:%M:%S"),
                      entry.size,
                      entry.url
                    );
                  }
                })
                .map_err(|e| eyre!("Failed to read image cache: {}", e)),
            )
          })
        }));
        None
      }
      Command::Cache {
        action: CacheCommand::Clear,
      } => {
        let queue = self.queue.clone();
        self.store.clear(Box::new(move |result| {
          queue.dispatch(move || {
            finish(
              result
                .map(|removed| println!("Removed {} cached image(s)", removed))
                .map_err(|e| eyre!("Failed to clear image cache: {}", e)),
            )
          })
        }));
        None
      }
    }
  }

  fn finisher(&self, outcome: Outcome) -> impl FnOnce(Result<()>) + Send + 'static {
    let queue = self.queue.clone();
    move |result| {
      *outcome.lock() = Some(result);
      queue.quit();
    }
  }
}

fn write_image(data: &[u8], out: Option<PathBuf>) -> Result<()> {
  match out {
    Some(path) => {
      std::fs::write(&path, data)
        .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
      println!("Wrote {} bytes to {}", data.len(), path.display());
    }
    None => println!("Loaded {} bytes", data.len()),
  }
  Ok(())
}
