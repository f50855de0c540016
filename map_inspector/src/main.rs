use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use map_core::{
    load_viewer_config, load_viewer_config_from_env, HttpFeedSource, MapService, ViewerCommand,
};
use tokio::sync::mpsc::unbounded_channel;
use tracing::info;

mod app;
mod surface;
mod ui;

use app::InspectorApp;
use surface::{TerminalMap, TerminalPanel, ViewSnapshot};

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal viewer for the shared location map", long_about = None)]
struct Cli {
    /// Viewer configuration JSON. Overrides SHARED_MAP_CONFIG_PATH.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (log_tx, log_rx) = mpsc::channel::<String>();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_tx.clone(),
        })
        .init();

    let cli = Cli::parse();
    let (config, config_source) = match cli.config.as_deref() {
        Some(path) => load_viewer_config(Some(path)),
        None => load_viewer_config_from_env(),
    };
    info!(source = ?config_source, "Viewer configuration loaded");

    let feed = HttpFeedSource::new(&config.feed)?;
    let (command_tx, command_rx) = unbounded_channel::<ViewerCommand>();
    let (frame_tx, frame_rx) = mpsc::channel::<ViewSnapshot>();

    let ui_handle = std::thread::spawn(move || -> Result<()> {
        let app = InspectorApp::new(frame_rx, command_tx, log_rx)?;
        app.run()
    });

    let mut service = MapService::new(
        &config,
        feed,
        TerminalMap::default(),
        TerminalPanel::default(),
    );
    service
        .run(command_rx, |state, sync| {
            let _ = frame_tx.send(ViewSnapshot::capture(state, sync));
        })
        .await;

    match ui_handle.join() {
        Ok(result) => result,
        Err(_) => Err(eyre!("terminal UI thread panicked")),
    }
}
