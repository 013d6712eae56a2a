//! Video Wall - animated multi-display wall of local videos and HLS streams
//!
//! Main entry point for the application.

mod animate;
mod app;
mod config;
mod display;
mod layout;
mod player;
mod source;
mod stream;
mod ui;
mod wall;

use std::path::PathBuf;

use clap::Parser;

use app::VideoWallApp;
use config::WallSettings;
use source::{Source, SourceCatalog};

/// Animated multi-monitor wall of local videos and HLS streams.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Settings file; defaults apply when it does not exist
    #[arg(long, default_value = "videowall.json")]
    config: PathBuf,

    /// Stream list file, one M3U8 URL per line
    #[arg(long)]
    streams: Option<PathBuf>,

    /// Directory scanned recursively for local videos
    #[arg(long)]
    videos: Option<PathBuf>,

    /// Run in a single scaled window instead of fullscreen viewports
    #[arg(long)]
    windowed: bool,

    /// Never open the folder picker when --videos is missing
    #[arg(long)]
    no_dialog: bool,
}

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Starting Video Wall v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let settings = match WallSettings::load_or_default(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Invalid settings in {}: {:#}", args.config.display(), e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Wall settings: {}x{} grid, {}ms transitions, {} player(s) max",
        settings.grid_rows,
        settings.grid_cols,
        settings.animation_duration_ms,
        settings.max_active_players
    );

    let catalog = SourceCatalog::new(gather_sources(&args));
    if catalog.is_empty() {
        log::warn!("No playable sources; tiles will sit idle until a refresh");
    }

    let displays = display::enumerate_displays();
    let primary = displays.iter().find(|d| d.primary).cloned();

    // Configure native options; the main window covers the primary
    // display, extra displays get their own viewports at runtime
    let mut viewport = egui::ViewportBuilder::default()
        .with_title("Video Wall")
        .with_inner_size([1280.0, 720.0])
        .with_min_inner_size([640.0, 360.0]);
    if !args.windowed {
        if let Some(primary) = &primary {
            viewport = viewport
                .with_position([primary.x as f32, primary.y as f32])
                .with_inner_size([primary.width as f32, primary.height as f32])
                .with_decorations(false);
        }
        if settings.start_fullscreen {
            viewport = viewport.with_fullscreen(true);
        }
    }
    let native_options = eframe::NativeOptions {
        viewport,
        vsync: true,
        multisampling: 0,
        ..Default::default()
    };

    // Run the app
    let windowed = args.windowed;
    eframe::run_native(
        "Video Wall",
        native_options,
        Box::new(move |cc| Box::new(VideoWallApp::new(cc, settings, catalog, displays, windowed))),
    )
}

/// Collect every playable source named on the command line: the stream
/// list first, then a recursive scan of the video directory. Without
/// `--videos` a folder picker offers a directory unless `--no-dialog`.
fn gather_sources(args: &Args) -> Vec<Source> {
    let mut sources = Vec::new();

    if let Some(path) = &args.streams {
        match source::load_stream_list(path) {
            Ok(urls) => {
                log::info!("Loaded {} stream URL(s) from {}", urls.len(), path.display());
                sources.extend(urls.into_iter().map(Source::stream));
            }
            Err(e) => log::error!("Failed to read stream list: {}", e),
        }
    }

    let video_dir = args.videos.clone().or_else(|| {
        if args.no_dialog {
            None
        } else {
            rfd::FileDialog::new()
                .set_title("Choose a folder of videos")
                .pick_folder()
        }
    });
    if let Some(dir) = video_dir {
        let files = source::scan_video_files(&dir);
        log::info!("Found {} video file(s) under {}", files.len(), dir.display());
        sources.extend(
            files
                .into_iter()
                .map(|p| Source::local(p.to_string_lossy().into_owned())),
        );
    }

    sources
}
