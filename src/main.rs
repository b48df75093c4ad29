// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! YAME - Main Entry Point
//!
//! Yet another Markdown editor: spell-checked editing, a live HTML preview
//! rendered by an external converter, and a heading outline. Built with Rust
//! and egui.

mod app;
mod commands;
mod config;
mod editor;
mod error;
mod export;
mod files;
mod preview;
mod spell;
mod state;
mod string_utils;
mod ui;

use app::YameApp;
use config::{get_dictionaries_dir, load_config, Settings};
use log::{error, info, warn};
use preview::{Converter, PreviewWorker};
use spell::{system_dictionary_dirs, HunspellProvider};
use state::{AppState, APP_NAME};
use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let settings = load_config();

    // A converter is required; refuse to start without one.
    let converter = match Converter::from_settings(&settings.converter) {
        Ok(converter) => converter,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}: {}", APP_NAME, e);
            eprintln!(
                "Config file: {}",
                config::get_config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            );
            std::process::exit(1);
        }
    };
    info!("Markdown converter: {}", converter.program());

    let provider = dictionary_provider(&settings);
    let startup_file = std::env::args_os().nth(1).map(PathBuf::from);

    let window_size = settings.window_size.clone();
    info!(
        "Window configuration: {}x{}, maximized: {}",
        window_size.width, window_size.height, window_size.maximized
    );

    let mut state = AppState::new(settings, converter.clone(), Box::new(provider));
    if let Some(path) = startup_file {
        info!("Opening {} from the command line", path.display());
        if let Err(e) = state.open(&path) {
            warn!("Failed to open {}: {}", path.display(), e);
            state.show_error(format!("Failed to open file:\n{}", e));
        }
    }

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([400.0, 300.0])
        .with_maximized(window_size.maximized);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            match PreviewWorker::spawn(converter, Box::new(move || ctx.request_repaint())) {
                Ok(worker) => state.attach_preview_worker(worker),
                Err(e) => {
                    warn!("Preview disabled: {}", e);
                    state.ui.status_message = Some(format!("Preview unavailable: {}", e));
                }
            }
            Ok(Box::new(YameApp::new(cc, state)))
        }),
    )
}

/// Dictionary provider searching the configured directories, then the
/// per-user dictionaries directory, then the system locations.
fn dictionary_provider(settings: &Settings) -> HunspellProvider {
    let mut search_dirs = settings.dictionary_dirs.clone();
    match get_dictionaries_dir() {
        Ok(dir) => search_dirs.push(dir),
        Err(e) => warn!("No user dictionaries directory: {}", e),
    }
    search_dirs.extend(system_dictionary_dirs());

    let provider =
        HunspellProvider::new(search_dirs).with_personal_words(settings.personal_words.clone());
    info!("Dictionary search path: {:?}", provider.search_dirs());
    provider
}
