use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use sprite_animator::engine::assets::{SheetStore, SlicePolicy, SpriteSheet};
use sprite_animator::engine::debug::{describe_grid, FrameGridOverlay};
use sprite_animator::game::characters::CharacterConfig;
use std::path::{Path, PathBuf};

/// Sprite sheet inspection and animation playback
#[derive(Parser)]
#[command(version, about = "Inspect sprite sheets and dry-run character animations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a copy of a sheet with frame outlines and 1-based frame numbers
    Grid {
        /// Sprite sheet image
        sheet: PathBuf,
        #[arg(long, value_name = "PIXELS")]
        frame_width: u32,
        #[arg(long, value_name = "PIXELS")]
        frame_height: u32,
        /// Ignore partial frames at the right and bottom edges
        #[arg(long)]
        truncate: bool,
        /// Output image (default: <sheet>_grid.png next to the sheet)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Build a character from a JSON definition and print one line per tick
    Simulate {
        /// Character definition; sheet paths are relative to its directory
        config: PathBuf,
        /// Clip to play (default: the definition's `play` clip)
        #[arg(long)]
        clip: Option<String>,
        #[arg(long, default_value_t = 60)]
        ticks: u32,
        /// Horizontal movement applied before every tick
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dx: f32,
    },
}

fn default_grid_path(sheet: &Path) -> PathBuf {
    let stem = sheet
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    sheet.with_file_name(format!("{}_grid.png", stem))
}

fn grid(
    sheet_path: &Path,
    frame_width: u32,
    frame_height: u32,
    truncate: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let policy = if truncate {
        SlicePolicy::Truncate
    } else {
        SlicePolicy::Strict
    };
    let sheet = SpriteSheet::open(sheet_path, frame_width, frame_height, policy)?;

    let canvas = FrameGridOverlay::for_sheet(&sheet).render(&sheet);
    let out = out.unwrap_or_else(|| default_grid_path(sheet_path));
    canvas
        .save(&out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!("Frame grid written to {}", out.display());

    println!("{}", describe_grid(sheet.frames()));
    Ok(())
}

fn simulate(config_path: &Path, clip: Option<String>, ticks: u32, dx: f32) -> Result<()> {
    let config = CharacterConfig::load(config_path)?;
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let mut store = SheetStore::new(base, false);
    let mut character = config.build(&mut store)?;

    if let Some(name) = clip {
        character.play(&name)?;
    }
    anyhow::ensure!(
        character.current_animation().is_some(),
        "Nothing to play: pass --clip or set `play` in {}",
        config_path.display()
    );

    for tick in 1..=ticks {
        if dx != 0.0 {
            character.move_by(dx, 0.0);
        }
        character.update();

        println!(
            "{:>5}  {:<16} frame {:>3}  {:<5}  {:?}",
            tick,
            character.current_animation().unwrap_or("-"),
            character.current_frame().unwrap_or(0),
            character.facing().suffix(),
            character.status(),
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Grid {
            sheet,
            frame_width,
            frame_height,
            truncate,
            out,
        } => grid(&sheet, frame_width, frame_height, truncate, out),
        Command::Simulate {
            config,
            clip,
            ticks,
            dx,
        } => simulate(&config, clip, ticks, dx),
    }
}
