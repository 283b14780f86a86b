// Ready-made clip layouts for common sheet arrangements

use super::character::AnimatedCharacter;
use super::config::CharacterSettings;
use crate::engine::assets::{SheetStore, SlicePolicy};
use anyhow::{Context, Result};
use log::info;

/// Row, frame count, speed and looping for one preset clip
pub type RowClip = (&'static str, u32, u32, u32, bool);

/// Seven-row platformer layout
pub const PLATFORMER_ROWS: [RowClip; 7] = [
    ("idle", 0, 4, 15, true),
    ("walk", 1, 8, 8, true),
    ("run", 2, 8, 5, true),
    ("jump", 3, 4, 6, false),
    ("attack", 4, 6, 4, false),
    ("hit", 5, 3, 8, false),
    ("die", 6, 4, 10, false),
];

/// Three-row layout with looping idle/walk and a one-shot jump
pub const SIMPLE_ROWS: [RowClip; 3] = [
    ("idle", 0, 4, 12, true),
    ("walk", 1, 4, 8, true),
    ("jump", 2, 4, 6, false),
];

/// Name, frame count, speed and looping for clips packed back to back
pub const MASTER_SHEET_CLIPS: [(&str, u32, u32, bool); 3] = [
    ("idle", 4, 15, true),
    ("walk", 8, 8, true),
    ("jump", 4, 6, false),
];

/// Frame count, speed and looping for idle, walk and jump drawn on one
/// sheet file each
pub const SEPARATE_SHEET_CLIPS: [(&str, u32, u32, bool); 3] = [
    ("idle", 4, 15, true),
    ("walk", 4, 8, true),
    ("jump", 4, 6, false),
];

/// Slots per row used by master sheets unless told otherwise
pub const MASTER_SHEET_COLUMNS: u32 = 8;

fn define_rows(character: &mut AnimatedCharacter, rows: &[RowClip]) -> Result<()> {
    for &(name, row, count, speed, looping) in rows {
        character
            .define_row(name, row, count, speed, looping)
            .with_context(|| format!("Preset clip {} does not fit the sheet", name))?;
    }
    Ok(())
}

/// Define the platformer clips on a character whose sheet is already loaded
///
/// Expects one animation per row, at least eight columns wide.
pub fn platformer_hero(character: &mut AnimatedCharacter) -> Result<()> {
    define_rows(character, &PLATFORMER_ROWS)
}

/// Define idle, walk and jump from the first three rows
pub fn simple_character(character: &mut AnimatedCharacter) -> Result<()> {
    define_rows(character, &SIMPLE_ROWS)
}

/// Define idle, walk and jump back to back, `columns` slots per row
pub fn master_sheet_clips(character: &mut AnimatedCharacter, columns: u32) -> Result<()> {
    for (name, count, speed, looping) in MASTER_SHEET_CLIPS {
        character
            .define_sequential_packed(name, count, columns, speed, looping)
            .with_context(|| format!("Master sheet has too few frames for {}", name))?;
    }
    Ok(())
}

/// Build a character whose clips are packed back to back on one sheet
///
/// `columns` is how many slots the clips fill per row before wrapping
/// (usually [`MASTER_SHEET_COLUMNS`]). It may be narrower than the sheet.
pub fn master_sheet_hero(
    store: &mut SheetStore,
    sheet: &str,
    frame_size: u32,
    columns: u32,
    settings: CharacterSettings,
) -> Result<AnimatedCharacter> {
    let mut character = AnimatedCharacter::new(settings)?;
    let loaded = store.load(sheet, frame_size, frame_size, SlicePolicy::Truncate)?;
    character.set_sheet(loaded)?;
    master_sheet_clips(&mut character, columns).with_context(|| format!("In {}", sheet))?;

    info!(
        "Built master sheet character from {} ({} clips)",
        sheet,
        character.clips().len()
    );
    Ok(character)
}

/// Build a character with idle, walk and jump each on a sheet file of its own
pub fn separate_sheets_hero(
    store: &mut SheetStore,
    sheets: [&str; 3],
    frame_size: u32,
    settings: CharacterSettings,
) -> Result<AnimatedCharacter> {
    let mut character = AnimatedCharacter::new(settings)?;

    for ((name, count, speed, looping), path) in SEPARATE_SHEET_CLIPS.into_iter().zip(sheets) {
        let sheet = store.load(path, frame_size, frame_size, SlicePolicy::Truncate)?;
        character
            .define_from_sheet(name, sheet, count, speed, looping)
            .with_context(|| format!("Sheet {} has too few frames for {}", path, name))?;
    }

    info!("Built character from {} separate sheets", sheets.len());
    Ok(character)
}
