//! Mock Session Example
//!
//! Drives the sector timing plugin through a scripted session with a
//! recording overlay and sound player. No simulator required.
//!
//! Run with: cargo run -p track_sectors_demos --bin mock_session [plugin_root]
//!
//! Without `plugin_root` the session runs in a temporary directory; with it,
//! the layout and bests persist between runs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{HostEnvironment, TelemetrySnapshot, TimeSlot, Widget};
use observability::{LogFormat, ObservabilityConfig};
use sim_host::{FrameBuilder, RecordingPlayer, RecordingSurface, ScriptedHost};
use track_sectors::{PluginPaths, TrackSectors};

/// Simulation step in seconds
const TICK: f64 = 1.0 / 60.0;

/// Steady lap pace used for every scripted frame
const LAP_MS: u64 = 84_000;

fn main() -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        default_log_level: "info".to_string(),
    })?;

    tracing::info!("Starting Mock Session Demo");

    // ==== Stage 1: Plugin root ====
    let temp;
    let root = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            temp = tempfile::tempdir().context("Failed to create plugin root")?;
            temp.path().to_path_buf()
        }
    };
    tracing::info!(root = %root.display(), "Plugin root");

    // ==== Stage 2: Load the plugin ====
    let host = Arc::new(ScriptedHost::new(HostEnvironment {
        track_name: "magione".to_string(),
        track_layout: String::new(),
        car_name: "tatuusfa1".to_string(),
        has_ai_line: true,
        extension_version: 2144,
    }));
    let surface = Arc::new(RecordingSurface::new());
    let player = Arc::new(RecordingPlayer::new());
    let mut plugin = TrackSectors::new(
        PluginPaths::new(&root),
        Arc::clone(&host),
        surface.clone(),
        Arc::clone(&player),
    )?;

    // ==== Stage 3: Lay out the track if this root has no layout yet ====
    host.push_frame(FrameBuilder::in_pit_box(0.95).build());
    plugin.update(TICK);

    if !plugin.ledger().is_configured() {
        tracing::info!("No stored layout, placing four sectors on an out lap");
        plugin.set_sector_count(4)?;
        for (index, hundredths) in [(0, 22), (1, 47), (2, 71)] {
            host.push_frame(frame(0, hundredths));
            plugin.update(TICK);
            plugin.press_sector_button(index)?;
        }
        plugin.set_finish_line_as_last()?;

        host.push_frame(FrameBuilder::in_pit_box(0.95).build());
        plugin.update(TICK);
    }

    // ==== Stage 4: Two timed laps ====
    for lap in 0..2u32 {
        for hundredths in 1..=99 {
            host.push_frame(frame(lap, hundredths));
            plugin.update(TICK);
        }
        host.push_frame(
            FrameBuilder::from(frame(lap + 1, 1))
                .last_lap_ms(LAP_MS - lap as u64 * 1_500)
                .build(),
        );
        plugin.update(TICK);

        tracing::info!(
            lap = lap + 1,
            total = %surface.text(Widget::TotalTime).unwrap_or_default(),
            theoretical_best = %surface.text(Widget::TheoreticalBest).unwrap_or_default(),
            "Lap done"
        );
    }

    for index in 0..plugin.ledger().sector_count() {
        tracing::info!(
            sector = index + 1,
            last = %surface
                .text(Widget::SectorTime(TimeSlot::Last, index))
                .unwrap_or_default(),
            best = %surface
                .text(Widget::SectorTime(TimeSlot::Best, index))
                .unwrap_or_default(),
            "Sector"
        );
    }

    // ==== Stage 5: Shutdown ====
    let report = plugin.shutdown();
    tracing::info!(
        store_saved = report.store_saved,
        settings_saved = report.settings_saved,
        cues_completed = report.cues.completed,
        sounds = player.play_count(),
        "Session closed"
    );
    println!("{}", report.summary);

    Ok(())
}

/// Frame at `hundredths / 100` of lap `lap`; each lap runs 1.5 s quicker
fn frame(lap: u32, hundredths: u32) -> TelemetrySnapshot {
    let pace = LAP_MS - lap as u64 * 1_500;
    FrameBuilder::on_track(hundredths as f64 / 100.0)
        .lap(lap)
        .lap_time_ms(pace * hundredths as u64 / 100)
        .build()
}
