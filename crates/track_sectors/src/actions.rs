//! User actions from the settings and timing windows
//!
//! Edits that reshape the layout or wipe times need the car in the pit area
//! during live driving; checkpoint placement needs it out on track. A refused
//! action flashes its widget and leaves every piece of state untouched.

use contracts::{Checkpoint, Color, SimHost, TelemetrySnapshot, TimeSlot, UiLayout, Widget};
use feedback::Cue;
use lap_engine::EnginePhase;
use tracing::{debug, info};

use crate::app::TrackSectors;
use crate::error::{PluginError, Result};
use crate::render;

/// Where the car must be for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Live,
    LiveInPits,
    LiveOnTrack,
}

impl Gate {
    fn check(self, action: &'static str, snapshot: &TelemetrySnapshot) -> Result<()> {
        if !snapshot.is_live {
            return Err(PluginError::action_rejected(action, "session is not live"));
        }
        match self {
            Gate::LiveInPits if !snapshot.in_pit_area() => Err(PluginError::action_rejected(
                action,
                "car must be in the pit area",
            )),
            Gate::LiveOnTrack if snapshot.in_pit_area() => Err(PluginError::action_rejected(
                action,
                "car must be out on track",
            )),
            _ => Ok(()),
        }
    }
}

impl<H: SimHost> TrackSectors<H> {
    /// Place the checkpoint of sector `index` where the car is now
    pub fn press_sector_button(&mut self, index: usize) -> Result<Checkpoint> {
        const ACTION: &str = "checkpoint placement";
        let widget = Widget::SectorButton(index);
        let snapshot = self.action_snapshot()?;

        let placed = Gate::LiveOnTrack
            .check(ACTION, &snapshot)
            .and_then(|()| {
                self.timer
                    .place_checkpoint(index, snapshot.spline_position)
                    .map_err(PluginError::from)
            });

        match placed {
            Ok(checkpoint) => {
                self.surface.set_color(widget, Color::GREEN);
                self.changes.structure_changed = true;
                info!(
                    sector = index + 1,
                    position = snapshot.spline_position,
                    "Checkpoint placed"
                );
                if self.timer.ledger().is_configured() {
                    info!(sectors = self.timer.ledger().sector_count(), "Layout configured");
                }
                Ok(checkpoint)
            }
            Err(e) => {
                let settle = self
                    .timer
                    .ledger()
                    .checkpoint(index)
                    .map_or(Color::WHITE, render::button_color);
                Err(self.reject(widget, settle, e))
            }
        }
    }

    /// Let the last sector end on the finish line
    pub fn set_finish_line_as_last(&mut self) -> Result<()> {
        const ACTION: &str = "finish line as last sector";
        let snapshot = self.action_snapshot()?;

        let result = Gate::Live
            .check(ACTION, &snapshot)
            .and_then(|()| self.timer.set_finish_line_as_last().map_err(PluginError::from));

        let last = self.timer.ledger().sector_count() - 1;
        match result {
            Ok(()) => {
                self.surface.set_color(Widget::SectorButton(last), Color::GREEN);
                self.surface.set_color(Widget::FinishLineButton, Color::GREEN);
                self.changes.structure_changed = true;
                info!(sector = last + 1, "Last sector ends on the finish line");
                Ok(())
            }
            Err(e) => {
                let settle = match self.timer.ledger().checkpoint(last) {
                    Some(Checkpoint::FinishLine) => Color::GREEN,
                    _ => Color::WHITE,
                };
                Err(self.reject(Widget::FinishLineButton, settle, e))
            }
        }
    }

    /// Unset every checkpoint; times are kept
    pub fn reset_checkpoints(&mut self) -> Result<()> {
        const ACTION: &str = "checkpoint reset";
        let snapshot = self.action_snapshot()?;
        if let Err(e) = Gate::LiveInPits.check(ACTION, &snapshot) {
            return Err(self.reject(Widget::ResetCheckpointsButton, Color::WHITE, e));
        }

        self.timer.reset_checkpoints();
        self.changes.structure_changed = true;
        self.redraw_layout();
        info!("Checkpoints reset");
        Ok(())
    }

    /// Forget every recorded time of this car on this layout
    pub fn reset_times(&mut self) -> Result<()> {
        const ACTION: &str = "time reset";
        let snapshot = self.action_snapshot()?;
        if let Err(e) = Gate::LiveInPits.check(ACTION, &snapshot) {
            return Err(self.reject(Widget::ResetTimesButton, Color::WHITE, e));
        }

        self.timer.reset_times();
        self.changes.times_reset = true;
        self.changes.times_recorded = false;
        let surface = self.surface.as_ref();
        render::render_rows(surface, self.timer.ledger());
        render::clear_totals(surface);
        info!("Times reset");
        Ok(())
    }

    /// Change the number of sectors, discarding the layout and times
    ///
    /// A refused change puts the spinner back on the current count.
    pub fn set_sector_count(&mut self, count: usize) -> Result<()> {
        const ACTION: &str = "sector count change";
        let current = self.timer.ledger().sector_count();
        let snapshot = self.action_snapshot()?;
        let max = self.settings.settings().settings_app.max_sector_number;

        let resized = Gate::LiveInPits
            .check(ACTION, &snapshot)
            .and_then(|()| self.timer.resize(count, max).map_err(PluginError::from));
        if let Err(e) = resized {
            self.surface
                .set_value(Widget::SectorCountSpinner, current as f64);
            debug!(error = %e, requested = count, "Sector count unchanged");
            return Err(e);
        }

        for index in count..current {
            hide_sector(self.surface.as_ref(), index);
        }
        self.pager.set_sector_count(count);
        self.changes.structure_changed = true;
        self.redraw_layout();
        info!(from = current, to = count, "Sector count changed");
        Ok(())
    }

    /// Show timing page `page`; returns the page actually shown
    pub fn set_page(&self, page: usize) -> usize {
        let shown = self.pager.set_page(page);
        self.pager.render(self.surface.as_ref());
        shown
    }

    /// Switch between the full and compact timing rows
    pub fn toggle_layout(&mut self) -> Result<UiLayout> {
        let layout = self.settings.settings().main_app.layout().toggled();
        self.settings
            .update(|settings| settings.main_app.ui_layout = layout.code())?;
        self.pager.set_layout(layout);
        self.pager.render(self.surface.as_ref());
        debug!(?layout, "Timing layout changed");
        Ok(layout)
    }

    pub fn set_main_window_scale(&mut self, scale: f64) -> Result<()> {
        self.settings
            .update(|settings| settings.main_app.main_window_scale = scale)?;
        Ok(())
    }

    pub fn set_settings_window_scale(&mut self, scale: f64) -> Result<()> {
        self.settings
            .update(|settings| settings.settings_app.settings_window_scale = scale)?;
        Ok(())
    }

    pub fn set_main_opacity(&mut self, percent: u8) -> Result<()> {
        self.settings
            .update(|settings| settings.main_app.opacity_level = percent)?;
        Ok(())
    }

    pub fn set_settings_opacity(&mut self, percent: u8) -> Result<()> {
        self.settings
            .update(|settings| settings.settings_app.opacity_level = percent)?;
        Ok(())
    }

    /// Show or hide the lap total and theoretical best
    pub fn set_theoretical_best(&mut self, enabled: bool) -> Result<()> {
        self.settings
            .update(|settings| settings.main_app.theoretical_best = enabled)?;
        render::set_totals_visible(self.surface.as_ref(), enabled);
        Ok(())
    }

    pub fn set_new_best_sfx(&mut self, enabled: bool) -> Result<()> {
        self.settings
            .update(|settings| settings.settings_app.new_best_sfx = enabled)?;
        Ok(())
    }

    /// Seconds before the timing window flips to the next page
    pub fn set_next_page_delay(&mut self, seconds: u64) -> Result<()> {
        self.settings
            .update(|settings| settings.settings_app.next_page_delay = seconds)?;
        Ok(())
    }

    /// Telemetry of the latest tick, once timing is running
    fn action_snapshot(&self) -> Result<TelemetrySnapshot> {
        match self.timer.phase() {
            EnginePhase::Uninitialized => Err(PluginError::NotInitialized),
            EnginePhase::Disabled(reason) => Err(PluginError::Disabled(reason)),
            _ => self.latest.clone().ok_or(PluginError::NotInitialized),
        }
    }

    fn reject(&self, widget: Widget, settle: Color, error: PluginError) -> PluginError {
        debug!(?widget, error = %error, "Action rejected");
        self.send_cue(Cue::Flash { widget, settle });
        error
    }

    fn redraw_layout(&self) {
        let surface = self.surface.as_ref();
        let ledger = self.timer.ledger();
        render::render_buttons(surface, ledger);
        render::render_rows(surface, ledger);
        render::clear_totals(surface);
        self.pager.reset();
        self.pager.render(surface);
    }
}

fn hide_sector(surface: &dyn contracts::OverlaySurface, index: usize) {
    surface.set_visible(Widget::SectorButton(index), false);
    surface.set_visible(Widget::SectorLabel(index), false);
    for slot in TimeSlot::ALL {
        surface.set_visible(Widget::SectorTime(slot, index), false);
    }
}
