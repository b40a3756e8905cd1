//! Mapping of ledger state onto overlay widgets
//!
//! The timing window has one column per sector (caption, last, best, delta)
//! plus the lap total and theoretical best. The settings window has one
//! placement button per sector.

use contracts::{Checkpoint, Color, OverlaySurface, SectorCrossing, TimeSlot, Widget};
use lap_engine::{format_delta, format_time, round_ms, SectorLedger, UNSET_TIME};

/// Caption of sector `index`
pub fn sector_caption(index: usize) -> String {
    format!("Sector {}", index + 1)
}

/// Rebuild every timing column from the ledger
///
/// The first sector is highlighted as the one being driven.
pub fn render_rows(surface: &dyn OverlaySurface, ledger: &SectorLedger) {
    for index in 0..ledger.sector_count() {
        surface.set_text(Widget::SectorLabel(index), &sector_caption(index));
        for slot in [TimeSlot::Last, TimeSlot::Best] {
            surface.set_text(
                Widget::SectorTime(slot, index),
                &format_time(ledger.time(slot, index)),
            );
        }
        let delta = Widget::SectorTime(TimeSlot::Delta, index);
        surface.set_text(delta, &delta_text(ledger.time(TimeSlot::Delta, index)));
        surface.set_color(delta, Color::WHITE);
    }
    highlight_sector(surface, ledger.sector_count(), 0);
}

/// Orange on the last-time cell of `current`, white on the others
pub fn highlight_sector(surface: &dyn OverlaySurface, sector_count: usize, current: usize) {
    for index in 0..sector_count {
        let color = if index == current {
            Color::ORANGE
        } else {
            Color::WHITE
        };
        surface.set_color(Widget::SectorTime(TimeSlot::Last, index), color);
    }
}

/// Show a freshly closed sector
pub fn render_crossing(
    surface: &dyn OverlaySurface,
    ledger: &SectorLedger,
    crossing: &SectorCrossing,
) {
    let index = crossing.index;
    let count = ledger.sector_count();

    let last = Widget::SectorTime(TimeSlot::Last, index);
    surface.set_text(last, &format_time(Some(crossing.split)));
    surface.set_color(last, Color::WHITE);
    let next = if index + 1 >= count { 0 } else { index + 1 };
    surface.set_color(Widget::SectorTime(TimeSlot::Last, next), Color::ORANGE);

    surface.set_text(
        Widget::SectorTime(TimeSlot::Best, index),
        &format_time(ledger.time(TimeSlot::Best, index)),
    );

    if let Some(delta) = crossing.delta {
        let widget = Widget::SectorTime(TimeSlot::Delta, index);
        surface.set_text(widget, &format_delta(delta));
        let color = if crossing.outcome.is_new_best() {
            Color::GREEN
        } else {
            Color::RED
        };
        surface.set_color(widget, color);
    }

    if crossing.outcome.is_new_best() {
        surface.set_text(
            Widget::TheoreticalBest,
            &format_time(ledger.theoretical_best()),
        );
    }
    if index + 1 == count {
        render_totals(surface, ledger);
    }
}

/// Lap total and theoretical best after the last sector closed
///
/// Reads the last-time row directly: the lap commit may already have
/// cleared the per-lap flags by the time the tick is rendered.
pub fn render_totals(surface: &dyn OverlaySurface, ledger: &SectorLedger) {
    let total = ledger
        .times(TimeSlot::Last)
        .iter()
        .copied()
        .sum::<Option<f64>>()
        .map(round_ms);
    surface.set_text(Widget::TotalTime, &format_time(total));
    surface.set_text(
        Widget::TheoreticalBest,
        &format_time(ledger.theoretical_best()),
    );
}

pub fn clear_totals(surface: &dyn OverlaySurface) {
    surface.set_text(Widget::TotalTime, UNSET_TIME);
    surface.set_text(Widget::TheoreticalBest, UNSET_TIME);
}

pub fn set_totals_visible(surface: &dyn OverlaySurface, visible: bool) {
    surface.set_visible(Widget::TotalTime, visible);
    surface.set_visible(Widget::TheoreticalBest, visible);
}

/// Settings window: placed checkpoints green, open ones white
pub fn render_buttons(surface: &dyn OverlaySurface, ledger: &SectorLedger) {
    let count = ledger.sector_count();
    for (index, checkpoint) in ledger.checkpoints().iter().enumerate() {
        let widget = Widget::SectorButton(index);
        surface.set_text(widget, &sector_caption(index));
        surface.set_color(widget, button_color(*checkpoint));
    }
    let finish = ledger
        .checkpoint(count.saturating_sub(1))
        .filter(|checkpoint| *checkpoint == Checkpoint::FinishLine)
        .map_or(Color::WHITE, |_| Color::GREEN);
    surface.set_color(Widget::FinishLineButton, finish);
    surface.set_value(Widget::SectorCountSpinner, count as f64);
}

/// Color a placement button settles on
pub fn button_color(checkpoint: Checkpoint) -> Color {
    if checkpoint.is_set() {
        Color::GREEN
    } else {
        Color::WHITE
    }
}

fn delta_text(delta: Option<f64>) -> String {
    delta.map_or_else(|| UNSET_TIME.to_string(), format_delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_host::RecordingSurface;

    fn configured() -> SectorLedger {
        SectorLedger::from_checkpoints(vec![
            Checkpoint::At(0.3),
            Checkpoint::At(0.6),
            Checkpoint::FinishLine,
        ])
        .unwrap()
    }

    #[test]
    fn test_rows_start_unset_with_first_sector_highlighted() {
        let surface = RecordingSurface::new();
        render_rows(&surface, &configured());

        assert_eq!(
            surface.text(Widget::SectorLabel(2)).as_deref(),
            Some("Sector 3")
        );
        assert_eq!(
            surface.text(Widget::SectorTime(TimeSlot::Best, 1)).as_deref(),
            Some(UNSET_TIME)
        );
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Last, 0)),
            Some(Color::ORANGE)
        );
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Last, 1)),
            Some(Color::WHITE)
        );
    }

    #[test]
    fn test_crossing_moves_highlight_and_colors_delta() {
        let surface = RecordingSurface::new();
        let mut ledger = configured();
        ledger.load_best_times(&[Some(21.0), None, None]);
        render_rows(&surface, &ledger);

        let faster = ledger.record_crossing(0, 20.5).unwrap();
        render_crossing(&surface, &ledger, &faster);

        assert_eq!(
            surface.text(Widget::SectorTime(TimeSlot::Last, 0)).as_deref(),
            Some("0:20:500")
        );
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Last, 0)),
            Some(Color::WHITE)
        );
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Last, 1)),
            Some(Color::ORANGE)
        );
        assert_eq!(
            surface.text(Widget::SectorTime(TimeSlot::Delta, 0)).as_deref(),
            Some("-0:00:500")
        );
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Delta, 0)),
            Some(Color::GREEN)
        );

        ledger.reset_cleared();
        let slower = ledger.record_crossing(0, 22.0).unwrap();
        render_crossing(&surface, &ledger, &slower);
        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Delta, 0)),
            Some(Color::RED)
        );
        assert_eq!(
            surface.text(Widget::SectorTime(TimeSlot::Best, 0)).as_deref(),
            Some("0:20:500")
        );
    }

    #[test]
    fn test_last_sector_wraps_highlight_and_fills_totals() {
        let surface = RecordingSurface::new();
        let mut ledger = configured();
        let crossings = ledger.advance(3.0, 60.0);
        assert_eq!(crossings.len(), 3);
        for crossing in &crossings {
            render_crossing(&surface, &ledger, crossing);
        }
        ledger.reset_cleared();
        render_totals(&surface, &ledger);

        assert_eq!(
            surface.color(Widget::SectorTime(TimeSlot::Last, 0)),
            Some(Color::ORANGE)
        );
        assert_eq!(surface.text(Widget::TotalTime).as_deref(), Some("1:00:000"));
        assert_eq!(
            surface.text(Widget::TheoreticalBest).as_deref(),
            Some("1:00:000")
        );
    }

    #[test]
    fn test_buttons_follow_checkpoints() {
        let surface = RecordingSurface::new();
        let mut ledger = SectorLedger::new(3);
        ledger.place_checkpoint(0, 0.25).unwrap();
        ledger.set_finish_line_as_last().unwrap();
        render_buttons(&surface, &ledger);

        assert_eq!(surface.color(Widget::SectorButton(0)), Some(Color::GREEN));
        assert_eq!(surface.color(Widget::SectorButton(1)), Some(Color::WHITE));
        assert_eq!(surface.color(Widget::SectorButton(2)), Some(Color::GREEN));
        assert_eq!(surface.color(Widget::FinishLineButton), Some(Color::GREEN));
        assert_eq!(surface.value(Widget::SectorCountSpinner), Some(3.0));
    }
}
