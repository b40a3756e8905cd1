//! Recording overlay surface

use std::collections::HashMap;
use std::sync::Mutex;

use contracts::{Color, OverlaySurface, Widget};

use crate::host::lock;

/// Last properties set on a widget
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetState {
    pub text: Option<String>,
    pub color: Option<Color>,
    /// Widgets start visible
    pub visible: Option<bool>,
    pub value: Option<f64>,
}

/// Overlay that stores every property and the full color history
#[derive(Debug, Default)]
pub struct RecordingSurface {
    widgets: Mutex<HashMap<Widget, WidgetState>>,
    color_history: Mutex<HashMap<Widget, Vec<Color>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, widget: Widget) -> WidgetState {
        lock(&self.widgets).get(&widget).cloned().unwrap_or_default()
    }

    pub fn text(&self, widget: Widget) -> Option<String> {
        self.state(widget).text
    }

    pub fn color(&self, widget: Widget) -> Option<Color> {
        self.state(widget).color
    }

    pub fn is_visible(&self, widget: Widget) -> bool {
        self.state(widget).visible.unwrap_or(true)
    }

    pub fn value(&self, widget: Widget) -> Option<f64> {
        self.state(widget).value
    }

    /// Every color set on `widget`, oldest first
    pub fn color_history(&self, widget: Widget) -> Vec<Color> {
        lock(&self.color_history)
            .get(&widget)
            .cloned()
            .unwrap_or_default()
    }
}

impl OverlaySurface for RecordingSurface {
    fn set_text(&self, widget: Widget, text: &str) {
        lock(&self.widgets).entry(widget).or_default().text = Some(text.to_string());
    }

    fn set_color(&self, widget: Widget, color: Color) {
        lock(&self.widgets).entry(widget).or_default().color = Some(color);
        lock(&self.color_history)
            .entry(widget)
            .or_default()
            .push(color);
    }

    fn set_visible(&self, widget: Widget, visible: bool) {
        lock(&self.widgets).entry(widget).or_default().visible = Some(visible);
    }

    fn set_value(&self, widget: Widget, value: f64) {
        lock(&self.widgets).entry(widget).or_default().value = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_properties() {
        let surface = RecordingSurface::new();
        surface.set_text(Widget::TotalTime, "1:00:000");
        surface.set_color(Widget::TotalTime, Color::RED);
        surface.set_color(Widget::TotalTime, Color::WHITE);
        surface.set_visible(Widget::SectorLabel(3), false);

        assert_eq!(surface.text(Widget::TotalTime).as_deref(), Some("1:00:000"));
        assert_eq!(surface.color(Widget::TotalTime), Some(Color::WHITE));
        assert_eq!(
            surface.color_history(Widget::TotalTime),
            vec![Color::RED, Color::WHITE]
        );
        assert!(!surface.is_visible(Widget::SectorLabel(3)));
        assert!(surface.is_visible(Widget::SectorLabel(0)));
    }
}
