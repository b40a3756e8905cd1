//! Timing window pager
//!
//! The timing window shows five sectors per page. The page counter is shared
//! between the tick and the auto-advance cue, so it lives in atomics.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use contracts::{OverlaySurface, TimeSlot, UiLayout, Widget};

/// Sector rows shown per page
pub const SECTORS_PER_PAGE: usize = 5;

#[derive(Debug)]
pub struct Pager {
    /// 1-based current page
    page: AtomicUsize,
    sector_count: AtomicUsize,
    layout: AtomicU8,
}

impl Pager {
    pub fn new(sector_count: usize, layout: UiLayout) -> Self {
        Self {
            page: AtomicUsize::new(1),
            sector_count: AtomicUsize::new(sector_count),
            layout: AtomicU8::new(layout.code()),
        }
    }

    pub fn page(&self) -> usize {
        self.page.load(Ordering::SeqCst)
    }

    pub fn page_count(&self) -> usize {
        page_count(self.sector_count())
    }

    pub fn sector_count(&self) -> usize {
        self.sector_count.load(Ordering::SeqCst)
    }

    /// Change the row count; the page is clamped into range
    pub fn set_sector_count(&self, count: usize) {
        self.sector_count.store(count, Ordering::SeqCst);
        let last = page_count(count);
        let _ = self
            .page
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |page| {
                (page > last).then_some(last)
            });
    }

    pub fn layout(&self) -> UiLayout {
        UiLayout::from_code(self.layout.load(Ordering::SeqCst))
    }

    pub fn set_layout(&self, layout: UiLayout) {
        self.layout.store(layout.code(), Ordering::SeqCst);
    }

    /// Jump to `page`, clamped to the valid range; returns the page shown
    pub fn set_page(&self, page: usize) -> usize {
        let page = page.clamp(1, self.page_count());
        self.page.store(page, Ordering::SeqCst);
        page
    }

    pub fn reset(&self) {
        self.page.store(1, Ordering::SeqCst);
    }

    /// Next page, wrapping from the last back to the first
    pub fn advance(&self) -> usize {
        let last = self.page_count();
        let previous = self
            .page
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |page| {
                Some(if page >= last { 1 } else { page + 1 })
            })
            .unwrap_or(1);
        if previous >= last {
            1
        } else {
            previous + 1
        }
    }

    /// 1-based page holding sector `index`
    pub fn page_of(index: usize) -> usize {
        index / SECTORS_PER_PAGE + 1
    }

    /// Show the rows of the current page and hide the rest
    pub fn render(&self, surface: &dyn OverlaySurface) {
        let page = self.page();
        let full = self.layout() == UiLayout::Full;
        let shown = (page - 1) * SECTORS_PER_PAGE..page * SECTORS_PER_PAGE;

        for index in 0..self.sector_count() {
            let on_page = shown.contains(&index);
            surface.set_visible(Widget::SectorLabel(index), on_page && full);
            surface.set_visible(Widget::SectorTime(TimeSlot::Last, index), on_page);
            surface.set_visible(Widget::SectorTime(TimeSlot::Best, index), on_page && full);
            surface.set_visible(Widget::SectorTime(TimeSlot::Delta, index), on_page);
        }
        surface.set_visible(Widget::PageSpinner, full);
        surface.set_value(Widget::PageSpinner, page as f64);
    }
}

fn page_count(sector_count: usize) -> usize {
    sector_count.div_ceil(SECTORS_PER_PAGE).max(1)
}
