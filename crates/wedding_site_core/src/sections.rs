//! crates/wedding_site_core/src/sections.rs
//!
//! Scroll-driven tracking of the active page section for navigation highlighting.

use std::collections::BTreeMap;
use crate::domain::Section;

/// Activation triggers this many pixels before a section reaches the viewport top.
pub const SCROLL_LOOKAHEAD: f64 = 100.0;

/// Returns the last section in document order whose top offset is at or above
/// `scroll_y + SCROLL_LOOKAHEAD`. Falls back to the first section.
pub fn active_section(layout: &BTreeMap<Section, f64>, scroll_y: f64) -> Section {
    let adjusted = scroll_y + SCROLL_LOOKAHEAD;
    Section::ALL
        .into_iter()
        .filter(|section| matches!(layout.get(section), Some(offset) if *offset <= adjusted))
        .last()
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct SectionTracker {
    layout: BTreeMap<Section, f64>,
    scroll_y: f64,
    active: Section,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the measured section offsets and re-resolves the active section
    /// for the last known scroll position. Sections not listed are skipped.
    pub fn set_layout(&mut self, offsets: impl IntoIterator<Item = (Section, f64)>) -> Option<Section> {
        self.layout = offsets.into_iter().collect();
        self.on_scroll(self.scroll_y)
    }

    /// Recomputes the active section. Returns `Some` only when it changed.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Option<Section> {
        self.scroll_y = scroll_y;
        let next = active_section(&self.layout, scroll_y);
        if next == self.active {
            return None;
        }
        self.active = next;
        Some(next)
    }

    pub fn active(&self) -> Section {
        self.active
    }
}
