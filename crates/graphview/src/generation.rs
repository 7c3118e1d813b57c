use std::collections::BTreeSet;

/// Colours cycled through by generation, starting at generation 1.
pub const GENERATION_PALETTE: [&str; 8] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#f7b731", "#5f27cd", "#00d2d3", "#ff9ff3", "#54a0ff",
];

pub const FALLBACK_COLOR: &str = "#667eea";

pub fn generation_color(generation: u32) -> &'static str {
    match generation {
        0 => FALLBACK_COLOR,
        g => GENERATION_PALETTE[((g - 1) as usize) % GENERATION_PALETTE.len()],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationCount {
    pub generation: u32,
    pub count: usize,
}

/// Which generations are shown, and which one is highlighted.
///
/// Generations start out visible; only explicitly hidden ones are tracked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationFilter {
    hidden: BTreeSet<u32>,
    highlighted: Option<u32>,
}

impl GenerationFilter {
    pub fn is_visible(&self, generation: u32) -> bool {
        !self.hidden.contains(&generation)
    }

    pub fn set_visible(&mut self, generation: u32, visible: bool) {
        if visible {
            self.hidden.remove(&generation);
        } else {
            self.hidden.insert(generation);
        }
    }

    pub fn set_all_visible(&mut self, generations: impl IntoIterator<Item = u32>, visible: bool) {
        for generation in generations {
            self.set_visible(generation, visible);
        }
    }

    pub fn highlighted(&self) -> Option<u32> {
        self.highlighted
    }

    /// Highlight `generation`, or clear the highlight if it is already the
    /// highlighted one.
    pub fn toggle_highlight(&mut self, generation: u32) -> Option<u32> {
        self.highlighted = match self.highlighted {
            Some(current) if current == generation => None,
            _ => Some(generation),
        };
        self.highlighted
    }
}
