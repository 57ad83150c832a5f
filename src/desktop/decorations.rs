//! Window decorations (borders, group tab bars)
//!
//! Decorations are owned by their window and treated opaquely by the rest
//! of the model: it only asks them how much room they take, whether they
//! accept input at a point and where they draw.

use std::fmt::Debug;

use crate::shared::{Extents, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationType {
    Border,
    GroupBar,
    Custom,
}

/// How a decoration is laid out around the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationPositioning {
    /// Stacked against an edge, taking space away from the layout
    Sticky,
    /// Floats around the window without reserving space
    Absolute,
}

pub trait WindowDecoration: Debug {
    fn kind(&self) -> DecorationType;

    fn positioning(&self) -> DecorationPositioning;

    /// Space taken around the window box
    fn extents(&self) -> Extents;

    /// Whether pointer input over this decoration belongs to it
    fn allows_input(&self) -> bool {
        false
    }

    /// Space the layout must leave free for this decoration
    fn reserved(&self) -> Extents {
        match self.positioning() {
            DecorationPositioning::Sticky => self.extents(),
            DecorationPositioning::Absolute => Extents::default(),
        }
    }

    /// Area this decoration draws into for a window at `window_box`
    fn render_area(&self, window_box: Rect) -> Rect {
        window_box.add_extents(self.extents())
    }

    /// Whether `point` (global coordinates) hits this decoration
    fn hit_test(&self, window_box: Rect, point: Vec2) -> bool {
        self.allows_input()
            && self.render_area(window_box).contains_point(point)
            && !window_box.contains_point(point)
    }

    /// Re-read window-dependent parameters
    fn update_border_size(&mut self, _border_size: f64) {}
}

/// Solid border drawn around the surface
#[derive(Debug, Clone)]
pub struct BorderDecoration {
    size: f64,
}

impl BorderDecoration {
    pub fn new(size: f64) -> Self {
        Self { size: size.max(0.0) }
    }
}

impl WindowDecoration for BorderDecoration {
    fn kind(&self) -> DecorationType {
        DecorationType::Border
    }

    fn positioning(&self) -> DecorationPositioning {
        DecorationPositioning::Absolute
    }

    fn extents(&self) -> Extents {
        Extents::uniform(self.size)
    }

    fn allows_input(&self) -> bool {
        // borders are resize handles
        true
    }

    fn update_border_size(&mut self, border_size: f64) {
        self.size = border_size.max(0.0);
    }
}

/// Tab bar shown above every member of a group
#[derive(Debug, Clone)]
pub struct GroupBarDecoration {
    height: f64,
}

impl GroupBarDecoration {
    pub fn new(height: f64) -> Self {
        Self { height: height.max(0.0) }
    }
}

impl WindowDecoration for GroupBarDecoration {
    fn kind(&self) -> DecorationType {
        DecorationType::GroupBar
    }

    fn positioning(&self) -> DecorationPositioning {
        DecorationPositioning::Sticky
    }

    fn extents(&self) -> Extents {
        Extents {
            top_left: Vec2::new(0.0, self.height),
            bottom_right: Vec2::ZERO,
        }
    }

    fn allows_input(&self) -> bool {
        true
    }
}

/// The decorations owned by one window
#[derive(Debug, Default)]
pub struct DecorationSet {
    decorations: Vec<Box<dyn WindowDecoration>>,
}

impl DecorationSet {
    pub fn add(&mut self, decoration: Box<dyn WindowDecoration>) {
        self.decorations.push(decoration);
    }

    /// Remove every decoration of `kind`
    pub fn remove_kind(&mut self, kind: DecorationType) {
        self.decorations.retain(|d| d.kind() != kind);
    }

    pub fn has_kind(&self, kind: DecorationType) -> bool {
        self.decorations.iter().any(|d| d.kind() == kind)
    }

    pub fn clear(&mut self) {
        self.decorations.clear();
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn WindowDecoration> {
        self.decorations.iter().map(|d| d.as_ref())
    }

    /// Sum of the space sticky decorations reserve
    pub fn reserved(&self) -> Extents {
        let mut total = Extents::default();
        for decoration in &self.decorations {
            total.add_extents(decoration.reserved());
        }
        total
    }

    /// Total extents: sticky decorations stack, absolute ones overlap.
    ///
    /// `input_only` skips decorations that ignore pointer input and
    /// `floating_only` skips sticky ones.
    pub fn extents(&self, input_only: bool, floating_only: bool) -> Extents {
        let mut stacked = Extents::default();
        let mut floating = Extents::default();
        for decoration in &self.decorations {
            if input_only && !decoration.allows_input() {
                continue;
            }
            match decoration.positioning() {
                DecorationPositioning::Sticky if floating_only => {}
                DecorationPositioning::Sticky => stacked.add_extents(decoration.extents()),
                DecorationPositioning::Absolute => floating = floating.max_extents(decoration.extents()),
            }
        }
        stacked.add_extents(floating);
        stacked
    }

    /// First decoration (topmost last-added) hit at `point`
    pub fn hit_test(&self, window_box: Rect, point: Vec2) -> Option<DecorationType> {
        self.decorations
            .iter()
            .rev()
            .find(|d| d.hit_test(window_box, point))
            .map(|d| d.kind())
    }

    pub fn update_border_size(&mut self, border_size: f64) {
        for decoration in &mut self.decorations {
            decoration.update_border_size(border_size);
        }
    }
}
