use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size assumed for nodes the renderer has not measured yet.
pub const DEFAULT_NODE_SIZE: Size = Size {
    width: 150.0,
    height: 40.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("unknown handle id: {0:?}")]
    UnknownHandle(String),
    #[error("invalid layout setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
}

/// One of the four attachment points on a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleId {
    Top,
    Bottom,
    Left,
    Right,
}

impl HandleId {
    /// Fixed iteration order. Routing ties resolve to the earliest entry.
    pub const ALL: [HandleId; 4] = [
        HandleId::Top,
        HandleId::Bottom,
        HandleId::Left,
        HandleId::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandleId::Top => "top",
            HandleId::Bottom => "bottom",
            HandleId::Left => "left",
            HandleId::Right => "right",
        }
    }

    /// Coerce an externally supplied handle id into a valid one.
    ///
    /// `source-`/`target-` prefixes are stripped. Missing or unrecognised values
    /// become [`HandleId::Right`], independently for each side of an edge.
    pub fn normalize(raw: Option<&str>) -> HandleId {
        raw.and_then(|s| s.parse().ok()).unwrap_or(HandleId::Right)
    }
}

impl FromStr for HandleId {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clean = s
            .strip_prefix("source-")
            .or_else(|| s.strip_prefix("target-"))
            .unwrap_or(s);
        match clean {
            "top" => Ok(HandleId::Top),
            "bottom" => Ok(HandleId::Bottom),
            "left" => Ok(HandleId::Left),
            "right" => Ok(HandleId::Right),
            _ => Err(LayoutError::UnknownHandle(s.to_string())),
        }
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// World-space coordinates of a node's four handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePositions {
    pub top: Position,
    pub bottom: Position,
    pub left: Position,
    pub right: Position,
}

impl HandlePositions {
    pub fn get(&self, handle: HandleId) -> Position {
        match handle {
            HandleId::Top => self.top,
            HandleId::Bottom => self.bottom,
            HandleId::Left => self.left,
            HandleId::Right => self.right,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (HandleId, Position)> + '_ {
        HandleId::ALL.into_iter().map(|h| (h, self.get(h)))
    }
}

/// Handle assignment for a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlePair {
    pub source_handle: HandleId,
    pub target_handle: HandleId,
}

impl HandlePair {
    pub const fn new(source_handle: HandleId, target_handle: HandleId) -> Self {
        Self {
            source_handle,
            target_handle,
        }
    }
}

impl Default for HandlePair {
    fn default() -> Self {
        Self::new(HandleId::Right, HandleId::Left)
    }
}

/// Pan/zoom state of the editor canvas plus the size of its container in
/// screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            width: 1000.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    /// Smallest zoom accepted by [`Viewport::validate`].
    pub const MIN_ZOOM: f64 = 0.01;

    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_pan(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.zoom.is_finite() && self.zoom >= Self::MIN_ZOOM) {
            return Err(LayoutError::InvalidViewport(format!(
                "zoom must be at least {}, got {}",
                Self::MIN_ZOOM,
                self.zoom
            )));
        }
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(LayoutError::InvalidViewport("pan must be finite".into()));
        }
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width < 0.0
            || self.height < 0.0
        {
            return Err(LayoutError::InvalidViewport(format!(
                "container size must be non-negative, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Convert a point in container pixels to world coordinates.
    pub fn screen_to_world(&self, screen: Position) -> Position {
        Position {
            x: (screen.x - self.x) / self.zoom,
            y: (screen.y - self.y) / self.zoom,
        }
    }

    /// Convert a world coordinate to container pixels.
    pub fn world_to_screen(&self, world: Position) -> Position {
        Position {
            x: world.x * self.zoom + self.x,
            y: world.y * self.zoom + self.y,
        }
    }
}

/// Trait for layout-compatible node structures
pub trait LayoutNode {
    fn id(&self) -> &str;
    fn position(&self) -> Position;
    /// Rendered size, if the node has been measured.
    fn size(&self) -> Option<Size>;
}

/// Trait for layout-compatible edge structures
pub trait LayoutEdge {
    fn source(&self) -> &str;
    fn target(&self) -> &str;
    fn handles(&self) -> HandlePair;
    fn set_handles(&mut self, handles: HandlePair);
}
