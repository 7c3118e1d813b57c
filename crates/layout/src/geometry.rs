use crate::types::*;

/// Axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Position {
        Position {
            x: self.min_x + self.width() / 2.0,
            y: self.min_y + self.height() / 2.0,
        }
    }

    /// Inclusive on all four sides.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    pub fn shrink(&self, margin: f64) -> Rect {
        Rect {
            min_x: self.min_x + margin,
            min_y: self.min_y + margin,
            max_x: self.max_x - margin,
            max_y: self.max_y - margin,
        }
    }

    /// True when the rectangle has no interior.
    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }
}

/// World-space rectangle currently visible through the viewport.
pub fn visible_rect(viewport: &Viewport) -> Rect {
    let min_x = -viewport.x / viewport.zoom;
    let min_y = -viewport.y / viewport.zoom;
    Rect {
        min_x,
        min_y,
        max_x: min_x + viewport.width / viewport.zoom,
        max_y: min_y + viewport.height / viewport.zoom,
    }
}

pub fn euclidean_distance(a: Position, b: Position) -> f64 {
    debug_assert!(
        a.is_finite() && b.is_finite(),
        "non-finite geometry: {a:?} -> {b:?}"
    );
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Whether any node's position lies strictly closer than `threshold` to `(x, y)`.
pub fn is_position_occupied<N: LayoutNode>(x: f64, y: f64, nodes: &[N], threshold: f64) -> bool {
    let candidate = Position::new(x, y);
    nodes
        .iter()
        .any(|n| euclidean_distance(n.position(), candidate) < threshold)
}

/// Measured size of a node, or [`DEFAULT_NODE_SIZE`] if it has none yet.
pub fn node_size<N: LayoutNode + ?Sized>(node: &N) -> Size {
    match node.size() {
        Some(size) if size.is_finite() && size.width > 0.0 && size.height > 0.0 => size,
        _ => DEFAULT_NODE_SIZE,
    }
}

pub fn handle_positions<N: LayoutNode + ?Sized>(node: &N) -> HandlePositions {
    let Position { x, y } = node.position();
    debug_assert!(x.is_finite() && y.is_finite(), "node {} has a non-finite position", node.id());
    let Size { width, height } = node_size(node);

    HandlePositions {
        top: Position::new(x + width / 2.0, y),
        bottom: Position::new(x + width / 2.0, y + height),
        left: Position::new(x, y + height / 2.0),
        right: Position::new(x + width, y + height / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dot(Position, Option<Size>);

    impl LayoutNode for Dot {
        fn id(&self) -> &str {
            "dot"
        }
        fn position(&self) -> Position {
            self.0
        }
        fn size(&self) -> Option<Size> {
            self.1
        }
    }

    #[test]
    fn distance_is_euclidean() {
        let d = euclidean_distance(Position::new(0.0, 0.0), Position::new(3.0, 4.0));
        assert_eq!(d, 5.0);
    }

    #[test]
    fn occupancy_threshold_is_strict() {
        let nodes = vec![Dot(Position::new(0.0, 0.0), None)];
        assert!(is_position_occupied(99.9, 0.0, &nodes, 100.0));
        assert!(!is_position_occupied(100.0, 0.0, &nodes, 100.0));
        assert!(!is_position_occupied(0.0, 0.0, &Vec::<Dot>::new(), 100.0));
    }

    #[test]
    fn handles_use_default_size_when_unmeasured() {
        let handles = handle_positions(&Dot(Position::new(10.0, 20.0), None));
        assert_eq!(handles.top, Position::new(85.0, 20.0));
        assert_eq!(handles.bottom, Position::new(85.0, 60.0));
        assert_eq!(handles.left, Position::new(10.0, 40.0));
        assert_eq!(handles.right, Position::new(160.0, 40.0));
    }

    #[test]
    fn handles_use_measured_size() {
        let handles = handle_positions(&Dot(Position::new(0.0, 0.0), Some(Size::new(200.0, 80.0))));
        assert_eq!(handles.right, Position::new(200.0, 40.0));
        assert_eq!(handles.bottom, Position::new(100.0, 80.0));
    }

    #[test]
    fn zero_size_falls_back_to_default() {
        let node = Dot(Position::new(0.0, 0.0), Some(Size::new(0.0, 0.0)));
        assert_eq!(node_size(&node), DEFAULT_NODE_SIZE);
    }

    #[test]
    fn visible_rect_accounts_for_pan_and_zoom() {
        let viewport = Viewport::new(1000.0, 800.0).with_pan(-200.0, 100.0).with_zoom(2.0);
        let rect = visible_rect(&viewport);
        assert_eq!(rect.min_x, 100.0);
        assert_eq!(rect.min_y, -50.0);
        assert_eq!(rect.width(), 500.0);
        assert_eq!(rect.height(), 400.0);
        assert_eq!(rect.center(), Position::new(350.0, 150.0));
    }

    #[test]
    fn shrinking_past_half_extent_empties_rect() {
        let rect = visible_rect(&Viewport::new(250.0, 800.0));
        assert!(rect.shrink(150.0).is_empty());
        assert!(!rect.shrink(100.0).is_empty());
    }
}
