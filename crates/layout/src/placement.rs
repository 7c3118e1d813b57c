use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::geometry::{Rect, is_position_occupied, visible_rect};
use crate::types::*;

/// Ring angles in degrees, clockwise from straight up.
pub const RADIAL_ANGLES: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

/// Which search produced a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStrategy {
    /// Ring around an anchor node; `expansions` counts rings skipped as full.
    Radial { expansions: usize },
    /// First node on an empty canvas, centered in the viewport.
    EmptyCanvas,
    Grid,
    Random,
    Spiral,
    /// Relaxed-threshold sampling; may sit closer than the node spacing.
    Forced,
    /// Unconditional viewport center. May overlap existing nodes.
    ViewportCenter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    pub strategy: PlacementStrategy,
}

impl Placement {
    fn new(position: Position, strategy: PlacementStrategy) -> Self {
        Self { position, strategy }
    }

    /// True when the position did not have to respect the normal spacing.
    pub fn is_best_effort(&self) -> bool {
        matches!(
            self.strategy,
            PlacementStrategy::Forced | PlacementStrategy::ViewportCenter
        )
    }
}

/// Find a spot for a new node.
///
/// With an anchor the ring search runs first. Without one, or once the ring
/// search exhausts `max_radial_expansions`, the viewport is searched. This
/// always returns a position.
pub fn find_available_position<N, R>(
    anchor: Option<&N>,
    viewport: &Viewport,
    nodes: &[N],
    config: &LayoutConfig,
    rng: &mut R,
) -> Placement
where
    N: LayoutNode,
    R: Rng + ?Sized,
{
    if let Some(anchor) = anchor {
        if let Some(placement) = config.radial_position(anchor, nodes) {
            return placement;
        }
        warn!(
            anchor = anchor.id(),
            max_expansions = ?config.max_radial_expansions,
            "no free ring around anchor, falling back to free placement"
        );
    }
    config.free_position(viewport, nodes, rng)
}

impl LayoutConfig {
    /// Search rings around `anchor`, growing the radius by `radial_step` after
    /// each fully occupied ring.
    ///
    /// Returns `None` once `max_radial_expansions` rings have been added without
    /// success. With no cap the search only stops when a ring has room.
    pub fn radial_position<A, N>(&self, anchor: &A, nodes: &[N]) -> Option<Placement>
    where
        A: LayoutNode + ?Sized,
        N: LayoutNode,
    {
        let center = anchor.position();
        debug_assert!(center.is_finite(), "anchor {} has a non-finite position", anchor.id());

        let mut distance = self.radial_distance;
        let mut expansions = 0;
        loop {
            for angle in RADIAL_ANGLES {
                let rad = angle.to_radians();
                let x = center.x + rad.sin() * distance;
                let y = center.y - rad.cos() * distance;
                if !is_position_occupied(x, y, nodes, self.radial_threshold) {
                    debug!(anchor = anchor.id(), angle, distance, "radial placement");
                    return Some(Placement::new(
                        Position::new(x, y),
                        PlacementStrategy::Radial { expansions },
                    ));
                }
            }

            expansions += 1;
            if self
                .max_radial_expansions
                .is_some_and(|max| expansions > max)
            {
                return None;
            }
            distance += self.radial_step;
        }
    }

    /// Place a node somewhere in the visible part of the canvas.
    pub fn free_position<N, R>(&self, viewport: &Viewport, nodes: &[N], rng: &mut R) -> Placement
    where
        N: LayoutNode,
        R: Rng + ?Sized,
    {
        let view = visible_rect(viewport);
        let center = view.center();

        if nodes.is_empty() {
            // Shift so the node's middle, not its corner, lands on the center.
            let offset_x = self.default_node_size.width / 2.0 / viewport.zoom;
            let offset_y = self.default_node_size.height / 2.0 / viewport.zoom;
            let position = Position::new(center.x - offset_x, center.y - offset_y);
            debug!(x = position.x, y = position.y, "first node placed at viewport center");
            return Placement::new(position, PlacementStrategy::EmptyCanvas);
        }

        let bounds = view.shrink(self.viewport_margin / viewport.zoom);
        if bounds.is_empty() {
            debug!("viewport narrower than its margins, using center");
            return Placement::new(center, PlacementStrategy::ViewportCenter);
        }

        let placement = if let Some(p) = self.grid_search(&bounds, nodes, rng) {
            Placement::new(p, PlacementStrategy::Grid)
        } else if let Some(p) = self.random_search(&bounds, nodes, rng) {
            Placement::new(p, PlacementStrategy::Random)
        } else if let Some(p) = self.spiral_search(&view, &bounds, nodes) {
            Placement::new(p, PlacementStrategy::Spiral)
        } else if let Some(p) = self.forced_search(&view, nodes, rng) {
            Placement::new(p, PlacementStrategy::Forced)
        } else {
            Placement::new(center, PlacementStrategy::ViewportCenter)
        };

        debug!(
            strategy = ?placement.strategy,
            x = placement.position.x,
            y = placement.position.y,
            existing = nodes.len(),
            "free placement"
        );
        placement
    }

    /// Visit grid cells in random order, jittering each candidate around the
    /// cell corner.
    ///
    /// Up to `grid_cell_limit` cells every cell is visited once. Larger grids,
    /// e.g. far zoomed out, are sampled `grid_cell_limit` times instead.
    fn grid_search<N, R>(&self, bounds: &Rect, nodes: &[N], rng: &mut R) -> Option<Position>
    where
        N: LayoutNode,
        R: Rng + ?Sized,
    {
        let cell = self.node_spacing;
        let cols = (bounds.width() / cell).floor();
        let rows = (bounds.height() / cell).floor();
        if cols < 1.0 || rows < 1.0 {
            return None;
        }

        let cells: Vec<(usize, usize)> = if cols * rows <= self.grid_cell_limit as f64 {
            let (cols, rows) = (cols as usize, rows as usize);
            let mut cells: Vec<(usize, usize)> = (0..rows)
                .flat_map(|row| (0..cols).map(move |col| (row, col)))
                .collect();
            cells.shuffle(rng);
            cells
        } else {
            debug!(cols, rows, limit = self.grid_cell_limit, "sampling oversized grid");
            let (cols, rows) = (cols as usize, rows as usize);
            (0..self.grid_cell_limit)
                .map(|_| (rng.random_range(0..rows), rng.random_range(0..cols)))
                .collect()
        };

        let jitter = cell * self.grid_jitter;
        cells.into_iter().find_map(|(row, col)| {
            let x = bounds.min_x + col as f64 * cell + (rng.random::<f64>() - 0.5) * jitter;
            let y = bounds.min_y + row as f64 * cell + (rng.random::<f64>() - 0.5) * jitter;
            (!is_position_occupied(x, y, nodes, self.node_spacing)).then_some(Position::new(x, y))
        })
    }

    fn random_search<N, R>(&self, bounds: &Rect, nodes: &[N], rng: &mut R) -> Option<Position>
    where
        N: LayoutNode,
        R: Rng + ?Sized,
    {
        (0..self.random_attempts).find_map(|_| {
            let x = bounds.min_x + rng.random::<f64>() * bounds.width();
            let y = bounds.min_y + rng.random::<f64>() * bounds.height();
            (!is_position_occupied(x, y, nodes, self.node_spacing)).then_some(Position::new(x, y))
        })
    }

    /// Concentric rings around the view center, outward in half-spacing steps.
    fn spiral_search<N: LayoutNode>(
        &self,
        view: &Rect,
        bounds: &Rect,
        nodes: &[N],
    ) -> Option<Position> {
        let center = view.center();
        let max_radius = view.width().min(view.height()) / 2.0;

        let mut radius = self.node_spacing;
        while radius < max_radius {
            let mut angle = 0.0_f64;
            while angle < 360.0 {
                let rad = angle.to_radians();
                let candidate = Position::new(
                    center.x + rad.cos() * radius,
                    center.y + rad.sin() * radius,
                );
                if bounds.contains(candidate)
                    && !is_position_occupied(candidate.x, candidate.y, nodes, self.node_spacing)
                {
                    return Some(candidate);
                }
                angle += self.spiral_angle_step;
            }
            radius += self.node_spacing / 2.0;
        }
        None
    }

    fn forced_search<N, R>(&self, view: &Rect, nodes: &[N], rng: &mut R) -> Option<Position>
    where
        N: LayoutNode,
        R: Rng + ?Sized,
    {
        let center = view.center();
        let threshold = self.forced_threshold();
        (0..self.forced_attempts).find_map(|_| {
            let x = center.x + (rng.random::<f64>() - 0.5) * (view.width() * self.forced_extent);
            let y = center.y + (rng.random::<f64>() - 0.5) * (view.height() * self.forced_extent);
            (!is_position_occupied(x, y, nodes, threshold)).then_some(Position::new(x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::euclidean_distance;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug)]
    struct Pin(Position);

    impl LayoutNode for Pin {
        fn id(&self) -> &str {
            "pin"
        }
        fn position(&self) -> Position {
            self.0
        }
        fn size(&self) -> Option<Size> {
            None
        }
    }

    fn pin(x: f64, y: f64) -> Pin {
        Pin(Position::new(x, y))
    }

    fn assert_close(actual: Position, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-6 && (actual.y - y).abs() < 1e-6,
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    #[test]
    fn radial_starts_straight_up() {
        let anchor = pin(10.0, 10.0);
        let placement = LayoutConfig::default()
            .radial_position(&anchor, &[pin(10.0, 10.0)])
            .unwrap();
        assert_close(placement.position, 10.0, -190.0);
        assert_eq!(placement.strategy, PlacementStrategy::Radial { expansions: 0 });
    }

    #[test]
    fn radial_goes_clockwise() {
        let anchor = pin(0.0, 0.0);
        let nodes = vec![pin(0.0, 0.0), pin(0.0, -200.0), pin(141.42, -141.42)];
        let placement = LayoutConfig::default().radial_position(&anchor, &nodes).unwrap();
        // 90 degrees is directly to the right.
        assert_close(placement.position, 200.0, 0.0);
    }

    #[test]
    fn radial_expands_when_ring_is_full() {
        let anchor = pin(0.0, 0.0);
        let config = LayoutConfig::default();
        let mut nodes = vec![pin(0.0, 0.0)];
        for angle in RADIAL_ANGLES {
            let rad = angle.to_radians();
            nodes.push(pin(rad.sin() * 200.0, -rad.cos() * 200.0));
        }

        let placement = config.radial_position(&anchor, &nodes).unwrap();
        // The 250 ring sits only 50 from each blocker; 300 is the first to clear
        // the 100 threshold.
        assert_eq!(placement.strategy, PlacementStrategy::Radial { expansions: 2 });
        assert_close(placement.position, 0.0, -300.0);
    }

    #[test]
    fn radial_cap_returns_none() {
        let anchor = pin(0.0, 0.0);
        let config = LayoutConfig {
            max_radial_expansions: Some(0),
            ..Default::default()
        };
        let mut nodes = vec![pin(0.0, 0.0)];
        for angle in RADIAL_ANGLES {
            let rad = angle.to_radians();
            nodes.push(pin(rad.sin() * 200.0, -rad.cos() * 200.0));
        }
        assert!(config.radial_position(&anchor, &nodes).is_none());
    }

    #[test]
    fn capped_radial_falls_through_to_free_placement() {
        let config = LayoutConfig {
            max_radial_expansions: Some(0),
            ..Default::default()
        };
        let mut nodes = vec![pin(-5000.0, -5000.0)];
        for angle in RADIAL_ANGLES {
            let rad = angle.to_radians();
            nodes.push(pin(-5000.0 + rad.sin() * 200.0, -5000.0 - rad.cos() * 200.0));
        }
        let mut rng = StdRng::seed_from_u64(3);
        let placement = find_available_position(
            Some(&nodes[0]),
            &Viewport::new(1000.0, 800.0),
            &nodes,
            &config,
            &mut rng,
        );
        assert_eq!(placement.strategy, PlacementStrategy::Grid);
    }

    #[test]
    fn empty_canvas_centers_node() {
        let mut rng = StdRng::seed_from_u64(1);
        let viewport = Viewport::new(1000.0, 800.0).with_pan(100.0, 0.0).with_zoom(2.0);
        let placement = LayoutConfig::default().free_position::<Pin, _>(&viewport, &[], &mut rng);
        assert_eq!(placement.strategy, PlacementStrategy::EmptyCanvas);
        // view spans x in [-50, 450], y in [0, 400]; offsets are 75/2 and 20/2.
        assert_close(placement.position, 162.5, 190.0);
    }

    #[test]
    fn tiny_viewport_uses_center() {
        let mut rng = StdRng::seed_from_u64(1);
        let viewport = Viewport::new(200.0, 200.0);
        let nodes = vec![pin(0.0, 0.0)];
        let placement = LayoutConfig::default().free_position(&viewport, &nodes, &mut rng);
        assert_eq!(placement.strategy, PlacementStrategy::ViewportCenter);
        assert_close(placement.position, 100.0, 100.0);
    }

    #[test]
    fn grid_search_respects_spacing() {
        let config = LayoutConfig::default();
        let nodes = vec![pin(500.0, 400.0), pin(200.0, 200.0)];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placement = config.free_position(&Viewport::new(1000.0, 800.0), &nodes, &mut rng);
            assert_eq!(placement.strategy, PlacementStrategy::Grid);
            for node in &nodes {
                assert!(euclidean_distance(node.0, placement.position) >= config.node_spacing);
            }
        }
    }

    /// One node on every grid corner of a 1000x800 viewport.
    fn grid_corners() -> Vec<Pin> {
        let mut nodes = Vec::new();
        for y in [150.0, 350.0] {
            for x in [150.0, 350.0, 550.0] {
                nodes.push(pin(x, y));
            }
        }
        nodes
    }

    #[test]
    fn blocked_grid_falls_back_to_random_sampling() {
        let config = LayoutConfig::default();
        let nodes = grid_corners();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placement = config.free_position(&Viewport::new(1000.0, 800.0), &nodes, &mut rng);
            assert_eq!(placement.strategy, PlacementStrategy::Random);
            for node in &nodes {
                assert!(euclidean_distance(node.0, placement.position) >= config.node_spacing);
            }
        }
    }

    #[test]
    fn spiral_runs_when_random_sampling_is_disabled() {
        let config = LayoutConfig {
            random_attempts: 0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let placement =
            config.free_position(&Viewport::new(1000.0, 800.0), &grid_corners(), &mut rng);
        assert_eq!(placement.strategy, PlacementStrategy::Spiral);
        // 0 and 30 degrees on the first ring are within 200 of (550, 350).
        assert_close(placement.position, 600.0, 400.0 + 200.0 * 60f64.to_radians().sin());
    }

    #[test]
    fn far_zoomed_out_grid_is_sampled() {
        let config = LayoutConfig::default();
        let viewport = Viewport::new(1000.0, 800.0).with_zoom(1e-4);
        let nodes = vec![pin(0.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(2);
        let placement = config.free_position(&viewport, &nodes, &mut rng);
        assert_eq!(placement.strategy, PlacementStrategy::Grid);
        assert!(euclidean_distance(nodes[0].0, placement.position) >= config.node_spacing);
    }

    #[test]
    fn crowded_viewport_degrades_to_best_effort() {
        let config = LayoutConfig::default();
        let mut nodes = Vec::new();
        let mut y = -190.0;
        while y <= 990.0 {
            let mut x = -190.0;
            while x <= 1190.0 {
                nodes.push(pin(x, y));
                x += 190.0;
            }
            y += 190.0;
        }

        let mut rng = StdRng::seed_from_u64(11);
        let placement = config.free_position(&Viewport::new(1000.0, 800.0), &nodes, &mut rng);
        assert!(placement.is_best_effort(), "got {:?}", placement.strategy);
        if placement.strategy == PlacementStrategy::Forced {
            for node in &nodes {
                let distance = euclidean_distance(node.0, placement.position);
                assert!(distance >= config.forced_threshold());
            }
        } else {
            assert_close(placement.position, 500.0, 400.0);
        }
    }
}
