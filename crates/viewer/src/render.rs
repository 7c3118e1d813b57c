use graphview::{FALLBACK_COLOR, MindMap, MindMapNode};
use mindmap_layout::{Rect, handle_positions, node_size};
use svg::Document;
use svg::node::element::{Group, Line, Rectangle, Text};

const PADDING: f64 = 40.0;

/// Render the visible part of a map. The view box hugs the visible nodes.
pub fn render_map(map: &MindMap) -> Document {
    let visible: Vec<&MindMapNode> = map.visible_nodes().collect();
    let bounds = bounds(&visible);
    let highlighted = map.highlighted_generation();

    let mut edges = Group::new()
        .set("class", "edges")
        .set("stroke", "#b1b1b7")
        .set("stroke-width", 2);
    for edge in map.visible_edges() {
        let (Some(source), Some(target)) = (map.node(&edge.source), map.node(&edge.target)) else {
            continue;
        };
        let from = handle_positions(source).get(edge.handles.source_handle);
        let to = handle_positions(target).get(edge.handles.target_handle);
        edges = edges.add(
            Line::new()
                .set("id", edge.id.as_str())
                .set("x1", from.x)
                .set("y1", from.y)
                .set("x2", to.x)
                .set("y2", to.y),
        );
    }

    let mut nodes = Group::new().set("class", "nodes");
    for node in &visible {
        let size = node_size(*node);
        let color = node.data.color.as_deref().unwrap_or(FALLBACK_COLOR);
        let emphasized = highlighted.is_some() && node.generation() == highlighted;

        let rect = Rectangle::new()
            .set("x", node.position.x)
            .set("y", node.position.y)
            .set("width", size.width)
            .set("height", size.height)
            .set("rx", 8)
            .set("fill", color)
            .set("stroke", if emphasized { "#222222" } else { "none" })
            .set("stroke-width", if emphasized { 3 } else { 0 });
        let label = Text::new(node.label())
            .set("x", node.position.x + size.width / 2.0)
            .set("y", node.position.y + size.height / 2.0)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", "sans-serif")
            .set("font-size", 12)
            .set("fill", "white");

        nodes = nodes.add(
            Group::new()
                .set("id", format!("node-{}", node.id))
                .add(rect)
                .add(label),
        );
    }

    Document::new()
        .set(
            "viewBox",
            (bounds.min_x, bounds.min_y, bounds.width(), bounds.height()),
        )
        .set("width", bounds.width())
        .set("height", bounds.height())
        .add(
            Rectangle::new()
                .set("x", bounds.min_x)
                .set("y", bounds.min_y)
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        )
        .add(edges)
        .add(nodes)
}

fn bounds(nodes: &[&MindMapNode]) -> Rect {
    nodes
        .iter()
        .map(|node| {
            let size = node_size(*node);
            Rect {
                min_x: node.position.x,
                min_y: node.position.y,
                max_x: node.position.x + size.width,
                max_y: node.position.y + size.height,
            }
        })
        .reduce(|a, b| Rect {
            min_x: a.min_x.min(b.min_x),
            min_y: a.min_y.min(b.min_y),
            max_x: a.max_x.max(b.max_x),
            max_y: a.max_y.max(b.max_y),
        })
        .unwrap_or(Rect {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        })
        .shrink(-PADDING)
}
