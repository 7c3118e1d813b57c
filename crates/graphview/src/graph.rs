use std::collections::{BTreeMap, HashSet};

use mindmap_layout::{
    HandleId, HandlePair, LayoutConfig, NodeIndex, Placement, Position, Size, Viewport,
    find_available_position, needs_reoptimization, reoptimize_in_place,
};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::edge::{MindMapEdge, RawEdge, edge_id};
use crate::error::GraphError;
use crate::generation::{GenerationCount, GenerationFilter};
use crate::node::MindMapNode;

/// Node/edge store for one mind map.
///
/// Actions mutate the snapshot synchronously. Geometry that depends on
/// rendered node sizes is recomputed in [`MindMap::settle`], which the host
/// calls once a batch of updates has been rendered.
#[derive(Debug, Clone)]
pub struct MindMap {
    pub title: String,
    nodes: Vec<MindMapNode>,
    edges: Vec<MindMapEdge>,
    viewport: Viewport,
    config: LayoutConfig,
    generations: GenerationFilter,
    next_id: u64,
    unsettled: bool,
}

impl Default for MindMap {
    fn default() -> Self {
        Self {
            title: String::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            viewport: Viewport::default(),
            config: LayoutConfig::default(),
            generations: GenerationFilter::default(),
            next_id: 0,
            unsettled: false,
        }
    }
}

impl MindMap {
    pub fn new(config: LayoutConfig, viewport: Viewport) -> Result<Self, GraphError> {
        config.validate()?;
        viewport.validate()?;
        Ok(Self {
            config,
            viewport,
            ..Default::default()
        })
    }

    pub fn nodes(&self) -> &[MindMapNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[MindMapEdge] {
        &self.edges
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn node(&self, id: &str) -> Option<&MindMapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&MindMapEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// First node whose label matches exactly.
    pub fn find_by_label(&self, label: &str) -> Option<&MindMapNode> {
        self.nodes.iter().find(|n| n.label() == label)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut MindMapNode, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    /// False while node geometry has changed since the last [`MindMap::settle`].
    pub fn is_settled(&self) -> bool {
        !self.unsettled
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<(), GraphError> {
        viewport.validate()?;
        self.viewport = viewport;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace the whole snapshot, e.g. with a fetched document.
    ///
    /// Duplicate node and edge ids keep their first occurrence. Edges are
    /// normalized and dropped if an endpoint is missing. Returns the number of
    /// dropped edges.
    pub fn load(&mut self, nodes: Vec<MindMapNode>, edges: Vec<RawEdge>) -> usize {
        let mut seen = HashSet::new();
        let nodes: Vec<MindMapNode> = nodes
            .into_iter()
            .filter(|n| {
                let fresh = seen.insert(n.id.clone());
                if !fresh {
                    warn!(id = %n.id, "dropping node with duplicate id");
                }
                fresh
            })
            .collect();

        let total = edges.len();
        let edges: Vec<MindMapEdge> = edges
            .into_iter()
            .filter(|e| seen.contains(&e.source) && seen.contains(&e.target))
            .map(RawEdge::into_edge)
            .collect();
        let dangling = total - edges.len();
        if dangling > 0 {
            warn!(dropped = dangling, "dropped edges referencing missing nodes");
        }

        let mut edge_ids = HashSet::new();
        let edges: Vec<MindMapEdge> = edges
            .into_iter()
            .filter(|e| {
                let fresh = edge_ids.insert(e.id.clone());
                if !fresh {
                    warn!(id = %e.id, "dropping edge with duplicate id");
                }
                fresh
            })
            .collect();
        let dropped = total - edges.len();

        self.next_id = nodes
            .iter()
            .filter_map(|n| n.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.nodes = nodes;
        self.edges = edges;
        self.generations = GenerationFilter::default();
        self.unsettled = true;
        info!(nodes = self.nodes.len(), edges = self.edges.len(), "mind map loaded");
        dropped
    }

    fn allocate_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = self.next_id.to_string();
            if self.node(&id).is_none() {
                return id;
            }
        }
    }

    /// Commit a node at an explicit position. Returns its id.
    pub fn add_node(&mut self, label: impl Into<String>, position: Position) -> String {
        debug_assert!(position.is_finite(), "non-finite node position {position:?}");
        let id = self.allocate_id();
        let mut node = MindMapNode::new(id.clone(), label, position);
        node.data.is_new = true;
        debug!(%id, label = node.label(), x = position.x, y = position.y, "node added");
        self.nodes.push(node);
        id
    }

    /// Add an unanchored node somewhere in the visible canvas.
    pub fn add_free_node<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        let placement = self.config.free_position(&self.viewport, &self.nodes, rng);
        let label = format!("Node {}", self.nodes.len() + 1);
        self.add_node(label, placement.position)
    }

    /// Where a child of `parent` would go. Nothing is committed, so the host
    /// can ask for the label before calling [`MindMap::add_child`].
    pub fn propose_child_position<R: Rng + ?Sized>(
        &self,
        parent: &str,
        rng: &mut R,
    ) -> Result<Placement, GraphError> {
        let anchor = self
            .node(parent)
            .ok_or_else(|| GraphError::UnknownNode(parent.to_string()))?;
        Ok(find_available_position(
            Some(anchor),
            &self.viewport,
            &self.nodes,
            &self.config,
            rng,
        ))
    }

    /// Commit a child node and the edge from its parent. Returns the new node
    /// and edge ids.
    pub fn add_child(
        &mut self,
        parent: &str,
        label: impl Into<String>,
        position: Position,
    ) -> Result<(String, String), GraphError> {
        if self.node(parent).is_none() {
            return Err(GraphError::UnknownNode(parent.to_string()));
        }
        // Node first: the edge is routed against the child's committed position.
        let child = self.add_node(label, position);
        let edge = self.connect(parent, &child)?;
        Ok((child, edge))
    }

    pub fn add_child_node<R: Rng + ?Sized>(
        &mut self,
        parent: &str,
        label: impl Into<String>,
        rng: &mut R,
    ) -> Result<(String, String), GraphError> {
        let placement = self.propose_child_position(parent, rng)?;
        self.add_child(parent, label, placement.position)
    }

    /// Connect two existing nodes through their closest handles.
    ///
    /// Connecting an already connected ordered pair returns the existing edge.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        let index = NodeIndex::new(&self.nodes);
        let handles = index.route(source, target).ok_or_else(|| {
            let missing = if index.get(source).is_none() {
                source
            } else {
                target
            };
            GraphError::UnknownNode(missing.to_string())
        })?;

        if let Some(existing) = self
            .edges
            .iter()
            .find(|e| e.source == source && e.target == target)
        {
            return Ok(existing.id.clone());
        }

        let mut edge = MindMapEdge::new(source, target, handles);
        let base = edge_id(source, target);
        let mut suffix = 1;
        while self.edge(&edge.id).is_some() {
            edge.id = format!("{base}-{suffix}");
            suffix += 1;
        }
        debug!(id = %edge.id, source, target, ?handles, "edge added");
        let id = edge.id.clone();
        self.edges.push(edge);
        Ok(id)
    }

    /// Handles for a connection being drawn between explicit handle ids.
    ///
    /// When both nodes resolve the closest pair wins; otherwise the raw ids are
    /// normalized so the pending line can still be drawn.
    pub fn route_connection(
        &self,
        source: &str,
        target: &str,
        raw_source_handle: Option<&str>,
        raw_target_handle: Option<&str>,
    ) -> HandlePair {
        NodeIndex::new(&self.nodes)
            .route(source, target)
            .unwrap_or_else(|| {
                HandlePair::new(
                    HandleId::normalize(raw_source_handle),
                    HandleId::normalize(raw_target_handle),
                )
            })
    }

    /// Commit a connection the user drew between explicit handles.
    ///
    /// With both endpoints present the edge is routed through the closest
    /// handles and its id is returned. Otherwise nothing is committed and only
    /// the normalized raw handles come back.
    pub fn connect_raw(
        &mut self,
        source: &str,
        target: &str,
        raw_source_handle: Option<&str>,
        raw_target_handle: Option<&str>,
    ) -> Result<(Option<String>, HandlePair), GraphError> {
        let handles = self.route_connection(source, target, raw_source_handle, raw_target_handle);
        if self.node(source).is_none() || self.node(target).is_none() {
            debug!(source, target, "connection endpoint missing, not committed");
            return Ok((None, handles));
        }
        let id = self.connect(source, target)?;
        Ok((Some(id), handles))
    }

    /// Delete a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<MindMapNode, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        let node = self.nodes.remove(index);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        info!(id, edges_removed = before - self.edges.len(), "node removed");
        Ok(node)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<MindMapEdge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::UnknownEdge(id.to_string()))?;
        Ok(self.edges.remove(index))
    }

    /// Move a node. Handles are re-routed on the next settle once the drag
    /// ends (`dragging == false`).
    pub fn move_node(
        &mut self,
        id: &str,
        position: Position,
        dragging: bool,
    ) -> Result<(), GraphError> {
        debug_assert!(position.is_finite(), "non-finite node position {position:?}");
        self.node_mut(id)?.position = position;
        if !dragging {
            self.unsettled = true;
        }
        Ok(())
    }

    /// Record the size the renderer measured for a node.
    pub fn measure_node(&mut self, id: &str, size: Size) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        if node.size != Some(size) {
            node.size = Some(size);
            self.unsettled = true;
        }
        Ok(())
    }

    pub fn set_node_color(&mut self, id: &str, color: Option<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.data.color = color;
        Ok(())
    }

    pub fn set_node_label(&mut self, id: &str, label: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.data.label = label.into();
        Ok(())
    }

    pub(crate) fn set_node_generation(
        &mut self,
        id: &str,
        generation: Option<u32>,
    ) -> Result<(), GraphError> {
        self.node_mut(id)?.data.generation = generation;
        Ok(())
    }

    /// Run the deferred re-routing pass if anything moved or resized since the
    /// last call. Returns the number of edges whose handles changed.
    pub fn settle(&mut self) -> usize {
        if !self.unsettled {
            return 0;
        }
        self.unsettled = false;
        let changed = self.reoptimize_edges();
        debug!(changed, "settled");
        changed
    }

    /// Re-route every edge immediately.
    pub fn reoptimize_edges(&mut self) -> usize {
        reoptimize_in_place(&self.nodes, &mut self.edges)
    }

    pub fn needs_reoptimization(&self) -> bool {
        needs_reoptimization(&self.nodes, &self.edges)
    }

    /// Node count per generation tag, ordered by generation.
    pub fn generation_summary(&self) -> Vec<GenerationCount> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for generation in self.nodes.iter().filter_map(MindMapNode::generation) {
            *counts.entry(generation).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(generation, count)| GenerationCount { generation, count })
            .collect()
    }

    pub fn set_generation_visibility(&mut self, generation: u32, visible: bool) {
        self.generations.set_visible(generation, visible);
    }

    /// Show or hide every generation present in the map.
    pub fn set_all_generations_visibility(&mut self, visible: bool) {
        let present: Vec<u32> = self
            .generation_summary()
            .into_iter()
            .map(|g| g.generation)
            .collect();
        self.generations.set_all_visible(present, visible);
    }

    pub fn toggle_generation_highlight(&mut self, generation: u32) -> Option<u32> {
        self.generations.toggle_highlight(generation)
    }

    pub fn highlighted_generation(&self) -> Option<u32> {
        self.generations.highlighted()
    }

    /// Untagged nodes are always visible.
    pub fn is_node_visible(&self, node: &MindMapNode) -> bool {
        node.generation()
            .is_none_or(|g| self.generations.is_visible(g))
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &MindMapNode> + '_ {
        self.nodes.iter().filter(move |n| self.is_node_visible(n))
    }

    /// Edges whose endpoints are both visible.
    pub fn visible_edges(&self) -> impl Iterator<Item = &MindMapEdge> + '_ {
        let visible: HashSet<&str> = self.visible_nodes().map(|n| n.id.as_str()).collect();
        self.edges.iter().filter(move |e| {
            visible.contains(e.source.as_str()) && visible.contains(e.target.as_str())
        })
    }
}
