//! KDL settings parsing for layout tuning and the initial viewport
//!
//! ```kdl
//! layout node_spacing=220 max_radial_expansions=#null
//! viewport width=1280 height=720 zoom=1.5
//! ```

use anyhow::{Result, bail};
use kdl::{KdlEntry, KdlNode, KdlValue};
use mindmap_layout::{LayoutConfig, Viewport};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub viewport: Viewport,
}

/// Parse a settings document. Missing nodes and entries keep their defaults.
pub fn parse_settings(content: &str) -> Result<Settings> {
    let doc = kdl::KdlDocument::parse(content)
        .map_err(|err| anyhow::anyhow!("invalid settings document: {err}"))?;

    let mut settings = Settings::default();
    for kdl_node in doc.nodes() {
        match kdl_node.name().value() {
            "layout" => apply_layout(kdl_node, &mut settings.layout)?,
            "viewport" => apply_viewport(kdl_node, &mut settings.viewport)?,
            other => warn!(node = other, "ignoring unknown settings node"),
        }
    }

    settings.layout.validate()?;
    settings.viewport.validate()?;
    Ok(settings)
}

fn apply_layout(kdl_node: &KdlNode, layout: &mut LayoutConfig) -> Result<()> {
    for (name, entry) in named_entries(kdl_node) {
        match name {
            "node_spacing" => layout.node_spacing = number(name, entry)?,
            "radial_distance" => layout.radial_distance = number(name, entry)?,
            "radial_step" => layout.radial_step = number(name, entry)?,
            "radial_threshold" => layout.radial_threshold = number(name, entry)?,
            "max_radial_expansions" => {
                layout.max_radial_expansions = match entry.value() {
                    KdlValue::Null => None,
                    _ => Some(count(name, entry)?),
                }
            }
            "node_width" => layout.default_node_size.width = number(name, entry)?,
            "node_height" => layout.default_node_size.height = number(name, entry)?,
            "viewport_margin" => layout.viewport_margin = number(name, entry)?,
            "grid_jitter" => layout.grid_jitter = number(name, entry)?,
            "grid_cell_limit" => layout.grid_cell_limit = count(name, entry)?,
            "random_attempts" => layout.random_attempts = count(name, entry)?,
            "spiral_angle_step" => layout.spiral_angle_step = number(name, entry)?,
            "forced_attempts" => layout.forced_attempts = count(name, entry)?,
            "forced_extent" => layout.forced_extent = number(name, entry)?,
            "forced_threshold_factor" => layout.forced_threshold_factor = number(name, entry)?,
            other => warn!(entry = other, "ignoring unknown layout setting"),
        }
    }
    Ok(())
}

fn apply_viewport(kdl_node: &KdlNode, viewport: &mut Viewport) -> Result<()> {
    for (name, entry) in named_entries(kdl_node) {
        match name {
            "x" => viewport.x = number(name, entry)?,
            "y" => viewport.y = number(name, entry)?,
            "zoom" => viewport.zoom = number(name, entry)?,
            "width" => viewport.width = number(name, entry)?,
            "height" => viewport.height = number(name, entry)?,
            other => warn!(entry = other, "ignoring unknown viewport setting"),
        }
    }
    Ok(())
}

/// Property entries only; positional arguments carry no name and are skipped.
fn named_entries(kdl_node: &KdlNode) -> impl Iterator<Item = (&str, &KdlEntry)> {
    kdl_node
        .entries()
        .iter()
        .filter_map(|e| e.name().map(|n| (n.value(), e)))
}

fn number(name: &str, entry: &KdlEntry) -> Result<f64> {
    let value = entry.value();
    match value.as_float().or_else(|| value.as_integer().map(|i| i as f64)) {
        Some(n) => Ok(n),
        None => bail!("setting `{name}` expects a number, got {value}"),
    }
}

fn count(name: &str, entry: &KdlEntry) -> Result<usize> {
    match entry.value().as_integer() {
        Some(n) if n >= 0 => Ok(usize::try_from(n)?),
        _ => bail!("setting `{name}` expects a non-negative integer, got {}", entry.value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
    }

    #[test]
    fn layout_and_viewport_entries_override_defaults() {
        let settings = parse_settings(
            "layout node_spacing=220 radial_step=25.5 max_radial_expansions=#null\n\
             viewport x=-100 y=50 zoom=2.0 width=1280 height=720\n",
        )
        .unwrap();

        assert_eq!(settings.layout.node_spacing, 220.0);
        assert_eq!(settings.layout.radial_step, 25.5);
        assert_eq!(settings.layout.max_radial_expansions, None);
        assert_eq!(settings.layout.radial_distance, 200.0);
        assert_eq!(settings.viewport.x, -100.0);
        assert_eq!(settings.viewport.zoom, 2.0);
        assert_eq!(settings.viewport.width, 1280.0);
    }

    #[test]
    fn unknown_entries_are_ignored() {
        let settings = parse_settings("layout colour=\"red\"\ntheme dark=#true\n").unwrap();
        assert_eq!(settings.layout, LayoutConfig::default());
    }

    #[test]
    fn wrong_value_types_are_rejected() {
        assert!(parse_settings("layout node_spacing=\"wide\"").is_err());
        assert!(parse_settings("layout random_attempts=-3").is_err());
    }

    #[test]
    fn invalid_values_fail_validation() {
        assert!(parse_settings("viewport zoom=0").is_err());
        assert!(parse_settings("layout node_spacing=-1").is_err());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_settings("layout node_spacing=").is_err());
    }
}
