mod render;
mod settings;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use graphview::{GenerationalResponse, MindMap, MindMapNode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::{Settings, parse_settings};

#[derive(Parser, Debug)]
#[command(name = "mindmap-viewer", version, about = "Lay out a mind map and render it as SVG")]
struct Args {
    /// KDL settings file with `layout` and `viewport` nodes
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Word-association response (JSON) to grow the map from
    #[arg(short = 'a', long = "associations")]
    associations: Option<PathBuf>,

    /// Root keyword used when no associations are given
    #[arg(short = 'k', long = "keyword", default_value = "Mind map")]
    keyword: String,

    /// Children placed around the root keyword
    #[arg(long = "children", default_value_t = 4)]
    children: usize,

    /// Unconnected nodes placed freely in the viewport
    #[arg(long = "free", default_value_t = 2)]
    free: usize,

    /// Seed for randomised placement
    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,

    /// Generation to leave out of the output; may be repeated
    #[arg(long = "hide-generation")]
    hide_generation: Vec<u32>,

    /// Generation to draw emphasized
    #[arg(long = "highlight")]
    highlight: Option<u32>,

    /// Output SVG file
    #[arg(short = 'o', long = "output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings {}", path.display()))?;
            parse_settings(&content)
                .with_context(|| format!("failed to load settings {}", path.display()))?
        }
        None => Settings::default(),
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut map = build_map(&args, settings, &mut rng)?;

    // Sizes are estimated from labels; edges are re-routed against them.
    let measured: Vec<(String, String)> = map
        .nodes()
        .iter()
        .map(|n| (n.id.clone(), n.label().to_string()))
        .collect();
    for (id, label) in measured {
        map.measure_node(&id, MindMapNode::estimate_size(&label))?;
    }
    let rerouted = map.settle();

    for generation in &args.hide_generation {
        map.set_generation_visibility(*generation, false);
    }
    if let Some(generation) = args.highlight {
        map.toggle_generation_highlight(generation);
    }

    let document = render::render_map(&map);
    svg::save(&args.output, &document)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        title = %map.title,
        nodes = map.nodes().len(),
        edges = map.edges().len(),
        rerouted,
        output = %args.output.display(),
        "mind map rendered"
    );
    Ok(())
}

fn build_map(args: &Args, settings: Settings, rng: &mut StdRng) -> Result<MindMap> {
    let mut map = MindMap::new(settings.layout, settings.viewport)?;

    if let Some(path) = &args.associations {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read associations {}", path.display()))?;
        let response = GenerationalResponse::from_json(&json)
            .with_context(|| format!("failed to parse associations {}", path.display()))?;
        map.set_title(response.keyword.clone().unwrap_or_default());
        map.populate_from_associations(&response, rng)?;
        return Ok(map);
    }

    map.set_title(args.keyword.as_str());
    let root = map.add_free_node(rng);
    map.set_node_label(&root, args.keyword.as_str())?;
    for i in 1..=args.children {
        map.add_child_node(&root, format!("Idea {i}"), rng)?;
    }
    for _ in 0..args.free {
        map.add_free_node(rng);
    }
    Ok(map)
}
