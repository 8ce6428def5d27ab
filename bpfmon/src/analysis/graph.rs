//! Graphviz rendering of the program/map relation
//!
//! One cluster per program type holds a box per program; maps are cylinders;
//! an edge links each program to every map it references. Node font size
//! grows with the program's length or the map's number of users.

use std::fs::{self, File, Permissions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use log::info;
use serde::Serialize;

use crate::analysis::Indexes;
use crate::domain::ReportError;
use crate::model::CollectionSpec;

/// Color scheme indices, picked by program type
const COLORS: [&str; 11] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11"];

const MAP_COLOR: &str = "#8fbbff";

/// Prefix of graph files created in the temp directory
pub const GRAPH_FILE_PREFIX: &str = "bpfmon-graph-";

const BASE_FONT_SIZE: f64 = 30.0;
const FONT_SIZE_RANGE: f64 = 40.0;

const TEMPLATE_NAME: &str = "graph";

const TEMPLATE: &str = r#"digraph {
  label     = "{{title}}"
  labelloc  = "t"
  fontsize  = 75
  fontcolor = "black"
  fontname  = "arial"
  overlap   = false
  splines   = true

  graph [pad=2, overlap=false]
  node [style="rounded", colorscheme=set311, shape=record, fontname="arial", margin=0.3, penwidth=3]
  edge [colorscheme=set311, penwidth=2]
{{#each maps}}
  {{id}} [label="{{label}}", fontsize={{size}}, shape=cylinder, color="{{color}}"]
{{~/each}}
{{#each clusters}}

  subgraph {{id}} {
    label = "{{label}}";
{{~#each nodes}}
    {{id}} [label="{{label}}", fontsize={{size}}, shape=box, color="{{color}}"]
{{~/each}}
  }
{{~/each}}
{{#each edges}}
  {{from}} -> {{to}} [arrowhead=none, color="{{color}}"]
{{~/each}}
}
"#;

#[derive(Debug, Serialize)]
struct Node {
    id: String,
    label: String,
    size: u32,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct Cluster {
    id: String,
    label: String,
    nodes: Vec<Node>,
}

#[derive(Debug, Serialize)]
struct Edge {
    from: String,
    to: String,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct Graph {
    title: String,
    clusters: Vec<Cluster>,
    maps: Vec<Node>,
    edges: Vec<Edge>,
}

/// Render the DOT description of an object
pub fn render_graph(title: &str, spec: &CollectionSpec, indexes: &Indexes) -> Result<String, ReportError> {
    let graph = prepare(title, spec, indexes)?;

    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(escape);
    handlebars.register_template_string(TEMPLATE_NAME, TEMPLATE)?;
    Ok(handlebars.render(TEMPLATE_NAME, &graph)?)
}

/// Render the graph and write it to `output`, or to a new file in the temp
/// directory. Returns the path written.
pub fn write_graph(
    title: &str,
    spec: &CollectionSpec,
    indexes: &Indexes,
    output: Option<&Path>,
) -> Result<PathBuf, ReportError> {
    let dot = render_graph(title, spec, indexes)?;

    let (mut file, path) = match output {
        Some(path) => (File::create(path)?, path.to_path_buf()),
        None => {
            let named = tempfile::Builder::new().prefix(GRAPH_FILE_PREFIX).suffix(".dot").tempfile()?;
            let (file, path) = named.keep().map_err(|err| err.error)?;
            // Readable by the invoking user when run under sudo
            fs::set_permissions(&path, Permissions::from_mode(0o644))?;
            (file, path)
        }
    };
    file.write_all(dot.as_bytes())?;

    info!("Graph generated: {}", path.display());
    Ok(path)
}

fn prepare(title: &str, spec: &CollectionSpec, indexes: &Indexes) -> Result<Graph, ReportError> {
    let mut clusters = Vec::new();
    for (index, (program_type, sections)) in indexes.program_types().enumerate() {
        let mut nodes = Vec::new();
        for section in sections {
            nodes.push(Node {
                id: node_id(section),
                label: section.clone(),
                size: font_size(indexes.program_weight(section)?),
                color: color(program_type.0),
            });
        }
        clusters.push(Cluster {
            id: format!("cluster_{index}"),
            label: program_type.to_string(),
            nodes,
        });
    }

    let mut maps = Vec::new();
    for map in &spec.maps {
        maps.push(Node {
            id: node_id(&map.name),
            label: map.name.clone(),
            size: font_size(indexes.map_weight(&map.name)?),
            color: MAP_COLOR,
        });
    }

    let mut edges = Vec::new();
    for program in &spec.programs {
        for map in indexes.maps_of(&program.section_name)?.keys() {
            edges.push(Edge {
                from: node_id(&program.section_name),
                to: node_id(map),
                color: color(program.program_type.0),
            });
        }
    }

    Ok(Graph { title: title.to_string(), clusters, maps, edges })
}

/// DOT identifier for a program or map: hex of the name, so any name is valid
fn node_id(name: &str) -> String {
    let mut id = String::with_capacity(1 + name.len() * 2);
    id.push('n');
    for byte in name.bytes() {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn font_size(weight: f64) -> u32 {
    (weight.clamp(0.0, 1.0) * FONT_SIZE_RANGE + BASE_FONT_SIZE).round() as u32
}

fn color(program_type: u32) -> &'static str {
    COLORS[program_type as usize % COLORS.len()]
}

/// Escape a value for use inside a double-quoted DOT string
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
