use crate::layout::DiagramLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub process: String,
    pub depth: usize,
    pub columns: [i32; 2],
    pub width: i32,
    pub height: i32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub label: Option<String>,
    pub level: usize,
    pub column: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub points: Vec<[i32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &DiagramLayout) -> Self {
        let nodes: Vec<NodeDump> = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: node.kind.element_name().to_string(),
                label: node.label.clone(),
                level: node.level,
                column: node.column,
                x: node.bounds.x,
                y: node.bounds.y,
                width: node.bounds.w,
                height: node.bounds.h,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                from: edge.from.clone(),
                to: edge.to.clone(),
                points: edge.waypoints.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();

        let depth = nodes.iter().map(|node| node.level + 1).max().unwrap_or(0);
        let min_column = nodes.iter().map(|node| node.column).min().unwrap_or(0);
        let max_column = nodes.iter().map(|node| node.column).max().unwrap_or(0);
        let (width, height) = layout
            .extent()
            .map(|extent| (extent.w, extent.h))
            .unwrap_or((0, 0));

        LayoutDump {
            process: layout.process_id.clone(),
            depth,
            columns: [min_column, max_column],
            width,
            height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &DiagramLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

pub fn layout_dump_json(layout: &DiagramLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}
