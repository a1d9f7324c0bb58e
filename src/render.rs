//! SVG preview of a laid-out process, optionally coloured by run status.

use crate::bpmn::escape_xml;
use crate::config::RenderConfig;
use crate::ir::NodeKind;
use crate::layout::{Bounds, DiagramLayout, NodeLayout, Point};
use crate::simulate::RunStatus;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

const LINE_HEIGHT: f32 = 1.3;
const CHAR_WIDTH_RATIO: f32 = 0.6;

pub fn render_svg(
    layout: &DiagramLayout,
    theme: &Theme,
    config: &RenderConfig,
    statuses: Option<&HashMap<String, RunStatus>>,
) -> String {
    let extent = layout.extent().unwrap_or(Bounds {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    });
    // Room for labels drawn under events and gateways.
    let label_room = theme.font_size * LINE_HEIGHT * 2.0;
    let pad = config.padding;
    let min_x = extent.x as f32 - pad;
    let min_y = extent.y as f32 - pad;
    let width = (extent.w as f32 + pad * 2.0).max(200.0);
    let height = (extent.h as f32 + pad * 2.0 + label_room).max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"{min_x:.0} {min_y:.0} {width:.0} {height:.0}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{min_x:.0}\" y=\"{min_y:.0}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"8\" markerHeight=\"8\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for edge in &layout.edges {
        svg.push_str(&format!(
            "<polyline data-flow=\"{}\" points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" marker-end=\"url(#arrow)\"/>",
            escape_xml(&edge.id),
            points_attr(&edge.waypoints),
            theme.line_color
        ));
    }

    for node in &layout.nodes {
        let status = statuses.and_then(|map| map.get(&node.id)).copied();
        svg.push_str(&node_svg(node, status, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(node: &NodeLayout, status: Option<RunStatus>, theme: &Theme) -> String {
    let b = node.bounds;
    let cx = b.x as f32 + b.w as f32 / 2.0;
    let cy = b.y as f32 + b.h as f32 / 2.0;
    let stroke = status
        .map(|status| theme.status_color(status))
        .unwrap_or(theme.primary_border_color.as_str());
    let status_attr = status
        .map(|status| format!(" data-status=\"{}\"", status.as_str()))
        .unwrap_or_default();

    let mut out = format!("<g data-element=\"{}\"{status_attr}>", escape_xml(&node.id));
    match node.kind {
        NodeKind::Start | NodeKind::End => {
            let stroke_width = if node.kind == NodeKind::End { 4.0 } else { 2.0 };
            out.push_str(&format!(
                "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{:.1}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
                b.w.min(b.h) as f32 / 2.0,
                theme.primary_color
            ));
        }
        NodeKind::Task => {
            out.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
                b.x, b.y, b.w, b.h, theme.primary_color
            ));
        }
        NodeKind::ExclusiveGateway => {
            out.push_str(&format!(
                "<polygon points=\"{cx:.1},{} {},{cy:.1} {cx:.1},{} {},{cy:.1}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
                b.y,
                b.right(),
                b.bottom(),
                b.x,
                theme.primary_color
            ));
            let arm = b.w.min(b.h) as f32 / 6.0;
            out.push_str(&format!(
                "<path d=\"M {:.1} {:.1} L {:.1} {:.1} M {:.1} {:.1} L {:.1} {:.1}\" stroke=\"{}\" stroke-width=\"3\"/>",
                cx - arm,
                cy - arm,
                cx + arm,
                cy + arm,
                cx + arm,
                cy - arm,
                cx - arm,
                cy + arm,
                theme.primary_border_color
            ));
        }
    }

    if let Some(label) = node.label.as_deref().filter(|label| !label.is_empty()) {
        if node.kind == NodeKind::Task {
            let max_chars = ((b.w as f32 - 12.0) / (theme.font_size * CHAR_WIDTH_RATIO)).max(1.0);
            let lines = wrap_label(label, max_chars as usize);
            out.push_str(&text_block_svg(cx, cy, &lines, theme));
        } else {
            let lines = wrap_label(label, 24);
            let top = b.bottom() as f32 + 4.0;
            let block_height = lines.len() as f32 * theme.font_size * LINE_HEIGHT;
            out.push_str(&text_block_svg(cx, top + block_height / 2.0, &lines, theme));
        }
    }
    out.push_str("</g>");
    out
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_block_svg(x: f32, y: f32, lines: &[String], theme: &Theme) -> String {
    let line_height = theme.font_size * LINE_HEIGHT;
    let total_height = lines.len() as f32 * line_height;
    let start_y = y - total_height / 2.0 + theme.font_size;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.1}\" y=\"{start_y:.1}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        theme.font_family, theme.font_size, theme.primary_text_color
    ));
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.1}\" dy=\"{dy:.1}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

/// Greedy word wrap on character count. Words longer than a line are kept
/// whole.
fn wrap_label(label: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in label.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if !current.is_empty() && needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "Arial".to_string());
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::ProcessModel;
    use crate::layout::compute_layout;

    fn layout() -> DiagramLayout {
        let mut model = ProcessModel::new("P");
        model
            .add_node("s", NodeKind::Start, Some("Begin"))
            .add_node("g", NodeKind::ExclusiveGateway, None)
            .add_node("t", NodeKind::Task, Some("Check <stock> & reserve items for the order"))
            .add_node("e", NodeKind::End, None)
            .add_flow("f1", "s", "g")
            .add_flow("f2", "g", "t")
            .add_flow("f3", "g", "e")
            .add_flow("f4", "t", "e");
        compute_layout(&model, &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn svg_has_one_shape_per_node_and_edge() {
        let svg = render_svg(&layout(), &Theme::default(), &RenderConfig::default(), None);
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert_eq!(svg.matches("rx=\"10\"").count(), 1);
        assert_eq!(svg.matches("<polyline").count(), 4);
        assert!(svg.contains("Check &lt;stock&gt; &amp;"));
        assert!(!svg.contains("data-status"));
    }

    #[test]
    fn statuses_colour_nodes() {
        let theme = Theme::default();
        let mut statuses = HashMap::new();
        statuses.insert("t".to_string(), RunStatus::Failure);
        statuses.insert("s".to_string(), RunStatus::Success);
        let svg = render_svg(&layout(), &theme, &RenderConfig::default(), Some(&statuses));
        assert!(svg.contains("data-element=\"t\" data-status=\"failure\""));
        assert!(svg.contains(&format!("stroke=\"{}\"", theme.failure_color)));
        assert!(svg.contains(&format!("stroke=\"{}\"", theme.success_color)));
        assert_eq!(svg.matches("data-status").count(), 2);
    }

    #[test]
    fn wrap_label_breaks_on_words() {
        assert_eq!(
            wrap_label("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_label("supercalifragilistic", 5), vec!["supercalifragilistic"]);
        assert!(wrap_label("   ", 5).is_empty());
    }
}
