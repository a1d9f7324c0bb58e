use crate::config::{Footprint, LayoutConfig};
use crate::ir::NodeKind;

use super::types::{Bounds, round_half_up};

pub fn footprint(kind: NodeKind, config: &LayoutConfig) -> Footprint {
    match kind {
        NodeKind::Task => config.task_size,
        NodeKind::ExclusiveGateway => config.gateway_size,
        NodeKind::Start | NodeKind::End => config.event_size,
    }
}

/// Pixel rectangle for a node at `(level, column)`, horizontally centered on
/// its column so shapes of different widths stay aligned.
pub fn node_bounds(kind: NodeKind, level: usize, column: i32, config: &LayoutConfig) -> Bounds {
    let size = footprint(kind, config);
    let center_x = config.base_center_x + f64::from(column) * config.column_spacing;
    let top = config.top_margin + level as f64 * config.row_spacing;
    Bounds {
        x: round_half_up(center_x - size.width / 2.0),
        y: round_half_up(top),
        w: round_half_up(size.width),
        h: round_half_up(size.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_on_center_column() {
        let config = LayoutConfig::default();
        let bounds = node_bounds(NodeKind::Task, 1, 0, &config);
        assert_eq!(
            bounds,
            Bounds {
                x: 425,
                y: 220,
                w: 150,
                h: 90
            }
        );
    }

    #[test]
    fn events_and_gateways_share_the_column_center() {
        let config = LayoutConfig::default();
        for column in [-2, -1, 0, 1, 3] {
            let event = node_bounds(NodeKind::Start, 0, column, &config);
            let gateway = node_bounds(NodeKind::ExclusiveGateway, 0, column, &config);
            let task = node_bounds(NodeKind::Task, 0, column, &config);
            assert_eq!(event.center_x(), task.center_x());
            assert_eq!(gateway.center_x(), task.center_x());
        }
        let left = node_bounds(NodeKind::End, 2, -1, &config);
        assert_eq!(left.x, 500 - 260 - 18);
        assert_eq!(left.y, 80 + 2 * 140);
    }

    #[test]
    fn fractional_sizes_are_rounded() {
        let config = LayoutConfig {
            event_size: Footprint::new(35.0, 35.0),
            top_margin: 10.4,
            ..LayoutConfig::default()
        };
        let bounds = node_bounds(NodeKind::Start, 0, 0, &config);
        assert_eq!(bounds.x, 483);
        assert_eq!(bounds.y, 10);
        assert_eq!(bounds.w, 35);
    }

    #[test]
    fn deep_levels_keep_half_pixel_precision() {
        let config = LayoutConfig {
            top_margin: 80.5,
            ..LayoutConfig::default()
        };
        // 80.5 + 120_000 * 140 is past the range where f32 holds half pixels.
        let bounds = node_bounds(NodeKind::Task, 120_000, 0, &config);
        assert_eq!(bounds.y, 16_800_081);
    }
}
