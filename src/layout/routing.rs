use crate::config::LayoutConfig;

use super::types::{Bounds, Point, round_half_up};

/// Orthogonal polyline from the bottom-center of `source` to the top-center
/// of `target`.
///
/// Aligned endpoints get a single vertical segment. Otherwise the edge drops
/// to a horizontal rail, crosses to the target column and drops again. The
/// rail sits `edge_drop` below the shallower endpoint plus a share of the
/// vertical distance, which keeps long edges from cutting through the middle
/// of the diagram. Works for any relative position, including a target above
/// its source.
pub fn route_edge(source: &Bounds, target: &Bounds, config: &LayoutConfig) -> Vec<Point> {
    let exit = source.exit_point();
    let entry = target.entry_point();
    if exit.x == entry.x {
        return vec![exit, entry];
    }
    let shallow = f64::from(exit.y.min(entry.y));
    let span = f64::from((entry.y - exit.y).abs());
    let rail_y = round_half_up(shallow + config.edge_drop + config.edge_rail_bias * span);
    vec![
        exit,
        Point::new(exit.x, rail_y),
        Point::new(entry.x, rail_y),
        entry,
    ]
}
