//! Reconstructs a closed outline from loose line segments.
//!
//! Endpoints are snapped into shared nodes, dangling chains are pruned, and
//! the bounded faces of the resulting planar graph are traced by always
//! taking the sharpest left turn. The largest face wins.

use std::collections::HashSet;

use geo::{Area, Polygon};
use slotmap::SlotMap;

use crate::geometry::footprint::polygons_from_points;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Point2, TOLERANCE};

slotmap::new_key_type! {
    /// Unique identifier for a node in the segment graph.
    pub struct NodeId;
}

#[derive(Debug, Clone)]
struct NodeData {
    point: Point2,
    neighbours: Vec<NodeId>,
}

/// Undirected planar graph of snapped segment endpoints.
#[derive(Debug, Default)]
pub struct SegmentGraph {
    nodes: SlotMap<NodeId, NodeData>,
    snap_tolerance: f64,
}

impl SegmentGraph {
    #[must_use]
    pub fn new(snap_tolerance: f64) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            snap_tolerance,
        }
    }

    /// Returns the node within snap tolerance of `p`, inserting one if none.
    pub fn add_point(&mut self, p: Point2) -> NodeId {
        let existing = self
            .nodes
            .iter()
            .map(|(id, n)| (id, (n.point - p).norm()))
            .filter(|(_, d)| *d <= self.snap_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((id, _)) = existing {
            return id;
        }
        self.nodes.insert(NodeData {
            point: p,
            neighbours: Vec::new(),
        })
    }

    /// Adds a segment. Segments that collapse onto one node are ignored,
    /// as are duplicates.
    pub fn add_segment(&mut self, a: Point2, b: Point2) {
        let u = self.add_point(a);
        let v = self.add_point(b);
        if u == v {
            return;
        }
        let already = self.nodes.get(u).is_some_and(|n| n.neighbours.contains(&v));
        if already {
            return;
        }
        if let Some(n) = self.nodes.get_mut(u) {
            n.neighbours.push(v);
        }
        if let Some(n) = self.nodes.get_mut(v) {
            n.neighbours.push(u);
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.neighbours.len()).sum::<usize>() / 2
    }

    /// Repeatedly removes nodes of degree below 2.
    pub fn prune_dangles(&mut self) {
        loop {
            let dangling: Vec<NodeId> = self
                .nodes
                .iter()
                .filter(|(_, n)| n.neighbours.len() < 2)
                .map(|(id, _)| id)
                .collect();
            if dangling.is_empty() {
                break;
            }
            for id in dangling {
                if let Some(node) = self.nodes.remove(id) {
                    for other in node.neighbours {
                        if let Some(n) = self.nodes.get_mut(other) {
                            n.neighbours.retain(|x| *x != id);
                        }
                    }
                }
            }
        }
    }

    fn point(&self, id: NodeId) -> Option<Point2> {
        self.nodes.get(id).map(|n| n.point)
    }

    /// Next half-edge after `from → at`: the neighbour of `at` met first
    /// when rotating clockwise from the direction back to `from`.
    fn next_node(&self, from: NodeId, at: NodeId) -> Option<NodeId> {
        let origin = self.point(at)?;
        let back = self.point(from)? - origin;
        let back_angle = back.y.atan2(back.x);

        let node = self.nodes.get(at)?;
        let mut best: Option<(NodeId, f64)> = None;
        for &w in &node.neighbours {
            if w == from && node.neighbours.len() > 1 {
                continue;
            }
            let d = self.point(w)? - origin;
            let mut turn = back_angle - d.y.atan2(d.x);
            if turn <= 0.0 {
                turn += std::f64::consts::TAU;
            }
            if best.is_none_or(|(_, t)| turn < t) {
                best = Some((w, turn));
            }
        }
        best.map(|(w, _)| w)
    }

    /// Traces every face of the graph. Bounded faces come out
    /// counter-clockwise with positive signed area.
    #[must_use]
    pub fn faces(&self) -> Vec<Vec<Point2>> {
        let half_edges: usize = self.nodes.values().map(|n| n.neighbours.len()).sum();
        let mut visited: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut faces = Vec::new();

        for (start, node) in &self.nodes {
            for &next in &node.neighbours {
                if visited.contains(&(start, next)) {
                    continue;
                }
                let mut ring = Vec::new();
                let (mut u, mut v) = (start, next);
                let mut closed = false;
                for _ in 0..=half_edges {
                    if !visited.insert((u, v)) {
                        closed = u == start && v == next;
                        break;
                    }
                    if let Some(p) = self.point(u) {
                        ring.push(p);
                    }
                    match self.next_node(u, v) {
                        Some(w) => (u, v) = (v, w),
                        None => break,
                    }
                }
                if closed && ring.len() >= 3 {
                    faces.push(ring);
                }
            }
        }
        faces
    }
}

/// Builds the largest bounded polygon formed by `lines` (each a vertex
/// chain). Returns `None` when the lines enclose nothing.
#[must_use]
pub fn polygonize(lines: &[Vec<Point2>], snap_tolerance: f64) -> Option<Polygon<f64>> {
    let mut graph = SegmentGraph::new(snap_tolerance);
    for line in lines {
        for w in line.windows(2) {
            graph.add_segment(w[0], w[1]);
        }
    }
    graph.prune_dangles();
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "polygonizing loose segments"
    );

    graph
        .faces()
        .into_iter()
        .filter(|ring| signed_area_2d(ring) > TOLERANCE)
        .filter_map(|ring| polygons_from_points(&ring).ok())
        .flatten()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn seg(a: Point2, b: Point2) -> Vec<Point2> {
        vec![a, b]
    }

    #[test]
    fn four_loose_lines_make_a_square() {
        let lines = vec![
            seg(p(0.0, 0.0), p(10000.0, 0.0)),
            seg(p(10000.0, 0.0), p(10000.0, 10000.0)),
            seg(p(10000.0, 10000.0), p(0.0, 10000.0)),
            seg(p(0.0, 10000.0), p(0.0, 0.0)),
        ];
        let poly = polygonize(&lines, 50.0).unwrap();
        assert!((poly.unsigned_area() - 1e8).abs() < 1.0);
    }

    #[test]
    fn small_gaps_are_snapped() {
        let lines = vec![
            seg(p(0.0, 0.0), p(10000.0, 20.0)),
            seg(p(10030.0, 0.0), p(10000.0, 10000.0)),
            seg(p(10000.0, 10040.0), p(0.0, 10000.0)),
            seg(p(10.0, 10000.0), p(0.0, 10.0)),
        ];
        let poly = polygonize(&lines, 50.0).unwrap();
        assert!((poly.unsigned_area() - 1e8).abs() / 1e8 < 0.01);
    }

    #[test]
    fn wide_gap_is_not_closed() {
        let lines = vec![
            seg(p(0.0, 0.0), p(10000.0, 0.0)),
            seg(p(10000.0, 0.0), p(10000.0, 10000.0)),
            seg(p(10000.0, 10000.0), p(0.0, 10000.0)),
            seg(p(0.0, 10000.0), p(0.0, 500.0)),
        ];
        assert!(polygonize(&lines, 50.0).is_none());
    }

    #[test]
    fn dangling_spur_is_ignored() {
        let lines = vec![
            vec![p(0.0, 0.0), p(4000.0, 0.0), p(4000.0, 3000.0), p(0.0, 3000.0), p(0.0, 0.0)],
            seg(p(4000.0, 3000.0), p(6000.0, 5000.0)),
        ];
        let poly = polygonize(&lines, 50.0).unwrap();
        assert!((poly.unsigned_area() - 12e6).abs() < 1.0);
    }

    #[test]
    fn unnoded_divider_is_pruned() {
        // Two rooms sharing the wall at x = 6000.
        let lines = vec![
            seg(p(0.0, 0.0), p(10000.0, 0.0)),
            seg(p(10000.0, 0.0), p(10000.0, 5000.0)),
            seg(p(10000.0, 5000.0), p(0.0, 5000.0)),
            seg(p(0.0, 5000.0), p(0.0, 0.0)),
            seg(p(6000.0, 0.0), p(6000.0, 5000.0)),
        ];
        let mut graph = SegmentGraph::new(50.0);
        for l in &lines {
            graph.add_segment(l[0], l[1]);
        }
        // The divider's endpoints sit mid-edge and are not noded, so it
        // dangles and is pruned.
        graph.prune_dangles();
        assert_eq!(graph.node_count(), 4);

        let poly = polygonize(&lines, 50.0).unwrap();
        assert!((poly.unsigned_area() - 5e7).abs() < 1.0);
    }

    #[test]
    fn noded_rooms_trace_two_bounded_faces() {
        let corners = [
            p(0.0, 0.0),
            p(6000.0, 0.0),
            p(10000.0, 0.0),
            p(10000.0, 5000.0),
            p(6000.0, 5000.0),
            p(0.0, 5000.0),
        ];
        let mut graph = SegmentGraph::new(50.0);
        for i in 0..corners.len() {
            graph.add_segment(corners[i], corners[(i + 1) % corners.len()]);
        }
        graph.add_segment(p(6000.0, 0.0), p(6000.0, 5000.0));
        let bounded: Vec<f64> = graph
            .faces()
            .iter()
            .map(|f| signed_area_2d(f))
            .filter(|a| *a > 0.0)
            .collect();
        assert_eq!(bounded.len(), 2);
        let total: f64 = bounded.iter().sum();
        assert!((total - 5e7).abs() < 1.0);

        let lines: Vec<Vec<Point2>> = (0..corners.len())
            .map(|i| seg(corners[i], corners[(i + 1) % corners.len()]))
            .chain(std::iter::once(seg(p(6000.0, 0.0), p(6000.0, 5000.0))))
            .collect();
        let poly = polygonize(&lines, 50.0).unwrap();
        assert!((poly.unsigned_area() - 3e7).abs() < 1.0);
    }

    #[test]
    fn duplicate_segments_are_merged() {
        let mut graph = SegmentGraph::new(50.0);
        graph.add_segment(p(0.0, 0.0), p(1000.0, 0.0));
        graph.add_segment(p(1000.0, 0.0), p(0.0, 0.0));
        graph.add_segment(p(0.0, 0.0), p(10.0, 10.0));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }
}
