//! Node/edge list builders for standard topologies.
//!
//! Every generator returns plain `(Vec<SpatialNode>, Vec<SpatialEdge>)`
//! lists meant to be fed to [`SpatialGraph::new`](crate::SpatialGraph::new);
//! none of them touches a graph directly. Straight edges are left without
//! geometry so the graph derives the segment at insertion; only ring arcs
//! carry an explicit path.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use geo::euclidean_distance::EuclideanDistance;
use geo::Point;
use rand::Rng;

use crate::geometry::circle_arc;
use crate::{Error, Result, SpatialEdge, SpatialNode};

/// Distance between consecutive depths of a tree generator.
#[derive(Debug, Clone)]
pub enum StepSize {
    /// Depth `d` sits at distance `d * step` from the root.
    Uniform(f64),
    /// One explicit radial distance per depth, `len() == tree_depth`.
    PerDepth(Vec<f64>),
}

impl StepSize {
    fn resolve(&self, tree_depth: usize) -> Result<Vec<f64>> {
        match self {
            StepSize::Uniform(step) => {
                Ok((1..=tree_depth).map(|d| (d as f64) * step).collect())
            }
            StepSize::PerDepth(steps) => {
                if steps.len() != tree_depth {
                    return Err(Error::Parameter(format!(
                        "per-depth step sizes need exactly {} entries, got {}",
                        tree_depth,
                        steps.len()
                    )));
                }
                Ok(steps.clone())
            }
        }
    }
}

/// A rectangular lattice of `squares_per_line` x `nb_lines` cells.
///
/// Nodes are named `{prefix}_{column}_{row}`.
pub fn square_lattice_data(
    square_width: f64,
    square_height: f64,
    squares_per_line: usize,
    nb_lines: usize,
    prefix: &str,
) -> (Vec<SpatialNode>, Vec<SpatialEdge>) {
    let lattice_width = squares_per_line + 1;
    let lattice_height = nb_lines + 1;

    let mut nodes = Vec::with_capacity(lattice_width * lattice_height);
    for w in 0..lattice_width {
        for h in 0..lattice_height {
            nodes.push(SpatialNode::new(
                format!("{}_{}_{}", prefix, w, h),
                Point::new((w as f64) * square_width, (h as f64) * square_height),
            ));
        }
    }

    let mut edges = Vec::new();
    for h in 0..lattice_height - 1 {
        for w in 0..lattice_width {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, w, h),
                format!("{}_{}_{}", prefix, w, h + 1),
            ));
        }
    }
    for h in 0..lattice_height {
        for w in 0..lattice_width - 1 {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, w, h),
                format!("{}_{}_{}", prefix, w + 1, h),
            ));
        }
    }
    (nodes, edges)
}

/// A lattice of triangles, odd rows shifted by half a base.
pub fn triangle_lattice_data(
    nb_lines: usize,
    triangles_per_line: usize,
    triangle_base: f64,
    triangle_height: f64,
    prefix: &str,
) -> (Vec<SpatialNode>, Vec<SpatialEdge>) {
    let lattice_width = triangles_per_line + 1;
    let lattice_height = nb_lines + 1;

    let mut nodes = Vec::with_capacity(lattice_width * lattice_height);
    for w in 0..lattice_width {
        for h in 0..lattice_height {
            let shift = if h % 2 == 1 { 0.5 * triangle_base } else { 0. };
            nodes.push(SpatialNode::new(
                format!("{}_{}_{}", prefix, w, h),
                Point::new(
                    (w as f64) * triangle_base + shift,
                    (h as f64) * triangle_height,
                ),
            ));
        }
    }

    let mut edges = Vec::new();
    for h in 0..lattice_height - 1 {
        for w in 0..lattice_width {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, w, h),
                format!("{}_{}_{}", prefix, w, h + 1),
            ));
        }
    }
    for h in 0..lattice_height {
        for w in 0..lattice_width - 1 {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, w, h),
                format!("{}_{}_{}", prefix, w + 1, h),
            ));
        }
    }
    // diagonals alternate direction with row parity
    let mut h = 1;
    while h + 1 < lattice_height {
        for w in 0..lattice_width - 1 {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, w, h),
                format!("{}_{}_{}", prefix, w + 1, h + 1),
            ));
        }
        h += 2;
    }
    let mut h = 0;
    while h + 1 < lattice_height {
        for w in 1..lattice_width {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, w, h),
                format!("{}_{}_{}", prefix, w - 1, h + 1),
            ));
        }
        h += 2;
    }
    (nodes, edges)
}

/// A honeycomb of `hexagons_per_line` x `nb_lines` hexagons with side
/// `hexagon_base`. Every edge of the result has length `hexagon_base`.
pub fn hexagonal_lattice_data(
    hexagons_per_line: usize,
    nb_lines: usize,
    hexagon_base: f64,
    prefix: &str,
) -> (Vec<SpatialNode>, Vec<SpatialEdge>) {
    let half_height = 3f64.sqrt() / 2. * hexagon_base;
    let rows = 2 * nb_lines + 2;
    let cols = hexagons_per_line + 1;

    let mut grid = BTreeMap::new();
    for i in 0..cols {
        for j in 0..rows {
            let name = format!("{}_{}_{}", prefix, i, j);
            let stagger = ((j % 2) as f64) * ((i % 2) as f64 - 0.5) * hexagon_base;
            let x = 0.5 * hexagon_base + ((i + i / 2) as f64) * hexagon_base + stagger;
            grid.insert(name.clone(), SpatialNode::new(name, Point::new(x, half_height * (j as f64))));
        }
    }
    // the two outermost corners belong to no hexagon
    grid.remove(&format!("{}_0_{}", prefix, rows - 1));
    grid.remove(&format!(
        "{}_{}_{}",
        prefix,
        cols - 1,
        (rows - 1) * ((cols - 1) % 2)
    ));

    let mut edges = Vec::new();
    for i in 0..cols {
        for j in 0..rows - 1 {
            let start = format!("{}_{}_{}", prefix, i, j);
            let stop = format!("{}_{}_{}", prefix, i, j + 1);
            if grid.contains_key(&start) && grid.contains_key(&stop) {
                edges.push(SpatialEdge::new(start, stop));
            }
        }
    }
    for i in 0..cols - 1 {
        for j in 0..rows {
            if i % 2 != j % 2 {
                continue;
            }
            let start = format!("{}_{}_{}", prefix, i, j);
            let stop = format!("{}_{}_{}", prefix, i + 1, j);
            if grid.contains_key(&start) && grid.contains_key(&stop) {
                edges.push(SpatialEdge::new(start, stop));
            }
        }
    }

    let nodes = grid.into_iter().map(|(_, node)| node).collect();
    (nodes, edges)
}

/// A star of `number_of_branches` straight branches radiating from a
/// central node, optionally closed by circular rings at the given depths.
///
/// Nodes are named `{prefix}_{depth}_{branch}`; the center is
/// `{prefix}_0_0`. A ring at depth `d` connects the d-th node of every
/// branch to its neighbor with a circular arc around the center.
pub fn star_network_data(
    number_of_branches: usize,
    nodes_per_branch: usize,
    ring_depths: &[usize],
    prefix: &str,
) -> Result<(Vec<SpatialNode>, Vec<SpatialEdge>)> {
    let center = Point::new(0., 0.);
    let mut points = BTreeMap::new();
    points.insert(format!("{}_0_0", prefix), center);
    for r in 1..nodes_per_branch {
        for k in 0..number_of_branches {
            let theta = 2. * PI * (k as f64) / (number_of_branches as f64) + PI / 2.;
            points.insert(
                format!("{}_{}_{}", prefix, r, k),
                Point::new((r as f64) * theta.cos(), (r as f64) * theta.sin()),
            );
        }
    }

    let mut edges = Vec::new();
    for k in 0..number_of_branches {
        edges.push(SpatialEdge::new(
            format!("{}_0_0", prefix),
            format!("{}_1_{}", prefix, k),
        ));
    }
    for r in 1..nodes_per_branch.saturating_sub(1) {
        for k in 0..number_of_branches {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, r, k),
                format!("{}_{}_{}", prefix, r + 1, k),
            ));
        }
    }
    for &depth in ring_depths {
        if depth == 0 || depth >= nodes_per_branch {
            return Err(Error::Parameter(format!(
                "ring depth {} must lie strictly between 0 and nodes_per_branch {}",
                depth, nodes_per_branch
            )));
        }
        for k in 0..number_of_branches {
            let start = format!("{}_{}_{}", prefix, depth, k);
            let stop = format!(
                "{}_{}_{}",
                prefix,
                depth,
                (k + 1) % number_of_branches
            );
            let arc = circle_arc(points[&start], points[&stop], center, depth * 3);
            edges.push(SpatialEdge::new(start, stop).with_geometry(arc));
        }
    }

    let nodes = points
        .into_iter()
        .map(|(name, point)| SpatialNode::new(name, point))
        .collect();
    Ok((nodes, edges))
}

/// A regular tree fanned out vertically from `root`, each depth spread so
/// the leaves end up `leaf_spacing` apart, then rotated by `rotation`
/// degrees around the root.
///
/// A tree of depth 0 is the root alone.
pub fn regular_tree_data(
    branching_factor: usize,
    tree_depth: usize,
    leaf_spacing: f64,
    step_size: &StepSize,
    root: Point<f64>,
    rotation: f64,
    prefix: &str,
) -> Result<(Vec<SpatialNode>, Vec<SpatialEdge>)> {
    let step_sizes = step_size.resolve(tree_depth)?;

    let mut nodes = vec![SpatialNode::new(format!("{}_0_0", prefix), root)];
    let mut edges = Vec::new();

    let final_width = (branching_factor.pow(tree_depth as u32) as f64) * leaf_spacing;
    let (sin, cos) = (rotation * PI / 180.).sin_cos();

    for d in 1..=tree_depth {
        let number_of_nodes = branching_factor.pow(d as u32);
        let current_width = final_width - final_width / (number_of_nodes as f64);
        let s = step_sizes[d - 1];
        for n in 0..number_of_nodes {
            let x_delta = if number_of_nodes == 1 {
                0.
            } else {
                -current_width / 2.
                    + current_width * (n as f64) / ((number_of_nodes - 1) as f64)
            };
            let y_delta = s;
            nodes.push(SpatialNode::new(
                format!("{}_{}_{}", prefix, d, n),
                Point::new(
                    root.x() + cos * x_delta + sin * y_delta,
                    root.y() - sin * x_delta + cos * y_delta,
                ),
            ));
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, d - 1, n / branching_factor),
                format!("{}_{}_{}", prefix, d, n),
            ));
        }
    }
    Ok((nodes, edges))
}

/// A regular tree laid out radially: depth `d` forms a circle of radius
/// `step_sizes[d - 1]` around the root, optionally closed into rings.
pub fn circular_tree_data(
    branching_factor: usize,
    tree_depth: usize,
    step_size: &StepSize,
    ring_depths: &[usize],
    root: Point<f64>,
    prefix: &str,
) -> Result<(Vec<SpatialNode>, Vec<SpatialEdge>)> {
    let step_sizes = step_size.resolve(tree_depth)?;

    let mut nodes = vec![SpatialNode::new(format!("{}_0_0", prefix), root)];
    let mut edges = Vec::new();

    for d in 1..=tree_depth {
        let radius = step_sizes[d - 1];
        let number_of_nodes = branching_factor.pow(d as u32);
        // keep each parent centered below its children
        let offset = 2. * PI / (number_of_nodes as f64)
            * ((branching_factor.pow((d - 1) as u32) - 1) as f64)
            / 2.;
        for n in 0..number_of_nodes {
            let theta = 2. * PI * (n as f64) / (number_of_nodes as f64) - offset;
            nodes.push(SpatialNode::new(
                format!("{}_{}_{}", prefix, d, n),
                Point::new(root.x() + radius * theta.cos(), root.y() + radius * theta.sin()),
            ));
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, d - 1, n / branching_factor),
                format!("{}_{}_{}", prefix, d, n),
            ));
        }
    }

    for &depth in ring_depths {
        if depth == 0 || depth > tree_depth {
            return Err(Error::Parameter(format!(
                "ring depth {} must lie strictly between 0 and tree_depth {}",
                depth, tree_depth
            )));
        }
        let number_of_nodes = branching_factor.pow(depth as u32);
        for n in 0..number_of_nodes {
            edges.push(SpatialEdge::new(
                format!("{}_{}_{}", prefix, depth, n),
                format!("{}_{}_{}", prefix, depth, (n + 1) % number_of_nodes),
            ));
        }
    }
    Ok((nodes, edges))
}

/// Parameters for [`grid_tree_data`]: a central square lattice with four
/// tree-shaped suburbs grafted on its cardinal sides.
#[derive(Debug, Clone)]
pub struct GridTreeConfig {
    pub suburb_depth: usize,
    pub suburb_branching_factor: usize,
    pub suburb_leaf_spacing: f64,
    pub suburb_step_size: f64,
    pub suburb_spacing: f64,
    pub inner_square_height: f64,
    pub inner_square_width: f64,
    pub inner_semi_width: usize,
    pub inner_semi_height: usize,
}

impl Default for GridTreeConfig {
    fn default() -> Self {
        GridTreeConfig {
            suburb_depth: 4,
            suburb_branching_factor: 2,
            suburb_leaf_spacing: 1.,
            suburb_step_size: 1.,
            suburb_spacing: 1.,
            inner_square_height: 1.,
            inner_square_width: 1.,
            inner_semi_width: 5,
            inner_semi_height: 5,
        }
    }
}

/// A square lattice core (`inner_*` parameters) with four regular trees
/// rooted one `suburb_spacing` beyond the midpoint of each side, each
/// connected to the lattice by a single edge.
pub fn grid_tree_data(config: &GridTreeConfig) -> Result<(Vec<SpatialNode>, Vec<SpatialEdge>)> {
    let (mut nodes, mut edges) = square_lattice_data(
        config.inner_square_width,
        config.inner_square_height,
        2 * config.inner_semi_width,
        2 * config.inner_semi_height,
        "inner",
    );

    let mid_x = (config.inner_semi_width as f64) * config.inner_square_width;
    let mid_y = (config.inner_semi_height as f64) * config.inner_square_height;
    let suburbs = [
        ("west", 270., Point::new(-config.suburb_spacing, mid_y)),
        ("east", 90., Point::new(2. * mid_x + config.suburb_spacing, mid_y)),
        ("south", 180., Point::new(mid_x, -config.suburb_spacing)),
        ("north", 0., Point::new(mid_x, 2. * mid_y + config.suburb_spacing)),
    ];
    let step = StepSize::Uniform(config.suburb_step_size);
    for &(prefix, rotation, anchor) in &suburbs {
        let (suburb_nodes, suburb_edges) = regular_tree_data(
            config.suburb_branching_factor,
            config.suburb_depth,
            config.suburb_leaf_spacing,
            &step,
            anchor,
            rotation,
            prefix,
        )?;
        nodes.extend(suburb_nodes);
        edges.extend(suburb_edges);
    }

    edges.push(SpatialEdge::new(
        format!("inner_{}_0", config.inner_semi_width),
        "south_0_0",
    ));
    edges.push(SpatialEdge::new(
        format!(
            "inner_{}_{}",
            config.inner_semi_width,
            2 * config.inner_semi_height
        ),
        "north_0_0",
    ));
    edges.push(SpatialEdge::new(
        format!("inner_0_{}", config.inner_semi_height),
        "west_0_0",
    ));
    edges.push(SpatialEdge::new(
        format!(
            "inner_{}_{}",
            2 * config.inner_semi_width,
            config.inner_semi_height
        ),
        "east_0_0",
    ));
    Ok((nodes, edges))
}

/// A soft random geometric graph: `n_nodes` uniform positions in the unit
/// square, an edge between each pair with probability
/// `deterrence(distance)`.
pub fn soft_rgg_data<R, D>(
    n_nodes: usize,
    rng: &mut R,
    deterrence: D,
    prefix: &str,
) -> (Vec<SpatialNode>, Vec<SpatialEdge>)
where
    R: Rng + ?Sized,
    D: Fn(f64) -> f64,
{
    let mut nodes = Vec::with_capacity(n_nodes);
    for i in 0..n_nodes {
        let (x, y) = (rng.gen::<f64>(), rng.gen::<f64>());
        nodes.push(SpatialNode::new(format!("{}_{}", prefix, i), Point::new(x, y)));
    }

    let mut edges = Vec::new();
    for i in 0..n_nodes {
        for j in i + 1..n_nodes {
            let distance = nodes[i].geometry().euclidean_distance(&nodes[j].geometry());
            if rng.gen::<f64>() < deterrence(distance) {
                edges.push(SpatialEdge::new(nodes[i].name(), nodes[j].name()));
            }
        }
    }
    (nodes, edges)
}

/// The hard-threshold random geometric graph: nodes closer than
/// `2 * radius` are always connected, all others never.
pub fn random_geometric_graph_data<R>(
    n_nodes: usize,
    radius: f64,
    rng: &mut R,
    prefix: &str,
) -> (Vec<SpatialNode>, Vec<SpatialEdge>)
where
    R: Rng + ?Sized,
{
    soft_rgg_data(
        n_nodes,
        rng,
        |d| if d < 2. * radius { 1. } else { 0. },
        prefix,
    )
}
