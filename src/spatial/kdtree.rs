//! Two-dimensional k-d tree
//!
//! Nodes are stored flat in a `Vec` and reference children by index. Leaves
//! hold a contiguous run of the permuted point order. The tree is built once
//! and is read-only afterwards, so it can be shared across rayon workers.

/// Points per leaf before a node is split
pub const DEFAULT_LEAF_SIZE: usize = 16;

/// A neighbor returned by a query, identified by its input index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// Static k-d tree over planar points
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<[f64; 2]>,
    order: Vec<usize>,
    nodes: Vec<Node>,
    leaf_size: usize,
}

impl KdTree {
    /// Build a tree with the default leaf size
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self::with_leaf_size(points, DEFAULT_LEAF_SIZE)
    }

    /// Build a tree, splitting nodes larger than `leaf_size`
    pub fn with_leaf_size(points: Vec<[f64; 2]>, leaf_size: usize) -> Self {
        let mut tree = Self {
            order: (0..points.len()).collect(),
            points,
            nodes: Vec::new(),
            leaf_size: leaf_size.max(1),
        };
        if !tree.points.is_empty() {
            let n = tree.points.len();
            tree.build(0, n);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Recursively build the node covering `order[start..end]`, returning its id
    fn build(&mut self, start: usize, end: usize) -> usize {
        let id = self.nodes.len();

        if end - start <= self.leaf_size {
            self.nodes.push(Node::Leaf { start, end });
            return id;
        }

        // Split along the axis with the larger spread
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &i in &self.order[start..end] {
            let [x, y] = self.points[i];
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let axis = if max_x - min_x >= max_y - min_y { 0 } else { 1 };

        let points = &self.points;
        self.order[start..end].sort_by(|&a, &b| {
            points[a][axis]
                .total_cmp(&points[b][axis])
                .then(a.cmp(&b))
        });

        let mid = start + (end - start) / 2;
        let value = self.points[self.order[mid]][axis];

        // Reserve the slot, then fill children
        self.nodes.push(Node::Leaf { start, end });
        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[id] = Node::Split {
            axis,
            value,
            left,
            right,
        };
        id
    }

    /// Up to `k` nearest points within `radius` of `(x, y)`
    ///
    /// Results are ordered by distance, then by input index, so the selection
    /// is fully deterministic even when several points are equidistant.
    pub fn nearest(&self, x: f64, y: f64, k: usize, radius: f64) -> Vec<Neighbor> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        self.search(0, [x, y], k, radius * radius, &mut best);

        best.into_iter()
            .map(|(d2, index)| Neighbor {
                index,
                distance: d2.sqrt(),
            })
            .collect()
    }

    fn search(&self, node: usize, q: [f64; 2], k: usize, r2: f64, best: &mut Vec<(f64, usize)>) {
        match self.nodes[node] {
            Node::Leaf { start, end } => {
                for &i in &self.order[start..end] {
                    let [px, py] = self.points[i];
                    let d2 = (px - q[0]).powi(2) + (py - q[1]).powi(2);
                    if d2 <= r2 {
                        insert_bounded(best, k, (d2, i));
                    }
                }
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = q[axis] - value;
                let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };

                self.search(near, q, k, r2, best);

                // Only equality can still produce a lower index, so prune on
                // strictly greater
                let plane2 = diff * diff;
                let worst = if best.len() == k { best[k - 1].0 } else { r2 };
                if plane2 <= worst {
                    self.search(far, q, k, r2, best);
                }
            }
        }
    }
}

/// Insert into a list sorted by (distance, index), keeping at most `k`
fn insert_bounded(best: &mut Vec<(f64, usize)>, k: usize, item: (f64, usize)) {
    let pos = best.partition_point(|&(d, i)| d < item.0 || (d == item.0 && i < item.1));
    if pos >= k {
        return;
    }
    best.insert(pos, item);
    best.truncate(k);
}
