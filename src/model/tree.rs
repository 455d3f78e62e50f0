//! Depth-limited regression tree used as the boosting base learner
//!
//! Splits minimise weighted squared error. Samples carry non-negative
//! weights (bootstrap multiplicities), so a weighted fit over the original
//! rows is equivalent to a plain fit over the resampled rows. Features are
//! sorted once per training set and shared by every tree fitted on it.

/// Column-major training features with a per-column ascending row order.
#[derive(Debug, Clone)]
pub(crate) struct SortedFeatures {
    columns: Vec<Vec<f64>>,
    order: Vec<Vec<usize>>,
}

impl SortedFeatures {
    pub fn new(columns: Vec<Vec<f64>>) -> Self {
        let order = columns
            .iter()
            .map(|col| {
                let mut idx: Vec<usize> = (0..col.len()).collect();
                idx.sort_by(|&a, &b| col[a].total_cmp(&col[b]).then(a.cmp(&b)));
                idx
            })
            .collect();
        Self { columns, order }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn value(&self, row: usize, feature: usize) -> f64 {
        self.columns[feature][row]
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Fit on every row with a positive weight.
    pub fn fit(data: &SortedFeatures, y: &[f64], weights: &[f64], max_depth: usize) -> Self {
        let members: Vec<usize> = (0..data.n_rows()).filter(|&i| weights[i] > 0.0).collect();
        let mut tree = Self { nodes: Vec::new() };
        let mut in_node = vec![false; data.n_rows()];
        tree.build(data, y, weights, members, 0, max_depth, &mut in_node);
        tree
    }

    /// Predict one row given a feature accessor.
    pub fn predict_by(&self, value_of: impl Fn(usize) -> f64) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if value_of(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.predict_by(|f| row[f])
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &mut self,
        data: &SortedFeatures,
        y: &[f64],
        weights: &[f64],
        members: Vec<usize>,
        depth: usize,
        max_depth: usize,
        in_node: &mut [bool],
    ) -> usize {
        let w_total: f64 = members.iter().map(|&i| weights[i]).sum();
        let wy_total: f64 = members.iter().map(|&i| weights[i] * y[i]).sum();
        let value = if w_total > 0.0 { wy_total / w_total } else { 0.0 };

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value });

        let pure = members.iter().all(|&i| y[i] == y[members[0]]);
        if depth >= max_depth || w_total < 2.0 || members.len() < 2 || pure {
            return idx;
        }

        for &i in &members {
            in_node[i] = true;
        }
        let split = best_split(data, y, weights, in_node, w_total, wy_total);
        for &i in &members {
            in_node[i] = false;
        }

        let Some(split) = split else {
            return idx;
        };

        let (left_members, right_members): (Vec<usize>, Vec<usize>) = members
            .into_iter()
            .partition(|&i| data.value(i, split.feature) <= split.threshold);

        let left = self.build(data, y, weights, left_members, depth + 1, max_depth, in_node);
        let right = self.build(data, y, weights, right_members, depth + 1, max_depth, in_node);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }
}

/// Best split of the rows flagged in `in_node`, maximising
/// `wy_left^2 / w_left + wy_right^2 / w_right` (equivalent to minimising the
/// weighted squared error). `None` when no split improves on the parent.
fn best_split(
    data: &SortedFeatures,
    y: &[f64],
    weights: &[f64],
    in_node: &[bool],
    w_total: f64,
    wy_total: f64,
) -> Option<SplitCandidate> {
    let parent = wy_total * wy_total / w_total;
    let mut best: Option<SplitCandidate> = None;

    for (feature, order) in data.order.iter().enumerate() {
        let column = &data.columns[feature];
        let mut w_left = 0.0;
        let mut wy_left = 0.0;
        let mut previous: Option<usize> = None;

        for &i in order.iter().filter(|&&i| in_node[i]) {
            if let Some(prev) = previous {
                if column[i] > column[prev] {
                    let w_right = w_total - w_left;
                    let wy_right = wy_total - wy_left;
                    if w_left > 0.0 && w_right > 0.0 {
                        let score = wy_left * wy_left / w_left + wy_right * wy_right / w_right;
                        if best.as_ref().map_or(true, |b| score > b.score) {
                            let mut threshold = (column[prev] + column[i]) / 2.0;
                            if threshold >= column[i] {
                                threshold = column[prev];
                            }
                            best = Some(SplitCandidate {
                                feature,
                                threshold,
                                score,
                            });
                        }
                    }
                }
            }
            w_left += weights[i];
            wy_left += weights[i] * y[i];
            previous = Some(i);
        }
    }

    best.filter(|b| b.score > parent + 1e-12 * parent.abs().max(1.0))
}
