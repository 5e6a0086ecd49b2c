//! Common test utilities for treemip integration tests.

#![allow(dead_code)]

use ndarray::Array2;
use rand::prelude::*;
use treemip::*;

/// Feasibility tolerance used by the integration tests
pub const TOLERANCE: f64 = 1e-9;

/// Bounds of the input variables created by [`input_model`]
pub const INPUT_BOUND: f64 = 10.0;

/// `x[feature] <= threshold ? left : right`
pub fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
    Tree::new(vec![
        TreeNode::split(feature, threshold, 1, 2),
        TreeNode::leaf(left),
        TreeNode::leaf(right),
    ])
    .unwrap()
}

/// Balanced depth-two tree over two features, leaves 1, 2, 3, 4 left to right
pub fn depth_two_tree() -> Tree {
    Tree::new(vec![
        TreeNode::split(0, 0.5, 1, 4),
        TreeNode::split(1, -1.0, 2, 3),
        TreeNode::leaf(1.0),
        TreeNode::leaf(2.0),
        TreeNode::split(1, 2.0, 5, 6),
        TreeNode::leaf(3.0),
        TreeNode::leaf(4.0),
    ])
    .unwrap()
}

/// Random tree in depth-first node order.
///
/// Thresholds and leaf values are multiples of 0.5 and 0.25, so they are
/// exact in `f32` and ties with grid inputs occur.
pub fn random_tree(rng: &mut StdRng, n_features: usize, max_depth: usize) -> Tree {
    fn grow(
        rng: &mut StdRng,
        nodes: &mut Vec<TreeNode>,
        depth: usize,
        max_depth: usize,
        n_features: usize,
    ) -> usize {
        let index = nodes.len();
        nodes.push(TreeNode::leaf(0.0));
        if depth < max_depth && (depth == 0 || rng.gen_bool(0.7)) {
            let feature = rng.gen_range(0..n_features);
            let threshold = rng.gen_range(-8i32..=8) as f64 * 0.5;
            let left = grow(rng, nodes, depth + 1, max_depth, n_features);
            let right = grow(rng, nodes, depth + 1, max_depth, n_features);
            nodes[index] = TreeNode::split(feature, threshold, left, right);
        } else {
            nodes[index] = TreeNode::leaf(rng.gen_range(-40i32..=40) as f64 * 0.25);
        }
        index
    }

    let mut nodes = Vec::new();
    grow(rng, &mut nodes, 0, max_depth.max(1), n_features);
    Tree::new(nodes).unwrap()
}

/// Random inputs on a 0.25 grid in `[-5, 5]`
pub fn random_inputs(rng: &mut StdRng, rows: usize, n_features: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, n_features), |_| rng.gen_range(-20i32..=20) as f64 * 0.25)
}

/// Fresh model with `rows x n_features` input variables in `[-10, 10]`
pub fn input_model(rows: usize, n_features: usize) -> (Model, Array2<VarId>) {
    let mut model = Model::new("test");
    let input = model.add_vars(
        (rows, n_features),
        -INPUT_BOUND,
        INPUT_BOUND,
        VarType::Continuous,
        "x",
    );
    (model, input)
}

/// Nodes from the root down to `target`, root first.
pub fn path_to(tree: &Tree, target: usize) -> Vec<usize> {
    let mut parent = vec![None; tree.capacity()];
    for (index, node) in tree.nodes().iter().enumerate() {
        if let Some((left, right)) = node.children() {
            parent[left] = Some(index);
            parent[right] = Some(index);
        }
    }
    let mut path = vec![target];
    let mut current = target;
    while let Some(p) = parent[current] {
        path.push(p);
        current = p;
    }
    path.reverse();
    path
}

/// Set every input variable to its value in `x`.
pub fn set_inputs(solution: &mut Solution, input: &Array2<VarId>, x: &Array2<f64>) {
    for (var, value) in input.iter().zip(x.iter()) {
        solution.set(*var, *value);
    }
}

/// Activate the path to `leaf` for example `k` and set the tree output.
pub fn route(solution: &mut Solution, tree: &Tree, constr: &DecisionTreeConstr, k: usize, leaf: usize) {
    let nodes = constr.node_vars();
    for n in 0..tree.capacity() {
        solution.set(nodes[[k, n]], 0.0);
    }
    for n in path_to(tree, leaf) {
        solution.set(nodes[[k, n]], 1.0);
    }
    solution.set(constr.output()[[k, 0]], tree.nodes()[leaf].value()[0]);
}

/// Route every example of a tree encoding to its native leaf.
pub fn route_native(solution: &mut Solution, tree: &Tree, constr: &DecisionTreeConstr, x: &Array2<f64>) {
    for (k, row) in x.rows().into_iter().enumerate() {
        let leaf = tree.predict_leaf_index(row).unwrap();
        route(solution, tree, constr, k, leaf);
    }
}

/// Leaves of example `k` that give a feasible completion when every other
/// example stays on its native path.
pub fn feasible_leaves(
    model: &Model,
    tree: &Tree,
    constr: &DecisionTreeConstr,
    x: &Array2<f64>,
    k: usize,
) -> Vec<usize> {
    let mut base = Solution::zeros(model.num_vars());
    set_inputs(&mut base, constr.input(), x);
    route_native(&mut base, tree, constr, x);
    feasible_leaves_from(model, &base, tree, constr, k, |_| {})
}

/// Leaves of example `k` that keep `base` feasible once rerouted and
/// passed through `fixup`.
pub fn feasible_leaves_from<F>(
    model: &Model,
    base: &Solution,
    tree: &Tree,
    constr: &DecisionTreeConstr,
    k: usize,
    fixup: F,
) -> Vec<usize>
where
    F: Fn(&mut Solution),
{
    tree.leaf_indices()
        .into_iter()
        .filter(|&leaf| {
            let mut candidate = base.clone();
            route(&mut candidate, tree, constr, k, leaf);
            fixup(&mut candidate);
            model.is_feasible(&candidate, TOLERANCE)
        })
        .collect()
}

/// Recompute the ensemble outputs from the member outputs in `solution`.
pub fn recombine(solution: &mut Solution, ensemble: &TreeEnsemble, constr: &TreeEnsembleConstr) {
    let aux = constr.estimator_vars();
    for k in 0..aux.nrows() {
        let values: Vec<f64> = aux.row(k).iter().map(|&v| solution.value(v)).collect();
        let y = match ensemble.combination() {
            Combination::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Combination::WeightedSumPlusBias { bias } => {
                bias + ensemble
                    .members()
                    .iter()
                    .zip(&values)
                    .map(|(m, v)| m.weight * v)
                    .sum::<f64>()
            }
        };
        solution.set(constr.output()[[k, 0]], y);
    }
}

/// Complete solution of an ensemble encoding that follows native predictions.
pub fn ensemble_native_solution(
    model: &Model,
    ensemble: &TreeEnsemble,
    constr: &TreeEnsembleConstr,
    x: &Array2<f64>,
) -> Solution {
    let mut solution = Solution::zeros(model.num_vars());
    set_inputs(&mut solution, constr.input(), x);
    for (tree, member) in ensemble.trees().zip(constr.estimators()) {
        route_native(&mut solution, tree, member, x);
    }
    for (k, row) in x.rows().into_iter().enumerate() {
        solution.set(constr.output()[[k, 0]], ensemble.predict(row).unwrap());
    }
    solution
}
