//! Random forest and gradient boosting encoder integration tests.

use approx::assert_relative_eq;
use ndarray::array;
use rand::prelude::*;
use treemip::*;

mod common;
use common::*;

fn forest() -> TreeEnsemble {
    TreeEnsemble::random_forest(vec![
        stump(0, 0.0, 1.0, 3.0),
        stump(1, 1.0, -2.0, 6.0),
        depth_two_tree(),
    ])
    .unwrap()
}

fn boosting() -> TreeEnsemble {
    TreeEnsemble::gradient_boosting(
        vec![stump(0, 0.0, 1.0, 3.0), stump(1, 1.0, -2.0, 6.0), depth_two_tree()],
        0.1,
        12.5,
    )
    .unwrap()
}

#[test]
fn test_forest_output_is_mean() {
    let ensemble = forest();
    let x = array![[-1.0, 0.0], [2.0, 3.0]];
    let (mut model, input) = input_model(2, 2);
    let constr = add_random_forest_constr(
        &mut model,
        &ensemble,
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap();

    let solution = ensemble_native_solution(&model, &ensemble, &constr, &x);
    assert!(model.is_feasible(&solution, TOLERANCE));

    // (1 - 2 + 2) / 3 and (3 + 6 + 4) / 3
    let y = constr.output();
    assert_relative_eq!(solution.value(y[[0, 0]]), 1.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(solution.value(y[[1, 0]]), 13.0 / 3.0, epsilon = 1e-12);

    let mut shifted = solution.clone();
    shifted.set(y[[0, 0]], 1.0);
    assert!(!model.is_feasible(&shifted, TOLERANCE));
}

#[test]
fn test_boosting_output_is_weighted_sum_plus_constant() {
    let ensemble = boosting();
    let x = array![[-1.0, 0.0], [2.0, 3.0]];
    let (mut model, input) = input_model(2, 2);
    let constr = add_gradient_boosting_constr(
        &mut model,
        &ensemble,
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap();

    let solution = ensemble_native_solution(&model, &ensemble, &constr, &x);
    assert!(model.is_feasible(&solution, TOLERANCE));

    let y = constr.output();
    assert_relative_eq!(solution.value(y[[0, 0]]), 12.5 + 0.1 * 1.0, epsilon = 1e-12);
    assert_relative_eq!(solution.value(y[[1, 0]]), 12.5 + 0.1 * 13.0, epsilon = 1e-12);
}

#[test]
fn test_member_leaves_are_forced() {
    let ensemble = forest();
    let x = array![[0.0, 1.0]];
    let (mut model, input) = input_model(1, 2);
    let constr = add_random_forest_constr(
        &mut model,
        &ensemble,
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap();

    let base = ensemble_native_solution(&model, &ensemble, &constr, &x);
    for (tree, member) in ensemble.trees().zip(constr.estimators()) {
        let leaves = feasible_leaves_from(&model, &base, tree, member, 0, |solution| {
            recombine(solution, &ensemble, &constr)
        });
        assert_eq!(leaves, vec![tree.predict_leaf_index(x.row(0)).unwrap()]);
    }
}

#[test]
fn test_random_ensembles_match_native_prediction() {
    let mut rng = StdRng::seed_from_u64(2024);
    for round in 0..8 {
        let trees: Vec<Tree> = (0..4).map(|_| random_tree(&mut rng, 3, 3)).collect();
        let ensemble = if round % 2 == 0 {
            TreeEnsemble::random_forest(trees).unwrap()
        } else {
            TreeEnsemble::gradient_boosting(trees, 0.25, -1.5).unwrap()
        };
        let x = random_inputs(&mut rng, 3, 3);
        let (mut model, input) = input_model(3, 3);
        let constr = add_tree_ensemble_constr(
            &mut model,
            &ensemble,
            &input,
            None,
            "ensemble",
            &EncoderConfig::default(),
        )
        .unwrap();

        let solution = ensemble_native_solution(&model, &ensemble, &constr, &x);
        let violations = model.check_solution(&solution, TOLERANCE);
        assert!(violations.is_empty(), "round {}: {:?}", round, violations);
    }
}

#[test]
fn test_two_output_forest_adds_nothing() {
    let wide = Tree::new(vec![TreeNode::leaf_multi(vec![1.0, 2.0])]).unwrap();
    let ensemble = TreeEnsemble::random_forest(vec![wide.clone(), wide]).unwrap();
    let (mut model, input) = input_model(2, 1);
    let before = model.stats_snapshot();

    let err = add_predictor_constr(
        &mut model,
        &Predictor::RandomForest(ensemble),
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, TreeMipError::NoModel { .. }));
    assert_eq!(model.stats_snapshot(), before);
}

#[test]
fn test_two_output_boosting_adds_nothing() {
    let wide = Tree::new(vec![
        TreeNode::split(0, 0.0, 1, 2),
        TreeNode::leaf_multi(vec![1.0, 2.0]),
        TreeNode::leaf_multi(vec![3.0, 4.0]),
    ])
    .unwrap();
    let ensemble = TreeEnsemble::gradient_boosting(vec![wide.clone(), wide], 0.5, 1.0).unwrap();
    let (mut model, input) = input_model(2, 1);
    let before = model.stats_snapshot();

    let err = add_gradient_boosting_constr(
        &mut model,
        &ensemble,
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TreeMipError::NoModel { .. }));
    assert_eq!(model.stats_snapshot(), before);

    let err = add_predictor_constr(
        &mut model,
        &Predictor::GradientBoosting(ensemble),
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TreeMipError::NoModel { .. }));
    assert_eq!(model.stats_snapshot(), before);
}

#[test]
fn test_empty_boosting_is_constant() {
    let ensemble = TreeEnsemble::gradient_boosting(vec![], 0.1, 3.0).unwrap();
    let (mut model, input) = input_model(2, 1);
    let constr = add_gradient_boosting_constr(
        &mut model,
        &ensemble,
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap();

    assert!(constr.estimators().is_empty());
    assert_eq!(constr.estimator_vars().dim(), (2, 0));
    assert_eq!(constr.stats().linear_constraints, 2);

    let mut solution = Solution::zeros(model.num_vars());
    solution.set(constr.output()[[0, 0]], 3.0);
    solution.set(constr.output()[[1, 0]], 3.0);
    assert!(model.is_feasible(&solution, TOLERANCE));
}

#[test]
fn test_stats_add_up() {
    let ensemble = boosting();
    let (mut model, input) = input_model(2, 2);
    let constr = add_gradient_boosting_constr(
        &mut model,
        &ensemble,
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap();

    let members = constr.member_stats();
    let member_general: usize = constr
        .estimators()
        .iter()
        .map(|e| e.stats().general_constraints)
        .sum();
    assert_eq!(members.general_constraints, member_general);
    let own = constr.stats().added_since(&members);
    // outputs and the auxiliary matrix
    assert_eq!(own.variables, 2 + 2 * 3);
    // one combination row per example
    assert_eq!(own.linear_constraints, 2);
    assert_eq!(own.general_constraints, 0);
    assert_eq!(constr.stats().variables + 4, model.num_vars());
}

#[test]
fn test_print_stats_lists_estimators() {
    let ensemble = boosting();
    let (mut model, input) = input_model(1, 2);
    let constr = add_gradient_boosting_constr(
        &mut model,
        &ensemble,
        &input,
        None,
        &EncoderConfig::default(),
    )
    .unwrap();

    let mut buffer = Vec::new();
    constr.print_stats(&mut buffer, false).unwrap();
    let report = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[0], "Model for gbt:");
    let header = lines.iter().position(|l| l.starts_with("Estimator")).unwrap();
    assert!(lines[header + 2].starts_with('='));
    let rows: Vec<&&str> = lines.iter().filter(|l| l.starts_with("gbt_tree")).collect();
    assert_eq!(rows.len(), 3);
    assert!(lines.last().unwrap().starts_with('-'));
}
