use scatwind::core::{AmbiguityRemovalController, PassStep, RemovalConfig};
use scatwind::types::DTR;
use scatwind::{Ambiguity, LonLat, WindSwath, WindVector, WindVectorCell};

fn single_pass_config(min_neighbor_count: usize) -> RemovalConfig {
    RemovalConfig {
        window_size: 3,
        probability_threshold: 0.5,
        passes: vec![PassStep {
            min_neighbor_count,
            border_skip: 0,
            use_nudge: true,
            update_contaminated: true,
            rain_may_vote: true,
        }],
        ..RemovalConfig::default()
    }
}

fn resolved_cell(dir_deg: f32) -> WindVectorCell {
    let mut cell = WindVectorCell::new(
        LonLat::new(0.0, 0.0),
        vec![Ambiguity::new(8.0, dir_deg * DTR, 0.0)],
    );
    cell.select(0);
    cell
}

#[test]
fn test_streamline_center_follows_neighbor_consensus() {
    // 3x3 swath: the center cell is a streamline case (0 and 180 degrees,
    // equal objectives); all 8 neighbors carry a single resolved ambiguity
    // at 5 degrees.
    let mut swath = WindSwath::new(3, 3).expect("swath allocation");
    for cti in 0..3 {
        for ati in 0..3 {
            if cti == 1 && ati == 1 {
                continue;
            }
            swath.add(cti, ati, resolved_cell(5.0)).unwrap();
        }
    }
    let center = WindVectorCell::new(
        LonLat::new(0.0, 0.0),
        vec![
            Ambiguity::new(8.0, 0.0, 0.0),
            Ambiguity::new(8.0, 180.0 * DTR, 0.0),
        ],
    );
    swath.add(1, 1, center).unwrap();

    let controller = AmbiguityRemovalController::new(single_pass_config(3)).unwrap();
    let report = controller.run(&mut swath).expect("removal run");

    assert_eq!(report.cells_unresolved, 0);
    let selected = swath.get(1, 1).unwrap().selected().expect("center resolved");
    assert!(
        selected.direction.abs() < 1e-6,
        "center picked {} rad, expected the 0-degree ambiguity",
        selected.direction
    );
}

#[test]
fn test_streamline_tie_broken_by_nudge() {
    // A lone streamline cell with no neighborhood support: equal objectives,
    // directions exactly 180 degrees apart, nudge closer to the second.
    let mut swath = WindSwath::new(3, 3).unwrap();
    let mut cell = WindVectorCell::new(
        LonLat::new(0.0, 0.0),
        vec![
            Ambiguity::new(8.0, 90.0 * DTR, 0.0),
            Ambiguity::new(8.0, 270.0 * DTR, 0.0),
        ],
    );
    cell.nudge = Some(WindVector::new(7.0, 250.0 * DTR));
    swath.add(1, 1, cell).unwrap();

    let controller = AmbiguityRemovalController::new(single_pass_config(3)).unwrap();
    controller.run(&mut swath).unwrap();

    assert_eq!(
        swath.get(1, 1).unwrap().selected_rank(),
        Some(1),
        "nudge at 250 degrees must pick the 270-degree ambiguity"
    );

    // Mirror case: nudge closer to the first ambiguity
    let mut swath = WindSwath::new(3, 3).unwrap();
    let mut cell = WindVectorCell::new(
        LonLat::new(0.0, 0.0),
        vec![
            Ambiguity::new(8.0, 90.0 * DTR, 0.0),
            Ambiguity::new(8.0, 270.0 * DTR, 0.0),
        ],
    );
    cell.nudge = Some(WindVector::new(7.0, 100.0 * DTR));
    swath.add(1, 1, cell).unwrap();
    controller.run(&mut swath).unwrap();
    assert_eq!(swath.get(1, 1).unwrap().selected_rank(), Some(0));
}

#[test]
fn test_multi_pass_schedule_resolves_coherent_field() {
    // 10x10 coherent field at 40 degrees with two embedded streamline cells.
    let mut swath = WindSwath::new(10, 10).unwrap();
    for cti in 0..10 {
        for ati in 0..10 {
            if (cti, ati) == (4, 4) || (cti, ati) == (7, 2) {
                let mut cell = WindVectorCell::new(
                    LonLat::new(0.0, 0.0),
                    vec![
                        Ambiguity::new(9.0, 40.0 * DTR, 0.0),
                        Ambiguity::new(9.0, 220.0 * DTR, -0.5),
                    ],
                );
                cell.nudge = Some(WindVector::new(8.0, 35.0 * DTR));
                swath.add(cti, ati, cell).unwrap();
            } else {
                let cell = WindVectorCell::new(
                    LonLat::new(0.0, 0.0),
                    vec![Ambiguity::new(9.0, 40.0 * DTR, 0.0)],
                );
                swath.add(cti, ati, cell).unwrap();
            }
        }
    }

    let config = RemovalConfig {
        window_size: 3,
        probability_threshold: 0.4,
        passes: vec![
            PassStep {
                min_neighbor_count: 6,
                border_skip: 1,
                use_nudge: false,
                update_contaminated: false,
                rain_may_vote: false,
            },
            PassStep {
                min_neighbor_count: 3,
                border_skip: 0,
                use_nudge: true,
                update_contaminated: true,
                rain_may_vote: true,
            },
        ],
        ..RemovalConfig::default()
    };
    let controller = AmbiguityRemovalController::new(config).unwrap();
    let report = controller.run(&mut swath).unwrap();

    assert_eq!(report.cells_unresolved, 0);
    assert_eq!(report.pass_iterations.len(), 2);
    for cti in 0..10 {
        for ati in 0..10 {
            let cell = swath.get(cti, ati).unwrap();
            let dir = cell.selected().expect("resolved").direction;
            assert!(
                (dir - 40.0 * DTR).abs() < 1e-5,
                "cell ({}, {}) selected direction {}",
                cti,
                ati,
                dir
            );
        }
    }
}

#[test]
fn test_pass_is_idempotent_once_converged() {
    // Coherent field seeded at its leading rank, with two isolated cells
    // deliberately set to the reverse rank.
    let mut swath = WindSwath::new(6, 6).unwrap();
    for cti in 0..6 {
        for ati in 0..6 {
            let mut cell = WindVectorCell::new(
                LonLat::new(0.0, 0.0),
                vec![
                    Ambiguity::new(7.0, 120.0 * DTR, 0.0),
                    Ambiguity::new(6.0, 300.0 * DTR, -3.0),
                ],
            );
            cell.select(0);
            swath.add(cti, ati, cell).unwrap();
        }
    }
    swath.get_mut(1, 1).unwrap().select(1);
    swath.get_mut(4, 4).unwrap().select(1);

    let controller = AmbiguityRemovalController::new(single_pass_config(3)).unwrap();
    let first = controller.run(&mut swath).unwrap();
    assert_eq!(first.total_flips, 2, "only the two deviant cells change");

    let selections: Vec<Option<usize>> = (0..6)
        .flat_map(|cti| (0..6).map(move |ati| (cti, ati)))
        .map(|(cti, ati)| swath.get(cti, ati).unwrap().selected_rank())
        .collect();

    let second = controller.run(&mut swath).unwrap();
    assert_eq!(second.total_flips, 0, "converged field must not change");

    let after: Vec<Option<usize>> = (0..6)
        .flat_map(|cti| (0..6).map(move |ati| (cti, ati)))
        .map(|(cti, ati)| swath.get(cti, ati).unwrap().selected_rank())
        .collect();
    assert_eq!(selections, after);
}

#[test]
fn test_cells_without_ambiguities_stay_unselected() {
    let mut swath = WindSwath::new(4, 4).unwrap();
    for cti in 0..4 {
        for ati in 0..4 {
            if (cti, ati) == (2, 2) {
                swath
                    .add(cti, ati, WindVectorCell::new(LonLat::new(0.0, 0.0), Vec::new()))
                    .unwrap();
            } else {
                let cell = WindVectorCell::new(
                    LonLat::new(0.0, 0.0),
                    vec![Ambiguity::new(8.0, 60.0 * DTR, 0.0)],
                );
                swath.add(cti, ati, cell).unwrap();
            }
        }
    }

    let controller = AmbiguityRemovalController::new(single_pass_config(3)).unwrap();
    let report = controller.run(&mut swath).unwrap();

    assert!(swath.get(2, 2).unwrap().selected().is_none());
    // the empty cell is not counted as unresolved: it has nothing to resolve
    assert_eq!(report.cells_unresolved, 0);
    assert_eq!(report.cells_resolved, 15);
}
