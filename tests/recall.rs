//! End-to-end behavior of the network through the public API.

use hopfield::prelude::*;

fn random_pattern(rng: &mut Prng, n: usize) -> Vec<bool> {
    (0..n).map(|_| rng.next_bool()).collect()
}

fn weights_of<R: IndexSource>(net: &Network<R>) -> Vec<f32> {
    net.weights().as_grid().as_slice().to_vec()
}

#[test]
fn reset_zeroes_every_weight() {
    let mut w = WeightMatrix::new(9, LearningMode::Symmetric);
    w.learn(&[true, false, true, true, false, false, true, false, true])
        .unwrap();
    for n in [1, 4, 9, 16] {
        w.reset(n);
        assert_eq!(w.unit_count(), n);
        for i in 0..n {
            for j in 0..n {
                assert_eq!(w.weight(j, i), Some(0.0));
            }
        }
    }
}

#[test]
fn repeated_training_doubles_weights() {
    let pattern = [true, true, false, true, false, false];
    let mut once = Network::new(NetworkConfig::with_size(2, 3).with_seed(1));
    let mut twice = Network::new(NetworkConfig::with_size(2, 3).with_seed(1));

    once.train(&pattern).unwrap();
    twice.train(&pattern).unwrap();
    twice.train(&pattern).unwrap();

    for (a, b) in weights_of(&once).iter().zip(weights_of(&twice)) {
        assert_eq!(b, 2.0 * a);
    }
    assert_eq!(twice.archive().len(), 2);
}

#[test]
fn trained_weights_are_symmetric_in_both_modes() {
    let mut rng = Prng::new(17);
    for mode in [LearningMode::Symmetric, LearningMode::Asymmetric] {
        let mut net = Network::new(NetworkConfig::with_size(4, 4).with_mode(mode).with_seed(2));
        for _ in 0..5 {
            net.train(&random_pattern(&mut rng, 16)).unwrap();
        }
        let w = net.weights();
        assert!(w.is_symmetric());
        for i in 0..16 {
            assert_eq!(w.weight(i, i), Some(0.0));
            for j in 0..16 {
                assert_eq!(w.weight(j, i), w.weight(i, j));
            }
        }
    }
}

#[test]
fn mode_switch_matches_training_from_scratch() {
    let mut rng = Prng::new(5);
    let patterns: Vec<Vec<bool>> = (0..4).map(|_| random_pattern(&mut rng, 12)).collect();

    let mut switched = Network::new(NetworkConfig::with_size(3, 4).with_seed(3));
    for p in &patterns {
        switched.train(p).unwrap();
    }
    switched.set_mode(LearningMode::Asymmetric).unwrap();

    let mut fresh = Network::new(
        NetworkConfig::with_size(3, 4)
            .with_mode(LearningMode::Asymmetric)
            .with_seed(3),
    );
    for p in &patterns {
        fresh.train(p).unwrap();
    }

    assert_eq!(weights_of(&switched), weights_of(&fresh));
    assert_eq!(switched.archive().all(), fresh.archive().all());

    // And back again.
    switched.set_mode(LearningMode::Symmetric).unwrap();
    let mut sym = Network::new(NetworkConfig::with_size(3, 4).with_seed(3));
    for p in &patterns {
        sym.train(p).unwrap();
    }
    assert_eq!(weights_of(&switched), weights_of(&sym));
}

#[test]
fn duplicate_patterns_each_count_after_a_mode_switch() {
    let twice = [true, false, false, true, true, false];
    let once = [false, false, true, true, false, true];

    let mut switched = Network::new(NetworkConfig::with_size(2, 3).with_seed(3));
    switched.train(&twice).unwrap();
    switched.train(&once).unwrap();
    switched.train(&twice).unwrap();
    switched.set_mode(LearningMode::Asymmetric).unwrap();
    assert_eq!(switched.archive().len(), 3);

    let mut fresh = Network::new(
        NetworkConfig::with_size(2, 3)
            .with_mode(LearningMode::Asymmetric)
            .with_seed(3),
    );
    fresh.train(&twice).unwrap();
    fresh.train(&twice).unwrap();
    fresh.train(&once).unwrap();
    assert_eq!(weights_of(&switched), weights_of(&fresh));

    // Units 0 and 3 are both on only in the duplicated pattern.
    assert_eq!(switched.weights().weight(0, 3), Some(2.0));

    switched.set_mode(LearningMode::Symmetric).unwrap();
    let mut single = Network::new(NetworkConfig::with_size(2, 3).with_seed(3));
    single.train(&twice).unwrap();
    single.train(&once).unwrap();
    assert_ne!(weights_of(&switched), weights_of(&single));
    single.train(&twice).unwrap();
    assert_eq!(weights_of(&switched), weights_of(&single));
}

#[test]
fn single_stored_pattern_is_an_energy_minimum() {
    let mut rng = Prng::new(99);
    for _ in 0..5 {
        let pattern = random_pattern(&mut rng, 20);
        let mut net = Network::new(NetworkConfig::with_size(4, 5).with_seed(4));
        net.train(&pattern).unwrap();
        net.set_state(&pattern).unwrap();
        let stored = net.energy();

        for k in 0..pattern.len() {
            let mut neighbor = pattern.clone();
            neighbor[k] = !neighbor[k];
            net.set_state(&neighbor).unwrap();
            assert!(
                stored <= net.energy(),
                "flipping bit {k} lowered the energy"
            );
        }
    }
}

#[test]
fn step_changes_at_most_one_unit() {
    let mut rng = Prng::new(8);
    let mut net = Network::new(NetworkConfig::with_size(5, 5).with_seed(8));
    for _ in 0..3 {
        net.train(&random_pattern(&mut rng, 25)).unwrap();
    }
    net.set_state(&random_pattern(&mut rng, 25)).unwrap();

    for _ in 0..200 {
        let before = net.read_state();
        let report = net.step().unwrap();
        let after = net.read_state();
        let changed: Vec<usize> = (0..25).filter(|&i| before[i] != after[i]).collect();
        assert!(changed.len() <= 1);
        if let Some(&i) = changed.first() {
            assert_eq!(i, report.unit);
            assert!(report.changed());
        }
    }
    assert_eq!(net.step_count(), 200);
}

#[test]
fn two_by_two_scenario_weights_and_energy() {
    let mut net = Network::with_source(
        NetworkConfig::with_size(2, 2),
        ScriptedIndices::new(vec![0]),
    );
    net.train(&[true, false, true, false]).unwrap();

    let w = net.weights();
    let expected = [
        (1, 0, -1.0),
        (2, 0, 1.0),
        (3, 0, -1.0),
        (2, 1, -1.0),
        (3, 1, 1.0),
        (3, 2, -1.0),
    ];
    for (j, i, v) in expected {
        assert_eq!(w.weight(j, i), Some(v));
        assert_eq!(w.weight(i, j), Some(v));
    }
    for i in 0..4 {
        assert_eq!(w.weight(i, i), Some(0.0));
    }

    net.set_state(&[true, false, true, false]).unwrap();
    assert_eq!(net.energy(), -12.0);
}

#[test]
fn scripted_relaxation_reaches_the_stored_pattern() {
    let mut net = Network::with_source(
        NetworkConfig::with_size(2, 2),
        ScriptedIndices::new(vec![1, 3, 0, 2]),
    );
    net.train(&[true, false, true, false]).unwrap();
    net.set_state(&[true, true, true, true]).unwrap();

    // Unit 1: field = -1 - 1 + 1 = -1 -> off.
    let first = net.step().unwrap();
    assert_eq!(first.unit, 1);
    assert_eq!(net.read_state(), vec![true, false, true, true]);

    // Unit 3: field = -1 - 1 - 1 = -3 -> off.
    net.step().unwrap();
    assert_eq!(net.read_state(), vec![true, false, true, false]);

    net.step().unwrap();
    net.step().unwrap();
    assert_eq!(net.read_state(), vec![true, false, true, false]);
    assert!(net.is_settled());
    assert_eq!(net.closest_pattern(), Some((0, 0)));
}

#[test]
fn resize_clears_archive_and_step_counter() {
    let mut net = Network::new(NetworkConfig::with_size(5, 5).with_seed(6));
    let mut rng = Prng::new(6);
    net.train(&random_pattern(&mut rng, 25)).unwrap();
    net.train(&random_pattern(&mut rng, 25)).unwrap();
    for _ in 0..10 {
        net.step();
    }

    net.resize(3, 4).unwrap();

    assert_eq!(net.archive().all().len(), 0);
    assert_eq!(net.step_count(), 0);
    assert_eq!((net.rows(), net.cols()), (3, 4));
    assert_eq!(net.unit_count(), 12);
    assert_eq!(net.read_state(), vec![false; 12]);
    assert!(weights_of(&net).iter().all(|&w| w == 0.0));
    assert_eq!(
        net.train(&[true; 25]),
        Err(NetworkError::PatternLengthMismatch {
            expected: 12,
            actual: 25
        })
    );
}

#[test]
fn recall_survives_a_driver_run_in_either_mode() {
    let shapes = [
        "#...#.#.#...#...#.#.#...#",
        "..#....#..#####..#....#..",
    ];
    let bits = |s: &str| s.chars().map(|c| c == '#').collect::<Vec<bool>>();

    for mode in [LearningMode::Symmetric, LearningMode::Asymmetric] {
        let mut net = Network::new(
            NetworkConfig::with_size(5, 5)
                .with_mode(mode)
                .with_seed(21),
        );
        for s in shapes {
            net.train(&bits(s)).unwrap();
        }

        net.recall_pattern(1).unwrap();
        assert_eq!(net.read_state(), bits(shapes[1]));
        assert_eq!(net.closest_pattern(), Some((1, 0)));

        let mut driver = SimulationDriver::new();
        driver.run(100, 0);
        let ticks = driver.run_to_completion(&mut net, |_| {});
        assert_eq!(ticks, 100);
        assert_eq!(net.step_count(), 100);
    }
}

#[test]
fn observer_snapshot_does_not_disturb_the_network() {
    let mut net = Network::new(NetworkConfig::with_size(3, 3).with_seed(12));
    net.train(&[true, false, true, false, true, false, true, false, true])
        .unwrap();
    net.set_state(&[true; 9]).unwrap();

    let before = (net.read_state(), net.step_count(), net.energy());
    let adapter = NetworkAdapter::new(&net);
    let snap = adapter.snapshot();
    let ascii = adapter.render_ascii();

    assert_eq!(ascii, "###\n###\n###\n");
    assert_eq!(snap.state, before.0);
    assert_eq!(snap.diagnostics.energy, before.2);
    assert_eq!((net.read_state(), net.step_count(), net.energy()), before);
}
