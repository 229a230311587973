#[path = "experiments/assays.rs"]
mod assays;

use hopfield::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LETTERS: [(&str, &str); 4] = [
    ("T", "#####/..#../..#../..#../..#.."),
    ("L", "#..../#..../#..../#..../#####"),
    ("X", "#...#/.#.#./..#../.#.#./#...#"),
    ("O", ".###./#...#/#...#/#...#/.###."),
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }
    if args.len() >= 2 && args[1] == "assays" {
        assays::run(&args[2..]);
        return;
    }

    let mode = match args.get(1).map(String::as_str) {
        None | Some("demo") => LearningMode::Symmetric,
        Some("demo-asym") => LearningMode::Asymmetric,
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    };

    run_demo(mode);
}

fn letter_bits(rows: &str) -> Vec<bool> {
    rows.chars()
        .filter(|c| *c != '/')
        .map(|c| c == '#')
        .collect()
}

fn run_demo(mode: LearningMode) {
    // Minimal demo:
    // - store a few letter shapes on a 5x5 grid
    // - corrupt one of them
    // - relax and watch the energy fall back into the stored shape

    let mut net = Network::new(
        NetworkConfig::with_size(5, 5)
            .with_mode(mode)
            .with_seed(7),
    );

    for (name, rows) in LETTERS {
        match net.train(&letter_bits(rows)) {
            Ok(idx) => info!(idx, name, "trained"),
            Err(e) => {
                eprintln!("failed to train {name}: {e}");
                return;
            }
        }
    }

    let stats = net.weights().stats();
    println!(
        "trained {} patterns in {} mode (w min={:.1} max={:.1} mean|w|={:.2})",
        net.archive().len(),
        net.mode(),
        stats.min,
        stats.max,
        stats.mean_abs
    );

    // Cue: the T with three pixels flipped.
    let mut cue = letter_bits(LETTERS[0].1);
    for i in [0, 12, 18] {
        cue[i] = !cue[i];
    }
    if let Err(e) = net.set_state(&cue) {
        eprintln!("failed to load cue: {e}");
        return;
    }

    println!("\ncue (energy {:.2}):", net.energy());
    print!("{}", NetworkAdapter::new(&net).render_ascii());

    let mut driver = SimulationDriver::new();
    driver.run_with(RunConfig {
        max_steps: 200,
        interval_ms: 0,
    });
    driver.run_to_completion(&mut net, |tick| {
        if tick.report.changed() {
            println!(
                "t={:3} unit={:2} {:+.0} -> {:+.0} field={:+.1} energy={:.2}",
                tick.index,
                tick.report.unit,
                tick.report.previous,
                tick.report.output,
                tick.report.field,
                tick.energy,
            );
        }
    });

    let snap = NetworkAdapter::new(&net).snapshot();
    println!(
        "\nsettled={} after {} steps (energy {:.2}):",
        snap.settled, snap.diagnostics.step_count, snap.diagnostics.energy
    );
    print!("{}", NetworkAdapter::new(&net).render_ascii());
    match (snap.closest_pattern, snap.closest_distance) {
        (Some(idx), Some(dist)) => println!(
            "closest stored pattern: {} (distance {dist})",
            LETTERS.get(idx).map(|(n, _)| *n).unwrap_or("?")
        ),
        _ => println!("no stored patterns"),
    }
}

fn print_help() {
    println!("hopfield - associative memory demo");
    println!();
    println!("USAGE:");
    println!("  hopfield [demo]         Recall a corrupted letter (symmetric mode)");
    println!("  hopfield demo-asym      Same, with asymmetric (0/1) learning");
    println!("  hopfield assays [--json] [--asymmetric] [--seed N]");
    println!("                          Capacity sweep: recall quality vs stored patterns");
    println!();
    println!("Set RUST_LOG=debug for training and run logs.");
}
