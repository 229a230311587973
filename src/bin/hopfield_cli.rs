//! CLI client for the `hopfieldd` daemon.
//!
//! Examples:
//!   hopfield-cli status
//!   hopfield-cli train 10101/01010/10101/01010/10101
//!   hopfield-cli set   #.#../.#.#./#.#../.#.#./#.#..
//!   hopfield-cli run 200 10
//!   hopfield-cli mode asymmetric
//!   hopfield-cli resize 3 4
//!
//! By default it talks to 127.0.0.1:9877; override with `--addr host:port`.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

use hopfield::protocol::{format_bits, parse_bits, Request, Response, StateSnapshot, DEFAULT_ADDR};
use hopfield::weights::LearningMode;

fn usage() -> ! {
    eprintln!("hopfield-cli (talks to hopfieldd @ {DEFAULT_ADDR} by default)");
    eprintln!("Usage: hopfield-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  status                      Show network state and grid");
    eprintln!("  patterns                    List trained patterns");
    eprintln!("  train <bits>                Store a pattern (e.g. 1010 or #.#.)");
    eprintln!("  set <bits>                  Load a state without training");
    eprintln!("  recall <index>              Load a stored pattern as the state");
    eprintln!("  step [n]                    Run n single-unit updates (default 1)");
    eprintln!("  run [steps] [ms]            Start a paced relaxation run");
    eprintln!("  stop                        Cancel the active run");
    eprintln!("  mode <symmetric|asymmetric> Switch learning mode and retrain");
    eprintln!("  resize <rows> <cols>        Rebuild the grid (clears patterns)");
    eprintln!("  shutdown                    Stop the daemon");
    eprintln!("\nBits: 1 # x * are on, 0 . - _ are off; '/' and spaces are ignored.");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = DEFAULT_ADDR.to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn send_request(addr: &str, req: &Request) -> Result<Response, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_state(s: StateSnapshot) {
    let d = &s.network.diagnostics;
    println!(
        "grid={}x{} mode={:<10} patterns={} steps={} active={}/{} energy={:.3}",
        d.rows,
        d.cols,
        d.mode,
        d.pattern_count,
        d.step_count,
        d.active_units,
        d.unit_count,
        d.energy,
    );
    println!(
        "run: running={} remaining={} interval={}ms last_energy={}",
        s.running,
        s.remaining_steps,
        s.interval_ms,
        s.last_energy
            .map(|e| format!("{e:.3}"))
            .unwrap_or_else(|| "-".to_string()),
    );
    match (s.network.closest_pattern, s.network.closest_distance) {
        (Some(idx), Some(dist)) => println!(
            "closest: pattern #{idx} at distance {dist} settled={}",
            s.network.settled
        ),
        _ => println!("closest: none settled={}", s.network.settled),
    }
    println!(
        "weights: min={:.3} max={:.3} mean_abs={:.3}",
        d.weights.min, d.weights.max, d.weights.mean_abs
    );
    println!("{}", format_bits(&s.network.state, d.cols));
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let make_error = |msg: &str| -> ! {
        eprintln!("{}", msg);
        process::exit(1);
    };
    let bits_arg = |args: &[String]| -> Vec<bool> {
        if args.len() < 2 {
            usage();
        }
        parse_bits(&args[1..].join(""))
            .unwrap_or_else(|| make_error("bits may only contain 1 # x * 0 . - _ / and spaces"))
    };

    let req = match cmd.as_str() {
        "status" => Request::GetState,
        "patterns" => Request::ListPatterns,
        "train" => Request::Train {
            pattern: bits_arg(&args),
        },
        "set" => Request::SetState {
            pattern: bits_arg(&args),
        },
        "recall" => {
            if args.len() < 2 {
                usage();
            }
            let index: usize = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("recall index must be a number"));
            Request::RecallPattern { index }
        }
        "step" => {
            let count: u32 = match args.get(1) {
                Some(n) => n
                    .parse()
                    .unwrap_or_else(|_| make_error("step count must be a number")),
                None => 1,
            };
            Request::Step { count }
        }
        "run" => {
            let max_steps = args.get(1).map(|n| {
                n.parse()
                    .unwrap_or_else(|_| make_error("steps must be a number"))
            });
            let interval_ms = args.get(2).map(|n| {
                n.parse()
                    .unwrap_or_else(|_| make_error("interval must be a number of milliseconds"))
            });
            Request::Run {
                max_steps,
                interval_ms,
            }
        }
        "stop" => Request::Stop,
        "mode" => {
            if args.len() < 2 {
                usage();
            }
            let mode: LearningMode = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("mode must be 'symmetric' or 'asymmetric'"));
            Request::SetMode { mode }
        }
        "resize" => {
            if args.len() < 3 {
                usage();
            }
            let dim = |s: &str| -> usize {
                s.parse()
                    .unwrap_or_else(|_| make_error("rows and cols must be numbers"))
            };
            Request::Resize {
                rows: dim(&args[1]),
                cols: dim(&args[2]),
            }
        }
        "shutdown" => Request::Shutdown,
        _ => usage(),
    };

    match send_request(&addr, &req) {
        Ok(Response::State(s)) => print_state(s),
        Ok(Response::Patterns {
            rows,
            cols,
            patterns,
        }) => {
            println!("{} pattern(s) on a {rows}x{cols} grid", patterns.len());
            for (i, p) in patterns.iter().enumerate() {
                println!("#{i}\n{}", format_bits(p, cols));
            }
        }
        Ok(Response::Success { message }) => println!("{message}"),
        Ok(Response::Error { message }) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed: {e}");
            process::exit(1);
        }
    }
}
