//! Hopfield Daemon - hosts one associative-memory network for UI clients
//!
//! The daemon owns a single network plus its simulation driver and serves:
//! - Training, state loading and pattern recall
//! - Bounded relaxation runs paced by the configured tick interval
//! - Mode switches and grid resizes
//! - Newline-delimited JSON IPC (see `hopfield::protocol`)
//!
//! Configuration is read from `<config_dir>/hopfield/config.json`:
//! - Linux: ~/.config/hopfield/
//! - Windows: %APPDATA%\hopfield\
//! - MacOS: ~/Library/Application Support/hopfield/

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hopfield::driver::{RunConfig, SimulationDriver, Tick};
use hopfield::network::{Network, NetworkConfig};
use hopfield::observer::NetworkAdapter;
use hopfield::protocol::{Request, Response, StateSnapshot};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod paths;

use config::DaemonConfig;
use error::{DaemonError, Result};
use paths::AppPaths;

/// Upper bound for a single manual `Step` request.
const MAX_MANUAL_STEPS: u32 = 10_000;

/// Longest accepted request line, excluding the newline.
const MAX_LINE_BYTES: usize = 64 * 1024;

// ═══════════════════════════════════════════════════════════════════════════
// Daemon State
// ═══════════════════════════════════════════════════════════════════════════

struct DaemonState {
    net: Network,
    driver: SimulationDriver,
    run_defaults: RunConfig,
}

impl DaemonState {
    fn new(network: NetworkConfig, run_defaults: RunConfig) -> Self {
        Self {
            net: Network::new(network),
            driver: SimulationDriver::new(),
            run_defaults,
        }
    }

    /// Delay before the next tick: the active run's interval, or the
    /// configured default while idle.
    fn tick_delay(&self) -> Duration {
        let ms = if self.driver.is_running() {
            self.driver.interval_ms()
        } else {
            self.run_defaults.interval_ms
        };
        Duration::from_millis(ms.max(1) as u64)
    }

    fn tick(&mut self) -> Option<Tick> {
        let tick = self.driver.tick(&mut self.net)?;
        if tick.finished {
            info!(
                steps = tick.index,
                energy = tick.energy,
                closest = ?self.net.closest_pattern(),
                "run complete"
            );
        }
        Some(tick)
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            running: self.driver.is_running(),
            remaining_steps: self.driver.remaining(),
            interval_ms: if self.driver.is_running() {
                self.driver.interval_ms()
            } else {
                self.run_defaults.interval_ms
            },
            last_energy: self.driver.last_energy(),
            network: NetworkAdapter::new(&self.net).snapshot(),
        }
    }

    fn handle(&mut self, request: Request, shutdown: &CancellationToken) -> Response {
        match request {
            Request::GetState => Response::State(self.snapshot()),
            Request::ListPatterns => Response::Patterns {
                rows: self.net.rows(),
                cols: self.net.cols(),
                patterns: self
                    .net
                    .archive()
                    .iter()
                    .map(|p| p.bits().to_vec())
                    .collect(),
            },
            Request::Train { pattern } => match self.net.train(&pattern) {
                Ok(index) => success(format!("Trained pattern #{index}")),
                Err(e) => failure(e),
            },
            Request::SetState { pattern } => match self.net.set_state(&pattern) {
                Ok(()) => success("State set"),
                Err(e) => failure(e),
            },
            Request::RecallPattern { index } => match self.net.recall_pattern(index) {
                Ok(()) => success(format!("Recalled pattern #{index}")),
                Err(e) => failure(e),
            },
            Request::Step { count } => {
                if self.driver.is_running() {
                    return Response::Error {
                        message: "A run is in progress; stop it first".to_string(),
                    };
                }
                let count = count.clamp(1, MAX_MANUAL_STEPS);
                let changed = (0..count)
                    .filter_map(|_| self.net.step())
                    .filter(|r| r.changed())
                    .count();
                success(format!(
                    "Stepped {count} ({changed} changed), energy={:.3}",
                    self.net.energy()
                ))
            }
            Request::Run {
                max_steps,
                interval_ms,
            } => {
                let max_steps = max_steps.unwrap_or(self.run_defaults.max_steps);
                let interval_ms = interval_ms.unwrap_or(self.run_defaults.interval_ms);
                if self.driver.is_running() {
                    success("Run already in progress")
                } else if self.driver.run(max_steps, interval_ms) {
                    info!(max_steps, interval_ms, "run started");
                    success(format!("Running {max_steps} steps every {interval_ms} ms"))
                } else {
                    Response::Error {
                        message: "max_steps must be at least 1".to_string(),
                    }
                }
            }
            Request::Stop => {
                if self.driver.stop() {
                    success(format!("Stopped after {} steps", self.driver.completed()))
                } else {
                    success("Not running")
                }
            }
            Request::SetMode { mode } => match self.net.set_mode(mode) {
                Ok(()) => success(format!("Mode set to {mode}")),
                Err(e) => failure(e),
            },
            Request::Resize { rows, cols } => match self.net.resize(rows, cols) {
                Ok(()) => {
                    self.driver.stop();
                    success(format!(
                        "Resized to {}x{}; patterns cleared",
                        self.net.rows(),
                        self.net.cols()
                    ))
                }
                Err(e) => failure(e),
            },
            Request::Shutdown => {
                info!("Shutdown requested");
                self.driver.stop();
                shutdown.cancel();
                success("Shutting down")
            }
        }
    }
}

fn success(message: impl Into<String>) -> Response {
    Response::Success {
        message: message.into(),
    }
}

fn failure(e: impl std::fmt::Display) -> Response {
    Response::Error {
        message: e.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Client Handler
// ═══════════════════════════════════════════════════════════════════════════

/// Skip the rest of an oversized line. Returns `false` on end of stream.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<bool> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(false);
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(true);
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

async fn handle_client<R, W>(
    reader: R,
    mut writer: W,
    state: Arc<RwLock<DaemonState>>,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let mut limited = (&mut reader).take(MAX_LINE_BYTES as u64 + 1);
        let read = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = limited.read_until(b'\n', &mut buf) => read?,
        };
        if read == 0 {
            break;
        }

        let response = if buf.len() > MAX_LINE_BYTES && !buf.ends_with(b"\n") {
            warn!(limit = MAX_LINE_BYTES, "oversized request line dropped");
            let more = discard_line(&mut reader).await?;
            let response = Response::Error {
                message: format!("Request exceeds {MAX_LINE_BYTES} bytes"),
            };
            if !more {
                write_response(&mut writer, &response).await?;
                break;
            }
            response
        } else {
            match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => match serde_json::from_str::<Request>(line) {
                    Ok(request) => {
                        debug!(?request, "request");
                        let mut s = state.write().await;
                        s.handle(request, &shutdown)
                    }
                    Err(e) => Response::Error {
                        message: format!("Invalid request: {}", e),
                    },
                },
                Err(e) => Response::Error {
                    message: format!("Invalid request: not UTF-8 ({})", e),
                },
            }
        };

        write_response(&mut writer, &response).await?;
    }

    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    writer
        .write_all(serde_json::to_string(response)?.as_bytes())
        .await?;
    writer.write_all(b"\n").await?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

struct Args {
    addr: Option<String>,
    config: Option<PathBuf>,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        addr: None,
        config: None,
        seed: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || {
            it.next()
                .ok_or_else(|| DaemonError::Usage(format!("{flag} needs a value")))
        };
        match flag.as_str() {
            "--addr" => args.addr = Some(value()?),
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--seed" => {
                let raw = value()?;
                let seed = raw
                    .parse()
                    .map_err(|_| DaemonError::Usage(format!("--seed expects a number, got {raw}")))?;
                args.seed = Some(seed);
            }
            other => {
                return Err(DaemonError::Usage(format!(
                    "unknown flag {other} (expected --addr, --config, --seed)"
                )))
            }
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    let config_path = match args.config {
        Some(path) => path,
        None => {
            let paths = AppPaths::new()?;
            info!("Config directory: {:?}", paths.config_dir());
            paths.config_file()
        }
    };
    let mut cfg = DaemonConfig::load_or_default(&config_path)?;
    if let Some(addr) = args.addr {
        cfg.addr = addr;
    }
    if let Some(seed) = args.seed {
        cfg.network.seed = Some(seed);
    }
    cfg.network.validate()?;
    info!("Config file: {:?}", config_path);
    info!(
        rows = cfg.network.rows,
        cols = cfg.network.cols,
        mode = %cfg.network.mode,
        "network ready"
    );

    let state = Arc::new(RwLock::new(DaemonState::new(cfg.network, cfg.run)));
    let shutdown = CancellationToken::new();

    // Ctrl-C triggers the same graceful shutdown as a Shutdown request.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received");
                shutdown.cancel();
            }
        });
    }

    let listener = TcpListener::bind(&cfg.addr).await?;
    info!("Hopfield daemon listening on {}", cfg.addr);

    // Tick loop task: one driver tick per interval, under the write lock so a
    // step never interleaves with a request.
    let ticker = {
        let state = Arc::clone(&state);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                let delay = state.read().await.tick_delay();
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = time::sleep(delay) => {}
                }
                state.write().await.tick();
            }
        })
    };

    // Accept client connections
    loop {
        let (stream, addr) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            },
        };
        info!("Client connected: {}", addr);
        let state = Arc::clone(&state);
        let shutdown = shutdown.clone();

        tokio::spawn(async move {
            let (reader, writer) = stream.into_split();
            if let Err(e) = handle_client(reader, writer, state, shutdown).await {
                error!("Client handler error: {}", e);
            }
        });
    }

    if let Err(e) = ticker.await {
        error!("Tick task failed: {}", e);
    }
    info!("Daemon stopped");
    Ok(())
}
