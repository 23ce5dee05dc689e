//! Remote Touchpad server: entry point.
//!
//! Serves the phone UI and the JSON API that turns touches on the phone into
//! pointer, keyboard and system actions on this machine.
//!
//! # Usage
//!
//! ```text
//! remote-touchpad [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Config file [default: platform config dir]
//!   --bind <IP>           Listen address [default: from config, 0.0.0.0]
//!   --port <PORT>         Listen port [default: from config, 8088]
//!   --static-dir <DIR>    Directory holding index.html for the phone UI
//!   --dry-run             Log input instead of injecting it
//!   --write-config        Write the effective config file and exit
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable        | Flag           |
//! |-----------------|----------------|
//! | `RT_CONFIG`     | `--config`     |
//! | `RT_BIND`       | `--bind`       |
//! | `RT_PORT`       | `--port`       |
//! | `RT_STATIC_DIR` | `--static-dir` |
//!
//! CLI flags and environment variables override values from the file.  The
//! log filter comes from `RUST_LOG`, falling back to `server.log_level`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::runtime::Handle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use touchpad_core::TouchpadEngine;
use touchpad_server::application::ApiService;
use touchpad_server::domain::ServerConfig;
use touchpad_server::infrastructure::config_store;
use touchpad_server::infrastructure::{
    create_backend, lan_address, HostSystem, HttpServer, ProcessRunner, TokioScheduler,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Use a phone browser as a touchpad and keyboard for this computer.
#[derive(Debug, Parser)]
#[command(name = "remote-touchpad", version)]
struct Cli {
    /// Path to config.toml.  Must exist when given.
    #[arg(long, env = "RT_CONFIG")]
    config: Option<PathBuf>,

    /// IP address to listen on.  `0.0.0.0` accepts phones on the LAN.
    #[arg(long, env = "RT_BIND")]
    bind: Option<String>,

    /// TCP port to listen on.
    #[arg(long, short, env = "RT_PORT")]
    port: Option<u16>,

    /// Directory holding the phone UI (`index.html` and assets).
    #[arg(long, env = "RT_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Log pointer and keyboard actions instead of injecting them.
    #[arg(long)]
    dry_run: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// Applies command-line overrides on top of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting bind address is not a valid IP.
    fn apply_overrides(&self, mut config: ServerConfig) -> anyhow::Result<ServerConfig> {
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = Some(dir.clone());
        }
        listen_addr(&config)?;
        Ok(config)
    }

    fn load_server_config(&self) -> anyhow::Result<ServerConfig> {
        let file = config_store::load_config(self.config.as_deref())
            .context("failed to load configuration")?;
        self.apply_overrides(file)
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_store::config_file_path().context("no config path available"),
        }
    }
}

fn listen_addr(config: &ServerConfig) -> anyhow::Result<SocketAddr> {
    config.server.socket_addr().with_context(|| {
        format!(
            "invalid bind address: '{}:{}'",
            config.server.bind_address, config.server.port
        )
    })
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_server_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    if cli.write_config {
        let path = cli.config_path()?;
        config_store::save_config(&path, &config)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("configuration written to {}", path.display());
        return Ok(());
    }

    let addr = listen_addr(&config)?;

    // ── Wiring ────────────────────────────────────────────────────────────────
    let backend = create_backend(cli.dry_run);
    let scheduler = Arc::new(TokioScheduler::new(Handle::current()));
    let engine = TouchpadEngine::new(
        config.touchpad.clone(),
        Arc::clone(&backend.pointer),
        scheduler,
    );
    let service = Arc::new(ApiService::new(
        engine.clone(),
        Arc::clone(&backend.pointer),
        Arc::clone(&backend.keyboard),
        Arc::new(HostSystem::new(ProcessRunner::default())),
        config.input.clone(),
        config.system.clone(),
    ));

    let server = HttpServer::bind(addr, config.server.static_dir.clone())?;
    let port = server.local_addr().port();
    info!("remote touchpad listening on http://{}", server.local_addr());
    match lan_address() {
        Some(ip) => info!("open http://{ip}:{port} on your phone"),
        None => warn!("could not determine a LAN address; use this host's IP with port {port}"),
    }
    if config.server.static_dir.is_none() {
        warn!("no static_dir configured; only the /api routes are served");
    }

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── Serve ─────────────────────────────────────────────────────────────────
    let workers = config.server.worker_threads;
    tokio::task::spawn_blocking(move || server.serve(service, running, workers))
        .await
        .context("HTTP server task failed")??;

    engine.shutdown();
    info!("remote touchpad stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        // Arrange
        let cli = Cli::parse_from(["remote-touchpad"]);

        // Act
        let config = cli.apply_overrides(ServerConfig::default()).unwrap();

        // Assert
        assert_eq!(config, ServerConfig::default());
        assert!(!cli.dry_run);
        assert!(!cli.write_config);
    }

    #[test]
    fn test_cli_port_and_bind_override_file_values() {
        let cli = Cli::parse_from(["remote-touchpad", "--bind", "127.0.0.1", "--port", "9001"]);
        let mut file = ServerConfig::default();
        file.server.port = 7000;

        let config = cli.apply_overrides(file).unwrap();

        assert_eq!(listen_addr(&config).unwrap(), "127.0.0.1:9001".parse().unwrap());
    }

    #[test]
    fn test_cli_short_port_flag() {
        let cli = Cli::parse_from(["remote-touchpad", "-p", "8123"]);
        assert_eq!(cli.port, Some(8123));
    }

    #[test]
    fn test_cli_static_dir_override() {
        let cli = Cli::parse_from(["remote-touchpad", "--static-dir", "templates"]);

        let config = cli.apply_overrides(ServerConfig::default()).unwrap();

        assert_eq!(config.server.static_dir, Some(PathBuf::from("templates")));
    }

    #[test]
    fn test_invalid_bind_address_is_error() {
        let cli = Cli::parse_from(["remote-touchpad", "--bind", "not.an.ip"]);

        let result = cli.apply_overrides(ServerConfig::default());

        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_config_path_is_used_for_writing() {
        let cli = Cli::parse_from(["remote-touchpad", "--config", "/tmp/rt.toml", "--write-config"]);

        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/tmp/rt.toml"));
        assert!(cli.write_config);
    }

    #[test]
    fn test_dry_run_flag() {
        let cli = Cli::parse_from(["remote-touchpad", "--dry-run"]);
        assert!(cli.dry_run);
    }
}
