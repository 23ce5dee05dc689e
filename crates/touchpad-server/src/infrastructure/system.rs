//! Host session control through platform commands, plus LAN address discovery.
//!
//! Screen locking tries a list of platform commands in order and stops at the
//! first that exits successfully:
//!
//! | Platform | Commands tried                                                       |
//! |----------|----------------------------------------------------------------------|
//! | Windows  | `rundll32 user32.dll,LockWorkStation`                                |
//! | macOS    | `pmset displaysleepnow`                                              |
//! | Linux    | `loginctl lock-session`, `gnome-screensaver-command --lock`,         |
//! |          | `xdg-screensaver lock`, `dm-tool lock`, `xscreensaver-command -lock` |
//!
//! Commands run through a [`CommandRunner`] so tests can script the outcome.

use std::io::ErrorKind;
use std::net::{IpAddr, UdpSocket};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::application::system::{HostDetails, SystemControl, SystemError};

/// Runs an external program to completion.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), SystemError>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
///
/// Programs that do not exit within `timeout` are killed and reported as
/// failed.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

impl ProcessRunner {
    const POLL_INTERVAL: Duration = Duration::from_millis(50);

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), SystemError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SystemError::Unavailable(format!("{program} not installed")),
                _ => SystemError::CommandFailed(format!("{program}: {e}")),
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(SystemError::CommandFailed(format!("{program} exited with {status}")))
                }
                Ok(None) if Instant::now() >= deadline => {
                    stop_child(program, &mut child);
                    return Err(SystemError::CommandFailed(format!(
                        "{program} timed out after {:?}",
                        self.timeout
                    )));
                }
                Ok(None) => thread::sleep(Self::POLL_INTERVAL),
                Err(e) => return Err(SystemError::CommandFailed(format!("{program}: {e}"))),
            }
        }
    }
}

/// Kills a timed-out child and reaps it.  Failures are logged; the caller
/// reports the timeout either way.
fn stop_child(program: &str, child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("could not kill timed-out {program} (pid {}): {e}", child.id());
    }
    if let Err(e) = child.wait() {
        warn!("could not reap timed-out {program} (pid {}): {e}", child.id());
    }
}

/// [`SystemControl`] for the machine the server runs on.
pub struct HostSystem<R = ProcessRunner> {
    runner: R,
}

impl<R: CommandRunner> HostSystem<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> SystemControl for HostSystem<R> {
    fn lock_screen(&self) -> Result<String, SystemError> {
        for command in LOCK_COMMANDS {
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            match self.runner.run(program, args) {
                Ok(()) => return Ok(command.join(" ")),
                Err(e) => debug!("lock via {program} failed: {e}"),
            }
        }
        warn!("no screen lock command succeeded");
        Err(SystemError::Unavailable("no screen lock command succeeded".into()))
    }

    fn shutdown(&self) -> Result<(), SystemError> {
        info!("issuing host shutdown");
        let (program, args) = SHUTDOWN_COMMAND;
        self.runner.run(program, args)
    }

    fn restart(&self) -> Result<(), SystemError> {
        info!("issuing host restart");
        let (program, args) = RESTART_COMMAND;
        self.runner.run(program, args)
    }

    fn host_details(&self) -> HostDetails {
        HostDetails {
            platform: platform_name().to_string(),
            version: os_version(),
            machine: std::env::consts::ARCH.to_string(),
        }
    }
}

// ── Platform tables ───────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
const LOCK_COMMANDS: &[&[&str]] = &[&["rundll32", "user32.dll,LockWorkStation"]];

#[cfg(target_os = "macos")]
const LOCK_COMMANDS: &[&[&str]] = &[&["pmset", "displaysleepnow"]];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LOCK_COMMANDS: &[&[&str]] = &[
    &["loginctl", "lock-session"],
    &["gnome-screensaver-command", "--lock"],
    &["xdg-screensaver", "lock"],
    &["dm-tool", "lock"],
    &["xscreensaver-command", "-lock"],
];

#[cfg(target_os = "windows")]
const SHUTDOWN_COMMAND: (&str, &[&str]) = ("shutdown", &["/s", "/t", "0"]);
#[cfg(target_os = "windows")]
const RESTART_COMMAND: (&str, &[&str]) = ("shutdown", &["/r", "/t", "0"]);

#[cfg(not(target_os = "windows"))]
const SHUTDOWN_COMMAND: (&str, &[&str]) = ("shutdown", &["now"]);
#[cfg(not(target_os = "windows"))]
const RESTART_COMMAND: (&str, &[&str]) = ("reboot", &[]);

fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "windows" => "Windows",
        "macos" => "Darwin",
        other => other,
    }
}

fn os_version() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(release) = std::fs::read_to_string("/proc/sys/kernel/osrelease") {
            return release.trim().to_string();
        }
    }
    "unknown".to_string()
}

// ── LAN address ───────────────────────────────────────────────────────────────

/// The address other LAN devices most likely reach this host on.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface, whose address is then read back.
pub fn lan_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
