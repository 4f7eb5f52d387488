// crates/core/src/supervisor.rs
//! Lifecycle supervision of the bridge and agent subprocesses.
//!
//! At most one process per role is live at a time. Start and stop calls
//! serialize on a dedicated lock, so two near-simultaneous start calls cannot
//! both pass the "not already running" check; the loser observes the winner's
//! process and no-ops (bridge) or errors (agent). Status reads take only the
//! short-lived state mutex and never wait behind an in-flight readiness poll.
//!
//! The bridge must outlive the agent. Whenever the agent is observed to have
//! exited, the bridge is stopped too: it holds interaction state (an open
//! simulator browser session) that is unusable once the agent driving it is
//! gone, and leaving it up poisons the next start.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::SupervisorError;
use crate::probe::Prober;

/// Which of the two supervised processes a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    Bridge,
    Agent,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessRole::Bridge => write!(f, "bridge"),
            ProcessRole::Agent => write!(f, "agent"),
        }
    }
}

/// One spawned OS process. Liveness is derived on demand from the OS via
/// `try_wait`, never cached.
struct SupervisedProcess {
    role: ProcessRole,
    child: Child,
}

impl SupervisedProcess {
    fn spawn(role: ProcessRole, command: &[String], dir: &Path) -> Result<Self, SupervisorError> {
        let (program, args) = command.split_first().ok_or_else(|| SupervisorError::Spawn {
            role,
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        // Output is discarded: diagnostics live in the JSONL event log and
        // the process exit code. kill_on_drop covers exit paths that never
        // reach an orderly stop (panics included).
        let child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SupervisorError::Spawn { role, source })?;

        info!(role = %role, pid = ?child.id(), dir = %dir.display(), "spawned process");
        Ok(Self { role, child })
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Graceful-then-forced stop: termination request, bounded wait, kill.
    /// Never fails; cleanup paths must not raise.
    async fn stop(mut self, grace: Duration) {
        if !self.is_alive() {
            return;
        }
        self.request_termination();
        match timeout(grace, self.child.wait()).await {
            Ok(status) => {
                info!(role = %self.role, status = ?status.ok(), "process stopped");
            }
            Err(_) => {
                warn!(role = %self.role, grace_ms = grace.as_millis() as u64, "process ignored termination request, killing");
                let _ = self.child.kill().await;
            }
        }
    }

    /// Forced kill with no grace period, for startup failures.
    async fn kill_now(mut self) {
        let _ = self.child.kill().await;
    }

    #[cfg(unix)]
    fn request_termination(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        if let Some(pid) = self.child.id() {
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    fn request_termination(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// Caller-supplied knobs for an agent run.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Explicit session id; timestamp-derived when absent.
    pub session_id: Option<String>,
    /// Game speed multiplier.
    pub timewarp: u32,
    /// Decision-loop iteration limit.
    pub cycles: u32,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub airport: Option<String>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            session_id: None,
            timewarp: 10,
            cycles: 100,
            model: None,
            base_url: None,
            airport: None,
        }
    }
}

/// Point-in-time view of the supervised pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorStatus {
    pub running: bool,
    /// Set only while an agent is live.
    pub session_id: Option<String>,
    pub bridge_running: bool,
}

#[derive(Default)]
struct Inner {
    bridge: Option<SupervisedProcess>,
    agent: Option<SupervisedProcess>,
    session_id: Option<String>,
}

/// Owns the bridge/agent process handles and the current session id.
///
/// Constructed once at host startup and shared behind an `Arc`; route
/// handlers and the background reaper all go through the same instance.
pub struct Supervisor {
    config: Config,
    prober: Prober,
    /// Serializes start and stop sequences end to end. Held across the
    /// bridge readiness poll so only one start can be in flight, while
    /// `inner` stays free for status reads and the reaper.
    start_lock: Mutex<()>,
    inner: Mutex<Inner>,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        let prober = Prober::new(config.probe_timeout);
        Self {
            config,
            prober,
            start_lock: Mutex::new(()),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start the bridge and block until it reports healthy.
    /// No-op success when a bridge is already running.
    pub async fn start_bridge(&self) -> Result<(), SupervisorError> {
        let _start = self.start_lock.lock().await;
        self.start_bridge_serialized().await.map(|_| ())
    }

    /// Returns whether a process was freshly spawned (false = already running).
    ///
    /// Caller must hold `start_lock`. The handle stays on this stack frame
    /// during the readiness poll and is committed to `inner` only once
    /// healthy, so `status()` answers throughout without waiting.
    async fn start_bridge_serialized(&self) -> Result<bool, SupervisorError> {
        {
            let mut inner = self.inner.lock().await;
            if let Some(bridge) = inner.bridge.as_mut() {
                if bridge.is_alive() {
                    return Ok(false);
                }
                // stale handle from an earlier spontaneous exit
                inner.bridge = None;
            }
        }

        let dir = &self.config.bridge_dir;
        if !dir.is_dir() {
            return Err(SupervisorError::MissingDirectory {
                role: ProcessRole::Bridge,
                path: dir.clone(),
            });
        }

        let mut bridge = SupervisedProcess::spawn(ProcessRole::Bridge, &self.config.bridge_command, dir)?;

        let endpoint = self.config.bridge_endpoint();
        for _ in 0..self.config.ready_attempts {
            sleep(self.config.ready_poll_interval).await;
            if self.prober.probe(&endpoint).await {
                info!(url = %endpoint.url, "bridge ready");
                self.inner.lock().await.bridge = Some(bridge);
                return Ok(true);
            }
            if !bridge.is_alive() {
                return Err(SupervisorError::BridgeExitedDuringStartup);
            }
        }

        // Readiness ceiling exceeded: forced kill, not graceful.
        bridge.kill_now().await;
        let waited = self.config.ready_poll_interval * self.config.ready_attempts;
        Err(SupervisorError::BridgeNotReady {
            waited_secs: waited.as_secs(),
        })
    }

    /// Start the agent, starting the bridge first if needed.
    ///
    /// Returns the allocated session id immediately after the spawn; the
    /// agent's own event log is the readiness signal for observers. If the
    /// agent phase fails after a bridge was freshly started in this same
    /// call, the bridge is rolled back so a retry begins from `Stopped`.
    pub async fn start_agent(&self, options: AgentOptions) -> Result<String, SupervisorError> {
        let _start = self.start_lock.lock().await;

        {
            let mut inner = self.inner.lock().await;
            self.reap_locked(&mut inner).await;

            if let Some(agent) = inner.agent.as_mut() {
                if agent.is_alive() {
                    let session = inner.session_id.clone().unwrap_or_default();
                    return Err(SupervisorError::AgentAlreadyRunning(session));
                }
            }
        }

        let fresh_bridge = self.start_bridge_serialized().await?;
        let mut inner = self.inner.lock().await;
        match self.spawn_agent_locked(&mut inner, options) {
            Ok(session_id) => Ok(session_id),
            Err(err) => {
                let rollback = if fresh_bridge { inner.bridge.take() } else { None };
                drop(inner);
                if let Some(bridge) = rollback {
                    bridge.stop(self.config.stop_grace).await;
                }
                Err(err)
            }
        }
    }

    fn spawn_agent_locked(
        &self,
        inner: &mut Inner,
        options: AgentOptions,
    ) -> Result<String, SupervisorError> {
        let dir = &self.config.agent_dir;
        if !dir.is_dir() {
            return Err(SupervisorError::MissingDirectory {
                role: ProcessRole::Agent,
                path: dir.clone(),
            });
        }

        // The agent creates the log file lazily; we only guarantee the root.
        std::fs::create_dir_all(&self.config.logs_dir).map_err(|source| {
            SupervisorError::LogsDir {
                path: self.config.logs_dir.clone(),
                source,
            }
        })?;

        let session_id = options.session_id.unwrap_or_else(|| {
            format!("atc_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
        });

        let mut command = self.config.agent_command.clone();
        command.extend([
            "--headless".to_string(),
            "--bridge-url".to_string(),
            self.config.bridge_url.clone(),
            "--session".to_string(),
            session_id.clone(),
            "--cycles".to_string(),
            options.cycles.to_string(),
            "--loop-delay".to_string(),
            "0.5".to_string(),
            "--timewarp".to_string(),
            options.timewarp.to_string(),
        ]);
        if let Some(model) = &options.model {
            command.extend(["--model".to_string(), model.clone()]);
        }
        if let Some(base_url) = &options.base_url {
            command.extend(["--base-url".to_string(), base_url.clone()]);
        }
        if let Some(airport) = &options.airport {
            command.extend(["--airport".to_string(), airport.clone()]);
        }

        let agent = SupervisedProcess::spawn(ProcessRole::Agent, &command, dir)?;
        inner.agent = Some(agent);
        inner.session_id = Some(session_id.clone());
        info!(session = %session_id, "agent started");
        Ok(session_id)
    }

    /// Graceful-then-forced agent stop. No-op when nothing is running; the
    /// role state is cleared unconditionally afterward. Serialized behind
    /// any in-flight start so the stop lands on the started process.
    pub async fn stop_agent(&self) {
        let _start = self.start_lock.lock().await;
        let agent = {
            let mut inner = self.inner.lock().await;
            inner.session_id = None;
            inner.agent.take()
        };
        if let Some(agent) = agent {
            agent.stop(self.config.stop_grace).await;
        }
    }

    /// Graceful-then-forced bridge stop. No-op when nothing is running.
    pub async fn stop_bridge(&self) {
        let _start = self.start_lock.lock().await;
        let bridge = { self.inner.lock().await.bridge.take() };
        if let Some(bridge) = bridge {
            bridge.stop(self.config.stop_grace).await;
        }
    }

    /// Best-effort teardown for host shutdown: agent first, then bridge.
    /// Each step is independently error-swallowing.
    pub async fn stop_all(&self) {
        let _start = self.start_lock.lock().await;
        let (agent, bridge) = {
            let mut inner = self.inner.lock().await;
            inner.session_id = None;
            (inner.agent.take(), inner.bridge.take())
        };
        if let Some(agent) = agent {
            agent.stop(self.config.stop_grace).await;
        }
        if let Some(bridge) = bridge {
            bridge.stop(self.config.stop_grace).await;
        }
    }

    /// Observe process exits and apply the cascading-stop rule. Called from
    /// the status path and from a rate-limited background loop.
    pub async fn reap_exited(&self) {
        let mut inner = self.inner.lock().await;
        self.reap_locked(&mut inner).await;
    }

    async fn reap_locked(&self, inner: &mut Inner) {
        let agent_exited = match inner.agent.as_mut() {
            Some(agent) => !agent.is_alive(),
            None => false,
        };
        if agent_exited {
            warn!(session = ?inner.session_id, "agent exited on its own");
            inner.agent = None;
            inner.session_id = None;
            if let Some(bridge) = inner.bridge.take() {
                bridge.stop(self.config.stop_grace).await;
            }
        }
    }

    pub async fn status(&self) -> SupervisorStatus {
        let mut inner = self.inner.lock().await;
        self.reap_locked(&mut inner).await;
        let bridge_running = inner
            .bridge
            .as_mut()
            .map(|bridge| bridge.is_alive())
            .unwrap_or(false);
        let running = inner.agent.is_some();
        SupervisorStatus {
            running,
            session_id: if running { inner.session_id.clone() } else { None },
            bridge_running,
        }
    }
}
