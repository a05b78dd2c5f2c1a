//! App readiness: reuse a running app or start one and wait for it

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use voucherkit_common::config::AppConfig;

use crate::error::{E2eError, E2eResult};
use crate::process::{kill_group, terminate_group};

/// Handle to the app under test. A spawned app is stopped on drop.
pub struct AppServer {
    child: Option<Child>,
    base_url: String,
}

impl AppServer {
    /// Reuse the app at `base_url` if it answers, otherwise start it with
    /// `start_command` and wait until it does
    pub async fn ensure(config: &AppConfig) -> E2eResult<Self> {
        let probe = probe_url(&config.base_url, &config.probe_path);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        if is_ready(&client, &probe).await {
            info!("Reusing app already running at {}", config.base_url);
            return Ok(Self {
                child: None,
                base_url: config.base_url.clone(),
            });
        }

        let (program, args) = match config.start_command.split_first() {
            Some(split) => split,
            None => {
                return Err(E2eError::AppUnreachable {
                    url: probe,
                    attempts: 1,
                })
            }
        };

        info!("Starting app: {}", config.start_command.join(" "));
        let child = spawn_app(program, args)?;

        let mut server = Self {
            child: Some(child),
            base_url: config.base_url.clone(),
        };

        let timeout = Duration::from_secs(config.startup_timeout_secs);
        if let Err(e) = server.wait_for_ready(&client, &probe, timeout).await {
            let _ = server.stop();
            return Err(e);
        }

        info!("App is ready at {}", config.base_url);
        Ok(server)
    }

    async fn wait_for_ready(
        &mut self,
        client: &reqwest::Client,
        probe: &str,
        timeout: Duration,
    ) -> E2eResult<()> {
        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            if is_ready(client, probe).await {
                return Ok(());
            }
            let exited = self
                .child
                .as_mut()
                .and_then(|child| child.try_wait().ok().flatten());
            if let Some(status) = exited {
                // The leader is reaped; anything it started is still in its group
                if let Some(child) = self.child.take() {
                    kill_group(child.id());
                }
                return Err(E2eError::AppStartup(format!(
                    "start command exited early with {}",
                    status
                )));
            }
            if attempts == 1 {
                info!("Waiting for app to start...");
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::AppUnreachable {
            url: probe.to_string(),
            attempts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether this handle started the app
    pub fn spawned(&self) -> bool {
        self.child.is_some()
    }

    /// Stop a spawned app. No-op for a reused one.
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping app (pid: {})", child.id());

        // npm and friends start the real server as a grandchild, so the
        // whole process group is signalled
        if terminate_group(child.id()) {
            std::thread::sleep(Duration::from_millis(500));
        }
        kill_group(child.id());

        if let Err(e) = child.kill() {
            // Already exited after SIGTERM
            if e.kind() != std::io::ErrorKind::InvalidInput {
                warn!("Failed to kill app: {}", e);
            }
        }
        let _ = child.wait();

        Ok(())
    }
}

impl Drop for AppServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Start the app as the leader of a new process group
fn spawn_app(program: &str, args: &[String]) -> E2eResult<Child> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd.spawn()
        .map_err(|e| E2eError::AppStartup(format!("Failed to spawn {}: {}", program, e)))
}

/// `base_url` joined with `path`, without doubling the slash
pub fn probe_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Accepts 2xx, 3xx and 400-403, the same range Playwright's `webServer` accepts
pub fn is_ready_status(status: reqwest::StatusCode) -> bool {
    status.is_success() || status.is_redirection() || (400..=403).contains(&status.as_u16())
}

async fn is_ready(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(resp) => is_ready_status(resp.status()),
        Err(e) => {
            // Connection refused is expected while the app is starting
            if !e.is_connect() && !e.is_timeout() {
                warn!("Readiness check error: {}", e);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use test_case::test_case;

    #[test]
    fn test_probe_url() {
        assert_eq!(probe_url("http://localhost:3000", "/login"), "http://localhost:3000/login");
        assert_eq!(probe_url("http://localhost:3000/", "login"), "http://localhost:3000/login");
        assert_eq!(probe_url("http://localhost:3000", ""), "http://localhost:3000/");
    }

    #[test_case(StatusCode::OK, true ; "ok")]
    #[test_case(StatusCode::FOUND, true ; "redirect")]
    #[test_case(StatusCode::UNAUTHORIZED, true ; "unauthorized")]
    #[test_case(StatusCode::FORBIDDEN, true ; "forbidden")]
    #[test_case(StatusCode::NOT_FOUND, false ; "not found")]
    #[test_case(StatusCode::BAD_GATEWAY, false ; "bad gateway")]
    fn test_ready_statuses(status: StatusCode, ready: bool) {
        assert_eq!(is_ready_status(status), ready);
    }

    #[tokio::test]
    async fn test_unreachable_without_start_command() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = AppConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            start_command: Vec::new(),
            ..Default::default()
        };
        let err = AppServer::ensure(&config).await.err().unwrap();
        assert!(matches!(err, E2eError::AppUnreachable { attempts: 1, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_start_command_exiting_early() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = AppConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            start_command: vec!["false".to_string()],
            startup_timeout_secs: 10,
            ..Default::default()
        };
        let err = AppServer::ensure(&config).await.err().unwrap();
        assert!(matches!(err, E2eError::AppStartup(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_drop_stops_the_apps_children() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("server.pid");
        let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());

        let child = spawn_app("sh", &["-c".to_string(), script]).unwrap();
        let server = AppServer {
            child: Some(child),
            base_url: "http://127.0.0.1:1".to_string(),
        };

        let start = Instant::now();
        while !pid_file.exists() || std::fs::read_to_string(&pid_file).unwrap().trim().is_empty() {
            assert!(start.elapsed() < Duration::from_secs(5), "app never started");
            std::thread::sleep(Duration::from_millis(20));
        }
        let pid: i32 = std::fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        let pid = nix::unistd::Pid::from_raw(pid);

        drop(server);

        let deadline = Instant::now() + Duration::from_secs(5);
        while is_running(pid) {
            assert!(Instant::now() < deadline, "app child {} outlived the server handle", pid);
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    /// Alive and not a zombie waiting to be reaped
    #[cfg(unix)]
    fn is_running(pid: nix::unistd::Pid) -> bool {
        if nix::sys::signal::kill(pid, None).is_err() {
            return false;
        }
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => !stat
                .rsplit_once(')')
                .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z')),
            Err(_) => true,
        }
    }
}
