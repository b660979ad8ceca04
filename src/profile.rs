// Wi-Fi Monitor - Profile Installer
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Materializes a connection profile into NetworkManager and requests
//! association.
//!
//! The profile travels through a transient keyfile on disk. That file
//! carries the passphrase, so its removal is guaranteed on every exit
//! path by an RAII guard; a failed import or connect request must not
//! leave credential material behind.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{MonitorConfig, NetworkTarget};
use crate::nmcli::{CommandRunner, NmcliRunner};

/// Extra time granted to the association command beyond nmcli's own
/// `-w` wait, so the tool can report its result before being killed.
const CONNECT_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Installs a connection profile and requests association.
pub trait ProfileInstaller: Send {
    /// Replace any prior profile for the target and request association.
    ///
    /// Returns whether the OS accepted the connect request. This is a
    /// request acknowledgment, not proof of an established link.
    fn install(&self, target: &NetworkTarget) -> bool;
}

/// Installer backed by nmcli keyfile import.
pub struct NmcliInstaller {
    runner: Box<dyn CommandRunner>,
    command_timeout: Duration,
    connect_wait: Duration,
    temp_dir: PathBuf,
}

impl NmcliInstaller {
    pub fn new(config: &MonitorConfig) -> Self {
        Self::with_runner(Box::new(NmcliRunner), config, std::env::temp_dir())
    }

    pub fn with_runner(
        runner: Box<dyn CommandRunner>,
        config: &MonitorConfig,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            runner,
            command_timeout: config.status_timeout(),
            connect_wait: config.connect_wait(),
            temp_dir,
        }
    }

    /// Where the transient keyfile for a target would be written.
    /// Deterministic per process so tests can assert on cleanup.
    pub fn keyfile_path(&self, ssid: &str) -> PathBuf {
        self.temp_dir.join(format!(
            "{}-{}.nmconnection",
            sanitize_profile_name(ssid),
            std::process::id()
        ))
    }
}

impl ProfileInstaller for NmcliInstaller {
    fn install(&self, target: &NetworkTarget) -> bool {
        let ssid = target.ssid();

        // Step 1: drop any prior profile with this name. The profile may
        // not exist, so the result is ignored.
        self.runner.run(
            &["connection", "delete", "id", ssid],
            self.command_timeout,
        );

        // Steps 2-3: render the descriptor and persist it.
        let keyfile = match TempKeyfile::create(self.keyfile_path(ssid), &render_keyfile(target)) {
            Ok(keyfile) => keyfile,
            Err(e) => {
                warn!("Failed to write profile keyfile: {}", e);
                return false;
            }
        };

        // Step 4: request the import. Best-effort; the connect request
        // below is what decides the return value.
        let loaded = self
            .runner
            .run(
                &["connection", "load", &keyfile.path_string()],
                self.command_timeout,
            )
            .map(|out| out.success)
            .unwrap_or(false);
        if !loaded {
            debug!("Profile import for \"{}\" was not acknowledged", ssid);
        }

        // Step 5: request association.
        let wait_secs = self.connect_wait.as_secs().to_string();
        let accepted = self
            .runner
            .run(
                &["-w", &wait_secs, "connection", "up", "id", ssid],
                self.connect_wait + CONNECT_TIMEOUT_SLACK,
            )
            .map(|out| out.success)
            .unwrap_or(false);

        if accepted {
            info!("Connect request for \"{}\" accepted", ssid);
        } else {
            debug!("Connect request for \"{}\" rejected", ssid);
        }

        // Step 6: the keyfile guard drops here, removing the file no
        // matter how steps 4-5 went.
        accepted
    }
}

/// Render a NetworkManager keyfile for a WPA2-Personal (AES)
/// infrastructure network with automatic connection.
pub fn render_keyfile(target: &NetworkTarget) -> String {
    format!(
        "[connection]\n\
         id={ssid}\n\
         type=wifi\n\
         autoconnect=true\n\
         \n\
         [wifi]\n\
         mode=infrastructure\n\
         ssid={ssid}\n\
         \n\
         [wifi-security]\n\
         key-mgmt=wpa-psk\n\
         proto=rsn\n\
         pairwise=ccmp\n\
         group=ccmp\n\
         psk={psk}\n\
         \n\
         [ipv4]\n\
         method=auto\n\
         \n\
         [ipv6]\n\
         method=auto\n",
        ssid = target.ssid(),
        psk = target.passphrase(),
    )
}

/// Make a network name safe for use as a file name: spaces and path
/// metacharacters become dashes.
pub fn sanitize_profile_name(ssid: &str) -> String {
    ssid.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Scoped keyfile on disk: written with 0600 permissions at creation,
/// removed on drop.
struct TempKeyfile {
    path: PathBuf,
}

impl TempKeyfile {
    fn create(path: PathBuf, contents: &str) -> std::io::Result<Self> {
        fs::write(&path, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
        }
        Ok(Self { path })
    }

    fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyfile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove profile keyfile {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmcli::CmdOutput;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Per-invocation record: the joined argument string and whether the
    /// keyfile existed on disk at call time.
    type CallLog = Arc<Mutex<Vec<(String, bool)>>>;

    /// Stub runner that records each invocation and answers from a
    /// per-subcommand script.
    struct StubRunner {
        fail_load: bool,
        fail_up: bool,
        calls: CallLog,
    }

    impl CommandRunner for StubRunner {
        fn run(&self, args: &[&str], _timeout: Duration) -> Option<CmdOutput> {
            let joined = args.join(" ");
            let keyfile_present = args
                .iter()
                .find(|a| a.ends_with(".nmconnection"))
                .map(|a| Path::new(a).exists())
                .unwrap_or(false);
            self.calls.lock().unwrap().push((joined.clone(), keyfile_present));

            let success = if joined.starts_with("connection load") {
                !self.fail_load
            } else if joined.contains("connection up") {
                !self.fail_up
            } else {
                true
            };
            Some(CmdOutput {
                success,
                stdout: String::new(),
            })
        }
    }

    fn target() -> NetworkTarget {
        NetworkTarget::new("Home Net", "hunter2hunter2").unwrap()
    }

    /// Each test gets its own temp directory so parallel tests never
    /// share a keyfile path.
    fn installer(tag: &str, fail_load: bool, fail_up: bool) -> (NmcliInstaller, CallLog) {
        let dir = std::env::temp_dir().join(format!("wifi-monitor-test-{}", tag));
        fs::create_dir_all(&dir).unwrap();
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let stub = StubRunner {
            fail_load,
            fail_up,
            calls: Arc::clone(&calls),
        };
        (
            NmcliInstaller::with_runner(Box::new(stub), &MonitorConfig::default(), dir),
            calls,
        )
    }

    #[test]
    fn test_install_success_sequence() {
        let (installer, _) = installer("ok", false, false);
        assert!(installer.install(&target()));
        assert!(!installer.keyfile_path("Home Net").exists());
    }

    #[test]
    fn test_keyfile_removed_when_import_fails() {
        let (installer, _) = installer("import-fail", true, false);
        // Import failure is best-effort; the connect request decides.
        assert!(installer.install(&target()));
        assert!(!installer.keyfile_path("Home Net").exists());
    }

    #[test]
    fn test_keyfile_removed_when_connect_fails() {
        let (installer, _) = installer("connect-fail", false, true);
        assert!(!installer.install(&target()));
        assert!(!installer.keyfile_path("Home Net").exists());
    }

    #[test]
    fn test_command_sequence_and_keyfile_lifetime() {
        let (installer, calls) = installer("sequence", false, false);
        installer.install(&target());

        let recorded = calls.lock().unwrap();
        assert_eq!(recorded.len(), 3);
        assert!(recorded[0].0.starts_with("connection delete id"));
        assert!(recorded[1].0.starts_with("connection load"));
        // The keyfile is on disk while the import request runs.
        assert!(recorded[1].1);
        assert!(recorded[2].0.contains("connection up id Home Net"));
    }

    #[test]
    fn test_keyfile_rendering() {
        let rendered = render_keyfile(&target());
        assert!(rendered.contains("id=Home Net"));
        assert!(rendered.contains("ssid=Home Net"));
        assert!(rendered.contains("key-mgmt=wpa-psk"));
        assert!(rendered.contains("pairwise=ccmp"));
        assert!(rendered.contains("psk=hunter2hunter2"));
        assert!(rendered.contains("mode=infrastructure"));
        assert!(rendered.contains("autoconnect=true"));
    }

    #[test]
    fn test_sanitize_profile_name() {
        assert_eq!(sanitize_profile_name("Home Net"), "Home-Net");
        assert_eq!(sanitize_profile_name("cafe/5G:guest"), "cafe-5G-guest");
        assert_eq!(sanitize_profile_name("plain-name_1.2"), "plain-name_1.2");
    }
}
