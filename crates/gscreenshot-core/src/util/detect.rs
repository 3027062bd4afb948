//! Session and tool detection
//!
//! This module answers the two questions backend selection depends on:
//! which kind of desktop session is running, and which external tools are
//! installed. Both are captured once in a [`SystemProbe`] so factories make
//! every decision against the same snapshot.

use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    model::{PlatformInfo, SessionType},
    util::scaling::{ScaleFactor, detect_scale_factor_with_env},
};

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Detects the current platform and session type
///
/// # Platform-specific behavior
///
/// - `$XDG_SESSION_TYPE` wins when it is `wayland` or `x11`
/// - otherwise a non-empty `$WAYLAND_DISPLAY` means Wayland
/// - otherwise a non-empty `$DISPLAY` means X11
/// - otherwise there is no graphical session
///
/// # Examples
///
/// ```
/// use gscreenshot_core::util::detect::detect_platform;
///
/// let platform = detect_platform();
/// println!("Running on: {} with session: {}", platform.os, platform.session);
/// ```
pub fn detect_platform() -> PlatformInfo {
    detect_platform_with_env(|key| env::var(key).ok())
}

/// Platform detection with a custom environment variable provider
pub fn detect_platform_with_env<F>(env_provider: F) -> PlatformInfo
where
    F: Fn(&str) -> Option<String>,
{
    PlatformInfo::new(env::consts::OS.to_string(), detect_session(&env_provider))
}

fn detect_session<F>(env_provider: &F) -> SessionType
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env_provider(key).filter(|v| !v.trim().is_empty());

    match non_empty("XDG_SESSION_TYPE")
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("wayland") => return SessionType::Wayland,
        Some("x11") => return SessionType::X11,
        _ => {}
    }

    if non_empty("WAYLAND_DISPLAY").is_some() {
        return SessionType::Wayland;
    }

    if non_empty("DISPLAY").is_some() {
        return SessionType::X11;
    }

    SessionType::None
}

/// Snapshot of the environment that backend selection depends on
#[derive(Clone)]
pub struct SystemProbe {
    session:     SessionType,
    search_path: Vec<PathBuf>,
    scale:       ScaleFactor,
    env:         EnvLookup,
}

impl SystemProbe {
    /// Probes the real process environment
    pub fn detect() -> Self {
        Self::from_env_fn(|key| env::var(key).ok())
    }

    /// Probes using a custom environment provider
    ///
    /// `PATH` is read from the provider; the current working directory is
    /// appended as a last-resort search location.
    pub fn from_env_fn<F>(env_provider: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let session = detect_session(&env_provider);
        let scale = detect_scale_factor_with_env(&env_provider);

        let mut search_path: Vec<PathBuf> = env_provider("PATH")
            .map(|p| env::split_paths(&p).collect())
            .unwrap_or_default();
        if let Ok(cwd) = env::current_dir() {
            search_path.push(cwd);
        }

        Self {
            session,
            search_path,
            scale,
            env: Arc::new(env_provider),
        }
    }

    /// Fully synthetic probe, for tests and embedding
    pub fn with_values(
        session: SessionType,
        search_path: Vec<PathBuf>,
        vars: HashMap<String, String>,
    ) -> Self {
        let scale = detect_scale_factor_with_env(&|key: &str| vars.get(key).cloned());
        Self {
            session,
            search_path,
            scale,
            env: Arc::new(move |key| vars.get(key).cloned()),
        }
    }

    pub fn session(&self) -> SessionType {
        self.session
    }

    /// Whether the Wayland candidate lists apply
    ///
    /// A session that is neither Wayland nor X11 is treated as X11, which
    /// lets X11 tools report their own error.
    pub fn session_is_wayland(&self) -> bool {
        self.session.is_wayland()
    }

    pub fn scale(&self) -> &ScaleFactor {
        &self.scale
    }

    /// Non-empty value of an environment variable
    pub fn env_var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|v| !v.is_empty())
    }

    /// Finds `name` in the search path
    ///
    /// Names containing a path separator are checked as given.
    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        if name.contains(std::path::MAIN_SEPARATOR) {
            let path = PathBuf::from(name);
            return is_executable(&path).then_some(path);
        }

        self.search_path
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    pub fn has_executable(&self, name: &str) -> bool {
        self.find_executable(name).is_some()
    }
}

impl std::fmt::Debug for SystemProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemProbe")
            .field("session", &self.session)
            .field("search_path", &self.search_path)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Helper function to create a mock environment provider
    fn mock_env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_detect_wayland() {
        let platform = detect_platform_with_env(mock_env(&[("WAYLAND_DISPLAY", "wayland-0")]));
        assert_eq!(platform.session, SessionType::Wayland);
        assert_eq!(platform.os, env::consts::OS);
    }

    #[test]
    fn test_detect_x11() {
        let platform = detect_platform_with_env(mock_env(&[("DISPLAY", ":0")]));
        assert_eq!(platform.session, SessionType::X11);
    }

    #[test]
    fn test_wayland_display_takes_precedence_over_display() {
        let platform = detect_platform_with_env(mock_env(&[
            ("WAYLAND_DISPLAY", "wayland-0"),
            ("DISPLAY", ":0"),
        ]));
        assert_eq!(platform.session, SessionType::Wayland);
    }

    #[test]
    fn test_xdg_session_type_wins() {
        let platform = detect_platform_with_env(mock_env(&[
            ("XDG_SESSION_TYPE", "x11"),
            ("WAYLAND_DISPLAY", "wayland-0"),
        ]));
        assert_eq!(platform.session, SessionType::X11);

        let platform = detect_platform_with_env(mock_env(&[
            ("XDG_SESSION_TYPE", "Wayland"),
            ("DISPLAY", ":0"),
        ]));
        assert_eq!(platform.session, SessionType::Wayland);
    }

    #[test]
    fn test_unknown_xdg_session_type_falls_through() {
        let platform =
            detect_platform_with_env(mock_env(&[("XDG_SESSION_TYPE", "tty"), ("DISPLAY", ":1")]));
        assert_eq!(platform.session, SessionType::X11);
    }

    #[test]
    fn test_empty_env_vars_treated_as_none() {
        let platform = detect_platform_with_env(mock_env(&[
            ("XDG_SESSION_TYPE", ""),
            ("WAYLAND_DISPLAY", ""),
            ("DISPLAY", ""),
        ]));
        assert_eq!(platform.session, SessionType::None);
    }

    #[test]
    fn test_no_session_is_treated_as_x11() {
        let probe = SystemProbe::from_env_fn(mock_env(&[]));
        assert_eq!(probe.session(), SessionType::None);
        assert!(!probe.session_is_wayland());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable_in_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("scrot");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let plain = dir.path().join("slop");
        std::fs::write(&plain, "not executable").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        let probe = SystemProbe::with_values(
            SessionType::X11,
            vec![PathBuf::from("/nonexistent"), dir.path().to_path_buf()],
            HashMap::new(),
        );

        assert_eq!(probe.find_executable("scrot"), Some(tool.clone()));
        assert!(probe.find_executable("slop").is_none());
        assert!(probe.find_executable("grim").is_none());
        assert_eq!(probe.find_executable(tool.to_str().unwrap()), Some(tool));
    }

    #[test]
    fn test_path_is_read_from_provider() {
        let probe = SystemProbe::from_env_fn(mock_env(&[("PATH", "/nonexistent-a:/nonexistent-b")]));
        assert!(!probe.has_executable("definitely-not-a-real-tool"));
        assert!(format!("{:?}", probe).contains("nonexistent-a"));
    }

    #[test]
    fn test_env_var_lookup() {
        let mut vars = HashMap::new();
        vars.insert("DBUS_SESSION_BUS_ADDRESS".to_string(), "unix:path=/run/bus".to_string());
        vars.insert("EMPTY".to_string(), String::new());
        let probe = SystemProbe::with_values(SessionType::Wayland, Vec::new(), vars);

        assert!(probe.env_var("DBUS_SESSION_BUS_ADDRESS").is_some());
        assert!(probe.env_var("EMPTY").is_none());
        assert!(probe.session_is_wayland());
    }
}
