//! Readiness notification to the service manager.

use crate::error::Result;
use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;

/// Environment variable systemd uses to pass the notification socket.
pub const NOTIFY_SOCKET_VAR: &str = "NOTIFY_SOCKET";

/// Something that can be told the service is ready.
pub trait ReadinessNotifier {
    /// Announce readiness. Returns `false` when there is nobody to notify.
    fn notify_ready(&self) -> Result<bool>;
}

/// Sends `READY=1` over the systemd notification socket.
#[derive(Debug, Clone, Default)]
pub struct SystemdNotifier {
    socket: Option<String>,
}

impl SystemdNotifier {
    /// Use the socket named by `$NOTIFY_SOCKET`.
    pub fn from_env() -> Self {
        Self {
            socket: std::env::var(NOTIFY_SOCKET_VAR).ok().filter(|s| !s.is_empty()),
        }
    }

    /// Use an explicit socket path (`@name` for the abstract namespace).
    pub fn with_socket(socket: impl Into<String>) -> Self {
        Self {
            socket: Some(socket.into()),
        }
    }

    fn send(&self, socket: &str, message: &[u8]) -> Result<()> {
        let sock = UnixDatagram::unbound()?;
        if let Some(name) = socket.strip_prefix('@') {
            send_abstract(&sock, name, message)?;
        } else {
            sock.send_to(message, PathBuf::from(socket))?;
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn send_abstract(sock: &UnixDatagram, name: &str, message: &[u8]) -> std::io::Result<()> {
    use std::os::linux::net::SocketAddrExt;
    use std::os::unix::net::SocketAddr;

    let addr = SocketAddr::from_abstract_name(name.as_bytes())?;
    sock.send_to_addr(message, &addr)?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn send_abstract(_sock: &UnixDatagram, _name: &str, _message: &[u8]) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "abstract notification sockets are Linux-only",
    ))
}

impl ReadinessNotifier for SystemdNotifier {
    fn notify_ready(&self) -> Result<bool> {
        let Some(socket) = self.socket.as_deref() else {
            tracing::debug!("{} not set, skipping readiness notification", NOTIFY_SOCKET_VAR);
            return Ok(false);
        };
        self.send(socket, b"READY=1")?;
        tracing::info!(socket, "readiness notified");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_socket_is_a_no_op() {
        assert!(!SystemdNotifier::default().notify_ready().unwrap());
    }

    #[test]
    fn sends_ready_to_socket() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notify.sock");
        let receiver = UnixDatagram::bind(&path).unwrap();

        let notifier = SystemdNotifier::with_socket(path.to_string_lossy());
        assert!(notifier.notify_ready().unwrap());

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"READY=1");
    }

    #[test]
    fn missing_socket_is_an_error() {
        let temp = TempDir::new().unwrap();
        let notifier = SystemdNotifier::with_socket(temp.path().join("absent.sock").to_string_lossy());
        assert!(notifier.notify_ready().is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn sends_ready_to_abstract_socket() {
        use std::os::linux::net::SocketAddrExt;
        use std::os::unix::net::SocketAddr;

        let name = format!("runtime-utils-test-{}", std::process::id());
        let addr = SocketAddr::from_abstract_name(name.as_bytes()).unwrap();
        let receiver = UnixDatagram::bind_addr(&addr).unwrap();

        let notifier = SystemdNotifier::with_socket(format!("@{}", name));
        assert!(notifier.notify_ready().unwrap());

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"READY=1");
    }
}
