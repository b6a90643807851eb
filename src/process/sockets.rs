//! Socket introspection through `/proc`.
//!
//! A process's sockets are found by reading the `socket:[<inode>]` links in
//! `/proc/<pid>/fd` and intersecting those inodes with the kernel socket
//! tables in `/proc/net/{tcp,tcp6,udp,udp6}`.
//!
//! Table format (header row first, whitespace separated):
//!
//! ```text
//!   sl  local_address rem_address   st tx_queue:rx_queue tr:tm->when retrnsmt   uid  timeout inode
//!    0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 123456
//! ```

use crate::error::{Result, RuntimeError};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::str::FromStr;

/// Minimum number of columns in a socket table row.
const NET_STAT_FIELDS: usize = 10;

/// A socket table / protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketProtocol {
    Tcp,
    Udp,
    Tcp6,
    Udp6,
}

impl SocketProtocol {
    /// Name of the table under `/proc/net`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Tcp6 => "tcp6",
            Self::Udp6 => "udp6",
        }
    }

    /// Tables consulted when checking this protocol.
    ///
    /// Both address families are included: a dual-stack listener shows up
    /// only in the v6 table.
    pub fn family(&self) -> [SocketProtocol; 2] {
        match self {
            Self::Tcp | Self::Tcp6 => [Self::Tcp, Self::Tcp6],
            Self::Udp | Self::Udp6 => [Self::Udp, Self::Udp6],
        }
    }
}

impl fmt::Display for SocketProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocketProtocol {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "tcp6" => Ok(Self::Tcp6),
            "udp6" => Ok(Self::Udp6),
            other => Err(RuntimeError::Validation {
                message: format!("invalid socket protocol: {:?}", other),
            }),
        }
    }
}

/// A socket owned by a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketInfo {
    pub protocol: SocketProtocol,
    pub ip: IpAddr,
    pub port: u16,
}

/// One row of a `/proc/net` socket table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetStatRow {
    pub local_address: String,
    pub remote_address: String,
    pub state: String,
    pub uid: String,
    pub inode: String,
}

/// Parse a socket table. The header row and short rows are skipped.
pub fn parse_net_stat(content: &str) -> Vec<NetStatRow> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < NET_STAT_FIELDS {
                return None;
            }
            Some(NetStatRow {
                local_address: fields[1].to_string(),
                remote_address: fields[2].to_string(),
                state: fields[3].to_string(),
                uid: fields[7].to_string(),
                inode: fields[9].to_string(),
            })
        })
        .collect()
}

/// Decode a `hex-ip:hex-port` address column.
///
/// The kernel prints the address as 32-bit words in host byte order, so
/// each word is converted back through the native byte order.
pub fn parse_address(field: &str) -> Option<(IpAddr, u16)> {
    let (ip_hex, port_hex) = field.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    let raw = hex::decode(ip_hex).ok()?;

    let mut bytes = Vec::with_capacity(raw.len());
    for word in raw.chunks(4) {
        let word: [u8; 4] = word.try_into().ok()?;
        bytes.extend_from_slice(&u32::from_be_bytes(word).to_ne_bytes());
    }

    let ip = match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };
    Some((ip, port))
}

/// Select the rows owned by `inodes` and decode their local addresses.
pub fn sockets_for_inodes(
    rows: &[NetStatRow],
    inodes: &HashSet<String>,
    protocol: SocketProtocol,
) -> Vec<SocketInfo> {
    rows.iter()
        .filter(|row| inodes.contains(&row.inode))
        .filter_map(|row| parse_address(&row.local_address))
        .map(|(ip, port)| SocketInfo { protocol, ip, port })
        .collect()
}

/// Extract the inode from an fd link target such as `socket:[12345]`.
pub fn socket_inode(link: &str) -> Option<&str> {
    link.strip_prefix("socket:[")?.strip_suffix(']')
}

/// Read-only view of a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcFs {
    /// Use a procfs-shaped tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Socket inodes referenced by the open descriptors of `pid`.
    ///
    /// Descriptors closed while reading are skipped.
    pub fn socket_inodes(&self, pid: u32) -> Result<HashSet<String>> {
        let fd_dir = self.root.join(pid.to_string()).join("fd");
        let mut inodes = HashSet::new();
        for entry in fs::read_dir(&fd_dir)? {
            let Ok(entry) = entry else {
                continue;
            };
            let Ok(target) = fs::read_link(entry.path()) else {
                continue;
            };
            if let Some(inode) = socket_inode(&target.to_string_lossy()) {
                inodes.insert(inode.to_string());
            }
        }
        Ok(inodes)
    }

    /// Parsed rows of one socket table. A missing table has no rows.
    pub fn socket_table(&self, protocol: SocketProtocol) -> Result<Vec<NetStatRow>> {
        let path = self.root.join("net").join(protocol.as_str());
        match fs::read_to_string(&path) {
            Ok(content) => Ok(parse_net_stat(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Sockets of `pid` in every table of `protocol`'s family.
    pub fn sockets_for_pid(&self, pid: u32, protocol: SocketProtocol) -> Result<Vec<SocketInfo>> {
        let inodes = self.socket_inodes(pid)?;
        let mut sockets = Vec::new();
        for table in protocol.family() {
            let rows = self.socket_table(table)?;
            sockets.extend(sockets_for_inodes(&rows, &inodes, table));
        }
        Ok(sockets)
    }
}
