use std::fmt;
use std::fs::DirBuilder;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default TCP port for the local command gateway.
pub const DEFAULT_GATEWAY_PORT: u16 = 9779;

/// Where the agent accepts command-gateway connections.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum GatewayEndpoint {
    /// Unix domain socket.
    Unix { path: Utf8PathBuf },
    /// TCP socket.
    Tcp { host: String, port: u16 },
}

impl GatewayEndpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Socket path for Unix endpoints.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }

    /// Creates the parent directory of a Unix socket with owner-only access.
    pub fn prepare_filesystem(&self) -> Result<(), GatewayPreparationError> {
        let Some(path) = self.unix_path() else {
            return Ok(());
        };
        let Some(parent) = path.parent() else {
            return Err(GatewayPreparationError::MissingParent {
                path: path.to_path_buf(),
            });
        };

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        if let Err(source) = builder.create(parent.as_std_path())
            && source.kind() != std::io::ErrorKind::AlreadyExists
        {
            return Err(GatewayPreparationError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            });
        }
        Ok(())
    }
}

impl Default for GatewayEndpoint {
    fn default() -> Self {
        Self::tcp("127.0.0.1", DEFAULT_GATEWAY_PORT)
    }
}

impl fmt::Display for GatewayEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for GatewayEndpoint {
    type Err = GatewayParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(GatewayParseError::MissingUnixPath(input.to_owned()));
                }
                Ok(Self::unix(path))
            }
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| GatewayParseError::MissingHost(input.to_owned()))?;
                let port = url
                    .port()
                    .ok_or_else(|| GatewayParseError::MissingPort(input.to_owned()))?;
                Ok(Self::tcp(host, port))
            }
            other => Err(GatewayParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

/// Errors raised while parsing a [`GatewayEndpoint`] from a URL string.
#[derive(Debug, Error)]
pub enum GatewayParseError {
    /// Only `unix` and `tcp` are understood.
    #[error("unsupported gateway scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP endpoint without a host.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP endpoint without a port.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// Unix endpoint without a path.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
    /// Input is not a URL at all.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors raised while preparing the gateway socket directory.
#[derive(Debug, Error)]
pub enum GatewayPreparationError {
    /// The socket path has no parent directory.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent { path: Utf8PathBuf },
    /// The parent directory could not be created.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
