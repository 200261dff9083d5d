// ────────────────────────────────
// src/server/listener.rs
// Low-level TCP bind, kept apart so TLS can be swapped in later.
// ────────────────────────────────
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Bind `addr`, returning the listener and the address it actually got
/// (port 0 resolves to an ephemeral port).
pub async fn bind_tcp(addr: SocketAddr) -> Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;
    tracing::debug!("Bound TCP listener on {}", local_addr);
    Ok((listener, local_addr))
}
