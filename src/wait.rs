use anyhow::Result;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::DeployError;

/// Poll `probe` every `interval` until it reports ready.
///
/// Exceeding `timeout` is a `WaitTimeout` error. A probe error counts as
/// "not ready yet". Returns the time spent waiting.
pub fn wait_until<F>(what: &str, timeout: Duration, interval: Duration, mut probe: F) -> Result<Duration>
where
    F: FnMut() -> Result<bool>,
{
    let start = Instant::now();
    loop {
        match probe() {
            Ok(true) => {
                let elapsed = start.elapsed();
                tracing::info!("{} ready after {:?}", what, elapsed);
                return Ok(elapsed);
            }
            Ok(false) => {}
            Err(e) => tracing::debug!("Probe for {} failed: {:#}", what, e),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(DeployError::WaitTimeout {
                what: what.to_string(),
                elapsed,
            }
            .into());
        }
        std::thread::sleep(interval.min(timeout - elapsed));
    }
}

/// Wait until something accepts TCP connections on `addr`
pub fn wait_for_port(addr: &str, timeout: Duration, interval: Duration) -> Result<Duration> {
    let connect_timeout = interval.max(Duration::from_millis(100));
    wait_until(addr, timeout, interval, || {
        let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
        Ok(addrs
            .iter()
            .any(|a| TcpStream::connect_timeout(a, connect_timeout).is_ok()))
    })
}
