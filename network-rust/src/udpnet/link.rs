use std::error;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crossbeam_channel as cbc;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::sock;

/// Largest datagram accepted by [`rx`]. Messages are small, flat JSON objects.
pub const MAX_DATAGRAM_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum BcError {
    #[error("socket error: {0}")]
    IOError(#[from] io::Error),
    #[error("could not resolve remote address {0}")]
    Unresolved(String),
    #[error("local channel closed")]
    ChannelClosed,
}

/// Resolve `host:port` to the first IPv4 address.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, BcError> {
    (host, port)
        .to_socket_addrs()?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| BcError::Unresolved(format!("{}:{}", host, port)))
}

/// Bind the receiving end of a link. Binding is split from [`rx_on`] so that
/// port conflicts surface before any thread is spawned.
pub fn bind_rx(port: u16) -> Result<UdpSocket, BcError> {
    Ok(sock::new_rx(port)?)
}

/// Forward every value received on `ch` to `remote`, one datagram per value.
///
/// Returns `Err` when creating the socket fails and `Ok` once `ch` is
/// disconnected. Encoding and sending errors are logged and the value dropped.
pub fn tx<T: Serialize>(remote: SocketAddr, ch: cbc::Receiver<T>) -> Result<(), BcError> {
    let s = sock::new_tx()?;
    for data in ch.iter() {
        let serialized = match serde_json::to_vec(&data) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Unable to encode packet for {}, {}", remote, e);
                continue;
            }
        };
        if let Err(e) = s.send_to(&serialized, remote) {
            warn!("Unable to send packet to {}, {}", remote, e);
        }
    }
    debug!("Link to {} closed", remote);
    Ok(())
}

/// Decode datagrams arriving on `s` and push them into `ch`.
///
/// Bad packets are logged and skipped. Returns `Err(ChannelClosed)` when the
/// local receiver is gone, which is the only way out of the loop.
pub fn rx_on<T: DeserializeOwned>(s: UdpSocket, ch: cbc::Sender<T>) -> Result<(), BcError> {
    let mut buf = [0; MAX_DATAGRAM_SIZE];

    loop {
        match parse_packet(&s, &mut buf) {
            Ok(d) => ch.send(d).map_err(|_| BcError::ChannelClosed)?,
            Err(e) => warn!("Received bad package got error: {}", e),
        }
    }
}

pub fn rx<T: DeserializeOwned>(port: u16, ch: cbc::Sender<T>) -> Result<(), BcError> {
    let s = bind_rx(port)?;
    rx_on(s, ch)
}

fn parse_packet<T: DeserializeOwned>(
    s: &UdpSocket,
    buf: &mut [u8; MAX_DATAGRAM_SIZE],
) -> Result<T, Box<dyn error::Error>> {
    let n = s.recv(buf)?;
    serde_json::from_slice::<T>(&buf[..n]).map_err(|e| e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
    struct Ping {
        seq: u32,
        note: String,
    }

    #[test]
    fn values_cross_a_localhost_link_in_order() {
        let socket = bind_rx(0).expect("bind receiver");
        let port = socket.local_addr().expect("local addr").port();

        let (in_tx, in_rx) = cbc::unbounded::<Ping>();
        thread::spawn(move || rx_on(socket, in_tx));

        let (out_tx, out_rx) = cbc::unbounded::<Ping>();
        let remote = resolve("127.0.0.1", port).expect("resolve");
        let sender = thread::spawn(move || tx(remote, out_rx));

        for seq in 0..3 {
            out_tx
                .send(Ping { seq, note: format!("ping {}", seq) })
                .expect("queue ping");
        }

        for seq in 0..3 {
            let ping = in_rx
                .recv_timeout(Duration::from_secs(2))
                .expect("ping arrives");
            assert_eq!(ping.seq, seq);
        }

        drop(out_tx);
        assert!(sender.join().expect("sender thread").is_ok());
    }

    #[test]
    fn malformed_datagrams_are_skipped() {
        let socket = bind_rx(0).expect("bind receiver");
        let port = socket.local_addr().expect("local addr").port();

        let (in_tx, in_rx) = cbc::unbounded::<Ping>();
        thread::spawn(move || rx_on(socket, in_tx));

        let raw = UdpSocket::bind("127.0.0.1:0").expect("raw socket");
        raw.send_to(b"not json", ("127.0.0.1", port)).expect("send garbage");
        let valid = serde_json::to_vec(&Ping { seq: 7, note: String::new() }).expect("encode");
        raw.send_to(&valid, ("127.0.0.1", port)).expect("send ping");

        let ping = in_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("valid ping survives garbage");
        assert_eq!(ping.seq, 7);
    }

    #[test]
    fn unresolvable_host_is_reported() {
        assert!(resolve("definitely.not.a.host.invalid", 1).is_err());
    }
}
