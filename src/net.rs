use std::net::{IpAddr, UdpSocket};

/// Best-effort lookup of this machine's LAN address, for the startup log
/// line only. Connecting a UDP socket sends no packets; it just asks the OS
/// which source address it would route from.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_loopback() {
        None
    } else {
        Some(ip)
    }
}
