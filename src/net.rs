//! Advisory discovery of the machine's private network address.

use std::net::{IpAddr, Ipv4Addr};

/// Returns the first private (RFC 1918) IPv4 address on a non-loopback
/// interface, in the order the OS lists interfaces.
pub fn private_ipv4() -> Option<Ipv4Addr> {
    let interfaces = if_addrs::get_if_addrs().ok()?;
    first_private_ipv4(
        interfaces
            .iter()
            .filter(|iface| !iface.is_loopback())
            .map(|iface| iface.ip()),
    )
}

fn first_private_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Option<Ipv4Addr> {
    addrs.into_iter().find_map(|addr| match addr {
        IpAddr::V4(ip) if ip.is_private() && !ip.is_loopback() => Some(ip),
        _ => None,
    })
}

/// URLs the proxy can be reached on, for the startup banner.
pub fn listen_urls(port: u16, private_ip: Option<Ipv4Addr>) -> Vec<String> {
    let mut urls = vec![format!("http://localhost:{}", port)];
    if let Some(ip) = private_ip {
        urls.push(format!("http://{}:{}", ip, port));
    }
    urls
}
