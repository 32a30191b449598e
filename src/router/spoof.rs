//! Spoofed client-address synthesis

use std::net::Ipv4Addr;

use rand::Rng;

/// Synthesize a pseudo-random IPv4 address
///
/// Draws a uniform 32-bit value over the full address space. Reserved and
/// private ranges are not excluded; the address only ever travels in a
/// forwarding header and is never routed.
pub fn random_ipv4() -> Ipv4Addr {
    Ipv4Addr::from(rand::thread_rng().gen::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ipv4_is_dotted_quad() {
        let addr = random_ipv4().to_string();
        let octets: Vec<&str> = addr.split('.').collect();
        assert_eq!(octets.len(), 4);
        for octet in octets {
            octet.parse::<u8>().unwrap();
        }
    }

    #[test]
    fn test_random_ipv4_varies() {
        let draws: Vec<Ipv4Addr> = (0..20).map(|_| random_ipv4()).collect();
        let first = draws[0];
        assert!(draws.iter().any(|a| *a != first));
    }
}
