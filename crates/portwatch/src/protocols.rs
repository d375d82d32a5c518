//! Conventional ports of well-known protocols.
//!
//! Used to pre-fill a port when a protocol type is chosen and to infer the
//! type label when a known port is entered. Order matters: when several
//! protocols share a port, the first listed one wins.

/// Type label used when a port matches no known protocol
pub const OTHER: &str = "other";

pub const KNOWN_PORTS: &[(&str, u16)] = &[
    ("http", 80),
    ("https", 443),
    ("ftp", 21),
    ("ssh", 22),
    ("telnet", 23),
    ("smtp", 25),
    ("dns", 53),
    ("dhcp", 67),
    ("tftp", 69),
    ("http-alt", 8080),
    ("pop3", 110),
    ("imap", 143),
    ("ldap", 389),
    ("https-alt", 8443),
    ("microsoft-ds", 445),
    ("mysql", 3306),
    ("postgresql", 5432),
    ("mssql", 1433),
    ("rdp", 3389),
    ("vnc", 5900),
    ("snmp", 161),
    ("snmp-trap", 162),
    ("ntp", 123),
    ("netbios-ns", 137),
    ("netbios-dgm", 138),
    ("netbios-ssn", 139),
    ("ldaps", 636),
    ("kerberos", 88),
    ("kpasswd", 464),
    ("kadmin", 749),
    ("kpop", 1109),
    ("knetd", 2053),
    ("kshell", 544),
];

/// Conventional port for a protocol name (case-insensitive)
pub fn port_for(protocol: &str) -> Option<u16> {
    let protocol = protocol.trim();
    KNOWN_PORTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(protocol))
        .map(|&(_, port)| port)
}

/// Protocol label for a port: the first matching protocol, else [`OTHER`]
pub fn infer_type(port: u16) -> &'static str {
    KNOWN_PORTS
        .iter()
        .find(|&&(_, known)| known == port)
        .map(|&(name, _)| name)
        .unwrap_or(OTHER)
}

/// Whether a type label names a protocol from the table
pub fn is_known(protocol: &str) -> bool {
    port_for(protocol).is_some()
}
