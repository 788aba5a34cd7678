//! Payload origin resolution.
//!
//! A payload embedded into a printed code must be reachable from whatever device
//! scans it. When a code is generated on a machine that is only known to itself
//! as `localhost`, the loopback host is replaced with the machine's LAN address,
//! so that a phone on the same network can still open the payload.
//!
//! Resolution never fails: if the origin cannot be determined, the configured
//! fallback origin is used, and if no LAN address can be discovered, the origin
//! is returned unchanged.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
};

use derive_more::{Display, Error};
use http::uri::{Authority, Uri};
use tracing::debug;

use crate::config;

/// Path prefix of the tracked scan entry point.
pub const SCAN_PATH: &str = "/scan";

/// Protocol and host pair used to build fully-qualified payload URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Base {
    protocol: String,
    hostname: String,
    port: Option<u16>,
}

/// Errors that may occur while parsing an origin.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum InvalidOrigin {
    /// Only `http` and `https` origins can be embedded into payloads.
    #[display(fmt = "unsupported origin protocol")]
    Protocol,

    /// Host value is missing or malformed.
    #[display(fmt = "invalid origin host")]
    Host,
}

impl Base {
    /// Create a new [`Base`] from a protocol and a host value, which may contain a port.
    pub fn new(protocol: &str, host: &str) -> Result<Self, InvalidOrigin> {
        let protocol = protocol.trim().to_ascii_lowercase();

        if protocol != "http" && protocol != "https" {
            return Err(InvalidOrigin::Protocol);
        }

        let authority: Authority = host.trim().parse().map_err(|_| InvalidOrigin::Host)?;

        if authority.as_str().contains('@') {
            return Err(InvalidOrigin::Host);
        }

        let hostname = authority
            .host()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_ascii_lowercase();

        if hostname.is_empty() {
            return Err(InvalidOrigin::Host);
        }

        Ok(Self {
            protocol,
            hostname,
            port: authority.port_u16(),
        })
    }

    /// Parse an origin string, such as `http://localhost:3000`.
    ///
    /// Paths and query strings are ignored.
    pub fn parse(origin: &str) -> Result<Self, InvalidOrigin> {
        let uri: Uri = origin.trim().parse().map_err(|_| InvalidOrigin::Host)?;
        let protocol = uri.scheme_str().ok_or(InvalidOrigin::Protocol)?;
        let authority = uri.authority().ok_or(InvalidOrigin::Host)?;

        Self::new(protocol, authority.as_str())
    }

    /// Origin protocol, without the `://` separator.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Origin host, including the port if it was specified.
    pub fn host(&self) -> String {
        let hostname = if self.hostname.contains(':') {
            format!("[{}]", self.hostname)
        } else {
            self.hostname.clone()
        };

        match self.port {
            Some(port) => format!("{hostname}:{port}"),
            None => hostname,
        }
    }

    /// Origin port, if it was specified explicitly.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Check if the origin host is a loopback label.
    pub fn is_loopback(&self) -> bool {
        if self.hostname == "localhost" || self.hostname.ends_with(".localhost") {
            return true;
        }

        self.hostname
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
    }

    /// Replace the origin hostname while preserving the protocol and port.
    pub fn with_hostname(&self, ip: Ipv4Addr) -> Self {
        Self {
            protocol: self.protocol.clone(),
            hostname: ip.to_string(),
            port: self.port,
        }
    }

    /// Build the payload embedded into an optical code.
    ///
    /// The payload always points to the tracked scan entry point of the provided
    /// identifier, never to the code's target URL.
    ///
    /// ## Example
    ///
    /// ```
    /// use common::origin::Base;
    ///
    /// let base = Base::parse("https://codes.example.com").unwrap();
    /// assert_eq!(base.payload("abc-123"), "https://codes.example.com/scan/abc-123");
    /// ```
    pub fn payload<T: fmt::Display>(&self, id: T) -> String {
        format!("{self}{SCAN_PATH}/{id}")
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.host())
    }
}

/// Source of a non-loopback IPv4 address of the current machine.
pub trait LanAddress: Send + Sync {
    /// Discover the address, if any.
    fn lan_ipv4(&self) -> Option<Ipv4Addr>;
}

/// [`LanAddress`] implementation that enumerates network interfaces.
///
/// Private network addresses are preferred over public ones,
/// link-local addresses are never returned.
pub struct SystemInterfaces;

impl LanAddress for SystemInterfaces {
    fn lan_ipv4(&self) -> Option<Ipv4Addr> {
        let interfaces = match if_addrs::get_if_addrs() {
            Ok(interfaces) => interfaces,
            Err(error) => {
                debug!(%error, "unable to enumerate network interfaces");
                return None;
            }
        };

        let candidates: Vec<Ipv4Addr> = interfaces
            .iter()
            .filter(|interface| !interface.is_loopback())
            .filter_map(|interface| match interface.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .filter(|ip| !ip.is_link_local() && !ip.is_unspecified())
            .collect();

        candidates
            .iter()
            .find(|ip| ip.is_private())
            .or_else(|| candidates.first())
            .copied()
    }
}

/// [`LanAddress`] implementation with a fixed value.
pub struct StaticLanAddress(pub Option<Ipv4Addr>);

impl LanAddress for StaticLanAddress {
    fn lan_ipv4(&self) -> Option<Ipv4Addr> {
        self.0
    }
}

/// Externally reachable origin resolver.
#[derive(Clone)]
pub struct OriginResolver {
    lan: Arc<dyn LanAddress>,
    fallback: Base,
}

impl OriginResolver {
    /// Create a new resolver with the provided LAN address source and fallback origin.
    pub fn new(lan: Arc<dyn LanAddress>, fallback: Base) -> Self {
        Self { lan, fallback }
    }

    /// Create a new resolver from the [`Origin`] configuration.
    ///
    /// [`Origin`]: config::Origin
    pub fn from_config(config: &config::Origin) -> Result<Self, InvalidOrigin> {
        let fallback = Base::parse(&config.fallback)?;

        let lan: Arc<dyn LanAddress> = match config.lan_address {
            Some(ip) => Arc::new(StaticLanAddress(Some(ip))),
            None => Arc::new(SystemInterfaces),
        };

        Ok(Self::new(lan, fallback))
    }

    /// Statically configured fallback origin.
    pub fn fallback(&self) -> &Base {
        &self.fallback
    }

    /// Resolve the origin known to the caller itself, for example
    /// the origin of a page or a locally configured web origin.
    pub fn resolve_origin(&self, origin: &Base) -> Base {
        self.substitute_loopback(origin.clone())
    }

    /// Resolve the origin from the inbound forwarded protocol and host values.
    pub fn resolve_forwarded(&self, protocol: Option<&str>, host: Option<&str>) -> Base {
        let Some(host) = host
            .and_then(|host| host.split(',').next())
            .map(str::trim)
            .filter(|host| !host.is_empty())
        else {
            debug!("no host available, using fallback origin");
            return self.fallback.clone();
        };

        let protocol = protocol
            .and_then(|protocol| protocol.split(',').next())
            .map(str::trim)
            .filter(|protocol| !protocol.is_empty())
            .unwrap_or("http");

        match Base::new(protocol, host) {
            Ok(base) => self.substitute_loopback(base),
            Err(error) => {
                debug!(%error, host, protocol, "using fallback origin");
                self.fallback.clone()
            }
        }
    }

    fn substitute_loopback(&self, base: Base) -> Base {
        if !base.is_loopback() {
            return base;
        }

        match self.lan.lan_ipv4() {
            Some(ip) => base.with_hostname(ip),
            None => base,
        }
    }
}
