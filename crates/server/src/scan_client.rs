use std::convert::Infallible;

use aide::operation::OperationInput;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};
use db::scan::Device;

/// Country code headers set by common CDNs and reverse proxies.
const COUNTRY_HEADERS: [&str; 3] = ["cf-ipcountry", "x-vercel-ip-country", "x-country-code"];

/// Passive information about a scanning client derived from request headers.
///
/// These values are stored alongside scan events for aggregation purposes only
/// and are never used to identify a device.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ScanClient {
    pub device: Device,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub country: Option<String>,
    pub ip_address: Option<String>,
}

impl ScanClient {
    fn from_headers(headers: &HeaderMap) -> Self {
        let user_agent = header_value(headers, USER_AGENT.as_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let country = COUNTRY_HEADERS
            .iter()
            .find_map(|name| header_value(headers, name))
            .map(str::trim)
            .filter(|country| country.len() == 2 && *country != "XX")
            .map(str::to_ascii_uppercase);

        let ip_address = header_value(headers, "x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .or_else(|| header_value(headers, "x-real-ip"))
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(String::from);

        Self {
            device: device(&user_agent),
            browser: browser(&user_agent).map(String::from),
            os: os(&user_agent).map(String::from),
            country,
            ip_address,
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ScanClient {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

impl OperationInput for ScanClient {}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn device(user_agent: &str) -> Device {
    let contains = |needle: &str| user_agent.contains(needle);

    if user_agent.is_empty() {
        Device::Unknown
    } else if contains("bot") || contains("crawler") || contains("spider") {
        Device::Bot
    } else if contains("ipad") || contains("tablet") || (contains("android") && !contains("mobile"))
    {
        Device::Tablet
    } else if contains("mobi") || contains("iphone") || contains("android") {
        Device::Mobile
    } else {
        Device::Desktop
    }
}

fn browser(user_agent: &str) -> Option<&'static str> {
    // Order matters, most user agents mention several engines.
    const BROWSERS: [(&str, &str); 9] = [
        ("edg/", "Edge"),
        ("opr/", "Opera"),
        ("samsungbrowser", "Samsung Internet"),
        ("fxios", "Firefox"),
        ("firefox/", "Firefox"),
        ("crios", "Chrome"),
        ("chrome/", "Chrome"),
        ("safari/", "Safari"),
        ("curl/", "curl"),
    ];

    BROWSERS
        .iter()
        .find(|(needle, _)| user_agent.contains(needle))
        .map(|(_, name)| *name)
}

fn os(user_agent: &str) -> Option<&'static str> {
    const SYSTEMS: [(&str, &str); 8] = [
        ("windows", "Windows"),
        ("iphone", "iOS"),
        ("ipad", "iOS"),
        ("android", "Android"),
        ("cros", "ChromeOS"),
        ("mac os x", "macOS"),
        ("macintosh", "macOS"),
        ("linux", "Linux"),
    ];

    SYSTEMS
        .iter()
        .find(|(needle, _)| user_agent.contains(needle))
        .map(|(_, name)| *name)
}
