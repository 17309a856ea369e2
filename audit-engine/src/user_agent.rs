// Browser / OS metadata derived from a User-Agent header
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub browser: String,
    pub os: String,
    pub mobile: bool,
}

const UNKNOWN: &str = "Unknown";

impl ClientMetadata {
    /// Best-effort classification. Order matters: Chromium derivatives also
    /// advertise "Chrome" and "Safari", and iOS agents contain "Mac OS X".
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self {
            browser: detect_browser(user_agent).to_string(),
            os: detect_os(user_agent).to_string(),
            mobile: user_agent.contains("Mobile") || user_agent.contains("Android"),
        }
    }
}

fn detect_browser(ua: &str) -> &'static str {
    if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else if ua.starts_with("curl/") {
        "curl"
    } else {
        UNKNOWN
    }
}

fn detect_os(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

    #[test]
    fn test_desktop_agents() {
        let meta = ClientMetadata::from_user_agent(CHROME_WIN);
        assert_eq!((meta.browser.as_str(), meta.os.as_str(), meta.mobile), ("Chrome", "Windows", false));

        let meta = ClientMetadata::from_user_agent(EDGE_WIN);
        assert_eq!(meta.browser, "Edge");

        let meta = ClientMetadata::from_user_agent(FIREFOX_LINUX);
        assert_eq!((meta.browser.as_str(), meta.os.as_str()), ("Firefox", "Linux"));
    }

    #[test]
    fn test_mobile_agents() {
        let meta = ClientMetadata::from_user_agent(SAFARI_IPHONE);
        assert_eq!((meta.browser.as_str(), meta.os.as_str(), meta.mobile), ("Safari", "iOS", true));

        let meta = ClientMetadata::from_user_agent(CHROME_ANDROID);
        assert_eq!((meta.browser.as_str(), meta.os.as_str(), meta.mobile), ("Chrome", "Android", true));
    }

    #[test]
    fn test_unknown_agent() {
        let meta = ClientMetadata::from_user_agent("");
        assert_eq!(meta.browser, "Unknown");
        assert_eq!(meta.os, "Unknown");
    }
}
