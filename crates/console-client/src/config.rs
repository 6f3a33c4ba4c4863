/// Where the remote console lives: one streaming URL and one control API
/// base, derived from a single host. The stream negotiates the secure
/// variant exactly when the controlling context is secure.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub ws_url: String,
    pub api_url: String,
}

impl Endpoints {
    pub fn from_host(host: &str, secure: bool) -> Self {
        let (ws_scheme, http_scheme) = if secure { ("wss", "https") } else { ("ws", "http") };
        Self {
            ws_url: format!("{}://{}/ws/logs", ws_scheme, host),
            api_url: format!("{}://{}/api", http_scheme, host),
        }
    }

    /// Best-effort environment lookup with a localhost fallback, for
    /// running the demo binary without flags.
    pub fn from_env() -> Self {
        let host =
            std::env::var("CONSOLE_HOST").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let secure = std::env::var("CONSOLE_SECURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self::from_host(&host, secure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_host() {
        let endpoints = Endpoints::from_host("127.0.0.1:8080", false);
        assert_eq!(endpoints.ws_url, "ws://127.0.0.1:8080/ws/logs");
        assert_eq!(endpoints.api_url, "http://127.0.0.1:8080/api");
    }

    // The only test touching these variables, so no cross-test race.
    #[test]
    fn from_env_reads_host_and_secure() {
        std::env::set_var("CONSOLE_HOST", "10.0.0.5:9000");
        std::env::set_var("CONSOLE_SECURE", "true");
        let endpoints = Endpoints::from_env();
        std::env::remove_var("CONSOLE_HOST");
        std::env::remove_var("CONSOLE_SECURE");

        assert_eq!(endpoints.ws_url, "wss://10.0.0.5:9000/ws/logs");
        assert_eq!(endpoints.api_url, "https://10.0.0.5:9000/api");
    }

    #[test]
    fn secure_host_upgrades_both_schemes() {
        let endpoints = Endpoints::from_host("console.example.com", true);
        assert_eq!(endpoints.ws_url, "wss://console.example.com/ws/logs");
        assert_eq!(endpoints.api_url, "https://console.example.com/api");
    }
}
