//! Client classification: terminal tools get the stream, browsers get a redirect.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Tokens found in the User-Agent of command-line HTTP clients and scripting runtimes.
    static ref TERMINAL_CLIENT: Regex =
        Regex::new(r"(?i)curl|wget|httpie|perl|python|ruby|php|go-http|java|c\+\+|libwww")
            .expect("terminal client pattern is valid");
}

/// Whether a client identifier belongs to a line-mode terminal client.
///
/// An empty or absent identifier is not one.
pub fn is_terminal_client(user_agent: Option<&str>) -> bool {
    match user_agent {
        Some(ua) if !ua.trim().is_empty() => TERMINAL_CLIENT.is_match(ua),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_clients() {
        for ua in [
            "curl/8.1.2",
            "Wget/1.21.3",
            "HTTPie/3.2.2",
            "python-requests/2.31.0",
            "Go-http-client/1.1",
            "Java/17.0.2",
            "libwww-perl/6.72",
            "CURL/7.0",
        ] {
            assert!(is_terminal_client(Some(ua)), "{ua}");
        }
    }

    #[test]
    fn test_browsers() {
        for ua in [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
        ] {
            assert!(!is_terminal_client(Some(ua)), "{ua}");
        }
    }

    #[test]
    fn test_missing_identifier() {
        assert!(!is_terminal_client(None));
        assert!(!is_terminal_client(Some("")));
        assert!(!is_terminal_client(Some("   ")));
    }
}
