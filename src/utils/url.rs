//! URL helpers

/// Join a base URL and a path without producing duplicate slashes.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_slash_combinations() {
        assert_eq!(
            join_url("https://api.example.com/", "/v1/messages"),
            "https://api.example.com/v1/messages"
        );
        assert_eq!(
            join_url("https://api.example.com", "v1/messages"),
            "https://api.example.com/v1/messages"
        );
    }
}
