//! Server Info Module
//!
//! Parses the text reply of the Redis INFO command.

use std::collections::HashMap;

/// Parses an INFO reply into a flat field -> value map.
///
/// Section headers (`# Server`) and blank lines are skipped; values keep any
/// embedded colons (`executable:/usr/bin:redis` style).
pub fn parse_info(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Server\r\nredis_version:7.2.4\r\nredis_mode:standalone\r\nexecutable:/usr/local/bin/redis-server\r\n\r\n# Keyspace\r\ndb0:keys=3,expires=0,avg_ttl=0\r\n";

    #[test]
    fn test_parse_info_fields() {
        let info = parse_info(SAMPLE);
        assert_eq!(info.get("redis_version").map(String::as_str), Some("7.2.4"));
        assert_eq!(info.get("redis_mode").map(String::as_str), Some("standalone"));
        assert_eq!(
            info.get("db0").map(String::as_str),
            Some("keys=3,expires=0,avg_ttl=0")
        );
        assert_eq!(info.len(), 4);
    }

    #[test]
    fn test_parse_info_skips_headers() {
        let info = parse_info(SAMPLE);
        assert!(info.keys().all(|k| !k.starts_with('#')));
    }

    #[test]
    fn test_parse_info_empty() {
        assert!(parse_info("").is_empty());
        assert!(parse_info("# Server\r\n").is_empty());
    }
}
