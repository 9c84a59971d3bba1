//! Setting value validation.

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "API_BASE" | "COMPANION_SITE" => validate_http_url(value)?,
        "SERVER_PORT" => {
            let v: u16 = value.parse().map_err(|_| "must be a port number")?;
            if v == 0 {
                return Err("must be between 1 and 65535".into());
            }
        }
        "POLL_INTERVAL_MINUTES" => validate_int_range(value, 1, 60)?,
        "SURFACE_REFRESH_SECONDS" => validate_int_range(value, 10, 600)?,
        "EXTERNAL_CHANGE_POLL_MS" => validate_int_range(value, 100, 60_000)?,
        "PERMISSION_PAGE_URL" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_http_url(value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("invalid URL: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme: {other}")),
    }
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_must_be_http() {
        assert!(validate_setting("API_BASE", "https://bngts.com/api").is_ok());
        assert!(validate_setting("API_BASE", "ftp://bngts.com").is_err());
        assert!(validate_setting("COMPANION_SITE", "not a url").is_err());
    }

    #[test]
    fn intervals_are_bounded() {
        assert!(validate_setting("POLL_INTERVAL_MINUTES", "0").is_err());
        assert!(validate_setting("POLL_INTERVAL_MINUTES", "61").is_err());
        assert!(validate_setting("SURFACE_REFRESH_SECONDS", "60").is_ok());
        assert!(validate_setting("SERVER_PORT", "0").is_err());
        assert!(validate_setting("SERVER_PORT", "abc").is_err());
    }

    #[test]
    fn unknown_keys_pass_through() {
        assert!(validate_setting("SOMETHING_ELSE", "").is_ok());
    }
}
