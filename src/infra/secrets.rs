use std::panic;

const REDACTED: &str = "[REDACTED]";

const SENSITIVE_MARKERS: [&str; 5] = ["password", "secret", "token", "syt_", "bearer"];

const UNKNOWN_ERRCODE: &str = "M_UNKNOWN";

pub fn redact_text(input: &str) -> String {
    input
        .split_whitespace()
        .map(redact_chunk)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps a short prefix of an access token so sessions can be told apart.
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        REDACTED.to_owned()
    } else {
        format!("{prefix}…{REDACTED}")
    }
}

/// Passes through well-formed Matrix `errcode` values only.
pub fn sanitize_errcode(code: &str) -> String {
    let valid = code.starts_with("M_")
        && code.len() <= 64
        && code
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_');

    if valid {
        code.to_owned()
    } else {
        UNKNOWN_ERRCODE.to_owned()
    }
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "rmx panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("rmx panic: {}", scrubbed);
        }
    }));
}

fn redact_chunk(chunk: &str) -> String {
    let lowered = chunk.to_ascii_lowercase();
    if SENSITIVE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
        || looks_like_secret_value(chunk)
    {
        REDACTED.to_owned()
    } else {
        chunk.to_owned()
    }
}

fn looks_like_secret_value(value: &str) -> bool {
    let cleaned = value.trim_matches(|ch: char| !ch.is_ascii_alphanumeric());

    let has_mixed = cleaned.chars().any(|ch| ch.is_ascii_alphabetic())
        && cleaned.chars().any(|ch| ch.is_ascii_digit());

    cleaned.len() >= 20 && has_mixed
}
