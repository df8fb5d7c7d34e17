use serde_json::Value;

/// Content of an `m.file` style message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileContent {
    pub body: Option<String>,
    pub url: Option<String>,
    pub info: Option<FileInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileInfo {
    pub size: Option<u64>,
    pub mimetype: Option<String>,
}

impl FileContent {
    /// Reads file content from raw event content.
    ///
    /// Each field is read on its own: a field with an unexpected type is
    /// treated as absent and the others are kept.
    pub fn from_event_content(content: &Value) -> Self {
        Self {
            body: string_field(content, "body"),
            url: string_field(content, "url"),
            info: content
                .get("info")
                .filter(|info| info.is_object())
                .map(FileInfo::from_value),
        }
    }
}

impl FileInfo {
    fn from_value(info: &Value) -> Self {
        Self {
            size: info.get("size").and_then(|size| {
                let parsed = lenient_size(size);
                if parsed.is_none() {
                    tracing::debug!(size = %size, "ignoring unusable attachment size");
                }
                parsed
            }),
            mimetype: string_field(info, "mimetype"),
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Accepts integers, non-negative floats (truncated) and numeric strings.
fn lenient_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(float_size)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(float_size))
        }
        _ => None,
    }
}

fn float_size(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value < u64::MAX as f64).then(|| value as u64)
}
