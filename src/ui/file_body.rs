//! Body of a file attachment message.

use std::fmt;

use crate::{
    domain::{file_content::FileContent, message::TimelineEvent},
    matrix::MatrixClient,
    ui::size::format_file_size,
};

const FALLBACK_TEXT: &str = "Attachment";

/// Link text for an attachment: its body, or a fallback, plus the size.
pub fn presentable_text_for_file(content: &FileContent) -> String {
    let mut text = match content.body.as_deref() {
        Some(body) if !body.is_empty() => body.to_owned(),
        _ => FALLBACK_TEXT.to_owned(),
    };

    if let Some(size) = content.info.as_ref().and_then(|info| info.size) {
        if size > 0 {
            text.push_str(&format!(" ({})", format_file_size(size)));
        }
    }

    text
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBodyView {
    Download { href: String, label: String },
    Invalid { message: String },
}

impl FileBodyView {
    /// Resolves the attachment URL through `client`.
    ///
    /// An unresolvable URL or a missing client yields `Invalid`.
    pub fn new(content: &FileContent, client: Option<&dyn MatrixClient>) -> Self {
        let text = presentable_text_for_file(content);
        let href = client
            .zip(content.url.as_deref())
            .and_then(|(client, url)| client.mxc_url_to_http(url));

        match href {
            Some(href) => Self::Download {
                href,
                label: format!("Download {text}"),
            },
            None => {
                tracing::debug!(url = ?content.url, "attachment url did not resolve");
                Self::Invalid {
                    message: format!("Invalid file: {text}"),
                }
            }
        }
    }

    pub fn from_event(event: &TimelineEvent, client: Option<&dyn MatrixClient>) -> Self {
        Self::new(&FileContent::from_event_content(&event.content), client)
    }
}

impl fmt::Display for FileBodyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download { href, label } => write!(f, "{label} <{href}>"),
            Self::Invalid { message } => f.write_str(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        domain::file_content::FileInfo,
        matrix::{ClientFactory, HomeserverClientFactory},
        test_support::{credentials, FakeClientFactory},
        usecases::session::{ClientSession, SessionSettings},
    };

    fn content(value: serde_json::Value) -> FileContent {
        FileContent::from_event_content(&value)
    }

    #[test]
    fn body_and_size_make_the_link_text() {
        let text = presentable_text_for_file(&content(json!({
            "body": "photo.png",
            "info": {"size": 2048},
        })));

        assert_eq!(text, "photo.png (2 KB)");
    }

    #[test]
    fn float_size_still_shows_name_and_size() {
        let file = content(json!({
            "body": "photo.png",
            "url": "mxc://a/b",
            "info": {"size": 2048.0},
        }));

        assert_eq!(presentable_text_for_file(&file), "photo.png (2 KB)");
        assert_eq!(file.url.as_deref(), Some("mxc://a/b"));
    }

    #[test]
    fn unusable_size_is_left_out_of_the_text() {
        for size in [json!("lots"), json!(-5)] {
            let text = presentable_text_for_file(&content(json!({
                "body": "photo.png",
                "info": {"size": size},
            })));

            assert_eq!(text, "photo.png");
        }
    }

    #[test]
    fn empty_content_falls_back_to_attachment() {
        assert_eq!(presentable_text_for_file(&content(json!({}))), "Attachment");
        assert_eq!(
            presentable_text_for_file(&content(json!({"body": ""}))),
            "Attachment"
        );
    }

    #[test]
    fn zero_size_is_not_shown() {
        let text = presentable_text_for_file(&FileContent {
            body: Some("empty.txt".to_owned()),
            url: None,
            info: Some(FileInfo {
                size: Some(0),
                mimetype: None,
            }),
        });

        assert_eq!(text, "empty.txt");
    }

    #[test]
    fn resolvable_url_renders_download_link() {
        let mut session = ClientSession::new(
            FakeClientFactory::default(),
            SessionSettings::default(),
            None,
        );
        session
            .replace(&credentials("@alice:example.org"))
            .expect("replace");
        let client = session.get().map(|c| c as &dyn MatrixClient);

        let view = FileBodyView::new(
            &content(json!({
                "body": "report.pdf",
                "url": "mxc://example.org/abc123",
                "info": {"size": 1500},
            })),
            client,
        );

        assert_eq!(
            view,
            FileBodyView::Download {
                href: "https://matrix.example.org/_matrix/media/r0/download/example.org/abc123"
                    .to_owned(),
                label: "Download report.pdf (1.46 KB)".to_owned(),
            }
        );
    }

    #[test]
    fn unresolvable_url_renders_invalid_file() {
        let client = HomeserverClientFactory
            .create_client(crate::matrix::CreateClientOptions {
                base_url: "https://matrix.example.org".to_owned(),
                identity_base_url: String::new(),
                access_token: "token".to_owned(),
                user_id: "@alice:example.org".to_owned(),
                device_id: "DEVICE".to_owned(),
                timeline_support: true,
                session_store: None,
            })
            .expect("client");

        let view = FileBodyView::new(
            &content(json!({"body": "x.bin", "url": "https://elsewhere/x.bin"})),
            Some(&client as &dyn MatrixClient),
        );

        assert_eq!(
            view,
            FileBodyView::Invalid {
                message: "Invalid file: x.bin".to_owned()
            }
        );
    }

    #[test]
    fn missing_client_or_url_is_invalid() {
        let view = FileBodyView::new(&content(json!({"url": "mxc://example.org/abc"})), None);
        assert_eq!(view.to_string(), "Invalid file: Attachment");

        let view = FileBodyView::new(&content(json!({})), None);
        assert_eq!(view.to_string(), "Invalid file: Attachment");
    }
}
