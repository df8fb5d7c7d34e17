//! Collaborators the composer forwards user intents to.

use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
};

use crate::domain::{
    actions::{Action, ActiveCall},
    composer_input::SelectionRange,
};

const DISPATCH_RECEIVER_GONE: &str = "UI_DISPATCH_RECEIVER_GONE";

pub trait Dispatcher {
    fn dispatch(&self, action: Action);
}

pub trait CallHandler {
    fn call_for_room(&self, room_id: &str) -> Option<ActiveCall>;
}

pub trait ModalManager {
    fn show(&mut self, dialog: Dialog);
}

pub trait FileUploader {
    fn upload_file(&mut self, file: &PendingFile);
}

/// Completion source shown above a rich-text input.
pub trait Autocomplete {
    fn update_query(&mut self, query: &str, selection: SelectionRange);
    /// Returns true when the key was consumed.
    fn on_up_arrow(&mut self) -> bool;
    fn on_down_arrow(&mut self) -> bool;
    /// Takes the highlighted completion, if there is one.
    fn on_confirm(&mut self) -> Option<Completion>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub range: SelectionRange,
    pub completion: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub path: PathBuf,
}

impl PendingFile {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self { name, path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    NeedToRegister {
        title: String,
        description: String,
    },
    Question {
        title: String,
        description: String,
        items: Vec<String>,
    },
}

impl Dialog {
    pub fn title(&self) -> &str {
        match self {
            Self::NeedToRegister { title, .. } | Self::Question { title, .. } => title,
        }
    }
}

/// Dispatcher that forwards actions to whoever holds the receiving end.
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    sender: Sender<Action>,
}

impl ChannelDispatcher {
    pub fn channel() -> (Self, Receiver<Action>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&self, action: Action) {
        if let Err(error) = self.sender.send(action) {
            tracing::warn!(
                code = DISPATCH_RECEIVER_GONE,
                action = ?error.0,
                "action dropped: nobody is listening"
            );
        }
    }
}
