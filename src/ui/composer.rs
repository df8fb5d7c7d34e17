//! Message composer: which controls a room shows and where user intents go.
//!
//! The composer owns no call, upload or dialog logic. It decides what to
//! show from the room's permissions and forwards each intent to the
//! collaborator responsible for it.

use crate::{
    domain::{
        actions::{Action, CallState, CallType},
        composer_input::{ComposerInput, SelectionRange},
        room::RoomState,
    },
    infra::config::FeatureConfig,
    matrix::MatrixClient,
    ui::contracts::{
        Autocomplete, CallHandler, Dialog, Dispatcher, FileUploader, ModalManager, PendingFile,
    },
};

pub const NO_PERMISSION_MESSAGE: &str = "You do not have permission to post to this room";

const NEED_TO_REGISTER_TITLE: &str = "Please Register";
const NEED_TO_REGISTER_DESCRIPTION: &str =
    "Guest users can't upload files. Please register to upload.";
const UPLOAD_CONFIRM_TITLE: &str = "Upload Files";
const UPLOAD_CONFIRM_DESCRIPTION: &str = "Are you sure you want to upload the following files?";

/// Editor features, fixed when the composer is built.
pub enum EditorCapabilities {
    RichText { autocomplete: Box<dyn Autocomplete> },
    Plain,
}

impl EditorCapabilities {
    /// Picks rich text when the feature is on; `autocomplete` is only
    /// built in that case.
    pub fn from_features<F>(features: &FeatureConfig, autocomplete: F) -> Self
    where
        F: FnOnce() -> Box<dyn Autocomplete>,
    {
        if features.rich_text_editor {
            Self::RichText {
                autocomplete: autocomplete(),
            }
        } else {
            Self::Plain
        }
    }

    pub fn is_rich_text(&self) -> bool {
        matches!(self, Self::RichText { .. })
    }

    fn autocomplete_mut(&mut self) -> Option<&mut (dyn Autocomplete + 'static)> {
        match self {
            Self::RichText { autocomplete } => Some(autocomplete.as_mut()),
            Self::Plain => None,
        }
    }
}

pub struct ComposerCollaborators {
    pub dispatcher: Box<dyn Dispatcher>,
    pub calls: Box<dyn CallHandler>,
    pub modals: Box<dyn ModalManager>,
    pub uploader: Box<dyn FileUploader>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerControl {
    Avatar {
        user_id: String,
        display_name: Option<String>,
    },
    Input {
        rich_text: bool,
    },
    Upload,
    Hangup,
    VoiceCall,
    VideoCall,
    NoPermission {
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompletePanel {
    pub query: String,
    pub selection: Option<SelectionRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub autocomplete: Option<AutocompletePanel>,
    pub controls: Vec<ComposerControl>,
}

/// What the caller should do after the upload button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPrompt {
    OpenFilePicker,
    /// A dialog was shown instead; nothing else to do.
    Blocked,
}

pub struct MessageComposer {
    room_id: String,
    capabilities: EditorCapabilities,
    collaborators: ComposerCollaborators,
    input: ComposerInput,
    autocomplete_query: String,
    selection: Option<SelectionRange>,
    pending_files: Vec<PendingFile>,
}

impl MessageComposer {
    pub fn new(
        room_id: impl Into<String>,
        capabilities: EditorCapabilities,
        collaborators: ComposerCollaborators,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            capabilities,
            collaborators,
            input: ComposerInput::default(),
            autocomplete_query: String::new(),
            selection: None,
            pending_files: Vec::new(),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn input(&self) -> &ComposerInput {
        &self.input
    }

    pub fn pending_files(&self) -> &[PendingFile] {
        &self.pending_files
    }

    pub fn render(
        &self,
        client: &dyn MatrixClient,
        room: &dyn RoomState,
        call_state: Option<CallState>,
    ) -> ComposerView {
        let user_id = client.user_id();
        let me = room.member(user_id);

        let mut controls = vec![ComposerControl::Avatar {
            user_id: user_id.to_owned(),
            display_name: me.and_then(|member| member.display_name.clone()),
        }];

        if room.may_send_message(user_id) {
            controls.push(ComposerControl::Input {
                rich_text: self.capabilities.is_rich_text(),
            });
            controls.push(ComposerControl::Upload);

            if call_state.is_some_and(CallState::is_active) {
                controls.push(ComposerControl::Hangup);
            } else {
                controls.push(ComposerControl::VoiceCall);
                controls.push(ComposerControl::VideoCall);
            }
        } else {
            controls.push(ComposerControl::NoPermission {
                message: NO_PERMISSION_MESSAGE,
            });
        }

        let autocomplete = self
            .capabilities
            .is_rich_text()
            .then(|| AutocompletePanel {
                query: self.autocomplete_query.clone(),
                selection: self.selection,
            });

        ComposerView {
            autocomplete,
            controls,
        }
    }

    pub fn on_upload_click(&mut self, client: &dyn MatrixClient) -> UploadPrompt {
        if client.is_guest() {
            self.collaborators.modals.show(Dialog::NeedToRegister {
                title: NEED_TO_REGISTER_TITLE.to_owned(),
                description: NEED_TO_REGISTER_DESCRIPTION.to_owned(),
            });
            return UploadPrompt::Blocked;
        }

        UploadPrompt::OpenFilePicker
    }

    /// Asks for confirmation before uploading `files`.
    ///
    /// The answer comes back through [`Self::on_upload_confirmation`].
    pub fn on_files_selected(&mut self, files: Vec<PendingFile>) {
        if files.is_empty() {
            return;
        }

        let items = files.iter().map(|file| file.name.clone()).collect();
        self.pending_files = files;
        self.collaborators.modals.show(Dialog::Question {
            title: UPLOAD_CONFIRM_TITLE.to_owned(),
            description: UPLOAD_CONFIRM_DESCRIPTION.to_owned(),
            items,
        });
    }

    /// Uploads the pending files if confirmed; the selection is cleared
    /// either way. Returns how many files were handed to the uploader.
    pub fn on_upload_confirmation(&mut self, should_upload: bool) -> usize {
        let files = std::mem::take(&mut self.pending_files);
        if !should_upload {
            return 0;
        }

        for file in &files {
            self.collaborators.uploader.upload_file(file);
        }
        tracing::debug!(room_id = %self.room_id, count = files.len(), "files handed to uploader");

        files.len()
    }

    pub fn on_hangup_click(&self) {
        let Some(call) = self.collaborators.calls.call_for_room(&self.room_id) else {
            return;
        };

        // The call may belong to another room, e.g. the 1:1 room behind a
        // conference.
        self.collaborators.dispatcher.dispatch(Action::Hangup {
            room_id: call.room_id,
        });
    }

    pub fn on_call_click(&self, shift_key: bool) {
        let call_type = if shift_key {
            CallType::Screensharing
        } else {
            CallType::Video
        };
        self.place_call(call_type);
    }

    pub fn on_voice_call_click(&self) {
        self.place_call(CallType::Voice);
    }

    pub fn on_input_content_changed(&mut self, content: &str, selection: SelectionRange) {
        self.input.set_content(content, selection.end);
        self.autocomplete_query = content.to_owned();
        self.selection = Some(selection);

        if let Some(autocomplete) = self.capabilities.autocomplete_mut() {
            autocomplete.update_query(content, selection);
        }
    }

    pub fn on_up_arrow(&mut self) -> bool {
        self.capabilities
            .autocomplete_mut()
            .is_some_and(|autocomplete| autocomplete.on_up_arrow())
    }

    pub fn on_down_arrow(&mut self) -> bool {
        self.capabilities
            .autocomplete_mut()
            .is_some_and(|autocomplete| autocomplete.on_down_arrow())
    }

    /// Applies the highlighted completion, if any. Returns false without
    /// autocomplete or when nothing is highlighted.
    pub fn try_complete(&mut self) -> bool {
        let completion = self
            .capabilities
            .autocomplete_mut()
            .and_then(|autocomplete| autocomplete.on_confirm());

        match completion {
            Some(completion) => {
                self.on_autocomplete_confirm(completion.range, &completion.completion);
                true
            }
            None => false,
        }
    }

    pub fn on_autocomplete_confirm(&mut self, range: SelectionRange, completion: &str) {
        self.input.apply_completion(range, completion);
    }

    fn place_call(&self, call_type: CallType) {
        self.collaborators.dispatcher.dispatch(Action::PlaceCall {
            call_type,
            room_id: self.room_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, sync::mpsc::Receiver};

    use super::*;
    use crate::{
        domain::{
            actions::ActiveCall,
            room::{Membership, PowerLevels, Room, RoomMember},
        },
        test_support::{credentials, FakeClient, FakeClientFactory},
        ui::{autocomplete::MemberAutocomplete, contracts::ChannelDispatcher},
        usecases::session::{ClientSession, SessionSettings},
    };

    const ROOM: &str = "!room:example.org";
    const ME: &str = "@alice:example.org";

    #[derive(Default, Clone)]
    struct Recorded {
        dialogs: Rc<RefCell<Vec<Dialog>>>,
        uploads: Rc<RefCell<Vec<String>>>,
    }

    struct RecordingModals(Rc<RefCell<Vec<Dialog>>>);

    impl ModalManager for RecordingModals {
        fn show(&mut self, dialog: Dialog) {
            self.0.borrow_mut().push(dialog);
        }
    }

    struct RecordingUploader(Rc<RefCell<Vec<String>>>);

    impl FileUploader for RecordingUploader {
        fn upload_file(&mut self, file: &PendingFile) {
            self.0.borrow_mut().push(file.name.clone());
        }
    }

    struct FixedCalls(Option<ActiveCall>);

    impl CallHandler for FixedCalls {
        fn call_for_room(&self, _room_id: &str) -> Option<ActiveCall> {
            self.0.clone()
        }
    }

    fn composer_with(
        capabilities: EditorCapabilities,
        call: Option<ActiveCall>,
    ) -> (MessageComposer, Receiver<Action>, Recorded) {
        let (dispatcher, receiver) = ChannelDispatcher::channel();
        let recorded = Recorded::default();
        let composer = MessageComposer::new(
            ROOM,
            capabilities,
            ComposerCollaborators {
                dispatcher: Box::new(dispatcher),
                calls: Box::new(FixedCalls(call)),
                modals: Box::new(RecordingModals(Rc::clone(&recorded.dialogs))),
                uploader: Box::new(RecordingUploader(Rc::clone(&recorded.uploads))),
            },
        );
        (composer, receiver, recorded)
    }

    fn plain_composer() -> (MessageComposer, Receiver<Action>, Recorded) {
        composer_with(EditorCapabilities::Plain, None)
    }

    fn rich_capabilities() -> EditorCapabilities {
        EditorCapabilities::RichText {
            autocomplete: Box::new(MemberAutocomplete::new(vec![
                "@bob:example.org".to_owned(),
            ])),
        }
    }

    fn session(guest: bool) -> ClientSession<FakeClientFactory> {
        let mut creds = credentials(ME);
        creds.guest = guest;
        let mut session = ClientSession::new(
            FakeClientFactory::default(),
            SessionSettings::default(),
            None,
        );
        session.replace(&creds).expect("replace");
        session
    }

    fn client(session: &ClientSession<FakeClientFactory>) -> &FakeClient {
        session.get().expect("active client")
    }

    fn joined_room() -> Room {
        Room::new(ROOM).with_member(RoomMember {
            user_id: ME.to_owned(),
            display_name: Some("Alice".to_owned()),
            membership: Membership::Join,
        })
    }

    #[test]
    fn sender_sees_input_upload_and_call_buttons() {
        let (composer, _rx, _recorded) = plain_composer();
        let session = session(false);

        let view = composer.render(client(&session), &joined_room(), None);

        assert_eq!(
            view.controls,
            vec![
                ComposerControl::Avatar {
                    user_id: ME.to_owned(),
                    display_name: Some("Alice".to_owned()),
                },
                ComposerControl::Input { rich_text: false },
                ComposerControl::Upload,
                ComposerControl::VoiceCall,
                ComposerControl::VideoCall,
            ]
        );
        assert!(view.autocomplete.is_none());
    }

    #[test]
    fn active_call_replaces_call_buttons_with_hangup() {
        let (composer, _rx, _recorded) = plain_composer();
        let session = session(false);

        let view = composer.render(client(&session), &joined_room(), Some(CallState::Connected));

        assert_eq!(view.controls.last(), Some(&ComposerControl::Hangup));
        assert!(!view.controls.contains(&ComposerControl::VoiceCall));
    }

    #[test]
    fn ended_call_shows_call_buttons_again() {
        let (composer, _rx, _recorded) = plain_composer();
        let session = session(false);

        let view = composer.render(client(&session), &joined_room(), Some(CallState::Ended));

        assert!(view.controls.contains(&ComposerControl::VoiceCall));
        assert!(!view.controls.contains(&ComposerControl::Hangup));
    }

    #[test]
    fn denied_user_sees_only_avatar_and_no_permission_message() {
        let (composer, _rx, _recorded) = plain_composer();
        let session = session(false);
        let mut levels = PowerLevels::default();
        levels.events.insert("m.room.message".to_owned(), 50);
        let room = joined_room().with_power_levels(levels);

        let view = composer.render(client(&session), &room, None);

        assert_eq!(view.controls.len(), 2);
        assert_eq!(
            view.controls[1],
            ComposerControl::NoPermission {
                message: NO_PERMISSION_MESSAGE
            }
        );
    }

    #[test]
    fn non_member_avatar_has_no_display_name() {
        let (composer, _rx, _recorded) = plain_composer();
        let session = session(false);

        let view = composer.render(client(&session), &Room::new(ROOM), None);

        assert_eq!(
            view.controls[0],
            ComposerControl::Avatar {
                user_id: ME.to_owned(),
                display_name: None,
            }
        );
        assert!(matches!(
            view.controls[1],
            ComposerControl::NoPermission { .. }
        ));
    }

    #[test]
    fn rich_text_renders_autocomplete_panel_with_query() {
        let (mut composer, _rx, _recorded) = composer_with(rich_capabilities(), None);
        let session = session(false);

        composer.on_input_content_changed("hi @b", SelectionRange::caret(5));
        let view = composer.render(client(&session), &joined_room(), None);

        assert_eq!(
            view.autocomplete,
            Some(AutocompletePanel {
                query: "hi @b".to_owned(),
                selection: Some(SelectionRange::caret(5)),
            })
        );
        assert_eq!(view.controls[1], ComposerControl::Input { rich_text: true });
    }

    #[test]
    fn capabilities_follow_feature_flag() {
        let plain = EditorCapabilities::from_features(&FeatureConfig::default(), || {
            panic!("autocomplete must not be built for plain editors")
        });
        assert!(!plain.is_rich_text());

        let rich = EditorCapabilities::from_features(
            &FeatureConfig {
                rich_text_editor: true,
            },
            || Box::new(MemberAutocomplete::default()) as Box<dyn Autocomplete>,
        );
        assert!(rich.is_rich_text());
    }

    #[test]
    fn guest_upload_shows_register_dialog_and_no_picker() {
        let (mut composer, _rx, recorded) = plain_composer();
        let session = session(true);

        let prompt = composer.on_upload_click(client(&session));

        assert_eq!(prompt, UploadPrompt::Blocked);
        assert_eq!(
            recorded.dialogs.borrow().as_slice(),
            [Dialog::NeedToRegister {
                title: "Please Register".to_owned(),
                description: "Guest users can't upload files. Please register to upload."
                    .to_owned(),
            }]
        );
    }

    #[test]
    fn registered_user_upload_opens_picker() {
        let (mut composer, _rx, recorded) = plain_composer();
        let session = session(false);

        assert_eq!(
            composer.on_upload_click(client(&session)),
            UploadPrompt::OpenFilePicker
        );
        assert!(recorded.dialogs.borrow().is_empty());
    }

    fn files() -> Vec<PendingFile> {
        vec![
            PendingFile::from_path("/tmp/a.png".into()),
            PendingFile::from_path("/tmp/b.pdf".into()),
        ]
    }

    #[test]
    fn selected_files_ask_for_confirmation_then_upload_each() {
        let (mut composer, _rx, recorded) = plain_composer();

        composer.on_files_selected(files());

        {
            let dialogs = recorded.dialogs.borrow();
            assert_eq!(dialogs.len(), 1);
            assert_eq!(dialogs[0].title(), "Upload Files");
            assert!(matches!(
                &dialogs[0],
                Dialog::Question { items, .. } if items == &["a.png", "b.pdf"]
            ));
        }
        assert!(recorded.uploads.borrow().is_empty());

        let uploaded = composer.on_upload_confirmation(true);

        assert_eq!(uploaded, 2);
        assert_eq!(recorded.uploads.borrow().as_slice(), ["a.png", "b.pdf"]);
        assert!(composer.pending_files().is_empty());
    }

    #[test]
    fn declined_confirmation_uploads_nothing_and_clears_selection() {
        let (mut composer, _rx, recorded) = plain_composer();
        composer.on_files_selected(files());

        let uploaded = composer.on_upload_confirmation(false);

        assert_eq!(uploaded, 0);
        assert!(recorded.uploads.borrow().is_empty());
        assert!(composer.pending_files().is_empty());
    }

    #[test]
    fn hangup_targets_the_calls_room() {
        let (composer, rx, _recorded) = composer_with(
            EditorCapabilities::Plain,
            Some(ActiveCall {
                room_id: "!conference-1to1:example.org".to_owned(),
                state: CallState::Connected,
            }),
        );

        composer.on_hangup_click();

        assert_eq!(
            rx.try_recv().expect("hangup dispatched"),
            Action::Hangup {
                room_id: "!conference-1to1:example.org".to_owned()
            }
        );
    }

    #[test]
    fn hangup_without_call_does_nothing() {
        let (composer, rx, _recorded) = plain_composer();

        composer.on_hangup_click();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn call_buttons_dispatch_place_call() {
        let (composer, rx, _recorded) = plain_composer();

        composer.on_call_click(false);
        composer.on_call_click(true);
        composer.on_voice_call_click();

        let types: Vec<CallType> = rx
            .try_iter()
            .map(|action| match action {
                Action::PlaceCall { call_type, room_id } => {
                    assert_eq!(room_id, ROOM);
                    call_type
                }
                other => panic!("unexpected action {other:?}"),
            })
            .collect();
        assert_eq!(
            types,
            vec![CallType::Video, CallType::Screensharing, CallType::Voice]
        );
    }

    #[test]
    fn plain_editor_has_no_autocomplete_navigation() {
        let (mut composer, _rx, _recorded) = plain_composer();
        composer.on_input_content_changed("@b", SelectionRange::caret(2));

        assert!(!composer.on_up_arrow());
        assert!(!composer.on_down_arrow());
        assert!(!composer.try_complete());
        assert_eq!(composer.input().text(), "@b");
    }

    #[test]
    fn try_complete_applies_highlighted_completion() {
        let (mut composer, _rx, _recorded) = composer_with(rich_capabilities(), None);
        composer.on_input_content_changed("hi @b", SelectionRange::caret(5));

        assert!(composer.on_down_arrow());
        assert!(composer.try_complete());

        assert_eq!(composer.input().text(), "hi @bob:example.org");
        assert!(!composer.try_complete());
    }

    #[test]
    fn autocomplete_confirm_is_forwarded_to_input() {
        let (mut composer, _rx, _recorded) = plain_composer();
        composer.on_input_content_changed("/jo", SelectionRange::caret(3));

        composer.on_autocomplete_confirm(SelectionRange::new(0, 3), "/join ");

        assert_eq!(composer.input().text(), "/join ");
        assert_eq!(composer.input().cursor_position(), 6);
    }
}
