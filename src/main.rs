use clap::Parser;
use iced::keyboard::{self, key::Named, Key};
use iced::widget::{column, container, image, text};
use iced::{time, Alignment, Color, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod media;
mod state;
mod ui;

use config::{AppConfig, Args};
use media::encoder::{self, EncodeError};
use state::clock::SystemClock;
use state::data::{EncodedImage, StoryId};
use state::library::{Library, MemoryPersistence, StoryPersistence};
use state::notice::NoticeBoard;
use state::store::StoryStore;
use state::viewer::{Intent, ViewerController};

/// Main application state
struct StoryReel {
    config: AppConfig,
    store: StoryStore,
    viewer: ViewerController,
    /// Decoded image handles for the active stories
    handles: HashMap<StoryId, image::Handle>,
    /// Upload error shown under the list
    notices: NoticeBoard,
    /// An upload is being encoded
    uploading: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Add Story" button
    AddStory,
    /// Background encoding finished
    StoryEncoded(Result<EncodedImage, EncodeError>),
    /// Notice lifetime elapsed
    DismissNotice(u64),
    /// User clicked a story in the list
    OpenStory(usize),
    /// Playback timer step
    Tick,
    /// Periodic expiration sweep
    Sweep,
    /// Navigation from keyboard, buttons or gestures
    Intent(Intent),
    TogglePause,
    /// Press on the story image
    Hold,
    /// Release after a press, with the gesture it completed
    Release(Option<Intent>),
}

impl StoryReel {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        // Fall back to an in-memory record so the app still works this session
        let persistence: Box<dyn StoryPersistence> = match Library::open(&config.db_path) {
            Ok(library) => Box::new(library),
            Err(e) => {
                tracing::warn!(error = %e, "story database unavailable, stories will not be saved");
                Box::new(MemoryPersistence::new())
            }
        };

        let store = StoryStore::load(Arc::new(SystemClock), persistence);
        let viewer = ViewerController::new(config.story_duration_ms, config.tick_ms);

        let mut app = StoryReel {
            config,
            store,
            viewer,
            handles: HashMap::new(),
            notices: NoticeBoard::default(),
            uploading: false,
        };
        app.sync_handles();

        (app, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::AddStory => self.pick_story(),
            Message::StoryEncoded(result) => {
                self.uploading = false;
                match result {
                    Ok(encoded) => {
                        self.store.add_story(encoded);
                        Task::none()
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "upload rejected");
                        let id = self.notices.post(e.to_string());
                        let lifetime = self.config.notice_duration;
                        Task::perform(
                            async move { tokio::time::sleep(lifetime).await },
                            move |_| Message::DismissNotice(id),
                        )
                    }
                }
            }
            Message::DismissNotice(id) => {
                self.notices.dismiss(id);
                Task::none()
            }
            Message::OpenStory(index) => {
                self.viewer.open_at(&mut self.store, index);
                Task::none()
            }
            Message::Tick => {
                self.viewer.tick(&mut self.store);
                Task::none()
            }
            Message::Sweep => {
                self.store.cleanup_expired();
                self.viewer.reconcile(&mut self.store);
                Task::none()
            }
            Message::Intent(intent) => {
                self.viewer.handle(&mut self.store, intent);
                Task::none()
            }
            Message::TogglePause => {
                self.viewer.toggle_pause();
                Task::none()
            }
            Message::Hold => {
                self.viewer.pause();
                Task::none()
            }
            Message::Release(intent) => {
                self.viewer.resume();
                if let Some(intent) = intent {
                    self.viewer.handle(&mut self.store, intent);
                }
                Task::none()
            }
        };

        // Every event doubles as a render pass: reclaim expired storage and
        // keep the viewer's position in step with the active sequence
        self.store.cleanup_expired();
        self.viewer.reconcile(&mut self.store);
        self.sync_handles();
        task
    }

    /// Show the native file picker and start encoding the chosen photo
    fn pick_story(&mut self) -> Task<Message> {
        if self.uploading {
            return Task::none();
        }

        let Some(path) = FileDialog::new()
            .set_title("Choose a photo")
            .add_filter("Images", &["jpg", "jpeg", "png", "gif", "webp", "bmp"])
            .pick_file()
        else {
            return Task::none();
        };

        tracing::info!(path = %path.display(), "encoding story");
        self.uploading = true;
        self.notices.clear();
        Task::perform(encode_file(path), Message::StoryEncoded)
    }

    /// Keep one decoded handle per active story
    fn sync_handles(&mut self) {
        let active = self.store.active_stories();
        let ids: HashSet<&StoryId> = active.iter().map(|story| &story.id).collect();
        self.handles.retain(|id, _| ids.contains(id));

        for story in &active {
            self.handles
                .entry(story.id.clone())
                .or_insert_with(|| image::Handle::from_bytes(story.image.as_bytes().to_vec()));
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let active = self.store.active_stories();
        let now = self.store.now_ms();

        if let Some(story) = self.store.current_story() {
            if let Some(handle) = self.handles.get(&story.id) {
                return ui::viewer::view(&self.viewer, story, handle.clone(), active.len(), now);
            }
        }

        let notice = self.notices.current().map(|notice| {
            container(text(notice.message.clone()).size(14))
                .padding(10)
                .style(|_theme: &Theme| container::Style {
                    background: Some(Color::from_rgb(0.75, 0.2, 0.2).into()),
                    text_color: Some(Color::WHITE),
                    ..container::Style::default()
                })
        });

        let content = column![
            ui::story_list::header(active.len()),
            ui::story_list::view(&active, &self.handles, now, self.uploading),
        ]
        .push_maybe(notice)
        .push(text("Upload photos that disappear after 24 hours").size(16))
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Start);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Timers only exist while their owner needs them: the playback tick
    /// while a story is playing, the sweep while the app is running.
    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            time::every(self.config.sweep_interval).map(|_| Message::Sweep),
            keyboard::on_key_press(key_to_message),
        ];

        if self.viewer.is_playing() {
            let step = Duration::from_millis(u64::from(self.viewer.tick_ms()));
            subscriptions.push(time::every(step).map(|_| Message::Tick));
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Keyboard navigation for the viewer
fn key_to_message(key: Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    let intent = match key {
        Key::Named(Named::ArrowRight) => Intent::Next,
        Key::Named(Named::ArrowLeft) => Intent::Previous,
        Key::Named(Named::Escape) => Intent::Close,
        Key::Named(Named::Delete) | Key::Named(Named::Backspace) => Intent::Delete,
        _ => return None,
    };
    Some(Message::Intent(intent))
}

/// Read and encode a picked file off the UI thread
async fn encode_file(path: PathBuf) -> Result<EncodedImage, EncodeError> {
    let source = media::source::read_source(&path).await?;
    encoder::encode(source).await
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from(Args::parse());
    tracing::info!(db = %config.db_path.display(), "starting story reel");

    iced::application("Stories", StoryReel::update, StoryReel::view)
        .subscription(StoryReel::subscription)
        .theme(StoryReel::theme)
        .centered()
        .run_with(move || StoryReel::new(config))
}
