/// Full-screen story viewer
use iced::widget::{button, canvas, column, container, image, progress_bar, row, stack, text, Row};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};

use super::gesture::SwipeSurface;
use crate::state::data::Story;
use crate::state::expiry::time_remaining;
use crate::state::viewer::{Intent, ViewerController};
use crate::Message;

const PLAY_GLYPH: &str = "▶";
const PAUSE_GLYPH: &str = "⏸";
const DELETE_GLYPH: &str = "🗑";
const CLOSE_GLYPH: &str = "✕";

/// Header button labels: pause/play, delete, close
fn action_glyphs(paused: bool) -> [&'static str; 3] {
    let pause = if paused { PLAY_GLYPH } else { PAUSE_GLYPH };
    [pause, DELETE_GLYPH, CLOSE_GLYPH]
}

/// Render the open viewer for `story`, with one progress segment per active story
pub fn view<'a>(
    viewer: &ViewerController,
    story: &Story,
    handle: image::Handle,
    active_count: usize,
    now: i64,
) -> Element<'a, Message> {
    let segments = Row::with_children(
        viewer
            .segments(active_count)
            .into_iter()
            .map(|fill| progress_bar(0.0..=100.0, fill).height(3).into()),
    )
    .spacing(4);

    let [pause_label, delete_label, close_label] = action_glyphs(viewer.is_paused());
    let header = row![
        column![
            text("Your Story").size(16),
            text(time_remaining(story.created_at, now)).size(12),
        ]
        .spacing(2)
        .width(Length::Fill),
        button(text(pause_label)).on_press(Message::TogglePause),
        button(text(delete_label)).on_press(Message::Intent(Intent::Delete)),
        button(text(close_label)).on_press(Message::Intent(Intent::Close)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let content = stack![
        image(handle)
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain),
        canvas(SwipeSurface)
            .width(Length::Fill)
            .height(Length::Fill),
    ];

    let hint = text("Swipe left/right to navigate • Swipe down to close").size(12);

    container(
        column![segments, header, content, hint]
            .spacing(12)
            .align_x(Alignment::Center),
    )
    .padding(16)
    .width(Length::Fill)
    .height(Length::Fill)
    .style(|_theme: &Theme| container::Style {
        background: Some(Color::BLACK.into()),
        text_color: Some(Color::WHITE),
        ..container::Style::default()
    })
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_buttons_are_all_glyphs() {
        assert_eq!(action_glyphs(false), [PAUSE_GLYPH, DELETE_GLYPH, CLOSE_GLYPH]);
        assert_eq!(action_glyphs(true)[0], PLAY_GLYPH);

        for glyph in action_glyphs(false).into_iter().chain(action_glyphs(true)) {
            assert_eq!(glyph.chars().count(), 1, "{glyph} is not a single glyph");
        }
    }
}
