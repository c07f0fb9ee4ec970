/// Circular story list with the "Add Story" button in front
use std::collections::HashMap;

use iced::widget::{button, column, container, image, row, text, Row};
use iced::{Alignment, Border, Color, ContentFit, Element, Theme};

use crate::state::data::{Story, StoryId};
use crate::state::expiry::relative_time;
use crate::Message;

const CIRCLE_SIZE: u16 = 68;

/// Ring color for unviewed stories
const UNVIEWED_RING: Color = Color::from_rgb(0.86, 0.15, 0.47);
/// Ring color for viewed stories
const VIEWED_RING: Color = Color::from_rgb(0.45, 0.45, 0.45);

pub fn view<'a>(
    stories: &[Story],
    handles: &HashMap<StoryId, image::Handle>,
    now: i64,
    uploading: bool,
) -> Element<'a, Message> {
    let mut list = Row::new()
        .spacing(16)
        .align_y(Alignment::Start)
        .push(add_button(uploading));

    for (index, story) in stories.iter().enumerate() {
        if let Some(handle) = handles.get(&story.id) {
            list = list.push(story_circle(story, handle.clone(), index, now));
        }
    }

    list.into()
}

fn add_button<'a>(uploading: bool) -> Element<'a, Message> {
    let label = if uploading { "…" } else { "+" };
    let circle = button(
        container(text(label).size(32))
            .center_x(CIRCLE_SIZE)
            .center_y(CIRCLE_SIZE),
    )
    .padding(0)
    .on_press_maybe((!uploading).then_some(Message::AddStory))
    .style(|theme: &Theme, status| {
        let base = button::secondary(theme, status);
        button::Style {
            border: Border {
                radius: (CIRCLE_SIZE as f32 / 2.0).into(),
                ..base.border
            },
            ..base
        }
    });

    column![circle, text("Add Story").size(12)]
        .spacing(6)
        .align_x(Alignment::Center)
        .into()
}

fn story_circle<'a>(
    story: &Story,
    handle: image::Handle,
    index: usize,
    now: i64,
) -> Element<'a, Message> {
    let ring = if story.viewed { VIEWED_RING } else { UNVIEWED_RING };

    let thumbnail = container(
        image(handle)
            .width(CIRCLE_SIZE - 8)
            .height(CIRCLE_SIZE - 8)
            .content_fit(ContentFit::Cover),
    )
    .padding(4)
    .style(move |_theme: &Theme| container::Style {
        border: Border {
            color: ring,
            width: 3.0,
            radius: (CIRCLE_SIZE as f32 / 2.0).into(),
        },
        ..container::Style::default()
    });

    let circle = button(thumbnail)
        .padding(0)
        .style(button::text)
        .on_press(Message::OpenStory(index));

    column![circle, text(relative_time(story.created_at, now)).size(12)]
        .spacing(6)
        .align_x(Alignment::Center)
        .into()
}

/// Header row shown above the list
pub fn header<'a>(count: usize) -> Element<'a, Message> {
    let subtitle = match count {
        0 => "No stories yet".to_string(),
        1 => "1 story".to_string(),
        n => format!("{} stories", n),
    };

    row![text("Stories").size(32), text(subtitle).size(14)]
        .spacing(16)
        .align_y(Alignment::Center)
        .into()
}
