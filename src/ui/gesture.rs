/// Swipe and tap detection over the full-screen story
use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Program};
use iced::{Point, Rectangle, Renderer, Theme};

use crate::state::viewer::Intent;
use crate::Message;

/// Minimum travel (logical pixels) for a press-drag-release to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// Map a press/release pair to a navigation intent.
///
/// Positions are relative to the surface. Horizontal swipes navigate,
/// a downward swipe closes, and short taps on the outer thirds step
/// back or forward.
pub fn classify(start: Point, end: Point, width: f32) -> Option<Intent> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    if dx.abs() >= SWIPE_THRESHOLD && dx.abs() >= dy.abs() {
        return Some(if dx < 0.0 { Intent::Next } else { Intent::Previous });
    }
    if dy.abs() >= SWIPE_THRESHOLD {
        return (dy > 0.0).then_some(Intent::Close);
    }

    // Tap
    if start.x < width / 3.0 {
        Some(Intent::Previous)
    } else if start.x > width * 2.0 / 3.0 {
        Some(Intent::Next)
    } else {
        None
    }
}

/// Transparent canvas layered over the story image.
/// Pressing pauses playback; releasing resumes and may navigate.
#[derive(Debug, Default)]
pub struct SwipeSurface;

/// Press position of the gesture in progress
#[derive(Debug, Clone, Default)]
pub struct SwipeState {
    pub start: Option<Point>,
}

impl Program<Message> for SwipeSurface {
    type State = SwipeState;

    fn draw(
        &self,
        _state: &Self::State,
        _renderer: &Renderer,
        _theme: &Theme,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        vec![]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let (pressed, position) = match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                (true, cursor.position_in(bounds))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                (false, cursor.position_in(bounds))
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                (true, relative(position, bounds))
            }
            canvas::Event::Touch(touch::Event::FingerLifted { position, .. })
            | canvas::Event::Touch(touch::Event::FingerLost { position, .. }) => {
                (false, Some(Point::new(position.x - bounds.x, position.y - bounds.y)))
            }
            _ => return (canvas::event::Status::Ignored, None),
        };

        if pressed {
            let Some(position) = position else {
                return (canvas::event::Status::Ignored, None);
            };
            state.start = Some(position);
            return (canvas::event::Status::Captured, Some(Message::Hold));
        }

        // Release
        let Some(start) = state.start.take() else {
            return (canvas::event::Status::Ignored, None);
        };
        let intent = position.and_then(|end| classify(start, end, bounds.width));
        (canvas::event::Status::Captured, Some(Message::Release(intent)))
    }
}

/// Position relative to `bounds`, if inside them
fn relative(position: Point, bounds: Rectangle) -> Option<Point> {
    bounds
        .contains(position)
        .then(|| Point::new(position.x - bounds.x, position.y - bounds.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 300.0;

    #[test]
    fn test_horizontal_swipes() {
        let start = Point::new(200.0, 100.0);
        assert_eq!(classify(start, Point::new(100.0, 110.0), WIDTH), Some(Intent::Next));
        assert_eq!(classify(Point::new(100.0, 100.0), Point::new(200.0, 90.0), WIDTH), Some(Intent::Previous));
    }

    #[test]
    fn test_vertical_swipes() {
        let start = Point::new(150.0, 100.0);
        assert_eq!(classify(start, Point::new(160.0, 200.0), WIDTH), Some(Intent::Close));
        assert_eq!(classify(start, Point::new(150.0, 20.0), WIDTH), None);
    }

    #[test]
    fn test_taps_use_outer_thirds() {
        let left = Point::new(40.0, 100.0);
        let middle = Point::new(150.0, 100.0);
        let right = Point::new(260.0, 100.0);

        assert_eq!(classify(left, left, WIDTH), Some(Intent::Previous));
        assert_eq!(classify(middle, Point::new(160.0, 110.0), WIDTH), None);
        assert_eq!(classify(right, right, WIDTH), Some(Intent::Next));
    }

    #[test]
    fn test_relative_position() {
        let bounds = Rectangle::new(Point::new(10.0, 20.0), iced::Size::new(100.0, 100.0));

        assert_eq!(relative(Point::new(15.0, 25.0), bounds), Some(Point::new(5.0, 5.0)));
        assert_eq!(relative(Point::new(500.0, 25.0), bounds), None);
    }
}
