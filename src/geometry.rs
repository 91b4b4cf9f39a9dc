//! Target-rectangle math for the seven snap positions.
//!
//! Everything here is pure integer geometry over screen-coordinate
//! rectangles; OS queries live in `platform`. Quadrant positions halve
//! both monitor axes, strip positions span the full width in third-height
//! bands. All division is integer division, so on odd monitor sizes the
//! bottom and right edges can fall a pixel short of the monitor edge.

use crate::shortcuts::Position;

/// Axis-aligned rectangle in screen coordinates, Win32 style
/// (left/top inclusive, right/bottom exclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// How a position fills its region of the monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orientation {
    /// Half the monitor width, used by the four corner positions.
    Quadrant,
    /// Full monitor width, used by the top/middle/bottom bands.
    Strip,
}

/// Compute the screen rectangle a window should occupy for `position`.
///
/// `monitor` is the full bounds of the monitor owning the window and
/// `window` the window's current bounds. A non-resizable window only has
/// its origin moved; width and height keep their current values.
pub fn target_rect(monitor: Rect, window: Rect, resizable: bool, position: Position) -> Rect {
    let monitor_width = monitor.width();
    let monitor_height = monitor.height();

    let half_width = monitor_width / 2;
    let half_height = monitor_height / 2;
    let third_height = monitor_height / 3;

    let (x_offset, y_offset, orientation, region_height) = match position {
        Position::TopLeft => (0, 0, Orientation::Quadrant, half_height),
        Position::TopRight => (half_width, 0, Orientation::Quadrant, half_height),
        Position::BottomLeft => (0, half_height, Orientation::Quadrant, half_height),
        Position::BottomRight => (half_width, half_height, Orientation::Quadrant, half_height),
        Position::Top => (0, 0, Orientation::Strip, third_height),
        Position::Middle => (0, third_height, Orientation::Strip, third_height),
        Position::Bottom => (0, 2 * monitor_height / 3, Orientation::Strip, third_height),
    };

    let width = if resizable {
        match orientation {
            Orientation::Quadrant => half_width,
            Orientation::Strip => monitor_width,
        }
    } else {
        window.width()
    };
    let height = if resizable { region_height } else { window.height() };

    // Offsets are monitor-local; translate by the monitor origin so
    // secondary monitors (including ones left of the primary, with
    // negative coordinates) land correctly.
    let left = monitor.left + x_offset;
    let top = monitor.top + y_offset;
    Rect::new(left, top, left + width, top + height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: Rect = Rect {
        left: 0,
        top: 0,
        right: 1920,
        bottom: 1080,
    };

    fn resizable(position: Position) -> Rect {
        let window = Rect::new(100, 100, 700, 500);
        target_rect(MONITOR, window, true, position)
    }

    #[test]
    fn quadrants_halve_both_axes() {
        assert_eq!(resizable(Position::TopLeft), Rect::new(0, 0, 960, 540));
        assert_eq!(resizable(Position::TopRight), Rect::new(960, 0, 1920, 540));
        assert_eq!(resizable(Position::BottomLeft), Rect::new(0, 540, 960, 1080));
        assert_eq!(
            resizable(Position::BottomRight),
            Rect::new(960, 540, 1920, 1080)
        );
    }

    #[test]
    fn strips_span_full_width_in_third_bands() {
        assert_eq!(resizable(Position::Top), Rect::new(0, 0, 1920, 360));
        assert_eq!(resizable(Position::Middle), Rect::new(0, 360, 1920, 720));
        assert_eq!(resizable(Position::Bottom), Rect::new(0, 720, 1920, 1080));
    }

    #[test]
    fn non_resizable_window_moves_but_keeps_its_size() {
        let window = Rect::new(50, 60, 350, 260);

        let target = target_rect(MONITOR, window, false, Position::TopRight);
        assert_eq!(target, Rect::new(960, 0, 1260, 200));
        assert_eq!(target.width(), window.width());
        assert_eq!(target.height(), window.height());

        let target = target_rect(MONITOR, window, false, Position::Bottom);
        assert_eq!(target, Rect::new(0, 720, 300, 920));
    }

    #[test]
    fn offsets_are_relative_to_the_monitor_origin() {
        let secondary = Rect::new(1920, 0, 3840, 1080);
        let window = Rect::new(2000, 100, 2600, 500);

        assert_eq!(
            target_rect(secondary, window, true, Position::TopLeft),
            Rect::new(1920, 0, 2880, 540)
        );
        assert_eq!(
            target_rect(secondary, window, true, Position::BottomRight),
            Rect::new(2880, 540, 3840, 1080)
        );
    }

    #[test]
    fn monitors_left_of_primary_have_negative_coordinates() {
        let left_monitor = Rect::new(-1920, 0, 0, 1080);
        let window = Rect::new(-1800, 50, -1200, 450);

        assert_eq!(
            target_rect(left_monitor, window, true, Position::TopLeft),
            Rect::new(-1920, 0, -960, 540)
        );
        assert_eq!(
            target_rect(left_monitor, window, true, Position::Middle),
            Rect::new(-1920, 360, 0, 720)
        );
    }

    #[test]
    fn odd_monitor_sizes_round_down() {
        let monitor = Rect::new(0, 0, 1365, 767);
        let window = Rect::new(0, 0, 400, 300);

        assert_eq!(
            target_rect(monitor, window, true, Position::TopLeft),
            Rect::new(0, 0, 682, 383)
        );
        // 2 * 767 / 3 = 511, height 255: the band stops one pixel short.
        let bottom = target_rect(monitor, window, true, Position::Bottom);
        assert_eq!(bottom, Rect::new(0, 511, 1365, 766));
        assert_eq!(bottom.bottom, monitor.bottom - 1);
    }

    #[test]
    fn rect_dimensions() {
        let rect = Rect::new(10, 20, 110, 220);
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 200);
    }
}
