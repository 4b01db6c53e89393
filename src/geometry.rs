/// Screen-pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Horizontal midpoint, rounded half up
    pub fn mid_x(&self) -> i32 {
        self.x + half_round(self.width)
    }

    /// Vertical midpoint, rounded half up
    pub fn mid_y(&self) -> i32 {
        self.y + half_round(self.height)
    }
}

/// Half of `v`, rounded to nearest with halves going up. Only meaningful
/// for non-negative extents.
pub fn half_round(v: i32) -> i32 {
    (v + 1) / 2
}

/// Top-left offset that centers `window` inside `area`. Integer division
/// truncates, matching how every toolkit centers a window.
pub fn centered_origin(window: &Rect, area: &Rect) -> (i32, i32) {
    (
        area.x + (area.width - window.width) / 2,
        area.y + (area.height - window.height) / 2,
    )
}
