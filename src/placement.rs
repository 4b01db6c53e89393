//! Window placement policy
//!
//! A pure computation: given the desired anchor/size, the current screen
//! state, and the terminal's sizing limits, decide the final columns, rows,
//! and top-left offset. Applying the result is the caller's job, so all of
//! this is testable without a display server.

use thiserror::Error;

use crate::constants::limits::{COLUMN_MARGIN, MIN_COLUMNS, MIN_ROWS, ROW_MARGIN};
use crate::geometry::{centered_origin, Rect};

/// Named screen position the window can be pinned to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    NotSet,
    BottomLeft,
    Bottom,
    BottomRight,
    Left,
    Center,
    Right,
    TopLeft,
    Top,
    TopRight,
    Maximized,
    Minimized,
    Restore,
}

/// Desired geometry. `width`/`height` carry raw user integers (clamped
/// later); the keep flags are the `-` sentinel and exclude a dimension from
/// sizing entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementRequest {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub anchor: Anchor,
    pub keep_width: bool,
    pub keep_height: bool,
}

/// Snapshot of the screen and window as they are right now
#[derive(Debug, Clone, Copy)]
pub struct ScreenContext {
    /// Current window rectangle, screen pixels
    pub window: Rect,
    /// Working area of the screen holding the window
    pub work_area: Rect,
    /// Current terminal width, columns
    pub columns: u16,
    /// Current terminal height, rows
    pub rows: u16,
}

/// Largest terminal the screen can hold
#[derive(Debug, Clone, Copy)]
pub struct TerminalLimits {
    pub max_columns: u16,
    pub max_rows: u16,
}

impl TerminalLimits {
    /// Widest window the policy will produce; a margin stays reserved for
    /// scrollbar and frame chrome
    pub fn usable_columns(&self) -> u16 {
        self.max_columns.saturating_sub(COLUMN_MARGIN)
    }

    pub fn usable_rows(&self) -> u16 {
        self.max_rows.saturating_sub(ROW_MARGIN)
    }
}

/// An explicit user value fell outside the platform bounds and was pulled
/// back in. Execution continues with the clamped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampWarning {
    WidthAboveMax { requested: i32, max: u16 },
    WidthBelowMin { requested: i32, min: u16 },
    HeightAboveMax { requested: i32, max: u16 },
    HeightBelowMin { requested: i32, min: u16 },
}

impl std::fmt::Display for ClampWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClampWarning::WidthAboveMax { max, .. } => write!(
                f,
                "the maximum width allowed for the current screen is {max} columns. using maximum instead."
            ),
            ClampWarning::WidthBelowMin { min, .. } => write!(
                f,
                "the minimum width allowed is {min} columns. using minimum instead."
            ),
            ClampWarning::HeightAboveMax { max, .. } => write!(
                f,
                "the maximum height allowed for the current screen is {max} rows. using maximum instead."
            ),
            ClampWarning::HeightBelowMin { min, .. } => write!(
                f,
                "the minimum height allowed is {min} rows. using minimum instead."
            ),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("window position {0:?} is not implemented")]
    NotImplemented(Anchor),
}

/// Resolved geometry. `None` fields mean "leave that dimension alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub columns: Option<u16>,
    pub rows: Option<u16>,
    pub origin: Option<(i32, i32)>,
    /// The origin was derived from the window's own size, which the resize
    /// is about to change; re-center against the fresh rectangle after
    /// applying the size.
    pub recenter: bool,
    pub warnings: Vec<ClampWarning>,
}

/// Compute the final geometry for `request`.
///
/// Explicit width/height win over the anchor's sizing rule for that
/// dimension; a keep flag wins over both. `Minimized` and `Restore` are
/// rejected rather than guessed at.
pub fn resolve(
    request: &PlacementRequest,
    screen: &ScreenContext,
    limits: &TerminalLimits,
) -> Result<Placement, PlacementError> {
    if matches!(request.anchor, Anchor::Minimized | Anchor::Restore) {
        return Err(PlacementError::NotImplemented(request.anchor));
    }

    let mut placement = Placement::default();

    // the usable area can undershoot the minimums on tiny screens; the
    // minimum wins so the clamp range stays ordered
    let max_columns = limits.usable_columns().max(MIN_COLUMNS);
    let max_rows = limits.usable_rows().max(MIN_ROWS);

    if !request.keep_width {
        if let Some(width) = request.width {
            placement.columns = Some(clamp_width(width, max_columns, &mut placement.warnings));
        } else if let Some(columns) = column_target(request.anchor, screen.columns, limits.usable_columns()) {
            placement.columns = Some(columns.clamp(MIN_COLUMNS, max_columns));
        }
    }

    if !request.keep_height {
        if let Some(height) = request.height {
            placement.rows = Some(clamp_height(height, max_rows, &mut placement.warnings));
        } else if let Some(rows) = row_target(request.anchor, screen.rows, limits.usable_rows()) {
            placement.rows = Some(rows.clamp(MIN_ROWS, max_rows));
        }
    }

    match request.anchor {
        Anchor::NotSet => {}
        Anchor::Center | Anchor::Maximized => {
            placement.origin = Some(centered_origin(&screen.window, &screen.work_area));
            placement.recenter = true;
        }
        anchor => {
            let x = if pins_left(anchor) {
                screen.work_area.left()
            } else {
                screen.work_area.mid_x()
            };
            let y = if pins_top(anchor) {
                screen.work_area.top()
            } else {
                screen.work_area.mid_y()
            };
            placement.origin = Some((x, y));
        }
    }

    Ok(placement)
}

/// Column count the anchor asks for, before clamping. `None` means the
/// anchor has no opinion.
fn column_target(anchor: Anchor, current: u16, usable: u16) -> Option<u16> {
    match anchor {
        Anchor::NotSet | Anchor::Minimized | Anchor::Restore => None,
        Anchor::Center => Some(current),
        Anchor::Top | Anchor::Bottom | Anchor::Maximized => Some(usable),
        // every corner and side anchor takes half the screen's width
        _ => Some(half(usable)),
    }
}

fn row_target(anchor: Anchor, current: u16, usable: u16) -> Option<u16> {
    match anchor {
        Anchor::NotSet | Anchor::Minimized | Anchor::Restore => None,
        Anchor::Center => Some(current),
        Anchor::Left | Anchor::Right | Anchor::Maximized => Some(usable),
        // anchors in the top or bottom row take half the screen's height
        _ => Some(half(usable)),
    }
}

/// Anchors sitting in the left column, or spanning the full width, start
/// at the working area's left edge
fn pins_left(anchor: Anchor) -> bool {
    matches!(
        anchor,
        Anchor::TopLeft | Anchor::Left | Anchor::BottomLeft | Anchor::Top | Anchor::Bottom
    )
}

fn pins_top(anchor: Anchor) -> bool {
    matches!(
        anchor,
        Anchor::TopLeft | Anchor::Top | Anchor::TopRight | Anchor::Left | Anchor::Right
    )
}

fn half(v: u16) -> u16 {
    (v + 1) / 2
}

fn clamp_width(requested: i32, max: u16, warnings: &mut Vec<ClampWarning>) -> u16 {
    if requested > i32::from(max) {
        warnings.push(ClampWarning::WidthAboveMax { requested, max });
        max
    } else if requested < i32::from(MIN_COLUMNS) {
        warnings.push(ClampWarning::WidthBelowMin { requested, min: MIN_COLUMNS });
        MIN_COLUMNS
    } else {
        requested as u16
    }
}

fn clamp_height(requested: i32, max: u16, warnings: &mut Vec<ClampWarning>) -> u16 {
    if requested > i32::from(max) {
        warnings.push(ClampWarning::HeightAboveMax { requested, max });
        max
    } else if requested < i32::from(MIN_ROWS) {
        warnings.push(ClampWarning::HeightBelowMin { requested, min: MIN_ROWS });
        MIN_ROWS
    } else {
        requested as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenContext {
        ScreenContext {
            window: Rect { x: 50, y: 60, width: 800, height: 600 },
            work_area: Rect { x: 0, y: 0, width: 1920, height: 1080 },
            columns: 100,
            rows: 30,
        }
    }

    fn limits() -> TerminalLimits {
        TerminalLimits { max_columns: 200, max_rows: 50 }
    }

    fn anchored(anchor: Anchor) -> PlacementRequest {
        PlacementRequest { anchor, ..Default::default() }
    }

    #[test]
    fn test_not_set_without_dimensions_is_a_noop() {
        let placement = resolve(&PlacementRequest::default(), &screen(), &limits()).unwrap();
        assert_eq!(placement, Placement::default());
    }

    #[test]
    fn test_center_keeps_size_and_centers() {
        let placement = resolve(&anchored(Anchor::Center), &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(100));
        assert_eq!(placement.rows, Some(30));
        assert_eq!(placement.origin, Some((560, 240)));
        assert!(placement.recenter);
        assert!(placement.warnings.is_empty());
    }

    #[test]
    fn test_maximized_takes_full_usable_area() {
        let placement = resolve(&anchored(Anchor::Maximized), &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(196));
        assert_eq!(placement.rows, Some(49));
        assert!(placement.recenter);
    }

    #[test]
    fn test_top_left_takes_quarter_at_origin() {
        let placement = resolve(&anchored(Anchor::TopLeft), &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(98));
        assert_eq!(placement.rows, Some(25));
        assert_eq!(placement.origin, Some((0, 0)));
        assert!(!placement.recenter);
    }

    #[test]
    fn test_left_spans_full_height() {
        let placement = resolve(&anchored(Anchor::Left), &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(98));
        assert_eq!(placement.rows, Some(49));
        assert_eq!(placement.origin, Some((0, 0)));
    }

    #[test]
    fn test_top_spans_full_width() {
        let placement = resolve(&anchored(Anchor::Top), &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(196));
        assert_eq!(placement.rows, Some(25));
        assert_eq!(placement.origin, Some((0, 0)));
    }

    #[test]
    fn test_bottom_right_pins_to_midpoints() {
        let placement = resolve(&anchored(Anchor::BottomRight), &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(98));
        assert_eq!(placement.rows, Some(25));
        assert_eq!(placement.origin, Some((960, 540)));
    }

    #[test]
    fn test_bottom_spans_width_at_vertical_midpoint() {
        let placement = resolve(&anchored(Anchor::Bottom), &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(196));
        assert_eq!(placement.rows, Some(25));
        assert_eq!(placement.origin, Some((0, 540)));
    }

    #[test]
    fn test_right_column_anchor_on_offset_work_area() {
        let mut screen = screen();
        screen.work_area = Rect { x: 1920, y: 32, width: 1280, height: 992 };
        let placement = resolve(&anchored(Anchor::TopRight), &screen, &limits()).unwrap();
        assert_eq!(placement.origin, Some((1920 + 640, 32)));
    }

    #[test]
    fn test_minimized_and_restore_are_not_implemented() {
        for anchor in [Anchor::Minimized, Anchor::Restore] {
            let err = resolve(&anchored(anchor), &screen(), &limits()).unwrap_err();
            assert_eq!(err, PlacementError::NotImplemented(anchor));
        }
    }

    #[test]
    fn test_explicit_width_below_minimum_clamps_and_warns() {
        let request = PlacementRequest { width: Some(2), ..Default::default() };
        let placement = resolve(&request, &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(8));
        assert_eq!(
            placement.warnings,
            vec![ClampWarning::WidthBelowMin { requested: 2, min: 8 }]
        );
    }

    #[test]
    fn test_explicit_width_above_maximum_clamps_and_warns() {
        let request = PlacementRequest { width: Some(500), ..Default::default() };
        let placement = resolve(&request, &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(196));
        assert_eq!(
            placement.warnings,
            vec![ClampWarning::WidthAboveMax { requested: 500, max: 196 }]
        );
    }

    #[test]
    fn test_explicit_height_clamps_and_warns() {
        let request = PlacementRequest { height: Some(0), ..Default::default() };
        let placement = resolve(&request, &screen(), &limits()).unwrap();
        assert_eq!(placement.rows, Some(1));
        assert_eq!(
            placement.warnings,
            vec![ClampWarning::HeightBelowMin { requested: 0, min: 1 }]
        );
    }

    #[test]
    fn test_policy_derived_size_clamps_silently() {
        // a screen so small the usable area undershoots the minimums
        let tiny = TerminalLimits { max_columns: 10, max_rows: 1 };
        let placement = resolve(&anchored(Anchor::TopLeft), &screen(), &tiny).unwrap();
        assert_eq!(placement.columns, Some(8));
        assert_eq!(placement.rows, Some(1));
        assert!(placement.warnings.is_empty());
    }

    #[test]
    fn test_explicit_size_overrides_anchor_sizing() {
        let request = PlacementRequest {
            width: Some(120),
            anchor: Anchor::Maximized,
            ..Default::default()
        };
        let placement = resolve(&request, &screen(), &limits()).unwrap();
        assert_eq!(placement.columns, Some(120));
        assert_eq!(placement.rows, Some(49));
        assert!(placement.recenter);
    }

    #[test]
    fn test_keep_flags_exclude_a_dimension_entirely() {
        let request = PlacementRequest {
            width: Some(4),
            anchor: Anchor::Maximized,
            keep_width: true,
            ..Default::default()
        };
        let placement = resolve(&request, &screen(), &limits()).unwrap();
        // no sizing and no clamp warning for the kept dimension
        assert_eq!(placement.columns, None);
        assert_eq!(placement.rows, Some(49));
        assert!(placement.warnings.is_empty());
    }
}
