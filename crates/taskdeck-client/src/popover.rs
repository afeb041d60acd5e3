//! Popover open state and outside-pointer dismissal.
//!
//! Hosts report pointer-down events together with the on-screen region of
//! each open popover; anything outside a region closes that popover through
//! [`Dismiss::request_close`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box, `width` and `height` cells wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        let right = i64::from(self.x) + i64::from(self.width);
        let bottom = i64::from(self.y) + i64::from(self.height);
        point.x >= self.x
            && point.y >= self.y
            && i64::from(point.x) < right
            && i64::from(point.y) < bottom
    }
}

pub trait Dismiss {
    fn is_open(&self) -> bool;

    /// Closes the popover. Returns whether it was open.
    fn request_close(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopoverKind {
    Calendar,
    Options,
    Bookmarks,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Popover {
    open: bool,
}

impl Popover {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }
}

impl Dismiss for Popover {
    fn is_open(&self) -> bool {
        self.open
    }

    fn request_close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

/// Closes `target` when `at` falls outside `region`.
pub fn dismiss_outside<D: Dismiss + ?Sized>(target: &mut D, region: Region, at: Point) -> bool {
    if target.is_open() && !region.contains(at) {
        target.request_close()
    } else {
        false
    }
}
