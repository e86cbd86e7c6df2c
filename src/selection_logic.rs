// src/selection_logic.rs
// Pure selection state. No druid types here, the canvas widget drives it.

use std::ops::Range;

use log::{debug, info};
use ndarray::{Array2, s};

/// 像素坐标（由浮点点击坐标截断而来）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

/// Truncate a canvas data coordinate toward zero.
pub fn truncate(fx: f64, fy: f64) -> PixelPoint {
    PixelPoint { x: fx.trunc() as i64, y: fy.trunc() as i64 }
}

/// Per-axis sort of two corners, returned as `(x_start, x_end, y_start, y_end)`.
pub fn normalize(p1: PixelPoint, p2: PixelPoint) -> (i64, i64, i64, i64) {
    (p1.x.min(p2.x), p1.x.max(p2.x), p1.y.min(p2.y), p1.y.max(p2.y))
}

/// 矩形选区，始终满足 start <= end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x_start: i64,
    pub x_end: i64,
    pub y_start: i64,
    pub y_end: i64,
}

impl Region {
    pub fn from_points(p1: PixelPoint, p2: PixelPoint) -> Self {
        let (x_start, x_end, y_start, y_end) = normalize(p1, p2);
        Region { x_start, x_end, y_start, y_end }
    }

    /// The whole `width` x `height` image, used when no crop was picked.
    pub fn full(width: usize, height: usize) -> Self {
        Region { x_start: 0, x_end: width as i64, y_start: 0, y_end: height as i64 }
    }

    /// Half-open column range, bounds clamped into `0..=width`.
    pub fn col_range(&self, width: usize) -> Range<usize> {
        clamped_range(self.x_start, self.x_end, width)
    }

    /// Half-open row range, bounds clamped into `0..=height`.
    pub fn row_range(&self, height: usize) -> Range<usize> {
        clamped_range(self.y_start, self.y_end, height)
    }

    /// Copy out `array[y_start..y_end, x_start..x_end]`.
    pub fn crop<T: Clone>(&self, array: &Array2<T>) -> Array2<T> {
        let (height, width) = array.dim();
        array
            .slice(s![self.row_range(height), self.col_range(width)])
            .to_owned()
    }

    /// Set every cell of this region in `mask` to true.
    pub fn fill(&self, mask: &mut Array2<bool>) {
        let (height, width) = mask.dim();
        mask.slice_mut(s![self.row_range(height), self.col_range(width)])
            .fill(true);
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x={}-{}, y={}-{}", self.x_start, self.x_end, self.y_start, self.y_end)
    }
}

fn clamped_range(start: i64, end: i64, len: usize) -> Range<usize> {
    let clamp = |v: i64| v.clamp(0, len as i64) as usize;
    clamp(start)..clamp(end)
}

/// Two-click accumulator shared by both selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingSelection {
    #[default]
    AwaitingFirstPoint,
    AwaitingSecondPoint(PixelPoint),
}

impl PendingSelection {
    /// Feed one click. Returns the region once a pair is complete and goes
    /// back to waiting for a first point.
    pub fn push(&mut self, point: PixelPoint) -> Option<Region> {
        match *self {
            PendingSelection::AwaitingFirstPoint => {
                *self = PendingSelection::AwaitingSecondPoint(point);
                None
            }
            PendingSelection::AwaitingSecondPoint(first) => {
                *self = PendingSelection::AwaitingFirstPoint;
                Some(Region::from_points(first, point))
            }
        }
    }

    pub fn clear(&mut self) {
        *self = PendingSelection::AwaitingFirstPoint;
    }

    pub fn first_point(&self) -> Option<PixelPoint> {
        match self {
            PendingSelection::AwaitingFirstPoint => None,
            PendingSelection::AwaitingSecondPoint(p) => Some(*p),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Pending(PixelPoint),
    Completed(Region),
    Ignored,
}

/// What the canvas needs from whichever selector is active.
pub trait SelectionTool {
    fn click(&mut self, point: PixelPoint) -> ClickOutcome;
    fn undo(&mut self);
    /// Rectangles currently shown on the canvas, oldest first.
    fn rendered_regions(&self) -> &[Region];
    fn pending_point(&self) -> Option<PixelPoint>;
}

/// 裁剪选区：只保留一对点
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropSelector {
    pending: PendingSelection,
    selected: Option<Region>,
}

impl CropSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Region> {
        self.selected
    }

    /// Region to crop with. Falls back to the full image when fewer than
    /// two points were picked.
    pub fn finish(&self, width: usize, height: usize) -> Region {
        match self.selected {
            Some(region) => region,
            None => {
                info!("No crop selected. Using full image");
                Region::full(width, height)
            }
        }
    }
}

impl SelectionTool for CropSelector {
    fn click(&mut self, point: PixelPoint) -> ClickOutcome {
        // Completed selection holds until undo or confirm.
        if self.selected.is_some() {
            debug!("Ignoring click at ({}, {}), crop already selected", point.x, point.y);
            return ClickOutcome::Ignored;
        }
        info!("Point selected: ({}, {})", point.x, point.y);
        match self.pending.push(point) {
            Some(region) => {
                info!("Crop region selected: {}", region);
                self.selected = Some(region);
                ClickOutcome::Completed(region)
            }
            None => ClickOutcome::Pending(point),
        }
    }

    fn undo(&mut self) {
        self.pending.clear();
        self.selected = None;
        info!("Crop selection reset.");
    }

    fn rendered_regions(&self) -> &[Region] {
        self.selected.as_slice()
    }

    fn pending_point(&self) -> Option<PixelPoint> {
        self.pending.first_point()
    }
}

/// 掩膜构建：可累积多个矩形，支持撤销
#[derive(Debug, Clone, PartialEq)]
pub struct MaskBuilder {
    mask: Array2<bool>,
    regions: Vec<Region>,
    pending: PendingSelection,
}

impl MaskBuilder {
    /// Empty mask with the `(rows, cols)` shape of the image being masked.
    pub fn new(shape: (usize, usize)) -> Self {
        MaskBuilder {
            mask: Array2::from_elem(shape, false),
            regions: Vec::new(),
            pending: PendingSelection::default(),
        }
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn into_mask(self) -> Array2<bool> {
        self.mask
    }

    // Overlapping regions share cells, so undo rebuilds the union instead of
    // clearing the popped rectangle.
    fn rebuild_mask(&mut self) {
        self.mask.fill(false);
        for region in &self.regions {
            region.fill(&mut self.mask);
        }
    }
}

impl SelectionTool for MaskBuilder {
    fn click(&mut self, point: PixelPoint) -> ClickOutcome {
        info!("Point selected: ({}, {})", point.x, point.y);
        match self.pending.push(point) {
            Some(region) => {
                region.fill(&mut self.mask);
                self.regions.push(region);
                info!("Masked region: {}", region);
                ClickOutcome::Completed(region)
            }
            None => ClickOutcome::Pending(point),
        }
    }

    fn undo(&mut self) {
        if let Some(region) = self.regions.pop() {
            self.rebuild_mask();
            debug!("Removed masked region {}", region);
            info!("Last mask selection removed.");
        }
        self.pending.clear();
    }

    fn rendered_regions(&self) -> &[Region] {
        &self.regions
    }

    fn pending_point(&self) -> Option<PixelPoint> {
        self.pending.first_point()
    }
}
