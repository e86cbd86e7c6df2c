// src/session.rs
// One modal druid window per session. Confirm quits the window and the
// tool's final state is read back afterwards.

use anyhow::{Context, Result};
use druid::widget::{Flex, Label};
use druid::{AppLauncher, Color, Data, Widget, WidgetExt, WindowDesc};
use ndarray::Array2;
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SelectorConfig;
use crate::selection::ImageCanvas;
use crate::selection_logic::{CropSelector, MaskBuilder, Region, SelectionTool};
use crate::stretch;

const CROP_TITLE: &str = "Select crop region (click two points)";
const MASK_TITLE: &str = "Select regions to mask (click two points)";

#[derive(Clone, Data)]
pub struct SessionState {
    #[data(ignore)]
    pub tool: Rc<RefCell<dyn SelectionTool>>,
    /// Bumped on every change to `tool` so druid notices.
    pub revision: u64,
}

impl SessionState {
    pub fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Let the user pick a crop rectangle on `image`. Full image if they confirm
/// without a complete pair of clicks.
pub fn run_crop_session(image: &Array2<f64>, cfg: &SelectorConfig) -> Result<Region> {
    let (height, width) = image.dim();
    let selector = Rc::new(RefCell::new(CropSelector::new()));
    launch(image, cfg, CROP_TITLE, selector.clone())?;
    let region = selector.borrow().finish(width, height);
    Ok(region)
}

/// Let the user mark rectangles on `image`; returns the resulting mask.
pub fn run_mask_session(image: &Array2<f64>, cfg: &SelectorConfig) -> Result<Array2<bool>> {
    let builder = Rc::new(RefCell::new(MaskBuilder::new(image.dim())));
    // Second AppLauncher in this process: druid allows a new Application once the previous run has returned.
    launch(image, cfg, MASK_TITLE, builder.clone())?;
    let builder = builder.borrow();
    log::info!("Mask confirmed with {} region(s)", builder.regions().len());
    Ok(builder.mask().clone())
}

fn launch(
    image: &Array2<f64>,
    cfg: &SelectorConfig,
    title: &'static str,
    tool: Rc<RefCell<dyn SelectionTool>>,
) -> Result<()> {
    let display = stretch::render(image, cfg.low_percentile, cfg.high_percentile);
    let window = WindowDesc::new(build_root(ImageCanvas::new(display, cfg), title))
        .title(title)
        .window_size(cfg.window_size);
    AppLauncher::with_window(window)
        .launch(SessionState { tool, revision: 0 })
        .context("Failed to run selection window")?;
    Ok(())
}

fn build_root(canvas: ImageCanvas, title: &'static str) -> impl Widget<SessionState> {
    let undo = control_button("Undo", Color::rgb8(200, 30, 30)).on_click(
        |_ctx, data: &mut SessionState, _env| {
            data.tool.borrow_mut().undo();
            data.touch();
        },
    );
    let confirm = control_button("Confirm", Color::rgb8(30, 150, 30)).on_click(
        |ctx, _data: &mut SessionState, _env| {
            ctx.submit_command(druid::commands::QUIT_APP);
        },
    );

    let controls = Flex::row()
        .with_flex_spacer(1.0)
        .with_child(undo)
        .with_spacer(8.0)
        .with_child(confirm);

    Flex::column()
        .with_child(Label::new(title))
        .with_spacer(4.0)
        .with_flex_child(canvas, 1.0)
        .with_spacer(8.0)
        .with_child(controls)
        .padding(8.0)
}

fn control_button(text: &'static str, color: Color) -> impl Widget<SessionState> {
    Label::new(text)
        .with_text_color(Color::WHITE)
        .padding((16.0, 6.0))
        .background(color)
        .rounded(4.0)
}
