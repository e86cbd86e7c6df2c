// src/selection.rs
// Canvas widget: draws the stretched image plus the tool's rectangles and
// forwards left clicks to the active SelectionTool.

use druid::kurbo::Circle;
use druid::piet::{ImageFormat, InterpolationMode, PietImage};
use druid::{
    BoxConstraints, Color, Env, Event, EventCtx, LayoutCtx, LifeCycle, LifeCycleCtx, MouseButton,
    PaintCtx, Point, Rect, RenderContext, Size, UpdateCtx, Widget,
};
use image::RgbaImage;
use log::debug;

use crate::config::SelectorConfig;
use crate::selection_logic::{ClickOutcome, PixelPoint, Region, truncate};
use crate::session::SessionState;

pub struct ImageCanvas {
    display: RgbaImage,
    cached_image: Option<PietImage>,
    outline: Color,
    line_width: f64,
}

impl ImageCanvas {
    pub fn new(display: RgbaImage, cfg: &SelectorConfig) -> Self {
        let (r, g, b) = cfg.outline_rgb;
        ImageCanvas {
            display,
            cached_image: None,
            outline: Color::rgb8(r, g, b),
            line_width: cfg.line_width,
        }
    }

    fn image_size(&self) -> Size {
        let (w, h) = self.display.dimensions();
        Size::new(w as f64, h as f64)
    }

    /// 图像在控件中的位置（保持宽高比并居中）
    fn image_rect(&self, widget: Size) -> Rect {
        let img = self.image_size();
        if img.width <= 0.0 || img.height <= 0.0 {
            return Rect::ZERO;
        }
        let scale = (widget.width / img.width).min(widget.height / img.height);
        let fitted = Size::new(img.width * scale, img.height * scale);
        let origin = Point::new(
            (widget.width - fitted.width) / 2.0,
            (widget.height - fitted.height) / 2.0,
        );
        Rect::from_origin_size(origin, fitted)
    }

    fn scale(&self, widget: Size) -> f64 {
        let img = self.image_size();
        if img.width <= 0.0 {
            return 1.0;
        }
        self.image_rect(widget).width() / img.width
    }

    /// Widget position to data coordinates, pixel `i` covering `[i, i + 1)`.
    /// None when the click misses the image.
    ///
    /// matplotlib's `imshow` centres pixel `i` on `i`, covering `[i - 0.5, i + 0.5)`,
    /// so truncating its data coordinate picks the pixel to the left on a
    /// left-half click. Here truncation always lands on the clicked pixel.
    fn to_data(&self, pos: Point, widget: Size) -> Option<(f64, f64)> {
        let rect = self.image_rect(widget);
        if rect.area() <= 0.0 {
            return None;
        }
        let scale = self.scale(widget);
        let img = self.image_size();
        let fx = (pos.x - rect.x0) / scale;
        let fy = (pos.y - rect.y0) / scale;
        let inside = (0.0..img.width).contains(&fx) && (0.0..img.height).contains(&fy);
        inside.then_some((fx, fy))
    }

    /// Pixel under a mouse press. Only the left button selects.
    fn click_point(&self, button: MouseButton, pos: Point, widget: Size) -> Option<PixelPoint> {
        if !button.is_left() {
            return None;
        }
        self.to_data(pos, widget).map(|(fx, fy)| truncate(fx, fy))
    }

    fn to_widget(&self, x: f64, y: f64, widget: Size) -> Point {
        let rect = self.image_rect(widget);
        let scale = self.scale(widget);
        Point::new(rect.x0 + x * scale, rect.y0 + y * scale)
    }

    fn region_rect(&self, region: &Region, widget: Size) -> Rect {
        Rect::from_points(
            self.to_widget(region.x_start as f64, region.y_start as f64, widget),
            self.to_widget(region.x_end as f64, region.y_end as f64, widget),
        )
    }
}

impl Widget<SessionState> for ImageCanvas {
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut SessionState, _env: &Env) {
        if let Event::MouseDown(e) = event {
            let Some(point) = self.click_point(e.button, e.pos, ctx.size()) else {
                debug!("Ignoring {:?} click at {:?}", e.button, e.pos);
                return;
            };
            let outcome = data.tool.borrow_mut().click(point);
            if outcome != ClickOutcome::Ignored {
                data.touch();
            }
        }
    }

    fn lifecycle(
        &mut self,
        _ctx: &mut LifeCycleCtx,
        _event: &LifeCycle,
        _data: &SessionState,
        _env: &Env,
    ) {
    }

    fn update(&mut self, ctx: &mut UpdateCtx, old: &SessionState, data: &SessionState, _env: &Env) {
        if old.revision != data.revision {
            ctx.request_paint();
        }
    }

    fn layout(&mut self, _ctx: &mut LayoutCtx, bc: &BoxConstraints, _data: &SessionState, _env: &Env) -> Size {
        if bc.is_width_bounded() && bc.is_height_bounded() {
            bc.max()
        } else {
            bc.constrain(self.image_size())
        }
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &SessionState, _env: &Env) {
        let size = ctx.size();
        let target = self.image_rect(size);

        if self.cached_image.is_none() && target.area() > 0.0 {
            let (w, h) = self.display.dimensions();
            self.cached_image = ctx
                .make_image(w as usize, h as usize, self.display.as_raw(), ImageFormat::RgbaSeparate)
                .ok();
        }
        if let Some(img) = &self.cached_image {
            ctx.draw_image(img, target, InterpolationMode::NearestNeighbor);
        }

        let tool = data.tool.borrow();
        for region in tool.rendered_regions() {
            let r = self.region_rect(region, size);
            ctx.stroke(r, &self.outline, self.line_width);
        }
        if let Some(p) = tool.pending_point() {
            // 第一个点：在像素中心画个小圆点
            let center = self.to_widget(p.x as f64 + 0.5, p.y as f64 + 0.5, size);
            ctx.fill(Circle::new(center, self.line_width * 2.0), &self.outline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 100 x 50 image
    fn canvas() -> ImageCanvas {
        ImageCanvas::new(RgbaImage::new(100, 50), &SelectorConfig::default())
    }

    #[test]
    fn wide_widget_letterboxes_left_and_right() {
        let c = canvas();
        let widget = Size::new(400.0, 100.0);
        assert_eq!(c.image_rect(widget), Rect::new(100.0, 0.0, 300.0, 100.0));
        assert_eq!(c.scale(widget), 2.0);
        assert_eq!(c.to_data(Point::new(102.0, 10.0), widget), Some((1.0, 5.0)));
        assert_eq!(c.to_data(Point::new(50.0, 50.0), widget), None);
        assert_eq!(c.to_data(Point::new(350.0, 50.0), widget), None);
    }

    #[test]
    fn tall_widget_letterboxes_top_and_bottom() {
        let c = canvas();
        let widget = Size::new(100.0, 400.0);
        assert_eq!(c.image_rect(widget), Rect::new(0.0, 175.0, 100.0, 225.0));
        assert_eq!(c.scale(widget), 1.0);
        assert_eq!(c.to_data(Point::new(10.0, 100.0), widget), None);
        assert_eq!(c.to_data(Point::new(10.0, 176.5), widget), Some((10.0, 1.5)));
    }

    #[test]
    fn far_edges_are_excluded() {
        let c = canvas();
        let widget = Size::new(400.0, 100.0);
        let rect = c.image_rect(widget);
        assert_eq!(c.to_data(Point::new(rect.x1, 10.0), widget), None);
        assert_eq!(c.to_data(Point::new(150.0, rect.y1), widget), None);
        assert!(c.to_data(Point::new(rect.x0, rect.y0), widget).is_some());
    }

    #[test]
    fn just_inside_right_edge_is_last_column() {
        let c = canvas();
        let widget = Size::new(400.0, 100.0);
        let pos = Point::new(c.image_rect(widget).x1 - 0.1, 99.9);
        let point = c.click_point(MouseButton::Left, pos, widget).unwrap();
        assert_eq!(point, PixelPoint { x: 99, y: 49 });
    }

    #[test]
    fn only_left_button_selects() {
        let c = canvas();
        let widget = Size::new(400.0, 100.0);
        let pos = Point::new(150.0, 50.0);
        assert_eq!(c.click_point(MouseButton::Left, pos, widget), Some(PixelPoint { x: 25, y: 25 }));
        assert_eq!(c.click_point(MouseButton::Right, pos, widget), None);
        assert_eq!(c.click_point(MouseButton::Middle, pos, widget), None);
    }

    #[test]
    fn empty_image_never_maps_a_click() {
        let c = ImageCanvas::new(RgbaImage::new(0, 0), &SelectorConfig::default());
        let widget = Size::new(400.0, 400.0);
        assert_eq!(c.image_rect(widget), Rect::ZERO);
        assert_eq!(c.to_data(Point::new(0.0, 0.0), widget), None);
        assert_eq!(c.click_point(MouseButton::Left, Point::new(200.0, 200.0), widget), None);
    }
}
