/// Width and height of a box, in whatever unit the caller draws in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub const DEFAULT_MAX_SCALE: f64 = 1.5;

/// Scale `k` applied around the origin, then translation by `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { k: 1.0, x: 0.0, y: 0.0 }
    }
}

impl ViewTransform {
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.k + self.x, y * self.k + self.y)
    }
}

/// Largest scale (capped at `max_scale`) that fits `content` inside
/// `container`, centred on both axes.
pub fn fit_transform(container: Size, content: Size, max_scale: f64) -> ViewTransform {
    if content.width <= 0.0 || content.height <= 0.0 || container.width <= 0.0 || container.height <= 0.0 {
        return ViewTransform::default();
    }
    let k = (container.height / content.height).min(container.width / content.width).min(max_scale);
    ViewTransform {
        k,
        x: (container.width - content.width * k) / 2.0,
        y: (container.height - content.height * k) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrinks_to_fit_the_tighter_axis() {
        let t = fit_transform(Size::new(1000.0, 500.0), Size::new(2000.0, 500.0), DEFAULT_MAX_SCALE);
        assert_eq!(t.k, 0.5);
        assert_eq!(t.x, 0.0);
        assert_eq!(t.y, 125.0);
    }

    #[test]
    fn never_zooms_past_max_scale() {
        let t = fit_transform(Size::new(1000.0, 1000.0), Size::new(100.0, 100.0), DEFAULT_MAX_SCALE);
        assert_eq!(t.k, 1.5);
        assert_eq!(t.apply(0.0, 0.0), (425.0, 425.0));
    }

    #[test]
    fn empty_content_is_identity() {
        assert_eq!(fit_transform(Size::new(10.0, 10.0), Size::default(), 2.0), ViewTransform::default());
    }
}
