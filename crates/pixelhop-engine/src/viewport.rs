//! Fitting the fixed virtual resolution into a window.
//!
//! The simulation always runs in virtual pixels (256x240 in the demo). The
//! presentation layer scales that picture up to the window, either by the
//! largest whole factor that fits, which keeps pixels square and crisp, or
//! by the exact fractional factor that fills the window.

/// A whole-number upscale of the virtual resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerScale {
    pub factor: u32,
    pub width: u32,
    pub height: u32,
}

/// Largest whole multiple of `virtual_size` that fits inside `container`.
///
/// A container no larger than the virtual resolution on either axis gets
/// factor 1: the picture is never shrunk.
///
/// ```
/// use pixelhop_engine::viewport::integer_scale;
///
/// let scale = integer_scale((1920, 1080), (256, 240));
/// assert_eq!((scale.factor, scale.width, scale.height), (4, 1024, 960));
/// assert_eq!(integer_scale((200, 900), (256, 240)).factor, 1);
/// ```
pub fn integer_scale(container: (u32, u32), virtual_size: (u32, u32)) -> IntegerScale {
    let (cw, ch) = container;
    let (vw, vh) = virtual_size;
    let one = IntegerScale {
        factor: 1,
        width: vw,
        height: vh,
    };
    if vw == 0 || vh == 0 || cw <= vw || ch <= vh {
        return one;
    }
    let factor = (cw / vw).min(ch / vh).max(1);
    IntegerScale {
        factor,
        width: vw * factor,
        height: vh * factor,
    }
}

/// Placement of the scaled picture inside a window, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Window pixels per virtual pixel.
    pub scale: f64,
    /// Top-left corner of the picture.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Largest fractional scale that fits, centered (letterboxed).
    pub fn fit(window: (u32, u32), virtual_size: (u32, u32)) -> Self {
        let (ww, wh) = (f64::from(window.0), f64::from(window.1));
        let (vw, vh) = (f64::from(virtual_size.0), f64::from(virtual_size.1));
        let scale = if vw > 0.0 && vh > 0.0 {
            (ww / vw).min(wh / vh)
        } else {
            1.0
        };
        Self::centered(window, vw * scale, vh * scale, scale)
    }

    /// [`integer_scale`], centered.
    pub fn integer(window: (u32, u32), virtual_size: (u32, u32)) -> Self {
        let s = integer_scale(window, virtual_size);
        Self::centered(window, f64::from(s.width), f64::from(s.height), f64::from(s.factor))
    }

    /// [`integer`](Self::integer) when a whole scale fits the window,
    /// otherwise [`fit`](Self::fit) so the picture is never cropped.
    pub fn best(window: (u32, u32), virtual_size: (u32, u32)) -> Self {
        let s = integer_scale(window, virtual_size);
        if s.width <= window.0 && s.height <= window.1 {
            Self::integer(window, virtual_size)
        } else {
            Self::fit(window, virtual_size)
        }
    }

    fn centered(window: (u32, u32), width: f64, height: f64, scale: f64) -> Self {
        Self {
            scale,
            x: (f64::from(window.0) - width) / 2.0,
            y: (f64::from(window.1) - height) / 2.0,
            width,
            height,
        }
    }

    /// Map a window position (cursor, touch) to virtual pixels. `None`
    /// outside the picture.
    pub fn to_virtual(&self, wx: f64, wy: f64) -> Option<(f64, f64)> {
        let vx = (wx - self.x) / self.scale;
        let vy = (wy - self.y) / self.scale;
        let inside = wx >= self.x
            && wy >= self.y
            && wx < self.x + self.width
            && wy < self.y + self.height;
        inside.then_some((vx, vy))
    }
}
