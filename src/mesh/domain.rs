//! Logical-to-physical domain maps.

/// Maps logical coordinates (s, t) ∈ [0, 1]² to physical (x, y).
///
/// `t` is the vertical logical coordinate; gravity acts along -y. The map
/// must be smooth and orientation preserving on [0, 1]², otherwise the
/// metric builder rejects the mesh.
pub trait DomainMap: Send + Sync {
    fn map(&self, s: f64, t: f64) -> (f64, f64);
}

/// Axis-aligned rectangle [x0, x1] × [y0, y1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectangularDomain {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl RectangularDomain {
    pub fn new(x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            x0: x_range.0,
            x1: x_range.1,
            y0: y_range.0,
            y1: y_range.1,
        }
    }

    /// Width × height box centred horizontally on x = 0 with its floor at y = 0.
    pub fn centered(width: f64, height: f64) -> Self {
        Self::new((-0.5 * width, 0.5 * width), (0.0, height))
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

impl DomainMap for RectangularDomain {
    #[inline]
    fn map(&self, s: f64, t: f64) -> (f64, f64) {
        (self.x0 + s * (self.x1 - self.x0), self.y0 + t * (self.y1 - self.y0))
    }
}

/// Rectangle sheared by `angle` radians: x' = x + y sin(angle), y' = y cos(angle).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkewedDomain {
    pub base: RectangularDomain,
    pub angle: f64,
}

impl SkewedDomain {
    pub fn new(base: RectangularDomain, angle: f64) -> Self {
        Self { base, angle }
    }
}

impl DomainMap for SkewedDomain {
    fn map(&self, s: f64, t: f64) -> (f64, f64) {
        let (x, y) = self.base.map(s, t);
        (x + self.angle.sin() * y, self.angle.cos() * y)
    }
}

/// Domain given by two scalar functions of the logical coordinates.
///
/// ```
/// use moist_euler_dg::mesh::{DomainMap, MappedDomain};
///
/// // 10 km wide, 5 km deep, with a gentle bump in the lower boundary
/// let domain = MappedDomain::new(
///     |s, _t| 10_000.0 * (s - 0.5),
///     |s, t| {
///         let floor = 200.0 * (std::f64::consts::PI * s).sin();
///         floor + t * (5_000.0 - floor)
///     },
/// );
/// let (x, y) = domain.map(0.5, 0.0);
/// assert!(x.abs() < 1e-12);
/// assert!((y - 200.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy)]
pub struct MappedDomain<F, G> {
    xmap: F,
    ymap: G,
}

impl<F, G> MappedDomain<F, G>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
    G: Fn(f64, f64) -> f64 + Send + Sync,
{
    pub fn new(xmap: F, ymap: G) -> Self {
        Self { xmap, ymap }
    }
}

impl<F, G> DomainMap for MappedDomain<F, G>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
    G: Fn(f64, f64) -> f64 + Send + Sync,
{
    #[inline]
    fn map(&self, s: f64, t: f64) -> (f64, f64) {
        ((self.xmap)(s, t), (self.ymap)(s, t))
    }
}
