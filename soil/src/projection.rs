//! Interrupted Goode Homolosine projection.
//!
//! SoilGrids property rasters are stored in the Interrupted Goode Homolosine
//! projection on a sphere with the WGS84 semi-major axis. The projection is
//! a sinusoidal projection between ±40°44'11.8" and a Mollweide projection
//! poleward of it, split into twelve lobes with their own central meridians
//! (two northern Mollweide lobes, six sinusoidal lobes, four southern
//! Mollweide lobes).
//!
//! The classification raster is stored in plain WGS84 and never goes
//! through this module.

use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

/// Sphere radius used by the projection (WGS84 semi-major axis), in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude where the sinusoidal and Mollweide parts meet: 40°44'11.8".
const PHI_BOUNDARY: f64 = (40.0 + 44.0 / 60.0 + 11.8 / 3600.0) * PI / 180.0;

const D20: f64 = 20.0 * PI / 180.0;
const D40: f64 = 40.0 * PI / 180.0;
const D80: f64 = 80.0 * PI / 180.0;
const D100: f64 = 100.0 * PI / 180.0;

/// Slack allowed on lobe edges when inverting.
const EPSILON: f64 = 1e-10;

/// Mollweide constants for the unit sphere.
const MOLL_CX: f64 = 2.0 * SQRT_2 / PI;
const MOLL_CY: f64 = SQRT_2;
const MOLL_MAX_ITER: usize = 50;
const MOLL_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LobeKind {
    Sinusoidal,
    Mollweide,
}

/// One lobe of the interrupted projection.
#[derive(Debug, Clone, Copy)]
struct Lobe {
    kind: LobeKind,
    /// Central meridian in degrees; also the false easting of the lobe.
    central: f64,
    /// Sign of the vertical shift applied to Mollweide lobes.
    shift: f64,
    /// Longitude range covered by the lobe, in degrees.
    west: f64,
    east: f64,
}

const fn lobe(kind: LobeKind, central: f64, shift: f64, west: f64, east: f64) -> Lobe {
    Lobe {
        kind,
        central,
        shift,
        west,
        east,
    }
}

/// Lobes 1..=12 in the usual numbering (index = number - 1).
const LOBES: [Lobe; 12] = [
    lobe(LobeKind::Mollweide, -100.0, 1.0, -180.0, -40.0),
    lobe(LobeKind::Mollweide, 30.0, 1.0, -40.0, 180.0),
    lobe(LobeKind::Sinusoidal, -100.0, 0.0, -180.0, -40.0),
    lobe(LobeKind::Sinusoidal, 30.0, 0.0, -40.0, 180.0),
    lobe(LobeKind::Sinusoidal, -160.0, 0.0, -180.0, -100.0),
    lobe(LobeKind::Sinusoidal, -60.0, 0.0, -100.0, -20.0),
    lobe(LobeKind::Sinusoidal, 20.0, 0.0, -20.0, 80.0),
    lobe(LobeKind::Sinusoidal, 140.0, 0.0, 80.0, 180.0),
    lobe(LobeKind::Mollweide, -160.0, -1.0, -180.0, -100.0),
    lobe(LobeKind::Mollweide, -60.0, -1.0, -100.0, -20.0),
    lobe(LobeKind::Mollweide, 20.0, -1.0, -20.0, 80.0),
    lobe(LobeKind::Mollweide, 140.0, -1.0, 80.0, 180.0),
];

/// Project a WGS84 coordinate into Homolosine meters.
///
/// # Arguments
///
/// * `lat` - Latitude in decimal degrees (-90 to 90)
/// * `lon` - Longitude in decimal degrees (-180 to 180)
///
/// # Returns
///
/// The projected `(y, x)` pair in meters, in the same (lat, lon) order as
/// the input.
///
/// # Example
///
/// ```
/// use soil::projection::reproject;
///
/// let (y, x) = reproject(0.0, 0.0);
/// assert!(y.abs() < 1e-6 && x.abs() < 1e-6);
/// ```
pub fn reproject(lat: f64, lon: f64) -> (f64, f64) {
    let phi = lat.to_radians();
    let lam = lon.to_radians();

    let lobe = &LOBES[forward_lobe(phi, lam)];
    let central = lobe.central.to_radians();
    let (x, y) = match lobe.kind {
        LobeKind::Sinusoidal => sinusoidal_forward(lam - central, phi),
        LobeKind::Mollweide => mollweide_forward(lam - central, phi),
    };

    let x = x + central;
    let y = y + lobe.shift * mollweide_shift();
    (y * EARTH_RADIUS, x * EARTH_RADIUS)
}

/// Invert [`reproject`]: turn Homolosine meters back into WGS84 degrees.
///
/// Returns `None` for points that fall into the interruptions between lobes
/// or outside the projected globe.
pub fn unproject(y: f64, x: f64) -> Option<(f64, f64)> {
    let x = x / EARTH_RADIUS;
    let y = y / EARTH_RADIUS;
    let dy0 = mollweide_shift();

    let y90 = SQRT_2 + dy0;
    if !x.is_finite() || !y.is_finite() || y.abs() > y90 + EPSILON {
        return None;
    }

    let lobe = &LOBES[inverse_lobe(y, x)];
    let central = lobe.central.to_radians();
    let local_x = x - central;
    let local_y = y - lobe.shift * dy0;
    let (lam, phi) = match lobe.kind {
        LobeKind::Sinusoidal => sinusoidal_inverse(local_x, local_y)?,
        LobeKind::Mollweide => mollweide_inverse(local_x, local_y)?,
    };

    let lon = (lam + central).to_degrees();
    let lat = phi.to_degrees();
    if lon < lobe.west - EPSILON.to_degrees() || lon > lobe.east + EPSILON.to_degrees() {
        return None;
    }
    Some((lat, lon))
}

/// Vertical offset of the Mollweide lobes so they meet the sinusoidal ones.
///
/// Negative: the northern Mollweide lobes are shifted down by ~0.0528 R.
fn mollweide_shift() -> f64 {
    let (_, y_moll) = mollweide_forward(0.0, PHI_BOUNDARY);
    PHI_BOUNDARY - y_moll
}

fn forward_lobe(phi: f64, lam: f64) -> usize {
    if phi >= PHI_BOUNDARY {
        if lam <= -D40 {
            0
        } else {
            1
        }
    } else if phi >= 0.0 {
        if lam <= -D40 {
            2
        } else {
            3
        }
    } else if phi >= -PHI_BOUNDARY {
        4 + southern_column(lam)
    } else {
        8 + southern_column(lam)
    }
}

/// Lobe selection from projected coordinates. Sinusoidal `y` equals the
/// latitude, so the latitude thresholds carry over unchanged.
fn inverse_lobe(y: f64, x: f64) -> usize {
    forward_lobe(y, x)
}

fn southern_column(lam: f64) -> usize {
    if lam <= -D100 {
        0
    } else if lam <= -D20 {
        1
    } else if lam <= D80 {
        2
    } else {
        3
    }
}

fn sinusoidal_forward(lam: f64, phi: f64) -> (f64, f64) {
    (lam * phi.cos(), phi)
}

fn sinusoidal_inverse(x: f64, y: f64) -> Option<(f64, f64)> {
    if y.abs() > FRAC_PI_2 + EPSILON {
        return None;
    }
    let phi = y.clamp(-FRAC_PI_2, FRAC_PI_2);
    let lam = x / phi.cos();
    lam.is_finite().then_some((lam, phi))
}

fn mollweide_forward(lam: f64, phi: f64) -> (f64, f64) {
    let theta = if FRAC_PI_2 - phi.abs() < EPSILON {
        FRAC_PI_2.copysign(phi)
    } else {
        // Newton iteration on t = 2θ for t + sin(t) = π sin(φ)
        let k = PI * phi.sin();
        let mut t = phi;
        for _ in 0..MOLL_MAX_ITER {
            let step = (t + t.sin() - k) / (1.0 + t.cos());
            t -= step;
            if step.abs() < MOLL_TOLERANCE {
                break;
            }
        }
        if t.is_finite() {
            t / 2.0
        } else {
            FRAC_PI_2.copysign(phi)
        }
    };

    (MOLL_CX * lam * theta.cos(), MOLL_CY * theta.sin())
}

fn mollweide_inverse(x: f64, y: f64) -> Option<(f64, f64)> {
    let s = y / MOLL_CY;
    if s.abs() > 1.0 + EPSILON {
        return None;
    }
    let theta = s.clamp(-1.0, 1.0).asin();
    let lam = x / (MOLL_CX * theta.cos());
    if !lam.is_finite() || lam.abs() > PI + EPSILON {
        return None;
    }
    let t = 2.0 * theta;
    let phi = ((t + t.sin()) / PI).clamp(-1.0, 1.0).asin();
    Some((lam, phi))
}
