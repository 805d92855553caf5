//! Colour zones along the 0–100 balance axis.
//!
//! Static layouts are fixed bands. Dynamic layouts carry a green band with
//! yellow shoulders whose center swings as
//! `50 + 30 * sin(elapsed_seconds) * direction_bias`, clamped so the whole
//! band stays on the axis.

use serde::{Deserialize, Serialize};

use crate::catalog::BarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneColor {
    Green,
    Yellow,
    Red,
}

/// Half-open span `[start, end)` of one colour; the last band also owns 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub start: f32,
    pub end: f32,
    pub color: ZoneColor,
}

const fn band(start: f32, end: f32, color: ZoneColor) -> Band {
    Band { start, end, color }
}

use ZoneColor::{Green, Red, Yellow};

const MIDDLE: [Band; 5] = [
    band(0.0, 20.0, Red),
    band(20.0, 35.0, Yellow),
    band(35.0, 65.0, Green),
    band(65.0, 80.0, Yellow),
    band(80.0, 100.0, Red),
];

const MIDDLE_SMALL: [Band; 5] = [
    band(0.0, 30.0, Red),
    band(30.0, 42.0, Yellow),
    band(42.0, 58.0, Green),
    band(58.0, 70.0, Yellow),
    band(70.0, 100.0, Red),
];

const LOW: [Band; 4] = [
    band(0.0, 10.0, Red),
    band(10.0, 35.0, Green),
    band(35.0, 50.0, Yellow),
    band(50.0, 100.0, Red),
];

const HIGH: [Band; 4] = [
    band(0.0, 50.0, Red),
    band(50.0, 65.0, Yellow),
    band(65.0, 90.0, Green),
    band(90.0, 100.0, Red),
];

const DOUBLE: [Band; 7] = [
    band(0.0, 8.0, Red),
    band(8.0, 28.0, Green),
    band(28.0, 40.0, Yellow),
    band(40.0, 60.0, Red),
    band(60.0, 72.0, Yellow),
    band(72.0, 92.0, Green),
    band(92.0, 100.0, Red),
];

/// Swing amplitude of a dynamic band center.
pub const DYNAMIC_AMPLITUDE: f32 = 30.0;

/// `(green half-width, yellow shoulder width)` for each dynamic size.
fn dynamic_dimensions(bar_type: BarType) -> Option<(f32, f32)> {
    match bar_type {
        BarType::DynamicSmall => Some((5.0, 6.0)),
        BarType::DynamicMedium => Some((8.0, 8.0)),
        BarType::DynamicLarge => Some((12.0, 10.0)),
        _ => None,
    }
}

/// The bar as it stands on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarLayout {
    Static(&'static [Band]),
    Dynamic {
        center: f32,
        green_half: f32,
        yellow: f32,
    },
}

impl BarLayout {
    /// Layout for `bar_type` at `elapsed_s` seconds into the attempt.
    pub fn resolve(bar_type: BarType, elapsed_s: f32, direction_bias: f32) -> Self {
        match bar_type {
            BarType::Middle => BarLayout::Static(&MIDDLE),
            BarType::MiddleSmall => BarLayout::Static(&MIDDLE_SMALL),
            BarType::Low => BarLayout::Static(&LOW),
            BarType::High => BarLayout::Static(&HIGH),
            BarType::Double => BarLayout::Static(&DOUBLE),
            dynamic => {
                let (green_half, yellow) = dynamic_dimensions(dynamic).unwrap_or((8.0, 8.0));
                let reach = green_half + yellow;
                let center = (50.0 + DYNAMIC_AMPLITUDE * elapsed_s.sin() * direction_bias)
                    .clamp(reach, 100.0 - reach);
                BarLayout::Dynamic {
                    center,
                    green_half,
                    yellow,
                }
            }
        }
    }

    /// Colour of the zone containing `balance`.
    pub fn color_at(&self, balance: f32) -> ZoneColor {
        match *self {
            BarLayout::Static(bands) => bands
                .iter()
                .find(|b| balance >= b.start && balance < b.end)
                .or_else(|| bands.last())
                .map_or(Red, |b| b.color),
            BarLayout::Dynamic {
                center,
                green_half,
                yellow,
            } => {
                let offset = (balance - center).abs();
                if offset < green_half {
                    Green
                } else if offset < green_half + yellow {
                    Yellow
                } else {
                    Red
                }
            }
        }
    }

    /// Bands in axis order, for rendering.
    pub fn bands(&self) -> Vec<Band> {
        match *self {
            BarLayout::Static(bands) => bands.to_vec(),
            BarLayout::Dynamic {
                center,
                green_half,
                yellow,
            } => {
                let g0 = center - green_half;
                let g1 = center + green_half;
                vec![
                    band(0.0, g0 - yellow, Red),
                    band(g0 - yellow, g0, Yellow),
                    band(g0, g1, Green),
                    band(g1, g1 + yellow, Yellow),
                    band(g1 + yellow, 100.0, Red),
                ]
            }
        }
    }

    /// Midpoint of the green band nearest `balance`.
    pub fn nearest_green(&self, balance: f32) -> f32 {
        self.bands()
            .iter()
            .filter(|b| b.color == Green)
            .map(|b| (b.start + b.end) / 2.0)
            .min_by(|a, b| (a - balance).abs().total_cmp(&(b - balance).abs()))
            .unwrap_or(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATIC: [BarType; 5] = [
        BarType::Middle,
        BarType::MiddleSmall,
        BarType::Low,
        BarType::High,
        BarType::Double,
    ];

    #[test]
    fn static_layouts_cover_the_axis() {
        for bar_type in ALL_STATIC {
            let bands = BarLayout::resolve(bar_type, 0.0, 0.0).bands();
            assert!(bands[0].start.abs() < f32::EPSILON);
            assert!((bands[bands.len() - 1].end - 100.0).abs() < f32::EPSILON);
            for pair in bands.windows(2) {
                assert!((pair[0].end - pair[1].start).abs() < f32::EPSILON);
            }
            assert!(bands.iter().any(|b| b.color == Green), "{bar_type:?}");
        }
    }

    #[test]
    fn middle_center_is_green_edges_red() {
        let layout = BarLayout::resolve(BarType::Middle, 0.0, 0.0);
        assert_eq!(layout.color_at(50.0), Green);
        assert_eq!(layout.color_at(25.0), Yellow);
        assert_eq!(layout.color_at(10.0), Red);
        assert_eq!(layout.color_at(100.0), Red);
        assert_eq!(layout.color_at(0.0), Red);
    }

    #[test]
    fn dynamic_band_swings_with_bias() {
        let still = BarLayout::resolve(BarType::DynamicMedium, 1.0, 0.0);
        assert_eq!(still.color_at(50.0), Green);

        let swung = BarLayout::resolve(BarType::DynamicMedium, std::f32::consts::FRAC_PI_2, 1.0);
        let BarLayout::Dynamic { center, .. } = swung else {
            panic!("expected a dynamic layout");
        };
        // 50 + 30 = 80, clamped to 100 - 16 = 84 → unclamped here
        assert!((center - 80.0).abs() < 1e-4);
        assert_eq!(swung.color_at(80.0), Green);
        assert_eq!(swung.color_at(50.0), Red);
    }

    #[test]
    fn dynamic_band_stays_on_axis() {
        for step in 0..400 {
            let t = step as f32 * 0.05;
            for bias in [-1.0, -0.4, 0.3, 1.0] {
                for bar_type in [
                    BarType::DynamicSmall,
                    BarType::DynamicMedium,
                    BarType::DynamicLarge,
                ] {
                    let bands = BarLayout::resolve(bar_type, t, bias).bands();
                    assert!(bands[0].end >= 0.0);
                    assert!(bands[4].start <= 100.0);
                }
            }
        }
    }

    #[test]
    fn nearest_green_picks_closer_band() {
        let layout = BarLayout::resolve(BarType::Double, 0.0, 0.0);
        assert!((layout.nearest_green(30.0) - 18.0).abs() < f32::EPSILON);
        assert!((layout.nearest_green(70.0) - 82.0).abs() < f32::EPSILON);
    }
}
