#![forbid(unsafe_code)]

//! Voltage ranges, level markers, and voltage-to-pixel interpolation.

use crate::error::DataError;

/// A named horizontal voltage level drawn across a pin's row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoltageLevelMarker {
    pub name: String,
    pub voltage: f64,
    pub show: bool,
}

impl VoltageLevelMarker {
    /// Create a visible marker.
    pub fn new(name: impl Into<String>, voltage: f64) -> Self {
        Self {
            name: name.into(),
            voltage,
            show: true,
        }
    }
}

/// Reference to one of a range's voltage levels.
///
/// The two scale bounds are fixed slots; user markers are addressed by their
/// position in the range's ordered marker list. Keeping this a closed enum
/// (instead of the string keys the level names suggest) makes level lookups
/// exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LevelRef {
    /// The range's maximum voltage.
    Max,
    /// The range's minimum voltage.
    Min,
    /// The n-th user marker in the range's marker list.
    Marker(usize),
}

/// The `[min, max]` voltage scale of one pin.
///
/// `max_volt > min_volt` is asserted on construction and on every mutation.
/// Marker voltages are *not* constrained to the range; out-of-range levels
/// simply clip like any other geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoltageRange {
    max_volt: f64,
    min_volt: f64,
    pub show_max_volt: bool,
    pub show_min_volt: bool,
    markers: Vec<VoltageLevelMarker>,
}

impl VoltageRange {
    /// Create a range; fails unless `max > min`.
    pub fn new(max: f64, min: f64) -> Result<Self, DataError> {
        if max <= min || max.is_nan() || min.is_nan() {
            return Err(DataError::VoltageOrder { max, min });
        }
        Ok(Self {
            max_volt: max,
            min_volt: min,
            show_max_volt: true,
            show_min_volt: true,
            markers: Vec::new(),
        })
    }

    /// Attach the ordered user-marker list.
    pub fn with_markers(mut self, markers: Vec<VoltageLevelMarker>) -> Self {
        self.markers = markers;
        self
    }

    /// Maximum voltage of the scale.
    #[inline]
    pub fn max_volt(&self) -> f64 {
        self.max_volt
    }

    /// Minimum voltage of the scale.
    #[inline]
    pub fn min_volt(&self) -> f64 {
        self.min_volt
    }

    /// Voltage span (`max - min`), always positive.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max_volt - self.min_volt
    }

    /// Change the maximum voltage, re-asserting the ordering invariant.
    pub fn set_max_volt(&mut self, volt: f64) -> Result<(), DataError> {
        if volt <= self.min_volt || volt.is_nan() {
            return Err(DataError::VoltageOrder {
                max: volt,
                min: self.min_volt,
            });
        }
        self.max_volt = volt;
        Ok(())
    }

    /// Change the minimum voltage, re-asserting the ordering invariant.
    pub fn set_min_volt(&mut self, volt: f64) -> Result<(), DataError> {
        if self.max_volt <= volt || volt.is_nan() {
            return Err(DataError::VoltageOrder {
                max: self.max_volt,
                min: volt,
            });
        }
        self.min_volt = volt;
        Ok(())
    }

    /// Ordered user markers.
    pub fn markers(&self) -> &[VoltageLevelMarker] {
        &self.markers
    }

    /// Mutable access to the user markers (voltages are unconstrained).
    pub fn markers_mut(&mut self) -> &mut [VoltageLevelMarker] {
        &mut self.markers
    }

    /// Look up a marker by name.
    pub fn marker_named(&self, name: &str) -> Option<&VoltageLevelMarker> {
        self.markers.iter().find(|m| m.name == name)
    }

    /// Resolve a level reference to its voltage.
    ///
    /// `None` when a `Marker` index is out of range; callers skip drawing
    /// rather than fabricating a level.
    pub fn level_voltage(&self, level: LevelRef) -> Option<f64> {
        match level {
            LevelRef::Max => Some(self.max_volt),
            LevelRef::Min => Some(self.min_volt),
            LevelRef::Marker(idx) => self.markers.get(idx).map(|m| m.voltage),
        }
    }
}

/// Map a voltage into the pixel band `[band_top, band_bottom]`.
///
/// The band top carries `max_volt`, the band bottom `min_volt`; voltages
/// outside the range land outside the band and are clipped by the caller.
/// NaN maps to the band midpoint (the rasterizer substitutes the previous
/// point's Y before this matters for traces).
pub fn voltage_to_y(volt: f64, range: &VoltageRange, band_top: f64, band_bottom: f64) -> f64 {
    if volt.is_nan() {
        return (band_top + band_bottom) / 2.0;
    }
    let height = band_bottom - band_top;
    band_bottom - (volt - range.min_volt()) * height / range.span()
}

/// Inverse of [`voltage_to_y`].
pub fn y_to_voltage(y: f64, range: &VoltageRange, band_top: f64, band_bottom: f64) -> f64 {
    let height = band_bottom - band_top;
    if height == 0.0 {
        return range.min_volt();
    }
    range.min_volt() + (band_bottom - y) * range.span() / height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_inverted_range() {
        assert!(VoltageRange::new(1.0, 3.3).is_err());
        assert!(VoltageRange::new(1.0, 1.0).is_err());
        assert!(VoltageRange::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn construction_accepts_any_marker_voltage() {
        let range = VoltageRange::new(3.3, 0.0)
            .unwrap()
            .with_markers(vec![VoltageLevelMarker::new("Vih", 99.0)]);
        assert_eq!(range.marker_named("Vih").unwrap().voltage, 99.0);
    }

    #[test]
    fn mutation_reasserts_invariant() {
        let mut range = VoltageRange::new(3.3, 0.0).unwrap();
        assert!(range.set_max_volt(-1.0).is_err());
        assert!(range.set_min_volt(5.0).is_err());
        range.set_max_volt(5.0).unwrap();
        range.set_min_volt(-5.0).unwrap();
        assert_eq!(range.span(), 10.0);
    }

    #[test]
    fn level_ref_resolution() {
        let range = VoltageRange::new(3.3, 0.0)
            .unwrap()
            .with_markers(vec![VoltageLevelMarker::new("Vih", 2.0)]);
        assert_eq!(range.level_voltage(LevelRef::Max), Some(3.3));
        assert_eq!(range.level_voltage(LevelRef::Min), Some(0.0));
        assert_eq!(range.level_voltage(LevelRef::Marker(0)), Some(2.0));
        assert_eq!(range.level_voltage(LevelRef::Marker(7)), None);
    }

    #[test]
    fn midpoint_voltage_maps_to_band_center() {
        let range = VoltageRange::new(3.3, 0.0).unwrap();
        let y = voltage_to_y(1.65, &range, 0.0, 100.0);
        assert!((y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn band_edges_map_to_scale_bounds() {
        let range = VoltageRange::new(3.3, 0.0).unwrap();
        assert_eq!(voltage_to_y(3.3, &range, 10.0, 110.0), 10.0);
        assert_eq!(voltage_to_y(0.0, &range, 10.0, 110.0), 110.0);
    }

    #[test]
    fn out_of_range_voltage_lands_outside_band() {
        let range = VoltageRange::new(1.0, 0.0).unwrap();
        assert!(voltage_to_y(2.0, &range, 0.0, 100.0) < 0.0);
        assert!(voltage_to_y(-1.0, &range, 0.0, 100.0) > 100.0);
    }

    #[test]
    fn nan_maps_to_band_midpoint() {
        let range = VoltageRange::new(1.0, 0.0).unwrap();
        assert_eq!(voltage_to_y(f64::NAN, &range, 0.0, 100.0), 50.0);
    }

    #[test]
    fn y_round_trips_to_voltage() {
        let range = VoltageRange::new(3.3, -3.3).unwrap();
        let y = voltage_to_y(1.1, &range, 5.0, 95.0);
        let v = y_to_voltage(y, &range, 5.0, 95.0);
        assert!((v - 1.1).abs() < 1e-9);
    }
}
