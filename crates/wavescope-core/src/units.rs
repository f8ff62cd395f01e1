#![forbid(unsafe_code)]

//! Time and voltage display formatting.
//!
//! `Auto` walks the unit ladder from largest to smallest and picks the first
//! unit whose scaled magnitude reaches 1; values smaller than the last rung
//! format in that smallest unit. Zero formats in the base unit.

/// Display unit for time values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    S,
    Ms,
    Us,
    Ns,
    Ps,
    #[default]
    Auto,
}

/// Display unit for voltage values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoltUnit {
    V,
    Mv,
    Uv,
    Nv,
    #[default]
    Auto,
}

const TIME_LADDER: [(TimeUnit, f64, &str); 5] = [
    (TimeUnit::S, 1.0, "s"),
    (TimeUnit::Ms, 1e-3, "ms"),
    (TimeUnit::Us, 1e-6, "us"),
    (TimeUnit::Ns, 1e-9, "ns"),
    (TimeUnit::Ps, 1e-12, "ps"),
];

const VOLT_LADDER: [(VoltUnit, f64, &str); 4] = [
    (VoltUnit::V, 1.0, "V"),
    (VoltUnit::Mv, 1e-3, "mV"),
    (VoltUnit::Uv, 1e-6, "uV"),
    (VoltUnit::Nv, 1e-9, "nV"),
];

/// Unit and precision configuration for on-screen value text.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitFormat {
    pub time_unit: TimeUnit,
    pub volt_unit: VoltUnit,
    pub time_decimals: usize,
    pub volt_decimals: usize,
}

impl Default for UnitFormat {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::Auto,
            volt_unit: VoltUnit::Auto,
            time_decimals: 2,
            volt_decimals: 2,
        }
    }
}

impl UnitFormat {
    /// Format a time in seconds.
    pub fn time(&self, seconds: f64) -> String {
        if seconds.is_nan() {
            return "NaN".to_string();
        }
        match self.time_unit {
            TimeUnit::Auto => auto_format(seconds, &TIME_LADDER, self.time_decimals),
            fixed => {
                let &(_, scale, label) = TIME_LADDER
                    .iter()
                    .find(|(u, _, _)| *u == fixed)
                    .expect("fixed unit is in the ladder");
                fixed_format(seconds / scale, label, self.time_decimals)
            }
        }
    }

    /// Format a voltage in volts.
    pub fn voltage(&self, volts: f64) -> String {
        if volts.is_nan() {
            return "NaN".to_string();
        }
        match self.volt_unit {
            VoltUnit::Auto => auto_format(volts, &VOLT_LADDER, self.volt_decimals),
            fixed => {
                let &(_, scale, label) = VOLT_LADDER
                    .iter()
                    .find(|(u, _, _)| *u == fixed)
                    .expect("fixed unit is in the ladder");
                fixed_format(volts / scale, label, self.volt_decimals)
            }
        }
    }
}

fn auto_format<U: Copy>(value: f64, ladder: &[(U, f64, &str)], decimals: usize) -> String {
    for &(_, scale, label) in ladder {
        let scaled = value / scale;
        if scaled == 0.0 {
            return fixed_format(0.0, label, decimals);
        }
        if scaled.trunc() != 0.0 {
            return fixed_format(scaled, label, decimals);
        }
    }
    // Below the smallest rung: format there instead of failing.
    let (_, scale, label) = ladder[ladder.len() - 1];
    fixed_format(value / scale, label, decimals)
}

fn fixed_format(scaled: f64, label: &str, decimals: usize) -> String {
    let mut number = format!("{scaled:.decimals$}");
    if number.contains('.') {
        let trimmed_len = number.trim_end_matches('0').trim_end_matches('.').len();
        number.truncate(trimmed_len);
    }
    format!("{number} {label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_time_picks_largest_fitting_unit() {
        let fmt = UnitFormat::default();
        assert_eq!(fmt.time(1.5), "1.5 s");
        assert_eq!(fmt.time(0.0025), "2.5 ms");
        assert_eq!(fmt.time(42e-9), "42 ns");
        assert_eq!(fmt.time(3e-12), "3 ps");
    }

    #[test]
    fn auto_time_zero_uses_base_unit() {
        assert_eq!(UnitFormat::default().time(0.0), "0 s");
    }

    #[test]
    fn sub_ladder_values_use_smallest_unit() {
        // 0.4 ps has no rung with magnitude >= 1.
        assert_eq!(UnitFormat::default().time(0.4e-12), "0.4 ps");
    }

    #[test]
    fn nan_formats_as_nan() {
        let fmt = UnitFormat::default();
        assert_eq!(fmt.time(f64::NAN), "NaN");
        assert_eq!(fmt.voltage(f64::NAN), "NaN");
    }

    #[test]
    fn fixed_unit_is_respected() {
        let fmt = UnitFormat {
            time_unit: TimeUnit::Ns,
            ..UnitFormat::default()
        };
        assert_eq!(fmt.time(2.5e-6), "2500 ns");
    }

    #[test]
    fn voltage_rounds_to_decimals() {
        let fmt = UnitFormat::default();
        assert_eq!(fmt.voltage(1.6512), "1.65 V");
        assert_eq!(fmt.voltage(-0.125), "-125 mV");
    }

    #[test]
    fn negative_values_scale_like_positive_ones() {
        assert_eq!(UnitFormat::default().time(-3.2e-3), "-3.2 ms");
    }
}
