//! Sensor reading and the feature schema shared with the model.

use std::fmt;

use serde::Serialize;

/// One model input column.
///
/// The sampler produces exactly these fields and the predictor validates
/// the model artifact against them, so both sides share one schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    No,
    No2,
    RelativeHumidity,
    Temperature,
    WindDirection,
    WindSpeed,
    Hour,
    Day,
    Weekday,
    Month,
}

impl Feature {
    /// All features in display order.
    pub const ALL: [Feature; 10] = [
        Feature::No,
        Feature::No2,
        Feature::RelativeHumidity,
        Feature::Temperature,
        Feature::WindDirection,
        Feature::WindSpeed,
        Feature::Hour,
        Feature::Day,
        Feature::Weekday,
        Feature::Month,
    ];

    /// Column name used by the model artifact.
    pub fn name(self) -> &'static str {
        match self {
            Feature::No => "no",
            Feature::No2 => "no2",
            Feature::RelativeHumidity => "relativehumidity",
            Feature::Temperature => "temperature",
            Feature::WindDirection => "wind_direction",
            Feature::WindSpeed => "wind_speed",
            Feature::Hour => "hour",
            Feature::Day => "day",
            Feature::Weekday => "weekday",
            Feature::Month => "month",
        }
    }

    /// Look up a feature by its column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Human-readable label for the sensor table.
    pub fn label(self) -> &'static str {
        match self {
            Feature::No => "NO",
            Feature::No2 => "NO2",
            Feature::RelativeHumidity => "Humidity (%)",
            Feature::Temperature => "Temperature (°C)",
            Feature::WindDirection => "Wind direction (°)",
            Feature::WindSpeed => "Wind speed (m/s)",
            Feature::Hour => "Hour",
            Feature::Day => "Day",
            Feature::Weekday => "Weekday",
            Feature::Month => "Month",
        }
    }

    /// Calendar fields are integral and displayed without decimals.
    pub fn is_calendar(self) -> bool {
        matches!(
            self,
            Feature::Hour | Feature::Day | Feature::Weekday | Feature::Month
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single synthetic sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub no: f64,
    pub no2: f64,
    pub relativehumidity: f64,
    pub temperature: f64,
    pub wind_direction: f64,
    pub wind_speed: f64,
    pub hour: u32,
    pub day: u32,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u32,
    pub month: u32,
}

impl Reading {
    /// Value of one feature column.
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::No => self.no,
            Feature::No2 => self.no2,
            Feature::RelativeHumidity => self.relativehumidity,
            Feature::Temperature => self.temperature,
            Feature::WindDirection => self.wind_direction,
            Feature::WindSpeed => self.wind_speed,
            Feature::Hour => f64::from(self.hour),
            Feature::Day => f64::from(self.day),
            Feature::Weekday => f64::from(self.weekday),
            Feature::Month => f64::from(self.month),
        }
    }

    /// (feature, value) pairs in display order.
    pub fn fields(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        for f in Feature::ALL {
            assert_eq!(Feature::from_name(f.name()), Some(f));
        }
        assert_eq!(Feature::from_name("nox"), None);
    }

    #[test]
    fn get_reads_the_matching_field() {
        let r = Reading {
            no: 1.0,
            no2: 2.0,
            relativehumidity: 3.0,
            temperature: 4.0,
            wind_direction: 5.0,
            wind_speed: 6.0,
            hour: 7,
            day: 8,
            weekday: 9,
            month: 10,
        };
        let values: Vec<f64> = r.fields().map(|(_, v)| v).collect();
        assert_eq!(values, (1..=10).map(f64::from).collect::<Vec<_>>());
    }
}
