//! Defines the `WeatherCode` enum, mapping the WMO weather interpretation codes
//! reported in the daily `weather_code` series to descriptive categories.

/// Represents a WMO weather interpretation code.
///
/// The provider reports the most severe condition of the day as one of these
/// codes. The table is sparse: codes between the listed ones (e.g. 4 or 50)
/// are not part of the standard and have no category.
///
/// Convert an integer code into this enum with [`WeatherCode::from_i64`], and get
/// the human-readable label with [`WeatherCode::category`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum WeatherCode {
    /// Code 0: Clear sky.
    ClearSky = 0,
    /// Code 1: Mainly clear.
    MainlyClear = 1,
    /// Code 2: Partly cloudy.
    PartlyCloudy = 2,
    /// Code 3: Overcast.
    Overcast = 3,
    /// Code 45: Fog.
    Fog = 45,
    /// Code 48: Depositing rime fog.
    RimeFog = 48,
    /// Code 51: Light drizzle.
    DrizzleLight = 51,
    /// Code 53: Moderate drizzle.
    DrizzleModerate = 53,
    /// Code 55: Dense drizzle.
    DrizzleDense = 55,
    /// Code 56: Light freezing drizzle.
    FreezingDrizzleLight = 56,
    /// Code 57: Dense freezing drizzle.
    FreezingDrizzleDense = 57,
    /// Code 61: Slight rain.
    RainSlight = 61,
    /// Code 63: Moderate rain.
    RainModerate = 63,
    /// Code 65: Heavy rain.
    RainHeavy = 65,
    /// Code 66: Light freezing rain.
    FreezingRainLight = 66,
    /// Code 67: Heavy freezing rain.
    FreezingRainHeavy = 67,
    /// Code 71: Slight snow fall.
    SnowFallSlight = 71,
    /// Code 73: Moderate snow fall.
    SnowFallModerate = 73,
    /// Code 75: Heavy snow fall.
    SnowFallHeavy = 75,
    /// Code 77: Snow grains.
    SnowGrains = 77,
    /// Code 80: Slight rain showers.
    RainShowersSlight = 80,
    /// Code 81: Moderate rain showers.
    RainShowersModerate = 81,
    /// Code 82: Violent rain showers.
    RainShowersViolent = 82,
    /// Code 85: Slight snow showers.
    SnowShowersSlight = 85,
    /// Code 86: Heavy snow showers.
    SnowShowersHeavy = 86,
    /// Code 95: Slight or moderate thunderstorm.
    Thunderstorm = 95,
    /// Code 96: Thunderstorm with slight hail.
    ThunderstormSlightHail = 96,
    /// Code 99: Thunderstorm with heavy hail.
    ThunderstormHeavyHail = 99,
}

impl WeatherCode {
    /// Every defined code, in ascending order.
    pub const ALL: [WeatherCode; 28] = [
        WeatherCode::ClearSky,
        WeatherCode::MainlyClear,
        WeatherCode::PartlyCloudy,
        WeatherCode::Overcast,
        WeatherCode::Fog,
        WeatherCode::RimeFog,
        WeatherCode::DrizzleLight,
        WeatherCode::DrizzleModerate,
        WeatherCode::DrizzleDense,
        WeatherCode::FreezingDrizzleLight,
        WeatherCode::FreezingDrizzleDense,
        WeatherCode::RainSlight,
        WeatherCode::RainModerate,
        WeatherCode::RainHeavy,
        WeatherCode::FreezingRainLight,
        WeatherCode::FreezingRainHeavy,
        WeatherCode::SnowFallSlight,
        WeatherCode::SnowFallModerate,
        WeatherCode::SnowFallHeavy,
        WeatherCode::SnowGrains,
        WeatherCode::RainShowersSlight,
        WeatherCode::RainShowersModerate,
        WeatherCode::RainShowersViolent,
        WeatherCode::SnowShowersSlight,
        WeatherCode::SnowShowersHeavy,
        WeatherCode::Thunderstorm,
        WeatherCode::ThunderstormSlightHail,
        WeatherCode::ThunderstormHeavyHail,
    ];

    /// Attempts to convert a WMO code into a `WeatherCode` variant.
    ///
    /// # Returns
    ///
    /// * `Some(WeatherCode)` if `value` is one of the defined codes.
    /// * `None` for every other value, including codes inside 0-99 that the
    ///   table skips.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use garden_weather::WeatherCode;
    ///
    /// assert_eq!(WeatherCode::from_i64(3), Some(WeatherCode::Overcast));
    /// assert_eq!(WeatherCode::from_i64(4), None);
    /// ```
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(WeatherCode::ClearSky),
            1 => Some(WeatherCode::MainlyClear),
            2 => Some(WeatherCode::PartlyCloudy),
            3 => Some(WeatherCode::Overcast),
            45 => Some(WeatherCode::Fog),
            48 => Some(WeatherCode::RimeFog),
            51 => Some(WeatherCode::DrizzleLight),
            53 => Some(WeatherCode::DrizzleModerate),
            55 => Some(WeatherCode::DrizzleDense),
            56 => Some(WeatherCode::FreezingDrizzleLight),
            57 => Some(WeatherCode::FreezingDrizzleDense),
            61 => Some(WeatherCode::RainSlight),
            63 => Some(WeatherCode::RainModerate),
            65 => Some(WeatherCode::RainHeavy),
            66 => Some(WeatherCode::FreezingRainLight),
            67 => Some(WeatherCode::FreezingRainHeavy),
            71 => Some(WeatherCode::SnowFallSlight),
            73 => Some(WeatherCode::SnowFallModerate),
            75 => Some(WeatherCode::SnowFallHeavy),
            77 => Some(WeatherCode::SnowGrains),
            80 => Some(WeatherCode::RainShowersSlight),
            81 => Some(WeatherCode::RainShowersModerate),
            82 => Some(WeatherCode::RainShowersViolent),
            85 => Some(WeatherCode::SnowShowersSlight),
            86 => Some(WeatherCode::SnowShowersHeavy),
            95 => Some(WeatherCode::Thunderstorm),
            96 => Some(WeatherCode::ThunderstormSlightHail),
            99 => Some(WeatherCode::ThunderstormHeavyHail),
            _ => None,
        }
    }

    /// Converts a code as it appears in a float series.
    ///
    /// The provider serializes codes as numbers, which may come back as
    /// floats (`3.0`) after a CSV round trip. Non-integral or non-finite values
    /// have no category.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value.fract() != 0.0 {
            return None;
        }
        Self::from_i64(value as i64)
    }

    pub fn code(&self) -> i64 {
        *self as i64
    }

    /// The human-readable category written to the combined table.
    pub fn category(&self) -> &'static str {
        match self {
            WeatherCode::ClearSky => "Clear sky",
            WeatherCode::MainlyClear => "Mainly clear",
            WeatherCode::PartlyCloudy => "Partly cloudy",
            WeatherCode::Overcast => "Overcast",
            WeatherCode::Fog => "Fog",
            WeatherCode::RimeFog => "Depositing rime fog",
            WeatherCode::DrizzleLight => "Drizzle: Light",
            WeatherCode::DrizzleModerate => "Drizzle: Moderate",
            WeatherCode::DrizzleDense => "Drizzle: Dense intensity",
            WeatherCode::FreezingDrizzleLight => "Freezing Drizzle: Light",
            WeatherCode::FreezingDrizzleDense => "Freezing Drizzle: Dense intensity",
            WeatherCode::RainSlight => "Rain: Slight",
            WeatherCode::RainModerate => "Rain: Moderate",
            WeatherCode::RainHeavy => "Rain: Heavy intensity",
            WeatherCode::FreezingRainLight => "Freezing Rain: Light",
            WeatherCode::FreezingRainHeavy => "Freezing Rain: Heavy intensity",
            WeatherCode::SnowFallSlight => "Snow fall: Slight",
            WeatherCode::SnowFallModerate => "Snow fall: Moderate",
            WeatherCode::SnowFallHeavy => "Snow fall: Heavy intensity",
            WeatherCode::SnowGrains => "Snow grains",
            WeatherCode::RainShowersSlight => "Rain showers: Slight",
            WeatherCode::RainShowersModerate => "Rain showers: Moderate",
            WeatherCode::RainShowersViolent => "Rain showers: Violent",
            WeatherCode::SnowShowersSlight => "Snow showers slight",
            WeatherCode::SnowShowersHeavy => "Snow showers heavy",
            WeatherCode::Thunderstorm => "Thunderstorm: Slight or moderate",
            WeatherCode::ThunderstormSlightHail => "Thunderstorm with slight hail",
            WeatherCode::ThunderstormHeavyHail => "Thunderstorm with heavy hail",
        }
    }
}

/// Looks up the category label for a raw code, `None` when the code is unmapped.
pub fn category_for(value: f64) -> Option<&'static str> {
    WeatherCode::from_f64(value).map(|code| code.category())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overcast() {
        assert_eq!(WeatherCode::from_i64(3), Some(WeatherCode::Overcast));
        assert_eq!(category_for(3.0), Some("Overcast"));
    }

    #[test]
    fn test_all_codes_round_trip_through_from_i64() {
        for code in WeatherCode::ALL {
            assert_eq!(WeatherCode::from_i64(code.code()), Some(code));
        }
    }

    #[test]
    fn test_gaps_in_table_are_unmapped() {
        let defined: Vec<i64> = WeatherCode::ALL.iter().map(|c| c.code()).collect();
        for value in 0..100 {
            if !defined.contains(&value) {
                assert_eq!(WeatherCode::from_i64(value), None, "code {value}");
            }
        }
        assert_eq!(WeatherCode::from_i64(-1), None);
        assert_eq!(WeatherCode::from_i64(100), None);
    }

    #[test]
    fn test_from_f64_rejects_fractions_and_nan() {
        assert_eq!(WeatherCode::from_f64(61.0), Some(WeatherCode::RainSlight));
        assert_eq!(WeatherCode::from_f64(61.5), None);
        assert_eq!(WeatherCode::from_f64(f64::NAN), None);
        assert_eq!(category_for(f64::INFINITY), None);
    }

    #[test]
    fn test_thunderstorm_labels() {
        assert_eq!(
            category_for(95.0),
            Some("Thunderstorm: Slight or moderate")
        );
        assert_eq!(category_for(99.0), Some("Thunderstorm with heavy hail"));
    }
}
