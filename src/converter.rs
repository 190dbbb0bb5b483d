use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Temperature,
    Weight,
    Volume,
}

impl FromStr for Category {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temp" | "temperature" => Ok(Category::Temperature),
            "weight" | "mass" => Ok(Category::Weight),
            "volume" => Ok(Category::Volume),
            other => Err(ConvertError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub id: &'static str,
    pub name: &'static str,
    /// Multiplier into the category's base unit (g, ml). Unused for temperature.
    pub factor: f64,
}

const TEMPERATURE_UNITS: &[Unit] = &[
    Unit { id: "c", name: "Celsius (°C)", factor: 1.0 },
    Unit { id: "f", name: "Fahrenheit (°F)", factor: 1.0 },
];

const WEIGHT_UNITS: &[Unit] = &[
    Unit { id: "g", name: "gram (g)", factor: 1.0 },
    Unit { id: "kg", name: "kilogram (kg)", factor: 1000.0 },
    Unit { id: "oz", name: "ounce (oz)", factor: 28.3495 },
    Unit { id: "lb", name: "pound (lb)", factor: 453.592 },
];

const VOLUME_UNITS: &[Unit] = &[
    Unit { id: "ml", name: "millilitre (ml)", factor: 1.0 },
    Unit { id: "l", name: "litre (L)", factor: 1000.0 },
    Unit { id: "cup", name: "cup (standard)", factor: 240.0 },
    Unit { id: "tbsp", name: "tablespoon", factor: 15.0 },
    Unit { id: "tsp", name: "teaspoon", factor: 5.0 },
    Unit { id: "floz", name: "fluid ounce (fl oz)", factor: 29.5735 },
];

impl Category {
    pub fn units(&self) -> &'static [Unit] {
        match self {
            Category::Temperature => TEMPERATURE_UNITS,
            Category::Weight => WEIGHT_UNITS,
            Category::Volume => VOLUME_UNITS,
        }
    }

    /// Default (from, to) pair shown when the category is selected.
    pub fn default_pair(&self) -> (&'static str, &'static str) {
        let units = self.units();
        let to = units.get(1).unwrap_or(&units[0]);
        (units[0].id, to.id)
    }

    fn unit(&self, id: &str) -> Result<&'static Unit, ConvertError> {
        let wanted = id.trim().to_lowercase();
        self.units()
            .iter()
            .find(|u| u.id == wanted)
            .ok_or_else(|| ConvertError::UnknownUnit {
                category: *self,
                unit: id.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    UnknownCategory(String),
    UnknownUnit { category: Category, unit: String },
    NotANumber(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::UnknownCategory(name) => write!(f, "Unknown unit category: {}", name),
            ConvertError::UnknownUnit { category, unit } => {
                write!(f, "Unknown {:?} unit: {}", category, unit)
            }
            ConvertError::NotANumber(input) => write!(f, "Not a number: {}", input),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Converts and formats: temperatures with one decimal, whole weights and
/// volumes bare, everything else with two decimals.
pub fn convert(category: Category, amount: f64, from: &str, to: &str) -> Result<String, ConvertError> {
    let from = category.unit(from)?;
    let to = category.unit(to)?;

    if category == Category::Temperature {
        let value = match (from.id, to.id) {
            ("c", "f") => amount * 9.0 / 5.0 + 32.0,
            ("f", "c") => (amount - 32.0) * 5.0 / 9.0,
            _ => amount,
        };
        return Ok(format!("{:.1}", value));
    }

    let value = amount * from.factor / to.factor;
    if value.fract() == 0.0 {
        Ok(format!("{}", value))
    } else {
        Ok(format!("{:.2}", value))
    }
}

/// Converts raw text input; blank or non-numeric input yields `None`.
pub fn convert_input(category: Category, input: &str, from: &str, to: &str) -> Option<String> {
    let amount = parse_amount(input).ok()?;
    convert(category, amount, from, to).ok()
}

pub fn parse_amount(input: &str) -> Result<f64, ConvertError> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConvertError::NotANumber(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(text: &str, expected: f64, tolerance: f64) {
        let value: f64 = text.parse().unwrap();
        assert!(
            (value - expected).abs() <= tolerance,
            "{} is not within {} of {}",
            value,
            tolerance,
            expected
        );
    }

    #[test]
    fn freezing_point() {
        assert_eq!(convert(Category::Temperature, 0.0, "c", "f").unwrap(), "32.0");
        assert_eq!(convert(Category::Temperature, 212.0, "f", "c").unwrap(), "100.0");
        assert_eq!(convert(Category::Temperature, 180.0, "c", "c").unwrap(), "180.0");
    }

    #[test]
    fn whole_results_print_bare() {
        assert_eq!(convert(Category::Weight, 1000.0, "g", "kg").unwrap(), "1");
        assert_eq!(convert(Category::Volume, 1.0, "cup", "ml").unwrap(), "240");
        assert_eq!(convert(Category::Volume, 3.0, "tsp", "tbsp").unwrap(), "1");
    }

    #[test]
    fn fractional_results_use_two_decimals() {
        assert_eq!(convert(Category::Weight, 1.0, "lb", "kg").unwrap(), "0.45");
        assert_eq!(convert(Category::Volume, 100.0, "ml", "cup").unwrap(), "0.42");
    }

    #[test]
    fn round_trips_within_rounding() {
        let there = convert(Category::Weight, 250.0, "g", "oz").unwrap();
        let back = convert(Category::Weight, there.parse().unwrap(), "oz", "g").unwrap();
        approx(&back, 250.0, 0.01 * 28.3495);

        let there = convert(Category::Temperature, 175.0, "c", "f").unwrap();
        let back = convert(Category::Temperature, there.parse().unwrap(), "f", "c").unwrap();
        approx(&back, 175.0, 0.1);

        let there = convert(Category::Volume, 2.0, "l", "floz").unwrap();
        let back = convert(Category::Volume, there.parse().unwrap(), "floz", "l").unwrap();
        approx(&back, 2.0, 0.01);
    }

    #[test]
    fn unknown_units_are_rejected() {
        let err = convert(Category::Weight, 1.0, "cup", "g").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownUnit { .. }));
    }

    #[test]
    fn blank_or_garbage_input_shows_nothing() {
        assert_eq!(convert_input(Category::Weight, "", "g", "kg"), None);
        assert_eq!(convert_input(Category::Weight, "abc", "g", "kg"), None);
        assert_eq!(convert_input(Category::Weight, " 500 ", "g", "kg").as_deref(), Some("0.50"));
    }

    #[test]
    fn categories_parse_from_names() {
        assert_eq!("temp".parse::<Category>().unwrap(), Category::Temperature);
        assert_eq!("Volume".parse::<Category>().unwrap(), Category::Volume);
        assert!("speed".parse::<Category>().is_err());
    }
}
