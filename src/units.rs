//! Unit translation and normalization.
//!
//! When a filter value anchors a numeric range and the filter's unit is a
//! capture-group reference (e.g. `(\d+)\s?(gb|tb)`), the captured token is
//! first translated to a canonical unit name and the anchor is normalized to
//! that family's base unit before the margin window is computed:
//!
//! ```text
//! "2 tb"  -> translate("tb", "en") = "terabyte"
//!         -> normalize(2.0, "terabyte") = 2 * 2^40 bytes
//! ```
//!
//! The resolver only sees the [`UnitNormalizer`] trait; [`UnitTable`] is the
//! default, immutable implementation and can be replaced by any lookup service.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub trait UnitNormalizer {
    /// Map a unit token as written in `language` to a canonical unit name.
    fn translate(&self, token: &str, language: &str) -> Option<String>;

    /// Convert `value` expressed in canonical `unit` to its family's base unit.
    fn normalize(&self, value: f64, unit: &str) -> f64;

    /// Name of the unit `normalize` converts `unit` into, if known.
    fn base_unit(&self, _unit: &str) -> Option<String> {
        None
    }
}

/// Physical quantity a unit measures; each family has one base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFamily {
    Time,
    Digital,
    Frequency,
    Weight,
    Length,
    Area,
    Volume,
    Power,
    Speed,
    Torque,
}

impl UnitFamily {
    pub fn base_unit(self) -> &'static str {
        match self {
            UnitFamily::Time => "second",
            UnitFamily::Digital => "byte",
            UnitFamily::Frequency => "hertz",
            UnitFamily::Weight => "gram",
            UnitFamily::Length => "centimeter",
            UnitFamily::Area => "square meter",
            UnitFamily::Volume => "milliliter",
            UnitFamily::Power => "horsepower",
            UnitFamily::Speed => "kilometer per hour",
            UnitFamily::Torque => "newton meter",
        }
    }
}

/// (canonical name, family, multiplier to base unit, aliases)
type UnitRow = (&'static str, UnitFamily, f64, &'static [&'static str]);

#[rustfmt::skip]
const UNITS: &[UnitRow] = &[
    ("year",        UnitFamily::Time, 31_536_000.0, &["year", "years", "yr", "yrs"]),
    ("month",       UnitFamily::Time, 2_592_000.0, &["month", "months"]),
    ("week",        UnitFamily::Time, 604_800.0, &["week", "weeks", "wk"]),
    ("day",         UnitFamily::Time, 86_400.0, &["day", "days", "day(s)"]),
    ("hour",        UnitFamily::Time, 3_600.0, &["hour", "hours", "hour(s)", "hrs", "hr", "h"]),
    ("minute",      UnitFamily::Time, 60.0, &["minute", "minutes", "min", "mins"]),
    ("second",      UnitFamily::Time, 1.0, &["second", "seconds", "sec", "secs", "s"]),
    ("millisecond", UnitFamily::Time, 0.001, &["millisecond", "milliseconds", "milli seconds", "ms"]),

    ("terabyte", UnitFamily::Digital, 1_099_511_627_776.0, &["terabyte", "terabytes", "tera byte", "tb"]),
    ("gigabyte", UnitFamily::Digital, 1_073_741_824.0, &["gigabyte", "gigabytes", "giga byte", "gb"]),
    ("megabyte", UnitFamily::Digital, 1_048_576.0, &["megabyte", "megabytes", "mega byte", "mb"]),
    ("kilobyte", UnitFamily::Digital, 1_024.0, &["kilobyte", "kilobytes", "kilo byte", "kbyte", "kb"]),
    ("byte",     UnitFamily::Digital, 1.0, &["byte", "bytes", "b"]),
    ("bit",      UnitFamily::Digital, 0.125, &["bit", "bits"]),

    ("terahertz", UnitFamily::Frequency, 1e12, &["terahertz", "tera hertz", "thz"]),
    ("gigahertz", UnitFamily::Frequency, 1e9, &["gigahertz", "giga hertz", "ghz"]),
    ("megahertz", UnitFamily::Frequency, 1e6, &["megahertz", "mega hertz", "mhz"]),
    ("kilohertz", UnitFamily::Frequency, 1e3, &["kilohertz", "kilo hertz", "khz"]),
    ("hertz",     UnitFamily::Frequency, 1.0, &["hertz", "hz"]),

    ("ton",      UnitFamily::Weight, 1_000_000.0, &["ton", "tons", "tonne", "tonnes"]),
    ("kilogram", UnitFamily::Weight, 1_000.0, &["kilogram", "kilograms", "kg", "kgs"]),
    ("pound",    UnitFamily::Weight, 453.592_37, &["pound", "pounds", "lb", "lbs"]),
    ("ounce",    UnitFamily::Weight, 28.349_523_1, &["ounce", "ounces", "oz", "ozs"]),
    ("gram",     UnitFamily::Weight, 1.0, &["gram", "grams", "g", "gr"]),

    ("kilometer",  UnitFamily::Length, 100_000.0, &["kilometer", "kilometers", "kilometre", "kilometres", "km", "kms"]),
    ("mile",       UnitFamily::Length, 160_934.4, &["mile", "miles", "mi"]),
    ("meter",      UnitFamily::Length, 100.0, &["meter", "meters", "metre", "metres", "m"]),
    ("decimeter",  UnitFamily::Length, 10.0, &["decimeter", "decimeters", "decimetre", "decimetres", "dm"]),
    ("foot",       UnitFamily::Length, 30.48, &["foot", "feet", "ft"]),
    ("inch",       UnitFamily::Length, 2.54, &["inch", "inches", "in", "\"", "zoll"]),
    ("centimeter", UnitFamily::Length, 1.0, &["centimeter", "centimeters", "centimetre", "centimetres", "cm"]),
    ("millimeter", UnitFamily::Length, 0.1, &["millimeter", "millimeters", "millimetre", "millimetres", "mm"]),

    ("square mile",               UnitFamily::Area, 2_589_988.11, &["square mile", "square miles", "sq mi", "sq miles", "sq.miles"]),
    ("thousand square miles",     UnitFamily::Area, 2_589_988_110.0, &["thousand square miles"]),
    ("million square miles",      UnitFamily::Area, 2_589_988_110_000.0, &["million square miles", "million sqare miles"]),
    ("square kilometer",          UnitFamily::Area, 1_000_000.0, &[
        "square kilometer", "square kilometers", "square kilometre", "square kilometres", "square km",
        "sq km", "sq.km", "sq kilometer", "sq.kilometer", "sq kilometre", "sq.kilometre", "km²", "km2", "km 2",
    ]),
    ("million square kilometers", UnitFamily::Area, 1_000_000_000_000.0, &["million square kilometers"]),
    ("hectare",                   UnitFamily::Area, 10_000.0, &["hectare", "hectares", "ha"]),
    ("square meter",              UnitFamily::Area, 1.0, &["square meter", "square meters", "sq m", "sq meter", "sq meters", "m²", "m2"]),

    ("teaspoon",    UnitFamily::Volume, 4.928_92, &["teaspoon", "teaspoons", "tsp", "tsps"]),
    ("tablespoon",  UnitFamily::Volume, 14.786_8, &["tablespoon", "tablespoons", "tbsp", "tbsps"]),
    ("fluid ounce", UnitFamily::Volume, 29.57, &["fl oz", "fl ozs", "fl ounce", "fl ounces", "fl. oz", "fl. ozs"]),
    ("liter",       UnitFamily::Volume, 1_000.0, &["liter", "liters", "litre", "litres", "l"]),
    ("gallon",      UnitFamily::Volume, 3_785.41, &["gallon", "gallons", "gal"]),
    ("quart",       UnitFamily::Volume, 946.353, &["quart", "quarts", "qt", "qts"]),
    ("pint",        UnitFamily::Volume, 473.176, &["pint", "pints", "pt", "pts"]),
    ("cup",         UnitFamily::Volume, 236.588, &["cup", "cups", "cp", "c"]),
    ("shot",        UnitFamily::Volume, 44.360_3, &["shot", "shots", "measure", "measures"]),
    ("milliliter",  UnitFamily::Volume, 1.0, &["milliliter", "milliliters", "milli liters", "millilitre", "ml"]),

    ("horsepower", UnitFamily::Power, 1.0, &["horsepower", "metric horsepower", "horses", "hp", "bhp"]),
    ("kilowatt",   UnitFamily::Power, 1.341, &["kilowatt", "kilowatts", "kw"]),

    ("mile per hour",      UnitFamily::Speed, 1.609_344, &["miles per hour", "mile per hour", "mph"]),
    ("kilometer per hour", UnitFamily::Speed, 1.0, &["kilometers per hour", "kilometer per hour", "km/h", "kmh", "kph"]),

    ("pound-foot",   UnitFamily::Torque, 1.355_817_952, &[
        "pound-foot", "pound feet", "pound-feet", "foot pound", "foot-pound", "foot pounds", "foot-pounds",
        "lb/ft", "lb ft", "lb-ft", "lb.-ft", "lbs.-ft", "ft-lb", "ft-lbs",
    ]),
    ("newton meter", UnitFamily::Torque, 1.0, &["newton meter", "newton meters", "newton metre", "nm"]),
];

/// Localized spellings that differ from the English aliases.
#[rustfmt::skip]
const LOCALIZED: &[(&str, &str, &str)] = &[
    ("de", "jahr", "year"), ("de", "jahre", "year"),
    ("de", "monat", "month"), ("de", "monate", "month"),
    ("de", "woche", "week"), ("de", "wochen", "week"),
    ("de", "tag", "day"), ("de", "tage", "day"),
    ("de", "stunde", "hour"), ("de", "stunden", "hour"), ("de", "std", "hour"),
    ("de", "minuten", "minute"),
    ("de", "sekunde", "second"), ("de", "sekunden", "second"),
    ("de", "tonne", "ton"), ("de", "tonnen", "ton"),
    ("de", "kilogramm", "kilogram"), ("de", "gramm", "gram"),
    ("de", "pfund", "pound"),
    ("de", "kilometer", "kilometer"), ("de", "meile", "mile"), ("de", "meilen", "mile"),
    ("de", "meter", "meter"), ("de", "fuß", "foot"), ("de", "zentimeter", "centimeter"),
    ("de", "millimeter", "millimeter"), ("de", "dezimeter", "decimeter"),
    ("de", "quadratmeter", "square meter"), ("de", "quadratkilometer", "square kilometer"),
    ("de", "liter", "liter"), ("de", "milliliter", "milliliter"), ("de", "tasse", "cup"),
    ("de", "ps", "horsepower"), ("de", "stundenkilometer", "kilometer per hour"),
    ("de", "newtonmeter", "newton meter"),
];

#[derive(Debug, Clone, Copy)]
struct UnitEntry {
    canonical: &'static str,
    family: UnitFamily,
    multiplier: f64,
}

/// Immutable unit lookup service covering time, digital size, frequency,
/// weight, length, area, volume, power, speed and torque.
#[derive(Debug, Clone)]
pub struct UnitTable {
    aliases: HashMap<String, UnitEntry>,
    localized: HashMap<(String, String), &'static str>,
    canonical: HashMap<&'static str, UnitEntry>,
}

static DEFAULT_TABLE: Lazy<UnitTable> = Lazy::new(UnitTable::build);

impl UnitTable {
    /// Shared instance of the built-in table.
    pub fn shared() -> &'static UnitTable {
        &DEFAULT_TABLE
    }

    fn build() -> Self {
        let mut aliases = HashMap::new();
        let mut canonical = HashMap::new();
        for &(name, family, multiplier, names) in UNITS {
            let entry = UnitEntry { canonical: name, family, multiplier };
            canonical.insert(name, entry);
            for alias in names {
                aliases.insert(alias.to_string(), entry);
            }
        }

        let localized = LOCALIZED
            .iter()
            .map(|&(language, token, unit)| ((language.to_string(), token.to_string()), unit))
            .collect();

        UnitTable { aliases, localized, canonical }
    }

    /// Family of a canonical unit name.
    pub fn family(&self, unit: &str) -> Option<UnitFamily> {
        self.canonical.get(unit).map(|e| e.family)
    }

    fn clean(token: &str) -> String {
        let lower = token.trim().to_lowercase();
        lower.strip_suffix('.').map(str::to_string).unwrap_or(lower)
    }
}

impl Default for UnitTable {
    fn default() -> Self {
        UnitTable::shared().clone()
    }
}

impl UnitNormalizer for UnitTable {
    fn translate(&self, token: &str, language: &str) -> Option<String> {
        let token = Self::clean(token);
        if let Some(unit) = self.localized.get(&(language.to_lowercase(), token.clone())) {
            return Some(unit.to_string());
        }
        self.aliases.get(&token).map(|e| e.canonical.to_string())
    }

    fn normalize(&self, value: f64, unit: &str) -> f64 {
        match self.canonical.get(unit) {
            Some(entry) => value * entry.multiplier,
            None => value,
        }
    }

    fn base_unit(&self, unit: &str) -> Option<String> {
        self.family(unit).map(|family| family.base_unit().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_aliases_case_insensitively() {
        let table = UnitTable::shared();
        assert_eq!(table.translate("TB", "en").as_deref(), Some("terabyte"));
        assert_eq!(table.translate("kgs.", "en").as_deref(), Some("kilogram"));
        assert_eq!(table.translate("parsec", "en"), None);
    }

    #[test]
    fn translates_localized_tokens() {
        let table = UnitTable::shared();
        assert_eq!(table.translate("Stunden", "de").as_deref(), Some("hour"));
        // falls back to the shared aliases
        assert_eq!(table.translate("km", "de").as_deref(), Some("kilometer"));
        assert_eq!(table.translate("Stunden", "en"), None);
    }

    #[test]
    fn normalizes_to_base_units() {
        let table = UnitTable::shared();
        assert_eq!(table.normalize(2.0, "kilogram"), 2000.0);
        assert_eq!(table.normalize(1.5, "meter"), 150.0);
        assert_eq!(table.normalize(3.0, "gigahertz"), 3e9);
        assert_eq!(table.normalize(7.0, "unknown"), 7.0);
        assert_eq!(table.family("hour"), Some(UnitFamily::Time));
        assert_eq!(UnitFamily::Digital.base_unit(), "byte");
        assert_eq!(table.base_unit("terabyte").as_deref(), Some("byte"));
        assert_eq!(table.translate("dm", "en").as_deref(), Some("decimeter"));
        assert_eq!(table.normalize(4.0, "decimeter"), 40.0);
    }

    fn to_base(table: &UnitTable, value: f64, token: &str) -> (f64, String) {
        let unit = table.translate(token, "en").unwrap();
        let base = table.base_unit(&unit).unwrap();
        (table.normalize(value, &unit), base)
    }

    fn assert_close(actual: (f64, String), expected: f64, base: &str) {
        assert!((actual.0 - expected).abs() < 1e-9, "{} != {expected}", actual.0);
        assert_eq!(actual.1, base);
    }

    #[test]
    fn areas_normalize_to_square_meters() {
        let table = UnitTable::shared();
        assert_eq!(to_base(table, 2.0, "km²"), (2_000_000.0, "square meter".to_string()));
        assert_eq!(to_base(table, 3.0, "Hectares"), (30_000.0, "square meter".to_string()));
        assert_eq!(to_base(table, 1.0, "sq mi"), (2_589_988.11, "square meter".to_string()));
        assert_eq!(table.family("square meter"), Some(UnitFamily::Area));
    }

    #[test]
    fn volumes_normalize_to_milliliters() {
        let table = UnitTable::shared();
        assert_eq!(to_base(table, 500.0, "ml"), (500.0, "milliliter".to_string()));
        assert_eq!(to_base(table, 1.5, "L"), (1_500.0, "milliliter".to_string()));
        assert_eq!(to_base(table, 2.0, "cups"), (473.176, "milliliter".to_string()));
        assert_eq!(table.translate("fl. oz.", "en").as_deref(), Some("fluid ounce"));
        assert_eq!(table.translate("Liter", "de").as_deref(), Some("liter"));
    }

    #[test]
    fn power_normalizes_to_horsepower() {
        let table = UnitTable::shared();
        assert_eq!(to_base(table, 150.0, "hp"), (150.0, "horsepower".to_string()));
        assert_close(to_base(table, 100.0, "kW"), 134.1, "horsepower");
        assert_eq!(table.translate("PS", "de").as_deref(), Some("horsepower"));
    }

    #[test]
    fn speed_normalizes_to_kilometers_per_hour() {
        let table = UnitTable::shared();
        assert_close(to_base(table, 100.0, "mph"), 160.9344, "kilometer per hour");
        assert_eq!(to_base(table, 80.0, "km/h"), (80.0, "kilometer per hour".to_string()));
    }

    #[test]
    fn torque_normalizes_to_newton_meters() {
        let table = UnitTable::shared();
        assert_close(to_base(table, 100.0, "lb-ft"), 135.581_795_2, "newton meter");
        assert_eq!(to_base(table, 350.0, "Nm"), (350.0, "newton meter".to_string()));
    }
}
