use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output language of the API. Selects between the two parallel field sets
/// (`NAME_OF_TIME_SERIES_J` vs `NAME_OF_TIME_SERIES`, etc.) in responses.
/// There is no fallback between languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Lang {
    #[default]
    Jp,
    En,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Jp => "jp",
            Lang::En => "en",
        }
    }
}

impl std::str::FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jp" => Ok(Lang::Jp),
            "en" => Ok(Lang::En),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}

/// Observation frequency of a series. Required for hierarchical queries.
///
/// Weekly series carry an optional day-of-week variant (`W1`..`W7`,
/// Monday through Sunday) as documented by the API manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    CalendarYear,
    FiscalYear,
    CalendarHalfYear,
    FiscalHalfYear,
    Quarterly,
    Monthly,
    Weekly(Option<u8>),
    Daily,
}

impl Frequency {
    /// Parse a frequency code, case-insensitively.
    pub fn parse(code: &str) -> Result<Self, Error> {
        let c = code.trim().to_ascii_uppercase();
        match c.as_str() {
            "CY" => Ok(Frequency::CalendarYear),
            "FY" => Ok(Frequency::FiscalYear),
            "CH" => Ok(Frequency::CalendarHalfYear),
            "FH" => Ok(Frequency::FiscalHalfYear),
            "Q" => Ok(Frequency::Quarterly),
            "M" => Ok(Frequency::Monthly),
            "W" => Ok(Frequency::Weekly(None)),
            "D" => Ok(Frequency::Daily),
            _ => {
                if let Some(day) = c.strip_prefix('W') {
                    if let Ok(d @ 1..=7) = day.parse::<u8>() {
                        return Ok(Frequency::Weekly(Some(d)));
                    }
                }
                Err(Error::UnknownFrequency(code.to_string()))
            }
        }
    }

    /// The code sent as the `frequency` query parameter.
    pub fn to_query_param(&self) -> String {
        match self {
            Frequency::CalendarYear => "CY".into(),
            Frequency::FiscalYear => "FY".into(),
            Frequency::CalendarHalfYear => "CH".into(),
            Frequency::FiscalHalfYear => "FH".into(),
            Frequency::Quarterly => "Q".into(),
            Frequency::Monthly => "M".into(),
            Frequency::Weekly(None) => "W".into(),
            Frequency::Weekly(Some(d)) => format!("W{}", d),
            Frequency::Daily => "D".into(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Frequency::CalendarYear => "calendar year",
            Frequency::FiscalYear => "fiscal year",
            Frequency::CalendarHalfYear => "calendar half-year",
            Frequency::FiscalHalfYear => "fiscal half-year",
            Frequency::Quarterly => "quarterly",
            Frequency::Monthly => "monthly",
            Frequency::Weekly(_) => "weekly",
            Frequency::Daily => "daily",
        }
    }
}

/// One component of a hierarchical filter path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPart {
    /// Wildcard `*`, matching every position at that depth.
    Any,
    /// A concrete 1-based position.
    Index(u32),
}

/// A hierarchical filter path of 1-5 components, e.g. `"1,*,1"`.
///
/// Order is significant; trailing components may be omitted and are treated
/// as wildcards by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec(Vec<LayerPart>);

impl LayerSpec {
    pub const MAX_DEPTH: usize = 5;

    pub fn parts(&self) -> &[LayerPart] {
        &self.0
    }

    pub fn to_query_param(&self) -> String {
        self.0
            .iter()
            .map(|p| match p {
                LayerPart::Any => "*".to_string(),
                LayerPart::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::str::FromStr for LayerSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let invalid = |reason| Error::InvalidLayer {
            spec: s.to_string(),
            reason,
        };
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.iter().all(|p| p.is_empty()) {
            return Err(invalid("at least one component is required"));
        }
        if parts.len() > Self::MAX_DEPTH {
            return Err(invalid("at most 5 components are allowed"));
        }
        let mut out = Vec::with_capacity(parts.len());
        for part in parts {
            if part == "*" {
                out.push(LayerPart::Any);
            } else {
                match part.parse::<u32>() {
                    Ok(i) if i > 0 => out.push(LayerPart::Index(i)),
                    _ => return Err(invalid("components must be positive integers or `*`")),
                }
            }
        }
        Ok(LayerSpec(out))
    }
}

impl std::fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_param())
    }
}

/// The envelope of one physical API response (one result page).
///
/// `STATUS` is sometimes serialized as a string, sometimes as a number;
/// accept both and normalize to `u32`. `NEXTPOSITION`, when present, is the
/// continuation token to feed into the next request's `startPosition`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "STATUS", deserialize_with = "de_u32_from_string_or_number")]
    pub status: u32,
    #[serde(rename = "MESSAGEID", default)]
    pub message_id: Option<String>,
    #[serde(rename = "MESSAGE", default)]
    pub message: Option<String>,
    #[serde(rename = "RESULTSET", default)]
    pub result_set: Vec<Value>,
    #[serde(
        rename = "NEXTPOSITION",
        default,
        deserialize_with = "de_opt_string_from_string_or_number"
    )]
    pub next_position: Option<String>,
}

/// Raw per-series block of the code/layer endpoints. Both language field sets
/// are captured; [`Lang`] selects one during normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesBlock {
    #[serde(rename = "SERIES_CODE")]
    pub series_code: String,
    #[serde(rename = "NAME_OF_TIME_SERIES_J", default)]
    pub name_jp: Option<String>,
    #[serde(rename = "NAME_OF_TIME_SERIES", default)]
    pub name_en: Option<String>,
    #[serde(rename = "UNIT_J", default)]
    pub unit_jp: Option<String>,
    #[serde(rename = "UNIT", default)]
    pub unit_en: Option<String>,
    #[serde(rename = "FREQUENCY", default)]
    pub frequency: Option<String>,
    #[serde(rename = "CATEGORY_J", default)]
    pub category_jp: Option<String>,
    #[serde(rename = "CATEGORY", default)]
    pub category_en: Option<String>,
    #[serde(rename = "LAST_UPDATE", default)]
    pub last_update: Option<String>,
    #[serde(rename = "VALUES", default)]
    pub values: Option<ValuesBlock>,
}

/// The nested date/value arrays of one series block. The two arrays are
/// positional: `values[i]` is the observation for `survey_dates[i]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValuesBlock {
    #[serde(rename = "SURVEY_DATES", default)]
    pub survey_dates: Vec<Value>,
    #[serde(rename = "VALUES", default)]
    pub values: Vec<Value>,
}

/// Raw per-series block of the metadata endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataBlock {
    #[serde(rename = "SERIES_CODE")]
    pub series_code: String,
    #[serde(rename = "NAME_OF_TIME_SERIES_J", default)]
    pub name_jp: Option<String>,
    #[serde(rename = "NAME_OF_TIME_SERIES", default)]
    pub name_en: Option<String>,
    #[serde(rename = "UNIT_J", default)]
    pub unit_jp: Option<String>,
    #[serde(rename = "UNIT", default)]
    pub unit_en: Option<String>,
    #[serde(rename = "FREQUENCY", default)]
    pub frequency: Option<String>,
    #[serde(rename = "CATEGORY_J", default)]
    pub category_jp: Option<String>,
    #[serde(rename = "CATEGORY", default)]
    pub category_en: Option<String>,
    #[serde(rename = "LAYER1", default, deserialize_with = "de_opt_u32")]
    pub layer1: Option<u32>,
    #[serde(rename = "LAYER2", default, deserialize_with = "de_opt_u32")]
    pub layer2: Option<u32>,
    #[serde(rename = "LAYER3", default, deserialize_with = "de_opt_u32")]
    pub layer3: Option<u32>,
    #[serde(rename = "LAYER4", default, deserialize_with = "de_opt_u32")]
    pub layer4: Option<u32>,
    #[serde(rename = "LAYER5", default, deserialize_with = "de_opt_u32")]
    pub layer5: Option<u32>,
    #[serde(rename = "START_OF_THE_TIME_SERIES", default)]
    pub start: Option<String>,
    #[serde(rename = "END_OF_THE_TIME_SERIES", default)]
    pub end: Option<String>,
    #[serde(rename = "LAST_UPDATE", default)]
    pub last_update: Option<String>,
    #[serde(rename = "NOTES_J", default)]
    pub notes_jp: Option<String>,
    #[serde(rename = "NOTES", default)]
    pub notes_en: Option<String>,
}

/// Tidy observation row (one row = one series x date pair).
///
/// `date` keeps the server's raw period string; its format depends on the
/// series frequency (`YYYYMM`, `YYYYQQ`, `YYYYHH`, or `YYYY`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservationRow {
    pub series_code: String,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    pub last_update: Option<String>,
    pub date: String,
    /// `None` when the server sends a non-numeric placeholder.
    pub value: Option<f64>,
}

/// One series descriptor from the metadata endpoint (not date-expanded).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataRow {
    pub series_code: String,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    pub layer1: Option<u32>,
    pub layer2: Option<u32>,
    pub layer3: Option<u32>,
    pub layer4: Option<u32>,
    pub layer5: Option<u32>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub last_update: Option<String>,
    pub notes: Option<String>,
}

/// Flatten the `RESULTSET` of a code/layer response into tidy rows.
///
/// Each series block expands into one row per (date, value) pair. A length
/// mismatch between the two arrays signals a server contract violation and
/// fails the whole call with [`Error::MalformedSeries`] rather than silently
/// truncating. An empty result set yields an empty vector.
pub fn normalize_observations(
    result_set: &[Value],
    lang: Lang,
) -> Result<Vec<ObservationRow>, Error> {
    let mut out = Vec::new();
    for raw in result_set {
        let block: SeriesBlock = serde_json::from_value(raw.clone())?;
        let values = block.values.unwrap_or_default();
        if values.survey_dates.len() != values.values.len() {
            return Err(Error::MalformedSeries {
                code: block.series_code,
                dates: values.survey_dates.len(),
                values: values.values.len(),
            });
        }
        let (name, unit, category) = match lang {
            Lang::Jp => (block.name_jp, block.unit_jp, block.category_jp),
            Lang::En => (block.name_en, block.unit_en, block.category_en),
        };
        out.reserve(values.values.len());
        for (date, value) in values.survey_dates.iter().zip(values.values.iter()) {
            out.push(ObservationRow {
                series_code: block.series_code.clone(),
                name: name.clone(),
                unit: unit.clone(),
                frequency: block.frequency.clone(),
                category: category.clone(),
                last_update: block.last_update.clone(),
                date: date_to_string(date),
                value: value_to_f64(&block.series_code, value),
            });
        }
    }
    Ok(out)
}

/// Flatten the `RESULTSET` of a metadata response, one row per series.
pub fn normalize_metadata(result_set: &[Value], lang: Lang) -> Result<Vec<MetadataRow>, Error> {
    let mut out = Vec::with_capacity(result_set.len());
    for raw in result_set {
        let block: MetadataBlock = serde_json::from_value(raw.clone())?;
        let (name, unit, category, notes) = match lang {
            Lang::Jp => (
                block.name_jp,
                block.unit_jp,
                block.category_jp,
                block.notes_jp,
            ),
            Lang::En => (
                block.name_en,
                block.unit_en,
                block.category_en,
                block.notes_en,
            ),
        };
        out.push(MetadataRow {
            series_code: block.series_code,
            name,
            unit,
            frequency: block.frequency,
            category,
            layer1: block.layer1,
            layer2: block.layer2,
            layer3: block.layer3,
            layer4: block.layer4,
            layer5: block.layer5,
            start: block.start,
            end: block.end,
            last_update: block.last_update,
            notes,
        });
    }
    Ok(out)
}

/// Survey dates arrive as strings but have been observed as bare numbers;
/// keep the raw textual form either way.
fn date_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Convert one raw value to `f64`. Non-numeric placeholders (suspended
/// observations etc.) become `None` and are logged, never an error.
fn value_to_f64(series_code: &str, v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(x) => Some(x),
            Err(_) => {
                log::warn!(
                    "series {}: non-numeric value {:?}, recording as missing",
                    series_code,
                    s
                );
                None
            }
        },
        Value::Null => None,
        other => {
            log::warn!(
                "series {}: unexpected value {}, recording as missing",
                series_code,
                other
            );
            None
        }
    }
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as u32)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative value for u32"));
            }
            Ok(v as u32)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// Serde helper: continuation tokens arrive as either a number or a string;
/// normalize to the textual token passed back as `startPosition`.
fn de_opt_string_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct TokenVisitor;

    impl<'de> Visitor<'de> for TokenVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "an optional string or number continuation token")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: serde::Deserializer<'de>,
        {
            struct Inner;
            impl<'de> Visitor<'de> for Inner {
                type Value = Option<String>;

                fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "a string or number continuation token")
                }

                fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                    Ok(Some(v.to_string()))
                }

                fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                    Ok(Some(v.to_string()))
                }

                fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
                    let t = s.trim();
                    if t.is_empty() {
                        Ok(None)
                    } else {
                        Ok(Some(t.to_string()))
                    }
                }

                fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                    Ok(None)
                }
            }
            deserializer.deserialize_any(Inner)
        }
    }

    deserializer.deserialize_option(TokenVisitor)
}

/// Serde helper: layer positions arrive as numbers, numeric strings, empty
/// strings, or are missing entirely. Empty means absent.
fn de_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct OptU32Visitor;

    impl<'de> Visitor<'de> for OptU32Visitor {
        type Value = Option<u32>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "an optional string or integer layer position")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: serde::Deserializer<'de>,
        {
            struct Inner;
            impl<'de> Visitor<'de> for Inner {
                type Value = Option<u32>;

                fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "a string or integer layer position")
                }

                fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                    Ok(Some(v as u32))
                }

                fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                    if v < 0 {
                        return Err(E::custom("negative layer position"));
                    }
                    Ok(Some(v as u32))
                }

                fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
                    let t = s.trim();
                    if t.is_empty() {
                        return Ok(None);
                    }
                    t.parse::<u32>().map(Some).map_err(E::custom)
                }

                fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                    Ok(None)
                }
            }
            deserializer.deserialize_any(Inner)
        }
    }

    deserializer.deserialize_option(OptU32Visitor)
}
