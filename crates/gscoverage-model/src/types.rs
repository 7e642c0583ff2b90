//! Enumerated GeoServer schema values.

use serde::{Deserialize, Serialize};

/// Sample type of a coverage dimension (GeoTools `SampleDimensionType`).
///
/// Values GeoServer does not list here are carried verbatim in
/// [`SampleType::Other`] so that newer server versions keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleType {
    #[serde(rename = "UNSIGNED_1BIT")]
    /// One-bit unsigned (bitmask).
    Unsigned1Bit,
    #[serde(rename = "UNSIGNED_2BITS")]
    /// Two-bit unsigned.
    Unsigned2Bits,
    #[serde(rename = "UNSIGNED_4BITS")]
    /// Four-bit unsigned.
    Unsigned4Bits,
    #[serde(rename = "SIGNED_8BITS")]
    /// Signed byte.
    Signed8Bits,
    #[serde(rename = "UNSIGNED_8BITS")]
    /// Unsigned byte.
    Unsigned8Bits,
    #[serde(rename = "SIGNED_16BITS")]
    /// Signed short.
    Signed16Bits,
    #[serde(rename = "UNSIGNED_16BITS")]
    /// Unsigned short.
    Unsigned16Bits,
    #[serde(rename = "SIGNED_32BITS")]
    /// Signed int.
    Signed32Bits,
    #[serde(rename = "UNSIGNED_32BITS")]
    /// Unsigned int.
    Unsigned32Bits,
    /// Default variant; NetCDF float variables.
    #[default]
    #[serde(rename = "REAL_32BITS")]
    Real32Bits,
    #[serde(rename = "REAL_64BITS")]
    /// Double precision float.
    Real64Bits,
    /// Any other sample type name.
    #[serde(untagged)]
    Other(String),
}

impl SampleType {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unsigned1Bit => "UNSIGNED_1BIT",
            Self::Unsigned2Bits => "UNSIGNED_2BITS",
            Self::Unsigned4Bits => "UNSIGNED_4BITS",
            Self::Signed8Bits => "SIGNED_8BITS",
            Self::Unsigned8Bits => "UNSIGNED_8BITS",
            Self::Signed16Bits => "SIGNED_16BITS",
            Self::Unsigned16Bits => "UNSIGNED_16BITS",
            Self::Signed32Bits => "SIGNED_32BITS",
            Self::Unsigned32Bits => "UNSIGNED_32BITS",
            Self::Real32Bits => "REAL_32BITS",
            Self::Real64Bits => "REAL_64BITS",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SampleType {
    fn from(s: &str) -> Self {
        match s {
            "UNSIGNED_1BIT" => Self::Unsigned1Bit,
            "UNSIGNED_2BITS" => Self::Unsigned2Bits,
            "UNSIGNED_4BITS" => Self::Unsigned4Bits,
            "SIGNED_8BITS" => Self::Signed8Bits,
            "UNSIGNED_8BITS" => Self::Unsigned8Bits,
            "SIGNED_16BITS" => Self::Signed16Bits,
            "UNSIGNED_16BITS" => Self::Unsigned16Bits,
            "SIGNED_32BITS" => Self::Signed32Bits,
            "UNSIGNED_32BITS" => Self::Unsigned32Bits,
            "REAL_32BITS" => Self::Real32Bits,
            "REAL_64BITS" => Self::Real64Bits,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// How the envelope of a coverage view is derived from its input coverages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnvelopeCompositionType {
    /// Envelope shared by all inputs. Default.
    #[default]
    #[serde(rename = "INTERSECTION")]
    Intersection,
    /// Envelope covering all inputs.
    #[serde(rename = "UNION")]
    Union,
}

impl EnvelopeCompositionType {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intersection => "INTERSECTION",
            Self::Union => "UNION",
        }
    }
}

impl std::fmt::Display for EnvelopeCompositionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EnvelopeCompositionType {
    /// Parse a composition type name, ignoring case. Unknown names yield
    /// `None`.
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        [Self::Intersection, Self::Union]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_keep_unknown_sample_type_verbatim() {
        let t = SampleType::from("COMPLEX_64BITS");
        assert_eq!(t, SampleType::Other("COMPLEX_64BITS".to_owned()));
        assert_eq!(t.as_str(), "COMPLEX_64BITS");
    }

    #[test]
    fn test_should_map_known_sample_type() {
        assert_eq!(SampleType::from("REAL_32BITS"), SampleType::Real32Bits);
        assert_eq!(SampleType::Real64Bits.to_string(), "REAL_64BITS");
    }

    #[test]
    fn test_should_parse_envelope_composition_ignoring_case() {
        assert_eq!(
            EnvelopeCompositionType::from_name("union"),
            Some(EnvelopeCompositionType::Union)
        );
        assert_eq!(
            EnvelopeCompositionType::from_name("Intersection"),
            Some(EnvelopeCompositionType::Intersection)
        );
        assert_eq!(EnvelopeCompositionType::default(), EnvelopeCompositionType::Intersection);
    }

    #[test]
    fn test_should_reject_unknown_envelope_composition() {
        assert_eq!(EnvelopeCompositionType::from_name("UNOIN"), None);
        assert_eq!(EnvelopeCompositionType::from_name(""), None);
    }
}
