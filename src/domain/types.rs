//! Constrained value helpers used by domain entities.
//!
//! Input arriving from forms or from remote documents is normalized here once,
//! so that values held by the domain layer can be treated as trusted.

use std::fmt::{Display, Formatter};

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::ValidateEmail;

/// Errors produced when attempting to construct a constrained value.
#[derive(Debug, Error, PartialEq)]
pub enum TypeConstraintError {
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Latitude or longitude outside the valid range, or not finite.
    #[error("coordinates out of range")]
    InvalidCoordinates,
}

/// Normalizes and validates an email string.
pub fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Trims a phone number and reformats it internationally when it parses.
/// Unparseable input is kept as typed; the field is display-only.
pub fn normalize_phone<S: AsRef<str>>(phone: S) -> Option<String> {
    let trimmed = phone.as_ref().trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse(None, trimmed) {
        Ok(parsed) if phonenumber::is_valid(&parsed) => {
            Some(parsed.format().mode(Mode::International).to_string())
        }
        _ => Some(trimmed.to_string()),
    }
}

/// Strips markup from free-text input and collapses empty values to `None`.
pub fn sanitize_text<S: AsRef<str>>(text: S) -> Option<String> {
    let cleaned = ammonia::clean(text.as_ref());
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A GPS fix attached to a serve attempt.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Builds a point, rejecting non-finite or out-of-range components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TypeConstraintError> {
        if latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
        {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(TypeConstraintError::InvalidCoordinates)
        }
    }

    /// Accepts the two wire shapes coordinates occur in: a
    /// `{latitude, longitude}` object or a `"lat,lon"` string.
    /// Anything else, including out-of-range values, yields `None`.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let latitude = component(map.get("latitude").or_else(|| map.get("lat")))?;
                let longitude = component(
                    map.get("longitude")
                        .or_else(|| map.get("lng"))
                        .or_else(|| map.get("lon")),
                )?;
                Self::new(latitude, longitude).ok()
            }
            Value::String(s) => Self::parse_str(s),
            _ => None,
        }
    }

    /// Parses the serialized `"lat,lon"` form.
    pub fn parse_str(s: &str) -> Option<Self> {
        let (lat, lon) = s.split_once(',')?;
        let latitude = lat.trim().parse::<f64>().ok()?;
        let longitude = lon.trim().parse::<f64>().ok()?;
        Self::new(latitude, longitude).ok()
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

fn component(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn geo_point_accepts_object_form() {
        let point = GeoPoint::parse(&json!({"latitude": 36.15, "longitude": -95.99})).unwrap();
        assert_eq!(point.latitude, 36.15);
        assert_eq!(point.longitude, -95.99);
    }

    #[test]
    fn geo_point_accepts_string_form() {
        let point = GeoPoint::parse(&json!("36.15, -95.99")).unwrap();
        assert_eq!(point.longitude, -95.99);
    }

    #[test]
    fn geo_point_rejects_malformed_and_out_of_range() {
        assert!(GeoPoint::parse(&json!(null)).is_none());
        assert!(GeoPoint::parse(&json!("somewhere downtown")).is_none());
        assert!(GeoPoint::parse(&json!("95.0,10.0")).is_none());
        assert!(GeoPoint::parse(&json!({"latitude": 10.0, "longitude": 200.0})).is_none());
        assert!(GeoPoint::parse(&json!(42)).is_none());
    }

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(
            normalize_email(" John@Example.COM "),
            Ok("john@example.com".to_string())
        );
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn phone_falls_back_to_raw_input() {
        assert_eq!(normalize_phone("  "), None);
        assert_eq!(normalize_phone("ext. 204"), Some("ext. 204".to_string()));
    }

    #[test]
    fn sanitize_strips_markup() {
        assert_eq!(
            sanitize_text("<script>alert(1)</script>left at door"),
            Some("left at door".to_string())
        );
        assert_eq!(sanitize_text("   "), None);
    }
}
