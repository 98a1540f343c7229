//! Command decoding for the control route.
//!
//! A command is a JSON document of the shape
//! `{ "method": "<name>", "param": { ... } }`. The `param` object may be
//! omitted entirely; query commands are commonly sent without one.
//! Parameters are validated while decoding: a missing or wrong-typed field
//! is a typed error, never a silent zero.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::EnumString;

use crate::errors::Error;
use crate::types::{Color, FadeTime};

type Result<T> = std::result::Result<T, Error>;

/// The raw JSON envelope of a control command.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub method: String,
    #[serde(default)]
    pub param: Value,
}

impl CommandRequest {
    /// Decode the envelope from a request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(Error::EmptyBody);
        }
        serde_json::from_slice(body).map_err(Error::JsonLoad)
    }
}

/// Command method names understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum MethodName {
    #[strum(serialize = "set_rgbw")]
    SetRgbw,
    #[strum(serialize = "set_power")]
    SetPower,
    #[strum(serialize = "get_status")]
    GetStatus,
    #[strum(serialize = "get_info")]
    GetInfo,
}

/// Parameters of `set_rgbw`.
#[derive(Debug, Clone, Deserialize)]
pub struct RgbwParams {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub w: f32,
    #[serde(default)]
    pub time: Option<u64>,
}

impl RgbwParams {
    /// The commanded target color, clamped into the unit range.
    pub fn color(&self) -> Color {
        Color::clamped(self.r, self.g, self.b, self.w)
    }

    /// The commanded fade duration; an omitted or zero `time` falls back
    /// to the default.
    pub fn fade(&self) -> FadeTime {
        self.time.and_then(FadeTime::create).unwrap_or_default()
    }
}

/// Parameters of `set_power`.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerParams {
    pub value: bool,
}

/// A fully decoded and validated command.
///
/// # Examples
///
/// ```
/// use rgbw_strip_rs::Command;
///
/// let body = br#"{"method": "set_power", "param": {"value": true}}"#;
/// let command = Command::parse(body).unwrap();
/// assert!(matches!(command, Command::SetPower(p) if p.value));
///
/// assert!(Command::parse(br#"{"method": "frobnicate", "param": {}}"#).is_err());
/// ```
#[derive(Debug, Clone)]
pub enum Command {
    SetRgbw(RgbwParams),
    SetPower(PowerParams),
    GetStatus,
    GetInfo,
}

impl Command {
    /// Decode a request body into a command.
    ///
    /// Unrecognized method names surface as [`Error::UnknownMethod`] so the
    /// caller can answer 404 instead of treating the request as malformed.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let request = CommandRequest::parse(body)?;
        let method = MethodName::from_str(&request.method)
            .map_err(|_| Error::UnknownMethod(request.method.clone()))?;

        match method {
            MethodName::SetRgbw => serde_json::from_value(request.param)
                .map(Command::SetRgbw)
                .map_err(|e| Error::param("set_rgbw", e)),
            MethodName::SetPower => serde_json::from_value(request.param)
                .map(Command::SetPower)
                .map_err(|e| Error::param("set_power", e)),
            MethodName::GetStatus => Ok(Command::GetStatus),
            MethodName::GetInfo => Ok(Command::GetInfo),
        }
    }
}

/// Fields a command may populate in its JSON response.
///
/// Like the original firmware, all commands share one response document
/// that is filled field by field; a body goes onto the wire only when at
/// least one field was set.
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct ResponseBody {
    pub power: Option<bool>,
    pub r: Option<f32>,
    pub g: Option<f32>,
    pub b: Option<f32>,
    pub w: Option<f32>,
    pub mac: Option<String>,
}

impl ResponseBody {
    /// Create an empty response document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any field was populated.
    ///
    /// # Examples
    ///
    /// ```
    /// use rgbw_strip_rs::ResponseBody;
    ///
    /// assert!(!ResponseBody::new().is_populated());
    /// assert!(ResponseBody::info("AA:BB:CC:DD:EE:FF").is_populated());
    /// ```
    pub fn is_populated(&self) -> bool {
        self.power.is_some()
            || self.r.is_some()
            || self.g.is_some()
            || self.b.is_some()
            || self.w.is_some()
            || self.mac.is_some()
    }

    /// Build the `get_status` response from the power flag and the
    /// commanded target color.
    pub fn status(power: bool, target: &Color) -> Self {
        ResponseBody {
            power: Some(power),
            r: Some(target.red),
            g: Some(target.green),
            b: Some(target.blue),
            w: Some(target.white),
            mac: None,
        }
    }

    /// Build the `get_info` response.
    pub fn info(mac: &str) -> Self {
        ResponseBody {
            mac: Some(mac.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_rgbw_with_time() {
        let body = br#"{"method": "set_rgbw", "param": {"r": 0.5, "g": 0.2, "b": 0.0, "w": 1.0, "time": 2000}}"#;
        let Command::SetRgbw(params) = Command::parse(body).unwrap() else {
            panic!("expected set_rgbw");
        };
        assert_eq!(params.color(), Color::rgbw(0.5, 0.2, 0.0, 1.0));
        assert_eq!(params.fade().millis(), 2000);
    }

    #[test]
    fn omitted_time_uses_default_fade() {
        let body = br#"{"method": "set_rgbw", "param": {"r": 1, "g": 0, "b": 0, "w": 0}}"#;
        let Command::SetRgbw(params) = Command::parse(body).unwrap() else {
            panic!("expected set_rgbw");
        };
        assert_eq!(params.fade().millis(), 1000);
    }

    #[test]
    fn zero_time_behaves_like_omitted() {
        let body = br#"{"method": "set_rgbw", "param": {"r": 1, "g": 0, "b": 0, "w": 0, "time": 0}}"#;
        let Command::SetRgbw(params) = Command::parse(body).unwrap() else {
            panic!("expected set_rgbw");
        };
        assert_eq!(params.fade().millis(), 1000);
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        let body = br#"{"method": "set_rgbw", "param": {"r": 3.5, "g": -1, "b": 0.25, "w": 0}}"#;
        let Command::SetRgbw(params) = Command::parse(body).unwrap() else {
            panic!("expected set_rgbw");
        };
        assert_eq!(params.color(), Color::rgbw(1.0, 0.0, 0.25, 0.0));
    }

    #[test]
    fn missing_channel_is_a_param_error() {
        let body = br#"{"method": "set_rgbw", "param": {"r": 1, "g": 0, "b": 0}}"#;
        assert!(matches!(
            Command::parse(body),
            Err(Error::Param { method: "set_rgbw", .. })
        ));
    }

    #[test]
    fn wrong_typed_field_is_a_param_error() {
        let body = br#"{"method": "set_power", "param": {"value": "yes"}}"#;
        assert!(matches!(
            Command::parse(body),
            Err(Error::Param { method: "set_power", .. })
        ));
    }

    #[test]
    fn queries_accept_an_omitted_param() {
        assert!(matches!(
            Command::parse(br#"{"method": "get_status"}"#),
            Ok(Command::GetStatus)
        ));
        assert!(matches!(
            Command::parse(br#"{"method": "get_info"}"#),
            Ok(Command::GetInfo)
        ));
    }

    #[test]
    fn unknown_method_is_distinguishable() {
        assert!(matches!(
            Command::parse(br#"{"method": "frobnicate", "param": {}}"#),
            Err(Error::UnknownMethod(name)) if name == "frobnicate"
        ));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(
            Command::parse(b"{not json"),
            Err(Error::JsonLoad(_))
        ));
        assert!(matches!(Command::parse(b""), Err(Error::EmptyBody)));
    }

    #[test]
    fn empty_response_body_serializes_to_empty_object() {
        let json = serde_json::to_string(&ResponseBody::new()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn status_response_carries_all_channels() {
        let body = ResponseBody::status(true, &Color::rgbw(0.3, 0.6, 0.9, 0.0));
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"power":true,"r":0.3,"g":0.6,"b":0.9,"w":0.0}"#);
    }

    #[test]
    fn info_response_carries_only_mac() {
        let body = ResponseBody::info("AA:BB:CC:DD:EE:FF");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"mac":"AA:BB:CC:DD:EE:FF"}"#);
    }
}
