use super::{Element, Kind, Sealed};
use crate::error::ValueError;
use reqwest::Url;
use serde_json::Value as JsonValue;
use std::net::{IpAddr, Ipv4Addr};

impl Sealed for IpAddr {}

impl Kind for IpAddr {
    const TYPE: &'static str = "ip";

    fn parse(text: &str) -> Result<Self, ValueError> {
        text.parse().map_err(|e| ValueError::new(Self::TYPE, text, e))
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn zero() -> Self {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    }
}

impl Element for IpAddr {
    const SEQ_TYPE: &'static str = "ips";

    fn from_json(value: &JsonValue) -> Result<Self, ValueError> {
        let text = value
            .as_str()
            .ok_or_else(|| {
                ValueError::new(Self::SEQ_TYPE, value.to_string(), "expected an address string")
            })?;
        text.parse().map_err(|e| ValueError::new(Self::SEQ_TYPE, text, e))
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::String(self.to_string())
    }
}

/// `None` is an unset URL; empty text resets to it
impl Sealed for Option<Url> {}

impl Kind for Option<Url> {
    const TYPE: &'static str = "url";

    fn parse(text: &str) -> Result<Self, ValueError> {
        if text.is_empty() {
            return Ok(None);
        }
        Url::parse(text)
            .map(Some)
            .map_err(|e| ValueError::new(Self::TYPE, text, e))
    }

    fn render(&self) -> String {
        self.as_ref().map(Url::to_string).unwrap_or_default()
    }

    fn zero() -> Self {
        None
    }
}
