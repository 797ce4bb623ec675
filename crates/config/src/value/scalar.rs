use super::{Element, Kind, Sealed};
use crate::error::ValueError;
use serde_json::Value as JsonValue;
use std::time::Duration;

impl Sealed for bool {}

impl Kind for bool {
    const TYPE: &'static str = "bool";

    fn parse(text: &str) -> Result<Self, ValueError> {
        // An empty text is a bare flag and reads as true.
        match text.to_lowercase().as_str() {
            "" | "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ValueError::new(
                Self::TYPE,
                text,
                "expected true/false, 1/0 or yes/no",
            )),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn zero() -> Self {
        false
    }
}

impl Element for bool {
    const SEQ_TYPE: &'static str = "bools";

    fn from_json(value: &JsonValue) -> Result<Self, ValueError> {
        value
            .as_bool()
            .ok_or_else(|| ValueError::new(Self::SEQ_TYPE, value.to_string(), "expected a boolean"))
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::Bool(*self)
    }
}

macro_rules! number_kind {
    ($($ty:ty => $tag:literal, $seq:literal;)*) => {$(
        impl Sealed for $ty {}

        impl Kind for $ty {
            const TYPE: &'static str = $tag;

            fn parse(text: &str) -> Result<Self, ValueError> {
                text.parse::<$ty>().map_err(|e| ValueError::new($tag, text, e))
            }

            fn render(&self) -> String {
                self.to_string()
            }

            fn zero() -> Self {
                <$ty>::default()
            }
        }

        impl Element for $ty {
            const SEQ_TYPE: &'static str = $seq;

            fn from_json(value: &JsonValue) -> Result<Self, ValueError> {
                number_text(value, $seq)?
                    .parse::<$ty>()
                    .map_err(|e| ValueError::new($seq, value.to_string(), e))
            }

            fn to_json(&self) -> JsonValue {
                JsonValue::from(*self)
            }
        }
    )*};
}

number_kind! {
    i8 => "int8", "int8s";
    i16 => "int16", "int16s";
    i32 => "int32", "int32s";
    i64 => "int64", "int64s";
    isize => "int", "ints";
    u8 => "uint8", "uint8s";
    u16 => "uint16", "uint16s";
    u32 => "uint32", "uint32s";
    u64 => "uint64", "uint64s";
    usize => "uint", "uints";
}

macro_rules! float_kind {
    ($($ty:ty => $tag:literal, $seq:literal;)*) => {$(
        impl Sealed for $ty {}

        impl Kind for $ty {
            const TYPE: &'static str = $tag;

            fn parse(text: &str) -> Result<Self, ValueError> {
                text.parse::<$ty>().map_err(|e| ValueError::new($tag, text, e))
            }

            fn render(&self) -> String {
                self.to_string()
            }

            fn zero() -> Self {
                <$ty>::default()
            }
        }

        impl Element for $ty {
            const SEQ_TYPE: &'static str = $seq;

            fn from_json(value: &JsonValue) -> Result<Self, ValueError> {
                // Non-finite elements travel as strings ("NaN", "inf").
                let text = match value {
                    JsonValue::String(s) => s.clone(),
                    other => number_text(other, $seq)?,
                };
                text.parse::<$ty>()
                    .map_err(|e| ValueError::new($seq, value.to_string(), e))
            }

            fn to_json(&self) -> JsonValue {
                // Go through the shortest decimal text so f32 does not widen to 1.100000023841858.
                self.to_string()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or_else(|| JsonValue::String(self.to_string()))
            }
        }
    )*};
}

float_kind! {
    f32 => "float32", "floats32";
    f64 => "float64", "floats64";
}

fn number_text(value: &JsonValue, seq: &'static str) -> Result<String, ValueError> {
    match value {
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(ValueError::new(seq, other.to_string(), "expected a number")),
    }
}

impl Sealed for String {}

impl Kind for String {
    const TYPE: &'static str = "string";

    fn parse(text: &str) -> Result<Self, ValueError> {
        Ok(text.to_owned())
    }

    fn render(&self) -> String {
        self.clone()
    }

    fn zero() -> Self {
        String::new()
    }
}

impl Element for String {
    const SEQ_TYPE: &'static str = "strings";

    fn from_json(value: &JsonValue) -> Result<Self, ValueError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ValueError::new(Self::SEQ_TYPE, value.to_string(), "expected a string"))
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::String(self.clone())
    }
}

impl Sealed for Duration {}

impl Kind for Duration {
    const TYPE: &'static str = "duration";

    fn parse(text: &str) -> Result<Self, ValueError> {
        humantime::parse_duration(text).map_err(|e| ValueError::new(Self::TYPE, text, e))
    }

    fn render(&self) -> String {
        humantime::format_duration(*self).to_string()
    }

    fn zero() -> Self {
        Duration::ZERO
    }
}

impl Element for Duration {
    const SEQ_TYPE: &'static str = "durations";

    fn from_json(value: &JsonValue) -> Result<Self, ValueError> {
        let text = value
            .as_str()
            .ok_or_else(|| {
                ValueError::new(Self::SEQ_TYPE, value.to_string(), "expected a duration string")
            })?;
        humantime::parse_duration(text).map_err(|e| ValueError::new(Self::SEQ_TYPE, text, e))
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::String(self.render())
    }
}
