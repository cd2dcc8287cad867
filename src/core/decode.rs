//! Purpose: Key-based typed extraction from classified values.
//! Exports: `Decodable`, `FromData`, `GetChecked`, `describe`.
//! Role: Closed set of coercion strategies selected by the requested type.
//! Invariants: Non-dictionary receivers report `MissingKey`, never a shape error.
//! Invariants: Failures are returned, never logged-and-continued; only `decode_or` substitutes.
//! Notes: Date coercion failures surface as `IncorrectType` by contract.
use std::borrow::Cow;

use serde_json::Value;
use time::OffsetDateTime;

use crate::core::date::parse_timestamp;
use crate::core::error::DecodeError;
use crate::core::value::Data;

/// A target type the decode engine knows how to coerce a raw value into.
pub trait Decodable: Sized {
    fn from_raw(raw: &Value) -> Option<Self>;

    /// Human-readable name reported as `expected` in `IncorrectType`.
    fn descriptor() -> Cow<'static, str>;
}

/// Records built from a classified value (entity models and the like).
pub trait FromData: Sized {
    fn from_data(data: &Data) -> Result<Self, DecodeError>;
}

/// Runtime descriptor of a raw value, reported as `actual` in `IncorrectType`.
pub fn describe(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(number) if number.is_f64() => "Double",
        Value::Number(number) if number.is_i64() => "Int",
        Value::Number(_) => "UInt64",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Dictionary",
    }
}

impl Decodable for String {
    fn from_raw(raw: &Value) -> Option<Self> {
        raw.as_str().map(str::to_string)
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("String")
    }
}

impl Decodable for bool {
    fn from_raw(raw: &Value) -> Option<Self> {
        raw.as_bool()
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("Bool")
    }
}

impl Decodable for i64 {
    fn from_raw(raw: &Value) -> Option<Self> {
        raw.as_i64()
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("Int")
    }
}

impl Decodable for u64 {
    fn from_raw(raw: &Value) -> Option<Self> {
        raw.as_u64()
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("UInt64")
    }
}

macro_rules! narrow_integer {
    ($ty:ty, $wide:ty, $name:literal) => {
        impl Decodable for $ty {
            fn from_raw(raw: &Value) -> Option<Self> {
                <$wide>::from_raw(raw).and_then(|wide| <$ty>::try_from(wide).ok())
            }

            fn descriptor() -> Cow<'static, str> {
                Cow::Borrowed($name)
            }
        }
    };
}

narrow_integer!(i32, i64, "Int32");
narrow_integer!(u32, u64, "UInt32");
narrow_integer!(usize, u64, "UInt");

// Integers are accepted only when they survive the round trip through `f64`.
impl Decodable for f64 {
    fn from_raw(raw: &Value) -> Option<Self> {
        let Value::Number(number) = raw else {
            return None;
        };
        if let Some(int) = number.as_i64() {
            let wide = int as f64;
            return (wide as i128 == i128::from(int)).then_some(wide);
        }
        if let Some(uint) = number.as_u64() {
            let wide = uint as f64;
            return (wide as i128 == i128::from(uint)).then_some(wide);
        }
        number.as_f64()
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("Double")
    }
}

impl Decodable for f32 {
    fn from_raw(raw: &Value) -> Option<Self> {
        let wide = f64::from_raw(raw)?;
        let narrow = wide as f32;
        (f64::from(narrow) == wide).then_some(narrow)
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("Float")
    }
}

impl Decodable for Value {
    fn from_raw(raw: &Value) -> Option<Self> {
        Some(raw.clone())
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("Any")
    }
}

impl Decodable for Data {
    fn from_raw(raw: &Value) -> Option<Self> {
        Some(Data::classify(raw))
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("Data")
    }
}

impl Decodable for OffsetDateTime {
    fn from_raw(raw: &Value) -> Option<Self> {
        parse_timestamp(raw.as_str()?)
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("Date")
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn from_raw(raw: &Value) -> Option<Self> {
        raw.as_array()?.iter().map(T::from_raw).collect()
    }

    fn descriptor() -> Cow<'static, str> {
        Cow::Owned(format!("Array<{}>", T::descriptor()))
    }
}

impl Data {
    pub fn decode<T: Decodable>(&self, key: &str) -> Result<T, DecodeError> {
        let raw = self.raw(key).ok_or_else(|| DecodeError::missing_key(key))?;
        T::from_raw(raw)
            .ok_or_else(|| DecodeError::incorrect_type(key, T::descriptor(), describe(raw)))
    }

    pub fn decode_or<T: Decodable>(&self, key: &str, fallback: T) -> T {
        match self.decode(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(key, error = %err, "decode fell back to default");
                fallback
            }
        }
    }

    pub fn decode_with<U, T, F>(&self, key: &str, transform: F) -> Result<T, DecodeError>
    where
        U: Decodable,
        F: FnOnce(U) -> Option<T>,
    {
        let underlying = self.decode::<U>(key)?;
        transform(underlying).ok_or_else(|| DecodeError::couldnt_transform(key))
    }

    /// Absent keys and JSON null decode to `None`; mismatched types still fail.
    pub fn decode_optional<T: Decodable>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.raw(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.decode(key).map(Some),
        }
    }

    pub fn decode_model<T: FromData>(&self, key: &str) -> Result<T, DecodeError> {
        let nested = self.decode::<Data>(key)?;
        T::from_data(&nested)
    }

    /// Decode a sequence of records; the first failing element aborts.
    pub fn decode_models<T: FromData>(&self, key: &str) -> Result<Vec<T>, DecodeError> {
        let nested = self.decode::<Vec<Data>>(key)?;
        nested.iter().map(T::from_data).collect()
    }
}

/// Positional access that reports `OutOfBounds` instead of returning `None`.
pub trait GetChecked<T> {
    fn get_checked(&self, index: usize) -> Result<&T, DecodeError>;
}

impl<T> GetChecked<T> for [T] {
    fn get_checked(&self, index: usize) -> Result<&T, DecodeError> {
        self.get(index).ok_or(DecodeError::OutOfBounds {
            index,
            len: self.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Decodable, FromData, GetChecked, describe};
    use crate::core::error::DecodeError;
    use crate::core::value::Data;
    use serde_json::{Value, json};
    use time::OffsetDateTime;

    #[derive(Debug, PartialEq)]
    struct Area {
        area_id: String,
        floor: Option<i64>,
    }

    impl FromData for Area {
        fn from_data(data: &Data) -> Result<Self, DecodeError> {
            Ok(Self {
                area_id: data.decode("area_id")?,
                floor: data.decode_optional("floor")?,
            })
        }
    }

    #[test]
    fn matching_type_is_identity() {
        let data = Data::new(json!({"key": "value", "n": 7, "ok": true}));
        assert_eq!(data.decode::<String>("key"), Ok("value".to_string()));
        assert_eq!(data.decode::<i64>("n"), Ok(7));
        assert_eq!(data.decode::<bool>("ok"), Ok(true));
        assert_eq!(data.decode::<Value>("n"), Ok(json!(7)));
    }

    #[test]
    fn missing_key_regardless_of_shape() {
        for data in [
            Data::Empty,
            Data::new(json!({})),
            Data::new(json!({"key": "value"})),
            Data::new(json!([{"missing": 1}])),
        ] {
            assert_eq!(
                data.decode::<String>("missing"),
                Err(DecodeError::missing_key("missing"))
            );
        }
    }

    #[test]
    fn mismatch_reports_descriptors() {
        let data = Data::new(json!({"key": false, "ratio": 0.5}));
        assert_eq!(
            data.decode::<String>("key"),
            Err(DecodeError::incorrect_type("key", "String", "Bool"))
        );
        assert_eq!(
            data.decode::<i64>("ratio"),
            Err(DecodeError::incorrect_type("ratio", "Int", "Double"))
        );
    }

    #[test]
    fn integers_widen_to_floats_but_not_back() {
        let data = Data::new(json!({"n": 3, "big": 5_000_000_000u64, "neg": -1}));
        assert_eq!(data.decode::<f64>("n"), Ok(3.0));
        assert_eq!(data.decode::<i32>("n"), Ok(3));
        assert_eq!(
            data.decode::<i32>("big"),
            Err(DecodeError::incorrect_type("big", "Int32", "Int"))
        );
        assert_eq!(
            data.decode::<u32>("neg"),
            Err(DecodeError::incorrect_type("neg", "UInt32", "Int"))
        );
    }

    #[test]
    fn floats_reject_lossy_numbers() {
        let data = Data::new(json!({
            "exact": 9_007_199_254_740_992u64,
            "above": 9_007_199_254_740_993u64,
            "max": u64::MAX,
            "min": i64::MIN,
            "tenth": 0.1,
            "half": 0.5,
            "n": 3,
        }));
        assert_eq!(data.decode::<f64>("exact"), Ok(9_007_199_254_740_992.0));
        assert_eq!(
            data.decode::<f64>("above"),
            Err(DecodeError::incorrect_type("above", "Double", "Int"))
        );
        assert_eq!(
            data.decode::<f64>("max"),
            Err(DecodeError::incorrect_type("max", "Double", "UInt64"))
        );
        assert_eq!(data.decode::<f64>("min"), Ok(-9_223_372_036_854_775_808.0));
        assert_eq!(data.decode::<f64>("tenth"), Ok(0.1));
        assert_eq!(
            data.decode::<f32>("tenth"),
            Err(DecodeError::incorrect_type("tenth", "Float", "Double"))
        );
        assert_eq!(data.decode::<f32>("half"), Ok(0.5));
        assert_eq!(data.decode::<f32>("n"), Ok(3.0));
    }

    #[test]
    fn usize_accepts_non_negative_integers() {
        let data = Data::new(json!({"count": 12, "neg": -3}));
        assert_eq!(data.decode::<usize>("count"), Ok(12));
        assert_eq!(
            data.decode::<usize>("neg"),
            Err(DecodeError::incorrect_type("neg", "UInt", "Int"))
        );
    }

    #[test]
    fn unsigned_beyond_i64_has_distinct_descriptor() {
        let data = Data::new(json!({"max": u64::MAX}));
        assert_eq!(
            data.decode::<i64>("max"),
            Err(DecodeError::incorrect_type("max", "Int", "UInt64"))
        );
        assert_eq!(data.decode::<u64>("max"), Ok(u64::MAX));
    }

    #[test]
    fn nested_dictionary_decodes_as_data() {
        let data = Data::new(json!({"key": {"value": true}}));
        let inner: Data = data.decode("key").expect("decode");
        assert_eq!(inner.raw("value"), Some(&Value::Bool(true)));
    }

    #[test]
    fn scalar_decodes_as_empty_data() {
        let data = Data::new(json!({"key": 12}));
        assert_eq!(data.decode::<Data>("key"), Ok(Data::Empty));
    }

    #[test]
    fn sequence_of_data_requires_array() {
        let data = Data::new(json!({"items": [{"inner": 1}, {"inner": 2}], "one": {"inner": 1}}));
        let items: Vec<Data> = data.decode("items").expect("decode");
        assert_eq!(items.get_checked(0).and_then(|d| d.decode::<i64>("inner")), Ok(1));
        assert_eq!(items.get_checked(1).and_then(|d| d.decode::<i64>("inner")), Ok(2));
        assert_eq!(
            data.decode::<Vec<Data>>("one"),
            Err(DecodeError::incorrect_type("one", "Array<Data>", "Dictionary"))
        );
    }

    #[test]
    fn typed_sequence_fails_on_any_bad_element() {
        let data = Data::new(json!({"names": ["a", "b"], "mixed": ["a", 1]}));
        assert_eq!(
            data.decode::<Vec<String>>("names"),
            Ok(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            data.decode::<Vec<String>>("mixed"),
            Err(DecodeError::incorrect_type("mixed", "Array<String>", "Array"))
        );
    }

    #[test]
    fn date_failures_are_incorrect_type() {
        let data = Data::new(json!({"at": "2021-02-20", "n": 4}));
        assert_eq!(
            data.decode::<OffsetDateTime>("at"),
            Err(DecodeError::incorrect_type("at", "Date", "String"))
        );
        assert_eq!(
            data.decode::<OffsetDateTime>("n"),
            Err(DecodeError::incorrect_type("n", "Date", "Int"))
        );
    }

    #[test]
    fn transform_result_or_couldnt_transform() {
        let data = Data::new(json!({"name": "zacwest"}));
        let count = data.decode_with("name", |name: String| Some(name.chars().count()));
        assert_eq!(count, Ok(7));

        let declined = data.decode_with("name", |_: String| None::<usize>);
        assert_eq!(declined, Err(DecodeError::couldnt_transform("name")));

        let wrong = data.decode_with("name", |n: i64| Some(n + 1));
        assert_eq!(wrong, Err(DecodeError::incorrect_type("name", "Int", "String")));
    }

    #[test]
    fn fallback_never_fails() {
        let data = Data::new(json!({"name": "zacwest"}));
        assert_eq!(data.decode_or("name", 3i64), 3);
        assert_eq!(data.decode_or("missing", 3i64), 3);
        assert_eq!(data.decode_or("name", "other".to_string()), "zacwest");
        assert_eq!(Data::new(json!([])).decode_or("name", 3i64), 3);
    }

    #[test]
    fn optional_distinguishes_null_from_mismatch() {
        let data = Data::new(json!({"a": null, "b": "x"}));
        assert_eq!(data.decode_optional::<String>("a"), Ok(None));
        assert_eq!(data.decode_optional::<String>("zzz"), Ok(None));
        assert_eq!(data.decode_optional::<String>("b"), Ok(Some("x".to_string())));
        assert_eq!(
            data.decode_optional::<i64>("b"),
            Err(DecodeError::incorrect_type("b", "Int", "String"))
        );
    }

    #[test]
    fn models_decode_in_order_and_abort_on_failure() {
        let data = Data::new(json!({
            "areas": [{"area_id": "kitchen", "floor": 1}, {"area_id": "attic"}],
            "broken": [{"area_id": "den"}, {"floor": 2}],
            "primary": {"area_id": "hall"},
        }));
        let areas: Vec<Area> = data.decode_models("areas").expect("areas");
        assert_eq!(
            areas,
            vec![
                Area {
                    area_id: "kitchen".to_string(),
                    floor: Some(1)
                },
                Area {
                    area_id: "attic".to_string(),
                    floor: None
                },
            ]
        );
        assert_eq!(
            data.decode_models::<Area>("broken"),
            Err(DecodeError::missing_key("area_id"))
        );
        let primary: Area = data.decode_model("primary").expect("primary");
        assert_eq!(primary.area_id, "hall");
    }

    #[test]
    fn get_checked_reports_bounds() {
        let items = [1, 2, 3];
        assert_eq!(items.get_checked(2), Ok(&3));
        assert_eq!(
            items.get_checked(3),
            Err(DecodeError::OutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn descriptors() {
        assert_eq!(describe(&json!(null)), "Null");
        assert_eq!(describe(&json!(1)), "Int");
        assert_eq!(describe(&json!(1.25)), "Double");
        assert_eq!(describe(&json!({})), "Dictionary");
        assert_eq!(Vec::<Vec<i64>>::descriptor(), "Array<Array<Int>>");
    }
}
