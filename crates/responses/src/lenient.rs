// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tolerant deserializers for the node stats model.
//!
//! Logstash changes the shape of individual fields between releases (numbers
//! reported as strings, `null` placeholders, objects where a scalar used to
//! be). A mismatching leaf falls back to its default; only structural nodes
//! (objects and arrays in the model) are allowed to fail the decode.

use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

pub(crate) trait LenientNumber: Copy + Default {
    fn from_u64(v: u64) -> Option<Self>;
    fn from_i64(v: i64) -> Option<Self>;
    fn from_f64(v: f64) -> Option<Self>;

    fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(v) = s.parse::<u64>() {
            return Self::from_u64(v);
        }
        if let Ok(v) = s.parse::<i64>() {
            return Self::from_i64(v);
        }
        s.parse::<f64>().ok().and_then(Self::from_f64)
    }
}

impl LenientNumber for u64 {
    fn from_u64(v: u64) -> Option<Self> {
        Some(v)
    }

    fn from_i64(v: i64) -> Option<Self> {
        u64::try_from(v).ok()
    }

    fn from_f64(v: f64) -> Option<Self> {
        (v.is_finite() && v >= 0.0 && v <= u64::MAX as f64).then_some(v as u64)
    }
}

impl LenientNumber for i64 {
    fn from_u64(v: u64) -> Option<Self> {
        i64::try_from(v).ok()
    }

    fn from_i64(v: i64) -> Option<Self> {
        Some(v)
    }

    fn from_f64(v: f64) -> Option<Self> {
        (v.is_finite() && v >= i64::MIN as f64 && v <= i64::MAX as f64).then_some(v as i64)
    }
}

impl LenientNumber for f64 {
    fn from_u64(v: u64) -> Option<Self> {
        Some(v as f64)
    }

    fn from_i64(v: i64) -> Option<Self> {
        Some(v as f64)
    }

    fn from_f64(v: f64) -> Option<Self> {
        Some(v)
    }
}

fn skip_seq<'de, A: SeqAccess<'de>, T>(mut seq: A) -> Result<Option<T>, A::Error> {
    while seq.next_element::<IgnoredAny>()?.is_some() {}
    Ok(None)
}

fn skip_map<'de, A: MapAccess<'de>, T>(mut map: A) -> Result<Option<T>, A::Error> {
    while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
    Ok(None)
}

struct NumberVisitor<T>(PhantomData<T>);

impl<'de, T: LenientNumber> Visitor<'de> for NumberVisitor<T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(T::from_i64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(T::from_u64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(T::from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(T::from_text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        skip_seq(seq)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        skip_map(map)
    }
}

/// A number that reads as zero when the JSON value is not numeric.
pub(crate) struct Number<T>(T);

impl<'de, T: LenientNumber> Deserialize<'de> for Number<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(NumberVisitor(PhantomData))
            .map(|v: Option<T>| Number(v.unwrap_or_default()))
    }
}

pub(crate) fn number<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: LenientNumber,
{
    Number::<T>::deserialize(d).map(|n| n.0)
}

/// A map of lenient numbers. The map itself is structural.
pub(crate) fn number_map<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: LenientNumber,
{
    let map: Option<BTreeMap<String, Number<T>>> = Option::deserialize(d)?;
    Ok(map.unwrap_or_default().into_iter().map(|(k, v)| (k, v.0)).collect())
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        skip_seq(seq)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        skip_map(map)
    }
}

pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    d.deserialize_any(TextVisitor).map(Option::unwrap_or_default)
}

/// Like [`string`], but blank values read as `None`.
pub(crate) fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    d.deserialize_any(TextVisitor)
        .map(|v| v.filter(|s| !s.trim().is_empty()))
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = Option<bool>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v != 0))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v != 0))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(match v.trim() {
            s if s.eq_ignore_ascii_case("true") => Some(true),
            s if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        })
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        skip_seq(seq)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        skip_map(map)
    }
}

pub(crate) fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    d.deserialize_any(FlagVisitor).map(Option::unwrap_or_default)
}

struct ObjectVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de> + Default> Visitor<'de> for ObjectVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(T::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(T::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(MapAccessDeserializer::new(map))
    }
}

/// A structural object. `null` reads as the default value, any other
/// non-object value fails the decode.
pub(crate) fn object<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    d.deserialize_any(ObjectVisitor(PhantomData))
}

/// An object nested inside a map, read with the same rules as [`object`].
struct Structural<T>(T);

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for Structural<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        object(d).map(Structural)
    }
}

/// A structural map of structural objects. `null` values read as the
/// default object.
pub(crate) fn object_map<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let map: BTreeMap<String, Structural<T>> = object(d)?;
    Ok(map.into_iter().map(|(k, v)| (k, v.0)).collect())
}

struct ListVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ListVisitor<T> {
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        let items: Vec<Option<T>> = Vec::deserialize(SeqAccessDeserializer::new(seq))?;
        Ok(items.into_iter().flatten().collect())
    }
}

/// A structural array, with the same `null` handling as [`object`].
/// `null` elements are skipped; any other element must have the item shape.
pub(crate) fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    d.deserialize_any(ListVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Leaves {
        #[serde(deserialize_with = "number")]
        count: u64,
        #[serde(deserialize_with = "number")]
        signed: i64,
        #[serde(deserialize_with = "number")]
        ratio: f64,
        #[serde(deserialize_with = "string")]
        label: String,
        #[serde(deserialize_with = "boolean")]
        flag: bool,
        #[serde(deserialize_with = "number_map")]
        codes: BTreeMap<String, u64>,
    }

    fn leaves(json: &str) -> Leaves {
        serde_json::from_str(json).expect("leaves decode")
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let p = leaves(r#"{"count": "12", "signed": " -3 ", "ratio": "0.5"}"#);
        assert_eq!(p.count, 12);
        assert_eq!(p.signed, -3);
        assert_eq!(p.ratio, 0.5);
    }

    #[test]
    fn test_mismatched_leaves_default() {
        let p = leaves(r#"{"count": "n/a", "signed": {"nested": 1}, "ratio": [1, 2], "label": {"x": 1}, "flag": "maybe"}"#);
        assert_eq!(p.count, 0);
        assert_eq!(p.signed, 0);
        assert_eq!(p.ratio, 0.0);
        assert!(p.label.is_empty());
        assert!(!p.flag);
    }

    #[test]
    fn test_nulls_default() {
        let p = leaves(r#"{"count": null, "ratio": null, "label": null, "flag": null, "codes": null}"#);
        assert_eq!(p.count, 0);
        assert_eq!(p.ratio, 0.0);
        assert!(p.label.is_empty());
        assert!(p.codes.is_empty());
    }

    #[test]
    fn test_negative_into_unsigned_defaults() {
        assert_eq!(leaves(r#"{"count": -1}"#).count, 0);
        assert_eq!(leaves(r#"{"count": 7.9}"#).count, 7);
    }

    #[test]
    fn test_scalars_stringify() {
        assert_eq!(leaves(r#"{"label": 8}"#).label, "8");
        assert_eq!(leaves(r#"{"label": true}"#).label, "true");
    }

    #[test]
    fn test_number_map_values_are_lenient() {
        let p = leaves(r#"{"codes": {"200": 10, "429": "3", "500": null}}"#);
        assert_eq!(p.codes.get("200"), Some(&10));
        assert_eq!(p.codes.get("429"), Some(&3));
        assert_eq!(p.codes.get("500"), Some(&0));
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Outer {
        #[serde(deserialize_with = "object")]
        inner: Inner,
        #[serde(deserialize_with = "list")]
        items: Vec<Inner>,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Inner {
        #[serde(deserialize_with = "number")]
        a: u64,
    }

    #[test]
    fn test_structural_nodes_accept_null() {
        let outer: Outer = serde_json::from_str(r#"{"inner": null, "items": null}"#).expect("nulls decode");
        assert_eq!(outer, Outer::default());
    }

    #[test]
    fn test_structural_nodes_reject_wrong_shape() {
        assert!(serde_json::from_str::<Outer>(r#"{"inner": [1]}"#).is_err());
        assert!(serde_json::from_str::<Outer>(r#"{"inner": 3}"#).is_err());
        assert!(serde_json::from_str::<Outer>(r#"{"items": {"a": 1}}"#).is_err());
    }

    #[test]
    fn test_structural_nodes_decode_contents() {
        let outer: Outer = serde_json::from_str(r#"{"inner": {"a": "4"}, "items": [{"a": 1}, {}]}"#).expect("decodes");
        assert_eq!(outer.inner.a, 4);
        assert_eq!(outer.items, vec![Inner { a: 1 }, Inner { a: 0 }]);
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Keyed {
        #[serde(deserialize_with = "object_map")]
        entries: BTreeMap<String, Inner>,
    }

    #[test]
    fn test_null_map_values_read_as_default() {
        let keyed: Keyed = serde_json::from_str(r#"{"entries": {"x": null, "y": {"a": 2}}}"#).expect("decodes");
        assert_eq!(keyed.entries.get("x"), Some(&Inner::default()));
        assert_eq!(keyed.entries.get("y"), Some(&Inner { a: 2 }));
    }

    #[test]
    fn test_object_map_shapes() {
        let keyed: Keyed = serde_json::from_str(r#"{"entries": null}"#).expect("null map decodes");
        assert!(keyed.entries.is_empty());
        assert!(serde_json::from_str::<Keyed>(r#"{"entries": [1]}"#).is_err());
        assert!(serde_json::from_str::<Keyed>(r#"{"entries": {"x": 3}}"#).is_err());
    }

    #[test]
    fn test_null_list_elements_are_skipped() {
        let outer: Outer = serde_json::from_str(r#"{"items": [null, {"a": 1}, null]}"#).expect("decodes");
        assert_eq!(outer.items, vec![Inner { a: 1 }]);
        assert!(serde_json::from_str::<Outer>(r#"{"items": [1]}"#).is_err());
    }

    #[test]
    fn test_number_map_is_structural() {
        assert!(serde_json::from_str::<Leaves>(r#"{"codes": [1, 2]}"#).is_err());
    }
}
