use serde::{Deserialize, Deserializer, Serialize};

/// One page of a list endpoint.
///
/// Paginated endpoints answer `{results, count, total_pages}`; others answer a
/// bare array, which decodes as a single page holding everything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub count: u64,
    pub total_pages: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Paginated {
        results: Vec<T>,
        count: Option<u64>,
        total_pages: Option<u32>,
    },
    Bare(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let page = match PageRepr::deserialize(deserializer)? {
            PageRepr::Paginated {
                results,
                count,
                total_pages,
            } => {
                let count = count.unwrap_or(results.len() as u64);
                Page {
                    results,
                    count,
                    total_pages: total_pages.unwrap_or(1).max(1),
                }
            }
            PageRepr::Bare(results) => Page {
                count: results.len() as u64,
                results,
                total_pages: 1,
            },
        };
        Ok(page)
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Non-money decimals (coordinates, bathrooms) arrive as strings
/// (`"41.390205"`), numbers or null. Money uses `rust_decimal::Decimal`.
pub(crate) mod decimal {
    use serde::de::{self, Visitor};
    use std::fmt;

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a decimal string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    pub mod option {
        use super::DecimalVisitor;
        use serde::de::{self, Deserializer, Visitor};
        use serde::Serializer;
        use std::fmt;

        struct OptionalDecimal;

        impl<'de> Visitor<'de> for OptionalDecimal {
            type Value = Option<f64>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("null, a number or a decimal string")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(DecimalVisitor).map(Some)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            deserializer.deserialize_option(OptionalDecimal)
        }

        pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Located {
        #[serde(default, with = "decimal::option")]
        latitude: Option<f64>,
    }

    #[test]
    fn test_paginated_page() {
        let page: Page<u32> =
            serde_json::from_value(json!({"results": [1, 2], "count": 14, "total_pages": 2}))
                .unwrap();
        assert_eq!(page.results, vec![1, 2]);
        assert_eq!(page.count, 14);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_bare_array_is_single_page() {
        let page: Page<u32> = serde_json::from_value(json!([4, 5, 6])).unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_missing_counts_fall_back() {
        let page: Page<u32> =
            serde_json::from_value(json!({"results": [], "total_pages": 0})).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.count, 0);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_decimal_from_string_and_number() {
        let from_str: Located = serde_json::from_value(json!({"latitude": "41.390205"})).unwrap();
        assert_eq!(from_str.latitude, Some(41.390205));

        let from_num: Located = serde_json::from_value(json!({"latitude": 12})).unwrap();
        assert_eq!(from_num.latitude, Some(12.0));
    }

    #[test]
    fn test_decimal_null_or_missing_is_none() {
        let null: Located = serde_json::from_value(json!({"latitude": null})).unwrap();
        assert_eq!(null.latitude, None);
        let missing: Located = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.latitude, None);
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        let parsed = serde_json::from_value::<Located>(json!({"latitude": "north"}));
        assert!(parsed.is_err());
    }
}
