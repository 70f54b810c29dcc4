//! End-to-end tests for deriving records and morphing them

use morph_core::{Error, FnTransformer, Kind, Leaf, Morpher, Record, Reflect};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

fn morph<R: Reflect>(value: &mut R) -> morph_core::Result<()> {
    Morpher::new().morph(value)
}

mod entry_point {
    use super::*;

    #[derive(Record, Default)]
    struct Empty {}

    #[derive(Record)]
    struct Untagged {
        pub string: String,
    }

    #[test]
    fn test_untyped_nil() {
        let err = morph(&mut ()).unwrap_err();
        assert!(err.to_string().contains("not a pointer"));
    }

    #[test]
    fn test_nil_record() {
        let mut data: Option<Empty> = None;
        let err = morph(&mut data).unwrap_err();
        assert!(err.to_string().contains("not a struct"));
    }

    #[test]
    fn test_not_a_struct() {
        let mut data = "string".to_string();
        assert_eq!(morph(&mut data), Err(Error::NotAStruct));
    }

    #[test]
    fn test_empty_struct() {
        assert!(morph(&mut Empty::default()).is_ok());
    }

    #[test]
    fn test_struct_without_tag() {
        let mut data = Untagged {
            string: " data ".to_string(),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.string, " data ");
    }
}

mod annotations {
    use super::*;

    #[derive(Record)]
    struct EmptyTag {
        #[morph("")]
        pub string: String,
    }

    #[derive(Record)]
    struct UnknownTag {
        #[morph("baba")]
        pub string: String,
    }

    #[derive(Record)]
    struct Comma {
        #[morph(",")]
        pub string: String,
    }

    #[test]
    fn test_empty_tag() {
        let mut data = EmptyTag {
            string: " data ".to_string(),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.string, " data ");
    }

    #[test]
    fn test_unknown_tag() {
        let mut data = UnknownTag {
            string: " data ".to_string(),
        };
        let err = morph(&mut data).unwrap_err();
        assert!(err.to_string().contains("unknown tag"));
        assert!(err.to_string().contains("baba"));
    }

    #[test]
    fn test_only_separator() {
        let mut data = Comma {
            string: " data ".to_string(),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.string, " data ");
    }
}

mod trim {
    use super::*;

    #[derive(Record, Default)]
    struct Plain {
        #[morph("trim")]
        pub string: String,
        pub other_string: String,
        #[morph("trim")]
        private: String,
    }

    #[derive(Record)]
    struct Boxed {
        #[morph("trim")]
        pub string: Option<Box<String>>,
    }

    #[derive(Record)]
    struct Inner {
        #[morph("trim")]
        pub other_string: String,
    }

    #[derive(Record)]
    struct Outer {
        pub inner: Inner,
        #[morph("-")]
        pub ignored: Inner,
    }

    fn inner(value: &str) -> Inner {
        Inner {
            other_string: value.to_string(),
        }
    }

    #[test]
    fn test_empty_field() {
        let mut data = Plain::default();
        morph(&mut data).unwrap();
        assert_eq!(data.string, "");
    }

    #[test]
    fn test_trim_skips_private_and_untagged_fields() {
        let mut data = Plain {
            string: " data ".to_string(),
            other_string: " other data ".to_string(),
            private: " data ".to_string(),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.string, "data");
        assert_eq!(data.other_string, " other data ");
        assert_eq!(data.private, " data ");
    }

    #[test]
    fn test_trim_through_box() {
        let mut data = Boxed {
            string: Some(Box::new(" data ".to_string())),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.string.as_deref().map(String::as_str), Some("data"));

        let mut data = Boxed { string: None };
        morph(&mut data).unwrap();
        assert!(data.string.is_none());
    }

    #[test]
    fn test_inner_record_and_ignore() {
        let mut data = Outer {
            inner: inner(" other data "),
            ignored: inner(" other data "),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.inner.other_string, "other data");
        assert_eq!(data.ignored.other_string, " other data ");
    }
}

mod sequences {
    use super::*;

    #[derive(Record, Clone)]
    struct Item {
        #[morph("trim")]
        pub other_string: String,
    }

    #[derive(Record)]
    struct Records {
        #[morph("dive")]
        pub items: Vec<Item>,
        #[morph("dive")]
        pub boxed: Option<Vec<Box<Item>>>,
        #[morph("dive")]
        pub fixed: [Item; 2],
    }

    #[derive(Record)]
    struct Strings {
        #[morph("dive,trim")]
        pub values: Vec<String>,
        #[morph("dive,dive,trim,lower")]
        pub nested: Vec<Vec<String>>,
        #[morph("dive,trim")]
        pub optional: Vec<Option<String>>,
    }

    #[derive(Record)]
    struct Dynamic {
        #[morph("dive,trim")]
        pub values: Vec<Box<dyn Reflect>>,
    }

    #[derive(Record)]
    struct Integers {
        #[morph("dive,trim")]
        pub values: Vec<i32>,
    }

    #[derive(Record)]
    struct WithoutDive {
        #[morph("trim")]
        pub values: Vec<String>,
    }

    fn item(value: &str) -> Item {
        Item {
            other_string: value.to_string(),
        }
    }

    #[test]
    fn test_dive_into_records() {
        let mut data = Records {
            items: vec![item(" other data ")],
            boxed: Some(vec![Box::new(item(" boxed "))]),
            fixed: [item(" a "), item(" b ")],
        };
        morph(&mut data).unwrap();
        assert_eq!(data.items[0].other_string, "other data");
        assert_eq!(data.boxed.unwrap()[0].other_string, "boxed");
        assert_eq!(data.fixed[1].other_string, "b");
    }

    #[test]
    fn test_dive_into_strings() {
        let mut data = Strings {
            values: vec![" data ".to_string(), " data2 ".to_string()],
            nested: vec![vec![" DATA ".to_string(), " Data2 ".to_string()]],
            optional: vec![None, Some(" data ".to_string())],
        };
        morph(&mut data).unwrap();
        assert_eq!(data.values, ["data", "data2"]);
        assert_eq!(data.nested, [["data", "data2"]]);
        assert_eq!(data.optional, [None, Some("data".to_string())]);
    }

    #[test]
    fn test_dive_into_dynamic_values() {
        let mut data = Dynamic {
            values: vec![
                Box::new(5) as Box<dyn Reflect>,
                Box::new(" data ".to_string()),
                Box::new(item(" x ")),
            ],
        };
        let err = morph(&mut data).unwrap_err();
        assert!(err.to_string().contains("unexpected value"));
    }

    #[test]
    fn test_trim_on_integers() {
        let mut data = Integers { values: vec![5, 4] };
        let err = morph(&mut data).unwrap_err();
        assert_eq!(err, Error::unexpected_value(Kind::Int, "trim"));
    }

    #[test]
    fn test_without_dive() {
        let mut data = WithoutDive {
            values: vec![" data ".to_string()],
        };
        let err = morph(&mut data).unwrap_err();
        assert!(err.to_string().contains("unexpected value"));
        assert_eq!(data.values[0], " data ");
    }
}

mod maps {
    use super::*;

    #[derive(Record)]
    struct Strings {
        pub map: HashMap<String, String>,
    }

    #[derive(Record)]
    struct Value {
        #[morph("trim")]
        pub string: String,
    }

    #[derive(Record)]
    struct Records {
        #[morph("dive,keys,trim,exit")]
        pub map: BTreeMap<String, Option<Box<Value>>>,
    }

    #[derive(Record)]
    struct Dynamic {
        #[morph("dive")]
        pub map: HashMap<String, Box<dyn Reflect>>,
    }

    fn strings() -> HashMap<String, String> {
        HashMap::from([
            (" key1 ".to_string(), " value1 ".to_string()),
            (" key2 ".to_string(), " value2 ".to_string()),
        ])
    }

    /// Morph a fresh string map under `annotation`
    fn morph_strings(annotation: &str) -> HashMap<String, String> {
        let mut map = strings();
        Morpher::new().apply(&mut map, annotation).unwrap();
        map
    }

    fn get<'m>(map: &'m HashMap<String, String>, key: &str) -> Option<&'m str> {
        map.get(key).map(String::as_str)
    }

    #[test]
    fn test_keys_alone_changes_nothing() {
        for annotation in ["dive,keys", "dive,keys,exit"] {
            let map = morph_strings(annotation);
            assert_eq!(get(&map, " key1 "), Some(" value1 "), "{}", annotation);
            assert_eq!(get(&map, " key2 "), Some(" value2 "), "{}", annotation);
        }
    }

    #[test]
    fn test_keys_trim_exit() {
        let map = morph_strings("dive,keys,trim,exit");
        assert_eq!(get(&map, "key1"), Some(" value1 "));
        assert_eq!(get(&map, "key2"), Some(" value2 "));
    }

    #[test]
    fn test_keys_exit_trim() {
        let map = morph_strings("dive,keys,exit,trim");
        assert_eq!(get(&map, " key1 "), Some("value1"));
        assert_eq!(get(&map, " key2 "), Some("value2"));
    }

    #[test]
    fn test_values() {
        let map = morph_strings("dive,trim");
        assert_eq!(get(&map, " key1 "), Some("value1"));
    }

    #[test]
    fn test_keys_multiple_transforms() {
        let mut map = HashMap::from([
            (" KEY1 ".to_string(), " VALUE1 ".to_string()),
            (" KEY2 ".to_string(), " VALUE2 ".to_string()),
        ]);
        Morpher::new()
            .apply(&mut map, "dive,keys,trim,lower,exit,trim,lower")
            .unwrap();
        assert_eq!(get(&map, "key1"), Some("value1"));
        assert_eq!(get(&map, "key2"), Some("value2"));
    }

    #[test]
    fn test_map_without_dive() {
        let mut data = Strings { map: strings() };
        morph(&mut data).unwrap();
        assert_eq!(data.map, strings());
    }

    #[test]
    fn test_map_of_records() {
        let mut data = Records {
            map: BTreeMap::from([
                (
                    " a ".to_string(),
                    Some(Box::new(Value {
                        string: " value ".to_string(),
                    })),
                ),
                (" b ".to_string(), None),
            ]),
        };
        morph(&mut data).unwrap();

        let a = data.map.get("a").and_then(|value| value.as_ref());
        assert_eq!(a.map(|value| value.string.as_str()), Some("value"));
        assert!(matches!(data.map.get("b"), Some(None)));
    }

    #[test]
    fn test_map_of_dynamic_values() {
        let mut data = Dynamic {
            map: HashMap::new(),
        };
        data.map.insert(
            "key1".to_string(),
            Box::new(Value {
                string: " value ".to_string(),
            }),
        );
        data.map.insert("key2".to_string(), Box::new(" value2 ".to_string()));
        morph(&mut data).unwrap();
    }
}

mod numbers {
    use super::*;

    #[derive(Record)]
    struct Rounding {
        #[morph("ceil")]
        pub ceil: f64,
        #[morph("floor")]
        pub floor: f32,
        #[morph("round")]
        pub round: Option<f64>,
        #[morph("dive,round")]
        pub many: Vec<f64>,
    }

    #[derive(Record)]
    struct Precision {
        #[morph("precision=1")]
        pub wide: f64,
        #[morph("precision=1")]
        pub narrow: f32,
        #[morph("precision=2")]
        pub zero: f64,
    }

    #[derive(Record)]
    struct NoParameter {
        #[morph("precision")]
        pub num: f64,
    }

    #[derive(Record)]
    struct EmptyParameter {
        #[morph("precision=")]
        pub num: f64,
    }

    #[test]
    fn test_rounding() {
        let mut data = Rounding {
            ceil: 1.465,
            floor: 1.565,
            round: Some(-1.565),
            many: vec![1.456, 1.565],
        };
        morph(&mut data).unwrap();
        assert_eq!(data.ceil, 2.0);
        assert_eq!(data.floor, 1.0);
        assert_eq!(data.round, Some(-2.0));
        assert_eq!(data.many, [1.0, 2.0]);
    }

    #[test]
    fn test_precision() {
        let mut data = Precision {
            wide: 1.16,
            narrow: 1.16,
            zero: 0.0,
        };
        morph(&mut data).unwrap();
        assert_eq!(data.wide, 1.1);
        assert_eq!(data.narrow, 1.1);
        assert_eq!(data.zero, 0.0);
    }

    #[test]
    fn test_precision_leaves_huge_values_finite() {
        let mut data = Precision {
            wide: 1.0e307,
            narrow: f32::MAX,
            zero: -f64::MAX,
        };
        morph(&mut data).unwrap();
        assert_eq!(data.wide, 1.0e307);
        assert_eq!(data.narrow, f32::MAX);
        assert_eq!(data.zero, -f64::MAX);
    }

    #[test]
    fn test_precision_parameters() {
        let err = morph(&mut NoParameter { num: 1.16 }).unwrap_err();
        assert!(err.to_string().contains("invalid parameters"));

        let err = morph(&mut EmptyParameter { num: 1.16 }).unwrap_err();
        assert!(err.to_string().contains("invalid parameters"));
    }
}

mod registration {
    use super::*;

    #[derive(Record)]
    struct Custom {
        #[morph("baba")]
        pub string: String,
    }

    #[derive(Record)]
    struct Changed {
        #[morph(change = "upper")]
        pub some_string: String,
        #[morph("trim", change = "trim,lower")]
        pub both: String,
    }

    #[test]
    fn test_reserved_tags() {
        let morpher = Morpher::new();
        for tag in ["dive", "keys", "exit", "-"] {
            let err = morpher
                .register(tag, FnTransformer::new(|_: &mut Leaf| Ok(())))
                .unwrap_err();
            assert_eq!(err, Error::ReservedTagOverride { tag: tag.to_string() });
        }
    }

    #[test]
    fn test_custom_tag() {
        let morpher = Morpher::new();
        morpher
            .register(
                "baba",
                FnTransformer::new(|value: &mut Leaf| {
                    *value = Leaf::String("baba".to_string());
                    Ok(())
                }),
            )
            .unwrap();

        let mut data = Custom {
            string: " data ".to_string(),
        };
        morpher.morph(&mut data).unwrap();
        assert_eq!(data.string, "baba");
    }

    #[test]
    fn test_with_tag() {
        let mut data = Changed {
            some_string: "yes".to_string(),
            both: " MIXED ".to_string(),
        };
        Morpher::new().with_tag("change").morph(&mut data).unwrap();
        assert_eq!(data.some_string, "YES");
        assert_eq!(data.both, "mixed");
    }

    #[test]
    fn test_with_empty_tag_panics() {
        for tag in ["", "     "] {
            let outcome = std::panic::catch_unwind(|| Morpher::new().with_tag(tag));
            assert!(outcome.is_err(), "tag {:?}", tag);
        }
    }
}

mod scenarios {
    use super::*;

    #[derive(Record)]
    struct Name {
        #[morph("trim,lower")]
        pub name: String,
    }

    #[derive(Record)]
    struct Tags {
        #[morph("dive,trim,lower")]
        pub tags: Vec<String>,
    }

    #[derive(Record)]
    struct Mapped {
        #[morph("dive,keys,trim,exit,trim")]
        pub m: HashMap<String, String>,
    }

    #[derive(Record)]
    struct Number {
        #[morph("precision=2")]
        pub n: f64,
    }

    #[derive(Record)]
    struct Truncated {
        #[morph("truncate=3")]
        pub s: String,
    }

    #[derive(Record)]
    struct NegativeTruncate {
        #[morph("truncate=-1")]
        pub s: String,
    }

    #[derive(Record)]
    struct ScalarDive {
        #[morph("dive")]
        pub s: String,
    }

    #[test]
    fn test_trim_lower() {
        let mut data = Name {
            name: " Bob ".to_string(),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.name, "bob");
    }

    #[test]
    fn test_dive_trim_lower() {
        let mut data = Tags {
            tags: vec![" A ".to_string(), " b ".to_string()],
        };
        morph(&mut data).unwrap();
        assert_eq!(data.tags, ["a", "b"]);
    }

    #[test]
    fn test_keys_and_values() {
        let mut data = Mapped {
            m: HashMap::from([(" K ".to_string(), " V ".to_string())]),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.m, HashMap::from([("K".to_string(), "V".to_string())]));
    }

    #[test]
    fn test_precision() {
        let mut data = Number { n: 1.567 };
        morph(&mut data).unwrap();
        assert_eq!(data.n, 1.56);
    }

    #[test]
    fn test_truncate() {
        let mut data = Truncated {
            s: "123456".to_string(),
        };
        morph(&mut data).unwrap();
        assert_eq!(data.s, "123");

        let mut data = NegativeTruncate {
            s: "123456".to_string(),
        };
        let err = morph(&mut data).unwrap_err();
        assert!(matches!(err, Error::InvalidParameters { .. }));
    }

    #[test]
    fn test_dive_into_string() {
        let mut data = ScalarDive {
            s: "text".to_string(),
        };
        assert_eq!(morph(&mut data), Err(Error::InvalidDive { kind: Kind::String }));
    }
}

mod documents {
    use super::*;

    #[test]
    fn test_json_document() {
        let mut document = json!({
            "users": [{"email": " Bob@Example.com "}, {"email": "ALICE@example.com"}],
        });
        let morpher = Morpher::new();
        let users = document.pointer_mut("/users").unwrap();
        morpher.apply(users, "dive,dive,trim,lower").unwrap();

        assert_eq!(
            document,
            json!({"users": [{"email": "bob@example.com"}, {"email": "alice@example.com"}]})
        );
    }

    #[test]
    fn test_json_integers_take_float_directives() {
        let mut document = json!([1.567, 2, -3]);
        Morpher::new().apply(&mut document, "dive,precision=2").unwrap();
        assert_eq!(document.to_string(), "[1.56,2,-3]");

        let mut document = json!({"a": 1.5, "b": 2});
        Morpher::new().apply(&mut document, "dive,ceil").unwrap();
        assert_eq!(document, json!({"a": 2.0, "b": 2}));
    }

    #[test]
    fn test_json_null_leaves_stay_null() {
        let mut document = json!([" a ", null]);
        Morpher::new().apply(&mut document, "dive,trim,upper").unwrap();
        assert_eq!(document, json!(["A", null]));
    }
}

mod generics {
    use super::*;

    #[derive(Record)]
    struct Wrapper<T> {
        #[morph("dive,trim")]
        pub items: Vec<T>,
        label: &'static str,
    }

    #[test]
    fn test_generic_record() {
        let mut data = Wrapper {
            items: vec![" x ".to_string()],
            label: "private fields need no Reflect impl",
        };
        morph(&mut data).unwrap();
        assert_eq!(data.items, ["x"]);
        assert!(!data.label.is_empty());
    }
}
