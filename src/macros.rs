/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Object keys must be string literals; any other leaf is converted with
/// [`to_value`](crate::to_value), and becomes `Null` if it cannot be.
///
/// # Examples
///
/// ```rust
/// use apiquery::{to_string, value};
///
/// let query = value!({
///     "q": "rust lang",
///     "filter": {"stars": 100, "archived": false},
///     "sort": null
/// });
/// assert_eq!(
///     to_string(&query).unwrap(),
///     "filter%5Barchived%5D=false&filter%5Bstars%5D=100&q=rust%20lang"
/// );
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Map, Number, Value};

    #[test]
    fn test_value_macro_primitives() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!(42), Value::Number(Number::Integer(42)));
        assert_eq!(value!(3.5), Value::Number(Number::Float(3.5)));
        assert_eq!(value!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_value_macro_arrays() {
        assert_eq!(value!([]), Value::Array(vec![]));
        assert_eq!(
            value!([1, "a", null]),
            Value::Array(vec![Value::from(1), Value::from("a"), Value::Null])
        );
    }

    #[test]
    fn test_value_macro_objects() {
        assert_eq!(value!({}), Value::Object(Map::new()));

        let obj = value!({
            "name": "Alice",
            "tags": ["x", "y"],
            "nested": {"depth": 2}
        });
        let map = obj.as_object().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("name"), Some(&Value::from("Alice")));
        assert_eq!(
            map.get("nested").and_then(|v| v.as_object()).and_then(|m| m.get("depth")),
            Some(&Value::from(2))
        );
    }

    #[test]
    fn test_value_macro_expressions() {
        let limit = 25u32;
        assert_eq!(value!(limit), Value::from(25));
        assert_eq!(value!({"limit": limit}).as_object().unwrap().get("limit"), Some(&Value::from(25)));
    }
}
