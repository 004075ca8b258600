use serde::Serialize;
use serde_json::Value;

/// Parameter names tried (case-insensitively) when the configured one is absent.
const FALLBACK_ID_PARAMS: [&str; 3] = ["id", "userid", "username"];

/// Named arguments of a protected call, in declaration order.
///
/// Scalars are plain JSON values; request bodies and other structured
/// arguments are JSON objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationArgs {
    params: Vec<(String, Value)>,
}

impl OperationArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named argument.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Append a structured argument (e.g. a request body).
    ///
    /// Values that fail to serialize are recorded as `null`.
    pub fn with_serialized<T: Serialize>(self, name: impl Into<String>, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.with(name, value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.iter().map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Resolve the argument identifying the resource a call targets.
    ///
    /// Looks up `param` first, then the first of `id`, `userId` or `username`
    /// (any casing).
    pub fn resource_id(&self, param: &str) -> Option<&Value> {
        self.get(param).or_else(|| {
            self.params
                .iter()
                .find(|(n, _)| {
                    let lower = n.to_ascii_lowercase();
                    FALLBACK_ID_PARAMS.contains(&lower.as_str())
                })
                .map(|(_, v)| v)
        })
    }
}
