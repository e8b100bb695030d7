use serde_json::Value;

use super::ReplContext;

static NULL: Value = Value::Null;

pub type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// `prop(key)(obj)` is the value stored under `key`, or `None` when `obj`
/// is not an object or has no such key.
pub fn prop(key: impl Into<String>) -> impl Fn(&Value) -> Option<Value> {
    let key = key.into();
    move |obj: &Value| obj.get(key.as_str()).cloned()
}

/// `is(key)(val)(obj)` tests `obj[key] == val`. A missing key never
/// matches, not even `null`.
pub fn is(key: impl Into<String>) -> impl Fn(Value) -> Predicate {
    let key = key.into();
    move |val: Value| {
        let key = key.clone();
        Box::new(move |obj: &Value| obj.get(key.as_str()) == Some(&val)) as Predicate
    }
}

/// The submissions list, exactly as stored in the snapshot. `null` when the
/// snapshot has no `content.Submissions`.
#[must_use]
pub fn submissions(context: &ReplContext) -> &Value {
    context
        .state()
        .get("content")
        .and_then(|content| content.get("Submissions"))
        .unwrap_or(&NULL)
}

/// Dotted-path lookup. Object segments are keys, array segments are
/// indexes: `content.Submissions.0.Title`. An empty path is the root.
#[must_use]
pub fn lookup<'ctx>(context: &'ctx ReplContext, path: &str) -> Option<&'ctx Value> {
    let path = path.trim();
    if path.is_empty() {
        return Some(context.state());
    }
    path.split('.').try_fold(context.state(), |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    })
}
