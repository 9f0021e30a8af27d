use crate::hooks::{Hook, HookKind, HookResult, Removal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Value of a plain attribute or property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Str(String),
    /// Inline style declarations, rendered as `name: value; ...`
    Style(BTreeMap<String, String>),
}

impl AttrValue {
    /// Markup form of the value, or `None` when the attribute should be absent
    ///
    /// `Bool(true)` renders as an empty value (a bare attribute).
    pub fn to_markup(&self) -> Option<String> {
        match self {
            AttrValue::Bool(true) => Some(String::new()),
            AttrValue::Bool(false) => None,
            AttrValue::Number(n) => Some(format_number(*n)),
            AttrValue::Str(s) => Some(s.clone()),
            AttrValue::Style(declarations) => Some(
                declarations
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Number(f64::from(n))
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Number(f64::from(n))
    }
}

impl From<BTreeMap<String, String>> for AttrValue {
    fn from(declarations: BTreeMap<String, String>) -> Self {
        AttrValue::Style(declarations)
    }
}

/// Text form of a number child, numeric attribute or numeric key
///
/// Plain `Display` for `f64`. Kept as the one place numbers become text so
/// children, markup and keys always agree.
pub fn format_number(n: f64) -> String {
    n.to_string()
}

/// An event delivered by the host to a listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl Event {
    pub fn new(name: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            detail,
        }
    }
}

/// Shared event handler
///
/// Listeners compare by identity: re-rendering with the same `Listener`
/// clone leaves the host registration alone, a fresh closure replaces it.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// One entry of a props bag
pub enum Prop<N> {
    Value(AttrValue),
    Listener(Listener),
    Hook(Hook<N>),
}

impl<N> Clone for Prop<N> {
    fn clone(&self) -> Self {
        match self {
            Prop::Value(v) => Prop::Value(v.clone()),
            Prop::Listener(l) => Prop::Listener(l.clone()),
            Prop::Hook(h) => Prop::Hook(h.clone()),
        }
    }
}

impl<N> PartialEq for Prop<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Prop::Value(a), Prop::Value(b)) => a == b,
            (Prop::Listener(a), Prop::Listener(b)) => a == b,
            (Prop::Hook(a), Prop::Hook(b)) => a == b,
            _ => false,
        }
    }
}

impl<N> fmt::Debug for Prop<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Value(v) => v.fmt(f),
            Prop::Listener(l) => l.fmt(f),
            Prop::Hook(h) => h.fmt(f),
        }
    }
}

/// How a prop name is treated by the reconciler
///
/// Classification looks at the name only. The four lifecycle names are
/// hooks, any other `on<event>` name is a listener for `<event>`, and
/// everything else is a plain attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropClass<'a> {
    Hook(HookKind),
    Listener(&'a str),
    Attribute,
}

impl<'a> PropClass<'a> {
    pub fn classify(name: &'a str) -> Self {
        if let Some(kind) = HookKind::from_prop_name(name) {
            return PropClass::Hook(kind);
        }
        match name.strip_prefix("on") {
            Some(event) if !event.is_empty() => PropClass::Listener(event),
            _ => PropClass::Attribute,
        }
    }
}

/// Attribute, listener and hook bag of an element
pub struct Props<N> {
    entries: BTreeMap<String, Prop<N>>,
}

impl<N> Props<N> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, prop: Prop<N>) -> Option<Prop<N>> {
        self.entries.insert(name.into(), prop)
    }

    pub fn get(&self, name: &str) -> Option<&Prop<N>> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prop<N>)> {
        self.entries.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain value stored under `name`, if any
    pub fn value(&self, name: &str) -> Option<&AttrValue> {
        match self.entries.get(name) {
            Some(Prop::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Hook registered under the canonical name for `kind`, if it has the right shape
    pub fn hook(&self, kind: HookKind) -> Option<&Hook<N>> {
        match self.entries.get(kind.prop_name()) {
            Some(Prop::Hook(hook)) if hook.kind() == kind => Some(hook),
            _ => None,
        }
    }

    /// The `key` prop as a string. Numbers are accepted and formatted.
    pub fn key(&self) -> Option<String> {
        match self.value("key")? {
            AttrValue::Str(s) => Some(s.clone()),
            AttrValue::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.entries.insert(name.into(), Prop::Value(value.into()));
        self
    }

    pub fn with_key(self, key: impl Into<AttrValue>) -> Self {
        self.attr("key", key)
    }

    /// Register `handler` for `event` (stored as `on<event>`)
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.listener(event, Listener::new(handler))
    }

    pub fn listener(mut self, event: &str, listener: Listener) -> Self {
        self.entries
            .insert(format!("on{}", event), Prop::Listener(listener));
        self
    }

    pub fn with_hook(mut self, hook: Hook<N>) -> Self {
        self.entries
            .insert(hook.kind().prop_name().to_string(), Prop::Hook(hook));
        self
    }

    pub fn oncreate(self, hook: impl Fn(&N) -> HookResult + 'static) -> Self {
        self.with_hook(Hook::Create(Rc::new(hook)))
    }

    pub fn onupdate(self, hook: impl Fn(&N, &Props<N>) -> HookResult + 'static) -> Self {
        self.with_hook(Hook::Update(Rc::new(hook)))
    }

    pub fn onremove(self, hook: impl Fn(&N, Removal) -> HookResult + 'static) -> Self {
        self.with_hook(Hook::Remove(Rc::new(hook)))
    }

    pub fn ondestroy(self, hook: impl Fn(&N) -> HookResult + 'static) -> Self {
        self.with_hook(Hook::Destroy(Rc::new(hook)))
    }
}

impl<N> Default for Props<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for Props<N> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<N> PartialEq for Props<N> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<N> fmt::Debug for Props<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<N, K: Into<String>> FromIterator<(K, Prop<N>)> for Props<N> {
    fn from_iter<I: IntoIterator<Item = (K, Prop<N>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, prop)| (name.into(), prop))
                .collect(),
        }
    }
}
