//! Named value tree used for every persisted object.
//!
//! A [`DataNode`] is a name, an optional scalar value and ordered children.
//! Structured types write themselves as child fields; scalars land in
//! `value`. JSON goes through serde.

use serde::{Deserialize, Serialize};

use crate::{Color, DataError, Rect, Vec2};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl DataValue {
    pub fn is_none(&self) -> bool {
        matches!(self, DataValue::None)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "DataValue::is_none")]
    pub value: DataValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DataNode>,
}

impl DataNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn child(&self, name: &str) -> Option<&DataNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut DataNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Slash separated lookup, e.g. `widget/layout/anchor_min`.
    pub fn node(&self, path: &str) -> Option<&DataNode> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, seg| node.child(seg))
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> &mut DataNode {
        self.children.push(DataNode::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Returns the existing child named `name` or appends a new one.
    pub fn node_mut(&mut self, name: &str) -> &mut DataNode {
        match self.children.iter().position(|c| c.name == name) {
            Some(i) => &mut self.children[i],
            None => self.add_node(name),
        }
    }

    pub fn set<T: ToData + ?Sized>(&mut self, value: &T) {
        value.to_data(self);
    }

    pub fn get<T: FromData>(&self) -> Result<T, DataError> {
        T::from_data(self)
    }

    /// Writes `value` into a child field, replacing any previous content.
    pub fn write<T: ToData + ?Sized>(&mut self, field: &str, value: &T) -> &mut Self {
        let node = self.node_mut(field);
        node.value = DataValue::None;
        node.children.clear();
        value.to_data(node);
        self
    }

    pub fn read<T: FromData>(&self, field: &str) -> Result<T, DataError> {
        match self.child(field) {
            Some(node) => T::from_data(node),
            None => Err(DataError::Missing {
                field: field.to_string(),
            }),
        }
    }

    /// `Ok(None)` when the field is absent.
    pub fn read_opt<T: FromData>(&self, field: &str) -> Result<Option<T>, DataError> {
        self.child(field).map(T::from_data).transpose()
    }

    /// Reads a field, falling back to `default` with a warning when the
    /// field is missing or malformed.
    pub fn read_or<T: FromData>(&self, field: &str, default: T) -> T {
        match self.read(field) {
            Ok(v) => v,
            Err(err) => {
                log::warn!("{}: {err}; using default", self.name);
                default
            }
        }
    }

    /// Like [`read_or`](Self::read_or) but silent when the field is absent.
    pub fn read_opt_or<T: FromData>(&self, field: &str, default: T) -> T {
        match self.read_opt(field) {
            Ok(v) => v.unwrap_or(default),
            Err(err) => {
                log::warn!("{}: {err}; using default", self.name);
                default
            }
        }
    }

    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<DataNode, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    fn mismatch(&self, expected: &'static str) -> DataError {
        DataError::TypeMismatch {
            field: self.name.clone(),
            expected,
        }
    }
}

pub trait ToData {
    fn to_data(&self, node: &mut DataNode);
}

pub trait FromData: Sized {
    fn from_data(node: &DataNode) -> Result<Self, DataError>;
}

impl ToData for bool {
    fn to_data(&self, node: &mut DataNode) {
        node.value = DataValue::Bool(*self);
    }
}

impl FromData for bool {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        match node.value {
            DataValue::Bool(b) => Ok(b),
            _ => Err(node.mismatch("bool")),
        }
    }
}

macro_rules! int_data {
    ($($t:ty),*) => {$(
        impl ToData for $t {
            fn to_data(&self, node: &mut DataNode) {
                node.value = DataValue::Int(*self as i64);
            }
        }

        impl FromData for $t {
            fn from_data(node: &DataNode) -> Result<Self, DataError> {
                match node.value {
                    DataValue::Int(i) => <$t>::try_from(i).map_err(|_| node.mismatch("integer in range")),
                    _ => Err(node.mismatch("integer")),
                }
            }
        }
    )*};
}

int_data!(i32, u32, i64, u64, usize);

impl ToData for f32 {
    fn to_data(&self, node: &mut DataNode) {
        node.value = DataValue::Float(*self as f64);
    }
}

impl FromData for f32 {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        f64::from_data(node).map(|v| v as f32)
    }
}

impl ToData for f64 {
    fn to_data(&self, node: &mut DataNode) {
        node.value = DataValue::Float(*self);
    }
}

impl FromData for f64 {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        match node.value {
            DataValue::Float(f) => Ok(f),
            DataValue::Int(i) => Ok(i as f64),
            _ => Err(node.mismatch("number")),
        }
    }
}

impl ToData for str {
    fn to_data(&self, node: &mut DataNode) {
        node.value = DataValue::Str(self.to_string());
    }
}

impl ToData for String {
    fn to_data(&self, node: &mut DataNode) {
        self.as_str().to_data(node);
    }
}

impl FromData for String {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        match &node.value {
            DataValue::Str(s) => Ok(s.clone()),
            _ => Err(node.mismatch("string")),
        }
    }
}

impl ToData for Vec2 {
    fn to_data(&self, node: &mut DataNode) {
        node.write("x", &self.x).write("y", &self.y);
    }
}

impl FromData for Vec2 {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        Ok(Vec2::new(node.read("x")?, node.read("y")?))
    }
}

impl ToData for Rect {
    fn to_data(&self, node: &mut DataNode) {
        node.write("x", &self.x)
            .write("y", &self.y)
            .write("w", &self.w)
            .write("h", &self.h);
    }
}

impl FromData for Rect {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        Ok(Rect::new(
            node.read("x")?,
            node.read("y")?,
            node.read("w")?,
            node.read("h")?,
        ))
    }
}

impl ToData for Color {
    fn to_data(&self, node: &mut DataNode) {
        node.value = DataValue::Str(self.to_hex());
    }
}

impl FromData for Color {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        match &node.value {
            DataValue::Str(s) => Color::parse_hex(s).ok_or_else(|| node.mismatch("hex color")),
            _ => Err(node.mismatch("hex color")),
        }
    }
}
