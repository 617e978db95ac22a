use crate::value::Value;
use std::fmt;

/// Various styles of SQL parameter placeholders.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
    /// Colon style placeholders (:param)
    Colon,
    /// At-sign style placeholders (@param)
    AtSign,
    /// Dollar style placeholders ($param); generated names are 1-based indexes
    Dollar,
    #[default]
    Positional,
}

impl PlaceholderStyle {
    /// Renders the placeholder text for a parameter name.
    pub fn render(&self, name: &str) -> String {
        match self {
            PlaceholderStyle::Colon => format!(":{name}"),
            PlaceholderStyle::AtSign => format!("@{name}"),
            PlaceholderStyle::Dollar => format!("${name}"),
            PlaceholderStyle::Positional => "?".to_string(),
        }
    }
}

/// A bound statement parameter: the placeholder text as it appears in the
/// SQL plus its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub placeholder: String,
    pub value: Value,
    /// Caller-chosen name, when it differs from what the placeholder shows.
    pub name: Option<String>,
}

/// Ordered parameter set accumulated while a statement is generated.
///
/// Generated names are unique for the lifetime of the set, so one set can be
/// shared by several statements joined into a single batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    style: PlaceholderStyle,
    params: Vec<Param>,
}

impl Parameters {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            params: Vec::new(),
        }
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Adds a value under a generated name and returns its placeholder text.
    pub fn push(&mut self, value: impl Into<Value>) -> String {
        let name = match self.style {
            PlaceholderStyle::Dollar => (self.params.len() + 1).to_string(),
            _ => format!("p{}", self.params.len()),
        };
        self.push_param(self.style.render(&name), None, value.into())
    }

    /// Adds a value under a caller-chosen name and returns its placeholder text.
    ///
    /// `$` placeholders are numbered only, so under [`PlaceholderStyle::Dollar`]
    /// the value gets the next `$n` and the name is kept on the [`Param`].
    /// Positional sets likewise render `?` and keep the name.
    pub fn push_named(&mut self, name: &str, value: impl Into<Value>) -> String {
        match self.style {
            PlaceholderStyle::Dollar => {
                let placeholder = self.style.render(&(self.params.len() + 1).to_string());
                self.push_param(placeholder, Some(name.to_string()), value.into())
            }
            PlaceholderStyle::Positional => {
                self.push_param(self.style.render(name), Some(name.to_string()), value.into())
            }
            _ => self.push_param(self.style.render(name), None, value.into()),
        }
    }

    fn push_param(&mut self, placeholder: String, name: Option<String>, value: Value) -> String {
        self.params.push(Param {
            placeholder: placeholder.clone(),
            value,
            name,
        });
        placeholder
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Values in binding order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.iter().map(|p| &p.value)
    }

    /// Looks up a value by its placeholder text (`@p0`, `$1`).
    pub fn get(&self, placeholder: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|p| p.placeholder == placeholder)
            .map(|p| &p.value)
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", p.placeholder, p.value.to_literal())?;
        }
        f.write_str("]")
    }
}
