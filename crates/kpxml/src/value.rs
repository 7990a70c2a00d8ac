//! Loosely typed view over element content and its canonical string form.

use std::fmt;

use crate::XmlElement;

const LIST_SEPARATOR: &str = ", ";

/// Shape of a child lookup on an [`XmlElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue<'a> {
    /// Element with nothing but character data.
    Text(&'a str),
    /// One value per matching child, in document order.
    List(Vec<XmlValue<'a>>),
    /// Element carrying attributes or children; its text is the body.
    Element(&'a XmlElement),
    /// No matching child.
    Missing,
}

impl<'a> XmlValue<'a> {
    pub fn of(element: &'a XmlElement) -> Self {
        if element.is_structured() {
            XmlValue::Element(element)
        } else {
            XmlValue::Text(element.text())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, XmlValue::Missing)
    }
}

/// Collapse a value into a single string. Never fails.
///
/// A list whose first item is a structured element with a text body yields
/// that body (`<Value ProtectInMemory="True">secret</Value>`). Any other list
/// is joined with `", "`.
pub fn normalize(value: &XmlValue<'_>) -> String {
    match value {
        XmlValue::Text(text) => (*text).to_string(),
        XmlValue::List(items) => {
            if let Some(body) = items.first().and_then(structured_body) {
                return body.to_string();
            }
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR)
        }
        XmlValue::Element(_) | XmlValue::Missing => value.to_string(),
    }
}

fn structured_body<'a>(value: &XmlValue<'a>) -> Option<&'a str> {
    match *value {
        XmlValue::Element(element) => element.body(),
        _ => None,
    }
}

impl fmt::Display for XmlValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlValue::Text(text) => f.write_str(text),
            XmlValue::Element(element) => f.write_str(element.body().unwrap_or_default()),
            XmlValue::List(_) => f.write_str(&normalize(self)),
            XmlValue::Missing => Ok(()),
        }
    }
}
