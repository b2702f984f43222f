use crate::Element;

/// Reads the string value of a named attribute from `element`.
///
/// A closed set of names maps to reflected properties (`text` is the text
/// content, `className` the class list, `value` the live control value,
/// `tagName` the lower-cased tag); every other name falls back to the raw
/// attribute. Returns an empty string when nothing is set.
#[must_use]
pub fn get_attribute_value(element: &Element, attribute: &str) -> String {
    let reflected = |name: &str| element.attribute(name).unwrap_or_default().to_string();
    match attribute {
        "text" => element.text.clone(),
        "className" | "class" => reflected("class"),
        "value" => element
            .value
            .clone()
            .unwrap_or_else(|| reflected("value")),
        "tagName" => element.tag(),
        // type, href, src, id, name, placeholder, title, alt, role and any
        // custom attribute all reflect the attribute table directly.
        other => reflected(other),
    }
}
