use anyhow::{Context, Result};
use std::io::Write;
use xmltree::{Element, EmitterConfig, XMLNode};

fn name_matches(raw_name: &str, target: &str) -> bool {
    if raw_name.eq_ignore_ascii_case(target) {
        return true;
    }

    raw_name
        .rsplit_once(':')
        .map(|(_, suffix)| suffix.eq_ignore_ascii_case(target))
        .unwrap_or(false)
}

/// Get child element by name (case-insensitive)
pub(crate) fn get_child_ci<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    el.children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|c| name_matches(&c.name, name))
}

/// Get mutable child element by name (case-insensitive)
pub(crate) fn get_mut_child_ci<'a>(el: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    el.children
        .iter_mut()
        .filter_map(|n| n.as_mut_element())
        .find(|c| name_matches(&c.name, name))
}

/// Get the named child, appending an empty one first if it is missing
pub(crate) fn ensure_child<'a>(el: &'a mut Element, name: &str) -> &'a mut Element {
    let pos = el
        .children
        .iter()
        .position(|n| n.as_element().is_some_and(|c| name_matches(&c.name, name)));

    let pos = match pos {
        Some(pos) => pos,
        None => {
            el.children.push(XMLNode::Element(Element::new(name)));
            el.children.len() - 1
        }
    };

    match &mut el.children[pos] {
        XMLNode::Element(child) => child,
        _ => unreachable!("position() only matches element nodes"),
    }
}

/// Trimmed text content of a child element
pub(crate) fn child_text(el: &Element, name: &str) -> Option<String> {
    get_child_ci(el, name)
        .and_then(|e| e.get_text())
        .map(|s| s.trim().to_string())
}

/// Replace all children of `el` with a single text node
pub(crate) fn set_text(el: &mut Element, text: &str) {
    el.children.clear();
    el.children.push(XMLNode::Text(text.to_string()));
}

/// First attribute carrying a namespace prefix (`wcm:action`), as written.
///
/// xmltree keeps only the local name of attributes, so such documents
/// cannot round-trip through `Element`.
pub(crate) fn find_prefixed_attribute(doc: &[u8]) -> Result<Option<String>> {
    for event in xml::reader::EventReader::new(doc) {
        if let xml::reader::XmlEvent::StartElement { attributes, .. } =
            event.context("Failed to parse XML")?
        {
            let prefixed = attributes.into_iter().find_map(|attr| {
                attr.name
                    .prefix
                    .map(|prefix| format!("{}:{}", prefix, attr.name.local_name))
            });
            if prefixed.is_some() {
                return Ok(prefixed);
            }
        }
    }
    Ok(None)
}

/// Write the document with two-space indentation and an XML declaration
pub(crate) fn write_document<W: Write>(root: &Element, writer: W) -> Result<()> {
    let emitter_config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ")
        .write_document_declaration(true);
    root.write_with_config(writer, emitter_config)
        .context("Failed to write XML")
}
