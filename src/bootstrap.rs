use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::{Read, Write};
use std::path::Path;
use xmltree::Element;

use crate::xml_helpers::{
    child_text, ensure_child, find_prefixed_attribute, get_mut_child_ci, set_text, write_document,
};
use crate::{BootstrapChange, BootstrapFormat, DeployError};

const VARIABLES: &str = "Variables";
const TSID: &str = "TSID";

impl BootstrapFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(BootstrapFormat::Json)
        } else if ext.eq_ignore_ascii_case("xml") {
            Some(BootstrapFormat::Xml)
        } else {
            None
        }
    }
}

/// Write `tsid` into `Variables.TSID` of a bootstrap document.
///
/// Every other field is carried through unchanged. `Variables` must already
/// exist; `TSID` is created inside it if missing.
pub fn set_tsid<R: Read, W: Write>(
    reader: R,
    writer: W,
    format: BootstrapFormat,
    tsid: &str,
) -> Result<BootstrapChange> {
    match format {
        BootstrapFormat::Json => set_tsid_json(reader, writer, tsid),
        BootstrapFormat::Xml => set_tsid_xml(reader, writer, tsid),
    }
}

/// Read `Variables.TSID` back out of a bootstrap document
pub fn read_tsid<R: Read>(reader: R, format: BootstrapFormat) -> Result<Option<String>> {
    match format {
        BootstrapFormat::Json => {
            let root: Value =
                serde_json::from_reader(reader).context("Failed to parse bootstrap JSON")?;
            let tsid = root
                .as_object()
                .and_then(|obj| find_key_ci(obj, VARIABLES))
                .and_then(|vars| vars.as_object())
                .and_then(|vars| find_key_ci(vars, TSID))
                .map(json_scalar);
            Ok(tsid)
        }
        BootstrapFormat::Xml => {
            let root = Element::parse(reader).context("Failed to parse bootstrap XML")?;
            Ok(crate::xml_helpers::get_child_ci(&root, VARIABLES)
                .and_then(|vars| child_text(vars, TSID)))
        }
    }
}

fn set_tsid_json<R: Read, W: Write>(reader: R, mut writer: W, tsid: &str) -> Result<BootstrapChange> {
    let mut root: Value =
        serde_json::from_reader(reader).context("Failed to parse bootstrap JSON")?;

    let obj = root
        .as_object_mut()
        .ok_or_else(|| DeployError::BootstrapFieldMissing(VARIABLES.to_string()))?;
    let vars = find_key_ci_mut(obj, VARIABLES)
        .and_then(|v| v.as_object_mut())
        .ok_or_else(|| DeployError::BootstrapFieldMissing(VARIABLES.to_string()))?;

    let previous = match find_key_ci_mut(vars, TSID) {
        Some(slot) => {
            let previous = json_scalar(slot);
            *slot = Value::String(tsid.to_string());
            Some(previous)
        }
        None => {
            vars.insert(TSID.to_string(), Value::String(tsid.to_string()));
            None
        }
    };

    serde_json::to_writer_pretty(&mut writer, &root).context("Failed to write bootstrap JSON")?;
    writer
        .write_all(b"\n")
        .context("Failed to write bootstrap JSON")?;

    Ok(BootstrapChange {
        previous,
        tsid: tsid.to_string(),
    })
}

fn set_tsid_xml<R: Read, W: Write>(mut reader: R, writer: W, tsid: &str) -> Result<BootstrapChange> {
    let mut doc = Vec::new();
    reader
        .read_to_end(&mut doc)
        .context("Failed to read bootstrap XML")?;

    if let Some(attr) =
        find_prefixed_attribute(&doc).context("Failed to parse bootstrap XML")?
    {
        return Err(DeployError::UnsupportedBootstrapMarkup(attr).into());
    }

    let mut root = Element::parse(doc.as_slice()).context("Failed to parse bootstrap XML")?;

    let vars = get_mut_child_ci(&mut root, VARIABLES)
        .ok_or_else(|| DeployError::BootstrapFieldMissing(VARIABLES.to_string()))?;
    let previous = child_text(vars, TSID);
    set_text(ensure_child(vars, TSID), tsid);

    write_document(&root, writer)?;

    Ok(BootstrapChange {
        previous,
        tsid: tsid.to_string(),
    })
}

fn find_key_ci<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn find_key_ci_mut<'a>(obj: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Value> {
    obj.iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn json_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TSID_VALUE: &str = "b94dbbb4-2ede-4e95-8902-8a24a5a53543";

    #[test]
    fn test_json_replaces_tsid_in_place() {
        let input = r#"{"Server":"deploy01","Variables":{"TSID":"old","Site":"HQ"},"Port":443}"#;
        let mut out = Vec::new();
        let change = set_tsid(
            Cursor::new(input),
            &mut out,
            BootstrapFormat::Json,
            TSID_VALUE,
        )
        .unwrap();
        assert_eq!(change.previous.as_deref(), Some("old"));

        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["Variables"]["TSID"], TSID_VALUE);
        assert_eq!(value["Variables"]["Site"], "HQ");
        assert_eq!(value["Server"], "deploy01");
        assert_eq!(value["Port"], 443);

        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["Server", "Variables", "Port"]);
    }

    #[test]
    fn test_json_adds_missing_tsid() {
        let input = r#"{"variables":{}}"#;
        let mut out = Vec::new();
        let change =
            set_tsid(Cursor::new(input), &mut out, BootstrapFormat::Json, TSID_VALUE).unwrap();
        assert!(change.previous.is_none());
        assert_eq!(
            read_tsid(Cursor::new(&out), BootstrapFormat::Json).unwrap(),
            Some(TSID_VALUE.to_string())
        );
    }

    #[test]
    fn test_json_without_variables_fails() {
        let input = r#"{"Server":"deploy01"}"#;
        let err = set_tsid(
            Cursor::new(input),
            Vec::new(),
            BootstrapFormat::Json,
            TSID_VALUE,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::BootstrapFieldMissing(_))
        ));
    }

    #[test]
    fn test_xml_replaces_tsid() {
        let input = r#"<?xml version="1.0"?>
<Bootstrap>
  <Server>deploy01</Server>
  <Variables>
    <TSID>old</TSID>
    <Site>HQ</Site>
  </Variables>
</Bootstrap>
"#;
        let mut out = Vec::new();
        let change =
            set_tsid(Cursor::new(input), &mut out, BootstrapFormat::Xml, TSID_VALUE).unwrap();
        assert_eq!(change.previous.as_deref(), Some("old"));

        let root = Element::parse(Cursor::new(&out)).unwrap();
        let vars = root.get_child("Variables").unwrap();
        assert_eq!(
            vars.get_child("TSID").unwrap().get_text().unwrap(),
            TSID_VALUE
        );
        assert_eq!(vars.get_child("Site").unwrap().get_text().unwrap(), "HQ");
        assert_eq!(
            root.get_child("Server").unwrap().get_text().unwrap(),
            "deploy01"
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            BootstrapFormat::from_path(Path::new("boot.JSON")),
            Some(BootstrapFormat::Json)
        );
        assert_eq!(
            BootstrapFormat::from_path(Path::new("/x/bootstrap.xml")),
            Some(BootstrapFormat::Xml)
        );
        assert_eq!(BootstrapFormat::from_path(Path::new("bootstrap.ini")), None);
    }
}
