use crate::document::{ATTR_PREFIX, Document, Element, Node, TEXT_KEY};
use crate::error::DomainError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

impl Document {
    /// Parses a domain description.
    ///
    /// Comments, processing instructions, the XML declaration and DOCTYPE are
    /// not content and are dropped. Whitespace around character data is
    /// trimmed, and mixed content is merged into a single `#text` entry.
    pub fn parse(input: &[u8]) -> Result<Document, DomainError> {
        let input = std::str::from_utf8(input)?;
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<(String, Element)> = Vec::new();
        let mut root: Option<Document> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(DomainError::MultipleRoots(element_name(&start)?));
                    }
                    stack.push((element_name(&start)?, attributes(&start)?));
                }
                Event::Empty(start) => {
                    let name = element_name(&start)?;
                    let element = attributes(&start)?;
                    close(&mut stack, &mut root, name, element)?;
                }
                Event::End(_) => {
                    let (name, element) = stack.pop().ok_or(DomainError::MissingRoot)?;
                    close(&mut stack, &mut root, name, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(quick_xml::Error::from)?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let text = std::str::from_utf8(&data)?;
                    push_text(&mut stack, text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((name, _)) = stack.pop() {
            return Err(DomainError::Unclosed(name));
        }
        root.ok_or(DomainError::MissingRoot)
    }

    /// Serializes the document back into XML without a declaration.
    pub fn to_xml(&self) -> Result<Vec<u8>, DomainError> {
        let mut writer = Writer::new(Vec::new());
        write_node(&mut writer, self.name(), self.body())?;
        Ok(writer.into_inner())
    }
}

fn element_name(start: &BytesStart<'_>) -> Result<String, DomainError> {
    Ok(std::str::from_utf8(start.name().as_ref())?.to_string())
}

fn attributes(start: &BytesStart<'_>) -> Result<Element, DomainError> {
    let mut element = Element::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
        element.insert(
            format!("{ATTR_PREFIX}{key}"),
            Node::Text(value.into_owned()),
        );
    }
    Ok(element)
}

fn push_text(stack: &mut [(String, Element)], text: &str) -> Result<(), DomainError> {
    if text.is_empty() {
        return Ok(());
    }
    let (_, current) = stack.last_mut().ok_or(DomainError::StrayText)?;
    current.push_text(text);
    Ok(())
}

fn close(
    stack: &mut [(String, Element)],
    root: &mut Option<Document>,
    name: String,
    element: Element,
) -> Result<(), DomainError> {
    let node = element.into_node();
    match stack.last_mut() {
        Some((_, parent)) => parent.append(name, node),
        None if root.is_some() => return Err(DomainError::MultipleRoots(name)),
        None => *root = Some(Document::new(name, node)),
    }
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, name: &str, node: &Node) -> Result<(), DomainError> {
    match node {
        Node::Text(text) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Node::List(items) => {
            for item in items {
                write_node(writer, name, item)?;
            }
        }
        Node::Element(element) => {
            let mut start = BytesStart::new(name);
            for (key, value) in element.iter() {
                let Some(attr) = key.strip_prefix(ATTR_PREFIX) else {
                    continue;
                };
                let Node::Text(value) = value else {
                    return Err(DomainError::InvalidAttribute(attr.to_string()));
                };
                start.push_attribute((attr, value.as_str()));
            }

            let mut content = element
                .iter()
                .filter(|(key, _)| !key.starts_with(ATTR_PREFIX))
                .peekable();
            if content.peek().is_none() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }

            writer.write_event(Event::Start(start))?;
            for (key, value) in content {
                match (key, value) {
                    (TEXT_KEY, Node::Text(text)) => {
                        writer.write_event(Event::Text(BytesText::new(text)))?;
                    }
                    _ => write_node(writer, key, value)?,
                }
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN_XML: &str = r#"<?xml version="1.0"?>
<!-- generated -->
<domain type="kvm" xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0">
  <name>default_testvmi</name>
  <memory unit="b">8388608</memory>
  <os>
    <type arch="x86_64" machine="q35">hvm</type>
    <boot dev="hd"/>
  </os>
  <features>
    <acpi/>
    <apic/>
  </features>
  <clock offset="utc">
    <timer name="rtc" tickpolicy="catchup"/>
    <timer name="pit" tickpolicy="delay"/>
  </clock>
  <devices>
    <disk type="file" device="disk">
      <driver name="qemu" type="raw" cache="none"/>
      <source file="/var/run/kubevirt-private/vmi-disks/disk0/disk.img"/>
      <target dev="vda" bus="virtio"/>
    </disk>
    <serial type="unix"><![CDATA[raw & unescaped]]></serial>
  </devices>
  <description>a &amp; b</description>
</domain>
"#;

    #[test]
    fn test_parse_structure() {
        let doc = Document::parse(DOMAIN_XML.as_bytes()).unwrap();
        assert_eq!(doc.name(), "domain");

        let root = doc.body().as_element().unwrap();
        assert_eq!(root.attribute("type"), Some("kvm"));
        assert_eq!(root.get("name"), Some(&Node::Text("default_testvmi".into())));
        assert_eq!(
            doc.value_for_path("domain.description").and_then(Node::as_text),
            Some("a & b")
        );

        let memory = root.get("memory").and_then(Node::as_element).unwrap();
        assert_eq!(memory.attribute("unit"), Some("b"));
        assert_eq!(memory.text(), Some("8388608"));

        let Some(Node::List(timers)) = doc.value_for_path("domain.clock.timer") else {
            panic!("timers should be a list");
        };
        assert_eq!(timers.len(), 2);

        let features = doc
            .value_for_path("domain.features")
            .and_then(Node::as_element)
            .unwrap();
        assert_eq!(features.get("acpi"), Some(&Node::empty()));

        let serial = doc
            .value_for_path("domain.devices.serial")
            .and_then(Node::as_element)
            .unwrap();
        assert_eq!(serial.text(), Some("raw & unescaped"));
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let doc = Document::parse(DOMAIN_XML.as_bytes()).unwrap();
        let xml = doc.to_xml().unwrap();
        let reparsed = Document::parse(&xml).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_round_trip_after_edit_keeps_untouched_elements() {
        let mut doc = Document::parse(DOMAIN_XML.as_bytes()).unwrap();
        doc.ensure_path("domain.qemu:commandline").unwrap();

        let reparsed = Document::parse(&doc.to_xml().unwrap()).unwrap();
        assert!(reparsed.exists("domain.qemu:commandline"));

        let original = Document::parse(DOMAIN_XML.as_bytes()).unwrap();
        for (key, node) in original.body().as_element().unwrap().iter() {
            assert_eq!(
                reparsed.body().as_element().unwrap().get(key),
                Some(node),
                "{key} changed"
            );
        }
    }

    #[test]
    fn test_serialize_escapes() {
        let mut root = Element::new();
        root.insert("-name", Node::Text("a\"b".into()));
        root.insert("note", Node::Text("<x> & y".into()));
        let doc = Document::new("domain", Node::Element(root));

        let xml = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert!(!xml.contains("<x>"));
        assert_eq!(Document::parse(xml.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn test_empty_root() {
        let doc = Document::parse(b"<domain/>").unwrap();
        assert_eq!(doc.body(), &Node::empty());
        assert_eq!(doc.to_xml().unwrap(), b"<domain/>");
    }

    #[test]
    fn test_non_scalar_attribute_is_rejected() {
        let mut root = Element::new();
        root.insert("-type", Node::empty());
        let doc = Document::new("domain", Node::Element(root));
        assert!(matches!(
            doc.to_xml(),
            Err(DomainError::InvalidAttribute(_))
        ));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            Document::parse(b""),
            Err(DomainError::MissingRoot)
        ));
        assert!(matches!(
            Document::parse(b"  \n "),
            Err(DomainError::MissingRoot)
        ));
        assert!(matches!(
            Document::parse(b"<a/><b/>"),
            Err(DomainError::MultipleRoots(_))
        ));
        assert!(matches!(
            Document::parse(b"text<a/>"),
            Err(DomainError::StrayText)
        ));
        assert!(Document::parse(b"<domain><name>x</domain>").is_err());
        assert!(Document::parse(b"<domain><devices>").is_err());
        assert!(Document::parse(&[0x3c, 0xff, 0xfe, 0x3e]).is_err());
    }

    #[test]
    fn test_interleaved_siblings_keep_document_order() {
        let input = br#"<domain><devices><disk a="1"/><interface/><disk a="2"/></devices></domain>"#;
        let mut doc = Document::parse(input).unwrap();
        doc.ensure_path("domain.features").unwrap();

        let xml = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert_eq!(
            xml,
            r#"<domain><devices><disk a="1"/><interface/><disk a="2"/></devices><features/></domain>"#
        );
        assert_eq!(Document::parse(xml.as_bytes()).unwrap(), doc);
    }
}
