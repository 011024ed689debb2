//! Minimal round-trippable XML element tree.
//!
//! Whitespace-only text is dropped on parse and the writer re-indents, so a
//! parse/serialize cycle is stable but not byte-identical to hand-written
//! input. Elements, attributes, text, CDATA, comments, processing
//! instructions and the doctype survive, including comments around the root
//! element.
//!
//! Input is decoded per its XML declaration (UTF-8 when none is given).
//! Output is always UTF-8.

use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};

use super::DescriptorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// Markup allowed before or after the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Misc {
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written (`web-app` or `j2ee:web-app`).
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// `<name>text</name>`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(XmlNode::Text(text.into()));
        element
    }

    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Qualify `local_name` with this element's namespace prefix, if any.
    pub fn sibling_name(&self, local_name: &str) -> String {
        match self.name.split_once(':') {
            Some((prefix, _)) => format!("{prefix}:{local_name}"),
            None => local_name.to_string(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Concatenated direct text and CDATA content, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let XmlNode::Text(text) | XmlNode::CData(text) = child {
                out.push_str(text);
            }
        }
        out.trim().to_string()
    }

    pub fn set_text(&mut self, text: &str) {
        self.children
            .retain(|child| !matches!(child, XmlNode::Text(_) | XmlNode::CData(_)));
        self.children.push(XmlNode::Text(text.to_string()));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Child elements whose local name is `local_name`.
    pub fn children_named<'a, 'b>(
        &'a self,
        local_name: &'b str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'b> {
        self.elements()
            .filter(move |element| element.local_name() == local_name)
    }

    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.children_named(local_name).next()
    }

    pub fn child_mut(&mut self, local_name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|child| match child {
            XmlNode::Element(element) if element.local_name() == local_name => Some(element),
            _ => None,
        })
    }

    /// Text of the first child named `local_name`.
    pub fn child_text(&self, local_name: &str) -> Option<String> {
        self.child(local_name).map(Element::text)
    }

    pub fn push(&mut self, element: Element) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn insert(&mut self, index: usize, element: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(element));
    }
}

fn local(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// A parsed XML document: one root element plus the markup around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub prolog: Vec<Misc>,
    pub root: Element,
    pub epilog: Vec<Misc>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    pub fn doctype(&self) -> Option<&str> {
        self.prolog.iter().find_map(|misc| match misc {
            Misc::DocType(doctype) => Some(doctype.as_str()),
            _ => None,
        })
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, DescriptorError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|err| malformed(reader.buffer_position(), err))?;
            // The declaration may switch the decoder, so fetch it per event.
            let decoder = reader.decoder();
            match event {
                Event::Start(start) => stack.push(element_from(&start, decoder, position)?),
                Event::Empty(start) => {
                    let element = element_from(&start, decoder, position)?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed(position, "unexpected end tag"))?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|err| malformed(position, err))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(value.into_owned()));
                    }
                }
                Event::CData(cdata) => {
                    let value = decode(decoder, &cdata, position)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::CData(value));
                    }
                }
                Event::Comment(comment) => {
                    let value = decode(decoder, &comment, position)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Comment(value)),
                        None => outside(root.is_some(), &mut prolog, &mut epilog)
                            .push(Misc::Comment(value)),
                    }
                }
                Event::PI(instruction) => {
                    let value = decode(decoder, &instruction, position)?;
                    match stack.last_mut() {
                        Some(parent) => parent
                            .children
                            .push(XmlNode::ProcessingInstruction(value)),
                        None => outside(root.is_some(), &mut prolog, &mut epilog)
                            .push(Misc::ProcessingInstruction(value)),
                    }
                }
                Event::DocType(value) => {
                    let value = decode(decoder, &value, position)?;
                    prolog.push(Misc::DocType(value.trim().to_string()));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(
                reader.buffer_position(),
                format!("unclosed element <{}>", open.name),
            ));
        }
        let root = root.ok_or(DescriptorError::MissingRoot)?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize with a UTF-8 declaration and four-space indentation.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DescriptorError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        for misc in &self.prolog {
            write_misc(&mut writer, misc)?;
        }
        write_element(&mut writer, &self.root)?;
        for misc in &self.epilog {
            write_misc(&mut writer, misc)?;
        }
        let mut out = writer.into_inner();
        out.push(b'\n');
        Ok(out)
    }
}

fn outside<'a>(
    after_root: bool,
    prolog: &'a mut Vec<Misc>,
    epilog: &'a mut Vec<Misc>,
) -> &'a mut Vec<Misc> {
    if after_root { epilog } else { prolog }
}

fn decode(decoder: Decoder, raw: &[u8], position: u64) -> Result<String, DescriptorError> {
    decoder
        .decode(raw)
        .map(Cow::into_owned)
        .map_err(|err| malformed(position, err))
}

fn element_from(
    start: &BytesStart<'_>,
    decoder: Decoder,
    position: u64,
) -> Result<Element, DescriptorError> {
    let name = decode(decoder, start.name().as_ref(), position)?;
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| malformed(position, err))?;
        let key = decode(decoder, attribute.key.as_ref(), position)?;
        let value = attribute
            .decode_and_unescape_value(decoder)
            .map_err(|err| malformed(position, err))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<(), DescriptorError> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(malformed(
            position,
            format!("second root element <{}>", element.name),
        ));
    }
    *root = Some(element);
    Ok(())
}

fn write_misc(writer: &mut Writer<Vec<u8>>, misc: &Misc) -> Result<(), DescriptorError> {
    let event = match misc {
        Misc::Comment(text) => Event::Comment(BytesText::from_escaped(text.as_str())),
        Misc::ProcessingInstruction(text) => Event::PI(BytesPI::new(text.as_str())),
        Misc::DocType(text) => Event::DocType(BytesText::from_escaped(text.as_str())),
    };
    writer.write_event(event).map_err(write_error)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), DescriptorError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_error)?;
        return Ok(());
    }
    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in &element.children {
        match child {
            XmlNode::Element(nested) => write_element(writer, nested)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
            XmlNode::CData(text) => writer
                .write_event(Event::CData(BytesCData::new(text.as_str())))
                .map_err(write_error)?,
            XmlNode::Comment(text) => writer
                .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                .map_err(write_error)?,
            XmlNode::ProcessingInstruction(text) => writer
                .write_event(Event::PI(BytesPI::new(text.as_str())))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)?;
    Ok(())
}

fn malformed(position: u64, err: impl Display) -> DescriptorError {
    DescriptorError::Malformed {
        position,
        message: err.to_string(),
    }
}

fn write_error(err: impl Display) -> DescriptorError {
    DescriptorError::Write(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Licensed under ASL 2.0 -->
<!DOCTYPE web-app PUBLIC "-//Sun Microsystems, Inc.//DTD Web Application 2.3//EN" "http://java.sun.com/dtd/web-app_2_3.dtd">
<web-app version="2.3">
  <!-- keep me -->
  <?generator shop-build?>
  <display-name>Shop &amp; Co</display-name>
  <context-param><param-name>a</param-name><param-value><![CDATA[x < y]]></param-value></context-param>
  <distributable/>
</web-app>
<!-- end of descriptor -->
"#;

    #[test]
    fn parse_keeps_structure() {
        let doc = Document::parse(SAMPLE.as_bytes()).expect("parse");
        assert!(doc.doctype().is_some_and(|d| d.starts_with("web-app PUBLIC")));
        assert_eq!(doc.root.attribute("version"), Some("2.3"));
        assert_eq!(doc.root.child_text("display-name").as_deref(), Some("Shop & Co"));
        let param = doc.root.child("context-param").expect("param");
        assert_eq!(param.child_text("param-value").as_deref(), Some("x < y"));
        assert!(doc.root.child("distributable").is_some());
        assert!(
            doc.root
                .children
                .iter()
                .any(|node| matches!(node, XmlNode::Comment(c) if c.trim() == "keep me"))
        );
        assert!(doc.root.children.iter().any(
            |node| matches!(node, XmlNode::ProcessingInstruction(pi) if pi.starts_with("generator"))
        ));
    }

    #[test]
    fn comments_around_root_survive_serialization() {
        let doc = Document::parse(SAMPLE.as_bytes()).expect("parse");
        assert!(matches!(
            doc.prolog.as_slice(),
            [Misc::Comment(license), Misc::DocType(_)] if license.trim() == "Licensed under ASL 2.0"
        ));
        assert!(matches!(
            doc.epilog.as_slice(),
            [Misc::Comment(end)] if end.trim() == "end of descriptor"
        ));

        let written = String::from_utf8(doc.to_bytes().expect("serialize")).expect("utf8");
        let license = written.find("Licensed under ASL 2.0").expect("license kept");
        let root = written.find("<web-app").expect("root");
        let end = written.find("end of descriptor").expect("trailer kept");
        assert!(license < root && root < end);
    }

    #[test]
    fn serialize_then_parse_is_stable() {
        let doc = Document::parse(SAMPLE.as_bytes()).expect("parse");
        let bytes = doc.to_bytes().expect("serialize");
        let reparsed = Document::parse(&bytes).expect("reparse");
        assert_eq!(reparsed, doc);
        assert_eq!(reparsed.to_bytes().expect("serialize"), bytes);
    }

    #[test]
    fn latin1_input_is_decoded_and_written_as_utf8() {
        let input = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<web-app><display-name>Caf\xe9</display-name></web-app>";
        let doc = Document::parse(input).expect("parse");
        assert_eq!(doc.root.child_text("display-name").as_deref(), Some("Caf\u{e9}"));

        let written = String::from_utf8(doc.to_bytes().expect("serialize")).expect("utf8");
        assert!(written.contains("encoding=\"UTF-8\""));
        assert!(written.contains("Caf\u{e9}"));
    }

    #[test]
    fn prefixed_names_match_by_local_name() {
        let doc = Document::parse(b"<j:web-app xmlns:j=\"urn:x\"><j:servlet/></j:web-app>")
            .expect("parse");
        assert_eq!(doc.root.local_name(), "web-app");
        assert!(doc.root.child("servlet").is_some());
        assert_eq!(doc.root.sibling_name("servlet-mapping"), "j:servlet-mapping");
    }

    #[test]
    fn rejects_unclosed_empty_and_undecodable_documents() {
        assert!(matches!(
            Document::parse(b"<web-app><servlet>"),
            Err(DescriptorError::Malformed { .. })
        ));
        assert!(matches!(
            Document::parse(b""),
            Err(DescriptorError::MissingRoot)
        ));
        assert!(matches!(
            Document::parse(b"<web-app>\xff</web-app>"),
            Err(DescriptorError::Malformed { .. })
        ));
    }
}
