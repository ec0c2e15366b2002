use crate::error::TransformError;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub local_name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace<'a>(pub Option<&'a str>);

impl XmlElement {
    pub fn document_namespace(&self) -> Namespace<'_> {
        Namespace(self.namespace.as_deref())
    }

    pub fn is(&self, ns: Namespace<'_>, name: &str) -> bool {
        self.local_name == name && self.namespace.as_deref() == ns.0
    }

    pub fn child(&self, ns: Namespace<'_>, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.is(ns, name))
    }

    pub fn children<'s>(
        &'s self,
        ns: Namespace<'s>,
        name: &'s str,
    ) -> impl Iterator<Item = &'s XmlElement> + 's {
        self.children.iter().filter(move |child| child.is(ns, name))
    }

    pub fn descendants(&self, ns: Namespace<'_>, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        let mut pending: Vec<&XmlElement> = self.children.iter().rev().collect();

        while let Some(element) = pending.pop() {
            if element.is(ns, name) {
                found.push(element);
            }
            pending.extend(element.children.iter().rev());
        }

        found
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    pub fn non_empty_text(&self) -> Option<&str> {
        Some(self.trimmed_text()).filter(|text| !text.is_empty())
    }
}

pub fn parse_document(bytes: &[u8]) -> Result<XmlElement, TransformError> {
    let text = std::str::from_utf8(bytes)?;
    let mut reader = NsReader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|error| TransformError::Xml(format!("{error} at byte {position}")))?;

        match event {
            Event::Start(start) => {
                let element = new_element(resolved, start.local_name().as_ref())?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = new_element(resolved, start.local_name().as_ref())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    TransformError::Xml(format!("unbalanced closing tag at byte {position}"))
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(content) => {
                if let Some(current) = stack.last_mut() {
                    let unescaped = content
                        .unescape()
                        .map_err(|error| TransformError::Xml(error.to_string()))?;
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(content) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&content.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(TransformError::Xml(
            "unexpected end of document inside an open element".to_string(),
        ));
    }

    root.ok_or(TransformError::MissingRoot)
}

fn new_element(resolved: ResolveResult<'_>, local_name: &[u8]) -> Result<XmlElement, TransformError> {
    let namespace = match resolved {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(TransformError::Xml(format!(
                "unknown namespace prefix {}",
                String::from_utf8_lossy(&prefix)
            )));
        }
    };

    Ok(XmlElement {
        namespace,
        local_name: String::from_utf8_lossy(local_name).into_owned(),
        ..Default::default()
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), TransformError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(TransformError::Xml(
            "document has more than one root element".to_string(),
        ));
    }

    *root = Some(element);
    Ok(())
}
