use crate::models::{Address, Identifier, SanctionRecord};
use crate::xml::{Namespace, XmlElement};

const ID_TAG: &str = "uid";
const NAME_PART_TAGS: [&str; 3] = ["firstName", "middleName", "lastName"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    EntityType,
    AkaNames,
    Addresses,
    Identifiers,
    Programs,
    Remarks,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldShape {
    Scalar { tag: &'static str },
    TextList {
        item: &'static str,
        leaf: Option<&'static str>,
    },
    PairList {
        item: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub field: Field,
    pub containers: &'static [&'static str],
    pub shape: FieldShape,
}

pub const OPTIONAL_FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor {
        field: Field::EntityType,
        containers: &[],
        shape: FieldShape::Scalar { tag: "sdnType" },
    },
    FieldDescriptor {
        field: Field::AkaNames,
        containers: &["akaList"],
        shape: FieldShape::TextList {
            item: "aka",
            leaf: Some("lastName"),
        },
    },
    FieldDescriptor {
        field: Field::Addresses,
        containers: &["addressList"],
        shape: FieldShape::PairList {
            item: "address",
            first: "city",
            second: "country",
        },
    },
    FieldDescriptor {
        field: Field::Identifiers,
        containers: &["idList"],
        shape: FieldShape::PairList {
            item: "id",
            first: "idType",
            second: "idNumber",
        },
    },
    FieldDescriptor {
        field: Field::Programs,
        containers: &["programList", "programs"],
        shape: FieldShape::TextList {
            item: "program",
            leaf: None,
        },
    },
    FieldDescriptor {
        field: Field::Remarks,
        containers: &[],
        shape: FieldShape::Scalar { tag: "remarks" },
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Text(String),
    Texts(Vec<String>),
    Pairs(Vec<(String, String)>),
}

impl Extracted {
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Texts(_) | Self::Pairs(_) => None,
        }
    }

    pub fn into_texts(self) -> Vec<String> {
        match self {
            Self::Texts(texts) => texts,
            Self::Text(text) => vec![text],
            Self::Pairs(_) => Vec::new(),
        }
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        match self {
            Self::Pairs(pairs) => pairs,
            Self::Text(_) | Self::Texts(_) => Vec::new(),
        }
    }
}

pub fn extract(entry: &XmlElement, ns: Namespace<'_>, descriptor: &FieldDescriptor) -> Option<Extracted> {
    match descriptor.shape {
        FieldShape::Scalar { tag } => entry
            .child(ns, tag)
            .and_then(XmlElement::non_empty_text)
            .map(|text| Extracted::Text(text.to_string())),
        FieldShape::TextList { item, leaf } => {
            let container = find_container(entry, ns, descriptor.containers)?;
            let texts: Vec<String> = container
                .children(ns, item)
                .filter_map(|node| match leaf {
                    Some(leaf) => node.child(ns, leaf),
                    None => Some(node),
                })
                .filter_map(XmlElement::non_empty_text)
                .map(str::to_string)
                .collect();
            Some(texts).filter(|texts| !texts.is_empty()).map(Extracted::Texts)
        }
        FieldShape::PairList { item, first, second } => {
            let container = find_container(entry, ns, descriptor.containers)?;
            let pairs: Vec<(String, String)> = container
                .children(ns, item)
                .filter_map(|node| {
                    let left = node.child(ns, first)?;
                    let right = node.child(ns, second)?;
                    Some((
                        left.trimmed_text().to_string(),
                        right.trimmed_text().to_string(),
                    ))
                })
                .collect();
            Some(pairs).filter(|pairs| !pairs.is_empty()).map(Extracted::Pairs)
        }
    }
}

fn find_container<'e>(
    entry: &'e XmlElement,
    ns: Namespace<'_>,
    containers: &[&str],
) -> Option<&'e XmlElement> {
    containers.iter().find_map(|tag| entry.child(ns, tag))
}

pub fn normalize(entry: &XmlElement, ns: Namespace<'_>) -> Option<SanctionRecord> {
    let id = entry.child(ns, ID_TAG)?.non_empty_text()?.to_string();

    let name = NAME_PART_TAGS
        .iter()
        .filter_map(|tag| entry.child(ns, tag))
        .filter_map(XmlElement::non_empty_text)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        return None;
    }

    let mut record = SanctionRecord {
        id,
        name,
        entity_type: None,
        aka_names: Vec::new(),
        addresses: Vec::new(),
        identifiers: Vec::new(),
        programs: Vec::new(),
        remarks: None,
    };

    for descriptor in &OPTIONAL_FIELDS {
        if let Some(value) = extract(entry, ns, descriptor) {
            apply(&mut record, descriptor.field, value);
        }
    }

    Some(record)
}

fn apply(record: &mut SanctionRecord, field: Field, value: Extracted) {
    match field {
        Field::EntityType => record.entity_type = value.into_text(),
        Field::Remarks => record.remarks = value.into_text(),
        Field::AkaNames => record.aka_names = value.into_texts(),
        Field::Programs => record.programs = value.into_texts(),
        Field::Addresses => {
            record.addresses = value
                .into_pairs()
                .into_iter()
                .map(|(city, country)| Address { city, country })
                .collect();
        }
        Field::Identifiers => {
            record.identifiers = value
                .into_pairs()
                .into_iter()
                .map(|(id_type, id_number)| Identifier { id_type, id_number })
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn entry(xml: &str) -> XmlElement {
        parse_document(xml.as_bytes()).expect("fixture should parse")
    }

    #[test]
    fn minimal_entry_omits_optional_keys() -> Result<(), Box<dyn std::error::Error>> {
        let node = entry(
            "<sdnEntry><uid>1</uid><lastName>Doe</lastName><programs><program>X</program></programs></sdnEntry>",
        );

        let record = normalize(&node, node.document_namespace()).ok_or("entry dropped")?;
        assert_eq!(
            serde_json::to_value(&record)?,
            serde_json::json!({"id": "1", "name": "Doe", "programs": ["X"]})
        );
        Ok(())
    }

    #[test]
    fn entries_without_uid_or_name_are_dropped() {
        let no_uid = entry("<sdnEntry><lastName>Doe</lastName></sdnEntry>");
        let blank_uid = entry("<sdnEntry><uid>  </uid><lastName>Doe</lastName></sdnEntry>");
        let no_name = entry("<sdnEntry><uid>1</uid><sdnType>Entity</sdnType></sdnEntry>");
        let blank_name = entry("<sdnEntry><uid>1</uid><firstName> </firstName></sdnEntry>");

        for node in [no_uid, blank_uid, no_name, blank_name] {
            assert_eq!(normalize(&node, node.document_namespace()), None);
        }
    }

    #[test]
    fn name_parts_join_in_fixed_order() {
        let node = entry(
            "<sdnEntry><uid>2</uid><lastName> Doe </lastName><firstName>John</firstName><middleName>Q</middleName></sdnEntry>",
        );
        let record = normalize(&node, node.document_namespace());
        assert_eq!(record.map(|r| r.name), Some("John Q Doe".to_string()));
    }

    #[test]
    fn full_entry_collects_every_field() -> Result<(), Box<dyn std::error::Error>> {
        let node = entry(
            r#"<sdnEntry>
                <uid>36</uid>
                <lastName>AEROCARIBBEAN AIRLINES</lastName>
                <sdnType>Entity</sdnType>
                <programList><program>CUBA</program><program> </program></programList>
                <idList>
                    <id><idType>Passport</idType><idNumber>AB123</idNumber></id>
                    <id><idType>Tax ID</idType></id>
                </idList>
                <akaList>
                    <aka><lastName>AERO-CARIBBEAN</lastName></aka>
                    <aka><firstName>only</firstName></aka>
                </akaList>
                <addressList>
                    <address><city>Havana</city><country>Cuba</country></address>
                    <address><city/><country>Cuba</country></address>
                    <address><country>Cuba</country></address>
                </addressList>
                <remarks>  note  </remarks>
            </sdnEntry>"#,
        );

        let record = normalize(&node, node.document_namespace()).ok_or("entry dropped")?;
        assert_eq!(record.entity_type.as_deref(), Some("Entity"));
        assert_eq!(record.programs, vec!["CUBA"]);
        assert_eq!(record.aka_names, vec!["AERO-CARIBBEAN"]);
        assert_eq!(
            record.identifiers,
            vec![Identifier {
                id_type: "Passport".to_string(),
                id_number: "AB123".to_string()
            }]
        );
        assert_eq!(record.addresses.len(), 2);
        assert_eq!(record.addresses[1].city, "");
        assert_eq!(record.remarks.as_deref(), Some("note"));
        Ok(())
    }

    #[test]
    fn lists_with_only_blank_items_are_omitted() -> Result<(), Box<dyn std::error::Error>> {
        let node = entry(
            "<sdnEntry><uid>3</uid><lastName>X</lastName><akaList><aka><lastName/></aka></akaList><programList/></sdnEntry>",
        );
        let record = normalize(&node, node.document_namespace()).ok_or("entry dropped")?;
        let value = serde_json::to_value(&record)?;
        assert!(value.get("aka_names").is_none());
        assert!(value.get("programs").is_none());
        Ok(())
    }

    #[test]
    fn extracted_values_convert_by_shape() {
        assert_eq!(Extracted::Text("a".to_string()).into_text().as_deref(), Some("a"));
        assert_eq!(Extracted::Text("a".to_string()).into_texts(), vec!["a"]);
        assert_eq!(Extracted::Texts(vec!["a".to_string()]).into_text(), None);
        assert!(Extracted::Texts(vec!["a".to_string()]).into_pairs().is_empty());
    }

    #[test]
    fn descriptors_ignore_foreign_namespace_children() {
        let node = entry(
            r#"<sdnEntry xmlns="urn:sdn" xmlns:o="urn:other"><uid>4</uid><lastName>Y</lastName><o:remarks>hidden</o:remarks></sdnEntry>"#,
        );
        let record = normalize(&node, node.document_namespace());
        assert_eq!(record.and_then(|r| r.remarks), None);
    }
}
