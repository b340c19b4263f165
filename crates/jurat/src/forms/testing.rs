//! In-process construction of small AcroForm templates for tests.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::acroform::encode_text_string;
use super::mapping::FormTable;

#[derive(Default)]
struct Node {
    value: Option<String>,
    children: BTreeMap<String, Node>,
}

/// Builds a one-page PDF whose AcroForm holds text fields with the given
/// fully qualified names; dotted names become nested field nodes.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    fields: Vec<(String, String)>,
    xfa: bool,
    appearances: bool,
    acroform: bool,
    broken_encryption: bool,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            xfa: false,
            appearances: false,
            acroform: true,
            broken_encryption: false,
        }
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template declaring every target of `table`, each prefilled with
    /// `default_value`.
    pub fn for_table(table: &FormTable, default_value: &str) -> Self {
        table
            .targets()
            .fold(Self::new(), |builder, target| builder.field(target, default_value))
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_xfa(mut self) -> Self {
        self.xfa = true;
        self
    }

    pub fn with_appearances(mut self) -> Self {
        self.appearances = true;
        self
    }

    pub fn without_acroform(mut self) -> Self {
        self.acroform = false;
        self
    }

    /// Declares a standard security handler the document cannot satisfy:
    /// no owner or user key and no file identifier.
    pub fn with_broken_encryption(mut self) -> Self {
        self.broken_encryption = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let page_id = document.new_object_id();

        let mut tree = Node::default();
        for (name, value) in &self.fields {
            let node = name
                .split('.')
                .fold(&mut tree, |node, partial| {
                    node.children.entry(partial.to_string()).or_default()
                });
            node.value = Some(value.clone());
        }

        let mut annots = Vec::new();
        let roots: Vec<Object> = tree
            .children
            .iter()
            .map(|(partial, node)| {
                Object::Reference(self.emit(&mut document, partial, node, None, page_id, &mut annots))
            })
            .collect();

        let page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Annots" => annots,
        };
        document.objects.insert(page_id, Object::Dictionary(page));
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        };
        document.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if self.acroform {
            let mut acroform = dictionary! {
                "Fields" => roots,
                "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
            };
            if self.xfa {
                let packet = Stream::new(Dictionary::new(), b"<xdp:xdp/>".to_vec());
                acroform.set("XFA", document.add_object(packet));
            }
            let acroform_id = document.add_object(acroform);
            catalog.set("AcroForm", acroform_id);
        }
        let catalog_id = document.add_object(catalog);
        document.trailer.set("Root", catalog_id);
        if self.broken_encryption {
            let encrypt_id = document.add_object(dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
                "P" => -4,
            });
            document.trailer.set("Encrypt", encrypt_id);
        }

        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .expect("in-memory template serializes");
        bytes
    }

    fn emit(
        &self,
        document: &mut Document,
        partial: &str,
        node: &Node,
        parent: Option<ObjectId>,
        page_id: ObjectId,
        annots: &mut Vec<Object>,
    ) -> ObjectId {
        let id = document.new_object_id();
        let mut dict = dictionary! { "T" => Object::string_literal(partial) };
        if let Some(parent) = parent {
            dict.set("Parent", parent);
        }

        match &node.value {
            Some(value) => {
                dict.set("FT", "Tx");
                dict.set(
                    "V",
                    Object::String(encode_text_string(value), StringFormat::Literal),
                );
                dict.set("Type", "Annot");
                dict.set("Subtype", "Widget");
                dict.set("Rect", vec![0.into(), 0.into(), 200.into(), 20.into()]);
                dict.set("P", page_id);
                if self.appearances {
                    let appearance = Stream::new(Dictionary::new(), b"/Tx BMC EMC".to_vec());
                    let appearance_id = document.add_object(appearance);
                    dict.set("AP", dictionary! { "N" => appearance_id });
                }
                annots.push(Object::Reference(id));
            }
            None => {
                let kids: Vec<Object> = node
                    .children
                    .iter()
                    .map(|(child, child_node)| {
                        Object::Reference(self.emit(
                            document,
                            child,
                            child_node,
                            Some(id),
                            page_id,
                            annots,
                        ))
                    })
                    .collect();
                dict.set("Kids", kids);
            }
        }

        document.objects.insert(id, Object::Dictionary(dict));
        id
    }
}
