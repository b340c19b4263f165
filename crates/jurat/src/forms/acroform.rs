//! AcroForm access on top of `lopdf`: resolve fully qualified field names,
//! write text values without flattening, and read values back.
//!
//! Written fields get a plain Helvetica appearance stream so viewers that
//! ignore `NeedAppearances` still show the value; viewers that honor the flag
//! regenerate it with the field's own font and layout.

use std::collections::{BTreeMap, HashSet};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

#[derive(Debug, thiserror::Error)]
pub enum AcroFormError {
    #[error("template is not a readable PDF: {0}")]
    Parse(#[source] lopdf::Error),
    #[error("template has no interactive form")]
    MissingAcroForm,
    #[error("malformed form structure: {0}")]
    Structure(#[source] lopdf::Error),
    #[error("template has no field named '{0}'")]
    UnknownField(String),
    #[error("filled document could not be serialized: {0}")]
    Serialize(String),
}

/// An opened, writable form. The underlying document is owned by this value
/// and released when it is dropped or saved.
pub struct AcroForm {
    document: Document,
    fields: BTreeMap<String, ObjectId>,
}

impl AcroForm {
    pub fn open(bytes: &[u8]) -> Result<Self, AcroFormError> {
        let mut document = Document::load_mem(bytes).map_err(AcroFormError::Parse)?;
        // Owner-password templates open with the empty user password.
        if document.is_encrypted() {
            document.decrypt("").map_err(AcroFormError::Parse)?;
            document.trailer.remove(b"Encrypt");
        }
        let roots = {
            let acroform = acroform_dict(&document)?;
            let fields = acroform
                .get(b"Fields")
                .and_then(|fields| resolve(&document, fields))
                .and_then(Object::as_array)
                .map_err(AcroFormError::Structure)?;
            fields
                .iter()
                .filter_map(|field| field.as_reference().ok())
                .collect::<Vec<_>>()
        };
        let fields = collect_terminal_fields(&document, &roots).map_err(AcroFormError::Structure)?;
        Ok(Self { document, fields })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Current text value of a field; `None` when the field has no value.
    pub fn value(&self, name: &str) -> Result<Option<String>, AcroFormError> {
        let id = self.field_id(name)?;
        let dict = self
            .document
            .get_dictionary(id)
            .map_err(AcroFormError::Structure)?;
        Ok(match dict.get(b"V") {
            Ok(value) => resolve(&self.document, value)
                .ok()
                .and_then(|value| value.as_str().ok())
                .map(decode_text_string),
            Err(_) => None,
        })
    }

    /// Every field with a text value, keyed by fully qualified name.
    pub fn values(&self) -> Result<BTreeMap<String, String>, AcroFormError> {
        let mut values = BTreeMap::new();
        for name in self.fields.keys() {
            if let Some(value) = self.value(name)? {
                values.insert(name.clone(), value);
            }
        }
        Ok(values)
    }

    /// Writes a text value and replaces the appearance of every widget of the
    /// field. Widgets without a usable `/Rect` just lose their stale stream.
    pub fn set_text(&mut self, name: &str, value: &str) -> Result<(), AcroFormError> {
        let id = self.field_id(name)?;
        let kids: Vec<ObjectId> = {
            let dict = self
                .document
                .get_dictionary(id)
                .map_err(AcroFormError::Structure)?;
            match dict.get(b"Kids") {
                Ok(kids) => resolve(&self.document, kids)
                    .and_then(Object::as_array)
                    .map(|kids| kids.iter().filter_map(|kid| kid.as_reference().ok()).collect())
                    .unwrap_or_default(),
                Err(_) => Vec::new(),
            }
        };

        let dict = self
            .document
            .get_dictionary_mut(id)
            .map_err(AcroFormError::Structure)?;
        dict.set("V", Object::String(encode_text_string(value), StringFormat::Literal));
        dict.remove(b"AP");

        let widgets = if kids.is_empty() { vec![id] } else { kids };
        for widget in widgets {
            let rect = self
                .document
                .get_dictionary(widget)
                .ok()
                .and_then(|dict| widget_rect(&self.document, dict));
            let appearance = rect.map(|rect| self.document.add_object(text_appearance(rect, value)));
            if let Ok(widget) = self.document.get_dictionary_mut(widget) {
                match appearance {
                    Some(stream_id) => {
                        widget.set("AP", dictionary! { "N" => stream_id });
                    }
                    None => {
                        widget.remove(b"AP");
                    }
                }
            }
        }
        Ok(())
    }

    /// Serializes the form into a new buffer. The form stays fillable; viewers
    /// are asked to regenerate appearances, and any XFA packet is dropped so
    /// the AcroForm values are the ones displayed.
    pub fn save(mut self) -> Result<Vec<u8>, AcroFormError> {
        {
            let acroform = acroform_dict_mut(&mut self.document)?;
            acroform.set("NeedAppearances", Object::Boolean(true));
            acroform.remove(b"XFA");
        }

        let mut buffer = Vec::new();
        self.document
            .save_to(&mut buffer)
            .map_err(|err| AcroFormError::Serialize(err.to_string()))?;
        Ok(buffer)
    }

    fn field_id(&self, name: &str) -> Result<ObjectId, AcroFormError> {
        self.fields
            .get(name)
            .copied()
            .ok_or_else(|| AcroFormError::UnknownField(name.to_string()))
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id),
        other => Ok(other),
    }
}

fn root_id(document: &Document) -> Result<ObjectId, AcroFormError> {
    document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(AcroFormError::Structure)
}

fn acroform_dict(document: &Document) -> Result<&Dictionary, AcroFormError> {
    let catalog = document
        .get_dictionary(root_id(document)?)
        .map_err(AcroFormError::Structure)?;
    let acroform = catalog
        .get(b"AcroForm")
        .map_err(|_| AcroFormError::MissingAcroForm)?;
    resolve(document, acroform)
        .and_then(Object::as_dict)
        .map_err(|_| AcroFormError::MissingAcroForm)
}

fn acroform_dict_mut(document: &mut Document) -> Result<&mut Dictionary, AcroFormError> {
    let root = root_id(document)?;
    let indirect = document
        .get_dictionary(root)
        .map_err(AcroFormError::Structure)?
        .get(b"AcroForm")
        .map_err(|_| AcroFormError::MissingAcroForm)?
        .as_reference()
        .ok();

    match indirect {
        Some(id) => document
            .get_dictionary_mut(id)
            .map_err(|_| AcroFormError::MissingAcroForm),
        None => document
            .get_dictionary_mut(root)
            .map_err(AcroFormError::Structure)?
            .get_mut(b"AcroForm")
            .and_then(Object::as_dict_mut)
            .map_err(|_| AcroFormError::MissingAcroForm),
    }
}

fn widget_rect(document: &Document, widget: &Dictionary) -> Option<[f64; 4]> {
    let rect = widget
        .get(b"Rect")
        .and_then(|rect| resolve(document, rect))
        .and_then(Object::as_array)
        .ok()?;
    let numbers: Vec<f64> = rect.iter().filter_map(number).collect();
    match numbers.as_slice() {
        [x1, y1, x2, y2] => Some([*x1, *y1, *x2, *y2]),
        _ => None,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

/// Single-line appearance: the value left-aligned and vertically centered in
/// the widget box, Helvetica sized to the box height.
fn text_appearance(rect: [f64; 4], value: &str) -> Stream {
    let width = (rect[2] - rect[0]).abs();
    let height = (rect[3] - rect[1]).abs();

    let mut content = b"/Tx BMC\n".to_vec();
    if !value.is_empty() {
        let size = (height * 0.6).clamp(4.0, 12.0);
        let baseline = (height - size) / 2.0 + size * 0.22;
        content.extend_from_slice(
            format!("q\nBT\n/Helv {size:.2} Tf\n0 g\n2 {baseline:.2} Td\n(").as_bytes(),
        );
        content.extend(appearance_text(value));
        content.extend_from_slice(b") Tj\nET\nQ\n");
    }
    content.extend_from_slice(b"EMC\n");

    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    };
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width as _),
            Object::Real(height as _),
        ],
        "Resources" => dictionary! { "Font" => dictionary! { "Helv" => font } },
    };
    Stream::new(dict, content)
}

/// Latin-1 bytes for a literal string operand; characters Helvetica cannot
/// show become `?`.
fn appearance_text(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len());
    for ch in value.chars() {
        let byte = u8::try_from(u32::from(ch)).unwrap_or(b'?');
        if matches!(byte, b'(' | b')' | b'\\') {
            bytes.push(b'\\');
        }
        bytes.push(byte);
    }
    bytes
}

/// Walks the field hierarchy from the AcroForm roots. Nodes whose kids carry
/// no partial name are terminal fields (their kids are widgets).
fn collect_terminal_fields(
    document: &Document,
    roots: &[ObjectId],
) -> lopdf::Result<BTreeMap<String, ObjectId>> {
    let mut fields = BTreeMap::new();
    let mut visited = HashSet::new();
    let mut pending: Vec<(ObjectId, Option<String>)> =
        roots.iter().rev().map(|id| (*id, None)).collect();

    while let Some((id, parent)) = pending.pop() {
        if !visited.insert(id) {
            continue;
        }
        let dict = document.get_dictionary(id)?;
        let partial = dict
            .get(b"T")
            .ok()
            .and_then(|name| resolve(document, name).ok())
            .and_then(|name| name.as_str().ok())
            .map(decode_text_string);
        let name = match (parent, partial) {
            (Some(parent), Some(partial)) => Some(format!("{parent}.{partial}")),
            (None, Some(partial)) => Some(partial),
            (parent, None) => parent,
        };

        let kids: Vec<ObjectId> = match dict.get(b"Kids") {
            Ok(kids) => resolve(document, kids)?
                .as_array()?
                .iter()
                .filter_map(|kid| kid.as_reference().ok())
                .filter(|kid| {
                    document
                        .get_dictionary(*kid)
                        .map(|kid| kid.has(b"T"))
                        .unwrap_or(false)
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        if kids.is_empty() {
            if let Some(name) = name {
                fields.insert(name, id);
            }
        } else {
            for kid in kids.into_iter().rev() {
                pending.push((kid, name.clone()));
            }
        }
    }

    Ok(fields)
}

/// PDF text strings: UTF-16BE when prefixed with a byte order mark,
/// otherwise single-byte (read as Latin-1, which covers printable ASCII).
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

pub(crate) fn encode_text_string(value: &str) -> Vec<u8> {
    if value.is_ascii() {
        return value.as_bytes().to_vec();
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}
