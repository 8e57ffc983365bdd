//! Serialized descriptor-tree input model.
//!
//! The engine does not parse schema source text. An external reflection
//! layer emits this JSON shape; `into_descriptors` rebuilds the arena in
//! declaration order. Example:
//!
//! ```json
//! {
//!   "files": [{
//!     "path": "library/v1/shelf.proto",
//!     "package": "library.v1",
//!     "messages": [{
//!       "name": "CreateBookShelfRequest",
//!       "fields": [{"name": "parent", "type": "string", "behaviors": ["required"]}]
//!     }]
//!   }]
//! }
//! ```

use crate::config::FatalError;
use crate::descriptor::{
    Directive, DescriptorSet, FieldBehavior, ResourceMeta, TreeBuilder,
};
use crate::rule::Target;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
/// Root of a serialized descriptor tree.
pub struct SchemaSet {
    #[serde(default)]
    pub files: Vec<SchemaFile>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaFile {
    pub path: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub directives: Vec<SchemaDirective>,
    #[serde(default)]
    pub messages: Vec<SchemaMessage>,
    #[serde(default)]
    pub enums: Vec<SchemaEnum>,
    #[serde(default)]
    pub services: Vec<SchemaService>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaMessage {
    pub name: String,
    #[serde(default)]
    pub pos: Option<SchemaPos>,
    #[serde(default)]
    pub directives: Vec<SchemaDirective>,
    #[serde(default)]
    pub resource: Option<SchemaResource>,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    #[serde(default)]
    pub messages: Vec<SchemaMessage>,
    #[serde(default)]
    pub enums: Vec<SchemaEnum>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub repeated: bool,
    #[serde(default)]
    pub behaviors: Vec<String>,
    #[serde(default)]
    pub pos: Option<SchemaPos>,
    #[serde(default)]
    pub directives: Vec<SchemaDirective>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaEnum {
    pub name: String,
    #[serde(default)]
    pub pos: Option<SchemaPos>,
    #[serde(default)]
    pub directives: Vec<SchemaDirective>,
    #[serde(default)]
    pub values: Vec<SchemaEnumValue>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaEnumValue {
    pub name: String,
    #[serde(default)]
    pub pos: Option<SchemaPos>,
    #[serde(default)]
    pub directives: Vec<SchemaDirective>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaService {
    pub name: String,
    #[serde(default)]
    pub pos: Option<SchemaPos>,
    #[serde(default)]
    pub directives: Vec<SchemaDirective>,
    #[serde(default)]
    pub methods: Vec<SchemaMethod>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaMethod {
    pub name: String,
    #[serde(default)]
    pub pos: Option<SchemaPos>,
    #[serde(default)]
    pub directives: Vec<SchemaDirective>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SchemaPos {
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

#[derive(Debug, Deserialize)]
pub struct SchemaResource {
    #[serde(rename = "type")]
    pub type_url: String,
    pub singular: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
/// Inline suppression/enable marker as serialized by the parser.
pub struct SchemaDirective {
    pub target: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub subtree: bool,
}

fn default_true() -> bool {
    true
}

impl SchemaSet {
    /// Rebuild the immutable descriptor arena. Malformed directive targets
    /// and unknown behavior tokens are fatal: they indicate a broken
    /// reflection layer, not a schema violation.
    pub fn into_descriptors(self) -> Result<DescriptorSet, FatalError> {
        let mut b = TreeBuilder::new();
        for file in self.files {
            let f = b.file(&file.path, &file.package);
            apply_common(&mut b, f, None, &file.directives)?;
            for msg in file.messages {
                build_message(&mut b, f, msg)?;
            }
            for en in file.enums {
                build_enum(&mut b, f, en)?;
            }
            for svc in file.services {
                let s = b.service(f, &svc.name);
                apply_common(&mut b, s, svc.pos, &svc.directives)?;
                for method in svc.methods {
                    let m = b.method(s, &method.name);
                    apply_common(&mut b, m, method.pos, &method.directives)?;
                }
            }
        }
        Ok(b.finish())
    }
}

fn build_message(
    b: &mut TreeBuilder,
    parent: crate::descriptor::DescriptorId,
    msg: SchemaMessage,
) -> Result<(), FatalError> {
    let m = b.message(parent, &msg.name);
    apply_common(b, m, msg.pos, &msg.directives)?;
    if let Some(res) = msg.resource {
        b.set_resource(
            m,
            ResourceMeta {
                type_url: res.type_url,
                singular: res.singular,
                patterns: res.patterns,
            },
        );
    }
    for field in msg.fields {
        let behaviors = field
            .behaviors
            .iter()
            .map(|s| {
                FieldBehavior::parse(s).ok_or_else(|| {
                    FatalError::SchemaInput(format!(
                        "unknown field behavior {:?} on field {:?}",
                        s, field.name
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let fld = b.field(m, &field.name, &field.type_name, &behaviors);
        if field.repeated {
            b.set_repeated(fld);
        }
        apply_common(b, fld, field.pos, &field.directives)?;
    }
    for nested in msg.messages {
        build_message(b, m, nested)?;
    }
    for en in msg.enums {
        build_enum(b, m, en)?;
    }
    Ok(())
}

fn build_enum(
    b: &mut TreeBuilder,
    parent: crate::descriptor::DescriptorId,
    en: SchemaEnum,
) -> Result<(), FatalError> {
    let e = b.enumeration(parent, &en.name);
    apply_common(b, e, en.pos, &en.directives)?;
    for value in en.values {
        let v = b.enum_value(e, &value.name);
        apply_common(b, v, value.pos, &value.directives)?;
    }
    Ok(())
}

fn apply_common(
    b: &mut TreeBuilder,
    id: crate::descriptor::DescriptorId,
    pos: Option<SchemaPos>,
    directives: &[SchemaDirective],
) -> Result<(), FatalError> {
    if let Some(pos) = pos {
        b.set_pos(id, pos.line, pos.column);
    }
    for d in directives {
        let target = Target::parse(&d.target)
            .map_err(|e| FatalError::SchemaInput(e.to_string()))?;
        b.add_directive(
            id,
            Directive {
                target,
                enabled: d.enabled,
                subtree: d.subtree,
            },
        );
    }
    Ok(())
}
