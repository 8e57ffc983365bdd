//! Descriptor tree: the parsed, immutable schema representation.
//!
//! A `DescriptorSet` is an arena of nodes produced by an external
//! schema-reflection layer (or by `TreeBuilder` in tests). Files contain
//! messages, enums, and services; messages contain fields and nested
//! messages/enums; services contain methods. Declaration order is preserved:
//! node ids are assigned in pre-order, so within a file the id order is the
//! declaration order used for report sorting.
//!
//! Rules receive `&DescriptorSet` and never mutate it.

use crate::rule::Target;
use serde::Serialize;

/// Handle to a node inside a `DescriptorSet`. Valid only for the set that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DescriptorId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// Closed set of node kinds a rule can bind to.
pub enum DescriptorKind {
    File,
    Message,
    Field,
    Enum,
    EnumValue,
    Service,
    Method,
}

impl std::fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DescriptorKind::File => "file",
            DescriptorKind::Message => "message",
            DescriptorKind::Field => "field",
            DescriptorKind::Enum => "enum",
            DescriptorKind::EnumValue => "enum value",
            DescriptorKind::Service => "service",
            DescriptorKind::Method => "method",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Field cardinality as declared in source.
pub enum Cardinality {
    Singular,
    Repeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Field behavior annotations surfaced from source (`field_info`).
pub enum FieldBehavior {
    Required,
    Optional,
    OutputOnly,
    Immutable,
    Identifier,
}

impl FieldBehavior {
    /// Parse the annotation token used in serialized schema input.
    pub fn parse(s: &str) -> Option<FieldBehavior> {
        match s {
            "required" => Some(FieldBehavior::Required),
            "optional" => Some(FieldBehavior::Optional),
            "output_only" => Some(FieldBehavior::OutputOnly),
            "immutable" => Some(FieldBehavior::Immutable),
            "identifier" => Some(FieldBehavior::Identifier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Field-specific metadata: declared type name, cardinality, behaviors.
pub struct FieldMeta {
    pub type_name: String,
    pub cardinality: Cardinality,
    pub behaviors: Vec<FieldBehavior>,
}

impl FieldMeta {
    pub fn has_behavior(&self, b: FieldBehavior) -> bool {
        self.behaviors.contains(&b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Resource annotation attached to a message.
pub struct ResourceMeta {
    pub type_url: String,
    pub singular: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone)]
/// Inline lint directive surfaced from source-adjacent annotations.
///
/// `subtree = true` (the default in serialized input) scopes the directive to
/// the node and all its descendants; otherwise it applies to the node only.
pub struct Directive {
    pub target: Target,
    pub enabled: bool,
    pub subtree: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
/// Source position of a declaration. Zero means unknown.
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
/// File-level metadata carried by `File` nodes.
pub struct FileMeta {
    pub path: String,
    pub package: String,
}

#[derive(Debug, Clone)]
/// One node of the schema tree.
pub struct Descriptor {
    pub kind: DescriptorKind,
    pub name: String,
    pub parent: Option<DescriptorId>,
    pub children: Vec<DescriptorId>,
    pub pos: SourcePos,
    pub directives: Vec<Directive>,
    pub field: Option<FieldMeta>,
    pub resource: Option<ResourceMeta>,
    pub file_meta: Option<FileMeta>,
    /// Declaration index within the enclosing file, assigned in pre-order.
    pub(crate) decl_index: u32,
    /// Root file node this descriptor belongs to.
    pub(crate) file_root: DescriptorId,
}

#[derive(Debug, Clone, Default)]
/// Arena of descriptors for one or more schema files. Immutable once built.
pub struct DescriptorSet {
    nodes: Vec<Descriptor>,
    files: Vec<DescriptorId>,
}

impl DescriptorSet {
    pub fn get(&self, id: DescriptorId) -> &Descriptor {
        &self.nodes[id.0 as usize]
    }

    /// Root file nodes in declaration order.
    pub fn files(&self) -> &[DescriptorId] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Source file path the descriptor was declared in.
    pub fn file_path(&self, id: DescriptorId) -> &str {
        let root = self.get(self.get(id).file_root);
        root.file_meta.as_ref().map(|m| m.path.as_str()).unwrap_or("")
    }

    /// Package of the enclosing file.
    pub fn package(&self, id: DescriptorId) -> &str {
        let root = self.get(self.get(id).file_root);
        root.file_meta
            .as_ref()
            .map(|m| m.package.as_str())
            .unwrap_or("")
    }

    /// Walk from `id` up to (and including) the file root.
    pub fn ancestors(&self, id: DescriptorId) -> impl Iterator<Item = DescriptorId> + '_ {
        let mut cur = self.get(id).parent;
        std::iter::from_fn(move || {
            let next = cur?;
            cur = self.get(next).parent;
            Some(next)
        })
    }

    /// Dotted full name: package plus the name path below the file root.
    /// For a `File` node this is the file path itself.
    pub fn full_name(&self, id: DescriptorId) -> String {
        let node = self.get(id);
        if node.kind == DescriptorKind::File {
            return self.file_path(id).to_string();
        }
        let mut parts: Vec<&str> = vec![node.name.as_str()];
        for anc in self.ancestors(id) {
            let d = self.get(anc);
            if d.kind == DescriptorKind::File {
                break;
            }
            parts.push(d.name.as_str());
        }
        let pkg = self.package(id);
        if !pkg.is_empty() {
            parts.push(pkg);
        }
        parts.reverse();
        parts.join(".")
    }

    /// Find a message or enum by simple or package-qualified name anywhere in
    /// the set. Used for cross-file type resolution by rules.
    pub fn find_named(&self, kind: DescriptorKind, name: &str) -> Option<DescriptorId> {
        (0..self.nodes.len() as u32)
            .map(DescriptorId)
            .find(|&id| {
                let d = self.get(id);
                d.kind == kind && (d.name == name || self.full_name(id) == name)
            })
    }

    /// Find a top-level or nested message inside a given file by simple name.
    pub fn find_message(&self, file: DescriptorId, name: &str) -> Option<DescriptorId> {
        self.descendants(file)
            .find(|&id| self.get(id).kind == DescriptorKind::Message && self.get(id).name == name)
    }

    /// Find a direct field of a message by name.
    pub fn find_field(&self, message: DescriptorId, name: &str) -> Option<DescriptorId> {
        self.get(message)
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).kind == DescriptorKind::Field && self.get(c).name == name)
    }

    /// Pre-order iterator over the subtree rooted at `id`, excluding `id`.
    pub fn descendants(&self, id: DescriptorId) -> impl Iterator<Item = DescriptorId> + '_ {
        let mut stack: Vec<DescriptorId> = self.get(id).children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.get(next).children.iter().rev().copied());
            Some(next)
        })
    }
}

/// Builds a `DescriptorSet` in declaration order.
///
/// The external reflection layer and tests both go through this; it is the
/// only way to construct a set, which keeps the tree immutable afterwards.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    set: DescriptorSet,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder::default()
    }

    fn push(&mut self, mut node: Descriptor) -> DescriptorId {
        let id = DescriptorId(self.set.nodes.len() as u32);
        if let Some(parent) = node.parent {
            node.file_root = self.set.get(parent).file_root;
            node.decl_index = self
                .set
                .nodes
                .iter()
                .filter(|n| n.file_root == node.file_root)
                .count() as u32;
            self.set.nodes[parent.0 as usize].children.push(id);
        } else {
            node.file_root = id;
            node.decl_index = 0;
        }
        self.set.nodes.push(node);
        id
    }

    fn child(&mut self, parent: DescriptorId, kind: DescriptorKind, name: &str) -> DescriptorId {
        self.push(Descriptor {
            kind,
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            pos: SourcePos::default(),
            directives: Vec::new(),
            field: None,
            resource: None,
            file_meta: None,
            decl_index: 0,
            file_root: DescriptorId(0),
        })
    }

    pub fn file(&mut self, path: &str, package: &str) -> DescriptorId {
        let id = self.push(Descriptor {
            kind: DescriptorKind::File,
            name: path.to_string(),
            parent: None,
            children: Vec::new(),
            pos: SourcePos::default(),
            directives: Vec::new(),
            field: None,
            resource: None,
            file_meta: Some(FileMeta {
                path: path.to_string(),
                package: package.to_string(),
            }),
            decl_index: 0,
            file_root: DescriptorId(0),
        });
        self.set.files.push(id);
        id
    }

    /// `parent` is a file or a message.
    pub fn message(&mut self, parent: DescriptorId, name: &str) -> DescriptorId {
        self.child(parent, DescriptorKind::Message, name)
    }

    pub fn field(
        &mut self,
        message: DescriptorId,
        name: &str,
        type_name: &str,
        behaviors: &[FieldBehavior],
    ) -> DescriptorId {
        let id = self.child(message, DescriptorKind::Field, name);
        self.set.nodes[id.0 as usize].field = Some(FieldMeta {
            type_name: type_name.to_string(),
            cardinality: Cardinality::Singular,
            behaviors: behaviors.to_vec(),
        });
        id
    }

    pub fn enumeration(&mut self, parent: DescriptorId, name: &str) -> DescriptorId {
        self.child(parent, DescriptorKind::Enum, name)
    }

    pub fn enum_value(&mut self, enumeration: DescriptorId, name: &str) -> DescriptorId {
        self.child(enumeration, DescriptorKind::EnumValue, name)
    }

    pub fn service(&mut self, file: DescriptorId, name: &str) -> DescriptorId {
        self.child(file, DescriptorKind::Service, name)
    }

    pub fn method(&mut self, service: DescriptorId, name: &str) -> DescriptorId {
        self.child(service, DescriptorKind::Method, name)
    }

    pub fn set_repeated(&mut self, field: DescriptorId) {
        if let Some(meta) = self.set.nodes[field.0 as usize].field.as_mut() {
            meta.cardinality = Cardinality::Repeated;
        }
    }

    pub fn set_resource(&mut self, message: DescriptorId, resource: ResourceMeta) {
        self.set.nodes[message.0 as usize].resource = Some(resource);
    }

    pub fn set_pos(&mut self, id: DescriptorId, line: u32, column: u32) {
        self.set.nodes[id.0 as usize].pos = SourcePos { line, column };
    }

    pub fn add_directive(&mut self, id: DescriptorId, directive: Directive) {
        self.set.nodes[id.0 as usize].directives.push(directive);
    }

    pub fn finish(self) -> DescriptorSet {
        self.set
    }
}
