//! The runtime type table.
//!
//! A dense, index-addressed arena of base types and type nodes, built once
//! from the compiler's records and never mutated afterwards. Every other
//! runtime component refers to types by [`TypeId`] and asks this table for
//! kinds, element types, field layouts and display names.
//!
//! # Construction
//!
//! 1. Base records are registered by id; the kind comes from the name.
//! 2. Type codes are parsed and interned. Declared ids keep their id; a
//!    child subtree whose canonical code matches a declared type reuses it,
//!    anything else gets an anonymous id after the declared range.
//! 3. Field lists are laid out in declaration order with each field's
//!    offset rounded up to its alignment.

use std::fmt;
use std::sync::OnceLock;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::code::CodeTree;
use crate::error::TypeError;
use crate::idx::{BaseId, TypeId};
use crate::kind::SingleType;
use crate::layout::{align_up, Layout};
use crate::record::{BaseInfo, FieldInfo, TypeInfo};

/// Metadata for one primitive or class.
#[derive(Clone, Debug)]
pub struct BaseType {
    pub id: BaseId,
    /// Definition scope (0 for built-ins).
    pub scope: u32,
    pub name: Box<str>,
    /// Single-inheritance parent.
    pub parent: Option<BaseId>,
    pub single: SingleType,
    pub needs_cleanup: bool,
    /// Size and alignment of a slot holding this type.
    pub layout: Layout,
    /// Full instance size for classes, 0 otherwise.
    pub obj_size: usize,
    /// Class fields in declaration order.
    pub fields: Vec<FieldType>,
}

/// One field of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldType {
    pub name: Box<str>,
    pub ty: TypeId,
    /// Byte offset inside the instance.
    pub offset: usize,
    pub layout: Layout,
}

/// A (possibly composite) type: a base plus ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeNode {
    pub id: TypeId,
    pub base: BaseId,
    pub single: SingleType,
    pub children: SmallVec<[TypeId; 2]>,
}

/// Immutable runtime type table.
#[derive(Debug)]
pub struct TypeTable {
    bases: Vec<Option<BaseType>>,
    nodes: Vec<Option<TypeNode>>,
    declared: usize,
    by_code: FxHashMap<String, TypeId>,
    string_type: Option<TypeId>,
}

static GLOBAL_TABLE: OnceLock<TypeTable> = OnceLock::new();

impl TypeTable {
    /// Build the table from the compiler's three record tables.
    pub fn build(
        bases: &[BaseInfo],
        types: &[TypeInfo],
        fields: &[FieldInfo],
    ) -> Result<TypeTable, TypeError> {
        let mut builder = Builder::default();
        builder.add_bases(bases)?;
        builder.add_types(types)?;
        builder.add_fields(fields)?;
        Ok(builder.finish())
    }

    /// Make this table the process-wide table. Succeeds once.
    pub fn install(self) -> Result<&'static TypeTable, TypeError> {
        GLOBAL_TABLE
            .set(self)
            .map_err(|_| TypeError::AlreadyInstalled)?;
        GLOBAL_TABLE.get().ok_or(TypeError::AlreadyInstalled)
    }

    /// The process-wide table, if one was installed.
    pub fn global() -> Option<&'static TypeTable> {
        GLOBAL_TABLE.get()
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    pub fn node(&self, id: TypeId) -> Result<&TypeNode, TypeError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(TypeError::UnknownType(id.raw()))
    }

    pub fn base(&self, id: BaseId) -> Result<&BaseType, TypeError> {
        self.bases
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(TypeError::UnknownBase(id.raw()))
    }

    pub fn base_of(&self, id: TypeId) -> Result<&BaseType, TypeError> {
        self.base(self.node(id)?.base)
    }

    pub fn kind(&self, id: TypeId) -> Result<SingleType, TypeError> {
        Ok(self.node(id)?.single)
    }

    /// Slot layout of a value of this type.
    pub fn layout(&self, id: TypeId) -> Result<Layout, TypeError> {
        Ok(self.kind(id)?.layout())
    }

    pub fn needs_cleanup(&self, id: TypeId) -> Result<bool, TypeError> {
        Ok(self.base_of(id)?.needs_cleanup)
    }

    /// Element type of an array, list, tree or directory type.
    pub fn element(&self, id: TypeId) -> Result<TypeId, TypeError> {
        let node = self.node(id)?;
        match node.single {
            SingleType::Array | SingleType::List | SingleType::Tree | SingleType::Dir => {
                node.children.first().copied().ok_or(TypeError::WrongKind {
                    id: id.raw(),
                    expected: "collection with an element type",
                    found: node.single.keyword(),
                })
            }
            other => Err(TypeError::WrongKind {
                id: id.raw(),
                expected: "collection",
                found: other.keyword(),
            }),
        }
    }

    /// Fields of a class type, in declaration order.
    pub fn fields(&self, id: TypeId) -> Result<&[FieldType], TypeError> {
        let base = self.base_of(id)?;
        if base.single != SingleType::Class {
            return Err(TypeError::WrongKind {
                id: id.raw(),
                expected: "class",
                found: base.single.keyword(),
            });
        }
        Ok(&base.fields)
    }

    /// Instance size of a class type.
    pub fn obj_size(&self, id: TypeId) -> Result<usize, TypeError> {
        self.fields(id)?;
        Ok(self.base_of(id)?.obj_size)
    }

    /// Whether `base` is `ancestor` or inherits from it.
    pub fn derives_from(&self, base: BaseId, ancestor: BaseId) -> bool {
        let mut current = Some(base);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.base(id).ok().and_then(|b| b.parent);
        }
        false
    }

    /// Whether a value of type `actual` may be stored in a slot of type
    /// `slot`. A class slot takes its own class or any subclass; every
    /// other slot needs the same shape.
    pub fn accepts(&self, slot: TypeId, actual: TypeId) -> Result<bool, TypeError> {
        if slot == actual {
            return Ok(true);
        }
        let slot_node = self.node(slot)?;
        if slot_node.single == SingleType::Class {
            let actual_node = self.node(actual)?;
            return Ok(actual_node.single == SingleType::Class
                && self.derives_from(actual_node.base, slot_node.base));
        }
        self.same_type(slot, actual)
    }

    /// Structural equality: same base and pairwise equal children. Two
    /// declared ids with the same code are the same type.
    pub fn same_type(&self, a: TypeId, b: TypeId) -> Result<bool, TypeError> {
        if a == b {
            return Ok(true);
        }
        let (x, y) = (self.node(a)?, self.node(b)?);
        if x.base != y.base || x.children.len() != y.children.len() {
            return Ok(false);
        }
        for (&c, &d) in x.children.iter().zip(y.children.iter()) {
            if !self.same_type(c, d)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Look a type up by its paren code.
    pub fn find_by_code(&self, code: &str) -> Option<TypeId> {
        let canonical = CodeTree::parse(code).ok()?.canonical();
        self.by_code.get(&canonical).copied()
    }

    /// The plain `string` type, needed to build arrays of strings.
    pub fn string_type(&self) -> Result<TypeId, TypeError> {
        self.string_type.ok_or(TypeError::MissingBuiltin("string"))
    }

    /// Number of declared type ids (anonymous nodes come after these).
    pub fn declared_len(&self) -> usize {
        self.declared
    }

    /// All type nodes, declared and anonymous.
    pub fn nodes(&self) -> impl Iterator<Item = &TypeNode> + '_ {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Human-readable rendering, e.g. `array of dir of string`.
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay { table: self, id }
    }
}

/// [`fmt::Display`] adapter returned by [`TypeTable::display`].
pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    id: TypeId,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(node) = self.table.node(self.id) else {
            return write!(f, "<unknown {}>", self.id);
        };
        let name = self
            .table
            .base(node.base)
            .map_or("<unknown>", |b| &*b.name);
        f.write_str(name)?;
        match (node.single, node.children.as_slice()) {
            (_, []) => Ok(()),
            (
                SingleType::Array | SingleType::List | SingleType::Tree | SingleType::Dir,
                [element],
            ) => write!(f, " of {}", self.table.display(*element)),
            (_, children) => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.table.display(*child))?;
                }
                f.write_str(")")
            }
        }
    }
}

// ── Construction ────────────────────────────────────────────────────────

#[derive(Default)]
struct Builder {
    bases: Vec<Option<BaseType>>,
    nodes: Vec<Option<TypeNode>>,
    declared: usize,
    declared_codes: FxHashMap<String, TypeId>,
    by_code: FxHashMap<String, TypeId>,
}

impl Builder {
    fn add_bases(&mut self, infos: &[BaseInfo]) -> Result<(), TypeError> {
        let slots = infos.iter().map(|b| b.id as usize + 1).max().unwrap_or(0);
        self.bases = vec![None; slots];

        for info in infos {
            let (scope, name) = info
                .name
                .split_once(':')
                .and_then(|(scope, name)| Some((scope.parse::<u32>().ok()?, name)))
                .filter(|(_, name)| !name.is_empty())
                .ok_or_else(|| TypeError::BadBaseName(info.name.clone()))?;
            let single = SingleType::from_name(name);
            let layout = single.layout();
            if info.size != 0 && info.size != layout.size {
                tracing::warn!(
                    base = info.id,
                    name,
                    declared = info.size,
                    physical = layout.size,
                    "compiler size disagrees with runtime layout"
                );
            }
            if info.needs_cleanup != single.needs_cleanup() {
                tracing::debug!(
                    base = info.id,
                    name,
                    declared = info.needs_cleanup,
                    "cleanup flag derived from kind"
                );
            }

            let slot = &mut self.bases[info.id as usize];
            if slot.is_some() {
                return Err(TypeError::DuplicateBase(info.id));
            }
            *slot = Some(BaseType {
                id: BaseId::from_raw(info.id),
                scope,
                name: name.into(),
                parent: info.parent.map(BaseId::from_raw),
                single,
                needs_cleanup: single.needs_cleanup(),
                layout,
                obj_size: 0,
                fields: Vec::new(),
            });
        }

        for info in infos {
            if let Some(parent) = info.parent {
                self.base(parent)?;
            }
        }
        Ok(())
    }

    fn base(&self, id: u32) -> Result<&BaseType, TypeError> {
        self.bases
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(TypeError::UnknownBase(id))
    }

    fn add_types(&mut self, infos: &[TypeInfo]) -> Result<(), TypeError> {
        self.declared = infos.iter().map(|t| t.id as usize + 1).max().unwrap_or(0);
        self.nodes = vec![None; self.declared];

        let mut seen = FxHashSet::default();
        let mut trees = Vec::with_capacity(infos.len());
        for info in infos {
            if !seen.insert(info.id) {
                return Err(TypeError::DuplicateType(info.id));
            }
            let tree = CodeTree::parse(&info.code)?;
            self.declared_codes
                .entry(tree.canonical())
                .or_insert(TypeId::from_raw(info.id));
            trees.push((TypeId::from_raw(info.id), tree));
        }

        for (id, tree) in &trees {
            self.intern(tree, Some(*id))?;
        }
        Ok(())
    }

    fn intern(&mut self, tree: &CodeTree, forced: Option<TypeId>) -> Result<TypeId, TypeError> {
        let code = tree.canonical();
        let id = match forced {
            Some(id) if self.nodes[id.index()].is_some() => return Ok(id),
            Some(id) => id,
            None => {
                if let Some(&id) = self.by_code.get(&code) {
                    return Ok(id);
                }
                match self.declared_codes.get(&code) {
                    Some(&id) => id,
                    None => self.alloc_anonymous()?,
                }
            }
        };

        let single = self.base(tree.base)?.single;
        let mut children = SmallVec::with_capacity(tree.children.len());
        for child in &tree.children {
            children.push(self.intern(child, None)?);
        }

        self.nodes[id.index()] = Some(TypeNode {
            id,
            base: BaseId::from_raw(tree.base),
            single,
            children,
        });
        self.by_code.entry(code).or_insert(id);
        Ok(id)
    }

    fn alloc_anonymous(&mut self) -> Result<TypeId, TypeError> {
        let raw = u32::try_from(self.nodes.len()).map_err(|_| TypeError::MalformedCode {
            code: String::new(),
            column: 0,
            reason: "too many type nodes",
        })?;
        self.nodes.push(None);
        Ok(TypeId::from_raw(raw))
    }

    fn add_fields(&mut self, infos: &[FieldInfo]) -> Result<(), TypeError> {
        let mut seen = FxHashSet::default();
        for info in infos {
            let malformed = |reason| TypeError::MalformedFields {
                class: info.class,
                list: info.fields.clone(),
                reason,
            };

            let class = self.base(info.class)?;
            if class.single != SingleType::Class {
                return Err(TypeError::NotAClass(class.name.to_string()));
            }
            if !seen.insert(info.class) {
                return Err(malformed("fields listed twice"));
            }

            let mut fields = Vec::new();
            let mut offset = 0usize;
            let mut max_align = 1usize;
            for entry in info.fields.split(',').filter(|e| !e.is_empty()) {
                let (ty, name) = entry
                    .split_once(':')
                    .ok_or_else(|| malformed("expected `typeId:name`"))?;
                let ty: u32 = ty
                    .trim()
                    .parse()
                    .map_err(|_| malformed("type id is not a number"))?;
                let node = self
                    .nodes
                    .get(ty as usize)
                    .and_then(Option::as_ref)
                    .ok_or(TypeError::UnknownType(ty))?;

                let layout = node.single.layout();
                offset = align_up(offset, layout.align);
                fields.push(FieldType {
                    name: name.trim().into(),
                    ty: node.id,
                    offset,
                    layout,
                });
                offset += layout.size;
                max_align = max_align.max(layout.align);
            }

            if let Some(class) = self.bases[info.class as usize].as_mut() {
                class.obj_size = align_up(offset, max_align);
                class.fields = fields;
            }
        }
        Ok(())
    }

    fn finish(self) -> TypeTable {
        let anonymous = self.nodes.len() - self.declared;
        tracing::debug!(
            bases = self.bases.iter().flatten().count(),
            declared = self.declared,
            anonymous,
            "type table built"
        );
        let mut table = TypeTable {
            bases: self.bases,
            nodes: self.nodes,
            declared: self.declared,
            by_code: self.by_code,
            string_type: None,
        };
        let string_type = table
            .nodes()
            .find(|n| n.single == SingleType::String && n.children.is_empty())
            .map(|n| n.id);
        table.string_type = string_type;
        table
    }
}
