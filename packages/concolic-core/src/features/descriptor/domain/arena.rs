//! Descriptor arena
//!
//! Owns every node of one test-generation attempt. All graph algorithms here
//! carry an explicit visited set (or memo map) of handles, so they terminate
//! on cyclic graphs such as `Node { next: <self> }`.

use super::descriptor::{
    default_literal, is_default_literal, DescriptorId, DescriptorKind, DescriptorNode, FieldKey,
};
use crate::features::state::domain::{
    Literal, PredicateKind, PredicateState, StateBuilder, Term, TermFactory,
};
use crate::shared::models::IrType;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub struct DescriptorArena {
    nodes: Vec<DescriptorNode>,
}

impl DescriptorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: DescriptorId) -> &DescriptorNode {
        &self.nodes[id.0]
    }

    pub fn term(&self, id: DescriptorId) -> &Term {
        &self.nodes[id.0].term
    }

    pub fn ty(&self, id: DescriptorId) -> &IrType {
        &self.nodes[id.0].ty
    }

    fn push(&mut self, node: DescriptorNode) -> DescriptorId {
        self.nodes.push(node);
        DescriptorId(self.nodes.len() - 1)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Construction
    // ═══════════════════════════════════════════════════════════════════════

    pub fn constant(&mut self, literal: Literal) -> DescriptorId {
        let ty = literal.ty();
        self.push(DescriptorNode {
            term: TermFactory::literal(literal.clone()),
            ty,
            kind: DescriptorKind::Constant(literal),
        })
    }

    pub fn null(&mut self) -> DescriptorId {
        self.constant(Literal::Null)
    }

    pub fn int(&mut self, value: i32) -> DescriptorId {
        self.constant(Literal::Int(value))
    }

    pub fn object(&mut self, class: impl Into<String>) -> DescriptorId {
        let ty = IrType::class(class);
        self.push(DescriptorNode {
            term: TermFactory::generate(ty.clone()),
            ty,
            kind: DescriptorKind::Object {
                fields: BTreeMap::new(),
            },
        })
    }

    /// Holder of the static fields of `class`
    pub fn static_class(&mut self, class: impl Into<String>) -> DescriptorId {
        let ty = IrType::class(class);
        self.push(DescriptorNode {
            term: TermFactory::static_class_ref(ty.clone()),
            ty,
            kind: DescriptorKind::Class {
                fields: BTreeMap::new(),
            },
        })
    }

    pub fn array(&mut self, element_type: IrType, length: i32) -> DescriptorId {
        let ty = IrType::array(element_type);
        self.push(DescriptorNode {
            term: TermFactory::generate(ty.clone()),
            ty,
            kind: DescriptorKind::Array {
                length: length.max(0),
                elements: BTreeMap::new(),
            },
        })
    }

    /// Default value of a slot of type `ty`
    ///
    /// Primitives get their zero constant. References get `null` when
    /// `nullable`, otherwise an empty object or a zero-length array.
    pub fn default_descriptor(&mut self, ty: &IrType, nullable: bool) -> DescriptorId {
        match ty {
            IrType::Class(name) if !nullable => self.object(name.clone()),
            IrType::Array(element) if !nullable => self.array((**element).clone(), 0),
            other => self.constant(default_literal(other)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════════

    /// Set a field of an object or class descriptor; ignored on other nodes
    pub fn set_field(&mut self, owner: DescriptorId, name: impl Into<String>, ty: IrType, value: DescriptorId) {
        if let DescriptorKind::Object { fields } | DescriptorKind::Class { fields } =
            &mut self.nodes[owner.0].kind
        {
            fields.insert(FieldKey::new(name, ty), value);
        }
    }

    pub fn field(&self, owner: DescriptorId, name: &str, ty: &IrType) -> Option<DescriptorId> {
        self.nodes[owner.0]
            .fields()?
            .get(&FieldKey::new(name, ty.clone()))
            .copied()
    }

    pub fn remove_field(&mut self, owner: DescriptorId, key: &FieldKey) -> Option<DescriptorId> {
        match &mut self.nodes[owner.0].kind {
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => fields.remove(key),
            _ => None,
        }
    }

    /// Set an element of an array descriptor; out-of-range indices are ignored
    pub fn set_element(&mut self, array: DescriptorId, index: i32, value: DescriptorId) {
        if let DescriptorKind::Array { length, elements } = &mut self.nodes[array.0].kind {
            if (0..*length).contains(&index) {
                elements.insert(index, value);
            }
        }
    }

    pub fn element(&self, array: DescriptorId, index: i32) -> Option<DescriptorId> {
        match &self.nodes[array.0].kind {
            DescriptorKind::Array { elements, .. } => elements.get(&index).copied(),
            _ => None,
        }
    }

    /// Change the dynamic type of an object descriptor, keeping its name
    pub fn retype(&mut self, id: DescriptorId, ty: IrType) {
        let node = &mut self.nodes[id.0];
        node.term = TermFactory::value(ty.clone(), node.term.name());
        node.ty = ty;
    }

    /// Copy into `into` every field of `from` that `into` does not define
    ///
    /// Both must be objects (or both classes) of the same type; returns
    /// whether the merge happened.
    pub fn merge(&mut self, into: DescriptorId, from: DescriptorId) -> bool {
        if into == from || self.nodes[into.0].ty != self.nodes[from.0].ty {
            return false;
        }
        let incoming = match (&self.nodes[into.0].kind, &self.nodes[from.0].kind) {
            (DescriptorKind::Object { .. }, DescriptorKind::Object { fields })
            | (DescriptorKind::Class { .. }, DescriptorKind::Class { fields }) => fields.clone(),
            _ => return false,
        };
        if let DescriptorKind::Object { fields } | DescriptorKind::Class { fields } =
            &mut self.nodes[into.0].kind
        {
            for (key, value) in incoming {
                fields.entry(key).or_insert(value);
            }
        }
        true
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Printing
    // ═══════════════════════════════════════════════════════════════════════

    /// Render the graph reachable from `id`
    ///
    /// Each container is printed once; later references use its term name.
    pub fn print(&self, id: DescriptorId) -> String {
        let mut visited = FxHashSet::default();
        let mut out = String::new();
        self.print_rec(id, &mut visited, &mut out);
        out
    }

    fn print_rec(&self, id: DescriptorId, visited: &mut FxHashSet<DescriptorId>, out: &mut String) {
        if !visited.insert(id) {
            return;
        }
        let node = &self.nodes[id.0];
        if !out.is_empty() {
            out.push('\n');
        }
        match &node.kind {
            DescriptorKind::Constant(literal) => {
                let _ = write!(out, "{}", literal);
            }
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => {
                let _ = write!(out, "{} = {} {{", node.term, node.ty);
                for (key, child) in fields {
                    let _ = write!(out, "\n    {} = {}", key, self.nodes[child.0].term);
                }
                out.push_str("\n}");
            }
            DescriptorKind::Array { length, elements } => {
                let _ = write!(out, "{} = {} [{}] {{", node.term, node.ty, length);
                for (index, child) in elements {
                    let _ = write!(out, "\n    [{}] = {}", index, self.nodes[child.0].term);
                }
                out.push_str("\n}");
            }
        }
        for child in node.children() {
            if !self.nodes[child.0].is_constant() {
                self.print_rec(child, visited, out);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Structural equality
    // ═══════════════════════════════════════════════════════════════════════

    /// Structural equality
    ///
    /// Same variant, same type (and length for arrays), and equal children
    /// for every key present on both sides. Pairs already under comparison
    /// are assumed equal, which makes cyclic graphs compare coinductively.
    pub fn structural_eq(&self, a: DescriptorId, b: DescriptorId) -> bool {
        let mut assumed = FxHashSet::default();
        self.eq_rec(a, b, &mut assumed)
    }

    fn eq_rec(
        &self,
        a: DescriptorId,
        b: DescriptorId,
        assumed: &mut FxHashSet<(DescriptorId, DescriptorId)>,
    ) -> bool {
        if a == b || !assumed.insert((a, b)) {
            return true;
        }
        let (left, right) = (&self.nodes[a.0], &self.nodes[b.0]);
        match (&left.kind, &right.kind) {
            (DescriptorKind::Constant(x), DescriptorKind::Constant(y)) => x == y,
            (DescriptorKind::Object { fields: fa }, DescriptorKind::Object { fields: fb })
            | (DescriptorKind::Class { fields: fa }, DescriptorKind::Class { fields: fb }) => {
                left.ty == right.ty
                    && fa.iter().all(|(key, &x)| match fb.get(key) {
                        Some(&y) => self.eq_rec(x, y, assumed),
                        None => true,
                    })
            }
            (
                DescriptorKind::Array {
                    length: la,
                    elements: ea,
                },
                DescriptorKind::Array {
                    length: lb,
                    elements: eb,
                },
            ) => {
                left.ty == right.ty
                    && la == lb
                    && ea.iter().all(|(index, &x)| match eb.get(index) {
                        Some(&y) => self.eq_rec(x, y, assumed),
                        None => true,
                    })
            }
            _ => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// State asserting the whole graph
    ///
    /// Containers are non-null (axiom); every field or element load equals
    /// the child's term and arrays have their fixed length (requirements).
    pub fn collect_query(&self, id: DescriptorId) -> PredicateState {
        let mut visited = FxHashSet::default();
        let mut builder = StateBuilder::new();
        self.query_rec(id, &mut visited, &mut builder);
        builder.apply()
    }

    fn query_rec(&self, id: DescriptorId, visited: &mut FxHashSet<DescriptorId>, builder: &mut StateBuilder) {
        if !visited.insert(id) {
            return;
        }
        let node = &self.nodes[id.0];
        match &node.kind {
            DescriptorKind::Constant(_) => {}
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => {
                if matches!(node.kind, DescriptorKind::Object { .. }) {
                    builder.axiom(PredicateKind::inequality(node.term.clone(), TermFactory::null()));
                }
                for (key, &child) in fields {
                    let load = TermFactory::field_load(TermFactory::field(
                        node.term.clone(),
                        key.ty.clone(),
                        key.name.clone(),
                    ));
                    builder.require(PredicateKind::equality(load, self.nodes[child.0].term.clone()));
                    self.query_rec(child, visited, builder);
                }
            }
            DescriptorKind::Array { length, elements } => {
                builder.axiom(PredicateKind::inequality(node.term.clone(), TermFactory::null()));
                builder.require(PredicateKind::equality(
                    TermFactory::array_length(node.term.clone()),
                    TermFactory::int(*length),
                ));
                for (&index, &child) in elements {
                    let load = TermFactory::array_load(TermFactory::array_index(
                        node.term.clone(),
                        TermFactory::int(index),
                    ));
                    builder.require(PredicateKind::equality(load, self.nodes[child.0].term.clone()));
                    self.query_rec(child, visited, builder);
                }
            }
        }
    }

    /// Runtime-type facts for every object and array of the graph
    ///
    /// Each container gets a fresh flag `f = term instanceof T` with the
    /// assumption `f = true`; children with facts of their own are first
    /// bound to the load of the slot that holds them.
    pub fn generate_type_info(&self, id: DescriptorId) -> PredicateState {
        let mut visited = FxHashSet::default();
        self.type_info_rec(id, &mut visited)
    }

    fn type_info_rec(&self, id: DescriptorId, visited: &mut FxHashSet<DescriptorId>) -> PredicateState {
        if !visited.insert(id) {
            return PredicateState::empty();
        }
        let node = &self.nodes[id.0];
        let mut builder = StateBuilder::new();
        let slots: Vec<(Term, DescriptorId)> = match &node.kind {
            DescriptorKind::Constant(_) => return PredicateState::empty(),
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => fields
                .iter()
                .map(|(key, &child)| {
                    let field = TermFactory::field(node.term.clone(), key.ty.clone(), key.name.clone());
                    (TermFactory::field_load(field), child)
                })
                .collect(),
            DescriptorKind::Array { elements, .. } => elements
                .iter()
                .map(|(&index, &child)| {
                    let slot = TermFactory::array_index(node.term.clone(), TermFactory::int(index));
                    (TermFactory::array_load(slot), child)
                })
                .collect(),
        };

        if !matches!(node.kind, DescriptorKind::Class { .. }) {
            let flag = TermFactory::generate(IrType::Bool);
            builder.state(PredicateKind::equality(
                flag.clone(),
                TermFactory::instance_of(node.ty.clone(), node.term.clone()),
            ));
            builder.assume(PredicateKind::equality(flag, TermFactory::bool(true)));
        }
        for (load, child) in slots {
            let info = self.type_info_rec(child, visited);
            if !info.is_empty() {
                builder.state(PredicateKind::equality(self.nodes[child.0].term.clone(), load));
                builder.append(&info);
            }
        }
        builder.apply()
    }

    /// Longest chain of nodes reachable from `id`; a revisited node counts 0
    pub fn depth(&self, id: DescriptorId) -> usize {
        let mut visited = FxHashSet::default();
        self.depth_rec(id, &mut visited)
    }

    fn depth_rec(&self, id: DescriptorId, visited: &mut FxHashSet<DescriptorId>) -> usize {
        if !visited.insert(id) {
            return 0;
        }
        let deepest = self.nodes[id.0]
            .children()
            .into_iter()
            .map(|child| self.depth_rec(child, visited))
            .max()
            .unwrap_or(0);
        1 + deepest
    }

    /// Whether `target` is reachable from `id`; constants match by value
    pub fn contains(&self, id: DescriptorId, target: DescriptorId) -> bool {
        let wanted = self.nodes[target.0].literal();
        let mut visited = FxHashSet::default();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current == target {
                return true;
            }
            let node = &self.nodes[current.0];
            if let (Some(want), Some(have)) = (wanted, node.literal()) {
                if want == have {
                    return true;
                }
            }
            stack.extend(node.children());
        }
        false
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Rewrites
    // ═══════════════════════════════════════════════════════════════════════

    /// Drop every field and element equal to its type's default, recursively
    pub fn reduce(&mut self, id: DescriptorId) {
        let mut visited = FxHashSet::default();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let survivors = self.drop_defaults(current);
            stack.extend(survivors);
        }
    }

    fn is_default_slot(&self, child: DescriptorId, slot_ty: &IrType) -> bool {
        self.nodes[child.0]
            .literal()
            .map(|literal| is_default_literal(literal, slot_ty))
            .unwrap_or(false)
    }

    /// Remove default children of one node; returns the remaining children
    fn drop_defaults(&mut self, id: DescriptorId) -> Vec<DescriptorId> {
        let element_type = self.nodes[id.0].element_type().cloned();
        let doomed_fields: Vec<FieldKey> = match &self.nodes[id.0].kind {
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => fields
                .iter()
                .filter(|(key, &child)| self.is_default_slot(child, &key.ty))
                .map(|(key, _)| key.clone())
                .collect(),
            _ => Vec::new(),
        };
        let doomed_elements: Vec<i32> = match (&self.nodes[id.0].kind, &element_type) {
            (DescriptorKind::Array { elements, .. }, Some(element_type)) => elements
                .iter()
                .filter(|(_, &child)| self.is_default_slot(child, element_type))
                .map(|(&index, _)| index)
                .collect(),
            _ => Vec::new(),
        };

        match &mut self.nodes[id.0].kind {
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => {
                for key in &doomed_fields {
                    fields.remove(key);
                }
            }
            DescriptorKind::Array { elements, .. } => {
                for index in &doomed_elements {
                    elements.remove(index);
                }
            }
            DescriptorKind::Constant(_) => {}
        }
        self.nodes[id.0].children()
    }

    /// Clone the graph reachable from `id`, preserving aliasing and cycles
    ///
    /// Containers get fresh terms; constants keep their literal terms.
    pub fn deep_copy(&mut self, id: DescriptorId) -> DescriptorId {
        let mut memo = FxHashMap::default();
        self.copy_rec(id, &mut memo)
    }

    fn copy_rec(&mut self, id: DescriptorId, memo: &mut FxHashMap<DescriptorId, DescriptorId>) -> DescriptorId {
        if let Some(&copy) = memo.get(&id) {
            return copy;
        }
        let original = self.nodes[id.0].clone();
        let term = match &original.kind {
            DescriptorKind::Constant(_) | DescriptorKind::Class { .. } => original.term.clone(),
            _ => TermFactory::generate(original.ty.clone()),
        };
        let shell = match &original.kind {
            DescriptorKind::Constant(literal) => DescriptorKind::Constant(literal.clone()),
            DescriptorKind::Object { .. } => DescriptorKind::Object {
                fields: BTreeMap::new(),
            },
            DescriptorKind::Class { .. } => DescriptorKind::Class {
                fields: BTreeMap::new(),
            },
            DescriptorKind::Array { length, .. } => DescriptorKind::Array {
                length: *length,
                elements: BTreeMap::new(),
            },
        };
        let copy = self.push(DescriptorNode {
            term,
            ty: original.ty.clone(),
            kind: shell,
        });
        memo.insert(id, copy);

        match original.kind {
            DescriptorKind::Constant(_) => {}
            DescriptorKind::Object { fields } | DescriptorKind::Class { fields } => {
                for (key, child) in fields {
                    let child_copy = self.copy_rec(child, memo);
                    if let DescriptorKind::Object { fields } | DescriptorKind::Class { fields } =
                        &mut self.nodes[copy.0].kind
                    {
                        fields.insert(key, child_copy);
                    }
                }
            }
            DescriptorKind::Array { elements, .. } => {
                for (index, child) in elements {
                    let child_copy = self.copy_rec(child, memo);
                    if let DescriptorKind::Array { elements, .. } = &mut self.nodes[copy.0].kind {
                        elements.insert(index, child_copy);
                    }
                }
            }
        }
        copy
    }
}
