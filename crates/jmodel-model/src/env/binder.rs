//! Name resolution and binding of source declarations.
//!
//! Simple type names resolve in this order: method type parameters, then for each enclosing
//! class from the innermost outwards its member types (declared or inherited) and its type
//! parameters, then the unit's own top-level types, single-type imports, the current package,
//! on-demand imports and finally `java.lang`.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, OnceLock};

use jmodel_syntax::ast::{
    self, Expr, MethodDecl, ParamDecl, TypeDecl, TypeDeclKind, TypeParamDecl, TypeRef, TypeRefKind,
    TypeRefSegment, WildcardBound,
};
use jmodel_syntax::Span;

use crate::binding::{
    qualified_from_binary, AnnotationBinding, ClassBinding, ClassKind, ClassRef, ConstValue,
    FieldBinding, MethodBinding, ParamBinding, TypeBinding, TypeParamBinding, TypeVarOwner,
    TypeVarRef, ValueBinding, WildcardKind,
};
use crate::flags::Modifiers;

use super::binary;
use super::state::{qualify, EnvState, SourceTypeLoc, SourceUnit, TypeLoc};

/// Lexical context for names written in a compilation unit.
#[derive(Clone, Debug)]
pub(crate) struct Scope {
    pub(crate) unit: Arc<SourceUnit>,
    /// Enclosing classes by binary name, outermost first.
    pub(crate) classes: Vec<String>,
    /// Resolving the `extends`/`implements` clause of the innermost class: its type parameters
    /// are visible, its members are not.
    pub(crate) header: bool,
    pub(crate) method: Option<MethodScope>,
}

#[derive(Clone, Debug)]
pub(crate) struct MethodScope {
    pub(crate) type_params: Vec<String>,
    pub(crate) owner: TypeVarOwner,
}

impl Scope {
    pub(crate) fn unit(unit: &Arc<SourceUnit>) -> Self {
        Scope {
            unit: unit.clone(),
            classes: Vec::new(),
            header: false,
            method: None,
        }
    }

    /// Names outside any written unit, optionally inside one (binary) class.
    pub(crate) fn detached(unit: &Arc<SourceUnit>, class: Option<String>) -> Self {
        Scope {
            classes: class.into_iter().collect(),
            ..Scope::unit(unit)
        }
    }

    pub(crate) fn for_type(loc: &SourceTypeLoc) -> Self {
        Scope {
            unit: loc.unit.clone(),
            classes: loc.chain.to_vec(),
            header: false,
            method: None,
        }
    }

    pub(crate) fn header(loc: &SourceTypeLoc) -> Self {
        Scope {
            header: true,
            ..Scope::for_type(loc)
        }
    }

    pub(crate) fn for_method(loc: &SourceTypeLoc, method: &MethodDecl) -> Self {
        Scope {
            method: Some(MethodScope {
                type_params: method.type_params.iter().map(|p| p.name.clone()).collect(),
                owner: method_var_owner(loc.binary_name(), &method.name, method.params.len()),
            }),
            ..Scope::for_type(loc)
        }
    }
}

pub(crate) fn method_var_owner(class: &str, method: &str, arity: usize) -> TypeVarOwner {
    TypeVarOwner::Method {
        class: class.to_string(),
        method: method.to_string(),
        arity,
    }
}

thread_local! {
    static ACTIVE: RefCell<HashSet<(usize, String)>> = RefCell::new(HashSet::new());
}

struct ActiveGuard((usize, String));

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().remove(&self.0);
        });
    }
}

impl EnvState {
    /// Runs `f` unless the same computation is already in progress on this thread, which only
    /// happens for cyclic declarations.
    pub(crate) fn guarded<R>(&self, key: String, f: impl FnOnce() -> R) -> Option<R> {
        let token = (self as *const EnvState as usize, key);
        let fresh = ACTIVE.with(|active| active.borrow_mut().insert(token.clone()));
        if !fresh {
            tracing::trace!(target: "jmodel.env", key = %token.1, "cycle cut");
            return None;
        }
        let _guard = ActiveGuard(token);
        Some(f())
    }
}

pub(crate) fn class_kind(kind: TypeDeclKind) -> ClassKind {
    match kind {
        TypeDeclKind::Class => ClassKind::Class,
        TypeDeclKind::Interface => ClassKind::Interface,
        TypeDeclKind::Enum => ClassKind::Enum,
        TypeDeclKind::Annotation => ClassKind::Annotation,
        TypeDeclKind::Record => ClassKind::Record,
    }
}

pub(crate) fn keyword_modifiers(modifiers: &ast::Modifiers) -> Modifiers {
    modifiers
        .keywords
        .iter()
        .filter_map(|keyword| Modifiers::from_keyword(keyword.keyword()))
        .fold(Modifiers::NONE, |acc, flag| acc | flag)
}

/// Declared plus implicit modifiers, as a compiler would record them.
pub(crate) fn class_modifiers(loc: &SourceTypeLoc) -> Modifiers {
    let decl = &loc.decl;
    let kind = class_kind(decl.kind);
    let mut modifiers = keyword_modifiers(&decl.modifiers);
    match kind {
        ClassKind::Interface | ClassKind::Annotation => modifiers |= Modifiers::ABSTRACT,
        ClassKind::Enum => {
            if !decl.enum_constants.iter().any(|constant| constant.has_body) {
                modifiers |= Modifiers::FINAL;
            }
        }
        ClassKind::Record => modifiers |= Modifiers::FINAL,
        ClassKind::Class => {}
    }
    if let Some(parent) = loc.enclosing() {
        if kind != ClassKind::Class {
            modifiers |= Modifiers::STATIC;
        }
        if class_kind(parent.decl.kind).is_interface() {
            modifiers |= Modifiers::PUBLIC | Modifiers::STATIC;
        }
    }
    modifiers
}

pub(crate) fn field_modifiers(field: &ast::FieldDecl, owner: ClassKind) -> Modifiers {
    let mut modifiers = keyword_modifiers(&field.modifiers);
    if owner.is_interface() {
        modifiers |= Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
    }
    modifiers
}

pub(crate) const ENUM_CONSTANT_MODIFIERS: Modifiers = Modifiers::PUBLIC
    .union(Modifiers::STATIC)
    .union(Modifiers::FINAL);

pub(crate) const RECORD_COMPONENT_MODIFIERS: Modifiers = Modifiers::PRIVATE.union(Modifiers::FINAL);

pub(crate) fn method_modifiers(method: &MethodDecl, owner: ClassKind) -> Modifiers {
    let mut modifiers = keyword_modifiers(&method.modifiers);
    if owner.is_interface() {
        if !modifiers.contains(Modifiers::PRIVATE) {
            modifiers |= Modifiers::PUBLIC;
        }
        let concrete = Modifiers::STATIC | Modifiers::DEFAULT | Modifiers::PRIVATE;
        if method.body_range.is_none() && !modifiers.intersects(concrete) {
            modifiers |= Modifiers::ABSTRACT;
        }
    }
    if owner == ClassKind::Enum && method.is_constructor {
        modifiers |= Modifiers::PRIVATE;
    }
    modifiers
}

fn access_modifiers(modifiers: Modifiers) -> Modifiers {
    let access = Modifiers::PUBLIC | Modifiers::PROTECTED | Modifiers::PRIVATE;
    Modifiers::from_bits(modifiers.bits() & access.bits())
}

/// Position of a field in a source declaration, in the order the model lists fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum FieldSlot {
    EnumConstant(usize),
    Declared { member: usize, declarator: usize },
    RecordComponent(usize),
}

/// Position of a method in a source declaration. All but `Declared` are implicit members the
/// compiler adds; of those only `values` and `valueOf` are hidden from the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum MethodSlot {
    Declared(usize),
    RecordConstructor,
    RecordAccessor(usize),
    RecordToString,
    RecordHashCode,
    RecordEquals,
    DefaultConstructor,
    EnumValues,
    EnumValueOf,
}

impl MethodSlot {
    pub(crate) fn is_generated(self) -> bool {
        matches!(self, MethodSlot::EnumValues | MethodSlot::EnumValueOf)
    }
}

pub(crate) fn field_slots(decl: &TypeDecl) -> Vec<FieldSlot> {
    let mut slots: Vec<FieldSlot> = (0..decl.enum_constants.len())
        .map(FieldSlot::EnumConstant)
        .collect();
    for (member, item) in decl.members.iter().enumerate() {
        if let ast::MemberDecl::Field(field) = item {
            slots.extend(
                (0..field.declarators.len())
                    .map(|declarator| FieldSlot::Declared { member, declarator }),
            );
        }
    }
    slots.extend((0..decl.record_components.len()).map(FieldSlot::RecordComponent));
    slots
}

pub(crate) fn method_slots(decl: &TypeDecl) -> Vec<MethodSlot> {
    let mut slots = Vec::new();
    let mut has_constructor = false;
    for (idx, member) in decl.members.iter().enumerate() {
        if let ast::MemberDecl::Method(method) = member {
            has_constructor |= method.is_constructor;
            slots.push(MethodSlot::Declared(idx));
        }
    }
    match decl.kind {
        TypeDeclKind::Record => {
            let arity = decl.record_components.len();
            let canonical_declared = decl
                .methods()
                .any(|method| method.is_constructor && method.params.len() == arity);
            if !canonical_declared {
                slots.push(MethodSlot::RecordConstructor);
            }
            for (idx, component) in decl.record_components.iter().enumerate() {
                let declared = decl
                    .methods()
                    .any(|method| method.name == component.name && method.params.is_empty());
                if !declared {
                    slots.push(MethodSlot::RecordAccessor(idx));
                }
            }
            let declares = |name: &str, arity: usize| {
                decl.methods().any(|method| {
                    !method.is_constructor
                        && method.name == name
                        && method.params.len() == arity
                        && method.params.iter().all(|param| {
                            matches!(param.ty.erased_text().as_str(), "Object" | "java.lang.Object")
                        })
                })
            };
            if !declares("toString", 0) {
                slots.push(MethodSlot::RecordToString);
            }
            if !declares("hashCode", 0) {
                slots.push(MethodSlot::RecordHashCode);
            }
            if !declares("equals", 1) {
                slots.push(MethodSlot::RecordEquals);
            }
        }
        TypeDeclKind::Class | TypeDeclKind::Enum if !has_constructor => {
            slots.push(MethodSlot::DefaultConstructor);
        }
        _ => {}
    }
    if decl.kind == TypeDeclKind::Enum {
        slots.push(MethodSlot::EnumValues);
        slots.push(MethodSlot::EnumValueOf);
    }
    slots
}

/// A field declaration seen through its slot.
pub(crate) struct FieldView<'a> {
    pub(crate) name: &'a str,
    pub(crate) modifiers: Modifiers,
    /// `None` for enum constants, whose type is the enum itself.
    pub(crate) ty: Option<TypeRef>,
    pub(crate) initializer: Option<&'a Expr>,
    pub(crate) annotations: &'a [ast::Annotation],
    pub(crate) is_enum_constant: bool,
}

pub(crate) fn field_view(decl: &TypeDecl, slot: FieldSlot) -> Option<FieldView<'_>> {
    let owner = class_kind(decl.kind);
    match slot {
        FieldSlot::EnumConstant(idx) => {
            let constant = decl.enum_constants.get(idx)?;
            Some(FieldView {
                name: &constant.name,
                modifiers: ENUM_CONSTANT_MODIFIERS,
                ty: None,
                initializer: None,
                annotations: &constant.annotations,
                is_enum_constant: true,
            })
        }
        FieldSlot::Declared { member, declarator } => {
            let ast::MemberDecl::Field(field) = decl.members.get(member)? else {
                return None;
            };
            let var = field.declarators.get(declarator)?;
            Some(FieldView {
                name: &var.name,
                modifiers: field_modifiers(field, owner),
                ty: Some(field.ty.clone().with_dims(var.dims, field.ty.range)),
                initializer: var.initializer.as_ref(),
                annotations: &field.modifiers.annotations,
                is_enum_constant: false,
            })
        }
        FieldSlot::RecordComponent(idx) => {
            let component = decl.record_components.get(idx)?;
            Some(FieldView {
                name: &component.name,
                modifiers: RECORD_COMPONENT_MODIFIERS,
                ty: Some(param_type(component)),
                initializer: None,
                annotations: &component.modifiers.annotations,
                is_enum_constant: false,
            })
        }
    }
}

/// A source-backed method seen through its slot. `values` and `valueOf` have no view.
pub(crate) struct MethodView<'a> {
    pub(crate) name: &'a str,
    pub(crate) modifiers: Modifiers,
    pub(crate) is_constructor: bool,
    pub(crate) type_params: &'a [TypeParamDecl],
    pub(crate) params: &'a [ParamDecl],
    /// `None` for constructors and `void` methods.
    pub(crate) return_ty: Option<&'a TypeRef>,
    pub(crate) throws: &'a [TypeRef],
    pub(crate) default_value: Option<&'a Expr>,
    pub(crate) annotations: &'a [ast::Annotation],
    pub(crate) decl: Option<&'a MethodDecl>,
}

impl MethodView<'_> {
    pub(crate) fn is_varargs(&self) -> bool {
        self.params.last().is_some_and(|param| param.is_varargs)
    }
}

pub(crate) fn method_view(decl: &TypeDecl, slot: MethodSlot) -> Option<MethodView<'_>> {
    let owner = class_kind(decl.kind);
    match slot {
        MethodSlot::Declared(idx) => {
            let ast::MemberDecl::Method(method) = decl.members.get(idx)? else {
                return None;
            };
            Some(MethodView {
                name: &method.name,
                modifiers: method_modifiers(method, owner),
                is_constructor: method.is_constructor,
                type_params: &method.type_params,
                params: &method.params,
                return_ty: method.return_ty.as_ref(),
                throws: &method.throws,
                default_value: method.default_value.as_ref(),
                annotations: &method.modifiers.annotations,
                decl: Some(method),
            })
        }
        MethodSlot::RecordConstructor => Some(MethodView {
            name: &decl.name,
            modifiers: access_modifiers(keyword_modifiers(&decl.modifiers)),
            is_constructor: true,
            type_params: &[],
            params: &decl.record_components,
            return_ty: None,
            throws: &[],
            default_value: None,
            annotations: &[],
            decl: None,
        }),
        MethodSlot::RecordAccessor(idx) => {
            let component = decl.record_components.get(idx)?;
            Some(MethodView {
                name: &component.name,
                modifiers: Modifiers::PUBLIC,
                is_constructor: false,
                type_params: &[],
                params: &[],
                return_ty: Some(&component.ty),
                throws: &[],
                default_value: None,
                annotations: &[],
                decl: None,
            })
        }
        MethodSlot::RecordToString => {
            let types = ObjectMethodTypes::get();
            Some(object_method("toString", &[], Some(&types.string)))
        }
        MethodSlot::RecordHashCode => {
            let types = ObjectMethodTypes::get();
            Some(object_method("hashCode", &[], Some(&types.int)))
        }
        MethodSlot::RecordEquals => {
            let types = ObjectMethodTypes::get();
            Some(object_method("equals", &types.other, Some(&types.boolean)))
        }
        MethodSlot::DefaultConstructor => Some(MethodView {
            name: &decl.name,
            modifiers: if decl.kind == TypeDeclKind::Enum {
                Modifiers::PRIVATE
            } else {
                access_modifiers(keyword_modifiers(&decl.modifiers))
            },
            is_constructor: true,
            type_params: &[],
            params: &[],
            return_ty: None,
            throws: &[],
            default_value: None,
            annotations: &[],
            decl: None,
        }),
        MethodSlot::EnumValues | MethodSlot::EnumValueOf => None,
    }
}

fn object_method<'a>(
    name: &'a str,
    params: &'a [ParamDecl],
    return_ty: Option<&'a TypeRef>,
) -> MethodView<'a> {
    MethodView {
        name,
        modifiers: Modifiers::PUBLIC | Modifiers::FINAL,
        is_constructor: false,
        type_params: &[],
        params,
        return_ty,
        throws: &[],
        default_value: None,
        annotations: &[],
        decl: None,
    }
}

/// Types written in the `Object` methods a record gets implicitly. Names are fully qualified so
/// a member type of the record cannot shadow them.
struct ObjectMethodTypes {
    string: TypeRef,
    int: TypeRef,
    boolean: TypeRef,
    /// The `Object o` parameter of `equals`.
    other: [ParamDecl; 1],
}

impl ObjectMethodTypes {
    fn get() -> &'static ObjectMethodTypes {
        static TYPES: OnceLock<ObjectMethodTypes> = OnceLock::new();
        TYPES.get_or_init(|| ObjectMethodTypes {
            string: implicit_type_ref(TypeRefKind::Named(qualified_segments("java.lang.String"))),
            int: implicit_type_ref(TypeRefKind::Primitive("int".to_string())),
            boolean: implicit_type_ref(TypeRefKind::Primitive("boolean".to_string())),
            other: [ParamDecl {
                modifiers: ast::Modifiers::default(),
                ty: implicit_type_ref(TypeRefKind::Named(qualified_segments("java.lang.Object"))),
                is_varargs: false,
                name: "o".to_string(),
                name_range: Span::default(),
                range: Span::default(),
            }],
        })
    }
}

fn implicit_type_ref(kind: TypeRefKind) -> TypeRef {
    TypeRef {
        kind,
        annotations: Vec::new(),
        range: Span::default(),
    }
}

fn qualified_segments(name: &str) -> Vec<TypeRefSegment> {
    name.split('.')
        .map(|segment| TypeRefSegment {
            name: segment.to_string(),
            args: Vec::new(),
        })
        .collect()
}

/// Declared parameter type; varargs parameters are arrays of the written element type.
pub(crate) fn param_type(param: &ParamDecl) -> TypeRef {
    if param.is_varargs {
        param.ty.clone().with_dims(1, param.ty.range)
    } else {
        param.ty.clone()
    }
}

enum SimpleName {
    Class(String),
    TypeVar(TypeVarRef),
}

/// A field found by name, with what constant folding and enum evaluation need.
pub(crate) enum FieldSite {
    Source {
        loc: SourceTypeLoc,
        slot: FieldSlot,
    },
    Binary {
        constant: Option<ConstValue>,
        is_enum_constant: bool,
    },
}

impl FieldSite {
    pub(crate) fn is_enum_constant(&self) -> bool {
        match self {
            FieldSite::Source { loc, slot } => {
                field_view(&loc.decl, *slot).is_some_and(|view| view.is_enum_constant)
            }
            FieldSite::Binary {
                is_enum_constant, ..
            } => *is_enum_constant,
        }
    }
}

impl EnvState {
    /// Dotted (`java.util.Map.Entry`) or binary (`java.util.Map$Entry`) name to binary name.
    pub(crate) fn resolve_name(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(hit) = self.caches.resolved.lock().get(name) {
            return hit.clone();
        }
        let resolved = self.lookup_name(name);
        self.caches
            .resolved
            .lock()
            .insert(name.to_string(), resolved.clone());
        resolved
    }

    fn lookup_name(&self, name: &str) -> Option<String> {
        if self.exists(name) {
            return Some(name.to_string());
        }
        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return None;
        }
        // Longest package prefix first: `a.b.C.D` tries `a.b.C$D` before `a.b$C$D`.
        (0..segments.len()).rev().find_map(|split| {
            let candidate = qualify(&segments[..split].join("."), &segments[split..].join("$"));
            self.exists(&candidate).then_some(candidate)
        })
    }

    pub(crate) fn binding(&self, binary_name: &str) -> Option<Arc<ClassBinding>> {
        if let Some(hit) = self.caches.bindings.lock().get(binary_name) {
            return hit.clone();
        }
        let binding = self.type_loc(binary_name).map(|loc| {
            Arc::new(match loc {
                TypeLoc::Source(loc) => self.bind_source(loc),
                TypeLoc::Binary(stub) => self.bind_stub(stub),
            })
        });
        self.caches
            .bindings
            .lock()
            .entry(binary_name.to_string())
            .or_insert(binding)
            .clone()
    }

    pub(crate) fn type_param_names(&self, binary_name: &str) -> Vec<String> {
        match self.type_loc(binary_name) {
            Some(TypeLoc::Source(loc)) => {
                loc.decl.type_params.iter().map(|p| p.name.clone()).collect()
            }
            Some(TypeLoc::Binary(stub)) => binary::type_param_names(stub),
            None => Vec::new(),
        }
    }

    /// Declared member types as `(simple name, binary name)`.
    pub(crate) fn own_member_types(&self, binary_name: &str) -> Vec<(String, String)> {
        match self.type_loc(binary_name) {
            Some(TypeLoc::Source(loc)) => loc
                .member_types()
                .map(|child| (child.decl.name.clone(), child.binary_name().to_string()))
                .collect(),
            Some(TypeLoc::Binary(stub)) => binary::member_types(stub),
            None => Vec::new(),
        }
    }

    /// Superclass first, then interfaces, by binary name. Unresolved supertypes are left out.
    pub(crate) fn direct_supertypes(&self, binary_name: &str) -> Arc<[String]> {
        if let Some(hit) = self.caches.supertypes.lock().get(binary_name) {
            return hit.clone();
        }
        let computed = self
            .guarded(format!("super:{binary_name}"), || {
                self.compute_direct_supertypes(binary_name)
            })
            .unwrap_or_default();
        let computed: Arc<[String]> = Arc::from(computed);
        self.caches
            .supertypes
            .lock()
            .insert(binary_name.to_string(), computed.clone());
        computed
    }

    fn compute_direct_supertypes(&self, binary_name: &str) -> Vec<String> {
        match self.type_loc(binary_name) {
            Some(TypeLoc::Source(loc)) => {
                let scope = Scope::header(loc);
                let mut out = Vec::new();
                if let Some(implicit) = implicit_superclass(loc) {
                    out.push(implicit.to_string());
                }
                for tref in loc.decl.extends.iter().chain(&loc.decl.implements) {
                    if let Some(name) = self.resolve_type_ref_name(&scope, tref) {
                        out.push(name);
                    }
                }
                if loc.decl.kind == TypeDeclKind::Annotation {
                    out.push("java.lang.annotation.Annotation".to_string());
                }
                out
            }
            Some(TypeLoc::Binary(stub)) => binary::direct_supertypes(stub),
            None => Vec::new(),
        }
    }

    /// Member type `simple` of `binary_name`, declared or inherited.
    pub(crate) fn find_member_type(&self, binary_name: &str, simple: &str) -> Option<String> {
        let mut queue = VecDeque::from([binary_name.to_string()]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some((_, binary)) = self
                .own_member_types(&current)
                .into_iter()
                .find(|(name, _)| name == simple)
            {
                return Some(binary);
            }
            queue.extend(self.direct_supertypes(&current).iter().cloned());
        }
        None
    }

    /// Field `name` of `binary_name`, declared or inherited, with its declaring class.
    pub(crate) fn find_field(&self, binary_name: &str, name: &str) -> Option<(String, FieldSite)> {
        let mut queue = VecDeque::from([binary_name.to_string()]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            match self.type_loc(&current) {
                Some(TypeLoc::Source(loc)) => {
                    let slot = field_slots(&loc.decl).into_iter().find(|slot| {
                        field_view(&loc.decl, *slot).is_some_and(|view| view.name == name)
                    });
                    if let Some(slot) = slot {
                        return Some((
                            current,
                            FieldSite::Source {
                                loc: loc.clone(),
                                slot,
                            },
                        ));
                    }
                }
                Some(TypeLoc::Binary(stub)) => {
                    if let Some(field) = stub.fields.iter().find(|field| field.name == name) {
                        return Some((
                            current,
                            FieldSite::Binary {
                                constant: field
                                    .constant_value
                                    .as_ref()
                                    .map(ConstValue::from_class_value),
                                is_enum_constant: field.access_flags
                                    & jmodel_classfile::access::ACC_ENUM
                                    != 0,
                            },
                        ));
                    }
                }
                None => {}
            }
            queue.extend(self.direct_supertypes(&current).iter().cloned());
        }
        None
    }

    fn resolve_simple_name(&self, scope: &Scope, name: &str) -> Option<SimpleName> {
        if let Some(method) = &scope.method {
            if method.type_params.iter().any(|param| param == name) {
                return Some(SimpleName::TypeVar(TypeVarRef {
                    name: name.to_string(),
                    owner: method.owner.clone(),
                }));
            }
        }

        for (depth, class) in scope.classes.iter().enumerate().rev() {
            let innermost = depth + 1 == scope.classes.len();
            if !(scope.header && innermost) {
                if let Some(member) = self.find_member_type(class, name) {
                    return Some(SimpleName::Class(member));
                }
            }
            if self.type_param_names(class).iter().any(|param| param == name) {
                return Some(SimpleName::TypeVar(TypeVarRef {
                    name: name.to_string(),
                    owner: TypeVarOwner::Class(class.clone()),
                }));
            }
        }

        self.resolve_unit_name(&scope.unit, name).map(SimpleName::Class)
    }

    /// Resolution at compilation-unit level: own types, imports, package, `java.lang`.
    pub(crate) fn resolve_unit_name(&self, unit: &SourceUnit, name: &str) -> Option<String> {
        if unit.ast.types.iter().any(|decl| decl.name == name) {
            return Some(unit.top_level_binary_name(name));
        }

        for import in unit.ast.imports.iter().filter(|import| !import.is_star) {
            let Some((container, last)) = import.path.rsplit_once('.') else {
                continue;
            };
            if last != name {
                continue;
            }
            let found = if import.is_static {
                self.resolve_name(container)
                    .and_then(|class| self.find_member_type(&class, name))
            } else {
                self.resolve_name(&import.path)
            };
            if found.is_some() {
                return found;
            }
        }

        let same_package = qualify(&unit.package, name);
        if self.exists(&same_package) {
            return Some(same_package);
        }

        for import in unit.ast.imports.iter().filter(|import| import.is_star) {
            let candidate = format!("{}.{name}", import.path);
            if !import.is_static && self.exists(&candidate) {
                return Some(candidate);
            }
            if let Some(member) = self
                .resolve_name(&import.path)
                .and_then(|class| self.find_member_type(&class, name))
            {
                return Some(member);
            }
        }

        let lang = format!("java.lang.{name}");
        self.exists(&lang).then_some(lang)
    }

    /// Dotted type name in scope, e.g. `Map.Entry` or `java.util.Map.Entry`.
    pub(crate) fn resolve_type_name(&self, scope: &Scope, segments: &[&str]) -> Option<String> {
        let (first, rest) = segments.split_first()?;
        if let Some(SimpleName::Class(class)) = self.resolve_simple_name(scope, first) {
            if let Some(found) = self.member_path(class, rest) {
                return Some(found);
            }
        }
        // Package-qualified: shortest package prefix that names an existing class.
        (1..segments.len()).find_map(|split| {
            let class = qualify(&segments[..split].join("."), segments[split]);
            if !self.exists(&class) {
                return None;
            }
            self.member_path(class, &segments[split + 1..])
        })
    }

    fn member_path(&self, class: String, members: &[&str]) -> Option<String> {
        members
            .iter()
            .try_fold(class, |current, member| self.find_member_type(&current, member))
    }

    /// Binary name of a written class type, ignoring type arguments.
    pub(crate) fn resolve_type_ref_name(&self, scope: &Scope, tref: &TypeRef) -> Option<String> {
        match &tref.kind {
            TypeRefKind::Named(segments) => {
                let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
                self.resolve_type_name(scope, &names)
            }
            _ => None,
        }
    }

    pub(crate) fn resolve_type_ref(&self, scope: &Scope, tref: &TypeRef) -> TypeBinding {
        match &tref.kind {
            TypeRefKind::Primitive(keyword) => jmodel_classfile::BaseType::from_keyword(keyword)
                .map(TypeBinding::Primitive)
                .unwrap_or_else(|| TypeBinding::Problem(keyword.clone())),
            TypeRefKind::Void => TypeBinding::Void,
            TypeRefKind::Array(component) => {
                TypeBinding::Array(Box::new(self.resolve_type_ref(scope, component)))
            }
            TypeRefKind::Wildcard(bound) => match bound {
                None => TypeBinding::Wildcard {
                    bound: None,
                    kind: WildcardKind::Extends,
                },
                Some(WildcardBound::Extends(bound)) => TypeBinding::Wildcard {
                    bound: Some(Box::new(self.resolve_type_ref(scope, bound))),
                    kind: WildcardKind::Extends,
                },
                Some(WildcardBound::Super(bound)) => TypeBinding::Wildcard {
                    bound: Some(Box::new(self.resolve_type_ref(scope, bound))),
                    kind: WildcardKind::Super,
                },
            },
            TypeRefKind::Missing => TypeBinding::Problem(String::new()),
            TypeRefKind::Named(segments) => {
                if let [single] = segments.as_slice() {
                    if let Some(SimpleName::TypeVar(var)) =
                        self.resolve_simple_name(scope, &single.name)
                    {
                        return TypeBinding::TypeVar(var);
                    }
                }
                let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
                match self.resolve_type_name(scope, &names) {
                    Some(binary_name) => {
                        TypeBinding::Class(self.class_usage(scope, binary_name, segments))
                    }
                    None => TypeBinding::Problem(tref.erased_text()),
                }
            }
        }
    }

    /// Usage of `binary_name` written as `segments`. Arguments written on an enclosing class
    /// (`Outer<String>.Inner`) stay on the outer chain.
    fn class_usage(&self, scope: &Scope, binary_name: String, segments: &[TypeRefSegment]) -> ClassRef {
        let Some((last, rest)) = segments.split_last() else {
            return ClassRef::new(binary_name, Vec::new());
        };
        let args = last
            .args
            .iter()
            .map(|arg| self.resolve_type_ref(scope, arg))
            .collect();
        let outer = rest.last().and_then(|written| {
            let outer = self.enclosing_name(&binary_name)?;
            let simple = outer.rsplit(['.', '$']).next()?;
            (simple == written.name).then_some(outer)
        });
        let class = ClassRef::new(binary_name, args);
        match outer {
            Some(outer) => class.within(self.class_usage(scope, outer, rest)),
            None => class,
        }
    }

    fn enclosing_name(&self, binary_name: &str) -> Option<String> {
        match self.type_loc(binary_name)? {
            TypeLoc::Source(loc) => loc.enclosing().map(|outer| outer.binary_name().to_string()),
            TypeLoc::Binary(stub) => stub
                .nesting
                .as_ref()?
                .outer_class
                .as_ref()
                .map(|internal| internal.replace('/', ".")),
        }
    }

    /// Class and field a name expression refers to: a field of an enclosing class, a static
    /// import, or `Type.FIELD`.
    pub(crate) fn resolve_field_ref(&self, scope: &Scope, expr: &Expr) -> Option<(String, FieldSite)> {
        match expr {
            Expr::Name(name) => {
                let name = name.name.as_str();
                for class in scope.classes.iter().rev() {
                    if let Some(found) = self.find_field(class, name) {
                        return Some(found);
                    }
                }
                let imports = &scope.unit.ast.imports;
                for import in imports.iter().filter(|i| i.is_static && !i.is_star) {
                    if let Some((container, last)) = import.path.rsplit_once('.') {
                        if last == name {
                            if let Some(found) = self
                                .resolve_name(container)
                                .and_then(|class| self.find_field(&class, name))
                            {
                                return Some(found);
                            }
                        }
                    }
                }
                for import in imports.iter().filter(|i| i.is_static && i.is_star) {
                    if let Some(found) = self
                        .resolve_name(&import.path)
                        .and_then(|class| self.find_field(&class, name))
                    {
                        return Some(found);
                    }
                }
                None
            }
            Expr::FieldAccess(access) => {
                let target = access.target.qualified_name()?;
                let segments: Vec<&str> = target.split('.').collect();
                let class = self.resolve_type_name(scope, &segments)?;
                self.find_field(&class, &access.name)
            }
            Expr::Paren(paren) => self.resolve_field_ref(scope, &paren.expr),
            _ => None,
        }
    }

    /// Folded value of a constant variable, `None` for anything else.
    pub(crate) fn field_constant(&self, class: &str, site: &FieldSite) -> Option<ConstValue> {
        match site {
            FieldSite::Binary { constant, .. } => constant.clone(),
            FieldSite::Source { loc, slot } => {
                let view = field_view(&loc.decl, *slot)?;
                let key = (class.to_string(), view.name.to_string());
                if let Some(hit) = self.caches.constants.lock().get(&key) {
                    return hit.clone();
                }
                let value = self
                    .guarded(format!("const:{class}#{}", view.name), || {
                        self.compute_field_constant(loc, &view)
                    })
                    .flatten();
                self.caches.constants.lock().insert(key, value.clone());
                value
            }
        }
    }

    fn compute_field_constant(&self, loc: &SourceTypeLoc, view: &FieldView<'_>) -> Option<ConstValue> {
        if !view.modifiers.is_final() || view.is_enum_constant {
            return None;
        }
        let ty = view.ty.as_ref()?;
        let initializer = view.initializer?;
        let scope = Scope::for_type(loc);
        let declared = self.resolve_type_ref(&scope, ty);
        let value = self.fold(&scope, initializer)?;
        constant_conversion(value, &declared)
    }

    /// Return type of annotation element `element` of `annotation`.
    pub(crate) fn annotation_element_type(&self, annotation: &str, element: &str) -> Option<TypeBinding> {
        match self.type_loc(annotation)? {
            TypeLoc::Source(loc) => {
                let method = loc
                    .decl
                    .methods()
                    .find(|method| method.name == element && method.params.is_empty())?;
                let return_ty = method.return_ty.as_ref()?;
                Some(self.resolve_type_ref(&Scope::for_method(loc, method), return_ty))
            }
            TypeLoc::Binary(stub) => {
                let method = stub.methods.iter().find(|method| {
                    method.name == element && method.descriptor.params.is_empty()
                })?;
                let class = stub.binary_name();
                binary::return_type(method, &|_: &str| TypeVarOwner::Class(class.clone()))
            }
        }
    }

    /// Elements of an annotation interface as `(name, has default)`, in declaration order.
    pub(crate) fn annotation_elements(&self, annotation: &str) -> Vec<(String, bool)> {
        match self.type_loc(annotation) {
            Some(TypeLoc::Source(loc)) => loc
                .decl
                .methods()
                .filter(|method| method.params.is_empty() && !method.is_constructor)
                .map(|method| (method.name.clone(), method.default_value.is_some()))
                .collect(),
            Some(TypeLoc::Binary(stub)) => stub
                .methods
                .iter()
                .filter(|method| method.descriptor.params.is_empty() && method.name != "<clinit>")
                .filter(|method| method.access_flags & jmodel_classfile::access::ACC_STATIC == 0)
                .map(|method| (method.name.clone(), method.annotation_default.is_some()))
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn is_annotation_type(&self, binary_name: &str) -> bool {
        match self.type_loc(binary_name) {
            Some(TypeLoc::Source(loc)) => loc.decl.kind == TypeDeclKind::Annotation,
            Some(TypeLoc::Binary(stub)) => binary::class_kind(stub) == ClassKind::Annotation,
            None => false,
        }
    }

    pub(crate) fn bind_annotation(&self, scope: &Scope, annotation: &ast::Annotation) -> AnnotationBinding {
        let segments: Vec<&str> = annotation.name.split('.').collect();
        let type_name = self.resolve_type_name(scope, &segments);
        let elements = annotation
            .elements
            .iter()
            .map(|pair| {
                let expected = type_name
                    .as_deref()
                    .and_then(|ty| self.annotation_element_type(ty, &pair.name));
                let value = self.evaluate(scope, &pair.value, expected.as_ref());
                (pair.name.clone(), value)
            })
            .collect();
        AnnotationBinding {
            type_name,
            written_name: annotation.name.clone(),
            elements,
        }
    }

    fn bind_annotations(&self, scope: &Scope, annotations: &[ast::Annotation]) -> Vec<AnnotationBinding> {
        annotations
            .iter()
            .map(|annotation| self.bind_annotation(scope, annotation))
            .collect()
    }

    pub(crate) fn bind_type_params(&self, scope: &Scope, params: &[TypeParamDecl]) -> Vec<TypeParamBinding> {
        params
            .iter()
            .map(|param| TypeParamBinding {
                name: param.name.clone(),
                bounds: param
                    .bounds
                    .iter()
                    .map(|bound| self.resolve_type_ref(scope, bound))
                    .collect(),
                annotations: self.bind_annotations(scope, &param.annotations),
            })
            .collect()
    }

    pub(crate) fn super_class_binding(&self, loc: &SourceTypeLoc) -> Option<TypeBinding> {
        let decl = &loc.decl;
        match decl.kind {
            TypeDeclKind::Class => match decl.extends.first() {
                Some(tref) => Some(self.resolve_type_ref(&Scope::header(loc), tref)),
                None => implicit_superclass(loc).map(TypeBinding::class),
            },
            TypeDeclKind::Enum => Some(TypeBinding::Class(ClassRef::new(
                "java.lang.Enum",
                vec![TypeBinding::class(loc.binary_name())],
            ))),
            TypeDeclKind::Record => Some(TypeBinding::class("java.lang.Record")),
            TypeDeclKind::Interface | TypeDeclKind::Annotation => None,
        }
    }

    pub(crate) fn interface_bindings(&self, loc: &SourceTypeLoc) -> Vec<TypeBinding> {
        let decl = &loc.decl;
        let written = match decl.kind {
            TypeDeclKind::Interface => &decl.extends,
            _ => &decl.implements,
        };
        let scope = Scope::header(loc);
        let mut out: Vec<TypeBinding> = written
            .iter()
            .map(|tref| self.resolve_type_ref(&scope, tref))
            .collect();
        if decl.kind == TypeDeclKind::Annotation {
            out.push(TypeBinding::class("java.lang.annotation.Annotation"));
        }
        out
    }

    pub(crate) fn bind_source(&self, loc: &SourceTypeLoc) -> ClassBinding {
        let decl = &loc.decl;
        let binary_name = loc.binary_name().to_string();
        let kind = class_kind(decl.kind);
        let scope = Scope::for_type(loc);
        let header = Scope::header(loc);

        let fields = field_slots(decl)
            .into_iter()
            .filter_map(|slot| {
                let view = field_view(decl, slot)?;
                let ty = match &view.ty {
                    Some(ty) => self.resolve_type_ref(&scope, ty),
                    None => TypeBinding::class(binary_name.clone()),
                };
                let constant = self.field_constant(
                    &binary_name,
                    &FieldSite::Source {
                        loc: loc.clone(),
                        slot,
                    },
                );
                Some(FieldBinding {
                    name: view.name.to_string(),
                    modifiers: view.modifiers,
                    ty,
                    constant,
                    is_enum_constant: view.is_enum_constant,
                    annotations: self.bind_annotations(&scope, view.annotations),
                })
            })
            .collect();

        let methods = method_slots(decl)
            .into_iter()
            .filter_map(|slot| self.bind_method_slot(loc, slot))
            .collect();

        tracing::trace!(target: "jmodel.env", class = %binary_name, "bound source class");

        ClassBinding {
            qualified_name: qualified_from_binary(&binary_name),
            package: loc.unit.package.clone(),
            simple_name: decl.name.clone(),
            kind,
            modifiers: class_modifiers(loc),
            origin: loc.origin(),
            enclosing: loc
                .chain
                .len()
                .checked_sub(2)
                .map(|idx| loc.chain[idx].clone()),
            member_types: loc
                .member_types()
                .map(|child| child.binary_name().to_string())
                .collect(),
            type_params: self.bind_type_params(&header, &decl.type_params),
            super_class: self.super_class_binding(loc),
            interfaces: self.interface_bindings(loc),
            fields,
            methods,
            annotations: self.bind_annotations(&header, &decl.modifiers.annotations),
            source_path: Some(loc.unit.path.clone()),
            binary_name,
        }
    }

    fn bind_method_slot(&self, loc: &SourceTypeLoc, slot: MethodSlot) -> Option<MethodBinding> {
        let decl = &loc.decl;
        let binary_name = loc.binary_name();
        let generated = |name: &str,
                         modifiers: Modifiers,
                         params: Vec<ParamBinding>,
                         ret: Option<TypeBinding>| {
            Some(MethodBinding {
                name: name.to_string(),
                modifiers: modifiers | Modifiers::GENERATED,
                is_constructor: ret.is_none(),
                is_varargs: false,
                type_params: Vec::new(),
                params,
                return_type: ret,
                throws: Vec::new(),
                default_value: None,
                annotations: Vec::new(),
            })
        };
        let self_type = TypeBinding::class(binary_name);
        match slot {
            MethodSlot::EnumValues => {
                return generated(
                    "values",
                    Modifiers::PUBLIC | Modifiers::STATIC,
                    Vec::new(),
                    Some(TypeBinding::Array(Box::new(self_type))),
                );
            }
            MethodSlot::EnumValueOf => {
                let param = ParamBinding {
                    name: Some("name".to_string()),
                    modifiers: Modifiers::NONE,
                    ty: TypeBinding::class("java.lang.String"),
                    annotations: Vec::new(),
                };
                return generated(
                    "valueOf",
                    Modifiers::PUBLIC | Modifiers::STATIC,
                    vec![param],
                    Some(self_type),
                );
            }
            _ => {}
        }

        let view = method_view(decl, slot)?;
        let scope = self.method_scope(loc, &view);
        let params = view
            .params
            .iter()
            .map(|param| ParamBinding {
                name: Some(param.name.clone()),
                modifiers: keyword_modifiers(&param.modifiers),
                ty: self.resolve_type_ref(&scope, &param_type(param)),
                annotations: self.bind_annotations(&scope, &param.modifiers.annotations),
            })
            .collect();
        let return_type = if view.is_constructor {
            None
        } else {
            Some(
                view.return_ty
                    .map(|ty| self.resolve_type_ref(&scope, ty))
                    .unwrap_or(TypeBinding::Void),
            )
        };
        let default_value = view.default_value.map(|expr| {
            self.evaluate(&scope, expr, return_type.as_ref())
        });
        Some(MethodBinding {
            name: view.name.to_string(),
            modifiers: view.modifiers,
            is_constructor: view.is_constructor,
            is_varargs: view.is_varargs(),
            type_params: self.bind_type_params(&scope, view.type_params),
            params,
            return_type,
            throws: view
                .throws
                .iter()
                .map(|ty| self.resolve_type_ref(&scope, ty))
                .collect(),
            default_value,
            annotations: self.bind_annotations(&scope, view.annotations),
        })
    }

    pub(crate) fn method_scope(&self, loc: &SourceTypeLoc, view: &MethodView<'_>) -> Scope {
        match view.decl {
            Some(method) => Scope::for_method(loc, method),
            None => Scope::for_type(loc),
        }
    }
}

fn implicit_superclass(loc: &SourceTypeLoc) -> Option<&'static str> {
    match loc.decl.kind {
        TypeDeclKind::Class if loc.decl.extends.is_empty() => {
            (loc.binary_name() != "java.lang.Object").then_some("java.lang.Object")
        }
        TypeDeclKind::Enum => Some("java.lang.Enum"),
        TypeDeclKind::Record => Some("java.lang.Record"),
        _ => None,
    }
}

/// Converts a constant to a declared or cast-to type; only primitives and `String` qualify.
pub(crate) fn constant_conversion(value: ConstValue, declared: &TypeBinding) -> Option<ConstValue> {
    match declared {
        TypeBinding::Primitive(base) if !matches!(value, ConstValue::String(_)) => {
            value.cast_to(*base)
        }
        TypeBinding::Class(class) if class.binary_name == "java.lang.String" => {
            matches!(value, ConstValue::String(_)).then_some(value)
        }
        _ => None,
    }
}

/// Value an annotation element gets when nothing usable was written.
pub(crate) fn absent_value(expected: Option<&TypeBinding>) -> ValueBinding {
    match expected {
        Some(TypeBinding::Array(_)) => ValueBinding::Array(Vec::new()),
        _ => ValueBinding::Unknown,
    }
}
