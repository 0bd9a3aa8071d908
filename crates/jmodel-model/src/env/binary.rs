//! Class stubs to bindings.

use jmodel_classfile::access::*;
use jmodel_classfile::{
    BaseType, ClassStub, FieldStub, FieldType, MethodStub, ReturnType, TypeParameter,
};

use crate::binding::{
    qualified_from_binary, split_binary_name, AnnotationBinding, ClassBinding, ClassKind,
    ConstValue, FieldBinding, MethodBinding, Origin, ParamBinding, TypeBinding, TypeParamBinding,
    TypeVarOwner, ValueBinding,
};
use crate::flags::Modifiers;

use super::state::{EnvState, TypeLoc};

const CLASS_MASK: u16 =
    ACC_PUBLIC | ACC_PRIVATE | ACC_PROTECTED | ACC_STATIC | ACC_FINAL | ACC_ABSTRACT | ACC_STRICT;
const FIELD_MASK: u16 = ACC_PUBLIC
    | ACC_PRIVATE
    | ACC_PROTECTED
    | ACC_STATIC
    | ACC_FINAL
    | ACC_VOLATILE
    | ACC_TRANSIENT
    | ACC_SYNTHETIC;
const METHOD_MASK: u16 = ACC_PUBLIC
    | ACC_PRIVATE
    | ACC_PROTECTED
    | ACC_STATIC
    | ACC_FINAL
    | ACC_SYNCHRONIZED
    | ACC_NATIVE
    | ACC_ABSTRACT
    | ACC_STRICT
    | ACC_SYNTHETIC;

pub(crate) fn class_kind(stub: &ClassStub) -> ClassKind {
    let flags = stub.access_flags;
    if flags & ACC_ANNOTATION != 0 {
        ClassKind::Annotation
    } else if flags & ACC_INTERFACE != 0 {
        ClassKind::Interface
    } else if flags & ACC_ENUM != 0 {
        ClassKind::Enum
    } else if stub.super_class.as_deref() == Some("java/lang/Record") {
        ClassKind::Record
    } else {
        ClassKind::Class
    }
}

pub(crate) fn type_param_names(stub: &ClassStub) -> Vec<String> {
    stub.signature
        .as_ref()
        .map(|sig| sig.type_parameters.iter().map(|p| p.name.clone()).collect())
        .unwrap_or_default()
}

/// Simple name and binary name of each declared member class, in declaration order. javac
/// enters a class's own member classes into `InnerClasses` last-declared first.
pub(crate) fn member_types(stub: &ClassStub) -> Vec<(String, String)> {
    stub.member_classes
        .iter()
        .rev()
        .filter_map(|info| {
            Some((
                info.inner_name.clone()?,
                info.inner_class.replace('/', "."),
            ))
        })
        .collect()
}

pub(crate) fn direct_supertypes(stub: &ClassStub) -> Vec<String> {
    stub.super_class
        .iter()
        .chain(stub.interfaces.iter())
        .map(|internal| internal.replace('/', "."))
        .collect()
}

pub(crate) fn field_type(field: &FieldStub, owner: &dyn Fn(&str) -> TypeVarOwner) -> TypeBinding {
    match &field.signature {
        Some(sig) => TypeBinding::from_signature(sig, owner),
        None => TypeBinding::from_field_type(&field.descriptor),
    }
}

pub(crate) fn return_type(
    method: &MethodStub,
    owner: &dyn Fn(&str) -> TypeVarOwner,
) -> Option<TypeBinding> {
    if let Some(sig) = &method.signature {
        return Some(
            sig.return_type
                .as_ref()
                .map(|ty| TypeBinding::from_signature(ty, owner))
                .unwrap_or(TypeBinding::Void),
        );
    }
    Some(match &method.descriptor.return_type {
        ReturnType::Void => TypeBinding::Void,
        ReturnType::Type(ty) => TypeBinding::from_field_type(ty),
    })
}

impl EnvState {
    /// Resolves a type variable used inside `stub`: the class itself, then its enclosing classes.
    fn class_var_owner(&self, stub: &ClassStub, name: &str) -> TypeVarOwner {
        let binary_name = stub.binary_name();
        if type_param_names(stub).iter().any(|param| param == name) {
            return TypeVarOwner::Class(binary_name);
        }
        let mut outer = stub
            .nesting
            .as_ref()
            .and_then(|info| info.outer_class.as_ref())
            .map(|internal| internal.replace('/', "."));
        while let Some(outer_name) = outer {
            let Some(TypeLoc::Binary(outer_stub)) = self.type_loc(&outer_name) else {
                break;
            };
            if type_param_names(outer_stub).iter().any(|param| param == name) {
                return TypeVarOwner::Class(outer_name);
            }
            outer = outer_stub
                .nesting
                .as_ref()
                .and_then(|info| info.outer_class.as_ref())
                .map(|internal| internal.replace('/', "."));
        }
        TypeVarOwner::Class(binary_name)
    }

    pub(crate) fn bind_stub(&self, stub: &ClassStub) -> ClassBinding {
        let binary_name = stub.binary_name();
        let (package, fallback_simple) = split_binary_name(&binary_name);
        let package = package.to_string();
        let simple_name = stub
            .nesting
            .as_ref()
            .and_then(|info| info.inner_name.clone())
            .unwrap_or_else(|| fallback_simple.to_string());
        let kind = class_kind(stub);
        let class_owner = |name: &str| self.class_var_owner(stub, name);

        let mut modifiers = Modifiers::from_bits(u32::from(stub.declared_access_flags() & CLASS_MASK));
        if kind.is_interface() {
            // Required by the JVM for interfaces; hand-written class files sometimes omit it.
            modifiers.insert(Modifiers::ABSTRACT);
        }

        let type_params = stub
            .signature
            .as_ref()
            .map(|sig| {
                sig.type_parameters
                    .iter()
                    .map(|param| type_param(param, &class_owner))
                    .collect()
            })
            .unwrap_or_default();

        let super_class = if kind.is_interface() || binary_name == "java.lang.Object" {
            None
        } else {
            match &stub.signature {
                Some(sig) => Some(TypeBinding::from_class_signature(&sig.super_class, &class_owner)),
                None => stub
                    .super_class
                    .as_ref()
                    .map(|internal| TypeBinding::class(internal.replace('/', "."))),
            }
        };
        let interfaces = match &stub.signature {
            Some(sig) => sig
                .interfaces
                .iter()
                .map(|iface| TypeBinding::from_class_signature(iface, &class_owner))
                .collect(),
            None => stub
                .interfaces
                .iter()
                .map(|internal| TypeBinding::class(internal.replace('/', ".")))
                .collect(),
        };

        let fields = stub
            .fields
            .iter()
            .map(|field| FieldBinding {
                name: field.name.clone(),
                modifiers: Modifiers::from_bits(u32::from(field.access_flags & FIELD_MASK)),
                ty: field_type(field, &class_owner),
                constant: field.constant_value.as_ref().map(ConstValue::from_class_value),
                is_enum_constant: field.access_flags & ACC_ENUM != 0,
                annotations: annotations(&field.annotations),
            })
            .collect();

        let methods = stub
            .methods
            .iter()
            .filter(|method| method.name != "<clinit>")
            .map(|method| self.bind_method(stub, kind, &simple_name, method))
            .collect();

        let enclosing = stub
            .nesting
            .as_ref()
            .and_then(|info| info.outer_class.as_ref())
            .map(|internal| internal.replace('/', "."));

        ClassBinding {
            qualified_name: qualified_from_binary(&binary_name),
            binary_name,
            package,
            simple_name,
            kind,
            modifiers,
            origin: Origin::Binary,
            enclosing,
            member_types: member_types(stub).into_iter().map(|(_, binary)| binary).collect(),
            type_params,
            super_class,
            interfaces,
            fields,
            methods,
            annotations: annotations(&stub.annotations),
            source_path: None,
        }
    }

    fn bind_method(
        &self,
        stub: &ClassStub,
        kind: ClassKind,
        simple_name: &str,
        method: &MethodStub,
    ) -> MethodBinding {
        let class_name = stub.binary_name();
        let is_constructor = method.name == "<init>";
        let name = if is_constructor {
            simple_name.to_string()
        } else {
            method.name.clone()
        };
        let flags = method.access_flags;
        let mut modifiers = Modifiers::from_bits(u32::from(flags & METHOD_MASK));
        if flags & ACC_BRIDGE != 0 {
            modifiers.insert(Modifiers::BRIDGE);
        }
        if kind.is_interface() && flags & (ACC_ABSTRACT | ACC_STATIC | ACC_PRIVATE) == 0 {
            modifiers.insert(Modifiers::DEFAULT);
        }
        if kind == ClassKind::Enum && flags & ACC_STATIC != 0 {
            let descriptor = method.descriptor.to_descriptor();
            let implicit = (method.name == "values" && descriptor.starts_with("()"))
                || (method.name == "valueOf" && descriptor.starts_with("(Ljava/lang/String;)"));
            if implicit {
                modifiers.insert(Modifiers::GENERATED);
            }
        }

        let method_type_params: Vec<String> = method
            .signature
            .as_ref()
            .map(|sig| sig.type_parameters.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default();
        // Signatures omit leading synthetic parameters (outer instance, enum name/ordinal) that
        // the descriptor and `MethodParameters` still carry.
        let skipped = match &method.signature {
            Some(sig) => method.descriptor.params.len().saturating_sub(sig.parameters.len()),
            None => implicit_leading_params(stub, kind, method),
        };
        let arity = method
            .signature
            .as_ref()
            .map(|sig| sig.parameters.len())
            .unwrap_or(method.descriptor.params.len() - skipped);
        let method_owner = TypeVarOwner::Method {
            class: class_name.clone(),
            method: name.clone(),
            arity,
        };
        let owner = |var: &str| {
            if method_type_params.iter().any(|param| param == var) {
                method_owner.clone()
            } else {
                self.class_var_owner(stub, var)
            }
        };

        let param_types: Vec<TypeBinding> = match &method.signature {
            Some(sig) => sig
                .parameters
                .iter()
                .map(|ty| TypeBinding::from_signature(ty, &owner))
                .collect(),
            None => method
                .descriptor
                .params
                .iter()
                .skip(skipped)
                .map(TypeBinding::from_field_type)
                .collect(),
        };
        let names = method.parameter_names.as_deref().unwrap_or(&[]);
        // javac sizes parameter annotations to the declared parameters only.
        let annotation_skip = if method.parameter_annotations.len() < method.descriptor.params.len() {
            0
        } else {
            skipped
        };
        let params = param_types
            .into_iter()
            .enumerate()
            .map(|(idx, ty)| {
                let slot = idx + skipped;
                ParamBinding {
                    name: names.get(slot).cloned().flatten(),
                    modifiers: method
                        .parameter_flags
                        .get(slot)
                        .map(|flags| Modifiers::from_bits(u32::from(flags & ACC_FINAL)))
                        .unwrap_or(Modifiers::NONE),
                    ty,
                    annotations: method
                        .parameter_annotations
                        .get(idx + annotation_skip)
                        .map(|anns| annotations(anns))
                        .unwrap_or_default(),
                }
            })
            .collect();

        let throws = match &method.signature {
            Some(sig) if !sig.throws.is_empty() => sig
                .throws
                .iter()
                .map(|ty| TypeBinding::from_signature(ty, &owner))
                .collect(),
            _ => method
                .exceptions
                .iter()
                .map(|internal| TypeBinding::class(internal.replace('/', ".")))
                .collect(),
        };

        MethodBinding {
            name,
            modifiers,
            is_constructor,
            is_varargs: flags & ACC_VARARGS != 0,
            type_params: method
                .signature
                .as_ref()
                .map(|sig| {
                    sig.type_parameters
                        .iter()
                        .map(|param| type_param(param, &owner))
                        .collect()
                })
                .unwrap_or_default(),
            params,
            return_type: if is_constructor {
                None
            } else {
                return_type(method, &owner)
            },
            throws,
            default_value: method
                .annotation_default
                .as_ref()
                .map(ValueBinding::from_element_value),
            annotations: annotations(&method.annotations),
        }
    }
}

/// Descriptor slots a constructor without a `Signature` carries ahead of its declared
/// parameters: the enclosing instance of an inner member class, or an enum constant's name and
/// ordinal. `MethodParameters`, when present, must flag each of them synthetic or mandated.
fn implicit_leading_params(stub: &ClassStub, kind: ClassKind, method: &MethodStub) -> usize {
    if method.name != "<init>" {
        return 0;
    }
    let params = &method.descriptor.params;
    let expected = match kind {
        ClassKind::Enum => {
            let name_and_ordinal = matches!(
                params.as_slice(),
                [FieldType::Object(name), FieldType::Base(BaseType::Int), ..]
                    if name == "java/lang/String"
            );
            if name_and_ordinal {
                2
            } else {
                0
            }
        }
        ClassKind::Class => match (&stub.nesting, params.first()) {
            (Some(info), Some(FieldType::Object(first)))
                if info.inner_name.is_some()
                    && info.access_flags & ACC_STATIC == 0
                    && info.outer_class.as_deref() == Some(first.as_str()) =>
            {
                1
            }
            _ => 0,
        },
        _ => 0,
    };
    if method.parameter_flags.is_empty() {
        return expected;
    }
    method
        .parameter_flags
        .iter()
        .take(expected)
        .take_while(|flags| **flags & (ACC_SYNTHETIC | ACC_MANDATED) != 0)
        .count()
}

fn type_param(param: &TypeParameter, owner: &dyn Fn(&str) -> TypeVarOwner) -> TypeParamBinding {
    TypeParamBinding {
        name: param.name.clone(),
        bounds: param
            .bounds()
            .map(|bound| TypeBinding::from_signature(bound, owner))
            .collect(),
        annotations: Vec::new(),
    }
}

fn annotations(annotations: &[jmodel_classfile::Annotation]) -> Vec<AnnotationBinding> {
    annotations
        .iter()
        .map(AnnotationBinding::from_class_annotation)
        .collect()
}
