//! Compile errors of a source type: parse errors in its range plus what binding finds.

use jmodel_syntax::ast::{self, Expr, TypeDecl, TypeRef, TypeRefKind, WildcardBound};
use jmodel_syntax::Span;
use serde::Serialize;

use crate::binding::{TypeBinding, ValueBinding};

use super::binder::{param_type, Scope};
use super::state::{EnvState, SourceTypeLoc};

/// A problem found in source, with its byte range in the compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CompileError {
    pub message: String,
    pub range: Span,
}

impl CompileError {
    fn new(message: impl Into<String>, range: Span) -> Self {
        CompileError {
            message: message.into(),
            range,
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}: {}", self.range.start, self.range.end, self.message)
    }
}

impl EnvState {
    pub(crate) fn compile_errors(&self, loc: &SourceTypeLoc) -> Vec<CompileError> {
        let range = loc.decl.range;
        let mut errors: Vec<CompileError> = loc
            .unit
            .errors
            .iter()
            .filter(|error| range.contains(error.range.start) || error.range.start == range.end)
            .map(|error| CompileError::new(error.message.clone(), error.range))
            .collect();
        self.check_type(loc, &mut errors);
        errors.sort_by_key(|error| (error.range.start, error.range.end));
        errors.dedup();
        tracing::debug!(
            target: "jmodel.env",
            class = %loc.binary_name(),
            errors = errors.len(),
            "checked type"
        );
        errors
    }

    fn check_type(&self, loc: &SourceTypeLoc, errors: &mut Vec<CompileError>) {
        let decl: &TypeDecl = &loc.decl;
        let header = Scope::header(loc);
        let body = Scope::for_type(loc);

        self.check_annotations(&header, &decl.modifiers.annotations, errors);
        for param in &decl.type_params {
            self.check_annotations(&header, &param.annotations, errors);
            for bound in &param.bounds {
                self.check_type_ref(&header, bound, errors);
            }
        }
        for tref in decl.extends.iter().chain(&decl.implements).chain(&decl.permits) {
            self.check_type_ref(&header, tref, errors);
        }
        for component in &decl.record_components {
            self.check_annotations(&body, &component.modifiers.annotations, errors);
            self.check_type_ref(&body, &component.ty, errors);
        }
        for constant in &decl.enum_constants {
            self.check_annotations(&body, &constant.annotations, errors);
        }

        for member in &decl.members {
            match member {
                ast::MemberDecl::Field(field) => {
                    self.check_annotations(&body, &field.modifiers.annotations, errors);
                    self.check_type_ref(&body, &field.ty, errors);
                }
                ast::MemberDecl::Method(method) => {
                    let scope = Scope::for_method(loc, method);
                    self.check_annotations(&scope, &method.modifiers.annotations, errors);
                    for param in &method.type_params {
                        self.check_annotations(&scope, &param.annotations, errors);
                        for bound in &param.bounds {
                            self.check_type_ref(&scope, bound, errors);
                        }
                    }
                    if let Some(return_ty) = &method.return_ty {
                        self.check_type_ref(&scope, return_ty, errors);
                    }
                    for param in &method.params {
                        self.check_annotations(&scope, &param.modifiers.annotations, errors);
                        self.check_type_ref(&scope, &param_type(param), errors);
                    }
                    for thrown in &method.throws {
                        self.check_type_ref(&scope, thrown, errors);
                    }
                    if let (Some(default), Some(return_ty)) = (&method.default_value, &method.return_ty) {
                        let expected = self.resolve_type_ref(&scope, return_ty);
                        self.check_value(&scope, default, Some(&expected), &method.name, errors);
                    }
                }
                ast::MemberDecl::Initializer(_) | ast::MemberDecl::Type(_) => {}
            }
        }

        for child in loc.member_types() {
            self.check_type(&child, errors);
        }
    }

    fn check_type_ref(&self, scope: &Scope, tref: &TypeRef, errors: &mut Vec<CompileError>) {
        self.check_annotations(scope, &tref.annotations, errors);
        match &tref.kind {
            TypeRefKind::Named(segments) => {
                if self.resolve_type_ref(scope, &strip_args(tref)).is_problem() {
                    errors.push(CompileError::new(
                        format!("cannot resolve type `{}`", tref.erased_text()),
                        tref.range,
                    ));
                }
                for arg in segments.iter().flat_map(|segment| &segment.args) {
                    self.check_type_ref(scope, arg, errors);
                }
            }
            TypeRefKind::Array(component) => self.check_type_ref(scope, component, errors),
            TypeRefKind::Wildcard(Some(WildcardBound::Extends(bound) | WildcardBound::Super(bound))) => {
                self.check_type_ref(scope, bound, errors)
            }
            TypeRefKind::Primitive(_) | TypeRefKind::Void | TypeRefKind::Wildcard(None) => {}
            // Already reported by the parser.
            TypeRefKind::Missing => {}
        }
    }

    fn check_annotations(&self, scope: &Scope, annotations: &[ast::Annotation], errors: &mut Vec<CompileError>) {
        for annotation in annotations {
            self.check_annotation(scope, annotation, errors);
        }
    }

    fn check_annotation(&self, scope: &Scope, annotation: &ast::Annotation, errors: &mut Vec<CompileError>) {
        let segments: Vec<&str> = annotation.name.split('.').collect();
        let Some(type_name) = self.resolve_type_name(scope, &segments) else {
            errors.push(CompileError::new(
                format!("cannot resolve annotation type `{}`", annotation.name),
                annotation.name_range,
            ));
            return;
        };
        if !self.is_annotation_type(&type_name) {
            errors.push(CompileError::new(
                format!("`{}` is not an annotation type", annotation.name),
                annotation.name_range,
            ));
            return;
        }

        let declared = self.annotation_elements(&type_name);
        for pair in &annotation.elements {
            if !declared.iter().any(|(name, _)| *name == pair.name) {
                errors.push(CompileError::new(
                    format!("`@{}` has no element `{}`", annotation.name, pair.name),
                    pair.range,
                ));
                continue;
            }
            let expected = self.annotation_element_type(&type_name, &pair.name);
            self.check_value(scope, &pair.value, expected.as_ref(), &pair.name, errors);
        }
        for (name, has_default) in &declared {
            if !has_default && !annotation.elements.iter().any(|pair| pair.name == *name) {
                errors.push(CompileError::new(
                    format!("`@{}` is missing a value for `{name}`", annotation.name),
                    annotation.range,
                ));
            }
        }
    }

    fn check_value(
        &self,
        scope: &Scope,
        expr: &Expr,
        expected: Option<&TypeBinding>,
        element: &str,
        errors: &mut Vec<CompileError>,
    ) {
        let component = match expected {
            Some(TypeBinding::Array(component)) => Some(component.as_ref()),
            other => other,
        };
        match expr {
            Expr::ArrayInit(init) => {
                for item in &init.elements {
                    self.check_value(scope, item, component, element, errors);
                }
            }
            Expr::Annotation(annotation) => self.check_annotation(scope, annotation, errors),
            Expr::ClassLiteral(literal) => self.check_type_ref(scope, &literal.ty, errors),
            Expr::Paren(paren) => self.check_value(scope, &paren.expr, expected, element, errors),
            Expr::Missing(range) => errors.push(CompileError::new(
                format!("missing value for `{element}`"),
                *range,
            )),
            _ => {
                if self.evaluate(scope, expr, component) == ValueBinding::Unknown {
                    errors.push(CompileError::new(
                        format!("value for `{element}` is not a constant expression"),
                        expr.range(),
                    ));
                }
            }
        }
    }
}

/// Drops type arguments so that only the named class itself is checked.
fn strip_args(tref: &TypeRef) -> TypeRef {
    let mut stripped = tref.clone();
    if let TypeRefKind::Named(segments) = &mut stripped.kind {
        for segment in segments {
            segment.args.clear();
        }
    }
    stripped
}
