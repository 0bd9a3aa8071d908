//! Declaration-level Java AST.
//!
//! Nodes are plain data. Type declarations are shared through `Arc` so that the model layer
//! can hold on to one declaration without cloning the whole unit.

use std::sync::Arc;

use crate::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<Arc<TypeDecl>>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub is_static: bool,
    pub is_star: bool,
    /// Dotted path without the trailing `.*`.
    pub path: String,
    pub range: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
    Sealed,
    NonSealed,
}

impl Modifier {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "static" => Modifier::Static,
            "final" => Modifier::Final,
            "abstract" => Modifier::Abstract,
            "native" => Modifier::Native,
            "synchronized" => Modifier::Synchronized,
            "transient" => Modifier::Transient,
            "volatile" => Modifier::Volatile,
            "strictfp" => Modifier::Strictfp,
            "default" => Modifier::Default,
            "sealed" => Modifier::Sealed,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers {
    pub keywords: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.keywords.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub modifiers: Modifiers,
    pub name: String,
    pub name_range: Span,
    pub type_params: Vec<TypeParamDecl>,
    /// Superclass for classes, super-interfaces for interfaces.
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub permits: Vec<TypeRef>,
    pub record_components: Vec<ParamDecl>,
    pub enum_constants: Vec<EnumConstantDecl>,
    pub members: Vec<MemberDecl>,
    pub range: Span,
    pub body_range: Span,
}

impl TypeDecl {
    pub fn member_types(&self) -> impl Iterator<Item = &Arc<TypeDecl>> {
        self.members.iter().filter_map(|member| match member {
            MemberDecl::Type(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|member| match member {
            MemberDecl::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            MemberDecl::Method(method) => Some(method),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstantDecl {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_range: Span,
    pub args: Vec<Expr>,
    /// `true` when the constant declares a class body.
    pub has_body: bool,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl {
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer(InitializerDecl),
    Type(Arc<TypeDecl>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub declarators: Vec<VariableDeclarator>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub name: String,
    pub name_range: Span,
    /// Extra `[]` written after the name.
    pub dims: usize,
    pub initializer: Option<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParamDecl>,
    /// `None` for constructors and `void` methods.
    pub return_ty: Option<TypeRef>,
    pub is_constructor: bool,
    pub name: String,
    pub name_range: Span,
    pub params: Vec<ParamDecl>,
    pub throws: Vec<TypeRef>,
    /// `default` clause of an annotation interface element.
    pub default_value: Option<Expr>,
    pub body_range: Option<Span>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializerDecl {
    pub is_static: bool,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub modifiers: Modifiers,
    /// Declared type with trailing dims folded in; for varargs the element type.
    pub ty: TypeRef,
    pub is_varargs: bool,
    pub name: String,
    pub name_range: Span,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamDecl {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub bounds: Vec<TypeRef>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub annotations: Vec<Annotation>,
    pub range: Span,
}

impl TypeRef {
    pub fn missing(range: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::Missing,
            annotations: Vec::new(),
            range,
        }
    }

    /// Wraps `self` in `dims` array levels.
    pub fn with_dims(self, dims: usize, range: Span) -> Self {
        (0..dims).fold(self, |component, _| TypeRef {
            kind: TypeRefKind::Array(Box::new(component)),
            annotations: Vec::new(),
            range,
        })
    }

    /// Written form with type arguments elided, e.g. `java.util.Map.Entry[]`.
    pub fn erased_text(&self) -> String {
        match &self.kind {
            TypeRefKind::Primitive(name) => name.clone(),
            TypeRefKind::Void => "void".to_string(),
            TypeRefKind::Named(segments) => segments
                .iter()
                .map(|segment| segment.name.as_str())
                .collect::<Vec<_>>()
                .join("."),
            TypeRefKind::Array(component) => format!("{}[]", component.erased_text()),
            TypeRefKind::Wildcard(_) => "?".to_string(),
            TypeRefKind::Missing => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRefKind {
    /// Primitive keyword (`int`, `boolean`, ...).
    Primitive(String),
    /// Only appears in `void.class`.
    Void,
    Named(Vec<TypeRefSegment>),
    Array(Box<TypeRef>),
    Wildcard(Option<WildcardBound>),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRefSegment {
    pub name: String,
    pub args: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WildcardBound {
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Name as written (`Deprecated`, `java.lang.annotation.Retention`).
    pub name: String,
    pub name_range: Span,
    pub elements: Vec<ElementValuePair>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    /// `value` for the single-element shorthand `@A(x)`.
    pub name: String,
    pub value: Expr,
    pub range: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    TextBlock,
    True,
    False,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Name(NameExpr),
    FieldAccess(FieldAccessExpr),
    ClassLiteral(ClassLiteralExpr),
    ArrayInit(ArrayInitExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Conditional(ConditionalExpr),
    Cast(CastExpr),
    Paren(ParenExpr),
    Annotation(Box<Annotation>),
    Call(CallExpr),
    New(NewExpr),
    /// Well-formed source the expression parser does not model (lambdas, switch, ...).
    Opaque(Span),
    /// Nothing was written where an expression was required.
    Missing(Span),
}

impl Expr {
    pub fn range(&self) -> Span {
        match self {
            Expr::Literal(e) => e.range,
            Expr::Name(e) => e.range,
            Expr::FieldAccess(e) => e.range,
            Expr::ClassLiteral(e) => e.range,
            Expr::ArrayInit(e) => e.range,
            Expr::Unary(e) => e.range,
            Expr::Binary(e) => e.range,
            Expr::Conditional(e) => e.range,
            Expr::Cast(e) => e.range,
            Expr::Paren(e) => e.range,
            Expr::Annotation(e) => e.range,
            Expr::Call(e) => e.range,
            Expr::New(e) => e.range,
            Expr::Opaque(range) | Expr::Missing(range) => *range,
        }
    }

    /// Dotted text of a name or field-access chain (`a.b.C`), if that is all it is.
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Expr::Name(name) => Some(name.name.clone()),
            Expr::FieldAccess(access) => {
                let target = access.target.qualified_name()?;
                Some(format!("{target}.{}", access.name))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub text: String,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameExpr {
    pub name: String,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessExpr {
    pub target: Box<Expr>,
    pub name: String,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassLiteralExpr {
    pub ty: TypeRef,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInitExpr {
    pub elements: Vec<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub ty: TypeRef,
    pub expr: Box<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub target: Option<Box<Expr>>,
    pub name: String,
    pub args: Vec<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub ty: TypeRef,
    pub args: Vec<Expr>,
    pub range: Span,
}
