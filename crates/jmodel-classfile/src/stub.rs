use crate::annotation::{Annotation, ConstValue, ElementValue};
use crate::classfile::{ClassFile, ClassMember, InnerClassInfo};
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType, MethodDescriptor};
use crate::error::Result;
use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    FieldTypeSignature, MethodSignature,
};

/// A class file with descriptors and signatures decoded, ready to be turned into bindings.
#[derive(Debug, Clone)]
pub struct ClassStub {
    pub internal_name: String,
    pub access_flags: u16,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<ClassSignature>,
    pub annotations: Vec<Annotation>,
    /// Entry describing this class when it is nested (`outer_class` + simple name).
    pub nesting: Option<InnerClassInfo>,
    /// Direct member classes declared by this class, in `InnerClasses` order.
    pub member_classes: Vec<InnerClassInfo>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone)]
pub struct FieldStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: FieldType,
    pub signature: Option<FieldTypeSignature>,
    pub annotations: Vec<Annotation>,
    pub constant_value: Option<ConstValue>,
}

#[derive(Debug, Clone)]
pub struct MethodStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub signature: Option<MethodSignature>,
    pub annotations: Vec<Annotation>,
    pub parameter_names: Option<Vec<Option<String>>>,
    /// `MethodParameters` flags (`ACC_FINAL`, `ACC_SYNTHETIC`, `ACC_MANDATED`); empty without it.
    pub parameter_flags: Vec<u16>,
    pub parameter_annotations: Vec<Vec<Annotation>>,
    pub exceptions: Vec<String>,
    pub annotation_default: Option<ElementValue>,
}

impl ClassStub {
    pub fn from_classfile(class: &ClassFile) -> Result<Self> {
        let signature = class
            .signature
            .as_deref()
            .map(parse_class_signature)
            .transpose()?;

        let fields = class
            .fields
            .iter()
            .map(field_stub)
            .collect::<Result<Vec<_>>>()?;
        let methods = class
            .methods
            .iter()
            .map(method_stub)
            .collect::<Result<Vec<_>>>()?;

        let nesting = class.inner_info().cloned();
        let member_classes = class
            .inner_classes
            .iter()
            .filter(|info| info.outer_class.as_deref() == Some(class.this_class.as_str()))
            .filter(|info| info.inner_name.is_some())
            .cloned()
            .collect();

        Ok(ClassStub {
            internal_name: class.this_class.clone(),
            access_flags: class.access_flags,
            super_class: class.super_class.clone(),
            interfaces: class.interfaces.clone(),
            signature,
            annotations: class.annotations.clone(),
            nesting,
            member_classes,
            fields,
            methods,
        })
    }

    /// Dotted binary name (`com.example.Outer$Inner`).
    pub fn binary_name(&self) -> String {
        self.internal_name.replace('/', ".")
    }

    /// Access flags as declared in source; nested classes carry their real flags in `InnerClasses`.
    pub fn declared_access_flags(&self) -> u16 {
        self.nesting
            .as_ref()
            .map(|info| info.access_flags)
            .unwrap_or(self.access_flags)
    }
}

fn field_stub(member: &ClassMember) -> Result<FieldStub> {
    Ok(FieldStub {
        access_flags: member.access_flags,
        name: member.name.clone(),
        descriptor: parse_field_descriptor(&member.descriptor)?,
        signature: member
            .signature
            .as_deref()
            .map(parse_field_signature)
            .transpose()?,
        annotations: member.annotations.clone(),
        constant_value: member.constant_value.clone(),
    })
}

fn method_stub(member: &ClassMember) -> Result<MethodStub> {
    Ok(MethodStub {
        access_flags: member.access_flags,
        name: member.name.clone(),
        descriptor: parse_method_descriptor(&member.descriptor)?,
        signature: member
            .signature
            .as_deref()
            .map(parse_method_signature)
            .transpose()?,
        annotations: member.annotations.clone(),
        parameter_names: member.parameter_names.clone(),
        parameter_flags: member.parameter_flags.clone(),
        parameter_annotations: member.parameter_annotations.clone(),
        exceptions: member.exceptions.clone(),
        annotation_default: member.annotation_default.clone(),
    })
}

impl ClassFile {
    pub fn stub(&self) -> Result<ClassStub> {
        ClassStub::from_classfile(self)
    }
}
