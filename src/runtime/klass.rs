use crate::language::{
    ast::{ClassDef, ClassGroupDef},
    span::Span,
};
use crate::runtime::{
    context::TypeRegistry,
    error::RuntimeResult,
    types::{check_record_type, RecordShape, RuntimeType},
    value::{NamedRecordInstance, RecordInstance, Value},
};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Descriptor produced once per class definition.
#[derive(Debug)]
pub struct NamedRecordKlass {
    pub classname: String,
    pub group: Option<String>,
    pub value_spec: RecordShape,
    pub src: Rc<ClassDef>,
}

impl NamedRecordKlass {
    pub fn from_definition(def: &Rc<ClassDef>, group: Option<&str>) -> Self {
        let value_spec = RecordShape {
            fields: def
                .fields
                .iter()
                .map(|field| (field.name.clone(), RuntimeType::from_type_expr(&field.ty)))
                .collect(),
        };
        Self {
            classname: def.name.clone(),
            group: group.map(str::to_string),
            value_spec,
            src: Rc::clone(def),
        }
    }

    /// `Point` or `Card.King`.
    pub fn display_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{group}.{}", self.classname),
            None => self.classname.clone(),
        }
    }

    pub fn instantiate(
        self: &Rc<Self>,
        record: RecordInstance,
        types: &TypeRegistry,
        span: Option<Span>,
    ) -> RuntimeResult<Value> {
        check_record_type(&record, &self.value_spec, &self.display_name(), types, span)?;
        Ok(Value::NamedRecord(NamedRecordInstance {
            klass: Rc::clone(self),
            record,
        }))
    }
}

impl fmt::Display for NamedRecordKlass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.display_name(), self.value_spec)
    }
}

/// Namespace of sibling classes, e.g. `Card` holding `King` and `Number`.
#[derive(Debug)]
pub struct NamedRecordGroup {
    pub name: String,
    pub klasses: IndexMap<String, Rc<NamedRecordKlass>>,
    pub src: Rc<ClassGroupDef>,
}

impl NamedRecordGroup {
    pub fn from_definition(def: &Rc<ClassGroupDef>) -> Self {
        let klasses = def
            .variants
            .iter()
            .map(|variant| {
                let klass = NamedRecordKlass::from_definition(variant, Some(&def.name));
                (variant.name.clone(), Rc::new(klass))
            })
            .collect();
        Self {
            name: def.name.clone(),
            klasses,
            src: Rc::clone(def),
        }
    }

    pub fn variant(&self, name: &str) -> Option<Rc<NamedRecordKlass>> {
        self.klasses.get(name).cloned()
    }

    pub fn contains(&self, klass: &Rc<NamedRecordKlass>) -> bool {
        self.klasses.values().any(|member| Rc::ptr_eq(member, klass))
    }
}

impl fmt::Display for NamedRecordGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ ", self.name)?;
        for (idx, (name, klass)) in self.klasses.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}{}", klass.value_spec)?;
        }
        write!(f, " }}")
    }
}
