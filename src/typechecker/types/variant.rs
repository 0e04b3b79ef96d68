use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;

use crate::ast::VariantDeclaration;
use crate::location::Location;
use crate::typechecker::context::Context;
use crate::typechecker::error::{ArityMismatch, TypeCheckError};
use crate::typechecker::generics::check_constraint;

use super::Type;

pub type VariantRef = Rc<RefCell<VariantType>>;
pub type VariantConstructorRef = Rc<RefCell<VariantConstructorType>>;

/// A constructor parameter. `field_id` is globally interned by name, so
/// parameters sharing a name across constructors carry the same id.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorParameter {
    pub name: String,
    pub type_id: Type,
    pub field_id: usize,
}

#[derive(Clone, Debug)]
pub struct VariantConstructorType {
    pub name: String,
    pub parameters: Vec<ConstructorParameter>,
    pub parent: Weak<RefCell<VariantType>>,
    /// Assigned when the parent variant resolves; the first 16 bits of a
    /// runtime variant value carry it.
    pub tag: Option<u16>,
    pub position: Location,
}

impl VariantConstructorType {
    pub fn parent_variant(&self) -> Option<VariantRef> {
        self.parent.upgrade()
    }
}

/// An instantiated algebraic data type. Like classes, variants carry an id
/// used for cycle-safe serialization; matching remains structural over the
/// constructor list. Instances produced from a generic declaration keep a
/// backlink to their template plus the argument vector, so substitution can
/// re-instantiate through the shared cache.
#[derive(Clone, Debug)]
pub struct VariantType {
    pub id: usize,
    pub name: String,
    pub constructors: Vec<VariantConstructorRef>,
    pub template: Option<Weak<VariantTemplate>>,
    pub args: Vec<Type>,
    pub resolved: bool,
    pub position: Location,
}

impl VariantType {
    pub fn constructor(&self, name: &str) -> Option<VariantConstructorRef> {
        self.constructors
            .iter()
            .find(|c| c.borrow().name == name)
            .cloned()
    }

    /// Assign tag ids in declaration order. Idempotent.
    pub fn assign_tags(&mut self) {
        for (tag, constructor) in self.constructors.iter().enumerate() {
            let mut constructor = constructor.borrow_mut();
            if constructor.tag.is_none() {
                constructor.tag = Some(tag as u16);
            }
        }
    }
}

/// The declaration-side view of a variant: the parsed form plus the cache of
/// instantiated instances keyed by the positional type-argument vector. A
/// non-generic variant is the degenerate case instantiated with `[]`.
#[derive(Debug)]
pub struct VariantTemplate {
    pub declaration: VariantDeclaration,
    pub instances: RefCell<Vec<(Vec<Type>, VariantRef)>>,
    self_ref: Weak<VariantTemplate>,
}

impl VariantTemplate {
    pub fn new(declaration: VariantDeclaration) -> Rc<VariantTemplate> {
        Rc::new_cyclic(|self_ref| VariantTemplate {
            declaration,
            instances: RefCell::new(Vec::new()),
            self_ref: self_ref.clone(),
        })
    }

    /// Instantiate for the given argument vector, reusing the cached
    /// instance when one exists. The skeleton lands in the cache before the
    /// constructors convert, so recursive mentions of the variant inside its
    /// own constructors resolve to the same shared instance.
    pub fn instantiate(
        &self,
        ctx: &Context,
        args: &[Type],
        position: &Location,
    ) -> Result<VariantRef, TypeCheckError> {
        if args.len() != self.declaration.generics.len() {
            return Err(TypeCheckError::ArityMismatch(
                ArityMismatch {
                    name: self.declaration.name.clone(),
                    expected: self.declaration.generics.len(),
                    actual: args.len(),
                },
                position.clone(),
            ));
        }

        if let Some((_, instance)) = self
            .instances
            .borrow()
            .iter()
            .find(|(cached, _)| cached.as_slice() == args)
        {
            return Ok(Rc::clone(instance));
        }

        debug!(
            "instantiating variant {} with {args:?}",
            self.declaration.name
        );

        let variant = Rc::new(RefCell::new(VariantType {
            id: ctx.next_variant_id(),
            name: self.declaration.name.clone(),
            constructors: vec![],
            template: Some(self.self_ref.clone()),
            args: args.to_vec(),
            resolved: false,
            position: self.declaration.position.clone(),
        }));
        self.instances
            .borrow_mut()
            .push((args.to_vec(), Rc::clone(&variant)));

        let mut inner = ctx.clone();
        inner.scope.enter_scope();
        for (generic, arg) in self.declaration.generics.iter().zip(args.iter()) {
            if !arg.contains_generic() {
                if let Some(constraint) = &generic.constraint {
                    let constraint = Type::try_from((constraint.clone(), &inner))?;
                    check_constraint(&inner, &generic.name, &constraint, arg, position)?;
                }
            }
            inner
                .scope
                .shadow_type(generic.name.clone(), arg.clone());
        }

        let mut constructors = Vec::with_capacity(self.declaration.constructors.len());
        for declaration in &self.declaration.constructors {
            let mut parameters = Vec::with_capacity(declaration.parameters.len());
            for (name, type_name) in &declaration.parameters {
                parameters.push(ConstructorParameter {
                    name: name.clone(),
                    type_id: Type::try_from((type_name.clone(), &inner))?,
                    field_id: ctx.intern_field(name),
                });
            }
            constructors.push(Rc::new(RefCell::new(VariantConstructorType {
                name: declaration.name.clone(),
                parameters,
                parent: Rc::downgrade(&variant),
                tag: None,
                position: declaration.position.clone(),
            })));
        }

        {
            let mut variant = variant.borrow_mut();
            variant.constructors = constructors;
            variant.assign_tags();
            variant.resolved = true;
        }

        Ok(variant)
    }
}
