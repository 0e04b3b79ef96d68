//! Variant construction, match inference and nullable handling.

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use kea_lang::ast::{
    Declaration, Expression, FunctionBody, FunctionDeclaration, GenericParameter, Id,
    Initialisation, Literal, MatchCase, MatchExpression, Parameter, Pattern, Statement, TypeName,
    UnaryExpression, UnaryOperator, VariantConstructorDeclaration, VariantDeclaration,
};
use kea_lang::location::Location;
use kea_lang::typechecker::context::Context;
use kea_lang::typechecker::types::{BasicKind, Type, VariantTemplate};
use kea_lang::typechecker::TypeChecker;

fn loc() -> Location {
    Location::default()
}

fn int(value: i128) -> Expression<()> {
    Expression::Literal(Literal::Integer(value, (), loc()))
}

fn option_variant() -> VariantDeclaration {
    VariantDeclaration {
        name: "Opt".into(),
        generics: vec![GenericParameter {
            name: "T".into(),
            constraint: None,
            position: loc(),
        }],
        constructors: vec![
            VariantConstructorDeclaration {
                name: "Some".into(),
                parameters: vec![("v".into(), TypeName::named("T"))],
                position: loc(),
            },
            VariantConstructorDeclaration {
                name: "None".into(),
                parameters: vec![],
                position: loc(),
            },
        ],
        position: loc(),
    }
}

#[test]
fn match_unifies_constructor_cases() -> Result<()> {
    // fn g(o: Opt<u32>) -> u32 = match o { Some(v) => v, None => 0 }
    let g = Declaration::Function(FunctionDeclaration {
        name: "g".into(),
        generics: vec![],
        parameters: vec![Parameter {
            name: "o".into(),
            type_name: TypeName::Named {
                name: "Opt".into(),
                type_args: vec![TypeName::named("u32")],
                position: loc(),
            },
            mutable: false,
            position: loc(),
        }],
        return_type: Some(TypeName::named("u32")),
        body: FunctionBody::Expression(Box::new(Expression::Match(Box::new(MatchExpression {
            expr: Expression::Id(Id::new("o")),
            cases: vec![
                MatchCase {
                    pattern: Pattern::Constructor {
                        name: "Some".into(),
                        fields: vec![Pattern::Binding("v".into(), loc())],
                        position: loc(),
                    },
                    guard: None,
                    body: Expression::Id(Id::new("v")),
                    info: (),
                    position: loc(),
                },
                MatchCase {
                    pattern: Pattern::Constructor {
                        name: "None".into(),
                        fields: vec![],
                        position: loc(),
                    },
                    guard: None,
                    body: int(0),
                    info: (),
                    position: loc(),
                },
            ],
            info: (),
            position: loc(),
        })))),
        info: (),
        position: loc(),
    });

    let module = TypeChecker::new(vec![Declaration::Variant(option_variant()), g]).check()?;

    let g = module
        .declarations
        .iter()
        .find_map(|d| match d {
            Declaration::Function(f) if f.name == "g" => Some(f.clone()),
            _ => None,
        })
        .expect("g is in the output");
    let FunctionBody::Expression(body) = &g.body else {
        panic!("g has an expression body");
    };
    assert_eq!(
        body.get_info().type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::U32))
    );
    Ok(())
}

#[test]
fn constructor_tags_are_assigned_in_declaration_order() -> Result<()> {
    let ctx = Context::default();
    let template = VariantTemplate::new(option_variant());
    let instance = template.instantiate(&ctx, &[Type::Basic(BasicKind::U32)], &loc())?;

    let instance = instance.borrow();
    assert_eq!(instance.constructors[0].borrow().tag, Some(0));
    assert_eq!(instance.constructors[1].borrow().tag, Some(1));
    assert_eq!(
        instance.constructors[0].borrow().parameters[0].type_id,
        Type::Basic(BasicKind::U32)
    );
    Ok(())
}

#[test]
fn equal_type_arguments_reuse_the_instance() -> Result<()> {
    let ctx = Context::default();
    let template = VariantTemplate::new(option_variant());
    let first = template.instantiate(&ctx, &[Type::Boolean], &loc())?;
    let second = template.instantiate(&ctx, &[Type::Boolean], &loc())?;
    let third = template.instantiate(&ctx, &[Type::Basic(BasicKind::U8)], &loc())?;

    assert_eq!(first.borrow().id, second.borrow().id);
    assert_ne!(first.borrow().id, third.borrow().id);
    Ok(())
}

#[test]
fn shared_field_names_intern_to_one_id() -> Result<()> {
    let ctx = Context::default();
    let declaration = VariantDeclaration {
        name: "Pair".into(),
        generics: vec![],
        constructors: vec![
            VariantConstructorDeclaration {
                name: "A".into(),
                parameters: vec![("value".into(), TypeName::named("u32"))],
                position: loc(),
            },
            VariantConstructorDeclaration {
                name: "B".into(),
                parameters: vec![("value".into(), TypeName::named("bool"))],
                position: loc(),
            },
        ],
        position: loc(),
    };
    let template = VariantTemplate::new(declaration);
    let instance = template.instantiate(&ctx, &[], &loc())?;

    let instance = instance.borrow();
    let a_field = instance.constructors[0].borrow().parameters[0].field_id;
    let b_field = instance.constructors[1].borrow().parameters[0].field_id;
    assert_eq!(a_field, b_field);
    Ok(())
}

fn main_function(statements: Vec<Statement<()>>) -> Declaration<()> {
    Declaration::Function(FunctionDeclaration {
        name: "main".into(),
        generics: vec![],
        parameters: vec![],
        return_type: None,
        body: FunctionBody::Block(statements),
        info: (),
        position: loc(),
    })
}

#[test]
fn denull_unwraps_a_nullable_binding() -> Result<()> {
    let module = TypeChecker::new(vec![main_function(vec![
        Statement::Initialisation(Initialisation {
            id: Id::new("p"),
            mutable: false,
            type_name: Some(TypeName::Nullable(
                Box::new(TypeName::named("u32")),
                loc(),
            )),
            value: Expression::Literal(Literal::Null((), loc())),
            info: (),
            position: loc(),
        }),
        Statement::Initialisation(Initialisation {
            id: Id::new("q"),
            mutable: false,
            type_name: None,
            value: Expression::Unary(Box::new(UnaryExpression {
                operator: UnaryOperator::Denull,
                expr: Expression::Id(Id::new("p")),
                overload: None,
                info: (),
                position: loc(),
            })),
            info: (),
            position: loc(),
        }),
    ])])
    .check()?;

    let q = module
        .declarations
        .iter()
        .find_map(|d| match d {
            Declaration::Function(f) if f.name == "main" => match &f.body {
                FunctionBody::Block(statements) => match &statements[1] {
                    Statement::Initialisation(initialisation) => Some(initialisation.clone()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .expect("q binding");
    assert_eq!(
        q.id.info.type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::U32))
    );
    Ok(())
}

#[test]
fn nullable_does_not_narrow_without_denull() {
    let result = TypeChecker::new(vec![main_function(vec![
        Statement::Initialisation(Initialisation {
            id: Id::new("p"),
            mutable: false,
            type_name: Some(TypeName::Nullable(
                Box::new(TypeName::named("u32")),
                loc(),
            )),
            value: Expression::Literal(Literal::Null((), loc())),
            info: (),
            position: loc(),
        }),
        Statement::Initialisation(Initialisation {
            id: Id::new("q"),
            mutable: false,
            type_name: Some(TypeName::named("u32")),
            value: Expression::Id(Id::new("p")),
            info: (),
            position: loc(),
        }),
    ])])
    .check();
    assert!(result.is_err());
}

#[test]
fn nested_nullable_annotation_is_rejected() {
    let result = TypeChecker::new(vec![main_function(vec![Statement::Initialisation(
        Initialisation {
            id: Id::new("p"),
            mutable: false,
            type_name: Some(TypeName::Nullable(
                Box::new(TypeName::Nullable(Box::new(TypeName::named("u32")), loc())),
                loc(),
            )),
            value: Expression::Literal(Literal::Null((), loc())),
            info: (),
            position: loc(),
        },
    )])])
    .check();
    assert!(result.is_err());
}
