//! Whole-module checks for class resolution, overload selection and
//! operator overloading.

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use kea_lang::ast::{
    BinaryExpression, BinaryOperator, ClassDeclaration, Declaration, Expression, FunctionBody,
    FunctionDeclaration, Id, Initialisation, Literal, MethodDeclaration, New, Parameter, Postfix,
    ReturnStatement, Statement, TypeName,
};
use kea_lang::location::Location;
use kea_lang::typechecker::types::{BasicKind, Type};
use kea_lang::typechecker::warning::TypeCheckWarning;
use kea_lang::typechecker::{CheckedModule, TypeChecker, TypeInformation};

fn loc() -> Location {
    Location::default()
}

fn int(value: i128) -> Expression<()> {
    Expression::Literal(Literal::Integer(value, (), loc()))
}

fn float(value: f64) -> Expression<()> {
    Expression::Literal(Literal::Float(value, (), loc()))
}

fn var(name: &str) -> Expression<()> {
    Expression::Id(Id::new(name))
}

fn param(name: &str, type_name: &str) -> Parameter {
    Parameter {
        name: name.into(),
        type_name: TypeName::named(type_name),
        mutable: false,
        position: loc(),
    }
}

fn returning(value: Expression<()>) -> FunctionBody<()> {
    FunctionBody::Block(vec![Statement::Return(ReturnStatement {
        value: Some(value),
        info: (),
        position: loc(),
    })])
}

fn method(
    name: &str,
    parameters: Vec<Parameter>,
    return_type: &str,
    body: FunctionBody<()>,
) -> MethodDeclaration<()> {
    MethodDeclaration {
        name: name.into(),
        generics: vec![],
        parameters,
        return_type: Some(TypeName::named(return_type)),
        body,
        is_static: false,
        is_override: false,
        position: loc(),
    }
}

fn class(name: &str, methods: Vec<MethodDeclaration<()>>) -> Declaration<()> {
    Declaration::Class(ClassDeclaration {
        name: name.into(),
        super_interfaces: vec![],
        attributes: vec![],
        methods,
        impls: vec![],
        static_block: None,
        info: (),
        position: loc(),
    })
}

fn let_stmt(name: &str, value: Expression<()>) -> Statement<()> {
    Statement::Initialisation(Initialisation {
        id: Id::new(name),
        mutable: false,
        type_name: None,
        value,
        info: (),
        position: loc(),
    })
}

fn new_instance(class_name: &str) -> Expression<()> {
    Expression::New(New {
        class: TypeName::named(class_name),
        args: vec![],
        resolved: None,
        info: (),
        position: loc(),
    })
}

fn method_call(object: Expression<()>, name: &str, args: Vec<Expression<()>>) -> Expression<()> {
    Expression::Postfix(Postfix::Call {
        expr: Box::new(Expression::Postfix(Postfix::MemberAccess {
            expr: Box::new(object),
            member: Id::new(name),
            nullable: false,
            info: (),
            position: loc(),
        })),
        type_args: vec![],
        args,
        resolved: None,
        overload: None,
        info: (),
        position: loc(),
    })
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

fn binding(module: &CheckedModule, name: &str) -> Initialisation<TypeInformation> {
    module
        .declarations
        .iter()
        .find_map(|declaration| match declaration {
            Declaration::Function(function) if function.name == "main" => match &function.body {
                FunctionBody::Block(statements) => statements.iter().find_map(|statement| {
                    match statement {
                        Statement::Initialisation(initialisation)
                            if initialisation.id.name == name =>
                        {
                            Some(initialisation.clone())
                        }
                        _ => None,
                    }
                }),
                FunctionBody::Expression(_) => None,
            },
            _ => None,
        })
        .unwrap_or_else(|| panic!("binding '{name}' exists"))
}

fn overloaded_class() -> Declaration<()> {
    class(
        "C",
        vec![
            method("f", vec![param("a", "u32")], "u32", returning(var("a"))),
            method("f", vec![param("a", "f32")], "f32", returning(var("a"))),
        ],
    )
}

#[test]
fn overload_selection_by_argument_type() -> Result<()> {
    let module = TypeChecker::new(vec![
        overloaded_class(),
        main_function(vec![
            let_stmt("c", new_instance("C")),
            let_stmt("y", method_call(var("c"), "f", vec![float(1.0)])),
            let_stmt("z", method_call(var("c"), "f", vec![int(1)])),
        ]),
    ])
    .check()?;

    let y = binding(&module, "y");
    assert_eq!(
        y.id.info.type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::F32))
    );

    // An integer literal with no hint picks the integer overload.
    let z = binding(&module, "z");
    assert_eq!(
        z.id.info.type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::U32))
    );

    // The call site carries its resolved callee.
    let Statement::Initialisation(initialisation) = &module
        .declarations
        .iter()
        .find_map(|d| match d {
            Declaration::Function(f) if f.name == "main" => match &f.body {
                FunctionBody::Block(statements) => Some(statements[1].clone()),
                _ => None,
            },
            _ => None,
        })
        .expect("main body")
    else {
        panic!("expected the y binding");
    };
    let Expression::Postfix(Postfix::Call { resolved, .. }) = &initialisation.value else {
        panic!("expected a call");
    };
    assert!(resolved.is_some());
    Ok(())
}

#[test]
fn class_identity_is_assigned_and_methods_enumerated() -> Result<()> {
    let module = TypeChecker::new(vec![
        overloaded_class(),
        class("D", vec![]),
        main_function(vec![]),
    ])
    .check()?;

    let mut ids = vec![];
    for declaration in &module.declarations {
        if let Declaration::Class(class) = declaration {
            let Some(Type::Class(class_ref)) = class.info.type_id.borrow().clone() else {
                panic!("class declaration carries its class type");
            };
            let class_ref = class_ref.borrow();
            ids.push(class_ref.id);
            for (index, method) in class_ref.all_methods.iter().enumerate() {
                assert_eq!(method.borrow().index_in_class, Some(index));
            }
        }
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 2, "class ids are unique");
    Ok(())
}

#[test]
fn operator_overload_dispatches_to_add_slot() -> Result<()> {
    let v_class = class(
        "V",
        vec![method(
            "__add__",
            vec![param("o", "V")],
            "V",
            returning(var("o")),
        )],
    );
    let module = TypeChecker::new(vec![
        v_class,
        main_function(vec![
            let_stmt("a", new_instance("V")),
            let_stmt("b", new_instance("V")),
            let_stmt(
                "c",
                Expression::Binary(Box::new(BinaryExpression {
                    left: var("a"),
                    right: var("b"),
                    operator: BinaryOperator::Add,
                    overload: None,
                    info: (),
                    position: loc(),
                })),
            ),
        ]),
    ])
    .check()?;

    let c = binding(&module, "c");
    assert_eq!(format!("{:?}", c.id.info.resolved_type()), "class V");

    let Expression::Binary(binary) = &c.value else {
        panic!("expected a binary expression");
    };
    assert!(binary.overload.is_some(), "the overload is recorded");
    Ok(())
}

#[test]
fn duplicate_methods_are_rejected() {
    let result = TypeChecker::new(vec![
        class(
            "C",
            vec![
                method("f", vec![param("a", "u32")], "u32", returning(var("a"))),
                method(
                    "f",
                    vec![param("b", "u32")],
                    "bool",
                    returning(Expression::Literal(Literal::Bool(true, (), loc()))),
                ),
            ],
        ),
        main_function(vec![]),
    ])
    .check();
    assert!(result.is_err(), "same name and parameters, despite the return type");
}

#[test]
fn stateful_class_without_init_warns() -> Result<()> {
    let module = TypeChecker::new(vec![
        Declaration::Class(ClassDeclaration {
            name: "W".into(),
            super_interfaces: vec![],
            attributes: vec![kea_lang::ast::AttributeDeclaration {
                name: "x".into(),
                type_name: TypeName::named("u32"),
                is_static: false,
                position: loc(),
            }],
            methods: vec![],
            impls: vec![],
            static_block: None,
            info: (),
            position: loc(),
        }),
        main_function(vec![]),
    ])
    .check()?;

    assert!(module
        .warnings
        .iter()
        .any(|w| matches!(w, TypeCheckWarning::MissingInitMethod { class_name, .. } if class_name == "W")));
    Ok(())
}

#[test]
fn comparison_overload_must_return_bool() {
    let result = TypeChecker::new(vec![
        class(
            "V",
            vec![method("__lt__", vec![param("o", "V")], "V", returning(var("o")))],
        ),
        main_function(vec![]),
    ])
    .check();
    assert!(result.is_err());
}
