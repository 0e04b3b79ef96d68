//! Generic function monomorphization driven by call-site argument types.

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use kea_lang::ast::{
    Declaration, Expression, FunctionBody, FunctionDeclaration, GenericParameter, Id,
    Initialisation, Literal, Parameter, Postfix, Statement, TypeName,
};
use kea_lang::location::Location;
use kea_lang::typechecker::{CheckedModule, TypeChecker, TypeInformation};

fn loc() -> Location {
    Location::default()
}

fn string(value: &str) -> Expression<()> {
    Expression::Literal(Literal::Str(value.into(), (), loc()))
}

fn call(name: &str, args: Vec<Expression<()>>) -> Expression<()> {
    Expression::Postfix(Postfix::Call {
        expr: Box::new(Expression::Id(Id::new(name))),
        type_args: vec![],
        args,
        resolved: None,
        overload: None,
        info: (),
        position: loc(),
    })
}

fn identity_function() -> Declaration<()> {
    Declaration::Function(FunctionDeclaration {
        name: "id".into(),
        generics: vec![GenericParameter {
            name: "T".into(),
            constraint: None,
            position: loc(),
        }],
        parameters: vec![Parameter {
            name: "x".into(),
            type_name: TypeName::named("T"),
            mutable: false,
            position: loc(),
        }],
        return_type: Some(TypeName::named("T")),
        body: FunctionBody::Expression(Box::new(Expression::Id(Id::new("x")))),
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

#[test]
fn type_argument_is_extracted_from_the_argument() -> Result<()> {
    let module = TypeChecker::new(vec![
        identity_function(),
        main_function(vec![let_stmt("s", call("id", vec![string("hello")]))]),
    ])
    .check()?;

    let s = binding(&module, "s");
    assert_eq!(format!("{:?}", s.id.info.resolved_type()), "class String");
    Ok(())
}

#[test]
fn equal_argument_vectors_share_one_instance() -> Result<()> {
    let module = TypeChecker::new(vec![
        identity_function(),
        main_function(vec![
            let_stmt("a", call("id", vec![string("hello")])),
            let_stmt("b", call("id", vec![string("world")])),
        ]),
    ])
    .check()?;

    let instances = module
        .declarations
        .iter()
        .filter_map(|declaration| match declaration {
            Declaration::Function(function) if function.name.starts_with("id<") => {
                Some(function.name.clone())
            }
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(instances, vec!["id<class String>".to_string()]);
    Ok(())
}

#[test]
fn explicit_type_arguments_force_the_instance() -> Result<()> {
    let call_with_args = Expression::Postfix(Postfix::Call {
        expr: Box::new(Expression::Id(Id {
            name: "id".into(),
            type_args: vec![TypeName::named("bool")],
            info: (),
            position: loc(),
        })),
        type_args: vec![TypeName::named("bool")],
        args: vec![Expression::Literal(Literal::Bool(true, (), loc()))],
        resolved: None,
        overload: None,
        info: (),
        position: loc(),
    });

    let module = TypeChecker::new(vec![
        identity_function(),
        main_function(vec![let_stmt("flag", call_with_args)]),
    ])
    .check()?;

    let flag = binding(&module, "flag");
    assert_eq!(format!("{:?}", flag.id.info.resolved_type()), "bool");
    Ok(())
}

#[test]
fn uninferable_generic_is_an_error() {
    // A generic that occurs in no parameter can not be extracted.
    let weird = Declaration::Function(FunctionDeclaration {
        name: "weird".into(),
        generics: vec![GenericParameter {
            name: "T".into(),
            constraint: None,
            position: loc(),
        }],
        parameters: vec![Parameter {
            name: "x".into(),
            type_name: TypeName::named("u32"),
            mutable: false,
            position: loc(),
        }],
        return_type: Some(TypeName::named("u32")),
        body: FunctionBody::Expression(Box::new(Expression::Id(Id::new("x")))),
        info: (),
        position: loc(),
    });

    let result = TypeChecker::new(vec![
        weird,
        main_function(vec![let_stmt(
            "x",
            call(
                "weird",
                vec![Expression::Literal(Literal::Integer(1, (), loc()))],
            ),
        )]),
    ])
    .check();
    assert!(result.is_err());
}
