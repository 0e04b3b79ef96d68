//! Whole-module checks for numeric promotion and literal settling.

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use kea_lang::ast::{
    BinaryExpression, BinaryOperator, Declaration, Expression, FunctionBody,
    FunctionDeclaration, Id, Initialisation, Literal, Statement, TypeName,
};
use kea_lang::location::Location;
use kea_lang::typechecker::types::{BasicKind, Type};
use kea_lang::typechecker::{CheckedModule, TypeChecker, TypeInformation};

fn loc() -> Location {
    Location::default()
}

fn int(value: i128) -> Expression<()> {
    Expression::Literal(Literal::Integer(value, (), loc()))
}

fn binary(left: Expression<()>, operator: BinaryOperator, right: Expression<()>) -> Expression<()> {
    Expression::Binary(Box::new(BinaryExpression {
        left,
        right,
        operator,
        overload: None,
        info: (),
        position: loc(),
    }))
}

fn let_stmt(name: &str, type_name: Option<TypeName>, value: Expression<()>) -> Statement<()> {
    Statement::Initialisation(Initialisation {
        id: Id::new(name),
        mutable: false,
        type_name,
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

fn main_statements(module: &CheckedModule) -> &[Statement<TypeInformation>] {
    module
        .declarations
        .iter()
        .find_map(|declaration| match declaration {
            Declaration::Function(function) if function.name == "main" => {
                match &function.body {
                    FunctionBody::Block(statements) => Some(statements.as_slice()),
                    FunctionBody::Expression(_) => None,
                }
            }
            _ => None,
        })
        .expect("module has a main function")
}

fn binding(module: &CheckedModule, name: &str) -> Initialisation<TypeInformation> {
    main_statements(module)
        .iter()
        .find_map(|statement| match statement {
            Statement::Initialisation(initialisation) if initialisation.id.name == name => {
                Some(initialisation.clone())
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("binding '{name}' exists"))
}

#[test]
fn promoted_addition_settles_both_literals() -> Result<()> {
    let module = TypeChecker::new(vec![main_function(vec![let_stmt(
        "x",
        Some(TypeName::named("u16")),
        binary(int(255), BinaryOperator::Add, int(300)),
    )])])
    .check()?;

    let x = binding(&module, "x");
    assert_eq!(
        x.id.info.type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::U16))
    );
    assert_eq!(
        x.value.get_info().type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::U16))
    );
    Ok(())
}

#[test]
fn literal_out_of_range_is_rejected() {
    let result = TypeChecker::new(vec![main_function(vec![let_stmt(
        "x",
        Some(TypeName::named("u8")),
        int(256),
    )])])
    .check();
    assert!(result.is_err());
}

#[test]
fn unannotated_binding_settles_to_storage_kind() -> Result<()> {
    let module = TypeChecker::new(vec![main_function(vec![let_stmt(
        "x",
        None,
        binary(int(1), BinaryOperator::Add, int(2)),
    )])])
    .check()?;

    let x = binding(&module, "x");
    assert_eq!(
        x.id.info.type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::I32))
    );
    Ok(())
}

#[test]
fn comparison_does_not_adopt_the_outer_hint() {
    // `let b: u16 = 1 < 2` must fail: the comparison yields bool.
    let result = TypeChecker::new(vec![main_function(vec![let_stmt(
        "b",
        Some(TypeName::named("u16")),
        binary(int(1), BinaryOperator::LessThan, int(2)),
    )])])
    .check();
    assert!(result.is_err());

    let module = TypeChecker::new(vec![main_function(vec![let_stmt(
        "b",
        Some(TypeName::named("bool")),
        binary(int(1), BinaryOperator::LessThan, int(2)),
    )])])
    .check()
    .expect("bool annotation fits");
    let b = binding(&module, "b");
    assert_eq!(b.id.info.type_id.borrow().clone(), Some(Type::Boolean));
}

#[test]
fn mixed_signedness_follows_the_promotion_table() -> Result<()> {
    // u8 + i8 promotes to i16.
    let module = TypeChecker::new(vec![main_function(vec![
        Statement::Initialisation(Initialisation {
            id: Id::new("a"),
            mutable: false,
            type_name: Some(TypeName::named("u8")),
            value: int(7),
            info: (),
            position: loc(),
        }),
        Statement::Initialisation(Initialisation {
            id: Id::new("b"),
            mutable: false,
            type_name: Some(TypeName::named("i8")),
            value: int(-3),
            info: (),
            position: loc(),
        }),
        let_stmt(
            "c",
            Some(TypeName::named("i16")),
            binary(
                Expression::Id(Id::new("a")),
                BinaryOperator::Add,
                Expression::Id(Id::new("b")),
            ),
        ),
    ])])
    .check()?;

    let c = binding(&module, "c");
    assert_eq!(
        c.id.info.type_id.borrow().clone(),
        Some(Type::Basic(BasicKind::I16))
    );
    Ok(())
}
