//! Reflected types shared by unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

crate::marker!(pub Id);
crate::marker!(pub Qualifier);
crate::marker!(pub Spy);
crate::marker!(pub Unused);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub name: Option<String>,
    pub age: Option<i32>,
}

impl User {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            name: Some(name.to_string()),
            age: Some(age),
        }
    }
}

crate::reflect! {
    User {
        #[mark(Qualifier)] name: Option<String>,
        #[mark(Qualifier)] age: Option<i32>,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub born: Option<NaiveDate>,
    pub token: Option<Uuid>,
}

crate::reflect! {
    Person {
        id: i64,
        #[mark(Qualifier)] name: String,
        #[mark(Spy)] age: i32,
        born: Option<NaiveDate>,
        token: Option<Uuid>,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub id: i64,
    pub created_at: Option<NaiveDateTime>,
}

crate::reflect! {
    Entity {
        #[mark(Id)] id: i64,
        created_at: Option<NaiveDateTime>,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub base: Entity,
    pub login: Option<String>,
    pub balance: f64,
}

crate::reflect! {
    Account extends base: Entity {
        #[mark(Id, Qualifier)] login: Option<String>,
        balance: f64,
    }
}

/// Redeclares `id` as text, shadowing the parent's integer field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ticket {
    pub base: Entity,
    pub id: String,
}

crate::reflect! {
    Ticket extends base: Entity {
        #[mark(Id)] id: String,
    }
}
