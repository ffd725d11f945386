use loam_core::stmt::Value;
use loam_sql::stmt::{Delete, Expr, Insert};
use loam_sql::{Serializer, Statement};

#[test]
fn insert_binds_values_in_column_order() {
    let mut insert = Insert::new("ROAD");
    insert.push("ID", Expr::value(42i64));
    insert.push("NAME", Expr::value("Main Street"));

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::sqlite().serialize(&Statement::Insert(insert), &mut params);

    assert_eq!(
        sql,
        r#"INSERT INTO "ROAD" ("ID", "NAME") VALUES (?1, ?2);"#
    );
    assert_eq!(params, vec![Value::I64(42), Value::from("Main Street")]);
}

#[test]
fn delete_with_filter() {
    let mut delete = Delete::new("ROAD");
    delete.filter = Some(Expr::eq(
        Expr::column(None, "NAME"),
        Expr::value("Main Street"),
    ));

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::sqlite().serialize(&Statement::Delete(delete), &mut params);

    assert_eq!(sql, r#"DELETE FROM "ROAD" WHERE "NAME" = ?1;"#);
    assert_eq!(params, vec![Value::from("Main Street")]);
}

#[test]
fn like_with_escape_clause() {
    let mut delete = Delete::new("ROAD");
    delete.filter = Some(Expr::Like {
        expr: Box::new(Expr::column(None, "NAME")),
        pattern: "100\\%%".to_string(),
    });

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::sqlite().serialize(&Statement::Delete(delete), &mut params);

    assert_eq!(
        sql,
        r#"DELETE FROM "ROAD" WHERE "NAME" LIKE ?1 ESCAPE '\';"#
    );
    assert_eq!(params, vec![Value::from("100\\%%")]);
}
