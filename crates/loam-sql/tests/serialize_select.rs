use loam_core::stmt::Value;
use loam_sql::stmt::{Expr, Join, OrderByColumn, Select, TableWithJoins};
use loam_sql::{Serializer, Statement};

#[test]
fn select_with_filter_and_params() {
    let mut select = Select::new(TableWithJoins::aliased("ROAD", "a0"));
    select.columns = vec![
        Expr::column(Some("a0"), "ID"),
        Expr::column(Some("a0"), "NAME"),
    ];
    select.filter = Some(Expr::eq(
        Expr::column(Some("a0"), "NAME"),
        Expr::value("Main Street"),
    ));

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::sqlite().serialize(&Statement::Select(select), &mut params);

    assert_eq!(
        sql,
        r#"SELECT "a0"."ID", "a0"."NAME" FROM "ROAD" AS "a0" WHERE "a0"."NAME" = ?1;"#
    );
    assert_eq!(params, vec![Value::from("Main Street")]);
}

#[test]
fn select_with_left_outer_join() {
    let mut from = TableWithJoins::aliased("ROAD", "a0");
    from.joins.push(Join {
        table: "ROAD_OWNER".to_string(),
        alias: "a1".to_string(),
        on: Expr::eq(
            Expr::column(Some("a1"), "ROAD_ID"),
            Expr::column(Some("a0"), "ID"),
        ),
    });

    let mut select = Select::new(from);
    select.columns = vec![Expr::column(Some("a1"), "PERSON_ID")];

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::sqlite().serialize(&Statement::Select(select), &mut params);

    assert_eq!(
        sql,
        r#"SELECT "a1"."PERSON_ID" FROM "ROAD" AS "a0" LEFT OUTER JOIN "ROAD_OWNER" AS "a1" ON "a1"."ROAD_ID" = "a0"."ID";"#
    );
    assert!(params.is_empty());
}

#[test]
fn select_with_order_limit_offset() {
    let mut select = Select::new(TableWithJoins::aliased("ROAD", "a0"));
    select.columns = vec![Expr::column(Some("a0"), "ID")];
    select.order_by = vec![OrderByColumn {
        expr: Expr::column(Some("a0"), "NAME"),
        desc: true,
    }];
    select.limit = Some(10);
    select.offset = Some(20);

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::sqlite().serialize(&Statement::Select(select), &mut params);

    assert_eq!(
        sql,
        r#"SELECT "a0"."ID" FROM "ROAD" AS "a0" ORDER BY "a0"."NAME" DESC LIMIT 10 OFFSET 20;"#
    );
}

#[test]
fn or_groups_are_parenthesized() {
    let mut select = Select::new(TableWithJoins::aliased("ROAD", "a0"));
    select.columns = vec![Expr::column(Some("a0"), "ID")];
    select.filter = Some(Expr::And(vec![
        Expr::Or(vec![
            Expr::eq(Expr::column(Some("a0"), "NAME"), Expr::value("a")),
            Expr::eq(Expr::column(Some("a0"), "NAME"), Expr::value("b")),
        ]),
        Expr::IsNull {
            expr: Box::new(Expr::column(Some("a0"), "OWNER")),
            negate: false,
        },
    ]));

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::sqlite().serialize(&Statement::Select(select), &mut params);

    assert_eq!(
        sql,
        r#"SELECT "a0"."ID" FROM "ROAD" AS "a0" WHERE ("a0"."NAME" = ?1 OR "a0"."NAME" = ?2) AND "a0"."OWNER" IS NULL;"#
    );
}

#[test]
fn postgresql_placeholders() {
    let mut select = Select::new(TableWithJoins::aliased("ROAD", "a0"));
    select.columns = vec![Expr::column(Some("a0"), "ID")];
    select.filter = Some(Expr::And(vec![
        Expr::eq(Expr::column(Some("a0"), "NAME"), Expr::value("x")),
        Expr::eq(Expr::column(Some("a0"), "LANES"), Expr::value(4)),
    ]));

    let mut params: Vec<Value> = vec![];
    let sql = Serializer::postgresql().serialize(&Statement::Select(select), &mut params);

    assert!(sql.contains("$1"), "sql: {sql}");
    assert!(sql.contains("$2"), "sql: {sql}");
    assert_eq!(params.len(), 2);
}
