use chrono::NaiveDate;
use rowbind::*;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

#[derive(Debug, Default, PartialEq, Record)]
struct Person {
    id: i64,
    name: Option<String>,
    #[rowbind(column = "amt")]
    amount: f64,
    verified: bool,
    photo: Option<Vec<u8>>,
    born: Option<chrono::NaiveDateTime>,
}

async fn seeded_pool() -> SqlitePool {
    // One connection, so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE person (
            id INTEGER PRIMARY KEY,
            name TEXT,
            amt REAL,
            verified BOOLEAN,
            photo BLOB,
            born DATETIME
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO person (id, name, amt, verified, photo, born) VALUES
            (1, 'Alice', 12.5, 1, x'0102', '1990-05-17 08:00:00'),
            (2, NULL, NULL, NULL, NULL, NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool
}

#[tokio::test]
async fn test_sqlite_rows_map_onto_records() {
    let pool = seeded_pool().await;
    let mut cursor = SqliteCursor::fetch(&pool, "SELECT * FROM person ORDER BY id")
        .await
        .unwrap();

    let mapper = RowMapper::new(Arc::new(MappingCache::new()));
    let people: Vec<Person> = mapper.map_all(Some(&mut cursor)).unwrap().unwrap();

    let born = NaiveDate::from_ymd_opt(1990, 5, 17)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    assert_eq!(
        people,
        vec![
            Person {
                id: 1,
                name: Some("Alice".to_string()),
                amount: 12.5,
                verified: true,
                photo: Some(vec![1, 2]),
                born: Some(born),
            },
            Person {
                id: 2,
                name: None,
                amount: 0.0,
                verified: false,
                photo: None,
                born: None,
            },
        ]
    );
}

#[tokio::test]
async fn test_sqlite_empty_result_is_none() {
    let pool = seeded_pool().await;
    let mut cursor = SqliteCursor::fetch(&pool, "SELECT * FROM person WHERE id > 100")
        .await
        .unwrap();
    assert!(!cursor.has_rows());
    assert_eq!(cursor.field_count(), 0);

    let people: Option<Vec<Person>> = cursor.to_list().unwrap();
    assert!(people.is_none());
}

#[tokio::test]
async fn test_sqlite_aliased_columns_match_case_insensitively() {
    let pool = seeded_pool().await;
    let mut cursor = SqliteCursor::fetch(
        &pool,
        "SELECT id AS ID, name AS Name FROM person WHERE id = 1",
    )
    .await
    .unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.column_name(0).unwrap(), "ID");

    let person: Person = cursor.to().unwrap().unwrap();
    assert_eq!(person.id, 1);
    assert_eq!(person.name.as_deref(), Some("Alice"));
    assert_eq!(person.amount, 0.0);
}

#[tokio::test]
async fn test_sqlite_text_into_integer_field_fails() {
    let pool = seeded_pool().await;
    let mut cursor = SqliteCursor::fetch(&pool, "SELECT name AS id FROM person WHERE id = 1")
        .await
        .unwrap();
    let err = cursor.to_list::<Person>().unwrap_err();
    assert!(matches!(
        err,
        MapError::TypeMismatch {
            field: "id",
            expected: "i64",
            found: "text",
            ..
        }
    ));
}

#[tokio::test]
async fn test_sqlite_bad_sql_is_a_database_error() {
    let pool = seeded_pool().await;
    let result = SqliteCursor::fetch(&pool, "SELECT * FROM missing_table").await;
    assert!(matches!(result, Err(MapError::Database(_))));
}

#[derive(Debug, Default, PartialEq, Record)]
struct Loose {
    id: i64,
    flag: String,
    stamp: Option<String>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Flag {
    flag: bool,
}

async fn loose_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("CREATE TABLE loose (id INTEGER PRIMARY KEY, flag BOOLEAN, stamp DATETIME)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO loose (id, flag, stamp) VALUES (1, 'yes', 'someday')")
        .execute(&pool)
        .await
        .unwrap();
    pool
}

#[tokio::test]
async fn test_sqlite_datetime_column_holding_text_maps_as_text() {
    let pool = loose_pool().await;
    let mut cursor = SqliteCursor::fetch(&pool, "SELECT id, stamp FROM loose")
        .await
        .unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.value(1).unwrap(), Value::Text("someday".to_string()));

    let row: Loose = cursor.to().unwrap().unwrap();
    assert_eq!(row.stamp.as_deref(), Some("someday"));
}

#[tokio::test]
async fn test_sqlite_boolean_column_holding_text_maps_as_text() {
    let pool = loose_pool().await;
    let mut cursor = SqliteCursor::fetch(&pool, "SELECT * FROM loose")
        .await
        .unwrap();
    let rows: Vec<Loose> = cursor.to_list().unwrap().unwrap();
    assert_eq!(rows[0].flag, "yes");
}

#[tokio::test]
async fn test_sqlite_boolean_column_holding_text_into_bool_is_a_mismatch() {
    let pool = loose_pool().await;
    let mut cursor = SqliteCursor::fetch(&pool, "SELECT flag FROM loose")
        .await
        .unwrap();
    let err = cursor.to_list::<Flag>().unwrap_err();
    assert!(matches!(
        err,
        MapError::TypeMismatch {
            field: "flag",
            expected: "bool",
            found: "text",
            ..
        }
    ));
}
