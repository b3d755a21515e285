use crate::error::{InitialiseSchemaSnafu, MakeQuerySnafu, RegistrarResult};
use snafu::ResultExt;
use sqlx::{Pool, Postgres, QueryBuilder};

const CREATE_STUDENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS students (
    id INT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    phone VARCHAR(50),
    date_of_birth DATE,
    course VARCHAR(150),
    year INT,
    address VARCHAR(255),
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_students_name ON students (last_name, first_name)",
    "CREATE INDEX IF NOT EXISTS idx_students_email ON students (email)",
    "CREATE INDEX IF NOT EXISTS idx_students_course_year ON students (course, year)",
];

type SeedRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i32,
    &'static str,
    &'static str,
);

pub const SAMPLE_STUDENTS: [SeedRow; 10] = [
    ("Alice", "Johnson", "alice.johnson@example.com", "555-0101", "2002-03-15", "Computer Science", 2, "123 Maple St", "Enjoys algorithms."),
    ("Bob", "Smith", "bob.smith@example.com", "555-0102", "2001-07-21", "Mathematics", 3, "456 Oak Ave", "Math club lead."),
    ("Carol", "Nguyen", "carol.nguyen@example.com", "555-0103", "2003-01-09", "Physics", 1, "789 Pine Rd", "Lab assistant."),
    ("David", "Lopez", "david.lopez@example.com", "555-0104", "2000-12-30", "Chemistry", 4, "321 Birch Blvd", "Research intern."),
    ("Eve", "Khan", "eve.khan@example.com", "555-0105", "2002-11-02", "Computer Science", 2, "654 Cedar Ln", "AI study group."),
    ("Frank", "O'Brien", "frank.obrien@example.com", "555-0106", "2001-05-18", "Economics", 3, "987 Spruce Dr", "TA for microeconomics."),
    ("Grace", "Kim", "grace.kim@example.com", "555-0107", "2003-08-24", "Biology", 1, "159 Walnut St", "Pre-med track."),
    ("Hank", "Patel", "hank.patel@example.com", "555-0108", "2002-04-06", "Statistics", 2, "753 Chestnut Ave", "Data viz enthusiast."),
    ("Ivy", "Garcia", "ivy.garcia@example.com", "555-0109", "2000-09-12", "Philosophy", 4, "258 Elm Ct", "Debate team captain."),
    ("Jake", "Chen", "jake.chen@example.com", "555-0110", "2001-02-28", "History", 3, "852 Willow Way", "Archival volunteer."),
];

pub async fn run(pool: &Pool<Postgres>) -> RegistrarResult<()> {
    ensure_schema(pool).await?;
    seed_if_empty(pool).await
}

async fn ensure_schema(pool: &Pool<Postgres>) -> RegistrarResult<()> {
    sqlx::query(CREATE_STUDENTS_TABLE)
        .execute(pool)
        .await
        .context(InitialiseSchemaSnafu)?;
    for ddl in CREATE_INDEXES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .context(InitialiseSchemaSnafu)?;
    }
    Ok(())
}

async fn seed_if_empty(pool: &Pool<Postgres>) -> RegistrarResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await
        .context(MakeQuerySnafu)?;
    if count > 0 {
        return Ok(());
    }

    info!("Seeding sample students");

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO students (first_name, last_name, email, phone, date_of_birth, course, year, address, notes) ",
    );
    builder.push_values(
        SAMPLE_STUDENTS,
        |mut row, (first_name, last_name, email, phone, date_of_birth, course, year, address, notes)| {
            row.push_bind(first_name)
                .push_bind(last_name)
                .push_bind(email)
                .push_bind(phone)
                .push_bind(date_of_birth)
                .push_unseparated("::date")
                .push_bind(course)
                .push_bind(year)
                .push_bind(address)
                .push_bind(notes);
        },
    );
    builder
        .build()
        .execute(pool)
        .await
        .context(MakeQuerySnafu)?;

    Ok(())
}
