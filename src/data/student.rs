use crate::{
    error::{
        DuplicateEmailSnafu, GetDatabaseConnectionSnafu, InvalidStudentIdSnafu, MakeQuerySnafu,
        MissingStudentSnafu, ParseStudentIdSnafu, RegistrarError, RegistrarResult,
    },
    query::ListPlan,
};
use email_address::EmailAddress;
use serde::Serialize;
use snafu::{ensure, OptionExt, ResultExt};
use sqlx::{
    prelude::FromRow, query_builder::Separated, Encode, PgConnection, Pool, Postgres, QueryBuilder,
    Type,
};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    pub phone: Option<String>,
    // kept as text, postgres casts it to DATE on the way in
    pub date_of_birth: Option<String>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// One field of an update. `Clear` writes NULL, `Missing` leaves the stored
/// value alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Missing,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Missing => Patch::Missing,
            Self::Clear => Patch::Clear,
            Self::Set(value) => Patch::Set(f(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentPatch {
    pub first_name: Patch<String>,
    pub last_name: Patch<String>,
    pub email: Patch<EmailAddress>,
    pub phone: Patch<String>,
    pub date_of_birth: Patch<String>,
    pub course: Patch<String>,
    pub year: Patch<i32>,
    pub address: Patch<String>,
    pub notes: Patch<String>,
}

impl StudentPatch {
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_missing()
            && self.last_name.is_missing()
            && self.email.is_missing()
            && self.phone.is_missing()
            && self.date_of_birth.is_missing()
            && self.course.is_missing()
            && self.year.is_missing()
            && self.address.is_missing()
            && self.notes.is_missing()
    }
}

pub fn parse_student_id(original: &str) -> RegistrarResult<i32> {
    let id: i32 = original
        .parse()
        .context(ParseStudentIdSnafu { original })?;
    ensure!(id != 0, InvalidStudentIdSnafu { id });
    Ok(id)
}

fn classify_write_error(source: sqlx::Error, email: &str) -> RegistrarError {
    if source
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        DuplicateEmailSnafu { email }.build()
    } else {
        RegistrarError::MakeQuery { source }
    }
}

impl Student {
    pub async fn insert_into_database(
        draft: StudentDraft,
        conn: &mut PgConnection,
    ) -> RegistrarResult<i32> {
        let StudentDraft {
            first_name,
            last_name,
            email,
            phone,
            date_of_birth,
            course,
            year,
            address,
            notes,
        } = draft;

        sqlx::query_scalar::<_, i32>(
            "INSERT INTO students (first_name, last_name, email, phone, date_of_birth, course, year, address, notes) VALUES ($1, $2, $3, $4, $5::date, $6, $7, $8, $9) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email.as_str())
        .bind(phone)
        .bind(date_of_birth)
        .bind(course)
        .bind(year)
        .bind(address)
        .bind(notes)
        .fetch_one(&mut *conn)
        .await
        .map_err(|source| classify_write_error(source, email.as_str()))
    }

    pub async fn get_from_db_by_id(
        id: i32,
        conn: &mut PgConnection,
    ) -> RegistrarResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, first_name, last_name, email, phone, date_of_birth, course, year, address, notes, created_at, updated_at FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    pub async fn fetch_page(
        plan: &ListPlan,
        pool: &Pool<Postgres>,
    ) -> RegistrarResult<(Vec<Self>, i64)> {
        let mut page_conn = pool.acquire().await.context(GetDatabaseConnectionSnafu)?;
        let mut count_conn = pool.acquire().await.context(GetDatabaseConnectionSnafu)?;
        let mut page_query = plan.page_query();
        let mut count_query = plan.count_query();

        let students = async {
            page_query
                .build_query_as::<Self>()
                .fetch_all(&mut *page_conn)
                .await
                .context(MakeQuerySnafu)
        };
        let total = async {
            count_query
                .build_query_scalar::<i64>()
                .fetch_one(&mut *count_conn)
                .await
                .context(MakeQuerySnafu)
        };

        futures::try_join!(students, total)
    }

    pub async fn update(
        id: i32,
        patch: StudentPatch,
        conn: &mut PgConnection,
    ) -> RegistrarResult<i32> {
        let email_for_conflict = match &patch.email {
            Patch::Set(email) => email.to_string(),
            _ => String::new(),
        };

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE students SET ");
        {
            let mut fields = builder.separated(", ");
            push_assignment(&mut fields, "first_name", "", patch.first_name);
            push_assignment(&mut fields, "last_name", "", patch.last_name);
            push_assignment(&mut fields, "email", "", patch.email.map(|e| e.to_string()));
            push_assignment(&mut fields, "phone", "", patch.phone);
            push_assignment(&mut fields, "date_of_birth", "::date", patch.date_of_birth);
            push_assignment(&mut fields, "course", "", patch.course);
            push_assignment(&mut fields, "year", "", patch.year);
            push_assignment(&mut fields, "address", "", patch.address);
            push_assignment(&mut fields, "notes", "", patch.notes);
            fields.push("updated_at = NOW()");
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING id");

        let updated = builder
            .build_query_scalar::<i32>()
            .fetch_optional(&mut *conn)
            .await
            .map_err(|source| classify_write_error(source, &email_for_conflict))?;

        updated.context(MissingStudentSnafu { id })
    }

    pub async fn remove_from_database(id: i32, conn: &mut PgConnection) -> RegistrarResult<()> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;
        ensure!(result.rows_affected() > 0, MissingStudentSnafu { id });
        Ok(())
    }
}

fn push_assignment<'args, T>(
    fields: &mut Separated<'_, 'args, Postgres, &'static str>,
    column: &'static str,
    cast: &'static str,
    value: Patch<T>,
) where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    match value {
        Patch::Missing => {}
        Patch::Clear => {
            fields.push(column);
            fields.push_unseparated(" = NULL");
        }
        Patch::Set(value) => {
            fields.push(column);
            fields.push_unseparated(" = ");
            fields.push_bind_unseparated(value);
            fields.push_unseparated(cast);
        }
    }
}
