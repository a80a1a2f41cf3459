use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::{lock_by_slug, push_assign, push_eq, push_page, push_search};
use crate::{
    codec,
    models::{
        Certification, CreateMemberRequest, Created, Education, EducationInput, ExperienceInput,
        ExperienceRow, Member, MemberDetail, MemberSpecialist, Skill, Social, SocialInput,
        SpecialistName, UpdateMemberRequest,
    },
    pagination::Pagination,
    repository::{MemberFilter, RepoResult, RepositoryError, blank_to_null, distinct_names},
};

const MEMBER_COLUMNS: &str = "id, slug, name, title, position, faculty, program, email, \
                              avatar_url, bio, created_at, updated_at";

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &MemberFilter) {
    push_search(builder, &["name", "email"], filter.q.as_deref());
    push_eq(builder, "position", filter.position.clone());
    push_eq(builder, "faculty", filter.faculty.clone());
    push_eq(builder, "program", filter.program.clone());
}

pub(super) async fn list(
    pool: &PgPool,
    filter: &MemberFilter,
    page: Pagination,
) -> RepoResult<(Vec<Member>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM members WHERE TRUE");
    push_filter(&mut count, filter);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut rows = QueryBuilder::new(format!("SELECT {MEMBER_COLUMNS} FROM members WHERE TRUE"));
    push_filter(&mut rows, filter);
    rows.push(" ORDER BY id DESC");
    push_page(&mut rows, page);
    let members = rows.build_query_as::<Member>().fetch_all(pool).await?;

    Ok((members, total))
}

/// Parent row followed by one query per child collection.
pub(super) async fn detail(pool: &PgPool, slug: &str) -> RepoResult<Option<MemberDetail>> {
    let member = sqlx::query_as::<_, Member>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM members WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    let Some(member) = member else {
        return Ok(None);
    };

    let member_specialists = sqlx::query_as::<_, SpecialistName>(
        "SELECT s.name FROM member_specialists ms \
         JOIN specialists s ON s.id = ms.spec_id \
         WHERE ms.member_id = $1 ORDER BY s.name",
    )
    .bind(member.id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|spec| MemberSpecialist { spec })
    .collect();

    let skills = sqlx::query_as::<_, Skill>(
        "SELECT skill_name FROM skills WHERE member_id = $1 ORDER BY id",
    )
    .bind(member.id)
    .fetch_all(pool)
    .await?;

    let experiences = sqlx::query_as::<_, ExperienceRow>(
        "SELECT id, role, org, period, bullets FROM experiences WHERE member_id = $1 ORDER BY id",
    )
    .bind(member.id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(ExperienceRow::decode)
    .collect::<Result<Vec<_>, _>>()?;

    let educations = sqlx::query_as::<_, Education>(
        "SELECT id, degree, org, year, note FROM educations WHERE member_id = $1 ORDER BY id",
    )
    .bind(member.id)
    .fetch_all(pool)
    .await?;

    let certifications = sqlx::query_as::<_, Certification>(
        "SELECT id, cert_name FROM certifications WHERE member_id = $1 ORDER BY id",
    )
    .bind(member.id)
    .fetch_all(pool)
    .await?;

    let socials = sqlx::query_as::<_, Social>(
        "SELECT id, type, url FROM socials WHERE member_id = $1 ORDER BY id",
    )
    .bind(member.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(MemberDetail {
        member,
        member_specialists,
        skills,
        experiences,
        educations,
        certifications,
        socials,
    }))
}

pub(super) async fn create(pool: &PgPool, req: &CreateMemberRequest) -> RepoResult<Created> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO members (slug, name, title, position, faculty, program, email, avatar_url, bio) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(&req.slug)
    .bind(&req.name)
    .bind(&req.title)
    .bind(&req.position)
    .bind(&req.faculty)
    .bind(&req.program)
    .bind(&req.email)
    .bind(&req.avatar_url)
    .bind(&req.bio)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| RepositoryError::from(e).for_slug("member", &req.slug))?;

    replace_specialists(&mut tx, id, &req.specialists).await?;
    replace_skills(&mut tx, id, &req.skills).await?;
    replace_experiences(&mut tx, id, &req.experiences).await?;
    replace_educations(&mut tx, id, &req.educations).await?;
    replace_certifications(&mut tx, id, &req.certifications).await?;
    replace_socials(&mut tx, id, &req.socials).await?;

    tx.commit().await?;

    tracing::info!(member_id = id, slug = %req.slug, "Member created");
    Ok(Created {
        id,
        slug: req.slug.clone(),
    })
}

pub(super) async fn update(pool: &PgPool, slug: &str, req: &UpdateMemberRequest) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let Some(id) = lock_by_slug(&mut tx, "members", slug).await? else {
        return Ok(false);
    };

    if req.is_empty() {
        return Ok(true);
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE members SET ");
    let mut set = builder.separated(", ");
    push_assign(&mut set, "name", req.name.clone());
    push_assign(&mut set, "title", req.title.clone());
    push_assign(&mut set, "position", req.position.clone());
    push_assign(&mut set, "faculty", req.faculty.clone());
    push_assign(&mut set, "program", req.program.clone());
    push_assign(&mut set, "email", req.email.clone());
    push_assign(&mut set, "avatar_url", req.avatar_url.clone());
    push_assign(&mut set, "bio", req.bio.clone());
    set.push("updated_at = NOW()");
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.build().execute(&mut *tx).await?;

    if let Some(names) = &req.specialists {
        replace_specialists(&mut tx, id, names).await?;
    }
    if let Some(names) = &req.skills {
        replace_skills(&mut tx, id, names).await?;
    }
    if let Some(items) = &req.experiences {
        replace_experiences(&mut tx, id, items).await?;
    }
    if let Some(items) = &req.educations {
        replace_educations(&mut tx, id, items).await?;
    }
    if let Some(names) = &req.certifications {
        replace_certifications(&mut tx, id, names).await?;
    }
    if let Some(items) = &req.socials {
        replace_socials(&mut tx, id, items).await?;
    }

    tx.commit().await?;
    Ok(true)
}

// --- Child Collections ---
// Each collection is replaced wholesale: delete every row of the member, then insert in
// input order. On create the delete is a no-op.

/// Specialists are shared across members: find-or-create by name, then link.
async fn replace_specialists(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM member_specialists WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    for name in distinct_names(names) {
        let spec_id: i64 = sqlx::query_scalar(
            "INSERT INTO specialists (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id",
        )
        .bind(&name)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO member_specialists (member_id, spec_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(member_id)
        .bind(spec_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn replace_skills(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM skills WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    for name in distinct_names(names) {
        sqlx::query(
            "INSERT INTO skills (member_id, skill_name) VALUES ($1, $2) \
             ON CONFLICT (member_id, skill_name) DO NOTHING",
        )
        .bind(member_id)
        .bind(&name)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn replace_experiences(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
    items: &[ExperienceInput],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM experiences WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO experiences (member_id, role, org, period, bullets) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(member_id)
        .bind(&item.role)
        .bind(blank_to_null(&item.org))
        .bind(blank_to_null(&item.period))
        .bind(codec::encode(&item.bullets))
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn replace_educations(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
    items: &[EducationInput],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM educations WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO educations (member_id, degree, org, year, note) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(member_id)
        .bind(&item.degree)
        .bind(&item.org)
        .bind(blank_to_null(&item.year))
        .bind(blank_to_null(&item.note))
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn replace_certifications(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM certifications WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    for name in names.iter().filter_map(|n| blank_to_null(n)) {
        sqlx::query("INSERT INTO certifications (member_id, cert_name) VALUES ($1, $2)")
            .bind(member_id)
            .bind(name)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn replace_socials(
    tx: &mut Transaction<'_, Postgres>,
    member_id: i64,
    items: &[SocialInput],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM socials WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await?;

    for item in items {
        sqlx::query("INSERT INTO socials (member_id, type, url) VALUES ($1, $2, $3)")
            .bind(member_id)
            .bind(item.kind.as_str())
            .bind(&item.url)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
