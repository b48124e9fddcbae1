use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::store::{
    LabelCount, Page, PostingFilter, PostingStore, PostingUpdate, StoreResult, Visibility,
};
use crate::models::blog_post::BlogPost;
use crate::models::posting::{Counter, Posting};

const POSTING_COLUMNS: &str = "id, slug, title, description, company, location, salary_min, \
    salary_max, employment_type, categories, requirements, benefits, is_external, external_url, \
    is_approved, is_deleted, deleted_at, is_archived, expires_at, application_deadline, \
    view_count, application_count, created_at, updated_at";

const BLOG_COLUMNS: &str =
    "id, slug, title, excerpt, content, author, is_published, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostingFilter) {
    qb.push(" WHERE TRUE");
    match filter.visibility {
        Visibility::Public => {
            qb.push(" AND is_approved = TRUE AND is_deleted = FALSE");
        }
        Visibility::Live => {
            qb.push(" AND is_deleted = FALSE");
        }
        Visibility::Any => {}
    }
    if let Some(label) = &filter.category_label {
        qb.push(" AND ")
            .push_bind(label.clone())
            .push(" = ANY(categories)");
    }
    if let Some(archived) = filter.archived {
        qb.push(" AND is_archived = ").push_bind(archived);
    }
    if let Some(now) = filter.unexpired_at {
        qb.push(" AND (expires_at IS NULL OR expires_at > ")
            .push_bind(now)
            .push(")");
    }
    if let Some(now) = filter.expired_by {
        qb.push(" AND expires_at IS NOT NULL AND expires_at <= ")
            .push_bind(now);
    }
}

#[async_trait]
impl PostingStore for PgStore {
    async fn insert(&self, posting: &Posting) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO postings (
                id, slug, title, description, company, location, salary_min,
                salary_max, employment_type, categories, requirements, benefits,
                is_external, external_url, is_approved, is_deleted, deleted_at,
                is_archived, expires_at, application_deadline, view_count,
                application_count, created_at, updated_at
            ) VALUES (
                $1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,
                $13,$14,$15,$16,$17,$18,$19,$20,$21,$22,$23,$24
            )
            "#,
        )
        .bind(posting.id)
        .bind(&posting.slug)
        .bind(&posting.title)
        .bind(&posting.description)
        .bind(&posting.company)
        .bind(&posting.location)
        .bind(&posting.salary_min)
        .bind(&posting.salary_max)
        .bind(&posting.employment_type)
        .bind(&posting.categories)
        .bind(&posting.requirements)
        .bind(&posting.benefits)
        .bind(posting.is_external)
        .bind(&posting.external_url)
        .bind(posting.is_approved)
        .bind(posting.is_deleted)
        .bind(posting.deleted_at)
        .bind(posting.is_archived)
        .bind(posting.expires_at)
        .bind(posting.application_deadline)
        .bind(posting.view_count)
        .bind(posting.application_count)
        .bind(posting.created_at)
        .bind(posting.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Posting>> {
        let query = format!("SELECT {} FROM postings WHERE id = $1", POSTING_COLUMNS);
        let posting = sqlx::query_as::<_, Posting>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(posting)
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Posting>> {
        let query = format!("SELECT {} FROM postings WHERE slug = $1", POSTING_COLUMNS);
        let posting = sqlx::query_as::<_, Posting>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(posting)
    }

    async fn slug_taken(&self, slug: &str, exclude: Uuid) -> StoreResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM postings WHERE slug = $1 AND id <> $2)",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn find(&self, filter: &PostingFilter, page: Option<Page>) -> StoreResult<Vec<Posting>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POSTING_COLUMNS).push(" FROM postings");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY is_archived ASC, created_at DESC, id ASC");
        if let Some(page) = page {
            qb.push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.skip);
        }
        let items = qb.build_query_as::<Posting>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    async fn count(&self, filter: &PostingFilter) -> StoreResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM postings");
        push_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn update(&self, id: Uuid, update: &PostingUpdate) -> StoreResult<Option<Posting>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE postings SET ");
        let mut touched = false;
        {
            let mut set = qb.separated(", ");
            macro_rules! set_field {
                ($column:literal, $value:expr) => {
                    if let Some(value) = $value {
                        set.push(concat!($column, " = "))
                            .push_bind_unseparated(value.clone());
                        touched = true;
                    }
                };
            }
            set_field!("slug", &update.slug);
            set_field!("title", &update.title);
            set_field!("description", &update.description);
            set_field!("company", &update.company);
            set_field!("location", &update.location);
            set_field!("salary_min", &update.salary_min);
            set_field!("salary_max", &update.salary_max);
            set_field!("employment_type", &update.employment_type);
            set_field!("categories", &update.categories);
            set_field!("requirements", &update.requirements);
            set_field!("benefits", &update.benefits);
            set_field!("is_external", &update.is_external);
            set_field!("external_url", &update.external_url);
            set_field!("expires_at", &update.expires_at);
            set_field!("application_deadline", &update.application_deadline);
            set_field!("updated_at", &update.updated_at);
            set_field!("is_approved", &update.is_approved);
            set_field!("is_archived", &update.is_archived);
            set_field!("is_deleted", &update.is_deleted);
            set_field!("deleted_at", &update.deleted_at);
        }
        if !touched {
            return self.find_by_id(id).await;
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(POSTING_COLUMNS);
        let posting = qb
            .build_query_as::<Posting>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(posting)
    }

    async fn increment(&self, id: Uuid, counter: Counter) -> StoreResult<bool> {
        let statement = match counter {
            Counter::Views => "UPDATE postings SET view_count = view_count + 1 WHERE id = $1",
            Counter::Applications => {
                "UPDATE postings SET application_count = application_count + 1 WHERE id = $1"
            }
        };
        let res = sqlx::query(statement).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn purge_all(&self) -> StoreResult<u64> {
        let res = sqlx::query("DELETE FROM postings")
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn label_distribution(&self) -> StoreResult<Vec<LabelCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT label, COUNT(*)::BIGINT AS count
            FROM postings, UNNEST(categories) AS label
            WHERE is_approved = TRUE AND is_deleted = FALSE
            GROUP BY label
            ORDER BY count DESC, label ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect())
    }

    async fn insert_blog_post(&self, post: &BlogPost) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO blog_posts (id, slug, title, excerpt, content, author, is_published, created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            "#,
        )
        .bind(post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.is_published)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_blog_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        let query = format!("SELECT {} FROM blog_posts WHERE slug = $1", BLOG_COLUMNS);
        let post = sqlx::query_as::<_, BlogPost>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn blog_slug_taken(&self, slug: &str) -> StoreResult<bool> {
        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blog_posts WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    async fn list_published_blog_posts(&self) -> StoreResult<Vec<BlogPost>> {
        let query = format!(
            "SELECT {} FROM blog_posts WHERE is_published = TRUE ORDER BY created_at DESC",
            BLOG_COLUMNS
        );
        let posts = sqlx::query_as::<_, BlogPost>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }
}
