use crate::models::{
    Achievement, AdminDashboardStats, ContactRequest, CreateAchievementRequest,
    CreateProjectRequest, PortfolioStats, Profile, Project, Reach, UpdateAchievementRequest,
    UpdateProfileRequest, UpdateProjectRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for all persistence operations against the hosted
/// backend's database. Handlers interact with this trait only, which keeps the
/// concrete implementation (Postgres, mock) swappable across Axum's async
/// boundaries via `Arc<dyn Repository>`.
///
/// Error contract: every method except `insert_reach` forms an error boundary.
/// Backend failures are logged and collapse to a conservative value — lists
/// return an empty Vec, single fetches and creates return None, updates and
/// deletes return false. `insert_reach` is the one exception: the contact form
/// needs a specific message, so its error propagates.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Projects ---
    // Public listing, newest first, with optional featured/search filters.
    // Every returned record carries its technology tags.
    async fn list_projects(&self, featured: Option<bool>, search: Option<String>) -> Vec<Project>;
    // Small landing-page list of featured projects.
    async fn list_featured_projects(&self, limit: i64) -> Vec<Project>;
    // Public detail lookup by the URL-safe slug.
    async fn get_project_by_slug(&self, slug: &str) -> Option<Project>;
    // Admin lookup by id (form pre-fill).
    async fn get_project(&self, id: Uuid) -> Option<Project>;
    // Inserts the project row and its technology rows in one transaction.
    async fn create_project(&self, req: CreateProjectRequest) -> Option<Project>;
    // Partial update. A provided technology set is fully replaced
    // (delete + reinsert) inside the same transaction, so a failure can
    // never leave the project with zero tags.
    async fn update_project(&self, id: Uuid, req: UpdateProjectRequest) -> bool;
    // Technology rows go with the project via FK cascade.
    async fn delete_project(&self, id: Uuid) -> bool;

    // --- Achievements ---
    async fn list_achievements(&self) -> Vec<Achievement>;
    async fn get_achievement(&self, id: Uuid) -> Option<Achievement>;
    async fn create_achievement(&self, req: CreateAchievementRequest) -> Option<Achievement>;
    async fn update_achievement(&self, id: Uuid, req: UpdateAchievementRequest) -> bool;
    async fn delete_achievement(&self, id: Uuid) -> bool;

    // --- Profiles ---
    async fn get_profile(&self, id: Uuid) -> Option<Profile>;
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> bool;

    // --- Contact ---
    /// The one write whose failure propagates: the caller renders a specific
    /// error message instead of a silent empty result.
    async fn insert_reach(&self, req: ContactRequest) -> Result<Reach, sqlx::Error>;

    // --- Stats ---
    async fn portfolio_stats(&self) -> PortfolioStats;
    async fn admin_stats(&self) -> AdminDashboardStats;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of `Repository`, backed by the hosted
/// backend's PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

// Shared column list so every project query maps identically. `featured` is
// nullable at the backend; it is normalized to a real bool at this boundary.
const PROJECT_COLUMNS: &str = r#"
    id, title, slug, description, content, image_url, secondary_image_url,
    demo_url, github_url, duration, completion_date, "role", client,
    COALESCE(featured, false) AS featured, created_at, updated_at
"#;

const ACHIEVEMENT_COLUMNS: &str = r#"
    id, place, product, description, image_url, secondary_image_url,
    created_at, updated_at
"#;

impl PostgresRepository {
    /// Creates a new repository instance over the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches one project's technology tags. Failures degrade to an empty
    /// list so a tag-table hiccup never hides the project itself.
    async fn fetch_technologies(pool: &PgPool, project_id: Uuid) -> Vec<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT technology FROM project_technologies WHERE project_id = $1 ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("fetch_technologies error for {}: {:?}", project_id, e);
            vec![]
        })
    }

    /// Attaches technology tags to a batch of projects. The per-project
    /// fetches are independent futures joined before the list is returned.
    async fn attach_technologies(&self, projects: Vec<Project>) -> Vec<Project> {
        let lookups = projects.into_iter().map(|mut project| {
            let pool = self.pool.clone();
            async move {
                project.technologies = Self::fetch_technologies(&pool, project.id).await;
                project
            }
        });
        join_all(lookups).await
    }
}

/// Form inputs deliver cleared optional fields as empty strings; the backend
/// stores them as NULL.
fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_projects
    ///
    /// Flexible listing with QueryBuilder for safe parameterization. Search
    /// matches title, slug, and description case-insensitively.
    async fn list_projects(&self, featured: Option<bool>, search: Option<String>) -> Vec<Project> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM projects WHERE true", PROJECT_COLUMNS));

        if let Some(f) = featured {
            builder.push(" AND COALESCE(featured, false) = ");
            builder.push_bind(f);
        }

        if let Some(s) = search {
            let pattern = format!("%{}%", s);
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR slug ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        let rows = match builder.build_query_as::<Project>().fetch_all(&self.pool).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("list_projects error: {:?}", e);
                return vec![];
            }
        };

        self.attach_technologies(rows).await
    }

    /// list_featured_projects
    ///
    /// The landing-page slice: newest featured projects up to `limit`.
    async fn list_featured_projects(&self, limit: i64) -> Vec<Project> {
        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE COALESCE(featured, false) = true ORDER BY created_at DESC LIMIT $1",
            PROJECT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_featured_projects error: {:?}", e);
            vec![]
        });

        self.attach_technologies(rows).await
    }

    /// get_project_by_slug
    ///
    /// Public detail lookup. The slug is unique at the backend.
    async fn get_project_by_slug(&self, slug: &str) -> Option<Project> {
        let row = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE slug = $1",
            PROJECT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_project_by_slug error: {:?}", e);
            None
        })?;

        let mut project = row;
        project.technologies = Self::fetch_technologies(&self.pool, project.id).await;
        Some(project)
    }

    /// get_project
    ///
    /// Id lookup used by the admin workflow.
    async fn get_project(&self, id: Uuid) -> Option<Project> {
        let row = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_project error: {:?}", e);
            None
        })?;

        let mut project = row;
        project.technologies = Self::fetch_technologies(&self.pool, project.id).await;
        Some(project)
    }

    /// create_project
    ///
    /// Inserts the project row and its technology rows atomically. A unique
    /// slug violation surfaces here as a conservative None.
    async fn create_project(&self, req: CreateProjectRequest) -> Option<Project> {
        let technologies = req.clean_technologies();
        let new_id = Uuid::new_v4();

        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::error!("create_project begin error: {:?}", e);
                return None;
            }
        };

        let inserted = sqlx::query_as::<_, Project>(&format!(
            r#"INSERT INTO projects
                (id, title, slug, description, content, image_url, secondary_image_url,
                 demo_url, github_url, duration, completion_date, "role", client, featured,
                 created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW())
               RETURNING {}"#,
            PROJECT_COLUMNS
        ))
        .bind(new_id)
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.description)
        .bind(none_if_empty(req.content.clone()))
        .bind(&req.image_url)
        .bind(none_if_empty(req.secondary_image_url.clone()))
        .bind(none_if_empty(req.demo_url.clone()))
        .bind(none_if_empty(req.github_url.clone()))
        .bind(&req.duration)
        .bind(&req.completion_date)
        .bind(&req.role)
        .bind(none_if_empty(req.client.clone()))
        .bind(req.featured)
        .fetch_one(&mut *tx)
        .await;

        let mut project = match inserted {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("create_project insert error: {:?}", e);
                return None;
            }
        };

        for technology in &technologies {
            if let Err(e) = sqlx::query(
                "INSERT INTO project_technologies (id, project_id, technology, created_at) VALUES ($1, $2, $3, NOW())",
            )
            .bind(Uuid::new_v4())
            .bind(project.id)
            .bind(technology)
            .execute(&mut *tx)
            .await
            {
                tracing::error!("create_project technology insert error: {:?}", e);
                return None;
            }
        }

        if let Err(e) = tx.commit().await {
            tracing::error!("create_project commit error: {:?}", e);
            return None;
        }

        project.technologies = technologies;
        Some(project)
    }

    /// update_project
    ///
    /// COALESCE-based partial update. When a technology set is provided, the
    /// stored set is deleted and reinserted inside the same transaction: the
    /// replacement is observed all-or-nothing, never as a zero-tag state.
    async fn update_project(&self, id: Uuid, req: UpdateProjectRequest) -> bool {
        let technologies = req.clean_technologies();

        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::error!("update_project begin error: {:?}", e);
                return false;
            }
        };

        let updated = sqlx::query(
            r#"
            UPDATE projects
            SET title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                content = COALESCE($5, content),
                image_url = COALESCE($6, image_url),
                secondary_image_url = COALESCE($7, secondary_image_url),
                demo_url = COALESCE($8, demo_url),
                github_url = COALESCE($9, github_url),
                duration = COALESCE($10, duration),
                completion_date = COALESCE($11, completion_date),
                "role" = COALESCE($12, "role"),
                client = COALESCE($13, client),
                featured = COALESCE($14, featured),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.description)
        .bind(&req.content)
        .bind(&req.image_url)
        .bind(&req.secondary_image_url)
        .bind(&req.demo_url)
        .bind(&req.github_url)
        .bind(&req.duration)
        .bind(&req.completion_date)
        .bind(&req.role)
        .bind(&req.client)
        .bind(req.featured)
        .execute(&mut *tx)
        .await;

        match updated {
            Ok(result) if result.rows_affected() > 0 => {}
            Ok(_) => return false,
            Err(e) => {
                tracing::error!("update_project error: {:?}", e);
                return false;
            }
        }

        if let Some(technologies) = technologies {
            if let Err(e) = sqlx::query("DELETE FROM project_technologies WHERE project_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
            {
                tracing::error!("update_project technology delete error: {:?}", e);
                return false;
            }

            for technology in &technologies {
                if let Err(e) = sqlx::query(
                    "INSERT INTO project_technologies (id, project_id, technology, created_at) VALUES ($1, $2, $3, NOW())",
                )
                .bind(Uuid::new_v4())
                .bind(id)
                .bind(technology)
                .execute(&mut *tx)
                .await
                {
                    tracing::error!("update_project technology insert error: {:?}", e);
                    return false;
                }
            }
        }

        match tx.commit().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("update_project commit error: {:?}", e);
                false
            }
        }
    }

    /// delete_project
    ///
    /// The FK cascade removes the technology rows with the project.
    async fn delete_project(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_project error: {:?}", e);
                false
            }
        }
    }

    // --- ACHIEVEMENTS ---

    async fn list_achievements(&self) -> Vec<Achievement> {
        sqlx::query_as::<_, Achievement>(&format!(
            "SELECT {} FROM achievements ORDER BY created_at DESC",
            ACHIEVEMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_achievements error: {:?}", e);
            vec![]
        })
    }

    async fn get_achievement(&self, id: Uuid) -> Option<Achievement> {
        sqlx::query_as::<_, Achievement>(&format!(
            "SELECT {} FROM achievements WHERE id = $1",
            ACHIEVEMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_achievement error: {:?}", e);
            None
        })
    }

    async fn create_achievement(&self, req: CreateAchievementRequest) -> Option<Achievement> {
        sqlx::query_as::<_, Achievement>(&format!(
            r#"INSERT INTO achievements
                (id, place, product, description, image_url, secondary_image_url, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
               RETURNING {}"#,
            ACHIEVEMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&req.place)
        .bind(&req.product)
        .bind(&req.description)
        .bind(&req.image_url)
        .bind(none_if_empty(req.secondary_image_url.clone()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("create_achievement error: {:?}", e);
            e
        })
        .ok()
    }

    async fn update_achievement(&self, id: Uuid, req: UpdateAchievementRequest) -> bool {
        let result = sqlx::query(
            r#"
            UPDATE achievements
            SET place = COALESCE($2, place),
                product = COALESCE($3, product),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                secondary_image_url = COALESCE($6, secondary_image_url),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.place)
        .bind(&req.product)
        .bind(&req.description)
        .bind(&req.image_url)
        .bind(&req.secondary_image_url)
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) => r.rows_affected() > 0,
            Err(e) => {
                tracing::error!("update_achievement error: {:?}", e);
                false
            }
        }
    }

    async fn delete_achievement(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM achievements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_achievement error: {:?}", e);
                false
            }
        }
    }

    // --- PROFILES ---

    /// get_profile
    ///
    /// Supplies the administrator flag during session resolution. A failure
    /// here is logged and resolves to None — callers treat that as "not
    /// administrator" rather than an error.
    async fn get_profile(&self, id: Uuid) -> Option<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"SELECT id, full_name, avatar_url, website, bio,
                      COALESCE(is_admin, false) AS is_admin, created_at, updated_at
               FROM profiles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_profile error: {:?}", e);
            None
        })
    }

    /// update_profile
    ///
    /// The administrator flag is deliberately not updatable from here.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> bool {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url),
                website = COALESCE($4, website),
                bio = COALESCE($5, bio),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.full_name)
        .bind(&req.avatar_url)
        .bind(&req.website)
        .bind(&req.bio)
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) => r.rows_affected() > 0,
            Err(e) => {
                tracing::error!("update_profile error: {:?}", e);
                false
            }
        }
    }

    // --- CONTACT ---

    async fn insert_reach(&self, req: ContactRequest) -> Result<Reach, sqlx::Error> {
        sqlx::query_as::<_, Reach>(
            r#"INSERT INTO reach (id, name, email, message, created_at)
               VALUES ($1, $2, $3, $4, NOW())
               RETURNING id, name, email, message, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("insert_reach error: {:?}", e);
            e
        })
    }

    // --- STATS ---

    async fn portfolio_stats(&self) -> PortfolioStats {
        let total_projects = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("portfolio_stats count error: {:?}", e);
                0
            });

        let last_updated =
            sqlx::query_scalar::<_, Option<DateTime<Utc>>>("SELECT MAX(updated_at) FROM projects")
                .fetch_one(&self.pool)
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("portfolio_stats last_updated error: {:?}", e);
                    None
                });

        PortfolioStats {
            total_projects,
            last_updated,
        }
    }

    async fn admin_stats(&self) -> AdminDashboardStats {
        let total_projects = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("admin_stats projects error: {:?}", e);
                0
            });
        let featured_projects = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects WHERE COALESCE(featured, false) = true",
        )
        .fetch_one(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("admin_stats featured error: {:?}", e);
            0
        });
        let total_achievements = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM achievements")
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("admin_stats achievements error: {:?}", e);
                0
            });
        let last_updated = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT GREATEST((SELECT MAX(updated_at) FROM projects), (SELECT MAX(updated_at) FROM achievements))",
        )
        .fetch_one(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("admin_stats last_updated error: {:?}", e);
            None
        });

        AdminDashboardStats {
            total_projects,
            featured_projects,
            total_achievements,
            last_updated,
        }
    }
}
