use crate::models::{
    Activity, ActivityPatch, Album, Announcement, GalleryPhoto, Highlight, NewActivity,
    NewGalleryPhoto, NewPhoto, NewUser, PhotoRef, ReportRef, User, UserUpdate, UserView,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, one section per
/// resource collection. Handlers interact with the data layer through this trait
/// without knowing the concrete implementation (Postgres in production, the
/// seedable in-memory store in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Listing never exposes the password hash or reset token.
    async fn list_users(&self) -> Result<Vec<UserView>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;
    // Partial update addressed by the user's current email. Returns matched rows.
    async fn update_user(&self, existing_email: &str, patch: UserUpdate)
    -> Result<u64, sqlx::Error>;
    async fn delete_user(&self, email: &str) -> Result<u64, sqlx::Error>;
    async fn set_reset_token(&self, email: &str, token: &str) -> Result<u64, sqlx::Error>;
    // One-time token consumption: sets the new hash and clears the token in a
    // single conditional statement. Returns 0 when the token matched nothing.
    async fn reset_password(&self, token: &str, password_hash: &str) -> Result<u64, sqlx::Error>;

    // --- Announcements ---
    async fn list_announcements(&self) -> Result<Vec<Announcement>, sqlx::Error>;
    async fn create_announcement(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Announcement, sqlx::Error>;
    // Renames locate the record by its previous name before the new name lands.
    async fn update_announcement(
        &self,
        old_name: &str,
        new_name: &str,
        new_text: &str,
    ) -> Result<u64, sqlx::Error>;
    async fn delete_announcement(&self, name: &str) -> Result<u64, sqlx::Error>;

    // --- Highlights ---
    async fn list_highlights(&self) -> Result<Vec<Highlight>, sqlx::Error>;
    async fn create_highlight(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Highlight, sqlx::Error>;
    // Exact title match first; zero matches fall back to an anchored
    // case-insensitive comparison of the trimmed title.
    async fn update_highlight(
        &self,
        old_title: &str,
        new_title: &str,
        new_description: &str,
    ) -> Result<u64, sqlx::Error>;
    async fn delete_highlight_by_title(&self, title: &str) -> Result<u64, sqlx::Error>;
    // Legacy-compatibility path for clients that captured the generated id.
    async fn delete_highlight_by_id(&self, id: Uuid) -> Result<u64, sqlx::Error>;

    // --- Activities ---
    // Always ordered by date, most recent first.
    async fn list_activities(&self) -> Result<Vec<Activity>, sqlx::Error>;
    async fn latest_activities(&self, limit: i64) -> Result<Vec<Activity>, sqlx::Error>;
    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, sqlx::Error>;
    async fn find_activity_by_title(&self, title: &str) -> Result<Option<Activity>, sqlx::Error>;
    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, sqlx::Error>;
    async fn update_activity_by_title(
        &self,
        old_title: &str,
        patch: ActivityPatch,
    ) -> Result<u64, sqlx::Error>;
    async fn update_activity_by_id(
        &self,
        id: Uuid,
        patch: ActivityPatch,
    ) -> Result<u64, sqlx::Error>;
    async fn delete_activity(&self, id: Uuid) -> Result<u64, sqlx::Error>;
    async fn clear_activities(&self) -> Result<u64, sqlx::Error>;

    // --- Albums ---
    async fn list_albums(&self) -> Result<Vec<Album>, sqlx::Error>;
    async fn get_album(&self, name: &str) -> Result<Option<Album>, sqlx::Error>;
    async fn create_album(&self, name: &str) -> Result<Album, sqlx::Error>;
    async fn delete_album(&self, id: Uuid) -> Result<u64, sqlx::Error>;
    async fn add_album_photos(
        &self,
        album_id: Uuid,
        photos: Vec<NewPhoto>,
    ) -> Result<Vec<PhotoRef>, sqlx::Error>;
    // Removal by the photo's stable id: a single conditional delete that pulls
    // the matching element wherever it currently sits in the sequence, safe
    // under concurrent edits.
    async fn remove_album_photo(
        &self,
        album_id: Uuid,
        photo_id: Uuid,
    ) -> Result<Option<PhotoRef>, sqlx::Error>;

    // --- Gallery ---
    async fn list_gallery_photos(&self) -> Result<Vec<GalleryPhoto>, sqlx::Error>;
    async fn add_gallery_photos(
        &self,
        photos: Vec<NewGalleryPhoto>,
    ) -> Result<Vec<GalleryPhoto>, sqlx::Error>;
    async fn remove_gallery_photo(
        &self,
        filename: &str,
    ) -> Result<Option<GalleryPhoto>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries use runtime binding so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the photo sequences for a set of activities in one query.
    async fn activity_photos(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<PhotoRef>>, sqlx::Error> {
        #[derive(FromRow)]
        struct Row {
            activity_id: Uuid,
            #[sqlx(flatten)]
            photo: PhotoRef,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT activity_id, id, filename, url, original_name \
             FROM activity_photos WHERE activity_id = ANY($1) ORDER BY seq",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<Uuid, Vec<PhotoRef>> = HashMap::new();
        for row in rows {
            map.entry(row.activity_id).or_default().push(row.photo);
        }
        Ok(map)
    }

    /// Loads the report sequences for a set of activities in one query.
    async fn activity_reports(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ReportRef>>, sqlx::Error> {
        #[derive(FromRow)]
        struct Row {
            activity_id: Uuid,
            #[sqlx(flatten)]
            report: ReportRef,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT activity_id, id, url, public_id, original_name, uploaded_at, mime_type \
             FROM activity_reports WHERE activity_id = ANY($1) ORDER BY seq",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<Uuid, Vec<ReportRef>> = HashMap::new();
        for row in rows {
            map.entry(row.activity_id).or_default().push(row.report);
        }
        Ok(map)
    }

    /// Attaches photo/report sequences to bare activity rows.
    async fn assemble_activities(
        &self,
        mut activities: Vec<Activity>,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let ids: Vec<Uuid> = activities.iter().map(|a| a.id).collect();
        if ids.is_empty() {
            return Ok(activities);
        }
        let mut photos = self.activity_photos(&ids).await?;
        let mut reports = self.activity_reports(&ids).await?;
        for activity in &mut activities {
            activity.photos = photos.remove(&activity.id).unwrap_or_default();
            activity.reports = reports.remove(&activity.id).unwrap_or_default();
        }
        Ok(activities)
    }

    /// Attaches the ordered photo sequences to bare album rows.
    async fn assemble_albums(&self, mut albums: Vec<Album>) -> Result<Vec<Album>, sqlx::Error> {
        let ids: Vec<Uuid> = albums.iter().map(|a| a.id).collect();
        if ids.is_empty() {
            return Ok(albums);
        }

        #[derive(FromRow)]
        struct Row {
            album_id: Uuid,
            #[sqlx(flatten)]
            photo: PhotoRef,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT album_id, id, filename, url, original_name \
             FROM album_photos WHERE album_id = ANY($1) ORDER BY seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<Uuid, Vec<PhotoRef>> = HashMap::new();
        for row in rows {
            map.entry(row.album_id).or_default().push(row.photo);
        }
        for album in &mut albums {
            album.photos = map.remove(&album.id).unwrap_or_default();
        }
        Ok(albums)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn list_users(&self) -> Result<Vec<UserView>, sqlx::Error> {
        sqlx::query_as::<_, UserView>(
            "SELECT id, email, role, vertical FROM users ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, vertical, reset_token \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, role, vertical) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, email, password_hash, role, vertical, reset_token",
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(&user.vertical)
        .fetch_one(&self.pool)
        .await
    }

    /// update_user
    ///
    /// Partial update via COALESCE so only supplied fields change. The
    /// vertical column is special-cased: the nested Option distinguishes
    /// keep / clear / set, which is how a role change out of `verticalhead`
    /// drops the stale vertical.
    async fn update_user(
        &self,
        existing_email: &str,
        patch: UserUpdate,
    ) -> Result<u64, sqlx::Error> {
        let touch_vertical = patch.vertical.is_some();
        let vertical = patch.vertical.flatten();

        let result = sqlx::query(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                password_hash = COALESCE($3, password_hash), \
                role = COALESCE($4, role), \
                vertical = CASE WHEN $5 THEN $6 ELSE vertical END \
             WHERE email = $1",
        )
        .bind(existing_email)
        .bind(&patch.email)
        .bind(&patch.password_hash)
        .bind(&patch.role)
        .bind(touch_vertical)
        .bind(&vertical)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_user(&self, email: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_reset_token(&self, email: &str, token: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET reset_token = $2 WHERE email = $1")
            .bind(email)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn reset_password(&self, token: &str, password_hash: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token = NULL WHERE reset_token = $1",
        )
        .bind(token)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // --- ANNOUNCEMENTS ---

    async fn list_announcements(&self) -> Result<Vec<Announcement>, sqlx::Error> {
        sqlx::query_as::<_, Announcement>(
            "SELECT id, activity_name, activity_description \
             FROM announcements ORDER BY activity_name",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_announcement(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Announcement, sqlx::Error> {
        sqlx::query_as::<_, Announcement>(
            "INSERT INTO announcements (id, activity_name, activity_description) \
             VALUES ($1, $2, $3) RETURNING id, activity_name, activity_description",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_announcement(
        &self,
        old_name: &str,
        new_name: &str,
        new_text: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE announcements SET activity_name = $2, activity_description = $3 \
             WHERE activity_name = $1",
        )
        .bind(old_name)
        .bind(new_name)
        .bind(new_text)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_announcement(&self, name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM announcements WHERE activity_name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // --- HIGHLIGHTS ---

    async fn list_highlights(&self) -> Result<Vec<Highlight>, sqlx::Error> {
        sqlx::query_as::<_, Highlight>(
            "SELECT id, title, description FROM highlights ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_highlight(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Highlight, sqlx::Error> {
        sqlx::query_as::<_, Highlight>(
            "INSERT INTO highlights (id, title, description) \
             VALUES ($1, $2, $3) RETURNING id, title, description",
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    /// update_highlight
    ///
    /// Exact title match first. When that hits zero rows, retries with an
    /// anchored case-insensitive comparison of the trimmed title (titles are
    /// expected unique modulo case).
    async fn update_highlight(
        &self,
        old_title: &str,
        new_title: &str,
        new_description: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE highlights SET title = $2, description = $3 WHERE title = $1",
        )
        .bind(old_title)
        .bind(new_title)
        .bind(new_description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(result.rows_affected());
        }

        let result = sqlx::query(
            "UPDATE highlights SET title = $2, description = $3 \
             WHERE LOWER(BTRIM(title)) = LOWER(BTRIM($1))",
        )
        .bind(old_title)
        .bind(new_title)
        .bind(new_description)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_highlight_by_title(&self, title: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM highlights WHERE title = $1")
            .bind(title)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(result.rows_affected());
        }

        let result =
            sqlx::query("DELETE FROM highlights WHERE LOWER(BTRIM(title)) = LOWER(BTRIM($1))")
                .bind(title)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete_highlight_by_id(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // --- ACTIVITIES ---

    async fn list_activities(&self) -> Result<Vec<Activity>, sqlx::Error> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT id, title, description, date, location, status \
             FROM activities ORDER BY date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.assemble_activities(activities).await
    }

    async fn latest_activities(&self, limit: i64) -> Result<Vec<Activity>, sqlx::Error> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT id, title, description, date, location, status \
             FROM activities ORDER BY date DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        self.assemble_activities(activities).await
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            "SELECT id, title, description, date, location, status \
             FROM activities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match activity {
            Some(activity) => Ok(self
                .assemble_activities(vec![activity])
                .await?
                .into_iter()
                .next()),
            None => Ok(None),
        }
    }

    async fn find_activity_by_title(&self, title: &str) -> Result<Option<Activity>, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            "SELECT id, title, description, date, location, status \
             FROM activities WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        match activity {
            Some(activity) => Ok(self
                .assemble_activities(vec![activity])
                .await?
                .into_iter()
                .next()),
            None => Ok(None),
        }
    }

    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, sqlx::Error> {
        let activity_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO activities (id, title, description, date, location, status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(activity_id)
        .bind(&activity.title)
        .bind(&activity.description)
        .bind(activity.date)
        .bind(&activity.location)
        .bind(&activity.status)
        .execute(&self.pool)
        .await?;

        let mut photos = Vec::with_capacity(activity.photos.len());
        for photo in &activity.photos {
            let photo_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO activity_photos (id, activity_id, filename, url, original_name) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(photo_id)
            .bind(activity_id)
            .bind(&photo.filename)
            .bind(&photo.url)
            .bind(&photo.original_name)
            .execute(&self.pool)
            .await?;
            photos.push(PhotoRef {
                id: photo_id,
                filename: photo.filename.clone(),
                url: photo.url.clone(),
                original_name: photo.original_name.clone(),
            });
        }

        let mut reports = Vec::with_capacity(activity.reports.len());
        for report in &activity.reports {
            let report_id = Uuid::new_v4();
            let uploaded_at = report.uploaded_at.unwrap_or_else(Utc::now);
            sqlx::query(
                "INSERT INTO activity_reports \
                 (id, activity_id, url, public_id, original_name, uploaded_at, mime_type) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(report_id)
            .bind(activity_id)
            .bind(&report.url)
            .bind(&report.public_id)
            .bind(&report.original_name)
            .bind(uploaded_at)
            .bind(&report.mime_type)
            .execute(&self.pool)
            .await?;
            reports.push(ReportRef {
                id: report_id,
                url: report.url.clone(),
                public_id: report.public_id.clone(),
                original_name: report.original_name.clone(),
                uploaded_at,
                mime_type: report.mime_type.clone(),
            });
        }

        Ok(Activity {
            id: activity_id,
            title: activity.title,
            description: activity.description,
            date: activity.date,
            location: activity.location,
            status: activity.status,
            photos,
            reports,
        })
    }

    async fn update_activity_by_title(
        &self,
        old_title: &str,
        patch: ActivityPatch,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE activities SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                date = COALESCE($4, date), \
                location = COALESCE($5, location), \
                status = COALESCE($6, status) \
             WHERE title = $1",
        )
        .bind(old_title)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.date)
        .bind(&patch.location)
        .bind(&patch.status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_activity_by_id(
        &self,
        id: Uuid,
        patch: ActivityPatch,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE activities SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                date = COALESCE($4, date), \
                location = COALESCE($5, location), \
                status = COALESCE($6, status) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.date)
        .bind(&patch.location)
        .bind(&patch.status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_activity(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        // Attachment rows go with the activity via ON DELETE CASCADE; the
        // handler removes the stored bytes before calling this.
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear_activities(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // --- ALBUMS ---

    async fn list_albums(&self) -> Result<Vec<Album>, sqlx::Error> {
        let albums = sqlx::query_as::<_, Album>("SELECT id, name FROM albums ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        self.assemble_albums(albums).await
    }

    async fn get_album(&self, name: &str) -> Result<Option<Album>, sqlx::Error> {
        let album = sqlx::query_as::<_, Album>("SELECT id, name FROM albums WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match album {
            Some(album) => Ok(self.assemble_albums(vec![album]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn create_album(&self, name: &str) -> Result<Album, sqlx::Error> {
        sqlx::query_as::<_, Album>(
            "INSERT INTO albums (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_album(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn add_album_photos(
        &self,
        album_id: Uuid,
        photos: Vec<NewPhoto>,
    ) -> Result<Vec<PhotoRef>, sqlx::Error> {
        let mut refs = Vec::with_capacity(photos.len());
        for photo in photos {
            let photo_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO album_photos (id, album_id, filename, url, original_name) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(photo_id)
            .bind(album_id)
            .bind(&photo.filename)
            .bind(&photo.url)
            .bind(&photo.original_name)
            .execute(&self.pool)
            .await?;
            refs.push(PhotoRef {
                id: photo_id,
                filename: photo.filename,
                url: photo.url,
                original_name: photo.original_name,
            });
        }
        Ok(refs)
    }

    async fn remove_album_photo(
        &self,
        album_id: Uuid,
        photo_id: Uuid,
    ) -> Result<Option<PhotoRef>, sqlx::Error> {
        sqlx::query_as::<_, PhotoRef>(
            "DELETE FROM album_photos WHERE id = $1 AND album_id = $2 \
             RETURNING id, filename, url, original_name",
        )
        .bind(photo_id)
        .bind(album_id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- GALLERY ---

    async fn list_gallery_photos(&self) -> Result<Vec<GalleryPhoto>, sqlx::Error> {
        sqlx::query_as::<_, GalleryPhoto>(
            "SELECT id, filename, url, original_name, uploaded_at, mime_type \
             FROM gallery_photos ORDER BY uploaded_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn add_gallery_photos(
        &self,
        photos: Vec<NewGalleryPhoto>,
    ) -> Result<Vec<GalleryPhoto>, sqlx::Error> {
        let mut stored = Vec::with_capacity(photos.len());
        for photo in photos {
            let row = sqlx::query_as::<_, GalleryPhoto>(
                "INSERT INTO gallery_photos \
                 (id, filename, url, original_name, uploaded_at, mime_type) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING id, filename, url, original_name, uploaded_at, mime_type",
            )
            .bind(Uuid::new_v4())
            .bind(&photo.filename)
            .bind(&photo.url)
            .bind(&photo.original_name)
            .bind(photo.uploaded_at)
            .bind(&photo.mime_type)
            .fetch_one(&self.pool)
            .await?;
            stored.push(row);
        }
        Ok(stored)
    }

    async fn remove_gallery_photo(
        &self,
        filename: &str,
    ) -> Result<Option<GalleryPhoto>, sqlx::Error> {
        sqlx::query_as::<_, GalleryPhoto>(
            "DELETE FROM gallery_photos WHERE filename = $1 \
             RETURNING id, filename, url, original_name, uploaded_at, mime_type",
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await
    }
}

// --- The In-Memory Implementation (Seedable Test Fixture) ---

/// MemoryRepository
///
/// An in-memory `Repository` used as a test fixture via dependency injection.
/// It mirrors the Postgres implementation's observable semantics (ordering,
/// case-insensitive fallbacks, stable-id photo removal) without a database.
/// Never used as runtime state.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: Vec<User>,
    announcements: Vec<Announcement>,
    highlights: Vec<Highlight>,
    activities: Vec<Activity>,
    albums: Vec<Album>,
    gallery: Vec<GalleryPhoto>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository pre-populated with representative activities, matching the
    /// demo data the portal frontend was developed against.
    pub fn with_seed_data() -> Self {
        let repo = Self::new();
        {
            let mut inner = repo.inner.lock().unwrap();
            inner.activities = vec![
                Activity {
                    id: Uuid::new_v4(),
                    title: "Blood Donation Camp".to_string(),
                    description: "Annual blood donation drive organized by NSS".to_string(),
                    date: chrono::NaiveDate::from_ymd_opt(2025, 9, 16).unwrap(),
                    location: "SSN Campus".to_string(),
                    status: "completed".to_string(),
                    photos: vec![PhotoRef {
                        id: Uuid::new_v4(),
                        filename: "blood_camp.JPG".to_string(),
                        url: "/uploads/blood_camp.JPG".to_string(),
                        original_name: Some("blood_camp.JPG".to_string()),
                    }],
                    reports: vec![],
                },
                Activity {
                    id: Uuid::new_v4(),
                    title: "Tree Plantation Drive".to_string(),
                    description: "Environmental initiative to plant 100 saplings".to_string(),
                    date: chrono::NaiveDate::from_ymd_opt(2025, 9, 20).unwrap(),
                    location: "Campus Garden".to_string(),
                    status: "upcoming".to_string(),
                    photos: vec![],
                    reports: vec![],
                },
                Activity {
                    id: Uuid::new_v4(),
                    title: "Community Health Checkup".to_string(),
                    description: "Free health checkup for local community".to_string(),
                    date: chrono::NaiveDate::from_ymd_opt(2025, 9, 25).unwrap(),
                    location: "Nearby Village".to_string(),
                    status: "upcoming".to_string(),
                    photos: vec![],
                    reports: vec![],
                },
            ];
        }
        repo
    }
}

/// Case-insensitive comparison of trimmed titles, matching the SQL fallback.
fn ci_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_users(&self) -> Result<Vec<UserView>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<UserView> = inner
            .users
            .iter()
            .map(|u| UserView {
                id: u.id,
                email: u.email.clone(),
                role: u.role.clone(),
                vertical: u.vertical.clone(),
            })
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            vertical: user.vertical,
            reset_token: None,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        existing_email: &str,
        patch: UserUpdate,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.iter_mut().find(|u| u.email == existing_email) else {
            return Ok(0);
        };
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(vertical) = patch.vertical {
            user.vertical = vertical;
        }
        Ok(1)
    }

    async fn delete_user(&self, email: &str) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.users.retain(|u| u.email != email);
        Ok((before - inner.users.len()) as u64)
    }

    async fn set_reset_token(&self, email: &str, token: &str) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.reset_token = Some(token.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn reset_password(&self, token: &str, password_hash: &str) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .users
            .iter_mut()
            .find(|u| u.reset_token.as_deref() == Some(token))
        {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.reset_token = None;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_announcements(&self) -> Result<Vec<Announcement>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut announcements = inner.announcements.clone();
        announcements.sort_by(|a, b| a.activity_name.cmp(&b.activity_name));
        Ok(announcements)
    }

    async fn create_announcement(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Announcement, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let announcement = Announcement {
            id: Uuid::new_v4(),
            activity_name: name.to_string(),
            activity_description: description.to_string(),
        };
        inner.announcements.push(announcement.clone());
        Ok(announcement)
    }

    async fn update_announcement(
        &self,
        old_name: &str,
        new_name: &str,
        new_text: &str,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .announcements
            .iter_mut()
            .find(|a| a.activity_name == old_name)
        {
            Some(announcement) => {
                announcement.activity_name = new_name.to_string();
                announcement.activity_description = new_text.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_announcement(&self, name: &str) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.announcements.len();
        inner.announcements.retain(|a| a.activity_name != name);
        Ok((before - inner.announcements.len()) as u64)
    }

    async fn list_highlights(&self) -> Result<Vec<Highlight>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut highlights = inner.highlights.clone();
        highlights.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(highlights)
    }

    async fn create_highlight(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Highlight, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let highlight = Highlight {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
        };
        inner.highlights.push(highlight.clone());
        Ok(highlight)
    }

    async fn update_highlight(
        &self,
        old_title: &str,
        new_title: &str,
        new_description: &str,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let index = inner
            .highlights
            .iter()
            .position(|h| h.title == old_title)
            .or_else(|| {
                inner
                    .highlights
                    .iter()
                    .position(|h| ci_eq(&h.title, old_title))
            });
        match index {
            Some(index) => {
                let highlight = &mut inner.highlights[index];
                highlight.title = new_title.to_string();
                highlight.description = new_description.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_highlight_by_title(&self, title: &str) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.highlights.len();
        inner.highlights.retain(|h| h.title != title);
        if inner.highlights.len() < before {
            return Ok((before - inner.highlights.len()) as u64);
        }
        inner.highlights.retain(|h| !ci_eq(&h.title, title));
        Ok((before - inner.highlights.len()) as u64)
    }

    async fn delete_highlight_by_id(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.highlights.len();
        inner.highlights.retain(|h| h.id != id);
        Ok((before - inner.highlights.len()) as u64)
    }

    async fn list_activities(&self) -> Result<Vec<Activity>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut activities = inner.activities.clone();
        activities.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(activities)
    }

    async fn latest_activities(&self, limit: i64) -> Result<Vec<Activity>, sqlx::Error> {
        let mut activities = self.list_activities().await?;
        activities.truncate(limit.max(0) as usize);
        Ok(activities)
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.activities.iter().find(|a| a.id == id).cloned())
    }

    async fn find_activity_by_title(&self, title: &str) -> Result<Option<Activity>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.activities.iter().find(|a| a.title == title).cloned())
    }

    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let created = Activity {
            id: Uuid::new_v4(),
            title: activity.title,
            description: activity.description,
            date: activity.date,
            location: activity.location,
            status: activity.status,
            photos: activity
                .photos
                .into_iter()
                .map(|p| PhotoRef {
                    id: Uuid::new_v4(),
                    filename: p.filename,
                    url: p.url,
                    original_name: p.original_name,
                })
                .collect(),
            reports: activity
                .reports
                .into_iter()
                .map(|r| ReportRef {
                    id: Uuid::new_v4(),
                    url: r.url,
                    public_id: r.public_id,
                    original_name: r.original_name,
                    uploaded_at: r.uploaded_at.unwrap_or_else(Utc::now),
                    mime_type: r.mime_type,
                })
                .collect(),
        };
        inner.activities.push(created.clone());
        Ok(created)
    }

    async fn update_activity_by_title(
        &self,
        old_title: &str,
        patch: ActivityPatch,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner.activities.iter_mut().find(|a| a.title == old_title) {
            Some(activity) => {
                apply_activity_patch(activity, patch);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_activity_by_id(
        &self,
        id: Uuid,
        patch: ActivityPatch,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner.activities.iter_mut().find(|a| a.id == id) {
            Some(activity) => {
                apply_activity_patch(activity, patch);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_activity(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.activities.len();
        inner.activities.retain(|a| a.id != id);
        Ok((before - inner.activities.len()) as u64)
    }

    async fn clear_activities(&self) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let count = inner.activities.len() as u64;
        inner.activities.clear();
        Ok(count)
    }

    async fn list_albums(&self) -> Result<Vec<Album>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut albums = inner.albums.clone();
        albums.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(albums)
    }

    async fn get_album(&self, name: &str) -> Result<Option<Album>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.albums.iter().find(|a| a.name == name).cloned())
    }

    async fn create_album(&self, name: &str) -> Result<Album, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let album = Album {
            id: Uuid::new_v4(),
            name: name.to_string(),
            photos: vec![],
        };
        inner.albums.push(album.clone());
        Ok(album)
    }

    async fn delete_album(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.albums.len();
        inner.albums.retain(|a| a.id != id);
        Ok((before - inner.albums.len()) as u64)
    }

    async fn add_album_photos(
        &self,
        album_id: Uuid,
        photos: Vec<NewPhoto>,
    ) -> Result<Vec<PhotoRef>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(album) = inner.albums.iter_mut().find(|a| a.id == album_id) else {
            return Ok(vec![]);
        };
        let refs: Vec<PhotoRef> = photos
            .into_iter()
            .map(|p| PhotoRef {
                id: Uuid::new_v4(),
                filename: p.filename,
                url: p.url,
                original_name: p.original_name,
            })
            .collect();
        album.photos.extend(refs.clone());
        Ok(refs)
    }

    async fn remove_album_photo(
        &self,
        album_id: Uuid,
        photo_id: Uuid,
    ) -> Result<Option<PhotoRef>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(album) = inner.albums.iter_mut().find(|a| a.id == album_id) else {
            return Ok(None);
        };
        match album.photos.iter().position(|p| p.id == photo_id) {
            Some(index) => Ok(Some(album.photos.remove(index))),
            None => Ok(None),
        }
    }

    async fn list_gallery_photos(&self) -> Result<Vec<GalleryPhoto>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut photos = inner.gallery.clone();
        photos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(photos)
    }

    async fn add_gallery_photos(
        &self,
        photos: Vec<NewGalleryPhoto>,
    ) -> Result<Vec<GalleryPhoto>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let stored: Vec<GalleryPhoto> = photos
            .into_iter()
            .map(|p| GalleryPhoto {
                id: Uuid::new_v4(),
                filename: p.filename,
                url: p.url,
                original_name: p.original_name,
                uploaded_at: p.uploaded_at,
                mime_type: p.mime_type,
            })
            .collect();
        inner.gallery.extend(stored.clone());
        Ok(stored)
    }

    async fn remove_gallery_photo(
        &self,
        filename: &str,
    ) -> Result<Option<GalleryPhoto>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner.gallery.iter().position(|p| p.filename == filename) {
            Some(index) => Ok(Some(inner.gallery.remove(index))),
            None => Ok(None),
        }
    }
}

fn apply_activity_patch(activity: &mut Activity, patch: ActivityPatch) {
    if let Some(title) = patch.title {
        activity.title = title;
    }
    if let Some(description) = patch.description {
        activity.description = description;
    }
    if let Some(date) = patch.date {
        activity.date = date;
    }
    if let Some(location) = patch.location {
        activity.location = location;
    }
    if let Some(status) = patch.status {
        activity.status = status;
    }
}
