use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewPaste, Paste, Visibility, DEFAULT_LANGUAGE, DEFAULT_TITLE};
use crate::password;
use crate::store::{PasteFilter, PasteStore};
use crate::types::api::{CreatePaste, ListQuery, PasteSummary};
use crate::ApiError;

pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_LANGUAGE_LEN: usize = 64;

pub async fn create<S: PasteStore>(
    store: &S,
    owner: &str,
    request: CreatePaste,
    now: DateTime<Utc>,
) -> crate::ApiResult<Paste> {
    if request.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".into()));
    }

    let title = match request.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_owned(),
        _ => DEFAULT_TITLE.to_owned(),
    };
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "title is longer than {MAX_TITLE_LEN} characters"
        )));
    }

    let language = match request.language.as_deref().map(str::trim) {
        Some(language) if !language.is_empty() => language.to_owned(),
        _ => DEFAULT_LANGUAGE.to_owned(),
    };
    if language.chars().count() > MAX_LANGUAGE_LEN {
        return Err(ApiError::Validation(format!(
            "language is longer than {MAX_LANGUAGE_LEN} characters"
        )));
    }

    let password_hash = match request.password.as_deref() {
        Some(password) if !password.is_empty() => Some(password::hash(password)?),
        _ => None,
    };

    let new = NewPaste {
        id: Uuid::new_v4().to_string(),
        owner: owner.to_owned(),
        title,
        content: request.content,
        format: request.format,
        language,
        visibility: request.visibility,
        password_hash,
        delete_key: Uuid::new_v4().to_string(),
        burn_after_reading: request.burn_after_reading,
        expires_at: request.expiration.resolve(now),
        created_at: now,
    };

    info!(
        "new paste: id='{id}', format={format}, visibility={visibility}, expiration={expiration}, \
         burn={burn}, size={size}",
        id = new.id,
        format = new.format,
        visibility = new.visibility,
        expiration = request.expiration,
        burn = new.burn_after_reading,
        size = new.content.len(),
    );

    store.insert(new).await
}

/// Fetch a paste for viewing, applying the access policy in order:
/// existence, expiration, then the password gate.
pub async fn open<S: PasteStore>(
    store: &S,
    id: &str,
    password: Option<&str>,
    now: DateTime<Utc>,
) -> crate::ApiResult<Paste> {
    let paste = store.get(id).await?.ok_or(ApiError::NotFound)?;

    if paste.is_expired(now) {
        return Err(ApiError::Expired);
    }

    if let Some(hash) = &paste.password_hash {
        match password.filter(|p| !p.is_empty()) {
            None => return Err(ApiError::PasswordRequired),
            Some(password) => {
                if !password::verify(password, hash)? {
                    return Err(ApiError::WrongPassword);
                }
            }
        }
    }

    Ok(paste)
}

/// Count one authorized view.
pub async fn record_view<S: PasteStore>(
    store: &S,
    id: &str,
    password: Option<&str>,
    now: DateTime<Utc>,
) -> crate::ApiResult<i64> {
    open(store, id, password, now).await?;
    store
        .increment_views(id, now)
        .await?
        .ok_or(ApiError::NotFound)
}

/// Delete a burn-after-reading paste after it has been read.
pub async fn burn<S: PasteStore>(
    store: &S,
    id: &str,
    password: Option<&str>,
    now: DateTime<Utc>,
) -> crate::ApiResult<()> {
    let paste = open(store, id, password, now).await?;
    if !paste.burn_after_reading {
        return Err(ApiError::NotBurnable);
    }

    if !store.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    info!("burned paste: id='{id}'");
    Ok(())
}

/// Explicit deletion by the holder of the delete key.
pub async fn delete<S: PasteStore>(
    store: &S,
    id: &str,
    delete_key: Option<&str>,
) -> crate::ApiResult<()> {
    let delete_key = delete_key.ok_or(ApiError::MissingDeleteKey)?;
    let paste = store.get(id).await?.ok_or(ApiError::NotFound)?;

    if !bool::from(delete_key.as_bytes().ct_eq(paste.delete_key.as_bytes())) {
        return Err(ApiError::WrongDeleteKey);
    }

    store.delete(id).await?;
    info!("deleted paste: id='{id}'");
    Ok(())
}

/// Public pastes that have not expired, without their content.
pub async fn list<S: PasteStore>(
    store: &S,
    query: ListQuery,
    now: DateTime<Utc>,
) -> crate::ApiResult<Vec<PasteSummary>> {
    let filter = PasteFilter {
        visibility: Some(Visibility::Public),
        format: query.format,
        search: query.q.filter(|q| !q.trim().is_empty()),
    };
    let pastes = store
        .select(&filter, query.order.unwrap_or_default())
        .await?;

    Ok(pastes
        .into_iter()
        .filter(|paste| !paste.is_expired(now))
        .map(PasteSummary::from)
        .collect())
}

/// Physically remove every paste that has expired by `now`.
pub async fn purge_expired<S: PasteStore>(store: &S, now: DateTime<Utc>) -> crate::ApiResult<usize> {
    let pastes = store
        .select(&PasteFilter::default(), Default::default())
        .await?;

    let mut count = 0;
    for paste in pastes {
        if paste.is_expired(now) && store.delete(&paste.id).await? {
            count += 1;
        }
    }

    if count > 0 {
        info!("deleted {count} expired pastes");
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::expiration::Expiration;
    use crate::models::Format;
    use crate::store::MemoryStore;

    fn request(content: &str) -> CreatePaste {
        CreatePaste {
            content: content.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let paste = create(&store, "dev-user", request("ct"), now).await.unwrap();

        assert_eq!(paste.title, "Untitled");
        assert_eq!(paste.language, "text");
        assert_eq!(paste.owner, "dev-user");
        assert_eq!(paste.views, 0);
        assert_eq!(paste.expires_at, Some(now + Duration::weeks(1)));
        assert!(paste.password_hash.is_none());
        assert_ne!(paste.id, paste.delete_key);
    }

    #[tokio::test]
    async fn create_rejects_empty_content_without_writing() {
        let store = MemoryStore::new();
        let err = create(&store, "o", request("   \n"), Utc::now()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(store
            .select(&PasteFilter::default(), Default::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn create_rejects_oversized_title() {
        let store = MemoryStore::new();
        let req = CreatePaste {
            title: Some("x".repeat(MAX_TITLE_LEN + 1)),
            ..request("ct")
        };
        assert!(matches!(
            create(&store, "o", req, Utc::now()).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let store = MemoryStore::new();
        let req = CreatePaste {
            password: Some("letmein".into()),
            ..request("ct")
        };
        let paste = create(&store, "o", req, Utc::now()).await.unwrap();
        let hash = paste.password_hash.unwrap();
        assert!(!hash.contains("letmein"));
    }

    #[tokio::test]
    async fn open_checks_expiry_before_password() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let req = CreatePaste {
            password: Some("pw".into()),
            expiration: Expiration::FiveMinutes,
            ..request("ct")
        };
        let paste = create(&store, "o", req, now).await.unwrap();

        assert!(matches!(
            open(&store, &paste.id, None, now).await,
            Err(ApiError::PasswordRequired)
        ));
        assert!(matches!(
            open(&store, &paste.id, Some("nope"), now).await,
            Err(ApiError::WrongPassword)
        ));
        assert!(open(&store, &paste.id, Some("pw"), now).await.is_ok());

        let later = now + Duration::minutes(5) + Duration::seconds(1);
        assert!(matches!(
            open(&store, &paste.id, None, later).await,
            Err(ApiError::Expired)
        ));
        assert!(matches!(
            open(&store, &paste.id, Some("pw"), later).await,
            Err(ApiError::Expired)
        ));
    }

    #[tokio::test]
    async fn never_expiring_paste_stays_open() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let req = CreatePaste {
            expiration: Expiration::Never,
            ..request("ct")
        };
        let paste = create(&store, "o", req, now).await.unwrap();
        assert_eq!(paste.expires_at, None);
        assert!(open(&store, &paste.id, None, now + Duration::days(3650))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            open(&store, "missing", None, Utc::now()).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn record_view_respects_the_gate() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let req = CreatePaste {
            password: Some("pw".into()),
            ..request("ct")
        };
        let paste = create(&store, "o", req, now).await.unwrap();

        assert!(record_view(&store, &paste.id, None, now).await.is_err());
        assert_eq!(record_view(&store, &paste.id, Some("pw"), now).await.unwrap(), 1);
        assert_eq!(record_view(&store, &paste.id, Some("pw"), now).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn burn_only_applies_to_burnable_pastes() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let keep = create(&store, "o", request("ct"), now).await.unwrap();
        assert!(matches!(
            burn(&store, &keep.id, None, now).await,
            Err(ApiError::NotBurnable)
        ));

        let req = CreatePaste {
            burn_after_reading: true,
            ..request("ct")
        };
        let burnable = create(&store, "o", req, now).await.unwrap();
        burn(&store, &burnable.id, None, now).await.unwrap();
        assert!(matches!(
            open(&store, &burnable.id, None, now).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_requires_the_right_key() {
        let store = MemoryStore::new();
        let paste = create(&store, "o", request("ct"), Utc::now()).await.unwrap();

        assert!(matches!(
            delete(&store, &paste.id, None).await,
            Err(ApiError::MissingDeleteKey)
        ));
        assert!(matches!(
            delete(&store, &paste.id, Some("wrong")).await,
            Err(ApiError::WrongDeleteKey)
        ));
        delete(&store, &paste.id, Some(&paste.delete_key)).await.unwrap();
        assert!(store.get(&paste.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_shows_live_public_pastes_only() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let public = |title: &str, expiration| CreatePaste {
            title: Some(title.into()),
            visibility: Visibility::Public,
            format: Format::Markdown,
            expiration,
            ..request("ct")
        };
        create(&store, "o", public("live", Expiration::OneDay), now).await.unwrap();
        create(&store, "o", public("short", Expiration::FiveMinutes), now).await.unwrap();
        create(&store, "o", request("unlisted"), now).await.unwrap();

        let later = now + Duration::minutes(6);
        let listed = list(&store, ListQuery::default(), later).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["live"]);

        let query = ListQuery {
            format: Some(Format::SourceCode),
            ..Default::default()
        };
        assert!(list(&store, query, now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_rows() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let short = CreatePaste {
            expiration: Expiration::TenMinutes,
            ..request("ct")
        };
        let gone = create(&store, "o", short, now).await.unwrap();
        let kept = create(&store, "o", request("ct"), now).await.unwrap();

        assert_eq!(purge_expired(&store, now).await.unwrap(), 0);
        assert_eq!(purge_expired(&store, now + Duration::hours(1)).await.unwrap(), 1);
        assert!(store.get(&gone.id).await.unwrap().is_none());
        assert!(store.get(&kept.id).await.unwrap().is_some());
    }
}
