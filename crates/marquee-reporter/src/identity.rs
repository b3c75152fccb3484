use chrono::{DateTime, Duration, Utc};
use marquee_common::{ReporterError, VisitorId};
use rand::Rng;
use tracing::{debug, info};

use crate::cookie::{CookieJar, VisitorCookie};

/// The visitor id this reporter presents, with the cookie that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorIdentity {
    pub id: VisitorId,
    pub cookie: VisitorCookie,
}

impl VisitorIdentity {
    /// Reuse the id stored in the `cookie_name` cookie, or generate a fresh
    /// one and persist it for `ttl`. A live cookie is never rewritten, so its
    /// expiry is not extended.
    pub fn load_or_create(
        jar: &mut CookieJar,
        cookie_name: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, ReporterError> {
        if let Some(cookie) = jar.get(cookie_name, now) {
            match cookie.value.parse::<VisitorId>() {
                Ok(id) => {
                    debug!(visitor = %id, "Reusing visitor cookie");
                    return Ok(Self {
                        id,
                        cookie: cookie.clone(),
                    });
                }
                Err(e) => debug!(error = %e, "Ignoring unreadable visitor cookie"),
            }
        }

        let id = generate_visitor_id(&mut rand::thread_rng());
        let cookie = VisitorCookie::new(cookie_name, id.to_string(), ttl, now);
        jar.set(cookie.clone(), now)?;
        info!(visitor = %id, expires_at = %cookie.expires_at, "Issued visitor cookie");

        Ok(Self { id, cookie })
    }
}

/// Uniform non-negative 31-bit id.
pub fn generate_visitor_id<R: Rng>(rng: &mut R) -> VisitorId {
    VisitorId::new(rng.gen_range(0..=i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn jar() -> (tempfile::TempDir, CookieJar) {
        let dir = tempfile::tempdir().unwrap();
        let jar = CookieJar::open(dir.path().join("cookies.json")).unwrap();
        (dir, jar)
    }

    #[test]
    fn generated_ids_are_non_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(generate_visitor_id(&mut rng).get() >= 0);
        }
    }

    #[test]
    fn creates_and_persists_identity() {
        let (dir, mut jar) = jar();
        let identity =
            VisitorIdentity::load_or_create(&mut jar, "visitor_id", Duration::hours(24), now())
                .unwrap();

        assert!(identity.id.get() >= 0);
        assert_eq!(identity.cookie.value, identity.id.to_string());
        assert_eq!(identity.cookie.path, "/");

        let reopened = CookieJar::open(dir.path().join("cookies.json")).unwrap();
        assert_eq!(reopened.get("visitor_id", now()), Some(&identity.cookie));
    }

    #[test]
    fn reuses_live_cookie_without_extending_it() {
        let (_dir, mut jar) = jar();
        let first =
            VisitorIdentity::load_or_create(&mut jar, "visitor_id", Duration::hours(24), now())
                .unwrap();

        let later = now() + Duration::hours(5);
        let second =
            VisitorIdentity::load_or_create(&mut jar, "visitor_id", Duration::hours(24), later)
                .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.cookie.expires_at, now() + Duration::hours(24));
    }

    #[test]
    fn expired_cookie_gets_new_expiry() {
        let (_dir, mut jar) = jar();
        VisitorIdentity::load_or_create(&mut jar, "visitor_id", Duration::hours(24), now())
            .unwrap();

        let next_day = now() + Duration::hours(25);
        let renewed =
            VisitorIdentity::load_or_create(&mut jar, "visitor_id", Duration::hours(24), next_day)
                .unwrap();

        assert_eq!(renewed.cookie.expires_at, next_day + Duration::hours(24));
        assert_eq!(jar.get("visitor_id", next_day), Some(&renewed.cookie));
    }

    #[test]
    fn unreadable_cookie_is_replaced() {
        let (_dir, mut jar) = jar();
        jar.set(
            VisitorCookie::new("visitor_id", "not-a-number", Duration::hours(24), now()),
            now(),
        )
        .unwrap();

        let identity =
            VisitorIdentity::load_or_create(&mut jar, "visitor_id", Duration::hours(24), now())
                .unwrap();
        assert_eq!(identity.cookie.value, identity.id.to_string());
    }
}
