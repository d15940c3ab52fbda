use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    auth::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS},
    config::WebConfig,
    web::refresh::Credentials,
};

/// Cookie-held tokens, owned so they outlive the jar they came from.
#[derive(Clone, Debug, Default)]
pub struct StoredTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl StoredTokens {
    pub fn read(jar: &CookieJar, config: &WebConfig) -> Self {
        let value = |name: &str| {
            jar.get(name).map(|c| c.value().to_string()).filter(|v| !v.is_empty())
        };
        Self { access: value(&config.access_cookie), refresh: value(&config.refresh_cookie) }
    }

    pub fn credentials(&self) -> Credentials<'_> {
        Credentials { access: self.access.as_deref(), refresh: self.refresh.as_deref() }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

pub fn store_access(jar: CookieJar, config: &WebConfig, token: &str) -> CookieJar {
    jar.add(token_cookie(
        config,
        config.access_cookie.clone(),
        token.to_string(),
        ACCESS_TOKEN_TTL_SECS,
        SameSite::Lax,
    ))
}

pub fn store_pair(jar: CookieJar, config: &WebConfig, access: &str, refresh: &str) -> CookieJar {
    store_access(jar, config, access).add(token_cookie(
        config,
        config.refresh_cookie.clone(),
        refresh.to_string(),
        REFRESH_TOKEN_TTL_SECS,
        SameSite::Strict,
    ))
}

pub fn clear(jar: CookieJar, config: &WebConfig) -> CookieJar {
    jar.remove(Cookie::build((config.access_cookie.clone(), "")).path("/"))
        .remove(Cookie::build((config.refresh_cookie.clone(), "")).path("/"))
}

fn token_cookie(
    config: &WebConfig,
    name: String,
    value: String,
    max_age_secs: i64,
    same_site: SameSite,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(same_site)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_cookies_carry_their_lifetimes() {
        let config = WebConfig::local("http://api");
        let jar = store_pair(CookieJar::new(), &config, "a", "r");

        let access = jar.get("access").unwrap();
        assert_eq!(access.value(), "a");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.max_age(), Some(time::Duration::minutes(15)));

        let refresh = jar.get("refresh").unwrap();
        assert_eq!(refresh.same_site(), Some(SameSite::Strict));
        assert_eq!(refresh.max_age(), Some(time::Duration::days(7)));
        assert_eq!(refresh.path(), Some("/"));
    }

    #[test]
    fn production_marks_cookies_secure() {
        let config = WebConfig { secure_cookies: true, ..WebConfig::local("http://api") };
        let jar = store_access(CookieJar::new(), &config, "a");
        assert_eq!(jar.get("access").unwrap().secure(), Some(true));
    }

    #[test]
    fn clear_drops_both_tokens() {
        let config = WebConfig::local("http://api");
        let jar = clear(store_pair(CookieJar::new(), &config, "a", "r"), &config);
        assert!(StoredTokens::read(&jar, &config).is_empty());
    }

    #[test]
    fn empty_cookie_values_do_not_count() {
        let config = WebConfig::local("http://api");
        let jar = CookieJar::new().add(Cookie::new("access", ""));
        assert!(StoredTokens::read(&jar, &config).is_empty());
    }
}
