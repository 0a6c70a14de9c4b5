use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

/// Name of the cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "ys_session";

/// Build the session cookie: HttpOnly, SameSite=Lax, whole-site path.
///
/// # Arguments
/// * `token` - Signed session token
/// * `max_age` - Browser retention, equal to the token lifetime
/// * `secure` - Whether to set the `Secure` attribute
pub fn session_cookie(token: String, max_age: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Build a cookie that instructs the browser to drop the session cookie.
///
/// Added to the response unconditionally, whether or not the request
/// carried a session.
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}

/// Session token carried by the request, if any.
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value())
}
