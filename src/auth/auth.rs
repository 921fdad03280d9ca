use crate::config::Config;
use crate::error::AppError;
use crate::{auth::jwt::verify_token, model::role::Role};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// Dashboard pages an attendance operation belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Page {
    /// Own attendance, clock-in/out and own payroll summary.
    SelfService,
    /// Everyone's attendance, summaries and the monthly report.
    AttendanceAdmin,
    /// Weekly and custom work schedules.
    Schedules,
}

impl Page {
    pub fn allows(self, role: Role) -> bool {
        match self {
            Page::SelfService => true,
            Page::AttendanceAdmin | Page::Schedules => matches!(role, Role::Admin | Role::Hr),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    // Set by auth_middleware on protected routes.
    if let Some(user) = req.extensions().get::<AuthUser>() {
        return Ok(user.clone());
    }

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AppError::Token("Config missing".to_string()))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|_| AppError::Unauthorized)?;
    let role = Role::from_id(claims.role).ok_or(AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl AuthUser {
    pub fn require_page_access(&self, page: Page) -> Result<(), AppError> {
        if page.allows(self.role) {
            Ok(())
        } else {
            tracing::info!(user_id = self.user_id, username = %self.username, ?page, role = %self.role, "Page access denied");
            Err(AppError::forbidden("You do not have access to this page"))
        }
    }

    /// Staff may read their own data; anyone else needs the admin page.
    pub fn require_self_or(&self, user_id: u64, page: Page) -> Result<(), AppError> {
        if self.user_id == user_id {
            self.require_page_access(Page::SelfService)
        } else {
            self.require_page_access(page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 5,
            username: "tester".into(),
            role,
        }
    }

    #[test]
    fn test_page_matrix() {
        for role in [Role::Admin, Role::Hr] {
            assert!(user(role).require_page_access(Page::AttendanceAdmin).is_ok());
            assert!(user(role).require_page_access(Page::Schedules).is_ok());
        }
        for role in [Role::Employee, Role::Cashier, Role::Warehouse] {
            assert!(user(role).require_page_access(Page::SelfService).is_ok());
            assert!(matches!(
                user(role).require_page_access(Page::AttendanceAdmin),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_self_or_admin() {
        let cashier = user(Role::Cashier);
        assert!(cashier.require_self_or(5, Page::AttendanceAdmin).is_ok());
        assert!(cashier.require_self_or(6, Page::AttendanceAdmin).is_err());
        assert!(user(Role::Hr).require_self_or(6, Page::AttendanceAdmin).is_ok());
    }

    #[actix_web::test]
    async fn test_extractor_without_token_is_unauthorized() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let result = AuthUser::extract(&req).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[actix_web::test]
    async fn test_extractor_reads_bearer_token() {
        let token = crate::auth::jwt::generate_access_token(9, "hr".into(), 2, "k", 60).unwrap();
        let config = Config {
            database_url: String::new(),
            jwt_secret: "k".into(),
            encryption_key: String::new(),
            server_addr: String::new(),
            access_token_ttl: 60,
            refresh_token_ttl: 60,
            rate_login_per_min: 1,
            rate_register_per_min: 1,
            rate_refresh_per_min: 1,
            rate_protected_per_min: 1,
            api_prefix: "/api".into(),
            salary_calc_day: 25,
            log_dir: "logs".into(),
        };
        let req = actix_web::test::TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .app_data(Data::new(config))
            .to_http_request();

        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.user_id, 9);
        assert_eq!(user.role, Role::Hr);
    }
}
