//! reqwest-backed implementation of the gateway traits.

mod dto;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use course_core::model::{
    Account, Course, CourseDetail, CourseId, CourseProgress, CourseResource, LessonId,
    LessonProgress, ProgressUpdate,
};

use crate::credentials::{AuthToken, Credentials};
use crate::error::ApiError;
use crate::gateway::{
    AccountGateway, AuthGateway, CourseGateway, CoursePage, NewAccount, ProgressGateway,
    ResourceGateway,
};

use dto::{
    CourseDetailResponse, CourseListResponse, CourseProgressResponse, CourseResponse,
    ForgotPasswordRequest, GoogleCallbackRequest, LoginRequest, ProgressResponse,
    ProgressUpdateRequest, RegisterRequest, ResetPasswordRequest, ResourceResponse,
    TokenResponse, UserResponse,
};

/// HTTP client for the platform backend.
///
/// Bearer auth is read from the [`Credentials`] handle on every request;
/// there is no global interceptor and no cookie storage.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpGateway {
    #[must_use]
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credentials,
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "api request");
        let mut request = self.http.request(method, url);
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token.secret());
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn send_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    tracing::warn!(%status, detail, "api request failed");
    Err(ApiError::from_status(status, detail))
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError> {
        let request = self
            .request(Method::POST, "/api/v1/auth/login")
            .json(&LoginRequest { email, password });
        let token: TokenResponse = self.send(request).await?;
        Ok(AuthToken::new(token.access_token))
    }

    async fn register(&self, account: NewAccount) -> Result<Account, ApiError> {
        let request = self
            .request(Method::POST, "/api/v1/auth/register")
            .json(&RegisterRequest {
                email: account.email,
                username: account.username,
                password: account.password,
                full_name: account.full_name,
            });
        let user: UserResponse = self.send(request).await?;
        Ok(user.into_account())
    }

    async fn me(&self) -> Result<Account, ApiError> {
        let request = self.request(Method::GET, "/api/v1/auth/me");
        let user: UserResponse = self.send(request).await?;
        Ok(user.into_account())
    }

    async fn google_callback(&self, code: &str) -> Result<AuthToken, ApiError> {
        let request = self
            .request(Method::POST, "/api/v1/auth/google/callback")
            .json(&GoogleCallbackRequest { code });
        let token: TokenResponse = self.send(request).await?;
        Ok(AuthToken::new(token.access_token))
    }

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/api/v1/auth/forgot-password")
            .json(&ForgotPasswordRequest { email });
        self.send_unit(request).await
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/api/v1/auth/reset-password")
            .json(&ResetPasswordRequest {
                token,
                new_password,
            });
        self.send_unit(request).await
    }
}

#[async_trait]
impl CourseGateway for HttpGateway {
    async fn list_courses(&self, skip: u64, limit: u64) -> Result<CoursePage, ApiError> {
        let request = self
            .request(Method::GET, "/api/v1/courses/")
            .query(&[("skip", skip), ("limit", limit)]);
        let page: CourseListResponse = self.send(request).await?;
        Ok(CoursePage {
            courses: page
                .courses
                .into_iter()
                .map(CourseResponse::into_course)
                .collect::<Result<_, _>>()?,
            total: page.total,
        })
    }

    async fn course_detail(&self, id: CourseId) -> Result<CourseDetail, ApiError> {
        let request = self.request(Method::GET, &format!("/api/v1/courses/{}", id.value()));
        let detail: CourseDetailResponse = self.send(request).await?;
        detail.into_detail()
    }

    async fn my_courses(&self) -> Result<Vec<Course>, ApiError> {
        let request = self.request(Method::GET, "/api/v1/account/courses");
        let courses: Vec<CourseResponse> = self.send(request).await?;
        courses
            .into_iter()
            .map(CourseResponse::into_course)
            .collect()
    }
}

#[async_trait]
impl ProgressGateway for HttpGateway {
    async fn lesson_progress(&self, lesson_id: LessonId) -> Result<LessonProgress, ApiError> {
        let request = self.request(
            Method::GET,
            &format!("/api/v1/progress/lesson/{}", lesson_id.value()),
        );
        let progress: ProgressResponse = self.send(request).await?;
        Ok(progress.into_progress())
    }

    async fn update_progress(&self, update: ProgressUpdate) -> Result<LessonProgress, ApiError> {
        let request = self
            .request(Method::POST, "/api/v1/progress/update")
            .json(&ProgressUpdateRequest::from_update(&update));
        let progress: ProgressResponse = self.send(request).await?;
        Ok(progress.into_progress())
    }
}

#[async_trait]
impl AccountGateway for HttpGateway {
    async fn course_progress(&self, course_id: CourseId) -> Result<CourseProgress, ApiError> {
        let request = self.request(
            Method::GET,
            &format!("/api/v1/account/progress/{}", course_id.value()),
        );
        let progress: CourseProgressResponse = self.send(request).await?;
        Ok(progress.into_progress())
    }
}

#[async_trait]
impl ResourceGateway for HttpGateway {
    async fn course_resources(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseResource>, ApiError> {
        let request = self.request(
            Method::GET,
            &format!("/api/v1/resources/course/{}", course_id.value()),
        );
        let resources: Vec<ResourceResponse> = self.send(request).await?;
        resources
            .into_iter()
            .map(ResourceResponse::into_resource)
            .collect()
    }
}
